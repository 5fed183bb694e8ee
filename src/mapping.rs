use serde::Serialize;
use std::fmt::{Debug, Formatter};

/// `Position` represents a zero-based line and zero-based column in a file.
///
/// # Note
///
/// The source map specification does not define whether generated lines start
/// at 0 or 1. In this crate, both the line and the column are 0-based.
/// Different consumers use different bases, for example:
///
/// - `Error.prototype.stack` and the source panel in devtools have 1-based
///   lines and columns.
/// - NPM libraries such as `sourcemap`, `acorn`, and `babel` produce 1-based
///   lines and 0-based columns.
/// - Tools like `esbuild` use 0-based lines and columns.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Open-end sentinel for regions whose real end is unknown, such as the
    /// trailing run of a file where no later mapping exists to bound it.
    ///
    /// The value is `2^31 - 1` on both axes, larger than any position in a
    /// real script.
    pub const UNBOUNDED: Position = Position {
        line: 0x7FFF_FFFF,
        column: 0x7FFF_FFFF,
    };

    pub const fn min() -> Self {
        Self { line: 0, column: 0 }
    }

    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl From<(u32, u32)> for Position {
    fn from((line, column): (u32, u32)) -> Self {
        Self::new(line, column)
    }
}

/// A specific position in a specific original source.
///
/// `source_id` indexes the owning map's source table; resolve it to a
/// canonical URL with [source_url](crate::SourceMap::source_url).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SourcePosition {
    pub source_id: u32,
    pub position: Position,
}

impl SourcePosition {
    pub const fn new(source_id: u32, position: Position) -> Self {
        Self {
            source_id,
            position,
        }
    }
}

/// One decoded item of the `mappings` string: a generated position, plus the
/// original position and name it corresponds to, when the map recorded them.
///
/// An entry without source information still occupies a generated position;
/// it marks generated code not covered by any original source.
///
/// Lines and columns start at 0. See [Position].
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Mapping {
    generated: Position,
    source: Option<SourcePosition>,
    name_id: Option<u32>,
}

impl Debug for Mapping {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.generated.line, self.generated.column)?;
        if let Some(source) = self.source {
            write!(
                f,
                " -> {}:{}:{}",
                source.source_id, source.position.line, source.position.column,
            )?;
            if let Some(name_id) = self.name_id {
                write!(f, " ({name_id})")?;
            }
        }
        Ok(())
    }
}

impl Mapping {
    #[inline]
    pub const fn new(generated_line: u32, generated_col: u32) -> Self {
        Self {
            generated: Position {
                line: generated_line,
                column: generated_col,
            },
            source: None,
            name_id: None,
        }
    }

    #[inline]
    pub const fn with_source(self, source_id: u32, source_line: u32, source_col: u32) -> Self {
        Self {
            source: Some(SourcePosition {
                source_id,
                position: Position {
                    line: source_line,
                    column: source_col,
                },
            }),
            ..self
        }
    }

    #[inline]
    pub const fn with_name(self, name_id: u32) -> Self {
        Self {
            name_id: Some(name_id),
            ..self
        }
    }
}

impl Mapping {
    /// Returns the generated position of the mapping.
    #[inline]
    pub fn generated(&self) -> Position {
        self.generated
    }

    /// Returns the original source position, if the map recorded one.
    #[inline]
    pub fn source_position(&self) -> Option<SourcePosition> {
        self.source
    }

    #[inline]
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Returns the name table index, if the map recorded one.
    ///
    /// A name is only ever present together with source information.
    #[inline]
    pub fn name_id(&self) -> Option<u32> {
        self.name_id
    }

    #[inline]
    pub fn has_name(&self) -> bool {
        self.name_id.is_some()
    }
}

/// A region of generated text, half-open: the start position is covered, the
/// end position is where the next distinct mapping begins.
///
/// Serializes to `{"startLine", "startColumn", "endLine", "endColumn"}`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self {
            start_line: start.line,
            start_column: start.column,
            end_line: end.line,
            end_column: end.column,
        }
    }

    pub const fn start(&self) -> Position {
        Position::new(self.start_line, self.start_column)
    }

    pub const fn end(&self) -> Position {
        Position::new(self.end_line, self.end_column)
    }

    /// Whether the range extends to the open-end sentinel instead of a real
    /// terminating mapping.
    pub fn is_open_ended(&self) -> bool {
        self.end() == Position::UNBOUNDED
    }
}

#[cfg(test)]
mod tests {
    use super::{Mapping, Position, Range};

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 0) > Position::new(0, 99));
        assert!(Position::new(3, 4) > Position::new(3, 3));
        assert!(Position::min() < Position::UNBOUNDED);
    }

    #[test]
    fn test_mapping_debug() {
        let plain = Mapping::new(4, 2);
        assert_eq!(format!("{plain:?}"), "4:2");
        let sourced = Mapping::new(4, 2).with_source(1, 10, 3).with_name(7);
        assert_eq!(format!("{sourced:?}"), "4:2 -> 1:10:3 (7)");
    }

    #[test]
    fn test_range_serializes_to_plain_object() {
        let range = Range::new(Position::new(1, 2), Position::UNBOUNDED);
        let json = serde_json::to_value(range).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "startLine": 1,
                "startColumn": 2,
                "endLine": 0x7FFF_FFFFu32,
                "endColumn": 0x7FFF_FFFFu32,
            })
        );
        assert!(range.is_open_ended());
    }
}
