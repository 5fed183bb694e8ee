use crate::finder::{find_le, MappingFinder};
use crate::mapping::{Mapping, Position};
use crate::splitter::MappingSplitter;
use crate::vlq::{VlqDecoder, VlqEncoder};
use crate::{ValidateError, ValidateResult};
use std::io;
use std::io::Write;
use std::ops::{Deref, Range};

/// `Mappings` is a collection of [Mapping] entries, kept sorted by generated
/// position so lookups can binary search.
#[derive(Debug, Clone, Default)]
pub struct Mappings(pub(crate) Vec<Mapping>);

impl Deref for Mappings {
    type Target = [Mapping];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Mappings {
    /// Creates a new `Mappings` from a vec of [Mapping] entries.
    ///
    /// The entries are sorted by their generated positions; entries that
    /// compare equal keep their given order.
    pub fn new(raw: Vec<Mapping>) -> Self {
        let mut v = Self(raw);
        v.sort();
        v
    }

    /// Sorts mapping entries by their generated positions.
    ///
    /// The sort is stable: sections merged out of order interleave without
    /// reshuffling entries that share a generated position.
    pub(crate) fn sort(&mut self) {
        self.0.sort_by_key(Mapping::generated)
    }
}

impl Mappings {
    /// see [find_entry](crate::SourceMap::find_entry).
    pub fn find_entry<P>(&self, pos: P) -> Option<Mapping>
    where
        P: Into<Position>,
    {
        find_le(self, pos.into()).map(|idx| self.0[idx])
    }

    /// see [finder](crate::SourceMap::finder).
    pub fn finder(&self) -> MappingFinder<'_> {
        MappingFinder::new(self)
    }
}

/// The id windows a (section) map's segments may reference: sources and
/// names accumulate into shared tables, and each section only owns the slice
/// of ids it contributed.
#[derive(Debug, Clone)]
pub(crate) struct TableSpan {
    pub(crate) sources: Range<u32>,
    pub(crate) names: Range<u32>,
}

/// Running totals threaded through the segment decode loop.
///
/// The generated position restarts per section (at the section offset), and
/// source/name ids are seeded with the section's table offsets so that
/// section-local indices land in the concatenated tables.
#[derive(Debug, Default, Copy, Clone)]
pub(crate) struct DecodeState {
    pub(crate) generated_line: u32,
    pub(crate) generated_col: u32,
    pub(crate) source_id: u32,
    pub(crate) name_id: u32,
}

impl Mappings {
    /// Decodes a `mappings` string, appending entries to the collection.
    ///
    /// Malformed segments never abort the decode: a segment with an invalid
    /// VLQ stream or a field count the grammar does not allow (0, 2, 3 or
    /// more than 5) is dropped without touching the running totals, and a
    /// structurally valid segment whose ids fall outside `span` (or whose
    /// accumulated positions turn negative) advances the totals but produces
    /// no entry. Every dropped segment is reported through `log`.
    pub(crate) fn decode(&mut self, source: &str, span: &TableSpan, state: DecodeState) {
        let mut generated_line = state.generated_line;
        let mut generated_col = state.generated_col as i64;
        let mut source_id = state.source_id as i64;
        let mut name_id = state.name_id as i64;

        let mut source_line: i64 = 0;
        let mut source_col: i64 = 0;

        let mut decoder = VlqDecoder::new();

        for (segment, ends_line) in MappingSplitter::new(source) {
            if !segment.is_empty() {
                match decoder.decode(segment) {
                    Ok(fields) => match *fields {
                        [col_delta] => {
                            generated_col += col_delta;
                            match u32::try_from(generated_col) {
                                Ok(col) => self.0.push(Mapping::new(generated_line, col)),
                                Err(_) => log::warn!(
                                    "dropping mapping segment {segment:?}: generated column out of range"
                                ),
                            }
                        }
                        [col_delta, source_delta, line_delta, col2_delta, ref rest @ ..] => {
                            generated_col += col_delta;
                            source_id += source_delta;
                            source_line += line_delta;
                            source_col += col2_delta;
                            let name = if let [name_delta] = *rest {
                                name_id += name_delta;
                                Some(name_id)
                            } else {
                                None
                            };
                            match Self::checked_entry(
                                generated_line,
                                generated_col,
                                source_id,
                                source_line,
                                source_col,
                                name,
                                span,
                            ) {
                                Some(mapping) => self.0.push(mapping),
                                None => log::warn!(
                                    "dropping mapping segment {segment:?}: position or id out of range"
                                ),
                            }
                        }
                        _ => {
                            log::warn!("dropping mapping segment {segment:?}: invalid field count");
                        }
                    },
                    Err(err) => {
                        log::warn!("dropping mapping segment {segment:?}: {err}");
                    }
                }
            }

            if ends_line {
                generated_line += 1;
                generated_col = 0;
            }
        }
    }

    fn checked_entry(
        generated_line: u32,
        generated_col: i64,
        source_id: i64,
        source_line: i64,
        source_col: i64,
        name_id: Option<i64>,
        span: &TableSpan,
    ) -> Option<Mapping> {
        let generated_col = u32::try_from(generated_col).ok()?;
        let source_id = u32::try_from(source_id).ok()?;
        if !span.sources.contains(&source_id) {
            return None;
        }
        let mut mapping = Mapping::new(generated_line, generated_col).with_source(
            source_id,
            u32::try_from(source_line).ok()?,
            u32::try_from(source_col).ok()?,
        );
        if let Some(name_id) = name_id {
            let name_id = u32::try_from(name_id).ok()?;
            if !span.names.contains(&name_id) {
                return None;
            }
            mapping = mapping.with_name(name_id);
        }
        Some(mapping)
    }
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct ItemsCount {
    pub(crate) sources: u32,
    pub(crate) names: u32,
}

impl ItemsCount {
    pub fn new(sources: u32, names: u32) -> Self {
        Self { sources, names }
    }
}

impl Mappings {
    pub(crate) fn encode<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        let mut prev_generated_line = 0;
        let mut prev_generated_col = 0;
        let mut prev_source_id = 0;
        let mut prev_source_line = 0;
        let mut prev_source_col = 0;
        let mut prev_name_id = 0;

        for (idx, mapping) in self.0.iter().enumerate() {
            let generated_pos = mapping.generated();

            if generated_pos.line != prev_generated_line {
                prev_generated_col = 0;
                while generated_pos.line != prev_generated_line {
                    writer.write_all(&[b';'])?;
                    prev_generated_line += 1;
                }
            } else if idx != 0 {
                writer.write_all(&[b','])?;
            }

            let mut encoder = VlqEncoder::new(writer);

            encoder.encode(prev_generated_col, generated_pos.column)?;
            prev_generated_col = generated_pos.column;

            if let Some(source) = mapping.source_position() {
                encoder.encode(prev_source_id, source.source_id)?;
                prev_source_id = source.source_id;

                encoder.encode(prev_source_line, source.position.line)?;
                prev_source_line = source.position.line;

                encoder.encode(prev_source_col, source.position.column)?;
                prev_source_col = source.position.column;

                if let Some(name_id) = mapping.name_id() {
                    encoder.encode(prev_name_id, name_id)?;
                    prev_name_id = name_id;
                }
            }
        }

        Ok(())
    }

    /// Checks that every id referenced by an entry has a corresponding table
    /// item. Used by the builder; parsed maps are valid by construction.
    pub(crate) fn validate(&self, items_count: ItemsCount) -> ValidateResult<()> {
        for mapping in &self.0 {
            if let Some(source) = mapping.source_position() {
                if source.source_id >= items_count.sources {
                    return Err(ValidateError::UnknownSourceReference(source.source_id));
                }
            }
            if let Some(name_id) = mapping.name_id() {
                if name_id >= items_count.names {
                    return Err(ValidateError::UnknownNameReference(name_id));
                }
            }
        }

        Ok(())
    }
}
