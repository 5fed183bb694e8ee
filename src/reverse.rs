use crate::mapping::{Mapping, Position};
use std::collections::HashMap;

/// One entry of a per-source reverse table: an original position and the
/// index of the mapping that carries it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReverseEntry {
    pub original: Position,
    pub index: u32,
}

/// Reverse lookup tables, keyed by canonical source URL.
///
/// Each table holds the indices of the mappings referencing that source,
/// ordered by original position; mappings sharing an original position keep
/// their generated order. Distinct source slots resolving to the same
/// canonical URL share one table.
///
/// Built once, on the first reverse query, and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReverseIndex {
    by_url: HashMap<String, Vec<ReverseEntry>>,
}

impl ReverseIndex {
    pub fn build<'a, F>(mappings: &[Mapping], url_of: F) -> Self
    where
        F: Fn(u32) -> Option<&'a str>,
    {
        let mut by_url: HashMap<String, Vec<ReverseEntry>> = HashMap::new();
        for (index, mapping) in mappings.iter().enumerate() {
            let Some(source) = mapping.source_position() else {
                continue;
            };
            let Some(url) = url_of(source.source_id) else {
                continue;
            };
            // entries arrive in generated order; the stable sort below keeps
            // that order within each original position
            by_url
                .entry(url.to_owned())
                .or_default()
                .push(ReverseEntry {
                    original: source.position,
                    index: index as u32,
                });
        }
        for entries in by_url.values_mut() {
            entries.sort_by_key(|entry| entry.original);
        }
        Self { by_url }
    }

    pub fn entries_for(&self, url: &str) -> &[ReverseEntry] {
        self.by_url.get(url).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All entries whose original position matches `pos` exactly or, when no
    /// exact match exists, the entries at the nearest preceding original
    /// position. Empty when the source has no entry at or before `pos`.
    pub fn matched_run(&self, url: &str, pos: Position) -> &[ReverseEntry] {
        let entries = self.entries_for(url);
        let end = entries.partition_point(|entry| entry.original <= pos);
        if end == 0 {
            return &[];
        }
        let target = entries[end - 1].original;
        let start = entries[..end].partition_point(|entry| entry.original < target);
        &entries[start..end]
    }

    /// All entries whose original line is exactly `line`, ordered by
    /// original column.
    pub fn line_run(&self, url: &str, line: u32) -> &[ReverseEntry] {
        let entries = self.entries_for(url);
        let first = entries.partition_point(|entry| entry.original.line < line);
        let last = entries.partition_point(|entry| entry.original.line <= line);
        &entries[first..last]
    }
}

#[cfg(test)]
mod tests {
    use super::ReverseIndex;
    use crate::mapping::{Mapping, Position};

    fn index() -> ReverseIndex {
        let mappings = vec![
            Mapping::new(0, 0).with_source(0, 1, 0),
            Mapping::new(1, 0).with_source(0, 3, 0),
            Mapping::new(2, 0).with_source(0, 1, 0),
            Mapping::new(4, 0).with_source(1, 5, 0),
            Mapping::new(5, 0).with_source(0, 3, 0),
        ];
        ReverseIndex::build(&mappings, |id| match id {
            0 => Some("ex.js"),
            1 => Some("other.js"),
            _ => None,
        })
    }

    #[test]
    fn test_entries_ordered_by_original_position() {
        let index = index();
        let originals: Vec<(u32, u32)> = index
            .entries_for("ex.js")
            .iter()
            .map(|e| (e.original.line, e.index))
            .collect();
        // ties on original position keep generated (index) order
        assert_eq!(originals, [(1, 0), (1, 2), (3, 1), (3, 4)]);
    }

    #[test]
    fn test_matched_run_exact_and_preceding() {
        let index = index();
        let exact: Vec<u32> = index
            .matched_run("ex.js", Position::new(3, 0))
            .iter()
            .map(|e| e.index)
            .collect();
        assert_eq!(exact, [1, 4]);

        // no entry at line 2: fall back to the run at line 1
        let preceding: Vec<u32> = index
            .matched_run("ex.js", Position::new(2, 0))
            .iter()
            .map(|e| e.index)
            .collect();
        assert_eq!(preceding, [0, 2]);

        assert!(index.matched_run("ex.js", Position::new(0, 0)).is_empty());
        assert!(index.matched_run("missing.js", Position::new(3, 0)).is_empty());
    }

    #[test]
    fn test_line_run() {
        let index = index();
        assert_eq!(index.line_run("ex.js", 3).len(), 2);
        assert!(index.line_run("ex.js", 2).is_empty());
    }
}
