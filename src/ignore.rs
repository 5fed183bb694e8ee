use crate::mapping::{Mapping, Position, Range};
use std::collections::HashSet;

/// Options for [find_ranges](crate::SourceMap::find_ranges).
#[derive(Debug, Default, Clone, Copy)]
pub struct FindRangesOptions {
    /// Opt-in: treat the generated code before the first mapped entry as if
    /// it matched the predicate.
    ///
    /// By default an unmapped prefix belongs to no source, so a matching
    /// region starts at the first matching entry's own position. With this
    /// flag the scan starts inside a matching region at `(0, 0)`; when the
    /// first mapped source does not match, that yields an extra leading
    /// range from `(0, 0)` to the first entry.
    pub is_start_matching: bool,
}

/// The sources a map flags as ignore-listed (known third-party code),
/// tracked both as slot ids and as canonical URLs.
#[derive(Debug, Clone, Default)]
pub(crate) struct IgnoreList {
    source_ids: Vec<u32>,
    urls: HashSet<String>,
}

impl IgnoreList {
    pub fn push_id(&mut self, source_id: u32) {
        self.source_ids.push(source_id);
    }

    pub fn ids(&self) -> &[u32] {
        &self.source_ids
    }

    /// Resolves the collected slot ids to canonical URLs once all sources
    /// are known.
    pub fn seal<'a>(&mut self, slot_urls: impl Iterator<Item = Option<&'a str>>) {
        let ids: HashSet<u32> = self.source_ids.iter().copied().collect();
        for (slot, url) in slot_urls.enumerate() {
            if ids.contains(&(slot as u32)) {
                if let Some(url) = url {
                    self.urls.insert(url.to_owned());
                }
            }
        }
    }

    pub fn has_hint(&self, url: &str) -> bool {
        self.urls.contains(url)
    }
}

/// Scans the generated-position-sorted entries once, emitting a merged range
/// for every maximal run of generated code whose source satisfies the
/// predicate.
///
/// Entries without source information never change the in-region state. A
/// trailing region that no later entry terminates extends to
/// [Position::UNBOUNDED].
pub(crate) fn find_ranges<'a, U, P>(
    mappings: &[Mapping],
    url_of: U,
    mut predicate: P,
    options: FindRangesOptions,
) -> Vec<Range>
where
    U: Fn(u32) -> Option<&'a str>,
    P: FnMut(&str) -> bool,
{
    let mut ranges = Vec::new();
    if mappings.is_empty() {
        return ranges;
    }

    let mut open = options.is_start_matching.then(Position::min);

    for mapping in mappings {
        let Some(source) = mapping.source_position() else {
            continue;
        };
        let Some(url) = url_of(source.source_id) else {
            continue;
        };
        match (predicate(url), open) {
            (true, None) => open = Some(mapping.generated()),
            (false, Some(start)) => {
                ranges.push(Range::new(start, mapping.generated()));
                open = None;
            }
            _ => {}
        }
    }

    if let Some(start) = open {
        ranges.push(Range::new(start, Position::UNBOUNDED));
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::{find_ranges, FindRangesOptions};
    use crate::mapping::{Mapping, Position, Range};

    const URLS: [&str; 2] = ["vendor.js", "app.js"];

    fn url_of(id: u32) -> Option<&'static str> {
        URLS.get(id as usize).copied()
    }

    #[test]
    fn test_unsourced_entries_keep_state() {
        let mappings = vec![
            Mapping::new(0, 0).with_source(0, 0, 0),
            Mapping::new(1, 0),
            Mapping::new(2, 0).with_source(0, 4, 0),
            Mapping::new(3, 0).with_source(1, 0, 0),
        ];
        let ranges = find_ranges(
            &mappings,
            url_of,
            |url| url == "vendor.js",
            FindRangesOptions::default(),
        );
        assert_eq!(
            ranges,
            [Range::new(Position::new(0, 0), Position::new(3, 0))]
        );
    }

    #[test]
    fn test_start_matching_emits_leading_range() {
        let mappings = vec![
            Mapping::new(2, 4).with_source(1, 0, 0),
            Mapping::new(5, 0).with_source(0, 0, 0),
        ];
        let ranges = find_ranges(
            &mappings,
            url_of,
            |url| url == "vendor.js",
            FindRangesOptions {
                is_start_matching: true,
            },
        );
        assert_eq!(
            ranges,
            [
                Range::new(Position::min(), Position::new(2, 4)),
                Range::new(Position::new(5, 0), Position::UNBOUNDED),
            ]
        );
    }
}
