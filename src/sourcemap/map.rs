use crate::error::{LoadError, ParseError, ParseResult};
use crate::finder::MappingFinder;
use crate::ignore::{self, FindRangesOptions, IgnoreList};
use crate::loader::PayloadLoader;
use crate::mapping::{Mapping, Position, Range};
use crate::mappings::{DecodeState, Mappings, TableSpan};
use crate::resolve::resolve_source_url;
use crate::reverse::ReverseIndex;
use crate::sourcemap::raw::RawSourceMap;
use simd_json_derive::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::io;
use std::io::Write;
use std::sync::OnceLock;

/// One `sources[i]` slot of a parsed map: the canonical URL the raw entry
/// resolved to, plus its embedded content when the map carried any.
#[derive(Debug, Clone, Default)]
pub struct SourceRecord {
    pub(crate) url: Option<String>,
    pub(crate) content: Option<String>,
}

impl SourceRecord {
    /// The canonical URL of the source, or `None` for a null slot.
    #[inline]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// The embedded `sourcesContent` entry for the source, if any.
    #[inline]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

/// `SourceMap` is the built artifact: an immutable, generated-position
/// sorted list of [Mapping] entries together with the resolved source
/// tables, answering forward, reverse and ignore-list queries.
///
/// # Construction
///
/// - [`SourceMap::parse`] for a payload already in memory
/// - [`SourceMap::parse_with_loader`] when index-map sections may reference
///   external sub-maps by URL
/// - [`SourceMap::load`] to fetch the top-level payload through the same
///   [PayloadLoader]
///
/// Raw `sources` entries are canonicalized against the map's `sourceRoot`
/// and its own retrieval URL during parsing; all query APIs speak canonical
/// URLs.
///
/// # Queries
///
/// - [`find_entry`](SourceMap::find_entry) / [`finder`](SourceMap::finder):
///   generated position to mapping
/// - [`source_line_mapping`](SourceMap::source_line_mapping),
///   [`find_reverse_ranges`](SourceMap::find_reverse_ranges),
///   [`find_reverse_entries`](SourceMap::find_reverse_entries): original
///   position back to generated positions
/// - [`has_ignore_list_hint`](SourceMap::has_ignore_list_hint) /
///   [`find_ranges`](SourceMap::find_ranges): ignore-list analysis
///
/// Queries that find nothing return `None` or an empty vec; they never fail.
/// A built map is immutable and safe to query from multiple threads; the
/// reverse index is materialized once, on the first reverse query.
///
/// # Output
///
/// [`write`](SourceMap::write), [`to_vec`](SourceMap::to_vec) and
/// [`to_string`](SourceMap::to_string) serialize the map back to standard
/// JSON, with the canonical source URLs in `sources`.
#[derive(Clone)]
pub struct SourceMap {
    pub(crate) file: Option<String>,
    pub(crate) mappings: Mappings,
    pub(crate) names: Vec<String>,
    pub(crate) sources: Vec<SourceRecord>,
    pub(crate) source_urls: Vec<String>,
    pub(crate) ignore_list: IgnoreList,
    pub(crate) reverse: OnceLock<ReverseIndex>,
}

impl Debug for SourceMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SourceMap\n")?;
        f.write_str("  sources:\n")?;
        for (idx, record) in self.sources.iter().enumerate() {
            let url = record.url.as_deref().unwrap_or("");
            writeln!(f, "    {idx}: {url}")?;
        }
        f.write_str("  names:\n")?;
        for (idx, name) in self.names.iter().enumerate() {
            writeln!(f, "    {idx}: {name}")?;
        }
        f.write_str("  mappings:\n")?;
        if !self.mappings.is_empty() {
            let mut last_line = self.mappings[0].generated().line;
            f.write_str("    ")?;
            for (idx, mapping) in self.mappings.iter().enumerate() {
                if idx != 0 {
                    if mapping.generated().line != last_line {
                        f.write_str("\n    ")?;
                    } else {
                        f.write_str(", ")?;
                    }
                }
                write!(f, "{mapping:?}")?;
                last_line = mapping.generated().line;
            }
        }
        Ok(())
    }
}

impl SourceMap {
    /// Parses a source map payload.
    ///
    /// `source_map_url` is the URL the payload was retrieved from; relative
    /// `sources` entries resolve against it. A payload in the `sections`
    /// index-map form parses too, as long as every section embeds its
    /// sub-map; use [`parse_with_loader`](Self::parse_with_loader) when
    /// sections may reference sub-maps by URL.
    ///
    /// # Example
    /// ```
    /// # use kasane::SourceMap;
    /// let buf = br#"{"version":3,"sources":["a.ts"],"mappings":"AAAA"}"#.to_vec();
    /// let map = SourceMap::parse(buf, "https://example.com/a.js.map").unwrap();
    /// assert_eq!(map.source_urls()[0], "https://example.com/a.ts");
    /// ```
    pub fn parse(source: Vec<u8>, source_map_url: &str) -> ParseResult<Self> {
        Self::parse_buf(source, source_map_url, None)
    }

    /// Like [`parse`](Self::parse), fetching section sub-maps referenced by
    /// URL through `loader`.
    pub fn parse_with_loader(
        source: Vec<u8>,
        source_map_url: &str,
        loader: &dyn PayloadLoader,
    ) -> ParseResult<Self> {
        Self::parse_buf(source, source_map_url, Some(loader))
    }

    /// Fetches the payload at `source_map_url` through `loader` and parses
    /// it.
    pub fn load(source_map_url: &str, loader: &dyn PayloadLoader) -> ParseResult<Self> {
        let buf = loader.load(source_map_url)?;
        Self::parse_buf(buf, source_map_url, Some(loader))
    }

    fn parse_buf(
        mut buf: Vec<u8>,
        source_map_url: &str,
        loader: Option<&dyn PayloadLoader>,
    ) -> ParseResult<Self> {
        let json = strip_bom(&mut buf);
        let raw = RawSourceMap::from_slice(json)?;
        Self::from_raw(raw, source_map_url, loader)
    }

    fn from_raw(
        raw: RawSourceMap<'_>,
        source_map_url: &str,
        loader: Option<&dyn PayloadLoader>,
    ) -> ParseResult<Self> {
        if !matches!(raw.version, Some(3)) {
            return Err(ParseError::UnsupportedFormat);
        }

        let mut sm = Self::empty();
        sm.file = raw.file.map(str::to_owned);
        if raw.sections.is_some() {
            sm.process_sections(raw, source_map_url, loader)?;
        } else {
            sm.process_map(raw, source_map_url, Position::min())?;
        }
        // sections can interleave; a stable sort restores the global order
        sm.mappings.sort();
        sm.finish();
        Ok(sm)
    }

    pub(crate) fn empty() -> Self {
        Self {
            file: None,
            mappings: Mappings::default(),
            names: Vec::new(),
            sources: Vec::new(),
            source_urls: Vec::new(),
            ignore_list: IgnoreList::default(),
            reverse: OnceLock::new(),
        }
    }

    fn process_map(
        &mut self,
        raw: RawSourceMap<'_>,
        source_map_url: &str,
        start: Position,
    ) -> ParseResult<()> {
        if raw.sections.is_some() {
            // the format does not allow index maps inside index maps
            log::warn!("ignoring nested sections in source map section");
        }

        let start_sources = self.sources.len() as u32;
        let start_names = self.names.len() as u32;

        if let Some(sources) = raw.sources {
            let sources_len = sources.len();
            let source_root = raw.source_root;
            self.sources.reserve(sources_len);
            for source in sources {
                let url =
                    source.map(|source| resolve_source_url(source, source_root, source_map_url));
                self.sources.push(SourceRecord { url, content: None });
            }

            if let Some(sources_content) = raw.sources_content {
                if sources_content.len() != sources_len {
                    return Err(ParseError::invalid_sources_content(
                        sources_len as u32,
                        sources_content.len() as u32,
                    ));
                }
                let records = &mut self.sources[start_sources as usize..];
                for (record, content) in records.iter_mut().zip(sources_content) {
                    record.content = content.map(str::to_owned);
                }
            }
        }

        if let Some(names) = raw.names {
            self.names.reserve(names.len());
            self.names.extend(names.into_iter().map(str::to_owned));
        }

        let end_sources = self.sources.len() as u32;
        let end_names = self.names.len() as u32;

        // the standard field wins over the draft-era x_google_ prefix
        if let Some(ignore_list) = raw.ignore_list.or(raw.x_google_ignore_list) {
            for source_id in ignore_list {
                match source_id
                    .checked_add(start_sources)
                    .filter(|slot| *slot < end_sources)
                {
                    Some(slot) => self.ignore_list.push_id(slot),
                    None => log::warn!(
                        "ignoring ignore-list entry referencing unknown source #{source_id}"
                    ),
                }
            }
        }

        self.mappings.decode(
            raw.mappings.unwrap_or_default(),
            &TableSpan {
                sources: start_sources..end_sources,
                names: start_names..end_names,
            },
            DecodeState {
                generated_line: start.line,
                generated_col: start.column,
                source_id: start_sources,
                name_id: start_names,
            },
        );

        Ok(())
    }

    #[cold]
    fn process_sections(
        &mut self,
        raw: RawSourceMap<'_>,
        source_map_url: &str,
        loader: Option<&dyn PayloadLoader>,
    ) -> ParseResult<()> {
        for (section_id, section) in raw.sections.unwrap_or_default().into_iter().enumerate() {
            let section_id = section_id as u32;
            let offset = Position::new(section.offset.line, section.offset.column);

            if let Some(map) = section.map {
                self.process_map(*map, source_map_url, offset)
                    .map_err(|e| ParseError::section(section_id, e))?;
            } else if let Some(url) = section.url {
                let section_url = resolve_source_url(url, None, source_map_url);
                self.process_fetched_section(&section_url, offset, loader)
                    .map_err(|e| ParseError::section(section_id, e))?;
            }
            // a section with neither map nor url contributes nothing
        }
        Ok(())
    }

    fn process_fetched_section(
        &mut self,
        section_url: &str,
        offset: Position,
        loader: Option<&dyn PayloadLoader>,
    ) -> ParseResult<()> {
        let Some(loader) = loader else {
            return Err(LoadError::new(section_url, "no payload loader available").into());
        };
        let mut buf = loader.load(section_url)?;
        let json = strip_bom(&mut buf);
        let sub = RawSourceMap::from_slice(json)?;
        // the fetched map's own URL is the base for its sources
        self.process_map(sub, section_url, offset)
    }

    /// Deduplicates canonical URLs and seals the ignore list once every
    /// section has contributed its sources.
    pub(crate) fn finish(&mut self) {
        let mut seen = HashSet::new();
        for record in &self.sources {
            if let Some(url) = &record.url {
                if seen.insert(url.as_str()) {
                    self.source_urls.push(url.clone());
                }
            }
        }
        self.ignore_list
            .seal(self.sources.iter().map(|record| record.url.as_deref()));
    }
}

impl SourceMap {
    /// Finds the mapping for a given generated position.
    ///
    /// If an exact match is not found, this method returns the closest
    /// preceding mapping. If there are no preceding mappings, it returns
    /// `None`.
    ///
    /// # Example
    /// ```
    /// # use kasane::SourceMap;
    /// let buf = br#"{"version":3,"sources":["a.ts"],"mappings":"AAAA,EAAE"}"#.to_vec();
    /// let map = SourceMap::parse(buf, "https://example.com/a.js.map").unwrap();
    /// let mapping = map.find_entry((0, 3)).unwrap();
    /// assert_eq!(mapping.generated().column, 2);
    /// ```
    pub fn find_entry<P>(&self, pos: P) -> Option<Mapping>
    where
        P: Into<Position>,
    {
        self.mappings.find_entry(pos)
    }

    /// Creates a stateful [MappingFinder] for the map.
    ///
    /// The finder is highly efficient for frequent lookups in small
    /// increments, such as walking a minified file from start to finish.
    pub fn finder(&self) -> MappingFinder<'_> {
        self.mappings.finder()
    }

    /// The deduplicated canonical URLs of the original sources, in first
    /// appearance order.
    pub fn source_urls(&self) -> &[String] {
        &self.source_urls
    }

    /// Finds the mapping of the exact original line in `url` closest to the
    /// requested column: the first mapping at or past it, or the last one on
    /// the line. Returns `None` when that line has no mappings at all.
    pub fn source_line_mapping<P>(&self, url: &str, pos: P) -> Option<Mapping>
    where
        P: Into<Position>,
    {
        let pos = pos.into();
        let run = self.reverse().line_run(url, pos.line);
        let idx = run.partition_point(|entry| entry.original.column < pos.column);
        let entry = match run.get(idx) {
            Some(entry) => *entry,
            None => *run.last()?,
        };
        Some(self.mappings[entry.index as usize])
    }

    /// Finds the maximal generated regions mapping back to the original
    /// position in `url`.
    ///
    /// The matched original position is the exact one when the map records
    /// it, otherwise the nearest preceding recorded position. Consecutive
    /// entries carrying the same original position merge into one region,
    /// bounded by the next differing mapping; the last region of the file
    /// is bounded by [Position::UNBOUNDED] when nothing follows it.
    pub fn find_reverse_ranges<P>(&self, url: &str, pos: P) -> Vec<Range>
    where
        P: Into<Position>,
    {
        self.reverse_runs(url, pos.into())
            .into_iter()
            .map(|(start, end)| {
                let end_pos = match self.mappings.get(end) {
                    Some(mapping) => mapping.generated(),
                    None => Position::UNBOUNDED,
                };
                Range::new(self.mappings[start].generated(), end_pos)
            })
            .collect()
    }

    /// Like [`find_reverse_ranges`](Self::find_reverse_ranges), but returns
    /// the first mapping of each merged region instead of the region bounds.
    pub fn find_reverse_entries<P>(&self, url: &str, pos: P) -> Vec<Mapping>
    where
        P: Into<Position>,
    {
        self.reverse_runs(url, pos.into())
            .into_iter()
            .map(|(start, _)| self.mappings[start])
            .collect()
    }

    /// Whether the map flags `url` (canonical) as ignore-listed third-party
    /// code.
    pub fn has_ignore_list_hint(&self, url: &str) -> bool {
        self.ignore_list.has_hint(url)
    }

    /// Emits the merged generated regions whose source URL satisfies
    /// `predicate`; see [FindRangesOptions] for the handling of the region
    /// before the first mapped entry.
    ///
    /// ```
    /// # use kasane::{FindRangesOptions, SourceMap};
    /// # let buf = br#"{"version":3,"sources":["v.js","a.js"],"mappings":"AAAA;ACAA","x_google_ignoreList":[0]}"#.to_vec();
    /// # let map = SourceMap::parse(buf, "https://example.com/b.js.map").unwrap();
    /// let ignored =
    ///     map.find_ranges(|url| map.has_ignore_list_hint(url), FindRangesOptions::default());
    /// assert_eq!(ignored.len(), 1);
    /// ```
    pub fn find_ranges<P>(&self, predicate: P, options: FindRangesOptions) -> Vec<Range>
    where
        P: FnMut(&str) -> bool,
    {
        ignore::find_ranges(
            &self.mappings,
            |source_id| self.source_url(source_id),
            predicate,
            options,
        )
    }

    fn reverse(&self) -> &ReverseIndex {
        self.reverse
            .get_or_init(|| ReverseIndex::build(&self.mappings, |id| self.source_url(id)))
    }

    /// Runs of consecutive mapping indices sharing the matched original
    /// position, as `(first index, index one past the run)` pairs.
    fn reverse_runs(&self, url: &str, pos: Position) -> Vec<(usize, usize)> {
        let matched = self.reverse().matched_run(url, pos);
        let mut runs = Vec::new();
        let mut i = 0;
        while i < matched.len() {
            let start = matched[i].index as usize;
            let mut end = start + 1;
            while i + 1 < matched.len() && matched[i + 1].index as usize == end {
                end += 1;
                i += 1;
            }
            runs.push((start, end));
            i += 1;
        }
        runs
    }
}

impl SourceMap {
    #[inline]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    #[inline]
    pub fn mappings(&self) -> &Mappings {
        &self.mappings
    }

    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The name at `name_id` in the map's name table.
    #[inline]
    pub fn name(&self, name_id: u32) -> Option<&str> {
        self.names.get(name_id as usize).map(String::as_str)
    }

    /// All source slots, in table order (not deduplicated; see
    /// [source_urls](Self::source_urls)).
    #[inline]
    pub fn sources(&self) -> &[SourceRecord] {
        &self.sources
    }

    /// The canonical URL of the source slot `source_id`.
    #[inline]
    pub fn source_url(&self, source_id: u32) -> Option<&str> {
        self.sources.get(source_id as usize)?.url.as_deref()
    }

    /// The embedded content of the source slot `source_id`, if any.
    #[inline]
    pub fn source_content(&self, source_id: u32) -> Option<&str> {
        self.sources.get(source_id as usize)?.content.as_deref()
    }

    /// The ignore-listed source slots, as ids into [sources](Self::sources).
    #[inline]
    pub fn ignore_list(&self) -> &[u32] {
        self.ignore_list.ids()
    }
}

impl SourceMap {
    pub fn write<W>(&self, w: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        w.write_all(br#"{"version":3"#)?;

        if let Some(file) = self.file.as_deref() {
            w.write_all(br#","file":"#)?;
            file.json_write(w)?;
        }

        w.write_all(br#","sources":"#)?;
        let sources: Vec<Option<&str>> =
            self.sources.iter().map(|record| record.url()).collect();
        sources.json_write(w)?;

        w.write_all(br#","sourcesContent":"#)?;
        let contents: Vec<Option<&str>> =
            self.sources.iter().map(|record| record.content()).collect();
        contents.json_write(w)?;

        if !self.names.is_empty() {
            w.write_all(br#","names":"#)?;
            self.names.json_write(w)?;
        }

        w.write_all(br#","mappings":""#)?;
        self.mappings.encode(w)?;
        w.write_all(br#"""#)?;

        if !self.ignore_list.ids().is_empty() {
            w.write_all(br#","ignoreList":"#)?;
            let ids: Vec<u32> = self.ignore_list.ids().to_vec();
            ids.json_write(w)?;
        }

        w.write_all(br#"}"#)
    }

    #[inline]
    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        let mut v = Vec::with_capacity(1024);
        self.write(&mut v)?;
        Ok(v)
    }

    #[inline]
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> io::Result<String> {
        self.to_vec().and_then(|v| {
            // the writer only ever emits UTF-8
            String::from_utf8(v).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        })
    }
}

fn strip_bom(buf: &mut [u8]) -> &mut [u8] {
    if buf.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &mut buf[3..]
    } else {
        buf
    }
}
