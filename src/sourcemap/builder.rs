use crate::ignore::IgnoreList;
use crate::mappings::{ItemsCount, Mappings};
use crate::sourcemap::map::{SourceMap, SourceRecord};
use crate::{ValidateError, ValidateResult};

impl SourceMap {
    pub fn builder() -> SourceMapBuilder {
        SourceMapBuilder::default()
    }
}

/// Constructs a [SourceMap] directly from parts, for producers that already
/// hold decoded mappings instead of a JSON payload.
///
/// Unlike parsing, the builder performs no URL resolution: `sources`
/// entries are taken as already-canonical URLs. [build](Self::build)
/// validates that every id referenced by a mapping or the ignore list has a
/// table entry.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    file: Option<String>,
    mappings: Option<Mappings>,
    names: Option<Vec<String>>,
    sources: Option<Vec<Option<String>>>,
    sources_content: Option<Vec<Option<String>>>,
    ignore_list: Option<Vec<u32>>,
}

impl SourceMapBuilder {
    #[inline]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[inline]
    pub fn with_mappings(mut self, mappings: Mappings) -> Self {
        self.mappings = Some(mappings);
        self
    }

    #[inline]
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = Some(names);
        self
    }

    /// Sets the source URLs; a `None` slot is a null source.
    #[inline]
    pub fn with_sources(mut self, sources: Vec<Option<String>>) -> Self {
        self.sources = Some(sources);
        self
    }

    #[inline]
    pub fn with_sources_content(mut self, sources_content: Vec<Option<String>>) -> Self {
        self.sources_content = Some(sources_content);
        self
    }

    /// Flags source slots as ignore-listed third-party code.
    #[inline]
    pub fn with_ignore_list(mut self, ignore_list: Vec<u32>) -> Self {
        self.ignore_list = Some(ignore_list);
        self
    }

    pub fn build(self) -> ValidateResult<SourceMap> {
        let sources = self.sources.unwrap_or_default();
        let sources_len = sources.len() as u32;
        let names = self.names.unwrap_or_default();
        let mappings = self.mappings.unwrap_or_default();

        mappings.validate(ItemsCount::new(sources_len, names.len() as u32))?;

        let mut records: Vec<SourceRecord> = sources
            .into_iter()
            .map(|url| SourceRecord { url, content: None })
            .collect();
        if let Some(sources_content) = self.sources_content {
            if sources_content.len() as u32 != sources_len {
                return Err(ValidateError::MismatchSourcesContent {
                    sources_len,
                    sources_content_len: sources_content.len() as u32,
                });
            }
            for (record, content) in records.iter_mut().zip(sources_content) {
                record.content = content;
            }
        }

        let mut ignore_list = IgnoreList::default();
        for (index, source_id) in self.ignore_list.unwrap_or_default().into_iter().enumerate() {
            if source_id >= sources_len {
                return Err(ValidateError::UnknownIgnoreListReference {
                    index: index as u32,
                    source_id,
                });
            }
            ignore_list.push_id(source_id);
        }

        let mut sm = SourceMap::empty();
        sm.file = self.file;
        sm.mappings = mappings;
        sm.names = names;
        sm.sources = records;
        sm.ignore_list = ignore_list;
        sm.finish();
        Ok(sm)
    }
}
