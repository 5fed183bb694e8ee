use std::error::Error;

pub type ParseResult<T> = Result<T, ParseError>;
pub type ValidateResult<T> = Result<T, ValidateError>;

/// Failure to fetch a payload referenced by URL.
///
/// Produced by [PayloadLoader](crate::PayloadLoader) implementations. The
/// parser wraps it into [ParseError::Load], so a failed section fetch aborts
/// the whole parse and no partially built map is ever returned.
#[derive(Debug, thiserror::Error)]
#[error("failed to load source map payload from \"{url}\": {reason}")]
pub struct LoadError {
    pub url: String,
    #[source]
    pub reason: Box<dyn Error + Send + Sync>,
}

impl LoadError {
    pub fn new(url: impl Into<String>, reason: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Fatal errors raised while turning a payload into a
/// [SourceMap](crate::SourceMap).
///
/// Per-segment decode faults are not represented here: a malformed mapping
/// segment is dropped with a `log` warning and parsing continues.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("source map syntax error: {0}")]
    Syntax(Box<dyn Error>),
    #[error("unsupported source map format")]
    UnsupportedFormat,
    #[error("a mapping is malformed: \"{0}\"")]
    MappingMalformed(String),
    #[error(
        "source map has {} sources but {} sourcesContent entries",
        sources_len,
        sources_content_len
    )]
    MismatchSourcesContent {
        sources_len: u32,
        sources_content_len: u32,
    },
    #[error("section #{id}: {source}")]
    Section {
        id: u32,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    pub(crate) fn invalid_sources_content(sources_len: u32, sources_content_len: u32) -> Self {
        Self::MismatchSourcesContent {
            sources_len,
            sources_content_len,
        }
    }

    pub(crate) fn section(id: u32, source: ParseError) -> Self {
        Self::Section {
            id,
            source: Box::new(source),
        }
    }
}

impl From<simd_json::Error> for ParseError {
    fn from(value: simd_json::Error) -> Self {
        Self::Syntax(Box::new(value))
    }
}

/// Errors raised by [SourceMapBuilder](crate::SourceMapBuilder) validation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ValidateError {
    #[error("a mapping references unknown source #{0}")]
    UnknownSourceReference(u32),
    #[error("a mapping references unknown name #{0}")]
    UnknownNameReference(u32),
    #[error(
        "source map has {} sources but {} sourcesContent entries",
        sources_len,
        sources_content_len
    )]
    MismatchSourcesContent {
        sources_len: u32,
        sources_content_len: u32,
    },
    #[error("ignore list entry #{index} references unknown source #{source_id}")]
    UnknownIgnoreListReference { index: u32, source_id: u32 },
}
