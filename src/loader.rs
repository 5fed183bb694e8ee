use crate::error::LoadError;

/// Fetches source map payloads referenced by URL.
///
/// Parsing never performs I/O on its own: when an index map's section
/// carries a `url` instead of an embedded `map`, the bytes are requested
/// from the loader the caller supplied, and [SourceMap::load](crate::SourceMap::load)
/// uses the same loader for the top-level payload. Transport, caching,
/// retries, timeouts and request attribution are entirely the implementor's
/// concern; the returned buffer is handed to the JSON parser as-is (a
/// leading UTF-8 BOM is tolerated).
pub trait PayloadLoader {
    fn load(&self, url: &str) -> Result<Vec<u8>, LoadError>;
}

impl<F> PayloadLoader for F
where
    F: Fn(&str) -> Result<Vec<u8>, LoadError>,
{
    fn load(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        self(url)
    }
}
