use memchr::Memchr2;

/// Splits a `mappings` string into VLQ segments in one pass.
///
/// Yields `(segment, ends_line)` pairs: `ends_line` is true when the segment
/// is terminated by a `;` (the generated line advances after it), false when
/// terminated by a `,` or by the end of input. Empty segments are yielded as
/// empty strings so the caller keeps an accurate line count for inputs like
/// `";;AAAA"`.
#[derive(Debug)]
pub(crate) struct MappingSplitter<'a> {
    source: &'a str,
    next_start: usize,
    delimiters: Memchr2<'a>,
}

impl<'a> MappingSplitter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            next_start: 0,
            delimiters: memchr::memchr2_iter(b';', b',', source.as_bytes()),
        }
    }
}

impl<'a> Iterator for MappingSplitter<'a> {
    type Item = (&'a str, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let (end, ends_line) = match self.delimiters.next() {
            Some(end) => (end, self.source.as_bytes()[end] == b';'),
            None => {
                if self.next_start > self.source.len() {
                    return None;
                }
                (self.source.len(), false)
            }
        };
        let segment = &self.source[self.next_start..end];
        self.next_start = end + 1;
        Some((segment, ends_line))
    }
}
