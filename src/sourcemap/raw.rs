/// Borrowed mirror of a source map JSON payload, in either the single-map
/// or the `sections` index-map form. Field validation beyond JSON shape
/// happens while the payload is processed into a
/// [SourceMap](crate::SourceMap).
#[derive(Debug, simd_json_derive::Deserialize)]
#[simd_json(rename_all = "camelCase")]
pub(crate) struct RawSourceMap<'a> {
    pub version: Option<u32>,
    pub file: Option<&'a str>,
    pub sources: Option<Vec<Option<&'a str>>>,
    pub source_root: Option<&'a str>,
    pub sources_content: Option<Vec<Option<&'a str>>>,
    pub names: Option<Vec<&'a str>>,
    pub mappings: Option<&'a str>,
    pub sections: Option<Vec<RawSection<'a>>>,
    pub ignore_list: Option<Vec<u32>>,
    #[simd_json(rename = "x_google_ignoreList")]
    pub x_google_ignore_list: Option<Vec<u32>>,
}

/// One entry of an index map's `sections`: a generated offset plus either an
/// embedded sub-map or the URL to fetch one from.
#[derive(Debug, simd_json_derive::Deserialize)]
pub(crate) struct RawSection<'a> {
    pub offset: RawSectionOffset,
    pub map: Option<Box<RawSourceMap<'a>>>,
    pub url: Option<&'a str>,
}

#[derive(Debug, simd_json_derive::Deserialize)]
pub(crate) struct RawSectionOffset {
    pub line: u32,
    pub column: u32,
}

#[cfg(test)]
mod tests {
    use super::RawSourceMap;
    use simd_json_derive::Deserialize;

    #[test]
    fn test_parse_success() {
        let mut bytes = br#"{
    "version":3,
    "file":"sum.js",
    "sources":["sum.ts"],
    "names":[],
    "mappings":";;;AAAO,IAAM,GAAG,GAAG,UAAC,CAAS,EAAE,CAAS,IAAK,OAAA,CAAC,GAAG,CAAC,EAAL,CAAK,CAAA;AAArC,QAAA,GAAG,OAAkC"
}"#.to_vec();
        RawSourceMap::from_slice(bytes.as_mut_slice()).unwrap();
    }

    #[test]
    fn test_parse_sections() {
        let mut bytes = br#"{
    "version":3,
    "sections":[
        {"offset":{"line":0,"column":0},"map":{"version":3,"sources":["a.ts"],"mappings":"AAAA"}},
        {"offset":{"line":10,"column":4},"url":"part2.js.map"}
    ]
}"#
        .to_vec();
        let raw = RawSourceMap::from_slice(bytes.as_mut_slice()).unwrap();
        let sections = raw.sections.unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].offset.line, 0);
        assert!(sections[0].map.is_some());
        assert_eq!(sections[1].offset.column, 4);
        assert_eq!(sections[1].url, Some("part2.js.map"));
    }

    #[test]
    fn test_parse_ignore_list_variants() {
        let mut bytes = br#"{"version":3,"sources":["a.js"],"mappings":"","x_google_ignoreList":[0]}"#
            .to_vec();
        let raw = RawSourceMap::from_slice(bytes.as_mut_slice()).unwrap();
        assert_eq!(raw.x_google_ignore_list, Some(vec![0]));

        let mut bytes =
            br#"{"version":3,"sources":["a.js"],"mappings":"","ignoreList":[0]}"#.to_vec();
        let raw = RawSourceMap::from_slice(bytes.as_mut_slice()).unwrap();
        assert_eq!(raw.ignore_list, Some(vec![0]));
    }

    #[test]
    fn test_parse_error() {
        // missing comma
        let mut bytes = br#"{
    "version":3,
    "names":[]
    "mappings":""
}"#
        .to_vec();
        assert!(RawSourceMap::from_slice(bytes.as_mut_slice()).is_err())
    }
}
