use kasane::{Mapping, ParseError, SourceMap};

const MAP_URL: &str = "https://example.com/assets/bundle.js.map";

fn parse(payload: serde_json::Value) -> SourceMap {
    SourceMap::parse(payload.to_string().into_bytes(), MAP_URL).unwrap()
}

#[test]
fn test_parse_rejects_broken_payloads() {
    assert!(matches!(
        SourceMap::parse(b"".to_vec(), MAP_URL),
        Err(ParseError::Syntax(..))
    ));
    assert!(matches!(
        SourceMap::parse(b"{}".to_vec(), MAP_URL),
        Err(ParseError::UnsupportedFormat)
    ));
    assert!(matches!(
        SourceMap::parse(br#"{"version":2,"mappings":""}"#.to_vec(), MAP_URL),
        Err(ParseError::UnsupportedFormat)
    ));
}

#[test]
fn test_parse_resolves_and_dedups_sources() {
    let sm = parse(serde_json::json!({
        "version": 3,
        "file": "bundle.js",
        "sourceRoot": "src",
        "sources": ["index.ts", "./index.ts", "lib/util.ts", null],
        "mappings": "AAAA,CCAA,CCAA",
    }));

    assert_eq!(sm.file(), Some("bundle.js"));
    // the two index.ts spellings canonicalize to one URL
    assert_eq!(
        sm.source_urls(),
        &[
            "https://example.com/assets/src/index.ts".to_owned(),
            "https://example.com/assets/src/lib/util.ts".to_owned(),
        ]
    );
    // per-slot URLs are retained for entries
    assert_eq!(sm.sources().len(), 4);
    assert_eq!(sm.source_url(1), Some("https://example.com/assets/src/index.ts"));
    assert_eq!(sm.source_url(3), None);
}

#[test]
fn test_parse_strips_bom() {
    let payload = br#"{"version":3,"sources":["a.ts"],"mappings":"AAAA"}"#;
    let mut with_bom = vec![0xEF, 0xBB, 0xBF];
    with_bom.extend_from_slice(payload);

    let plain = SourceMap::parse(payload.to_vec(), MAP_URL).unwrap();
    let bommed = SourceMap::parse(with_bom, MAP_URL).unwrap();

    assert_eq!(plain.source_urls(), bommed.source_urls());
    assert_eq!(plain.mappings().len(), bommed.mappings().len());
}

#[test]
fn test_parse_recovers_from_malformed_segments() {
    // a 2-field segment, a bad digit and an out-of-range source reference
    // drop only themselves
    let sm = parse(serde_json::json!({
        "version": 3,
        "sources": ["a.ts"],
        "mappings": "AAAA,AA,A*A;GCAA;GDAA",
    }));

    let mappings = sm.mappings();
    assert_eq!(
        &mappings[..],
        &[
            Mapping::new(0, 0).with_source(0, 0, 0),
            Mapping::new(2, 3).with_source(0, 0, 0),
        ]
    );
}

#[test]
fn test_parse_restores_entry_order() {
    // "E,D" walks the generated column backwards; the parsed map re-sorts
    let sm = parse(serde_json::json!({
        "version": 3,
        "sources": ["a.ts"],
        "mappings": "E,D",
    }));

    let positions: Vec<(u32, u32)> = sm
        .mappings()
        .iter()
        .map(|m| (m.generated().line, m.generated().column))
        .collect();
    assert_eq!(positions, [(0, 1), (0, 2)]);
}

#[test]
fn test_parse_sources_content() {
    let sm = parse(serde_json::json!({
        "version": 3,
        "sources": ["a.ts", "b.ts"],
        "sourcesContent": ["let a = 1;", null],
        "mappings": "AAAA",
    }));
    assert_eq!(sm.source_content(0), Some("let a = 1;"));
    assert_eq!(sm.source_content(1), None);

    let err = SourceMap::parse(
        serde_json::json!({
            "version": 3,
            "sources": ["a.ts", "b.ts"],
            "sourcesContent": ["let a = 1;"],
            "mappings": "",
        })
        .to_string()
        .into_bytes(),
        MAP_URL,
    );
    assert!(matches!(
        err,
        Err(ParseError::MismatchSourcesContent {
            sources_len: 2,
            sources_content_len: 1,
        })
    ));
}

#[test]
fn test_parse_names() {
    let sm = parse(serde_json::json!({
        "version": 3,
        "sources": ["a.ts"],
        "names": ["total", "add"],
        "mappings": "AAAAA,CAACC",
    }));

    let mappings = sm.mappings();
    assert_eq!(mappings[0].name_id(), Some(0));
    assert_eq!(mappings[1].name_id(), Some(1));
    assert_eq!(sm.name(1), Some("add"));
    assert_eq!(sm.name(2), None);
}

#[test]
fn test_parse_serializes_back() {
    let sm = parse(serde_json::json!({
        "version": 3,
        "file": "bundle.js",
        "sources": ["https://example.com/a.ts"],
        "names": ["x"],
        "mappings": "AAAAA;;EACE",
        "x_google_ignoreList": [0],
    }));

    let out = sm.to_string().unwrap();
    insta::assert_snapshot!(out, @r###"{"version":3,"file":"bundle.js","sources":["https://example.com/a.ts"],"sourcesContent":[null],"names":["x"],"mappings":"AAAAA;;EACE","ignoreList":[0]}"###);

    // the emitted JSON parses back to an equivalent map
    let reparsed = SourceMap::parse(out.into_bytes(), MAP_URL).unwrap();
    assert_eq!(&reparsed.mappings()[..], &sm.mappings()[..]);
    assert_eq!(reparsed.source_urls(), sm.source_urls());
    assert_eq!(reparsed.ignore_list(), sm.ignore_list());
}
