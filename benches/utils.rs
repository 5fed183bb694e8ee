use kasane::{Mapping, Mappings, SourceMap};

fn synthetic_map(lines: u32, segments_per_line: u32) -> SourceMap {
    let sources = (0..8)
        .map(|i| Some(format!("https://example.com/src/mod{i}.ts")))
        .collect();
    let names = (0..16).map(|i| format!("name{i}")).collect();

    let mut raw = Vec::with_capacity((lines * segments_per_line) as usize);
    for line in 0..lines {
        for seg in 0..segments_per_line {
            let mut mapping =
                Mapping::new(line, seg * 7).with_source((line + seg) % 8, line / 2, seg * 3);
            if seg % 3 == 0 {
                mapping = mapping.with_name(seg / 3 % 16);
            }
            raw.push(mapping);
        }
    }

    SourceMap::builder()
        .with_sources(sources)
        .with_names(names)
        .with_mappings(Mappings::new(raw))
        .build()
        .unwrap()
}

/// A serialized minified-style map: `lines` generated lines, each carrying
/// `segments_per_line` mappings cycling through a handful of sources and
/// names.
pub fn synthetic_payload(lines: u32, segments_per_line: u32) -> Vec<u8> {
    synthetic_map(lines, segments_per_line).to_vec().unwrap()
}
