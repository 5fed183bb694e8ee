//! Canonical source URL resolution.
//!
//! A raw `sources[i]` entry is interpreted against two bases: the map's
//! `sourceRoot` (when present) and the URL the map itself was retrieved
//! from. The rules collapse to: an absolute source always wins, an absolute
//! root anchors the source on its own, and a relative root merely prefixes
//! the source path before the map URL resolves it.

/// Whether the URL carries its own scheme (`https:`, `webpack:`, `file:`,
/// `data:`, ...).
fn has_scheme(url: &str) -> bool {
    let mut bytes = url.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    for b in bytes {
        match b {
            b':' => return true,
            b if b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.') => {}
            _ => return false,
        }
    }
    false
}

/// Splits an absolute URL into its `scheme://authority` prefix and path.
///
/// URLs without a `//` authority part (`data:`, `about:`) are opaque: the
/// whole URL is the prefix and the path is empty.
fn split_absolute(url: &str) -> (&str, &str) {
    let colon = match url.find(':') {
        Some(idx) => idx,
        None => return (url, ""),
    };
    let rest = &url[colon + 1..];
    match rest.strip_prefix("//") {
        Some(after) => {
            let authority_len = after
                .find(['/', '?', '#'])
                .unwrap_or(after.len());
            let split_at = colon + 3 + authority_len;
            (&url[..split_at], &url[split_at..])
        }
        None => (url, ""),
    }
}

/// Collapses `.` and `..` segments and duplicate slashes in a path.
///
/// In an absolute path, `..` segments that would climb above the root are
/// dropped; in a relative path they are kept so the path can still be
/// resolved against a base later.
fn normalize_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let trailing_slash = path.ends_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(&last) if last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    let mut out = String::with_capacity(path.len());
    if absolute {
        out.push('/');
    }
    out.push_str(&segments.join("/"));
    if trailing_slash && !segments.is_empty() {
        out.push('/');
    }
    out
}

fn normalize_absolute(url: &str) -> String {
    let (prefix, path) = split_absolute(url);
    if path.is_empty() {
        return url.to_owned();
    }
    let mut out = prefix.to_owned();
    out.push_str(&normalize_path(path));
    out
}

/// Resolves `relative` against the directory of `base_url`.
///
/// A `relative` starting with `/` replaces the whole path of the base. An
/// empty or relative `base_url` degrades gracefully: the combined path is
/// normalized but stays relative.
pub(crate) fn resolve_relative(base_url: &str, relative: &str) -> String {
    if base_url.is_empty() {
        return normalize_path(relative);
    }
    let (prefix, base_path) = if has_scheme(base_url) {
        split_absolute(base_url)
    } else {
        ("", base_url)
    };
    if relative.starts_with('/') {
        let mut out = prefix.to_owned();
        out.push_str(&normalize_path(relative));
        return out;
    }
    let dir = match base_path.rfind('/') {
        Some(idx) => &base_path[..=idx],
        None if prefix.is_empty() => "",
        None => "/",
    };
    let mut combined = String::with_capacity(dir.len() + relative.len());
    combined.push_str(dir);
    combined.push_str(relative);
    let mut out = prefix.to_owned();
    out.push_str(&normalize_path(&combined));
    out
}

/// Computes the canonical URL of a raw `sources[i]` entry.
///
/// `source_root` and `source_map_url` follow the resolution table:
///
/// 1. no root, relative source: resolve against the map URL's directory
/// 2. no root, absolute source: the source, normalized
/// 3. relative root, relative source: prefix with the root, then resolve
///    against the map URL's directory
/// 4. relative root, absolute source: the source, normalized
/// 5. absolute root, relative source: append to the root, not the map URL
/// 6. absolute root, absolute source: the source, normalized
///
/// A source starting with `/` is root-relative to whichever base applies
/// and ignores that base's path. An empty `source_root` counts as absent; a
/// trailing slash on it never doubles up in the result.
pub fn resolve_source_url(source: &str, source_root: Option<&str>, source_map_url: &str) -> String {
    if has_scheme(source) {
        return normalize_absolute(source);
    }
    match source_root.filter(|root| !root.is_empty()) {
        Some(root) if has_scheme(root) => {
            let (prefix, root_path) = split_absolute(root);
            let path = if source.starts_with('/') {
                normalize_path(source)
            } else {
                let mut combined = root_path.trim_end_matches('/').to_owned();
                combined.push('/');
                combined.push_str(source);
                normalize_path(&combined)
            };
            let mut out = prefix.to_owned();
            out.push_str(&path);
            out
        }
        Some(root) => {
            if source.starts_with('/') {
                // root-relative sources drop the relative root entirely
                resolve_relative(source_map_url, source)
            } else {
                let mut combined = root.trim_end_matches('/').to_owned();
                combined.push('/');
                combined.push_str(source);
                resolve_relative(source_map_url, &combined)
            }
        }
        None => resolve_relative(source_map_url, source),
    }
}
