//! # kasane
//!
//! This crate implements the protocol-independent core of a debugger
//! front-end's source map support: parsing, position resolution in both
//! directions, and ignore-list analysis.
//!
//! ## Getting Started
//!
//! ```ignore
//! use kasane::SourceMap;
//!
//! // Parse a source map fetched from `url`
//! let sm = SourceMap::parse(buf, url).unwrap();
//!
//! // Resolve a generated position (line 10, column 12) back to its source
//! let found = sm.find_entry((10, 12)).unwrap();
//!
//! println!("Found mapping at (10, 12): {found:?}");
//! // Expected output: "Found mapping at (10, 12): 10:12 -> 1:6:8"
//! ```
//!
//! ## Overview
//!
//! ### `SourceMap`
//!
//! [SourceMap] owns the decoded, generated-position-sorted mapping entries
//! of one map (single-map or index-map payloads alike) together with the
//! canonicalized source tables. It answers forward queries
//! ([find_entry](SourceMap::find_entry), [finder](SourceMap::finder)),
//! reverse queries ([source_line_mapping](SourceMap::source_line_mapping),
//! [find_reverse_ranges](SourceMap::find_reverse_ranges),
//! [find_reverse_entries](SourceMap::find_reverse_entries)) and
//! ignore-list queries
//! ([has_ignore_list_hint](SourceMap::has_ignore_list_hint),
//! [find_ranges](SourceMap::find_ranges)).
//!
//! ### `Position`, `Mapping`, `Range`
//!
//! [Position] is a 0-based line/column pair. [Mapping] is one decoded item
//! of the `mappings` string. [Range] is a region of generated text, with
//! [Position::UNBOUNDED] marking an end no later mapping terminates.
//!
//! ### URL resolution
//!
//! Raw `sources` entries are resolved to canonical URLs against the map's
//! `sourceRoot` and retrieval URL ([resolve_source_url]); queries speak
//! canonical URLs, and identical resolutions collapse in
//! [source_urls](SourceMap::source_urls).
//!
//! ### Loading
//!
//! Fetching payloads is delegated to the [PayloadLoader] the caller
//! supplies; the crate itself performs no I/O.

mod error;
mod finder;
mod ignore;
mod loader;
mod mapping;
mod mappings;
mod resolve;
mod reverse;
mod sourcemap;
mod splitter;
mod vlq;

pub use error::*;
pub use finder::MappingFinder;
pub use ignore::FindRangesOptions;
pub use loader::*;
pub use mapping::*;
pub use mappings::Mappings;
pub use resolve::resolve_source_url;
pub use sourcemap::*;
