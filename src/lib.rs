//! Tmploc - localization core for HTML template files
//!
//! Parses HTML templates with embedded `<% %>` code, extracts the
//! translatable strings into resources, and re-assembles localized copies
//! of the files from a translation store. The document is sliced into
//! literal and localizable segments such that concatenating them
//! reproduces the source, so extraction and re-assembly share one parse.
//!
//! ## Module Structure
//!
//! - `tokenizer`: event-based scanner for HTML plus template tags
//! - `segmenter`: run segmentation state machine and string extraction
//! - `localize`: localized re-assembly and output path derivation
//! - `resource`: extracted string resources and the set collecting them
//! - `keys`: resource-key hashing shared with the other extractors
//! - `tags`: per-tag capability tables
//! - `text`: whitespace classification and escaping helpers

pub mod keys;
pub mod localize;
pub mod resource;
pub mod segmenter;
pub mod tags;
pub mod text;
pub mod tokenizer;

pub use localize::{LocalizeOptions, TranslationEntry, TranslationLookup, Translations};
pub use resource::{Resource, TranslationSet};
pub use segmenter::{Segment, TemplateFile};
