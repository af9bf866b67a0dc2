//! Citation entry handling for papershelf
//!
//! This crate deals with BibTeX only as far as the library needs it:
//! - Splitting a multi-entry file into raw entries, line by line
//! - Parsing one raw entry into its type, cite key and flat field map
//! - Rewriting the opening cite key of an exported entry
//!
//! Field values are cleaned (braces, quotes and trailing commas stripped) but
//! otherwise not interpreted; no macro expansion or LaTeX decoding happens here.

mod entry;
mod keys;
pub mod parser;
mod reader;

pub use entry::{CitationEntry, RawEntry};
pub use keys::{cite_key, replace_cite_key};
pub use parser::{parse_entry, EntryParseError};
pub use reader::EntryReader;
