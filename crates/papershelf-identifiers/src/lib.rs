//! Identifier recognition for papershelf
//!
//! This crate turns the heterogeneous strings a user pastes into the library
//! into one of two shapes the catalog understands:
//! - arXiv preprint ids (`1804.09819`), found anywhere in the text
//! - ADS bibcodes, either taken from an ADS abstract URL or given directly
//!
//! It also cleans up DOIs found in BibTeX fields. Nothing here performs I/O;
//! turning an arXiv id into a bibcode is the catalog's job.

pub mod extractors;
pub mod resolver;

pub use extractors::*;
pub use resolver::*;
