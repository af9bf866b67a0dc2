//! papershelf-core: the data layer of the papershelf reference manager
//!
//! This crate provides:
//! - A SQLite-backed [`Library`] of papers keyed by ADS bibcode
//! - Tags: user-named boolean labels with rename/delete that keep membership
//! - A caching [`MetadataGateway`] in front of any [`CatalogClient`]
//! - Re-sync of preprints whose bibcode changed on publication
//! - Short citation strings and BibTeX export
//! - Bulk BibTeX import with per-entry fallback lookups and a failure report
//!
//! ```no_run
//! use papershelf_core::{Library, LibraryConfig, MetadataGateway, StaticCatalog};
//!
//! let config = LibraryConfig::default();
//! let gateway = MetadataGateway::new(StaticCatalog::new());
//! let library = Library::open(&config.database, gateway, &config)?;
//! println!("{} papers", library.count()?);
//! # Ok::<(), papershelf_core::LibraryError>(())
//! ```

pub mod citation;
pub mod config;
pub mod error;
pub mod export;
pub mod gateway;
pub mod import;
pub mod library;
pub mod paper;

pub use config::{AdsConfig, ConfigError, ImportConfig, LibraryConfig, SyncConfig};
pub use error::{LibraryError, Result};
pub use gateway::{
    CatalogClient, CatalogQuery, FieldQuery, GatewayError, MetadataGateway, StaticCatalog,
};
pub use import::ImportSummary;
pub use library::{Library, ResyncOutcome, SyncReport, ALL_PAPERS, RESERVED_TAG_CHARS, UNREAD};
pub use paper::{AttributeValue, Field, Page, PaperMetadata, PaperRecord};
