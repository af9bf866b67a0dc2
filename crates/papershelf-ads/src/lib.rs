//! NASA ADS (Astrophysics Data System) catalog client
//!
//! API docs: https://ui.adsabs.harvard.edu/help/api/
//! Rate limit: 5000 requests/day, 5 requests/second burst
//!
//! [`AdsClient`] implements [`papershelf_core::CatalogClient`], so it can be
//! handed straight to a [`papershelf_core::MetadataGateway`]:
//!
//! ```no_run
//! use papershelf_ads::AdsClient;
//! use papershelf_core::{AdsConfig, MetadataGateway};
//!
//! let client = AdsClient::from_config(&AdsConfig::default())?;
//! let gateway = MetadataGateway::new(client);
//! let bibcode = gateway.resolve_preprint("1804.09819")?;
//! # Ok::<(), papershelf_core::GatewayError>(())
//! ```

mod client;
mod query;
mod response;

pub use client::AdsClient;
pub use query::catalog_query_string;
