//! Metadata Gateway
//!
//! [`MetadataGateway`] sits between the library and a [`CatalogClient`]. Every
//! successful lookup is cached for the life of the gateway, so asking twice
//! for the same bibcode or arXiv id only reaches the catalog once. The number
//! of catalog round trips is observable through [`MetadataGateway::query_count`].
//!
//! The gateway is built once and handed to the library; nothing here is
//! process-global.

mod static_catalog;

pub use static_catalog::StaticCatalog;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use papershelf_identifiers::{parse_identifier, Identifier};
use thiserror::Error;
use tracing::debug;

use crate::paper::PaperMetadata;

/// Failures reported by a catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("catalog has no match for {0}")]
    NotFound(String),

    #[error("catalog rate limit exceeded")]
    RateLimited,

    #[error("catalog rejected the credentials: {0}")]
    Auth(String),

    #[error("catalog unavailable: {0}")]
    Transient(String),
}

/// Bibliographic fields used to look a paper up when no identifier is known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldQuery {
    /// Last name of the first author
    pub first_author: Option<String>,
    pub title: String,
    pub journal: Option<String>,
    pub year: Option<String>,
    pub volume: Option<String>,
    /// First page only; ranges are cut at the dash
    pub page: Option<String>,
}

/// A lookup that resolves to a bibcode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogQuery {
    Preprint(String),
    Doi(String),
    Fields(FieldQuery),
}

/// A scholarly catalog: looks papers up and returns their metadata.
pub trait CatalogClient {
    /// Full metadata for a bibcode.
    fn fetch(&self, bibcode: &str) -> Result<PaperMetadata, GatewayError>;

    /// Resolve a query to a single bibcode.
    fn search(&self, query: &CatalogQuery) -> Result<String, GatewayError>;
}

/// Caching front for a [`CatalogClient`].
pub struct MetadataGateway {
    client: Box<dyn CatalogClient>,
    metadata: RefCell<HashMap<String, PaperMetadata>>,
    lookups: RefCell<HashMap<CatalogQuery, String>>,
    queries: Cell<usize>,
}

impl MetadataGateway {
    pub fn new(client: impl CatalogClient + 'static) -> Self {
        Self::from_boxed(Box::new(client))
    }

    pub fn from_boxed(client: Box<dyn CatalogClient>) -> Self {
        Self {
            client,
            metadata: RefCell::new(HashMap::new()),
            lookups: RefCell::new(HashMap::new()),
            queries: Cell::new(0),
        }
    }

    /// Number of requests that actually reached the catalog.
    pub fn query_count(&self) -> usize {
        self.queries.get()
    }

    /// Metadata for a bibcode, from cache when possible.
    pub fn fetch_metadata(&self, bibcode: &str) -> Result<PaperMetadata, GatewayError> {
        if let Some(cached) = self.metadata.borrow().get(bibcode) {
            debug!(bibcode, "metadata cache hit");
            return Ok(cached.clone());
        }
        debug!(bibcode, "metadata cache miss");
        self.bump();
        let metadata = self.client.fetch(bibcode)?;
        self.metadata
            .borrow_mut()
            .insert(bibcode.to_string(), metadata.clone());
        Ok(metadata)
    }

    /// Bibcode for an arXiv id.
    pub fn resolve_preprint(&self, arxiv_id: &str) -> Result<String, GatewayError> {
        self.lookup(CatalogQuery::Preprint(arxiv_id.to_string()))
    }

    /// Bibcode for a DOI.
    pub fn resolve_doi(&self, doi: &str) -> Result<String, GatewayError> {
        self.lookup(CatalogQuery::Doi(doi.to_string()))
    }

    /// Bibcode for a set of bibliographic fields.
    pub fn resolve_fields(&self, fields: &FieldQuery) -> Result<String, GatewayError> {
        self.lookup(CatalogQuery::Fields(fields.clone()))
    }

    /// Ask the catalog again for an arXiv id's bibcode, replacing any cached
    /// answer.
    pub fn refresh_preprint(&self, arxiv_id: &str) -> Result<String, GatewayError> {
        let query = CatalogQuery::Preprint(arxiv_id.to_string());
        self.bump();
        let bibcode = self.client.search(&query)?;
        self.lookups.borrow_mut().insert(query, bibcode.clone());
        Ok(bibcode)
    }

    /// Turn free text into a bibcode.
    ///
    /// arXiv ids go through the catalog; ADS URLs and bare bibcodes are
    /// returned without validation.
    pub fn resolve_identifier(&self, text: &str) -> crate::Result<String> {
        match parse_identifier(text)? {
            Identifier::Preprint(arxiv_id) => Ok(self.resolve_preprint(&arxiv_id)?),
            Identifier::Bibcode(bibcode) => Ok(bibcode),
        }
    }

    fn lookup(&self, query: CatalogQuery) -> Result<String, GatewayError> {
        if let Some(bibcode) = self.lookups.borrow().get(&query) {
            debug!(?query, "lookup cache hit");
            return Ok(bibcode.clone());
        }
        debug!(?query, "lookup cache miss");
        self.bump();
        let bibcode = self.client.search(&query)?;
        self.lookups.borrow_mut().insert(query, bibcode.clone());
        Ok(bibcode)
    }

    fn bump(&self) {
        self.queries.set(self.queries.get() + 1);
    }
}

impl std::fmt::Debug for MetadataGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataGateway")
            .field("cached_metadata", &self.metadata.borrow().len())
            .field("cached_lookups", &self.lookups.borrow().len())
            .field("queries", &self.queries.get())
            .finish()
    }
}
