//! Blocking HTTP client for the ADS API

use std::time::Duration;

use papershelf_core::{AdsConfig, CatalogClient, CatalogQuery, GatewayError, PaperMetadata};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::query::{bibcode_query, catalog_query_string};
use crate::response::{AdsDocument, ExportResponse, SearchResponse, METADATA_FIELDS};

/// A [`CatalogClient`] talking to NASA ADS.
#[derive(Debug, Clone)]
pub struct AdsClient {
    client: Client,
    base_url: String,
    token: String,
}

impl AdsClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("papershelf/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Transient(format!("could not build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Build a client from configuration; fails without an API token.
    pub fn from_config(config: &AdsConfig) -> Result<Self, GatewayError> {
        let token = config.resolved_token().ok_or_else(|| {
            GatewayError::Auth(
                "no API token; set ADS_API_TOKEN or `token` under [ads] in the config file"
                    .to_string(),
            )
        })?;
        Self::new(
            &config.base_url,
            &token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn search_first(&self, q: &str, fields: &str) -> Result<Option<AdsDocument>, GatewayError> {
        let url = format!(
            "{}/search/query?q={}&fl={}&rows=1",
            self.base_url,
            urlencoding::encode(q),
            fields
        );
        debug!(q, "ADS search");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .map_err(request_error)?;
        let parsed: SearchResponse = read_json(check_status(response, q)?)?;
        Ok(parsed.into_first())
    }

    fn export_bibtex(&self, bibcode: &str) -> Result<String, GatewayError> {
        let url = format!("{}/export/bibtex", self.base_url);
        debug!(bibcode, "ADS export");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "bibcode": [bibcode] }))
            .send()
            .map_err(request_error)?;
        let parsed: ExportResponse = read_json(check_status(response, bibcode)?)?;
        Ok(parsed.export)
    }
}

impl CatalogClient for AdsClient {
    fn fetch(&self, bibcode: &str) -> Result<PaperMetadata, GatewayError> {
        let doc = self
            .search_first(&bibcode_query(bibcode), METADATA_FIELDS)?
            .ok_or_else(|| GatewayError::NotFound(bibcode.to_string()))?;
        let bibtex = self.export_bibtex(&doc.bibcode)?;
        doc.into_metadata(bibtex)
    }

    fn search(&self, query: &CatalogQuery) -> Result<String, GatewayError> {
        let q = catalog_query_string(query);
        self.search_first(&q, "bibcode")?
            .map(|doc| doc.bibcode)
            .ok_or(GatewayError::NotFound(q))
    }
}

fn request_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Transient("request timed out".to_string())
    } else if e.is_connect() {
        GatewayError::Transient(format!("could not connect: {}", e))
    } else {
        GatewayError::Transient(e.to_string())
    }
}

fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    response
        .json()
        .map_err(|e| GatewayError::Transient(format!("unreadable response: {}", e)))
}

fn check_status(response: Response, what: &str) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(status_error(status, what, &body))
}

/// Map a failed HTTP status to the gateway taxonomy.
pub(crate) fn status_error(status: StatusCode, what: &str, body: &str) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GatewayError::Auth(format!("HTTP {}", status.as_u16()))
        }
        StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited,
        StatusCode::NOT_FOUND => GatewayError::NotFound(what.to_string()),
        s if s.is_server_error() => GatewayError::Transient(format!("HTTP {}", s.as_u16())),
        // A malformed query has no match either
        s => GatewayError::NotFound(format!("{} (HTTP {}: {})", what, s.as_u16(), body.trim())),
    }
}
