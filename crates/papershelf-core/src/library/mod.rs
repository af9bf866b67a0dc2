//! Record Store
//!
//! [`Library`] owns the SQLite database holding every paper, the tag registry
//! and tag membership. The schema is fixed:
//!
//! - `papers`: one row per paper, keyed by bibcode
//! - `tags`: registered tag names, unique ignoring case
//! - `paper_tags`: which papers carry which tags
//!
//! Tag names never become SQL identifiers, so any text the user types is safe
//! to store. Every mutation is a single statement or a single transaction and
//! is durable when the call returns.

mod attributes;
mod sync;
mod tags;

pub use sync::{ResyncOutcome, SyncReport};
pub use tags::{ALL_PAPERS, RESERVED_TAG_CHARS, UNREAD};

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use crate::config::{ImportConfig, LibraryConfig, SyncConfig};
use crate::error::{storage, LibraryError, Result};
use crate::gateway::MetadataGateway;
use crate::paper::{Page, PaperMetadata, PaperRecord, AUTHOR_SEPARATOR, NO_ARXIV_ID};

const PAPER_COLUMNS: &str = "bibcode, title, authors, pubdate, journal, volume, page, abstract, \
     bibtex, arxiv_id, citation_keyword, update_time, local_file, user_notes";

/// User state that survives a paper being stored again under a new bibcode.
#[derive(Debug, Clone, Default)]
pub(crate) struct LocalState {
    pub citation_keyword: Option<String>,
    pub local_file: Option<PathBuf>,
    pub user_notes: Option<String>,
}

/// A library of papers backed by SQLite.
pub struct Library {
    conn: Connection,
    gateway: MetadataGateway,
    sync: SyncConfig,
    import: ImportConfig,
}

impl Library {
    /// Open (or create) a library at the given path.
    ///
    /// When `config.sync.resync_on_open` is set, stale unpublished papers are
    /// re-synced before this returns. Failures there are logged, not raised.
    pub fn open(path: &Path, gateway: MetadataGateway, config: &LibraryConfig) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(storage("open"))?;
        let library = Self::init_with_connection(conn, gateway, config)?;

        if config.sync.resync_on_open {
            match library.refresh_stale() {
                Ok(report) if report.checked > 0 => info!(
                    checked = report.checked,
                    rekeyed = report.rekeyed.len(),
                    failed = report.failed.len(),
                    "startup re-sync finished"
                ),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "startup re-sync skipped"),
            }
        }
        Ok(library)
    }

    /// Create an in-memory library (for testing).
    pub fn open_in_memory(gateway: MetadataGateway) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage("open_in_memory"))?;
        Self::init_with_connection(conn, gateway, &LibraryConfig::default())
    }

    fn init_with_connection(
        conn: Connection,
        gateway: MetadataGateway,
        config: &LibraryConfig,
    ) -> Result<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn,
            gateway,
            sync: config.sync.clone(),
            import: config.import.clone(),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS papers (
                bibcode TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                authors TEXT NOT NULL,
                pubdate TEXT NOT NULL,
                journal TEXT NOT NULL,
                volume INTEGER NOT NULL,
                page TEXT NOT NULL,
                abstract TEXT NOT NULL,
                bibtex TEXT NOT NULL,
                arxiv_id TEXT NOT NULL,
                citation_keyword TEXT NOT NULL UNIQUE,
                update_time INTEGER NOT NULL,
                local_file TEXT,
                user_notes TEXT
            );

            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE COLLATE NOCASE
            );

            CREATE TABLE IF NOT EXISTS paper_tags (
                bibcode TEXT NOT NULL
                    REFERENCES papers(bibcode) ON UPDATE CASCADE ON DELETE CASCADE,
                tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                PRIMARY KEY (bibcode, tag_id)
            );

            CREATE INDEX IF NOT EXISTS idx_paper_tags_tag ON paper_tags(tag_id);
            CREATE INDEX IF NOT EXISTS idx_papers_page ON papers(page);
            ",
        )
        .map_err(storage("init_schema"))
    }

    /// The gateway this library fetches metadata through.
    pub fn gateway(&self) -> &MetadataGateway {
        &self.gateway
    }

    /// Add a paper from any recognized identifier and return its bibcode.
    pub fn add(&self, identifier: &str) -> Result<String> {
        let bibcode = self.gateway.resolve_identifier(identifier)?;
        self.add_bibcode(&bibcode)?;
        Ok(bibcode)
    }

    /// Add a paper by bibcode.
    ///
    /// The library is checked before the catalog is asked for metadata, so
    /// adding a paper twice costs no catalog queries.
    pub fn add_bibcode(&self, bibcode: &str) -> Result<()> {
        if self.contains(bibcode)? {
            return Err(LibraryError::DuplicateRecord(bibcode.to_string()));
        }
        let mut metadata = self.gateway.fetch_metadata(bibcode)?;
        metadata.bibcode = bibcode.to_string();

        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(storage("begin tx"))?;
        Self::insert_paper(&tx, &metadata, &LocalState::default(), Utc::now())?;
        // New papers start out unread
        tx.execute(
            "INSERT INTO paper_tags (bibcode, tag_id)
             SELECT ?1, id FROM tags WHERE name = ?2",
            params![bibcode, UNREAD],
        )
        .map_err(storage("tag unread"))?;
        tx.commit().map_err(storage("commit"))?;

        info!(bibcode, "added paper");
        Ok(())
    }

    /// Insert one paper row.
    pub(crate) fn insert_paper(
        conn: &Connection,
        metadata: &PaperMetadata,
        local: &LocalState,
        update_time: DateTime<Utc>,
    ) -> Result<()> {
        let citation_keyword = local
            .citation_keyword
            .clone()
            .unwrap_or_else(|| metadata.bibcode.clone());
        let local_file = local
            .local_file
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        conn.execute(
            &format!(
                "INSERT INTO papers ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                PAPER_COLUMNS
            ),
            params![
                metadata.bibcode,
                metadata.title,
                metadata.authors.join(AUTHOR_SEPARATOR),
                metadata.pubdate,
                metadata.journal,
                metadata.volume,
                metadata.page.to_stored(),
                metadata.abstract_text,
                metadata.bibtex,
                metadata.arxiv_id.as_deref().unwrap_or(NO_ARXIV_ID),
                citation_keyword,
                update_time.timestamp_millis(),
                local_file,
                local.user_notes,
            ],
        )
        .map_err(|e| {
            if let Some(constraint) = constraint_violation(&e) {
                if constraint.contains("citation_keyword") {
                    return LibraryError::DuplicateValue {
                        attribute: "citation_keyword".to_string(),
                        value: citation_keyword.clone(),
                    };
                }
                return LibraryError::DuplicateRecord(metadata.bibcode.clone());
            }
            LibraryError::Storage(format!("insert: {}", e))
        })?;
        Ok(())
    }

    /// Whether a paper with this bibcode is stored.
    pub fn contains(&self, bibcode: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM papers WHERE bibcode = ?1",
                params![bibcode],
                |row| row.get(0),
            )
            .map_err(storage("contains"))?;
        Ok(count > 0)
    }

    /// Remove a paper and its tag memberships.
    pub fn delete(&self, bibcode: &str) -> Result<()> {
        // Foreign key CASCADE handles paper_tags
        let rows = self
            .conn
            .execute("DELETE FROM papers WHERE bibcode = ?1", params![bibcode])
            .map_err(storage("delete"))?;
        if rows == 0 {
            return Err(LibraryError::RecordNotFound(bibcode.to_string()));
        }
        info!(bibcode, "deleted paper");
        Ok(())
    }

    /// Number of stored papers.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM papers", [], |row| row.get(0))
            .map_err(storage("count"))?;
        Ok(count as usize)
    }

    /// Every stored bibcode, sorted.
    pub fn list_keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT bibcode FROM papers ORDER BY bibcode")
            .map_err(storage("prepare list"))?;
        let keys = stmt
            .query_map([], |row| row.get(0))
            .map_err(storage("query list"))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(storage("read list"))?;
        Ok(keys)
    }

    /// Typed snapshot of one paper, tags included.
    pub fn record(&self, bibcode: &str) -> Result<PaperRecord> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {} FROM papers WHERE bibcode = ?1", PAPER_COLUMNS),
                params![bibcode],
                row_to_record,
            )
            .optional()
            .map_err(storage("query record"))?;

        match record {
            Some(mut record) => {
                record.tags = self.tags_of(bibcode)?;
                Ok(record)
            }
            None => Err(LibraryError::RecordNotFound(bibcode.to_string())),
        }
    }

    /// Fail with `RecordNotFound` unless the paper is stored.
    pub(crate) fn require(&self, bibcode: &str) -> Result<()> {
        if self.contains(bibcode)? {
            Ok(())
        } else {
            Err(LibraryError::RecordNotFound(bibcode.to_string()))
        }
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn import_config(&self) -> &ImportConfig {
        &self.import
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("gateway", &self.gateway)
            .field("sync", &self.sync)
            .field("import", &self.import)
            .finish_non_exhaustive()
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<PaperRecord> {
    let authors: String = row.get(2)?;
    let page: String = row.get(6)?;
    let arxiv_id: String = row.get(9)?;
    let update_time: i64 = row.get(11)?;
    let local_file: Option<String> = row.get(12)?;

    Ok(PaperRecord {
        bibcode: row.get(0)?,
        title: row.get(1)?,
        authors: split_authors(&authors),
        pubdate: row.get(3)?,
        journal: row.get(4)?,
        volume: row.get(5)?,
        page: Page::from_stored(&page),
        abstract_text: row.get(7)?,
        bibtex: row.get(8)?,
        arxiv_id: (arxiv_id != NO_ARXIV_ID).then_some(arxiv_id),
        citation_keyword: row.get(10)?,
        update_time: millis_to_datetime(update_time),
        local_file: local_file.map(PathBuf::from),
        user_notes: row.get(13)?,
        tags: Vec::new(),
    })
}

pub(crate) fn split_authors(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(AUTHOR_SEPARATOR).map(str::to_string).collect()
}

pub(crate) fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
}

/// The failed constraint's message, if `e` is a constraint violation.
pub(crate) fn constraint_violation(e: &rusqlite::Error) -> Option<String> {
    if let rusqlite::Error::SqliteFailure(err, message) = e {
        if err.code == rusqlite::ErrorCode::ConstraintViolation {
            return Some(message.clone().unwrap_or_default());
        }
    }
    None
}
