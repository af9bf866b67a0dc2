//! Catalog re-sync
//!
//! Papers added while still preprints carry the unpublished sentinel. Once the
//! journal version appears, ADS usually assigns a new bibcode, so re-syncing
//! may move a paper to a new key.

use chrono::{Duration, Utc};
use rusqlite::params;
use tracing::{info, warn};

use super::{LocalState, Library};
use crate::error::{storage, LibraryError, Result};

/// What [`Library::resync`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResyncOutcome {
    /// The bibcode is unchanged; only the sync time moved
    Touched,
    /// The paper now lives under a new bibcode
    Rekeyed { old: String, new: String },
}

/// Result of re-syncing every stale unpublished paper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Papers that were due for a re-sync
    pub checked: usize,
    pub touched: usize,
    /// `(old, new)` bibcode pairs
    pub rekeyed: Vec<(String, String)>,
    /// `(bibcode, reason)` pairs
    pub failed: Vec<(String, String)>,
}

impl Library {
    /// Ask the catalog for a paper's current bibcode and follow it.
    ///
    /// Papers without an arXiv id cannot be looked up again and are only
    /// touched. When the bibcode changed, the paper is stored again under the
    /// new bibcode with fresh metadata, keeping the user's notes, local file,
    /// tags, and citation keyword if it was customized. The move happens in
    /// one transaction: on any failure the old paper is left as it was.
    pub fn resync(&self, bibcode: &str) -> Result<ResyncOutcome> {
        let record = self.record(bibcode)?;

        let arxiv_id = match &record.arxiv_id {
            Some(id) => id.clone(),
            None => {
                self.touch(bibcode)?;
                return Ok(ResyncOutcome::Touched);
            }
        };

        let new_bibcode = self.gateway().refresh_preprint(&arxiv_id)?;
        if new_bibcode == bibcode {
            self.touch(bibcode)?;
            return Ok(ResyncOutcome::Touched);
        }
        if self.contains(&new_bibcode)? {
            return Err(LibraryError::DuplicateRecord(new_bibcode));
        }

        let mut metadata = self.gateway().fetch_metadata(&new_bibcode)?;
        metadata.bibcode = new_bibcode.clone();

        let local = LocalState {
            citation_keyword: (record.citation_keyword != record.bibcode)
                .then(|| record.citation_keyword.clone()),
            local_file: record.local_file.clone(),
            user_notes: record.user_notes.clone(),
        };

        let tx = self
            .conn()
            .unchecked_transaction()
            .map_err(storage("begin tx"))?;
        // Foreign key CASCADE drops the old memberships
        tx.execute("DELETE FROM papers WHERE bibcode = ?1", params![bibcode])
            .map_err(storage("delete old"))?;
        Self::insert_paper(&tx, &metadata, &local, Utc::now())?;
        for tag in &record.tags {
            tx.execute(
                "INSERT INTO paper_tags (bibcode, tag_id)
                 SELECT ?1, id FROM tags WHERE name = ?2",
                params![new_bibcode, tag],
            )
            .map_err(storage("carry tag"))?;
        }
        tx.commit().map_err(storage("commit"))?;

        info!(old = bibcode, new = %new_bibcode, "paper moved to new bibcode");
        Ok(ResyncOutcome::Rekeyed {
            old: bibcode.to_string(),
            new: new_bibcode,
        })
    }

    /// Re-sync every unpublished paper whose last sync is older than the
    /// configured threshold.
    ///
    /// Individual failures are logged and collected; they do not stop the
    /// remaining papers from being re-synced.
    pub fn refresh_stale(&self) -> Result<SyncReport> {
        let cutoff = Utc::now() - Duration::hours(i64::from(self.sync.stale_after_hours));
        let mut stmt = self
            .conn()
            .prepare(
                "SELECT bibcode FROM papers
                 WHERE page = '-1' AND update_time < ?1
                 ORDER BY bibcode",
            )
            .map_err(storage("prepare stale"))?;
        let stale = stmt
            .query_map(params![cutoff.timestamp_millis()], |row| row.get(0))
            .map_err(storage("query stale"))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(storage("read stale"))?;
        drop(stmt);

        let mut report = SyncReport {
            checked: stale.len(),
            ..SyncReport::default()
        };
        for bibcode in stale {
            match self.resync(&bibcode) {
                Ok(ResyncOutcome::Touched) => report.touched += 1,
                Ok(ResyncOutcome::Rekeyed { old, new }) => report.rekeyed.push((old, new)),
                Err(e) => {
                    warn!(bibcode = %bibcode, error = %e, "re-sync failed");
                    report.failed.push((bibcode, e.to_string()));
                }
            }
        }
        Ok(report)
    }

    /// Mark a paper as synced now.
    pub(crate) fn touch(&self, bibcode: &str) -> Result<()> {
        let rows = self
            .conn()
            .execute(
                "UPDATE papers SET update_time = ?1 WHERE bibcode = ?2",
                params![Utc::now().timestamp_millis(), bibcode],
            )
            .map_err(storage("touch"))?;
        if rows == 0 {
            return Err(LibraryError::RecordNotFound(bibcode.to_string()));
        }
        Ok(())
    }
}
