//! Tag Subsystem
//!
//! Tags are user-named boolean labels. The registry is the `tags` table and
//! membership lives in `paper_tags`; a paper without a row for a tag simply
//! does not carry it. Names compare and sort ignoring case but are stored as
//! typed.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::{constraint_violation, Library};
use crate::error::{storage, LibraryError, Result};
use crate::paper::Field;

/// Pseudo-tag meaning "no filter".
pub const ALL_PAPERS: &str = "All Papers";

/// Tag given to every newly added paper, when registered.
pub const UNREAD: &str = "unread";

/// Characters a tag name may not contain.
pub const RESERVED_TAG_CHARS: [char; 3] = ['`', '[', ']'];

fn validate_tag_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LibraryError::InvalidValue(
            "tag name cannot be empty".to_string(),
        ));
    }
    if let Some(c) = name.chars().find(|c| RESERVED_TAG_CHARS.contains(c)) {
        return Err(LibraryError::InvalidValue(format!(
            "tag name '{}' contains reserved character '{}'",
            name, c
        )));
    }
    if name.eq_ignore_ascii_case(ALL_PAPERS) {
        return Err(LibraryError::InvalidValue(format!(
            "'{}' is reserved",
            ALL_PAPERS
        )));
    }
    if Field::is_reserved(name) {
        return Err(LibraryError::InvalidValue(format!(
            "'{}' is a paper attribute",
            name
        )));
    }
    Ok(())
}

fn lookup_tag(conn: &Connection, name: &str) -> Result<Option<i64>> {
    conn.query_row("SELECT id FROM tags WHERE name = ?1", params![name], |row| {
        row.get(0)
    })
    .optional()
    .map_err(storage("lookup tag"))
}

fn register_tag(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name])
        .map_err(|e| {
            if constraint_violation(&e).is_some() {
                return LibraryError::DuplicateValue {
                    attribute: "tag".to_string(),
                    value: name.to_string(),
                };
            }
            LibraryError::Storage(format!("insert tag: {}", e))
        })?;
    Ok(conn.last_insert_rowid())
}

fn copy_membership(conn: &Connection, from: i64, to: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO paper_tags (bibcode, tag_id)
         SELECT bibcode, ?2 FROM paper_tags WHERE tag_id = ?1",
        params![from, to],
    )
    .map_err(storage("copy membership"))?;
    Ok(())
}

fn drop_tag(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("DELETE FROM paper_tags WHERE tag_id = ?1", params![id])
        .map_err(storage("delete membership"))?;
    conn.execute("DELETE FROM tags WHERE id = ?1", params![id])
        .map_err(storage("delete tag"))?;
    Ok(())
}

/// A name no registered tag uses, for moving a tag out of the way.
fn scratch_name(conn: &Connection, base: &str) -> Result<String> {
    let mut n = 0;
    loop {
        let candidate = format!("{} (renaming {})", base, n);
        if lookup_tag(conn, &candidate)?.is_none() {
            return Ok(candidate);
        }
        n += 1;
    }
}

impl Library {
    pub(crate) fn tag_id(&self, name: &str) -> Result<Option<i64>> {
        lookup_tag(self.conn(), name)
    }

    fn require_tag(&self, name: &str) -> Result<i64> {
        self.tag_id(name)?
            .ok_or_else(|| LibraryError::UnknownTag(name.to_string()))
    }

    /// Whether a tag is registered.
    pub fn has_tag(&self, name: &str) -> Result<bool> {
        Ok(self.tag_id(name)?.is_some())
    }

    /// Register a new tag. No paper carries it yet.
    pub fn create_tag(&self, name: &str) -> Result<()> {
        validate_tag_name(name)?;
        register_tag(self.conn(), name)?;
        info!(tag = name, "created tag");
        Ok(())
    }

    /// Remove a tag from the registry and from every paper.
    pub fn delete_tag(&self, name: &str) -> Result<()> {
        let tx = self
            .conn()
            .unchecked_transaction()
            .map_err(storage("begin tx"))?;
        let id = lookup_tag(&tx, name)?.ok_or_else(|| LibraryError::UnknownTag(name.to_string()))?;
        drop_tag(&tx, id)?;
        tx.commit().map_err(storage("commit"))?;
        info!(tag = name, "deleted tag");
        Ok(())
    }

    /// Rename a tag, keeping every paper's membership.
    ///
    /// The new name is registered, membership is copied across, then the old
    /// tag is dropped, all in one transaction. A rename that only changes
    /// letter case goes through a scratch name first, since the registry
    /// treats both spellings as the same tag.
    pub fn rename_tag(&self, old: &str, new: &str) -> Result<()> {
        validate_tag_name(new)?;
        if old == new {
            self.require_tag(old)?;
            return Ok(());
        }

        let tx = self
            .conn()
            .unchecked_transaction()
            .map_err(storage("begin tx"))?;
        let mut source =
            lookup_tag(&tx, old)?.ok_or_else(|| LibraryError::UnknownTag(old.to_string()))?;

        if old.eq_ignore_ascii_case(new) {
            let scratch = scratch_name(&tx, new)?;
            let scratch_id = register_tag(&tx, &scratch)?;
            copy_membership(&tx, source, scratch_id)?;
            drop_tag(&tx, source)?;
            source = scratch_id;
        }

        let target = register_tag(&tx, new)?;
        copy_membership(&tx, source, target)?;
        drop_tag(&tx, source)?;
        tx.commit().map_err(storage("commit"))?;

        info!(from = old, to = new, "renamed tag");
        Ok(())
    }

    /// Whether a paper carries a tag.
    pub fn membership(&self, bibcode: &str, tag: &str) -> Result<bool> {
        let id = self.require_tag(tag)?;
        let count: i64 = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM paper_tags WHERE bibcode = ?1 AND tag_id = ?2",
                params![bibcode, id],
                |row| row.get(0),
            )
            .map_err(storage("membership"))?;
        Ok(count > 0)
    }

    pub fn tag_paper(&self, bibcode: &str, tag: &str) -> Result<()> {
        let id = self.require_tag(tag)?;
        self.require(bibcode)?;
        self.conn()
            .execute(
                "INSERT OR IGNORE INTO paper_tags (bibcode, tag_id) VALUES (?1, ?2)",
                params![bibcode, id],
            )
            .map_err(storage("tag paper"))?;
        Ok(())
    }

    pub fn untag_paper(&self, bibcode: &str, tag: &str) -> Result<()> {
        let id = self.require_tag(tag)?;
        self.require(bibcode)?;
        self.conn()
            .execute(
                "DELETE FROM paper_tags WHERE bibcode = ?1 AND tag_id = ?2",
                params![bibcode, id],
            )
            .map_err(storage("untag paper"))?;
        Ok(())
    }

    /// Tags a paper carries, sorted ignoring case.
    pub fn tags_of(&self, bibcode: &str) -> Result<Vec<String>> {
        self.require(bibcode)?;
        let mut stmt = self
            .conn()
            .prepare(
                "SELECT t.name FROM tags t
                 JOIN paper_tags pt ON pt.tag_id = t.id
                 WHERE pt.bibcode = ?1
                 ORDER BY t.name COLLATE NOCASE",
            )
            .map_err(storage("prepare tags_of"))?;
        let names = stmt
            .query_map(params![bibcode], |row| row.get(0))
            .map_err(storage("query tags_of"))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(storage("read tags_of"))?;
        Ok(names)
    }

    /// Every registered tag, sorted ignoring case.
    pub fn all_tags(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT name FROM tags ORDER BY name COLLATE NOCASE")
            .map_err(storage("prepare all_tags"))?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(storage("query all_tags"))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(storage("read all_tags"))?;
        Ok(names)
    }

    /// Bibcodes of the papers carrying a tag. [`ALL_PAPERS`] selects every
    /// paper.
    pub fn papers_with_tag(&self, tag: &str) -> Result<Vec<String>> {
        if tag == ALL_PAPERS {
            return self.list_keys();
        }
        let id = self.require_tag(tag)?;
        let mut stmt = self
            .conn()
            .prepare("SELECT bibcode FROM paper_tags WHERE tag_id = ?1 ORDER BY bibcode")
            .map_err(storage("prepare papers_with_tag"))?;
        let keys = stmt
            .query_map(params![id], |row| row.get(0))
            .map_err(storage("query papers_with_tag"))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(storage("read papers_with_tag"))?;
        Ok(keys)
    }
}
