//! SQLite-backed storage for saved papers, tags and notes.
//!
//! The schema is created on open with foreign keys enabled, so deleting a
//! paper drops its tag links and note, and deleting a tag drops its links.
//! Query methods live in [`papers`], [`tags`] and [`notes`].

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, params};

use crate::error::{DatabaseResultExt, LibraryError, LibraryResult};

pub mod notes;
pub mod papers;
pub mod tags;

const SCHEMA_SQL: &str = include_str!("schema.sql");
const PAPER_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM papers WHERE id = ?1)";
const TAG_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM tags WHERE id = ?1)";

/// Connection to the paper library.
pub struct Library {
    connection: Connection,
}

impl Library {
    /// Open (or create) a library database file.
    pub fn open<P: AsRef<Path>>(path: P) -> LibraryResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|source| LibraryError::Io { path: parent.to_path_buf(), source })?;
        }

        let connection = Connection::open(path).db_context("Failed to open database")?;
        tracing::debug!(path = %path.display(), "Opened library database");
        Self::with_connection(connection)
    }

    /// Open a throwaway in-memory library.
    pub fn open_in_memory() -> LibraryResult<Self> {
        let connection = Connection::open_in_memory().db_context("Failed to open database")?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> LibraryResult<Self> {
        let library = Self { connection };
        library.initialize_schema()?;
        Ok(library)
    }

    fn initialize_schema(&self) -> LibraryResult<()> {
        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;
        self.connection.execute_batch(SCHEMA_SQL).db_context("Failed to initialize schema")?;
        Ok(())
    }

    /// Whether a paper with this id is saved.
    pub fn paper_exists(&self, id: &str) -> LibraryResult<bool> {
        self.connection
            .query_row(PAPER_EXISTS_SQL, params![id], |row| row.get(0))
            .db_context("Failed to check paper")
    }

    /// Whether a tag with this id exists.
    pub fn tag_exists(&self, id: &str) -> LibraryResult<bool> {
        self.connection
            .query_row(TAG_EXISTS_SQL, params![id], |row| row.get(0))
            .db_context("Failed to check tag")
    }

    fn require_paper(&self, id: &str) -> LibraryResult<()> {
        if self.paper_exists(id)? { Ok(()) } else { Err(LibraryError::not_found("Paper", id)) }
    }

    fn require_tag(&self, id: &str) -> LibraryResult<()> {
        if self.tag_exists(id)? { Ok(()) } else { Err(LibraryError::not_found("Tag", id)) }
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library").field("path", &self.connection.path()).finish()
    }
}

/// Current time in the fixed-width form stored in the database.
fn now() -> (DateTime<Utc>, String) {
    let now = Utc::now();
    (now, now.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

/// Parse a stored timestamp column.
fn parse_timestamp(value: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_creates_schema() {
        let library = Library::open_in_memory().unwrap();
        assert!(!library.paper_exists("missing").unwrap());
        assert!(!library.tag_exists("missing").unwrap());
    }

    #[test]
    fn test_open_file_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("library.db");
        let library = Library::open(&path).unwrap();
        assert!(path.exists());
        drop(library);

        // Reopening an existing database keeps the schema idempotent.
        Library::open(&path).unwrap();
    }

    #[test]
    fn test_timestamp_round_trip() {
        let (time, text) = now();
        assert_eq!(parse_timestamp(&text, 0).unwrap(), time);
        assert!(parse_timestamp("yesterday", 3).is_err());
    }
}
