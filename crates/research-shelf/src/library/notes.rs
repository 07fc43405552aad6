//! One personal note per paper.

use rusqlite::{OptionalExtension, params};

use super::{Library, now, parse_timestamp};
use crate::error::{DatabaseResultExt, LibraryError, LibraryResult};
use crate::models::Note;

const SELECT_NOTE_SQL: &str = "SELECT paper_id, content, updated_at FROM notes WHERE paper_id = ?1";
const UPSERT_NOTE_SQL: &str = r"
INSERT INTO notes (paper_id, content, updated_at) VALUES (?1, ?2, ?3)
ON CONFLICT(paper_id) DO UPDATE SET content = excluded.content, updated_at = excluded.updated_at
";
const DELETE_NOTE_SQL: &str = "DELETE FROM notes WHERE paper_id = ?1";

impl Library {
    pub(super) fn find_note(&self, paper_id: &str) -> LibraryResult<Option<Note>> {
        self.connection
            .query_row(SELECT_NOTE_SQL, params![paper_id], |row| {
                Ok(Note {
                    paper_id: row.get(0)?,
                    content: row.get(1)?,
                    updated_at: Some(parse_timestamp(&row.get::<_, String>(2)?, 2)?),
                })
            })
            .optional()
            .db_context("Failed to query note")
    }

    /// The note for a paper, or an empty one when none was written.
    pub fn get_note(&self, paper_id: &str) -> LibraryResult<Note> {
        Ok(self.find_note(paper_id)?.unwrap_or_else(|| Note::empty(paper_id)))
    }

    /// Create or replace the note for a saved paper.
    pub fn save_note(&self, paper_id: &str, content: &str) -> LibraryResult<Note> {
        self.require_paper(paper_id)?;

        let (updated_at, updated_str) = now();
        self.connection
            .execute(UPSERT_NOTE_SQL, params![paper_id, content, updated_str])
            .db_context("Failed to save note")?;

        tracing::debug!(paper_id, len = content.len(), "Saved note");
        Ok(Note { paper_id: paper_id.to_string(), content: content.to_string(), updated_at: Some(updated_at) })
    }

    /// Delete the note for a paper.
    pub fn delete_note(&self, paper_id: &str) -> LibraryResult<()> {
        let deleted = self
            .connection
            .execute(DELETE_NOTE_SQL, params![paper_id])
            .db_context("Failed to delete note")?;
        if deleted == 0 {
            return Err(LibraryError::not_found("Note", paper_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPaper;

    fn library_with_paper() -> Library {
        let library = Library::open_in_memory().unwrap();
        library
            .create_paper(&NewPaper { id: "W1".into(), title: "A Study".into(), ..Default::default() })
            .unwrap();
        library
    }

    #[test]
    fn test_missing_note_is_empty() {
        let library = library_with_paper();
        let note = library.get_note("W1").unwrap();
        assert_eq!(note, Note::empty("W1"));
    }

    #[test]
    fn test_save_note_replaces_content() {
        let library = library_with_paper();
        library.save_note("W1", "first draft").unwrap();
        library.save_note("W1", "second draft").unwrap();

        let note = library.get_note("W1").unwrap();
        assert_eq!(note.content, "second draft");
        assert!(note.updated_at.is_some());
        assert_eq!(library.get_paper("W1").unwrap().unwrap().note_content(), "second draft");
    }

    #[test]
    fn test_save_note_for_missing_paper() {
        let library = Library::open_in_memory().unwrap();
        let err = library.save_note("missing", "text").unwrap_err();
        assert!(matches!(err, LibraryError::NotFound { entity: "Paper", .. }));
    }

    #[test]
    fn test_delete_note() {
        let library = library_with_paper();
        library.save_note("W1", "text").unwrap();
        library.delete_note("W1").unwrap();
        assert_eq!(library.get_note("W1").unwrap().content, "");
        assert!(matches!(library.delete_note("W1").unwrap_err(), LibraryError::NotFound { .. }));
    }

    #[test]
    fn test_deleting_paper_drops_note() {
        let library = library_with_paper();
        library.save_note("W1", "text").unwrap();
        library.delete_paper("W1").unwrap();
        assert!(library.find_note("W1").unwrap().is_none());
    }
}
