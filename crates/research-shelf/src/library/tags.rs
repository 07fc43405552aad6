//! Tags and paper/tag links.

use rusqlite::{Row, params};

use super::{Library, now, parse_timestamp};
use crate::error::{DatabaseResultExt, LibraryError, LibraryResult};
use crate::models::{NewTag, Tag};

const LIST_TAGS_SQL: &str = "SELECT id, name, color, created_at FROM tags ORDER BY name";
const TAG_NAME_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM tags WHERE name = ?1)";
const INSERT_TAG_SQL: &str = "INSERT INTO tags (id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)";
const DELETE_TAG_SQL: &str = "DELETE FROM tags WHERE id = ?1";
const LINK_SQL: &str = "INSERT OR IGNORE INTO paper_tags (paper_id, tag_id) VALUES (?1, ?2)";
const UNLINK_SQL: &str = "DELETE FROM paper_tags WHERE paper_id = ?1 AND tag_id = ?2";
const TAGS_FOR_PAPER_SQL: &str = r"
SELECT t.id, t.name, t.color, t.created_at
FROM tags t
JOIN paper_tags pt ON pt.tag_id = t.id
WHERE pt.paper_id = ?1
ORDER BY t.name
";

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        created_at: parse_timestamp(&row.get::<_, String>(3)?, 3)?,
    })
}

impl Library {
    /// All tags, by name.
    pub fn list_tags(&self) -> LibraryResult<Vec<Tag>> {
        let mut stmt = self.connection.prepare(LIST_TAGS_SQL).db_context("Failed to prepare query")?;
        stmt.query_map([], tag_from_row)
            .db_context("Failed to query tags")?
            .collect::<Result<Vec<_>, _>>()
            .db_context("Failed to read tag row")
    }

    /// Create a tag. A UUID is assigned when the request carries no id.
    ///
    /// Fails with `Duplicate` when either the id or the name is taken.
    pub fn create_tag(&self, new: &NewTag) -> LibraryResult<Tag> {
        let id = new
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        if self.tag_exists(&id)? {
            return Err(LibraryError::duplicate("Tag", id));
        }
        let name_taken: bool = self
            .connection
            .query_row(TAG_NAME_EXISTS_SQL, params![new.name], |row| row.get(0))
            .db_context("Failed to check tag name")?;
        if name_taken {
            return Err(LibraryError::duplicate("Tag", &new.name));
        }

        let (created_at, created_str) = now();
        self.connection
            .execute(INSERT_TAG_SQL, params![id, new.name, new.color, created_str])
            .db_context("Failed to insert tag")?;

        tracing::info!(%id, name = %new.name, "Created tag");
        Ok(Tag { id, name: new.name.clone(), color: new.color.clone(), created_at })
    }

    /// Delete a tag and unlink it from every paper.
    pub fn delete_tag(&self, id: &str) -> LibraryResult<()> {
        let deleted =
            self.connection.execute(DELETE_TAG_SQL, params![id]).db_context("Failed to delete tag")?;
        if deleted == 0 {
            return Err(LibraryError::not_found("Tag", id));
        }
        Ok(())
    }

    /// Attach a tag to a paper. Linking twice is a no-op.
    pub fn tag_paper(&self, paper_id: &str, tag_id: &str) -> LibraryResult<()> {
        self.require_paper(paper_id)?;
        self.require_tag(tag_id)?;
        self.connection
            .execute(LINK_SQL, params![paper_id, tag_id])
            .db_context("Failed to tag paper")?;
        Ok(())
    }

    /// Detach a tag from a paper. Removing a link that does not exist is a no-op.
    pub fn untag_paper(&self, paper_id: &str, tag_id: &str) -> LibraryResult<()> {
        self.require_paper(paper_id)?;
        self.require_tag(tag_id)?;
        self.connection
            .execute(UNLINK_SQL, params![paper_id, tag_id])
            .db_context("Failed to untag paper")?;
        Ok(())
    }

    /// Tags attached to one paper, by name.
    pub fn tags_for_paper(&self, paper_id: &str) -> LibraryResult<Vec<Tag>> {
        let mut stmt =
            self.connection.prepare(TAGS_FOR_PAPER_SQL).db_context("Failed to prepare query")?;
        stmt.query_map(params![paper_id], tag_from_row)
            .db_context("Failed to query paper tags")?
            .collect::<Result<Vec<_>, _>>()
            .db_context("Failed to read tag row")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPaper;

    fn tag(name: &str) -> NewTag {
        NewTag { id: None, name: name.to_string(), color: Some("#3b82f6".into()) }
    }

    fn library_with_paper() -> Library {
        let library = Library::open_in_memory().unwrap();
        library
            .create_paper(&NewPaper { id: "W1".into(), title: "A Study".into(), ..Default::default() })
            .unwrap();
        library
    }

    #[test]
    fn test_create_tag_generates_uuid() {
        let library = Library::open_in_memory().unwrap();
        let created = library.create_tag(&tag("reading")).unwrap();
        assert!(uuid::Uuid::parse_str(&created.id).is_ok());
        assert_eq!(library.list_tags().unwrap(), vec![created]);
    }

    #[test]
    fn test_create_tag_keeps_given_id() {
        let library = Library::open_in_memory().unwrap();
        let created = library
            .create_tag(&NewTag { id: Some("t-1".into()), name: "ml".into(), color: None })
            .unwrap();
        assert_eq!(created.id, "t-1");
    }

    #[test]
    fn test_duplicate_tag_name_is_rejected() {
        let library = Library::open_in_memory().unwrap();
        library.create_tag(&tag("reading")).unwrap();
        let err = library.create_tag(&tag("reading")).unwrap_err();
        assert!(matches!(err, LibraryError::Duplicate { entity: "Tag", .. }));
    }

    #[test]
    fn test_tag_and_untag_paper() {
        let library = library_with_paper();
        let reading = library.create_tag(&tag("reading")).unwrap();

        library.tag_paper("W1", &reading.id).unwrap();
        library.tag_paper("W1", &reading.id).unwrap();
        assert_eq!(library.tags_for_paper("W1").unwrap().len(), 1);

        library.untag_paper("W1", &reading.id).unwrap();
        assert!(library.tags_for_paper("W1").unwrap().is_empty());
    }

    #[test]
    fn test_tag_paper_requires_both_sides() {
        let library = library_with_paper();
        let reading = library.create_tag(&tag("reading")).unwrap();

        let err = library.tag_paper("missing", &reading.id).unwrap_err();
        assert!(matches!(err, LibraryError::NotFound { entity: "Paper", .. }));

        let err = library.tag_paper("W1", "missing").unwrap_err();
        assert!(matches!(err, LibraryError::NotFound { entity: "Tag", .. }));
    }

    #[test]
    fn test_delete_tag_unlinks_papers() {
        let library = library_with_paper();
        let reading = library.create_tag(&tag("reading")).unwrap();
        library.tag_paper("W1", &reading.id).unwrap();

        library.delete_tag(&reading.id).unwrap();
        assert!(library.tags_for_paper("W1").unwrap().is_empty());
        assert!(matches!(
            library.delete_tag(&reading.id).unwrap_err(),
            LibraryError::NotFound { .. }
        ));
    }
}
