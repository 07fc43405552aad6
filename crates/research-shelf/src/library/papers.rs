//! Paper CRUD.

use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row, params};

use super::{Library, now, parse_timestamp};
use crate::error::{DatabaseResultExt, LibraryError, LibraryResult};
use crate::models::{NewPaper, Paper};

const PAPER_COLUMNS: &str =
    "id, title, authors, year, journal, volume, issue, pages, url, abstract, pdf_path, created_at";
const INSERT_PAPER_SQL: &str = "INSERT INTO papers (id, title, authors, year, journal, volume, issue, pages, url, abstract, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";
const DELETE_PAPER_SQL: &str = "DELETE FROM papers WHERE id = ?1";
const UPDATE_PDF_PATH_SQL: &str = "UPDATE papers SET pdf_path = ?1 WHERE id = ?2";

fn paper_from_row(row: &Row<'_>) -> rusqlite::Result<Paper> {
    let authors: String = row.get(2)?;
    let authors = serde_json::from_str(&authors)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(Paper {
        id: row.get(0)?,
        title: row.get(1)?,
        authors,
        year: row.get(3)?,
        journal: row.get(4)?,
        volume: row.get(5)?,
        issue: row.get(6)?,
        pages: row.get(7)?,
        url: row.get(8)?,
        r#abstract: row.get(9)?,
        pdf_path: row.get(10)?,
        created_at: parse_timestamp(&row.get::<_, String>(11)?, 11)?,
        tags: Vec::new(),
        note: None,
    })
}

impl Library {
    /// All saved papers with their tags and notes, oldest first.
    pub fn list_papers(&self) -> LibraryResult<Vec<Paper>> {
        let sql = format!("SELECT {PAPER_COLUMNS} FROM papers ORDER BY created_at, rowid");
        let mut stmt = self.connection.prepare(&sql).db_context("Failed to prepare query")?;

        let mut papers = stmt
            .query_map([], paper_from_row)
            .db_context("Failed to query papers")?
            .collect::<Result<Vec<_>, _>>()
            .db_context("Failed to read paper row")?;

        for paper in &mut papers {
            self.attach_relations(paper)?;
        }
        Ok(papers)
    }

    /// One saved paper, with tags and note.
    pub fn get_paper(&self, id: &str) -> LibraryResult<Option<Paper>> {
        let sql = format!("SELECT {PAPER_COLUMNS} FROM papers WHERE id = ?1");
        let mut paper = self
            .connection
            .query_row(&sql, params![id], paper_from_row)
            .optional()
            .db_context("Failed to query paper")?;

        if let Some(paper) = paper.as_mut() {
            self.attach_relations(paper)?;
        }
        Ok(paper)
    }

    fn attach_relations(&self, paper: &mut Paper) -> LibraryResult<()> {
        paper.tags = self.tags_for_paper(&paper.id)?;
        paper.note = self.find_note(&paper.id)?;
        Ok(())
    }

    /// Save a new paper.
    pub fn create_paper(&self, new: &NewPaper) -> LibraryResult<Paper> {
        if self.paper_exists(&new.id)? {
            return Err(LibraryError::duplicate("Paper", &new.id));
        }

        let authors = serde_json::to_string(&new.authors)?;
        let (created_at, created_str) = now();

        self.connection
            .execute(
                INSERT_PAPER_SQL,
                params![
                    new.id,
                    new.title,
                    authors,
                    new.year,
                    new.journal,
                    new.volume,
                    new.issue,
                    new.pages,
                    new.url,
                    new.r#abstract,
                    created_str
                ],
            )
            .db_context("Failed to insert paper")?;

        tracing::info!(id = %new.id, title = %new.title, "Saved paper");

        Ok(Paper {
            id: new.id.clone(),
            title: new.title.clone(),
            authors: new.authors.clone(),
            year: new.year,
            journal: new.journal.clone(),
            volume: new.volume.clone(),
            issue: new.issue.clone(),
            pages: new.pages.clone(),
            url: new.url.clone(),
            r#abstract: new.r#abstract.clone(),
            pdf_path: None,
            created_at,
            tags: Vec::new(),
            note: None,
        })
    }

    /// Delete a paper together with its tag links and note.
    ///
    /// Returns the deleted paper so callers can clean up its PDF.
    pub fn delete_paper(&self, id: &str) -> LibraryResult<Paper> {
        let paper = self.get_paper(id)?.ok_or_else(|| LibraryError::not_found("Paper", id))?;

        self.connection.execute(DELETE_PAPER_SQL, params![id]).db_context("Failed to delete paper")?;

        tracing::info!(id, "Deleted paper");
        Ok(paper)
    }

    /// Set or clear the stored PDF path. Returns false when the paper does not exist.
    pub fn set_pdf_path(&self, id: &str, pdf_path: Option<&str>) -> LibraryResult<bool> {
        let updated = self
            .connection
            .execute(UPDATE_PDF_PATH_SQL, params![pdf_path, id])
            .db_context("Failed to update PDF path")?;
        Ok(updated > 0)
    }
}
