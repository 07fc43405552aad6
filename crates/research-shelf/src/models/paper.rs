//! Saved-library entities: papers, tags and notes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PaperRecord;

/// A paper saved in the local library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Caller-supplied identifier (usually the OpenAlex work URL).
    pub id: String,

    /// Paper title.
    pub title: String,

    /// Author names in byline order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication year.
    #[serde(default)]
    pub year: Option<i64>,

    /// Journal or venue.
    #[serde(default)]
    pub journal: Option<String>,

    /// Journal volume.
    #[serde(default)]
    pub volume: Option<String>,

    /// Journal issue.
    #[serde(default)]
    pub issue: Option<String>,

    /// Page range.
    #[serde(default)]
    pub pages: Option<String>,

    /// DOI or landing page URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Abstract text.
    #[serde(default)]
    pub r#abstract: Option<String>,

    /// Public path of the attached PDF (`/pdfs/{id}.pdf`).
    #[serde(default)]
    pub pdf_path: Option<String>,

    /// When the paper was saved.
    pub created_at: DateTime<Utc>,

    /// Tags attached to this paper.
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Personal note, if one was written.
    #[serde(default)]
    pub note: Option<Note>,
}

impl Paper {
    /// Names of the attached tags.
    #[must_use]
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    /// Note content, or the empty string.
    #[must_use]
    pub fn note_content(&self) -> &str {
        self.note.as_ref().map_or("", |n| n.content.as_str())
    }
}

/// Request body for saving a paper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPaper {
    /// Identifier for the paper.
    pub id: String,

    /// Paper title.
    pub title: String,

    /// Author names.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication year.
    #[serde(default)]
    pub year: Option<i64>,

    /// Journal or venue.
    #[serde(default)]
    pub journal: Option<String>,

    /// Journal volume.
    #[serde(default)]
    pub volume: Option<String>,

    /// Journal issue.
    #[serde(default)]
    pub issue: Option<String>,

    /// Page range.
    #[serde(default)]
    pub pages: Option<String>,

    /// DOI or landing page URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Abstract text.
    #[serde(default)]
    pub r#abstract: Option<String>,
}

/// A tag used to organize papers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag identifier.
    pub id: String,

    /// Unique display name.
    pub name: String,

    /// UI colour code.
    #[serde(default)]
    pub color: Option<String>,

    /// When the tag was created.
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    /// Identifier; a UUID is generated when omitted.
    #[serde(default)]
    pub id: Option<String>,

    /// Display name.
    pub name: String,

    /// UI colour code.
    #[serde(default)]
    pub color: Option<String>,
}

/// A personal note attached to one paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// The paper this note belongs to.
    pub paper_id: String,

    /// Note body.
    pub content: String,

    /// Last modification time; `None` for a note that was never saved.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    /// The empty note returned for papers without one.
    #[must_use]
    pub fn empty(paper_id: impl Into<String>) -> Self {
        Self { paper_id: paper_id.into(), content: String::new(), updated_at: None }
    }
}

/// Request body for saving a note.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteBody {
    /// New note content.
    #[serde(default)]
    pub content: String,
}

impl From<&Paper> for PaperRecord {
    fn from(paper: &Paper) -> Self {
        Self {
            title: Some(paper.title.clone()),
            authors: paper.authors.clone(),
            year: paper.year,
            journal: paper.journal.clone(),
            volume: paper.volume.clone(),
            issue: paper.issue.clone(),
            pages: paper.pages.clone(),
            url: paper.url.clone(),
        }
    }
}
