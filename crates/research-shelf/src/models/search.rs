//! Search request/response types and the OpenAlex wire schema.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::PaperRecord;

/// Journal name used when OpenAlex has no source for a work.
pub const UNKNOWN_JOURNAL: &str = "Unknown Journal";

/// Default number of results per search.
const fn default_limit() -> u32 {
    10
}

/// Search request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query.
    pub query: String,

    /// Maximum number of results.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// A search hit, normalized from an OpenAlex work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// OpenAlex work URL.
    pub id: String,

    /// Work title.
    #[serde(default)]
    pub title: String,

    /// Author display names.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication year.
    #[serde(default)]
    pub year: Option<i64>,

    /// Reconstructed abstract.
    #[serde(default)]
    pub r#abstract: Option<String>,

    /// DOI URL, or the work URL when there is no DOI.
    #[serde(default)]
    pub url: String,

    /// Journal name.
    #[serde(default)]
    pub journal: String,

    /// Journal volume (may be empty).
    #[serde(default)]
    pub volume: String,

    /// Journal issue (may be empty).
    #[serde(default)]
    pub issue: String,

    /// "first-last" page range; "-" when OpenAlex has none.
    #[serde(default)]
    pub pages: String,
}

impl From<&SearchResult> for PaperRecord {
    fn from(result: &SearchResult) -> Self {
        Self {
            title: Some(result.title.clone()),
            authors: result.authors.clone(),
            year: result.year,
            journal: Some(result.journal.clone()),
            volume: Some(result.volume.clone()),
            issue: Some(result.issue.clone()),
            pages: Some(result.pages.clone()),
            url: Some(result.url.clone()),
        }
    }
}

/// `GET /works` response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorksResponse {
    /// Matching works.
    #[serde(default)]
    pub results: Vec<Work>,
}

/// An OpenAlex work, reduced to the fields we read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Work {
    /// Work URL (`https://openalex.org/W...`).
    pub id: String,

    /// Title.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Publication year.
    #[serde(default)]
    pub publication_year: Option<i64>,

    /// DOI URL.
    #[serde(default)]
    pub doi: Option<String>,

    /// Author list.
    #[serde(default)]
    pub authorships: Vec<Authorship>,

    /// Abstract as word -> positions.
    #[serde(default)]
    pub abstract_inverted_index: Option<HashMap<String, Vec<usize>>>,

    /// Where the work was published.
    #[serde(default)]
    pub primary_location: Option<Location>,

    /// Volume/issue/page data.
    #[serde(default)]
    pub biblio: Option<Biblio>,
}

/// One authorship entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Authorship {
    /// The author.
    #[serde(default)]
    pub author: AuthorInfo,
}

/// Author reference inside an authorship.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorInfo {
    /// Author name as displayed by OpenAlex.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Publication location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Location {
    /// Journal/repository.
    #[serde(default)]
    pub source: Option<Source>,
}

/// Journal or repository.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Source {
    /// Source name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Bibliographic details.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Biblio {
    /// Volume.
    #[serde(default)]
    pub volume: Option<String>,

    /// Issue.
    #[serde(default)]
    pub issue: Option<String>,

    /// First page.
    #[serde(default)]
    pub first_page: Option<String>,

    /// Last page.
    #[serde(default)]
    pub last_page: Option<String>,
}

impl Work {
    /// Rebuild the abstract text from its inverted index.
    ///
    /// Every (word, position) pair is expanded and sorted by position; words
    /// sharing a position are ordered alphabetically.
    #[must_use]
    pub fn abstract_text(&self) -> Option<String> {
        let index = self.abstract_inverted_index.as_ref()?;
        if index.is_empty() {
            return None;
        }

        let mut words: Vec<(usize, &str)> = index
            .iter()
            .flat_map(|(word, positions)| positions.iter().map(move |&p| (p, word.as_str())))
            .collect();
        words.sort_unstable();

        Some(words.into_iter().map(|(_, w)| w).collect::<Vec<_>>().join(" "))
    }

    /// Journal name, or "Unknown Journal".
    #[must_use]
    pub fn journal_name(&self) -> &str {
        self.primary_location
            .as_ref()
            .and_then(|l| l.source.as_ref())
            .and_then(|s| s.display_name.as_deref())
            .unwrap_or(UNKNOWN_JOURNAL)
    }
}

impl From<Work> for SearchResult {
    fn from(work: Work) -> Self {
        let r#abstract = work.abstract_text();
        let journal = work.journal_name().to_string();
        let biblio = work.biblio.unwrap_or_default();

        let authors = work
            .authorships
            .into_iter()
            .filter_map(|a| a.author.display_name)
            .collect();

        let pages = format!(
            "{}-{}",
            biblio.first_page.as_deref().unwrap_or(""),
            biblio.last_page.as_deref().unwrap_or("")
        );

        Self {
            url: work.doi.unwrap_or_else(|| work.id.clone()),
            id: work.id,
            title: work.display_name.unwrap_or_default(),
            authors,
            year: work.publication_year,
            r#abstract,
            journal,
            volume: biblio.volume.unwrap_or_default(),
            issue: biblio.issue.unwrap_or_default(),
            pages,
        }
    }
}
