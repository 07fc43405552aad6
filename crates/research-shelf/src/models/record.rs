//! The canonical field set the citation formatter works on.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CitationError, CitationResult};

/// Placeholder used when a record has no title.
pub const UNTITLED: &str = "Untitled";

/// Marker used when a record has no publication year.
pub const NO_DATE: &str = "n.d.";

/// One bibliographic entry, normalized from whatever shape the caller had.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaperRecord {
    /// Paper title.
    pub title: Option<String>,

    /// Full author names in byline order (e.g. "John Doe").
    pub authors: Vec<String>,

    /// Publication year.
    pub year: Option<i64>,

    /// Journal or venue name.
    pub journal: Option<String>,

    /// Journal volume.
    pub volume: Option<String>,

    /// Journal issue.
    pub issue: Option<String>,

    /// Page range, usually "first-last".
    pub pages: Option<String>,

    /// DOI or landing page URL.
    pub url: Option<String>,
}

impl PaperRecord {
    /// Build a record from a key/value mapping.
    ///
    /// Missing and `null` keys are absent, unknown keys are ignored. Anything
    /// other than a JSON object is rejected.
    pub fn from_mapping(value: &Value) -> CitationResult<Self> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(CitationError::invalid_argument(format!(
                "expected a mapping of paper fields, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Build a record from an already-unwrapped JSON object.
    pub fn from_map(map: &Map<String, Value>) -> CitationResult<Self> {
        Ok(Self {
            title: text_field(map, "title")?,
            authors: authors_field(map)?,
            year: year_field(map)?,
            journal: text_field(map, "journal")?,
            volume: text_field(map, "volume")?,
            issue: text_field(map, "issue")?,
            pages: text_field(map, "pages")?,
            url: text_field(map, "url")?,
        })
    }

    /// Get the title, falling back to "Untitled".
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }

    /// Get the year as text, falling back to "n.d.".
    #[must_use]
    pub fn year_or_default(&self) -> String {
        self.year.map_or_else(|| NO_DATE.to_string(), |y| y.to_string())
    }

    /// Whether the year counts as present for the Chicago source block.
    ///
    /// A missing year still renders as "n.d."; only a zero year is dropped.
    #[must_use]
    pub const fn has_year(&self) -> bool {
        !matches!(self.year, Some(0))
    }

    /// Journal name, if present and non-empty.
    #[must_use]
    pub fn journal(&self) -> Option<&str> {
        non_empty(self.journal.as_deref())
    }

    /// Volume, if present and non-empty.
    #[must_use]
    pub fn volume(&self) -> Option<&str> {
        non_empty(self.volume.as_deref())
    }

    /// Issue, if present and non-empty.
    #[must_use]
    pub fn issue(&self) -> Option<&str> {
        non_empty(self.issue.as_deref())
    }

    /// Page range, if present and non-empty.
    #[must_use]
    pub fn pages(&self) -> Option<&str> {
        non_empty(self.pages.as_deref())
    }

    /// Page range with the bare "-" placeholder filtered out.
    #[must_use]
    pub fn printable_pages(&self) -> Option<&str> {
        self.pages().filter(|p| *p != "-")
    }

    /// URL, or the empty string.
    #[must_use]
    pub fn url_or_default(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> CitationResult<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(CitationError::invalid_field(
            key,
            format!("expected text, got {}", json_kind(other)),
        )),
    }
}

fn year_field(map: &Map<String, Value>) -> CitationResult<Option<i64>> {
    match map.get("year") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| CitationError::invalid_field("year", format!("{n} is not an integer"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CitationError::invalid_field("year", format!("{s:?} is not an integer"))),
        Some(other) => Err(CitationError::invalid_field(
            "year",
            format!("expected an integer, got {}", json_kind(other)),
        )),
    }
}

fn authors_field(map: &Map<String, Value>) -> CitationResult<Vec<String>> {
    match map.get("authors") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(name) => Ok(name.clone()),
                other => Err(CitationError::invalid_field(
                    "authors",
                    format!("expected author names, got {}", json_kind(other)),
                )),
            })
            .collect(),
        Some(other) => Err(CitationError::invalid_field(
            "authors",
            format!("expected a list of names, got {}", json_kind(other)),
        )),
    }
}
