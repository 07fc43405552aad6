//! Plain-text citations in APA, MLA and Chicago style.
//!
//! Every entry point accepts anything that implements [`CitationSource`]
//! (a JSON mapping, a [`PaperRecord`], a saved [`Paper`], a [`SearchResult`]),
//! normalizes it to a [`PaperRecord`] once, and then applies the style rules.
//! The style functions are pure: same record in, same string out.
//!
//! The author-list truncation follows the historical output of this project,
//! not the current style manuals: APA lists 19 authors then `"... "` and the
//! last one without a separating comma, and Chicago stops at `", et al"`
//! without a period. Both are kept as-is.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CitationError, CitationResult};
use crate::models::{Paper, PaperRecord, SearchResult};

/// Author line used when a record has no authors.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// APA lists every author up to this many.
const APA_MAX_LISTED: usize = 20;

/// APA authors shown before the ellipsis when the list is truncated.
const APA_TRUNCATED_HEAD: usize = 19;

/// Chicago lists every author up to this many.
const CHICAGO_MAX_LISTED: usize = 10;

/// Chicago authors shown before "et al" when the list is truncated.
const CHICAGO_TRUNCATED_HEAD: usize = 7;

/// Anything that can be viewed as a [`PaperRecord`].
pub trait CitationSource {
    /// Normalize to the canonical record.
    fn to_record(&self) -> CitationResult<PaperRecord>;
}

impl CitationSource for PaperRecord {
    fn to_record(&self) -> CitationResult<PaperRecord> {
        Ok(self.clone())
    }
}

impl CitationSource for Value {
    fn to_record(&self) -> CitationResult<PaperRecord> {
        PaperRecord::from_mapping(self)
    }
}

impl CitationSource for Map<String, Value> {
    fn to_record(&self) -> CitationResult<PaperRecord> {
        PaperRecord::from_map(self)
    }
}

impl CitationSource for Paper {
    fn to_record(&self) -> CitationResult<PaperRecord> {
        Ok(PaperRecord::from(self))
    }
}

impl CitationSource for SearchResult {
    fn to_record(&self) -> CitationResult<PaperRecord> {
        Ok(PaperRecord::from(self))
    }
}

impl<T: CitationSource + ?Sized> CitationSource for &T {
    fn to_record(&self) -> CitationResult<PaperRecord> {
        (**self).to_record()
    }
}

/// Supported citation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    /// APA 7th edition
    Apa,
    /// MLA 9th edition
    Mla,
    /// Chicago 17th edition (notes and bibliography)
    Chicago,
}

impl CitationStyle {
    /// All styles, in display order.
    pub const ALL: [Self; 3] = [Self::Apa, Self::Mla, Self::Chicago];

    /// Format a normalized record in this style.
    #[must_use]
    pub fn format(self, record: &PaperRecord) -> String {
        match self {
            Self::Apa => apa(record),
            Self::Mla => mla(record),
            Self::Chicago => chicago(record),
        }
    }

    /// Normalize `paper` and format it in this style.
    pub fn cite<P: CitationSource + ?Sized>(self, paper: &P) -> CitationResult<String> {
        Ok(self.format(&paper.to_record()?))
    }

    /// Lowercase style name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apa => "apa",
            Self::Mla => "mla",
            Self::Chicago => "chicago",
        }
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CitationStyle {
    type Err = CitationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apa" => Ok(Self::Apa),
            "mla" => Ok(Self::Mla),
            "chicago" => Ok(Self::Chicago),
            other => Err(CitationError::invalid_argument(format!(
                "unknown citation style '{other}' (expected apa, mla or chicago)"
            ))),
        }
    }
}

/// Format a paper as an APA citation.
pub fn generate_apa_citation<P: CitationSource + ?Sized>(paper: &P) -> CitationResult<String> {
    CitationStyle::Apa.cite(paper)
}

/// Format a paper as an MLA citation.
pub fn generate_mla_citation<P: CitationSource + ?Sized>(paper: &P) -> CitationResult<String> {
    CitationStyle::Mla.cite(paper)
}

/// Format a paper as a Chicago citation.
pub fn generate_chicago_citation<P: CitationSource + ?Sized>(paper: &P) -> CitationResult<String> {
    CitationStyle::Chicago.cite(paper)
}

/// `"John Ronald Doe"` -> `"Doe, J.R."`. Single-token names are returned unchanged.
#[must_use]
pub fn initialed_name(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    let Some((surname, given)) = parts.split_last().filter(|_| parts.len() >= 2) else {
        return name.to_string();
    };

    let initials: String = given
        .iter()
        .filter_map(|p| p.chars().next())
        .map(|c| format!("{c}."))
        .collect();

    format!("{surname}, {initials}")
}

/// `"John Ronald Doe"` -> `"Doe, John Ronald"`. Single-token names are returned unchanged.
#[must_use]
pub fn surname_first_name(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    let Some((surname, given)) = parts.split_last().filter(|_| parts.len() >= 2) else {
        return name.to_string();
    };

    format!("{surname}, {}", given.join(" "))
}

/// The name exactly as written.
#[must_use]
pub fn as_written_name(name: &str) -> String {
    name.to_string()
}

fn apa_authors(authors: &[String]) -> String {
    match authors {
        [] => UNKNOWN_AUTHOR.to_string(),
        [only] => initialed_name(only),
        [first, second] => format!("{} & {}", initialed_name(first), initialed_name(second)),
        [head @ .., last] if authors.len() <= APA_MAX_LISTED => {
            format!("{}, & {}", join_with(head, initialed_name, ", "), initialed_name(last))
        }
        [.., last] => format!(
            "{}... {}",
            join_with(&authors[..APA_TRUNCATED_HEAD], initialed_name, ", "),
            initialed_name(last)
        ),
    }
}

fn mla_authors(authors: &[String]) -> String {
    match authors {
        [] => UNKNOWN_AUTHOR.to_string(),
        [only] => surname_first_name(only),
        [first, second] => {
            format!("{}, and {}", surname_first_name(first), as_written_name(second))
        }
        [first, ..] => format!("{}, et al", surname_first_name(first)),
    }
}

fn chicago_authors(authors: &[String]) -> String {
    match authors {
        [] => UNKNOWN_AUTHOR.to_string(),
        [only] => as_written_name(only),
        [first, second] => format!("{} and {}", as_written_name(first), as_written_name(second)),
        [head @ .., last] if authors.len() <= CHICAGO_MAX_LISTED => {
            format!("{}, and {}", join_with(head, as_written_name, ", "), as_written_name(last))
        }
        _ => format!(
            "{}, et al",
            join_with(&authors[..CHICAGO_TRUNCATED_HEAD], as_written_name, ", ")
        ),
    }
}

fn join_with(names: &[String], transform: fn(&str) -> String, sep: &str) -> String {
    names.iter().map(|n| transform(n)).collect::<Vec<_>>().join(sep)
}

fn apa(record: &PaperRecord) -> String {
    let mut source = String::new();
    if let Some(journal) = record.journal() {
        source.push_str(journal);
        if let Some(volume) = record.volume() {
            source.push_str(&format!(", {volume}"));
            if let Some(issue) = record.issue() {
                source.push_str(&format!("({issue})"));
            }
        }
        if let Some(pages) = record.pages() {
            source.push_str(&format!(", {pages}"));
        }
    }

    format!(
        "{} ({}). {}. {}. {}",
        apa_authors(&record.authors),
        record.year_or_default(),
        record.title_or_default(),
        source,
        record.url_or_default()
    )
}

fn mla(record: &PaperRecord) -> String {
    let mut source = String::new();
    if let Some(journal) = record.journal() {
        source.push_str(journal);
        if let Some(volume) = record.volume() {
            source.push_str(&format!(", vol. {volume}"));
        }
        if let Some(issue) = record.issue() {
            source.push_str(&format!(", no. {issue}"));
        }
        source.push_str(&format!(", {}", record.year_or_default()));
        if let Some(pages) = record.printable_pages() {
            source.push_str(&format!(", pp. {pages}"));
        }
    }

    format!("{}. \"{}.\" {}.", mla_authors(&record.authors), record.title_or_default(), source)
}

fn chicago(record: &PaperRecord) -> String {
    let mut source = String::new();
    if let Some(journal) = record.journal() {
        source.push_str(journal);
        if let Some(volume) = record.volume() {
            source.push_str(&format!(" {volume}"));
            if let Some(issue) = record.issue() {
                source.push_str(&format!(", no. {issue}"));
            }
        }
        if record.has_year() {
            source.push_str(&format!(" ({})", record.year_or_default()));
        }
        if let Some(pages) = record.printable_pages() {
            source.push_str(&format!(": {pages}"));
        }
    }

    format!(
        "{}. \"{}.\" {}.",
        chicago_authors(&record.authors),
        record.title_or_default(),
        source
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Given{i} Family{i}")).collect()
    }

    #[test]
    fn test_initialed_name() {
        assert_eq!(initialed_name("John Doe"), "Doe, J.");
        assert_eq!(initialed_name("John Ronald Doe"), "Doe, J.R.");
        assert_eq!(initialed_name("Plato"), "Plato");
        assert_eq!(initialed_name(""), "");
    }

    #[test]
    fn test_surname_first_name() {
        assert_eq!(surname_first_name("John Doe"), "Doe, John");
        assert_eq!(surname_first_name("Mary  Ann   Lee"), "Lee, Mary Ann");
        assert_eq!(surname_first_name("Plato"), "Plato");
    }

    #[test]
    fn test_initials_use_first_character_not_byte() {
        assert_eq!(initialed_name("Émile Zola"), "Zola, É.");
    }

    #[test]
    fn test_apa_author_boundaries() {
        assert_eq!(apa_authors(&[]), "Unknown Author");
        assert_eq!(apa_authors(&names(2)), "Family1, G. & Family2, G.");
        assert_eq!(apa_authors(&names(3)), "Family1, G., Family2, G., & Family3, G.");

        let twenty = apa_authors(&names(20));
        assert!(twenty.ends_with("Family19, G., & Family20, G."));
        assert!(!twenty.contains("..."));

        let twenty_one = apa_authors(&names(21));
        assert!(twenty_one.ends_with("Family19, G.... Family21, G."));
        assert!(!twenty_one.contains("Family20"));
    }

    #[test]
    fn test_chicago_author_boundaries() {
        let ten = chicago_authors(&names(10));
        assert!(ten.ends_with("Given9 Family9, and Given10 Family10"));

        let eleven = chicago_authors(&names(11));
        assert!(eleven.ends_with("Given7 Family7, et al"));
        assert!(!eleven.contains("Family8"));
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!("APA".parse::<CitationStyle>().unwrap(), CitationStyle::Apa);
        assert_eq!(" chicago ".parse::<CitationStyle>().unwrap(), CitationStyle::Chicago);
        assert!("harvard".parse::<CitationStyle>().is_err());
    }

    #[test]
    fn test_cite_rejects_non_mapping() {
        let err = generate_mla_citation(&json!(["not", "a", "paper"])).unwrap_err();
        assert!(matches!(err, CitationError::InvalidArgument(_)));
    }
}
