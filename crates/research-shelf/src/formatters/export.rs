//! Library export: BibTeX, CSV, JSON and plain citation lists.

use std::fmt;
use std::str::FromStr;

use serde_json::{Value, json};

use super::citation::CitationStyle;
use crate::error::ApiError;
use crate::models::{Paper, PaperRecord};

/// Maximum note length carried into a BibTeX `note` field.
const BIBTEX_NOTE_LIMIT: usize = 200;

/// Export targets for the saved library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// BibTeX `@article` entries
    Bibtex,
    /// Spreadsheet-friendly CSV
    Csv,
    /// Pretty-printed JSON array
    Json,
    /// Numbered citation list in one style
    Citations(CitationStyle),
}

impl ExportFormat {
    /// MIME type of the rendered output.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Bibtex => "application/x-bibtex; charset=utf-8",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
            Self::Citations(_) => "text/plain; charset=utf-8",
        }
    }

    /// Suggested download file name.
    #[must_use]
    pub fn file_name(self) -> String {
        match self {
            Self::Bibtex => "papers.bib".to_string(),
            Self::Csv => "papers.csv".to_string(),
            Self::Json => "papers.json".to_string(),
            Self::Citations(style) => format!("citations-{style}.txt"),
        }
    }

    /// Render `papers` in this format.
    #[must_use]
    pub fn render(self, papers: &[Paper]) -> String {
        match self {
            Self::Bibtex => format_bibtex(papers),
            Self::Csv => format_csv(papers),
            Self::Json => format_json(papers),
            Self::Citations(style) => format_citation_list(papers, style),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bibtex => f.write_str("bibtex"),
            Self::Csv => f.write_str("csv"),
            Self::Json => f.write_str("json"),
            Self::Citations(style) => write!(f, "{style}"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bibtex" | "bib" => Ok(Self::Bibtex),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => other
                .parse::<CitationStyle>()
                .map(Self::Citations)
                .map_err(|_| ApiError::bad_request(format!("Unknown export format: {other}"))),
        }
    }
}

/// Citation key: first author's surname, year, first title word, lowercased.
#[must_use]
pub fn bibtex_key(paper: &Paper) -> String {
    let surname = paper
        .authors
        .first()
        .and_then(|a| a.split(' ').next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_lowercase();
    let year = paper.year.map(|y| y.to_string()).unwrap_or_default();
    let word = paper.title.split(' ').next().unwrap_or("").to_lowercase();

    format!("{surname}{year}{word}")
}

/// Format papers as BibTeX.
#[must_use]
pub fn format_bibtex(papers: &[Paper]) -> String {
    let mut output = String::new();

    for paper in papers {
        output.push_str(&format!("@article{{{},\n", bibtex_key(paper)));
        output.push_str(&format!("  title={{{}}},\n", paper.title));

        if !paper.authors.is_empty() {
            output.push_str(&format!("  author={{{}}},\n", paper.authors.join(" and ")));
        }

        let fields = [
            ("journal", paper.journal.as_deref()),
            ("volume", paper.volume.as_deref()),
            ("number", paper.issue.as_deref()),
        ];
        for (key, value) in fields {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                output.push_str(&format!("  {key}={{{v}}},\n"));
            }
        }

        if let Some(pages) = paper.pages.as_deref().filter(|p| !p.is_empty()) {
            output.push_str(&format!("  pages={{{}}},\n", pages.replacen('-', "--", 1)));
        }

        let year = paper.year.map(|y| y.to_string()).unwrap_or_default();
        output.push_str(&format!("  year={{{year}}},\n"));

        if let Some(url) = paper.url.as_deref().filter(|u| !u.is_empty()) {
            output.push_str(&format!("  url={{{url}}},\n"));
        }

        let note = paper.note_content();
        if !note.is_empty() {
            let flattened: String =
                note.replace('\n', " ").chars().take(BIBTEX_NOTE_LIMIT).collect();
            output.push_str(&format!("  note={{{flattened}}},\n"));
        }

        output.push_str("}\n\n");
    }

    output
}

/// Quote a CSV cell, doubling embedded quotes.
fn escape_csv(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Format papers as CSV.
#[must_use]
pub fn format_csv(papers: &[Paper]) -> String {
    let mut output = String::from("Title,Authors,Year,Journal,Volume,Issue,URL,Tags,Note\n");

    for paper in papers {
        let row = [
            escape_csv(&paper.title),
            escape_csv(&paper.authors.join("; ")),
            paper.year.map(|y| y.to_string()).unwrap_or_default(),
            escape_csv(paper.journal.as_deref().unwrap_or("")),
            escape_csv(paper.volume.as_deref().unwrap_or("")),
            escape_csv(paper.issue.as_deref().unwrap_or("")),
            escape_csv(paper.url.as_deref().unwrap_or("")),
            escape_csv(&paper.tag_names().join("; ")),
            escape_csv(paper.note_content()),
        ];
        output.push_str(&row.join(","));
        output.push('\n');
    }

    output
}

/// Export representation of one paper.
fn export_value(paper: &Paper) -> Value {
    json!({
        "id": paper.id,
        "title": paper.title,
        "authors": paper.authors,
        "year": paper.year,
        "journal": paper.journal,
        "volume": paper.volume,
        "issue": paper.issue,
        "pages": paper.pages,
        "url": paper.url,
        "abstract": paper.r#abstract,
        "tags": paper.tag_names(),
        "note": paper.note_content(),
        "createdAt": paper.created_at,
    })
}

/// Format papers as a pretty-printed JSON array.
#[must_use]
pub fn format_json(papers: &[Paper]) -> String {
    let values: Vec<Value> = papers.iter().map(export_value).collect();
    serde_json::to_string_pretty(&values).unwrap_or_else(|_| "[]".to_string())
}

/// Format papers as a numbered citation list.
#[must_use]
pub fn format_citation_list(papers: &[Paper], style: CitationStyle) -> String {
    let mut output = format!("Citations ({})\n", style.as_str().to_uppercase());
    output.push_str(&"=".repeat(50));
    output.push_str("\n\n");

    for (i, paper) in papers.iter().enumerate() {
        let citation = style.format(&PaperRecord::from(paper));
        output.push_str(&format!("{}. {citation}\n\n", i + 1));
    }

    output
}
