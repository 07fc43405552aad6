//! research-shelf
//!
//! Search OpenAlex for academic papers, keep a local library of them with
//! tags, notes and PDF attachments, and format citations in APA, MLA and
//! Chicago style.
//!
//! # Features
//!
//! - **Citations**: pure, deterministic formatters over any [`CitationSource`]
//! - **Search**: OpenAlex works search with retry and a 5-minute TTL cache
//! - **Library**: SQLite-backed papers, tags and notes
//! - **Export**: BibTeX, CSV, JSON and numbered citation lists
//! - **HTTP API**: axum server exposing all of the above
//!
//! # Example
//!
//! ```
//! use research_shelf::generate_apa_citation;
//! use serde_json::json;
//!
//! let paper = json!({
//!     "title": "A Study",
//!     "authors": ["Jane Q Public"],
//!     "year": 2020,
//!     "url": "http://x",
//! });
//! assert_eq!(generate_apa_citation(&paper).unwrap(), "Public, J.Q. (2020). A Study. . http://x");
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod library;
pub mod models;
pub mod server;
pub mod storage;

pub use client::OpenAlexClient;
pub use config::Config;
pub use error::{ApiError, CitationError, ClientError, LibraryError, StorageError};
pub use formatters::{
    CitationSource, CitationStyle, generate_apa_citation, generate_chicago_citation,
    generate_mla_citation,
};
pub use library::Library;
pub use models::PaperRecord;
pub use storage::PdfStorage;
