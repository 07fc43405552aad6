//! Data models: the citation record, saved-library entities, and search types.
//!
//! Library entities serialize with snake_case keys, the same shape the HTTP
//! API accepts and returns.

mod paper;
mod record;
mod search;

pub use paper::{NewPaper, NewTag, Note, NoteBody, Paper, Tag};
pub use record::{NO_DATE, PaperRecord, UNTITLED};
pub use search::{
    AuthorInfo, Authorship, Biblio, Location, SearchRequest, SearchResult, Source,
    UNKNOWN_JOURNAL, Work, WorksResponse,
};
