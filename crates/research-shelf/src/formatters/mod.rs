//! Output formatters: citations and library exports.

pub mod citation;
pub mod export;

pub use citation::{
    CitationSource, CitationStyle, UNKNOWN_AUTHOR, as_written_name, generate_apa_citation,
    generate_chicago_citation, generate_mla_citation, initialed_name, surname_first_name,
};
pub use export::{
    ExportFormat, bibtex_key, format_bibtex, format_citation_list, format_csv, format_json,
};
