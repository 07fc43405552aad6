//! research-shelf - Entry Point
//!
//! Runs the HTTP API, or performs one-off searches, citations and exports
//! from the command line.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use research_shelf::{
    CitationStyle, Config, Library, OpenAlexClient, formatters::ExportFormat, models::PaperRecord,
};

#[derive(Parser, Debug)]
#[command(name = "research-shelf")]
#[command(about = "OpenAlex search, a local paper library, and APA/MLA/Chicago citations")]
#[command(version)]
struct Cli {
    /// Contact address for the OpenAlex polite pool
    #[arg(long, env = "OPENALEX_MAILTO", global = true)]
    mailto: Option<String>,

    /// SQLite database file
    #[arg(long, env = "RESEARCH_SHELF_DB", global = true)]
    db: Option<PathBuf>,

    /// Directory for uploaded PDFs
    #[arg(long, env = "RESEARCH_SHELF_PDF_DIR", global = true)]
    pdf_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// HTTP server port
        #[arg(long, default_value = "8000", env = "PORT")]
        port: u16,
    },
    /// Search OpenAlex and print results as JSON
    Search {
        /// Free-text query
        query: String,

        /// Number of results (1-200)
        #[arg(long, default_value = "10")]
        limit: u32,

        /// Print one citation per result instead of JSON
        #[arg(long)]
        cite: Option<CitationStyle>,
    },
    /// Format a paper (JSON object) as a citation
    Cite {
        /// JSON file to read; stdin when omitted
        file: Option<PathBuf>,

        /// Citation style; all three when omitted
        #[arg(long)]
        style: Option<CitationStyle>,
    },
    /// Export the saved library (bibtex, csv, json, apa, mla, chicago)
    Export {
        /// Output format
        format: ExportFormat,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // Logs go to stderr so command output stays pipeable.
    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;
    if cli.mailto.is_some() {
        config.mailto.clone_from(&cli.mailto);
    }
    if let Some(db) = &cli.db {
        config.database_path.clone_from(db);
    }
    if let Some(dir) = &cli.pdf_dir {
        config.pdf_dir.clone_from(dir);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let config = build_config(&cli)?;

    match cli.command {
        Command::Serve { port } => {
            tracing::info!(version = env!("CARGO_PKG_VERSION"), port, "Starting research-shelf");
            research_shelf::server::run(&config, port).await?;
        }
        Command::Search { query, limit, cite } => {
            let client = OpenAlexClient::new(&config)?;
            let results = client.search_works(&query, limit).await?;
            match cite {
                Some(style) => {
                    for result in &results {
                        println!("{}", style.cite(result)?);
                    }
                }
                None => println!("{}", serde_json::to_string_pretty(&results)?),
            }
        }
        Command::Cite { file, style } => {
            let input = match &file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
                    buf
                }
            };
            let value: serde_json::Value =
                serde_json::from_str(&input).context("Input is not valid JSON")?;
            let record = PaperRecord::from_mapping(&value)?;

            match style {
                Some(style) => println!("{}", style.format(&record)),
                None => {
                    for style in CitationStyle::ALL {
                        println!("{}: {}", style.as_str().to_uppercase(), style.format(&record));
                    }
                }
            }
        }
        Command::Export { format } => {
            let library = Library::open(&config.database_path)?;
            let papers = library.list_papers()?;
            tracing::debug!(%format, papers = papers.len(), "Exporting library");
            print!("{}", format.render(&papers));
        }
    }

    Ok(())
}
