//! HTTP server.
//!
//! Shared state lives in one [`AppState`] behind an `Arc`. The SQLite
//! connection is not `Sync`, so it sits behind an async mutex; the search
//! client is internally pooled and cloned freely.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex;

pub use routes::create_router;

use crate::client::OpenAlexClient;
use crate::config::Config;
use crate::library::Library;
use crate::storage::PdfStorage;

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    /// OpenAlex search client.
    pub client: OpenAlexClient,
    /// Saved papers, tags and notes.
    pub library: Mutex<Library>,
    /// Uploaded PDFs.
    pub storage: PdfStorage,
}

impl AppState {
    /// Assemble state from already-built parts.
    #[must_use]
    pub fn new(client: OpenAlexClient, library: Library, storage: PdfStorage) -> Self {
        Self { client, library: Mutex::new(library), storage }
    }

    /// Build the client, open the database and prepare the PDF directory.
    ///
    /// # Errors
    ///
    /// Returns error if any of the three cannot be initialized.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = OpenAlexClient::new(config)?;
        let library = Library::open(&config.database_path)?;
        let storage = PdfStorage::new(&config.pdf_dir)?;
        Ok(Self::new(client, library, storage))
    }
}

/// Serve the API on `0.0.0.0:{port}` until Ctrl-C.
///
/// # Errors
///
/// Returns error if state initialization or binding fails.
pub async fn run(config: &Config, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    tracing::info!(
        database = %config.database_path.display(),
        pdf_dir = %config.pdf_dir.display(),
        polite_pool = config.has_mailto(),
        "Library ready"
    );

    let router = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
