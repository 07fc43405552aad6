//! Error types for research-shelf.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::path::PathBuf;
use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors from the OpenAlex HTTP client.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by OpenAlex (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout(_) | Self::Server { .. })
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors from citation input normalization.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CitationError {
    /// The input is not a mapping of paper fields.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A known field has a value of the wrong shape.
    #[error("Invalid value for '{field}': {message}")]
    InvalidField {
        /// Offending key
        field: String,
        /// What was wrong with it
        message: String,
    },
}

impl CitationError {
    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an invalid field error.
    #[must_use]
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField { field: field.into(), message: message.into() }
    }
}

/// Errors from the SQLite-backed library.
#[derive(thiserror::Error, Debug)]
pub enum LibraryError {
    /// SQLite failure
    #[error("Database error: {message}")]
    Database {
        /// What we were doing
        message: String,
        /// Underlying error
        #[source]
        source: rusqlite::Error,
    },

    /// Row does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("Paper", "Tag", "Note")
        entity: &'static str,
        /// Requested identifier
        id: String,
    },

    /// Unique constraint hit
    #[error("{entity} already exists: {id}")]
    Duplicate {
        /// Entity kind
        entity: &'static str,
        /// Conflicting identifier or name
        id: String,
    },

    /// Stored JSON column could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database directory could not be created
    #[error("File system error at path '{path}': {source}")]
    Io {
        /// Directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl LibraryError {
    /// Wrap a SQLite error with context.
    #[must_use]
    pub fn database(message: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Database { message: message.into(), source }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { entity, id: id.into() }
    }

    /// Create a duplicate error.
    #[must_use]
    pub fn duplicate(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate { entity, id: id.into() }
    }
}

/// Attach context to rusqlite results.
pub trait DatabaseResultExt<T> {
    /// Map a rusqlite error into [`LibraryError::Database`] with a message.
    fn db_context(self, message: &str) -> LibraryResult<T>;
}

impl<T> DatabaseResultExt<T> for Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> LibraryResult<T> {
        self.map_err(|e| LibraryError::database(message, e))
    }
}

/// Errors from PDF file storage.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    /// File system failure
    #[error("File system error at path '{path}': {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Wrap an I/O error with the path it happened on.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Errors surfaced by HTTP handlers.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Search backend failure
    #[error("Search error: {0}")]
    Client(#[from] ClientError),

    /// Citation input rejected
    #[error(transparent)]
    Citation(#[from] CitationError),

    /// Library failure
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// PDF storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Malformed request
    #[error("{0}")]
    BadRequest(String),

    /// Request well-formed but semantically invalid
    #[error("Invalid input for '{field}': {message}")]
    Validation {
        /// Offending field
        field: String,
        /// Validation error message
        message: String,
    },

    /// Missing resource outside the library (e.g. a PDF file)
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Client(ClientError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            Self::Client(ClientError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Client(_) => StatusCode::BAD_GATEWAY,
            Self::Citation(_) | Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Library(LibraryError::NotFound { .. }) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Library(LibraryError::Duplicate { .. }) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Library(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to a user-friendly message for the response body.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Client(ClientError::RateLimited { retry_after }) => {
                format!("Rate limited by OpenAlex. Please wait {retry_after:?} before retrying.")
            }
            Self::Library(LibraryError::NotFound { entity, .. }) => format!("{entity} not found"),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }

        (status, Json(serde_json::json!({ "detail": self.to_user_message() }))).into_response()
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for citation input handling.
pub type CitationResult<T> = Result<T, CitationError>;

/// Result type alias for library operations.
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Result type alias for PDF storage.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_retryable() {
        assert!(ClientError::rate_limited(60).is_retryable());
        assert!(ClientError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(ClientError::server(500, "Internal error").is_retryable());

        assert!(!ClientError::not_found("works").is_retryable());
        assert!(!ClientError::bad_request("invalid filter").is_retryable());
    }

    #[test]
    fn test_client_error_retry_after() {
        let err = ClientError::rate_limited(60);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));

        let err = ClientError::not_found("works");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_api_error_status_mapping() {
        assert_eq!(
            ApiError::from(LibraryError::not_found("Paper", "W1")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(LibraryError::duplicate("Tag", "reading")).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(CitationError::invalid_argument("not a mapping")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::from(ClientError::server(503, "down")).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::from(ClientError::Timeout(Duration::from_secs(30))).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(ApiError::bad_request("File must be a PDF").status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_api_error_user_message() {
        let err = ApiError::validation("query", "cannot be empty");
        assert!(err.to_user_message().contains("query"));
        assert!(err.to_user_message().contains("cannot be empty"));

        let err = ApiError::from(LibraryError::not_found("Paper", "W1"));
        assert_eq!(err.to_user_message(), "Paper not found");
    }
}
