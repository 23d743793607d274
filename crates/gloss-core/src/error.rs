//! Error types for Gloss Core
//!
//! Each pipeline stage reports its own error type so failures stay scoped:
//! - Configuration resolution (fatal at startup)
//! - Content store access (batch-level on fetch, row-level on write)
//! - Completion service calls (row-level)
//! - Response cleanup and validation (row-level)

/// Boxed error source used to keep backend crates out of the core API
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Configuration resolution errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable absent or empty
    #[error("{0} not found in environment variables")]
    MissingVar(&'static str),

    /// Environment variable present but unusable
    #[error("invalid value for {name}: {reason}")]
    InvalidVar {
        /// Variable name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Content store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Could not establish the store connection
    #[error("error connecting to database: {0}")]
    Connect(#[source] BoxError),

    /// Selection query failed
    #[error("error fetching content rows: {0}")]
    Query(#[source] BoxError),

    /// Dictionary could not be serialized for storage
    #[error("error serializing dictionary for content ID {id}: {source}")]
    Serialize {
        /// Row identifier
        id: String,
        /// Serializer failure
        #[source]
        source: serde_json::Error,
    },

    /// Update statement failed
    #[error("error updating database for content ID {id}: {source}")]
    Write {
        /// Row identifier
        id: String,
        /// Backend failure
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    /// Create connection error from any backend error
    pub fn connect(source: impl Into<BoxError>) -> Self {
        Self::Connect(source.into())
    }

    /// Create query error from any backend error
    pub fn query(source: impl Into<BoxError>) -> Self {
        Self::Query(source.into())
    }

    /// Create write error for a row
    pub fn write(id: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Write {
            id: id.into(),
            source: source.into(),
        }
    }
}

/// Completion service errors
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Could not build the service client
    #[error("error initializing completion client: {0}")]
    Client(#[source] BoxError),

    /// Request never produced an HTTP response
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// Service answered with a non-success status
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// Response body did not match the chat-completion shape
    #[error("could not decode response: {0}")]
    Decode(#[source] BoxError),
}

/// Response cleanup and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// Cleaned text is not valid JSON
    #[error("invalid JSON: {source}")]
    Json {
        /// Text after fence stripping
        cleaned: String,
        /// Parser failure
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON, but not an object
    #[error("AI response is not a valid dictionary (got {kind})")]
    NotAnObject {
        /// JSON kind that was received
        kind: &'static str,
    },
}

/// Startup error for callers that resolve configuration and connect
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    /// Configuration failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Completion service failed
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Result type alias for startup operations
pub type EnrichResult<T> = Result<T, EnrichError>;
