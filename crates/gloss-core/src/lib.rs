//! Gloss Core - vocabulary-dictionary enrichment
//!
//! One linear pass over a content table:
//! - Select rows whose translation dictionary is unset
//! - Ask a text-generation service for a dictionary per row
//! - Strip an optional code fence and validate the JSON object
//! - Write the dictionary back, one committed update per row
//!
//! Storage and the generation service sit behind the [`ContentStore`] and
//! [`CompletionClient`] traits.
//!
//! # Example
//!
//! ```rust,ignore
//! use gloss_core::{Enricher, EnricherConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EnricherConfig::from_env()?;
//! let store = gloss_postgres::PgContentStore::connect(&config.database_url).await?;
//! let client = gloss_openai::OpenAiClient::new(&config)?;
//!
//! let report = Enricher::new(store, client, config.run).run().await;
//! println!("updated {} rows", report.updated);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod client;
pub mod config;
pub mod enricher;
pub mod error;
pub mod request;
pub mod response;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use client::CompletionClient;
pub use config::{EnricherConfig, RunSettings};
pub use enricher::{Enricher, RowOutcome, RunReport};
pub use error::{
    BoxError, CompletionError, ConfigError, EnrichError, EnrichResult, ResponseError, StoreError,
};
pub use request::{ChatMessage, CompletionRequest, Role};
pub use response::{parse_dictionary, strip_code_fence};
pub use store::ContentStore;
pub use types::{AnnotationDictionary, ContentRow, SourceColumn};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and driving a run
    pub use crate::{
        AnnotationDictionary, CompletionClient, CompletionRequest, ContentRow, ContentStore,
        Enricher, EnricherConfig, RunReport, RunSettings, SourceColumn,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
