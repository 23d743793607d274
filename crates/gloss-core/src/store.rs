//! Content store seam
//!
//! Implemented over PostgreSQL by `gloss-postgres` and in memory by
//! `gloss-test-utils`.

use crate::error::StoreError;
use crate::types::{AnnotationDictionary, ContentRow, SourceColumn};
use async_trait::async_trait;

/// Row source and annotation sink
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Select up to `limit` rows whose dictionary is unset and whose `column`
    /// is neither null nor empty
    async fn fetch_pending(
        &self,
        column: SourceColumn,
        limit: u32,
    ) -> Result<Vec<ContentRow>, StoreError>;

    /// Persist a dictionary for one row and commit
    ///
    /// Returns `Ok(false)` when no row has the given identifier.
    async fn write_dictionary(
        &self,
        id: &str,
        dictionary: &AnnotationDictionary,
    ) -> Result<bool, StoreError>;

    /// Release the connection
    async fn close(&self);
}
