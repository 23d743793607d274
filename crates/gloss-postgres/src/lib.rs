//! PostgreSQL content store
//!
//! Reads pending rows from `public.content` and writes dictionaries into its
//! `translation_dictionary` (jsonb) column. Every update runs as its own
//! autocommitted statement on one dedicated connection.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use async_trait::async_trait;
use gloss_core::{AnnotationDictionary, ContentRow, ContentStore, SourceColumn, StoreError};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Mutex;

/// Upper bound on the single connection attempt
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Update statement for one row's dictionary
pub const UPDATE_DICTIONARY_SQL: &str =
    "UPDATE public.content SET translation_dictionary = $1::jsonb WHERE id = $2";

/// Selection query for rows still lacking a dictionary
///
/// Only the closed [`SourceColumn`] set is ever interpolated.
#[must_use]
pub fn select_pending_sql(column: SourceColumn) -> String {
    let col = column.as_str();
    format!(
        "SELECT id, {col} FROM public.content \
         WHERE translation_dictionary IS NULL AND {col} IS NOT NULL AND {col} <> '' \
         LIMIT $1"
    )
}

/// Content store over one PostgreSQL connection
///
/// The connection is opened with a single attempt; a refused or unreachable
/// server fails `connect` immediately.
#[derive(Debug)]
pub struct PgContentStore {
    conn: Mutex<Option<PgConnection>>,
}

impl PgContentStore {
    /// Open the connection
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = PgConnectOptions::from_str(database_url).map_err(StoreError::connect)?;

        let conn = tokio::time::timeout(CONNECT_TIMEOUT, PgConnection::connect_with(&options))
            .await
            .map_err(|_| {
                StoreError::connect(format!(
                    "no answer within {}s",
                    CONNECT_TIMEOUT.as_secs()
                ))
            })?
            .map_err(StoreError::connect)?;

        tracing::debug!("postgres connection ready");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn fetch_pending(
        &self,
        column: SourceColumn,
        limit: u32,
    ) -> Result<Vec<ContentRow>, StoreError> {
        let mut guard = self.conn.lock().await;
        let conn = guard
            .as_mut()
            .ok_or_else(|| StoreError::query("connection already closed"))?;

        let sql = select_pending_sql(column);
        let rows: Vec<(String, Option<String>)> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&mut *conn)
            .await
            .map_err(StoreError::query)?;

        Ok(rows
            .into_iter()
            .map(|(id, text)| ContentRow::new(id, text))
            .collect())
    }

    async fn write_dictionary(
        &self,
        id: &str,
        dictionary: &AnnotationDictionary,
    ) -> Result<bool, StoreError> {
        let text = dictionary
            .to_json_text()
            .map_err(|source| StoreError::Serialize {
                id: id.to_string(),
                source,
            })?;

        let mut guard = self.conn.lock().await;
        let conn = guard
            .as_mut()
            .ok_or_else(|| StoreError::write(id, "connection already closed"))?;

        let result = sqlx::query(UPDATE_DICTIONARY_SQL)
            .bind(text)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::write(id, e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        if let Some(conn) = self.conn.lock().await.take() {
            if let Err(err) = conn.close().await {
                tracing::warn!("error closing database connection: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn select_uses_chosen_column() {
        assert_eq!(
            select_pending_sql(SourceColumn::ShortBlurb),
            "SELECT id, short_blurb FROM public.content \
             WHERE translation_dictionary IS NULL AND short_blurb IS NOT NULL \
             AND short_blurb <> '' LIMIT $1"
        );
    }

    #[test]
    fn select_for_description_never_mentions_blurb() {
        let sql = select_pending_sql(SourceColumn::ShortDescription);
        assert!(sql.contains("short_description IS NOT NULL"));
        assert!(sql.contains("short_description <> ''"));
        assert!(!sql.contains("short_blurb"));
    }

    #[test]
    fn fallback_column_builds_blurb_query() {
        let sql = select_pending_sql(SourceColumn::from_name("mindmap"));
        assert!(sql.starts_with("SELECT id, short_blurb "));
    }

    #[test]
    fn update_targets_one_row() {
        assert!(UPDATE_DICTIONARY_SQL.contains("SET translation_dictionary = $1::jsonb"));
        assert!(UPDATE_DICTIONARY_SQL.ends_with("WHERE id = $2"));
    }

    #[tokio::test]
    async fn malformed_url_fails_without_connecting() {
        let err = PgContentStore::connect("not a url").await.unwrap_err();
        assert!(matches!(err, StoreError::Connect(_)));
    }
}
