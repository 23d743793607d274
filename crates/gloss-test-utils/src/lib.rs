//! Testing utilities for Gloss workspace
//!
//! In-memory doubles for the store and completion seams, plus fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use gloss_core::{
    AnnotationDictionary, CompletionClient, CompletionError, CompletionRequest, ContentRow,
    ContentStore, SourceColumn, StoreError,
};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// One row of the in-memory `content` table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredRow {
    pub id: String,
    pub short_blurb: Option<String>,
    pub short_description: Option<String>,
    pub translation_dictionary: Option<String>,
}

impl StoredRow {
    pub fn blurb(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            short_blurb: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn description(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            short_description: Some(text.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn annotated(mut self, dictionary: &str) -> Self {
        self.translation_dictionary = Some(dictionary.to_string());
        self
    }

    fn column(&self, column: SourceColumn) -> Option<&String> {
        match column {
            SourceColumn::ShortBlurb => self.short_blurb.as_ref(),
            SourceColumn::ShortDescription => self.short_description.as_ref(),
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    rows: Vec<StoredRow>,
    fetch_calls: usize,
    close_calls: usize,
    fail_fetch: bool,
    fail_writes: HashSet<String>,
}

/// Content store backed by a vector, applying the same selection predicate as
/// the SQL store
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new(rows: impl IntoIterator<Item = StoredRow>) -> Self {
        let store = Self::default();
        store.state.lock().rows = rows.into_iter().collect();
        store
    }

    /// Make every fetch fail
    #[must_use]
    pub fn failing_fetch(self) -> Self {
        self.state.lock().fail_fetch = true;
        self
    }

    /// Make writes for `id` fail
    #[must_use]
    pub fn failing_write(self, id: &str) -> Self {
        self.state.lock().fail_writes.insert(id.to_string());
        self
    }

    pub fn dictionary(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .rows
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| r.translation_dictionary.clone())
    }

    pub fn rows(&self) -> Vec<StoredRow> {
        self.state.lock().rows.clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.state.lock().fetch_calls
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().close_calls
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn fetch_pending(
        &self,
        column: SourceColumn,
        limit: u32,
    ) -> Result<Vec<ContentRow>, StoreError> {
        let mut state = self.state.lock();
        state.fetch_calls += 1;
        if state.fail_fetch {
            return Err(StoreError::query("relation \"public.content\" does not exist"));
        }

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(state
            .rows
            .iter()
            .filter(|r| r.translation_dictionary.is_none())
            .filter(|r| r.column(column).is_some_and(|text| !text.is_empty()))
            .take(limit)
            .map(|r| ContentRow::new(r.id.clone(), r.column(column).cloned()))
            .collect())
    }

    async fn write_dictionary(
        &self,
        id: &str,
        dictionary: &AnnotationDictionary,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock();
        if state.fail_writes.contains(id) {
            return Err(StoreError::write(id, "could not serialize access"));
        }
        let text = dictionary
            .to_json_text()
            .map_err(|source| StoreError::Serialize {
                id: id.to_string(),
                source,
            })?;

        match state.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.translation_dictionary = Some(text);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn close(&self) {
        self.state.lock().close_calls += 1;
    }
}

/// Canned reply for [`ScriptedClient`]
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Service returns this text
    Text(String),
    /// Service returns no content
    Empty,
    /// Service answers with an error status
    Fail { status: u16, body: String },
    /// The call panics
    Panic(String),
}

impl ScriptedReply {
    pub fn text(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

#[derive(Debug, Default)]
struct ClientState {
    replies: VecDeque<ScriptedReply>,
    requests: Vec<CompletionRequest>,
}

/// Completion client that replays queued replies in order
///
/// Once the queue runs dry every call answers `Empty`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClient {
    state: Arc<Mutex<ClientState>>,
}

impl ScriptedClient {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        let client = Self::default();
        client.state.lock().replies = replies.into_iter().collect();
        client
    }

    pub fn calls(&self) -> usize {
        self.state.lock().requests.len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.state.lock().requests.clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<String>, CompletionError> {
        let reply = {
            let mut state = self.state.lock();
            state.requests.push(request.clone());
            state.replies.pop_front().unwrap_or(ScriptedReply::Empty)
        };

        match reply {
            ScriptedReply::Text(text) => Ok(Some(text)),
            ScriptedReply::Empty => Ok(None),
            ScriptedReply::Fail { status, body } => Err(CompletionError::Status { status, body }),
            ScriptedReply::Panic(message) => panic!("{message}"),
        }
    }
}

/// Shared fixtures
pub mod fixtures {
    use super::StoredRow;

    pub const QUANTUM_TEXT: &str = "The ephemeral nature of quantum phenomena...";

    pub const QUANTUM_REPLY: &str =
        "```json\n{\"ephemeral\": \"tạm thời\", \"phenomena\": \"hiện tượng\"}\n```";

    pub const QUANTUM_DICTIONARY: &str =
        r#"{"ephemeral": "tạm thời", "phenomena": "hiện tượng"}"#;

    pub fn quantum_row() -> StoredRow {
        StoredRow::blurb("7", QUANTUM_TEXT)
    }
}
