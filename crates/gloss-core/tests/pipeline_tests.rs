//! Pipeline tests
//!
//! End-to-end runs over the in-memory store and scripted client.

use gloss_core::prelude::*;
use gloss_test_utils::fixtures::{quantum_row, QUANTUM_DICTIONARY, QUANTUM_REPLY, QUANTUM_TEXT};
use gloss_test_utils::{InMemoryStore, ScriptedClient, ScriptedReply, StoredRow};
use pretty_assertions::assert_eq;

async fn run(store: &InMemoryStore, client: &ScriptedClient, settings: RunSettings) -> RunReport {
    Enricher::new(store.clone(), client.clone(), settings).run().await
}

#[tokio::test]
async fn test_writes_dictionary_and_never_reselects() {
    let store = InMemoryStore::new([quantum_row()]);
    let client = ScriptedClient::new([ScriptedReply::text(QUANTUM_REPLY)]);

    let report = run(&store, &client, RunSettings::default()).await;

    assert_eq!(report.updated, 1);
    assert_eq!(store.dictionary("7").as_deref(), Some(QUANTUM_DICTIONARY));
    assert!(client.requests()[0]
        .user_content()
        .is_some_and(|c| c.contains(QUANTUM_TEXT)));

    // Second run sees nothing left to do
    let second = ScriptedClient::default();
    let report = run(&store, &second, RunSettings::default()).await;
    assert_eq!(report.fetched, 0);
    assert_eq!(second.calls(), 0);
}

#[tokio::test]
async fn test_malformed_response_leaves_row_untouched() {
    let store = InMemoryStore::new([quantum_row(), StoredRow::blurb("8", "Ubiquitous paradigms")]);
    let client = ScriptedClient::new([
        ScriptedReply::text("Sorry, I cannot help."),
        ScriptedReply::text("{\"ubiquitous\": \"phổ biến\"}"),
    ]);

    let report = run(&store, &client, RunSettings::default()).await;

    assert_eq!(report.invalid_response, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(store.dictionary("7"), None);
    assert_eq!(store.dictionary("8").as_deref(), Some(r#"{"ubiquitous": "phổ biến"}"#));
}

#[tokio::test]
async fn test_non_object_json_is_never_written() {
    let rows = (1..=4).map(|i| StoredRow::blurb(&i.to_string(), "Some academic text"));
    let store = InMemoryStore::new(rows);
    let client = ScriptedClient::new(
        ["[1,2]", "\"a string\"", "42", "null"].map(ScriptedReply::text),
    );

    let report = run(&store, &client, RunSettings::default()).await;

    assert_eq!(report.invalid_response, 4);
    assert!(store.rows().iter().all(|r| r.translation_dictionary.is_none()));
}

#[tokio::test]
async fn test_zero_eligible_rows_makes_no_calls() {
    let store = InMemoryStore::new([
        StoredRow::blurb("1", "already done").annotated("{}"),
        StoredRow::blurb("2", ""),
        StoredRow::description("3", "only has a description"),
    ]);
    let client = ScriptedClient::default();

    let report = run(&store, &client, RunSettings::default()).await;

    assert_eq!(report, RunReport::default());
    assert_eq!(client.calls(), 0);
    assert_eq!(store.close_calls(), 1);
}

#[tokio::test]
async fn test_selector_predicate_per_column() {
    let store = InMemoryStore::new([
        StoredRow::blurb("1", "blurb only"),
        StoredRow::description("2", "description only"),
        StoredRow::description("3", "annotated").annotated("{\"x\": \"y\"}"),
        StoredRow::description("4", ""),
        StoredRow {
            id: "5".into(),
            ..StoredRow::default()
        },
    ]);

    let blurbs = store.fetch_pending(SourceColumn::ShortBlurb, 300).await.unwrap();
    let ids: Vec<_> = blurbs.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1"]);

    let descriptions = store
        .fetch_pending(SourceColumn::ShortDescription, 300)
        .await
        .unwrap();
    assert_eq!(
        descriptions,
        vec![ContentRow::new("2", Some("description only".to_string()))]
    );
}

#[tokio::test]
async fn test_batch_limit_caps_selection() {
    let store = InMemoryStore::new((0..10).map(|i| StoredRow::blurb(&format!("row-{i}"), "text")));
    let client = ScriptedClient::default();

    let report = run(&store, &client, RunSettings::new().with_batch_limit(3)).await;

    assert_eq!(report.fetched, 3);
    assert_eq!(client.calls(), 3);
    assert_eq!(report.no_response, 3);
}

#[tokio::test]
async fn test_whitespace_only_text_is_skipped_before_the_service() {
    let store = InMemoryStore::new([StoredRow::blurb("1", "   \n "), quantum_row()]);
    let client = ScriptedClient::new([ScriptedReply::text(QUANTUM_REPLY)]);

    let report = run(&store, &client, RunSettings::default()).await;

    assert_eq!(report.skipped_blank, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(client.calls(), 1);
    assert_eq!(store.dictionary("1"), None);
}

#[tokio::test]
async fn test_service_and_write_failures_are_row_scoped() {
    let store = InMemoryStore::new([
        StoredRow::blurb("a", "first"),
        StoredRow::blurb("b", "second"),
        StoredRow::blurb("c", "third"),
    ])
    .failing_write("b");
    let client = ScriptedClient::new([
        ScriptedReply::Fail {
            status: 500,
            body: "internal error".into(),
        },
        ScriptedReply::text("{\"second\": \"thứ hai\"}"),
        ScriptedReply::text("```\n{\"third\": \"thứ ba\"}\n```"),
    ]);

    let report = run(&store, &client, RunSettings::default()).await;

    assert_eq!(report.no_response, 1);
    assert_eq!(report.write_failed, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(store.dictionary("b"), None);
    assert_eq!(store.dictionary("c").as_deref(), Some(r#"{"third": "thứ ba"}"#));
}

#[tokio::test]
async fn test_fetch_failure_completes_cleanly() {
    let store = InMemoryStore::new([quantum_row()]).failing_fetch();
    let client = ScriptedClient::default();

    let report = run(&store, &client, RunSettings::default()).await;

    assert_eq!(report.fetched, 0);
    assert_eq!(client.calls(), 0);
    assert_eq!(store.close_calls(), 1);
}

#[tokio::test]
async fn test_panic_in_row_aborts_loop_but_closes_store() {
    let store = InMemoryStore::new([
        StoredRow::blurb("1", "first"),
        StoredRow::blurb("2", "second"),
        StoredRow::blurb("3", "third"),
    ]);
    let client = ScriptedClient::new([
        ScriptedReply::text("{\"first\": \"thứ nhất\"}"),
        ScriptedReply::Panic("service client blew up".into()),
        ScriptedReply::text("{\"third\": \"thứ ba\"}"),
    ]);

    let report = run(&store, &client, RunSettings::default()).await;

    assert!(report.aborted);
    assert_eq!(report.updated, 1);
    assert_eq!(client.calls(), 2, "loop must not be re-entered after a panic");
    assert_eq!(store.dictionary("3"), None);
    assert_eq!(store.close_calls(), 1);
}

#[tokio::test]
async fn test_description_column_run() {
    let store = InMemoryStore::new([
        StoredRow::blurb("1", "blurb text"),
        StoredRow::description("2", "Epistemological inquiry"),
    ]);
    let client = ScriptedClient::new([ScriptedReply::text(
        "{\"epistemological\": \"nhận thức luận\"}",
    )]);

    let settings =
        RunSettings::new().with_source_column(SourceColumn::from_name("short_description"));
    let report = run(&store, &client, settings).await;

    assert_eq!(report.updated, 1);
    assert_eq!(store.dictionary("1"), None);
    assert!(store.dictionary("2").is_some());
}
