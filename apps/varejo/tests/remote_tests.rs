//! Integration tests for the remote store mirrors.
//!
//! Uses wiremock to stand in for Supabase (PostgREST) and Firestore.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use serde_json::json;
use std::sync::Arc;
use varejo::repository::{
    Database, FirestoreRepository, StoreRepository, SupabaseRepository,
};
use varejo_core::{Store, seed};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIRESTORE_DOCS: &str = "/projects/demo/databases/(default)/documents/stores";

fn stores() -> Vec<Store> {
    vec![
        seed::initial_stores().remove(0),
        seed::new_store("2", "2002", "OUTRA LTDA", "Outra", "Bia", "2024-02-02"),
    ]
}

fn firestore_doc(store: &Store, position: usize) -> serde_json::Value {
    json!({
        "name": format!("projects/demo/databases/(default)/documents/stores/{}", store.id),
        "fields": {
            "payload": { "stringValue": serde_json::to_string(store).unwrap() },
            "position": { "integerValue": position.to_string() },
        }
    })
}

// =============================================================================
// SUPABASE
// =============================================================================

#[tokio::test]
async fn test_supabase_fetch_sends_key_and_orders() {
    let server = MockServer::start().await;
    let rows: Vec<_> = stores()
        .into_iter()
        .enumerate()
        .map(|(i, s)| json!({ "id": s.id.clone(), "position": i, "data": s }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/rest/v1/stores"))
        .and(header("apikey", "anon"))
        .and(header("authorization", "Bearer anon"))
        .and(query_param("order", "position.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(&server)
        .await;

    let repo = SupabaseRepository::new(&server.uri(), "anon").unwrap();
    assert_eq!(repo.backend(), "supabase");
    assert_eq!(repo.fetch_stores().await.unwrap(), stores());
}

#[tokio::test]
async fn test_supabase_save_upserts_then_prunes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/stores"))
        .and(header("prefer", "resolution=merge-duplicates"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/stores"))
        .and(query_param("id", r#"not.in.("1","2")"#))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let repo = SupabaseRepository::new(&server.uri(), "anon").unwrap();
    repo.save_stores(&stores()).await.unwrap();
}

#[tokio::test]
async fn test_supabase_save_empty_list_clears_table() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/stores"))
        .and(query_param("id", "not.is.null"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let repo = SupabaseRepository::new(&server.uri(), "anon").unwrap();
    repo.save_stores(&[]).await.unwrap();
}

#[tokio::test]
async fn test_supabase_clear_uses_filter() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/stores"))
        .and(query_param("id", "not.is.null"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let repo = SupabaseRepository::new(&server.uri(), "anon").unwrap();
    repo.clear().await.unwrap();
}

#[tokio::test]
async fn test_supabase_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/stores"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let repo = SupabaseRepository::new(&server.uri(), "anon").unwrap();
    assert!(repo.fetch_stores().await.is_err());
}

// =============================================================================
// FIRESTORE
// =============================================================================

#[tokio::test]
async fn test_firestore_fetch_orders_by_position() {
    let server = MockServer::start().await;
    let all = stores();
    // Served out of order on purpose.
    let body = json!({ "documents": [firestore_doc(&all[1], 1), firestore_doc(&all[0], 0)] });

    Mock::given(method("GET"))
        .and(path(FIRESTORE_DOCS))
        .and(query_param("key", "k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let repo = FirestoreRepository::new(server.uri(), "demo", "k").unwrap();
    assert_eq!(repo.fetch_stores().await.unwrap(), all);
}

#[tokio::test]
async fn test_firestore_empty_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FIRESTORE_DOCS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let repo = FirestoreRepository::new(server.uri(), "demo", "k").unwrap();
    assert!(repo.fetch_stores().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_firestore_save_patches_each_document() {
    let server = MockServer::start().await;
    let all = stores();
    let body = json!({ "documents": [firestore_doc(&all[0], 0), firestore_doc(&all[1], 1)] });
    Mock::given(method("GET"))
        .and(path(FIRESTORE_DOCS))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{FIRESTORE_DOCS}/1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{FIRESTORE_DOCS}/2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let repo = FirestoreRepository::new(server.uri(), "demo", "k").unwrap();
    repo.save_stores(&stores()).await.unwrap();
}

#[tokio::test]
async fn test_firestore_save_deletes_dropped_documents() {
    let server = MockServer::start().await;
    let all = stores();
    let stale = seed::new_store("3", "3003", "VELHA LTDA", "Velha", "Caio", "2023-05-05");
    let body = json!({ "documents": [
        firestore_doc(&all[0], 0),
        firestore_doc(&all[1], 1),
        firestore_doc(&stale, 2),
    ] });
    Mock::given(method("GET"))
        .and(path(FIRESTORE_DOCS))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{FIRESTORE_DOCS}/3")))
        .and(query_param("key", "k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let repo = FirestoreRepository::new(server.uri(), "demo", "k").unwrap();
    repo.save_stores(&all).await.unwrap();
}

// =============================================================================
// FACADE WITH A REMOTE
// =============================================================================

#[tokio::test]
async fn test_refresh_pulls_remote_into_local() {
    let server = MockServer::start().await;
    let all = stores();
    let body = json!({ "documents": [firestore_doc(&all[0], 0), firestore_doc(&all[1], 1)] });
    Mock::given(method("GET"))
        .and(path(FIRESTORE_DOCS))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let remote: Arc<dyn StoreRepository> =
        Arc::new(FirestoreRepository::new(server.uri(), "demo", "k").unwrap());
    let db = Database::with_remote(&temp.path().join("db.redb"), Some(remote)).unwrap();

    assert_eq!(db.backend(), "firebase");
    assert_eq!(db.refresh().await, all);
    assert_eq!(db.load_stores(), all);
}

#[tokio::test]
async fn test_unreachable_remote_degrades_to_local() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let remote: Arc<dyn StoreRepository> =
        Arc::new(SupabaseRepository::new(&server.uri(), "anon").unwrap());
    let db = Database::with_remote(&temp.path().join("db.redb"), Some(remote)).unwrap();

    let edited = vec![stores().remove(1)];
    db.save_stores(&edited).await.unwrap();
    assert_eq!(db.refresh().await, edited);
}

#[tokio::test]
async fn test_import_replaces_remote_rows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let remote: Arc<dyn StoreRepository> =
        Arc::new(SupabaseRepository::new(&server.uri(), "anon").unwrap());
    let db = Database::with_remote(&temp.path().join("db.redb"), Some(remote)).unwrap();

    let one = varejo_core::formats::encode_backup(&stores()[..1]).unwrap();
    db.import_backup(&one).await.unwrap();
    db.import_backup(b"[]").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let calls: Vec<(String, Option<String>)> = requests
        .iter()
        .map(|r| (r.method.to_string(), r.url.query().map(str::to_owned)))
        .collect();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].0, "POST");
    assert_eq!(calls[1].0, "DELETE");
    assert!(calls[1].1.as_deref().unwrap().contains("not.in."));
    assert_eq!(calls[2].0, "DELETE");
    assert_eq!(calls[2].1.as_deref(), Some("id=not.is.null"));
}
