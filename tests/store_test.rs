//! Content store and sweeper behavior against an in-memory SQLite database.

use chrono::{Duration, Utc};
use clipbridge::cleanup::Sweeper;
use clipbridge::config::Config;
use clipbridge::database::Database;
use clipbridge::error::AppError;
use clipbridge::models::{Item, ItemKind};
use clipbridge::services::ClipboardService;
use uuid::Uuid;

/// Named shared-cache in-memory database so every pool connection sees the
/// same data. Each test passes a unique name to stay isolated.
async fn test_db(name: &str) -> Database {
    // The file: scheme is required for the name to identify one shared
    // in-memory database; without it each pooled connection gets its own.
    let url = format!("sqlite:file:{}?mode=memory&cache=shared", name);
    let db = Database::new(&url).await.expect("connect test db");
    db.migrate().await.expect("migrate test db");
    db
}

fn test_config(name: &str) -> Config {
    Config {
        port: 0,
        database_url: format!("sqlite:file:{}?mode=memory&cache=shared", name),
        upload_dir: "./uploads".to_string(),
        retention_hours: 24,
        sweep_interval_secs: 3600,
    }
}

async fn test_service(name: &str) -> (ClipboardService, Database) {
    let db = test_db(name).await;
    (ClipboardService::new(test_config(name), db.clone()), db)
}

/// Item backdated by `hours_ago`, bypassing the service so tests control the
/// clock instead of waiting for real time to pass.
fn backdated(owner: &str, kind: ItemKind, payload: &str, hours_ago: i64) -> Item {
    Item {
        id: Uuid::new_v4().to_string(),
        owner_id: owner.to_string(),
        kind,
        payload: payload.to_string(),
        created_at: Utc::now() - Duration::hours(hours_ago),
    }
}

#[tokio::test]
async fn kind_stays_typed_through_the_store() {
    let db = test_db("typed_kind").await;

    db.insert_item(&backdated("u1", ItemKind::File, "doc.pdf", 2))
        .await
        .unwrap();
    db.insert_item(&backdated("u1", ItemKind::Text, "note", 1))
        .await
        .unwrap();

    let cutoff = Utc::now() - Duration::hours(24);
    let items = db.list_by_owner("u1", cutoff).await.unwrap();
    assert_eq!(items[0].kind, ItemKind::Text);
    assert_eq!(items[1].kind, ItemKind::File);
}

#[tokio::test]
async fn append_text_is_immediately_visible() {
    let (service, _db) = test_service("append_visible").await;

    service.append_text("u1", "hello").await.unwrap();

    let items = service.list("u1").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].kind, ItemKind::Text);
    assert_eq!(items[0].content.as_deref(), Some("hello"));
    assert_eq!(items[0].filename, None);
}

#[tokio::test]
async fn whitespace_text_is_rejected() {
    let (service, _db) = test_service("whitespace_rejected").await;

    let err = service.append_text("u1", "  ").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Nothing was stored
    assert!(service.list("u1").await.unwrap().is_empty());
}

#[tokio::test]
async fn text_is_stored_trimmed() {
    let (service, _db) = test_service("stored_trimmed").await;

    service.append_text("u1", "  padded  ").await.unwrap();

    let items = service.list("u1").await.unwrap();
    assert_eq!(items[0].content.as_deref(), Some("padded"));
}

#[tokio::test]
async fn owners_never_see_each_others_items() {
    let (service, _db) = test_service("owner_isolation").await;

    service.append_text("alice", "for alice").await.unwrap();
    service.append_file("alice", "alice.pdf").await.unwrap();
    service.append_text("bob", "for bob").await.unwrap();

    let alice = service.list("alice").await.unwrap();
    assert_eq!(alice.len(), 2);

    let bob = service.list("bob").await.unwrap();
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].content.as_deref(), Some("for bob"));
}

#[tokio::test]
async fn file_items_render_owner_relative_paths() {
    let (service, _db) = test_service("file_paths").await;

    service.append_file("u1", "doc.pdf").await.unwrap();

    let items = service.list("u1").await.unwrap();
    assert_eq!(items[0].kind, ItemKind::File);
    assert_eq!(items[0].filename.as_deref(), Some("u1/doc.pdf"));
    assert_eq!(items[0].content, None);
}

#[tokio::test]
async fn listing_is_newest_first_with_stable_ties() {
    let db = test_db("ordering").await;
    let tie_time = Utc::now() - Duration::hours(1);

    let oldest = backdated("u1", ItemKind::Text, "oldest", 2);
    let mut tie_a = backdated("u1", ItemKind::Text, "tie-a", 1);
    let mut tie_b = backdated("u1", ItemKind::Text, "tie-b", 1);
    tie_a.created_at = tie_time;
    tie_b.created_at = tie_time;
    let newest = backdated("u1", ItemKind::Text, "newest", 0);

    db.insert_item(&oldest).await.unwrap();
    db.insert_item(&tie_a).await.unwrap();
    db.insert_item(&tie_b).await.unwrap();
    db.insert_item(&newest).await.unwrap();

    let cutoff = Utc::now() - Duration::hours(24);
    let items = db.list_by_owner("u1", cutoff).await.unwrap();
    let payloads: Vec<&str> = items.iter().map(|i| i.payload.as_str()).collect();

    // Equal timestamps keep insertion order
    assert_eq!(payloads, vec!["newest", "tie-a", "tie-b", "oldest"]);
}

#[tokio::test]
async fn item_at_exact_cutoff_is_excluded() {
    let db = test_db("boundary").await;
    let item = backdated("u1", ItemKind::Text, "boundary", 24);

    db.insert_item(&item).await.unwrap();

    // created_at == cutoff means age >= retention, so it must not be listed
    let at_cutoff = db.list_by_owner("u1", item.created_at).await.unwrap();
    assert!(at_cutoff.is_empty());

    // A cutoff one second earlier still shows it
    let just_before = db
        .list_by_owner("u1", item.created_at - Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(just_before.len(), 1);
}

#[tokio::test]
async fn clear_is_idempotent_and_counts() {
    let (service, db) = test_service("clear_idempotent").await;

    service.append_text("u1", "one").await.unwrap();
    service.append_text("u1", "two").await.unwrap();
    // Expired items are cleared too
    db.insert_item(&backdated("u1", ItemKind::Text, "stale", 30))
        .await
        .unwrap();

    assert_eq!(service.clear("u1").await.unwrap(), 3);
    assert_eq!(service.clear("u1").await.unwrap(), 0);
}

#[tokio::test]
async fn retention_scenario_23h_visible_25h_gone() {
    let (service, db) = test_service("retention_scenario").await;

    // Text appended first, file second, at the same instant 23h ago
    let t0 = Utc::now() - Duration::hours(23);
    let mut text = backdated("u1", ItemKind::Text, "abc", 23);
    let mut file = backdated("u1", ItemKind::File, "doc.pdf", 23);
    text.created_at = t0;
    file.created_at = t0;
    db.insert_item(&text).await.unwrap();
    db.insert_item(&file).await.unwrap();

    let at_23h = service.list("u1").await.unwrap();
    assert_eq!(at_23h.len(), 2);
    assert_eq!(at_23h[0].content.as_deref(), Some("abc"));
    assert_eq!(at_23h[1].filename.as_deref(), Some("u1/doc.pdf"));

    // Same pair, now 25 hours old: hidden from listing, removed by purge
    service.clear("u1").await.unwrap();
    db.insert_item(&backdated("u1", ItemKind::Text, "abc", 25))
        .await
        .unwrap();
    db.insert_item(&backdated("u1", ItemKind::File, "doc.pdf", 25))
        .await
        .unwrap();

    assert!(service.list("u1").await.unwrap().is_empty());

    let purged = db
        .purge_expired(Utc::now() - Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(purged, 2);
}

#[tokio::test]
async fn sweep_removes_expired_across_owners_only() {
    let (service, db) = test_service("sweep_selective").await;

    db.insert_item(&backdated("u1", ItemKind::Text, "old-1", 26))
        .await
        .unwrap();
    db.insert_item(&backdated("u2", ItemKind::File, "old.pdf", 48))
        .await
        .unwrap();
    service.append_text("u1", "fresh").await.unwrap();

    let sweeper = Sweeper::new(service.clone(), 3600);
    assert_eq!(sweeper.sweep_once().await, 2);

    // Live item survives; a second sweep finds nothing
    assert_eq!(service.list("u1").await.unwrap().len(), 1);
    assert_eq!(sweeper.sweep_once().await, 0);
}

#[tokio::test]
async fn sweep_survives_store_failure() {
    let (service, db) = test_service("sweep_failure").await;
    db.close().await;

    // Foreground operations surface the store error
    let err = service.append_text("u1", "hello").await.unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    // The sweeper logs and carries on instead of propagating
    let sweeper = Sweeper::new(service, 3600);
    assert_eq!(sweeper.sweep_once().await, 0);
}
