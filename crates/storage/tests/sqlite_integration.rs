use storage::repository::{DocumentRepository, DocumentTemplate, InitOutcome, StorageError};
use storage::sqlite::{BUSY_TIMEOUT, SqliteRepository};
use tempfile::tempdir;
use tracker_core::model::{AppData, Observation, ObservationId, RecordId, StepId};
use tracker_core::mutation::{replace_observations, toggle_step_completed};
use tracker_core::template::sample_document;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_load_before_write_is_not_found() {
    let repo = connect("memdb_not_found").await;
    assert!(!repo.exists().await.unwrap());
    assert!(matches!(repo.load().await, Err(StorageError::NotFound)));
}

#[tokio::test]
async fn sqlite_replace_then_load_round_trips() {
    let repo = connect("memdb_roundtrip").await;

    let doc = sample_document();
    let doc = toggle_step_completed(&doc, &RecordId::new("4"), &StepId::new("wifi")).unwrap();
    let doc = replace_observations(
        &doc,
        &RecordId::new("4"),
        vec![
            Observation::text(ObservationId::new("1"), "baie saturée"),
            Observation::todo(ObservationId::new("2"), "commander switch"),
        ],
    )
    .unwrap();

    repo.replace(&doc).await.unwrap();
    let loaded = repo.load().await.unwrap();
    assert_eq!(loaded, doc);
}

#[tokio::test]
async fn sqlite_replace_overwrites_single_row() {
    let repo = connect("memdb_overwrite").await;
    repo.replace(&sample_document()).await.unwrap();
    repo.replace(&AppData::fallback("Autre")).await.unwrap();

    let loaded = repo.load().await.unwrap();
    assert_eq!(loaded, AppData::fallback("Autre"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn sqlite_initialize_is_idempotent() {
    let repo = connect("memdb_init").await;
    let template = DocumentTemplate::new(None, "Suivi de Chantier");
    assert_eq!(
        repo.initialize_if_absent(&template).await.unwrap(),
        InitOutcome::WroteFallback
    );
    assert_eq!(
        repo.initialize_if_absent(&template).await.unwrap(),
        InitOutcome::AlreadyPresent
    );
}

#[tokio::test]
async fn sqlite_migrations_can_run_twice() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn sqlite_file_database_is_created_in_wal_mode() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tracker.db");
    let repo = SqliteRepository::connect(&format!("sqlite://{}", path.display()))
        .await
        .expect("connect creates the file");
    assert!(path.exists());

    let journal: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(journal.to_lowercase(), "wal");

    let busy_ms: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(busy_ms, i64::try_from(BUSY_TIMEOUT.as_millis()).unwrap());
}
