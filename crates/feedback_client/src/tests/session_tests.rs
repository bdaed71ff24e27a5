use super::*;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_session_path(label: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir()
        .join(format!("feedback_client_{label}_{unique}"))
        .join("session.json")
}

fn sample_session() -> Session {
    Session {
        token: "tok-123".to_string(),
        user_id: UserId(42),
    }
}

#[tokio::test]
async fn starts_empty_and_round_trips_saved_session() {
    let store = SessionStore::in_memory();
    assert!(store.load().await.is_none());

    store.save(&sample_session()).await.expect("save");
    assert_eq!(store.load().await, Some(sample_session()));

    store.clear().await.expect("clear");
    assert!(store.load().await.is_none());
}

#[tokio::test]
async fn missing_user_id_reads_as_absent() {
    let store = SessionStore::in_memory();
    store.set_raw(TOKEN_KEY, "tok").await.expect("seed token");
    assert!(store.load().await.is_none());
}

#[tokio::test]
async fn non_numeric_user_id_reads_as_absent() {
    let store = SessionStore::in_memory();
    store.set_raw(TOKEN_KEY, "tok").await.expect("seed token");
    store.set_raw(USER_ID_KEY, "abc").await.expect("seed id");
    assert!(store.load().await.is_none());
}

#[tokio::test]
async fn user_id_is_stored_as_plain_decimal_string() {
    let mut backend = MemoryKeyValueStore::default();
    backend.set(USER_ID_KEY, "7").expect("set");
    assert_eq!(backend.get(USER_ID_KEY).expect("get"), Some("7".to_string()));

    let store = SessionStore::new(Box::new(backend));
    store.set_raw(TOKEN_KEY, "tok").await.expect("seed token");
    let session = store.load().await.expect("session");
    assert_eq!(session.user_id, UserId(7));
}

#[tokio::test]
async fn json_file_store_survives_reopen() {
    let path = temp_session_path("reopen");

    {
        let backend = JsonFileKeyValueStore::open(&path).expect("open");
        let store = SessionStore::new(Box::new(backend));
        store.save(&sample_session()).await.expect("save");
    }

    let raw = fs::read_to_string(&path).expect("session file");
    let on_disk: BTreeMap<String, String> = serde_json::from_str(&raw).expect("json");
    assert_eq!(on_disk.get(USER_ID_KEY).map(String::as_str), Some("42"));
    assert_eq!(on_disk.get(TOKEN_KEY).map(String::as_str), Some("tok-123"));

    let reopened = SessionStore::new(Box::new(JsonFileKeyValueStore::open(&path).expect("reopen")));
    assert_eq!(reopened.load().await, Some(sample_session()));

    reopened.clear().await.expect("clear");
    let cleared = JsonFileKeyValueStore::open(&path).expect("reopen after clear");
    assert_eq!(cleared.get(TOKEN_KEY).expect("get"), None);

    if let Some(dir) = path.parent() {
        fs::remove_dir_all(dir).expect("cleanup");
    }
}

#[test]
fn json_file_store_rejects_corrupt_file() {
    let path = temp_session_path("corrupt");
    let dir = path.parent().expect("parent").to_path_buf();
    fs::create_dir_all(&dir).expect("dir");
    fs::write(&path, "not json").expect("write");

    let err = JsonFileKeyValueStore::open(&path).expect_err("must fail");
    assert!(matches!(err, SessionStoreError::Corrupt { .. }));

    fs::remove_dir_all(dir).expect("cleanup");
}

#[tokio::test]
async fn load_or_clear_removes_orphaned_user_id() {
    let store = SessionStore::in_memory();
    store.set_raw(USER_ID_KEY, "7").await.expect("seed id");

    assert!(store.load_or_clear().await.is_none());
    assert_eq!(store.get_raw(USER_ID_KEY).await, None);

    store.set_raw(TOKEN_KEY, "tok").await.expect("seed token");
    assert!(store.load().await.is_none());
}

#[tokio::test]
async fn load_or_clear_keeps_complete_session() {
    let store = SessionStore::in_memory();
    store.save(&sample_session()).await.expect("save");

    assert_eq!(store.load_or_clear().await, Some(sample_session()));
    assert_eq!(store.get_raw(TOKEN_KEY).await.as_deref(), Some("tok-123"));
}
