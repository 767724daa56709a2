use std::collections::BTreeMap;

use assert_matches::assert_matches;
use chrono::Local;
use rusqlite::Connection;
use tempfile::tempdir;

use quizmaster::result::QuizResult;
use quizmaster::store::{
    ResultStore, SqliteProvider, SqliteResultStore, StoreError, StoreEvent, StoreProvider,
    StoreRequest, StoreWorker,
};

fn sample(score: u32) -> QuizResult {
    QuizResult {
        date: Local::now(),
        score,
        total_questions: 3,
        answers: BTreeMap::from([(1, 0), (2, -42), (3, 1)]),
    }
}

#[test]
fn appended_result_reads_back_equal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("quiz.db");

    let original = sample(2);
    let id = {
        let mut store = SqliteResultStore::open(&path).unwrap();
        store.append(&original).unwrap()
    };
    assert_eq!(id, 1);

    // a fresh connection sees the committed record
    let store = SqliteResultStore::open(&path).unwrap();
    assert_eq!(store.read_all().unwrap(), vec![original]);
}

#[test]
fn ids_increase_per_append() {
    let mut store = SqliteResultStore::open_in_memory().unwrap();
    let a = store.append(&sample(1)).unwrap();
    let b = store.append(&sample(2)).unwrap();
    assert!(b > a);
    assert_eq!(store.read_all().unwrap().len(), 2);
}

#[test]
fn foreign_schema_needs_reset() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quiz.db");
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 7;").unwrap();
    }

    let mut store = SqliteResultStore::open(&path).unwrap();
    assert_matches!(store.read_all(), Err(StoreError::ReadFailed(_)));
    assert_matches!(store.append(&sample(1)), Err(StoreError::WriteFailed(_)));

    store.reset().unwrap();
    assert_eq!(store.read_all().unwrap(), vec![]);
    store.append(&sample(3)).unwrap();
    assert_eq!(store.read_all().unwrap().len(), 1);
}

#[test]
fn provider_destroy_starts_empty() {
    let dir = tempdir().unwrap();
    let provider = SqliteProvider::new(dir.path().join("quiz.db"));
    {
        let mut store = provider.open().unwrap();
        store.append(&sample(1)).unwrap();
    }
    provider.destroy().unwrap();
    let store = provider.open().unwrap();
    assert_eq!(store.read_all().unwrap(), vec![]);
}

#[test]
fn worker_round_trip_on_sqlite() {
    let dir = tempdir().unwrap();
    let mut worker = StoreWorker::new(SqliteProvider::new(dir.path().join("quiz.db")));

    let original = sample(3);
    assert_matches!(
        worker.handle(StoreRequest::Append(original.clone())),
        StoreEvent::Appended(Ok(1))
    );
    assert_matches!(
        worker.handle(StoreRequest::ReadAll),
        StoreEvent::Loaded(Ok(results)) if results == vec![original.clone()]
    );
    assert_matches!(worker.handle(StoreRequest::Reset), StoreEvent::Reset(Ok(())));
    assert_matches!(
        worker.handle(StoreRequest::ReadAll),
        StoreEvent::Loaded(Ok(results)) if results.is_empty()
    );
}
