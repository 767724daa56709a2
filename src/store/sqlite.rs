use chrono::{DateTime, Local, SecondsFormat};
use log::{info, warn};
use rusqlite::{params, types::Type, Connection};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{ResultStore, StoreError, StoreProvider};
use crate::question::QuestionId;
use crate::result::QuizResult;

pub const SCHEMA_VERSION: i64 = 1;

const CREATE_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS quiz_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        score INTEGER NOT NULL,
        total_questions INTEGER NOT NULL,
        answers TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_quiz_results_date ON quiz_results(date);
"#;

fn unavailable(e: impl std::fmt::Display) -> StoreError {
    StoreError::StoreUnavailable(e.to_string())
}

/// SQLite-backed result store
#[derive(Debug)]
pub struct SqliteResultStore {
    conn: Connection,
}

impl SqliteResultStore {
    /// Open (creating if needed) the database file and its schema
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::StoreUnavailable(format!(
                    "failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let conn = Connection::open(path).map_err(unavailable)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self { conn };
        store.init_schema().map_err(unavailable)?;
        Ok(store)
    }

    fn schema_version(&self) -> rusqlite::Result<i64> {
        self.conn.query_row("PRAGMA user_version", [], |row| row.get(0))
    }

    /// Only a blank database gets a schema. A database stamped with some
    /// other version is left alone so `reset` stays the one way to wipe it.
    fn init_schema(&self) -> rusqlite::Result<()> {
        let version = self.schema_version()?;
        if version != 0 {
            if version != SCHEMA_VERSION {
                warn!("result store has schema version {}", version);
            }
            return Ok(());
        }
        self.conn.execute_batch(CREATE_SCHEMA)?;
        self.conn.execute_batch(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
    }

    fn check_schema(&self) -> Result<(), String> {
        match self.schema_version() {
            Ok(SCHEMA_VERSION) => Ok(()),
            Ok(other) => Err(format!("unsupported schema version {}", other)),
            Err(e) => Err(e.to_string()),
        }
    }
}

impl ResultStore for SqliteResultStore {
    fn append(&mut self, result: &QuizResult) -> Result<i64, StoreError> {
        self.check_schema().map_err(StoreError::WriteFailed)?;
        let answers = serde_json::to_string(&result.answers)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        self.conn
            .execute(
                r#"
                INSERT INTO quiz_results (date, score, total_questions, answers)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    result
                        .date
                        .to_rfc3339_opts(SecondsFormat::Nanos, false),
                    result.score,
                    result.total_questions,
                    answers,
                ],
            )
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn read_all(&self) -> Result<Vec<QuizResult>, StoreError> {
        self.check_schema().map_err(StoreError::ReadFailed)?;
        let read_failed = |e: rusqlite::Error| StoreError::ReadFailed(e.to_string());

        let mut stmt = self
            .conn
            .prepare("SELECT date, score, total_questions, answers FROM quiz_results")
            .map_err(read_failed)?;

        let rows = stmt
            .query_map([], |row| {
                let date_str: String = row.get(0)?;
                let date = DateTime::parse_from_rfc3339(&date_str)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                    })?
                    .with_timezone(&Local);

                let answers_str: String = row.get(3)?;
                let answers: BTreeMap<QuestionId, i64> = serde_json::from_str(&answers_str)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                    })?;

                Ok(QuizResult {
                    date,
                    score: row.get(1)?,
                    total_questions: row.get(2)?,
                    answers,
                })
            })
            .map_err(read_failed)?;

        let mut results = Vec::new();
        for result in rows {
            results.push(result.map_err(read_failed)?);
        }

        Ok(results)
    }

    fn reset(&mut self) -> Result<(), StoreError> {
        let write_failed = |e: rusqlite::Error| StoreError::WriteFailed(e.to_string());
        self.conn
            .execute_batch("DROP TABLE IF EXISTS quiz_results; PRAGMA user_version = 0;")
            .map_err(write_failed)?;
        self.init_schema().map_err(write_failed)?;
        info!("result store reset");
        Ok(())
    }
}

/// Opens the store at a fixed path; destroying removes the file.
#[derive(Debug, Clone)]
pub struct SqliteProvider {
    path: PathBuf,
}

impl SqliteProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreProvider for SqliteProvider {
    fn open(&self) -> Result<Box<dyn ResultStore + Send>, StoreError> {
        Ok(Box::new(SqliteResultStore::open(&self.path)?))
    }

    fn destroy(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(unavailable)?;
            info!("removed result store at {}", self.path.display());
        }
        Ok(())
    }
}
