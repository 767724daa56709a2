use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::quiz::DEFAULT_SECONDS_PER_QUESTION;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub seconds_per_question: u32,
    /// JSON question bank; the embedded bank is used when unset.
    pub question_file: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seconds_per_question: DEFAULT_SECONDS_PER_QUESTION,
            question_file: None,
            db_path: None,
        }
    }
}

/// Command-line values that take precedence over the stored config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub seconds_per_question: Option<u32>,
    pub question_file: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
}

impl Config {
    pub fn merged(&self, overrides: &Overrides) -> Self {
        Self {
            seconds_per_question: overrides
                .seconds_per_question
                .unwrap_or(self.seconds_per_question)
                .max(1),
            question_file: overrides
                .question_file
                .clone()
                .or_else(|| self.question_file.clone()),
            db_path: overrides.db_path.clone().or_else(|| self.db_path.clone()),
        }
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .or_else(AppDirs::db_path)
            .unwrap_or_else(|| PathBuf::from("quiz.db"))
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path =
            AppDirs::config_path().unwrap_or_else(|| PathBuf::from("quizmaster_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|e| {
            warn!("ignoring malformed config {}: {}", self.path.display(), e);
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config {
            seconds_per_question: 45,
            question_file: Some(PathBuf::from("/tmp/questions.json")),
            db_path: None,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_or_malformed_file_gives_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"seconds_per_question": 10}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.seconds_per_question, 10);
        assert_eq!(cfg.question_file, None);
    }

    #[test]
    fn overrides_take_precedence() {
        let base = Config {
            seconds_per_question: 20,
            question_file: Some(PathBuf::from("a.json")),
            db_path: Some(PathBuf::from("a.db")),
        };
        let merged = base.merged(&Overrides {
            seconds_per_question: Some(0),
            question_file: Some(PathBuf::from("b.json")),
            db_path: None,
        });
        assert_eq!(merged.seconds_per_question, 1);
        assert_eq!(merged.question_file, Some(PathBuf::from("b.json")));
        assert_eq!(merged.resolved_db_path(), PathBuf::from("a.db"));
    }
}
