use std::sync::{Arc, Mutex, MutexGuard};

use super::{ResultStore, StoreError, StoreProvider};
use crate::result::QuizResult;

#[derive(Debug, Default)]
struct Shared {
    records: Vec<(i64, QuizResult)>,
    next_id: i64,
    fail_writes: bool,
    fail_reads: bool,
}

/// In-memory store for tests and headless runs. Clones share records.
#[derive(Debug, Clone, Default)]
pub struct MemoryResultStore {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        // poisoning is ignored
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }
}

impl ResultStore for MemoryResultStore {
    fn append(&mut self, result: &QuizResult) -> Result<i64, StoreError> {
        let mut shared = self.lock();
        if shared.fail_writes {
            return Err(StoreError::WriteFailed("memory store refused write".into()));
        }
        shared.next_id += 1;
        let id = shared.next_id;
        shared.records.push((id, result.clone()));
        Ok(id)
    }

    fn read_all(&self) -> Result<Vec<QuizResult>, StoreError> {
        let shared = self.lock();
        if shared.fail_reads {
            return Err(StoreError::ReadFailed("memory store refused read".into()));
        }
        Ok(shared.records.iter().map(|(_, r)| r.clone()).collect())
    }

    fn reset(&mut self) -> Result<(), StoreError> {
        let mut shared = self.lock();
        shared.records.clear();
        shared.fail_reads = false;
        shared.fail_writes = false;
        Ok(())
    }
}

/// Hands out clones of one shared memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    store: MemoryResultStore,
    fail_open: Arc<Mutex<bool>>,
}

impl MemoryProvider {
    pub fn new(store: MemoryResultStore) -> Self {
        Self {
            store,
            fail_open: Arc::default(),
        }
    }

    pub fn store(&self) -> &MemoryResultStore {
        &self.store
    }

    pub fn set_fail_open(&self, fail: bool) {
        *self.fail_open.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }
}

impl StoreProvider for MemoryProvider {
    fn open(&self) -> Result<Box<dyn ResultStore + Send>, StoreError> {
        if *self.fail_open.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(StoreError::StoreUnavailable("memory store offline".into()));
        }
        Ok(Box::new(self.store.clone()))
    }

    fn destroy(&self) -> Result<(), StoreError> {
        self.set_fail_open(false);
        self.store.clone().reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Local;
    use std::collections::BTreeMap;

    fn result(score: u32) -> QuizResult {
        QuizResult {
            date: Local::now(),
            score,
            total_questions: 4,
            answers: BTreeMap::new(),
        }
    }

    #[test]
    fn test_clones_share_records() {
        let store = MemoryResultStore::new();
        let mut writer = store.clone();
        assert_eq!(writer.append(&result(1)).unwrap(), 1);
        assert_eq!(writer.append(&result(2)).unwrap(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.read_all().unwrap()[1].score, 2);
    }

    #[test]
    fn test_failure_switches() {
        let mut store = MemoryResultStore::new();
        store.set_fail_writes(true);
        assert_matches!(store.append(&result(1)), Err(StoreError::WriteFailed(_)));
        store.set_fail_reads(true);
        assert_matches!(store.read_all(), Err(StoreError::ReadFailed(_)));
        store.reset().unwrap();
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_provider_fail_open_cleared_by_destroy() {
        let provider = MemoryProvider::default();
        provider.set_fail_open(true);
        assert!(matches!(
            provider.open(),
            Err(StoreError::StoreUnavailable(_))
        ));
        provider.destroy().unwrap();
        assert!(provider.open().is_ok());
    }
}
