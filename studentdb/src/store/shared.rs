use super::Store;
use crate::error::{Result, StudentDbError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Process-wide handle to one record store.
///
/// Clones share the same connection. The store is opened on first use, which
/// also runs the idempotent collection setup; `close` drops the connection and
/// the next use opens it again. Closing an in-memory store discards its data.
#[derive(Clone)]
pub struct SharedStore {
    location: Location,
    inner: Arc<Mutex<Option<Store>>>,
}

impl SharedStore {
    /// A handle to the store file at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SharedStore {
            location: Location::File(path.into()),
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// A handle to a private in-memory store (for testing).
    pub fn in_memory() -> Self {
        SharedStore {
            location: Location::Memory,
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Wrap an already opened store.
    pub fn from_store(store: Store) -> Self {
        let location = match store.path() {
            Some(path) => Location::File(path.to_path_buf()),
            None => Location::Memory,
        };
        SharedStore {
            location,
            inner: Arc::new(Mutex::new(Some(store))),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Store>>> {
        self.inner
            .lock()
            .map_err(|_| StudentDbError::StorageUnavailable("store lock poisoned".into()))
    }

    /// Run `f` against the store, opening it first if needed.
    pub fn with<T>(&self, f: impl FnOnce(&Store) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;
        if guard.is_none() {
            let store = match &self.location {
                Location::File(path) => Store::open(path)?,
                Location::Memory => Store::open_in_memory()?,
            };
            *guard = Some(store);
        }
        match guard.as_ref() {
            Some(store) => f(store),
            None => Err(StudentDbError::StorageUnavailable("store is not open".into())),
        }
    }

    /// Run `f` on the blocking thread pool, suspending the caller until it finishes.
    pub async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Store) -> Result<T> + Send + 'static,
    {
        let handle = self.clone();
        tokio::task::spawn_blocking(move || handle.with(f))
            .await
            .map_err(|e| StudentDbError::Other(format!("storage task failed: {e}")))?
    }

    /// Drop the open connection, if any. Returns whether one was open.
    pub fn close(&self) -> Result<bool> {
        let mut guard = self.lock()?;
        let was_open = guard.take().is_some();
        if was_open {
            log::info!("Closed record store");
        }
        Ok(was_open)
    }

    pub fn is_open(&self) -> Result<bool> {
        Ok(self.lock()?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::STUDENTS;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_opens_lazily() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("studentdb.sqlite3");
        let shared = SharedStore::new(&path);

        assert!(!shared.is_open().unwrap());
        assert!(!path.exists());

        let count = shared.with(|store| store.count(STUDENTS)).unwrap();
        assert_eq!(count, 0);
        assert!(shared.is_open().unwrap());
        assert!(path.exists());
    }

    #[test]
    fn test_close_and_reopen_keeps_file_data() {
        let tmp = TempDir::new().unwrap();
        let shared = SharedStore::new(tmp.path().join("studentdb.sqlite3"));

        shared
            .with(|store| store.insert_record(STUDENTS, &json!({ "rollNumber": "CS001" })))
            .unwrap();
        assert!(shared.close().unwrap());
        assert!(!shared.close().unwrap());

        let count = shared.with(|store| store.count(STUDENTS)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_clones_share_one_store() {
        let shared = SharedStore::in_memory();
        let other = shared.clone();

        shared
            .with(|store| store.insert_record(STUDENTS, &json!({ "rollNumber": "CS001" })))
            .unwrap();
        assert_eq!(other.with(|store| store.count(STUDENTS)).unwrap(), 1);
    }

    #[test]
    fn test_poisoned_lock_is_storage_unavailable() {
        let shared = SharedStore::in_memory();
        let other = shared.clone();
        let panicked = std::thread::spawn(move || {
            other.with(|_| -> Result<()> { panic!("writer crashed") })
        })
        .join();
        assert!(panicked.is_err());

        for result in [
            shared.is_open(),
            shared.close(),
            shared.with(|store| store.count(STUDENTS).map(|n| n > 0)),
        ] {
            assert!(matches!(result, Err(StudentDbError::StorageUnavailable(_))));
        }
    }

    #[tokio::test]
    async fn test_run_on_blocking_pool() {
        let shared = SharedStore::from_store(Store::open_in_memory().unwrap());
        assert!(shared.path().is_none());

        let id = shared
            .run(|store| store.insert_record(STUDENTS, &json!({ "rollNumber": "CS009" })))
            .await
            .unwrap();
        assert_eq!(id, 1);
    }
}
