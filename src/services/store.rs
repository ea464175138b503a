//! Subscription storage
//!
//! Records live in a single `subscriptions.json` document under the data
//! directory. Access is serialized through `fs2` locks on a sibling
//! `subscriptions.lock` file: shared for reads, exclusive for the whole
//! load-modify-save of a write. Writes go through a uniquely named temp
//! file that is atomically renamed over the document.

use crate::types::{NewSubscription, Result, Subscription, SubtrackError, TotalQuery};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// On-disk layout version
const STORE_VERSION: u32 = 1;

const STORE_FILE_NAME: &str = "subscriptions.json";

const LOCK_FILE_NAME: &str = "subscriptions.lock";

/// CRUD plus the filtered query the billing engine consumes
pub trait SubscriptionStore: Send + Sync {
    /// Persist a new record and return it with its assigned id
    fn create(&self, new: NewSubscription) -> Result<Subscription>;

    fn get_by_id(&self, id: Uuid) -> Result<Subscription>;

    /// Replace the stored record with the same id
    fn update(&self, sub: &Subscription) -> Result<()>;

    fn delete(&self, id: Uuid) -> Result<()>;

    /// Records for a user ordered by start date, then id.
    /// `limit == 0` returns everything after `offset`.
    fn list_by_user(&self, user_id: &str, offset: usize, limit: usize)
        -> Result<Vec<Subscription>>;

    /// Records matching the query's user, service and date-overlap filters
    fn find_matching(&self, query: &TotalQuery) -> Result<Vec<Subscription>>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreFile {
    pub version: u32,
    pub updated_at: i64,
    pub subscriptions: Vec<Subscription>,
}

/// [`SubscriptionStore`] backed by a JSON document on disk
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join(LOCK_FILE_NAME)
    }

    /// Load every record under a shared lock. A missing file is an empty store.
    pub fn load_all(&self) -> Result<Vec<Subscription>> {
        let lock = self.open_lock()?;
        lock.lock_shared()
            .map_err(|e| SubtrackError::Store(format!("Failed to acquire read lock: {}", e)))?;

        let result = self.read_records();
        let _ = lock.unlock();
        result
    }

    fn open_lock(&self) -> Result<File> {
        fs::create_dir_all(&self.data_dir)?;
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| SubtrackError::Store(format!("Failed to open lock file: {}", e)))
    }

    /// Read the document. Caller must hold the lock.
    fn read_records(&self) -> Result<Vec<Subscription>> {
        let path = self.store_path();
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut content = String::new();
        std::io::BufReader::new(file).read_to_string(&mut content)?;

        let store: StoreFile = serde_json::from_str(&content).map_err(|e| {
            SubtrackError::Store(format!("Corrupted store file {}: {}", path.display(), e))
        })?;

        if store.version != STORE_VERSION {
            return Err(SubtrackError::Store(format!(
                "Unsupported store version {} (expected {})",
                store.version, STORE_VERSION
            )));
        }

        Ok(store.subscriptions)
    }

    /// Atomic write: unique temp file in the data dir, then rename.
    /// Caller must hold the exclusive lock.
    fn write_records(&self, subscriptions: &[Subscription]) -> Result<()> {
        let store = StoreFile {
            version: STORE_VERSION,
            updated_at: chrono::Utc::now().timestamp(),
            subscriptions: subscriptions.to_vec(),
        };

        let content = serde_json::to_string_pretty(&store)
            .map_err(|e| SubtrackError::Store(format!("Serialization failed: {}", e)))?;

        let mut temp = NamedTempFile::new_in(&self.data_dir)
            .map_err(|e| SubtrackError::Store(format!("Failed to create temp file: {}", e)))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| SubtrackError::Store(format!("Failed to write temp file: {}", e)))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| SubtrackError::Store(format!("Failed to sync temp file: {}", e)))?;

        let path = self.store_path();
        temp.persist(&path)
            .map_err(|e| SubtrackError::Store(format!("Failed to replace store file: {}", e)))?;

        tracing::debug!(count = subscriptions.len(), path = %path.display(), "store saved");
        Ok(())
    }

    /// Load, apply `f`, save, all under one exclusive lock.
    /// Nothing is written when `f` fails.
    fn modify<T>(&self, f: impl FnOnce(&mut Vec<Subscription>) -> Result<T>) -> Result<T> {
        let lock = self.open_lock()?;
        lock.lock_exclusive()
            .map_err(|e| SubtrackError::Store(format!("Failed to acquire write lock: {}", e)))?;

        let result = self.read_records().and_then(|mut subs| {
            let out = f(&mut subs)?;
            self.write_records(&subs)?;
            Ok(out)
        });

        let _ = lock.unlock();
        result
    }
}

impl SubscriptionStore for JsonFileStore {
    fn create(&self, new: NewSubscription) -> Result<Subscription> {
        let sub = new.into_subscription(Uuid::new_v4());
        let stored = sub.clone();
        self.modify(move |subs| {
            subs.push(stored);
            Ok(())
        })?;
        Ok(sub)
    }

    fn get_by_id(&self, id: Uuid) -> Result<Subscription> {
        self.load_all()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or(SubtrackError::NotFound(id))
    }

    fn update(&self, sub: &Subscription) -> Result<()> {
        self.modify(|subs| {
            let slot = subs
                .iter_mut()
                .find(|s| s.id == sub.id)
                .ok_or(SubtrackError::NotFound(sub.id))?;
            *slot = sub.clone();
            Ok(())
        })
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        self.modify(|subs| {
            let before = subs.len();
            subs.retain(|s| s.id != id);
            if subs.len() == before {
                return Err(SubtrackError::NotFound(id));
            }
            Ok(())
        })
    }

    fn list_by_user(
        &self,
        user_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Subscription>> {
        let mut subs: Vec<Subscription> = self
            .load_all()?
            .into_iter()
            .filter(|s| s.user_id == user_id)
            .collect();
        subs.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));

        let take = if limit == 0 { usize::MAX } else { limit };
        Ok(subs.into_iter().skip(offset).take(take).collect())
    }

    fn find_matching(&self, query: &TotalQuery) -> Result<Vec<Subscription>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|s| query.matches(s))
            .collect())
    }
}
