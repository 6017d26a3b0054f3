//! JSON file store.
//!
//! The whole ledger is one JSON document. Every write replaces the file
//! atomically (temp file in the same directory, then rename), so readers
//! never see a partial document and reads need no lock. Every
//! load-modify-save holds an exclusive OS lock on a `<store>.lock` sidecar,
//! so handles in separate processes never overwrite each other's writes.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use fs4::fs_std::FileExt;
use tokio::sync::Mutex;

use readiness_core::error::StoreError;
use readiness_core::model::{AnswerRecord, Attempt, AttemptResult};
use readiness_core::traits::{AssessmentStore, FinalizeCommit};

use crate::ledger::{Ledger, LEDGER_VERSION};

/// Bounded retry for transient I/O failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first failure.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds or the retries are spent.
    pub async fn run<T, F>(&self, what: &str, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Result<T>,
    {
        let mut delay = self.delay;
        let mut retry = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if retry < self.max_retries => {
                    retry += 1;
                    tracing::debug!(
                        "{what} failed (retry {retry}/{}): {e:#}",
                        self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(Duration::from_secs(5));
                }
                Err(e) => {
                    tracing::warn!("{what} failed after {retry} retries: {e:#}");
                    return Err(StoreError::Unavailable(format!("{what}: {e:#}")));
                }
            }
        }
    }
}

/// An `AssessmentStore` persisted to a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
    retry: RetryPolicy,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Use `path` as the backing file. It is created on the first write.
    pub fn open(path: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        let path = path.into();
        Self {
            lock_path: lock_path_for(&path),
            path,
            retry,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The sidecar file that writers lock.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    async fn load(&self) -> Result<Ledger, StoreError> {
        let content = self
            .retry
            .run("read store", || read_if_exists(&self.path))
            .await?;
        let Some(content) = content else {
            return Ok(Ledger::default());
        };

        let ledger: Ledger = serde_json::from_str(&content).map_err(|e| {
            StoreError::Unavailable(format!(
                "failed to parse store {}: {e}",
                self.path.display()
            ))
        })?;
        if ledger.version != LEDGER_VERSION {
            return Err(StoreError::Unavailable(format!(
                "unsupported store version {} in {}",
                ledger.version,
                self.path.display()
            )));
        }
        Ok(ledger)
    }

    async fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(ledger)
            .map_err(|e| StoreError::Unavailable(format!("failed to serialize store: {e}")))?;
        self.retry
            .run("write store", || write_atomic(&self.path, &json))
            .await
    }

    /// Block until this handle holds the exclusive lock on the sidecar file.
    /// The lock is released when the returned file is dropped.
    async fn acquire_file_lock(&self) -> Result<File, StoreError> {
        let file = self
            .retry
            .run("open store lock", || open_lock_file(&self.lock_path))
            .await?;
        let lock_path = self.lock_path.clone();
        tokio::task::spawn_blocking(move || {
            FileExt::lock_exclusive(&file)
                .with_context(|| format!("failed to lock {}", lock_path.display()))?;
            Ok::<_, anyhow::Error>(file)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("store lock task failed: {e}")))?
        .map_err(|e| StoreError::Unavailable(format!("{e:#}")))
    }

    async fn read<T>(&self, op: impl FnOnce(&Ledger) -> T) -> Result<T, StoreError> {
        let ledger = self.load().await?;
        Ok(op(&ledger))
    }

    /// Load, apply `op`, and write back only if `op` succeeded. The file
    /// lock is held from before the load until after the save.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Ledger) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        let _file_lock = self.acquire_file_lock().await?;
        let mut ledger = self.load().await?;
        let out = op(&mut ledger)?;
        self.save(&ledger).await?;
        Ok(out)
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("store"));
    name.push(".lock");
    path.with_file_name(name)
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))
}

fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

#[async_trait]
impl AssessmentStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn attempt_count(&self, subject_id: &str) -> Result<u32, StoreError> {
        self.read(|ledger| ledger.attempt_count(subject_id)).await
    }

    async fn insert_attempt(&self, attempt: Attempt) -> Result<(), StoreError> {
        self.mutate(|ledger| ledger.insert_attempt(attempt)).await
    }

    async fn load_attempt(
        &self,
        subject_id: &str,
        attempt_number: u32,
    ) -> Result<Option<Attempt>, StoreError> {
        self.read(|ledger| ledger.attempt(subject_id, attempt_number).cloned())
            .await
    }

    async fn upsert_answer(&self, record: AnswerRecord) -> Result<(), StoreError> {
        self.mutate(|ledger| ledger.upsert_answer(record)).await
    }

    async fn commit_result(
        &self,
        result: AttemptResult,
        expected_revision: u64,
    ) -> Result<FinalizeCommit, StoreError> {
        self.mutate(|ledger| ledger.commit_result(result, expected_revision))
            .await
    }

    async fn history(&self, subject_id: &str) -> Result<Vec<AttemptResult>, StoreError> {
        self.read(|ledger| ledger.history(subject_id)).await
    }
}
