//! File-backed Document Store
//! Mission: Serialize all load/modify/write cycles over a single JSON file
//!
//! Every transaction reads the whole file, applies one mutation and rewrites the
//! whole file. Writers hold an exclusive lock for the full round trip; readers
//! share the lock. Writes land in a sibling temp file that is renamed over the
//! target, so an interrupted write leaves the previous version on disk.

use crate::error::{ChirpyError, Result};
use crate::store::models::DocumentSet;
use parking_lot::RwLock;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Single-file store for the whole [`DocumentSet`]
pub struct DocumentStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl DocumentStore {
    /// Open the store at `path`, creating an empty document if none exists.
    ///
    /// Idempotent: an existing file is left as is, but it must parse.
    pub fn initialize<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        };

        {
            let _guard = store.lock.write();
            if store.path.exists() {
                store.load()?;
                debug!(path = %store.path.display(), "Opened existing document store");
            } else {
                if let Some(parent) = store.path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                store.persist(&DocumentSet::default())?;
                info!(path = %store.path.display(), "📁 Created empty document store");
            }
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load a snapshot under the shared lock.
    pub fn read(&self) -> Result<DocumentSet> {
        let _guard = self.lock.read();
        self.load()
    }

    /// Replace the document with whatever `mutator` returns.
    ///
    /// The mutator must not block or perform I/O: it runs with every other
    /// reader and writer locked out.
    pub fn write<F>(&self, mutator: F) -> Result<()>
    where
        F: FnOnce(DocumentSet) -> DocumentSet,
    {
        self.transact(|doc| {
            let current = std::mem::take(doc);
            *doc = mutator(current);
            Ok(())
        })
    }

    /// Fallible load-modify-write transaction.
    ///
    /// If `mutator` returns an error nothing is written and the error is
    /// handed back unchanged.
    pub fn transact<T, F>(&self, mutator: F) -> Result<T>
    where
        F: FnOnce(&mut DocumentSet) -> Result<T>,
    {
        let _guard = self.lock.write();

        let mut doc = self.load()?;
        let output = match mutator(&mut doc) {
            Ok(output) => output,
            Err(e) => {
                debug!(error = %e, "Transaction aborted, nothing written");
                return Err(e);
            }
        };

        self.persist(&doc)?;
        Ok(output)
    }

    fn load(&self) -> Result<DocumentSet> {
        let data = fs::read(&self.path).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Could not read document store");
            ChirpyError::StorageUnavailable(format!("read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_slice(&data).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Could not parse document store");
            ChirpyError::StorageUnavailable(format!("parse {}: {}", self.path.display(), e))
        })
    }

    /// Sibling of the target with `.tmp` appended to the full file name
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write to a temp file, sync it, then rename over the target.
    fn persist(&self, doc: &DocumentSet) -> Result<()> {
        let temp_path = self.temp_path();

        let result = (|| -> Result<()> {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, doc)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
            drop(writer);

            fs::rename(&temp_path, &self.path)?;
            Ok(())
        })();

        if let Err(e) = &result {
            warn!(path = %self.path.display(), error = %e, "Could not persist document store");
            let _ = fs::remove_file(&temp_path);
        } else {
            debug!(
                users = doc.users.len(),
                chirps = doc.posts.len(),
                refresh_tokens = doc.refresh_tokens.len(),
                "Persisted document store"
            );
        }

        result
    }
}
