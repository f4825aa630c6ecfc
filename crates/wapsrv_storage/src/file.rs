//! File-backed graph store.
//!
//! Layout of a store directory:
//!
//! ```text
//! <store_path>/
//! ├─ LOCK              # Advisory lock for single-process access
//! └─ dataset.cbor      # Committed dataset snapshot
//! ```

use crate::backend::{GraphStore, TxnKind};
use crate::error::{StorageError, StorageResult};
use crate::graph::{Dataset, Graph};
use crate::memory::InMemoryGraphStore;
use crate::term::{Triple, TriplePattern};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const SNAPSHOT_FILE: &str = "dataset.cbor";
/// Temporary file for atomic snapshot writes.
const SNAPSHOT_TEMP: &str = "dataset.cbor.tmp";

/// A graph store persisted as a CBOR snapshot.
///
/// All reads are served from memory. Every committed write transaction
/// rewrites the snapshot with write-then-rename before the new state
/// becomes visible, so a crash leaves either the old or the new dataset.
/// A write commit therefore costs time proportional to the whole dataset.
///
/// # Example
///
/// ```no_run
/// use wapsrv_storage::{FileGraphStore, GraphStore, TxnKind};
/// use std::path::Path;
///
/// let store = FileGraphStore::open(Path::new("wap_data")).unwrap();
/// store.begin(TxnKind::Read).unwrap();
/// let exists = store.contains_graph("http://localhost:8080/wap/").unwrap();
/// store.end();
/// ```
#[derive(Debug)]
pub struct FileGraphStore {
    inner: InMemoryGraphStore,
    path: PathBuf,
    _lock_file: File,
}

impl FileGraphStore {
    /// Opens or creates a store directory and loads its snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path exists but is not a directory
    /// - Another process holds the lock (returns `Locked`)
    /// - The snapshot cannot be decoded (returns `Corrupted`)
    /// - I/O errors occur
    pub fn open(path: &Path) -> StorageResult<Self> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        if !path.is_dir() {
            return Err(StorageError::corrupted(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        let dataset = load_snapshot(&path.join(SNAPSHOT_FILE))?;
        tracing::debug!(
            path = %path.display(),
            graphs = dataset.graph_count(),
            "graph store opened"
        );

        Ok(Self {
            inner: InMemoryGraphStore::with_dataset(dataset),
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_snapshot(&self, dataset: &Dataset) -> StorageResult<()> {
        let snapshot_path = self.path.join(SNAPSHOT_FILE);
        let temp_path = self.path.join(SNAPSHOT_TEMP);

        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        ciborium::ser::into_writer(dataset, &mut writer)
            .map_err(|e| StorageError::corrupted(format!("encode failed: {e:?}")))?;
        writer.flush()?;
        let file = writer
            .into_inner()
            .map_err(|e| StorageError::Io(e.into_error()))?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &snapshot_path)?;
        self.sync_directory()?;
        tracing::trace!(triples = dataset.triple_count(), "snapshot written");
        Ok(())
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> StorageResult<()> {
        let dir = File::open(&self.path)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StorageResult<()> {
        Ok(())
    }
}

fn load_snapshot(path: &Path) -> StorageResult<Dataset> {
    if !path.exists() {
        return Ok(Dataset::new());
    }
    let reader = BufReader::new(File::open(path)?);
    ciborium::de::from_reader(reader)
        .map_err(|e| StorageError::corrupted(format!("{}: {e:?}", path.display())))
}

impl GraphStore for FileGraphStore {
    fn begin(&self, kind: TxnKind) -> StorageResult<()> {
        self.inner.begin(kind)
    }

    fn transaction_kind(&self) -> Option<TxnKind> {
        self.inner.transaction_kind()
    }

    fn commit(&self) -> StorageResult<()> {
        self.inner.commit_with(|dataset| self.save_snapshot(dataset))
    }

    fn abort(&self) -> StorageResult<()> {
        self.inner.abort()
    }

    fn end(&self) {
        self.inner.end();
    }

    fn contains_graph(&self, name: &str) -> StorageResult<bool> {
        self.inner.contains_graph(name)
    }

    fn graph(&self, name: &str) -> StorageResult<Option<Graph>> {
        self.inner.graph(name)
    }

    fn replace_graph(&self, name: &str, graph: Graph) -> StorageResult<()> {
        self.inner.replace_graph(name, graph)
    }

    fn remove_graph(&self, name: &str) -> StorageResult<bool> {
        self.inner.remove_graph(name)
    }

    fn add(&self, name: &str, triple: Triple) -> StorageResult<bool> {
        self.inner.add(name, triple)
    }

    fn remove_matching(&self, name: &str, pattern: &TriplePattern) -> StorageResult<usize> {
        self.inner.remove_matching(name, pattern)
    }

    fn find(&self, name: &str, pattern: &TriplePattern) -> StorageResult<Vec<Triple>> {
        self.inner.find(name, pattern)
    }

    fn table_append(&self, table: &str, value: &str) -> StorageResult<()> {
        self.inner.table_append(table, value)
    }

    fn table_remove_first(&self, table: &str, value: &str) -> StorageResult<bool> {
        self.inner.table_remove_first(table, value)
    }

    fn table_len(&self, table: &str) -> StorageResult<usize> {
        self.inner.table_len(table)
    }

    fn table_range(&self, table: &str, offset: usize, limit: usize) -> StorageResult<Vec<String>> {
        self.inner.table_range(table, offset, limit)
    }

    fn table_clear(&self, table: &str) -> StorageResult<usize> {
        self.inner.table_clear(table)
    }
}
