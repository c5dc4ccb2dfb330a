use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use super::loader::load_matrix;
use super::types::DecisionMatrix;

static GLOBAL: OnceLock<MatrixCache> = OnceLock::new();

/// Memoizes loaded matrices for the lifetime of the process.
///
/// Keyed by canonical source path and header row. Entries are never evicted
/// and never reloaded; the source is treated as immutable once read.
#[derive(Default)]
pub struct MatrixCache {
    entries: Mutex<HashMap<(PathBuf, usize), Arc<DecisionMatrix>>>,
}

impl MatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache instance
    pub fn global() -> &'static MatrixCache {
        GLOBAL.get_or_init(MatrixCache::new)
    }

    /// Return the cached matrix for `path`, loading it on first use.
    ///
    /// Failed loads are not cached, so a later call retries the read.
    pub fn load(&self, path: &Path, header_row: usize) -> Result<Arc<DecisionMatrix>> {
        let key = (
            std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()),
            header_row,
        );

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(matrix) = entries.get(&key) {
            return Ok(Arc::clone(matrix));
        }

        let matrix = Arc::new(load_matrix(path, header_row)?);
        entries.insert(key, Arc::clone(&matrix));
        Ok(matrix)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
