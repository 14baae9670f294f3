//! Process-wide dataset cache. Each path is loaded at most once.

use super::{DataLoader, Dataset, LoaderError};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

static DATASETS: Lazy<Mutex<HashMap<PathBuf, Arc<Dataset>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Return the cached dataset for `path`, loading it on first use.
///
/// Entries are never invalidated. Failed loads are not cached.
pub fn load_cached(path: &Path) -> Result<Arc<Dataset>, LoaderError> {
    let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    let mut datasets = DATASETS.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(dataset) = datasets.get(&key) {
        debug!(path = %key.display(), "dataset cache hit");
        return Ok(Arc::clone(dataset));
    }

    debug!(path = %key.display(), "dataset cache miss");
    let dataset = Arc::new(DataLoader::load_csv(path)?);
    datasets.insert(key, Arc::clone(&dataset));
    Ok(dataset)
}
