use std::{ops::Div, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::error::SaveLoadError;

/// Tuning for savers and loaders. Usually read from a RON file:
///
/// ```ron
/// (
///     worker_threads: Some(0),
///     parallel_apply: true,
///     parallel_serialize: true,
///     log_dropped_entities: false,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveLoadConfig {
    /// `None` runs on the global rayon pool. `Some(0)` uses a dedicated pool with half of the
    /// available cores, `Some(n)` a dedicated pool of `n` threads.
    pub worker_threads: Option<usize>,
    /// Write decoded data into chunks in parallel.
    pub parallel_apply: bool,
    /// Encode different component kinds in parallel.
    pub parallel_serialize: bool,
    /// Log every saved entity that is dropped because it has no live counterpart.
    pub log_dropped_entities: bool,
}

impl Default for SaveLoadConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            parallel_apply: true,
            parallel_serialize: true,
            log_dropped_entities: true,
        }
    }
}

impl SaveLoadConfig {
    pub fn from_ron(data: &str) -> Result<Self, SaveLoadError> {
        match ron::from_str::<SaveLoadConfig>(data) {
            Ok(config) => Ok(config),
            Err(err) => Err(SaveLoadError::Config(err.to_string())),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SaveLoadError> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                return Err(SaveLoadError::Config(format!(
                    "unable to read {}: {err}",
                    path.display()
                )))
            }
        };
        Self::from_ron(&contents)
    }
}

/// Where parallel work runs.
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkerPool {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl WorkerPool {
    pub fn new(config: &SaveLoadConfig) -> Result<Self, SaveLoadError> {
        let threads = match config.worker_threads {
            None => return Ok(Self::default()),
            // Use half the number of threads on the system so we don't pin the CPU to 100%
            Some(0) => num_cpus::get().div(2).max(1),
            Some(n) => n,
        };

        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("ard-save-load-{i}"))
            .build()
            .map(|pool| Self {
                pool: Some(Arc::new(pool)),
            })
            .map_err(|err| SaveLoadError::ThreadPool(err.to_string()))
    }

    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
