use ard_ecs::key::ComponentKey;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaveLoadError {
    #[error("component `{key}` was saved with element size {saved} but is now {live} bytes")]
    ElementSizeMismatch {
        key: ComponentKey,
        saved: usize,
        live: usize,
    },
    #[error("kind record at offset {offset} has an invalid length of {length} bytes")]
    InvalidRecordLength { offset: usize, length: i64 },
    #[error("kind record at offset {offset} needs {length} bytes but only {remaining} remain")]
    TruncatedRecord {
        offset: usize,
        length: usize,
        remaining: usize,
    },
    #[error("component `{0}` is not registered")]
    UnregisteredComponent(ComponentKey),
    #[error("component `{key}` needs {bytes} bytes which does not fit in a kind record")]
    RecordTooLarge { key: ComponentKey, bytes: usize },
    #[error("invalid save/load configuration: {0}")]
    Config(String),
    #[error("unable to create worker pool: {0}")]
    ThreadPool(String),
}
