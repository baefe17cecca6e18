use thiserror::Error;

/// Failures of the durable key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of a single update pipeline run.
///
/// None of these are fatal: the run is abandoned and the previous snapshot
/// stays authoritative until the next trigger.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("update pipeline is not running")]
    PipelineClosed,
}
