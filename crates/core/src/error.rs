use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Batch contains no items")]
    EmptyBatch,

    #[error("Unknown detection strategy: {0} (expected 'optimized' or 'legacy')")]
    UnknownStrategy(String),
}
