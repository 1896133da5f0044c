use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no row carries an account id -- the input has no usable data")]
    NoUsableKey,

    #[error("{name} must sum to 1.0, got {sum:.4}")]
    InvalidWeights { name: &'static str, sum: f64 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
