use thiserror::Error;

#[derive(Error, Debug)]
pub enum RubenchError {
    // Configuration errors
    #[error("config error: {0}")]
    Config(String),

    // Transport errors
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response (status {status}): {body}")]
    Unexpected { status: u16, body: String },

    #[error("missing or unparseable request-charge header")]
    MissingCharge,

    // Serialization errors
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Seeding errors
    #[error("failed to write {unwritten} documents after {retries} retries")]
    RetryBudgetExhausted { unwritten: usize, retries: u32 },

    #[error("seeding cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, RubenchError>;
