use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("invalid boundary '{0}': expected four finite numbers")]
    InvalidBoundary(String),
    #[error("invalid CTM '{0}': expected six finite numbers")]
    InvalidCtm(String),
    #[error("invalid base64 payload: {0}")]
    InvalidPayload(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
