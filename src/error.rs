use thiserror::Error;

#[derive(Error, Debug)]
pub enum HueError {
    #[error("Bridge request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bridge returned HTTP status {0}")]
    UnexpectedStatus(u16),

    #[error("Unexpected bridge response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HueError>;
