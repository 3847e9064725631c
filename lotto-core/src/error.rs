use thiserror::Error;

pub type Result<T> = std::result::Result<T, LottoError>;

#[derive(Error, Debug)]
pub enum LottoError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid odds: {0}")]
    Odds(String),

    #[error("No decision drawn yet for '{handle}'")]
    Undecided { handle: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LottoError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn odds(msg: impl Into<String>) -> Self {
        Self::Odds(msg.into())
    }
}
