/// Result alias used across the crate.
pub type MechResult<T> = Result<T, MechError>;

#[derive(thiserror::Error, Debug)]
pub enum MechError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MechError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for MechError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}
