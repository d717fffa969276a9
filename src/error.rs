use thiserror::Error;

pub type Result<T> = std::result::Result<T, TemplateError>;

/// Represents errors that can occur while compiling or rendering views.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("General error: {0}")]
    General(String),
    #[error("Invalid content tags: {0}")]
    InvalidTags(String),
    #[error("View not found: {0}")]
    ViewNotFound(String),
    #[error("Render error: {0}")]
    Render(String),
    #[error("Value error: {0}")]
    Value(String),
}

impl serde::ser::Error for TemplateError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        TemplateError::Value(msg.to_string())
    }
}

impl From<anyhow::Error> for TemplateError {
    fn from(e: anyhow::Error) -> Self {
        TemplateError::General(format!("{:#}", e))
    }
}
