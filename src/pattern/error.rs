// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Pattern template is empty")]
    EmptyTemplate,
    #[error("Pattern template must contain exactly one '{placeholder}' placeholder, found {found}")]
    Placeholder { placeholder: &'static str, found: usize },
    #[error("Invalid hex token '{0}'")]
    InvalidToken(String),
    #[error("Find token '{find}' and replace token '{replace}' differ in length")]
    LengthMismatch { find: String, replace: String },
    #[error("Pattern compilation failed: {0}")]
    Compile(String),
}
