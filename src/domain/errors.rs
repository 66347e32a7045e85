use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found")]
    NotFound,
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Returns the value when it is present and not blank.
pub(crate) fn required_text(field: &str, value: Option<String>) -> Result<String, DomainError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(DomainError::Validation(format!("`{field}` must not be empty"))),
        None => Err(DomainError::Validation(format!("`{field}` is required"))),
    }
}

/// Like [`required_text`], for fields that may be left out of a partial update.
pub(crate) fn optional_text(field: &str, value: Option<String>) -> Result<Option<String>, DomainError> {
    value.map(|v| required_text(field, Some(v))).transpose()
}
