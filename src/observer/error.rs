use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::database::StoreError;
use crate::observer::traits::ObserverRing;
use crate::types::Document;

/// Observer system errors with structured error types
#[derive(Debug, Error, Clone)]
pub enum ObserverError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Several field errors merged into one response
    #[error("{message}")]
    FieldErrors {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("Security error: {0}")]
    SecurityError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Pipeline execution failed: {0}")]
    PipelineError(String),
}

impl ObserverError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ObserverError::FieldError { field: field.into(), message: message.into() }
    }
}

impl From<StoreError> for ObserverError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(msg) => ObserverError::NotFound(msg),
            other => ObserverError::DatabaseError(other.to_string()),
        }
    }
}

/// Observer warnings (non-fatal issues)
#[derive(Debug, Clone)]
pub struct ObserverWarning {
    pub observer: String,
    pub ring: u8,
    pub message: String,
}

impl ObserverWarning {
    pub fn new(observer: &str, ring: ObserverRing, message: String) -> Self {
        Self {
            observer: observer.to_string(),
            ring: ring as u8,
            message,
        }
    }
}

/// Results from observer pipeline execution
#[derive(Debug, Clone)]
pub struct ObserverResult {
    pub documents: Vec<Document>,
    pub errors: Vec<ObserverError>,
    pub warnings: Vec<ObserverWarning>,
    pub execution_time: Duration,
    pub rings_executed: Vec<ObserverRing>,
}

impl ObserverResult {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Written documents, or the errors folded into one.
    ///
    /// Field errors are merged so a client sees every invalid field at once;
    /// any other error takes precedence over them.
    pub fn into_documents(self) -> Result<Vec<Document>, ObserverError> {
        if self.errors.is_empty() {
            return Ok(self.documents);
        }

        if let Some(error) = self.errors.iter().find(|e| !matches!(e, ObserverError::FieldError { .. })) {
            return Err(error.clone());
        }

        let field_errors: HashMap<String, String> = self
            .errors
            .into_iter()
            .filter_map(|e| match e {
                ObserverError::FieldError { field, message } => Some((field, message)),
                _ => None,
            })
            .collect();

        Err(ObserverError::FieldErrors {
            message: "Validation failed".to_string(),
            field_errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(errors: Vec<ObserverError>) -> ObserverResult {
        ObserverResult {
            documents: vec![],
            errors,
            warnings: vec![],
            execution_time: Duration::ZERO,
            rings_executed: vec![],
        }
    }

    #[test]
    fn field_errors_are_merged() {
        let err = result(vec![ObserverError::field("name", "is required"), ObserverError::field("city", "is required")])
            .into_documents()
            .unwrap_err();
        match err {
            ObserverError::FieldErrors { field_errors, .. } => {
                assert_eq!(field_errors.len(), 2);
                assert_eq!(field_errors["city"], "is required");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn security_error_wins_over_field_errors() {
        let err = result(vec![
            ObserverError::field("name", "is required"),
            ObserverError::SecurityError("foreign business".to_string()),
        ])
        .into_documents()
        .unwrap_err();
        assert!(matches!(err, ObserverError::SecurityError(_)));
    }
}
