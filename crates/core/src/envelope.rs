//! The uniform `{ status, message, data, errors }` response envelope used by
//! every backend API endpoint.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Envelope status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
    Fail,
    #[serde(other)]
    Unknown,
}

/// Standard backend response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ApiFieldError>>,
}

/// A single error entry. The backend sends either bare strings or
/// `{ field, message }` objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiFieldError {
    Message(String),
    Field {
        #[serde(default)]
        field: Option<String>,
        message: String,
    },
}

impl ApiFieldError {
    pub fn describe(&self) -> String {
        match self {
            ApiFieldError::Message(m) => m.clone(),
            ApiFieldError::Field {
                field: Some(field),
                message,
            } => format!("{field}: {message}"),
            ApiFieldError::Field { field: None, message } => message.clone(),
        }
    }
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }

    /// Flattened error messages, empty when none were sent.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(ApiFieldError::describe)
            .collect()
    }

    /// Unwrap the payload of a successful envelope.
    ///
    /// A non-success status becomes [`CoreError::Api`]. A success status with
    /// no `data` is a schema violation.
    pub fn into_data(self) -> Result<T, CoreError> {
        if !self.is_success() {
            let errors = self.error_messages();
            let message = if self.message.is_empty() {
                "Request failed".to_string()
            } else {
                self.message
            };
            return Err(CoreError::Api { message, errors });
        }
        self.data
            .ok_or_else(|| CoreError::Validation("Response envelope is missing `data`".into()))
    }

    /// Like [`Envelope::into_data`] for endpoints whose payload is irrelevant.
    pub fn into_unit(self) -> Result<(), CoreError> {
        if self.is_success() {
            Ok(())
        } else {
            self.into_data().map(|_| ())
        }
    }
}
