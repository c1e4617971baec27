use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use thiserror::Error;

pub mod code {
    pub const RUNTIME_NOT_INSTALLED: &str = "HEARTH_RUNTIME_NOT_INSTALLED";
    pub const RUNTIME_ALREADY_INSTALLED: &str = "HEARTH_RUNTIME_ALREADY_INSTALLED";
    pub const VALIDATION_INVALID_ARGUMENT: &str = "HEARTH_VALIDATION_INVALID_ARGUMENT";
    pub const TRANSPORT_REFRESH_FAILED: &str = "HEARTH_TRANSPORT_REFRESH_FAILED";
    pub const TRANSPORT_SUBMIT_FAILED: &str = "HEARTH_TRANSPORT_SUBMIT_FAILED";
    pub const INTERNAL: &str = "HEARTH_INTERNAL_ERROR";
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
#[non_exhaustive]
pub enum ErrorCategory {
    Validation,
    Config,
    Runtime,
    Transport,
    Internal,
}

pub type ErrorDetails = BTreeMap<String, JsonValue>;

/// Machine-coded error for every fallible SDK operation.
///
/// Runtime-coded values signal host integration bugs (calling before
/// `install`, installing twice) and should be surfaced loudly. Transport-coded
/// values describe backend failures; the session recovers from those locally
/// and they only reach hosts that implement a [`crate::SupportBackend`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Error)]
#[error("{machine_code}: {message}")]
#[non_exhaustive]
pub struct SupportError {
    pub machine_code: String,
    pub category: ErrorCategory,
    pub retryable: bool,
    pub is_user_actionable: bool,
    pub message: String,
    #[serde(default)]
    pub details: ErrorDetails,
}

impl SupportError {
    pub fn new(
        machine_code: impl Into<String>,
        category: ErrorCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            machine_code: machine_code.into(),
            category,
            retryable: false,
            is_user_actionable: false,
            message: message.into(),
            details: ErrorDetails::new(),
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_user_actionable(mut self, is_user_actionable: bool) -> Self {
        self.is_user_actionable = is_user_actionable;
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    pub fn code(&self) -> &str {
        self.machine_code.as_str()
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn not_installed(method: &str) -> Self {
        Self::new(
            code::RUNTIME_NOT_INSTALLED,
            ErrorCategory::Runtime,
            format!("method '{method}' called before install"),
        )
        .with_user_actionable(true)
        .with_detail("method", JsonValue::String(method.to_owned()))
    }

    pub fn already_installed() -> Self {
        Self::new(
            code::RUNTIME_ALREADY_INSTALLED,
            ErrorCategory::Runtime,
            "session is already installed; install must be called exactly once per process",
        )
        .with_user_actionable(true)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(code::VALIDATION_INVALID_ARGUMENT, ErrorCategory::Validation, message)
            .with_user_actionable(true)
    }

    pub fn refresh_failed(message: impl Into<String>) -> Self {
        Self::new(code::TRANSPORT_REFRESH_FAILED, ErrorCategory::Transport, message)
            .with_retryable(true)
    }

    pub fn submit_failed(message: impl Into<String>) -> Self {
        Self::new(code::TRANSPORT_SUBMIT_FAILED, ErrorCategory::Transport, message)
            .with_retryable(true)
    }
}
