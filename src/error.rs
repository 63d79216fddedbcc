//! Error types for menu fetching and instance setup
//!
//! Errors are classified by where they surface:
//! - MenuError: a single week request failed (network, timeout, status, body)
//! - ValidationError: setup-time checks, shown to the configuration wizard
//! - TargetDateError: malformed input to the set_date command

use thiserror::Error;

/// Failure of one Nutrislice week request.
///
/// For the current week this fails the whole refresh cycle. For the previous
/// and next weeks the window fetcher downgrades it to an absent snapshot.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {secs} seconds")]
    Timeout { secs: u64 },

    #[error("Nutrislice API returned status {status}")]
    Status { status: u16 },

    #[error("Failed to parse menu response: {0}")]
    Parse(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl MenuError {
    /// Returns true if the next scheduled refresh has a reasonable chance of
    /// succeeding without any change to configuration.
    pub fn is_retryable(&self) -> bool {
        match self {
            MenuError::Network(_) | MenuError::Timeout { .. } => true,
            MenuError::Status { status } => *status == 429 || *status >= 500,
            MenuError::Parse(_) | MenuError::InvalidUrl(_) => false,
        }
    }

    /// Map a reqwest transport error, keeping timeouts distinct.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            MenuError::Timeout { secs: timeout_secs }
        } else if err.is_decode() {
            MenuError::Parse(err.to_string())
        } else {
            MenuError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MenuError {
    fn from(err: serde_json::Error) -> Self {
        MenuError::Parse(err.to_string())
    }
}

/// Setup-time validation failure. Blocks creation of the instance.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Could not connect to Nutrislice: {0}")]
    CannotConnect(String),

    #[error("Nutrislice rejected the district/school: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ValidationError {
    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ValidationError::CannotConnect(_) => "Check your internet connection and try again.",
            ValidationError::InvalidInput(_) => {
                "Check the district and school name as they appear in the Nutrislice URL."
            }
            ValidationError::InvalidConfig(_) => "Check the meal type and category selection.",
        }
    }
}

/// Rejected input to the set_date command. The override is left unchanged.
#[derive(Debug, Error)]
pub enum TargetDateError {
    #[error("Invalid date format: {0}. Use YYYY-MM-DD, 'today' or 'tomorrow'")]
    InvalidFormat(String),
}

/// Serializable error representation for the setup wizard
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupError {
    pub message: String,
    pub error_type: SetupErrorType,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupErrorType {
    CannotConnect,
    InvalidInput,
    InvalidConfig,
}

impl From<&ValidationError> for SetupError {
    fn from(err: &ValidationError) -> Self {
        let error_type = match err {
            ValidationError::CannotConnect(_) => SetupErrorType::CannotConnect,
            ValidationError::InvalidInput(_) => SetupErrorType::InvalidInput,
            ValidationError::InvalidConfig(_) => SetupErrorType::InvalidConfig,
        };

        SetupError {
            message: err.to_string(),
            error_type,
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
