use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Failed to load reference data '{resource}': {message}")]
    DataLoadError { resource: String, message: String },

    #[error("Submission failed: {0}")]
    SubmissionError(#[from] SubmitError),
}

/// 送出流程的錯誤，獨立於 IntakeError 以便呼叫端分辨
#[derive(Error, Debug, Clone)]
pub enum SubmitError {
    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<FieldFailure>),

    #[error("a submission is already in flight")]
    InFlight,

    #[error("network error: {0}")]
    Transport(String),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("{0}")]
    Rejected(String),

    #[error("unreadable response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    Validation,
    Submission,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IntakeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IntakeError::HttpError(_) => ErrorCategory::Network,
            IntakeError::IoError(_) => ErrorCategory::System,
            IntakeError::SerializationError(_) | IntakeError::DataLoadError { .. } => {
                ErrorCategory::Data
            }
            IntakeError::ConfigValidationError { .. }
            | IntakeError::InvalidConfigValueError { .. }
            | IntakeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            IntakeError::SubmissionError(SubmitError::Validation(_)) => ErrorCategory::Validation,
            IntakeError::SubmissionError(_) => ErrorCategory::Submission,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            IntakeError::SubmissionError(SubmitError::InFlight) => ErrorSeverity::Low,
            IntakeError::SubmissionError(SubmitError::Validation(_)) => ErrorSeverity::High,
            IntakeError::HttpError(_) | IntakeError::SubmissionError(_) => ErrorSeverity::Medium,
            IntakeError::ConfigValidationError { .. }
            | IntakeError::InvalidConfigValueError { .. }
            | IntakeError::MissingConfigError { .. }
            | IntakeError::SerializationError(_)
            | IntakeError::DataLoadError { .. } => ErrorSeverity::High,
            IntakeError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            IntakeError::HttpError(_) => "Could not reach the server.".to_string(),
            IntakeError::IoError(e) => format!("A file could not be read or written: {}", e),
            IntakeError::SerializationError(_) => "Received data could not be parsed.".to_string(),
            IntakeError::ConfigValidationError { field, .. }
            | IntakeError::InvalidConfigValueError { field, .. }
            | IntakeError::MissingConfigError { field } => {
                format!("The configuration value '{}' is not usable.", field)
            }
            IntakeError::DataLoadError { resource, .. } => {
                format!("Reference data '{}' could not be loaded.", resource)
            }
            IntakeError::SubmissionError(SubmitError::Validation(_)) => {
                "Please correct the errors in the form before submitting.".to_string()
            }
            IntakeError::SubmissionError(e) => {
                format!("An error occurred: {}. Please try again later.", e)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the endpoint URL and your network connection",
            ErrorCategory::Configuration => "Review the TOML configuration file and CLI flags",
            ErrorCategory::Data => "Verify the reference JSON files exist and are well-formed",
            ErrorCategory::Validation => "Fix the reported fields in the events file",
            ErrorCategory::Submission => "Retry once the submission endpoint is available",
            ErrorCategory::System => "Check file paths and permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;
