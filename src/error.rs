//! Error types for the skillswap wizard core.

use crate::validation::ValidationResult;
use crate::wizard::step::WizardStep;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the persistence gateway (the hosted backend).
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The backend rejected the operation and returned a message.
    #[error("{0}")]
    Rejected(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unexpected status {status} from {endpoint}")]
    UnexpectedStatus { status: u16, endpoint: String },

    #[error("File upload succeeded but URL was not returned. Please try again.")]
    MissingUrl,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Errors surfaced by wizard step operations.
///
/// Every variant leaves the wizard on its current step; none is fatal.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    /// Field-scoped input errors. Blocks persistence.
    #[error("Validation failed")]
    Validation(ValidationResult),

    /// A gateway save failed. Form-level, recoverable by retrying the step.
    #[error("{message}")]
    Persistence { message: String },

    /// Photo-step errors (see [`PhotoError`]).
    #[error(transparent)]
    Photo(#[from] PhotoError),

    /// No owner identifier in the session. Requires re-authentication.
    #[error("User ID not found. Cannot save.")]
    MissingUser,

    /// The submitted form or operation does not belong to the current step.
    #[error("Operation for step {requested} is not valid on step {current}")]
    StepMismatch {
        current: WizardStep,
        requested: WizardStep,
    },

    /// A skills-list operation was aimed at a non-skills step.
    #[error("Skills can only be edited on a skills step")]
    NotSkillsStep,
}

/// Photo-step errors. `UnsupportedType` and `TooLarge` are terminal for the
/// selected file; `UploadFailed` is retryable without reselecting.
#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("Unsupported file type. Please use JPEG or PNG.")]
    UnsupportedType,

    #[error("File is too large. Max size is 5MB.")]
    TooLarge,

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Could not crop image.")]
    CropFailed,

    #[error("Cropping error or no file selected.")]
    NothingToUpload,

    #[error("{0}")]
    UploadFailed(String),

    #[error("An upload is already in progress.")]
    Busy,

    #[error("Please confirm or cancel cropping before proceeding.")]
    CropPending,

    #[error("No photo to delete.")]
    NoPhoto,
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
