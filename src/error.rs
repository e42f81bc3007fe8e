//! Error types for the EasyGen client.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Preference wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Generation dialog error: {0}")]
    Dialog(#[from] DialogError),

    #[error("Newsletter error: {0}")]
    Newsletter(#[from] NewsletterError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Coarse classification of a failed backend call.
///
/// Every call site works from this instead of re-inspecting response shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expired or invalid credentials. Always tears the session down.
    Auth,
    /// The request was understood and refused (bad input, missing field).
    Validation,
    /// The backend could not be reached or timed out.
    Transport,
    /// The backend failed or answered with something unreadable.
    Server,
}

/// Errors produced at the network boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized: {}", detail.as_deref().unwrap_or("token rejected"))]
    Unauthorized { status: u16, detail: Option<String> },

    #[error("Request rejected ({status}): {}", message.as_deref().unwrap_or("no details"))]
    Validation { status: u16, message: Option<String> },

    #[error("Server error ({status}): {}", message.as_deref().unwrap_or("no details"))]
    Server { status: u16, message: Option<String> },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Which bucket of the error taxonomy this error falls into.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Auth,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Transport(_) | Self::Timeout(_) => ErrorKind::Transport,
            Self::Server { .. } | Self::Decode(_) => ErrorKind::Server,
        }
    }

    /// Whether this error means the current credentials are no longer usable.
    pub fn is_token_error(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    /// The backend-provided message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { detail, .. } => detail.as_deref(),
            Self::Validation { message, .. } | Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The backend-provided message, or `fallback` when there is none.
    pub fn message_or(&self, fallback: &str) -> String {
        self.message().unwrap_or(fallback).to_string()
    }

    /// HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. }
            | Self::Validation { status, .. }
            | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Session persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Login / signup / logout errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Another {0} request is already in flight")]
    Busy(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Preference wizard errors.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("The wizard is busy")]
    Busy,

    #[error("The wizard is not open")]
    NotOpen,

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the last step")]
    AtLastStep,

    #[error("Preferences can only be saved from the last step")]
    NotOnLastStep,

    #[error("The {0} step has no selectable options")]
    FreeTextStep(&'static str),

    #[error("Option {id} is not available on the {step} step")]
    UnknownOption { step: &'static str, id: u64 },

    #[error("Session expired")]
    SessionExpired,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Generation dialog errors.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("Please enter a title or select a suggestion")]
    EmptyTitle,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("The {0} action is already running")]
    Busy(&'static str),

    #[error("No generated post to work with")]
    NoPost,

    #[error("No suggestion at index {0}")]
    SuggestionOutOfRange(usize),

    #[error("Session expired")]
    SessionExpired,

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Clipboard errors.
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("No clipboard command configured")]
    Unavailable,

    #[error("Clipboard command `{program}` failed: {reason}")]
    CommandFailed { program: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Newsletter subscription errors.
#[derive(Debug, thiserror::Error)]
pub enum NewsletterError {
    #[error("Please enter your email address")]
    EmptyEmail,

    #[error("A subscription request is already in flight")]
    Busy,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type alias for the client.
pub type Result<T> = std::result::Result<T, Error>;
