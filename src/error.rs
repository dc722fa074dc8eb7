//! Error handling and the provider error taxonomy.
//!
//! Raw provider failures carry a `{status, message}` envelope; `ErrorKind`
//! maps that envelope onto a closed taxonomy with user-facing text. The
//! substring rules exist because the upstream provider does not expose a
//! stable machine-readable error code in all cases.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("API key not found. Please add an API key in settings.")]
    MissingCredential,

    #[error("{message}")]
    Provider { status: Option<u16>, message: String },

    #[error("No image data in provider response")]
    NoImageReturned,

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status associated with this error, when one is known.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Provider { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Closed classification of provider failures, used for user-facing
/// reporting. Retry decisions live in [`crate::retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingCredential,
    InvalidRequest,
    InvalidCredential,
    PermissionDenied,
    ModelUnavailable,
    QuotaExceeded,
    ServiceOverloaded,
    NoImageReturned,
    Unknown,
}

impl ErrorKind {
    /// Classify an error into the taxonomy. Pure; no side effects.
    pub fn classify(error: &Error) -> ErrorKind {
        match error {
            Error::MissingCredential => ErrorKind::MissingCredential,
            Error::NoImageReturned => ErrorKind::NoImageReturned,
            _ => Self::classify_envelope(error.status_code(), &error.to_string()),
        }
    }

    /// Map a raw `{status, message}` envelope onto the taxonomy.
    ///
    /// First match wins. Status codes are checked alongside message
    /// substrings because some transports surface only one of the two.
    pub fn classify_envelope(status: Option<u16>, message: &str) -> ErrorKind {
        if message.contains("API key not found") || message.contains("API Key not found") {
            return ErrorKind::MissingCredential;
        }
        if status == Some(400) || message.contains("InvalidArgument") {
            return ErrorKind::InvalidRequest;
        }
        if status == Some(401) || message.contains("API key not valid") {
            return ErrorKind::InvalidCredential;
        }
        if status == Some(403) || message.contains("permission denied") {
            return ErrorKind::PermissionDenied;
        }
        if status == Some(404) || message.contains("not found") {
            return ErrorKind::ModelUnavailable;
        }
        if status == Some(429)
            || message.contains("Quota exceeded")
            || message.contains("Resource has been exhausted")
        {
            return ErrorKind::QuotaExceeded;
        }
        if status == Some(503) || message.contains("Overloaded") {
            return ErrorKind::ServiceOverloaded;
        }
        ErrorKind::Unknown
    }
}

const GENERIC_UNKNOWN: &str = "An unexpected error occurred. Check your connection and try again.";

/// Unknown-kind messages at or above this length are replaced with the
/// generic text so stack-trace-like provider output never reaches the user.
const MAX_VERBATIM_LEN: usize = 100;

/// Short user-facing message for an error, via its classified kind.
pub fn user_message(error: &Error) -> String {
    match ErrorKind::classify(error) {
        ErrorKind::MissingCredential => "No API key configured. Add one in settings.".to_string(),
        ErrorKind::InvalidRequest => {
            "The provider rejected the request. Adjust the prompt or reference images.".to_string()
        }
        ErrorKind::InvalidCredential => {
            "The API key was not accepted. Check it in settings.".to_string()
        }
        ErrorKind::PermissionDenied => {
            "This API key does not have access to the requested model.".to_string()
        }
        ErrorKind::ModelUnavailable => "The requested model was not found.".to_string(),
        ErrorKind::QuotaExceeded => "Rate limit reached. Wait a moment and try again.".to_string(),
        ErrorKind::ServiceOverloaded => {
            "The model is overloaded right now. Try again shortly.".to_string()
        }
        ErrorKind::NoImageReturned => {
            "The provider returned no image for this request.".to_string()
        }
        ErrorKind::Unknown => {
            let message = error.to_string();
            if message.len() < MAX_VERBATIM_LEN {
                message
            } else {
                GENERIC_UNKNOWN.to_string()
            }
        }
    }
}
