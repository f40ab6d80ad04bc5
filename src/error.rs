//! Error types shared across the crate.
//!
//! - [`ValidationError`]: local checks that block a submission before any
//!   remote call.
//! - [`RemoteError`]: any failure reported by the remote collaborator.
//! - [`CoreError`]: what a store operation reports back to its caller.

use thiserror::Error;
use uuid::Uuid;

use crate::models::Fte;

/// An assigned skill that is not part of the project's tech stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Skill {skill_id} is not part of the project's tech stack")]
pub struct SkillMismatchError {
    pub skill_id: Uuid,
}

/// A local validation failure, reported inline against a field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must not be before the start date")]
    DateOrder { field: &'static str },

    #[error("FTE must be greater than 0 and at most 1 (got {value})")]
    FteOutOfRange { value: f64 },

    #[error("Maximum FTE must be greater than 0 (got {value})")]
    MaxFteOutOfRange { value: f64 },

    #[error(transparent)]
    SkillMismatch(#[from] SkillMismatchError),

    #[error("Allocation targets project {actual} but was checked against project {expected}")]
    ProjectMismatch { expected: Uuid, actual: Uuid },

    #[error("Allocation would reach {peak} FTE against a maximum of {max}")]
    OverAllocated { peak: Fte, max: Fte },
}

impl ValidationError {
    /// The form field this error should be displayed against.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field } | Self::DateOrder { field } => *field,
            Self::FteOutOfRange { .. } | Self::OverAllocated { .. } => "fte",
            Self::MaxFteOutOfRange { .. } => "maxFTE",
            Self::SkillMismatch(_) => "assignedSkills",
            Self::ProjectMismatch { .. } => "projectId",
        }
    }
}

/// Failures reported by the remote collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    /// The request never produced a response (connection, timeout).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("Server rejected the request ({status}){}", message_suffix(.message))]
    Rejected { status: u16, message: Option<String> },

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: Some(message.into()),
        }
    }

    /// The human-readable message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                message: Some(m), ..
            } if !m.trim().is_empty() => Some(m.as_str()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Rejected { status: 404, .. })
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Error reported by a store operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Submission blocked locally; never reached the network.
    #[error("{}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// The remote call failed. `message` is what the user sees: the server's
    /// message when it sent one, otherwise a per-operation fallback.
    #[error("{message}")]
    Remote {
        message: String,
        #[source]
        source: RemoteError,
    },
}

impl CoreError {
    pub fn remote(source: RemoteError, fallback: impl Into<String>) -> Self {
        let message = source
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.into());
        Self::Remote { message, source }
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            Self::Remote { .. } => &[],
        }
    }
}

impl From<ValidationError> for CoreError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(vec![e])
    }
}

impl From<Vec<ValidationError>> for CoreError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failures while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}
