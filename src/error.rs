// 🚨 Service Errors - one classified kind per failure leaving the service
//
// Collaborator errors (anyhow::Error) are kept as the source.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Update or merge target does not exist by name
    #[error("no company with this name: {name}")]
    NotFound { name: String },

    /// Create target already exists by name + zip
    #[error("company already exists: {name} ({zip})")]
    AlreadyExists { name: String, zip: String },

    /// One or more fields failed validation
    #[error("not a valid company: invalid {}", .fields.join(", "))]
    ValidationFailed { fields: Vec<&'static str> },

    /// Record source or store could not produce data
    #[error("failed acquiring companies")]
    UpstreamReadFailed {
        #[source]
        source: anyhow::Error,
    },

    /// Store rejected an insert, update or delete
    #[error("failed writing company")]
    UpstreamWriteFailed {
        #[source]
        source: anyhow::Error,
    },

    /// A validator pattern failed to compile
    #[error("internal pattern error: {0}")]
    InternalPattern(#[from] regex::Error),
}

/// Error kind, for comparing failures without caring about their payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    ValidationFailed,
    UpstreamReadFailed,
    UpstreamWriteFailed,
    InternalPattern,
}

impl ServiceError {
    pub fn read(source: anyhow::Error) -> Self {
        ServiceError::UpstreamReadFailed { source }
    }

    pub fn write(source: anyhow::Error) -> Self {
        ServiceError::UpstreamWriteFailed { source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound { .. } => ErrorKind::NotFound,
            ServiceError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            ServiceError::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            ServiceError::UpstreamReadFailed { .. } => ErrorKind::UpstreamReadFailed,
            ServiceError::UpstreamWriteFailed { .. } => ErrorKind::UpstreamWriteFailed,
            ServiceError::InternalPattern(_) => ErrorKind::InternalPattern,
        }
    }


    /// Message including the full cause chain
    pub fn detailed(&self) -> String {
        match self {
            ServiceError::UpstreamReadFailed { source } | ServiceError::UpstreamWriteFailed { source } => {
                format!("{}: {:#}", self, source)
            }
            _ => self.to_string(),
        }
    }
}
