//! Errors returned by resource lifecycle operations

use crate::azure::http::ApiError;
use crate::resource::id::IdParseError;
use crate::resource::schema::ValidationError;

pub type ResourceResult<T> = Result<T, ResourceError>;

/// Lifecycle operation, carried in errors for context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Import => "import",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// Rejected before any network call
    #[error("invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("{operation}: unable to parse SQL elastic pool ID {id:?}: {source}")]
    InvalidId {
        id: String,
        operation: Operation,
        #[source]
        source: IdParseError,
    },

    #[error("{operation} of SQL elastic pool {name:?} failed: {source}")]
    Api {
        operation: Operation,
        name: String,
        #[source]
        source: ApiError,
    },

    /// The API accepted the write but the follow-up read carried no id
    #[error("cannot read SQL elastic pool {name:?} (resource group {resource_group:?}) ID")]
    MissingId {
        name: String,
        resource_group: String,
    },

    #[error("SQL elastic pool {id:?} does not exist")]
    NotFound { id: String },
}

impl ResourceError {
    /// The underlying API error, if this failure came from the remote side
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ResourceError::Api { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
