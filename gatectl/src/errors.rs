use crate::db::errors::DbError;
use serde::Serialize;
use thiserror::Error as ThisError;

/// Errors surfaced by the registries to the layer above them.
///
/// Every variant is terminal for the operation that produced it. The transaction the operation
/// was running in has already been rolled back by the time the caller sees the error.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Requested entity, or an entity it refers to, does not exist or is not live
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// A supplied id set resolved to fewer live rows than were requested
    #[error("One or more {resource} not found: requested {requested}, resolved {resolved} (missing {missing:?})")]
    ValidationMismatch {
        resource: String,
        requested: usize,
        resolved: usize,
        missing: Vec<i64>,
    },

    /// The store rejected a write, e.g. a unique or foreign key constraint
    #[error("Could not {operation}: {source}")]
    Conflict { operation: String, source: DbError },

    /// Role-scoped restriction, raised by the authorization layer above the registries
    #[error("Insufficient permissions to {action} {resource}")]
    Forbidden { action: String, resource: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Database operation error that is not a constraint rejection
    #[error(transparent)]
    Database(#[from] DbError),
}

/// Coarse classification used to map errors onto transport responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    ValidationMismatch,
    Conflict,
    Forbidden,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::ValidationMismatch { .. } => ErrorKind::ValidationMismatch,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::Forbidden { .. } => ErrorKind::Forbidden,
            Error::Config { .. } => ErrorKind::Internal,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => ErrorKind::NotFound,
                DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } | DbError::CheckViolation { .. } => {
                    ErrorKind::Conflict
                }
                DbError::Other(_) => ErrorKind::Internal,
            },
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::ValidationMismatch { resource, .. } => format!("One or more {resource} not found"),
            Error::Conflict { operation, source } => match source {
                DbError::UniqueViolation { .. } => format!("Could not {operation}: resource already exists"),
                DbError::ForeignKeyViolation { .. } => format!("Could not {operation}: it is still referenced or refers to a missing resource"),
                DbError::CheckViolation { .. } => format!("Could not {operation}: invalid data provided"),
                _ => format!("Could not {operation}"),
            },
            Error::Forbidden { action, resource } => format!("Insufficient permissions to {action} {resource}"),
            Error::Config { .. } => "Internal server error".to_string(),
            Error::Database(DbError::NotFound) => "Resource not found".to_string(),
            Error::Database(_) => "Database error occurred".to_string(),
        }
    }

    pub(crate) fn not_found(resource: &str, id: impl ToString) -> Self {
        Error::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    /// Map a failed write. Constraint rejections become [`Error::Conflict`]; anything else
    /// stays a database error.
    pub(crate) fn on_write(operation: &'static str) -> impl FnOnce(DbError) -> Error {
        move |err| {
            if err.is_constraint_violation() {
                Error::Conflict {
                    operation: operation.to_string(),
                    source: err,
                }
            } else {
                Error::Database(err)
            }
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
