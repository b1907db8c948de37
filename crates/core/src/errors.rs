//! Core error types for the Vaultfolio platform.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use rust_decimal::Decimal;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the platform.
///
/// Every lifecycle operation validates before it mutates, so any of these
/// errors means nothing was written.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Insufficient balance for user {user_id}: available {available}, requested {requested}")]
    InsufficientBalance {
        user_id: String,
        available: Decimal,
        requested: Decimal,
    },

    /// A compare-and-swap guard failed because another write got there first.
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Coarse classification of [`Error`], used by outer layers for status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    InvalidState,
    InsufficientBalance,
    Conflict,
    Internal,
}

/// Who is going to read an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Admin,
    User,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Database(DatabaseError::NotFound(_)) => ErrorKind::NotFound,
            Error::Unauthorized(_) => ErrorKind::Unauthorized,
            Error::InvalidState(_) => ErrorKind::InvalidState,
            Error::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Error::ConcurrentModification(_) => ErrorKind::Conflict,
            Error::Database(_) | Error::Unexpected(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to show to `audience`.
    ///
    /// Admins get the specific message. Users only see validation and balance
    /// errors verbatim; everything else collapses to a generic message so that
    /// internal state is not leaked.
    pub fn public_message(&self, audience: Audience) -> String {
        if audience == Audience::Admin {
            return self.to_string();
        }
        match self.kind() {
            ErrorKind::Validation | ErrorKind::InsufficientBalance => self.to_string(),
            ErrorKind::NotFound | ErrorKind::InvalidState => {
                "The requested operation could not be completed".to_string()
            }
            ErrorKind::Unauthorized => "You are not allowed to perform this action".to_string(),
            ErrorKind::Conflict => "Please try again".to_string(),
            ErrorKind::Internal => "Something went wrong".to_string(),
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        Error::NotFound(format!("{} {} not found", entity, id))
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Error::Validation(ValidationError::InvalidInput(message.into()))
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Amount {amount} is below the minimum investment of {minimum}")]
    BelowMinimum { amount: Decimal, minimum: Decimal },

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Unexpected(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
