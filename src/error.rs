/// Error types
///
/// Each layer has its own enum (input validation, storage, configuration,
/// passwords, access tokens, sessions). Handlers return `AppError`, which
/// owns the mapping to HTTP status codes and the JSON error body.
///
/// Credential and token rejections all surface as 401 with fixed messages,
/// so a client cannot tell an unknown email from a wrong password, or a
/// revoked refresh token from one that never existed.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;

/// Rejected request input
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField(String),
    TooLong(String, usize),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is required", field),
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (at most {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} is not valid", field),
        }
    }
}

impl StdError for ValidationError {}

#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseError {
    /// Unique key already taken (email, refresh token)
    Duplicate(String),
    /// Row points at a user that does not exist
    MissingReference(String),
    Unavailable(String),
    Query(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::Duplicate(msg) => write!(f, "duplicate key: {}", msg),
            DatabaseError::MissingReference(msg) => write!(f, "missing reference: {}", msg),
            DatabaseError::Unavailable(msg) => write!(f, "database unavailable: {}", msg),
            DatabaseError::Query(msg) => write!(f, "query failed: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => DatabaseError::Duplicate(db_err.message().to_string()),
                Some("23503") => DatabaseError::MissingReference(db_err.message().to_string()),
                _ => DatabaseError::Query(err.to_string()),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::Unavailable(err.to_string())
            }
            _ => DatabaseError::Query(err.to_string()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
    Load(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(key) => write!(f, "{} must be set", key),
            ConfigError::InvalidValue(msg) => write!(f, "{}", msg),
            ConfigError::Load(msg) => write!(f, "could not load configuration: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}

/// Password hashing errors
///
/// `VerificationFailure` means the stored digest could not be parsed.
/// A wrong password is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PasswordError {
    HashingFailure(String),
    VerificationFailure(String),
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordError::HashingFailure(msg) => write!(f, "Password hashing failed: {}", msg),
            PasswordError::VerificationFailure(msg) => {
                write!(f, "Password hash could not be parsed: {}", msg)
            }
        }
    }
}

impl StdError for PasswordError {}

/// Access token errors
#[derive(Debug, Clone, PartialEq)]
pub enum TokenError {
    InvalidSignature,
    Malformed(String),
    Expired,
    SubjectUnparseable(String),
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::InvalidSignature => write!(f, "Token signature is invalid"),
            TokenError::Malformed(msg) => write!(f, "Token is malformed: {}", msg),
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::SubjectUnparseable(sub) => {
                write!(f, "Token subject is not a valid id: {}", sub)
            }
            TokenError::Signing(msg) => write!(f, "Token signing failed: {}", msg),
        }
    }
}

impl StdError for TokenError {}

/// Authentication and session errors
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    AuthenticationFailed,
    MissingToken,
    /// Valid access token whose account has since been deleted
    UnknownAccount,
    InvalidToken(TokenError),
    NotFound,
    Revoked,
    Expired,
    StorageFailure(DatabaseError),
    HashingFailure(String),
    TokenGeneration(String),
}

impl AuthError {
    /// True for errors caused by what the caller presented, as opposed
    /// to a failure on our side.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            AuthError::StorageFailure(_) | AuthError::HashingFailure(_) | AuthError::TokenGeneration(_)
        )
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::AuthenticationFailed => write!(f, "Invalid credentials"),
            AuthError::MissingToken => write!(f, "No bearer token in Authorization header"),
            AuthError::UnknownAccount => write!(f, "Account for this token no longer exists"),
            AuthError::InvalidToken(e) => write!(f, "{}", e),
            AuthError::NotFound => write!(f, "Refresh token not found"),
            AuthError::Revoked => write!(f, "Refresh token has been revoked"),
            AuthError::Expired => write!(f, "Refresh token has expired"),
            AuthError::StorageFailure(e) => write!(f, "Token storage failed: {}", e),
            AuthError::HashingFailure(msg) => write!(f, "Password hashing failed: {}", msg),
            AuthError::TokenGeneration(msg) => write!(f, "Token generation failed: {}", msg),
        }
    }
}

impl StdError for AuthError {}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => AuthError::TokenGeneration(msg),
            other => AuthError::InvalidToken(other),
        }
    }
}

impl From<DatabaseError> for AuthError {
    fn from(err: DatabaseError) -> Self {
        AuthError::StorageFailure(err)
    }
}

/// Error returned by every route handler
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Database(DatabaseError),
    Auth(AuthError),
    NotFound(String),
    Forbidden(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::Forbidden(msg) => write!(f, "{}", msg),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Auth(AuthError::HashingFailure(err.to_string()))
    }
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Also logged, to correlate a client report with the server log
    pub error_id: String,
    pub error: String,
    pub code: &'static str,
}

const INTERNAL: (StatusCode, &str, &str) = (
    StatusCode::INTERNAL_SERVER_ERROR,
    "INTERNAL_ERROR",
    "Something went wrong",
);

impl AppError {
    /// Status, machine-readable code and client-facing message
    fn classify(&self) -> (StatusCode, &'static str, String) {
        let (status, code, message) = match self {
            AppError::Validation(e) => {
                return (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Database(DatabaseError::Duplicate(_)) => {
                (StatusCode::CONFLICT, "DUPLICATE", "Already exists")
            }
            AppError::Auth(AuthError::AuthenticationFailed) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Incorrect email or password",
            ),
            AppError::Auth(e) if e.is_rejection() => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or expired token",
            ),
            AppError::NotFound(_) => {
                return (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }
            AppError::Forbidden(msg) => {
                return (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
            }
            AppError::Database(_) | AppError::Auth(_) | AppError::Internal(_) => INTERNAL,
        };
        (status, code, message.to_string())
    }

    fn log(&self, error_id: &str) {
        match self {
            AppError::Validation(_) | AppError::NotFound(_) | AppError::Forbidden(_) => {
                tracing::info!(error_id, error = %self, "Request refused");
            }
            AppError::Database(DatabaseError::Duplicate(_)) => {
                tracing::warn!(error_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Auth(e) if e.is_rejection() => {
                tracing::warn!(error_id, error = %e, "Authentication rejected");
            }
            AppError::Database(_) | AppError::Auth(_) | AppError::Internal(_) => {
                tracing::error!(error_id, error = %self, "Request failed");
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        let (status, code, error) = self.classify();
        HttpResponse::build(status).json(ErrorResponse {
            error_id,
            error,
            code,
        })
    }
}

/// Names an operation in log lines so failures can be traced back to it
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub operation: &'static str,
}

impl ErrorContext {
    pub fn new(operation: &'static str) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            operation,
        }
    }

    /// Log `error` under this context and hand it back for `?` chains.
    pub fn log_error(&self, error: AppError) -> AppError {
        tracing::warn!(
            request_id = %self.request_id,
            operation = self.operation,
            error = %error,
            "Operation failed"
        );
        error
    }
}
