//! Typed error handling for the dispatch core
//!
//! Every handler failure is converted into one of these variants at the point
//! of detection, and every variant knows its HTTP status and stable error code.
//!
//! # Error Categories
//!
//! - [`ObjectError`]: object lookups and type resolution (CRUD)
//! - [`LinkError`]: link-graph operations
//! - [`ConfigError`]: configuration parsing and validation
//! - [`ValidationError`]: payload validation
//! - [`StorageError`]: failures reported by the persistence/search ports
//! - [`RequestError`]: malformed requests, missing principal, unknown utilities
//!
//! # Example
//!
//! ```rust,ignore
//! let obj = state
//!     .objects
//!     .read(&app.appid, &id)
//!     .await?
//!     .ok_or_else(|| ObjectError::NotFound { object_type: ty.clone(), id: id.clone() })?;
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for the dispatch core
#[derive(Debug)]
pub enum ApiError {
    /// Object-related errors (CRUD operations)
    Object(ObjectError),

    /// Link-graph errors
    Link(LinkError),

    /// Configuration errors
    Config(ConfigError),

    /// Validation errors
    Validation(ValidationError),

    /// Storage/search port errors
    Storage(StorageError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Unexpected failures (mapped to a generic server error)
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Object(e) => write!(f, "{}", e),
            ApiError::Link(e) => write!(f, "{}", e),
            ApiError::Config(e) => write!(f, "{}", e),
            ApiError::Validation(e) => write!(f, "{}", e),
            ApiError::Storage(e) => write!(f, "{}", e),
            ApiError::Request(e) => write!(f, "{}", e),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Object(e) => Some(e),
            ApiError::Link(e) => Some(e),
            ApiError::Config(e) => Some(e),
            ApiError::Validation(e) => Some(e),
            ApiError::Storage(e) => Some(e),
            ApiError::Request(e) => Some(e),
            ApiError::Internal(_) => None,
        }
    }
}

/// Error envelope returned to HTTP clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Numeric HTTP status
    pub code: u16,
    /// Stable error code for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Shorthand for a generic bad-request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Request(RequestError::BadRequest {
            message: message.into(),
        })
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Object(e) => e.status_code(),
            ApiError::Link(e) => e.status_code(),
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Request(e) => e.status_code(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Object(e) => e.error_code(),
            ApiError::Link(e) => e.error_code(),
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::Request(e) => e.error_code(),
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.status_code().as_u16(),
            error: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Object(ObjectError::NotFound { object_type, id }) => {
                Some(serde_json::json!({
                    "type": object_type,
                    "id": id
                }))
            }
            ApiError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Object Errors
// =============================================================================

/// Errors related to object operations
#[derive(Debug)]
pub enum ObjectError {
    /// Object was not found in the tenant
    NotFound { object_type: String, id: String },

    /// The type/method combination has no handler
    UnknownType { object_type: String },

    /// The tenant could not be resolved
    AppNotFound,
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectError::NotFound { object_type, id } => {
                if object_type.is_empty() {
                    write!(f, "Object not found: {}", id)
                } else {
                    write!(f, "Object not found: {} ({})", id, object_type)
                }
            }
            ObjectError::UnknownType { object_type } => {
                write!(f, "Type '{}' not found.", object_type)
            }
            ObjectError::AppNotFound => write!(f, "App not found."),
        }
    }
}

impl std::error::Error for ObjectError {}

impl ObjectError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::NOT_FOUND
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ObjectError::NotFound { .. } => "OBJECT_NOT_FOUND",
            ObjectError::UnknownType { .. } => "TYPE_NOT_FOUND",
            ObjectError::AppNotFound => "APP_NOT_FOUND",
        }
    }
}

impl From<ObjectError> for ApiError {
    fn from(err: ObjectError) -> Self {
        ApiError::Object(err)
    }
}

// =============================================================================
// Link Errors
// =============================================================================

/// Errors related to link operations
#[derive(Debug)]
pub enum LinkError {
    /// The link-graph port refused to create the edge
    CreationFailed,

    /// POST without a target id
    MissingTarget,

    /// GET without a target type
    MissingTargetType,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::CreationFailed => write!(f, "Failed to create link."),
            LinkError::MissingTarget => write!(f, "Parameters 'type' and 'id' are missing."),
            LinkError::MissingTargetType => write!(f, "Parameter 'type' is missing."),
        }
    }
}

impl std::error::Error for LinkError {}

impl LinkError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            LinkError::CreationFailed => "LINK_CREATION_FAILED",
            LinkError::MissingTarget => "LINK_TARGET_MISSING",
            LinkError::MissingTargetType => "LINK_TYPE_MISSING",
        }
    }
}

impl From<LinkError> for ApiError {
    fn from(err: LinkError) -> Self {
        ApiError::Link(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::Config(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Body is not valid JSON or not the expected JSON shape
    InvalidJson { message: String },

    /// Missing required argument
    MissingArgument { argument: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
            ValidationError::MissingArgument { argument } => {
                write!(f, "Missing required argument: {}", argument)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors surfaced by the persistence and search ports
#[derive(Debug)]
pub enum StorageError {
    /// Query execution error
    QueryError { backend: String, message: String },

    /// Backend not available
    Unavailable { backend: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
            StorageError::Unavailable { backend } => {
                write!(f, "Storage backend '{}' is unavailable", backend)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Storage(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Generic malformed request
    BadRequest { message: String },

    /// No authenticated user and no resolved tenant
    Unauthorized,

    /// Unknown `/utils/{method}`
    UnknownMethod { method: Option<String> },

    /// The resource does not answer this HTTP method
    MethodNotAllowed { method: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::BadRequest { message } => write!(f, "{}", message),
            RequestError::Unauthorized => write!(f, "Unauthorized"),
            RequestError::UnknownMethod { method } => {
                write!(f, "Unknown method: {}", method.as_deref().unwrap_or("empty"))
            }
            RequestError::MethodNotAllowed { method } => {
                write!(f, "Method {} is not allowed here", method)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RequestError::Unauthorized => StatusCode::UNAUTHORIZED,
            RequestError::UnknownMethod { .. } => StatusCode::BAD_REQUEST,
            RequestError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::BadRequest { .. } => "BAD_REQUEST",
            RequestError::Unauthorized => "UNAUTHORIZED",
            RequestError::UnknownMethod { .. } => "UNKNOWN_METHOD",
            RequestError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        ApiError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for ApiError {
    fn from(err: serde_yaml::Error) -> Self {
        ApiError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

/// Port failures arrive as `anyhow::Error` and become server errors
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<StorageError>() {
            Ok(storage) => ApiError::Storage(storage),
            Err(other) => ApiError::Internal(other.to_string()),
        }
    }
}

/// A specialized Result type for dispatch operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_error_display() {
        let err = ObjectError::NotFound {
            object_type: String::new(),
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "Object not found: 42");
    }

    #[test]
    fn test_unknown_type_names_the_type() {
        let err = ObjectError::UnknownType {
            object_type: "cat".to_string(),
        };
        assert_eq!(err.to_string(), "Type 'cat' not found.");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_link_error_messages() {
        assert_eq!(LinkError::CreationFailed.to_string(), "Failed to create link.");
        assert_eq!(
            LinkError::MissingTargetType.to_string(),
            "Parameter 'type' is missing."
        );
        assert_eq!(LinkError::MissingTarget.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_error_multiple_fields() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError {
                field: "name".to_string(),
                message: "required".to_string(),
            },
            FieldValidationError {
                field: "email".to_string(),
                message: "invalid format".to_string(),
            },
        ]);
        let display = err.to_string();
        assert!(display.contains("name"));
        assert!(display.contains("email"));
    }

    #[test]
    fn test_api_error_conversion() {
        let err: ApiError = ObjectError::AppNotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "APP_NOT_FOUND");
        assert_eq!(err.to_response().message, "App not found.");
    }

    #[test]
    fn test_error_response_carries_details() {
        let err = ApiError::Object(ObjectError::NotFound {
            object_type: "user".to_string(),
            id: "7".to_string(),
        });
        let response = err.to_response();
        assert_eq!(response.code, 404);
        assert_eq!(response.error, "OBJECT_NOT_FOUND");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_unknown_method_message() {
        let err = RequestError::UnknownMethod { method: None };
        assert_eq!(err.to_string(), "Unknown method: empty");
        let err = RequestError::UnknownMethod {
            method: Some("frobnicate".to_string()),
        };
        assert_eq!(err.to_string(), "Unknown method: frobnicate");
    }

    #[test]
    fn test_anyhow_becomes_internal() {
        let err: ApiError = anyhow::anyhow!("disk on fire").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_anyhow_storage_error_is_preserved() {
        let err: ApiError = anyhow::Error::new(StorageError::Unavailable {
            backend: "memory".to_string(),
        })
        .into();
        assert!(matches!(err, ApiError::Storage(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let api_err: ApiError = json_err.into();
        assert!(matches!(
            api_err,
            ApiError::Validation(ValidationError::InvalidJson { .. })
        ));
    }
}
