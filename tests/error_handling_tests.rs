//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Error conversions work correctly
//! - Error matching allows clients to handle specific cases

use axum::http::StatusCode;
use axum::response::IntoResponse;
use tenantry::core::error::{
    ApiError, ConfigError, FieldValidationError, LinkError, ObjectError, RequestError,
    StorageError, ValidationError,
};

fn not_found(object_type: &str, id: &str) -> ApiError {
    ApiError::Object(ObjectError::NotFound {
        object_type: object_type.to_string(),
        id: id.to_string(),
    })
}

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_object_not_found_returns_404() {
        assert_eq!(not_found("user", "u1").status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unknown_type_and_app_return_404() {
        let err = ApiError::Object(ObjectError::UnknownType {
            object_type: "cat".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Object(ObjectError::AppNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_link_errors_return_400() {
        for err in [
            LinkError::CreationFailed,
            LinkError::MissingTarget,
            LinkError::MissingTargetType,
        ] {
            assert_eq!(ApiError::Link(err).status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_validation_error_returns_400() {
        let err = ApiError::Validation(ValidationError::MissingArgument {
            argument: "type".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_request_errors() {
        assert_eq!(
            ApiError::Request(RequestError::Unauthorized).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Request(RequestError::MethodNotAllowed {
                method: "PUT".to_string()
            })
            .status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::bad_request("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_storage_error_returns_500() {
        let err = ApiError::Storage(StorageError::Unavailable {
            backend: "memory".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_config_error_returns_500() {
        let err = ApiError::Config(ConfigError::InvalidValue {
            field: "base_path".to_string(),
            value: "v1".to_string(),
            message: "must start with '/'".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_object_error_codes() {
        assert_eq!(not_found("", "x").error_code(), "OBJECT_NOT_FOUND");
        assert_eq!(
            ApiError::Object(ObjectError::AppNotFound).error_code(),
            "APP_NOT_FOUND"
        );
    }

    #[test]
    fn test_link_error_codes() {
        assert_eq!(
            ApiError::Link(LinkError::CreationFailed).error_code(),
            "LINK_CREATION_FAILED"
        );
        assert_eq!(
            ApiError::Link(LinkError::MissingTargetType).error_code(),
            "LINK_TYPE_MISSING"
        );
    }

    #[test]
    fn test_request_error_codes() {
        assert_eq!(
            ApiError::Request(RequestError::UnknownMethod { method: None }).error_code(),
            "UNKNOWN_METHOD"
        );
        assert_eq!(ApiError::Internal("boom".into()).error_code(), "INTERNAL_ERROR");
    }
}

// =============================================================================
// Error Response Tests
// =============================================================================

mod error_response_tests {
    use super::*;

    #[test]
    fn test_error_response_has_code_and_message() {
        let response = ApiError::Link(LinkError::MissingTarget).to_response();
        assert_eq!(response.code, 400);
        assert_eq!(response.error, "LINK_TARGET_MISSING");
        assert_eq!(response.message, "Parameters 'type' and 'id' are missing.");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_error_response_includes_details_for_object_not_found() {
        let response = not_found("user", "u1").to_response();
        assert_eq!(response.message, "Object not found: u1 (user)");
        let details = response.details.expect("details should be present");
        assert_eq!(details["type"], "user");
        assert_eq!(details["id"], "u1");
    }

    #[test]
    fn test_validation_errors_include_field_details() {
        let err = ApiError::Validation(ValidationError::FieldErrors(vec![
            FieldValidationError {
                field: "email".to_string(),
                message: "is required".to_string(),
            },
            FieldValidationError {
                field: "picture".to_string(),
                message: "is not a valid URL".to_string(),
            },
        ]));
        let response = err.to_response();
        assert!(response.message.contains("email: is required"));
        let fields = response.details.expect("details should be present")["fields"].clone();
        assert_eq!(fields.as_array().map(Vec::len), Some(2));
        assert_eq!(fields[1]["field"], "picture");
    }

    #[test]
    fn test_error_response_serializes_without_empty_details() {
        let value = serde_json::to_value(ApiError::bad_request("bad").to_response()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"code": 400, "error": "BAD_REQUEST", "message": "bad"})
        );
    }
}

// =============================================================================
// Error Conversion Tests
// =============================================================================

mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_object_error_converts_to_api_error() {
        let err: ApiError = ObjectError::AppNotFound.into();
        assert!(matches!(err, ApiError::Object(ObjectError::AppNotFound)));
    }

    #[test]
    fn test_serde_json_error_converts_to_validation_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: ApiError = json_err.into();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::InvalidJson { .. })
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_anyhow_storage_error_keeps_its_kind() {
        let source = anyhow::Error::new(StorageError::QueryError {
            backend: "memory".to_string(),
            message: "lock poisoned".to_string(),
        });
        let err: ApiError = source.into();
        assert!(matches!(err, ApiError::Storage(StorageError::QueryError { .. })));
    }

    #[test]
    fn test_anyhow_other_error_becomes_internal() {
        let err: ApiError = anyhow::anyhow!("disk on fire").into();
        assert!(matches!(err, ApiError::Internal(ref m) if m == "disk on fire"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Matching Tests
// =============================================================================

mod error_matching_tests {
    use super::*;

    #[test]
    fn test_can_match_specific_object_errors() {
        let err = not_found("", "42");
        match err {
            ApiError::Object(ObjectError::NotFound { id, .. }) => assert_eq!(id, "42"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_can_match_unknown_method() {
        let err = ApiError::Request(RequestError::UnknownMethod {
            method: Some("frob".to_string()),
        });
        assert_eq!(err.to_string(), "Unknown method: frob");
        assert!(matches!(
            err,
            ApiError::Request(RequestError::UnknownMethod { method: Some(_) })
        ));
    }
}

// =============================================================================
// IntoResponse Tests
// =============================================================================

mod into_response_tests {
    use super::*;

    #[test]
    fn test_api_error_into_response_status() {
        let response = not_found("", "x").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_link_error_into_response_status() {
        let response = ApiError::Link(LinkError::CreationFailed).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
