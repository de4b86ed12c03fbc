//! Error handling for the Consensus Server API
//!
//! This module contains standardized error handling for the API.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

use consensus_core::ConsensusError;

use crate::error::ServerError;

/// API Error type for returning standard error responses
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),
    /// Not found (404)
    NotFound(String),
    /// Wrapped server error
    ServerError(ServerError),
}

impl From<ServerError> for ApiError {
    fn from(err: ServerError) -> Self {
        ApiError::ServerError(err)
    }
}

impl From<ConsensusError> for ApiError {
    fn from(err: ConsensusError) -> Self {
        ApiError::ServerError(ServerError::Consensus(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::ServerError(err) => write!(f, "Server Error: {}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                error_body(StatusCode::BAD_REQUEST, "ERR_BAD_REQUEST", msg, None)
            }
            ApiError::NotFound(msg) => {
                error_body(StatusCode::NOT_FOUND, "ERR_NOT_FOUND", msg, None)
            }
            ApiError::ServerError(err) => server_error_response(err),
        }
    }
}

/// Map a server error onto status, code and body
fn server_error_response(err: ServerError) -> Response {
    match err {
        ServerError::Consensus(err) => {
            let message = err.message();
            if err.is_client_error() {
                debug!(error = %message, "Rejected request");
            }
            match err {
                ConsensusError::MissingParameter(_) => error_body(
                    StatusCode::BAD_REQUEST,
                    "ERR_MISSING_PARAMETER",
                    message,
                    None,
                ),
                ConsensusError::Validation(_) => error_body(
                    StatusCode::BAD_REQUEST,
                    "ERR_VALIDATION_ERROR",
                    message,
                    None,
                ),
                ConsensusError::Graph(_) => {
                    error_body(StatusCode::BAD_REQUEST, "ERR_GRAPH_ERROR", message, None)
                }
                ConsensusError::NotFound(_) => {
                    error_body(StatusCode::NOT_FOUND, "ERR_NOT_FOUND", message, None)
                }
                ConsensusError::Store(_) => {
                    error!(error = %message, "Store failure");
                    error_body(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "ERR_STORE_ERROR",
                        "Internal server error".to_string(),
                        Some(message),
                    )
                }
                ConsensusError::Serialization(_) => internal(message),
            }
        }
        ServerError::ConfigError(msg) => {
            error!(error = %msg, "Configuration failure");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "ERR_CONFIG_ERROR",
                "Internal server error".to_string(),
                Some(msg),
            )
        }
        ServerError::Io(err) => internal(err.to_string()),
    }
}

fn internal(detail: String) -> Response {
    error!(error = %detail, "Request failed");
    error_body(
        StatusCode::INTERNAL_SERVER_ERROR,
        "ERR_INTERNAL_SERVER_ERROR",
        "Internal server error".to_string(),
        Some(detail),
    )
}

/// Standard error body. `error` carries the underlying cause of a 500.
fn error_body(status: StatusCode, code: &str, message: String, cause: Option<String>) -> Response {
    let error_message = cause.clone().unwrap_or_else(|| message.clone());
    let mut body = json!({
        "message": message,
        "errorDetails": {
            "errorCode": code,
            "errorMessage": error_message,
        }
    });
    if let Some(cause) = cause {
        body["error"] = json!(cause);
    }

    (status, Json(body)).into_response()
}
