//! Error type shared by the HTTP routes.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

/// An error to be returned to the client.
///
/// Validation and configuration problems are detected before any external
/// call; dependency failures are logged at the route level and surfaced here
/// with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	/// Malformed or missing input.
	#[error("{0}")]
	Validation(String),
	/// Missing or rejected credential.
	#[error("{0}")]
	Unauthorized(String),
	/// A required external service has no configuration.
	#[error("{0}")]
	Unconfigured(String),
	/// Any other failure.
	#[error("{0}")]
	Internal(String),
}

impl ResponseError for ApiError {
	fn status_code(&self) -> StatusCode {
		match self {
			Self::Validation(_) => StatusCode::BAD_REQUEST,
			Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
			Self::Unconfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
			Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn error_response(&self) -> HttpResponse {
		HttpResponse::build(self.status_code()).json(json!({
			"error": self.to_string(),
		}))
	}
}
