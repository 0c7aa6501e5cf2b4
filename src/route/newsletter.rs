//! Visitor-facing newsletter routes.

use crate::error::ApiError;
use crate::service::subscriber::{StoreError, SubscribeOutcome};
use crate::{util, GlobalData};
use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

/// Payload of a request to register a newsletter subscriber.
#[derive(Deserialize)]
pub struct SubscribePayload {
	/// The email of the subscriber.
	email: String,
	/// The signup channel. Defaults to `website`.
	source: Option<String>,
}

/// Payload of a request to leave the newsletter.
#[derive(Deserialize)]
pub struct UnsubscribePayload {
	email: String,
}

fn store_error(error: StoreError) -> ApiError {
	match error {
		StoreError::Unconfigured => {
			ApiError::Unconfigured("Newsletter service is not configured".to_owned())
		}
		error => {
			error!(error = %error, "newsletter: store failure");
			ApiError::Internal("Internal server error".to_owned())
		}
	}
}

#[post("/subscribe")]
pub async fn subscribe(
	data: web::Data<GlobalData>,
	payload: web::Json<SubscribePayload>,
) -> Result<HttpResponse, ApiError> {
	let payload = payload.into_inner();
	if !util::validate_email(payload.email.trim()) {
		return Err(ApiError::Validation("Invalid email format".to_owned()));
	}
	let source = payload.source.unwrap_or_else(|| "website".to_owned());

	let outcome = data
		.store
		.add(&payload.email, &source)
		.await
		.map_err(store_error)?;
	let message = match outcome {
		SubscribeOutcome::Created => "Successfully subscribed!",
		SubscribeOutcome::AlreadySubscribed => "Email already subscribed!",
	};
	Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

#[post("/unsubscribe")]
pub async fn unsubscribe(
	data: web::Data<GlobalData>,
	payload: web::Json<UnsubscribePayload>,
) -> Result<HttpResponse, ApiError> {
	let payload = payload.into_inner();
	if !util::validate_email(payload.email.trim()) {
		return Err(ApiError::Validation("Invalid email format".to_owned()));
	}

	let updated = data
		.store
		.unsubscribe(&payload.email)
		.await
		.map_err(store_error)?;
	if !updated {
		info!(email = %payload.email, "unsubscribe: email not found");
	}
	Ok(HttpResponse::Ok().json(json!({ "message": "Successfully unsubscribed!" })))
}
