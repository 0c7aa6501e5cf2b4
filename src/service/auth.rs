//! This module implements the admin session guard.
//!
//! A session is one opaque bearer cookie. Login compares the candidate
//! password against the configured secret and mints a token; every guarded
//! request only checks that the cookie is present and non-empty. The token
//! carries no claims and is not verified server-side.

use crate::error::ApiError;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use uuid::Uuid;

/// The name of the session cookie.
pub const SESSION_COOKIE: &str = "admin-session";
/// Session lifetime, in hours.
pub const SESSION_TTL_HOURS: i64 = 24;

/// An authentication error.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum AuthError {
	/// No admin password is configured on the server.
	#[error("Admin authentication not configured")]
	Unconfigured,
	/// The candidate password does not match.
	#[error("Invalid password")]
	InvalidCredential,
}

/// Checks the candidate password and mints a session token.
pub fn issue_session(configured: Option<&str>, candidate: &str) -> Result<String, AuthError> {
	let secret = configured.ok_or(AuthError::Unconfigured)?;
	if candidate != secret {
		return Err(AuthError::InvalidCredential);
	}
	Ok(mint_token())
}

/// Mints an opaque, unguessable token.
fn mint_token() -> String {
	let raw = format!("{}-{}", Utc::now().timestamp_millis(), Uuid::new_v4());
	STANDARD.encode(raw)
}

/// Builds the session cookie carrying the given token.
pub fn session_cookie(token: String) -> Cookie<'static> {
	Cookie::build(SESSION_COOKIE, token)
		.path("/")
		.http_only(true)
		.same_site(SameSite::Strict)
		.max_age(Duration::hours(SESSION_TTL_HOURS))
		.finish()
}

/// Builds a cookie clearing the session.
pub fn removal_cookie() -> Cookie<'static> {
	let mut cookie = Cookie::new(SESSION_COOKIE, "");
	cookie.set_path("/");
	cookie.make_removal();
	cookie
}

/// Tells whether the request carries a session.
///
/// Presence-only: any non-empty cookie value is accepted.
pub fn is_authenticated(req: &HttpRequest) -> bool {
	req.cookie(SESSION_COOKIE)
		.map(|cookie| !cookie.value().is_empty())
		.unwrap_or(false)
}

/// Rejects the request unless it carries a session.
pub fn require_admin(req: &HttpRequest) -> Result<(), ApiError> {
	if is_authenticated(req) {
		Ok(())
	} else {
		Err(ApiError::Unauthorized("Unauthorized".to_owned()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::test::TestRequest;

	#[test]
	fn login_requires_configuration() {
		assert_eq!(
			issue_session(None, "anything"),
			Err(AuthError::Unconfigured)
		);
	}

	#[test]
	fn login_rejects_wrong_password() {
		assert_eq!(
			issue_session(Some("hunter2"), "hunter3"),
			Err(AuthError::InvalidCredential)
		);
	}

	#[test]
	fn login_mints_opaque_tokens() {
		let a = issue_session(Some("hunter2"), "hunter2").unwrap();
		let b = issue_session(Some("hunter2"), "hunter2").unwrap();
		assert!(!a.is_empty());
		assert_ne!(a, b);
	}

	#[test]
	fn session_cookie_attributes() {
		let cookie = session_cookie("token".to_owned());
		assert_eq!(cookie.name(), SESSION_COOKIE);
		assert_eq!(cookie.http_only(), Some(true));
		assert_eq!(cookie.same_site(), Some(SameSite::Strict));
		assert_eq!(cookie.max_age(), Some(Duration::hours(24)));
	}

	#[test]
	fn presence_check_accepts_any_non_empty_value() {
		let req = TestRequest::default()
			.cookie(Cookie::new(SESSION_COOKIE, "whatever"))
			.to_http_request();
		assert!(is_authenticated(&req));
	}

	#[test]
	fn presence_check_rejects_missing_or_empty_cookie() {
		let req = TestRequest::default().to_http_request();
		assert!(!is_authenticated(&req));

		let req = TestRequest::default()
			.cookie(Cookie::new(SESSION_COOKIE, ""))
			.to_http_request();
		assert!(!is_authenticated(&req));
	}
}
