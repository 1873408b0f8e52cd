//! Error type shared by every faucet crate.
//!
//! Admission denials (rate limit, restriction, pause) are regular variants with
//! enough structure for a client to back off correctly. Infrastructure failures
//! are kept separate so the policy layers can decide between fail-open and
//! fail-closed handling. Internal messages never reach the wire.

use axum::{Json, http::StatusCode, response::IntoResponse};

pub type FcResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	Unauthorized,
	PermissionDenied,
	/// Request payload failed validation (bad wallet address, bad amount, ...)
	Validation(Box<str>),
	/// Captcha token was rejected or the verification service was unreachable
	CaptchaFailed(Box<str>),
	/// Disbursement is globally paused by an operator
	Paused { reason: Option<Box<str>> },
	/// Identity carries an active restriction
	Restricted { reason: Option<Box<str>> },
	/// Rate limit exhausted; `reset_time_ms` follows the limiter's contract:
	/// milliseconds until reset for the IP/wallet limiter (`absolute` false),
	/// absolute epoch milliseconds for the Discord limiter (`absolute` true).
	/// The `Retry-After` header is derived as a delay in both cases.
	RateLimited { reset_time_ms: i64, absolute: bool },
	/// The counter store / restriction registry could not be reached
	StoreUnavailable(Box<str>),
	/// The audit log could not be reached
	DbUnavailable(Box<str>),
	/// The chain client rejected or failed the transfer
	Chain(Box<str>),
	/// Required configuration is missing; fatal at first use
	Config(Box<str>),
	Internal(String),

	// externals
	Io(std::io::Error),
	Json(serde_json::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Json(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::Unauthorized => write!(f, "authentication required"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Validation(msg) => write!(f, "{msg}"),
			Error::CaptchaFailed(msg) => write!(f, "captcha verification failed: {msg}"),
			Error::Paused { reason } => match reason {
				Some(r) => write!(f, "faucet is paused: {r}"),
				None => write!(f, "faucet is paused"),
			},
			Error::Restricted { reason } => match reason {
				Some(r) => write!(f, "restricted: {r}"),
				None => write!(f, "restricted"),
			},
			Error::RateLimited { .. } => {
				write!(f, "rate limit exceeded, please try again later")
			}
			Error::StoreUnavailable(msg) => write!(f, "counter store unavailable: {msg}"),
			Error::DbUnavailable(msg) => write!(f, "audit store unavailable: {msg}"),
			Error::Chain(msg) => write!(f, "chain client error: {msg}"),
			Error::Config(msg) => write!(f, "configuration missing: {msg}"),
			Error::Internal(msg) => write!(f, "internal error: {msg}"),
			Error::Io(err) => write!(f, "io error: {err}"),
			Error::Json(err) => write!(f, "json error: {err}"),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		match self {
			Error::NotFound => {
				let body = serde_json::json!({ "success": false, "error": "not found" });
				(StatusCode::NOT_FOUND, Json(body)).into_response()
			}
			Error::Unauthorized => {
				let body =
					serde_json::json!({ "success": false, "error": "authentication required" });
				(StatusCode::UNAUTHORIZED, Json(body)).into_response()
			}
			Error::PermissionDenied => {
				let body = serde_json::json!({ "success": false, "error": "permission denied" });
				(StatusCode::FORBIDDEN, Json(body)).into_response()
			}
			Error::Validation(msg) => {
				let body = serde_json::json!({ "success": false, "error": msg });
				(StatusCode::BAD_REQUEST, Json(body)).into_response()
			}
			Error::CaptchaFailed(msg) => {
				let body = serde_json::json!({
					"success": false,
					"error": format!("captcha verification failed: {msg}"),
				});
				(StatusCode::BAD_REQUEST, Json(body)).into_response()
			}
			Error::Paused { reason } => {
				let body = serde_json::json!({
					"success": false,
					"error": "faucet is currently paused",
					"reason": reason,
				});
				(StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
			}
			Error::Restricted { reason } => {
				let body = serde_json::json!({
					"success": false,
					"error": "this identity is restricted from using the faucet",
					"reason": reason,
				});
				(StatusCode::FORBIDDEN, Json(body)).into_response()
			}
			Error::RateLimited { reset_time_ms, absolute } => {
				let body = serde_json::json!({
					"success": false,
					"error": "Rate limit exceeded. Please try again later.",
					"resetTime": reset_time_ms,
				});
				let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
				let delay_ms = if absolute {
					reset_time_ms.saturating_sub(crate::types::Timestamp::now_ms())
				} else {
					reset_time_ms
				};
				let retry_secs = (delay_ms.max(0) / 1000) + 1;
				if let Ok(val) = retry_secs.to_string().parse() {
					response.headers_mut().insert("Retry-After", val);
				}
				response
			}
			// Infrastructure details stay out of client responses
			Error::StoreUnavailable(_)
			| Error::DbUnavailable(_)
			| Error::Chain(_)
			| Error::Config(_)
			| Error::Internal(_)
			| Error::Io(_)
			| Error::Json(_) => {
				let body = serde_json::json!({ "success": false, "error": "internal error" });
				(StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display_never_empty() {
		let errors = [
			Error::NotFound,
			Error::RateLimited { reset_time_ms: 1000, absolute: false },
			Error::Paused { reason: None },
			Error::Restricted { reason: Some("spam".into()) },
			Error::StoreUnavailable("connection refused".into()),
		];
		for err in errors {
			assert!(!err.to_string().is_empty());
		}
	}

	#[test]
	fn test_retry_after_is_a_delay_for_both_reset_contracts() {
		let response =
			Error::RateLimited { reset_time_ms: 90_000, absolute: false }.into_response();
		let retry: i64 = response.headers()["Retry-After"].to_str().unwrap().parse().unwrap();
		assert_eq!(retry, 91);

		// Absolute epoch reset times must not leak into the header as-is
		let reset = crate::types::Timestamp::now_ms() + 43_200_000;
		let response = Error::RateLimited { reset_time_ms: reset, absolute: true }.into_response();
		let retry: i64 = response.headers()["Retry-After"].to_str().unwrap().parse().unwrap();
		assert!(retry > 0 && retry <= 43_201);
	}

	#[test]
	fn test_internal_details_not_leaked() {
		let response =
			Error::StoreUnavailable("redis://secret-host:6379 refused".into()).into_response();
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}

// vim: ts=4
