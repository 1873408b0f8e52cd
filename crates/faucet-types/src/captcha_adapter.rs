//! Adapter for the external captcha verification service.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

/// A captcha verifier (hCaptcha in the shipped implementation).
///
/// Only the frontend path carries captcha tokens; Discord and API paths
/// substitute API-key trust and never call this.
#[async_trait]
pub trait CaptchaVerifier: Debug + Send + Sync {
	/// Verifies a captcha token for a client IP. Rejection and service
	/// unavailability both surface as `Error::CaptchaFailed`.
	async fn verify(&self, token: &str, ip: &str) -> FcResult<()>;
}

// vim: ts=4
