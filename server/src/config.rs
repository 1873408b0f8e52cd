//! Server configuration, sourced from the environment.
//!
//! Secrets are required up front. A faucet that silently starts without a JWT
//! secret or admin password would expose its admin surface, so `from_env`
//! refuses to start instead.

use crate::prelude::*;

#[derive(Debug, Clone)]
pub struct ServerConfig {
	/// Listen address, e.g. `0.0.0.0:3001`
	pub listen: Box<str>,
	/// HS256 secret for admin session tokens
	pub jwt_secret: Box<str>,
	/// Password for `POST /api/admin/login`
	pub admin_password: Box<str>,
	/// Shared key for the Discord bot endpoints. Without one those endpoints
	/// refuse all requests.
	pub api_key: Option<Box<str>>,
	/// hCaptcha secret. Without one, captcha tokens are not verified.
	pub hcaptcha_secret: Option<Box<str>>,
}

fn env_opt(key: &str) -> Option<Box<str>> {
	std::env::var(key).ok().filter(|v| !v.is_empty()).map(Into::into)
}

fn env_required(key: &str) -> FcResult<Box<str>> {
	env_opt(key).ok_or_else(|| Error::Config(format!("{key} must be set").into()))
}

impl ServerConfig {
	pub fn from_env() -> FcResult<Self> {
		Ok(Self {
			listen: env_opt("LISTEN").unwrap_or_else(|| "0.0.0.0:3001".into()),
			jwt_secret: env_required("JWT_SECRET")?,
			admin_password: env_required("ADMIN_PASSWORD")?,
			api_key: env_opt("API_KEY"),
			hcaptcha_secret: env_opt("HCAPTCHA_SECRET_KEY"),
		})
	}
}

// vim: ts=4
