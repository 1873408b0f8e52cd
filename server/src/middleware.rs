//! Route-level auth middleware and client identity extraction.

const TOKEN_EXPIRE_HOURS: u64 = 8;

use axum::{
	extract::{Request, State},
	http::HeaderMap,
	middleware::Next,
	response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::prelude::*;

#[derive(Debug, Deserialize, Serialize)]
struct AdminClaims {
	sub: Box<str>,
	role: Box<str>,
	exp: u64,
}

/// Authenticated admin identity, inserted into request extensions by
/// [`require_admin`].
#[derive(Debug, Clone)]
pub struct AdminAuth {
	pub sub: Box<str>,
}

pub fn issue_admin_token(secret: &str, username: &str) -> FcResult<Box<str>> {
	let expire = std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map_err(|_| Error::PermissionDenied)?
		.as_secs() + 3600 * TOKEN_EXPIRE_HOURS;

	let token = encode(
		&jsonwebtoken::Header::new(Algorithm::HS256),
		&AdminClaims { sub: username.into(), role: "admin".into(), exp: expire },
		&EncodingKey::from_secret(secret.as_bytes()),
	)
	.map_err(|_| Error::PermissionDenied)?
	.into();

	Ok(token)
}

fn validate_admin_token(secret: &str, token: &str) -> FcResult<AdminAuth> {
	let token_data = decode::<AdminClaims>(
		token,
		&DecodingKey::from_secret(secret.as_bytes()),
		&Validation::new(Algorithm::HS256),
	)
	.map_err(|_| Error::PermissionDenied)?;

	if &*token_data.claims.role != "admin" {
		return Err(Error::PermissionDenied);
	}

	Ok(AdminAuth { sub: token_data.claims.sub })
}

/// Requires a valid admin bearer token and exposes [`AdminAuth`] to handlers.
pub async fn require_admin(
	State(state): State<ServerState>,
	mut req: Request,
	next: Next,
) -> FcResult<Response> {
	let auth_header = req
		.headers()
		.get("Authorization")
		.and_then(|h| h.to_str().ok())
		.ok_or(Error::Unauthorized)?;

	let token = auth_header.strip_prefix("Bearer ").ok_or(Error::Unauthorized)?;
	let auth = validate_admin_token(&state.config.jwt_secret, token)?;

	req.extensions_mut().insert(auth);
	Ok(next.run(req).await)
}

/// Requires the shared `X-API-Key` the Discord bot authenticates with. With no
/// key configured the whole Discord surface is closed.
pub async fn require_api_key(
	State(state): State<ServerState>,
	req: Request,
	next: Next,
) -> FcResult<Response> {
	let expected = state.config.api_key.as_deref().ok_or(Error::PermissionDenied)?;
	let provided = req
		.headers()
		.get("X-API-Key")
		.and_then(|h| h.to_str().ok())
		.ok_or(Error::Unauthorized)?;

	if provided != expected {
		return Err(Error::PermissionDenied);
	}
	Ok(next.run(req).await)
}

/// Best-effort client IP: proxy headers first, socket address as the fallback.
/// The first entry of `x-forwarded-for` is the original client when the proxy
/// chain is trusted.
pub fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> Box<str> {
	if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|h| h.to_str().ok()) {
		if let Some(first) = forwarded.split(',').next() {
			let first = first.trim();
			if !first.is_empty() {
				return first.into();
			}
		}
	}
	if let Some(real_ip) = headers.get("x-real-ip").and_then(|h| h.to_str().ok()) {
		let real_ip = real_ip.trim();
		if !real_ip.is_empty() {
			return real_ip.into();
		}
	}
	addr.ip().to_string().into()
}


// vim: ts=4
