//! HTTP surface of the Sui testnet faucet.
//!
//! Three route groups share one [`sui_faucet_core::App`]:
//!
//! - public: faucet request, balance lookup, status
//! - Discord bot: request + limiter preview, behind a shared API key
//! - admin: pause switch, restrictions, rate-limit maintenance, audit log,
//!   behind a JWT issued at login
//!
//! All policy lives in `sui-faucet-core`; this crate validates input, resolves
//! the client identity and shapes responses.

#![forbid(unsafe_code)]

pub mod admin;
pub mod captcha;
pub mod config;
pub mod discord;
pub mod faucet;
pub mod middleware;
pub mod prelude;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use crate::prelude::*;

pub use crate::captcha::HcaptchaVerifier;
pub use crate::config::ServerConfig;
pub use crate::state::ServerState;

/// Binds and serves until the process is stopped.
pub async fn run(app: sui_faucet_core::App, config: ServerConfig) -> FcResult<()> {
	let listen = config.listen.clone();
	let state = ServerState::new(app, config);
	let router = routes::init(state);

	let listener = tokio::net::TcpListener::bind(&*listen).await?;
	info!("faucet listening on {listen}");
	axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await?;

	Ok(())
}

// vim: ts=4
