//! Shared request state: the core faucet app plus server-side configuration.

use std::sync::Arc;

use sui_faucet_core::App;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct ServerState {
	pub app: App,
	pub config: Arc<ServerConfig>,
}

impl ServerState {
	pub fn new(app: App, config: ServerConfig) -> Self {
		Self { app, config: Arc::new(config) }
	}
}

// vim: ts=4
