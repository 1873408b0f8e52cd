//! App state type

use std::sync::Arc;

use sui_faucet_types::audit_adapter::AuditAdapter;
use sui_faucet_types::captcha_adapter::CaptchaVerifier;
use sui_faucet_types::chain_adapter::ChainAdapter;
use sui_faucet_types::kv_adapter::KvAdapter;

use crate::config::FaucetConfig;
use crate::pause::PauseSwitch;
use crate::rate_limit::{DiscordRateLimiter, RateLimiter};
use crate::restriction::RestrictionRegistry;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Adapters handed to [`AppState::new`]. The captcha verifier is optional;
/// without one, captcha tokens are accepted unverified (with a warning).
pub struct Adapters {
	pub kv: Arc<dyn KvAdapter>,
	pub audit: Arc<dyn AuditAdapter>,
	pub chain: Arc<dyn ChainAdapter>,
	pub captcha: Option<Arc<dyn CaptchaVerifier>>,
}

pub struct AppState {
	pub config: FaucetConfig,

	pub kv: Arc<dyn KvAdapter>,
	pub audit: Arc<dyn AuditAdapter>,
	pub chain: Arc<dyn ChainAdapter>,
	pub captcha: Option<Arc<dyn CaptchaVerifier>>,

	// Abuse-prevention components, all backed by the same kv store
	pub rate_limiter: RateLimiter,
	pub discord_limiter: DiscordRateLimiter,
	pub restrictions: RestrictionRegistry,
	pub pause: PauseSwitch,
}

pub type App = Arc<AppState>;

impl AppState {
	pub fn new(config: FaucetConfig, adapters: Adapters) -> App {
		let Adapters { kv, audit, chain, captcha } = adapters;
		Arc::new(AppState {
			rate_limiter: RateLimiter::new(kv.clone(), &config),
			discord_limiter: DiscordRateLimiter::new(kv.clone(), &config),
			restrictions: RestrictionRegistry::new(kv.clone()),
			pause: PauseSwitch::new(kv.clone()),
			config,
			kv,
			audit,
			chain,
			captcha,
		})
	}
}

// vim: ts=4
