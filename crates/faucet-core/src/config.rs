//! Faucet configuration, sourced from the environment with defaults.

use sui_faucet_types::chain_adapter::MIST_PER_SUI;

use crate::prelude::*;

/// Core faucet configuration.
///
/// The three rate-limit knobs parametrize both the IP/wallet limiter and the
/// Discord limiter identically. The two policy flags make previously implicit
/// behaviors explicit choices.
#[derive(Debug, Clone)]
pub struct FaucetConfig {
	/// Rolling window length in milliseconds
	pub window_ms: u64,
	/// Max requests per window per identity
	pub max_requests: u32,
	/// How long a Discord block persists once triggered, in milliseconds
	pub block_duration_ms: u64,
	/// Amount sent when the request does not specify one, in MIST
	pub default_amount: u64,
	/// Upper bound on a single disbursement, in MIST
	pub max_amount: u64,
	/// Whether a failed on-chain transfer still costs the consumed quota slot.
	/// `false` refunds the slot via atomic decrement.
	pub charge_failed_transfers: bool,
	/// Whether a restriction lookup failure denies the request. The reference
	/// system failed open here; flip this to treat store errors as restricted.
	pub restriction_fail_closed: bool,
}

impl Default for FaucetConfig {
	fn default() -> Self {
		Self {
			// 1 request per 12 hours, 12 hour block
			window_ms: 43_200_000,
			max_requests: 1,
			block_duration_ms: 43_200_000,
			default_amount: MIST_PER_SUI / 10,
			max_amount: MIST_PER_SUI,
			charge_failed_transfers: true,
			restriction_fail_closed: false,
		}
	}
}

impl FaucetConfig {
	pub fn from_env() -> Self {
		let defaults = Self::default();
		Self {
			window_ms: env_parse("RATE_LIMIT_WINDOW_MS", defaults.window_ms),
			max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS", defaults.max_requests),
			block_duration_ms: env_parse(
				"RATE_LIMIT_BLOCK_DURATION_MS",
				defaults.block_duration_ms,
			),
			default_amount: env_parse("FAUCET_DEFAULT_AMOUNT", defaults.default_amount),
			max_amount: env_parse("FAUCET_MAX_AMOUNT", defaults.max_amount),
			charge_failed_transfers: env_parse(
				"FAUCET_CHARGE_FAILED_TRANSFERS",
				defaults.charge_failed_transfers,
			),
			restriction_fail_closed: env_parse(
				"FAUCET_RESTRICTION_FAIL_CLOSED",
				defaults.restriction_fail_closed,
			),
		}
	}

	/// Window length in whole seconds, never below 1 (store TTLs are second
	/// granularity)
	pub fn window_secs(&self) -> u64 {
		(self.window_ms / 1000).max(1)
	}

	/// Block duration in whole seconds, never below 1
	pub fn block_secs(&self) -> u64 {
		(self.block_duration_ms / 1000).max(1)
	}
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
	match std::env::var(key) {
		Ok(raw) => match raw.parse() {
			Ok(value) => value,
			Err(_) => {
				warn!("invalid value for {key}: {raw:?}, using default");
				default
			}
		},
		Err(_) => default,
	}
}


// vim: ts=4
