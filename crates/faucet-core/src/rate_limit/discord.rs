//! Discord rate limiter.
//!
//! Keyed by the (discordUserId, walletAddress) pair under
//! `discord:requests:{uid}:{wallet}`, with a second-tier block flag under
//! `discord:blocked:{uid}:{wallet}`. The request window paces normal use; once
//! the window count reaches the maximum, a block entry with the longer block
//! duration is written and `check` answers from it alone until it expires.
//!
//! Unlike the IP/wallet limiter this one fails OPEN on store errors: the
//! Discord path favors availability, an asymmetry inherited from the reference
//! system and kept deliberately.

use std::sync::Arc;

use sui_faucet_types::kv_adapter::KvAdapter;

use super::parse_count;
use crate::config::FaucetConfig;
use crate::prelude::*;

pub struct DiscordRateLimiter {
	kv: Arc<dyn KvAdapter>,
	window_ms: u64,
	window_secs: u64,
	max_requests: u32,
	block_duration_ms: u64,
	block_secs: u64,
}

fn request_key(discord_user_id: &str, wallet: &str) -> String {
	format!("discord:requests:{discord_user_id}:{wallet}")
}

fn block_key(discord_user_id: &str, wallet: &str) -> String {
	format!("discord:blocked:{discord_user_id}:{wallet}")
}

impl DiscordRateLimiter {
	pub fn new(kv: Arc<dyn KvAdapter>, config: &FaucetConfig) -> Self {
		Self {
			kv,
			window_ms: config.window_ms,
			window_secs: config.window_secs(),
			max_requests: config.max_requests,
			block_duration_ms: config.block_duration_ms,
			block_secs: config.block_secs(),
		}
	}

	/// Admission check for a (discordUserId, wallet) pair.
	///
	/// `reset_time` is absolute epoch milliseconds: block expiry when a block
	/// entry exists, otherwise the end of the current window.
	pub async fn check(&self, discord_user_id: &str, wallet: &str) -> RateLimitInfo {
		match self.check_inner(discord_user_id, wallet).await {
			Ok(info) => info,
			Err(err) => {
				warn!(
					discord_user_id,
					wallet, "discord rate limit check failed, failing open: {err}"
				);
				RateLimitInfo {
					remaining: 1,
					reset_time: Timestamp::now_ms() + self.window_ms as i64,
					blocked: false,
				}
			}
		}
	}

	async fn check_inner(&self, discord_user_id: &str, wallet: &str) -> FcResult<RateLimitInfo> {
		let now = Timestamp::now_ms();
		let block_key = block_key(discord_user_id, wallet);

		// An existing block answers immediately, from its own TTL
		if self.kv.get(&block_key).await?.is_some() {
			let block_ttl = self.kv.ttl(&block_key).await?.remaining_secs();
			return Ok(RateLimitInfo {
				remaining: 0,
				reset_time: now + block_ttl as i64 * 1000,
				blocked: true,
			});
		}

		let count = parse_count(self.kv.get(&request_key(discord_user_id, wallet)).await?);

		// Window exhausted: escalate to a hard block with the longer TTL
		if count >= self.max_requests {
			self.kv.set_ex(&block_key, "1", self.block_secs).await?;
			info!(discord_user_id, wallet, count, "discord rate limit block written");
			return Ok(RateLimitInfo {
				remaining: 0,
				reset_time: now + self.block_duration_ms as i64,
				blocked: true,
			});
		}

		Ok(RateLimitInfo {
			remaining: self.max_requests - count,
			reset_time: now + self.window_ms as i64,
			blocked: false,
		})
	}

	/// Counts one request against the pair. Store errors are logged and
	/// swallowed (fail open), matching `check`.
	pub async fn consume(&self, discord_user_id: &str, wallet: &str) {
		if let Err(err) = self.consume_inner(discord_user_id, wallet).await {
			warn!(discord_user_id, wallet, "discord rate limit consume failed: {err}");
		}
	}

	async fn consume_inner(&self, discord_user_id: &str, wallet: &str) -> FcResult<()> {
		let key = request_key(discord_user_id, wallet);
		self.kv.incr(&key).await?;
		self.kv.expire(&key, self.window_secs).await?;
		Ok(())
	}

	/// Returns one request to the pair's window after a failed transfer.
	pub async fn refund(&self, discord_user_id: &str, wallet: &str) {
		let key = request_key(discord_user_id, wallet);
		if let Err(err) = self.kv.decr(&key).await {
			warn!(key, "discord rate limit refund failed: {err}");
		}
	}
}


// vim: ts=4
