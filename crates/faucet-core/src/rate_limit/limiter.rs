//! IP/wallet rate limiter.
//!
//! Counters live in the external store under `ratelimit:ip:{ip}` and
//! `ratelimit:wallet:{wallet}` with a TTL equal to the rolling window. Both
//! axes must be under the limit for a request to pass. A store failure during
//! `check` denies the request (fail closed): letting one through on a blind
//! store is how a faucet gets drained.

use std::sync::Arc;

use sui_faucet_types::kv_adapter::{KeyTtl, KvAdapter};

use super::parse_count;
use crate::config::FaucetConfig;
use crate::prelude::*;

pub struct RateLimiter {
	kv: Arc<dyn KvAdapter>,
	window_secs: u64,
	max_requests: u32,
}

fn ip_key(ip: &str) -> String {
	format!("ratelimit:ip:{ip}")
}

fn wallet_key(wallet: &str) -> String {
	format!("ratelimit:wallet:{wallet}")
}

impl RateLimiter {
	pub fn new(kv: Arc<dyn KvAdapter>, config: &FaucetConfig) -> Self {
		Self { kv, window_secs: config.window_secs(), max_requests: config.max_requests }
	}

	/// Read-only admission check.
	///
	/// `reset_time` is milliseconds until the longer-lived of the two windows
	/// expires; 0 when neither identity has a window yet.
	pub async fn check(&self, ip: &str, wallet: &str) -> RateLimitInfo {
		match self.check_inner(ip, wallet).await {
			Ok(info) => {
				if info.blocked {
					info!(ip, wallet, "rate limit hit");
				}
				info
			}
			Err(err) => {
				warn!(ip, wallet, "rate limit check failed, failing closed: {err}");
				RateLimitInfo { remaining: 0, reset_time: 0, blocked: true }
			}
		}
	}

	async fn check_inner(&self, ip: &str, wallet: &str) -> FcResult<RateLimitInfo> {
		let ip_key = ip_key(ip);
		let wallet_key = wallet_key(wallet);

		let ip_count = parse_count(self.kv.get(&ip_key).await?);
		let wallet_count = parse_count(self.kv.get(&wallet_key).await?);
		let ip_ttl = self.kv.ttl(&ip_key).await?.remaining_secs();
		let wallet_ttl = self.kv.ttl(&wallet_key).await?.remaining_secs();

		debug!(ip_count, wallet_count, ip_ttl, wallet_ttl, "rate limit state");

		let remaining = self
			.max_requests
			.saturating_sub(ip_count)
			.min(self.max_requests.saturating_sub(wallet_count));
		let blocked = ip_count >= self.max_requests || wallet_count >= self.max_requests;
		let reset_time = ip_ttl.max(wallet_ttl) as i64 * 1000;

		Ok(RateLimitInfo { remaining, reset_time, blocked })
	}

	/// Atomically reserves one quota slot on both axes.
	///
	/// The increments are single store-level atomic operations; when either
	/// counter ends up over the limit the call fails with
	/// [`Error::RateLimited`] and the increments are NOT rolled back. Callers
	/// are expected to have passed `check` first; the residual race between
	/// check and consume is resolved here, with the loser denied.
	///
	/// Because the two increments are not one transaction, concurrent calls
	/// sharing an IP and wallet can interleave so that each pushes the other
	/// over the limit and both are denied. The window then admits fewer than
	/// `max_requests`; it never admits more. Denied callers retry after the
	/// window, so under-admission is the safe side of the trade.
	pub async fn consume(&self, ip: &str, wallet: &str) -> FcResult<()> {
		let ip_key = ip_key(ip);
		let wallet_key = wallet_key(wallet);

		let ip_count = self.kv.incr(&ip_key).await?;
		let wallet_count = self.kv.incr(&wallet_key).await?;

		// A fresh counter created by incr has no TTL yet; start its window
		if self.kv.ttl(&ip_key).await? == KeyTtl::Persistent {
			self.kv.expire(&ip_key, self.window_secs).await?;
		}
		if self.kv.ttl(&wallet_key).await? == KeyTtl::Persistent {
			self.kv.expire(&wallet_key, self.window_secs).await?;
		}

		let max = i64::from(self.max_requests);
		if ip_count > max || wallet_count > max {
			let ip_ttl = self.kv.ttl(&ip_key).await?.remaining_secs();
			let wallet_ttl = self.kv.ttl(&wallet_key).await?.remaining_secs();
			warn!(ip, wallet, ip_count, wallet_count, "rate limit exceeded on consume");
			return Err(Error::RateLimited {
				reset_time_ms: ip_ttl.max(wallet_ttl) as i64 * 1000,
				absolute: false,
			});
		}

		Ok(())
	}

	/// Returns one quota slot on both axes. Only called when the transfer
	/// failed and `charge_failed_transfers` is off; errors are logged, not
	/// propagated, since the request already failed.
	pub async fn refund(&self, ip: &str, wallet: &str) {
		for key in [ip_key(ip), wallet_key(wallet)] {
			if let Err(err) = self.kv.decr(&key).await {
				warn!(key, "rate limit refund failed: {err}");
			}
		}
	}

	/// Admin/testing escape hatch. With neither identity given, clears every
	/// rate-limit key in the store.
	pub async fn clear(&self, ip: Option<&str>, wallet: Option<&str>) -> FcResult<u64> {
		let mut cleared = 0;
		if let Some(ip) = ip {
			cleared += u64::from(self.kv.del(&ip_key(ip)).await?);
		}
		if let Some(wallet) = wallet {
			cleared += u64::from(self.kv.del(&wallet_key(wallet)).await?);
		}
		if ip.is_none() && wallet.is_none() {
			cleared = self.kv.del_prefix("ratelimit:").await?;
		}
		info!(cleared, "rate limits cleared");
		Ok(cleared)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use sui_faucet_kv_adapter_memory::KvAdapterMemory;

	fn limiter(max_requests: u32) -> (Arc<KvAdapterMemory>, RateLimiter) {
		let kv = Arc::new(KvAdapterMemory::new());
		let config = FaucetConfig { max_requests, ..FaucetConfig::default() };
		let limiter = RateLimiter::new(kv.clone(), &config);
		(kv, limiter)
	}

	#[tokio::test]
	async fn test_fresh_identity_unblocked() {
		let (_kv, limiter) = limiter(1);
		let info = limiter.check("1.2.3.4", "0xabc").await;
		assert!(!info.blocked);
		assert_eq!(info.remaining, 1);
		assert_eq!(info.reset_time, 0);
	}

	#[tokio::test]
	async fn test_blocked_after_max_requests() {
		let (_kv, limiter) = limiter(2);
		limiter.consume("1.2.3.4", "0xabc").await.unwrap();
		assert!(!limiter.check("1.2.3.4", "0xabc").await.blocked);
		limiter.consume("1.2.3.4", "0xabc").await.unwrap();

		let info = limiter.check("1.2.3.4", "0xabc").await;
		assert!(info.blocked);
		assert_eq!(info.remaining, 0);
		assert!(info.reset_time > 0);
	}

	#[tokio::test]
	async fn test_wallet_axis_blocks_across_ips() {
		// Same wallet from a different IP is still blocked
		let (_kv, limiter) = limiter(1);
		limiter.consume("1.2.3.4", "0xabc").await.unwrap();

		let info = limiter.check("5.6.7.8", "0xabc").await;
		assert!(info.blocked);
		assert_eq!(info.remaining, 0);

		// Different wallet from the first IP is also blocked (IP axis)
		let info = limiter.check("1.2.3.4", "0xdef").await;
		assert!(info.blocked);

		// Fresh on both axes is fine
		let info = limiter.check("5.6.7.8", "0xdef").await;
		assert!(!info.blocked);
	}

	#[tokio::test]
	async fn test_consume_past_limit_fails_without_rollback() {
		let (_kv, limiter) = limiter(1);
		limiter.consume("1.2.3.4", "0xabc").await.unwrap();

		let err = limiter.consume("1.2.3.4", "0xabc").await.unwrap_err();
		assert!(matches!(err, Error::RateLimited { .. }));

		// The over-limit increment stays; identity remains blocked
		assert!(limiter.check("1.2.3.4", "0xabc").await.blocked);
	}

	#[tokio::test]
	async fn test_window_expiry_resets_counters() {
		let (kv, limiter) = limiter(1);
		limiter.consume("1.2.3.4", "0xabc").await.unwrap();
		assert!(limiter.check("1.2.3.4", "0xabc").await.blocked);

		kv.advance(Duration::from_secs(43_201));

		let info = limiter.check("1.2.3.4", "0xabc").await;
		assert!(!info.blocked);
		assert_eq!(info.reset_time, 0);
		limiter.consume("1.2.3.4", "0xabc").await.unwrap();
	}

	#[tokio::test]
	async fn test_reset_time_decreases_with_time() {
		let (kv, limiter) = limiter(1);
		limiter.consume("1.2.3.4", "0xabc").await.unwrap();

		let before = limiter.check("1.2.3.4", "0xabc").await.reset_time;
		kv.advance(Duration::from_secs(1000));
		let after = limiter.check("1.2.3.4", "0xabc").await.reset_time;
		assert!(after < before);
		assert!(after > 0);
	}

	#[tokio::test]
	async fn test_refund_returns_slot() {
		let (_kv, limiter) = limiter(1);
		limiter.consume("1.2.3.4", "0xabc").await.unwrap();
		limiter.refund("1.2.3.4", "0xabc").await;
		assert!(!limiter.check("1.2.3.4", "0xabc").await.blocked);
	}

	#[tokio::test]
	async fn test_clear_scoped_and_full() {
		let (_kv, limiter) = limiter(1);
		limiter.consume("1.2.3.4", "0xabc").await.unwrap();
		limiter.consume("5.6.7.8", "0xdef").await.unwrap();

		// Clearing only the wallet leaves the IP axis blocked
		limiter.clear(None, Some("0xabc")).await.unwrap();
		assert!(limiter.check("1.2.3.4", "0xabc").await.blocked);

		limiter.clear(Some("1.2.3.4"), None).await.unwrap();
		assert!(!limiter.check("1.2.3.4", "0xabc").await.blocked);

		// Full clear wipes everything
		let cleared = limiter.clear(None, None).await.unwrap();
		assert!(cleared >= 2);
		assert!(!limiter.check("5.6.7.8", "0xdef").await.blocked);
	}
}

// vim: ts=4
