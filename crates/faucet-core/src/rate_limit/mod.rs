//! Rate limiting for faucet disbursements.
//!
//! Two limiters share the same three configuration knobs but track different
//! identity axes:
//!
//! - [`RateLimiter`]: per-IP and per-wallet counters in a rolling window,
//!   failing closed when the store is unreachable.
//! - [`DiscordRateLimiter`]: keyed by the (discordUserId, walletAddress) pair,
//!   with a second-tier hard block once the window is exhausted, failing open
//!   when the store is unreachable.
//!
//! Both rely solely on the store's atomic increment for correctness under
//! concurrent requests from the same identity.

mod discord;
mod limiter;

pub use discord::DiscordRateLimiter;
pub use limiter::RateLimiter;

/// Normalizes a raw store value into a request count. Store clients may hand
/// back strings or nothing at all; every count parse goes through here.
pub(crate) fn parse_count(value: Option<Box<str>>) -> u32 {
	value.and_then(|raw| raw.trim().parse().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_count() {
		assert_eq!(parse_count(None), 0);
		assert_eq!(parse_count(Some("3".into())), 3);
		assert_eq!(parse_count(Some(" 7 ".into())), 7);
		assert_eq!(parse_count(Some("garbage".into())), 0);
		assert_eq!(parse_count(Some("-2".into())), 0);
	}
}

// vim: ts=4
