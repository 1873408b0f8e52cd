//! Adapter for the external key-value store that backs all abuse-prevention
//! state (rate-limit counters, block flags, restriction records, pause switch).
//!
//! Correctness under concurrent requests for the same identity depends entirely
//! on `incr` being a single atomic operation at the store, not a read-then-write
//! sequence. Implementations must uphold that, and must enforce TTL expiry
//! themselves (an expired key behaves as absent).

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

/// TTL state of a key, mirroring the Redis `TTL` command's three outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
	/// Key does not exist
	Missing,
	/// Key exists with no expiry set
	Persistent,
	/// Key expires in this many seconds
	Expires(u64),
}

impl KeyTtl {
	/// Remaining seconds, treating missing/persistent keys as 0
	pub fn remaining_secs(self) -> u64 {
		match self {
			KeyTtl::Expires(secs) => secs,
			KeyTtl::Missing | KeyTtl::Persistent => 0,
		}
	}
}

/// A faucet key-value store adapter.
///
/// All keys are namespaced by purpose (`ratelimit:`, `discord:`, `restriction:`,
/// `bot:`) so TTL expiry ages out each category independently.
#[async_trait]
pub trait KvAdapter: Debug + Send + Sync {
	/// Reads a value. Expired or absent keys yield `None`.
	async fn get(&self, key: &str) -> FcResult<Option<Box<str>>>;

	/// Writes a value without expiry.
	async fn set(&self, key: &str, value: &str) -> FcResult<()>;

	/// Writes a value that expires after `ttl_secs`.
	async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> FcResult<()>;

	/// Atomically increments an integer value, creating it at 1 if absent.
	/// Returns the value after the increment.
	async fn incr(&self, key: &str) -> FcResult<i64>;

	/// Atomically decrements an integer value. Returns the value after the
	/// decrement.
	async fn decr(&self, key: &str) -> FcResult<i64>;

	/// Reports the TTL state of a key.
	async fn ttl(&self, key: &str) -> FcResult<KeyTtl>;

	/// Sets an expiry on an existing key. Returns false if the key is absent.
	async fn expire(&self, key: &str, ttl_secs: u64) -> FcResult<bool>;

	/// Deletes a key. Returns false if it was already absent.
	async fn del(&self, key: &str) -> FcResult<bool>;

	/// Deletes every key starting with `prefix`. Returns the number deleted.
	async fn del_prefix(&self, prefix: &str) -> FcResult<u64>;
}

// vim: ts=4
