//! In-memory implementation of the faucet `KvAdapter`.
//!
//! Every operation takes the single entry lock, which makes `incr`/`decr`
//! genuinely atomic with respect to concurrent requests in this process.
//! Expiry is lazy: entries are purged when touched after their deadline, so an
//! expired key is indistinguishable from an absent one, matching the contract.
//!
//! Suitable for single-process deployments and tests. Multi-instance
//! deployments need a shared store (see the redis adapter): per-process
//! counters cannot provide the cross-instance total order the rate limiter
//! relies on.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use sui_faucet_types::kv_adapter::{KeyTtl, KvAdapter};
use sui_faucet_types::prelude::*;

#[derive(Debug)]
struct Entry {
	value: String,
	expires_at: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct KvAdapterMemory {
	entries: Mutex<HashMap<String, Entry>>,
	/// Logical clock offset, advanced by tests to exercise TTL expiry without
	/// sleeping
	clock_offset: Mutex<Duration>,
}

impl KvAdapterMemory {
	pub fn new() -> Self {
		Self::default()
	}

	/// Advances the adapter's logical clock. Test support: TTL behavior can be
	/// exercised deterministically instead of sleeping through real windows.
	pub fn advance(&self, by: Duration) {
		*self.clock_offset.lock() += by;
		debug!(?by, "memory kv clock advanced");
	}

	fn now(&self) -> Instant {
		Instant::now() + *self.clock_offset.lock()
	}

	fn purge_if_expired(now: Instant, entries: &mut HashMap<String, Entry>, key: &str) {
		if entries
			.get(key)
			.is_some_and(|e| e.expires_at.is_some_and(|deadline| deadline <= now))
		{
			entries.remove(key);
		}
	}

	fn add(&self, key: &str, delta: i64) -> i64 {
		let now = self.now();
		let mut entries = self.entries.lock();
		Self::purge_if_expired(now, &mut entries, key);
		let entry = entries
			.entry(key.to_string())
			.or_insert_with(|| Entry { value: "0".to_string(), expires_at: None });
		let count = entry.value.parse::<i64>().unwrap_or(0) + delta;
		entry.value = count.to_string();
		count
	}
}

#[async_trait]
impl KvAdapter for KvAdapterMemory {
	async fn get(&self, key: &str) -> FcResult<Option<Box<str>>> {
		let now = self.now();
		let mut entries = self.entries.lock();
		Self::purge_if_expired(now, &mut entries, key);
		Ok(entries.get(key).map(|e| e.value.clone().into()))
	}

	async fn set(&self, key: &str, value: &str) -> FcResult<()> {
		let mut entries = self.entries.lock();
		entries.insert(key.to_string(), Entry { value: value.to_string(), expires_at: None });
		Ok(())
	}

	async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> FcResult<()> {
		let expires_at = Some(self.now() + Duration::from_secs(ttl_secs));
		let mut entries = self.entries.lock();
		entries.insert(key.to_string(), Entry { value: value.to_string(), expires_at });
		Ok(())
	}

	async fn incr(&self, key: &str) -> FcResult<i64> {
		Ok(self.add(key, 1))
	}

	async fn decr(&self, key: &str) -> FcResult<i64> {
		Ok(self.add(key, -1))
	}

	async fn ttl(&self, key: &str) -> FcResult<KeyTtl> {
		let now = self.now();
		let mut entries = self.entries.lock();
		Self::purge_if_expired(now, &mut entries, key);
		Ok(match entries.get(key) {
			None => KeyTtl::Missing,
			Some(Entry { expires_at: None, .. }) => KeyTtl::Persistent,
			Some(Entry { expires_at: Some(deadline), .. }) => {
				KeyTtl::Expires(deadline.saturating_duration_since(now).as_secs())
			}
		})
	}

	async fn expire(&self, key: &str, ttl_secs: u64) -> FcResult<bool> {
		let now = self.now();
		let mut entries = self.entries.lock();
		Self::purge_if_expired(now, &mut entries, key);
		match entries.get_mut(key) {
			Some(entry) => {
				entry.expires_at = Some(now + Duration::from_secs(ttl_secs));
				Ok(true)
			}
			None => Ok(false),
		}
	}

	async fn del(&self, key: &str) -> FcResult<bool> {
		let now = self.now();
		let mut entries = self.entries.lock();
		Self::purge_if_expired(now, &mut entries, key);
		Ok(entries.remove(key).is_some())
	}

	async fn del_prefix(&self, prefix: &str) -> FcResult<u64> {
		let mut entries = self.entries.lock();
		let before = entries.len();
		entries.retain(|key, _| !key.starts_with(prefix));
		Ok((before - entries.len()) as u64)
	}
}


// vim: ts=4
