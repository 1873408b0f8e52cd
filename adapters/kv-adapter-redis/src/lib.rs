//! Redis implementation of the faucet `KvAdapter`.
//!
//! The store the abuse-prevention layer was designed around: `INCR` is atomic
//! at the server, TTLs are enforced by Redis itself, and multiple faucet
//! instances pointed at the same server see one consistent set of counters.
//!
//! Connections go through `ConnectionManager`, which reconnects on failure and
//! clones cheaply, so one adapter serves all request handlers. Any Redis error
//! surfaces as `Error::StoreUnavailable`; the policy of what to do about an
//! unavailable store (fail open or closed) belongs to the callers.

#![forbid(unsafe_code)]

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use sui_faucet_types::kv_adapter::{KeyTtl, KvAdapter};
use sui_faucet_types::prelude::*;

fn store_err(err: redis::RedisError) -> Error {
	Error::StoreUnavailable(err.to_string().into())
}

pub struct KvAdapterRedis {
	manager: ConnectionManager,
}

impl std::fmt::Debug for KvAdapterRedis {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("KvAdapterRedis").finish_non_exhaustive()
	}
}

impl KvAdapterRedis {
	/// Connects to Redis at `url` (e.g. `redis://127.0.0.1/`).
	pub async fn new(url: &str) -> FcResult<Self> {
		let client = redis::Client::open(url).map_err(store_err)?;
		let manager = ConnectionManager::new(client).await.map_err(store_err)?;
		info!("redis kv adapter connected");
		Ok(Self { manager })
	}

	fn conn(&self) -> ConnectionManager {
		self.manager.clone()
	}
}

#[async_trait]
impl KvAdapter for KvAdapterRedis {
	async fn get(&self, key: &str) -> FcResult<Option<Box<str>>> {
		let value: Option<String> = self.conn().get(key).await.map_err(store_err)?;
		Ok(value.map(Into::into))
	}

	async fn set(&self, key: &str, value: &str) -> FcResult<()> {
		self.conn().set::<_, _, ()>(key, value).await.map_err(store_err)
	}

	async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> FcResult<()> {
		self.conn().set_ex::<_, _, ()>(key, value, ttl_secs).await.map_err(store_err)
	}

	async fn incr(&self, key: &str) -> FcResult<i64> {
		self.conn().incr(key, 1i64).await.map_err(store_err)
	}

	async fn decr(&self, key: &str) -> FcResult<i64> {
		self.conn().decr(key, 1i64).await.map_err(store_err)
	}

	async fn ttl(&self, key: &str) -> FcResult<KeyTtl> {
		// Redis TTL reports -2 for a missing key and -1 for one with no expiry
		let secs: i64 = self.conn().ttl(key).await.map_err(store_err)?;
		Ok(match secs {
			-2 => KeyTtl::Missing,
			-1 => KeyTtl::Persistent,
			secs => KeyTtl::Expires(secs.max(0) as u64),
		})
	}

	async fn expire(&self, key: &str, ttl_secs: u64) -> FcResult<bool> {
		self.conn().expire(key, ttl_secs as i64).await.map_err(store_err)
	}

	async fn del(&self, key: &str) -> FcResult<bool> {
		let removed: u64 = self.conn().del(key).await.map_err(store_err)?;
		Ok(removed > 0)
	}

	async fn del_prefix(&self, prefix: &str) -> FcResult<u64> {
		// SCAN would be kinder to a large keyspace; the faucet's keyspace is
		// small and this path only runs from the admin clear endpoint.
		let mut conn = self.conn();
		let keys: Vec<String> = conn.keys(format!("{prefix}*")).await.map_err(store_err)?;
		if keys.is_empty() {
			return Ok(0);
		}
		let removed: u64 = conn.del(keys).await.map_err(store_err)?;
		debug!(prefix, removed, "deleted keys by prefix");
		Ok(removed)
	}
}

// vim: ts=4
