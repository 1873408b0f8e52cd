//! Global pause switch: an operational kill-switch that gates every
//! disbursement ahead of restriction and rate-limit checks.
//!
//! The whole state is one JSON record under a single key, so pause and unpause
//! are single-key store operations and partial metadata (flag without reason,
//! reason without actor) can never be observed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use sui_faucet_types::kv_adapter::KvAdapter;
use sui_faucet_types::types::serialize_timestamp_iso_opt;

use crate::prelude::*;

const PAUSE_KEY: &str = "bot:pause";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct PauseRecord {
	reason: Box<str>,
	paused_by: Box<str>,
	paused_at: Timestamp,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStatus {
	pub is_paused: bool,
	pub pause_reason: Option<Box<str>>,
	pub paused_by: Option<Box<str>>,
	#[serde(serialize_with = "serialize_timestamp_iso_opt")]
	pub paused_at: Option<Timestamp>,
}

pub struct PauseSwitch {
	kv: Arc<dyn KvAdapter>,
}

impl PauseSwitch {
	pub fn new(kv: Arc<dyn KvAdapter>) -> Self {
		Self { kv }
	}

	/// Pauses all disbursement. Overwrites any existing pause metadata.
	pub async fn pause(&self, reason: &str, actor: &str) -> FcResult<()> {
		let record = PauseRecord {
			reason: reason.into(),
			paused_by: actor.into(),
			paused_at: Timestamp::now(),
		};
		self.kv.set(PAUSE_KEY, &serde_json::to_string(&record)?).await?;
		warn!(actor, reason, "faucet paused");
		Ok(())
	}

	/// Clears the pause state, flag and metadata together.
	pub async fn unpause(&self, actor: &str) -> FcResult<()> {
		self.kv.del(PAUSE_KEY).await?;
		info!(actor, "faucet unpaused");
		Ok(())
	}

	/// Reads the pause state. Store errors propagate; the orchestrator treats
	/// them as paused (fail closed).
	pub async fn status(&self) -> FcResult<BotStatus> {
		let Some(raw) = self.kv.get(PAUSE_KEY).await? else {
			return Ok(BotStatus::default());
		};

		let record: PauseRecord = serde_json::from_str(&raw)?;
		Ok(BotStatus {
			is_paused: true,
			pause_reason: Some(record.reason),
			paused_by: Some(record.paused_by),
			paused_at: Some(record.paused_at),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use sui_faucet_kv_adapter_memory::KvAdapterMemory;

	#[tokio::test]
	async fn test_pause_unpause_cycle() {
		let kv = Arc::new(KvAdapterMemory::new());
		let pause = PauseSwitch::new(kv);

		assert!(!pause.status().await.unwrap().is_paused);

		pause.pause("maintenance window", "admin").await.unwrap();
		let status = pause.status().await.unwrap();
		assert!(status.is_paused);
		assert_eq!(status.pause_reason.as_deref(), Some("maintenance window"));
		assert_eq!(status.paused_by.as_deref(), Some("admin"));
		assert!(status.paused_at.is_some());

		pause.unpause("admin").await.unwrap();
		let status = pause.status().await.unwrap();
		assert!(!status.is_paused);
		// No partial metadata after unpause
		assert!(status.pause_reason.is_none());
		assert!(status.paused_by.is_none());
		assert!(status.paused_at.is_none());
	}

	#[tokio::test]
	async fn test_pause_overwrites_metadata() {
		let kv = Arc::new(KvAdapterMemory::new());
		let pause = PauseSwitch::new(kv);

		pause.pause("first", "alice").await.unwrap();
		pause.pause("second", "bob").await.unwrap();

		let status = pause.status().await.unwrap();
		assert_eq!(status.pause_reason.as_deref(), Some("second"));
		assert_eq!(status.paused_by.as_deref(), Some("bob"));
	}
}

// vim: ts=4
