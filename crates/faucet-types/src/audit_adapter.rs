//! Adapter for the append-only audit log of disbursement attempts.
//!
//! The core only ever appends; retention and deletion are external concerns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::{
	prelude::*,
	types::{RateLimitInfo, Source, serialize_timestamp_iso},
};

/// One disbursement attempt, success or failure. Created once, never mutated.
#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementAttempt {
	pub wallet_address: Box<str>,
	/// Amount in MIST (1 SUI = 10^9 MIST)
	pub amount: u64,
	pub source: Source,
	pub discord_user_id: Option<Box<str>>,
	pub ip: Option<Box<str>>,
	pub tx_hash: Option<Box<str>>,
	pub success: bool,
	pub error: Option<Box<str>>,
	pub rate_limit: Option<RateLimitInfo>,
}

/// A stored audit record, as returned by queries.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
	pub id: i64,
	#[serde(flatten)]
	pub attempt: DisbursementAttempt,
	#[serde(serialize_with = "serialize_timestamp_iso")]
	pub created_at: Timestamp,
}

/// Aggregate numbers for the admin dashboard.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptStats {
	pub total_requests: u64,
	pub successful_requests: u64,
	pub failed_requests: u64,
	/// Total MIST disbursed by successful requests
	pub total_disbursed: u64,
}

/// Query options for listing recent attempts.
#[derive(Debug, Default)]
pub struct ListAttemptsOptions<'a> {
	pub source: Option<Source>,
	pub wallet_address: Option<&'a str>,
	pub discord_user_id: Option<&'a str>,
	pub limit: u32,
}

/// A faucet audit log adapter.
#[async_trait]
pub trait AuditAdapter: Debug + Send + Sync {
	/// Appends one attempt. Failures here must not fail the request that is
	/// being logged; the orchestrator logs and moves on.
	async fn record(&self, attempt: &DisbursementAttempt) -> FcResult<()>;

	/// Lists attempts, newest first.
	async fn list(&self, opts: &ListAttemptsOptions<'_>) -> FcResult<Vec<AttemptRecord>>;

	/// Aggregate statistics over all recorded attempts.
	async fn stats(&self) -> FcResult<AttemptStats>;
}

// vim: ts=4
