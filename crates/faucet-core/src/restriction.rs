//! Restriction registry: operator-imposed bans on three independent identity
//! axes (IP, wallet address, Discord user id).
//!
//! Each restriction is one JSON record under `restriction:{axis}:{identity}`.
//! Temporary restrictions get a store-enforced TTL; permanent ones persist
//! until explicitly removed. A live record denies disbursement regardless of
//! rate-limit state, and is always checked BEFORE any counter is incremented so
//! a restricted identity never burns quota it could need once unrestricted.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use sui_faucet_types::kv_adapter::KvAdapter;
use sui_faucet_types::types::serialize_timestamp_iso_opt;

use crate::prelude::*;

/// Identity axis a restriction applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RestrictionAxis {
	Ip,
	Wallet,
	Discord,
}

impl RestrictionAxis {
	pub fn as_str(self) -> &'static str {
		match self {
			RestrictionAxis::Ip => "ip",
			RestrictionAxis::Wallet => "wallet",
			RestrictionAxis::Discord => "discord",
		}
	}
}

impl std::str::FromStr for RestrictionAxis {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"ip" => Ok(RestrictionAxis::Ip),
			"wallet" => Ok(RestrictionAxis::Wallet),
			"discord" => Ok(RestrictionAxis::Discord),
			other => Err(Error::Validation(format!("unknown restriction axis: {other}").into())),
		}
	}
}

/// Stored restriction record. The single place the store's JSON shape is
/// parsed; nothing downstream branches on raw values.
#[skip_serializing_none]
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct RestrictionRecord {
	reason: Box<str>,
	restricted_by: Box<str>,
	restricted_at: Timestamp,
	expires_at: Option<Timestamp>,
}

/// Lookup result, absence folded into `is_restricted: false`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionInfo {
	pub is_restricted: bool,
	pub reason: Option<Box<str>>,
	pub restricted_by: Option<Box<str>>,
	#[serde(serialize_with = "serialize_timestamp_iso_opt")]
	pub restricted_at: Option<Timestamp>,
	#[serde(serialize_with = "serialize_timestamp_iso_opt")]
	pub expires_at: Option<Timestamp>,
}

pub struct RestrictionRegistry {
	kv: Arc<dyn KvAdapter>,
}

fn restriction_key(axis: RestrictionAxis, identity: &str) -> String {
	format!("restriction:{}:{identity}", axis.as_str())
}

impl RestrictionRegistry {
	pub fn new(kv: Arc<dyn KvAdapter>) -> Self {
		Self { kv }
	}

	/// Writes a restriction. `duration_secs` makes it expire automatically;
	/// without one the record is permanent until `unrestrict`.
	pub async fn restrict(
		&self,
		axis: RestrictionAxis,
		identity: &str,
		reason: &str,
		actor: &str,
		duration_secs: Option<u64>,
	) -> FcResult<()> {
		let now = Timestamp::now();
		let record = RestrictionRecord {
			reason: reason.into(),
			restricted_by: actor.into(),
			restricted_at: now,
			expires_at: duration_secs.map(|d| Timestamp(now.0 + d as i64)),
		};
		let value = serde_json::to_string(&record)?;
		let key = restriction_key(axis, identity);

		match duration_secs {
			Some(duration) => self.kv.set_ex(&key, &value, duration).await?,
			None => self.kv.set(&key, &value).await?,
		}

		info!(axis = axis.as_str(), identity, actor, reason, "restriction added");
		Ok(())
	}

	/// Deletes a restriction. Idempotent: absence is not an error.
	pub async fn unrestrict(&self, axis: RestrictionAxis, identity: &str) -> FcResult<()> {
		self.kv.del(&restriction_key(axis, identity)).await?;
		info!(axis = axis.as_str(), identity, "restriction removed");
		Ok(())
	}

	/// Looks up a restriction. Natural TTL expiry reads as unrestricted.
	/// Store errors propagate; the caller owns the fail-open/fail-closed
	/// policy.
	pub async fn is_restricted(
		&self,
		axis: RestrictionAxis,
		identity: &str,
	) -> FcResult<RestrictionInfo> {
		let Some(raw) = self.kv.get(&restriction_key(axis, identity)).await? else {
			return Ok(RestrictionInfo::default());
		};

		let record: RestrictionRecord = serde_json::from_str(&raw)?;
		Ok(RestrictionInfo {
			is_restricted: true,
			reason: Some(record.reason),
			restricted_by: Some(record.restricted_by),
			restricted_at: Some(record.restricted_at),
			expires_at: record.expires_at,
		})
	}
}


// vim: ts=4
