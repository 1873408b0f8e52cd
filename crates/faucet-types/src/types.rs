//! Core value types shared across the faucet.

use serde::{Deserialize, Serialize, Serializer};

/// Unix timestamp in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Self {
		Self(chrono::Utc::now().timestamp())
	}

	/// Current wall clock in epoch milliseconds
	pub fn now_ms() -> i64 {
		chrono::Utc::now().timestamp_millis()
	}

	pub fn to_iso(self) -> Box<str> {
		chrono::DateTime::from_timestamp(self.0, 0)
			.map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true).into())
			.unwrap_or_else(|| "invalid".into())
	}
}

pub fn serialize_timestamp_iso<S: Serializer>(ts: &Timestamp, s: S) -> Result<S::Ok, S::Error> {
	s.serialize_str(&ts.to_iso())
}

pub fn serialize_timestamp_iso_opt<S: Serializer>(
	ts: &Option<Timestamp>,
	s: S,
) -> Result<S::Ok, S::Error> {
	match ts {
		Some(ts) => s.serialize_some(&*ts.to_iso()),
		None => s.serialize_none(),
	}
}

/// Where a disbursement request entered the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
	Frontend,
	Discord,
	Api,
}

impl Source {
	pub fn as_str(self) -> &'static str {
		match self {
			Source::Frontend => "frontend",
			Source::Discord => "discord",
			Source::Api => "api",
		}
	}
}

impl std::str::FromStr for Source {
	type Err = crate::error::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"frontend" => Ok(Source::Frontend),
			"discord" => Ok(Source::Discord),
			"api" => Ok(Source::Api),
			other => Err(crate::error::Error::Validation(
				format!("unknown request source: {other}").into(),
			)),
		}
	}
}

/// Rate limiter telemetry returned by `check` and embedded in audit records.
///
/// `reset_time` is milliseconds-until-reset for the IP/wallet limiter and
/// absolute epoch milliseconds for the Discord limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
	pub remaining: u32,
	pub reset_time: i64,
	pub blocked: bool,
}


// vim: ts=4
