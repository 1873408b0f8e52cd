//! Disbursement orchestrator.
//!
//! One strictly ordered pipeline per request, short-circuiting on the first
//! failure:
//!
//! 1. captcha verification (frontend path only, when a token is supplied)
//! 2. global pause check
//! 3. restriction check on the source's identity axes
//! 4. rate-limit check
//! 5. rate-limit consume (the atomic quota reservation)
//! 6. token transfer through the chain adapter
//! 7. audit log write, which always runs, success or failure
//!
//! Restrictions are checked before any counter moves, so a restricted identity
//! never loses quota. The audit write is an explicit final stage rather than
//! being scattered through the control flow.

use serde::Serialize;
use serde_with::skip_serializing_none;

use sui_faucet_types::audit_adapter::DisbursementAttempt;

use crate::app::App;
use crate::prelude::*;
use crate::restriction::RestrictionAxis;

/// A validated disbursement request. Wallet format and amount bounds are the
/// edge's responsibility; by the time a request reaches the orchestrator they
/// are trusted.
#[derive(Debug, Clone)]
pub struct DisburseRequest {
	pub wallet_address: Box<str>,
	/// Amount in MIST
	pub amount: u64,
	pub source: Source,
	pub ip: Box<str>,
	pub discord_user_id: Option<Box<str>>,
	pub captcha_token: Option<Box<str>>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisburseOutcome {
	pub tx_hash: Box<str>,
	pub amount: u64,
	pub rate_limit: Option<RateLimitInfo>,
}

/// Runs the full disbursement pipeline and records the attempt.
pub async fn disburse(app: &App, req: DisburseRequest) -> FcResult<DisburseOutcome> {
	let mut snapshot = None;
	let result = run_pipeline(app, &req, &mut snapshot).await;

	let attempt = DisbursementAttempt {
		wallet_address: req.wallet_address.clone(),
		amount: req.amount,
		source: req.source,
		discord_user_id: req.discord_user_id.clone(),
		ip: Some(req.ip.clone()),
		tx_hash: result.as_ref().ok().map(|o| o.tx_hash.clone()),
		success: result.is_ok(),
		error: result.as_ref().err().map(|e| e.to_string().into()),
		rate_limit: snapshot,
	};
	// A broken audit log must not fail the request it is describing
	if let Err(err) = app.audit.record(&attempt).await {
		error!("audit record write failed: {err}");
	}

	match &result {
		Ok(outcome) => info!(
			wallet = %req.wallet_address,
			source = req.source.as_str(),
			tx_hash = %outcome.tx_hash,
			amount = req.amount,
			"disbursement sent"
		),
		Err(err) => info!(
			wallet = %req.wallet_address,
			source = req.source.as_str(),
			"disbursement denied: {err}"
		),
	}

	result
}

async fn run_pipeline(
	app: &App,
	req: &DisburseRequest,
	snapshot: &mut Option<RateLimitInfo>,
) -> FcResult<DisburseOutcome> {
	// 1. Captcha, frontend only. Discord/API paths arrive behind API-key trust.
	if req.source == Source::Frontend {
		if let Some(token) = &req.captcha_token {
			match &app.captcha {
				Some(verifier) => verifier.verify(token, &req.ip).await?,
				None => warn!("captcha token supplied but no verifier configured, skipping"),
			}
		}
	}

	// 2. Global pause. A store error here denies: the kill-switch must not be
	// bypassable by taking the store down.
	let status = app.pause.status().await?;
	if status.is_paused {
		return Err(Error::Paused { reason: status.pause_reason });
	}

	// 3. Restrictions, before any counter is touched.
	check_restrictions(app, req).await?;

	// 4 + 5. Rate limit: check, then atomically reserve the slot. A concurrent
	// request can still win the race between the two; consume resolves it.
	match req.source {
		Source::Frontend | Source::Api => {
			let info = app.rate_limiter.check(&req.ip, &req.wallet_address).await;
			*snapshot = Some(info);
			if info.blocked {
				return Err(Error::RateLimited {
					reset_time_ms: info.reset_time,
					absolute: false,
				});
			}
			app.rate_limiter.consume(&req.ip, &req.wallet_address).await?;
		}
		Source::Discord => {
			let uid = discord_user_id(req)?;
			let info = app.discord_limiter.check(uid, &req.wallet_address).await;
			*snapshot = Some(info);
			if info.blocked {
				// Discord reset times are absolute epoch milliseconds
				return Err(Error::RateLimited {
					reset_time_ms: info.reset_time,
					absolute: true,
				});
			}
			app.discord_limiter.consume(uid, &req.wallet_address).await;
		}
	}

	// 6. Transfer.
	match app.chain.send_tokens(&req.wallet_address, req.amount).await {
		Ok(tx_hash) => Ok(DisburseOutcome { tx_hash, amount: req.amount, rate_limit: *snapshot }),
		Err(err) => {
			warn!(wallet = %req.wallet_address, "token transfer failed: {err}");
			if !app.config.charge_failed_transfers {
				match req.source {
					Source::Frontend | Source::Api => {
						app.rate_limiter.refund(&req.ip, &req.wallet_address).await;
					}
					Source::Discord => {
						if let Ok(uid) = discord_user_id(req) {
							app.discord_limiter.refund(uid, &req.wallet_address).await;
						}
					}
				}
			}
			Err(err)
		}
	}
}

fn discord_user_id(req: &DisburseRequest) -> FcResult<&str> {
	req.discord_user_id
		.as_deref()
		.ok_or_else(|| Error::Validation("discordUserId is required".into()))
}

async fn check_restrictions(app: &App, req: &DisburseRequest) -> FcResult<()> {
	let mut axes: Vec<(RestrictionAxis, &str)> = Vec::with_capacity(2);
	match req.source {
		Source::Frontend | Source::Api => {
			axes.push((RestrictionAxis::Ip, &*req.ip));
			axes.push((RestrictionAxis::Wallet, &*req.wallet_address));
		}
		Source::Discord => axes.push((RestrictionAxis::Discord, discord_user_id(req)?)),
	}

	for (axis, identity) in axes {
		match app.restrictions.is_restricted(axis, identity).await {
			Ok(info) if info.is_restricted => {
				info!(axis = axis.as_str(), identity, "disbursement denied by restriction");
				return Err(Error::Restricted { reason: info.reason });
			}
			Ok(_) => {}
			Err(err) if app.config.restriction_fail_closed => {
				warn!(
					axis = axis.as_str(),
					identity, "restriction lookup failed, failing closed: {err}"
				);
				return Err(err);
			}
			Err(err) => {
				warn!(
					axis = axis.as_str(),
					identity, "restriction lookup failed, failing open: {err}"
				);
			}
		}
	}

	Ok(())
}

// vim: ts=4
