//! Orchestrator pipeline tests: admission ordering, quota accounting and
//! failure policy, with in-memory adapters.

mod common;

use std::sync::Arc;
use std::time::Duration;

use sui_faucet_core::FaucetConfig;
use sui_faucet_core::disburse::{DisburseRequest, disburse};
use sui_faucet_core::restriction::RestrictionAxis;
use sui_faucet_types::prelude::*;
use sui_faucet_types::types::Source;

use common::{RejectingCaptcha, build_app, build_app_with};

const AMOUNT: u64 = 100_000_000;

fn frontend(wallet: &str, ip: &str) -> DisburseRequest {
	DisburseRequest {
		wallet_address: wallet.into(),
		amount: AMOUNT,
		source: Source::Frontend,
		ip: ip.into(),
		discord_user_id: None,
		captcha_token: None,
	}
}

fn discord(uid: &str, wallet: &str) -> DisburseRequest {
	DisburseRequest {
		wallet_address: wallet.into(),
		amount: AMOUNT,
		source: Source::Discord,
		ip: "bot".into(),
		discord_user_id: Some(uid.into()),
		captcha_token: None,
	}
}

#[tokio::test]
async fn test_successful_disbursement_is_audited() {
	let t = build_app(FaucetConfig::default());

	let outcome = disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap();
	assert_eq!(&*outcome.tx_hash, "0xtestdigest");
	assert_eq!(outcome.amount, AMOUNT);
	let rate_limit = outcome.rate_limit.unwrap();
	assert!(!rate_limit.blocked);

	let record = t.audit.last().unwrap();
	assert!(record.success);
	assert_eq!(record.tx_hash.as_deref(), Some("0xtestdigest"));
	assert_eq!(record.ip.as_deref(), Some("1.1.1.1"));
	assert!(record.rate_limit.is_some());
}

#[tokio::test]
async fn test_pause_denies_before_counters_move() {
	let t = build_app(FaucetConfig::default());
	t.app.pause.pause("maintenance", "admin").await.unwrap();

	let err = disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap_err();
	assert!(matches!(err, Error::Paused { .. }));
	assert_eq!(t.chain.sent_count(), 0);

	// The denial burned no quota
	let info = t.app.rate_limiter.check("1.1.1.1", "0xaaa").await;
	assert_eq!(info.remaining, t.app.config.max_requests);

	// The failed attempt is still audited
	let record = t.audit.last().unwrap();
	assert!(!record.success);

	t.app.pause.unpause("admin").await.unwrap();
	disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap();
}

#[tokio::test]
async fn test_restriction_denies_before_counters_move() {
	let t = build_app(FaucetConfig::default());
	t.app
		.restrictions
		.restrict(RestrictionAxis::Wallet, "0xaaa", "farming", "admin", None)
		.await
		.unwrap();

	let err = disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap_err();
	assert!(matches!(err, Error::Restricted { .. }));
	assert_eq!(t.chain.sent_count(), 0);

	let info = t.app.rate_limiter.check("1.1.1.1", "0xaaa").await;
	assert_eq!(info.remaining, t.app.config.max_requests);

	// Once lifted, the identity has its full quota
	t.app.restrictions.unrestrict(RestrictionAxis::Wallet, "0xaaa").await.unwrap();
	disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap();
}

#[tokio::test]
async fn test_wallet_axis_blocks_across_ips() {
	let t = build_app(FaucetConfig::default());

	disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap();

	// Same wallet from a different IP is still over quota
	let err = disburse(&t.app, frontend("0xaaa", "2.2.2.2")).await.unwrap_err();
	assert!(matches!(err, Error::RateLimited { .. }));

	// A different wallet from the second IP is fine
	disburse(&t.app, frontend("0xbbb", "2.2.2.2")).await.unwrap();
}

#[tokio::test]
async fn test_window_expiry_restores_quota() {
	let t = build_app(FaucetConfig::default());

	disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap();
	let err = disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap_err();
	assert!(matches!(err, Error::RateLimited { .. }));

	t.kv.advance(Duration::from_secs(t.app.config.window_secs() + 1));
	disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap();
}

#[tokio::test]
async fn test_failed_transfer_charges_quota_by_default() {
	let t = build_app(FaucetConfig::default());
	t.chain.set_fail(true);

	let err = disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap_err();
	assert!(matches!(err, Error::Chain(_)));

	// The slot stays consumed
	t.chain.set_fail(false);
	let err = disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap_err();
	assert!(matches!(err, Error::RateLimited { .. }));
}

#[tokio::test]
async fn test_failed_transfer_refunds_when_configured() {
	let config = FaucetConfig { charge_failed_transfers: false, ..FaucetConfig::default() };
	let t = build_app(config);
	t.chain.set_fail(true);

	let err = disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap_err();
	assert!(matches!(err, Error::Chain(_)));

	// The slot was refunded, retry goes through
	t.chain.set_fail(false);
	disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap();
}

#[tokio::test]
async fn test_discord_pair_block_and_escalation() {
	let t = build_app(FaucetConfig::default());

	disburse(&t.app, discord("111", "0xaaa")).await.unwrap();

	let err = disburse(&t.app, discord("111", "0xaaa")).await.unwrap_err();
	let Error::RateLimited { reset_time_ms, absolute } = err else {
		panic!("expected rate limit, got {err}");
	};
	// Discord reset times are absolute epoch milliseconds
	assert!(absolute);
	assert!(reset_time_ms > Timestamp::now_ms());

	// A different pair is unaffected
	disburse(&t.app, discord("111", "0xbbb")).await.unwrap();
	disburse(&t.app, discord("222", "0xaaa")).await.unwrap();
}

#[tokio::test]
async fn test_discord_restriction_axis() {
	let t = build_app(FaucetConfig::default());
	t.app
		.restrictions
		.restrict(RestrictionAxis::Discord, "111", "spam", "mod", None)
		.await
		.unwrap();

	let err = disburse(&t.app, discord("111", "0xaaa")).await.unwrap_err();
	assert!(matches!(err, Error::Restricted { .. }));

	// The wallet itself is not restricted, another user can fund it
	disburse(&t.app, discord("222", "0xaaa")).await.unwrap();
}

#[tokio::test]
async fn test_discord_requires_user_id() {
	let t = build_app(FaucetConfig::default());
	let mut req = discord("111", "0xaaa");
	req.discord_user_id = None;

	let err = disburse(&t.app, req).await.unwrap_err();
	assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_captcha_rejection_burns_no_quota() {
	let t = build_app_with(FaucetConfig::default(), Some(Arc::new(RejectingCaptcha)), false);

	let mut req = frontend("0xaaa", "1.1.1.1");
	req.captcha_token = Some("bad-token".into());
	let err = disburse(&t.app, req).await.unwrap_err();
	assert!(matches!(err, Error::CaptchaFailed(_)));

	let info = t.app.rate_limiter.check("1.1.1.1", "0xaaa").await;
	assert_eq!(info.remaining, t.app.config.max_requests);
}

#[tokio::test]
async fn test_restriction_store_failure_fails_open_by_default() {
	let t = build_app_with(FaucetConfig::default(), None, true);
	disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap();
}

#[tokio::test]
async fn test_restriction_store_failure_fails_closed_when_configured() {
	let config = FaucetConfig { restriction_fail_closed: true, ..FaucetConfig::default() };
	let t = build_app_with(config, None, true);

	let err = disburse(&t.app, frontend("0xaaa", "1.1.1.1")).await.unwrap_err();
	assert!(matches!(err, Error::StoreUnavailable(_)));
	assert_eq!(t.chain.sent_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_never_exceed_quota() {
	let t = build_app(FaucetConfig::default());

	let calls = (0..5).map(|_| disburse(&t.app, frontend("0xaaa", "1.1.1.1")));
	let results = futures::future::join_all(calls).await;

	// Racing losers may deny each other, but the quota is never exceeded
	let successes = results.iter().filter(|r| r.is_ok()).count();
	assert!(successes <= 1);
	assert_eq!(t.chain.sent_count(), successes);
	for result in results {
		if let Err(err) = result {
			assert!(matches!(err, Error::RateLimited { .. }));
		}
	}
}

// vim: ts=4
