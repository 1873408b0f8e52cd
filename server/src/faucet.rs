//! Public faucet endpoints.

use axum::{
	Json,
	extract::{ConnectInfo, Path, Query, State},
	http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::net::SocketAddr;

use sui_faucet_core::disburse::{DisburseRequest, disburse};
use sui_faucet_types::chain_adapter::is_valid_sui_address;

use crate::middleware::client_ip;
use crate::prelude::*;

/// Checks wallet format and resolves the amount against configured bounds.
/// Every entry point runs this before anything touches a counter.
pub(crate) fn validate_request(
	state: &ServerState,
	wallet_address: &str,
	amount: Option<u64>,
) -> FcResult<u64> {
	if !is_valid_sui_address(wallet_address) {
		return Err(Error::Validation("invalid wallet address".into()));
	}
	let amount = amount.unwrap_or(state.app.config.default_amount);
	if amount == 0 || amount > state.app.config.max_amount {
		return Err(Error::Validation(
			format!("amount must be between 1 and {} MIST", state.app.config.max_amount).into(),
		));
	}
	Ok(amount)
}

/// # POST /api/faucet/request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetRequestReq {
	wallet_address: Box<str>,
	/// Amount in MIST; the configured default when omitted
	amount: Option<u64>,
	captcha_token: Option<Box<str>>,
}

#[skip_serializing_none]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetRequestRes {
	success: bool,
	tx_hash: Box<str>,
	amount: u64,
	rate_limit: Option<RateLimitInfo>,
}

pub async fn post_faucet_request(
	State(state): State<ServerState>,
	ConnectInfo(addr): ConnectInfo<SocketAddr>,
	headers: HeaderMap,
	Json(req): Json<FaucetRequestReq>,
) -> FcResult<(StatusCode, Json<FaucetRequestRes>)> {
	let amount = validate_request(&state, &req.wallet_address, req.amount)?;

	let outcome = disburse(
		&state.app,
		DisburseRequest {
			wallet_address: req.wallet_address,
			amount,
			source: Source::Frontend,
			ip: client_ip(&headers, addr),
			discord_user_id: None,
			captcha_token: req.captcha_token,
		},
	)
	.await?;

	Ok((
		StatusCode::OK,
		Json(FaucetRequestRes {
			success: true,
			tx_hash: outcome.tx_hash,
			amount: outcome.amount,
			rate_limit: outcome.rate_limit,
		}),
	))
}

/// # GET /api/faucet/balance/{address}
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRes {
	success: bool,
	address: Box<str>,
	/// Balance in MIST
	balance: u128,
}

pub async fn get_balance(
	State(state): State<ServerState>,
	Path(address): Path<Box<str>>,
) -> FcResult<(StatusCode, Json<BalanceRes>)> {
	if !is_valid_sui_address(&address) {
		return Err(Error::Validation("invalid wallet address".into()));
	}
	let balance = state.app.chain.balance(&address).await?;

	Ok((StatusCode::OK, Json(BalanceRes { success: true, address, balance })))
}

/// # GET /api/faucet/status
///
/// With `?walletAddress=` the response also carries the caller's limiter state
/// for that wallet, so a frontend can grey out the button before submitting.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
	wallet_address: Option<Box<str>>,
}

#[skip_serializing_none]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetStatusRes {
	success: bool,
	is_paused: bool,
	pause_reason: Option<Box<str>>,
	/// Faucet wallet balance in MIST, when the chain client can be reached
	faucet_balance: Option<u128>,
	rate_limit: Option<RateLimitInfo>,
	version: &'static str,
}

pub async fn get_status(
	State(state): State<ServerState>,
	ConnectInfo(addr): ConnectInfo<SocketAddr>,
	headers: HeaderMap,
	Query(query): Query<StatusQuery>,
) -> FcResult<(StatusCode, Json<FaucetStatusRes>)> {
	let bot = state.app.pause.status().await?;
	let faucet_balance = match state.app.chain.faucet_balance().await {
		Ok(balance) => Some(balance),
		Err(err) => {
			warn!("faucet balance unavailable: {err}");
			None
		}
	};

	let rate_limit = match &query.wallet_address {
		Some(wallet) if is_valid_sui_address(wallet) => {
			let ip = client_ip(&headers, addr);
			Some(state.app.rate_limiter.check(&ip, wallet).await)
		}
		Some(_) => return Err(Error::Validation("invalid wallet address".into())),
		None => None,
	};

	Ok((
		StatusCode::OK,
		Json(FaucetStatusRes {
			success: true,
			is_paused: bot.is_paused,
			pause_reason: bot.pause_reason,
			faucet_balance,
			rate_limit,
			version: sui_faucet_core::app::VERSION,
		}),
	))
}

// vim: ts=4
