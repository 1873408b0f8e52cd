//! Discord bot endpoints, behind the shared `X-API-Key`.
//!
//! The bot fronts these for its slash commands. Captcha is replaced by API-key
//! trust; the abuse axis is the (user id, wallet) pair limiter.

use axum::{
	Json,
	extract::{ConnectInfo, Path, State},
	http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::net::SocketAddr;

use sui_faucet_core::disburse::{DisburseRequest, disburse};

use crate::faucet::validate_request;
use crate::middleware::client_ip;
use crate::prelude::*;

/// # POST /api/discord/faucet/request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordRequestReq {
	wallet_address: Box<str>,
	discord_user_id: Box<str>,
	amount: Option<u64>,
}

#[skip_serializing_none]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordRequestRes {
	success: bool,
	tx_hash: Box<str>,
	amount: u64,
	rate_limit: Option<RateLimitInfo>,
}

pub async fn post_discord_request(
	State(state): State<ServerState>,
	ConnectInfo(addr): ConnectInfo<SocketAddr>,
	headers: HeaderMap,
	Json(req): Json<DiscordRequestReq>,
) -> FcResult<(StatusCode, Json<DiscordRequestRes>)> {
	let amount = validate_request(&state, &req.wallet_address, req.amount)?;
	if req.discord_user_id.is_empty() {
		return Err(Error::Validation("discordUserId is required".into()));
	}

	let outcome = disburse(
		&state.app,
		DisburseRequest {
			wallet_address: req.wallet_address,
			amount,
			source: Source::Discord,
			ip: client_ip(&headers, addr),
			discord_user_id: Some(req.discord_user_id),
			captcha_token: None,
		},
	)
	.await?;

	Ok((
		StatusCode::OK,
		Json(DiscordRequestRes {
			success: true,
			tx_hash: outcome.tx_hash,
			amount: outcome.amount,
			rate_limit: outcome.rate_limit,
		}),
	))
}

/// # GET /api/discord/ratelimit/{userId}/{wallet}
///
/// Lets the bot preview a pair's limiter state before prompting the user.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordRateLimitRes {
	success: bool,
	rate_limit: RateLimitInfo,
}

pub async fn get_discord_rate_limit(
	State(state): State<ServerState>,
	Path((user_id, wallet)): Path<(Box<str>, Box<str>)>,
) -> FcResult<(StatusCode, Json<DiscordRateLimitRes>)> {
	let rate_limit = state.app.discord_limiter.check(&user_id, &wallet).await;
	Ok((StatusCode::OK, Json(DiscordRateLimitRes { success: true, rate_limit })))
}

// vim: ts=4
