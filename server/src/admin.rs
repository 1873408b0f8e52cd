//! Admin endpoints: pause switch, restrictions, rate-limit maintenance and the
//! audit log. Everything except login sits behind the admin bearer token.

use axum::{
	Extension, Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};

use sui_faucet_core::pause::BotStatus;
use sui_faucet_core::restriction::{RestrictionAxis, RestrictionInfo};
use sui_faucet_types::audit_adapter::{AttemptRecord, AttemptStats, ListAttemptsOptions};

use crate::middleware::{AdminAuth, issue_admin_token};
use crate::prelude::*;

/// # POST /api/admin/login
#[derive(Deserialize)]
pub struct LoginReq {
	username: Box<str>,
	password: Box<str>,
}

#[derive(Serialize)]
pub struct LoginRes {
	success: bool,
	token: Box<str>,
}

pub async fn post_login(
	State(state): State<ServerState>,
	Json(login): Json<LoginReq>,
) -> FcResult<(StatusCode, Json<LoginRes>)> {
	if login.username.is_empty() || login.password != state.config.admin_password {
		// Slow down password guessing
		tokio::time::sleep(std::time::Duration::from_secs(1)).await;
		return Err(Error::PermissionDenied);
	}

	let token = issue_admin_token(&state.config.jwt_secret, &login.username)?;
	info!(username = &*login.username, "admin logged in");
	Ok((StatusCode::OK, Json(LoginRes { success: true, token })))
}

/// # GET /api/admin/status
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
	window_ms: u64,
	max_requests: u32,
	block_duration_ms: u64,
	default_amount: u64,
	max_amount: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusRes {
	success: bool,
	bot: BotStatus,
	stats: AttemptStats,
	config: ConfigSnapshot,
}

pub async fn get_status(
	State(state): State<ServerState>,
) -> FcResult<(StatusCode, Json<AdminStatusRes>)> {
	let bot = state.app.pause.status().await?;
	let stats = state.app.audit.stats().await?;
	let config = &state.app.config;

	Ok((
		StatusCode::OK,
		Json(AdminStatusRes {
			success: true,
			bot,
			stats,
			config: ConfigSnapshot {
				window_ms: config.window_ms,
				max_requests: config.max_requests,
				block_duration_ms: config.block_duration_ms,
				default_amount: config.default_amount,
				max_amount: config.max_amount,
			},
		}),
	))
}

#[derive(Serialize)]
pub struct OkRes {
	success: bool,
}

const OK: OkRes = OkRes { success: true };

/// # POST /api/admin/pause
#[derive(Deserialize)]
pub struct PauseReq {
	reason: Box<str>,
}

pub async fn post_pause(
	State(state): State<ServerState>,
	Extension(auth): Extension<AdminAuth>,
	Json(req): Json<PauseReq>,
) -> FcResult<(StatusCode, Json<OkRes>)> {
	state.app.pause.pause(&req.reason, &auth.sub).await?;
	Ok((StatusCode::OK, Json(OK)))
}

/// # POST /api/admin/unpause
pub async fn post_unpause(
	State(state): State<ServerState>,
	Extension(auth): Extension<AdminAuth>,
) -> FcResult<(StatusCode, Json<OkRes>)> {
	state.app.pause.unpause(&auth.sub).await?;
	Ok((StatusCode::OK, Json(OK)))
}

/// # GET /api/admin/restrictions/{axis}/{identity}
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionRes {
	success: bool,
	restriction: RestrictionInfo,
}

pub async fn get_restriction(
	State(state): State<ServerState>,
	Path((axis, identity)): Path<(Box<str>, Box<str>)>,
) -> FcResult<(StatusCode, Json<RestrictionRes>)> {
	let axis: RestrictionAxis = axis.parse()?;
	let restriction = state.app.restrictions.is_restricted(axis, &identity).await?;
	Ok((StatusCode::OK, Json(RestrictionRes { success: true, restriction })))
}

/// # POST /api/admin/restrictions/{axis}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictReq {
	identity: Box<str>,
	reason: Box<str>,
	/// Seconds until automatic expiry; permanent when omitted
	duration_secs: Option<u64>,
}

pub async fn post_restriction(
	State(state): State<ServerState>,
	Extension(auth): Extension<AdminAuth>,
	Path(axis): Path<Box<str>>,
	Json(req): Json<RestrictReq>,
) -> FcResult<(StatusCode, Json<OkRes>)> {
	let axis: RestrictionAxis = axis.parse()?;
	if req.identity.is_empty() {
		return Err(Error::Validation("identity is required".into()));
	}
	state
		.app
		.restrictions
		.restrict(axis, &req.identity, &req.reason, &auth.sub, req.duration_secs)
		.await?;
	Ok((StatusCode::OK, Json(OK)))
}

/// # DELETE /api/admin/restrictions/{axis}/{identity}
pub async fn delete_restriction(
	State(state): State<ServerState>,
	Path((axis, identity)): Path<(Box<str>, Box<str>)>,
) -> FcResult<(StatusCode, Json<OkRes>)> {
	let axis: RestrictionAxis = axis.parse()?;
	state.app.restrictions.unrestrict(axis, &identity).await?;
	Ok((StatusCode::OK, Json(OK)))
}

/// # POST /api/admin/rate-limits/clear
///
/// With neither field set, clears every IP/wallet counter.
#[derive(Deserialize)]
pub struct ClearReq {
	ip: Option<Box<str>>,
	wallet: Option<Box<str>>,
}

#[derive(Serialize)]
pub struct ClearRes {
	success: bool,
	cleared: u64,
}

pub async fn post_clear_rate_limits(
	State(state): State<ServerState>,
	Extension(auth): Extension<AdminAuth>,
	Json(req): Json<ClearReq>,
) -> FcResult<(StatusCode, Json<ClearRes>)> {
	let cleared =
		state.app.rate_limiter.clear(req.ip.as_deref(), req.wallet.as_deref()).await?;
	info!(actor = &*auth.sub, cleared, "rate limits cleared");
	Ok((StatusCode::OK, Json(ClearRes { success: true, cleared })))
}

/// Shared query parameters for the transaction listings.
#[derive(Deserialize)]
pub struct TransactionsQuery {
	source: Option<Source>,
	#[serde(default)]
	limit: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsRes {
	success: bool,
	transactions: Vec<AttemptRecord>,
}

async fn list_transactions(
	state: &ServerState,
	opts: ListAttemptsOptions<'_>,
) -> FcResult<(StatusCode, Json<TransactionsRes>)> {
	let transactions = state.app.audit.list(&opts).await?;
	Ok((StatusCode::OK, Json(TransactionsRes { success: true, transactions })))
}

/// # GET /api/admin/transactions/recent
pub async fn get_recent_transactions(
	State(state): State<ServerState>,
	Query(query): Query<TransactionsQuery>,
) -> FcResult<(StatusCode, Json<TransactionsRes>)> {
	list_transactions(
		&state,
		ListAttemptsOptions { source: query.source, limit: query.limit, ..Default::default() },
	)
	.await
}

/// # GET /api/admin/transactions/wallet/{wallet}
pub async fn get_wallet_transactions(
	State(state): State<ServerState>,
	Path(wallet): Path<Box<str>>,
	Query(query): Query<TransactionsQuery>,
) -> FcResult<(StatusCode, Json<TransactionsRes>)> {
	list_transactions(
		&state,
		ListAttemptsOptions {
			wallet_address: Some(&*wallet),
			limit: query.limit,
			..Default::default()
		},
	)
	.await
}

/// # GET /api/admin/transactions/user/{discordUserId}
pub async fn get_user_transactions(
	State(state): State<ServerState>,
	Path(discord_user_id): Path<Box<str>>,
	Query(query): Query<TransactionsQuery>,
) -> FcResult<(StatusCode, Json<TransactionsRes>)> {
	list_transactions(
		&state,
		ListAttemptsOptions {
			discord_user_id: Some(&*discord_user_id),
			limit: query.limit,
			..Default::default()
		},
	)
	.await
}

/// # GET /api/admin/transactions/stats
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatsRes {
	success: bool,
	stats: AttemptStats,
}

pub async fn get_transaction_stats(
	State(state): State<ServerState>,
) -> FcResult<(StatusCode, Json<TransactionStatsRes>)> {
	let stats = state.app.audit.stats().await?;
	Ok((StatusCode::OK, Json(TransactionStatsRes { success: true, stats })))
}

// vim: ts=4
