use axum::{
	Router, middleware,
	routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{require_admin, require_api_key};
use crate::state::ServerState;
use crate::{admin, discord, faucet};

pub fn init(state: ServerState) -> Router {
	let public_router = Router::new()
		.route("/api/faucet/request", post(faucet::post_faucet_request))
		.route("/api/faucet/balance/{address}", get(faucet::get_balance))
		.route("/api/faucet/status", get(faucet::get_status))
		.route("/api/admin/login", post(admin::post_login));

	let discord_router = Router::new()
		.route("/api/discord/faucet/request", post(discord::post_discord_request))
		.route("/api/discord/ratelimit/{user_id}/{wallet}", get(discord::get_discord_rate_limit))
		.layer(middleware::from_fn_with_state(state.clone(), require_api_key));

	let admin_router = Router::new()
		.route("/api/admin/status", get(admin::get_status))
		.route("/api/admin/pause", post(admin::post_pause))
		.route("/api/admin/unpause", post(admin::post_unpause))
		.route("/api/admin/restrictions/{axis}", post(admin::post_restriction))
		.route("/api/admin/restrictions/{axis}/{identity}", get(admin::get_restriction))
		.route("/api/admin/restrictions/{axis}/{identity}", delete(admin::delete_restriction))
		.route("/api/admin/rate-limits/clear", post(admin::post_clear_rate_limits))
		.route("/api/admin/transactions/recent", get(admin::get_recent_transactions))
		.route("/api/admin/transactions/wallet/{wallet}", get(admin::get_wallet_transactions))
		.route("/api/admin/transactions/user/{user_id}", get(admin::get_user_transactions))
		.route("/api/admin/transactions/stats", get(admin::get_transaction_stats))
		.layer(middleware::from_fn_with_state(state.clone(), require_admin));

	Router::new()
		.merge(public_router)
		.merge(discord_router)
		.merge(admin_router)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(state)
}

// vim: ts=4
