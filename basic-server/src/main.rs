//! Batteries-included faucet server: wires environment-selected adapters into
//! the core and serves the HTTP API.
//!
//! Environment:
//! - `LISTEN`, `JWT_SECRET`, `ADMIN_PASSWORD`, `API_KEY`, `HCAPTCHA_SECRET_KEY`
//! - `RATE_LIMIT_WINDOW_MS`, `RATE_LIMIT_MAX_REQUESTS`, `RATE_LIMIT_BLOCK_DURATION_MS`
//! - `FAUCET_DEFAULT_AMOUNT`, `FAUCET_MAX_AMOUNT`, `FAUCET_CHARGE_FAILED_TRANSFERS`,
//!   `FAUCET_RESTRICTION_FAIL_CLOSED`
//! - `REDIS_URL` (in-process store when unset), `AUDIT_DB`
//! - `SUI_RPC_URL`, `SUI_FAUCET_URL`, `SUI_FAUCET_ADDRESS`

mod chain;

use std::env;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use sui_faucet::{HcaptchaVerifier, ServerConfig};
use sui_faucet_audit_adapter_sqlite::AuditAdapterSqlite;
use sui_faucet_core::{Adapters, AppState, FaucetConfig};
use sui_faucet_kv_adapter_memory::KvAdapterMemory;
use sui_faucet_kv_adapter_redis::KvAdapterRedis;
use sui_faucet_types::captcha_adapter::CaptchaVerifier;
use sui_faucet_types::kv_adapter::KvAdapter;
use sui_faucet_types::prelude::*;

use crate::chain::SuiChainAdapter;

const DEFAULT_RPC_URL: &str = "https://fullnode.testnet.sui.io:443";
const DEFAULT_FAUCET_URL: &str = "https://faucet.testnet.sui.io";
const DEFAULT_AUDIT_DB: &str = "./data/faucet-audit.db";

fn env_opt(key: &str) -> Option<Box<str>> {
	env::var(key).ok().filter(|v| !v.is_empty()).map(Into::into)
}

async fn serve() -> FcResult<()> {
	let faucet_config = FaucetConfig::from_env();
	let server_config = ServerConfig::from_env()?;

	let kv: Arc<dyn KvAdapter> = match env_opt("REDIS_URL") {
		Some(url) => Arc::new(KvAdapterRedis::new(&url).await?),
		None => {
			warn!("REDIS_URL not set, counters are in-process and reset on restart");
			Arc::new(KvAdapterMemory::new())
		}
	};

	let audit_db = env_opt("AUDIT_DB").unwrap_or_else(|| DEFAULT_AUDIT_DB.into());
	if let Some(parent) = std::path::Path::new(&*audit_db).parent() {
		std::fs::create_dir_all(parent)?;
	}
	let audit = Arc::new(AuditAdapterSqlite::new(&*audit_db).await?);

	let chain = Arc::new(SuiChainAdapter::new(
		env_opt("SUI_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.into()),
		env_opt("SUI_FAUCET_URL").unwrap_or_else(|| DEFAULT_FAUCET_URL.into()),
		env_opt("SUI_FAUCET_ADDRESS"),
	)?);

	let captcha: Option<Arc<dyn CaptchaVerifier>> = match &server_config.hcaptcha_secret {
		Some(secret) => Some(Arc::new(HcaptchaVerifier::new(secret.clone())?)),
		None => {
			warn!("HCAPTCHA_SECRET_KEY not set, captcha tokens are not verified");
			None
		}
	};

	let app = AppState::new(faucet_config, Adapters { kv, audit, chain, captcha });
	sui_faucet::run(app, server_config).await
}

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
		.init();

	if let Err(err) = serve().await {
		error!("fatal: {err}");
		std::process::exit(1);
	}
}

// vim: ts=4
