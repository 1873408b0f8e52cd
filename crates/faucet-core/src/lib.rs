//! Core abuse-prevention layer for the Sui testnet faucet.
//!
//! Everything security-relevant lives here: the per-IP/per-wallet rate limiter,
//! the Discord pair limiter with block escalation, the restriction registry,
//! the global pause switch, and the orchestrator that sequences a disbursement
//! through them. All shared mutable state lives in an external key-value store
//! behind [`sui_faucet_types::kv_adapter::KvAdapter`]; no in-process locks are
//! held across store calls.

#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod disburse;
pub mod pause;
pub mod prelude;
pub mod rate_limit;
pub mod restriction;

pub use app::{Adapters, App, AppState};
pub use config::FaucetConfig;

// vim: ts=4
