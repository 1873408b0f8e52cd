//! Adapter for the Sui chain client that executes the actual token transfer.
//!
//! Transaction construction and signing live behind this trait; the core only
//! sequences the call and records its outcome.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

pub const MIST_PER_SUI: u64 = 1_000_000_000;

/// Checks the shape of a Sui address: `0x` followed by 64 hex digits.
pub fn is_valid_sui_address(address: &str) -> bool {
	let Some(hex) = address.strip_prefix("0x") else { return false };
	hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

/// A faucet chain adapter.
#[async_trait]
pub trait ChainAdapter: Debug + Send + Sync {
	/// Transfers `amount` MIST to `to_address` and returns the transaction
	/// digest. A missing signing configuration surfaces as `Error::Config`.
	async fn send_tokens(&self, to_address: &str, amount: u64) -> FcResult<Box<str>>;

	/// Reads the SUI balance of an address, in MIST.
	async fn balance(&self, address: &str) -> FcResult<u128>;

	/// Reads the faucet's own balance, in MIST.
	async fn faucet_balance(&self) -> FcResult<u128>;
}


// vim: ts=4
