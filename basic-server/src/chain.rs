//! Chain adapter backed by a Sui fullnode and the upstream testnet faucet.
//!
//! Balances come from the fullnode's `suix_getBalance` JSON-RPC method.
//! Disbursement relays to the upstream faucet's `/gas` endpoint, which sends a
//! fixed amount per request; this keeps key management and transaction signing
//! out of this binary entirely. A deployment holding its own keys would swap in
//! a different `ChainAdapter`.

use std::time::Duration;

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_util::{client::legacy::Client, rt::TokioExecutor};
use serde::Deserialize;
use serde_json::json;

use sui_faucet_types::chain_adapter::ChainAdapter;
use sui_faucet_types::prelude::*;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

type HttpsClient = Client<
	hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>,
	Full<Bytes>,
>;

#[derive(Deserialize)]
struct RpcResponse {
	result: Option<BalanceResult>,
	error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResult {
	total_balance: Box<str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GasResponse {
	transferred_gas_objects: Option<Vec<TransferredGas>>,
	error: Option<Box<str>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferredGas {
	transfer_tx_digest: Box<str>,
	amount: u64,
}

pub struct SuiChainAdapter {
	rpc_url: Box<str>,
	faucet_url: Box<str>,
	/// The faucet's own wallet, for balance reporting
	faucet_address: Option<Box<str>>,
	client: HttpsClient,
}

impl std::fmt::Debug for SuiChainAdapter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SuiChainAdapter")
			.field("rpc_url", &self.rpc_url)
			.field("faucet_url", &self.faucet_url)
			.finish_non_exhaustive()
	}
}

impl SuiChainAdapter {
	pub fn new(
		rpc_url: Box<str>,
		faucet_url: Box<str>,
		faucet_address: Option<Box<str>>,
	) -> FcResult<Self> {
		let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
			.with_native_roots()
			.map_err(|_| Error::Config("no native root CA certificates found".into()))?
			.https_or_http()
			.enable_http1()
			.build();
		let client = Client::builder(TokioExecutor::new()).build(https_connector);

		Ok(Self { rpc_url, faucet_url, faucet_address, client })
	}

	async fn post_json(&self, url: &str, body: String) -> FcResult<Bytes> {
		let req = hyper::Request::post(url)
			.header(hyper::header::CONTENT_TYPE, "application/json")
			.body(Full::new(Bytes::from(body)))
			.map_err(|err| Error::Internal(format!("chain request: {err}")))?;

		let res = tokio::time::timeout(REQUEST_TIMEOUT, self.client.request(req))
			.await
			.map_err(|_| Error::Chain("chain request timed out".into()))?
			.map_err(|err| Error::Chain(format!("chain unreachable: {err}").into()))?;

		let status = res.status();
		let body = res
			.into_body()
			.collect()
			.await
			.map_err(|err| Error::Chain(format!("chain response: {err}").into()))?
			.to_bytes();
		if !status.is_success() {
			return Err(Error::Chain(format!("chain returned {status}").into()));
		}
		Ok(body)
	}

	async fn rpc_balance(&self, address: &str) -> FcResult<u128> {
		let body = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": "suix_getBalance",
			"params": [address, SUI_COIN_TYPE],
		})
		.to_string();

		let raw = self.post_json(&self.rpc_url, body).await?;
		let parsed: RpcResponse = serde_json::from_slice(&raw)?;

		if let Some(err) = parsed.error {
			return Err(Error::Chain(format!("suix_getBalance failed: {err}").into()));
		}
		let result = parsed.result.ok_or_else(|| Error::Chain("empty rpc response".into()))?;
		result
			.total_balance
			.parse()
			.map_err(|_| Error::Chain("unparseable balance".into()))
	}
}

#[async_trait]
impl ChainAdapter for SuiChainAdapter {
	async fn send_tokens(&self, to_address: &str, amount: u64) -> FcResult<Box<str>> {
		let body = json!({
			"FixedAmountRequest": { "recipient": to_address },
		})
		.to_string();

		let url = format!("{}/gas", self.faucet_url.trim_end_matches('/'));
		let raw = self.post_json(&url, body).await?;
		let parsed: GasResponse = serde_json::from_slice(&raw)?;

		if let Some(err) = parsed.error {
			return Err(Error::Chain(format!("upstream faucet: {err}").into()));
		}
		let transferred = parsed
			.transferred_gas_objects
			.unwrap_or_default()
			.into_iter()
			.next()
			.ok_or_else(|| Error::Chain("upstream faucet sent nothing".into()))?;

		if transferred.amount != amount {
			// Upstream sends its own fixed amount per request
			warn!(requested = amount, sent = transferred.amount, "upstream amount differs");
		}
		debug!(digest = %transferred.transfer_tx_digest, "gas transferred");

		Ok(transferred.transfer_tx_digest)
	}

	async fn balance(&self, address: &str) -> FcResult<u128> {
		self.rpc_balance(address).await
	}

	async fn faucet_balance(&self) -> FcResult<u128> {
		let address = self
			.faucet_address
			.as_deref()
			.ok_or_else(|| Error::Config("SUI_FAUCET_ADDRESS must be set".into()))?;
		self.rpc_balance(address).await
	}
}

// vim: ts=4
