//! Shared fixtures: in-memory adapters with failure injection.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use sui_faucet_core::{Adapters, App, AppState, FaucetConfig};
use sui_faucet_kv_adapter_memory::KvAdapterMemory;
use sui_faucet_types::audit_adapter::{
	AttemptRecord, AttemptStats, AuditAdapter, DisbursementAttempt, ListAttemptsOptions,
};
use sui_faucet_types::captcha_adapter::CaptchaVerifier;
use sui_faucet_types::chain_adapter::ChainAdapter;
use sui_faucet_types::kv_adapter::{KeyTtl, KvAdapter};
use sui_faucet_types::prelude::*;

#[derive(Debug, Default)]
pub struct MockChain {
	pub fail: AtomicBool,
	pub sent: Mutex<Vec<(Box<str>, u64)>>,
}

impl MockChain {
	pub fn set_fail(&self, fail: bool) {
		self.fail.store(fail, Ordering::SeqCst);
	}

	pub fn sent_count(&self) -> usize {
		self.sent.lock().unwrap().len()
	}
}

#[async_trait]
impl ChainAdapter for MockChain {
	async fn send_tokens(&self, to_address: &str, amount: u64) -> FcResult<Box<str>> {
		if self.fail.load(Ordering::SeqCst) {
			return Err(Error::Chain("injected transfer failure".into()));
		}
		self.sent.lock().unwrap().push((to_address.into(), amount));
		Ok("0xtestdigest".into())
	}

	async fn balance(&self, _address: &str) -> FcResult<u128> {
		Ok(0)
	}

	async fn faucet_balance(&self) -> FcResult<u128> {
		Ok(0)
	}
}

#[derive(Debug, Default)]
pub struct MemoryAudit {
	pub attempts: Mutex<Vec<DisbursementAttempt>>,
}

impl MemoryAudit {
	pub fn last(&self) -> Option<DisbursementAttempt> {
		self.attempts.lock().unwrap().last().cloned()
	}
}

#[async_trait]
impl AuditAdapter for MemoryAudit {
	async fn record(&self, attempt: &DisbursementAttempt) -> FcResult<()> {
		self.attempts.lock().unwrap().push(attempt.clone());
		Ok(())
	}

	async fn list(&self, _opts: &ListAttemptsOptions<'_>) -> FcResult<Vec<AttemptRecord>> {
		Ok(Vec::new())
	}

	async fn stats(&self) -> FcResult<AttemptStats> {
		Ok(AttemptStats::default())
	}
}

/// Rejects every token.
#[derive(Debug)]
pub struct RejectingCaptcha;

#[async_trait]
impl CaptchaVerifier for RejectingCaptcha {
	async fn verify(&self, _token: &str, _ip: &str) -> FcResult<()> {
		Err(Error::CaptchaFailed("token rejected".into()))
	}
}

/// Delegates to a memory store but fails reads of restriction records, to
/// exercise the fail-open/fail-closed policy without touching other state.
#[derive(Debug)]
pub struct RestrictionFailKv {
	pub inner: Arc<KvAdapterMemory>,
}

#[async_trait]
impl KvAdapter for RestrictionFailKv {
	async fn get(&self, key: &str) -> FcResult<Option<Box<str>>> {
		if key.starts_with("restriction:") {
			return Err(Error::StoreUnavailable("injected store failure".into()));
		}
		self.inner.get(key).await
	}

	async fn set(&self, key: &str, value: &str) -> FcResult<()> {
		self.inner.set(key, value).await
	}

	async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> FcResult<()> {
		self.inner.set_ex(key, value, ttl_secs).await
	}

	async fn incr(&self, key: &str) -> FcResult<i64> {
		self.inner.incr(key).await
	}

	async fn decr(&self, key: &str) -> FcResult<i64> {
		self.inner.decr(key).await
	}

	async fn ttl(&self, key: &str) -> FcResult<KeyTtl> {
		self.inner.ttl(key).await
	}

	async fn expire(&self, key: &str, ttl_secs: u64) -> FcResult<bool> {
		self.inner.expire(key, ttl_secs).await
	}

	async fn del(&self, key: &str) -> FcResult<bool> {
		self.inner.del(key).await
	}

	async fn del_prefix(&self, prefix: &str) -> FcResult<u64> {
		self.inner.del_prefix(prefix).await
	}
}

pub struct TestApp {
	pub app: App,
	pub kv: Arc<KvAdapterMemory>,
	pub chain: Arc<MockChain>,
	pub audit: Arc<MemoryAudit>,
}

pub fn build_app(config: FaucetConfig) -> TestApp {
	build_app_with(config, None, false)
}

pub fn build_app_with(
	config: FaucetConfig,
	captcha: Option<Arc<dyn CaptchaVerifier>>,
	fail_restrictions: bool,
) -> TestApp {
	let kv = Arc::new(KvAdapterMemory::new());
	let chain = Arc::new(MockChain::default());
	let audit = Arc::new(MemoryAudit::default());

	let store: Arc<dyn KvAdapter> = if fail_restrictions {
		Arc::new(RestrictionFailKv { inner: kv.clone() })
	} else {
		kv.clone()
	};

	let app = AppState::new(
		config,
		Adapters { kv: store, audit: audit.clone(), chain: chain.clone(), captcha },
	);
	TestApp { app, kv, chain, audit }
}

// vim: ts=4
