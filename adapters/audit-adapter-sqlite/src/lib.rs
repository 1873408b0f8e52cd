//! SQLite implementation of the faucet `AuditAdapter`.
//!
//! One append-only `request_history` table. Writes happen on the request path
//! (the orchestrator records every attempt), so the pool runs WAL mode and the
//! insert is a single statement. Reads serve the admin transaction endpoints.

#![forbid(unsafe_code)]

use std::path::Path;

use async_trait::async_trait;
use sqlx::{
	Row,
	sqlite::{self, SqlitePool, SqliteRow},
};

use sui_faucet_types::audit_adapter::{
	AttemptRecord, AttemptStats, AuditAdapter, DisbursementAttempt, ListAttemptsOptions,
};
use sui_faucet_types::prelude::*;

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 500;

fn db_err(err: sqlx::Error) -> Error {
	warn!("audit db error: {err}");
	Error::DbUnavailable(err.to_string().into())
}

async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS request_history (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			wallet_address TEXT NOT NULL,
			amount INTEGER NOT NULL,
			source TEXT NOT NULL,
			discord_user_id TEXT,
			ip TEXT,
			tx_hash TEXT,
			success INTEGER NOT NULL,
			error TEXT,
			rate_limit TEXT,
			created_at INTEGER NOT NULL
		)",
	)
	.execute(db)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_history_wallet ON request_history (wallet_address)")
		.execute(db)
		.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_history_discord ON request_history (discord_user_id)",
	)
	.execute(db)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_history_created ON request_history (created_at)")
		.execute(db)
		.await?;
	Ok(())
}

fn map_record(row: SqliteRow) -> FcResult<AttemptRecord> {
	let source: String = row.try_get("source").map_err(db_err)?;
	let amount: i64 = row.try_get("amount").map_err(db_err)?;
	let rate_limit = row
		.try_get::<Option<String>, _>("rate_limit")
		.map_err(db_err)?
		.map(|raw| serde_json::from_str(&raw))
		.transpose()?;

	Ok(AttemptRecord {
		id: row.try_get("id").map_err(db_err)?,
		attempt: DisbursementAttempt {
			wallet_address: row.try_get::<String, _>("wallet_address").map_err(db_err)?.into(),
			amount: amount.max(0) as u64,
			source: source.parse()?,
			discord_user_id: row
				.try_get::<Option<String>, _>("discord_user_id")
				.map_err(db_err)?
				.map(Into::into),
			ip: row.try_get::<Option<String>, _>("ip").map_err(db_err)?.map(Into::into),
			tx_hash: row.try_get::<Option<String>, _>("tx_hash").map_err(db_err)?.map(Into::into),
			success: row.try_get("success").map_err(db_err)?,
			error: row.try_get::<Option<String>, _>("error").map_err(db_err)?.map(Into::into),
			rate_limit,
		},
		created_at: Timestamp(row.try_get("created_at").map_err(db_err)?),
	})
}

#[derive(Debug)]
pub struct AuditAdapterSqlite {
	db: SqlitePool,
}

impl AuditAdapterSqlite {
	pub async fn new(path: impl AsRef<Path>) -> FcResult<Self> {
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.map_err(db_err)?;

		init_db(&db).await.map_err(db_err)?;
		info!("audit db ready at {:?}", path.as_ref());
		Ok(Self { db })
	}
}

#[async_trait]
impl AuditAdapter for AuditAdapterSqlite {
	async fn record(&self, attempt: &DisbursementAttempt) -> FcResult<()> {
		let rate_limit = attempt
			.rate_limit
			.as_ref()
			.map(serde_json::to_string)
			.transpose()?;

		sqlx::query(
			"INSERT INTO request_history
				(wallet_address, amount, source, discord_user_id, ip, tx_hash,
				 success, error, rate_limit, created_at)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
		)
		.bind(&*attempt.wallet_address)
		.bind(attempt.amount as i64)
		.bind(attempt.source.as_str())
		.bind(attempt.discord_user_id.as_deref())
		.bind(attempt.ip.as_deref())
		.bind(attempt.tx_hash.as_deref())
		.bind(attempt.success)
		.bind(attempt.error.as_deref())
		.bind(rate_limit)
		.bind(Timestamp::now().0)
		.execute(&self.db)
		.await
		.map_err(db_err)?;
		Ok(())
	}

	async fn list(&self, opts: &ListAttemptsOptions<'_>) -> FcResult<Vec<AttemptRecord>> {
		let limit = match opts.limit {
			0 => DEFAULT_LIST_LIMIT,
			limit => limit.min(MAX_LIST_LIMIT),
		};

		let mut query = sqlx::QueryBuilder::new(
			"SELECT id, wallet_address, amount, source, discord_user_id, ip, tx_hash,
				success, error, rate_limit, created_at
			FROM request_history WHERE 1=1",
		);
		if let Some(source) = opts.source {
			query.push(" AND source = ").push_bind(source.as_str());
		}
		if let Some(wallet) = opts.wallet_address {
			query.push(" AND wallet_address = ").push_bind(wallet);
		}
		if let Some(uid) = opts.discord_user_id {
			query.push(" AND discord_user_id = ").push_bind(uid);
		}
		query.push(" ORDER BY id DESC LIMIT ").push_bind(limit as i64);

		let rows = query.build().fetch_all(&self.db).await.map_err(db_err)?;
		rows.into_iter().map(map_record).collect()
	}

	async fn stats(&self) -> FcResult<AttemptStats> {
		let row = sqlx::query(
			"SELECT COUNT(*) AS total,
				COALESCE(SUM(success), 0) AS successful,
				COALESCE(SUM(CASE WHEN success THEN amount ELSE 0 END), 0) AS disbursed
			FROM request_history",
		)
		.fetch_one(&self.db)
		.await
		.map_err(db_err)?;

		let total: i64 = row.try_get("total").map_err(db_err)?;
		let successful: i64 = row.try_get("successful").map_err(db_err)?;
		let disbursed: i64 = row.try_get("disbursed").map_err(db_err)?;

		Ok(AttemptStats {
			total_requests: total.max(0) as u64,
			successful_requests: successful.max(0) as u64,
			failed_requests: (total - successful).max(0) as u64,
			total_disbursed: disbursed.max(0) as u64,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use sui_faucet_types::types::{RateLimitInfo, Source};

	async fn adapter(name: &str) -> AuditAdapterSqlite {
		let path = std::env::temp_dir().join(format!("faucet-audit-{}-{name}.db", std::process::id()));
		let _ = std::fs::remove_file(&path);
		AuditAdapterSqlite::new(&path).await.unwrap()
	}

	fn attempt(wallet: &str, success: bool) -> DisbursementAttempt {
		DisbursementAttempt {
			wallet_address: wallet.into(),
			amount: 1_000_000_000,
			source: Source::Frontend,
			discord_user_id: None,
			ip: Some("1.2.3.4".into()),
			tx_hash: success.then(|| "0xdeadbeef".into()),
			success,
			error: (!success).then(|| "transfer failed".into()),
			rate_limit: Some(RateLimitInfo { remaining: 0, reset_time: 43200000, blocked: false }),
		}
	}

	#[tokio::test]
	async fn test_record_and_list() {
		let audit = adapter("record-list").await;
		audit.record(&attempt("0xaaa", true)).await.unwrap();
		audit.record(&attempt("0xbbb", false)).await.unwrap();

		let all = audit.list(&ListAttemptsOptions::default()).await.unwrap();
		assert_eq!(all.len(), 2);
		// Newest first
		assert_eq!(&*all[0].attempt.wallet_address, "0xbbb");
		assert!(!all[0].attempt.success);
		assert_eq!(all[0].attempt.error.as_deref(), Some("transfer failed"));
		assert_eq!(all[1].attempt.tx_hash.as_deref(), Some("0xdeadbeef"));
		assert_eq!(all[1].attempt.rate_limit.map(|rl| rl.reset_time), Some(43200000));

		let filtered = audit
			.list(&ListAttemptsOptions { wallet_address: Some("0xaaa"), ..Default::default() })
			.await
			.unwrap();
		assert_eq!(filtered.len(), 1);
		assert!(filtered[0].attempt.success);
	}

	#[tokio::test]
	async fn test_stats() {
		let audit = adapter("stats").await;
		audit.record(&attempt("0xaaa", true)).await.unwrap();
		audit.record(&attempt("0xbbb", true)).await.unwrap();
		audit.record(&attempt("0xccc", false)).await.unwrap();

		let stats = audit.stats().await.unwrap();
		assert_eq!(stats.total_requests, 3);
		assert_eq!(stats.successful_requests, 2);
		assert_eq!(stats.failed_requests, 1);
		assert_eq!(stats.total_disbursed, 2_000_000_000);
	}

	#[tokio::test]
	async fn test_list_limit() {
		let audit = adapter("limit").await;
		for i in 0..5 {
			audit.record(&attempt(&format!("0x{i}"), true)).await.unwrap();
		}
		let limited = audit
			.list(&ListAttemptsOptions { limit: 2, ..Default::default() })
			.await
			.unwrap();
		assert_eq!(limited.len(), 2);
		assert_eq!(&*limited[0].attempt.wallet_address, "0x4");
	}
}

// vim: ts=4
