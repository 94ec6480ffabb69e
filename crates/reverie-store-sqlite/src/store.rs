// crates/reverie-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Authority Store
// Description: Durable AuthorityStore backed by SQLite WAL.
// Purpose: Persist entitlement state with atomic conditional quota commits.
// Dependencies: reverie-core, rusqlite, serde, thiserror, time
// ============================================================================

//! ## Overview
//! This module implements the durable [`reverie_core::AuthorityStore`] over
//! `SQLite`. The quota-consuming operations are the serialization points for
//! same-account races: the analysis counter uses a single guarded `UPDATE`,
//! and report persistence re-checks its cap inside an immediate transaction,
//! so concurrent requests can never consume past a configured limit.
//!
//! Loads fail closed: unrecognized plan or role labels surface as corrupt
//! records instead of defaulting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use reverie_core::AccountId;
use reverie_core::AccountRecord;
use reverie_core::AccountStore;
use reverie_core::CommitOutcome;
use reverie_core::EntitlementRecord;
use reverie_core::EntitlementStore;
use reverie_core::EntitlementUpdate;
use reverie_core::Plan;
use reverie_core::ReportConstraint;
use reverie_core::Role;
use reverie_core::StoreError;
use reverie_core::Timestamp;
use reverie_core::UsageStore;
use reverie_core::WeekWindow;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use serde::Deserialize;
use time::Date;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` authority store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl SqliteStoreConfig {
    /// Creates a configuration with defaults for the given path.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Durable authority store backed by `SQLite`.
///
/// # Invariants
/// - All access runs through one connection behind a mutex; every store
///   operation is atomic with respect to the others.
/// - Foreign keys are enforced; deleting an account cascades to its
///   entitlement, report, and journal records.
pub struct SqliteAuthorityStore {
    /// Guarded database connection.
    conn: Mutex<Connection>,
}

impl SqliteAuthorityStore {
    /// Opens (or creates) the store at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] when the database cannot be opened or
    /// migrated.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(&config.path).map_err(backend)?;
        Self::initialize(conn, config)
    }

    /// Opens an in-memory store (tests).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] when initialization fails.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        let config = SqliteStoreConfig::new(":memory:");
        Self::initialize(conn, &config)
    }

    /// Applies pragmas and the schema, then wraps the connection.
    fn initialize(conn: Connection, config: &SqliteStoreConfig) -> Result<Self, StoreError> {
        let busy_timeout_ms = i64::try_from(config.busy_timeout_ms).unwrap_or(i64::MAX);
        // Batched so pragmas that echo a result row (journal_mode) are
        // handled uniformly.
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = {};\n\
             PRAGMA synchronous = {};\n\
             PRAGMA busy_timeout = {busy_timeout_ms};\n\
             PRAGMA foreign_keys = ON;",
            config.journal_mode.pragma_value(),
            config.sync_mode.pragma_value(),
        ))
        .map_err(backend)?;
        conn.execute_batch(SCHEMA_SQL).map_err(backend)?;
        let version: Option<i64> = conn
            .query_row("SELECT version FROM authority_meta LIMIT 1", [], |row| row.get(0))
            .optional()
            .map_err(backend)?;
        match version {
            None => {
                conn.execute("INSERT INTO authority_meta (version) VALUES (?1)", [SCHEMA_VERSION])
                    .map_err(backend)?;
            }
            Some(found) if found == SCHEMA_VERSION => {}
            Some(found) => {
                return Err(StoreError::Backend(format!(
                    "unsupported schema version {found} (expected {SCHEMA_VERSION})"
                )));
            }
        }
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Acquires the connection, mapping poisoning to a backend error.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Backend("connection mutex poisoned".to_string()))
    }
}

/// Schema for the authority tables.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS authority_meta (
    version INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS accounts (
    account_id   TEXT PRIMARY KEY,
    email        TEXT NOT NULL,
    display_name TEXT,
    role         TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS entitlements (
    account_id                   TEXT PRIMARY KEY
        REFERENCES accounts(account_id) ON DELETE CASCADE,
    plan                         TEXT NOT NULL,
    plan_expires_at              INTEGER,
    lifetime_analysis_count      INTEGER NOT NULL DEFAULT 0,
    lifetime_weekly_report_count INTEGER NOT NULL DEFAULT 0,
    was_admin_upgraded           INTEGER NOT NULL DEFAULT 0,
    has_seen_upgrade_notice      INTEGER NOT NULL DEFAULT 1
);
CREATE TABLE IF NOT EXISTS reports (
    report_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id TEXT NOT NULL
        REFERENCES accounts(account_id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_reports_account_created
    ON reports(account_id, created_at);
CREATE TABLE IF NOT EXISTS journal_entries (
    entry_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id TEXT NOT NULL
        REFERENCES accounts(account_id) ON DELETE CASCADE,
    entry_date TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_entries_account_date
    ON journal_entries(account_id, entry_date);
";

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Maps a backend error into the store error surface.
fn backend(error: rusqlite::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}

/// Maps a window boundary failure into a backend error.
fn window_error(error: reverie_core::core::time::TimeError) -> StoreError {
    StoreError::Backend(format!("week window out of range: {error}"))
}

/// Decodes a stored plan label, failing closed on unknown values.
fn decode_plan(account: &AccountId, label: &str) -> Result<Plan, StoreError> {
    match label {
        "free" => Ok(Plan::Free),
        "deep" => Ok(Plan::Deep),
        other => Err(StoreError::Corrupt {
            account: account.clone(),
            detail: format!("unknown plan label '{other}'"),
        }),
    }
}

/// Decodes a stored role label, failing closed on unknown values.
fn decode_role(account: &AccountId, label: &str) -> Result<Role, StoreError> {
    match label {
        "standard" => Ok(Role::Standard),
        "superadmin" => Ok(Role::Superadmin),
        other => Err(StoreError::Corrupt {
            account: account.clone(),
            detail: format!("unknown role label '{other}'"),
        }),
    }
}

/// Raw entitlement row prior to label decoding.
struct EntitlementRow {
    /// Stored plan label.
    plan: String,
    /// Stored expiry millis.
    plan_expires_at: Option<i64>,
    /// Stored analysis counter.
    lifetime_analysis_count: i64,
    /// Stored report counter.
    lifetime_weekly_report_count: i64,
    /// Stored admin-upgrade flag.
    was_admin_upgraded: bool,
    /// Stored notice flag.
    has_seen_upgrade_notice: bool,
}

impl EntitlementRow {
    /// Decodes the row into a domain record.
    fn into_record(self, account: &AccountId) -> Result<EntitlementRecord, StoreError> {
        let counter = |value: i64, field: &str| -> Result<u32, StoreError> {
            u32::try_from(value).map_err(|_| StoreError::Corrupt {
                account: account.clone(),
                detail: format!("negative or oversized {field}"),
            })
        };
        Ok(EntitlementRecord {
            account_id: account.clone(),
            plan: decode_plan(account, &self.plan)?,
            plan_expires_at: self.plan_expires_at.map(Timestamp::from_unix_millis),
            lifetime_analysis_count: counter(self.lifetime_analysis_count, "analysis count")?,
            lifetime_weekly_report_count: counter(
                self.lifetime_weekly_report_count,
                "report count",
            )?,
            was_admin_upgraded: self.was_admin_upgraded,
            has_seen_upgrade_notice: self.has_seen_upgrade_notice,
        })
    }
}

/// Reads the entitlement row for an account inside any connection context.
fn query_entitlement(
    conn: &Connection,
    account: &AccountId,
) -> Result<Option<EntitlementRecord>, StoreError> {
    let row = conn
        .query_row(
            "SELECT plan, plan_expires_at, lifetime_analysis_count,
                    lifetime_weekly_report_count, was_admin_upgraded,
                    has_seen_upgrade_notice
             FROM entitlements WHERE account_id = ?1",
            [account.as_str()],
            |row| {
                Ok(EntitlementRow {
                    plan: row.get(0)?,
                    plan_expires_at: row.get(1)?,
                    lifetime_analysis_count: row.get(2)?,
                    lifetime_weekly_report_count: row.get(3)?,
                    was_admin_upgraded: row.get(4)?,
                    has_seen_upgrade_notice: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(backend)?;
    row.map(|row| row.into_record(account)).transpose()
}

/// Writes every mutable entitlement field for an account.
fn write_entitlement(conn: &Connection, record: &EntitlementRecord) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE entitlements SET
             plan = ?2,
             plan_expires_at = ?3,
             lifetime_analysis_count = ?4,
             lifetime_weekly_report_count = ?5,
             was_admin_upgraded = ?6,
             has_seen_upgrade_notice = ?7
         WHERE account_id = ?1",
        params![
            record.account_id.as_str(),
            record.plan.as_str(),
            record.plan_expires_at.map(Timestamp::as_unix_millis),
            i64::from(record.lifetime_analysis_count),
            i64::from(record.lifetime_weekly_report_count),
            record.was_admin_upgraded,
            record.has_seen_upgrade_notice,
        ],
    )
    .map_err(backend)?;
    Ok(())
}

// ============================================================================
// SECTION: Entitlement Store
// ============================================================================

impl EntitlementStore for SqliteAuthorityStore {
    fn load_entitlement(
        &self,
        account: &AccountId,
    ) -> Result<Option<EntitlementRecord>, StoreError> {
        let conn = self.lock()?;
        query_entitlement(&conn, account)
    }

    fn create_entitlement(&self, record: &EntitlementRecord) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO entitlements (
                     account_id, plan, plan_expires_at, lifetime_analysis_count,
                     lifetime_weekly_report_count, was_admin_upgraded,
                     has_seen_upgrade_notice
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.account_id.as_str(),
                    record.plan.as_str(),
                    record.plan_expires_at.map(Timestamp::as_unix_millis),
                    i64::from(record.lifetime_analysis_count),
                    i64::from(record.lifetime_weekly_report_count),
                    record.was_admin_upgraded,
                    record.has_seen_upgrade_notice,
                ],
            )
            .map_err(backend)?;
        if inserted == 0 {
            return Err(StoreError::AccountExists(record.account_id.clone()));
        }
        Ok(())
    }

    fn apply_entitlement_update(
        &self,
        account: &AccountId,
        update: &EntitlementUpdate,
    ) -> Result<EntitlementRecord, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(backend)?;
        let mut record = query_entitlement(&tx, account)?
            .ok_or_else(|| StoreError::AccountNotFound(account.clone()))?;
        record.apply(update);
        write_entitlement(&tx, &record)?;
        tx.commit().map_err(backend)?;
        Ok(record)
    }

    fn try_consume_analysis(
        &self,
        account: &AccountId,
        limit: u32,
    ) -> Result<CommitOutcome, StoreError> {
        let conn = self.lock()?;
        // Guard and increment in one statement: the store is the
        // serialization point for same-account races.
        let changed = conn
            .execute(
                "UPDATE entitlements
                 SET lifetime_analysis_count = lifetime_analysis_count + 1
                 WHERE account_id = ?1 AND lifetime_analysis_count < ?2",
                params![account.as_str(), i64::from(limit)],
            )
            .map_err(backend)?;
        if changed == 1 {
            return Ok(CommitOutcome::Committed);
        }
        if query_entitlement(&conn, account)?.is_none() {
            return Err(StoreError::AccountNotFound(account.clone()));
        }
        Ok(CommitOutcome::Exhausted)
    }
}

// ============================================================================
// SECTION: Usage Store
// ============================================================================

impl UsageStore for SqliteAuthorityStore {
    fn reports_in_window(
        &self,
        account: &AccountId,
        window: WeekWindow,
    ) -> Result<u32, StoreError> {
        let start = window.start_instant().map_err(window_error)?;
        let end = window.end_instant_exclusive().map_err(window_error)?;
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM reports
                 WHERE account_id = ?1 AND created_at >= ?2 AND created_at < ?3",
                params![account.as_str(), start.as_unix_millis(), end.as_unix_millis()],
                |row| row.get(0),
            )
            .map_err(backend)?;
        u32::try_from(count).map_err(|_| StoreError::Backend("report count overflow".to_string()))
    }

    fn distinct_entry_days(
        &self,
        account: &AccountId,
        window: WeekWindow,
    ) -> Result<u32, StoreError> {
        let start_date = window.start_date().to_string();
        let end_date = window.end_date().map_err(window_error)?.to_string();
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(DISTINCT entry_date) FROM journal_entries
                 WHERE account_id = ?1 AND entry_date >= ?2 AND entry_date <= ?3",
                params![account.as_str(), start_date, end_date],
                |row| row.get(0),
            )
            .map_err(backend)?;
        u32::try_from(count)
            .map_err(|_| StoreError::Backend("entry day count overflow".to_string()))
    }

    fn insert_report_if_within(
        &self,
        account: &AccountId,
        created_at: Timestamp,
        constraint: ReportConstraint,
    ) -> Result<CommitOutcome, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(backend)?;
        match constraint {
            ReportConstraint::Unbounded => {}
            ReportConstraint::WindowCapped { window, cap } => {
                let start = window.start_instant().map_err(window_error)?;
                let end = window.end_instant_exclusive().map_err(window_error)?;
                let used: i64 = tx
                    .query_row(
                        "SELECT COUNT(*) FROM reports
                         WHERE account_id = ?1 AND created_at >= ?2 AND created_at < ?3",
                        params![account.as_str(), start.as_unix_millis(), end.as_unix_millis()],
                        |row| row.get(0),
                    )
                    .map_err(backend)?;
                if used >= i64::from(cap) {
                    return Ok(CommitOutcome::Exhausted);
                }
            }
            ReportConstraint::LifetimeCapped { cap } => {
                let changed = tx
                    .execute(
                        "UPDATE entitlements
                         SET lifetime_weekly_report_count = lifetime_weekly_report_count + 1
                         WHERE account_id = ?1 AND lifetime_weekly_report_count < ?2",
                        params![account.as_str(), i64::from(cap)],
                    )
                    .map_err(backend)?;
                if changed == 0 {
                    if query_entitlement(&tx, account)?.is_none() {
                        return Err(StoreError::AccountNotFound(account.clone()));
                    }
                    return Ok(CommitOutcome::Exhausted);
                }
            }
        }
        tx.execute(
            "INSERT INTO reports (account_id, created_at) VALUES (?1, ?2)",
            params![account.as_str(), created_at.as_unix_millis()],
        )
        .map_err(backend)?;
        tx.commit().map_err(backend)?;
        Ok(CommitOutcome::Committed)
    }

    fn record_entry_day(&self, account: &AccountId, entry_date: Date) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO journal_entries (account_id, entry_date) VALUES (?1, ?2)",
            params![account.as_str(), entry_date.to_string()],
        )
        .map_err(backend)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Account Store
// ============================================================================

impl AccountStore for SqliteAuthorityStore {
    fn load_account(&self, account: &AccountId) -> Result<Option<AccountRecord>, StoreError> {
        let conn = self.lock()?;
        let row: Option<(String, Option<String>, String)> = conn
            .query_row(
                "SELECT email, display_name, role FROM accounts WHERE account_id = ?1",
                [account.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(backend)?;
        row.map(|(email, display_name, role)| {
            Ok(AccountRecord {
                account_id: account.clone(),
                email,
                display_name,
                role: decode_role(account, &role)?,
            })
        })
        .transpose()
    }

    fn create_account(&self, record: &AccountRecord) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO accounts (account_id, email, display_name, role)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.account_id.as_str(),
                    record.email,
                    record.display_name,
                    record.role.as_str(),
                ],
            )
            .map_err(backend)?;
        if inserted == 0 {
            return Err(StoreError::AccountExists(record.account_id.clone()));
        }
        Ok(())
    }

    fn set_role(&self, account: &AccountId, role: Role) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE accounts SET role = ?2 WHERE account_id = ?1",
                params![account.as_str(), role.as_str()],
            )
            .map_err(backend)?;
        if changed == 0 {
            return Err(StoreError::AccountNotFound(account.clone()));
        }
        Ok(())
    }

    fn delete_account(&self, account: &AccountId) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let deleted = conn
            .execute("DELETE FROM accounts WHERE account_id = ?1", [account.as_str()])
            .map_err(backend)?;
        if deleted == 0 {
            return Err(StoreError::AccountNotFound(account.clone()));
        }
        Ok(())
    }
}
