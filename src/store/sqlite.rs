//! SQLite-backed collaborator store.
//!
//! One database holds the proposal ledger and the external state it drives
//! (citizenship, congress seats, relations, taxes, treasury, wallets).
//! Amounts are stored as integer minor units; proposal payloads and roster
//! snapshots as JSON.

use crate::congress::error::{StoreError, StoreResult};
use crate::congress::traits::*;
use crate::congress::types::*;
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::Row;
use std::path::Path;
use std::time::Duration;

/// How long a writer waits for another process's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS citizens (
        user_id INTEGER PRIMARY KEY,
        body_id INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS congress_members (
        user_id INTEGER PRIMARY KEY,
        body_id INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS relations (
        body_id INTEGER NOT NULL,
        target_id INTEGER NOT NULL,
        kind TEXT NOT NULL,
        PRIMARY KEY (body_id, target_id, kind)
    )",
    "CREATE TABLE IF NOT EXISTS taxes (
        body_id INTEGER NOT NULL,
        kind TEXT NOT NULL,
        rate INTEGER NOT NULL,
        PRIMARY KEY (body_id, kind)
    )",
    "CREATE TABLE IF NOT EXISTS treasury (
        body_id INTEGER NOT NULL,
        currency TEXT NOT NULL,
        balance INTEGER NOT NULL CHECK (balance >= 0),
        PRIMARY KEY (body_id, currency)
    )",
    "CREATE TABLE IF NOT EXISTS wallets (
        user_id INTEGER NOT NULL,
        currency TEXT NOT NULL,
        balance INTEGER NOT NULL CHECK (balance >= 0),
        PRIMARY KEY (user_id, currency)
    )",
    "CREATE TABLE IF NOT EXISTS proposals (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        proposer INTEGER NOT NULL,
        body_id INTEGER NOT NULL,
        kind_code INTEGER NOT NULL,
        kind TEXT NOT NULL,
        reason TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        yes_votes INTEGER NOT NULL,
        no_votes INTEGER NOT NULL,
        expected_votes INTEGER NOT NULL,
        eligible_voters TEXT NOT NULL,
        status TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS proposals_by_proposer ON proposals (proposer, created_at)",
    "CREATE INDEX IF NOT EXISTS proposals_by_body ON proposals (body_id)",
    "CREATE TABLE IF NOT EXISTS votes (
        proposal_id INTEGER NOT NULL REFERENCES proposals (id),
        voter INTEGER NOT NULL,
        in_favor INTEGER NOT NULL,
        cast_at INTEGER NOT NULL,
        UNIQUE (proposal_id, voter)
    )",
];

const INSERT_PROPOSAL: &str = "INSERT INTO proposals (
        proposer, body_id, kind_code, kind, reason, created_at,
        yes_votes, no_votes, expected_votes, eligible_voters, status
    ) SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?";

const UNLESS_RECENT: &str = " WHERE NOT EXISTS (
        SELECT 1 FROM proposals WHERE proposer = ? AND MAX(? - created_at, 0) < ?
    )";

/// SQLite implementation of every collaborator trait.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a database file and apply the schema.
    ///
    /// Several handles (or processes) may open the same file; WAL lets their
    /// reads proceed while one of them writes.
    pub async fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Backend(format!(
                        "Failed to create database directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database on one connection that is never recycled.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Register a citizen of a body.
    pub async fn add_citizen(&self, user: UserId, body: BodyId) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO citizens (user_id, body_id) VALUES (?, ?)
             ON CONFLICT (user_id) DO UPDATE SET body_id = excluded.body_id",
        )
        .bind(to_db(user.0)?)
        .bind(to_db(body.0)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Register a citizen and seat them in their body's congress.
    pub async fn add_member(&self, user: UserId, body: BodyId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for table in ["citizens", "congress_members"] {
            sqlx::query(&format!(
                "INSERT INTO {table} (user_id, body_id) VALUES (?, ?)
                 ON CONFLICT (user_id) DO UPDATE SET body_id = excluded.body_id"
            ))
            .bind(to_db(user.0)?)
            .bind(to_db(body.0)?)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Overwrite a treasury balance.
    pub async fn set_treasury(
        &self,
        body: BodyId,
        currency: &Currency,
        amount: Amount,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO treasury (body_id, currency, balance) VALUES (?, ?, ?)
             ON CONFLICT (body_id, currency) DO UPDATE SET balance = excluded.balance",
        )
        .bind(to_db(body.0)?)
        .bind(currency.as_str())
        .bind(amount_to_db(amount)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a proposal row, guarded by the proposer's cooldown if given.
    ///
    /// One statement, so the cooldown check and the insert cannot interleave
    /// with another writer. Returns `None` when the guard rejected the row.
    async fn write_proposal(
        &self,
        proposal: &Proposal,
        cooldown: Option<u64>,
    ) -> StoreResult<Option<ProposalId>> {
        let kind = serde_json::to_string(&proposal.kind).map_err(json_error)?;
        let eligible = serde_json::to_string(&proposal.eligible_voters).map_err(json_error)?;
        let sql = match cooldown {
            Some(_) => format!("{INSERT_PROPOSAL}{UNLESS_RECENT}"),
            None => INSERT_PROPOSAL.to_string(),
        };

        let mut query = sqlx::query(&sql)
            .bind(to_db(proposal.proposer.0)?)
            .bind(to_db(proposal.body.0)?)
            .bind(i64::from(proposal.kind.code()))
            .bind(kind)
            .bind(&proposal.reason)
            .bind(to_db(proposal.created_at)?)
            .bind(i64::from(proposal.yes_votes))
            .bind(i64::from(proposal.no_votes))
            .bind(i64::from(proposal.expected_votes))
            .bind(eligible)
            .bind(proposal.status.name());
        if let Some(cooldown) = cooldown {
            query = query
                .bind(to_db(proposal.proposer.0)?)
                .bind(to_db(proposal.created_at)?)
                .bind(to_db(cooldown)?);
        }

        let result = query.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(ProposalId(from_db(result.last_insert_rowid())?)))
    }

    /// Overwrite a personal wallet balance.
    pub async fn set_wallet(
        &self,
        user: UserId,
        currency: &Currency,
        amount: Amount,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO wallets (user_id, currency, balance) VALUES (?, ?, ?)
             ON CONFLICT (user_id, currency) DO UPDATE SET balance = excluded.balance",
        )
        .bind(to_db(user.0)?)
        .bind(currency.as_str())
        .bind(amount_to_db(amount)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn to_db(value: u64) -> StoreResult<i64> {
    i64::try_from(value).map_err(|_| StoreError::Overflow)
}

fn from_db(value: i64) -> StoreResult<u64> {
    u64::try_from(value).map_err(|_| StoreError::Backend(format!("negative id: {}", value)))
}

fn amount_to_db(amount: Amount) -> StoreResult<i64> {
    to_db(amount.minor())
}

fn amount_from_db(value: i64) -> StoreResult<Amount> {
    u64::try_from(value)
        .map(Amount::from_minor)
        .map_err(|_| StoreError::Backend(format!("negative balance: {}", value)))
}

fn count_from_db(value: i64) -> StoreResult<u32> {
    u32::try_from(value).map_err(|_| StoreError::Backend(format!("invalid vote count: {}", value)))
}

fn json_error(e: serde_json::Error) -> StoreError {
    StoreError::Backend(format!("JSON column: {}", e))
}

fn proposal_from_row(row: &SqliteRow) -> StoreResult<Proposal> {
    let kind: String = row.try_get("kind")?;
    let eligible: String = row.try_get("eligible_voters")?;
    let status: String = row.try_get("status")?;

    Ok(Proposal {
        id: ProposalId(from_db(row.try_get("id")?)?),
        proposer: UserId(from_db(row.try_get("proposer")?)?),
        body: BodyId(from_db(row.try_get("body_id")?)?),
        kind: serde_json::from_str(&kind).map_err(json_error)?,
        reason: row.try_get("reason")?,
        created_at: from_db(row.try_get("created_at")?)?,
        yes_votes: count_from_db(row.try_get("yes_votes")?)?,
        no_votes: count_from_db(row.try_get("no_votes")?)?,
        expected_votes: count_from_db(row.try_get("expected_votes")?)?,
        eligible_voters: serde_json::from_str(&eligible).map_err(json_error)?,
        status: status
            .parse()
            .map_err(|_| StoreError::Backend(format!("unknown status: {}", status)))?,
    })
}

fn vote_from_row(row: &SqliteRow) -> StoreResult<Vote> {
    Ok(Vote {
        proposal_id: ProposalId(from_db(row.try_get("proposal_id")?)?),
        voter: UserId(from_db(row.try_get("voter")?)?),
        in_favor: row.try_get("in_favor")?,
        cast_at: from_db(row.try_get("cast_at")?)?,
    })
}

#[async_trait]
impl IdentityProvider for SqliteStore {
    async fn body_of(&self, user: UserId) -> StoreResult<Option<BodyId>> {
        let row = sqlx::query("SELECT body_id FROM citizens WHERE user_id = ?")
            .bind(to_db(user.0)?)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| -> StoreResult<BodyId> { Ok(BodyId(from_db(r.try_get("body_id")?)?)) })
            .transpose()
    }
}

#[async_trait]
impl MembershipStore for SqliteStore {
    async fn members(&self, body: BodyId) -> StoreResult<Vec<UserId>> {
        let rows =
            sqlx::query("SELECT user_id FROM congress_members WHERE body_id = ? ORDER BY user_id")
                .bind(to_db(body.0)?)
                .fetch_all(&self.pool)
                .await?;
        rows.iter()
            .map(|r| -> StoreResult<UserId> { Ok(UserId(from_db(r.try_get("user_id")?)?)) })
            .collect()
    }

    async fn count_members(&self, body: BodyId) -> StoreResult<u32> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM congress_members WHERE body_id = ?")
            .bind(to_db(body.0)?)
            .fetch_one(&self.pool)
            .await?
            .try_get("n")?;
        count_from_db(count)
    }

    async fn is_member(&self, user: UserId, body: BodyId) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM congress_members WHERE user_id = ? AND body_id = ?")
            .bind(to_db(user.0)?)
            .bind(to_db(body.0)?)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn remove_member(&self, user: UserId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM congress_members WHERE user_id = ?")
            .bind(to_db(user.0)?)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RelationStore for SqliteStore {
    async fn has_relation(
        &self,
        body: BodyId,
        target: BodyId,
        kind: RelationKind,
    ) -> StoreResult<bool> {
        let row =
            sqlx::query("SELECT 1 FROM relations WHERE body_id = ? AND target_id = ? AND kind = ?")
                .bind(to_db(body.0)?)
                .bind(to_db(target.0)?)
                .bind(kind.name())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn create_relation(
        &self,
        body: BodyId,
        target: BodyId,
        kind: RelationKind,
    ) -> StoreResult<()> {
        sqlx::query("INSERT OR IGNORE INTO relations (body_id, target_id, kind) VALUES (?, ?, ?)")
            .bind(to_db(body.0)?)
            .bind(to_db(target.0)?)
            .bind(kind.name())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_relation(
        &self,
        body: BodyId,
        target: BodyId,
        kind: RelationKind,
    ) -> StoreResult<()> {
        sqlx::query("DELETE FROM relations WHERE body_id = ? AND target_id = ? AND kind = ?")
            .bind(to_db(body.0)?)
            .bind(to_db(target.0)?)
            .bind(kind.name())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TaxStore for SqliteStore {
    async fn set_rate(&self, body: BodyId, kind: TaxKind, rate: Amount) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO taxes (body_id, kind, rate) VALUES (?, ?, ?)
             ON CONFLICT (body_id, kind) DO UPDATE SET rate = excluded.rate",
        )
        .bind(to_db(body.0)?)
        .bind(kind.name())
        .bind(amount_to_db(rate)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn rate(&self, body: BodyId, kind: TaxKind) -> StoreResult<Option<Amount>> {
        let row = sqlx::query("SELECT rate FROM taxes WHERE body_id = ? AND kind = ?")
            .bind(to_db(body.0)?)
            .bind(kind.name())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| amount_from_db(r.try_get("rate")?)).transpose()
    }
}

#[async_trait]
impl TreasuryStore for SqliteStore {
    async fn balance(&self, body: BodyId, currency: &Currency) -> StoreResult<Amount> {
        let row = sqlx::query("SELECT balance FROM treasury WHERE body_id = ? AND currency = ?")
            .bind(to_db(body.0)?)
            .bind(currency.as_str())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(r) => amount_from_db(r.try_get("balance")?),
            None => Ok(Amount::ZERO),
        }
    }

    async fn debit(&self, body: BodyId, currency: &Currency, amount: Amount) -> StoreResult<()> {
        let amount = amount_to_db(amount)?;
        // Check and subtract in one statement.
        let result = sqlx::query(
            "UPDATE treasury SET balance = balance - ?
             WHERE body_id = ? AND currency = ? AND balance >= ?",
        )
        .bind(amount)
        .bind(to_db(body.0)?)
        .bind(currency.as_str())
        .bind(amount)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // A zero debit against an account that was never funded.
            if amount == 0 {
                return Ok(());
            }
            return Err(StoreError::InsufficientFunds);
        }
        Ok(())
    }

    async fn deposit(
        &self,
        body: BodyId,
        currency: &Currency,
        amount: Amount,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO treasury (body_id, currency, balance) VALUES (?, ?, ?)
             ON CONFLICT (body_id, currency) DO UPDATE SET balance = balance + excluded.balance",
        )
        .bind(to_db(body.0)?)
        .bind(currency.as_str())
        .bind(amount_to_db(amount)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl PersonalBalanceStore for SqliteStore {
    async fn credit(&self, user: UserId, currency: &Currency, amount: Amount) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO wallets (user_id, currency, balance) VALUES (?, ?, ?)
             ON CONFLICT (user_id, currency) DO UPDATE SET balance = balance + excluded.balance",
        )
        .bind(to_db(user.0)?)
        .bind(currency.as_str())
        .bind(amount_to_db(amount)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn wallet_balance(&self, user: UserId, currency: &Currency) -> StoreResult<Amount> {
        let row = sqlx::query("SELECT balance FROM wallets WHERE user_id = ? AND currency = ?")
            .bind(to_db(user.0)?)
            .bind(currency.as_str())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(r) => amount_from_db(r.try_get("balance")?),
            None => Ok(Amount::ZERO),
        }
    }
}

#[async_trait]
impl ProposalStore for SqliteStore {
    async fn insert_proposal(&self, proposal: Proposal) -> StoreResult<ProposalId> {
        self.write_proposal(&proposal, None)
            .await?
            .ok_or_else(|| StoreError::Backend("proposal insert wrote no row".to_string()))
    }

    async fn insert_throttled(
        &self,
        proposal: Proposal,
        cooldown: u64,
    ) -> StoreResult<ProposalId> {
        self.write_proposal(&proposal, Some(cooldown))
            .await?
            .ok_or(StoreError::Throttled)
    }

    async fn proposal(&self, id: ProposalId) -> StoreResult<Option<Proposal>> {
        let row = sqlx::query("SELECT * FROM proposals WHERE id = ?")
            .bind(to_db(id.0)?)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(proposal_from_row).transpose()
    }

    async fn update_proposal(&self, proposal: &Proposal) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE proposals SET yes_votes = ?, no_votes = ?, reason = ?, status = ?
             WHERE id = ?",
        )
        .bind(i64::from(proposal.yes_votes))
        .bind(i64::from(proposal.no_votes))
        .bind(&proposal.reason)
        .bind(proposal.status.name())
        .bind(to_db(proposal.id.0)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(proposal.id.to_string()));
        }
        Ok(())
    }

    async fn commit_vote(&self, vote: &Vote) -> StoreResult<Proposal> {
        let id = to_db(vote.proposal_id.0)?;
        let (yes, no) = if vote.in_favor { (1, 0) } else { (0, 1) };
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        // Only the vote that fills the tally moves the proposal to Finished.
        let row = sqlx::query(
            "UPDATE proposals SET
                yes_votes = yes_votes + ?,
                no_votes = no_votes + ?,
                status = CASE WHEN yes_votes + no_votes + 1 >= expected_votes
                    THEN ? ELSE status END
             WHERE id = ? AND status = ? AND yes_votes + no_votes < expected_votes
             RETURNING *",
        )
        .bind(yes)
        .bind(no)
        .bind(ProposalStatus::Finished.name())
        .bind(id)
        .bind(ProposalStatus::Open.name())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            let exists = sqlx::query("SELECT 1 FROM proposals WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match exists {
                Some(_) => StoreError::NotOpen(vote.proposal_id.to_string()),
                None => StoreError::NotFound(vote.proposal_id.to_string()),
            });
        };
        let stored = proposal_from_row(&row)?;

        let inserted = sqlx::query(
            "INSERT INTO votes (proposal_id, voter, in_favor, cast_at) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(to_db(vote.voter.0)?)
        .bind(vote.in_favor)
        .bind(to_db(vote.cast_at)?)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            // Dropping the transaction rolls back the tally increment.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(StoreError::DuplicateVote);
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await?;
        Ok(stored)
    }

    async fn retract_vote(&self, proposal: ProposalId, voter: UserId) -> StoreResult<Proposal> {
        let id = to_db(proposal.0)?;
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let deleted = sqlx::query(
            "DELETE FROM votes WHERE proposal_id = ? AND voter = ? RETURNING in_favor",
        )
        .bind(id)
        .bind(to_db(voter.0)?)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(deleted) = deleted else {
            return Err(StoreError::NotFound(format!(
                "vote of {} on {}",
                voter, proposal
            )));
        };
        let in_favor: bool = deleted.try_get("in_favor")?;
        let (yes, no) = if in_favor { (1, 0) } else { (0, 1) };

        let row = sqlx::query(
            "UPDATE proposals SET yes_votes = yes_votes - ?, no_votes = no_votes - ?, status = ?
             WHERE id = ? AND status = ?
             RETURNING *",
        )
        .bind(yes)
        .bind(no)
        .bind(ProposalStatus::Open.name())
        .bind(id)
        .bind(ProposalStatus::Finished.name())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Err(StoreError::NotOpen(proposal.to_string()));
        };
        let reopened = proposal_from_row(&row)?;

        tx.commit().await?;
        Ok(reopened)
    }

    async fn has_voted(&self, proposal: ProposalId, voter: UserId) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM votes WHERE proposal_id = ? AND voter = ?")
            .bind(to_db(proposal.0)?)
            .bind(to_db(voter.0)?)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn votes(&self, proposal: ProposalId) -> StoreResult<Vec<Vote>> {
        let rows = sqlx::query("SELECT * FROM votes WHERE proposal_id = ? ORDER BY rowid")
            .bind(to_db(proposal.0)?)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(vote_from_row).collect()
    }

    async fn last_proposal_at(&self, proposer: UserId) -> StoreResult<Option<u64>> {
        let latest: Option<i64> =
            sqlx::query("SELECT MAX(created_at) AS latest FROM proposals WHERE proposer = ?")
                .bind(to_db(proposer.0)?)
                .fetch_one(&self.pool)
                .await?
                .try_get("latest")?;
        latest.map(from_db).transpose()
    }

    async fn proposals(&self, body: BodyId) -> StoreResult<Vec<Proposal>> {
        let rows = sqlx::query("SELECT * FROM proposals WHERE body_id = ? ORDER BY id")
            .bind(to_db(body.0)?)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(proposal_from_row).collect()
    }
}
