//! Collaborator trait abstractions.
//!
//! The governance core reads and mutates external state only through these
//! traits. `MockCongressStore` implements all of them in memory for tests;
//! `SqliteStore` implements them on top of SQLite for the CLI.

use super::error::StoreResult;
use super::types::{
    Amount, BodyId, Currency, Proposal, ProposalId, RelationKind, TaxKind, UserId, Vote,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Resolves which governing body a citizen currently belongs to.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn body_of(&self, user: UserId) -> StoreResult<Option<BodyId>>;
}

/// Legislative roster of each body.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Current roster of a body.
    async fn members(&self, body: BodyId) -> StoreResult<Vec<UserId>>;

    async fn count_members(&self, body: BodyId) -> StoreResult<u32> {
        Ok(self.members(body).await?.len() as u32)
    }

    async fn is_member(&self, user: UserId, body: BodyId) -> StoreResult<bool>;

    /// Remove a user from whatever roster they are on.
    ///
    /// Returns `false` if the user was not on any roster.
    async fn remove_member(&self, user: UserId) -> StoreResult<bool>;
}

/// Directed diplomatic relations between bodies.
#[async_trait]
pub trait RelationStore: Send + Sync {
    async fn has_relation(
        &self,
        body: BodyId,
        target: BodyId,
        kind: RelationKind,
    ) -> StoreResult<bool>;

    async fn create_relation(
        &self,
        body: BodyId,
        target: BodyId,
        kind: RelationKind,
    ) -> StoreResult<()>;

    /// Delete a relation. Deleting an absent relation is a no-op.
    async fn delete_relation(
        &self,
        body: BodyId,
        target: BodyId,
        kind: RelationKind,
    ) -> StoreResult<()>;
}

/// Per-body tax rates.
#[async_trait]
pub trait TaxStore: Send + Sync {
    async fn set_rate(&self, body: BodyId, kind: TaxKind, rate: Amount) -> StoreResult<()>;

    async fn rate(&self, body: BodyId, kind: TaxKind) -> StoreResult<Option<Amount>>;
}

/// Per-body, per-currency treasury.
#[async_trait]
pub trait TreasuryStore: Send + Sync {
    async fn balance(&self, body: BodyId, currency: &Currency) -> StoreResult<Amount>;

    /// Atomically check the balance and subtract `amount`.
    ///
    /// Fails with `StoreError::InsufficientFunds` without mutating anything
    /// when the balance held at the moment of the call is below `amount`.
    async fn debit(&self, body: BodyId, currency: &Currency, amount: Amount) -> StoreResult<()>;

    async fn deposit(&self, body: BodyId, currency: &Currency, amount: Amount)
        -> StoreResult<()>;
}

/// Citizens' personal balances.
#[async_trait]
pub trait PersonalBalanceStore: Send + Sync {
    async fn credit(&self, user: UserId, currency: &Currency, amount: Amount) -> StoreResult<()>;

    async fn wallet_balance(&self, user: UserId, currency: &Currency) -> StoreResult<Amount>;
}

/// Persistence of proposals and their votes.
///
/// `insert_throttled`, `commit_vote` and `retract_vote` are each atomic
/// against every other writer of the same store, including other processes.
#[async_trait]
pub trait ProposalStore: Send + Sync {
    /// Insert a new proposal, assigning its id. The `id` field of the input
    /// is ignored.
    async fn insert_proposal(&self, proposal: Proposal) -> StoreResult<ProposalId>;

    /// Insert a new proposal unless its proposer already has one created
    /// less than `cooldown` seconds before `proposal.created_at`.
    ///
    /// Fails with `StoreError::Throttled` and writes nothing in that case.
    async fn insert_throttled(&self, proposal: Proposal, cooldown: u64)
        -> StoreResult<ProposalId>;

    async fn proposal(&self, id: ProposalId) -> StoreResult<Option<Proposal>>;

    /// Overwrite the mutable fields (tally, reason, status) of a proposal.
    async fn update_proposal(&self, proposal: &Proposal) -> StoreResult<()>;

    /// Record a vote and add it to the stored tally as one unit.
    ///
    /// The proposal must be Open with at least one vote outstanding,
    /// otherwise this fails with `StoreError::NotOpen`. The vote that fills
    /// the tally also moves the proposal to Finished. Returns the proposal
    /// as stored after the write. Fails with `StoreError::DuplicateVote` and
    /// writes nothing if the voter already voted on this proposal.
    async fn commit_vote(&self, vote: &Vote) -> StoreResult<Proposal>;

    /// Undo the vote that finished a proposal: delete it, take it off the
    /// tally and reopen the proposal.
    ///
    /// Only Finished proposals can be reopened (`StoreError::NotOpen`
    /// otherwise).
    async fn retract_vote(&self, proposal: ProposalId, voter: UserId) -> StoreResult<Proposal>;

    async fn has_voted(&self, proposal: ProposalId, voter: UserId) -> StoreResult<bool>;

    /// All votes on a proposal, in cast order.
    async fn votes(&self, proposal: ProposalId) -> StoreResult<Vec<Vote>>;

    /// Creation timestamp of the proposer's most recent proposal.
    async fn last_proposal_at(&self, proposer: UserId) -> StoreResult<Option<u64>>;

    /// All proposals of a body, oldest first.
    async fn proposals(&self, body: BodyId) -> StoreResult<Vec<Proposal>>;
}

/// Everything the governance engine needs from the outside world.
pub trait CongressStore:
    IdentityProvider
    + MembershipStore
    + RelationStore
    + TaxStore
    + TreasuryStore
    + PersonalBalanceStore
    + ProposalStore
{
}

impl<T> CongressStore for T where
    T: IdentityProvider
        + MembershipStore
        + RelationStore
        + TaxStore
        + TreasuryStore
        + PersonalBalanceStore
        + ProposalStore
{
}

/// Source of unix timestamps (seconds).
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Settable clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self(AtomicU64::new(now))
    }

    pub fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now(), 100);
        clock.advance(50);
        assert_eq!(clock.now(), 150);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800);
    }
}
