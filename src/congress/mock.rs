//! In-memory collaborator store for testing.
//!
//! Implements every collaborator trait behind a single mutex, so each trait
//! call is atomic with respect to every other call.

use super::error::{StoreError, StoreResult};
use super::traits::*;
use super::types::*;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory store implementing all collaborator traits.
#[derive(Clone, Default)]
pub struct MockCongressStore {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    citizens: HashMap<UserId, BodyId>,
    rosters: HashMap<BodyId, BTreeSet<UserId>>,
    relations: HashSet<(BodyId, BodyId, RelationKind)>,
    taxes: HashMap<(BodyId, TaxKind), Amount>,
    treasury: HashMap<(BodyId, Currency), Amount>,
    wallets: HashMap<(UserId, Currency), Amount>,
    proposals: BTreeMap<ProposalId, Proposal>,
    votes: HashMap<ProposalId, Vec<Vote>>,
    next_proposal_id: u64,
    /// Mutations of external state, in order, for exactly-once assertions.
    operations: Vec<String>,
    fail_credits: bool,
    fail_rates: bool,
    fail_updates: bool,
}

impl MockCongressStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only means another test thread panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a citizen of a body without a congress seat.
    pub fn add_citizen(&self, user: UserId, body: BodyId) {
        self.lock().citizens.insert(user, body);
    }

    /// Register a citizen and seat them in the body's congress.
    pub fn add_member(&self, user: UserId, body: BodyId) {
        let mut state = self.lock();
        state.citizens.insert(user, body);
        state.rosters.entry(body).or_default().insert(user);
    }

    pub fn set_treasury(&self, body: BodyId, currency: &Currency, amount: Amount) {
        self.lock().treasury.insert((body, currency.clone()), amount);
    }

    pub fn add_relation(&self, body: BodyId, target: BodyId, kind: RelationKind) {
        self.lock().relations.insert((body, target, kind));
    }

    /// Make every subsequent `credit` call fail with a backend error.
    pub fn fail_credits(&self, fail: bool) {
        self.lock().fail_credits = fail;
    }

    /// Make every subsequent `set_rate` call fail with a backend error.
    pub fn fail_rates(&self, fail: bool) {
        self.lock().fail_rates = fail;
    }

    /// Make every subsequent `update_proposal` call fail with a backend
    /// error. Vote commits and retractions are unaffected.
    pub fn fail_updates(&self, fail: bool) {
        self.lock().fail_updates = fail;
    }

    /// External-state mutations performed so far.
    pub fn operations(&self) -> Vec<String> {
        self.lock().operations.clone()
    }

    /// Number of recorded mutations starting with `prefix`.
    pub fn operation_count(&self, prefix: &str) -> usize {
        self.lock()
            .operations
            .iter()
            .filter(|op| op.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl IdentityProvider for MockCongressStore {
    async fn body_of(&self, user: UserId) -> StoreResult<Option<BodyId>> {
        Ok(self.lock().citizens.get(&user).copied())
    }
}

#[async_trait]
impl MembershipStore for MockCongressStore {
    async fn members(&self, body: BodyId) -> StoreResult<Vec<UserId>> {
        Ok(self
            .lock()
            .rosters
            .get(&body)
            .map(|roster| roster.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn is_member(&self, user: UserId, body: BodyId) -> StoreResult<bool> {
        Ok(self
            .lock()
            .rosters
            .get(&body)
            .is_some_and(|roster| roster.contains(&user)))
    }

    async fn remove_member(&self, user: UserId) -> StoreResult<bool> {
        let mut state = self.lock();
        let mut removed = false;
        for roster in state.rosters.values_mut() {
            removed |= roster.remove(&user);
        }
        if removed {
            state.operations.push(format!("remove_member {}", user));
        }
        Ok(removed)
    }
}

#[async_trait]
impl RelationStore for MockCongressStore {
    async fn has_relation(
        &self,
        body: BodyId,
        target: BodyId,
        kind: RelationKind,
    ) -> StoreResult<bool> {
        Ok(self.lock().relations.contains(&(body, target, kind)))
    }

    async fn create_relation(
        &self,
        body: BodyId,
        target: BodyId,
        kind: RelationKind,
    ) -> StoreResult<()> {
        let mut state = self.lock();
        state.relations.insert((body, target, kind));
        state.operations.push(format!(
            "create_relation {} {} {}",
            body,
            target,
            kind.name()
        ));
        Ok(())
    }

    async fn delete_relation(
        &self,
        body: BodyId,
        target: BodyId,
        kind: RelationKind,
    ) -> StoreResult<()> {
        let mut state = self.lock();
        state.relations.remove(&(body, target, kind));
        state.operations.push(format!(
            "delete_relation {} {} {}",
            body,
            target,
            kind.name()
        ));
        Ok(())
    }
}

#[async_trait]
impl TaxStore for MockCongressStore {
    async fn set_rate(&self, body: BodyId, kind: TaxKind, rate: Amount) -> StoreResult<()> {
        let mut state = self.lock();
        if state.fail_rates {
            return Err(StoreError::Backend("tax store unavailable".to_string()));
        }
        state.taxes.insert((body, kind), rate);
        state
            .operations
            .push(format!("set_rate {} {} {}", body, kind.name(), rate));
        Ok(())
    }

    async fn rate(&self, body: BodyId, kind: TaxKind) -> StoreResult<Option<Amount>> {
        Ok(self.lock().taxes.get(&(body, kind)).copied())
    }
}

#[async_trait]
impl TreasuryStore for MockCongressStore {
    async fn balance(&self, body: BodyId, currency: &Currency) -> StoreResult<Amount> {
        Ok(self
            .lock()
            .treasury
            .get(&(body, currency.clone()))
            .copied()
            .unwrap_or(Amount::ZERO))
    }

    async fn debit(&self, body: BodyId, currency: &Currency, amount: Amount) -> StoreResult<()> {
        let mut state = self.lock();
        let key = (body, currency.clone());
        let current = state.treasury.get(&key).copied().unwrap_or(Amount::ZERO);
        let remaining = current
            .checked_sub(amount)
            .ok_or(StoreError::InsufficientFunds)?;
        state.treasury.insert(key, remaining);
        state
            .operations
            .push(format!("debit {} {} {}", body, currency, amount));
        Ok(())
    }

    async fn deposit(
        &self,
        body: BodyId,
        currency: &Currency,
        amount: Amount,
    ) -> StoreResult<()> {
        let mut state = self.lock();
        let entry = state
            .treasury
            .entry((body, currency.clone()))
            .or_insert(Amount::ZERO);
        *entry = entry.checked_add(amount).ok_or(StoreError::Overflow)?;
        state
            .operations
            .push(format!("deposit {} {} {}", body, currency, amount));
        Ok(())
    }
}

#[async_trait]
impl PersonalBalanceStore for MockCongressStore {
    async fn credit(&self, user: UserId, currency: &Currency, amount: Amount) -> StoreResult<()> {
        let mut state = self.lock();
        if state.fail_credits {
            return Err(StoreError::Backend("wallet store unavailable".to_string()));
        }
        let entry = state
            .wallets
            .entry((user, currency.clone()))
            .or_insert(Amount::ZERO);
        *entry = entry.checked_add(amount).ok_or(StoreError::Overflow)?;
        state
            .operations
            .push(format!("credit {} {} {}", user, currency, amount));
        Ok(())
    }

    async fn wallet_balance(&self, user: UserId, currency: &Currency) -> StoreResult<Amount> {
        Ok(self
            .lock()
            .wallets
            .get(&(user, currency.clone()))
            .copied()
            .unwrap_or(Amount::ZERO))
    }
}

#[async_trait]
impl ProposalStore for MockCongressStore {
    async fn insert_proposal(&self, mut proposal: Proposal) -> StoreResult<ProposalId> {
        let mut state = self.lock();
        state.next_proposal_id += 1;
        let id = ProposalId(state.next_proposal_id);
        proposal.id = id;
        state.proposals.insert(id, proposal);
        Ok(id)
    }

    async fn insert_throttled(
        &self,
        proposal: Proposal,
        cooldown: u64,
    ) -> StoreResult<ProposalId> {
        let mut state = self.lock();
        let recent = state.proposals.values().any(|p| {
            p.proposer == proposal.proposer
                && proposal.created_at.saturating_sub(p.created_at) < cooldown
        });
        if recent {
            return Err(StoreError::Throttled);
        }
        state.next_proposal_id += 1;
        let id = ProposalId(state.next_proposal_id);
        state.proposals.insert(id, Proposal { id, ..proposal });
        Ok(id)
    }

    async fn proposal(&self, id: ProposalId) -> StoreResult<Option<Proposal>> {
        Ok(self.lock().proposals.get(&id).cloned())
    }

    async fn update_proposal(&self, proposal: &Proposal) -> StoreResult<()> {
        let mut state = self.lock();
        if state.fail_updates {
            return Err(StoreError::Backend("proposal store unavailable".to_string()));
        }
        let stored = state
            .proposals
            .get_mut(&proposal.id)
            .ok_or_else(|| StoreError::NotFound(proposal.id.to_string()))?;
        stored.yes_votes = proposal.yes_votes;
        stored.no_votes = proposal.no_votes;
        stored.reason = proposal.reason.clone();
        stored.status = proposal.status;
        Ok(())
    }

    async fn commit_vote(&self, vote: &Vote) -> StoreResult<Proposal> {
        let mut state = self.lock();
        let state = &mut *state;

        let stored = state
            .proposals
            .get_mut(&vote.proposal_id)
            .ok_or_else(|| StoreError::NotFound(vote.proposal_id.to_string()))?;
        if stored.status != ProposalStatus::Open || stored.remaining_votes() == 0 {
            return Err(StoreError::NotOpen(vote.proposal_id.to_string()));
        }

        let votes = state.votes.entry(vote.proposal_id).or_default();
        if votes.iter().any(|v| v.voter == vote.voter) {
            return Err(StoreError::DuplicateVote);
        }
        votes.push(vote.clone());

        if vote.in_favor {
            stored.yes_votes += 1;
        } else {
            stored.no_votes += 1;
        }
        if stored.tally_complete() {
            stored.status = ProposalStatus::Finished;
        }
        Ok(stored.clone())
    }

    async fn retract_vote(&self, proposal: ProposalId, voter: UserId) -> StoreResult<Proposal> {
        let mut state = self.lock();
        let state = &mut *state;

        let stored = state
            .proposals
            .get_mut(&proposal)
            .ok_or_else(|| StoreError::NotFound(proposal.to_string()))?;
        if stored.status != ProposalStatus::Finished {
            return Err(StoreError::NotOpen(proposal.to_string()));
        }

        let votes = state.votes.entry(proposal).or_default();
        let position = votes
            .iter()
            .position(|v| v.voter == voter)
            .ok_or_else(|| StoreError::NotFound(format!("vote of {} on {}", voter, proposal)))?;
        let withdrawn = votes.remove(position);

        if withdrawn.in_favor {
            stored.yes_votes = stored.yes_votes.saturating_sub(1);
        } else {
            stored.no_votes = stored.no_votes.saturating_sub(1);
        }
        stored.status = ProposalStatus::Open;
        Ok(stored.clone())
    }

    async fn has_voted(&self, proposal: ProposalId, voter: UserId) -> StoreResult<bool> {
        Ok(self
            .lock()
            .votes
            .get(&proposal)
            .is_some_and(|votes| votes.iter().any(|v| v.voter == voter)))
    }

    async fn votes(&self, proposal: ProposalId) -> StoreResult<Vec<Vote>> {
        Ok(self.lock().votes.get(&proposal).cloned().unwrap_or_default())
    }

    async fn last_proposal_at(&self, proposer: UserId) -> StoreResult<Option<u64>> {
        Ok(self
            .lock()
            .proposals
            .values()
            .filter(|p| p.proposer == proposer)
            .map(|p| p.created_at)
            .max())
    }

    async fn proposals(&self, body: BodyId) -> StoreResult<Vec<Proposal>> {
        Ok(self
            .lock()
            .proposals
            .values()
            .filter(|p| p.body == body)
            .cloned()
            .collect())
    }
}
