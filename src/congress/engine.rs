//! Request-handling entry points.
//!
//! `Congress` wires the validator, ledger, lifecycle and applier together.
//! Tally, completion and throttle are enforced by guarded store writes, which
//! hold across engines sharing one database. The engine also serializes its
//! own requests:
//! - one lock per proposal around vote recording, completion and application
//! - one lock per proposer around the throttle check and proposal insert

use super::audit::{query_proposals, ProposalQuery};
use super::config::GovernanceConfig;
use super::error::{CongressError, CongressResult};
use super::ledger::VoteLedger;
use super::lifecycle::ProposalLifecycle;
use super::locks::LockRegistry;
use super::traits::{Clock, CongressStore, SystemClock};
use super::types::*;
use super::validator::ProposalValidator;
use std::sync::Arc;
use tracing::info;

/// Governance engine for every body served by one store.
pub struct Congress<S> {
    store: Arc<S>,
    config: GovernanceConfig,
    clock: Arc<dyn Clock>,
    proposal_locks: LockRegistry<ProposalId>,
    proposer_locks: LockRegistry<UserId>,
}

impl<S: CongressStore> Congress<S> {
    pub fn new(store: Arc<S>, config: GovernanceConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, config: GovernanceConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
            proposal_locks: LockRegistry::new(),
            proposer_locks: LockRegistry::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Build the explicit acting context for a user.
    pub async fn actor(&self, user: UserId) -> CongressResult<Actor> {
        let body = self.store.body_of(user).await?;
        Ok(Actor::new(user, body))
    }

    /// Validate and open a proposal.
    pub async fn submit_proposal(
        &self,
        actor: &Actor,
        draft: ProposalDraft,
    ) -> CongressResult<ProposalId> {
        let _guard = self.proposer_locks.lock(actor.user).await;
        let now = self.clock.now();

        ProposalValidator::new(self.store.as_ref(), &self.config)
            .submit(actor, draft, now)
            .await
    }

    /// Cast a vote, finishing and applying the proposal if it was the last.
    ///
    /// When the deciding vote triggers a fraud rejection, the vote stays
    /// recorded and the error is returned to this caller. When the effect
    /// fails without changing anything, the vote is withdrawn and the error
    /// returned, so the voter can vote again.
    pub async fn cast_vote(
        &self,
        actor: &Actor,
        proposal_id: ProposalId,
        in_favor: bool,
    ) -> CongressResult<TallyDelta> {
        let _guard = self.proposal_locks.lock(proposal_id).await;
        let now = self.clock.now();

        let proposal = VoteLedger::new(self.store.as_ref())
            .cast(actor, proposal_id, in_favor, now)
            .await?;

        let (yes_votes, no_votes, expected_votes) = (
            proposal.yes_votes,
            proposal.no_votes,
            proposal.expected_votes,
        );

        let status = ProposalLifecycle::new(self.store.as_ref())
            .after_vote(proposal, actor.user)
            .await?;

        Ok(TallyDelta {
            proposal_id,
            in_favor,
            yes_votes,
            no_votes,
            expected_votes,
            status,
        })
    }

    /// Give up the actor's congress seat.
    pub async fn resign_membership(&self, actor: &Actor) -> CongressResult<()> {
        if !self.store.remove_member(actor.user).await? {
            return Err(CongressError::NotFound(format!(
                "{} holds no congress seat",
                actor.user
            )));
        }
        info!(user = %actor.user, "member resigned");
        Ok(())
    }

    pub async fn proposal(&self, id: ProposalId) -> CongressResult<Proposal> {
        self.store
            .proposal(id)
            .await?
            .ok_or_else(|| CongressError::NotFound(id.to_string()))
    }

    pub async fn votes(&self, id: ProposalId) -> CongressResult<Vec<Vote>> {
        // Distinguish "no votes yet" from "no such proposal".
        self.proposal(id).await?;
        Ok(self.store.votes(id).await?)
    }

    pub async fn proposals(&self, query: &ProposalQuery) -> CongressResult<Vec<Proposal>> {
        let all = self.store.proposals(query.body).await?;
        Ok(query_proposals(&all, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congress::mock::MockCongressStore;
    use crate::congress::traits::{ManualClock, MembershipStore};

    const HOME: BodyId = BodyId(1);

    fn congress(members: &[u64]) -> (Congress<MockCongressStore>, Arc<ManualClock>) {
        let store = MockCongressStore::new();
        for m in members {
            store.add_member(UserId(*m), HOME);
        }
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let engine = Congress::with_clock(
            Arc::new(store),
            GovernanceConfig::default(),
            clock.clone(),
        );
        (engine, clock)
    }

    fn work_tax(units: u64) -> ProposalDraft {
        ProposalDraft {
            kind: ProposalKind::WorkTax {
                rate: Amount::from_units(units),
            },
            reason: "fund the army".to_string(),
        }
    }

    #[tokio::test]
    async fn test_actor_resolution() {
        let (engine, _) = congress(&[1]);
        assert_eq!(engine.actor(UserId(1)).await.unwrap().body, Some(HOME));
        assert_eq!(engine.actor(UserId(99)).await.unwrap().body, None);
    }

    #[tokio::test]
    async fn test_vote_returns_tally_delta() {
        let (engine, clock) = congress(&[1, 2]);
        let alice = engine.actor(UserId(1)).await.unwrap();
        let bob = engine.actor(UserId(2)).await.unwrap();

        let id = engine.submit_proposal(&alice, work_tax(4)).await.unwrap();
        clock.advance(60);

        let first = engine.cast_vote(&alice, id, true).await.unwrap();
        assert_eq!(first.status, ProposalStatus::Open);
        assert_eq!((first.yes_votes, first.no_votes), (1, 0));

        let second = engine.cast_vote(&bob, id, false).await.unwrap();
        assert_eq!(second.status, ProposalStatus::Applied);
        assert_eq!((second.yes_votes, second.no_votes), (1, 1));
        assert_eq!(second.expected_votes, 2);

        let votes = engine.votes(id).await.unwrap();
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].cast_at, 1_700_000_060);
    }

    #[tokio::test]
    async fn test_resign() {
        let (engine, _) = congress(&[1, 2]);
        let alice = engine.actor(UserId(1)).await.unwrap();

        engine.resign_membership(&alice).await.unwrap();
        assert!(!engine.store().is_member(UserId(1), HOME).await.unwrap());

        let again = engine.resign_membership(&alice).await;
        assert!(matches!(again, Err(CongressError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_proposal_queries() {
        let (engine, _) = congress(&[1]);
        assert!(matches!(
            engine.proposal(ProposalId(5)).await,
            Err(CongressError::NotFound(_))
        ));
        assert!(matches!(
            engine.votes(ProposalId(5)).await,
            Err(CongressError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listing_by_body() {
        let (engine, clock) = congress(&[1, 2]);
        let alice = engine.actor(UserId(1)).await.unwrap();
        let bob = engine.actor(UserId(2)).await.unwrap();

        engine.submit_proposal(&alice, work_tax(1)).await.unwrap();
        clock.advance(10);
        let latest = engine.submit_proposal(&bob, work_tax(2)).await.unwrap();

        let listed = engine
            .proposals(&ProposalQuery::for_body(HOME))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, latest);
    }
}
