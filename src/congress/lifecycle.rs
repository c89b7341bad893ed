//! Proposal state machine.
//!
//! Open -> Finished happens inside `ProposalStore::commit_vote`, on the vote
//! that fills the stored tally, so exactly one caller sees it. That caller
//! hands the proposal to the `EffectApplier`. The outcome of the vote does
//! not gate application. If the effect could not be applied, the deciding
//! vote is withdrawn and the proposal reopens for that voter.

use super::error::{CongressError, CongressResult};
use super::executor::{ApplyError, EffectApplier};
use super::traits::CongressStore;
use super::types::*;
use tracing::{error, info, warn};

pub struct ProposalLifecycle<'a, S> {
    store: &'a S,
}

impl<'a, S: CongressStore> ProposalLifecycle<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Apply a proposal that `voter`'s vote just finished.
    ///
    /// Returns the proposal's status after the call. An application failure
    /// (including a detected fraud) is returned as an error.
    pub async fn after_vote(
        &self,
        proposal: Proposal,
        voter: UserId,
    ) -> CongressResult<ProposalStatus> {
        if proposal.status != ProposalStatus::Finished {
            return Ok(proposal.status);
        }

        let id = proposal.id;
        info!(
            proposal = %id,
            yes = proposal.yes_votes,
            no = proposal.no_votes,
            "voting finished"
        );

        match EffectApplier::new(self.store).apply(proposal).await {
            Ok(status) => Ok(status),
            Err(ApplyError::Settled(e)) => Err(e),
            Err(ApplyError::Unapplied(e)) => {
                self.withdraw(id, voter, &e).await;
                Err(e)
            }
        }
    }

    async fn withdraw(&self, id: ProposalId, voter: UserId, cause: &CongressError) {
        match self.store.retract_vote(id, voter).await {
            Ok(reopened) => warn!(
                proposal = %id,
                voter = %voter,
                yes = reopened.yes_votes,
                no = reopened.no_votes,
                error = %cause,
                "effect not applied, deciding vote withdrawn"
            ),
            Err(e) => error!(
                proposal = %id,
                voter = %voter,
                error = %e,
                "deciding vote could not be withdrawn, proposal left finished"
            ),
        }
    }
}

/// Move a proposal forward, rejecting any backward or skipping transition.
pub fn transition(proposal: &mut Proposal, next: ProposalStatus) -> CongressResult<()> {
    if !proposal.status.can_transition_to(next) {
        return Err(CongressError::InvalidData(format!(
            "{} cannot move from {} to {}",
            proposal.id,
            proposal.status.name(),
            next.name()
        )));
    }
    proposal.status = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congress::mock::MockCongressStore;
    use crate::congress::traits::{ProposalStore, TaxStore};

    async fn tax_proposal(store: &MockCongressStore) -> ProposalId {
        store
            .insert_proposal(Proposal {
                id: ProposalId(0),
                proposer: UserId(1),
                body: BodyId(1),
                kind: ProposalKind::ManagerTax {
                    rate: Amount::from_units(3),
                },
                reason: "balance the budget".to_string(),
                created_at: 0,
                yes_votes: 0,
                no_votes: 0,
                expected_votes: 3,
                eligible_voters: vec![UserId(1), UserId(2), UserId(3)],
                status: ProposalStatus::Open,
            })
            .await
            .unwrap()
    }

    async fn commit(store: &MockCongressStore, id: ProposalId, voter: u64, yes: bool) -> Proposal {
        store
            .commit_vote(&Vote {
                proposal_id: id,
                voter: UserId(voter),
                in_favor: yes,
                cast_at: 0,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_incomplete_tally_stays_open() {
        let store = MockCongressStore::new();
        let id = tax_proposal(&store).await;
        let proposal = commit(&store, id, 1, true).await;

        let status = ProposalLifecycle::new(&store)
            .after_vote(proposal, UserId(1))
            .await
            .unwrap();
        assert_eq!(status, ProposalStatus::Open);
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn test_complete_tally_applies_regardless_of_majority() {
        let store = MockCongressStore::new();
        let id = tax_proposal(&store).await;
        commit(&store, id, 1, false).await;
        commit(&store, id, 2, false).await;
        let proposal = commit(&store, id, 3, false).await;

        let status = ProposalLifecycle::new(&store)
            .after_vote(proposal, UserId(3))
            .await
            .unwrap();
        assert_eq!(status, ProposalStatus::Applied);
        assert_eq!(
            store.rate(BodyId(1), TaxKind::Manager).await.unwrap(),
            Some(Amount::from_units(3))
        );
        assert_eq!(
            store.proposal(id).await.unwrap().unwrap().status,
            ProposalStatus::Applied
        );
    }

    #[tokio::test]
    async fn test_failed_effect_withdraws_deciding_vote() {
        let store = MockCongressStore::new();
        let id = tax_proposal(&store).await;
        commit(&store, id, 1, true).await;
        commit(&store, id, 2, false).await;
        let proposal = commit(&store, id, 3, true).await;

        store.fail_rates(true);
        let result = ProposalLifecycle::new(&store)
            .after_vote(proposal, UserId(3))
            .await;
        assert!(matches!(result, Err(CongressError::Store(_))));

        let reopened = store.proposal(id).await.unwrap().unwrap();
        assert_eq!(reopened.status, ProposalStatus::Open);
        assert_eq!((reopened.yes_votes, reopened.no_votes), (1, 1));
        assert!(!store.has_voted(id, UserId(3)).await.unwrap());

        // The same voter decides it again once the store recovers.
        store.fail_rates(false);
        let proposal = commit(&store, id, 3, true).await;
        let status = ProposalLifecycle::new(&store)
            .after_vote(proposal, UserId(3))
            .await
            .unwrap();
        assert_eq!(status, ProposalStatus::Applied);
        assert_eq!(store.operation_count("set_rate"), 1);
    }

    #[test]
    fn test_transition_rejects_backward_moves() {
        let mut proposal = Proposal {
            id: ProposalId(1),
            proposer: UserId(1),
            body: BodyId(1),
            kind: ProposalKind::CeaseFire {
                target_body: BodyId(2),
            },
            reason: "peace".to_string(),
            created_at: 0,
            yes_votes: 0,
            no_votes: 0,
            expected_votes: 1,
            eligible_voters: vec![UserId(1)],
            status: ProposalStatus::Applied,
        };

        let result = transition(&mut proposal, ProposalStatus::Open);
        assert!(matches!(result, Err(CongressError::InvalidData(_))));
        assert_eq!(proposal.status, ProposalStatus::Applied);
    }
}
