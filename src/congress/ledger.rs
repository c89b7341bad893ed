//! Vote ledger: one vote per voter per proposal.
//!
//! The checks below give precise errors; the binding ones are repeated by
//! `ProposalStore::commit_vote`, which writes the vote record and the tally
//! increment as one unit against the stored tally.

use super::error::{CongressError, CongressResult, StoreError};
use super::traits::ProposalStore;
use super::types::*;
use tracing::info;

pub struct VoteLedger<'a, S> {
    store: &'a S,
}

impl<'a, S: ProposalStore> VoteLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Record a vote and return the proposal as stored after it.
    pub async fn cast(
        &self,
        actor: &Actor,
        proposal_id: ProposalId,
        in_favor: bool,
        now: u64,
    ) -> CongressResult<Proposal> {
        let proposal = self
            .store
            .proposal(proposal_id)
            .await?
            .ok_or_else(|| CongressError::NotFound(proposal_id.to_string()))?;

        // Members may only vote on their own body's laws.
        if actor.require_body()? != proposal.body {
            return Err(CongressError::InvalidData(format!(
                "{} belongs to {}, not to the voter's body",
                proposal_id, proposal.body
            )));
        }

        if !proposal.is_eligible(actor.user) {
            return Err(CongressError::AccessDenied(format!(
                "{} was not seated when {} was submitted",
                actor.user, proposal_id
            )));
        }

        if proposal.status != ProposalStatus::Open {
            return Err(not_open(&proposal));
        }

        if self.store.has_voted(proposal_id, actor.user).await? {
            return Err(already_voted(actor.user, proposal_id));
        }

        if proposal.remaining_votes() == 0 {
            return Err(not_open(&proposal));
        }

        let vote = Vote {
            proposal_id,
            voter: actor.user,
            in_favor,
            cast_at: now,
        };

        let stored = match self.store.commit_vote(&vote).await {
            Ok(stored) => stored,
            Err(StoreError::DuplicateVote) => return Err(already_voted(actor.user, proposal_id)),
            // Closed by another writer since the read above.
            Err(StoreError::NotOpen(_)) => {
                let current = self.store.proposal(proposal_id).await?.unwrap_or(proposal);
                return Err(not_open(&current));
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            proposal = %proposal_id,
            voter = %actor.user,
            in_favor,
            yes = stored.yes_votes,
            no = stored.no_votes,
            expected = stored.expected_votes,
            "vote recorded"
        );

        Ok(stored)
    }
}

fn not_open(proposal: &Proposal) -> CongressError {
    if proposal.status == ProposalStatus::Open {
        return CongressError::InvalidData(format!(
            "{} already has all {} expected votes",
            proposal.id, proposal.expected_votes
        ));
    }
    CongressError::InvalidData(format!(
        "{} is {} and no longer accepts votes",
        proposal.id,
        proposal.status.name()
    ))
}

fn already_voted(voter: UserId, proposal_id: ProposalId) -> CongressError {
    CongressError::InvalidData(format!("{} already voted on {}", voter, proposal_id))
}
