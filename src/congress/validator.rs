//! Submission-time validation.
//!
//! Checks run in this order: acting body and seat, reason, per-kind rules,
//! anti-spam throttle. The treasury check for fund transfers here is
//! advisory; the binding check happens when the proposal is applied.

use super::config::GovernanceConfig;
use super::error::{CongressError, CongressResult, StoreError};
use super::traits::CongressStore;
use super::types::*;
use tracing::{debug, info};

/// Validates drafts and records them as open proposals.
pub struct ProposalValidator<'a, S> {
    store: &'a S,
    config: &'a GovernanceConfig,
}

impl<'a, S: CongressStore> ProposalValidator<'a, S> {
    pub fn new(store: &'a S, config: &'a GovernanceConfig) -> Self {
        Self { store, config }
    }

    /// Validate a draft and create it as an open proposal.
    ///
    /// The body's roster is snapshotted at this point; its size becomes the
    /// proposal's `expected_votes` and is never recomputed.
    pub async fn submit(
        &self,
        actor: &Actor,
        draft: ProposalDraft,
        now: u64,
    ) -> CongressResult<ProposalId> {
        let body = self.validate(actor, &draft, now).await?;

        let eligible_voters = self.store.members(body).await?;
        let expected_votes = eligible_voters.len() as u32;

        let proposal = Proposal {
            id: ProposalId(0),
            proposer: actor.user,
            body,
            kind: draft.kind,
            reason: draft.reason.trim().to_string(),
            created_at: now,
            yes_votes: 0,
            no_votes: 0,
            expected_votes,
            eligible_voters,
            status: ProposalStatus::Open,
        };
        let kind = proposal.kind.name();

        let cooldown = self.config.proposal_cooldown.as_secs();
        let id = match self.store.insert_throttled(proposal, cooldown).await {
            Ok(id) => id,
            // Another submission by the same proposer landed first.
            Err(StoreError::Throttled) => {
                return Err(invalid(format!(
                    "{} proposed a law less than {}s ago",
                    actor.user, cooldown
                )));
            }
            Err(e) => return Err(e.into()),
        };
        info!(
            proposal = %id,
            proposer = %actor.user,
            body = %body,
            kind,
            expected_votes,
            "proposal submitted"
        );
        Ok(id)
    }

    /// Run every submission rule, returning the proposer's body.
    pub async fn validate(
        &self,
        actor: &Actor,
        draft: &ProposalDraft,
        now: u64,
    ) -> CongressResult<BodyId> {
        let body = actor.require_body()?;

        if !self.store.is_member(actor.user, body).await? {
            return Err(CongressError::AccessDenied(format!(
                "{} holds no seat in the congress of {}",
                actor.user, body
            )));
        }

        if draft.reason.trim().is_empty() {
            return Err(invalid("reason must not be empty"));
        }

        self.check_kind(body, &draft.kind).await?;
        self.check_throttle(actor.user, now).await?;

        Ok(body)
    }

    async fn check_kind(&self, body: BodyId, kind: &ProposalKind) -> CongressResult<()> {
        match kind {
            ProposalKind::NaturalEnemy { target_body } => {
                self.check_foreign(body, *target_body)?;
                if self
                    .store
                    .has_relation(body, *target_body, RelationKind::Ally)
                    .await?
                {
                    return Err(invalid(format!(
                        "{} is an ally of {} and cannot be declared an enemy",
                        target_body, body
                    )));
                }
            }
            ProposalKind::MutualProtectionPact { target_body } => {
                self.check_foreign(body, *target_body)?;
                if self
                    .store
                    .has_relation(body, *target_body, RelationKind::Enemy)
                    .await?
                {
                    return Err(invalid(format!(
                        "{} is an enemy of {} and cannot become an ally",
                        target_body, body
                    )));
                }
            }
            // Rates are non-negative by construction.
            ProposalKind::WorkTax { .. } | ProposalKind::ManagerTax { .. } => {}
            ProposalKind::Impeachment { target_member } => {
                if !self.store.is_member(*target_member, body).await? {
                    return Err(invalid(format!(
                        "{} is not a member of the congress of {}",
                        target_member, body
                    )));
                }
            }
            ProposalKind::TransferFunds {
                amount, currency, ..
            } => {
                if !self.config.accepts_currency(currency.as_str()) {
                    return Err(invalid(format!("unknown currency: {}", currency)));
                }
                let available = self.store.balance(body, currency).await?;
                if available < *amount {
                    return Err(invalid(format!(
                        "treasury of {} holds {} {}, cannot transfer {}",
                        body, available, currency, amount
                    )));
                }
            }
            ProposalKind::CeaseFire { .. } => {}
        }
        Ok(())
    }

    fn check_foreign(&self, body: BodyId, target: BodyId) -> CongressResult<()> {
        if body == target {
            return Err(invalid("a body cannot target itself"));
        }
        Ok(())
    }

    /// Reject if the proposer's latest proposal is younger than the cooldown.
    /// Exactly at the boundary the new proposal is accepted.
    async fn check_throttle(&self, proposer: UserId, now: u64) -> CongressResult<()> {
        let Some(last) = self.store.last_proposal_at(proposer).await? else {
            return Ok(());
        };

        let cooldown = self.config.proposal_cooldown.as_secs();
        let elapsed = now.saturating_sub(last);
        if elapsed < cooldown {
            return Err(invalid(format!(
                "{} proposed a law {}s ago; wait {}s before proposing again",
                proposer,
                elapsed,
                cooldown - elapsed
            )));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> CongressError {
    let msg = msg.into();
    debug!(reason = %msg, "proposal rejected");
    CongressError::InvalidData(msg)
}
