//! Proposal execution logic.
//!
//! Applies finished proposals to external state. Each proposal is applied
//! exactly once: only the vote that moved it to Finished calls in, and this
//! module refuses anything that is not Finished. A failure reports whether
//! external state was left untouched, so the caller can reopen the vote.

use super::error::{CongressError, StoreError};
use super::lifecycle::transition;
use super::traits::CongressStore;
use super::types::*;
use tracing::{error, info, warn};

/// Reason recorded on transfers rejected by the application-time re-check.
pub const FRAUD_REASON: &str = "Fraud attempt";

/// Failed application of a finished proposal.
#[derive(Debug)]
pub enum ApplyError {
    /// No external state changed and the proposal is still Finished.
    Unapplied(CongressError),
    /// The outcome is settled (fraud rejection, or an effect that may have
    /// landed) and must not be applied again.
    Settled(CongressError),
}

impl ApplyError {
    pub fn into_inner(self) -> CongressError {
        match self {
            ApplyError::Unapplied(e) | ApplyError::Settled(e) => e,
        }
    }
}

fn unapplied(e: StoreError) -> ApplyError {
    ApplyError::Unapplied(e.into())
}

enum Transfer {
    Moved,
    Uncovered,
}

pub struct EffectApplier<'a, S> {
    store: &'a S,
}

impl<'a, S: CongressStore> EffectApplier<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Apply a finished proposal and record its terminal status.
    pub async fn apply(&self, mut proposal: Proposal) -> Result<ProposalStatus, ApplyError> {
        if proposal.status != ProposalStatus::Finished {
            return Err(ApplyError::Settled(CongressError::InvalidData(format!(
                "{} is {}, only finished proposals can be applied",
                proposal.id,
                proposal.status.name()
            ))));
        }

        let body = proposal.body;
        let kind = proposal.kind.clone();
        match &kind {
            ProposalKind::WorkTax { rate } => {
                self.store
                    .set_rate(body, TaxKind::Work, *rate)
                    .await
                    .map_err(unapplied)?;
            }
            ProposalKind::ManagerTax { rate } => {
                self.store
                    .set_rate(body, TaxKind::Manager, *rate)
                    .await
                    .map_err(unapplied)?;
            }
            ProposalKind::CeaseFire { target_body } => {
                self.store
                    .delete_relation(body, *target_body, RelationKind::Enemy)
                    .await
                    .map_err(unapplied)?;
            }
            ProposalKind::NaturalEnemy { target_body } => {
                self.store
                    .create_relation(body, *target_body, RelationKind::Enemy)
                    .await
                    .map_err(unapplied)?;
            }
            ProposalKind::MutualProtectionPact { target_body } => {
                self.store
                    .create_relation(body, *target_body, RelationKind::Ally)
                    .await
                    .map_err(unapplied)?;
            }
            ProposalKind::Impeachment { target_member } => {
                self.store
                    .remove_member(*target_member)
                    .await
                    .map_err(unapplied)?;
            }
            ProposalKind::TransferFunds {
                target_member,
                amount,
                currency,
            } => {
                let transfer = self
                    .transfer_funds(proposal.id, body, *target_member, *amount, currency)
                    .await?;
                if let Transfer::Uncovered = transfer {
                    return self.reject_as_fraud(proposal).await;
                }
            }
        }

        transition(&mut proposal, ProposalStatus::Applied).map_err(ApplyError::Settled)?;
        if let Err(e) = self.store.update_proposal(&proposal).await {
            error!(
                proposal = %proposal.id,
                error = %e,
                "effect applied but applied status not recorded"
            );
            return Err(ApplyError::Settled(e.into()));
        }
        info!(
            proposal = %proposal.id,
            kind = proposal.kind.name(),
            body = %body,
            "proposal applied"
        );
        Ok(ProposalStatus::Applied)
    }

    /// Move funds from the treasury to a citizen.
    ///
    /// The debit is the binding balance check: it fails atomically when the
    /// treasury no longer holds `amount`. A failed credit reverts the debit.
    async fn transfer_funds(
        &self,
        id: ProposalId,
        body: BodyId,
        target_member: UserId,
        amount: Amount,
        currency: &Currency,
    ) -> Result<Transfer, ApplyError> {
        match self.store.debit(body, currency, amount).await {
            Ok(()) => {}
            Err(StoreError::InsufficientFunds) => return Ok(Transfer::Uncovered),
            Err(e) => return Err(unapplied(e)),
        }

        if let Err(credit_err) = self.store.credit(target_member, currency, amount).await {
            warn!(
                proposal = %id,
                error = %credit_err,
                "credit failed, reverting treasury debit"
            );
            if let Err(refund_err) = self.store.deposit(body, currency, amount).await {
                error!(
                    proposal = %id,
                    body = %body,
                    currency = %currency,
                    amount = %amount,
                    error = %refund_err,
                    "treasury refund failed"
                );
                return Err(ApplyError::Settled(refund_err.into()));
            }
            return Err(unapplied(credit_err));
        }

        Ok(Transfer::Moved)
    }

    /// Force a transfer to a rejected outcome and report it to the caller.
    async fn reject_as_fraud(&self, mut proposal: Proposal) -> Result<ProposalStatus, ApplyError> {
        proposal.yes_votes = 0;
        proposal.no_votes = proposal.expected_votes;
        proposal.reason = FRAUD_REASON.to_string();
        transition(&mut proposal, ProposalStatus::Rejected).map_err(ApplyError::Settled)?;
        self.store
            .update_proposal(&proposal)
            .await
            .map_err(unapplied)?;

        warn!(
            proposal = %proposal.id,
            body = %proposal.body,
            "treasury no longer covers transfer, proposal rejected as fraud"
        );

        Err(ApplyError::Settled(CongressError::InvalidData(format!(
            "{} rejected: treasury funds were spent during the vote",
            proposal.id
        ))))
    }
}
