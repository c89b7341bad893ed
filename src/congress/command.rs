//! Building proposal drafts from raw request fields.
//!
//! Kinds are accepted by name (`work-tax`) or by law-type code (`3`):
//!
//! | code | name                     | required fields              |
//! |------|--------------------------|------------------------------|
//! | 1    | `natural-enemy`          | target body                  |
//! | 2    | `mutual-protection-pact` | target body                  |
//! | 3    | `work-tax`               | amount                       |
//! | 4    | `manager-tax`            | amount                       |
//! | 5    | `impeachment`            | member                       |
//! | 6    | `transfer-funds`         | member, amount, currency     |
//! | 7    | `cease-fire`             | target body                  |

use super::error::{CongressError, CongressResult};
use super::types::*;

/// Proposal request as it arrives from a caller, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposalRequest {
    pub kind: String,
    pub reason: String,
    pub target_body: Option<u64>,
    pub member: Option<u64>,
    pub amount: Option<String>,
    pub currency: Option<String>,
}

/// Kind selector without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindTag {
    NaturalEnemy,
    MutualProtectionPact,
    WorkTax,
    ManagerTax,
    Impeachment,
    TransferFunds,
    CeaseFire,
}

/// Parse a kind name or numeric law-type code.
pub fn parse_kind_tag(raw: &str) -> CongressResult<KindTag> {
    let tag = match raw.trim().to_lowercase().replace('_', "-").as_str() {
        "1" | "natural-enemy" => KindTag::NaturalEnemy,
        "2" | "mutual-protection-pact" => KindTag::MutualProtectionPact,
        "3" | "work-tax" => KindTag::WorkTax,
        "4" | "manager-tax" => KindTag::ManagerTax,
        "5" | "impeachment" => KindTag::Impeachment,
        "6" | "transfer-funds" => KindTag::TransferFunds,
        "7" | "cease-fire" => KindTag::CeaseFire,
        other => {
            return Err(CongressError::InvalidData(format!(
                "Unknown proposal type: {}",
                other
            )))
        }
    };
    Ok(tag)
}

impl ProposalRequest {
    /// Check required fields for the kind and build a draft.
    ///
    /// Only presence and format are checked here; state-dependent rules are
    /// the validator's job.
    pub fn into_draft(self) -> CongressResult<ProposalDraft> {
        let tag = parse_kind_tag(&self.kind)?;

        let kind = match tag {
            KindTag::NaturalEnemy => ProposalKind::NaturalEnemy {
                target_body: self.require_target_body("natural-enemy")?,
            },
            KindTag::MutualProtectionPact => ProposalKind::MutualProtectionPact {
                target_body: self.require_target_body("mutual-protection-pact")?,
            },
            KindTag::CeaseFire => ProposalKind::CeaseFire {
                target_body: self.require_target_body("cease-fire")?,
            },
            KindTag::WorkTax => ProposalKind::WorkTax {
                rate: self.require_amount("work-tax")?,
            },
            KindTag::ManagerTax => ProposalKind::ManagerTax {
                rate: self.require_amount("manager-tax")?,
            },
            KindTag::Impeachment => ProposalKind::Impeachment {
                target_member: self.require_member("impeachment")?,
            },
            KindTag::TransferFunds => {
                let currency = self
                    .currency
                    .as_deref()
                    .map(Currency::new)
                    .filter(|c| !c.as_str().is_empty())
                    .ok_or_else(|| missing("transfer-funds", "currency"))?;
                ProposalKind::TransferFunds {
                    target_member: self.require_member("transfer-funds")?,
                    amount: self.require_amount("transfer-funds")?,
                    currency,
                }
            }
        };

        Ok(ProposalDraft {
            kind,
            reason: self.reason,
        })
    }

    fn require_target_body(&self, kind: &str) -> CongressResult<BodyId> {
        match self.target_body {
            Some(id) if id > 0 => Ok(BodyId(id)),
            _ => Err(missing(kind, "target body")),
        }
    }

    fn require_member(&self, kind: &str) -> CongressResult<UserId> {
        match self.member {
            Some(id) if id > 0 => Ok(UserId(id)),
            _ => Err(missing(kind, "member")),
        }
    }

    fn require_amount(&self, kind: &str) -> CongressResult<Amount> {
        self.amount
            .as_deref()
            .ok_or_else(|| missing(kind, "amount"))?
            .parse()
    }
}

fn missing(kind: &str, field: &str) -> CongressError {
    CongressError::InvalidData(format!("{} proposals require a {}", kind, field))
}
