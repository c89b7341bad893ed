//! Core governance types.
//!
//! Proposal kinds are a closed set of tagged variants, each carrying only the
//! payload it needs. Amounts are fixed-point and non-negative by construction.

use super::error::{CongressError, CongressResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Citizen identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Governing body (country) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

/// Proposal identifier, assigned by the proposal store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProposalId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user#{}", self.0)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proposal#{}", self.0)
    }
}

/// Number of minor units in one whole unit (two fractional digits).
pub const MINOR_UNITS: u64 = 100;

/// Non-negative fixed-point decimal with two fractional digits.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Amount from minor units (hundredths).
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Amount from whole units. Saturates on overflow.
    pub const fn from_units(units: u64) -> Self {
        Self(units.saturating_mul(MINOR_UNITS))
    }

    pub const fn minor(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / MINOR_UNITS, self.0 % MINOR_UNITS)
    }
}

impl FromStr for Amount {
    type Err = CongressError;

    /// Parse "12", "12.5" or "12.50". Negative, empty and over-precise
    /// values are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CongressError::InvalidData(format!("Invalid amount: {:?}", s));
        let s = s.trim();

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if s.ends_with('.') {
            return Err(invalid());
        }

        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let frac: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        whole
            .checked_mul(MINOR_UNITS)
            .and_then(|minor| minor.checked_add(frac))
            .map(Amount)
            .ok_or_else(invalid)
    }
}

/// Currency identifier, normalized to lowercase.
///
/// Membership in the configured currency set is checked at submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Taxes a body can set by law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxKind {
    Work,
    Manager,
}

impl TaxKind {
    pub fn name(&self) -> &'static str {
        match self {
            TaxKind::Work => "work",
            TaxKind::Manager => "manager",
        }
    }
}

/// Diplomatic relation from one body towards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Ally,
    Enemy,
}

impl RelationKind {
    pub fn name(&self) -> &'static str {
        match self {
            RelationKind::Ally => "ally",
            RelationKind::Enemy => "enemy",
        }
    }
}

/// Proposal types with their payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProposalKind {
    /// Declare another body a natural enemy.
    NaturalEnemy { target_body: BodyId },
    /// Sign a mutual protection pact with another body.
    MutualProtectionPact { target_body: BodyId },
    /// Set the work tax rate.
    WorkTax { rate: Amount },
    /// Set the manager tax rate.
    ManagerTax { rate: Amount },
    /// Remove a member from the body's roster.
    Impeachment { target_member: UserId },
    /// Move treasury funds to a citizen's personal balance.
    TransferFunds {
        target_member: UserId,
        amount: Amount,
        currency: Currency,
    },
    /// End an enemy relation.
    CeaseFire { target_body: BodyId },
}

impl ProposalKind {
    /// Numeric law-type code (1..=7), stable across storage backends.
    pub fn code(&self) -> u8 {
        match self {
            ProposalKind::NaturalEnemy { .. } => 1,
            ProposalKind::MutualProtectionPact { .. } => 2,
            ProposalKind::WorkTax { .. } => 3,
            ProposalKind::ManagerTax { .. } => 4,
            ProposalKind::Impeachment { .. } => 5,
            ProposalKind::TransferFunds { .. } => 6,
            ProposalKind::CeaseFire { .. } => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProposalKind::NaturalEnemy { .. } => "natural-enemy",
            ProposalKind::MutualProtectionPact { .. } => "mutual-protection-pact",
            ProposalKind::WorkTax { .. } => "work-tax",
            ProposalKind::ManagerTax { .. } => "manager-tax",
            ProposalKind::Impeachment { .. } => "impeachment",
            ProposalKind::TransferFunds { .. } => "transfer-funds",
            ProposalKind::CeaseFire { .. } => "cease-fire",
        }
    }

    pub fn target_body(&self) -> Option<BodyId> {
        match self {
            ProposalKind::NaturalEnemy { target_body }
            | ProposalKind::MutualProtectionPact { target_body }
            | ProposalKind::CeaseFire { target_body } => Some(*target_body),
            _ => None,
        }
    }

    pub fn target_member(&self) -> Option<UserId> {
        match self {
            ProposalKind::Impeachment { target_member }
            | ProposalKind::TransferFunds { target_member, .. } => Some(*target_member),
            _ => None,
        }
    }
}

/// Proposal lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Open,
    Finished,
    Applied,
    Rejected,
}

impl ProposalStatus {
    /// Forward-only transitions: Open -> Finished -> {Applied, Rejected}.
    pub fn can_transition_to(&self, next: ProposalStatus) -> bool {
        matches!(
            (self, next),
            (ProposalStatus::Open, ProposalStatus::Finished)
                | (ProposalStatus::Finished, ProposalStatus::Applied)
                | (ProposalStatus::Finished, ProposalStatus::Rejected)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalStatus::Applied | ProposalStatus::Rejected)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProposalStatus::Open => "open",
            ProposalStatus::Finished => "finished",
            ProposalStatus::Applied => "applied",
            ProposalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ProposalStatus {
    type Err = CongressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ProposalStatus::Open),
            "finished" => Ok(ProposalStatus::Finished),
            "applied" => Ok(ProposalStatus::Applied),
            "rejected" => Ok(ProposalStatus::Rejected),
            other => Err(CongressError::InvalidData(format!(
                "Unknown proposal status: {}",
                other
            ))),
        }
    }
}

/// A law proposal and its running tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: UserId,
    pub body: BodyId,
    pub kind: ProposalKind,
    pub reason: String,
    /// Unix timestamp (seconds).
    pub created_at: u64,
    pub yes_votes: u32,
    pub no_votes: u32,
    /// Roster size at creation. Never recomputed.
    pub expected_votes: u32,
    /// Roster snapshot taken at creation.
    pub eligible_voters: Vec<UserId>,
    pub status: ProposalStatus,
}

impl Proposal {
    pub fn total_votes(&self) -> u32 {
        self.yes_votes + self.no_votes
    }

    pub fn remaining_votes(&self) -> u32 {
        self.expected_votes.saturating_sub(self.total_votes())
    }

    /// Every eligible voter has cast a vote.
    pub fn tally_complete(&self) -> bool {
        self.total_votes() == self.expected_votes
    }

    pub fn is_eligible(&self, voter: UserId) -> bool {
        self.eligible_voters.contains(&voter)
    }
}

/// Immutable record of one member's vote on one proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub voter: UserId,
    pub in_favor: bool,
    pub cast_at: u64,
}

/// Validated proposal content, before it is assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalDraft {
    pub kind: ProposalKind,
    pub reason: String,
}

/// Tally after a successful vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyDelta {
    pub proposal_id: ProposalId,
    pub in_favor: bool,
    pub yes_votes: u32,
    pub no_votes: u32,
    pub expected_votes: u32,
    pub status: ProposalStatus,
}

/// The acting citizen and the body they currently belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user: UserId,
    pub body: Option<BodyId>,
}

impl Actor {
    pub fn new(user: UserId, body: Option<BodyId>) -> Self {
        Self { user, body }
    }

    /// The actor's body, or `AccessDenied` if they belong to none.
    pub fn require_body(&self) -> CongressResult<BodyId> {
        self.body.ok_or_else(|| {
            CongressError::AccessDenied(format!("{} does not belong to a governing body", self.user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parse_whole_and_fractional() {
        assert_eq!("12".parse::<Amount>().unwrap(), Amount::from_minor(1200));
        assert_eq!("12.5".parse::<Amount>().unwrap(), Amount::from_minor(1250));
        assert_eq!("0.05".parse::<Amount>().unwrap(), Amount::from_minor(5));
        assert_eq!(" 7 ".parse::<Amount>().unwrap(), Amount::from_units(7));
    }

    #[test]
    fn test_amount_parse_rejects_negative_and_malformed() {
        for raw in ["-1", "", ".5", "5.", "1.234", "abc", "1e3", "+3"] {
            let result = raw.parse::<Amount>();
            assert!(
                matches!(result, Err(CongressError::InvalidData(_))),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::from_minor(1250).to_string(), "12.50");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_amount_checked_sub_underflow() {
        assert_eq!(Amount::from_units(1).checked_sub(Amount::from_units(2)), None);
        assert_eq!(
            Amount::from_units(3).checked_sub(Amount::from_units(2)),
            Some(Amount::from_units(1))
        );
    }

    #[test]
    fn test_currency_normalized() {
        assert_eq!(Currency::new("  GOLD "), Currency::new("gold"));
        assert_eq!(Currency::new("Gold").as_str(), "gold");
    }

    #[test]
    fn test_status_transitions_forward_only() {
        use ProposalStatus::*;

        assert!(Open.can_transition_to(Finished));
        assert!(Finished.can_transition_to(Applied));
        assert!(Finished.can_transition_to(Rejected));

        assert!(!Open.can_transition_to(Applied));
        assert!(!Finished.can_transition_to(Open));
        assert!(!Applied.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Finished));
    }

    #[test]
    fn test_kind_codes_are_stable() {
        let kinds = [
            ProposalKind::NaturalEnemy {
                target_body: BodyId(2),
            },
            ProposalKind::MutualProtectionPact {
                target_body: BodyId(2),
            },
            ProposalKind::WorkTax {
                rate: Amount::ZERO,
            },
            ProposalKind::ManagerTax {
                rate: Amount::ZERO,
            },
            ProposalKind::Impeachment {
                target_member: UserId(1),
            },
            ProposalKind::TransferFunds {
                target_member: UserId(1),
                amount: Amount::ZERO,
                currency: Currency::new("gold"),
            },
            ProposalKind::CeaseFire {
                target_body: BodyId(2),
            },
        ];

        let codes: Vec<u8> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_actor_without_body_is_denied() {
        let actor = Actor::new(UserId(1), None);
        assert!(matches!(
            actor.require_body(),
            Err(CongressError::AccessDenied(_))
        ));
    }

    #[test]
    fn test_proposal_kind_serializes_tagged() {
        let kind = ProposalKind::WorkTax {
            rate: Amount::from_units(5),
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains("\"type\":\"work_tax\""));
        let back: ProposalKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }
}
