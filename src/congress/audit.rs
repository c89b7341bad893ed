//! Proposal audit queries.
//!
//! Proposals and votes are never deleted, so the proposal store doubles as
//! an append-only audit log. Fraud-rejected transfers stay queryable with
//! their overwritten reason.

use super::types::*;

/// Filters for listing a body's proposals.
#[derive(Debug, Clone)]
pub struct ProposalQuery {
    pub body: BodyId,
    pub status: Option<ProposalStatus>,
    pub proposer: Option<UserId>,
    /// Most recent first.
    pub limit: Option<usize>,
}

impl ProposalQuery {
    pub fn for_body(body: BodyId) -> Self {
        Self {
            body,
            status: None,
            proposer: None,
            limit: Some(50),
        }
    }
}

/// Filter proposals, most recent first.
pub fn query_proposals(proposals: &[Proposal], query: &ProposalQuery) -> Vec<Proposal> {
    let mut filtered: Vec<Proposal> = proposals
        .iter()
        .filter(|p| p.body == query.body)
        .filter(|p| query.status.map_or(true, |s| p.status == s))
        .filter(|p| query.proposer.map_or(true, |u| p.proposer == u))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    if let Some(limit) = query.limit {
        filtered.truncate(limit);
    }

    filtered
}

/// One-line description of what a proposal would do.
pub fn describe_kind(kind: &ProposalKind) -> String {
    match kind {
        ProposalKind::NaturalEnemy { target_body } => format!("declare {} an enemy", target_body),
        ProposalKind::MutualProtectionPact { target_body } => {
            format!("mutual protection pact with {}", target_body)
        }
        ProposalKind::WorkTax { rate } => format!("set work tax to {}", rate),
        ProposalKind::ManagerTax { rate } => format!("set manager tax to {}", rate),
        ProposalKind::Impeachment { target_member } => format!("impeach {}", target_member),
        ProposalKind::TransferFunds {
            target_member,
            amount,
            currency,
        } => format!("transfer {} {} to {}", amount, currency, target_member),
        ProposalKind::CeaseFire { target_body } => format!("cease fire with {}", target_body),
    }
}

/// Format a proposal listing for the terminal.
pub fn format_proposal_log(proposals: &[Proposal]) -> String {
    if proposals.is_empty() {
        return "No proposals found.".to_string();
    }

    let mut output = String::new();
    for p in proposals {
        output.push_str(&format!(
            "#{:<5} {:<9} {:>3} yes {:>3} no / {:<3} {}\n       \"{}\"\n",
            p.id.0,
            p.status.name(),
            p.yes_votes,
            p.no_votes,
            p.expected_votes,
            describe_kind(&p.kind),
            p.reason
        ));
    }
    output
}

/// Format a single proposal with its vote record.
pub fn format_proposal_detail(proposal: &Proposal, votes: &[Vote]) -> String {
    let mut output = format!(
        "{} ({})\n  kind:     {}\n  body:     {}\n  proposer: {}\n  reason:   {}\n  created:  {}\n  tally:    {} yes, {} no, {} expected\n",
        proposal.id,
        proposal.status.name(),
        describe_kind(&proposal.kind),
        proposal.body,
        proposal.proposer,
        proposal.reason,
        proposal.created_at,
        proposal.yes_votes,
        proposal.no_votes,
        proposal.expected_votes,
    );

    if votes.is_empty() {
        output.push_str("  votes:    none\n");
    } else {
        output.push_str("  votes:\n");
        for vote in votes {
            output.push_str(&format!(
                "    {} {} at {}\n",
                vote.voter,
                if vote.in_favor { "yes" } else { "no" },
                vote.cast_at
            ));
        }
    }
    output
}
