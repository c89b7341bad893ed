use super::config::CongressConfig;
use super::session::{acting, open_engine};
use legislature::congress::{ProposalId, ProposalStatus};

/// Cast a yes or no vote as the `--as` user
pub async fn execute(
    config: &CongressConfig,
    as_user: Option<u64>,
    proposal: u64,
    yes: bool,
    no: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let in_favor = ballot(yes, no)?;

    let engine = open_engine(config).await?;
    let actor = acting(&engine, as_user).await?;
    let delta = engine
        .cast_vote(&actor, ProposalId(proposal), in_favor)
        .await?;

    println!(
        "Voted {} on {}: {} yes, {} no of {}",
        if in_favor { "yes" } else { "no" },
        delta.proposal_id,
        delta.yes_votes,
        delta.no_votes,
        delta.expected_votes
    );
    if delta.status != ProposalStatus::Open {
        println!("Voting complete, proposal {}", delta.status.name());
    }
    Ok(())
}

fn ballot(yes: bool, no: bool) -> Result<bool, Box<dyn std::error::Error>> {
    match (yes, no) {
        (true, false) => Ok(true),
        (false, true) => Ok(false),
        _ => Err("Specify exactly one of --yes or --no".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ballot() {
        assert!(ballot(true, false).unwrap());
        assert!(!ballot(false, true).unwrap());
        assert!(ballot(false, false).is_err());
        assert!(ballot(true, true).is_err());
    }
}
