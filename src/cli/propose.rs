use super::config::CongressConfig;
use super::session::{acting, open_engine};
use legislature::congress::audit::describe_kind;
use legislature::congress::ProposalRequest;

/// Submit a law proposal as the `--as` user
pub async fn execute(
    config: &CongressConfig,
    as_user: Option<u64>,
    request: ProposalRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(config).await?;
    let actor = acting(&engine, as_user).await?;

    let draft = request.into_draft()?;
    let id = engine.submit_proposal(&actor, draft).await?;
    let proposal = engine.proposal(id).await?;

    println!("Submitted {}: {}", id, describe_kind(&proposal.kind));
    println!(
        "Awaiting {} votes from {}",
        proposal.expected_votes, proposal.body
    );
    Ok(())
}
