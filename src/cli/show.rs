use super::config::CongressConfig;
use super::session::open_engine;
use legislature::congress::audit::format_proposal_detail;
use legislature::congress::ProposalId;

/// Print one proposal with its vote record
pub async fn execute(
    config: &CongressConfig,
    proposal: u64,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(config).await?;
    let id = ProposalId(proposal);
    let proposal = engine.proposal(id).await?;
    let votes = engine.votes(id).await?;

    if json {
        let document = serde_json::json!({
            "proposal": proposal,
            "votes": votes,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print!("{}", format_proposal_detail(&proposal, &votes));
    }
    Ok(())
}
