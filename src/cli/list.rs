use super::config::CongressConfig;
use super::session::{acting, open_engine};
use legislature::congress::audit::format_proposal_log;
use legislature::congress::{BodyId, ProposalQuery, ProposalStatus};

/// List a body's proposals, most recent first
///
/// The body is `--body` if given, otherwise the body of the `--as` user.
pub async fn execute(
    config: &CongressConfig,
    as_user: Option<u64>,
    body: Option<u64>,
    status: Option<String>,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(config).await?;

    let body = match body {
        Some(id) => BodyId(id),
        None => acting(&engine, as_user)
            .await?
            .require_body()
            .map_err(|_| "Pass --body, or --as a citizen of a body")?,
    };

    let status = status
        .map(|s| s.to_lowercase().parse::<ProposalStatus>())
        .transpose()?;

    let query = ProposalQuery {
        status,
        limit: Some(limit),
        ..ProposalQuery::for_body(body)
    };
    let proposals = engine.proposals(&query).await?;

    print!("{}", format_proposal_log(&proposals));
    Ok(())
}
