use super::config::CongressConfig;
use super::session::{acting, open_engine};

/// Give up the `--as` user's congress seat
///
/// Open proposals keep their roster snapshot; the resigned member can still
/// vote on proposals created while they were seated.
pub async fn execute(
    config: &CongressConfig,
    as_user: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(config).await?;
    let actor = acting(&engine, as_user).await?;
    engine.resign_membership(&actor).await?;

    println!("{} resigned from congress", actor.user);
    Ok(())
}
