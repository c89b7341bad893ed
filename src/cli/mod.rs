use clap::{Parser, Subcommand};

pub mod config;
pub mod init;
pub mod list;
pub mod propose;
pub mod resign;
pub mod seed;
pub mod session;
pub mod show;
pub mod vote;

use config::CongressConfig;
use session::{config_path, init_logging};

#[derive(Parser)]
#[command(name = "congress")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Propose and vote on laws for legislative bodies", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.local/share/congress/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// User id to act as
    #[arg(long = "as", value_name = "USER", global = true)]
    pub as_user: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the config file and database schema
    Init {
        /// Database file to write into the generated config
        #[arg(long)]
        database: Option<String>,

        /// Rewrite an existing config file with this database path
        #[arg(long)]
        force: bool,
    },

    /// Submit a law proposal (kind by name or code 1-7)
    Propose {
        /// natural-enemy, mutual-protection-pact, work-tax, manager-tax,
        /// impeachment, transfer-funds, cease-fire
        kind: String,

        /// Why the law should pass
        #[arg(long)]
        reason: String,

        /// Other body (natural-enemy, mutual-protection-pact, cease-fire)
        #[arg(long)]
        target_body: Option<u64>,

        /// Member (impeachment, transfer-funds)
        #[arg(long)]
        member: Option<u64>,

        /// Tax rate or transfer amount, up to 2 decimals
        #[arg(long)]
        amount: Option<String>,

        /// Transfer currency
        #[arg(long)]
        currency: Option<String>,
    },

    /// Vote on an open proposal
    Vote {
        proposal: u64,

        #[arg(long, conflicts_with = "no")]
        yes: bool,

        #[arg(long)]
        no: bool,
    },

    /// Give up your congress seat
    Resign,

    /// Show a proposal and its votes
    Show {
        proposal: u64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List a body's proposals, most recent first
    List {
        /// Body to list (default: the body of --as)
        #[arg(long)]
        body: Option<u64>,

        /// open, finished, applied or rejected
        #[arg(long)]
        status: Option<String>,

        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Bootstrap external state (citizens, seats, funds)
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
pub enum SeedTarget {
    /// Register a citizen of a body
    Citizen {
        user: u64,

        #[arg(long)]
        body: u64,
    },

    /// Register a citizen and seat them in congress
    Member {
        user: u64,

        #[arg(long)]
        body: u64,
    },

    /// Set a body's treasury balance
    Treasury {
        body: u64,

        amount: String,

        #[arg(long, default_value = "gold")]
        currency: String,
    },

    /// Set a user's wallet balance
    Wallet {
        user: u64,

        amount: String,

        #[arg(long, default_value = "gold")]
        currency: String,
    },
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path(cli.config.as_deref());
    let config = match CongressConfig::load_or_default(&config_path) {
        Ok(config) => config,
        // `init --force` repairs an unreadable config file.
        Err(_) if matches!(cli.command, Commands::Init { force: true, .. }) => {
            CongressConfig::default()
        }
        Err(e) => return Err(e),
    };
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Init { database, force } => init::execute(&config_path, database, force).await,
        Commands::Propose {
            kind,
            reason,
            target_body,
            member,
            amount,
            currency,
        } => {
            let request = legislature::congress::ProposalRequest {
                kind,
                reason,
                target_body,
                member,
                amount,
                currency,
            };
            propose::execute(&config, cli.as_user, request).await
        }
        Commands::Vote { proposal, yes, no } => {
            vote::execute(&config, cli.as_user, proposal, yes, no).await
        }
        Commands::Resign => resign::execute(&config, cli.as_user).await,
        Commands::Show { proposal, json } => show::execute(&config, proposal, json).await,
        Commands::List {
            body,
            status,
            limit,
        } => list::execute(&config, cli.as_user, body, status, limit).await,
        Commands::Seed { target } => seed::execute(&config, target).await,
    }
}
