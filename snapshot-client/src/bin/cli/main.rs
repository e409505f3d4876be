mod common;
mod hub;
mod score;
mod snap;

use color_eyre::Report;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum Cli {
    /// Fetch a proposal from the hub
    Proposal(hub::Proposal),
    /// Fetch the votes cast on a proposal
    Votes(hub::Votes),
    /// Score and tally the votes of a proposal
    Results(score::Results),
    /// Voting power of an address on a proposal
    Power(score::Power),
    /// Raw request to the score API
    Scores(score::Scores),
    /// Verifiable credentials held by the wallet snap
    Snap(snap::Snap),
}

impl Cli {
    pub async fn exec(self) -> Result<(), Report> {
        match self {
            Cli::Proposal(cmd) => cmd.exec().await,
            Cli::Votes(cmd) => cmd.exec().await,
            Cli::Results(cmd) => cmd.exec().await,
            Cli::Power(cmd) => cmd.exec().await,
            Cli::Scores(cmd) => cmd.exec().await,
            Cli::Snap(cmd) => cmd.exec().await,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Report> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    Cli::from_args().exec().await
}
