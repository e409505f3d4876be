use crate::common::{read_json, Common};
use color_eyre::Report;
use snapshot_client::{HubClient, ScoreClient, ScoreParams, VotesPage};
use snapshot_lib::voting::VotingRegistry;
use snapshot_lib::{SnapshotBlock, Strategy};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Results {
    #[structopt(flatten)]
    common: Common,

    /// Proposal id
    #[structopt(long)]
    id: String,
}

impl Results {
    pub async fn exec(self) -> Result<(), Report> {
        let config = self.common.config()?;
        let hub = HubClient::new(&config)?;
        let scores = ScoreClient::new(&config)?;

        let (proposal, votes) = futures::try_join!(
            hub.get_proposal(&self.id),
            hub.get_proposal_votes(&self.id, VotesPage::default())
        )?;
        let space = hub.get_space(&proposal.space.id).await?;
        info!(votes = votes.len(), "fetched proposal");

        let results = scores
            .get_results(&space, &proposal, votes, &VotingRegistry::default())
            .await?;
        self.common.write_output(&results)
    }
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Power {
    #[structopt(flatten)]
    common: Common,

    /// Proposal id
    #[structopt(long)]
    id: String,

    /// Voter address
    #[structopt(long)]
    address: String,

    /// Path to a json encoded verifiable presentation of the voter
    #[structopt(long)]
    vp: Option<PathBuf>,
}

impl Power {
    pub async fn exec(self) -> Result<(), Report> {
        let config = self.common.config()?;
        let hub = HubClient::new(&config)?;
        let scores = ScoreClient::new(&config)?;

        let vp = self.vp.as_ref().map(read_json::<serde_json::Value>).transpose()?;
        let proposal = hub.get_proposal(&self.id).await?;
        let space = hub.get_space(&proposal.space.id).await?;
        let power = scores
            .get_power(&space, &self.address, &proposal, vp)
            .await?;
        self.common.write_output(&power)
    }
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Scores {
    #[structopt(flatten)]
    common: Common,

    /// Space id
    #[structopt(long)]
    space: String,

    /// Chain id of the network the strategies are evaluated on
    #[structopt(long)]
    network: String,

    /// Path to a json encoded list of strategies
    #[structopt(long)]
    strategies: PathBuf,

    /// Block number, latest if missing
    #[structopt(long)]
    snapshot: Option<u64>,

    /// Addresses to score
    #[structopt(long, required = true)]
    addresses: Vec<String>,
}

impl Scores {
    pub async fn exec(self) -> Result<(), Report> {
        let config = self.common.config()?;
        let client = ScoreClient::new(&config)?;
        let strategies: Vec<Strategy> = read_json(&self.strategies)?;

        let params = ScoreParams {
            space: self.space.clone(),
            network: self.network.clone(),
            snapshot: self.snapshot.map(SnapshotBlock::from).unwrap_or_default(),
            strategies,
            vps: vec![serde_json::Value::Null; self.addresses.len()],
            addresses: self.addresses.clone(),
            issuer: config.issuer.clone(),
        };
        let scores = client.get_scores(&params).await?;
        self.common.write_output(&scores)
    }
}
