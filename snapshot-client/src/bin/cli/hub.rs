use crate::common::Common;
use color_eyre::Report;
use snapshot_client::{HubClient, VotesPage};
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Proposal {
    #[structopt(flatten)]
    common: Common,

    /// Proposal id
    #[structopt(long)]
    id: String,
}

impl Proposal {
    pub async fn exec(self) -> Result<(), Report> {
        let hub = HubClient::new(&self.common.config()?)?;
        let proposal = hub.get_proposal(&self.id).await?;
        self.common.write_output(&proposal)
    }
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Votes {
    #[structopt(flatten)]
    common: Common,

    /// Proposal id
    #[structopt(long)]
    id: String,

    /// Maximum number of votes to fetch
    #[structopt(long, default_value = "30000")]
    first: i64,

    /// Number of votes to skip, by descending voting power
    #[structopt(long, default_value = "0")]
    skip: i64,

    /// Only fetch the vote of this address
    #[structopt(long)]
    voter: Option<String>,
}

impl Votes {
    pub async fn exec(self) -> Result<(), Report> {
        let Votes {
            common,
            id,
            first,
            skip,
            voter,
        } = self;
        let hub = HubClient::new(&common.config()?)?;
        let votes = hub
            .get_proposal_votes(&id, VotesPage { first, skip, voter })
            .await?;
        common.write_output(&votes)
    }
}
