use color_eyre::Report;
use serde_json::{json, Value};
use snapshot_client::snap::SnapConfig;
use snapshot_client::{HttpProvider, SnapClient};
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Snap {
    /// JSON-RPC endpoint of the wallet
    #[structopt(long, env = "WALLET_URL")]
    wallet_url: String,

    /// Snap to talk to, the SSI snap if missing
    #[structopt(long)]
    snap_id: Option<String>,

    /// DID the presentations are issued for
    #[structopt(long)]
    domain: Option<String>,

    #[structopt(long)]
    challenge: Option<String>,

    #[structopt(subcommand)]
    command: SnapCommand,
}

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub enum SnapCommand {
    /// Whether the snap is installed, optionally at a given version
    Status {
        #[structopt(long)]
        version: Option<String>,
    },
    /// Ask the wallet to install the snap
    Install,
    /// List the verifiable credentials held by the snap
    Vcs,
    /// Verifiable presentation of a credential
    Vp {
        #[structopt(long, default_value = "0")]
        index: u64,
    },
}

impl Snap {
    pub async fn exec(self) -> Result<(), Report> {
        let Snap {
            wallet_url,
            snap_id,
            domain,
            challenge,
            command,
        } = self;
        let defaults = SnapConfig::default();
        let provider = HttpProvider::new(reqwest::Client::new(), &wallet_url);
        let client = SnapClient::with_config(
            provider,
            SnapConfig {
                snap_id: snap_id.unwrap_or(defaults.snap_id),
                domain: domain.unwrap_or(defaults.domain),
                challenge: challenge.unwrap_or(defaults.challenge),
            },
        );

        let output = match command {
            SnapCommand::Status { version } => {
                let installed = client
                    .is_snap_installed(client.snap_id(), version.as_deref())
                    .await?;
                json!({ "installed": installed })
            }
            SnapCommand::Install => json!({ "installed": client.install_snap().await? }),
            SnapCommand::Vcs => {
                client.require_snap().await?;
                Value::Array(client.get_vcs().await?)
            }
            SnapCommand::Vp { index } => {
                client.require_snap().await?;
                client.get_vp(index).await?
            }
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
