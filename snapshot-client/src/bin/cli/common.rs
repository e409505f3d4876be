use color_eyre::Report;
use serde::{de::DeserializeOwned, Serialize};
use snapshot_client::ClientConfig;
use std::io::Write;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Common {
    /// JSON file with the client configuration
    #[structopt(long)]
    config: Option<PathBuf>,

    /// GraphQL endpoint of the hub
    #[structopt(long, env = "HUB_URL")]
    hub_url: Option<String>,

    /// Base URL of the score API
    #[structopt(long, env = "SCORES_URL")]
    scores_url: Option<String>,

    /// File to write the JSON output to, stdout if missing
    #[structopt(long)]
    output: Option<PathBuf>,
}

impl Common {
    pub fn config(&self) -> Result<ClientConfig, Report> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };
        if let Some(hub_url) = &self.hub_url {
            config.hub_url = hub_url.clone();
        }
        if let Some(scores_url) = &self.scores_url {
            config.scores_url = scores_url.clone();
        }
        Ok(config)
    }

    pub fn write_output<T: Serialize>(&self, value: &T) -> Result<(), Report> {
        match &self.output {
            Some(path) => {
                let file = std::fs::File::create(path)?;
                serde_json::to_writer_pretty(file, value)?;
            }
            None => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                serde_json::to_writer_pretty(&mut handle, value)?;
                writeln!(handle)?;
            }
        }
        Ok(())
    }
}

pub fn read_json<T: DeserializeOwned>(path: &PathBuf) -> Result<T, Report> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}
