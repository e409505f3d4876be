use crate::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_HUB_URL: &str = "https://hub.snapshot.org/graphql";
pub const FALLBACK_SCORES_URL: &str = "https://score.snapshot.org";
const SCORES_API_PATH: &str = "/api/scores";

/// Base URL of the score API, fixed at build time through `SCORES_URL`.
pub fn default_scores_url() -> String {
    option_env!("SCORES_URL")
        .filter(|url| !url.is_empty())
        .unwrap_or(FALLBACK_SCORES_URL)
        .to_string()
}

fn default_hub_url() -> String {
    DEFAULT_HUB_URL.to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default = "default_hub_url")]
    pub hub_url: String,
    /// Base URL of the score API, without the `/api/scores` path.
    #[serde(default = "default_scores_url")]
    pub scores_url: String,
    /// Credential issuer forwarded to the score API, if any.
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hub_url: default_hub_url(),
            scores_url: default_scores_url(),
            issuer: None,
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn scores_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.scores_url.trim_end_matches('/'),
            SCORES_API_PATH
        )
    }

    pub fn http_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }
}
