//! Verifiable credentials held by the SSI snap, a plugin running inside the
//! user's wallet.

mod provider;

pub use provider::{EthereumProvider, HttpProvider};

use crate::Error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

pub const SNAP_ID: &str = "npm:@blockchain-lab-um/ssi-snap";
pub const DEFAULT_DOMAIN: &str =
    "did:ethr:rinkeby:0x0241abd662da06d0af2f0152a80bc037f65a7f901160cfe1eb35ef3f0c532a2a4d";
pub const DEFAULT_CHALLENGE: &str = "key123";

/// An entry of `wallet_getSnaps`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SnapPermission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_permissions: Option<HashMap<String, Value>>,
}

pub type WalletSnaps = HashMap<String, SnapPermission>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapConfig {
    pub snap_id: String,
    /// DID the presentations are issued for.
    pub domain: String,
    pub challenge: String,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            snap_id: SNAP_ID.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            challenge: DEFAULT_CHALLENGE.to_string(),
        }
    }
}

pub struct SnapClient<P> {
    provider: P,
    config: SnapConfig,
}

impl<P: EthereumProvider> SnapClient<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, SnapConfig::default())
    }

    pub fn with_config(provider: P, config: SnapConfig) -> Self {
        Self { provider, config }
    }

    pub fn snap_id(&self) -> &str {
        &self.config.snap_id
    }

    pub async fn get_wallet_snaps(&self) -> Result<WalletSnaps, Error> {
        let snaps = self.provider.request("wallet_getSnaps", None).await?;
        debug!(%snaps, "installed snaps");
        Ok(serde_json::from_value(snaps)?)
    }

    /// Whether a snap with id `origin`, and the given version if any, is installed.
    pub async fn is_snap_installed(
        &self,
        origin: &str,
        version: Option<&str>,
    ) -> Result<bool, Error> {
        Ok(self.get_wallet_snaps().await?.values().any(|permission| {
            permission.id.as_deref() == Some(origin)
                && version.map_or(true, |v| permission.version.as_deref() == Some(v))
        }))
    }

    pub async fn require_snap(&self) -> Result<(), Error> {
        if self.is_snap_installed(self.snap_id(), None).await? {
            Ok(())
        } else {
            Err(Error::SnapNotInstalled(self.snap_id().to_string()))
        }
    }

    /// Asks the wallet to install the latest version of the snap.
    #[instrument(skip(self), fields(snap = %self.config.snap_id))]
    pub async fn install_snap(&self) -> Result<bool, Error> {
        let snap_id = self.snap_id();
        let response = self
            .provider
            .request(
                "wallet_enable",
                Some(json!([{ "wallet_snap": { snap_id: { "version": "latest" } } }])),
            )
            .await?;

        let installed = response
            .get("snaps")
            .and_then(|snaps| snaps.get(snap_id))
            .is_some();
        if installed {
            info!("snap installed");
        }
        Ok(installed)
    }

    async fn invoke(&self, request: Value) -> Result<Value, Error> {
        let response = self
            .provider
            .request(
                "wallet_invokeSnap",
                Some(json!([self.snap_id(), request])),
            )
            .await?;
        match response {
            Value::Object(mut fields) => fields
                .remove("data")
                .ok_or_else(|| Error::malformed("snap response without data")),
            _ => Err(Error::malformed("snap response is not an object")),
        }
    }

    /// Verifiable credentials stored in the snap.
    pub async fn get_vcs(&self) -> Result<Vec<Value>, Error> {
        match self.invoke(json!({ "method": "getVCs" })).await? {
            Value::Array(vcs) => Ok(vcs),
            _ => Err(Error::malformed("getVCs data is not a list")),
        }
    }

    /// Verifiable presentation of the credential at `index`.
    pub async fn get_vp(&self, index: u64) -> Result<Value, Error> {
        // TODO: select the credential by id once the snap supports it
        self.invoke(json!({
            "method": "getVP",
            "params": [index, self.config.domain, self.config.challenge]
        }))
        .await
    }
}
