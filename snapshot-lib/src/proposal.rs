use crate::utils::serde::{deserialize_null_default, deserialize_skip_nulls};
use crate::SnapshotBlock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

const LEGACY_DAO_MODULE_PLUGIN: &str = "daoModule";
const SAFE_SNAP_PLUGIN: &str = "safeSnap";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid snapshot block reference {0:?}")]
    InvalidSnapshot(String),
}

/// A rule evaluated by the score API to turn an address into voting power.
/// The parameters are opaque to this crate.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Strategy {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default)]
    pub params: Value,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct SpaceRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Space {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, deserialize_with = "deserialize_skip_nulls")]
    pub strategies: Vec<Strategy>,
}

/// Lifecycle state reported by the hub. States are compared exactly; a
/// missing state is `Other("")`, which is not pending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProposalState {
    Pending,
    Active,
    Closed,
    Other(String),
}

impl ProposalState {
    pub fn as_str(&self) -> &str {
        match self {
            ProposalState::Pending => "pending",
            ProposalState::Active => "active",
            ProposalState::Closed => "closed",
            ProposalState::Other(state) => state,
        }
    }
}

impl Default for ProposalState {
    fn default() -> Self {
        ProposalState::Other(String::new())
    }
}

impl From<&str> for ProposalState {
    fn from(state: &str) -> Self {
        match state {
            "pending" => ProposalState::Pending,
            "active" => ProposalState::Active,
            "closed" => ProposalState::Closed,
            _ => ProposalState::Other(state.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ProposalState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let state: String = String::deserialize(deserializer)?;
        Ok(ProposalState::from(state.as_str()))
    }
}

impl Serialize for ProposalState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Plugin configuration attached to a proposal, keyed by plugin name.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(transparent)]
pub struct Plugins(pub Map<String, Value>);

impl Plugins {
    /// The Dao Module plugin has been renamed to SafeSnap; proposals created
    /// before the rename still carry the old key.
    pub fn rename_legacy(&mut self) {
        if let Some(dao_module) = self.0.remove(LEGACY_DAO_MODULE_PLUGIN) {
            self.0.insert(SAFE_SNAP_PLUGIN.to_string(), dao_module);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

impl From<Value> for Plugins {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Proposal {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub body: String,
    #[serde(default, deserialize_with = "deserialize_skip_nulls")]
    pub choices: Vec<String>,
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub end: i64,
    /// Block reference as delivered by the hub.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub snapshot: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub state: ProposalState,
    #[serde(rename = "type", default, deserialize_with = "deserialize_null_default")]
    pub voting_type: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub network: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub author: String,
    #[serde(default, deserialize_with = "deserialize_skip_nulls")]
    pub strategies: Vec<Strategy>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub plugins: Plugins,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub space: SpaceRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores_by_strategy: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<u64>,
}

impl Proposal {
    pub fn is_pending(&self) -> bool {
        self.state == ProposalState::Pending
    }

    pub fn snapshot_block(&self) -> Result<SnapshotBlock, Error> {
        self.snapshot
            .trim()
            .parse::<u64>()
            .map(SnapshotBlock::Number)
            .map_err(|_| Error::InvalidSnapshot(self.snapshot.clone()))
    }

    /// Strategies used to score this proposal: its own, or the space's when
    /// the proposal does not carry any.
    pub fn effective_strategies<'a>(&'a self, space: &'a Space) -> &'a [Strategy] {
        if self.strategies.is_empty() {
            &space.strategies
        } else {
            &self.strategies
        }
    }
}
