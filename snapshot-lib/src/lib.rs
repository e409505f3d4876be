pub mod proposal;
pub mod utils;
pub mod vote;
pub mod voting;

pub use proposal::{Plugins, Proposal, ProposalState, Space, SpaceRef, Strategy};
pub use vote::{score_votes, Choice, ScoreMatrix, Vote};

pub type Address = String;

/// Block reference sent to the score API: either an explicit block number
/// or the chain head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotBlock {
    #[default]
    Latest,
    Number(u64),
}

impl serde::Serialize for SnapshotBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            SnapshotBlock::Latest => serializer.serialize_str("latest"),
            SnapshotBlock::Number(n) => serializer.serialize_u64(*n),
        }
    }
}

impl From<u64> for SnapshotBlock {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}
