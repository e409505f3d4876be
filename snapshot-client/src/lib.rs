pub mod config;
pub mod error;
pub mod hub;
pub mod score;
pub mod snap;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use error::Error;
pub use hub::{HubClient, VotesPage};
pub use score::{Power, ProposalResults, ScoreClient, ScoreParams};
pub use snap::{EthereumProvider, HttpProvider, SnapClient};
