use reqwest::StatusCode;
use thiserror::Error;

/// Error reported by a JSON-RPC peer: the score API or a wallet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(StatusCode),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("hub query failed: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("score API error: {0}")]
    ScoreApi(RpcError),

    #[error("proposal {0} not found")]
    ProposalNotFound(String),

    #[error("space {0} not found")]
    SpaceNotFound(String),

    #[error(transparent)]
    InvalidSnapshot(#[from] snapshot_lib::proposal::Error),

    #[error(transparent)]
    Voting(#[from] snapshot_lib::voting::Error),

    #[error("wallet request failed: {0}")]
    Provider(RpcError),

    #[error("snap {0} is not installed")]
    SnapNotInstalled(String),
}

impl Error {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }
}
