use crate::error::RpcError;
use crate::Error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Request interface of an Ethereum wallet (EIP-1193).
#[async_trait]
pub trait EthereumProvider: Send + Sync {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, Error>;
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<JsonRpcError>,
}

/// Forwards wallet requests as JSON-RPC 2.0 calls to an HTTP endpoint.
pub struct HttpProvider {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpProvider {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }
}

fn into_result(response: JsonRpcResponse) -> Result<Value, Error> {
    match response.error {
        Some(JsonRpcError { code, message }) => Err(Error::Provider(RpcError { code, message })),
        None => Ok(response.result),
    }
}

#[async_trait]
impl EthereumProvider for HttpProvider {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!(id, method, "wallet request");
        let response = self
            .client
            .post(&self.url)
            .json(&JsonRpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<JsonRpcResponse>()
            .await?;
        into_result(response)
    }
}
