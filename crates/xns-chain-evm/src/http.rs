use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use xns_chain_client::{ProviderError, ProviderResult};

use crate::RpcTransport;

pub const DEFAULT_RPC_URL: &str = "https://rpc-mumbai.maticvigil.com/";

/// JSON-RPC over HTTP against a public node.
///
/// Reads `XNS_RPC_URL` from environment at construction time
/// (default: the Mumbai public endpoint). Public nodes do not hold keys, so
/// only read calls are meaningful through this transport.
pub struct HttpTransport {
    endpoint: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpTransport {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("XNS_RPC_URL").ok())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        Self {
            endpoint,
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[async_trait(?Send)]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("rpc #{id} {method}");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await
            .map_err(|err| ProviderError::Transport(format!("{method} transport: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Transport(format!("{method} HTTP {status}: {text}")));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Decode(format!("{method} response: {err}")))?;

        if let Some(error) = body.error {
            return Err(ProviderError::from_rpc(error.code, error.message));
        }
        Ok(body.result.unwrap_or(Value::Null))
    }
}
