//! EVM adapter for the name registry.
//!
//! Both the wallet and the contract speak JSON-RPC through an
//! [`RpcTransport`]: in the browser that is the injected EIP-1193 provider,
//! natively it is an HTTP endpoint (feature `http`, read-only).

pub mod abi;
mod contract;
#[cfg(feature = "http")]
mod http;
mod wallet;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use xns_chain_client::{ChainChanges, ProviderResult};

pub use contract::DomainsContract;
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use wallet::Eip1193Wallet;

#[async_trait(?Send)]
pub trait RpcTransport {
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value>;
}

/// Transports that can push chain-change notifications.
pub trait ChainEventSource {
    fn chain_changes(&self) -> ProviderResult<ChainChanges>;
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn pause(interval: Duration) {
    gloo_timers::future::sleep(interval).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn pause(interval: Duration) {
    tokio::time::sleep(interval).await;
}
