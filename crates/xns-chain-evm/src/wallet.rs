use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;
use xns_chain_client::{ChainChanges, ProviderError, ProviderResult, WalletProvider};
use xns_types::{AddChainParams, ChainId, WalletAddress};

use crate::{ChainEventSource, RpcTransport};

/// [`WalletProvider`] over the standard EIP-1193 request methods.
#[derive(Clone)]
pub struct Eip1193Wallet<T> {
    transport: T,
}

impl<T> Eip1193Wallet<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: RpcTransport> Eip1193Wallet<T> {
    async fn accounts(&self, method: &str) -> ProviderResult<Vec<WalletAddress>> {
        let value = self.transport.request(method, json!([])).await?;
        let accounts: Vec<String> = serde_json::from_value(value)
            .map_err(|err| ProviderError::Decode(format!("{method} result: {err}")))?;
        Ok(accounts.into_iter().map(WalletAddress).collect())
    }
}

#[async_trait(?Send)]
impl<T> WalletProvider for Eip1193Wallet<T>
where
    T: RpcTransport + ChainEventSource,
{
    async fn request_accounts(&self) -> ProviderResult<Vec<WalletAddress>> {
        self.accounts("eth_requestAccounts").await
    }

    async fn authorized_accounts(&self) -> ProviderResult<Vec<WalletAddress>> {
        self.accounts("eth_accounts").await
    }

    async fn chain_id(&self) -> ProviderResult<ChainId> {
        let value = self.transport.request("eth_chainId", json!([])).await?;
        match value {
            Value::String(raw) => Ok(ChainId::new(&raw)),
            other => Err(ProviderError::Decode(format!("eth_chainId result: {other}"))),
        }
    }

    async fn switch_chain(&self, chain_id: &ChainId) -> ProviderResult<()> {
        debug!("requesting switch to chain {chain_id}");
        self.transport
            .request("wallet_switchEthereumChain", json!([{ "chainId": chain_id.0 }]))
            .await?;
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> ProviderResult<()> {
        debug!("requesting wallet to add chain {}", params.chain_id);
        let params = serde_json::to_value(params)
            .map_err(|err| ProviderError::Decode(format!("add chain params: {err}")))?;
        self.transport
            .request("wallet_addEthereumChain", json!([params]))
            .await?;
        Ok(())
    }

    fn chain_changes(&self) -> ProviderResult<ChainChanges> {
        self.transport.chain_changes()
    }
}
