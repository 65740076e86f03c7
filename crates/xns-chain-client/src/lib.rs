use async_trait::async_trait;
use futures::channel::mpsc::UnboundedReceiver;
use std::collections::HashMap;
use thiserror::Error;
use xns_types::{AddChainParams, ChainId, NetworkDescriptor, Receipt, TxHandle, WalletAddress, Wei};

/// EIP-1193 code for a request the user declined in the wallet UI.
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-3326 code for a switch to a chain the wallet does not know.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("no wallet provider installed")]
    NotInstalled,
    #[error("request rejected by user")]
    UserRejected,
    #[error("chain is not known to the wallet")]
    UnrecognizedChain,
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl ProviderError {
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        match code {
            USER_REJECTED_CODE => Self::UserRejected,
            UNRECOGNIZED_CHAIN_CODE => Self::UnrecognizedChain,
            _ => Self::Rpc {
                code,
                message: message.into(),
            },
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Chain ids pushed by the wallet whenever the user switches networks.
pub type ChainChanges = UnboundedReceiver<ChainId>;

/// Account and network authority, normally the browser-injected wallet.
///
/// Futures are not `Send`: the browser runs every provider call on the
/// page's single thread.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Prompts the user for account access.
    async fn request_accounts(&self) -> ProviderResult<Vec<WalletAddress>>;
    /// Accounts already authorized for this origin; never prompts.
    async fn authorized_accounts(&self) -> ProviderResult<Vec<WalletAddress>>;
    async fn chain_id(&self) -> ProviderResult<ChainId>;
    async fn switch_chain(&self, chain_id: &ChainId) -> ProviderResult<()>;
    async fn add_chain(&self, params: &AddChainParams) -> ProviderResult<()>;
    /// Subscribes to chain-change notifications.
    fn chain_changes(&self) -> ProviderResult<ChainChanges>;
}

/// Read/write surface of the name registry contract.
#[async_trait(?Send)]
pub trait NameContract {
    async fn register(
        &self,
        from: &WalletAddress,
        name: &str,
        payment: Wei,
    ) -> ProviderResult<TxHandle>;
    async fn set_record(
        &self,
        from: &WalletAddress,
        name: &str,
        record: &str,
    ) -> ProviderResult<TxHandle>;
    async fn wait_for_confirmation(&self, tx: &TxHandle) -> ProviderResult<Receipt>;
    async fn all_names(&self) -> ProviderResult<Vec<String>>;
    async fn record(&self, name: &str) -> ProviderResult<String>;
    async fn owner(&self, name: &str) -> ProviderResult<WalletAddress>;
}

/// Static lookup of known networks by chain id.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    networks: HashMap<ChainId, NetworkDescriptor>,
}

impl NetworkRegistry {
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for (id, name, symbol) in [
            ("0x1", "Mainnet", "ETH"),
            ("0x3", "Ropsten", "ETH"),
            ("0x4", "Rinkeby", "ETH"),
            ("0x5", "Goerli", "ETH"),
            ("0x2a", "Kovan", "ETH"),
            ("0x38", "BSC Mainnet", "BNB"),
            ("0x61", "BSC Testnet", "BNB"),
            ("0x89", "Polygon Mainnet", "MATIC"),
            ("0x13881", "Polygon Mumbai Testnet", "MATIC"),
            ("0xa86a", "AVAX Mainnet", "AVAX"),
        ] {
            registry.register(NetworkDescriptor {
                chain_id: ChainId::new(id),
                name: name.to_owned(),
                currency_symbol: symbol.to_owned(),
                allows_mutations: id == "0x13881",
            });
        }
        registry
    }

    pub fn register(&mut self, descriptor: NetworkDescriptor) {
        self.networks
            .insert(ChainId::new(&descriptor.chain_id.0), descriptor);
    }

    pub fn resolve(&self, chain_id: &ChainId) -> Option<&NetworkDescriptor> {
        self.networks.get(&ChainId::new(&chain_id.0))
    }

    /// The single network mutating operations are allowed on, if any.
    pub fn required(&self) -> Option<&NetworkDescriptor> {
        self.networks.values().find(|network| network.allows_mutations)
    }
}
