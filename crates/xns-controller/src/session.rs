//! Wallet session: which account is authorized and which network is active.

use tracing::{info, warn};
use xns_chain_client::{ChainChanges, NetworkRegistry, WalletProvider};
use xns_types::{ChainId, NetworkDescriptor, WalletAddress};

use crate::error::ControllerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveNetwork {
    Known(NetworkDescriptor),
    /// The wallet reported a chain id the registry has no entry for.
    Unresolved(ChainId),
}

impl ActiveNetwork {
    pub fn chain_id(&self) -> &ChainId {
        match self {
            ActiveNetwork::Known(network) => &network.chain_id,
            ActiveNetwork::Unresolved(chain_id) => chain_id,
        }
    }

    pub fn label(&self) -> String {
        match self {
            ActiveNetwork::Known(network) => network.name.clone(),
            ActiveNetwork::Unresolved(chain_id) => format!("Unknown network ({chain_id})"),
        }
    }
}

/// Empty on page load; `account` is only ever filled from the wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub account: Option<WalletAddress>,
    pub network: Option<ActiveNetwork>,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

/// Prompts once for account access and returns the first granted account.
pub async fn request_authorization<W: WalletProvider>(
    wallet: &W,
) -> Result<WalletAddress, ControllerError> {
    let accounts = wallet.request_accounts().await.map_err(|err| {
        warn!("account authorization failed: {err}");
        ControllerError::from(err)
    })?;

    let account = accounts
        .into_iter()
        .next()
        .ok_or(ControllerError::AuthorizationDenied)?;
    info!("connected {account}");
    Ok(account)
}

/// Looks for an account granted in an earlier visit. Never prompts.
pub async fn probe_existing<W: WalletProvider>(
    wallet: &W,
) -> Result<Option<WalletAddress>, ControllerError> {
    let account = wallet.authorized_accounts().await?.into_iter().next();
    match &account {
        Some(account) => info!("found an authorized account: {account}"),
        None => info!("no authorized account found"),
    }
    Ok(account)
}

pub fn resolve(chain_id: ChainId, networks: &NetworkRegistry) -> ActiveNetwork {
    match networks.resolve(&chain_id) {
        Some(network) => ActiveNetwork::Known(network.clone()),
        None => ActiveNetwork::Unresolved(chain_id),
    }
}

pub async fn resolve_network<W: WalletProvider>(
    wallet: &W,
    networks: &NetworkRegistry,
) -> Result<ActiveNetwork, ControllerError> {
    let chain_id = wallet.chain_id().await?;
    Ok(resolve(chain_id, networks))
}

pub fn subscribe_network_changes<W: WalletProvider>(
    wallet: &W,
) -> Result<ChainChanges, ControllerError> {
    Ok(wallet.chain_changes()?)
}
