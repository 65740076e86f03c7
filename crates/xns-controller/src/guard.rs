//! Network guard: mutations are only offered on the required chain.

use tracing::info;
use xns_chain_client::{ProviderError, WalletProvider};
use xns_types::{AddChainParams, ChainId};

use crate::error::ControllerError;
use crate::session::{ActiveNetwork, Session};

/// True only on a known network that is both `required` and flagged for
/// mutations in the registry.
pub fn is_on_required_network(session: &Session, required: &ChainId) -> bool {
    matches!(
        &session.network,
        Some(ActiveNetwork::Known(network))
            if network.allows_mutations && network.chain_id == *required
    )
}

/// Asks the wallet to switch to `required`, adding the chain first when the
/// wallet does not know it.
pub async fn request_network_switch<W: WalletProvider>(
    wallet: &W,
    required: &AddChainParams,
) -> Result<(), ControllerError> {
    match wallet.switch_chain(&required.chain_id).await {
        Ok(()) => Ok(()),
        Err(ProviderError::UnrecognizedChain) => {
            info!(
                "wallet does not know {}, requesting it be added",
                required.chain_name
            );
            wallet.add_chain(required).await?;
            wallet.switch_chain(&required.chain_id).await?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
