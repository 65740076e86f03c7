use std::fmt;
use thiserror::Error;
use xns_chain_client::ProviderError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Domain is required")]
    EmptyDomain,
    #[error("Domain must be at least {min} characters long")]
    DomainTooShort { min: usize, len: usize },
    #[error("Record is required")]
    EmptyRecord,
}

/// Which transaction of the mint sequence a receipt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
    Registration,
    Record,
}

impl fmt::Display for TxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStage::Registration => f.write_str("registration"),
            TxStage::Record => f.write_str("record"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("no wallet provider available")]
    ProviderAbsent,
    #[error("request was rejected in the wallet")]
    AuthorizationDenied,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{stage} transaction {tx_hash} failed on chain")]
    ChainRejected { stage: TxStage, tx_hash: String },
    #[error("the wallet does not know the required chain")]
    UnknownChain,
    #[error("{0}")]
    Transport(String),
    #[error("no account connected")]
    NotConnected,
    #[error("wallet is not on the required network")]
    WrongNetwork,
    #[error("another transaction is already in progress")]
    Busy,
    #[error("network changed while the operation was pending")]
    Invalidated,
}

impl From<ProviderError> for ControllerError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotInstalled => Self::ProviderAbsent,
            ProviderError::UserRejected => Self::AuthorizationDenied,
            ProviderError::UnrecognizedChain => Self::UnknownChain,
            ProviderError::Rpc { .. } | ProviderError::Transport(_) | ProviderError::Decode(_) => {
                Self::Transport(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_map_to_taxonomy() {
        assert_eq!(
            ControllerError::from(ProviderError::NotInstalled),
            ControllerError::ProviderAbsent
        );
        assert_eq!(
            ControllerError::from(ProviderError::from_rpc(4001, "User denied")),
            ControllerError::AuthorizationDenied
        );
        assert_eq!(
            ControllerError::from(ProviderError::UnrecognizedChain),
            ControllerError::UnknownChain
        );
        assert!(matches!(
            ControllerError::from(ProviderError::from_rpc(-32000, "execution reverted")),
            ControllerError::Transport(message) if message.contains("execution reverted")
        ));
    }
}
