use serde::{Deserialize, Serialize};
use std::time::Duration;
use xns_types::{AddChainParams, ChainId, DomainRecord, NativeCurrency};

pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xDec18EbA48108a85363606348eab954A4F4Fef31";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub contract_address: String,
    /// Display-only suffix; never sent to the contract.
    pub tld: String,
    /// The one network mutations are allowed on, in `wallet_addEthereumChain` form.
    pub required_chain: AddChainParams,
    pub refresh_delay_ms: u64,
    pub receipt_poll_interval_ms: u64,
    pub marketplace_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_owned(),
            tld: ".exe".to_owned(),
            required_chain: mumbai(),
            refresh_delay_ms: 2_000,
            receipt_poll_interval_ms: 1_500,
            marketplace_base_url: "https://testnets.opensea.io/assets/mumbai".to_owned(),
        }
    }
}

fn mumbai() -> AddChainParams {
    AddChainParams {
        chain_id: ChainId::new("0x13881"),
        chain_name: "Polygon Mumbai Testnet".to_owned(),
        rpc_urls: vec!["https://rpc-mumbai.maticvigil.com/".to_owned()],
        native_currency: NativeCurrency {
            name: "Mumbai Matic".to_owned(),
            symbol: "MATIC".to_owned(),
            decimals: 18,
        },
        block_explorer_urls: vec!["https://mumbai.polygonscan.com/".to_owned()],
    }
}

impl ClientConfig {
    /// Defaults overridden by `XNS_CONTRACT_ADDRESS` and `XNS_REFRESH_DELAY_MS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(address) = std::env::var("XNS_CONTRACT_ADDRESS") {
            if !address.trim().is_empty() {
                config.contract_address = address.trim().to_owned();
            }
        }
        if let Some(delay) = std::env::var("XNS_REFRESH_DELAY_MS")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
        {
            config.refresh_delay_ms = delay;
        }
        config
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        self.required_chain
            .block_explorer_urls
            .first()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
    }

    pub fn marketplace_url(&self, record: &DomainRecord) -> String {
        format!(
            "{}/{}/{}",
            self.marketplace_base_url.trim_end_matches('/'),
            self.contract_address,
            record.id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xns_types::WalletAddress;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{ "tld": ".dev", "refresh_delay_ms": 0 }"#).unwrap();
        assert_eq!(config.tld, ".dev");
        assert_eq!(config.refresh_delay(), Duration::ZERO);
        assert_eq!(config.contract_address, DEFAULT_CONTRACT_ADDRESS);
        assert_eq!(config.required_chain.chain_id, ChainId::new("0x13881"));
    }

    #[test]
    fn overridden_chain_id_is_normalized() {
        let config: ClientConfig = serde_json::from_str(
            r#"{ "required_chain": {
                "chainId": "0X013881",
                "chainName": "Polygon Mumbai Testnet",
                "rpcUrls": ["https://rpc-mumbai.maticvigil.com/"],
                "nativeCurrency": { "name": "Mumbai Matic", "symbol": "MATIC", "decimals": 18 },
                "blockExplorerUrls": ["https://mumbai.polygonscan.com/"]
            } }"#,
        )
        .unwrap();
        assert_eq!(config.required_chain.chain_id, ChainId::new("0x13881"));
        assert_eq!(config.required_chain.chain_id.0, "0x13881");

        let padded: ChainId = serde_json::from_str(r#""0x013881""#).unwrap();
        assert_eq!(padded, ChainId::new("0x13881"));
    }

    #[test]
    fn links_are_built_from_config() {
        let config = ClientConfig::default();
        assert_eq!(
            config.explorer_tx_url("0xabc").as_deref(),
            Some("https://mumbai.polygonscan.com/tx/0xabc")
        );

        let record = DomainRecord {
            id: 4,
            name: "tiger".to_owned(),
            record: String::new(),
            owner: WalletAddress("0x01".to_owned()),
        };
        assert_eq!(
            config.marketplace_url(&record),
            format!("https://testnets.opensea.io/assets/mumbai/{DEFAULT_CONTRACT_ADDRESS}/4")
        );
    }
}
