use serde::{Deserialize, Serialize};
use std::fmt;

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;
const WEI_PER_FINNEY: u128 = 1_000_000_000_000_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    /// Addresses come back from wallets and contracts in different casings
    /// (checksummed vs lowercase), so ownership checks ignore case.
    pub fn matches(&self, other: &WalletAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    pub fn short(&self) -> String {
        let raw = self.0.as_str();
        if raw.len() <= 12 || !raw.is_ascii() {
            return raw.to_owned();
        }
        format!("{}...{}", &raw[..6], &raw[raw.len() - 4..])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String")]
pub struct ChainId(pub String);

impl ChainId {
    /// Normalizes hex chain ids (`0x013881`, `0X13881`) to the minimal
    /// lowercase form wallets report. Unparseable ids are kept lowercased.
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        match parse_hex_u64(trimmed) {
            Some(value) => Self::from_u64(value),
            None => Self(trimmed.to_ascii_lowercase()),
        }
    }

    pub fn from_u64(value: u64) -> Self {
        Self(format!("0x{value:x}"))
    }

    pub fn as_u64(&self) -> Option<u64> {
        parse_hex_u64(&self.0)
    }
}

impl From<String> for ChainId {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_hex_u64(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

/// Amount in the chain's smallest native unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Wei(pub u128);

impl Wei {
    pub const fn from_finney(finney: u128) -> Self {
        Self(finney * WEI_PER_FINNEY)
    }

    /// JSON-RPC quantity encoding: `0x` prefixed, no leading zeros.
    pub fn to_quantity(self) -> String {
        format!("0x{:x}", self.0)
    }

    /// Decimal amount in whole native units, trailing zeros trimmed.
    pub fn ether_label(self) -> String {
        let whole = self.0 / WEI_PER_ETHER;
        let frac = self.0 % WEI_PER_ETHER;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{frac:018}");
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Payload of `wallet_addEthereumChain`; field names follow EIP-3085.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: ChainId,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    pub block_explorer_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub chain_id: ChainId,
    pub name: String,
    pub currency_symbol: String,
    pub allows_mutations: bool,
}

/// One registered name as last fetched. `id` is the position in the
/// enumeration at fetch time and is only stable within one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainRecord {
    pub id: usize,
    pub name: String,
    pub record: String,
    pub owner: WalletAddress,
}

impl DomainRecord {
    pub fn full_name(&self, tld: &str) -> String {
        format!("{}{}", self.name, tld)
    }

    pub fn is_owned_by(&self, account: &WalletAddress) -> bool {
        self.owner.matches(account)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MintRequest {
    pub domain: String,
    pub record: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: String,
    pub status: ReceiptStatus,
    pub block_number: Option<u64>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}

/// A submitted transaction, awaiting confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxHandle {
    pub hash: String,
}
