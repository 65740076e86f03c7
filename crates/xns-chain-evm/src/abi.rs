//! Minimal Solidity ABI codec for the registry contract.
//!
//! Only the shapes the contract uses are supported: calls taking string
//! arguments, and single `string`, `string[]` or `address` return values.

use sha3::{Digest, Keccak256};
use xns_chain_client::{ProviderError, ProviderResult};
use xns_types::WalletAddress;

const WORD: usize = 32;

pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Encodes a call whose parameters are all `string`, as `0x` hex calldata.
pub fn encode_call(signature: &str, args: &[&str]) -> String {
    let mut head = Vec::with_capacity(args.len() * WORD);
    let mut tail = Vec::new();

    for arg in args {
        head.extend_from_slice(&usize_word(args.len() * WORD + tail.len()));
        tail.extend_from_slice(&usize_word(arg.len()));
        tail.extend_from_slice(arg.as_bytes());
        let padding = (WORD - arg.len() % WORD) % WORD;
        tail.resize(tail.len() + padding, 0);
    }

    let mut calldata = Vec::with_capacity(4 + head.len() + tail.len());
    calldata.extend_from_slice(&selector(signature));
    calldata.extend_from_slice(&head);
    calldata.extend_from_slice(&tail);
    format!("0x{}", hex::encode(calldata))
}

pub fn decode_hex(raw: &str) -> ProviderResult<Vec<u8>> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    hex::decode(digits).map_err(|err| ProviderError::Decode(format!("invalid hex: {err}")))
}

pub fn decode_string(data: &[u8]) -> ProviderResult<String> {
    let offset = read_usize(data, 0)?;
    string_at(data, offset)
}

pub fn decode_string_array(data: &[u8]) -> ProviderResult<Vec<String>> {
    let array_at = read_usize(data, 0)?;
    let len = read_usize(data, array_at)?;
    let items_at = advance(array_at, WORD)?;

    let mut items = Vec::with_capacity(len.min(1024));
    for index in 0..len {
        let slot = index
            .checked_mul(WORD)
            .ok_or_else(|| ProviderError::Decode(format!("array index {index} overflows")))?;
        let relative = read_usize(data, advance(items_at, slot)?)?;
        items.push(string_at(data, advance(items_at, relative)?)?);
    }
    Ok(items)
}

pub fn decode_address(data: &[u8]) -> ProviderResult<WalletAddress> {
    let word = word_at(data, 0)?;
    if word[..12].iter().any(|byte| *byte != 0) {
        return Err(ProviderError::Decode("address word has dirty high bytes".to_owned()));
    }
    Ok(WalletAddress(format!("0x{}", hex::encode(&word[12..]))))
}

fn string_at(data: &[u8], offset: usize) -> ProviderResult<String> {
    let len = read_usize(data, offset)?;
    let start = advance(offset, WORD)?;
    let bytes = data
        .get(start..start.saturating_add(len))
        .ok_or_else(|| ProviderError::Decode(format!("string of {len} bytes overruns data")))?;
    String::from_utf8(bytes.to_vec())
        .map_err(|err| ProviderError::Decode(format!("string is not utf-8: {err}")))
}

/// Offsets come from the returned data, so additions are checked.
fn advance(base: usize, by: usize) -> ProviderResult<usize> {
    base.checked_add(by)
        .ok_or_else(|| ProviderError::Decode(format!("offset {base} + {by} overflows")))
}

fn word_at(data: &[u8], offset: usize) -> ProviderResult<&[u8]> {
    data.get(offset..offset.saturating_add(WORD))
        .ok_or_else(|| ProviderError::Decode(format!("no word at offset {offset}")))
}

fn read_usize(data: &[u8], offset: usize) -> ProviderResult<usize> {
    let word = word_at(data, offset)?;
    if word[..24].iter().any(|byte| *byte != 0) {
        return Err(ProviderError::Decode(format!("value at offset {offset} out of range")));
    }
    let mut low = [0_u8; 8];
    low.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(low))
        .map_err(|_| ProviderError::Decode(format!("value at offset {offset} out of range")))
}

fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0_u8; WORD];
    word[24..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(text: &str) -> Vec<u8> {
        let mut out = text.as_bytes().to_vec();
        out.resize(text.len().div_ceil(WORD).max(1) * WORD, 0);
        out
    }

    #[test]
    fn selector_matches_known_erc20_transfer() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn encodes_two_string_arguments_with_offsets() {
        let calldata = decode_hex(&encode_call("setRecord(string,string)", &["tiger", "roar"]))
            .expect("valid hex");

        assert_eq!(&calldata[..4], &selector("setRecord(string,string)"));
        let body = &calldata[4..];
        assert_eq!(read_usize(body, 0).unwrap(), 64);
        assert_eq!(read_usize(body, 32).unwrap(), 128);
        assert_eq!(string_at(body, 64).unwrap(), "tiger");
        assert_eq!(string_at(body, 128).unwrap(), "roar");
        assert_eq!(body.len(), 2 * WORD + 2 * (2 * WORD));
    }

    #[test]
    fn decodes_string_array_return_value() {
        let mut data = Vec::new();
        data.extend_from_slice(&usize_word(32));
        data.extend_from_slice(&usize_word(2));
        data.extend_from_slice(&usize_word(64));
        data.extend_from_slice(&usize_word(128));
        data.extend_from_slice(&usize_word(3));
        data.extend_from_slice(&padded("cat"));
        data.extend_from_slice(&usize_word(5));
        data.extend_from_slice(&padded("tiger"));

        assert_eq!(decode_string_array(&data).unwrap(), vec!["cat", "tiger"]);
    }

    #[test]
    fn decodes_empty_string() {
        let mut data = Vec::new();
        data.extend_from_slice(&usize_word(32));
        data.extend_from_slice(&usize_word(0));
        assert_eq!(decode_string(&data).unwrap(), "");
    }

    #[test]
    fn decodes_address_word() {
        let mut data = vec![0_u8; 12];
        data.extend_from_slice(&[0xab; 20]);
        let address = decode_address(&data).unwrap();
        assert_eq!(address.0, format!("0x{}", "ab".repeat(20)));
    }

    #[test]
    fn truncated_payload_is_a_decode_error() {
        let mut data = Vec::new();
        data.extend_from_slice(&usize_word(32));
        data.extend_from_slice(&usize_word(40));
        data.extend_from_slice(&padded("short"));
        assert!(matches!(decode_string(&data), Err(ProviderError::Decode(_))));
        assert!(matches!(decode_hex("0xzz"), Err(ProviderError::Decode(_))));
    }

    #[test]
    fn oversized_item_offset_is_a_decode_error() {
        let mut huge = [0_u8; WORD];
        huge[24..].copy_from_slice(&u64::MAX.to_be_bytes());

        let mut data = Vec::new();
        data.extend_from_slice(&usize_word(32));
        data.extend_from_slice(&usize_word(1));
        data.extend_from_slice(&huge);
        assert!(matches!(decode_string_array(&data), Err(ProviderError::Decode(_))));

        let mut data = Vec::new();
        data.extend_from_slice(&huge);
        assert!(matches!(decode_string(&data), Err(ProviderError::Decode(_))));
    }
}
