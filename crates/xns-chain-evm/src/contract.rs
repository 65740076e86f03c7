use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;
use xns_chain_client::{NameContract, ProviderError, ProviderResult};
use xns_types::{Receipt, ReceiptStatus, TxHandle, WalletAddress, Wei};

use crate::{RpcTransport, abi, pause};

const REGISTER: &str = "register(string)";
const SET_RECORD: &str = "setRecord(string,string)";
const GET_ALL_NAMES: &str = "getAllNames()";
const GET_RECORD: &str = "getRecord(string)";
const GET_ADDRESS: &str = "getAddress(string)";

/// The deployed `Domains` registry contract.
pub struct DomainsContract<T> {
    transport: T,
    address: String,
    poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    status: Option<String>,
    block_number: Option<String>,
}

impl<T: RpcTransport> DomainsContract<T> {
    pub fn new(transport: T, address: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            transport,
            address: address.into(),
            poll_interval,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn call(&self, data: String) -> ProviderResult<Vec<u8>> {
        let value = self
            .transport
            .request("eth_call", json!([{ "to": self.address, "data": data }, "latest"]))
            .await?;
        match value {
            Value::String(raw) => abi::decode_hex(&raw),
            other => Err(ProviderError::Decode(format!("eth_call result: {other}"))),
        }
    }

    async fn send(
        &self,
        from: &WalletAddress,
        data: String,
        value: Option<Wei>,
    ) -> ProviderResult<TxHandle> {
        let mut tx = json!({ "from": from.0, "to": self.address, "data": data });
        if let Some(value) = value {
            tx["value"] = Value::String(value.to_quantity());
        }
        match self.transport.request("eth_sendTransaction", json!([tx])).await? {
            Value::String(hash) => Ok(TxHandle { hash }),
            other => Err(ProviderError::Decode(format!("eth_sendTransaction result: {other}"))),
        }
    }
}

#[async_trait(?Send)]
impl<T: RpcTransport> NameContract for DomainsContract<T> {
    async fn register(
        &self,
        from: &WalletAddress,
        name: &str,
        payment: Wei,
    ) -> ProviderResult<TxHandle> {
        self.send(from, abi::encode_call(REGISTER, &[name]), Some(payment))
            .await
    }

    async fn set_record(
        &self,
        from: &WalletAddress,
        name: &str,
        record: &str,
    ) -> ProviderResult<TxHandle> {
        self.send(from, abi::encode_call(SET_RECORD, &[name, record]), None)
            .await
    }

    async fn wait_for_confirmation(&self, tx: &TxHandle) -> ProviderResult<Receipt> {
        loop {
            let value = self
                .transport
                .request("eth_getTransactionReceipt", json!([tx.hash]))
                .await?;
            if value.is_null() {
                debug!("transaction {} still pending", tx.hash);
                pause(self.poll_interval).await;
                continue;
            }

            let raw: RawReceipt = serde_json::from_value(value)
                .map_err(|err| ProviderError::Decode(format!("receipt: {err}")))?;
            let status = match raw.status.as_deref() {
                Some("0x1") => ReceiptStatus::Success,
                _ => ReceiptStatus::Failure,
            };
            let block_number = raw
                .block_number
                .as_deref()
                .and_then(|raw| u64::from_str_radix(raw.trim_start_matches("0x"), 16).ok());

            return Ok(Receipt {
                tx_hash: tx.hash.clone(),
                status,
                block_number,
            });
        }
    }

    async fn all_names(&self) -> ProviderResult<Vec<String>> {
        let data = self.call(abi::encode_call(GET_ALL_NAMES, &[])).await?;
        abi::decode_string_array(&data)
    }

    async fn record(&self, name: &str) -> ProviderResult<String> {
        let data = self.call(abi::encode_call(GET_RECORD, &[name])).await?;
        abi::decode_string(&data)
    }

    async fn owner(&self, name: &str) -> ProviderResult<WalletAddress> {
        let data = self.call(abi::encode_call(GET_ADDRESS, &[name])).await?;
        abi::decode_address(&data)
    }
}
