//! `window.ethereum` as an [`RpcTransport`].
//!
//! Every wallet and contract call goes through the injected EIP-1193
//! `request({ method, params })`; chain changes arrive through
//! `ethereum.on("chainChanged", ...)`.

use async_trait::async_trait;
use futures::channel::mpsc;
use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::{Value, json};
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use xns_chain_client::{ChainChanges, ProviderError, ProviderResult};
use xns_chain_evm::{ChainEventSource, RpcTransport};
use xns_types::ChainId;

/// Handle to the injected provider. Cheap to clone; both the wallet and the
/// contract adapters hold one.
#[derive(Clone)]
pub struct BrowserTransport {
    ethereum: JsValue,
}

impl BrowserTransport {
    /// `None` when no wallet extension injected a provider.
    pub fn detect() -> Option<Self> {
        let ethereum = Reflect::get(&gloo_utils::window(), &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self { ethereum })
    }

    fn method(&self, name: &str) -> ProviderResult<Function> {
        Reflect::get(&self.ethereum, &JsValue::from_str(name))
            .map_err(js_error)?
            .dyn_into::<Function>()
            .map_err(|_| ProviderError::Transport(format!("provider has no {name}()")))
    }
}

#[async_trait(?Send)]
impl RpcTransport for BrowserTransport {
    async fn request(&self, method: &str, params: Value) -> ProviderResult<Value> {
        let args = json!({ "method": method, "params": params })
            .serialize(&Serializer::json_compatible())
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let promise = self
            .method("request")?
            .call1(&self.ethereum, &args)
            .map_err(js_error)?
            .dyn_into::<Promise>()
            .map_err(|_| ProviderError::Transport(format!("{method} did not return a promise")))?;

        let result = JsFuture::from(promise).await.map_err(js_error)?;
        serde_wasm_bindgen::from_value(result).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

impl ChainEventSource for BrowserTransport {
    fn chain_changes(&self) -> ProviderResult<ChainChanges> {
        let (tx, rx) = mpsc::unbounded();
        let listener = Closure::wrap(Box::new(move |chain: JsValue| {
            if let Some(chain) = chain.as_string() {
                let _ = tx.unbounded_send(ChainId::new(&chain));
            }
        }) as Box<dyn FnMut(JsValue)>);

        self.method("on")?
            .call2(
                &self.ethereum,
                &JsValue::from_str("chainChanged"),
                listener.as_ref().unchecked_ref(),
            )
            .map_err(js_error)?;
        listener.forget();
        Ok(rx)
    }
}

/// Provider rejections are plain objects carrying `code` and `message`.
fn js_error(err: JsValue) -> ProviderError {
    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    match Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
    {
        Some(code) => ProviderError::from_rpc(code as i64, message),
        None => ProviderError::Transport(message),
    }
}
