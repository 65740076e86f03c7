//! EXE Name Service browser front-end.
//!
//! Binds the injected wallet as the chain transport, hands it to the
//! [`Controller`] and keeps the page in sync with controller events.

pub mod config;
pub mod dom;
pub mod events;
pub mod logging;
pub mod provider;
pub mod render;

use std::rc::Rc;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use xns_chain_client::NetworkRegistry;
use xns_chain_evm::{DomainsContract, Eip1193Wallet};
use xns_controller::Controller;

use crate::provider::BrowserTransport;

pub type App = Controller<Eip1193Wallet<BrowserTransport>, DomainsContract<BrowserTransport>>;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logging::init();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let config = config::load();
    let els = dom::Elements::bind()?;

    let (wallet, contract) = match BrowserTransport::detect() {
        Some(transport) => {
            info!("found an injected wallet provider");
            let contract = DomainsContract::new(
                transport.clone(),
                config.contract_address.clone(),
                config.receipt_poll_interval(),
            );
            (Some(Eip1193Wallet::new(transport)), Some(contract))
        }
        None => {
            warn!("Make sure you have MetaMask!");
            (None, None)
        }
    };

    let app = Rc::new(Controller::new(
        config,
        NetworkRegistry::builtin(),
        wallet,
        contract,
    ));
    render::spawn_event_loop(els.clone(), app.clone());
    events::bind_events(&els, &app);
    render::render(&els, &app);

    if app.has_provider() {
        let watcher = app.clone();
        spawn_local(async move {
            if let Err(err) = watcher.watch_network_changes().await {
                warn!("not listening for network changes: {err}");
            }
        });
        if let Err(err) = app.load().await {
            warn!("startup failed: {err}");
        }
    }

    Ok(())
}
