//! Event binding.
//!
//! Wires the page's buttons and inputs to controller operations. Rendering
//! happens in response to controller events, not here.

use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::App;
use crate::dom::{self, Elements};

/// Helper: attach async click handler to an HtmlElement.
macro_rules! on_click_async {
    ($el:expr, $app:expr, $handler:expr) => {{
        let app = $app.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            let app = app.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&app).await;
            });
        }) as Box<dyn FnMut(_)>);
        $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
            .unwrap();
        cb.forget();
    }};
}

/// Helper: attach sync handler for `$event`.
macro_rules! on_event {
    ($el:expr, $event:expr, $cb:expr) => {{
        let cb = Closure::wrap(Box::new($cb) as Box<dyn FnMut(web_sys::Event)>);
        $el.add_event_listener_with_callback($event, cb.as_ref().unchecked_ref())
            .unwrap();
        cb.forget();
    }};
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements, app: &Rc<App>) {
    on_click_async!(els.connect_btn, app, on_connect);
    on_click_async!(els.switch_btn, app, on_switch_network);
    on_click_async!(els.submit_btn, app, on_submit);

    {
        let app = app.clone();
        on_event!(els.cancel_btn, "click", move |_: web_sys::Event| {
            app.cancel_edit();
        });
    }

    // ── Form inputs ──
    {
        let app = app.clone();
        let input = els.domain_input.clone();
        let price = els.price_label.clone();
        on_event!(els.domain_input, "input", move |_: web_sys::Event| {
            app.set_domain_input(&dom::get_input_value(&input));
            dom::set_text(&price, &app.price_label().unwrap_or_default());
        });
    }
    {
        let app = app.clone();
        let input = els.record_input.clone();
        on_event!(els.record_input, "input", move |_: web_sys::Event| {
            app.set_record_input(&dom::get_input_value(&input));
        });
    }

    // ── Edit buttons, delegated from the list ──
    {
        let app = app.clone();
        on_event!(els.names_list, "click", move |event: web_sys::Event| {
            let Some(name) = edit_target(&event) else {
                return;
            };
            if let Err(err) = app.begin_edit(&name) {
                warn!("cannot edit {name}: {err}");
            }
        });
    }
}

fn edit_target(event: &web_sys::Event) -> Option<String> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    target.closest("[data-name]").ok()??.get_attribute("data-name")
}

async fn on_connect(app: &App) {
    if let Err(err) = app.connect().await {
        warn!("connect failed: {err}");
    }
}

async fn on_switch_network(app: &App) {
    if let Err(err) = app.switch_network().await {
        warn!("switch failed: {err}");
    }
}

async fn on_submit(app: &App) {
    match app.submit().await {
        Ok(Some(receipt)) => tracing::info!("confirmed {}", receipt.tx_hash),
        Ok(None) => {}
        Err(err) => warn!("submit failed: {err}"),
    }
}
