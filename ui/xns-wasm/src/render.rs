//! Rendering from controller state.
//!
//! The page never keeps its own copy of session or registry state: every
//! [`ControllerEvent`] triggers a re-render from the controller.

use futures::StreamExt;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlAnchorElement;
use xns_controller::{ControllerEvent, EditMode, Notice, TxPhase};

use crate::App;
use crate::dom::{self, Elements};

/// Re-renders on every controller event and runs scheduled refreshes after
/// the configured delay.
pub fn spawn_event_loop(els: Elements, app: Rc<App>) {
    let mut events = app.subscribe();
    spawn_local(async move {
        while let Some(event) = events.next().await {
            match event {
                ControllerEvent::Notice(notice) => show_notice(&els, &notice),
                ControllerEvent::RefreshScheduled(delay) => {
                    let app = app.clone();
                    spawn_local(async move {
                        gloo_timers::future::sleep(delay).await;
                        if let Err(err) = app.run_scheduled_refresh().await {
                            warn!("scheduled refresh failed: {err}");
                        }
                    });
                }
                ControllerEvent::PhaseChanged(TxPhase::Submitting) => {
                    dom::show(&els.notice, false);
                    render(&els, &app);
                }
                _ => render(&els, &app),
            }
        }
    });
}

pub fn render(els: &Elements, app: &App) {
    let session = app.session();
    let connected = session.is_connected();

    let account = match &session.account {
        Some(account) => format!("Wallet: {}", account.short()),
        None => "Not connected".to_owned(),
    };
    dom::set_text(&els.account_label, &account);
    dom::set_text(
        &els.network_label,
        &session
            .network
            .as_ref()
            .map(|network| network.label())
            .unwrap_or_default(),
    );

    dom::show(&els.connect_panel, !connected);
    dom::show(&els.guard_panel, connected && !app.is_on_required_network());
    dom::set_text(
        &els.guard_message,
        &format!(
            "Please connect to {}",
            app.config().required_chain.chain_name
        ),
    );
    dom::show(&els.form_panel, app.mutations_allowed());

    render_form(els, app);
    if let Err(err) = render_names(els, app) {
        warn!("could not render names: {err:?}");
    }
}

fn render_form(els: &Elements, app: &App) {
    let form = app.form();
    let editing = app.edit_mode() == EditMode::Editing;
    let busy = app.is_busy();

    dom::sync_input_value(&els.domain_input, &form.domain);
    dom::sync_input_value(&els.record_input, &form.record);
    dom::set_text(&els.tld_label, &app.config().tld);
    dom::set_text(&els.price_label, &app.price_label().unwrap_or_default());

    dom::set_text(&els.submit_btn, if editing { "Set record" } else { "Mint" });
    els.submit_btn.set_disabled(busy);
    dom::show(&els.cancel_btn, editing);
    els.cancel_btn.set_disabled(busy);
}

fn render_names(els: &Elements, app: &App) -> Result<(), JsValue> {
    let snapshot = app.snapshot();
    let config = app.config();
    els.names_list.set_inner_html("");
    dom::show(&els.names_panel, app.session().is_connected() && !snapshot.is_empty());

    for record in snapshot.records() {
        let full_name = record.full_name(&config.tld);
        let card = dom::create_element("div")?;
        card.set_class_name("mint-item");
        let row = dom::create_element("div")?;
        row.set_class_name("mint-row");

        let link = dom::create_element("a")?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(JsValue::from)?;
        link.set_class_name("link");
        link.set_href(&config.marketplace_url(record));
        link.set_target("_blank");
        link.set_rel("noopener noreferrer");
        link.append_child(&dom::text_element("p", "underlined", &full_name)?.into())?;
        row.append_child(&link)?;

        if app.mutations_allowed() && app.can_edit(record) {
            let edit = dom::text_element("button", "edit-button", "Edit")?;
            edit.set_attribute("data-name", &record.name)?;
            edit.set_attribute("title", &format!("Edit {full_name}"))?;
            row.append_child(&edit)?;
        }

        card.append_child(&row)?;
        card.append_child(&dom::text_element("p", "record", &record.record)?.into())?;
        card.append_child(&dom::text_element("p", "owner", &record.owner.short())?.into())?;
        els.names_list.append_child(&card)?;
    }
    Ok(())
}

fn show_notice(els: &Elements, notice: &Notice) {
    let text = notice.to_string();
    dom::set_text(&els.notice, &text);
    dom::show(&els.notice, true);
    if matches!(
        notice,
        Notice::ProviderAbsent | Notice::TransactionFailed | Notice::Validation(_)
    ) {
        let _ = gloo_utils::window().alert_with_message(&text);
    }
}
