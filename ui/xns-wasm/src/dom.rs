//! DOM element bindings.
//!
//! All fields are resolved once at startup. The page must provide every id
//! bound in `Elements::bind()`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement};

// ── Helpers ──

fn doc() -> Document {
    gloo_utils::document()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value().trim().to_string()
}

/// Writes only on change so typing does not lose the caret.
pub fn sync_input_value(el: &HtmlInputElement, val: &str) {
    if el.value() != val {
        el.set_value(val);
    }
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

/// Hidden elements carry the `hidden` class.
pub fn show(el: &Element, visible: bool) {
    toggle_class(el, "hidden", !visible);
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    doc().create_element(tag)
}

/// Element with a class and text content. Text is never parsed as HTML.
pub fn text_element(tag: &str, cls: &str, text: &str) -> Result<Element, JsValue> {
    let el = create_element(tag)?;
    el.set_class_name(cls);
    set_text(&el, text);
    Ok(el)
}

// ── Elements struct ──

/// All DOM element references used by the name service page.
#[derive(Clone)]
pub struct Elements {
    // Header
    pub account_label: Element,
    pub network_label: Element,
    pub notice: Element,

    // Connect
    pub connect_panel: Element,
    pub connect_btn: HtmlElement,

    // Network guard
    pub guard_panel: Element,
    pub guard_message: Element,
    pub switch_btn: HtmlElement,

    // Mint / edit form
    pub form_panel: Element,
    pub domain_input: HtmlInputElement,
    pub tld_label: Element,
    pub record_input: HtmlInputElement,
    pub price_label: Element,
    pub submit_btn: HtmlButtonElement,
    pub cancel_btn: HtmlButtonElement,

    // Registered names
    pub names_panel: Element,
    pub names_list: Element,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_input {
    ($id:expr) => {
        by_id_typed::<HtmlInputElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing input #{}", $id)))?
    };
}

macro_rules! get_button {
    ($id:expr) => {
        by_id_typed::<HtmlButtonElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing button #{}", $id)))?
    };
}

macro_rules! get_html {
    ($id:expr) => {
        by_id_typed::<HtmlElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing html element #{}", $id)))?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once after DOMContentLoaded.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            account_label: get_el!("accountLabel"),
            network_label: get_el!("networkLabel"),
            notice: get_el!("notice"),

            connect_panel: get_el!("connectPanel"),
            connect_btn: get_html!("connectBtn"),

            guard_panel: get_el!("guardPanel"),
            guard_message: get_el!("guardMessage"),
            switch_btn: get_html!("switchBtn"),

            form_panel: get_el!("formPanel"),
            domain_input: get_input!("domainInput"),
            tld_label: get_el!("tldLabel"),
            record_input: get_input!("recordInput"),
            price_label: get_el!("priceLabel"),
            submit_btn: get_button!("submitBtn"),
            cancel_btn: get_button!("cancelBtn"),

            names_panel: get_el!("namesPanel"),
            names_list: get_el!("namesList"),
        })
    }
}
