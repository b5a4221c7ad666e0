//! WASM bindings for in-browser conversion.
//!
//! JDOMs and user marks cross the boundary as JSON strings in the same shape
//! the crate serializes them (`rawContent`, `readingOrder`, ...).

use wasm_bindgen::prelude::*;

use crate::jdom::{Jdom, UserMark};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_jdom(json: &str) -> Result<Jdom, JsValue> {
    serde_json::from_str(json).map_err(to_js)
}

/// Convert an HTML document to JDOM JSON.
///
/// `url`, when given, is recorded as the persistence key.
#[wasm_bindgen]
pub fn html_to_jdom(html: &str, url: Option<String>) -> Result<String, JsValue> {
    let jdom = match url {
        Some(url) => crate::html_to_jdom_with_url(html, &url),
        None => crate::html_to_jdom(html),
    }
    .map_err(to_js)?;
    serde_json::to_string(&jdom).map_err(to_js)
}

/// Rebuild HTML from JDOM JSON, highlighting the user marks in
/// `user_marks_json` (a JSON array; empty string for none).
#[wasm_bindgen]
pub fn jdom_to_html(jdom_json: &str, user_marks_json: &str) -> Result<String, JsValue> {
    let jdom = parse_jdom(jdom_json)?;
    let user_marks: Vec<UserMark> = if user_marks_json.trim().is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(user_marks_json).map_err(to_js)?
    };
    Ok(crate::jdom_to_html(&jdom, &user_marks))
}

/// The readable text of JDOM JSON.
#[wasm_bindgen]
pub fn jdom_to_text(jdom_json: &str) -> Result<String, JsValue> {
    Ok(parse_jdom(jdom_json)?.to_text())
}
