use js_sys::{Function, Reflect};
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::{JsCast, JsValue};

pub(crate) fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Best-effort message for a thrown JS value.
pub(crate) fn describe(err: &JsValue) -> String {
    if let Some(s) = err.as_string() {
        return s;
    }
    if let Some(e) = err.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    format!("{err:?}")
}

pub(crate) fn get(target: &JsValue, key: &str) -> Result<JsValue, String> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(|e| describe(&e))
}

pub(crate) fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), String> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| describe(&e))
}

pub(crate) fn method(target: &JsValue, name: &str) -> Result<Function, String> {
    get(target, name)?
        .dyn_into::<Function>()
        .map_err(|_| format!("`{name}` is not a function"))
}

/// Serialize into plain JS objects (no `Map`s), which is what the engines
/// expect for settings and vars.
pub(crate) fn to_plain<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, swb::Error> {
    value.serialize(&swb::Serializer::json_compatible())
}
