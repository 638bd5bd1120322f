use crate::interop::{new_obj, set_kv};
use js_sys::Object;
use sprouts::SproutsError;
use wasm_bindgen::prelude::*;

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be finite", param), Some(d.into()))
}

#[inline]
pub fn out_of_range(param: &str, min: f64, max: f64, got: f64) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    set_kv(&d, "min", &JsValue::from_f64(min));
    set_kv(&d, "max", &JsValue::from_f64(max));
    set_kv(&d, "got", &JsValue::from_f64(got));
    err("out_of_range", format!("parameter '{}' out of range", param), Some(d.into()))
}

#[inline]
pub fn bad_input(what: &str, detail: impl std::fmt::Display) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(what));
    err("bad_input", format!("could not read {}: {}", what, detail), Some(d.into()))
}

fn id_data(key: &str, id: u32) -> Object {
    let d = new_obj();
    set_kv(&d, key, &JsValue::from_f64(id as f64));
    d
}

/// Envelope for an engine error; the code is the engine's own.
pub fn from_core(e: &SproutsError) -> JsValue {
    let data: Option<JsValue> = match e {
        SproutsError::NotYourTurn { expected, got } => {
            let d = new_obj();
            set_kv(&d, "expected", &JsValue::from_str(&expected.0));
            set_kv(&d, "got", &JsValue::from_str(&got.0));
            Some(d.into())
        }
        SproutsError::UnknownPoint { point } => Some(id_data("point", point.0).into()),
        SproutsError::ConnectionLimitExceeded { point, spare, needed } => {
            let d = id_data("point", point.0);
            set_kv(&d, "spare", &JsValue::from_f64(*spare as f64));
            set_kv(&d, "needed", &JsValue::from_f64(*needed as f64));
            Some(d.into())
        }
        SproutsError::SynthesisFailed { from, to } => {
            let d = id_data("from", from.0);
            set_kv(&d, "to", &JsValue::from_f64(to.0 as f64));
            Some(d.into())
        }
        SproutsError::InvalidMove { cause: Some(inner), .. } => {
            let d = new_obj();
            set_kv(&d, "cause", &JsValue::from_str(inner.root_cause().code()));
            Some(d.into())
        }
        _ => None,
    };
    err(e.code(), e.to_string(), data)
}
