use js_sys::{Float32Array, Object, Reflect, Uint32Array, Uint8Array};
use sprouts::GameState;
use wasm_bindgen::JsValue;

pub fn new_obj() -> Object { Object::new() }
pub fn set_kv(obj: &Object, k: &str, v: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(k), v);
}
pub fn arr_u32(slice: &[u32]) -> Uint32Array {
    let arr = Uint32Array::new_with_length(slice.len() as u32);
    arr.copy_from(slice); arr
}
pub fn arr_f32(slice: &[f32]) -> Float32Array {
    let arr = Float32Array::new_with_length(slice.len() as u32);
    arr.copy_from(slice); arr
}

/// `{ ids, positions: [x0, y0, ...], spare }` for every point.
pub fn point_data(state: &GameState) -> JsValue {
    let n = state.points.len();
    let mut ids = Vec::with_capacity(n);
    let mut pos = Vec::with_capacity(n * 2);
    let mut spare = Vec::with_capacity(n);
    for p in &state.points {
        ids.push(p.id.0);
        pos.push(p.pos.x as f32);
        pos.push(p.pos.y as f32);
        spare.push(p.spare() as u8);
    }
    let o = new_obj();
    set_kv(&o, "ids", &arr_u32(&ids).into());
    set_kv(&o, "positions", &arr_f32(&pos).into());
    set_kv(&o, "spare", &Uint8Array::from(spare.as_slice()).into());
    o.into()
}

/// Curves as flat arrays: `endpoints` holds start/end pairs, `offsets[i]..offsets[i+1]`
/// indexes the samples of curve `i` in `samples` (counted in points, not floats).
pub fn curve_data(state: &GameState) -> JsValue {
    let n = state.curves.len();
    let mut ids = Vec::with_capacity(n);
    let mut endpoints = Vec::with_capacity(n * 2);
    let mut inserted = Vec::with_capacity(n);
    let mut offsets = Vec::with_capacity(n + 1);
    let mut samples = Vec::new();
    offsets.push(0u32);
    for c in &state.curves {
        ids.push(c.id.0);
        endpoints.push(c.start.0);
        endpoints.push(c.end.0);
        inserted.push(c.inserted.0);
        for v in &c.path {
            samples.push(v.x as f32);
            samples.push(v.y as f32);
        }
        offsets.push((samples.len() / 2) as u32);
    }
    let o = new_obj();
    set_kv(&o, "ids", &arr_u32(&ids).into());
    set_kv(&o, "endpoints", &arr_u32(&endpoints).into());
    set_kv(&o, "inserted", &arr_u32(&inserted).into());
    set_kv(&o, "offsets", &arr_u32(&offsets).into());
    set_kv(&o, "samples", &arr_f32(&samples).into());
    o.into()
}
