//! Browser bridge: mounts a `ParticleField` onto a canvas inside a DOM
//! container and exports the mount/unmount surface to JavaScript.
//!
//! wasm-bindgen cannot export generic structs, so the field lives in a
//! `thread_local!` and every callback reaches it through `with_field`.

pub mod host;

use std::cell::RefCell;

use particle_field::{recommended_particle_count, FieldConfig, ParticleField};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

pub use host::{BrowserHost, CanvasSurface};

thread_local! {
    static FIELD: RefCell<Option<ParticleField<BrowserHost>>> = const { RefCell::new(None) };
}

/// Run `f` against the mounted field. Does nothing when no field is mounted
/// or the field is already borrowed further up the stack.
pub(crate) fn with_field<R>(f: impl FnOnce(&mut ParticleField<BrowserHost>) -> R) -> Option<R> {
    FIELD.with(|cell| {
        let mut borrow = cell.try_borrow_mut().ok()?;
        borrow.as_mut().map(f)
    })
}

fn random_seed() -> u64 {
    let hi = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let lo = (js_sys::Math::random() * u32::MAX as f64) as u64;
    (hi << 32) | lo
}

fn mount(container_id: &str, config_json: &str) -> Result<(), JsValue> {
    let config = if config_json.trim().is_empty() {
        FieldConfig::default()
    } else {
        FieldConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
    };

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let container: HtmlElement = document
        .get_element_by_id(container_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element #{}", container_id)))?
        .dyn_into()?;

    // Drop the previous field (and its canvas) before building the new one.
    unmount();

    let host = BrowserHost::new(window, container)?;
    let mut field = ParticleField::new(host, random_seed());
    field
        .start(config)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    FIELD.with(|cell| {
        *cell.borrow_mut() = Some(field);
    });
    Ok(())
}

fn unmount() {
    let previous = FIELD.with(|cell| cell.borrow_mut().take());
    // Dropping stops the field and removes the canvas.
    drop(previous);
}

/// Create a canvas filling `#container_id` and start the field.
/// `config_json` is a camelCase `FieldConfig`; empty means defaults.
/// Returns `false` (and logs why) when the element is missing or the config is invalid.
#[wasm_bindgen]
pub fn field_mount(container_id: &str, config_json: &str) -> bool {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    match mount(container_id, config_json) {
        Ok(()) => true,
        Err(err) => {
            log::error!("particle field: mount failed: {:?}", err);
            false
        }
    }
}

#[wasm_bindgen]
pub fn field_unmount() {
    unmount();
}

#[wasm_bindgen]
pub fn field_is_running() -> bool {
    with_field(|f| f.is_running()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn field_particle_count() -> u32 {
    with_field(|f| f.particles().len() as u32).unwrap_or(0)
}

#[wasm_bindgen]
pub fn field_recommended_particle_count(viewport_width: f32) -> u32 {
    recommended_particle_count(viewport_width) as u32
}
