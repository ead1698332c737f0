#![deny(unsafe_code)]
//! Browser bindings for the energy-wave engine.
//!
//! `mount(container)` appends a full-bleed overlay canvas to the container
//! and starts the animation; the returned handle's `unmount()` stops it and
//! removes the canvas. The canvas ignores pointer input, so content beneath
//! it stays clickable. The container should be a positioned element for the
//! overlay to cover it.

pub mod canvas;
pub mod host;

use std::cell::RefCell;
use std::rc::Rc;

use energy_wave::driver::FrameDriver;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlElement};

use crate::canvas::Canvas2dSurface;
use crate::host::{DriverSlot, WebHost};

const OVERLAY_STYLE: &str =
    "position:absolute;inset:0;width:100%;height:100%;pointer-events:none;display:block;";

/// A running animation. Dropping the handle also unmounts it.
#[wasm_bindgen]
pub struct EnergyWaveHandle {
    driver: Rc<DriverSlot>,
    canvas: HtmlCanvasElement,
}

#[wasm_bindgen]
impl EnergyWaveHandle {
    /// Cancels the frame loop, detaches every listener and removes the
    /// overlay canvas. Safe to call more than once.
    pub fn unmount(&self) {
        let Ok(mut slot) = self.driver.try_borrow_mut() else {
            warn!("energy-wave: unmount during a frame ignored");
            return;
        };
        let driver = slot.take();
        drop(slot);
        if driver.is_some() {
            drop(driver);
            self.canvas.remove();
            debug!("energy-wave: overlay removed");
        }
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.driver
            .try_borrow()
            .map(|d| d.as_ref().is_some_and(|d| d.is_running()))
            .unwrap_or(true)
    }
}

impl Drop for EnergyWaveHandle {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * (1u64 << 53) as f64) as u64
}

fn as_container(value: &JsValue) -> Option<&HtmlElement> {
    value.dyn_ref::<HtmlElement>()
}

fn create_overlay(container: &HtmlElement) -> Option<HtmlCanvasElement> {
    let document = container.owner_document()?;
    let canvas = document
        .create_element("canvas")
        .ok()?
        .dyn_into::<HtmlCanvasElement>()
        .ok()?;
    canvas.style().set_css_text(OVERLAY_STYLE);
    canvas.set_attribute("aria-hidden", "true").ok()?;
    container.append_child(&canvas).ok()?;
    Some(canvas)
}

/// Starts the animation over `container`.
///
/// Returns `undefined` and leaves the page untouched when the container is
/// missing (`null`, `undefined` or not an element), detached or has no area,
/// or the browser cannot provide a 2D context.
#[wasm_bindgen]
pub fn mount(container: &JsValue) -> Option<EnergyWaveHandle> {
    init_logging();
    let Some(container) = as_container(container) else {
        debug!("energy-wave: no container element, not mounting");
        return None;
    };
    let window = web_sys::window()?;
    if !container.is_connected() {
        debug!("energy-wave: container detached, not mounting");
        return None;
    }
    let canvas = create_overlay(container)?;
    let surface = match Canvas2dSurface::new(canvas.clone()) {
        Ok(surface) => surface,
        Err(e) => {
            debug!("energy-wave: {e}");
            canvas.remove();
            return None;
        }
    };

    let slot: Rc<DriverSlot> = Rc::new(RefCell::new(None));
    let host = WebHost::new(window, container.clone(), surface, Rc::downgrade(&slot));
    let Some(driver) = FrameDriver::mount(host, random_seed()) else {
        canvas.remove();
        return None;
    };
    *slot.borrow_mut() = Some(driver);
    Some(EnergyWaveHandle {
        driver: slot,
        canvas,
    })
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn missing_container_is_a_silent_no_op() {
        assert!(mount(&JsValue::NULL).is_none());
        assert!(mount(&JsValue::UNDEFINED).is_none());
        assert!(mount(&JsValue::from_str("#hero")).is_none());
    }

    #[wasm_bindgen_test]
    fn detached_container_is_not_mounted() {
        let document = web_sys::window().unwrap().document().unwrap();
        let div = document.create_element("div").unwrap();
        assert!(mount(div.as_ref()).is_none());
        assert_eq!(div.child_element_count(), 0);
    }
}
