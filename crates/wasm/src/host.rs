//! [`Host`] backed by the browser: `requestAnimationFrame`, DOM listeners and
//! a 2D canvas.
//!
//! The driver owns the host, but the host's callbacks must reach the driver.
//! Callbacks hold a [`Weak`] to the shared slot the driver lives in and skip
//! silently once it is gone or already borrowed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Weak;

use energy_wave::driver::{Bounds, EventKind, FrameDriver, FrameRequest, Host, HostEvent, ListenerId};
use energy_wave_core::EngineError;
use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, EventTarget, HtmlElement, PointerEvent, Window};

use crate::canvas::Canvas2dSurface;

/// Where a mounted driver lives; callbacks hold a weak reference to it.
pub type DriverSlot = RefCell<Option<FrameDriver<WebHost>>>;

struct Listener {
    target: EventTarget,
    kind: EventKind,
    callback: Closure<dyn FnMut(Event)>,
}

pub struct WebHost {
    window: Window,
    container: HtmlElement,
    surface: Canvas2dSurface,
    driver: Weak<DriverSlot>,
    listeners: HashMap<ListenerId, Listener>,
    next_listener: u64,
    frame_callback: Option<Closure<dyn FnMut()>>,
}

impl WebHost {
    pub fn new(
        window: Window,
        container: HtmlElement,
        surface: Canvas2dSurface,
        driver: Weak<DriverSlot>,
    ) -> Self {
        Self {
            window,
            container,
            surface,
            driver,
            listeners: HashMap::new(),
            next_listener: 0,
            frame_callback: None,
        }
    }
}

fn with_driver(slot: &Weak<DriverSlot>, f: impl FnOnce(&mut FrameDriver<WebHost>)) {
    let Some(slot) = slot.upgrade() else {
        return;
    };
    let Ok(mut driver) = slot.try_borrow_mut() else {
        return;
    };
    if let Some(driver) = driver.as_mut() {
        f(driver);
    }
}

fn to_host_event(kind: EventKind, event: &Event) -> Option<HostEvent> {
    match kind {
        EventKind::PointerMove => event
            .dyn_ref::<PointerEvent>()
            .map(|m| HostEvent::PointerMove {
                client_x: f64::from(m.client_x()),
                client_y: f64::from(m.client_y()),
            }),
        EventKind::PointerLeave => Some(HostEvent::PointerLeave),
        EventKind::Resize => Some(HostEvent::Resize),
    }
}

fn scheduler_error(e: JsValue) -> EngineError {
    EngineError::Scheduler(format!("{e:?}"))
}

impl Host for WebHost {
    type Canvas = Canvas2dSurface;

    fn container_bounds(&self) -> Option<Bounds> {
        if !self.container.is_connected() {
            return None;
        }
        let rect = self.container.get_bounding_client_rect();
        Some(Bounds {
            left: rect.x(),
            top: rect.y(),
            width: rect.width(),
            height: rect.height(),
        })
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn surface(&mut self) -> &mut Canvas2dSurface {
        &mut self.surface
    }

    fn add_listener(&mut self, kind: EventKind) -> Result<ListenerId, EngineError> {
        // Resize is a window event; pointer events come from the container.
        let target: EventTarget = match kind {
            EventKind::Resize => self.window.clone().into(),
            EventKind::PointerMove | EventKind::PointerLeave => self.container.clone().into(),
        };
        let driver = self.driver.clone();
        let callback = Closure::wrap(Box::new(move |event: Event| {
            if let Some(event) = to_host_event(kind, &event) {
                with_driver(&driver, |d| d.handle_event(event));
            }
        }) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(kind.dom_name(), callback.as_ref().unchecked_ref())
            .map_err(scheduler_error)?;
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(
            id,
            Listener {
                target,
                kind,
                callback,
            },
        );
        Ok(id)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        let Some(listener) = self.listeners.remove(&id) else {
            return;
        };
        if let Err(e) = listener.target.remove_event_listener_with_callback(
            listener.kind.dom_name(),
            listener.callback.as_ref().unchecked_ref(),
        ) {
            warn!("removing {} listener failed: {e:?}", listener.kind.dom_name());
        }
    }

    fn request_frame(&mut self) -> Result<FrameRequest, EngineError> {
        let driver = self.driver.clone();
        let callback = self.frame_callback.get_or_insert_with(|| {
            Closure::wrap(Box::new(move || {
                with_driver(&driver, |d| d.on_frame());
            }) as Box<dyn FnMut()>)
        });
        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map(FrameRequest)
            .map_err(scheduler_error)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if let Err(e) = self.window.cancel_animation_frame(request.0) {
            warn!("cancelAnimationFrame failed: {e:?}");
        }
    }
}
