//! Frame Driver: binds an [`EnergyWave`] to a platform [`Host`].
//!
//! The host owns everything platform specific (the drawing surface, event
//! listeners, the display-synchronised frame scheduler). The driver owns the
//! simulation and the bookkeeping needed to tear all of that down again:
//! every listener id and the pending frame request.
//!
//! Mounting is all or nothing. A detached or zero-area container yields
//! `None` without touching the host; a host error part way through mount
//! rolls back what was registered and also yields `None`.

use energy_wave_core::error::EngineError;
use energy_wave_core::{Dimensions, Engine, Surface};
use glam::DVec2;
use log::{debug, warn};

use crate::field::PointerState;
use crate::EnergyWave;

/// A container's bounding box in client (viewport) CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Surface dimensions, or `None` for a zero-area or degenerate box.
    pub fn dimensions(&self) -> Option<Dimensions> {
        Dimensions::new(self.width, self.height).ok()
    }

    /// Client coordinates to container-local coordinates.
    pub fn to_local(&self, client: DVec2) -> DVec2 {
        client - DVec2::new(self.left, self.top)
    }
}

/// Events the driver listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    PointerLeave,
    Resize,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::PointerMove,
        EventKind::PointerLeave,
        EventKind::Resize,
    ];

    /// DOM event type name.
    pub fn dom_name(self) -> &'static str {
        match self {
            EventKind::PointerMove => "pointermove",
            EventKind::PointerLeave => "pointerleave",
            EventKind::Resize => "resize",
        }
    }
}

/// An event delivered by the host between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    PointerMove { client_x: f64, client_y: f64 },
    PointerLeave,
    Resize,
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::PointerMove { .. } => EventKind::PointerMove,
            HostEvent::PointerLeave => EventKind::PointerLeave,
            HostEvent::Resize => EventKind::Resize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Handle of a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub i32);

/// Platform services the driver needs.
pub trait Host {
    type Canvas: Surface;

    /// Container bounding box, or `None` if it is not attached.
    fn container_bounds(&self) -> Option<Bounds>;

    fn device_pixel_ratio(&self) -> f64;

    fn surface(&mut self) -> &mut Self::Canvas;

    fn add_listener(&mut self, kind: EventKind) -> Result<ListenerId, EngineError>;

    fn remove_listener(&mut self, id: ListenerId);

    /// Schedules one call to [`FrameDriver::on_frame`].
    fn request_frame(&mut self) -> Result<FrameRequest, EngineError>;

    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Non-finite or non-positive ratios fall back to 1.
pub fn sanitize_device_pixel_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

/// A mounted animation: one engine, one host, one frame loop.
pub struct FrameDriver<H: Host> {
    host: H,
    engine: EnergyWave,
    listeners: Vec<ListenerId>,
    pending: Option<FrameRequest>,
    running: bool,
}

impl<H: Host> FrameDriver<H> {
    /// Sizes the surface, attaches listeners and schedules the first frame.
    pub fn mount(mut host: H, seed: u64) -> Option<Self> {
        let Some(bounds) = host.container_bounds() else {
            debug!("energy-wave: container detached, not mounting");
            return None;
        };
        let Some(dimensions) = bounds.dimensions() else {
            debug!(
                "energy-wave: container has no area ({}x{}), not mounting",
                bounds.width, bounds.height
            );
            return None;
        };
        let ratio = sanitize_device_pixel_ratio(host.device_pixel_ratio());
        host.surface().resize(dimensions, ratio);

        let mut driver = Self {
            host,
            engine: EnergyWave::new(dimensions, seed),
            listeners: Vec::with_capacity(EventKind::ALL.len()),
            pending: None,
            running: true,
        };
        for kind in EventKind::ALL {
            match driver.host.add_listener(kind) {
                Ok(id) => driver.listeners.push(id),
                Err(err) => {
                    debug!("energy-wave: {} listener failed: {err}", kind.dom_name());
                    driver.unmount();
                    return None;
                }
            }
        }
        match driver.host.request_frame() {
            Ok(request) => driver.pending = Some(request),
            Err(err) => {
                debug!("energy-wave: first frame not scheduled: {err}");
                driver.unmount();
                return None;
            }
        }
        debug!(
            "energy-wave: mounted {}x{} @{ratio}x",
            dimensions.width, dimensions.height
        );
        Some(driver)
    }

    /// One tick of the loop: advance, repaint, reschedule.
    pub fn on_frame(&mut self) {
        self.pending = None;
        if !self.running {
            return;
        }
        if let Err(err) = self.engine.step() {
            warn!("energy-wave: step failed, stopping: {err}");
            self.unmount();
            return;
        }
        let surface = self.host.surface();
        surface.clear();
        self.engine.render(surface);
        match self.host.request_frame() {
            Ok(request) => self.pending = Some(request),
            Err(err) => {
                warn!("energy-wave: frame not scheduled, stopping: {err}");
                self.unmount();
            }
        }
    }

    pub fn handle_event(&mut self, event: HostEvent) {
        if !self.running {
            return;
        }
        match event {
            HostEvent::PointerMove { client_x, client_y } => {
                // Bounds move with scrolling, so measure per event.
                let Some(bounds) = self.host.container_bounds() else {
                    return;
                };
                let mut pointer = self.engine.pointer();
                pointer.move_to(bounds.to_local(DVec2::new(client_x, client_y)));
                self.engine.set_pointer(pointer);
            }
            HostEvent::PointerLeave => {
                let mut pointer = self.engine.pointer();
                pointer.leave();
                self.engine.set_pointer(pointer);
            }
            HostEvent::Resize => self.remeasure(),
        }
    }

    fn remeasure(&mut self) {
        let Some(dimensions) = self.host.container_bounds().and_then(|b| b.dimensions()) else {
            debug!("energy-wave: resize to no area ignored");
            return;
        };
        let ratio = sanitize_device_pixel_ratio(self.host.device_pixel_ratio());
        self.host.surface().resize(dimensions, ratio);
        self.engine.resize(dimensions);
        debug!(
            "energy-wave: resized to {}x{} @{ratio}x",
            dimensions.width, dimensions.height
        );
    }

    /// Cancels the pending frame and removes every listener. Idempotent.
    pub fn unmount(&mut self) {
        if !self.running && self.pending.is_none() && self.listeners.is_empty() {
            return;
        }
        self.running = false;
        if let Some(request) = self.pending.take() {
            self.host.cancel_frame(request);
        }
        for id in self.listeners.drain(..) {
            self.host.remove_listener(id);
        }
        debug!("energy-wave: unmounted after {} frames", self.engine.frame());
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn engine(&self) -> &EnergyWave {
        &self.engine
    }

    pub fn pointer(&self) -> PointerState {
        self.engine.pointer()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending
    }
}

impl<H: Host> Drop for FrameDriver<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DrawOp, RecordingSurface};
    use energy_wave_core::BlendMode;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    /// Host-side state shared with the test after the driver takes the host.
    #[derive(Debug, Default)]
    struct Ledger {
        bounds: Option<Bounds>,
        device_pixel_ratio: f64,
        next_id: u64,
        listeners: BTreeMap<u64, EventKind>,
        pending: Option<i32>,
        frames_requested: u32,
        cancelled: Vec<i32>,
        /// Fail the n-th `add_listener` call (0-based).
        fail_listener: Option<usize>,
        listener_calls: usize,
        fail_frames: bool,
    }

    struct MockHost {
        ledger: Rc<RefCell<Ledger>>,
        surface: RecordingSurface,
    }

    impl Host for MockHost {
        type Canvas = RecordingSurface;

        fn container_bounds(&self) -> Option<Bounds> {
            self.ledger.borrow().bounds
        }

        fn device_pixel_ratio(&self) -> f64 {
            self.ledger.borrow().device_pixel_ratio
        }

        fn surface(&mut self) -> &mut RecordingSurface {
            &mut self.surface
        }

        fn add_listener(&mut self, kind: EventKind) -> Result<ListenerId, EngineError> {
            let mut ledger = self.ledger.borrow_mut();
            let call = ledger.listener_calls;
            ledger.listener_calls += 1;
            if ledger.fail_listener == Some(call) {
                return Err(EngineError::Scheduler("listener refused".into()));
            }
            ledger.next_id += 1;
            let id = ledger.next_id;
            ledger.listeners.insert(id, kind);
            Ok(ListenerId(id))
        }

        fn remove_listener(&mut self, id: ListenerId) {
            self.ledger.borrow_mut().listeners.remove(&id.0);
        }

        fn request_frame(&mut self) -> Result<FrameRequest, EngineError> {
            let mut ledger = self.ledger.borrow_mut();
            if ledger.fail_frames {
                return Err(EngineError::Scheduler("frame refused".into()));
            }
            assert!(ledger.pending.is_none(), "frame requested twice");
            ledger.frames_requested += 1;
            let id = ledger.frames_requested as i32;
            ledger.pending = Some(id);
            Ok(FrameRequest(id))
        }

        fn cancel_frame(&mut self, request: FrameRequest) {
            let mut ledger = self.ledger.borrow_mut();
            assert_eq!(ledger.pending, Some(request.0));
            ledger.pending = None;
            ledger.cancelled.push(request.0);
        }
    }

    fn host_with(bounds: Option<Bounds>) -> (MockHost, Rc<RefCell<Ledger>>) {
        let ledger = Rc::new(RefCell::new(Ledger {
            bounds,
            device_pixel_ratio: 1.0,
            ..Ledger::default()
        }));
        let host = MockHost {
            ledger: Rc::clone(&ledger),
            surface: RecordingSurface::default(),
        };
        (host, ledger)
    }

    fn bounds(width: f64, height: f64) -> Bounds {
        Bounds {
            left: 50.0,
            top: 100.0,
            width,
            height,
        }
    }

    /// The host fires the pending frame.
    fn fire(driver: &mut FrameDriver<MockHost>, ledger: &Rc<RefCell<Ledger>>) {
        ledger.borrow_mut().pending = None;
        driver.on_frame();
    }

    #[test]
    fn detached_container_is_a_silent_no_op() {
        let (host, ledger) = host_with(None);
        assert!(FrameDriver::mount(host, 1).is_none());
        let ledger = ledger.borrow();
        assert_eq!(ledger.listener_calls, 0);
        assert_eq!(ledger.frames_requested, 0);
    }

    #[test]
    fn zero_area_container_is_a_silent_no_op() {
        let (host, ledger) = host_with(Some(bounds(0.0, 300.0)));
        assert!(FrameDriver::mount(host, 1).is_none());
        assert_eq!(ledger.borrow().listener_calls, 0);
        assert_eq!(ledger.borrow().frames_requested, 0);
    }

    #[test]
    fn mount_sizes_surface_and_registers_everything() {
        let (host, ledger) = host_with(Some(bounds(800.0, 600.0)));
        ledger.borrow_mut().device_pixel_ratio = 2.0;
        let driver = FrameDriver::mount(host, 1).unwrap();
        assert!(driver.is_running());
        assert_eq!(driver.listener_count(), 3);
        assert_eq!(
            driver.host().surface.last_resize(),
            Some((Dimensions::new(800.0, 600.0).unwrap(), 2.0))
        );
        let ledger = ledger.borrow();
        let kinds: Vec<EventKind> = ledger.listeners.values().copied().collect();
        assert_eq!(kinds, EventKind::ALL.to_vec());
        assert_eq!(ledger.frames_requested, 1);
        assert!(ledger.pending.is_some());
    }

    #[test]
    fn bad_device_pixel_ratio_falls_back_to_one() {
        let (host, ledger) = host_with(Some(bounds(800.0, 600.0)));
        ledger.borrow_mut().device_pixel_ratio = f64::NAN;
        let driver = FrameDriver::mount(host, 1).unwrap();
        assert_eq!(driver.host().surface.last_resize().unwrap().1, 1.0);
    }

    #[test]
    fn each_frame_steps_repaints_and_reschedules_once() {
        let (host, ledger) = host_with(Some(bounds(800.0, 600.0)));
        let mut driver = FrameDriver::mount(host, 1).unwrap();
        for _ in 0..5 {
            fire(&mut driver, &ledger);
        }
        assert_eq!(driver.engine().frame(), 5);
        assert_eq!(ledger.borrow().frames_requested, 6);
        assert!(driver.pending_frame().is_some());
        assert_eq!(
            driver.host().surface.count(|op| matches!(op, DrawOp::Clear)),
            5
        );
    }

    #[test]
    fn frame_clears_then_draws_then_glows() {
        let (host, ledger) = host_with(Some(bounds(800.0, 600.0)));
        let mut driver = FrameDriver::mount(host, 1).unwrap();
        driver.host_mut().surface.ops.clear();
        fire(&mut driver, &ledger);
        let ops = &driver.host().surface.ops;
        assert_eq!(ops.first(), Some(&DrawOp::Clear));
        let additive = ops
            .iter()
            .position(|op| *op == DrawOp::Blend(BlendMode::Additive))
            .unwrap();
        assert!(ops[1..additive]
            .iter()
            .all(|op| matches!(op, DrawOp::Polyline { .. } | DrawOp::Circle { .. })));
        assert_eq!(ops.last(), Some(&DrawOp::Blend(BlendMode::Normal)));
    }

    #[test]
    fn unmount_leaves_nothing_behind() {
        let (host, ledger) = host_with(Some(bounds(800.0, 600.0)));
        let mut driver = FrameDriver::mount(host, 1).unwrap();
        fire(&mut driver, &ledger);
        driver.unmount();
        assert!(!driver.is_running());
        assert_eq!(driver.listener_count(), 0);
        assert!(driver.pending_frame().is_none());
        {
            let ledger = ledger.borrow();
            assert!(ledger.listeners.is_empty());
            assert!(ledger.pending.is_none());
            assert_eq!(ledger.cancelled, vec![2]);
        }

        // A late callback from the platform schedules nothing.
        driver.on_frame();
        driver.unmount();
        let ledger = ledger.borrow();
        assert_eq!(ledger.frames_requested, 2);
        assert_eq!(ledger.cancelled.len(), 1);
        assert_eq!(driver.engine().frame(), 1);
    }

    #[test]
    fn drop_tears_down() {
        let (host, ledger) = host_with(Some(bounds(800.0, 600.0)));
        let driver = FrameDriver::mount(host, 1).unwrap();
        drop(driver);
        let ledger = ledger.borrow();
        assert!(ledger.listeners.is_empty());
        assert!(ledger.pending.is_none());
        assert_eq!(ledger.cancelled.len(), 1);
    }

    #[test]
    fn listener_failure_rolls_back_registered_listeners() {
        let (host, ledger) = host_with(Some(bounds(800.0, 600.0)));
        ledger.borrow_mut().fail_listener = Some(2);
        assert!(FrameDriver::mount(host, 1).is_none());
        let ledger = ledger.borrow();
        assert_eq!(ledger.listener_calls, 3);
        assert!(ledger.listeners.is_empty());
        assert_eq!(ledger.frames_requested, 0);
    }

    #[test]
    fn first_frame_failure_rolls_back_listeners() {
        let (host, ledger) = host_with(Some(bounds(800.0, 600.0)));
        ledger.borrow_mut().fail_frames = true;
        assert!(FrameDriver::mount(host, 1).is_none());
        let ledger = ledger.borrow();
        assert!(ledger.listeners.is_empty());
        assert!(ledger.pending.is_none());
    }

    #[test]
    fn scheduler_failure_mid_run_stops_the_loop() {
        let (host, ledger) = host_with(Some(bounds(800.0, 600.0)));
        let mut driver = FrameDriver::mount(host, 1).unwrap();
        ledger.borrow_mut().fail_frames = true;
        fire(&mut driver, &ledger);
        assert!(!driver.is_running());
        assert!(ledger.borrow().listeners.is_empty());
        fire(&mut driver, &ledger);
        assert_eq!(driver.engine().frame(), 1);
    }

    #[test]
    fn pointer_events_use_container_local_coordinates() {
        let (host, _ledger) = host_with(Some(bounds(800.0, 600.0)));
        let mut driver = FrameDriver::mount(host, 1).unwrap();
        driver.handle_event(HostEvent::PointerMove {
            client_x: 150.0,
            client_y: 300.0,
        });
        assert_eq!(
            driver.pointer(),
            PointerState {
                position: DVec2::new(100.0, 200.0),
                active: true,
            }
        );
        driver.handle_event(HostEvent::PointerLeave);
        assert!(!driver.pointer().active);
        assert_eq!(driver.pointer().position, DVec2::new(100.0, 200.0));
    }

    #[test]
    fn pointer_move_remeasures_after_scroll() {
        let (host, ledger) = host_with(Some(bounds(800.0, 600.0)));
        let mut driver = FrameDriver::mount(host, 1).unwrap();
        ledger.borrow_mut().bounds = Some(Bounds {
            left: 50.0,
            top: -200.0,
            width: 800.0,
            height: 600.0,
        });
        driver.handle_event(HostEvent::PointerMove {
            client_x: 50.0,
            client_y: 0.0,
        });
        assert_eq!(driver.pointer().position, DVec2::new(0.0, 200.0));
    }

    #[test]
    fn resize_keeps_particles_and_updates_backing() {
        let (host, ledger) = host_with(Some(bounds(800.0, 600.0)));
        let mut driver = FrameDriver::mount(host, 1).unwrap();
        fire(&mut driver, &ledger);
        let before = driver.engine().particles().particles().to_vec();

        ledger.borrow_mut().device_pixel_ratio = 2.0;
        driver.handle_event(HostEvent::Resize);
        assert_eq!(
            driver.host().surface.last_resize(),
            Some((Dimensions::new(800.0, 600.0).unwrap(), 2.0))
        );
        assert_eq!(driver.engine().particles().particles(), before.as_slice());

        ledger.borrow_mut().bounds = Some(bounds(1600.0, 1200.0));
        driver.handle_event(HostEvent::Resize);
        assert_eq!(
            driver.engine().dimensions(),
            Dimensions::new(1600.0, 1200.0).unwrap()
        );
        assert_eq!(driver.engine().particles().particles(), before.as_slice());
    }

    #[test]
    fn resize_to_zero_area_keeps_previous_dimensions() {
        let (host, ledger) = host_with(Some(bounds(800.0, 600.0)));
        let mut driver = FrameDriver::mount(host, 1).unwrap();
        ledger.borrow_mut().bounds = Some(bounds(0.0, 0.0));
        driver.handle_event(HostEvent::Resize);
        assert_eq!(
            driver.engine().dimensions(),
            Dimensions::new(800.0, 600.0).unwrap()
        );
    }

    #[test]
    fn events_after_unmount_are_ignored() {
        let (host, _ledger) = host_with(Some(bounds(800.0, 600.0)));
        let mut driver = FrameDriver::mount(host, 1).unwrap();
        driver.unmount();
        driver.handle_event(HostEvent::PointerMove {
            client_x: 150.0,
            client_y: 300.0,
        });
        assert!(!driver.pointer().active);
    }

    #[test]
    fn event_kinds_map_to_dom_names() {
        let names: Vec<&str> = EventKind::ALL.iter().map(|k| k.dom_name()).collect();
        assert_eq!(names, ["pointermove", "pointerleave", "resize"]);
        assert_eq!(HostEvent::PointerLeave.kind(), EventKind::PointerLeave);
    }
}
