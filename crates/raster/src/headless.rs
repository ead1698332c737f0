//! A [`Host`] without a display: frames are pumped by the caller.

use std::collections::BTreeMap;

use energy_wave::driver::{Bounds, EventKind, FrameDriver, FrameRequest, Host, ListenerId};
use energy_wave_core::error::EngineError;
use energy_wave_core::Dimensions;
use log::debug;

use crate::raster::Raster;

/// Container at the viewport origin, drawing into a [`Raster`].
#[derive(Debug)]
pub struct HeadlessHost {
    bounds: Option<Bounds>,
    ratio: f64,
    raster: Raster,
    listeners: BTreeMap<ListenerId, EventKind>,
    next_listener: u64,
    pending: Option<FrameRequest>,
    next_frame: i32,
}

impl HeadlessHost {
    pub fn new(dimensions: Dimensions, device_pixel_ratio: f64) -> Self {
        Self {
            bounds: Some(Bounds {
                left: 0.0,
                top: 0.0,
                width: dimensions.width,
                height: dimensions.height,
            }),
            ratio: device_pixel_ratio,
            raster: Raster::new(dimensions, device_pixel_ratio),
            listeners: BTreeMap::new(),
            next_listener: 0,
            pending: None,
            next_frame: 0,
        }
    }

    /// `None` simulates a detached container.
    pub fn set_bounds(&mut self, bounds: Option<Bounds>) {
        self.bounds = bounds;
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        self.ratio = ratio;
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listens_for(&self, kind: EventKind) -> bool {
        self.listeners.values().any(|&k| k == kind)
    }

    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Consumes the pending frame, as the display would when firing it.
    pub fn take_frame(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }
}

impl Host for HeadlessHost {
    type Canvas = Raster;

    fn container_bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.ratio
    }

    fn surface(&mut self) -> &mut Raster {
        &mut self.raster
    }

    fn add_listener(&mut self, kind: EventKind) -> Result<ListenerId, EngineError> {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(id, kind);
        Ok(id)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn request_frame(&mut self) -> Result<FrameRequest, EngineError> {
        if let Some(pending) = self.pending {
            return Err(EngineError::Scheduler(format!(
                "frame {} is still pending",
                pending.0
            )));
        }
        self.next_frame = self
            .next_frame
            .checked_add(1)
            .ok_or_else(|| EngineError::Scheduler("frame ids exhausted".into()))?;
        let request = FrameRequest(self.next_frame);
        self.pending = Some(request);
        Ok(request)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

/// Fires up to `frames` scheduled frames. Returns how many ran; fewer than
/// requested means the loop stopped.
pub fn pump(driver: &mut FrameDriver<HeadlessHost>, frames: u64) -> u64 {
    for ran in 0..frames {
        if driver.host_mut().take_frame().is_none() {
            debug!("headless: loop stopped after {ran} frames");
            return ran;
        }
        driver.on_frame();
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use energy_wave::driver::HostEvent;
    use energy_wave_core::{BlendMode, Engine};

    fn dims() -> Dimensions {
        Dimensions::new(320.0, 200.0).unwrap()
    }

    #[test]
    fn mount_and_pump_paints_frames() {
        let mut driver = FrameDriver::mount(HeadlessHost::new(dims(), 1.0), 11).unwrap();
        assert_eq!(driver.host().listener_count(), 3);
        for kind in EventKind::ALL {
            assert!(driver.host().listens_for(kind));
        }
        assert_eq!(pump(&mut driver, 20), 20);
        assert_eq!(driver.engine().frame(), 20);
        assert!(driver.host().raster().painted_pixels() > 0);
        assert_eq!(driver.host().raster().blend_mode(), BlendMode::Normal);
    }

    #[test]
    fn detached_host_never_mounts() {
        let mut host = HeadlessHost::new(dims(), 1.0);
        host.set_bounds(None);
        assert!(FrameDriver::mount(host, 1).is_none());
    }

    #[test]
    fn unmount_clears_host_registrations() {
        let mut driver = FrameDriver::mount(HeadlessHost::new(dims(), 2.0), 3).unwrap();
        pump(&mut driver, 3);
        driver.unmount();
        assert_eq!(driver.host().listener_count(), 0);
        assert!(driver.host().pending_frame().is_none());
        assert_eq!(pump(&mut driver, 10), 0);
    }

    #[test]
    fn double_request_is_refused() {
        let mut host = HeadlessHost::new(dims(), 1.0);
        assert!(host.request_frame().is_ok());
        assert!(matches!(
            host.request_frame(),
            Err(EngineError::Scheduler(_))
        ));
    }

    #[test]
    fn dpr_change_resizes_backing_only() {
        let mut driver = FrameDriver::mount(HeadlessHost::new(dims(), 1.0), 5).unwrap();
        pump(&mut driver, 5);
        let before = driver.engine().particles().particles().to_vec();
        driver.host_mut().set_device_pixel_ratio(2.0);
        driver.handle_event(HostEvent::Resize);
        assert_eq!(driver.host().raster().backing_width(), 640);
        assert_eq!(driver.engine().dimensions(), dims());
        assert_eq!(driver.engine().particles().particles(), before.as_slice());
    }
}
