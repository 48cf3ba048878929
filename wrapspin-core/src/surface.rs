//! Rendering seam and the per-frame driver.
//!
//! A host owns a [`FrameDriver`] and calls [`FrameDriver::tick`] once per
//! display refresh until it calls [`FrameDriver::stop`].

use crate::controller::{Controller, FrameParams};

/// Anything that can draw a frame's visual parameters.
pub trait RenderSurface {
    fn apply_frame(&mut self, params: &FrameParams);
}

impl<S: RenderSurface + ?Sized> RenderSurface for &mut S {
    fn apply_frame(&mut self, params: &FrameParams) {
        (**self).apply_frame(params);
    }
}

impl<S: RenderSurface + ?Sized> RenderSurface for Box<S> {
    fn apply_frame(&mut self, params: &FrameParams) {
        (**self).apply_frame(params);
    }
}

/// Couples a controller with the surface that displays it.
#[derive(Debug)]
pub struct FrameDriver<S> {
    controller: Controller,
    surface: S,
    running: bool,
}

impl<S: RenderSurface> FrameDriver<S> {
    /// Start driving `surface`, painting the initial pose immediately.
    pub fn new(controller: Controller, mut surface: S) -> Self {
        surface.apply_frame(&controller.frame_params());
        Self {
            controller,
            surface,
            running: true,
        }
    }

    /// Advance one frame and hand the result to the surface.
    ///
    /// Returns `None` once the driver has been stopped.
    pub fn tick(&mut self, now: f64) -> Option<FrameParams> {
        if !self.running {
            return None;
        }
        let params = self.controller.advance_frame(now);
        self.surface.apply_frame(&params);
        Some(params)
    }

    /// Stop the loop and tear the controller down.
    ///
    /// Returns `true` only for the call that actually stopped it.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.controller.teardown();
        log::debug!("frame driver stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
