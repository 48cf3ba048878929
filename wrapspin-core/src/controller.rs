//! Drag / auto-rotate / unwrap state machine.
//!
//! The controller owns an [`AnimationState`] and turns pointer events, the
//! unwrap toggle and frame timestamps into [`FrameParams`]. It never touches a
//! rendering surface; hosts pass the returned parameters to a
//! [`RenderSurface`](crate::surface::RenderSurface).

use crate::config::ControllerConfig;
use crate::damping::{damp, lerp};
use crate::layout;

/// One-shot deferred resume of auto-rotation.
///
/// Armed on the first frame after the drag ends, so a stale frame timestamp
/// never shortens the idle delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResumeTimer {
    due: Option<f64>,
}

impl ResumeTimer {
    fn new() -> Self {
        Self { due: None }
    }

    /// Time (seconds) at which the timer fires, once armed.
    pub fn due(&self) -> Option<f64> {
        self.due
    }
}

/// Mutable per-widget animation state.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    /// Rotation around the vertical axis, degrees
    pub yaw: f64,
    /// Rotation around the horizontal axis, degrees
    pub pitch: f64,
    pub unwrap_progress: f64,
    pub unwrap_target: f64,
    pub auto_rotation: bool,
    pub dragging: bool,
    pub last_pointer_x: f64,
    pub pending_resume: Option<ResumeTimer>,
    /// Timestamp of the previous frame, seconds
    pub last_frame: f64,
    /// Fitted container scale
    pub scale: f64,
}

/// Coarse interaction state derived from `dragging` / `auto_rotation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    IdleAuto,
    IdlePaused,
    Dragging,
}

/// Visual parameters produced by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub yaw: f64,
    pub pitch: f64,
    pub scale: f64,
    pub unwrap_progress: f64,
    /// Outward translation of each wrapper half
    pub panel_offset: f64,
    /// Outward tilt of each wrapper half, degrees
    pub panel_tilt: f64,
    pub sheen_opacity: f64,
}

type InteractionListener = Box<dyn FnMut(bool)>;

pub struct Controller {
    config: ControllerConfig,
    state: AnimationState,
    on_interaction: Option<InteractionListener>,
    torn_down: bool,
}

impl Controller {
    /// Create a controller in the auto-rotating state.
    ///
    /// `now` seeds the frame clock (seconds, same time base as
    /// [`advance_frame`](Self::advance_frame)).
    pub fn new(config: ControllerConfig, unwrapped: bool, now: f64) -> Self {
        let progress = if unwrapped { 1.0 } else { 0.0 };
        let state = AnimationState {
            yaw: config.initial_yaw,
            pitch: config.initial_pitch,
            unwrap_progress: progress,
            unwrap_target: progress,
            auto_rotation: true,
            dragging: false,
            last_pointer_x: 0.0,
            pending_resume: None,
            last_frame: now,
            scale: 1.0,
        };
        Self {
            config,
            state,
            on_interaction: None,
            torn_down: false,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn phase(&self) -> InteractionPhase {
        if self.state.dragging {
            InteractionPhase::Dragging
        } else if self.state.auto_rotation {
            InteractionPhase::IdleAuto
        } else {
            InteractionPhase::IdlePaused
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Register the callback told when manual dragging starts (`true`) or ends (`false`).
    pub fn set_interaction_listener(&mut self, listener: impl FnMut(bool) + 'static) {
        self.on_interaction = Some(Box::new(listener));
    }

    /// Redirect the unwrap animation. Takes effect over the following frames.
    pub fn set_unwrapped(&mut self, unwrapped: bool) {
        self.state.unwrap_target = if unwrapped { 1.0 } else { 0.0 };
        log::debug!("unwrap target -> {}", self.state.unwrap_target);
    }

    /// Refit the scale to a new container size.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.state.scale = layout::fit_scale(width, height, &self.config);
    }

    pub fn pointer_down(&mut self, x: f64) {
        if self.torn_down {
            return;
        }
        self.state.last_pointer_x = x;
        if self.state.dragging {
            return;
        }
        self.state.dragging = true;
        self.state.auto_rotation = false;
        if self.state.pending_resume.take().is_some() {
            log::trace!("pending auto-rotation resume cancelled");
        }
        log::debug!("drag started at x={x}");
        self.notify(true);
    }

    pub fn pointer_move(&mut self, x: f64) {
        if self.torn_down || !self.state.dragging {
            return;
        }
        let delta_x = x - self.state.last_pointer_x;
        self.state.last_pointer_x = x;
        self.state.yaw += delta_x * self.config.drag_sensitivity;
    }

    pub fn pointer_up(&mut self) {
        self.end_drag();
    }

    pub fn pointer_leave(&mut self) {
        self.end_drag();
    }

    pub fn pointer_cancel(&mut self) {
        self.end_drag();
    }

    fn end_drag(&mut self) {
        if self.torn_down || !self.state.dragging {
            return;
        }
        self.state.dragging = false;
        self.state.pending_resume = Some(ResumeTimer::new());
        log::debug!("drag ended, auto-rotation resumes in {}s", self.config.resume_delay_secs);
        self.notify(false);
    }

    fn notify(&mut self, interacting: bool) {
        if let Some(listener) = self.on_interaction.as_mut() {
            listener(interacting);
        }
    }

    /// Advance the animation to `now` (seconds) and return the new visual parameters.
    pub fn advance_frame(&mut self, now: f64) -> FrameParams {
        if self.torn_down {
            return self.frame_params();
        }

        let elapsed = now - self.state.last_frame;
        let delta = if now.is_finite() && elapsed > 0.0 {
            elapsed.min(self.config.max_frame_delta_secs)
        } else {
            0.0
        };
        // A non-finite timestamp only spoils this frame
        if now.is_finite() {
            self.state.last_frame = now;
        }

        self.poll_resume_timer(now);

        let state = &mut self.state;
        let config = &self.config;

        let rate = if state.unwrap_target > state.unwrap_progress {
            config.unwrap_rate
        } else {
            config.wrap_rate
        };
        state.unwrap_progress =
            damp(state.unwrap_progress, state.unwrap_target, rate, delta).clamp(0.0, 1.0);

        let pitch_target = lerp(config.wrapped_pitch, config.unwrapped_pitch, state.unwrap_progress);
        state.pitch = damp(state.pitch, pitch_target, config.pitch_rate, delta);

        if state.auto_rotation && !state.dragging {
            state.yaw += config.auto_rotation_speed * delta;
        }

        self.frame_params()
    }

    fn poll_resume_timer(&mut self, now: f64) {
        let delay = self.config.resume_delay_secs;
        let Some(timer) = self.state.pending_resume.as_mut() else {
            return;
        };
        if !now.is_finite() {
            return;
        }
        let due = *timer.due.get_or_insert_with(|| {
            log::trace!("auto-rotation resume armed for t={}", now + delay);
            now + delay
        });
        if now >= due && !self.state.dragging {
            self.state.pending_resume = None;
            self.state.auto_rotation = true;
            log::debug!("auto-rotation resumed");
        }
    }

    /// Visual parameters for the current state, without advancing time.
    pub fn frame_params(&self) -> FrameParams {
        let progress = self.state.unwrap_progress;
        FrameParams {
            yaw: self.state.yaw,
            pitch: self.state.pitch,
            scale: self.state.scale,
            unwrap_progress: progress,
            panel_offset: lerp(0.0, self.config.wrapper_open_offset, progress),
            panel_tilt: lerp(0.0, self.config.wrapper_open_tilt, progress),
            sheen_opacity: lerp(self.config.sheen_min, self.config.sheen_max, progress),
        }
    }

    /// Release the pending timer and listener. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.state.dragging = false;
        self.state.pending_resume = None;
        self.on_interaction = None;
        log::debug!("controller torn down");
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("has_listener", &self.on_interaction.is_some())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const STEP: f64 = 0.1;

    fn controller(unwrapped: bool) -> Controller {
        Controller::new(ControllerConfig::default(), unwrapped, 0.0)
    }

    /// Run frames at a fixed step starting after `start`, returning the last time.
    fn run_frames(controller: &mut Controller, start: f64, frames: usize) -> f64 {
        let mut now = start;
        for i in 1..=frames {
            now = start + i as f64 * STEP;
            controller.advance_frame(now);
            assert_invariants(controller.state());
        }
        now
    }

    fn assert_invariants(state: &AnimationState) {
        assert!((0.0..=1.0).contains(&state.unwrap_progress));
        assert!((0.0..=1.0).contains(&state.unwrap_target));
        assert!(!(state.dragging && state.auto_rotation));
        if state.pending_resume.is_some() {
            assert!(!state.dragging && !state.auto_rotation);
        }
    }

    #[test]
    fn test_initial_state() {
        let c = controller(false);
        assert_eq!(c.phase(), InteractionPhase::IdleAuto);
        assert_eq!(c.state().unwrap_progress, 0.0);
        assert_eq!(c.state().unwrap_target, 0.0);

        let c = controller(true);
        assert_eq!(c.state().unwrap_progress, 1.0);
        assert_eq!(c.frame_params().panel_offset, 140.0);
    }

    #[test]
    fn test_toggle_has_no_immediate_effect() {
        let mut c = controller(false);
        c.set_unwrapped(true);
        assert_eq!(c.state().unwrap_target, 1.0);
        assert_eq!(c.state().unwrap_progress, 0.0);
    }

    #[test]
    fn test_unwrap_scenario_reaches_open_values() {
        let mut c = controller(false);
        c.set_unwrapped(true);
        run_frames(&mut c, 0.0, 30);
        let params = c.frame_params();
        assert_eq!(params.unwrap_progress, 1.0);
        assert_eq!(params.panel_offset, 140.0);
        assert_eq!(params.panel_tilt, 15.0);
        assert_eq!(params.sheen_opacity, 1.0);
    }

    #[test]
    fn test_progress_converges_then_stays_exact() {
        let mut c = controller(false);
        c.set_unwrapped(true);
        let mut now = 0.0;
        let mut snapped_at = None;
        for i in 1..=200 {
            now = i as f64 * STEP;
            c.advance_frame(now);
            if c.state().unwrap_progress == 1.0 {
                snapped_at = Some(i);
                break;
            }
        }
        assert!(snapped_at.is_some(), "progress never snapped");
        for i in 1..=20 {
            c.advance_frame(now + i as f64 * STEP);
            assert_eq!(c.state().unwrap_progress, 1.0);
        }
    }

    #[test]
    fn test_opening_is_faster_than_closing() {
        let mut opening = controller(false);
        opening.set_unwrapped(true);
        opening.advance_frame(STEP);

        let mut closing = controller(true);
        closing.set_unwrapped(false);
        closing.advance_frame(STEP);

        let opened = opening.state().unwrap_progress;
        let closed = 1.0 - closing.state().unwrap_progress;
        assert!(opened > closed);
    }

    #[test]
    fn test_rapid_toggling_stays_in_range() {
        let mut c = controller(false);
        let mut now = 0.0;
        for i in 0..100 {
            c.set_unwrapped(i % 3 != 0);
            now += 0.016;
            c.advance_frame(now);
            assert_invariants(c.state());
        }
    }

    #[test]
    fn test_pitch_follows_progress() {
        let mut c = controller(false);
        run_frames(&mut c, 0.0, 100);
        assert!((c.state().pitch - -10.0).abs() < 1e-3);

        c.set_unwrapped(true);
        run_frames(&mut c, 10.0, 100);
        assert!((c.state().pitch - 15.0).abs() < 1e-3);
    }

    #[test]
    fn test_frame_delta_is_capped() {
        let mut c = controller(false);
        let yaw = c.state().yaw;
        c.advance_frame(30.0);
        let expected = yaw + 14.5 * 0.1;
        assert!((c.state().yaw - expected).abs() < 1e-9);
        assert_eq!(c.state().last_frame, 30.0);
    }

    #[test]
    fn test_clock_anomaly_is_a_no_op_frame() {
        let mut c = controller(false);
        c.set_unwrapped(true);
        c.advance_frame(1.0);
        let before = c.state().clone();
        c.advance_frame(0.5);
        assert_eq!(c.state().yaw, before.yaw);
        assert_eq!(c.state().unwrap_progress, before.unwrap_progress);
        assert_eq!(c.state().pitch, before.pitch);
    }

    #[test]
    fn test_non_finite_timestamp_spoils_one_frame() {
        let mut c = controller(false);
        c.pointer_down(0.0);
        c.pointer_up();
        c.advance_frame(f64::NAN);
        assert_eq!(c.state().last_frame, 0.0);
        assert!(c.state().pending_resume.and_then(|t| t.due()).is_none());

        let yaw = c.state().yaw;
        c.advance_frame(0.1);
        assert_eq!(c.state().yaw, yaw);
        assert_eq!(c.state().pending_resume.and_then(|t| t.due()), Some(0.1 + 1.2));

        c.advance_frame(f64::INFINITY);
        assert_eq!(c.phase(), InteractionPhase::IdlePaused);
        run_frames(&mut c, 0.1, 15);
        assert_eq!(c.phase(), InteractionPhase::IdleAuto);
    }

    #[test]
    fn test_drag_scenario() {
        let mut c = controller(false);
        let yaw = c.state().yaw;
        c.pointer_down(100.0);
        assert_eq!(c.phase(), InteractionPhase::Dragging);
        c.pointer_move(140.0);
        c.pointer_move(160.0);
        c.pointer_up();
        assert_eq!(c.phase(), InteractionPhase::IdlePaused);
        assert!((c.state().yaw - (yaw + 60.0 * 0.35)).abs() < 1e-9);

        run_frames(&mut c, 0.0, 5);
        assert_eq!(c.phase(), InteractionPhase::IdlePaused);
        let now = run_frames(&mut c, 0.5, 10);
        assert!(now > 1.3);
        assert_eq!(c.phase(), InteractionPhase::IdleAuto);
        assert!(c.state().pending_resume.is_none());
    }

    #[test]
    fn test_drag_is_path_independent() {
        let paths: [&[f64]; 3] = [
            &[250.0],
            &[120.0, 180.0, 210.0, 250.0],
            &[90.0, 300.0, 40.0, 250.0],
        ];
        for path in paths {
            let mut c = controller(false);
            let yaw = c.state().yaw;
            c.pointer_down(100.0);
            for &x in path {
                c.pointer_move(x);
            }
            c.pointer_up();
            assert!((c.state().yaw - (yaw + 150.0 * 0.35)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_move_without_drag_is_ignored() {
        let mut c = controller(false);
        let yaw = c.state().yaw;
        c.pointer_move(500.0);
        c.pointer_up();
        assert_eq!(c.state().yaw, yaw);
        assert!(c.state().pending_resume.is_none());
        assert_eq!(c.phase(), InteractionPhase::IdleAuto);
    }

    #[test]
    fn test_no_auto_rotation_while_dragging() {
        let mut c = controller(false);
        c.pointer_down(10.0);
        let yaw = c.state().yaw;
        run_frames(&mut c, 0.0, 30);
        assert_eq!(c.state().yaw, yaw);
        assert!(c.state().pending_resume.is_none());
    }

    #[test]
    fn test_new_drag_cancels_pending_resume() {
        let mut c = controller(false);
        c.pointer_down(0.0);
        c.pointer_leave();
        assert!(c.state().pending_resume.is_some());
        run_frames(&mut c, 0.0, 5);

        c.pointer_down(0.0);
        assert!(c.state().pending_resume.is_none());
        run_frames(&mut c, 0.5, 30);
        assert_eq!(c.phase(), InteractionPhase::Dragging);

        c.pointer_cancel();
        let timer = c.state().pending_resume;
        assert!(timer.is_some());
        assert!(timer.and_then(|t| t.due()).is_none());
    }

    #[test]
    fn test_listener_sees_each_transition_once() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let mut c = controller(false);
        c.set_interaction_listener(move |active| sink.borrow_mut().push(active));

        c.pointer_down(0.0);
        c.pointer_down(5.0);
        c.pointer_move(10.0);
        c.pointer_up();
        c.pointer_leave();
        assert_eq!(*events.borrow(), vec![true, false]);
    }

    #[test]
    fn test_viewport_scale() {
        let mut c = controller(false);
        c.set_viewport(1040.0, 840.0);
        assert_eq!(c.frame_params().scale, 2.0);
        c.set_viewport(100.0, 100.0);
        assert_eq!(c.frame_params().scale, 0.55);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut c = controller(false);
        c.pointer_down(0.0);
        c.pointer_up();
        c.teardown();
        c.teardown();
        assert!(c.is_torn_down());
        assert!(c.state().pending_resume.is_none());

        let before = c.state().clone();
        c.advance_frame(5.0);
        c.pointer_down(3.0);
        assert_eq!(*c.state(), before);
    }

    #[test]
    fn test_teardown_mid_drag_freezes_state() {
        let mut c = controller(false);
        c.pointer_down(0.0);
        c.teardown();
        assert_eq!(c.phase(), InteractionPhase::IdlePaused);

        let before = c.state().clone();
        c.pointer_move(100.0);
        c.pointer_up();
        c.pointer_leave();
        c.pointer_cancel();
        assert_eq!(*c.state(), before);
        assert!(c.state().pending_resume.is_none());
        assert_eq!(c.state().yaw, -35.0);
    }
}
