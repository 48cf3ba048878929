/// CSS 3D transform backend: turns frame parameters into style strings
use crate::controller::FrameParams;
use crate::layout;
use crate::surface::RenderSurface;

/// Style values for one frame of the DOM cuboid scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CssFrame {
    pub scene_transform: String,
    pub left_wrapper_transform: String,
    pub right_wrapper_transform: String,
    pub sheen_opacity: String,
}

impl CssFrame {
    pub fn from_params(params: &FrameParams) -> Self {
        let left_x = layout::wrapper_half_base_x() - params.panel_offset;
        let right_x = -layout::wrapper_half_base_x() + params.panel_offset;
        Self {
            scene_transform: format!(
                "translate3d(-50%, -50%, 0) scale({}) rotateX({}deg) rotateY({}deg)",
                fmt_num(params.scale),
                fmt_num(params.pitch),
                fmt_num(params.yaw),
            ),
            left_wrapper_transform: format!(
                "translate3d({}px, 0, 0) rotateY({}deg)",
                fmt_num(left_x),
                fmt_num(params.panel_tilt),
            ),
            right_wrapper_transform: format!(
                "translate3d({}px, 0, 0) rotateY({}deg)",
                fmt_num(right_x),
                fmt_num(-params.panel_tilt),
            ),
            sheen_opacity: format!("{:.3}", params.sheen_opacity),
        }
    }
}

/// Compact number formatting: at most four decimals, no trailing zeros.
fn fmt_num(value: f64) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Keeps the latest [`CssFrame`] for a DOM host to flush.
#[derive(Debug, Default)]
pub struct CssSurface {
    frame: CssFrame,
}

impl CssSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> &CssFrame {
        &self.frame
    }
}

impl RenderSurface for CssSurface {
    fn apply_frame(&mut self, params: &FrameParams) {
        self.frame = CssFrame::from_params(params);
    }
}
