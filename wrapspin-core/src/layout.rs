/// Chocolate bar and wrapper dimensions, in scene pixels (y up, origin at the bar center)
use crate::config::ControllerConfig;

pub const BAR_WIDTH: f64 = 320.0;
pub const BAR_DEPTH: f64 = 180.0;
pub const BAR_HEIGHT: f64 = 36.0;
pub const TOP_PLATE_INSET: f64 = 12.0;
pub const TOP_PLATE_HEIGHT: f64 = 6.0;

pub const SEGMENT_ROWS: usize = 3;
pub const SEGMENT_COLS: usize = 4;
pub const SEGMENT_GAP_X: f64 = 12.0;
pub const SEGMENT_GAP_Z: f64 = 14.0;
pub const SEGMENT_HEIGHT: f64 = 20.0;

pub const WRAPPER_WIDTH: f64 = BAR_WIDTH + 56.0;
pub const WRAPPER_DEPTH: f64 = BAR_DEPTH + 32.0;
/// Tall enough to cover the body, top plate and segments with margin.
pub const WRAPPER_HEIGHT: f64 = BAR_HEIGHT + TOP_PLATE_HEIGHT + SEGMENT_HEIGHT + 24.0;
pub const WRAPPER_SEAM_OVERLAP: f64 = 6.0;

/// Vertical center of the whole bar stack (body + plate + segments).
pub const STACK_CENTER_Y: f64 = (TOP_PLATE_HEIGHT + SEGMENT_HEIGHT) / 2.0;

/// Grid of segment centers on top of the bar.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentLayout {
    /// (x, z) center of each segment, row-major
    pub positions: Vec<(f64, f64)>,
    pub width: f64,
    pub depth: f64,
}

/// Lay out `SEGMENT_COLS` x `SEGMENT_ROWS` segments with equal gaps, edges included.
pub fn segment_layout() -> SegmentLayout {
    let total_gap_x = SEGMENT_GAP_X * (SEGMENT_COLS + 1) as f64;
    let total_gap_z = SEGMENT_GAP_Z * (SEGMENT_ROWS + 1) as f64;
    let width = (BAR_WIDTH - total_gap_x) / SEGMENT_COLS as f64;
    let depth = (BAR_DEPTH - total_gap_z) / SEGMENT_ROWS as f64;

    let mut positions = Vec::with_capacity(SEGMENT_ROWS * SEGMENT_COLS);
    for row in 0..SEGMENT_ROWS {
        for col in 0..SEGMENT_COLS {
            let x = -BAR_WIDTH / 2.0 + SEGMENT_GAP_X + width / 2.0 + col as f64 * (width + SEGMENT_GAP_X);
            let z = -BAR_DEPTH / 2.0 + SEGMENT_GAP_Z + depth / 2.0 + row as f64 * (depth + SEGMENT_GAP_Z);
            positions.push((x, z));
        }
    }

    SegmentLayout {
        positions,
        width,
        depth,
    }
}

/// Resting x of the left wrapper half's center; the right half mirrors it.
pub fn wrapper_half_base_x() -> f64 {
    -(WRAPPER_WIDTH / 4.0) - WRAPPER_SEAM_OVERLAP / 2.0
}

/// Scale that fits the base scene into a `width` x `height` container.
pub fn fit_scale(width: f64, height: f64, config: &ControllerConfig) -> f64 {
    if !width.is_finite() || !height.is_finite() {
        return config.min_scale;
    }
    let scale = (width / config.base_scene_width).min(height / config.base_scene_height);
    scale.max(config.min_scale)
}
