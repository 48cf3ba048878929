//! Scene-graph backend.
//!
//! Holds the chocolate bar as a flat list of meshes with model matrices. Meshes
//! are built once; [`SceneGraph::apply_frame`] only recomputes the matrices.

use nalgebra::Matrix4;

use crate::controller::FrameParams;
use crate::geometry::Mesh;
use crate::layout::{self, *};
use crate::surface::RenderSurface;
use crate::transform::Transform;

/// World units per scene pixel.
pub const UNITS_PER_PIXEL: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    Chocolate,
    TopPlate,
    Segment,
    WrapperLeft,
    WrapperRight,
}

impl Material {
    pub fn is_wrapper(self) -> bool {
        matches!(self, Material::WrapperLeft | Material::WrapperRight)
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub mesh: Mesh,
    pub material: Material,
    /// Placement relative to the bar, in scene pixels
    local: Matrix4<f32>,
    /// Final model matrix, in world units
    pub model: Matrix4<f32>,
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub nodes: Vec<SceneNode>,
    pub sheen_opacity: f32,
}

fn px(value: f64) -> f32 {
    value as f32
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(4 + SEGMENT_ROWS * SEGMENT_COLS);
        let mut push = |mesh: Mesh, material: Material, local: Matrix4<f32>| {
            nodes.push(SceneNode {
                mesh,
                material,
                local,
                model: local,
            });
        };

        push(
            Mesh::cuboid(px(BAR_WIDTH), px(BAR_HEIGHT), px(BAR_DEPTH)),
            Material::Chocolate,
            Matrix4::identity(),
        );
        push(
            Mesh::cuboid(
                px(BAR_WIDTH - TOP_PLATE_INSET),
                px(TOP_PLATE_HEIGHT),
                px(BAR_DEPTH - TOP_PLATE_INSET),
            ),
            Material::TopPlate,
            Transform::translation_matrix(0.0, px(BAR_HEIGHT / 2.0 + TOP_PLATE_HEIGHT / 2.0), 0.0),
        );

        let segments = layout::segment_layout();
        let segment_y = px(BAR_HEIGHT / 2.0 + TOP_PLATE_HEIGHT + SEGMENT_HEIGHT / 2.0);
        for &(x, z) in &segments.positions {
            push(
                Mesh::cuboid(px(segments.width), px(SEGMENT_HEIGHT), px(segments.depth)),
                Material::Segment,
                Transform::translation_matrix(px(x), segment_y, px(z)),
            );
        }

        for material in [Material::WrapperLeft, Material::WrapperRight] {
            push(
                Mesh::cuboid(px(WRAPPER_WIDTH / 2.0), px(WRAPPER_HEIGHT), px(WRAPPER_DEPTH)),
                material,
                Matrix4::identity(),
            );
        }

        let mut graph = Self {
            nodes,
            sheen_opacity: 0.0,
        };
        graph.update_wrappers(0.0, 0.0);
        graph
    }

    /// Place the wrapper halves: slid outward by `offset` and hinged open by `tilt_deg`
    /// around their inner edges.
    fn update_wrappers(&mut self, offset: f32, tilt_deg: f32) {
        let base_x = px(layout::wrapper_half_base_x());
        let hinge = px(WRAPPER_WIDTH / 4.0);
        let y = px(STACK_CENTER_Y);

        for node in &mut self.nodes {
            node.local = match node.material {
                Material::WrapperLeft => {
                    Transform::translation_matrix(base_x - offset + hinge, y, 0.0)
                        * Transform::rotation_y(-tilt_deg)
                        * Transform::translation_matrix(-hinge, 0.0, 0.0)
                }
                Material::WrapperRight => {
                    Transform::translation_matrix(-base_x + offset - hinge, y, 0.0)
                        * Transform::rotation_y(tilt_deg)
                        * Transform::translation_matrix(hinge, 0.0, 0.0)
                }
                _ => continue,
            };
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for SceneGraph {
    fn apply_frame(&mut self, params: &FrameParams) {
        self.update_wrappers(px(params.panel_offset), px(params.panel_tilt));
        self.sheen_opacity = px(params.sheen_opacity);

        let root = Transform::scale_matrix(px(params.scale) * UNITS_PER_PIXEL)
            * Transform::orientation(px(params.yaw), px(params.pitch));
        for node in &mut self.nodes {
            node.model = root * node.local;
        }
    }
}
