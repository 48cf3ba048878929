//! wrapspin core: the drag / auto-rotate / unwrap controller for the
//! chocolate-bar product demo, plus the two rendering backends it feeds.
//!
//! The controller computes numbers; hosts apply them through
//! [`RenderSurface`]. [`CssSurface`] formats CSS 3D transforms for a DOM host,
//! [`SceneGraph`] positions meshes for a rasterizing host.

pub mod config;
pub mod controller;
pub mod css;
pub mod damping;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod projection;
pub mod scene;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use config::ControllerConfig;
pub use controller::{AnimationState, Controller, FrameParams, InteractionPhase, ResumeTimer};
pub use css::{CssFrame, CssSurface};
pub use error::{Error, Result};
pub use geometry::{Mesh, Triangle, Vertex};
pub use projection::{Camera, ProjectionMode};
pub use scene::{Material, SceneGraph, SceneNode};
pub use surface::{FrameDriver, RenderSurface};
pub use transform::Transform;
