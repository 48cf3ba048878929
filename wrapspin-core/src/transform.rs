/// 3D transformation matrices for the scene-graph backend
use nalgebra::{Matrix4, Vector3};

/// Transform builder for 3D transformations. Angles are in degrees.
pub struct Transform;

impl Transform {
    /// Object orientation: yaw around the vertical axis first, then pitch toward the viewer.
    pub fn orientation(yaw_deg: f32, pitch_deg: f32) -> Matrix4<f32> {
        Self::rotation_x(pitch_deg) * Self::rotation_y(yaw_deg)
    }

    pub fn rotation_x(deg: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(deg.to_radians(), 0.0, 0.0))
    }

    pub fn rotation_y(deg: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(0.0, deg.to_radians(), 0.0))
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a uniform scale matrix
    pub fn scale_matrix(s: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(s)
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_identity_orientation() {
        let matrix = Transform::orientation(0.0, 0.0);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_positive_pitch_tilts_top_toward_viewer() {
        let top = Transform::orientation(0.0, 30.0).transform_point(&Point3::new(0.0, 1.0, 0.0));
        assert!(top.z > 0.0);
    }

    #[test]
    fn test_yaw_applies_before_pitch() {
        let m = Transform::orientation(90.0, 90.0);
        // +X yaws to -Z, then pitch carries -Z up to +Y.
        let p = m.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-5, "{p:?}");
    }
}
