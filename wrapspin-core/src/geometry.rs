/// Geometry primitives for the scene-graph backend
use nalgebra::{Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices (counter-clockwise winding)
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Add a planar quad given counter-clockwise corners (seen from outside).
    fn add_quad(&mut self, corners: [Point3<f32>; 4], normal: Vector3<f32>) {
        let [a, b, c, d] = corners.map(|p| Vertex::new(p, normal));
        self.add_triangle(Triangle::new(a, b, c));
        self.add_triangle(Triangle::new(a, c, d));
    }

    /// Axis-aligned box centered on the origin.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (x, y, z) = (width / 2.0, height / 2.0, depth / 2.0);
        let p = Point3::new;
        let mut mesh = Self::with_capacity(12);

        // Front / back
        mesh.add_quad([p(-x, -y, z), p(x, -y, z), p(x, y, z), p(-x, y, z)], Vector3::z());
        mesh.add_quad([p(x, -y, -z), p(-x, -y, -z), p(-x, y, -z), p(x, y, -z)], -Vector3::z());
        // Top / bottom
        mesh.add_quad([p(-x, y, z), p(x, y, z), p(x, y, -z), p(-x, y, -z)], Vector3::y());
        mesh.add_quad([p(-x, -y, -z), p(x, -y, -z), p(x, -y, z), p(-x, -y, z)], -Vector3::y());
        // Right / left
        mesh.add_quad([p(x, -y, z), p(x, -y, -z), p(x, y, -z), p(x, y, z)], Vector3::x());
        mesh.add_quad([p(-x, -y, -z), p(-x, -y, z), p(-x, y, z), p(-x, y, -z)], -Vector3::x());

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_winding_matches_normals() {
        let mesh = Mesh::cuboid(3.2, 0.36, 1.8);
        assert_eq!(mesh.triangles.len(), 12);
        for triangle in &mesh.triangles {
            let computed = triangle.calculate_normal();
            let declared = triangle.vertices[0].normal;
            assert!((computed - declared).norm() < 1e-5, "{computed:?} vs {declared:?}");
        }
    }

    #[test]
    fn test_cuboid_extent() {
        let mesh = Mesh::cuboid(2.0, 4.0, 6.0);
        let max_y = mesh
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .map(|v| v.position.y)
            .fold(f32::MIN, f32::max);
        assert!((max_y - 2.0).abs() < 1e-6);
    }
}
