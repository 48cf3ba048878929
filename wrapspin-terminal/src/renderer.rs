/// ASCII rasterizer for the chocolate-bar scene graph
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Vector3};
use std::io::Write;
use wrapspin_core::{Camera, Material, SceneGraph, Triangle};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Minimum brightness so faces turned away from the light stay visible
const AMBIENT: f32 = 0.15;

fn material_color(material: Material) -> Color {
    match material {
        Material::Chocolate => Color::Rgb { r: 111, g: 58, b: 31 },
        Material::TopPlate => Color::Rgb { r: 138, g: 76, b: 42 },
        Material::Segment => Color::Rgb { r: 168, g: 104, b: 60 },
        Material::WrapperLeft => Color::Rgb { r: 214, g: 150, b: 52 },
        Material::WrapperRight => Color::Rgb { r: 232, g: 172, b: 70 },
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    character: char,
    material: Option<Material>,
}

const EMPTY: Cell = Cell {
    character: ' ',
    material: None,
};

/// ASCII renderer that converts the scene graph to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
    light_dir: Vector3<f32>,
    color: bool,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![EMPTY; size],
            light_dir: Vector3::new(0.3, 0.6, 1.0).normalize(),
            color: true,
        }
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self {
            color: self.color,
            ..Self::new(width, height)
        };
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(EMPTY);
    }

    pub fn render_scene(&mut self, scene: &SceneGraph, camera: &Camera) {
        // Wrapper foil catches more light as the sheen rises
        let sheen_boost = 0.7 + 0.6 * scene.sheen_opacity;
        for node in scene.nodes() {
            let boost = if node.material.is_wrapper() { sheen_boost } else { 1.0 };
            for triangle in &node.mesh.triangles {
                self.render_triangle(triangle, &node.model, camera, node.material, boost);
            }
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model_matrix: &Matrix4<f32>,
        camera: &Camera,
        material: Material,
        boost: f32,
    ) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match camera.project_to_screen(
                &vertex.position,
                model_matrix,
                self.width as u32,
                self.height as u32,
            ) {
                Some(coords) => *slot = coords,
                None => return, // Triangle is clipped
            }
        }

        // Shade with the face normal in world space
        let normal = model_matrix.transform_vector(&triangle.calculate_normal());
        if normal.norm() < 1e-9 {
            return;
        }
        let brightness = (normal.normalize().dot(&self.light_dir).max(0.0) * boost).max(AMBIENT);

        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.min(LUMINOSITY_RAMP.len() - 1);
        let cell = Cell {
            character: LUMINOSITY_RAMP[char_index],
            material: Some(material),
        };

        self.rasterize_triangle(&screen_coords, cell);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], cell: Cell) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box, clipped to screen bounds
        let min_x = v0.0.min(v1.0).min(v2.0).floor().max(0.0) as i32;
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = v0.1.min(v1.1).min(v2.1).floor().max(0.0) as i32;
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.cells[idx] = cell;
                }
            }
        }
    }

    /// Characters of one row, for inspection.
    pub fn row_text(&self, y: usize) -> String {
        self.cells[y * self.width..(y + 1) * self.width]
            .iter()
            .map(|c| c.character)
            .collect()
    }

    /// Number of cells covered by `material`.
    pub fn coverage(&self, material: Material) -> usize {
        self.cells.iter().filter(|c| c.material == Some(material)).count()
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current: Option<Color> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cells[y * self.width + x];
                if self.color {
                    let color = cell.material.map(material_color).unwrap_or(Color::DarkGrey);
                    if current != Some(color) {
                        writer.queue(SetForegroundColor(color))?;
                        current = Some(color);
                    }
                }
                writer.queue(Print(cell.character))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
