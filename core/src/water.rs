use glam::{Vec2, Vec3};

// Flat water surface spanning the terrain footprint
#[derive(Debug, Clone, PartialEq)]
pub struct WaterPlane {
    pub height: f32,
    pub tessellation: u32,
    pub extent: Vec2,
    vertices: Vec<Vec3>,
}

impl WaterPlane {
    pub fn new(size_x: u32, size_z: u32, scale: f32, height: f32, tessellation: f32) -> Self {
        let mut plane = Self {
            height,
            tessellation: (tessellation.round() as u32).max(1),
            extent: Vec2::new(size_x as f32, size_z as f32) * scale,
            vertices: Vec::new(),
        };
        plane.rebuild();
        plane
    }

    // (tessellation + 1)^2 vertices, row-major, centred on the origin
    pub fn rebuild(&mut self) {
        let n = self.tessellation as usize;
        let half = self.extent / 2.0;
        self.vertices = (0..=n)
            .flat_map(|row| (0..=n).map(move |col| (row, col)))
            .map(|(row, col)| {
                let t = Vec2::new(col as f32, row as f32) / n as f32;
                Vec3::new(-half.x + t.x * self.extent.x, self.height, half.y - t.y * self.extent.y)
            })
            .collect();
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }
}

// Cosmetic wind volume that drifts over the terrain and sways foliage
#[derive(Debug, Clone, PartialEq)]
pub struct Wind {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
}

impl Default for Wind {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::new(1.0, 0.0, 0.5),
            radius: 8.0,
        }
    }
}

impl Wind {
    // Moves the wind and wraps it back inside `extent` (centred on the origin)
    pub fn advance(&mut self, dt: f32, extent: Vec2) {
        self.position += self.velocity * dt;
        let half = extent / 2.0;
        if half.x > 0.0 {
            self.position.x = (self.position.x + half.x).rem_euclid(extent.x) - half.x;
        }
        if half.y > 0.0 {
            self.position.z = (self.position.z + half.y).rem_euclid(extent.y) - half.y;
        }
    }
}
