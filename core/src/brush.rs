use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

// Which grid a brush stroke edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditMode {
    #[default]
    SetHeight,
    DeltaHeight,
    AverageHeight,
    Masking,
    FoliagePlacing,
}

// Ray parameter `t` where origin + t * direction meets the plane.
// None when the ray is parallel to the plane or the hit is behind the origin.
pub fn intersect_ray_plane(
    origin: Vec3,
    direction: Vec3,
    plane_point: Vec3,
    plane_normal: Vec3,
) -> Option<f32> {
    let denom = plane_normal.dot(direction);
    if denom.abs() <= f32::EPSILON {
        return None;
    }
    let t = plane_normal.dot(plane_point - origin) / denom;
    (t >= 0.0).then_some(t)
}

// Cursor on the terrain's local ground plane
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub position: Vec2,
    radius: f32,
    min_radius: f32,
    max_radius: f32,
    pub show: bool,
    pub mode: EditMode,
}

impl Selection {
    pub fn new(min_radius: f32, max_radius: f32) -> Self {
        let min_radius = min_radius.max(f32::EPSILON);
        let max_radius = max_radius.max(min_radius);
        Self {
            position: Vec2::ZERO,
            radius: min_radius,
            min_radius,
            max_radius,
            show: true,
            mode: EditMode::default(),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.clamp(self.min_radius, self.max_radius);
    }

    pub fn radius_limits(&self) -> (f32, f32) {
        (self.min_radius, self.max_radius)
    }
}
