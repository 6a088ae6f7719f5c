use glam::IVec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GridKind, Result, TerrainError};
use crate::mapper::{brush_bounds, texel_distance_sq};

// Extra material layer painted into one RGBA channel. The base layer is implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaskLayer {
    #[default]
    R,
    G,
    B,
    A,
}

impl MaskLayer {
    pub fn channel(self) -> usize {
        match self {
            MaskLayer::R => 0,
            MaskLayer::G => 1,
            MaskLayer::B => 2,
            MaskLayer::A => 3,
        }
    }

    // Layer for a channel index; None for anything past the alpha channel
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(MaskLayer::R),
            1 => Some(MaskLayer::G),
            2 => Some(MaskLayer::B),
            3 => Some(MaskLayer::A),
            _ => None,
        }
    }
}

// Per-brush parameters for a mask edit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskStroke {
    pub layer: MaskLayer,
    // Target weight in [0, 1]
    pub value: f32,
    pub attenuation: f32,
    // Overwrite instead of max-combining
    pub force_set: bool,
}

// RGBA blend-weight grid, (size_x * detail) x (size_z * detail)
#[derive(Debug, Clone, PartialEq)]
pub struct MaskGrid {
    width: usize,
    depth: usize,
    detail: u32,
    texels: Vec<u8>,
    dirty: bool,
}

impl MaskGrid {
    pub fn new(size_x: u32, size_z: u32, detail: u32) -> Self {
        let width = size_x as usize * detail as usize;
        let depth = size_z as usize * detail as usize;
        Self {
            width,
            depth,
            detail,
            texels: vec![0; width * depth * 4],
            dirty: true,
        }
    }

    pub fn from_raw(size_x: u32, size_z: u32, detail: u32, texels: Vec<u8>) -> Result<Self> {
        let mut grid = Self::new(size_x, size_z, detail);
        if texels.len() != grid.texels.len() {
            return Err(TerrainError::BufferSize {
                grid: GridKind::Mask,
                expected: grid.texels.len(),
                actual: texels.len(),
            });
        }
        grid.texels = texels;
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn detail(&self) -> u32 {
        self.detail
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.texels
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    // One texel as [r, g, b, a]; wraps like the height lookup
    pub fn texel(&self, u: i32, v: i32) -> [u8; 4] {
        let u = u.rem_euclid(self.width as i32) as usize;
        let v = v.rem_euclid(self.depth as i32) as usize;
        let i = (v * self.width + u) * 4;
        [self.texels[i], self.texels[i + 1], self.texels[i + 2], self.texels[i + 3]]
    }

    // Paints one channel with a radial + quadratic falloff:
    //   factor = clamp(1 - a * d / R - a * d^2 / R^2, 0, 1)
    // where `a` is the stroke attenuation and d, R are in mask texels.
    pub fn edit_brush(&mut self, center: IVec2, radius_sq: f32, stroke: MaskStroke) -> usize {
        let Some((min, max)) = brush_bounds(center, radius_sq, self.width, self.depth) else {
            return 0;
        };
        let radius = radius_sq.sqrt();
        let channel = stroke.layer.channel();
        let mut touched = 0;

        for v in min.y..=max.y {
            for u in min.x..=max.x {
                let d_sq = texel_distance_sq(IVec2::new(u, v), center);
                if d_sq > radius_sq {
                    continue;
                }
                let factor = if radius > 0.0 {
                    let d = d_sq.sqrt();
                    let a = stroke.attenuation;
                    (1.0 - a * (d / radius) - a * (d_sq / radius_sq)).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                let weight = (stroke.value * factor * 255.0).round().clamp(0.0, 255.0) as u8;

                let i = (v as usize * self.width + u as usize) * 4 + channel;
                self.texels[i] = if stroke.force_set {
                    weight
                } else {
                    self.texels[i].max(weight)
                };
                touched += 1;
            }
        }

        self.dirty = true;
        debug!(
            layer = ?stroke.layer,
            center = ?center,
            texels = touched,
            force = stroke.force_set,
            "mask brush"
        );
        touched
    }

    // Same as `edit_brush` but takes a raw channel index; unknown channels are ignored
    pub fn edit_channel(
        &mut self,
        center: IVec2,
        radius_sq: f32,
        channel: usize,
        value: f32,
        attenuation: f32,
        force_set: bool,
    ) -> usize {
        match MaskLayer::from_index(channel) {
            Some(layer) => self.edit_brush(
                center,
                radius_sq,
                MaskStroke {
                    layer,
                    value,
                    attenuation,
                    force_set,
                },
            ),
            None => {
                warn!(channel, "ignoring mask edit on unknown layer");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paint(layer: MaskLayer, value: f32, attenuation: f32) -> MaskStroke {
        MaskStroke {
            layer,
            value,
            attenuation,
            force_set: false,
        }
    }

    #[test]
    fn full_brush_without_attenuation_saturates_channel() {
        let mut grid = MaskGrid::new(4, 4, 2);
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.depth(), 8);
        let touched = grid.edit_brush(IVec2::new(4, 4), 200.0, paint(MaskLayer::R, 1.0, 0.0));
        assert_eq!(touched, 64);
        for v in 0..8 {
            for u in 0..8 {
                assert_eq!(grid.texel(u, v), [255, 0, 0, 0]);
            }
        }
    }

    #[test]
    fn falloff_fades_towards_the_rim() {
        let mut grid = MaskGrid::new(8, 8, 2);
        grid.edit_brush(IVec2::new(8, 8), 16.0, paint(MaskLayer::G, 1.0, 0.5));
        let center = grid.texel(8, 8)[1];
        let mid = grid.texel(10, 8)[1];
        let rim = grid.texel(12, 8)[1];
        assert_eq!(center, 255);
        // d/R = 0.5: 1 - 0.25 - 0.125
        assert_eq!(mid, (0.625f32 * 255.0).round() as u8);
        // d/R = 1: 1 - 0.5 - 0.5
        assert_eq!(rim, 0);
    }

    #[test]
    fn painting_never_lowers_weights() {
        let mut grid = MaskGrid::new(8, 8, 1);
        grid.edit_brush(IVec2::new(4, 4), 9.0, paint(MaskLayer::B, 1.0, 0.2));
        let before = grid.clone();
        grid.edit_brush(IVec2::new(5, 4), 9.0, paint(MaskLayer::B, 0.3, 0.2));
        for (a, b) in before.as_bytes().iter().zip(grid.as_bytes()) {
            assert!(b >= a);
        }
    }

    #[test]
    fn force_set_zero_erases_the_brush_area() {
        let mut grid = MaskGrid::new(8, 8, 1);
        grid.edit_brush(IVec2::new(4, 4), 64.0, paint(MaskLayer::A, 1.0, 0.0));
        let center = IVec2::new(3, 3);
        let radius_sq = 4.0;
        grid.edit_brush(
            center,
            radius_sq,
            MaskStroke {
                layer: MaskLayer::A,
                value: 0.0,
                attenuation: 0.7,
                force_set: true,
            },
        );
        for v in 0..8 {
            for u in 0..8 {
                let inside = texel_distance_sq(IVec2::new(u, v), center) <= radius_sq;
                let alpha = grid.texel(u, v)[3];
                if inside {
                    assert_eq!(alpha, 0);
                } else if texel_distance_sq(IVec2::new(u, v), IVec2::new(4, 4)) <= 64.0 {
                    assert_eq!(alpha, 255);
                }
            }
        }
    }

    #[test]
    fn channels_are_independent() {
        let mut grid = MaskGrid::new(4, 4, 1);
        grid.edit_brush(IVec2::new(2, 2), 16.0, paint(MaskLayer::R, 1.0, 0.0));
        grid.edit_brush(IVec2::new(2, 2), 16.0, paint(MaskLayer::B, 0.5, 0.0));
        assert_eq!(grid.texel(2, 2), [255, 0, 128, 0]);
    }

    #[test]
    fn unknown_channel_is_a_no_op() {
        let mut grid = MaskGrid::new(4, 4, 1);
        let before = grid.clone();
        assert_eq!(grid.edit_channel(IVec2::new(2, 2), 16.0, 7, 1.0, 0.0, false), 0);
        assert_eq!(before.as_bytes(), grid.as_bytes());
    }

    #[test]
    fn from_raw_checks_rgba_length() {
        assert!(MaskGrid::from_raw(4, 4, 2, vec![0; 8 * 8 * 4]).is_ok());
        assert!(matches!(
            MaskGrid::from_raw(4, 4, 2, vec![0; 8 * 8]),
            Err(TerrainError::BufferSize { grid: GridKind::Mask, .. })
        ));
    }
}
