use std::f32::consts::FRAC_PI_4;

use glam::IVec2;
use tracing::debug;

use crate::error::{GridKind, Result, TerrainError};
use crate::mapper::{brush_bounds, texel_distance_sq};

// Height brush variants
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeightEdit {
    // Flatten to a world height
    Set(f32),
    // Pull every sample 1/8 of the way towards the region average
    Average,
    // Raise (+1) or lower (-1) by one quantisation step
    Delta(i8),
}

// Grid of 8-bit elevation samples, (size_x + 1) x (size_z + 1), row-major by V.
// A sample `v` maps to (v / 255) * range - range / 2 in world units.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    width: usize,
    depth: usize,
    height_range: f32,
    samples: Vec<u8>,
    dirty: bool,
}

impl HeightField {
    // Flat field at sample value 0
    pub fn new(size_x: u32, size_z: u32, height_range: f32) -> Self {
        let width = size_x as usize + 1;
        let depth = size_z as usize + 1;
        Self {
            width,
            depth,
            height_range,
            samples: vec![0; width * depth],
            dirty: true,
        }
    }

    // Wrap a persisted buffer, checking its length
    pub fn from_raw(size_x: u32, size_z: u32, height_range: f32, samples: Vec<u8>) -> Result<Self> {
        let width = size_x as usize + 1;
        let depth = size_z as usize + 1;
        if samples.len() != width * depth {
            return Err(TerrainError::BufferSize {
                grid: GridKind::Height,
                expected: width * depth,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            depth,
            height_range,
            samples,
            dirty: true,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn height_range(&self) -> f32 {
        self.height_range
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.samples
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // Clears the dirty flag, returning its previous value
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    // Sample value -> world height
    pub fn to_world_height(&self, value: u8) -> f32 {
        value as f32 / 255.0 * self.height_range - self.height_range / 2.0
    }

    // World height -> sample value, clamped into [0, 255]
    pub fn to_sample(&self, height: f32) -> u8 {
        ((height + self.height_range / 2.0) / self.height_range * 255.0)
            .round()
            .clamp(0.0, 255.0) as u8
    }

    // Raw sample lookup. Out-of-range indices wrap to the opposite edge.
    pub fn sample(&self, x: i32, z: i32) -> u8 {
        let u = x.rem_euclid(self.width as i32) as usize;
        let v = z.rem_euclid(self.depth as i32) as usize;
        self.samples[v * self.width + u]
    }

    // World height at continuous grid coordinates.
    //
    // Looks up the base sample, its X and Z neighbours and the diagonal
    // neighbour, all in the direction of the fractional offsets. The X and Z
    // interpolations are blended by the angle of the offset: theta / (pi/4)
    // runs from 0 (pure X) through 1 (diagonal) to 2 (pure Z).
    pub fn sample_grid(&self, gx: f32, gz: f32) -> f32 {
        let bx = gx.trunc();
        let bz = gz.trunc();
        let dx = gx - bx;
        let dz = gz - bz;
        let ix = bx as i32;
        let iz = bz as i32;

        let h = |x: i32, z: i32| self.to_world_height(self.sample(x, z));
        let base = h(ix, iz);
        if dx == 0.0 && dz == 0.0 {
            return base;
        }

        let sx = dx.signum() as i32;
        let sz = dz.signum() as i32;
        let (ax, az) = (dx.abs(), dz.abs());

        let along_x = lerp(base, h(ix.saturating_add(sx), iz), ax);
        let along_z = lerp(base, h(ix, iz.saturating_add(sz)), az);
        if dz == 0.0 {
            return along_x;
        }
        if dx == 0.0 {
            return along_z;
        }

        let diagonal = lerp(
            base,
            h(ix.saturating_add(sx), iz.saturating_add(sz)),
            (ax + az) / 2.0,
        );
        let weight = (az / ax).atan() / FRAC_PI_4;
        if weight <= 1.0 {
            lerp(along_x, diagonal, weight)
        } else {
            lerp(diagonal, along_z, weight - 1.0)
        }
    }

    // World height at a local ground-plane point
    pub fn sample_local(&self, x: f32, z: f32) -> f32 {
        let half_x = ((self.width - 1) / 2) as f32;
        let half_z = ((self.depth - 1) / 2) as f32;
        self.sample_grid(x + half_x, -z + half_z)
    }

    // Applies `edit` to every sample within sqrt(radius_sq) texels of `center`.
    // Returns the number of samples visited.
    pub fn edit_brush(&mut self, center: IVec2, radius_sq: f32, edit: HeightEdit) -> usize {
        let Some((min, max)) = brush_bounds(center, radius_sq, self.width, self.depth) else {
            return 0;
        };

        let region: Vec<usize> = (min.y..=max.y)
            .flat_map(|v| (min.x..=max.x).map(move |u| IVec2::new(u, v)))
            .filter(|texel| texel_distance_sq(*texel, center) <= radius_sq)
            .map(|texel| texel.y as usize * self.width + texel.x as usize)
            .collect();
        if region.is_empty() {
            return 0;
        }

        match edit {
            HeightEdit::Set(height) => {
                let value = self.to_sample(height);
                for &i in &region {
                    self.samples[i] = value;
                }
            }
            HeightEdit::Average => {
                let sum: u64 = region.iter().map(|&i| self.samples[i] as u64).sum();
                let avg = (sum as f64 / region.len() as f64).round() as i32;
                for &i in &region {
                    let offset = self.samples[i] as i32 - avg;
                    // Truncates the kept 7/8 of the offset instead of rounding it.
                    // Rounding leaves offsets of +-1..4 unchanged and the region never
                    // settles; truncation shrinks every non-zero offset.
                    let kept = (0.875 * offset as f32).trunc() as i32;
                    self.samples[i] = (avg + kept).clamp(0, 255) as u8;
                }
            }
            HeightEdit::Delta(step) => {
                for &i in &region {
                    self.samples[i] = (self.samples[i] as i32 + step as i32).clamp(0, 255) as u8;
                }
            }
        }

        self.dirty = true;
        debug!(?edit, center = ?center, samples = region.len(), "height brush");
        region.len()
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
