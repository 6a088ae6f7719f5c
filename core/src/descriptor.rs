use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

// Sizes and scaling of a terrain. Field order matches the persisted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainDescriptor {
    pub size_x: u32,
    pub size_z: u32,
    pub height_range: f32,
    pub masking_detail: u32,
    pub uniform_scaling_factor: f32,
    pub terrain_tessellation_factor: f32,
    pub water_tessellation_factor: f32,
    pub water_height: f32,
    pub foliage_placing_detail: u32,
    pub foliage_density: f32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_name: String,
}

impl Default for TerrainDescriptor {
    fn default() -> Self {
        Self {
            size_x: 64,
            size_z: 64,
            height_range: 20.0,
            masking_detail: 4,
            uniform_scaling_factor: 1.0,
            terrain_tessellation_factor: 16.0,
            water_tessellation_factor: 8.0,
            water_height: -2.0,
            foliage_placing_detail: 1,
            foliage_density: 0.5,
            file_name: String::new(),
        }
    }
}

impl TerrainDescriptor {
    pub fn validate(&self) -> Result<()> {
        if self.size_x == 0 || self.size_z == 0 {
            return Err(TerrainError::InvalidDescriptor(format!(
                "terrain size {}x{} must be non-zero",
                self.size_x, self.size_z
            )));
        }
        if !(self.height_range > 0.0) {
            return Err(TerrainError::InvalidDescriptor(format!(
                "height range {} must be positive",
                self.height_range
            )));
        }
        if !(self.uniform_scaling_factor > 0.0) {
            return Err(TerrainError::InvalidDescriptor(format!(
                "uniform scale {} must be positive",
                self.uniform_scaling_factor
            )));
        }
        if self.masking_detail == 0 || self.foliage_placing_detail == 0 {
            return Err(TerrainError::InvalidDescriptor(
                "masking and foliage detail must be at least 1".into(),
            ));
        }
        let grids = [
            ("height", grid_bytes(self.size_x, self.size_z, 1, 1, 1)),
            ("mask", grid_bytes(self.size_x, self.size_z, self.masking_detail, 0, 4)),
            ("foliage", grid_bytes(self.size_x, self.size_z, self.foliage_placing_detail, 0, 1)),
        ];
        for (grid, bytes) in grids {
            if !bytes.is_some_and(|b| b <= MAX_GRID_BYTES) {
                return Err(TerrainError::InvalidDescriptor(format!(
                    "{grid} grid for a {}x{} terrain exceeds {MAX_GRID_BYTES} bytes",
                    self.size_x, self.size_z
                )));
            }
        }
        Ok(())
    }

    pub fn height_buffer_len(&self) -> usize {
        (self.size_x as usize + 1) * (self.size_z as usize + 1)
    }

    pub fn mask_buffer_len(&self) -> usize {
        let detail = self.masking_detail as usize;
        self.size_x as usize * detail * self.size_z as usize * detail * 4
    }
}

// Upper bound on any one grid buffer
pub const MAX_GRID_BYTES: usize = 1 << 30;

// Byte length of a (size * detail + extra)^2 grid, None on overflow
fn grid_bytes(
    size_x: u32,
    size_z: u32,
    detail: u32,
    extra: usize,
    channels: usize,
) -> Option<usize> {
    let width = (size_x as usize).checked_mul(detail as usize)?.checked_add(extra)?;
    let depth = (size_z as usize).checked_mul(detail as usize)?.checked_add(extra)?;
    width.checked_mul(depth)?.checked_mul(channels)
}
