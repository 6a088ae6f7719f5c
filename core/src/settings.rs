use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::descriptor::TerrainDescriptor;
use crate::error::Result;
use crate::mask::MaskLayer;

// Editor-side knobs, stored as TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub min_selection_radius: f32,
    pub max_selection_radius: f32,
    // Scales both the linear and the quadratic falloff term
    pub masking_attenuation: f32,
    // Weight painted by the primary masking gesture, in [0, 1]
    pub masking_ratio: f32,
    pub mask_layer: MaskLayer,
    // World height used by the set-height brush
    pub target_height: f32,
    // Descriptor used by `create`
    pub defaults: TerrainDescriptor,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            min_selection_radius: 0.5,
            max_selection_radius: 64.0,
            masking_attenuation: 0.5,
            masking_ratio: 1.0,
            mask_layer: MaskLayer::R,
            target_height: 0.0,
            defaults: TerrainDescriptor::default(),
        }
    }
}

impl EditorSettings {
    pub fn from_toml_str(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Self::from_toml_str(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), "editor settings loaded");
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
