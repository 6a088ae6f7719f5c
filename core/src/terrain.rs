use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::brush::{EditMode, Selection, intersect_ray_plane};
use crate::descriptor::TerrainDescriptor;
use crate::error::Result;
use crate::foliage::{FoliageGrid, FoliageSource, FoliageStroke};
use crate::height::{HeightEdit, HeightField};
use crate::mapper;
use crate::mask::{MaskGrid, MaskLayer, MaskStroke};
use crate::rng::RandomSource;
use crate::settings::EditorSettings;
use crate::texture::TerrainTextures;
use crate::water::{WaterPlane, Wind};

// Persisted form of a terrain: descriptor, raw grid buffers, material list and
// foliage placements. Foliage occupancy is rebuilt from the placements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSnapshot {
    pub descriptor: TerrainDescriptor,
    #[serde(with = "serde_bytes")]
    pub height_map: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub mask_map: Vec<u8>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub foliage: Vec<FoliageSource>,
}

// Selection ring handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionCircle {
    pub center: Vec3,
    pub radius: f32,
}

// Everything the renderer needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct TerrainDrawData<'a> {
    pub descriptor: &'a TerrainDescriptor,
    pub translation: Vec3,
    pub height_map: &'a [u8],
    pub mask_map: &'a [u8],
    pub foliage_map: &'a [u8],
    pub water: &'a WaterPlane,
    pub wind: &'a Wind,
    pub selection: Option<SelectionCircle>,
}

// Height field, mask grid, foliage grid and water plane of one terrain
#[derive(Debug, Clone)]
pub struct Terrain {
    descriptor: TerrainDescriptor,
    pub translation: Vec3,
    height: HeightField,
    mask: MaskGrid,
    foliage: FoliageGrid,
    water: WaterPlane,
    pub wind: Wind,
    pub materials: Vec<String>,
    needs_save: bool,
}

impl Terrain {
    pub fn new(descriptor: TerrainDescriptor) -> Result<Self> {
        descriptor.validate()?;
        let d = &descriptor;
        let height = HeightField::new(d.size_x, d.size_z, d.height_range);
        let mask = MaskGrid::new(d.size_x, d.size_z, d.masking_detail);
        let foliage = FoliageGrid::cluster(d.size_x, d.size_z, d.foliage_placing_detail, &[]);
        let water = Self::build_water(d);
        Ok(Self {
            descriptor,
            translation: Vec3::ZERO,
            height,
            mask,
            foliage,
            water,
            wind: Wind::default(),
            materials: Vec::new(),
            needs_save: true,
        })
    }

    pub fn from_snapshot(snapshot: TerrainSnapshot) -> Result<Self> {
        let TerrainSnapshot {
            descriptor,
            height_map,
            mask_map,
            materials,
            foliage,
        } = snapshot;
        descriptor.validate()?;
        let d = &descriptor;
        let height = HeightField::from_raw(d.size_x, d.size_z, d.height_range, height_map)?;
        let mask = MaskGrid::from_raw(d.size_x, d.size_z, d.masking_detail, mask_map)?;
        let foliage = FoliageGrid::cluster(d.size_x, d.size_z, d.foliage_placing_detail, &foliage);
        let water = Self::build_water(d);
        Ok(Self {
            descriptor,
            translation: Vec3::ZERO,
            height,
            mask,
            foliage,
            water,
            wind: Wind::default(),
            materials,
            needs_save: false,
        })
    }

    pub fn snapshot(&self) -> TerrainSnapshot {
        TerrainSnapshot {
            descriptor: self.descriptor.clone(),
            height_map: self.height.as_bytes().to_vec(),
            mask_map: self.mask.as_bytes().to_vec(),
            materials: self.materials.clone(),
            foliage: self.foliage.to_sources(),
        }
    }

    fn build_water(d: &TerrainDescriptor) -> WaterPlane {
        WaterPlane::new(
            d.size_x,
            d.size_z,
            d.uniform_scaling_factor,
            d.water_height,
            d.water_tessellation_factor,
        )
    }

    pub fn descriptor(&self) -> &TerrainDescriptor {
        &self.descriptor
    }

    pub fn height(&self) -> &HeightField {
        &self.height
    }

    pub fn mask(&self) -> &MaskGrid {
        &self.mask
    }

    pub fn foliage(&self) -> &FoliageGrid {
        &self.foliage
    }

    pub fn water(&self) -> &WaterPlane {
        &self.water
    }

    pub fn needs_save(&self) -> bool {
        self.needs_save
    }

    fn scale(&self) -> f32 {
        self.descriptor.uniform_scaling_factor
    }

    // World point -> local ground plane point
    pub fn to_local(&self, world: Vec3) -> Vec2 {
        mapper::world_to_local(world, self.translation, self.scale())
    }

    // Local ground plane point -> world point on the plane
    pub fn to_world(&self, local: Vec2) -> Vec3 {
        self.translation + Vec3::new(local.x, 0.0, local.y) * self.scale()
    }

    // World height of the surface under a local point
    pub fn height_at(&self, local: Vec2) -> f32 {
        self.height.sample_local(local.x, local.y) * self.scale()
    }

    pub fn edit_height(&mut self, local: Vec2, radius: f32, edit: HeightEdit) -> usize {
        let d = &self.descriptor;
        let center = mapper::height_texel(d.size_x, d.size_z, local);
        let radius_sq = mapper::height_radius_sq(radius, d.uniform_scaling_factor);
        let touched = self.height.edit_brush(center, radius_sq, edit);
        self.needs_save |= touched > 0;
        touched
    }

    pub fn edit_mask(&mut self, local: Vec2, radius: f32, stroke: MaskStroke) -> usize {
        let d = &self.descriptor;
        let detail = d.masking_detail;
        let center = mapper::detail_texel(d.size_x, d.size_z, detail, local);
        let radius_sq = mapper::detail_radius_sq(radius, d.uniform_scaling_factor, detail);
        let touched = self.mask.edit_brush(center, radius_sq, stroke);
        self.needs_save |= touched > 0;
        touched
    }

    pub fn edit_foliage(
        &mut self,
        local: Vec2,
        radius: f32,
        erase: bool,
        rng: &mut dyn RandomSource,
    ) -> usize {
        let d = &self.descriptor;
        let detail = d.foliage_placing_detail;
        let center = mapper::detail_texel(d.size_x, d.size_z, detail, local);
        let radius_sq = mapper::detail_radius_sq(radius, d.uniform_scaling_factor, detail);
        let stroke = FoliageStroke {
            erase,
            density: d.foliage_density,
            scale: d.uniform_scaling_factor,
        };
        let changed = self.foliage.edit_brush(center, radius_sq, stroke, rng);
        self.needs_save |= changed > 0;
        changed
    }

    // True when a brush of `radius` (world units) at `local` can reach the
    // terrain footprint
    pub fn brush_overlaps(&self, local: Vec2, radius: f32) -> bool {
        let reach = radius / self.scale() + 1.0;
        let half_x = self.descriptor.size_x as f32 / 2.0;
        let half_z = self.descriptor.size_z as f32 / 2.0;
        local.x.abs() <= half_x + reach && local.y.abs() <= half_z + reach
    }

    // Replaces the mask grid with a fresh one at the new detail
    pub fn set_masking_detail(&mut self, detail: u32) -> Result<()> {
        let detail = detail.max(1);
        if detail == self.descriptor.masking_detail {
            return Ok(());
        }
        let descriptor = TerrainDescriptor {
            masking_detail: detail,
            ..self.descriptor.clone()
        };
        descriptor.validate()?;
        self.descriptor = descriptor;
        self.mask = MaskGrid::new(self.descriptor.size_x, self.descriptor.size_z, detail);
        self.needs_save = true;
        info!(detail, "mask grid recreated");
        Ok(())
    }

    // Rebuilds the foliage grid and pools for a new source list
    pub fn create_foliage_cluster(
        &mut self,
        sources: &[FoliageSource],
        placing_detail: u32,
    ) -> Result<()> {
        let descriptor = TerrainDescriptor {
            foliage_placing_detail: placing_detail.max(1),
            ..self.descriptor.clone()
        };
        descriptor.validate()?;
        self.descriptor = descriptor;
        let d = &self.descriptor;
        self.foliage = FoliageGrid::cluster(d.size_x, d.size_z, d.foliage_placing_detail, sources);
        self.needs_save = true;
        Ok(())
    }

    pub fn set_foliage_density(&mut self, density: f32) {
        self.descriptor.foliage_density = density.clamp(0.0, 1.0);
        self.needs_save = true;
    }

    pub fn set_water_height(&mut self, height: f32) {
        self.descriptor.water_height = height;
        self.water = Self::build_water(&self.descriptor);
        self.needs_save = true;
    }

    pub fn set_water_tessellation(&mut self, factor: f32) {
        self.descriptor.water_tessellation_factor = factor;
        self.water = Self::build_water(&self.descriptor);
        self.needs_save = true;
    }

    pub fn set_terrain_tessellation(&mut self, factor: f32) {
        self.descriptor.terrain_tessellation_factor = factor;
        self.needs_save = true;
    }

    // Hands every dirty grid buffer to its texture
    pub fn upload_dirty(&mut self, textures: &mut TerrainTextures) {
        if self.height.take_dirty() {
            textures.height.update_raw_data(self.height.as_bytes());
        }
        if self.mask.take_dirty() {
            textures.mask.update_raw_data(self.mask.as_bytes());
        }
        if self.foliage.take_dirty() {
            textures.foliage.update_raw_data(self.foliage.as_bytes());
        }
    }
}

// Owns the active terrain, the brush and the random source, and routes input
// events to the grid matching the current edit mode.
pub struct TerrainEditor {
    terrain: Option<Terrain>,
    selection: Selection,
    settings: EditorSettings,
    rng: Box<dyn RandomSource>,
    textures: Option<TerrainTextures>,
}

impl TerrainEditor {
    pub fn new(settings: EditorSettings, rng: Box<dyn RandomSource>) -> Self {
        let selection =
            Selection::new(settings.min_selection_radius, settings.max_selection_radius);
        Self {
            terrain: None,
            selection,
            settings,
            rng,
            textures: None,
        }
    }

    pub fn attach_textures(&mut self, textures: TerrainTextures) {
        self.textures = Some(textures);
        self.flush_uploads();
    }

    pub fn terrain(&self) -> Option<&Terrain> {
        self.terrain.as_ref()
    }

    pub fn terrain_mut(&mut self) -> Option<&mut Terrain> {
        self.terrain.as_mut()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    // New terrain from the default descriptor in the settings
    pub fn create(&mut self) -> Result<()> {
        let descriptor = self.settings.defaults.clone();
        self.create_with(descriptor)
    }

    pub fn create_with(&mut self, descriptor: TerrainDescriptor) -> Result<()> {
        let terrain = Terrain::new(descriptor)?;
        info!(
            size_x = terrain.descriptor.size_x,
            size_z = terrain.descriptor.size_z,
            "terrain created"
        );
        self.terrain = Some(terrain);
        self.flush_uploads();
        Ok(())
    }

    pub fn load(&mut self, snapshot: TerrainSnapshot) -> Result<()> {
        let terrain = Terrain::from_snapshot(snapshot)?;
        info!(
            size_x = terrain.descriptor.size_x,
            size_z = terrain.descriptor.size_z,
            foliage_types = terrain.foliage.entries().len(),
            "terrain loaded"
        );
        self.terrain = Some(terrain);
        self.flush_uploads();
        Ok(())
    }

    // Persisted form of the current terrain; clears the needs-save flag
    pub fn save(&mut self) -> Option<TerrainSnapshot> {
        let terrain = self.terrain.as_mut()?;
        terrain.needs_save = false;
        info!(file = %terrain.descriptor.file_name, "terrain saved");
        Some(terrain.snapshot())
    }

    pub fn discard(&mut self) {
        self.terrain = None;
    }

    pub fn set_edit_mode(&mut self, mode: EditMode) {
        self.selection.mode = mode;
    }

    pub fn edit_mode(&self) -> EditMode {
        self.selection.mode
    }

    pub fn set_selection_radius(&mut self, radius: f32) {
        self.selection.set_radius(radius);
    }

    pub fn set_show_selection(&mut self, show: bool) {
        self.selection.show = show;
    }

    pub fn set_mask_layer(&mut self, layer: MaskLayer) {
        self.settings.mask_layer = layer;
    }

    pub fn set_masking_ratio(&mut self, ratio: f32) {
        self.settings.masking_ratio = ratio.clamp(0.0, 1.0);
    }

    pub fn set_target_height(&mut self, height: f32) {
        self.settings.target_height = height;
    }

    pub fn set_masking_detail(&mut self, detail: u32) -> Result<()> {
        if let Some(terrain) = self.terrain.as_mut() {
            terrain.set_masking_detail(detail)?;
            self.flush_uploads();
        }
        Ok(())
    }

    pub fn create_foliage_cluster(
        &mut self,
        sources: &[FoliageSource],
        placing_detail: u32,
    ) -> Result<()> {
        if let Some(terrain) = self.terrain.as_mut() {
            terrain.create_foliage_cluster(sources, placing_detail)?;
            self.flush_uploads();
        }
        Ok(())
    }

    pub fn set_foliage_density(&mut self, density: f32) {
        if let Some(terrain) = self.terrain.as_mut() {
            terrain.set_foliage_density(density);
        }
    }

    pub fn set_water_height(&mut self, height: f32) {
        if let Some(terrain) = self.terrain.as_mut() {
            terrain.set_water_height(height);
        }
    }

    pub fn set_water_tessellation(&mut self, factor: f32) {
        if let Some(terrain) = self.terrain.as_mut() {
            terrain.set_water_tessellation(factor);
        }
    }

    pub fn advance_wind(&mut self, dt: f32) {
        if let Some(terrain) = self.terrain.as_mut() {
            let extent = terrain.water.extent;
            terrain.wind.advance(dt, extent);
        }
    }

    // Moves the brush to where the picking ray meets the ground plane and,
    // when `should_edit` is set, applies the current mode. The primary input
    // raises / paints / places; the secondary lowers / erases.
    pub fn select(&mut self, origin: Vec3, direction: Vec3, should_edit: bool, is_primary: bool) {
        let Some(terrain) = self.terrain.as_mut() else {
            warn!("select ignored, no terrain");
            return;
        };

        let Some(t) = intersect_ray_plane(origin, direction, terrain.translation, Vec3::Y) else {
            warn!(?origin, ?direction, "picking ray misses the ground plane");
            return;
        };
        self.selection.position = terrain.to_local(origin + direction * t);
        if !should_edit {
            return;
        }

        let local = self.selection.position;
        let radius = self.selection.radius();
        if !terrain.brush_overlaps(local, radius) {
            debug!(?local, radius, "brush outside the terrain, nothing to edit");
            return;
        }
        match self.selection.mode {
            EditMode::SetHeight => {
                terrain.edit_height(local, radius, HeightEdit::Set(self.settings.target_height));
            }
            EditMode::AverageHeight => {
                terrain.edit_height(local, radius, HeightEdit::Average);
            }
            EditMode::DeltaHeight => {
                let step = if is_primary { 1 } else { -1 };
                terrain.edit_height(local, radius, HeightEdit::Delta(step));
            }
            EditMode::Masking => {
                let (value, force_set) = if is_primary {
                    (self.settings.masking_ratio, false)
                } else {
                    (0.0, true)
                };
                let stroke = MaskStroke {
                    layer: self.settings.mask_layer,
                    value,
                    attenuation: self.settings.masking_attenuation,
                    force_set,
                };
                terrain.edit_mask(local, radius, stroke);
            }
            EditMode::FoliagePlacing => {
                terrain.edit_foliage(local, radius, !is_primary, self.rng.as_mut());
            }
        }
        self.flush_uploads();
    }

    pub fn draw_data(&self) -> Option<TerrainDrawData<'_>> {
        let terrain = self.terrain.as_ref()?;
        let selection = self.selection.show.then(|| {
            let mut center = terrain.to_world(self.selection.position);
            center.y = terrain.translation.y + terrain.height_at(self.selection.position);
            SelectionCircle {
                center,
                radius: self.selection.radius(),
            }
        });
        Some(TerrainDrawData {
            descriptor: &terrain.descriptor,
            translation: terrain.translation,
            height_map: terrain.height.as_bytes(),
            mask_map: terrain.mask.as_bytes(),
            foliage_map: terrain.foliage.as_bytes(),
            water: &terrain.water,
            wind: &terrain.wind,
            selection,
        })
    }

    fn flush_uploads(&mut self) {
        if let (Some(terrain), Some(textures)) = (self.terrain.as_mut(), self.textures.as_mut()) {
            terrain.upload_dirty(textures);
        }
    }
}
