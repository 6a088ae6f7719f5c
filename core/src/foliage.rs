use std::f32::consts::TAU;

use glam::{IVec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::instance::{InstancePool, NamedInstanceStore};
use crate::mapper::{brush_bounds, detail_cell_to_local, texel_distance_sq};
use crate::rng::RandomSource;

pub const OCCUPIED: u8 = 255;

const JITTER_XZ: f32 = 0.2;
const JITTER_Y: f32 = 0.1;
const EXPONENT_MIN: f32 = 6.0;
const EXPONENT_MAX: f32 = 8.0;

// Persisted instance of one foliage type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoliagePlacement {
    pub cell: [u32; 2],
    pub position: [f32; 3],
    pub yaw: f32,
}

// Persisted foliage type: a source reference and its placements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoliageSource {
    pub source: String,
    #[serde(default)]
    pub placements: Vec<FoliagePlacement>,
}

impl FoliageSource {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            placements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FoliageTypeEntry {
    pub source: String,
    pub pool: InstancePool,
}

// Placement parameters for one foliage brush call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoliageStroke {
    pub erase: bool,
    // Fraction in [0, 1]; 1 fills every cell
    pub density: f32,
    pub scale: f32,
}

// Instance name shared by every foliage type in a cell
pub fn cell_name(cell: IVec2) -> String {
    format!("foliage_{}_{}", cell.x, cell.y)
}

pub fn parse_cell_name(name: &str) -> Option<IVec2> {
    let rest = name.strip_prefix("foliage_")?;
    let (u, v) = rest.split_once('_')?;
    Some(IVec2::new(u.parse().ok()?, v.parse().ok()?))
}

// Occupancy grid (0 / 255) shared by all foliage types, plus one pool per type
#[derive(Debug, Clone)]
pub struct FoliageGrid {
    size_x: u32,
    size_z: u32,
    detail: u32,
    width: usize,
    depth: usize,
    occupancy: Vec<u8>,
    entries: Vec<FoliageTypeEntry>,
    dirty: bool,
}

impl FoliageGrid {
    // Builds the grid and one pool per source, restoring persisted placements.
    // Occupancy is derived from the placement cells.
    pub fn cluster(size_x: u32, size_z: u32, detail: u32, sources: &[FoliageSource]) -> Self {
        let width = size_x as usize * detail as usize;
        let depth = size_z as usize * detail as usize;
        let mut grid = Self {
            size_x,
            size_z,
            detail,
            width,
            depth,
            occupancy: vec![0; width * depth],
            entries: Vec::with_capacity(sources.len()),
            dirty: true,
        };

        for source in sources {
            let mut pool = InstancePool::new();
            for placement in &source.placements {
                let [u, v] = placement.cell;
                let Some(index) = grid.index(IVec2::new(u as i32, v as i32)) else {
                    warn!(
                        source = %source.source,
                        u,
                        v,
                        "dropping foliage placement outside the grid"
                    );
                    continue;
                };
                let name = cell_name(IVec2::new(u as i32, v as i32));
                if pool.insert_instance(&name) {
                    pool.translate_instance_to(&name, Vec3::from_array(placement.position));
                    pool.rotate_instance_yaw_to(&name, placement.yaw);
                }
                grid.occupancy[index] = OCCUPIED;
            }
            grid.entries.push(FoliageTypeEntry {
                source: source.source.clone(),
                pool,
            });
        }

        info!(
            width,
            depth,
            types = grid.entries.len(),
            occupied = grid.occupied_count(),
            "foliage cluster created"
        );
        grid
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
        &self.occupancy
    }

    pub fn entries(&self) -> &[FoliageTypeEntry] {
        &self.entries
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn is_occupied(&self, cell: IVec2) -> bool {
        self.index(cell).is_some_and(|i| self.occupancy[i] == OCCUPIED)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupancy.iter().filter(|&&c| c == OCCUPIED).count()
    }

    // Persisted form of every foliage type
    pub fn to_sources(&self) -> Vec<FoliageSource> {
        self.entries
            .iter()
            .map(|entry| FoliageSource {
                source: entry.source.clone(),
                placements: entry
                    .pool
                    .iter()
                    .filter_map(|instance| {
                        let cell = parse_cell_name(&instance.name)?;
                        Some(FoliagePlacement {
                            cell: [cell.x as u32, cell.y as u32],
                            position: instance.position.to_array(),
                            yaw: instance.yaw,
                        })
                    })
                    .collect(),
            })
            .collect()
    }

    fn index(&self, cell: IVec2) -> Option<usize> {
        let in_range = cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width
            && (cell.y as usize) < self.depth;
        in_range.then(|| cell.y as usize * self.width + cell.x as usize)
    }

    // Places or erases foliage in every cell within sqrt(radius_sq) cells of
    // `center`. Returns the number of cells whose occupancy changed.
    pub fn edit_brush(
        &mut self,
        center: IVec2,
        radius_sq: f32,
        stroke: FoliageStroke,
        rng: &mut dyn RandomSource,
    ) -> usize {
        let Some((min, max)) = brush_bounds(center, radius_sq, self.width, self.depth) else {
            return 0;
        };
        let inverse_density = 1.0 - stroke.density.clamp(0.0, 1.0);
        let mut changed = 0;

        for v in min.y..=max.y {
            for u in min.x..=max.x {
                let cell = IVec2::new(u, v);
                if texel_distance_sq(cell, center) > radius_sq {
                    continue;
                }
                let index = v as usize * self.width + u as usize;

                if stroke.erase {
                    if self.occupancy[index] == OCCUPIED {
                        self.occupancy[index] = 0;
                        let name = cell_name(cell);
                        for entry in &mut self.entries {
                            entry.pool.delete_instance(&name);
                        }
                        changed += 1;
                    }
                    continue;
                }

                let exponent = rng.get_random(EXPONENT_MIN, EXPONENT_MAX);
                let period = ((inverse_density + 1.0).powf(exponent).floor() as usize).max(1);
                if self.occupancy[index] != 0 || index % period != 0 {
                    continue;
                }

                self.occupancy[index] = OCCUPIED;
                let name = cell_name(cell);
                let local = detail_cell_to_local(self.size_x, self.size_z, self.detail, cell);
                for entry in &mut self.entries {
                    if !entry.pool.insert_instance(&name) {
                        continue;
                    }
                    let position = Vec3::new(
                        local.x * stroke.scale + rng.get_random(-JITTER_XZ, JITTER_XZ),
                        rng.get_random(-JITTER_Y, 0.0),
                        local.y * stroke.scale + rng.get_random(-JITTER_XZ, JITTER_XZ),
                    );
                    entry.pool.translate_instance_to(&name, position);
                    entry.pool.rotate_instance_yaw_to(&name, rng.get_random(0.0, TAU));
                }
                changed += 1;
            }
        }

        if changed > 0 {
            self.dirty = true;
        }
        debug!(center = ?center, erase = stroke.erase, changed, "foliage brush");
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn place(density: f32) -> FoliageStroke {
        FoliageStroke {
            erase: false,
            density,
            scale: 1.0,
        }
    }

    fn erase() -> FoliageStroke {
        FoliageStroke {
            erase: true,
            density: 1.0,
            scale: 1.0,
        }
    }

    fn two_types(size: u32, detail: u32) -> FoliageGrid {
        let sources = [FoliageSource::new("grass"), FoliageSource::new("fern")];
        FoliageGrid::cluster(size, size, detail, &sources)
    }

    #[test]
    fn full_density_fills_every_cell_in_the_brush() {
        let mut grid = two_types(4, 2);
        let center = IVec2::new(4, 4);
        let radius_sq = 4.0;
        let mut rng = StdRng::seed_from_u64(1);
        let placed = grid.edit_brush(center, radius_sq, place(1.0), &mut rng);

        let mut expected = 0;
        for v in 0..8 {
            for u in 0..8 {
                let cell = IVec2::new(u, v);
                let inside = texel_distance_sq(cell, center) <= radius_sq;
                assert_eq!(grid.is_occupied(cell), inside);
                expected += inside as usize;
            }
        }
        assert_eq!(placed, expected);
        for entry in grid.entries() {
            assert_eq!(entry.pool.instance_count(), expected);
        }
    }

    #[test]
    fn full_density_ignores_the_rng() {
        let mut a = two_types(4, 2);
        let mut b = two_types(4, 2);
        a.edit_brush(IVec2::new(3, 3), 9.0, place(1.0), &mut StdRng::seed_from_u64(1));
        b.edit_brush(IVec2::new(3, 3), 9.0, place(1.0), &mut StdRng::seed_from_u64(99));
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn zero_density_is_sparse() {
        let mut grid = two_types(16, 2);
        let mut rng = StdRng::seed_from_u64(5);
        grid.edit_brush(IVec2::new(16, 16), 400.0, place(0.0), &mut rng);
        // period is at least 2^6, so only cells with index % period == 0 qualify
        assert!(grid.occupied_count() < 32 * 32 / 32);
    }

    #[test]
    fn place_then_erase_round_trips() {
        let mut grid = two_types(4, 2);
        let mut rng = StdRng::seed_from_u64(3);
        let before = grid.as_bytes().to_vec();
        let counts: Vec<usize> = grid.entries().iter().map(|e| e.pool.instance_count()).collect();

        grid.edit_brush(IVec2::new(2, 5), 2.0, place(1.0), &mut rng);
        assert!(grid.occupied_count() > 0);
        grid.edit_brush(IVec2::new(2, 5), 2.0, erase(), &mut rng);

        assert_eq!(grid.as_bytes(), before.as_slice());
        for (entry, count) in grid.entries().iter().zip(counts) {
            assert_eq!(entry.pool.instance_count(), count);
            assert_eq!(entry.pool.iter().count(), 0);
        }
    }

    #[test]
    fn placement_does_not_overwrite_occupied_cells() {
        let mut grid = two_types(4, 1);
        let mut rng = StdRng::seed_from_u64(3);
        grid.edit_brush(IVec2::new(2, 2), 1.0, place(1.0), &mut rng);
        let first = grid.entries()[0].pool.get("foliage_2_2").cloned().unwrap();
        let placed = grid.edit_brush(IVec2::new(2, 2), 1.0, place(1.0), &mut rng);
        assert_eq!(placed, 0);
        assert_eq!(grid.entries()[0].pool.get("foliage_2_2"), Some(&first));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let mut grid = two_types(4, 1);
        let mut rng = StdRng::seed_from_u64(11);
        grid.edit_brush(IVec2::new(1, 3), 0.0, place(1.0), &mut rng);
        // cell (1, 3) has its corner at local (-1, -1)
        let tree = grid.entries()[1].pool.get("foliage_1_3").unwrap();
        assert!((tree.position.x + 1.0).abs() <= JITTER_XZ + 1e-5);
        assert!((tree.position.z + 1.0).abs() <= JITTER_XZ + 1e-5);
        assert!(tree.position.y <= 0.0 && tree.position.y >= -JITTER_Y);
        assert!((0.0..TAU).contains(&tree.yaw));
    }

    #[test]
    fn cluster_restores_occupancy_from_placements() {
        let mut grid = two_types(4, 2);
        let mut rng = StdRng::seed_from_u64(8);
        grid.edit_brush(IVec2::new(5, 2), 3.0, place(1.0), &mut rng);

        let restored = FoliageGrid::cluster(4, 4, 2, &grid.to_sources());
        assert_eq!(restored.as_bytes(), grid.as_bytes());
        assert_eq!(restored.to_sources(), grid.to_sources());
    }

    #[test]
    fn cell_names_round_trip() {
        let cell = IVec2::new(12, 7);
        assert_eq!(cell_name(cell), "foliage_12_7");
        assert_eq!(parse_cell_name("foliage_12_7"), Some(cell));
        assert_eq!(parse_cell_name("rock_1_2"), None);
    }
}
