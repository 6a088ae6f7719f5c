// terrain_core holds the editable terrain: grids, brushes, foliage and the editor facade
pub mod brush;
pub mod descriptor;
pub mod error;
pub mod foliage;
pub mod height;
pub mod instance;
pub mod logging;
pub mod mapper;
pub mod mask;
pub mod preview;
pub mod rng;
pub mod settings;
pub mod terrain;
pub mod texture;
pub mod water;

pub use brush::{EditMode, Selection, intersect_ray_plane};
pub use descriptor::TerrainDescriptor;
pub use error::{GridKind, TerrainError};
pub use foliage::{FoliageGrid, FoliagePlacement, FoliageSource, FoliageStroke};
pub use height::{HeightEdit, HeightField};
pub use instance::{InstancePool, NamedInstanceStore};
pub use mask::{MaskGrid, MaskLayer, MaskStroke};
pub use rng::RandomSource;
pub use settings::EditorSettings;
pub use terrain::{Terrain, TerrainDrawData, TerrainEditor, TerrainSnapshot};
pub use texture::{CpuTexture, RawTexture, TerrainTextures};
pub use water::{WaterPlane, Wind};
