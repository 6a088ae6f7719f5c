// Binary terrain file format: one BSON document holding the descriptor
// fields in persisted order, the raw height and mask buffers, the material
// list and the foliage placements.
use std::fs;
use std::path::Path;

use terrain_core::TerrainSnapshot;
use tracing::info;

use crate::Result;

pub fn encode(snapshot: &TerrainSnapshot) -> Result<Vec<u8>> {
    Ok(bson::to_vec(snapshot)?)
}

pub fn decode(bytes: &[u8]) -> Result<TerrainSnapshot> {
    Ok(bson::from_slice(bytes)?)
}

pub fn write_file(path: impl AsRef<Path>, snapshot: &TerrainSnapshot) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode(snapshot)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "terrain file written");
    Ok(())
}

pub fn read_file(path: impl AsRef<Path>) -> Result<TerrainSnapshot> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let snapshot = decode(&bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "terrain file read");
    Ok(snapshot)
}
