use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use terrain_core::TerrainSnapshot;

// A named terrain as stored in the library collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub name: String,
    pub terrain: TerrainSnapshot,
}
