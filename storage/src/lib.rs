// storage holds the terrain file codec and the MongoDB terrain library

pub mod codec;
pub mod models;

use bson::{Document, doc};
use futures_util::stream::TryStreamExt;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use terrain_core::{TerrainError, TerrainSnapshot};
use thiserror::Error;
use tracing::info;

use crate::models::TerrainDoc;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to encode terrain: {0}")]
    Encode(#[from] bson::ser::Error),
    #[error("failed to decode terrain: {0}")]
    Decode(#[from] bson::de::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Terrain(#[from] TerrainError),
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type Result<T, E = StorageError> = std::result::Result<T, E>;

// Named terrains kept in a MongoDB collection
pub struct TerrainLibrary {
    col: Collection<TerrainDoc>,
}

impl TerrainLibrary {
    // Connect and make sure terrain names are unique
    pub async fn init(uri: &str, db_name: &str, col_name: &str) -> Result<Self> {
        let mut opts = ClientOptions::parse(uri).await?;
        opts.app_name = Some("TerrainLibrary".to_string());
        let client = Client::with_options(opts)?;
        let col = client.database(db_name).collection(col_name);

        let index_model = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        col.create_index(index_model).await?;

        info!(db = db_name, collection = col_name, "terrain library ready");
        Ok(Self { col })
    }

    pub async fn list_names(&self) -> Result<Vec<String>> {
        // skip the grid buffers, only the names are needed
        let names_only = self.col.clone_with_type::<Document>();
        let mut cursor = names_only
            .find(doc! {})
            .projection(doc! { "name": 1 })
            .await?;
        let mut names = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            if let Ok(name) = doc.get_str("name") {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    pub async fn read_by_name(&self, name: &str) -> Result<Option<TerrainSnapshot>> {
        let found = self.col.find_one(doc! { "name": name }).await?;
        Ok(found.map(|doc| doc.terrain))
    }

    // Store a terrain under `name`, replacing any previous version
    pub async fn save(&self, name: &str, terrain: &TerrainSnapshot) -> Result<()> {
        self.col.delete_one(doc! { "name": name }).await?;
        self.col
            .insert_one(TerrainDoc {
                id: None,
                name: name.to_string(),
                terrain: terrain.clone(),
            })
            .await?;
        info!(name, "terrain stored in library");
        Ok(())
    }

    pub async fn delete_by_name(&self, name: &str) -> Result<()> {
        self.col.delete_one(doc! { "name": name }).await?;
        Ok(())
    }
}
