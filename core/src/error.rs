use thiserror::Error;

// Which raster a buffer belongs to, used in error reports and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Height,
    Mask,
}

impl std::fmt::Display for GridKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GridKind::Height => "height",
            GridKind::Mask => "mask",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("{grid} buffer holds {actual} bytes, expected {expected}")]
    BufferSize {
        grid: GridKind,
        expected: usize,
        actual: usize,
    },
    #[error("invalid terrain descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("failed to parse settings: {0}")]
    SettingsParse(#[from] toml::de::Error),
    #[error("failed to serialize settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = TerrainError> = std::result::Result<T, E>;
