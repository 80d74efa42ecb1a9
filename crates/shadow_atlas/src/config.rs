use serde::{Deserialize, Serialize};

use crate::error::AtlasCreateError;

pub const DEFAULT_ATLAS_SIZE: u32 = 4096;
pub const DEFAULT_TILE_SIZE: u32 = 128;

/// Construction parameters, read once from the render pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AtlasConfig {
    /// Atlas edge length in pixels.
    pub size: u32,
    /// Tile edge length in pixels. `size` must be a multiple of it.
    pub tile_size: u32,
}

impl AtlasConfig {
    pub const fn new(size: u32, tile_size: u32) -> Self {
        Self { size, tile_size }
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ATLAS_SIZE, DEFAULT_TILE_SIZE)
    }
}

/// Validated dimensions derived from an [`AtlasConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AtlasLayout {
    pub size: u32,
    pub tile_size: u32,
    pub num_tiles: u32,
    pub total_tiles: usize,
}

impl AtlasLayout {
    pub(crate) fn from_config(config: AtlasConfig) -> Result<Self, AtlasCreateError> {
        if config.tile_size == 0 {
            return Err(AtlasCreateError::ZeroTileSize);
        }
        if config.size == 0 {
            return Err(AtlasCreateError::ZeroAtlasSize);
        }
        if config.size % config.tile_size != 0 {
            return Err(AtlasCreateError::SizeNotMultipleOfTileSize {
                size: config.size,
                tile_size: config.tile_size,
            });
        }
        let num_tiles = config.size / config.tile_size;
        let total_tiles = (num_tiles as usize)
            .checked_mul(num_tiles as usize)
            .ok_or(AtlasCreateError::TileGridTooLarge { num_tiles })?;
        Ok(Self {
            size: config.size,
            tile_size: config.tile_size,
            num_tiles,
            total_tiles,
        })
    }

    pub(crate) const fn config(self) -> AtlasConfig {
        AtlasConfig::new(self.size, self.tile_size)
    }
}
