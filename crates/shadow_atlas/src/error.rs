use thiserror::Error;

use crate::reservation::Reservation;

/// Rejected atlas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AtlasCreateError {
    #[error("tile size must be at least one pixel")]
    ZeroTileSize,
    #[error("atlas size must be at least one pixel")]
    ZeroAtlasSize,
    #[error("atlas size {size} is not a multiple of tile size {tile_size}")]
    SizeNotMultipleOfTileSize { size: u32, tile_size: u32 },
    #[error("tile grid of {num_tiles}x{num_tiles} tiles is too large")]
    TileGridTooLarge { num_tiles: u32 },
}

/// Recoverable failures of reservation requests.
///
/// None of these leave tiles partially reserved or change the used tile count.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum AtlasError {
    #[error("no free {width}x{height} tile region left in the atlas")]
    OutOfSpace { width: u32, height: u32 },
    #[error("extent {width}x{height} does not fit a {num_tiles}x{num_tiles} tile grid")]
    InvalidExtent {
        width: u32,
        height: u32,
        num_tiles: u32,
    },
    #[error("shadow resolution must be greater than zero")]
    ZeroResolution,
    #[error("shadow resolution {resolution} is not a multiple of tile size {tile_size}")]
    ResolutionNotMultiple { resolution: u32, tile_size: u32 },
    /// The handle was issued by another atlas; it is handed back untouched.
    #[error("reservation was issued by a different atlas")]
    ForeignReservation(Reservation),
    /// The atlas was cleared after the handle was issued.
    #[error("reservation predates the last atlas clear")]
    StaleReservation(Reservation),
}
