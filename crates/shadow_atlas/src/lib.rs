//! Tile allocator for a shared shadow map atlas.
//!
//! A [`TileAtlas`] splits a square texture into equal square tiles, reserves
//! free rectangles of tiles first-fit, and converts them to normalized UV
//! rectangles for shaders.
//!
//! There are two ways to reserve and release:
//! - [`TileAtlas::reserve`] / [`TileAtlas::release`] hand out a [`Reservation`]
//!   handle that can only be returned once, and only to the atlas that issued it.
//! - [`TileAtlas::find_and_reserve_region`] / [`TileAtlas::free_region`] work on
//!   bare [`TileRegion`]s. Callers keep track of what they reserved; freeing a
//!   wrong region is only caught by debug assertions.

mod atlas;
mod config;
mod error;
mod grid;
mod region;
mod reservation;

pub use atlas::{AtlasStats, TileAtlas};
pub use config::{AtlasConfig, DEFAULT_ATLAS_SIZE, DEFAULT_TILE_SIZE};
pub use error::{AtlasCreateError, AtlasError};
pub use region::{TileRegion, UvRect};
pub use reservation::{GenerationId, Id, OwnerTag, Reservation};

#[cfg(test)]
mod tests;
