use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::{AtlasConfig, AtlasLayout};
use crate::error::{AtlasCreateError, AtlasError};
use crate::grid::TileGrid;
use crate::region::{TileRegion, UvRect};
use crate::reservation::{GenerationId, OwnerTag, Reservation};

/// Point-in-time summary of atlas usage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AtlasStats {
    pub size: u32,
    pub tile_size: u32,
    pub num_tiles: u32,
    pub used_tiles: usize,
    pub coverage: f32,
}

/// Square shadow map atlas split into equal tiles.
///
/// Regions are found first-fit in row-major order from the top-left tile:
/// rows are scanned top to bottom and, within a row, columns left to right.
/// The first origin whose rectangle is entirely free wins, so two atlases fed
/// the same request sequence hand out the same regions.
///
/// All mutation goes through `&mut self`; sharing an atlas across threads
/// needs an external lock.
#[derive(Debug)]
pub struct TileAtlas {
    // used_tiles == occupancy.count_reserved()
    layout: AtlasLayout,
    owner: OwnerTag,
    generation: GenerationId,
    occupancy: TileGrid,
    used_tiles: usize,
}

impl TileAtlas {
    pub fn new(size: u32, tile_size: u32) -> Result<Self, AtlasCreateError> {
        Self::from_config(AtlasConfig::new(size, tile_size))
    }

    pub fn from_config(config: AtlasConfig) -> Result<Self, AtlasCreateError> {
        let layout = AtlasLayout::from_config(config)?;
        debug!(
            size = layout.size,
            tile_size = layout.tile_size,
            num_tiles = layout.num_tiles,
            "created shadow tile atlas"
        );
        Ok(Self {
            layout,
            owner: OwnerTag::next(),
            generation: GenerationId::new(0),
            occupancy: TileGrid::new(layout.num_tiles, layout.total_tiles),
            used_tiles: 0,
        })
    }

    pub const fn config(&self) -> AtlasConfig {
        self.layout.config()
    }

    /// Atlas edge length in pixels.
    pub const fn size(&self) -> u32 {
        self.layout.size
    }

    /// Tile edge length in pixels.
    pub const fn tile_size(&self) -> u32 {
        self.layout.tile_size
    }

    /// Atlas edge length in tiles.
    pub const fn num_tiles(&self) -> u32 {
        self.layout.num_tiles
    }

    pub const fn total_tiles(&self) -> usize {
        self.layout.total_tiles
    }

    pub const fn owner_tag(&self) -> OwnerTag {
        self.owner
    }

    pub const fn generation(&self) -> GenerationId {
        self.generation
    }

    /// Whether tile `(x, y)` is reserved. Bounds are only debug-asserted.
    #[inline]
    pub fn tile(&self, x: u32, y: u32) -> bool {
        self.occupancy.get(x, y)
    }

    /// Bounds-checked [`tile`](Self::tile), `None` outside the grid.
    pub fn try_tile(&self, x: u32, y: u32) -> Option<bool> {
        self.occupancy.try_get(x, y)
    }

    /// Raw tile write. Leaves `used_tiles` alone; callers account for it.
    #[inline]
    fn set_tile(&mut self, x: u32, y: u32, flag: bool) {
        self.occupancy.set(x, y, flag);
    }

    /// Whether every tile in `region` is free.
    ///
    /// `region` must lie inside the grid; that is only debug-asserted. Each row
    /// is tested as one bit slice, so the scan has no per-tile bounds checks.
    pub fn region_is_free(&self, region: TileRegion) -> bool {
        debug_assert!(
            region.fits_within(self.num_tiles()),
            "region {region:?} exceeds {n}x{n} tile grid",
            n = self.num_tiles()
        );
        (region.y..region.bottom())
            .all(|y| self.occupancy.row_span(region.x, y, region.width).not_any())
    }

    fn region_is_reserved(&self, region: TileRegion) -> bool {
        (region.y..region.bottom())
            .all(|y| self.occupancy.row_span(region.x, y, region.width).all())
    }

    /// Tiles per edge needed for a shadow map of `resolution` pixels.
    ///
    /// A resolution that is not a multiple of the tile size is a caller bug: it
    /// is logged and `1` is returned so the caller gets a recognisably
    /// degenerate single-tile answer.
    pub fn required_tiles(&self, resolution: u32) -> u32 {
        debug_assert!(resolution > 0, "shadow resolution must be greater than zero");
        match self.try_required_tiles(resolution) {
            Ok(tiles) => tiles,
            Err(err) => {
                error!(resolution, tile_size = self.tile_size(), "{err}");
                1
            }
        }
    }

    /// Checked form of [`required_tiles`](Self::required_tiles).
    pub fn try_required_tiles(&self, resolution: u32) -> Result<u32, AtlasError> {
        if resolution == 0 {
            return Err(AtlasError::ZeroResolution);
        }
        let tile_size = self.tile_size();
        if resolution % tile_size != 0 {
            return Err(AtlasError::ResolutionNotMultiple {
                resolution,
                tile_size,
            });
        }
        Ok(resolution / tile_size)
    }

    /// First free `width x height` region in scan order, without reserving it.
    pub fn find_free_region(&self, width: u32, height: u32) -> Result<TileRegion, AtlasError> {
        let num_tiles = self.num_tiles();
        if width == 0 || height == 0 || width > num_tiles || height > num_tiles {
            return Err(AtlasError::InvalidExtent {
                width,
                height,
                num_tiles,
            });
        }

        let area = width as usize * height as usize;
        if area <= self.num_free_tiles() {
            for y in 0..=num_tiles - height {
                for x in 0..=num_tiles - width {
                    let candidate = TileRegion::new(x, y, width, height);
                    if self.region_is_free(candidate) {
                        return Ok(candidate);
                    }
                }
            }
        }

        Err(AtlasError::OutOfSpace { width, height })
    }

    /// Reserves the first free `width x height` region.
    ///
    /// On failure nothing is reserved.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn find_and_reserve_region(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<TileRegion, AtlasError> {
        let region = match self.find_free_region(width, height) {
            Ok(region) => region,
            Err(err) => {
                warn!(
                    width,
                    height,
                    used_tiles = self.used_tiles,
                    "shadow tile reservation failed: {err}"
                );
                return Err(err);
            }
        };
        for (x, y) in region.tiles() {
            self.set_tile(x, y, true);
        }
        self.used_tiles += region.area();
        debug_assert_eq!(self.used_tiles, self.occupancy.count_reserved());
        debug!(?region, used_tiles = self.used_tiles, "reserved shadow tiles");
        Ok(region)
    }

    /// Frees a region returned by
    /// [`find_and_reserve_region`](Self::find_and_reserve_region).
    ///
    /// Freeing a region twice, or one that was never reserved, is a contract
    /// violation and only caught by debug assertions.
    pub fn free_region(&mut self, region: TileRegion) {
        debug_assert!(
            region.fits_within(self.num_tiles()),
            "region {region:?} exceeds {n}x{n} tile grid",
            n = self.num_tiles()
        );
        debug_assert!(
            self.region_is_reserved(region),
            "region {region:?} is not fully reserved"
        );
        for (x, y) in region.tiles() {
            self.set_tile(x, y, false);
        }
        self.used_tiles -= region.area();
        debug_assert_eq!(self.used_tiles, self.occupancy.count_reserved());
        debug!(?region, used_tiles = self.used_tiles, "freed shadow tiles");
    }

    /// Reserves a region and wraps it in a handle tied to this atlas.
    pub fn reserve(&mut self, width: u32, height: u32) -> Result<Reservation, AtlasError> {
        let region = self.find_and_reserve_region(width, height)?;
        Ok(Reservation::new(self.owner, self.generation, region))
    }

    /// Reserves a square region large enough for a `resolution` pixel shadow map.
    ///
    /// Unlike [`required_tiles`](Self::required_tiles), a misaligned
    /// resolution is returned as an error.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn reserve_for_resolution(&mut self, resolution: u32) -> Result<Reservation, AtlasError> {
        let tiles = self.try_required_tiles(resolution)?;
        self.reserve(tiles, tiles)
    }

    /// Returns the tiles of `reservation` to the atlas.
    ///
    /// Handles from another atlas, or issued before the last
    /// [`clear`](Self::clear), are rejected and handed back in the error.
    pub fn release(&mut self, reservation: Reservation) -> Result<TileRegion, AtlasError> {
        if reservation.owner() != self.owner {
            return Err(AtlasError::ForeignReservation(reservation));
        }
        if reservation.generation() != self.generation {
            return Err(AtlasError::StaleReservation(reservation));
        }
        let region = reservation.into_region();
        self.free_region(region);
        Ok(region)
    }

    /// Frees every tile and invalidates all outstanding reservations.
    ///
    /// Returns the number of tiles that were reserved.
    pub fn clear(&mut self) -> usize {
        let released = self.used_tiles;
        self.occupancy.fill(false);
        self.used_tiles = 0;
        self.generation = self.generation.next();
        debug!(released, "cleared shadow atlas");
        released
    }

    /// Normalized texture coordinates of a tile-space region.
    ///
    /// Both edges are divided out from tile indices, and the extent is trimmed
    /// so that `u + width` never lands past the far edge after rounding.
    pub fn region_to_uv(&self, region: TileRegion) -> UvRect {
        let num_tiles = self.num_tiles();
        let (u, width) = uv_span(region.x, region.right(), num_tiles);
        let (v, height) = uv_span(region.y, region.bottom(), num_tiles);
        UvRect {
            u,
            v,
            width,
            height,
        }
    }

    pub fn uv_for(&self, reservation: &Reservation) -> UvRect {
        self.region_to_uv(reservation.region())
    }

    pub const fn num_used_tiles(&self) -> usize {
        self.used_tiles
    }

    pub const fn num_free_tiles(&self) -> usize {
        self.layout.total_tiles - self.used_tiles
    }

    pub const fn is_empty(&self) -> bool {
        self.used_tiles == 0
    }

    pub const fn is_full(&self) -> bool {
        self.used_tiles == self.layout.total_tiles
    }

    /// Fraction of tiles reserved, in `[0, 1]`.
    pub fn coverage(&self) -> f32 {
        self.used_tiles as f32 / self.layout.total_tiles as f32
    }

    /// Reserved tile coordinates in row-major order.
    pub fn reserved_tiles(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.occupancy.iter_reserved()
    }

    pub fn stats(&self) -> AtlasStats {
        AtlasStats {
            size: self.size(),
            tile_size: self.tile_size(),
            num_tiles: self.num_tiles(),
            used_tiles: self.used_tiles,
            coverage: self.coverage(),
        }
    }
}

/// Normalized start and extent of the tile span `start..end` on an axis of
/// `num_tiles` tiles.
fn uv_span(start: u32, end: u32, num_tiles: u32) -> (f32, f32) {
    let denominator = num_tiles as f32;
    let uv_start = start as f32 / denominator;
    let uv_end = end as f32 / denominator;
    let mut extent = uv_end - uv_start;
    while extent > 0.0 && uv_start + extent > uv_end {
        extent = f32::from_bits(extent.to_bits() - 1);
    }
    (uv_start, extent)
}
