use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Rectangle in tile space: origin `(x, y)` and extent `width x height` in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TileRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of tiles covered.
    pub const fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    pub const fn right(self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub const fn bottom(self) -> u32 {
        self.y + self.height
    }

    /// Whether the region lies inside a square grid of `edge` tiles.
    pub fn fits_within(self, edge: u32) -> bool {
        let Some(right) = self.x.checked_add(self.width) else {
            return false;
        };
        let Some(bottom) = self.y.checked_add(self.height) else {
            return false;
        };
        right <= edge && bottom <= edge
    }

    pub const fn contains(self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub const fn overlaps(self, other: TileRegion) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Tile coordinates covered by the region, row by row.
    pub fn tiles(self) -> impl Iterator<Item = (u32, u32)> {
        (self.y..self.bottom()).flat_map(move |y| (self.x..self.right()).map(move |x| (x, y)))
    }
}

/// Normalized texture-space rectangle handed to shaders.
///
/// Laid out as four packed `f32`s so it can be written into a uniform buffer
/// with `bytemuck::bytes_of`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct UvRect {
    pub u: f32,
    pub v: f32,
    pub width: f32,
    pub height: f32,
}

impl UvRect {
    pub const fn u_max(self) -> f32 {
        self.u + self.width
    }

    pub const fn v_max(self) -> f32 {
        self.v + self.height
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.u, self.v, self.width, self.height]
    }
}
