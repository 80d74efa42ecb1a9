use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::region::TileRegion;

static NEXT_ATLAS_OWNER_TAG: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Id<Tag, Repr> {
    raw: Repr,
    _marker: PhantomData<Tag>,
}

impl<Tag, Repr: Copy> Copy for Id<Tag, Repr> {}

impl<Tag, Repr: Copy> Clone for Id<Tag, Repr> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Tag, Repr> Id<Tag, Repr> {
    pub(crate) const fn new(raw: Repr) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub const fn raw(self) -> Repr
    where
        Repr: Copy,
    {
        self.raw
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum OwnerTagKind {}
/// Identifies the atlas that issued a reservation.
pub type OwnerTag = Id<OwnerTagKind, u64>;

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum GenerationKind {}
/// Bumped every time an atlas is cleared wholesale.
pub type GenerationId = Id<GenerationKind, u32>;

impl OwnerTag {
    pub(crate) fn next() -> Self {
        OwnerTag::new(NEXT_ATLAS_OWNER_TAG.fetch_add(1, Ordering::Relaxed))
    }
}

impl GenerationId {
    pub(crate) const fn next(self) -> Self {
        GenerationId::new(self.raw.wrapping_add(1))
    }
}

/// Tiles handed out by [`TileAtlas::reserve`](crate::TileAtlas::reserve).
///
/// Not `Clone`: moving the handle back into
/// [`TileAtlas::release`](crate::TileAtlas::release) is the only way to return
/// its tiles, so a reservation cannot be released twice.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a reservation keeps its tiles reserved until the atlas is cleared"]
pub struct Reservation {
    owner: OwnerTag,
    generation: GenerationId,
    region: TileRegion,
}

impl Reservation {
    pub(crate) const fn new(owner: OwnerTag, generation: GenerationId, region: TileRegion) -> Self {
        Self {
            owner,
            generation,
            region,
        }
    }

    pub const fn region(&self) -> TileRegion {
        self.region
    }

    pub const fn owner(&self) -> OwnerTag {
        self.owner
    }

    pub const fn generation(&self) -> GenerationId {
        self.generation
    }

    pub const fn area(&self) -> usize {
        self.region.area()
    }

    pub(crate) fn into_region(self) -> TileRegion {
        self.region
    }
}
