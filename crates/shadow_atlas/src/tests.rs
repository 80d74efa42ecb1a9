use super::*;

/// Deterministic xorshift64 so sequences are reproducible across runs.
struct Sequence(u64);

impl Sequence {
    fn next(&mut self) -> u64 {
        let mut value = self.0;
        value ^= value << 13;
        value ^= value >> 7;
        value ^= value << 17;
        self.0 = value;
        value
    }

    fn below(&mut self, bound: u32) -> u32 {
        (self.next() % bound as u64) as u32
    }
}

fn assert_counts_consistent(atlas: &TileAtlas) {
    assert_eq!(atlas.num_used_tiles(), atlas.reserved_tiles().count());
    assert_eq!(
        atlas.coverage(),
        atlas.num_used_tiles() as f32 / atlas.total_tiles() as f32
    );
}

#[test]
fn shadow_atlas_walkthrough_1024_by_128() {
    let mut atlas = TileAtlas::new(1024, 128).expect("create atlas");
    assert_eq!(atlas.num_tiles(), 8);

    let region = atlas.find_and_reserve_region(2, 2).expect("reserve 2x2");
    assert_eq!(region, TileRegion::new(0, 0, 2, 2));
    assert_eq!(atlas.num_used_tiles(), 4);
    assert_eq!(atlas.coverage(), 0.0625);
    assert_eq!(
        atlas.region_to_uv(region),
        UvRect {
            u: 0.0,
            v: 0.0,
            width: 0.25,
            height: 0.25
        }
    );

    atlas.free_region(region);
    assert_eq!(atlas.num_used_tiles(), 0);
    assert_eq!(atlas.coverage(), 0.0);
    assert_eq!(atlas.required_tiles(300), 1);
}

#[test]
fn reserved_regions_never_overlap() {
    let mut atlas = TileAtlas::new(2048, 128).expect("create atlas");
    let mut sequence = Sequence(0x9E37_79B9_7F4A_7C15);
    let mut held: Vec<TileRegion> = Vec::new();

    for _ in 0..200 {
        let width = 1 + sequence.below(4);
        let height = 1 + sequence.below(4);
        let Ok(region) = atlas.find_and_reserve_region(width, height) else {
            continue;
        };
        assert!(held.iter().all(|other| !other.overlaps(region)));
        held.push(region);
    }
    assert!(!held.is_empty());
    assert_counts_consistent(&atlas);
}

#[test]
fn random_reserve_and_free_keeps_counter_exact() {
    let mut atlas = TileAtlas::new(1024, 64).expect("create atlas");
    let mut sequence = Sequence(0xDEAD_BEEF_CAFE_F00D);
    let mut held: Vec<TileRegion> = Vec::new();

    for _ in 0..1_000 {
        let coverage_before = atlas.coverage();
        let used_before = atlas.num_used_tiles();
        if held.is_empty() || sequence.below(3) != 0 {
            let width = 1 + sequence.below(5);
            let height = 1 + sequence.below(5);
            match atlas.find_and_reserve_region(width, height) {
                Ok(region) => {
                    assert!(!atlas.region_is_free(region));
                    assert!(region.tiles().all(|(x, y)| atlas.tile(x, y)));
                    assert_eq!(atlas.num_used_tiles(), used_before + region.area());
                    assert!(atlas.coverage() > coverage_before);
                    held.push(region);
                }
                Err(AtlasError::OutOfSpace { .. }) => {
                    assert_eq!(atlas.num_used_tiles(), used_before);
                }
                Err(err) => panic!("unexpected reservation failure: {err}"),
            }
        } else {
            let index = sequence.below(held.len() as u32) as usize;
            let region = held.swap_remove(index);
            atlas.free_region(region);
            assert!(atlas.region_is_free(region));
            assert_eq!(atlas.num_used_tiles(), used_before - region.area());
            assert!(atlas.coverage() < coverage_before);
        }
        assert_counts_consistent(&atlas);
    }

    for region in held.drain(..) {
        atlas.free_region(region);
    }
    assert!(atlas.is_empty());
    assert_counts_consistent(&atlas);
}

#[test]
fn full_atlas_rejects_every_size() {
    let mut atlas = TileAtlas::new(512, 128).expect("create atlas");
    let mut held = Vec::new();
    while let Ok(reservation) = atlas.reserve(1, 1) {
        held.push(reservation);
    }
    assert_eq!(held.len(), 16);
    assert!(atlas.is_full());
    assert_eq!(atlas.coverage(), 1.0);

    let before: Vec<_> = atlas.reserved_tiles().collect();
    for size in 1..=4 {
        assert_eq!(
            atlas.find_and_reserve_region(size, size),
            Err(AtlasError::OutOfSpace {
                width: size,
                height: size
            })
        );
    }
    assert_eq!(atlas.num_used_tiles(), 16);
    assert_eq!(atlas.reserved_tiles().collect::<Vec<_>>(), before);

    for reservation in held {
        atlas.release(reservation).expect("release own reservation");
    }
    assert!(atlas.is_empty());
}

#[test]
fn per_light_handles_round_trip_through_uv() {
    let mut atlas = TileAtlas::from_config(AtlasConfig::new(4096, 256)).expect("create atlas");
    let sun = atlas.reserve_for_resolution(2048).expect("sun");
    let spot = atlas.reserve_for_resolution(512).expect("spot");
    let point = atlas.reserve_for_resolution(256).expect("point");

    assert_eq!(sun.region(), TileRegion::new(0, 0, 8, 8));
    assert_eq!(spot.region(), TileRegion::new(8, 0, 2, 2));
    assert_eq!(point.region(), TileRegion::new(10, 0, 1, 1));
    assert_eq!(atlas.uv_for(&sun).to_array(), [0.0, 0.0, 0.5, 0.5]);
    assert_eq!(atlas.uv_for(&spot).to_array(), [0.5, 0.0, 0.125, 0.125]);

    let sun_region = atlas.release(sun).expect("release sun");
    assert!(atlas.region_is_free(sun_region));
    assert_eq!(atlas.num_used_tiles(), 5);
    atlas.release(spot).expect("release spot");
    atlas.release(point).expect("release point");
    assert!(atlas.is_empty());
}
