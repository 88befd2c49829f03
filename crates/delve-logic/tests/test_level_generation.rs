//! Integration tests for the level generation pipeline.
//!
//! Exercises: GenConfig → generate_with → stairs/borders → validate_level
//! across many seeds and sizes.

use delve_logic::config::{validate_config, BraidStyle, GenConfig};
use delve_logic::geometry::RoomKind;
use delve_logic::grid::Dungeon;
use delve_logic::tiles::TileKind;
use delve_logic::validation::{errors_only, validate_level, Severity};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ────────────────────────────────────────────────────────────

fn level(seed: u64, config: &GenConfig) -> Dungeon {
    let mut rng = StdRng::seed_from_u64(seed);
    Dungeon::generated(&mut rng, config, 1)
}

fn border_is_wall(d: &Dungeon) -> bool {
    (0..d.width).all(|x| d.kind(x, 0) == Some(TileKind::Wall) && d.kind(x, d.height - 1) == Some(TileKind::Wall))
        && (0..d.height)
            .all(|y| d.kind(0, y) == Some(TileKind::Wall) && d.kind(d.width - 1, y) == Some(TileKind::Wall))
}

// ── Determinism ────────────────────────────────────────────────────────

#[test]
fn same_seed_reproduces_level() {
    let config = GenConfig::default();
    for seed in [0, 1, 99, 12345] {
        let a = level(seed, &config);
        let b = level(seed, &config);
        assert_eq!(a.tiles, b.tiles, "seed {seed}");
        assert_eq!(a.rooms, b.rooms, "seed {seed}");
        assert_eq!(a.stairs_up, b.stairs_up);
        assert_eq!(a.stairs_down, b.stairs_down);
    }
}

#[test]
fn regenerating_in_place_matches_fresh_level() {
    let config = GenConfig::default();
    let fresh = level(7, &config);

    let mut reused = level(8, &config);
    reused.compute_fov(10, 10, 8, true);
    let mut rng = StdRng::seed_from_u64(7);
    reused.generate(&mut rng, 1, 10);
    assert_eq!(reused, fresh, "old tiles and flags must not leak through");
}

// ── Connectivity and borders fuzz ──────────────────────────────────────

#[test]
fn stairs_connected_for_ten_thousand_seeds() {
    let config = GenConfig::with_size(60, 40);
    for seed in 0..10_000u64 {
        let d = level(seed, &config);
        let up = d.stairs_up.expect("stairs up");
        let down = d.stairs_down.expect("stairs down");
        assert_ne!(up, down, "seed {seed}");
        assert!(d.walk_distances(up).at(down).is_some(), "seed {seed}: stairs disconnected");
        assert!(border_is_wall(&d), "seed {seed}: border breached");
    }
}

#[test]
fn generated_levels_pass_validation() {
    for (w, h) in [(105, 66), (80, 50), (40, 24), (20, 12)] {
        let config = GenConfig::with_size(w, h);
        assert!(validate_config(&config).is_empty());
        for seed in 0..50 {
            let d = level(seed, &config);
            let findings = validate_level(&d);
            let errors = errors_only(&findings);
            assert!(errors.is_empty(), "{w}x{h} seed {seed}: {errors:?}");
        }
    }
}

#[test]
fn every_room_reachable_on_default_size() {
    let config = GenConfig::default();
    for seed in 0..100 {
        let d = level(seed, &config);
        let dist = d.walk_distances(d.stairs_up.unwrap());
        for (i, room) in d.rooms.iter().enumerate() {
            assert!(dist.at(room.center()).is_some(), "seed {seed}: room #{i} cut off");
        }
    }
}

#[test]
fn heavy_braiding_keeps_levels_sound() {
    let config = GenConfig {
        braid: BraidStyle::Heavy,
        ..GenConfig::with_size(80, 50)
    };
    let mut tunnels = 0;
    for seed in 0..500u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut d = Dungeon::new(0, 0);
        let stats = d.generate_with(&mut rng, &config, 12);
        tunnels += stats.braid.tunnels;

        let up = d.stairs_up.expect("stairs up");
        let down = d.stairs_down.expect("stairs down");
        assert!(d.walk_distances(up).at(down).is_some(), "seed {seed}: stairs disconnected");
        assert!(border_is_wall(&d), "seed {seed}: border breached");
        let findings = validate_level(&d);
        assert!(errors_only(&findings).is_empty(), "seed {seed}: {findings:?}");
    }
    assert!(tunnels > 0, "heavy braiding never dug a tunnel");
}

#[test]
fn braiding_only_adds_floor() {
    let base = GenConfig {
        braid: BraidStyle::Off,
        ..GenConfig::default()
    };
    for seed in 0..30u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut plain = Dungeon::new(0, 0);
        let stats = plain.generate_with(&mut rng, &base, 4);
        assert_eq!(stats.braid.tunnels, 0);
        assert_eq!(stats.braid.tiles, 0);

        // Braiding runs after branches and draws from the stream only then,
        // so everything carved before it matches the unbraided level.
        let mut rng = StdRng::seed_from_u64(seed);
        let mut braided = Dungeon::new(0, 0);
        let stats = braided.generate_with(&mut rng, &GenConfig::default(), 4);
        assert_eq!(braided.rooms, plain.rooms, "seed {seed}");
        let walls = braided.count_kind(TileKind::Wall);
        assert_eq!(walls + stats.braid.tiles, plain.count_kind(TileKind::Wall), "seed {seed}");
    }
}

// ── Stairs placement ───────────────────────────────────────────────────

#[test]
fn stairs_down_is_the_farthest_room() {
    let config = GenConfig::default();
    for seed in 0..25 {
        let d = level(seed, &config);
        let up = d.stairs_up.unwrap();
        let down = d.stairs_down.unwrap();
        let dist = d.walk_distances(up);
        let down_dist = dist.at(down).unwrap();
        for room in &d.rooms {
            if let Some(other) = dist.at(room.center()) {
                assert!(other <= down_dist, "seed {seed}: room at {other} beats stairs at {down_dist}");
            }
        }
        assert!(!up.is_adjacent8(down));
    }
}

// ── Config variations ──────────────────────────────────────────────────

#[test]
fn larger_leaves_mean_fewer_rooms() {
    let small = GenConfig::default();
    let large = GenConfig {
        min_leaf: 16,
        ..GenConfig::default()
    };
    let mut small_total = 0;
    let mut large_total = 0;
    for seed in 0..20 {
        small_total += level(seed, &small).rooms.len();
        large_total += level(seed, &large).rooms.len();
    }
    assert!(large_total < small_total);
}

#[test]
fn invalid_config_is_clamped_not_rejected() {
    let config = GenConfig {
        width: 50,
        height: 30,
        min_leaf: 1,
        min_room_w: 0,
        min_room_h: 0,
        door_attempts: 0,
        special_room_attempts: 0,
        branch_len_min: 9,
        branch_len_max: 1,
        braid: BraidStyle::Heavy,
    };
    assert!(!validate_config(&config).is_empty());
    let d = level(3, &config);
    assert_eq!((d.width, d.height), (50, 30));
    assert!(d.stairs_up.is_some() && d.stairs_down.is_some());
    assert!(errors_only(&validate_level(&d)).is_empty());
}

#[test]
fn special_rooms_are_distinct_on_big_maps() {
    let config = GenConfig::default();
    for seed in 0..50 {
        let d = level(seed, &config);
        for kind in [RoomKind::Treasure, RoomKind::Lair, RoomKind::Shrine] {
            let count = d.rooms.iter().filter(|r| r.kind == kind).count();
            assert_eq!(count, 1, "seed {seed}: {kind:?}");
        }
        let findings = validate_level(&d);
        assert!(findings.iter().all(|f| f.severity != Severity::Error));
    }
}

// ── Persistence ────────────────────────────────────────────────────────

#[test]
fn level_survives_json() {
    let d = level(5, &GenConfig::with_size(40, 24));
    let json = serde_json::to_string(&d).unwrap();
    let back: Dungeon = serde_json::from_str(&json).unwrap();
    assert_eq!(back, d);
    let up = d.stairs_up.unwrap();
    assert_eq!(back.kind(up.x, up.y), Some(TileKind::StairsUp));
}
