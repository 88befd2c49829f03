//! Delve Headless Level Harness
//!
//! Fuzzes level generation, field of view, and cost fields over many seeds.
//! Runs entirely in-process with no rendering and no input.
//!
//! Usage:
//!   cargo run -p delve-simtest
//!   cargo run -p delve-simtest -- --verbose
//!   cargo run -p delve-simtest -- --seeds 5000 --config level.json

use std::path::{Path, PathBuf};

use clap::Parser;
use delve_logic::config::{validate_config, GenConfig};
use delve_logic::geometry::Pos;
use delve_logic::grid::Dungeon;
use delve_logic::pathfinding::{
    cost_to_nearest_seeded, cost_to_nearest_with_source, cost_to_target, dijkstra_path, path_cost,
    FnRules, Seed, TerrainRules,
};
use delve_logic::tiles::TileKind;
use delve_logic::validation::{errors_only, validate_level};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DEFAULT_SEEDS: u64 = 1000;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Parser, Debug)]
#[command(name = "delve-simtest")]
#[command(about = "Fuzz Delve level generation, field of view, and cost fields")]
struct Args {
    /// Number of seeds to sweep
    #[arg(long, default_value_t = DEFAULT_SEEDS, value_parser = clap::value_parser!(u64).range(1..))]
    seeds: u64,

    /// JSON file with generation parameters (defaults when absent)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every result and log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&Path>) -> Result<GenConfig, String> {
    let Some(path) = path else {
        return Ok(GenConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| format!("read {}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("parse {}: {}", path.display(), e))
}

fn main() {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    println!("=== Delve Level Harness ===\n");

    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            println!("  ✗ config_load: {}", e);
            std::process::exit(1);
        }
    };
    log::info!(
        "{}x{} grid, min_leaf {}, {} seeds",
        config.width,
        config.height,
        config.min_leaf,
        args.seeds
    );

    // Out-of-range parameters are clamped during generation, so they are
    // reported but never fail the run.
    for e in validate_config(&config) {
        log::warn!("config will be clamped: {:?}", e);
    }

    let mut results = Vec::new();

    // 1. Determinism
    results.extend(validate_determinism(&config, args.seeds));

    // 2. Structure: borders, stairs, rooms
    results.extend(validate_structure(&config, args.seeds, args.verbose));

    // 3. Cost fields
    results.extend(validate_cost_fields(&config, args.seeds));

    // 4. Field of view
    results.extend(validate_visibility(&config, args.seeds));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn level(config: &GenConfig, seed: u64) -> Dungeon {
    let mut rng = StdRng::seed_from_u64(seed);
    Dungeon::generated(&mut rng, config, 1)
}

fn walkable_tiles(d: &Dungeon) -> Vec<Pos> {
    let mut out = Vec::new();
    for y in 0..d.height {
        for x in 0..d.width {
            if d.is_walkable(x, y) {
                out.push(Pos::new(x, y));
            }
        }
    }
    out
}

/// Seeds that fail a property, capped so the detail line stays readable.
fn summarize(name: &str, failures: &[u64], checked: u64) -> TestResult {
    let shown: Vec<String> = failures.iter().take(8).map(|s| s.to_string()).collect();
    TestResult {
        name: name.into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!("{} seeds ok", checked)
        } else {
            format!("{} of {} seeds failed (first: {})", failures.len(), checked, shown.join(", "))
        },
    }
}

// ── 1. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(config: &GenConfig, seeds: u64) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let checked = seeds.min(100);
    let failures: Vec<u64> = (0..checked)
        .filter(|&seed| level(config, seed) != level(config, seed))
        .collect();

    let mut reused = level(config, u64::MAX);
    reused.compute_fov(reused.width / 2, reused.height / 2, 8, true);
    let mut rng = StdRng::seed_from_u64(0);
    reused.generate_with(&mut rng, config, 1);

    vec![
        summarize("same_seed_same_level", &failures, checked),
        TestResult {
            name: "regenerate_in_place".into(),
            passed: reused == level(config, 0),
            detail: "reused level matches a fresh one".into(),
        },
    ]
}

// ── 2. Structure ────────────────────────────────────────────────────────

fn validate_structure(config: &GenConfig, seeds: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Structure ---");
    let mut disconnected = Vec::new();
    let mut invalid = Vec::new();
    let mut no_stairs = Vec::new();
    let mut rooms_total = 0usize;
    let mut braids_total = 0usize;
    let mut fallback_levels = 0u64;

    for seed in 0..seeds {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut d = Dungeon::new(config.width, config.height);
        let stats = d.generate_with(&mut rng, config, 1);
        rooms_total += stats.rooms;
        braids_total += stats.braid.tunnels;
        if stats.used_fallback_room {
            fallback_levels += 1;
        }

        let findings = validate_level(&d);
        let errors = errors_only(&findings);
        if !errors.is_empty() {
            if verbose {
                log::warn!("seed {}: {:?}", seed, errors);
            }
            invalid.push(seed);
        }

        match (d.stairs_up, d.stairs_down) {
            (Some(up), Some(down)) => {
                if d.walk_distances(up).at(down).is_none() {
                    disconnected.push(seed);
                }
            }
            _ => no_stairs.push(seed),
        }
    }

    log::info!(
        "average {:.1} rooms and {:.1} braid tunnels per level, {} fallback levels",
        rooms_total as f64 / seeds as f64,
        braids_total as f64 / seeds as f64,
        fallback_levels
    );

    vec![
        summarize("validation_clean", &invalid, seeds),
        summarize("stairs_present", &no_stairs, seeds),
        summarize("stairs_connected", &disconnected, seeds),
    ]
}

// ── 3. Cost Fields ──────────────────────────────────────────────────────

fn validate_cost_fields(config: &GenConfig, seeds: u64) -> Vec<TestResult> {
    println!("--- Cost Fields ---");
    let checked = seeds.min(50);
    let mut asymmetric = Vec::new();
    let mut mismatched = Vec::new();
    let mut bad_provenance = Vec::new();

    for seed in 0..checked {
        let d = level(config, seed);
        let tiles = walkable_tiles(&d);
        if tiles.len() < 2 {
            continue;
        }
        let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
        let a = tiles[rng.gen_range(0..tiles.len())];
        let b = tiles[rng.gen_range(0..tiles.len())];

        // Uniform costs with the terrain corner rule are symmetric.
        let uniform = FnRules::new(|x, y| d.is_passable(x, y), |_, _| 1)
            .with_diagonal(|x, y, dx, dy| d.diagonal_passable(Pos::new(x, y), dx, dy));
        let to_a = cost_to_target(d.width, d.height, a, &uniform, None);
        let to_b = cost_to_target(d.width, d.height, b, &uniform, None);
        if to_a.at(b) != to_b.at(a) {
            asymmetric.push(seed);
        }

        // A reverse field must price the forward path exactly.
        let rules = TerrainRules::new(&d);
        let field = cost_to_target(d.width, d.height, b, &rules, None);
        let path = dijkstra_path(d.width, d.height, a, b, &rules);
        let agrees = match field.at(a) {
            Some(cost) => path_cost(&path, &rules) == Some(cost),
            None => path.is_empty(),
        };
        if !agrees {
            mismatched.push(seed);
        }

        // Provenance costs equal the plain multi-source field.
        let sources: Vec<Seed> = d.rooms.iter().map(|r| Seed::new(r.center())).collect();
        let plain = cost_to_nearest_seeded(d.width, d.height, &sources, &rules, None);
        let tagged = cost_to_nearest_with_source(d.width, d.height, &sources, &rules, None);
        let labels_ok = tagged
            .costs
            .as_slice()
            .iter()
            .zip(tagged.sources())
            .all(|(&c, &s)| (c < 0) == (s < 0) && (s < 0 || (s as usize) < sources.len()));
        if tagged.costs != plain || !labels_ok {
            bad_provenance.push(seed);
        }
    }

    vec![
        summarize("uniform_fields_symmetric", &asymmetric, checked),
        summarize("reverse_matches_forward", &mismatched, checked),
        summarize("provenance_consistent", &bad_provenance, checked),
    ]
}

// ── 4. Visibility ───────────────────────────────────────────────────────

fn validate_visibility(config: &GenConfig, seeds: u64) -> Vec<TestResult> {
    println!("--- Visibility ---");
    let checked = seeds.min(50);
    let mut mask_mismatch = Vec::new();
    let mut blind_origin = Vec::new();

    let mut mask = Vec::new();
    for seed in 0..checked {
        let mut d = level(config, seed);
        let Some(up) = d.stairs_up else {
            continue;
        };
        d.compute_fov_mask(up.x, up.y, 10, &mut mask);
        d.compute_fov(up.x, up.y, 10, true);
        if d.tiles.iter().map(|t| t.visible).ne(mask.iter().copied()) {
            mask_mismatch.push(seed);
        }
        if d.tile(up.x, up.y).map_or(true, |t| !t.visible || !t.explored) {
            blind_origin.push(seed);
        }
    }

    // Corner peeks are refused even when both endpoints are open.
    let mut d = Dungeon::new(6, 6);
    for (x, y) in [(1, 1), (2, 2)] {
        d.set_kind(x, y, TileKind::Floor);
    }

    vec![
        summarize("fov_mask_matches_flags", &mask_mismatch, checked),
        summarize("fov_origin_visible", &blind_origin, checked),
        TestResult {
            name: "los_blocks_corner_peek".into(),
            passed: !d.has_line_of_sight(1, 1, 2, 2),
            detail: "diagonal between two walls is blocked".into(),
        },
    ]
}
