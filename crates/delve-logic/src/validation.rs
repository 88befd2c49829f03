//! Structural validation for generated levels.
//!
//! Pure functions over a finished [`Dungeon`] that return findings instead of
//! panicking, so the harness can report every problem on a level at once.

use crate::geometry::{cell_count, Rect, RoomKind};
use crate::grid::Dungeon;
use crate::tiles::TileKind;

/// A level validation finding.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

// ── A. Terrain ──────────────────────────────────────────────────────────

/// Tile storage must match the declared size.
pub fn check_tile_count(d: &Dungeon) -> Vec<ValidationError> {
    let expected = cell_count(d.width, d.height);
    if d.tiles.len() == expected {
        return Vec::new();
    }
    vec![ValidationError {
        category: "terrain",
        severity: Severity::Error,
        message: format!(
            "{}x{} level stores {} tiles, expected {}",
            d.width,
            d.height,
            d.tiles.len(),
            expected
        ),
    }]
}

/// Every tile on the outer ring must be wall.
pub fn check_borders(d: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for y in 0..d.height {
        for x in 0..d.width {
            let on_ring = x == 0 || y == 0 || x == d.width - 1 || y == d.height - 1;
            if !on_ring {
                continue;
            }
            if let Some(kind) = d.kind(x, y) {
                if kind != TileKind::Wall {
                    errors.push(ValidationError {
                        category: "terrain",
                        severity: Severity::Error,
                        message: format!("Border tile ({}, {}) is {:?}, not wall", x, y, kind),
                    });
                }
            }
        }
    }
    errors
}

// ── B. Rooms ────────────────────────────────────────────────────────────

/// No room may have zero or negative dimensions.
pub fn check_room_dimensions(d: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, r) in d.rooms.iter().enumerate() {
        if r.rect.w <= 0 || r.rect.h <= 0 {
            errors.push(ValidationError {
                category: "rooms",
                severity: Severity::Error,
                message: format!("Room #{} has non-positive dimensions: {}×{}", i, r.rect.w, r.rect.h),
            });
        }
    }
    errors
}

/// Rooms must sit inside the grid, off the outer ring.
pub fn check_rooms_in_bounds(d: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let interior = Rect::new(1, 1, d.width - 2, d.height - 2);
    for (i, r) in d.rooms.iter().enumerate() {
        if !interior.contains_rect(&r.rect) {
            errors.push(ValidationError {
                category: "rooms",
                severity: Severity::Error,
                message: format!(
                    "Room #{} ({},{})→({},{}) leaves the {}x{} interior",
                    i,
                    r.rect.x,
                    r.rect.y,
                    r.rect.x2(),
                    r.rect.y2(),
                    d.width,
                    d.height
                ),
            });
        }
    }
    errors
}

/// Rooms come from disjoint leaves and must never overlap.
pub fn check_room_overlaps(d: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for i in 0..d.rooms.len() {
        for j in (i + 1)..d.rooms.len() {
            if d.rooms[i].rect.intersects(&d.rooms[j].rect) {
                errors.push(ValidationError {
                    category: "rooms",
                    severity: Severity::Error,
                    message: format!("Rooms #{} and #{} overlap", i, j),
                });
            }
        }
    }
    errors
}

/// With three or more rooms, each special tag should appear once.
pub fn check_special_rooms(d: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if d.rooms.len() < 3 {
        return errors;
    }
    for kind in [RoomKind::Treasure, RoomKind::Lair, RoomKind::Shrine] {
        let count = d.rooms.iter().filter(|r| r.kind == kind).count();
        if count != 1 {
            errors.push(ValidationError {
                category: "rooms",
                severity: Severity::Warning,
                message: format!("{} rooms tagged {:?}, expected 1", count, kind),
            });
        }
    }
    errors
}

// ── C. Stairs ───────────────────────────────────────────────────────────

/// Exactly one of each stairs tile, at the recorded positions.
pub fn check_stairs(d: &Dungeon) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (kind, recorded) in [
        (TileKind::StairsUp, d.stairs_up),
        (TileKind::StairsDown, d.stairs_down),
    ] {
        let count = d.count_kind(kind);
        if count != 1 {
            errors.push(ValidationError {
                category: "stairs",
                severity: Severity::Error,
                message: format!("{} {:?} tiles, expected 1", count, kind),
            });
        }
        match recorded {
            Some(p) if d.kind(p.x, p.y) == Some(kind) => {}
            Some(p) => errors.push(ValidationError {
                category: "stairs",
                severity: Severity::Error,
                message: format!("{:?} recorded at ({}, {}) but tile is {:?}", kind, p.x, p.y, d.kind(p.x, p.y)),
            }),
            None => errors.push(ValidationError {
                category: "stairs",
                severity: Severity::Error,
                message: format!("No {:?} position recorded", kind),
            }),
        }
    }
    errors
}

/// Stairs should not be adjacent.
pub fn check_stairs_separation(d: &Dungeon) -> Vec<ValidationError> {
    match (d.stairs_up, d.stairs_down) {
        (Some(up), Some(down)) if up == down || up.is_adjacent8(down) => vec![ValidationError {
            category: "stairs",
            severity: Severity::Warning,
            message: format!("Stairs up {:?} and down {:?} touch", up, down),
        }],
        _ => Vec::new(),
    }
}

// ── D. Connectivity ─────────────────────────────────────────────────────

/// Stairs must be mutually reachable over passable tiles.
pub fn check_stairs_connected(d: &Dungeon) -> Vec<ValidationError> {
    let (Some(up), Some(down)) = (d.stairs_up, d.stairs_down) else {
        return Vec::new();
    };
    let mut errors = Vec::new();
    if d.walk_distances(up).at(down).is_none() {
        errors.push(ValidationError {
            category: "connectivity",
            severity: Severity::Error,
            message: format!("Stairs down {:?} unreachable from stairs up {:?}", down, up),
        });
    }
    if d.walk_distances(down).at(up).is_none() {
        errors.push(ValidationError {
            category: "connectivity",
            severity: Severity::Error,
            message: format!("Stairs up {:?} unreachable from stairs down {:?}", up, down),
        });
    }
    errors
}

/// Every room centroid should be reachable from stairs up.
pub fn check_rooms_reachable(d: &Dungeon) -> Vec<ValidationError> {
    let Some(up) = d.stairs_up else {
        return Vec::new();
    };
    let dist = d.walk_distances(up);
    let unreached: Vec<usize> = d
        .rooms
        .iter()
        .enumerate()
        .filter(|(_, r)| dist.at(r.center()).is_none())
        .map(|(i, _)| i)
        .collect();

    if unreached.is_empty() {
        return Vec::new();
    }
    vec![ValidationError {
        category: "connectivity",
        severity: Severity::Warning,
        message: format!(
            "{} of {} rooms unreachable from stairs up (e.g. room #{})",
            unreached.len(),
            d.rooms.len(),
            unreached[0]
        ),
    }]
}

// ── Master validation ───────────────────────────────────────────────────

/// Run every level check and return combined results.
pub fn validate_level(d: &Dungeon) -> Vec<ValidationError> {
    let mut all = check_tile_count(d);
    if !all.is_empty() {
        // Every other check indexes tiles.
        return all;
    }
    all.extend(check_borders(d));
    all.extend(check_room_dimensions(d));
    all.extend(check_rooms_in_bounds(d));
    all.extend(check_room_overlaps(d));
    all.extend(check_special_rooms(d));
    all.extend(check_stairs(d));
    all.extend(check_stairs_separation(d));
    all.extend(check_stairs_connected(d));
    all.extend(check_rooms_reachable(d));
    all
}

/// Only the `Error`-severity findings.
pub fn errors_only(findings: &[ValidationError]) -> Vec<&ValidationError> {
    findings.iter().filter(|e| e.severity == Severity::Error).collect()
}
