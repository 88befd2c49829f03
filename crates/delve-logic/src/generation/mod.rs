//! Level generation.
//!
//! BSP pipeline, run in order on one caller-supplied RNG stream:
//!   1. partition  -- split the interior into a flat arena of leaves
//!   2. rooms      -- one room per leaf; a centered fallback room if none fit
//!   3. corridors  -- join a room from each side of every split, then extra loops
//!   4. special    -- tag treasure, lair, and shrine rooms
//!   5. branches   -- short dead-end tunnels off corridor floor
//!   6. braid      -- tunnel some corridor dead ends into loops
//!   7. stairs     -- up in room 0, down in the room farthest from it
//!   8. borders    -- outer ring back to wall
//!
//! The same seed and config always produce the same level.

use rand::Rng;

use crate::config::GenConfig;
use crate::geometry::{Pos, Rect, Room, RoomKind};
use crate::grid::Dungeon;
use crate::pathfinding::{cost_from_sources, CostField, FnRules};
use crate::tiles::TileKind;

mod braid;
mod bsp;
mod carve;

pub use braid::BraidStats;

use braid::braid_corridors;
use bsp::{partition, pick_room_in_subtree, place_rooms};
use carve::{carve_branches, carve_rect, connect_rooms};

/// Inclusive roll in `[lo, hi]`; `lo` when the range is empty.
pub(crate) fn roll<R: Rng + ?Sized>(rng: &mut R, lo: i32, hi: i32) -> i32 {
    if hi <= lo {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}

/// Counts from one generation run, for logging and the harness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenStats {
    pub leaves: usize,
    pub rooms: usize,
    pub connections: usize,
    pub branches: usize,
    pub braid: BraidStats,
    pub used_fallback_room: bool,
}

impl Dungeon {
    /// Regenerate this level in place at its current size with default
    /// parameters.
    ///
    /// Every depth currently uses the BSP layout; `depth` is recorded on the
    /// level and `max_depth` only shows up in logs.
    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R, depth: i32, max_depth: i32) -> GenStats {
        log::debug!("generating depth {}/{}", depth, max_depth);
        let config = GenConfig::with_size(self.width, self.height);
        self.generate_with(rng, &config, depth)
    }

    /// Regenerate this level from `config`, resizing to its dimensions.
    /// Out-of-range parameters are clamped, never rejected.
    pub fn generate_with<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &GenConfig, depth: i32) -> GenStats {
        let config = config.clamped();
        *self = Dungeon::new(config.width, config.height);
        self.depth = depth;

        let interior = Rect::new(1, 1, self.width - 2, self.height - 2);
        let mut nodes = partition(rng, interior, config.min_leaf);
        let mut stats = GenStats {
            leaves: nodes.iter().filter(|n| n.is_leaf()).count(),
            ..GenStats::default()
        };

        let rooms = place_rooms(rng, &mut nodes, interior, &config);
        for room in &rooms {
            carve_rect(self, room.rect);
        }
        self.rooms = rooms;
        if self.rooms.is_empty() {
            let wanted = Rect::new(self.width / 4, self.height / 4, self.width / 2, self.height / 2);
            if let Some(rect) = wanted.intersection(&interior) {
                log::warn!(
                    "no room fit on {}x{} grid, carving fallback room {:?}",
                    self.width,
                    self.height,
                    rect
                );
                carve_rect(self, rect);
                self.rooms.push(Room::new(rect));
                stats.used_fallback_room = true;
            } else {
                log::warn!("{}x{} grid has no interior, level left solid", self.width, self.height);
            }
        }
        stats.rooms = self.rooms.len();

        for i in 0..nodes.len() {
            let Some((left, right)) = nodes[i].children() else {
                continue;
            };
            let a = pick_room_in_subtree(&nodes, left, rng);
            let b = pick_room_in_subtree(&nodes, right, rng);
            if let (Some(a), Some(b)) = (a, b) {
                if a != b {
                    self.connect(a, b, rng, &config);
                    stats.connections += 1;
                }
            }
        }

        if !self.rooms.is_empty() {
            let n = self.rooms.len() as i32;
            for _ in 0..(n / 3).max(1) {
                let a = roll(rng, 0, n - 1) as usize;
                let b = roll(rng, 0, n - 1) as usize;
                if a != b {
                    self.connect(a, b, rng, &config);
                    stats.connections += 1;
                }
            }
        }

        self.assign_special_rooms(rng, config.special_room_attempts);
        stats.branches = carve_branches(self, rng, &config);
        stats.braid = braid_corridors(self, rng, config.braid, depth);
        self.place_stairs();
        self.seal_borders();

        log::debug!(
            "depth {}: {} leaves, {} rooms, {} corridors, {} branches, {} braids, stairs {:?} -> {:?}",
            depth,
            stats.leaves,
            stats.rooms,
            stats.connections,
            stats.branches,
            stats.braid.tunnels,
            self.stairs_up,
            self.stairs_down
        );
        stats
    }

    /// Build a fresh level from `config`.
    pub fn generated<R: Rng + ?Sized>(rng: &mut R, config: &GenConfig, depth: i32) -> Dungeon {
        let mut d = Dungeon::new(0, 0);
        d.generate_with(rng, config, depth);
        d
    }

    fn connect<R: Rng + ?Sized>(&mut self, a: usize, b: usize, rng: &mut R, config: &GenConfig) {
        let ra = self.rooms[a].rect;
        let rb = self.rooms[b].rect;
        connect_rooms(self, &ra, &rb, rng, config.door_attempts);
    }

    /// Tag treasure, lair, and shrine. Re-rolls to keep them distinct, up to
    /// `attempts` each; a collision that survives the budget is kept.
    fn assign_special_rooms<R: Rng + ?Sized>(&mut self, rng: &mut R, attempts: u32) {
        let n = self.rooms.len() as i32;
        if n < 3 {
            return;
        }
        let treasure = roll(rng, 0, n - 1);
        let mut lair = roll(rng, 0, n - 1);
        let mut shrine = roll(rng, 0, n - 1);

        let mut guard = 0;
        while guard < attempts && lair == treasure {
            lair = roll(rng, 0, n - 1);
            guard += 1;
        }
        let mut guard = 0;
        while guard < attempts && (shrine == treasure || shrine == lair) {
            shrine = roll(rng, 0, n - 1);
            guard += 1;
        }
        if lair == treasure || shrine == treasure || shrine == lair {
            log::trace!(
                "special rooms collide after retries: treasure {} lair {} shrine {}",
                treasure,
                lair,
                shrine
            );
        }

        self.rooms[treasure as usize].kind = RoomKind::Treasure;
        self.rooms[lair as usize].kind = RoomKind::Lair;
        self.rooms[shrine as usize].kind = RoomKind::Shrine;
    }

    /// 4-directional step counts from `from` over passable tiles.
    pub fn walk_distances(&self, from: Pos) -> CostField {
        let rules = FnRules::new(|x, y| self.is_passable(x, y), |_, _| 1)
            .with_diagonal(|_, _, _, _| false);
        cost_from_sources(self.width, self.height, &[from], &rules, None)
    }

    /// Up in room 0's centroid; down in the centroid of the room farthest
    /// from it by walking distance, first room winning ties. When no other
    /// room is reachable, down goes on the farthest reachable interior tile.
    fn place_stairs(&mut self) {
        let Some(up) = self.rooms.first().map(Room::center) else {
            return;
        };
        self.set_kind(up.x, up.y, TileKind::StairsUp);
        self.stairs_up = Some(up);

        let dist = self.walk_distances(up);
        let mut best_room = 0;
        let mut best_dist = -1;
        for (i, room) in self.rooms.iter().enumerate() {
            if let Some(d0) = dist.at(room.center()) {
                if d0 > best_dist {
                    best_dist = d0;
                    best_room = i;
                }
            }
        }

        let down = if best_room != 0 {
            Some(self.rooms[best_room].center())
        } else {
            self.farthest_interior_tile(&dist)
        };
        if let Some(p) = down {
            self.set_kind(p.x, p.y, TileKind::StairsDown);
        }
        self.stairs_down = down;
    }

    fn farthest_interior_tile(&self, dist: &CostField) -> Option<Pos> {
        let mut best: Option<(i32, Pos)> = None;
        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                let Some(d0) = dist.get(x, y) else {
                    continue;
                };
                if d0 > 0 && best.map_or(true, |(bd, _)| d0 > bd) {
                    best = Some((d0, Pos::new(x, y)));
                }
            }
        }
        if best.is_none() {
            log::warn!("no tile reachable from stairs up; level has no way down");
        }
        best.map(|(_, p)| p)
    }

    fn seal_borders(&mut self) {
        for x in 0..self.width {
            self.set_kind(x, 0, TileKind::Wall);
            self.set_kind(x, self.height - 1, TileKind::Wall);
        }
        for y in 0..self.height {
            self.set_kind(0, y, TileKind::Wall);
            self.set_kind(self.width - 1, y, TileKind::Wall);
        }
    }
}
