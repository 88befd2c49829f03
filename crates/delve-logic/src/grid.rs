//! The dungeon grid: tiles, rooms, stairs, and bounds-checked predicates.
//!
//! Every predicate accepts any coordinate. Out-of-bounds queries get the
//! conservative answer (not walkable, not passable, opaque) instead of a
//! panic, so callers can query neighbors without pre-checking.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::{cell_count, flat_index, Pos, Room};
use crate::tiles::{Tile, TileKind};

/// Default map size used by the harness and `Dungeon::default`.
pub const DEFAULT_WIDTH: i32 = 105;
pub const DEFAULT_HEIGHT: i32 = 66;

/// A single dungeon level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    pub width: i32,
    pub height: i32,
    /// Row-major, `width * height`.
    pub tiles: Vec<Tile>,
    pub rooms: Vec<Room>,
    pub stairs_up: Option<Pos>,
    pub stairs_down: Option<Pos>,
    /// Depth this level was generated for.
    pub depth: i32,
}

impl Default for Dungeon {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Dungeon {
    /// All-wall grid. Negative dimensions are treated as zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![Tile::WALL; cell_count(width, height)],
            rooms: Vec::new(),
            stairs_up: None,
            stairs_down: None,
            depth: 0,
        }
    }

    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Row-major index, or `None` out of bounds.
    pub const fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(flat_index(self.width, x, y))
        } else {
            None
        }
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        self.index_of(x, y).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        match self.index_of(x, y) {
            Some(i) => Some(&mut self.tiles[i]),
            None => None,
        }
    }

    /// Terrain kind, or `None` out of bounds.
    pub fn kind(&self, x: i32, y: i32) -> Option<TileKind> {
        self.tile(x, y).map(|t| t.kind)
    }

    /// Overwrite the terrain kind. Returns false out of bounds.
    pub fn set_kind(&mut self, x: i32, y: i32, kind: TileKind) -> bool {
        match self.tile_mut(x, y) {
            Some(t) => {
                t.kind = kind;
                true
            }
            None => false,
        }
    }

    /// Reset every tile to unseen wall and forget rooms and stairs.
    pub fn fill_walls(&mut self) {
        self.tiles.fill(Tile::WALL);
        self.rooms.clear();
        self.stairs_up = None;
        self.stairs_down = None;
    }

    // ── Movement and sight ──────────────────────────────────────────────

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.kind(x, y).is_some_and(TileKind::is_walkable)
    }

    /// Walkable, or a closed/locked door a path planner may route through.
    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.kind(x, y).is_some_and(TileKind::is_passable)
    }

    pub fn is_opaque(&self, x: i32, y: i32) -> bool {
        self.kind(x, y).map_or(true, TileKind::is_opaque)
    }

    pub fn blocks_projectiles(&self, x: i32, y: i32) -> bool {
        self.kind(x, y).map_or(true, TileKind::blocks_projectiles)
    }

    /// Corner-cutting rule for a diagonal step `(dx, dy)` from `from`:
    /// allowed when at least one of the two orthogonal neighbors is walkable.
    /// Closed doors count as blocking so nothing slips around them.
    pub fn diagonal_passable(&self, from: Pos, dx: i32, dy: i32) -> bool {
        if dx == 0 || dy == 0 {
            return true;
        }
        self.is_walkable(from.x + dx, from.y) || self.is_walkable(from.x, from.y + dy)
    }

    // ── Doors ───────────────────────────────────────────────────────────

    pub fn is_door_closed(&self, x: i32, y: i32) -> bool {
        self.kind(x, y) == Some(TileKind::DoorClosed)
    }

    pub fn is_door_open(&self, x: i32, y: i32) -> bool {
        self.kind(x, y) == Some(TileKind::DoorOpen)
    }

    pub fn is_door_locked(&self, x: i32, y: i32) -> bool {
        self.kind(x, y) == Some(TileKind::DoorLocked)
    }

    /// Closed → open. Returns true if the tile changed.
    pub fn open_door(&mut self, x: i32, y: i32) -> bool {
        self.transition(x, y, TileKind::DoorClosed, TileKind::DoorOpen)
    }

    /// Open → closed.
    pub fn close_door(&mut self, x: i32, y: i32) -> bool {
        self.transition(x, y, TileKind::DoorOpen, TileKind::DoorClosed)
    }

    /// Closed → locked. Open doors must be closed first.
    pub fn lock_door(&mut self, x: i32, y: i32) -> bool {
        self.transition(x, y, TileKind::DoorClosed, TileKind::DoorLocked)
    }

    /// Locked → closed.
    pub fn unlock_door(&mut self, x: i32, y: i32) -> bool {
        self.transition(x, y, TileKind::DoorLocked, TileKind::DoorClosed)
    }

    fn transition(&mut self, x: i32, y: i32, from: TileKind, to: TileKind) -> bool {
        match self.tile_mut(x, y) {
            Some(t) if t.kind == from => {
                t.kind = to;
                true
            }
            _ => false,
        }
    }

    // ── Digging ─────────────────────────────────────────────────────────

    /// Walls, pillars, and doors can be dug, except on the outer ring.
    pub fn is_diggable(&self, x: i32, y: i32) -> bool {
        if x <= 0 || y <= 0 || x >= self.width - 1 || y >= self.height - 1 {
            return false;
        }
        self.kind(x, y).is_some_and(TileKind::is_diggable)
    }

    /// Turn a diggable tile into floor. Returns true if the tile changed.
    pub fn dig(&mut self, x: i32, y: i32) -> bool {
        if !self.is_diggable(x, y) {
            return false;
        }
        self.set_kind(x, y, TileKind::Floor)
    }

    // ── Misc queries ────────────────────────────────────────────────────

    /// Mark every tile explored (magic mapping).
    pub fn reveal_all(&mut self) {
        for t in &mut self.tiles {
            t.explored = true;
        }
    }

    /// Random standable interior tile. Falls back to a scan, then `(1, 1)`.
    pub fn random_floor<R: Rng + ?Sized>(&self, rng: &mut R, avoid_doors: bool) -> Pos {
        let accept = |kind: TileKind| match kind {
            TileKind::Floor | TileKind::StairsUp | TileKind::StairsDown => true,
            TileKind::DoorOpen | TileKind::DoorClosed => !avoid_doors,
            _ => false,
        };

        if self.width > 2 && self.height > 2 {
            for _ in 0..4000 {
                let x = rng.gen_range(1..=self.width - 2);
                let y = rng.gen_range(1..=self.height - 2);
                if self.kind(x, y).is_some_and(accept) {
                    return Pos::new(x, y);
                }
            }
        }

        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                if self.kind(x, y) == Some(TileKind::Floor) {
                    return Pos::new(x, y);
                }
            }
        }
        Pos::new(1, 1)
    }

    /// Index of the room containing `p`, if any.
    pub fn room_at(&self, p: Pos) -> Option<usize> {
        self.rooms.iter().position(|r| r.contains(p))
    }

    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|t| t.kind == kind).count()
    }
}

impl fmt::Display for Dungeon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(self.width.max(1) as usize) {
            for t in row {
                write!(f, "{}", t.kind.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn open_floor(w: i32, h: i32) -> Dungeon {
        let mut d = Dungeon::new(w, h);
        for t in &mut d.tiles {
            t.kind = TileKind::Floor;
        }
        d
    }

    #[test]
    fn test_new_grid_is_all_wall() {
        let d = Dungeon::new(10, 7);
        assert_eq!(d.tiles.len(), 70);
        assert!(d.tiles.iter().all(|t| *t == Tile::WALL));
        assert!(d.stairs_up.is_none());
    }

    #[test]
    fn test_out_of_bounds_is_conservative() {
        let d = open_floor(5, 5);
        for (x, y) in [(-1, 0), (0, -1), (5, 0), (0, 5), (i32::MAX, 2)] {
            assert!(!d.is_walkable(x, y));
            assert!(!d.is_passable(x, y));
            assert!(d.is_opaque(x, y));
            assert!(d.blocks_projectiles(x, y));
            assert!(!d.is_diggable(x, y));
            assert!(d.tile(x, y).is_none());
        }
    }

    #[test]
    fn test_mutators_ignore_out_of_bounds() {
        let mut d = Dungeon::new(5, 5);
        assert!(!d.dig(-1, 2));
        assert!(!d.open_door(9, 9));
        assert!(!d.set_kind(5, 0, TileKind::Floor));
    }

    #[test]
    fn test_door_lifecycle() {
        let mut d = Dungeon::new(10, 10);
        d.set_kind(5, 5, TileKind::DoorOpen);
        assert!(d.is_door_open(5, 5));
        assert!(d.is_walkable(5, 5));
        assert!(!d.is_opaque(5, 5));

        assert!(d.close_door(5, 5));
        assert!(d.is_door_closed(5, 5));
        assert!(d.is_passable(5, 5));
        assert!(!d.is_walkable(5, 5));
        assert!(d.is_opaque(5, 5));

        assert!(d.lock_door(5, 5));
        assert!(d.is_door_locked(5, 5));
        assert!(d.is_passable(5, 5));
        assert!(d.is_opaque(5, 5));
        assert!(!d.open_door(5, 5), "locked door must not open");

        assert!(d.unlock_door(5, 5));
        assert!(d.is_door_closed(5, 5));
        assert!(d.open_door(5, 5));
        assert_eq!(d.kind(5, 5), Some(TileKind::DoorOpen));
    }

    #[test]
    fn test_lock_requires_closed_door() {
        let mut d = Dungeon::new(10, 10);
        d.set_kind(3, 3, TileKind::DoorOpen);
        assert!(!d.lock_door(3, 3));
        d.set_kind(4, 4, TileKind::Floor);
        assert!(!d.close_door(4, 4));
    }

    #[test]
    fn test_digging() {
        let mut d = Dungeon::new(5, 5);
        assert!(d.is_diggable(2, 2));
        assert!(d.dig(2, 2));
        assert_eq!(d.kind(2, 2), Some(TileKind::Floor));
        assert!(d.is_walkable(2, 2));
        assert!(!d.is_opaque(2, 2));
        assert!(!d.dig(2, 2), "floor is not diggable");

        d.set_kind(1, 1, TileKind::DoorLocked);
        assert!(d.dig(1, 1));
        assert_eq!(d.kind(1, 1), Some(TileKind::Floor));
    }

    #[test]
    fn test_outer_ring_is_not_diggable() {
        let mut d = Dungeon::new(5, 5);
        assert!(!d.is_diggable(0, 2));
        assert!(!d.is_diggable(4, 2));
        assert!(!d.is_diggable(2, 0));
        assert!(!d.dig(2, 4));
    }

    #[test]
    fn test_diagonal_passable_needs_one_open_side() {
        let mut d = open_floor(5, 5);
        d.set_kind(2, 1, TileKind::Wall);
        d.set_kind(1, 2, TileKind::Wall);
        assert!(!d.diagonal_passable(Pos::new(1, 1), 1, 1));
        d.set_kind(2, 1, TileKind::Floor);
        assert!(d.diagonal_passable(Pos::new(1, 1), 1, 1));
        assert!(d.diagonal_passable(Pos::new(1, 1), 1, 0));
    }

    #[test]
    fn test_closed_door_blocks_corner_cutting() {
        let mut d = open_floor(5, 5);
        d.set_kind(2, 1, TileKind::DoorClosed);
        d.set_kind(1, 2, TileKind::Wall);
        assert!(!d.diagonal_passable(Pos::new(1, 1), 1, 1));
    }

    #[test]
    fn test_reveal_all() {
        let mut d = Dungeon::new(4, 4);
        d.reveal_all();
        assert!(d.tiles.iter().all(|t| t.explored && !t.visible));
    }

    #[test]
    fn test_random_floor_finds_floor() {
        let mut d = Dungeon::new(12, 8);
        d.set_kind(6, 4, TileKind::Floor);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(d.random_floor(&mut rng, true), Pos::new(6, 4));
    }

    #[test]
    fn test_random_floor_respects_avoid_doors() {
        let mut d = Dungeon::new(6, 6);
        d.set_kind(2, 2, TileKind::DoorOpen);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(d.random_floor(&mut rng, false), Pos::new(2, 2));
        // Nothing acceptable: falls through the scan to (1, 1).
        assert_eq!(d.random_floor(&mut rng, true), Pos::new(1, 1));
    }

    #[test]
    fn test_room_at_finds_containing_room() {
        let mut d = Dungeon::new(20, 10);
        d.rooms.push(Room::new(Rect::new(2, 2, 4, 3)));
        d.rooms.push(Room::new(Rect::new(10, 4, 5, 5)));
        assert_eq!(d.room_at(Pos::new(2, 2)), Some(0));
        assert_eq!(d.room_at(Pos::new(5, 4)), Some(0));
        assert_eq!(d.room_at(Pos::new(6, 4)), None, "far edge is exclusive");
        assert_eq!(d.room_at(Pos::new(14, 8)), Some(1));
        assert_eq!(d.room_at(Pos::new(-1, -1)), None);
    }

    #[test]
    fn test_display_dumps_rows() {
        let mut d = Dungeon::new(3, 2);
        d.set_kind(1, 0, TileKind::StairsDown);
        assert_eq!(d.to_string(), "#>#\n###\n");
    }
}
