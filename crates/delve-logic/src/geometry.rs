//! Integer grid geometry: positions, rectangles, rooms, and direction tables.
//!
//! Coordinates are signed so callers can ask about positions just off the
//! edge of the map; every grid query answers those conservatively.

use serde::{Deserialize, Serialize};

/// The four cardinal steps, in the order generation and BFS expand them.
pub const DIRS4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Cardinal steps first, then diagonals.
pub const DIRS8: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Tiles in a `width * height` grid, multiplied in `usize` so large maps
/// cannot overflow `i32`. Negative sides count as zero.
pub(crate) fn cell_count(width: i32, height: i32) -> usize {
    width.max(0) as usize * height.max(0) as usize
}

/// Row-major index of an in-bounds `(x, y)`.
pub(crate) const fn flat_index(width: i32, x: i32, y: i32) -> usize {
    y as usize * width as usize + x as usize
}

/// Inverse of [`flat_index`].
pub(crate) const fn unflatten(width: i32, i: usize) -> Pos {
    let w = width as usize;
    Pos::new((i % w) as i32, (i / w) as i32)
}

/// A tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by `(dx, dy)`.
    pub const fn step(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// True if `other` is one of the 8 neighbors (not the same tile).
    pub fn is_adjacent8(self, other: Pos) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        dx <= 1 && dy <= 1 && dx + dy != 0
    }

    /// Squared Euclidean distance.
    pub const fn dist2(self, other: Pos) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<(i32, i32)> for Pos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. `x2`/`y2` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn x2(&self) -> i32 {
        self.x + self.w
    }

    pub const fn y2(&self) -> i32 {
        self.y + self.h
    }

    /// Integer centroid, biased toward the far edge on even sizes.
    pub const fn center(&self) -> Pos {
        Pos {
            x: self.x + self.w / 2,
            y: self.y + self.h / 2,
        }
    }

    pub const fn contains(&self, p: Pos) -> bool {
        p.x >= self.x && p.x < self.x2() && p.y >= self.y && p.y < self.y2()
    }

    /// True if `other` lies entirely inside `self`.
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x && other.y >= self.y && other.x2() <= self.x2() && other.y2() <= self.y2()
    }

    /// AABB overlap test (touching edges do not count).
    pub const fn intersects(&self, other: &Rect) -> bool {
        !(self.x2() <= other.x || other.x2() <= self.x || self.y2() <= other.y || other.y2() <= self.y)
    }

    pub const fn area(&self) -> i32 {
        self.w * self.h
    }

    /// Overlapping part of two rectangles, or `None` if they do not overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let x2 = self.x2().min(other.x2());
        let y2 = self.y2().min(other.y2());
        (x2 > x && y2 > y).then(|| Rect::new(x, y, x2 - x, y2 - y))
    }
}

/// Semantic tag on a generated room. Consumers (spawning, loot) key off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoomKind {
    #[default]
    Normal,
    Treasure,
    Lair,
    Shrine,
    /// Hidden room behind a secret door.
    Secret,
    /// Treasure room behind a locked door.
    Vault,
    Shop,
    Armory,
    Library,
    Laboratory,
}

/// A carved room: its rectangle plus a tag that may be reassigned once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub rect: Rect,
    pub kind: RoomKind,
}

impl Room {
    pub const fn new(rect: Rect) -> Self {
        Self {
            rect,
            kind: RoomKind::Normal,
        }
    }

    pub const fn center(&self) -> Pos {
        self.rect.center()
    }

    pub const fn contains(&self, p: Pos) -> bool {
        self.rect.contains(p)
    }
}
