//! Terrain kinds and per-tile state.
//!
//! The kind-level predicates here are the single source of truth for what
//! blocks movement and sight. `Dungeon` wraps them with bounds checks.

use serde::{Deserialize, Serialize};

/// Terrain kind of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Wall,
    Floor,
    DoorClosed,
    DoorOpen,
    /// Visible, but needs unlocking before it opens.
    DoorLocked,
    /// Looks like wall until discovered.
    DoorSecret,
    StairsUp,
    StairsDown,
    /// Impassable pit that does not block sight.
    Chasm,
    /// Interior column: blocks movement and sight.
    Pillar,
    /// Blocks movement and projectiles, not sight.
    Boulder,
}

impl TileKind {
    /// Tiles a creature can stand on right now.
    pub const fn is_walkable(self) -> bool {
        matches!(
            self,
            TileKind::Floor | TileKind::DoorOpen | TileKind::StairsUp | TileKind::StairsDown
        )
    }

    /// Walkable tiles plus doors a path planner may route through at extra cost.
    pub const fn is_passable(self) -> bool {
        self.is_walkable() || matches!(self, TileKind::DoorClosed | TileKind::DoorLocked)
    }

    pub const fn is_opaque(self) -> bool {
        matches!(
            self,
            TileKind::Wall
                | TileKind::DoorClosed
                | TileKind::DoorLocked
                | TileKind::DoorSecret
                | TileKind::Pillar
        )
    }

    pub const fn blocks_projectiles(self) -> bool {
        self.is_opaque() || matches!(self, TileKind::Boulder)
    }

    pub const fn is_door(self) -> bool {
        matches!(
            self,
            TileKind::DoorClosed | TileKind::DoorOpen | TileKind::DoorLocked | TileKind::DoorSecret
        )
    }

    pub const fn is_stairs(self) -> bool {
        matches!(self, TileKind::StairsUp | TileKind::StairsDown)
    }

    /// Solid terrain a digging tool can remove.
    pub const fn is_diggable(self) -> bool {
        matches!(self, TileKind::Wall | TileKind::Pillar) || self.is_door()
    }

    /// Single-character rendering used by the debug dump.
    pub const fn glyph(self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
            TileKind::DoorClosed => '+',
            TileKind::DoorOpen => '\'',
            TileKind::DoorLocked => '=',
            TileKind::DoorSecret => '#',
            TileKind::StairsUp => '<',
            TileKind::StairsDown => '>',
            TileKind::Chasm => ':',
            TileKind::Pillar => 'O',
            TileKind::Boulder => '0',
        }
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    /// Recomputed on every FOV query.
    pub visible: bool,
    /// Sticky: FOV only ever sets it.
    pub explored: bool,
}

impl Tile {
    pub const WALL: Tile = Tile {
        kind: TileKind::Wall,
        visible: false,
        explored: false,
    };
}
