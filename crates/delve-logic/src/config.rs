//! Level generation parameters.
//!
//! `GenConfig::default()` reproduces the baseline generator with moderate
//! corridor braiding. Configs loaded from disk go through [`validate_config`]
//! for reporting, but generation itself never rejects one:
//! [`GenConfig::clamped`] repairs every value the generator depends on. Grid
//! size is never altered; the generator copes with any size, down to an
//! empty grid.

use serde::{Deserialize, Serialize};

use crate::grid::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Smallest room side that still leaves a non-corner wall tile for a door.
pub const MIN_ROOM_SIDE: i32 = 3;

/// How aggressively corridor dead ends are tunnelled into loops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BraidStyle {
    Off,
    Sparse,
    #[default]
    Moderate,
    Heavy,
}

impl BraidStyle {
    /// `(link chance, max tunnel length, tunnel budget scale)`, or `None`
    /// when braiding is off.
    pub const fn params(self) -> Option<(f64, i32, f64)> {
        match self {
            BraidStyle::Off => None,
            BraidStyle::Sparse => Some((0.22, 6, 0.70)),
            BraidStyle::Moderate => Some((0.38, 8, 1.00)),
            BraidStyle::Heavy => Some((0.60, 10, 1.40)),
        }
    }
}

/// Tunable generator parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    pub width: i32,
    pub height: i32,
    /// BSP nodes stop splitting once both sides are below twice this.
    pub min_leaf: i32,
    pub min_room_w: i32,
    pub min_room_h: i32,
    /// Tries to find a door whose exterior neighbor is on the map.
    pub door_attempts: u32,
    /// Re-rolls spent keeping treasure/lair/shrine on distinct rooms.
    pub special_room_attempts: u32,
    pub branch_len_min: i32,
    pub branch_len_max: i32,
    pub braid: BraidStyle,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            min_leaf: 8,
            min_room_w: 4,
            min_room_h: 4,
            door_attempts: 20,
            special_room_attempts: 50,
            branch_len_min: 3,
            branch_len_max: 8,
            braid: BraidStyle::default(),
        }
    }
}

impl GenConfig {
    /// Default parameters on a `width x height` grid.
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Smallest grid side that can hold one minimum room plus its ring of
    /// wall and the outer border.
    pub fn min_grid_side(&self) -> (i32, i32) {
        (self.min_room_w.max(MIN_ROOM_SIDE) + 4, self.min_room_h.max(MIN_ROOM_SIDE) + 4)
    }

    /// Copy with every out-of-range parameter pulled back into range.
    /// Negative sizes become zero; small grids are kept as they are.
    pub fn clamped(&self) -> Self {
        let min_room_w = self.min_room_w.max(MIN_ROOM_SIDE);
        let min_room_h = self.min_room_h.max(MIN_ROOM_SIDE);
        let min_leaf = self.min_leaf.max(min_room_w.max(min_room_h) + 2);
        let branch_len_min = self.branch_len_min.max(1);
        Self {
            width: self.width.max(0),
            height: self.height.max(0),
            min_leaf,
            min_room_w,
            min_room_h,
            door_attempts: self.door_attempts.max(1),
            special_room_attempts: self.special_room_attempts.max(1),
            branch_len_min,
            branch_len_max: self.branch_len_max.max(branch_len_min),
            braid: self.braid,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Grid cannot hold a single minimum room.
    GridTooSmall { width: i32, height: i32 },
    /// Leaf size below what any room needs.
    MinLeafTooSmall(i32),
    /// Room side too small to place a door off the corners.
    MinRoomTooSmall { w: i32, h: i32 },
    /// A minimum room plus its margin does not fit in a minimum leaf.
    RoomTooBigForLeaf { room: i32, leaf: i32 },
    /// Branch length range empty or non-positive.
    BadBranchRange { min: i32, max: i32 },
    /// A retry budget is zero.
    ZeroRetryBudget(&'static str),
}

/// Validate a generation config, returning all errors found.
pub fn validate_config(config: &GenConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let (min_w, min_h) = config.min_grid_side();
    if config.width < min_w || config.height < min_h {
        errors.push(ConfigError::GridTooSmall {
            width: config.width,
            height: config.height,
        });
    }
    if config.min_leaf < MIN_ROOM_SIDE + 2 {
        errors.push(ConfigError::MinLeafTooSmall(config.min_leaf));
    }
    if config.min_room_w < MIN_ROOM_SIDE || config.min_room_h < MIN_ROOM_SIDE {
        errors.push(ConfigError::MinRoomTooSmall {
            w: config.min_room_w,
            h: config.min_room_h,
        });
    }
    let room = config.min_room_w.max(config.min_room_h);
    if room + 2 > config.min_leaf {
        errors.push(ConfigError::RoomTooBigForLeaf {
            room,
            leaf: config.min_leaf,
        });
    }
    if config.branch_len_min < 1 || config.branch_len_max < config.branch_len_min {
        errors.push(ConfigError::BadBranchRange {
            min: config.branch_len_min,
            max: config.branch_len_max,
        });
    }
    if config.door_attempts == 0 {
        errors.push(ConfigError::ZeroRetryBudget("door_attempts"));
    }
    if config.special_room_attempts == 0 {
        errors.push(ConfigError::ZeroRetryBudget("special_room_attempts"));
    }

    errors
}
