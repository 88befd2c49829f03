//! Pure dungeon logic for Delve.
//!
//! This crate contains the terrain model and the queries every other game
//! system leans on: level generation, field of view, and weighted cost
//! fields. Nothing here renders, owns entities, or runs turns. Functions take
//! plain data plus an explicit RNG and return plain data, so the same seed
//! always reproduces the same level.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Generation parameters, defaults, and validation |
//! | [`fov`] | Recursive shadowcasting FOV, FOV masks, Bresenham line of sight |
//! | [`generation`] | BSP rooms, corridors, loops, special rooms, branches, braiding, stairs |
//! | [`geometry`] | Positions, rectangles, rooms, direction tables |
//! | [`grid`] | The `Dungeon` grid with bounds-checked predicates and mutators |
//! | [`pathfinding`] | 8-directional Dijkstra paths and multi-source cost fields |
//! | [`tiles`] | Terrain kinds and their movement/sight predicates |
//! | [`validation`] | Structural checks over a finished level |

pub mod config;
pub mod fov;
pub mod generation;
pub mod geometry;
pub mod grid;
pub mod pathfinding;
pub mod tiles;
pub mod validation;

pub use config::{BraidStyle, GenConfig};
pub use geometry::{Pos, Rect, Room, RoomKind};
pub use grid::Dungeon;
pub use tiles::{Tile, TileKind};
