//! Carving primitives: rooms, doors, L-shaped corridors, dead-end branches.

use rand::Rng;

use super::roll;
use crate::config::GenConfig;
use crate::geometry::{Pos, Rect, DIRS4};
use crate::grid::Dungeon;
use crate::tiles::TileKind;

pub(super) fn carve_rect(d: &mut Dungeon, rect: Rect) {
    for y in rect.y..rect.y2() {
        for x in rect.x..rect.x2() {
            d.set_kind(x, y, TileKind::Floor);
        }
    }
}

/// Floor, unless the tile is already a door or stairs.
pub(super) fn carve_floor(d: &mut Dungeon, x: i32, y: i32) {
    match d.kind(x, y) {
        Some(k) if k.is_door() || k.is_stairs() => {}
        Some(_) => {
            d.set_kind(x, y, TileKind::Floor);
        }
        None => {}
    }
}

fn carve_h(d: &mut Dungeon, x1: i32, x2: i32, y: i32) {
    for x in x1.min(x2)..=x1.max(x2) {
        carve_floor(d, x, y);
    }
}

fn carve_v(d: &mut Dungeon, y1: i32, y2: i32, x: i32) {
    for y in y1.min(y2)..=y1.max(y2) {
        carve_floor(d, x, y);
    }
}

fn inside_ring(d: &Dungeon, p: Pos) -> bool {
    p.x > 0 && p.y > 0 && p.x < d.width - 1 && p.y < d.height - 1
}

/// A door tile on a room's edge and the corridor tile just outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct DoorPick {
    pub door: Pos,
    pub exterior: Pos,
}

/// Random non-corner edge tile whose outside neighbor is inside the outer
/// ring, so border sealing cannot cut the corridor.
///
/// Falls back to the room centroid with an exterior tried south, north,
/// east, then west once `attempts` run out.
pub(super) fn pick_door<R: Rng + ?Sized>(
    rng: &mut R,
    room: &Rect,
    d: &Dungeon,
    attempts: u32,
) -> DoorPick {
    for _ in 0..attempts {
        let side = roll(rng, 0, 3);
        let (door, exterior) = match side {
            0 => {
                let x = roll(rng, room.x + 1, room.x2() - 2);
                (Pos::new(x, room.y), Pos::new(x, room.y - 1))
            }
            1 => {
                let x = roll(rng, room.x + 1, room.x2() - 2);
                let y = room.y2() - 1;
                (Pos::new(x, y), Pos::new(x, y + 1))
            }
            2 => {
                let y = roll(rng, room.y + 1, room.y2() - 2);
                (Pos::new(room.x, y), Pos::new(room.x - 1, y))
            }
            _ => {
                let x = room.x2() - 1;
                let y = roll(rng, room.y + 1, room.y2() - 2);
                (Pos::new(x, y), Pos::new(x + 1, y))
            }
        };
        if d.in_bounds(door.x, door.y) && inside_ring(d, exterior) {
            return DoorPick { door, exterior };
        }
    }

    let c = room.center();
    let exterior = [(0, 1), (0, -1), (1, 0), (-1, 0)]
        .into_iter()
        .map(|(dx, dy)| c.step(dx, dy))
        .find(|&p| inside_ring(d, p))
        .unwrap_or(c);
    log::trace!("door fallback on room {:?}: door {:?} exit {:?}", room, c, exterior);
    DoorPick { door: c, exterior }
}

/// Door both rooms and join their exteriors with an L-shaped corridor.
pub(super) fn connect_rooms<R: Rng + ?Sized>(
    d: &mut Dungeon,
    a: &Rect,
    b: &Rect,
    rng: &mut R,
    door_attempts: u32,
) {
    let da = pick_door(rng, a, d, door_attempts);
    let db = pick_door(rng, b, d, door_attempts);

    d.set_kind(da.door.x, da.door.y, TileKind::DoorClosed);
    d.set_kind(db.door.x, db.door.y, TileKind::DoorClosed);
    carve_floor(d, da.exterior.x, da.exterior.y);
    carve_floor(d, db.exterior.x, db.exterior.y);

    let Pos { x: x1, y: y1 } = da.exterior;
    let Pos { x: x2, y: y2 } = db.exterior;
    if rng.gen_bool(0.5) {
        carve_h(d, x1, x2, y1);
        carve_v(d, y1, y2, x2);
    } else {
        carve_v(d, y1, y2, x1);
        carve_h(d, x1, x2, y2);
    }
}

/// Tunnel short dead ends off corridor floor. Returns how many tunnels
/// carved at least one tile.
///
/// Tunnels stop at the first non-wall tile and never enter the outer ring.
pub(super) fn carve_branches<R: Rng + ?Sized>(
    d: &mut Dungeon,
    rng: &mut R,
    config: &GenConfig,
) -> usize {
    if d.width < 3 || d.height < 3 {
        return 0;
    }

    let mut in_room = vec![false; d.tiles.len()];
    for room in &d.rooms {
        for y in room.rect.y..room.rect.y2() {
            for x in room.rect.x..room.rect.x2() {
                if let Some(i) = d.index_of(x, y) {
                    in_room[i] = true;
                }
            }
        }
    }

    let interior = Rect::new(1, 1, d.width - 2, d.height - 2);
    let samples = d.rooms.len().max(2);
    let mut dug = 0;

    for _ in 0..samples {
        let x = roll(rng, 1, d.width - 2);
        let y = roll(rng, 1, d.height - 2);
        let Some(i) = d.index_of(x, y) else {
            continue;
        };
        if d.tiles[i].kind != TileKind::Floor || in_room[i] {
            continue;
        }

        let (dx, dy) = DIRS4[roll(rng, 0, 3) as usize];
        if d.kind(x + dx, y + dy) != Some(TileKind::Wall) {
            continue;
        }

        let len = roll(rng, config.branch_len_min, config.branch_len_max);
        let mut p = Pos::new(x, y);
        let mut carved = 0;
        for _ in 0..len {
            p = p.step(dx, dy);
            if !interior.contains(p) || d.kind(p.x, p.y) != Some(TileKind::Wall) {
                break;
            }
            carve_floor(d, p.x, p.y);
            carved += 1;
        }
        if carved > 0 {
            dug += 1;
        }
    }

    dug
}
