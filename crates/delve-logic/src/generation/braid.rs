//! Corridor braiding: short tunnels from corridor dead ends through solid
//! rock to a nearby corridor, turning dead ends into loops.
//!
//! Tunnels only ever turn wall into floor, keep one tile clear of rooms and
//! doors, and stay two tiles inside the border.

use std::collections::VecDeque;

use rand::Rng;

use super::roll;
use crate::config::BraidStyle;
use crate::geometry::{unflatten, Pos, DIRS4};
use crate::grid::Dungeon;
use crate::tiles::TileKind;

/// Outcome of one braiding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BraidStats {
    pub tunnels: usize,
    /// Wall tiles turned to floor.
    pub tiles: usize,
    pub dead_ends_before: usize,
    pub dead_ends_after: usize,
}

const NO_PARENT: usize = usize::MAX;

struct Braider<'a> {
    d: &'a mut Dungeon,
    in_room: Vec<bool>,
}

impl Braider<'_> {
    fn room_tile(&self, x: i32, y: i32) -> bool {
        self.d.index_of(x, y).is_some_and(|i| self.in_room[i])
    }

    fn door_nearby(&self, x: i32, y: i32) -> bool {
        (-1..=1).any(|oy| {
            (-1..=1).any(|ox| self.d.kind(x + ox, y + oy).is_some_and(TileKind::is_door))
        })
    }

    /// Plain floor outside every room, off the border, away from doors.
    fn corridor_floor(&self, x: i32, y: i32) -> bool {
        x > 0
            && y > 0
            && x < self.d.width - 1
            && y < self.d.height - 1
            && !self.room_tile(x, y)
            && self.d.kind(x, y) == Some(TileKind::Floor)
            && !self.door_nearby(x, y)
    }

    /// Wall that a tunnel may pass through.
    fn diggable(&self, x: i32, y: i32) -> bool {
        x > 1
            && y > 1
            && x < self.d.width - 2
            && y < self.d.height - 2
            && !self.room_tile(x, y)
            && self.d.kind(x, y) == Some(TileKind::Wall)
            && !self.door_nearby(x, y)
            && !DIRS4.iter().any(|&(dx, dy)| self.room_tile(x + dx, y + dy))
    }

    fn degree(&self, x: i32, y: i32) -> usize {
        DIRS4
            .iter()
            .filter(|&&(dx, dy)| self.d.is_passable(x + dx, y + dy))
            .count()
    }

    fn is_dead_end(&self, p: Pos) -> bool {
        self.corridor_floor(p.x, p.y) && self.degree(p.x, p.y) == 1
    }

    fn dead_ends(&self) -> Vec<Pos> {
        let mut out = Vec::new();
        for y in 1..self.d.height - 1 {
            for x in 1..self.d.width - 1 {
                let p = Pos::new(x, y);
                if self.is_dead_end(p) {
                    out.push(p);
                }
            }
        }
        out
    }

    /// Breadth-first search through diggable wall from the dead end `p` for a
    /// tile touching some other corridor. Returns the tunnel, end first.
    fn find_link<R: Rng + ?Sized>(&self, p: Pos, max_len: i32, rng: &mut R) -> Option<Vec<Pos>> {
        let back = DIRS4
            .iter()
            .copied()
            .find(|&(dx, dy)| self.d.is_passable(p.x + dx, p.y + dy))
            .unwrap_or((0, 0));
        let behind = p.step(back.0, back.1);

        let mut order = [0usize, 1, 2, 3];
        for i in (1..order.len()).rev() {
            let j = roll(rng, 0, i as i32) as usize;
            order.swap(i, j);
        }

        let mut parent = vec![NO_PARENT; self.d.tiles.len()];
        let mut queue = VecDeque::new();
        for &(dx, dy) in &DIRS4 {
            if (dx, dy) == back {
                continue;
            }
            let s = p.step(dx, dy);
            if !self.diggable(s.x, s.y) {
                continue;
            }
            let Some(si) = self.d.index_of(s.x, s.y) else {
                continue;
            };
            if parent[si] == NO_PARENT {
                parent[si] = si;
                queue.push_back((s, 1));
            }
        }

        while let Some((n, dist)) = queue.pop_front() {
            let Some(ni) = self.d.index_of(n.x, n.y) else {
                continue;
            };
            let links = DIRS4.iter().any(|&(dx, dy)| {
                let t = n.step(dx, dy);
                t != p && t != behind && self.corridor_floor(t.x, t.y)
            });
            if links {
                let mut tunnel = vec![n];
                let mut cur = ni;
                while parent[cur] != cur {
                    cur = parent[cur];
                    tunnel.push(unflatten(self.d.width, cur));
                }
                return Some(tunnel);
            }
            if dist >= max_len {
                continue;
            }

            for &o in &order {
                let (dx, dy) = DIRS4[o];
                let m = n.step(dx, dy);
                if !self.diggable(m.x, m.y) {
                    continue;
                }
                let Some(mi) = self.d.index_of(m.x, m.y) else {
                    continue;
                };
                if parent[mi] == NO_PARENT {
                    parent[mi] = ni;
                    queue.push_back((m, dist + 1));
                }
            }
        }

        None
    }
}

/// Tunnel loops off corridor dead ends. Deeper levels braid a little more.
pub(super) fn braid_corridors<R: Rng + ?Sized>(
    d: &mut Dungeon,
    rng: &mut R,
    style: BraidStyle,
    depth: i32,
) -> BraidStats {
    let mut stats = BraidStats::default();
    let Some((base_chance, max_len, budget_scale)) = style.params() else {
        return stats;
    };
    if d.width < 5 || d.height < 5 {
        return stats;
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

    let chance = (base_chance + 0.015 * f64::from((depth - 3).clamp(0, 12))).clamp(0.10, 0.80);
    let budget = ((d.tiles.len() / 650).max(4) as f64 * budget_scale).round() as usize;
    let budget = budget.clamp(3, 28);

    let mut b = Braider { d, in_room };
    let mut dead_ends = b.dead_ends();
    stats.dead_ends_before = dead_ends.len();

    for i in (1..dead_ends.len()).rev() {
        let j = roll(rng, 0, i as i32) as usize;
        dead_ends.swap(i, j);
    }

    for p in dead_ends {
        if stats.tunnels >= budget {
            break;
        }
        // An earlier tunnel may have already joined this one.
        if !b.is_dead_end(p) {
            continue;
        }
        if !rng.gen_bool(chance) {
            continue;
        }
        let Some(tunnel) = b.find_link(p, max_len, rng) else {
            continue;
        };
        for t in tunnel {
            if b.d.kind(t.x, t.y) == Some(TileKind::Wall) {
                b.d.set_kind(t.x, t.y, TileKind::Floor);
                stats.tiles += 1;
            }
        }
        stats.tunnels += 1;
    }

    stats.dead_ends_after = b.dead_ends().len();
    log::trace!(
        "braid: {} tunnels, {} tiles, dead ends {} -> {}",
        stats.tunnels,
        stats.tiles,
        stats.dead_ends_before,
        stats.dead_ends_after
    );
    stats
}
