//! Weighted 8-directional Dijkstra over the tile grid.
//!
//! The engine knows nothing about terrain. Callers describe movement through
//! [`StepRules`]:
//!
//! - `passable(x, y)`: the tile can be entered at all.
//! - `step_cost(x, y)`: cost to ENTER the tile; `<= 0` means blocked.
//! - `diagonal_ok(from_x, from_y, dx, dy)`: asked only for diagonal moves;
//!   return false to forbid corner-cutting.
//!
//! Reverse searches (cost-to-target fields) expand outward from the target
//! but must price moves in the direction of travel, which is neighbor →
//! current. So they charge the cost of the tile being expanded *from* and
//! ask `diagonal_ok` from the neighbor with the step flipped. Getting either
//! one backwards makes fields disagree with [`dijkstra_path`].
//!
//! All fields are `width * height`, row-major, and use `-1` for unreached.
//! Nothing is cached between calls.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::ops::Index;

use crate::geometry::{cell_count, flat_index, unflatten, Pos, DIRS8};
use crate::grid::Dungeon;
use crate::tiles::TileKind;

/// Sentinel for tiles a search never reached.
pub const UNREACHED: i32 = -1;

// ── Rules ───────────────────────────────────────────────────────────────

/// Movement rules a search is parameterized by.
pub trait StepRules {
    fn passable(&self, x: i32, y: i32) -> bool;

    /// Cost to enter `(x, y)`. `<= 0` blocks the tile.
    fn step_cost(&self, x: i32, y: i32) -> i32;

    /// Veto for the diagonal step `(dx, dy)` starting at `(from_x, from_y)`.
    fn diagonal_ok(&self, _from_x: i32, _from_y: i32, _dx: i32, _dy: i32) -> bool {
        true
    }
}

fn allow_any_diagonal(_: i32, _: i32, _: i32, _: i32) -> bool {
    true
}

/// [`StepRules`] built from closures.
///
/// ```
/// use delve_logic::pathfinding::FnRules;
///
/// let rules = FnRules::new(|x, y| x >= 0 && y >= 0, |_, _| 1)
///     .with_diagonal(|_, _, dx, _| dx > 0);
/// # let _ = rules;
/// ```
#[derive(Clone, Copy)]
pub struct FnRules<P, C, D> {
    passable: P,
    step_cost: C,
    diagonal_ok: D,
}

impl<P, C> FnRules<P, C, fn(i32, i32, i32, i32) -> bool>
where
    P: Fn(i32, i32) -> bool,
    C: Fn(i32, i32) -> i32,
{
    /// Rules that allow every diagonal.
    pub fn new(passable: P, step_cost: C) -> Self {
        Self {
            passable,
            step_cost,
            diagonal_ok: allow_any_diagonal,
        }
    }
}

impl<P, C, D> FnRules<P, C, D> {
    /// Replace the diagonal veto.
    pub fn with_diagonal<D2>(self, diagonal_ok: D2) -> FnRules<P, C, D2>
    where
        D2: Fn(i32, i32, i32, i32) -> bool,
    {
        FnRules {
            passable: self.passable,
            step_cost: self.step_cost,
            diagonal_ok,
        }
    }
}

impl<P, C, D> StepRules for FnRules<P, C, D>
where
    P: Fn(i32, i32) -> bool,
    C: Fn(i32, i32) -> i32,
    D: Fn(i32, i32, i32, i32) -> bool,
{
    fn passable(&self, x: i32, y: i32) -> bool {
        (self.passable)(x, y)
    }

    fn step_cost(&self, x: i32, y: i32) -> i32 {
        (self.step_cost)(x, y)
    }

    fn diagonal_ok(&self, from_x: i32, from_y: i32, dx: i32, dy: i32) -> bool {
        (self.diagonal_ok)(from_x, from_y, dx, dy)
    }
}

/// Default terrain movement: doors are enterable at extra cost and no
/// diagonal may squeeze between two non-walkable corners.
#[derive(Debug, Clone, Copy)]
pub struct TerrainRules<'a> {
    pub dungeon: &'a Dungeon,
}

impl<'a> TerrainRules<'a> {
    pub const fn new(dungeon: &'a Dungeon) -> Self {
        Self { dungeon }
    }
}

impl StepRules for TerrainRules<'_> {
    fn passable(&self, x: i32, y: i32) -> bool {
        self.dungeon.is_passable(x, y)
    }

    fn step_cost(&self, x: i32, y: i32) -> i32 {
        match self.dungeon.kind(x, y) {
            Some(TileKind::DoorClosed) => 2,
            Some(TileKind::DoorLocked) => 3,
            Some(k) if k.is_walkable() => 1,
            _ => 0,
        }
    }

    fn diagonal_ok(&self, from_x: i32, from_y: i32, dx: i32, dy: i32) -> bool {
        self.dungeon.diagonal_passable(Pos::new(from_x, from_y), dx, dy)
    }
}

// ── Results ─────────────────────────────────────────────────────────────

/// Multi-source origin with a head-start cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    pub pos: Pos,
    /// Added as if the seed were reached through one extra edge. Negative
    /// values are treated as zero so `-1` stays unambiguous.
    pub initial_cost: i32,
}

impl Seed {
    pub const fn new(pos: Pos) -> Self {
        Self {
            pos,
            initial_cost: 0,
        }
    }

    pub const fn with_bias(pos: Pos, initial_cost: i32) -> Self {
        Self { pos, initial_cost }
    }
}

impl From<Pos> for Seed {
    fn from(pos: Pos) -> Self {
        Self::new(pos)
    }
}

/// Dense per-tile minimum cost, `-1` where unreached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostField {
    width: i32,
    height: i32,
    costs: Vec<i32>,
}

impl CostField {
    fn unreached(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            costs: vec![UNREACHED; cell_count(width, height)],
        }
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Raw row-major costs including `-1` sentinels.
    pub fn as_slice(&self) -> &[i32] {
        &self.costs
    }

    /// Cost at `(x, y)`; `None` if unreached or out of bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<i32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        let c = self.costs[flat_index(self.width, x, y)];
        (c >= 0).then_some(c)
    }

    pub fn at(&self, p: Pos) -> Option<i32> {
        self.get(p.x, p.y)
    }

    pub fn reached_count(&self) -> usize {
        self.costs.iter().filter(|&&c| c >= 0).count()
    }
}

impl Index<usize> for CostField {
    type Output = i32;

    fn index(&self, i: usize) -> &i32 {
        &self.costs[i]
    }
}

/// Cost field plus, per tile, the index of the seed that achieved it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceField {
    pub costs: CostField,
    /// Seed index per tile, `-1` where unreached.
    sources: Vec<i32>,
}

impl ProvenanceField {
    pub fn sources(&self) -> &[i32] {
        &self.sources
    }

    /// Winning seed index at `(x, y)`.
    pub fn source_at(&self, x: i32, y: i32) -> Option<usize> {
        self.costs.get(x, y)?;
        let s = self.sources[flat_index(self.costs.width, x, y)];
        usize::try_from(s).ok()
    }
}

// ── Core ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Cost to reach each tile FROM the seeds.
    Forward,
    /// Cost to reach the seeds from each tile.
    Reverse,
}

const fn in_bounds(width: i32, height: i32, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && x < width && y < height
}

/// Strictly better: cheaper, or equally cheap from a lower seed index.
fn improves(cost: i32, source: i32, cur_cost: i32, cur_source: i32) -> bool {
    cur_cost < 0 || cost < cur_cost || (cost == cur_cost && source < cur_source)
}

/// Shared multi-source Dijkstra. Returns `(costs, sources)`.
fn flood<R: StepRules + ?Sized>(
    width: i32,
    height: i32,
    seeds: &[Seed],
    rules: &R,
    dir: Direction,
    max_cost: Option<i32>,
) -> (CostField, Vec<i32>) {
    let mut dist = CostField::unreached(width, height);
    let mut owner = vec![UNREACHED; dist.len()];
    if dist.is_empty() {
        return (dist, owner);
    }
    let over_budget = |c: i32| max_cost.is_some_and(|m| m >= 0 && c > m);

    let mut heap = BinaryHeap::new();
    for (si, seed) in seeds.iter().enumerate() {
        let Pos { x, y } = seed.pos;
        if !in_bounds(width, height, x, y) {
            continue;
        }
        // A reverse search ends on the seed, so the seed must be enterable.
        if dir == Direction::Reverse && !rules.passable(x, y) {
            continue;
        }
        let cost = seed.initial_cost.max(0);
        if over_budget(cost) {
            continue;
        }
        let i = flat_index(width, x, y);
        let si = si as i32;
        if improves(cost, si, dist.costs[i], owner[i]) {
            dist.costs[i] = cost;
            owner[i] = si;
            heap.push(Reverse((cost, si, i)));
        }
    }

    while let Some(Reverse((cost, source, i))) = heap.pop() {
        if dist.costs[i] != cost || owner[i] != source {
            continue;
        }
        let Pos { x, y } = unflatten(width, i);

        // Reverse: every neighbor steps INTO (x, y), so they all pay its cost.
        let enter_here = match dir {
            Direction::Reverse => {
                let c = rules.step_cost(x, y);
                if c <= 0 {
                    continue;
                }
                Some(c)
            }
            Direction::Forward => None,
        };

        for (dx, dy) in DIRS8 {
            let nx = x + dx;
            let ny = y + dy;
            if !in_bounds(width, height, nx, ny) || !rules.passable(nx, ny) {
                continue;
            }
            if dx != 0 && dy != 0 {
                let ok = match dir {
                    Direction::Forward => rules.diagonal_ok(x, y, dx, dy),
                    Direction::Reverse => rules.diagonal_ok(nx, ny, -dx, -dy),
                };
                if !ok {
                    continue;
                }
            }
            let step = match enter_here {
                Some(c) => c,
                None => {
                    let c = rules.step_cost(nx, ny);
                    if c <= 0 {
                        continue;
                    }
                    c
                }
            };
            let next = cost.saturating_add(step);
            if over_budget(next) {
                continue;
            }
            let ni = flat_index(width, nx, ny);
            if improves(next, source, dist.costs[ni], owner[ni]) {
                dist.costs[ni] = next;
                owner[ni] = source;
                heap.push(Reverse((next, source, ni)));
            }
        }
    }

    (dist, owner)
}

// ── Entry points ────────────────────────────────────────────────────────

/// Cheapest path `start..=goal`, or empty if there is none.
///
/// `start` itself need not be passable (a creature may stand somewhere it
/// could not path into).
pub fn dijkstra_path<R: StepRules + ?Sized>(
    width: i32,
    height: i32,
    start: Pos,
    goal: Pos,
    rules: &R,
) -> Vec<Pos> {
    if width <= 0 || height <= 0 {
        return Vec::new();
    }
    if !in_bounds(width, height, start.x, start.y) || !in_bounds(width, height, goal.x, goal.y) {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }

    let n = cell_count(width, height);
    let start_i = flat_index(width, start.x, start.y);
    let goal_i = flat_index(width, goal.x, goal.y);
    let mut dist = vec![i32::MAX; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut heap = BinaryHeap::new();

    dist[start_i] = 0;
    heap.push(Reverse((0, start_i)));

    while let Some(Reverse((cost, i))) = heap.pop() {
        if i == goal_i {
            break;
        }
        if cost != dist[i] {
            continue;
        }
        let Pos { x, y } = unflatten(width, i);

        for (dx, dy) in DIRS8 {
            let nx = x + dx;
            let ny = y + dy;
            if !in_bounds(width, height, nx, ny) || !rules.passable(nx, ny) {
                continue;
            }
            if dx != 0 && dy != 0 && !rules.diagonal_ok(x, y, dx, dy) {
                continue;
            }
            let step = rules.step_cost(nx, ny);
            if step <= 0 {
                continue;
            }
            let ni = flat_index(width, nx, ny);
            let next = cost.saturating_add(step);
            if next < dist[ni] {
                dist[ni] = next;
                prev[ni] = Some(i);
                heap.push(Reverse((next, ni)));
            }
        }
    }

    if dist[goal_i] == i32::MAX {
        return Vec::new();
    }

    let mut path = Vec::new();
    let mut cur = Some(goal_i);
    while let Some(i) = cur {
        path.push(unflatten(width, i));
        if i == start_i {
            break;
        }
        cur = prev[i];
    }
    if path.last() != Some(&start) {
        return Vec::new();
    }
    path.reverse();
    path
}

/// Sum of entry costs along `path` (the first tile is free).
///
/// `None` if any step enters a blocked tile or is not a single move.
pub fn path_cost<R: StepRules + ?Sized>(path: &[Pos], rules: &R) -> Option<i32> {
    let mut total = 0i32;
    for pair in path.windows(2) {
        if !pair[0].is_adjacent8(pair[1]) {
            return None;
        }
        let step = rules.step_cost(pair[1].x, pair[1].y);
        if step <= 0 {
            return None;
        }
        total = total.saturating_add(step);
    }
    Some(total)
}

/// Cost from every tile to `target`, excluding the starting tile's own cost.
///
/// An impassable target yields an all-unreached field. With `max_cost`,
/// tiles whose best cost exceeds it stay `-1`.
pub fn cost_to_target<R: StepRules + ?Sized>(
    width: i32,
    height: i32,
    target: Pos,
    rules: &R,
    max_cost: Option<i32>,
) -> CostField {
    flood(width, height, &[Seed::new(target)], rules, Direction::Reverse, max_cost).0
}

/// Cost from every tile to the nearest of `sources`.
pub fn cost_to_nearest_source<R: StepRules + ?Sized>(
    width: i32,
    height: i32,
    sources: &[Pos],
    rules: &R,
    max_cost: Option<i32>,
) -> CostField {
    let seeds: Vec<Seed> = sources.iter().copied().map(Seed::new).collect();
    cost_to_nearest_seeded(width, height, &seeds, rules, max_cost)
}

/// Cost from every tile to the nearest seed, each seed adding its bias.
pub fn cost_to_nearest_seeded<R: StepRules + ?Sized>(
    width: i32,
    height: i32,
    seeds: &[Seed],
    rules: &R,
    max_cost: Option<i32>,
) -> CostField {
    flood(width, height, seeds, rules, Direction::Reverse, max_cost).0
}

/// [`cost_to_nearest_seeded`] plus which seed won each tile.
/// Ties go to the lowest seed index.
pub fn cost_to_nearest_with_source<R: StepRules + ?Sized>(
    width: i32,
    height: i32,
    seeds: &[Seed],
    rules: &R,
    max_cost: Option<i32>,
) -> ProvenanceField {
    let (costs, sources) = flood(width, height, seeds, rules, Direction::Reverse, max_cost);
    ProvenanceField { costs, sources }
}

/// Forward variant: cost to reach every tile from the nearest source.
pub fn cost_from_sources<R: StepRules + ?Sized>(
    width: i32,
    height: i32,
    sources: &[Pos],
    rules: &R,
    max_cost: Option<i32>,
) -> CostField {
    let seeds: Vec<Seed> = sources.iter().copied().map(Seed::new).collect();
    cost_from_seeded(width, height, &seeds, rules, max_cost)
}

/// Forward seeded variant.
pub fn cost_from_seeded<R: StepRules + ?Sized>(
    width: i32,
    height: i32,
    seeds: &[Seed],
    rules: &R,
    max_cost: Option<i32>,
) -> CostField {
    flood(width, height, seeds, rules, Direction::Forward, max_cost).0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(w: i32, h: i32) -> impl StepRules {
        FnRules::new(move |x, y| in_bounds(w, h, x, y), |_, _| 1)
    }

    /// Two routes from (1,2) to (5,2): a straight hallway through a closed
    /// door, and an open hallway one row up.
    fn door_or_detour() -> Dungeon {
        let mut d = Dungeon::new(7, 5);
        for x in 1..=5 {
            d.set_kind(x, 2, TileKind::Floor);
            d.set_kind(x, 1, TileKind::Floor);
        }
        d.set_kind(3, 2, TileKind::DoorClosed);
        d
    }

    #[test]
    fn test_path_avoids_costly_door() {
        let d = door_or_detour();
        let rules = TerrainRules::new(&d);
        let path = dijkstra_path(d.width, d.height, Pos::new(1, 2), Pos::new(5, 2), &rules);
        assert!(!path.is_empty());
        assert_eq!(path.first(), Some(&Pos::new(1, 2)));
        assert_eq!(path.last(), Some(&Pos::new(5, 2)));
        assert!(!path.contains(&Pos::new(3, 2)));
        assert_eq!(path_cost(&path, &rules), Some(4));
    }

    #[test]
    fn test_cost_to_target_matches_open_route() {
        let d = door_or_detour();
        let rules = TerrainRules::new(&d);
        let field = cost_to_target(d.width, d.height, Pos::new(5, 2), &rules, None);
        assert_eq!(field.len(), 35);
        assert_eq!(field.get(1, 2), Some(4));
        assert_eq!(field.get(5, 2), Some(0));
        assert_eq!(field.get(0, 0), None, "walls stay unreached");
    }

    #[test]
    fn test_same_start_and_goal() {
        let rules = uniform(4, 4);
        assert_eq!(dijkstra_path(4, 4, Pos::new(2, 2), Pos::new(2, 2), &rules), vec![Pos::new(2, 2)]);
    }

    #[test]
    fn test_out_of_bounds_endpoints() {
        let rules = uniform(4, 4);
        assert!(dijkstra_path(4, 4, Pos::new(-1, 0), Pos::new(2, 2), &rules).is_empty());
        assert!(dijkstra_path(4, 4, Pos::new(0, 0), Pos::new(4, 0), &rules).is_empty());
        assert!(dijkstra_path(0, 4, Pos::new(0, 0), Pos::new(0, 1), &rules).is_empty());
        let field = cost_to_target(4, 4, Pos::new(9, 9), &rules, None);
        assert_eq!(field.len(), 16);
        assert_eq!(field.reached_count(), 0);
    }

    #[test]
    fn test_unreachable_goal_gives_empty_path() {
        // Column x=2 is solid.
        let rules = FnRules::new(|x, y| in_bounds(5, 5, x, y) && x != 2, |_, _| 1);
        assert!(dijkstra_path(5, 5, Pos::new(0, 0), Pos::new(4, 4), &rules).is_empty());
        let field = cost_to_target(5, 5, Pos::new(4, 4), &rules, None);
        assert_eq!(field.get(0, 0), None);
        assert_eq!(field.get(3, 0), Some(4));
    }

    #[test]
    fn test_impassable_target_yields_unreached_field() {
        let rules = FnRules::new(|x, y| in_bounds(5, 5, x, y) && (x, y) != (2, 2), |_, _| 1);
        let field = cost_to_target(5, 5, Pos::new(2, 2), &rules, None);
        assert_eq!(field.reached_count(), 0);
        assert_eq!((field.width(), field.height(), field.len()), (5, 5, 25));
    }

    #[test]
    fn test_empty_grid_gives_empty_field() {
        let rules = FnRules::new(|_, _| true, |_, _| 1);
        let field = cost_to_target(0, 4, Pos::new(0, 0), &rules, None);
        assert!(field.is_empty());
        assert_eq!((field.width(), field.height()), (0, 4));
        let field = cost_to_nearest_source(-3, 4, &[Pos::new(0, 0)], &rules, None);
        assert!(field.is_empty());
        assert_eq!(field.width(), 0);
    }

    #[test]
    fn test_zero_step_cost_blocks() {
        let rules = FnRules::new(|x, y| in_bounds(5, 1, x, y), |x, _| if x == 2 { 0 } else { 1 });
        assert!(dijkstra_path(5, 1, Pos::new(0, 0), Pos::new(4, 0), &rules).is_empty());
        let field = cost_to_target(5, 1, Pos::new(4, 0), &rules, None);
        assert_eq!(field.get(3, 0), Some(1));
        assert_eq!(field.get(2, 0), Some(2), "blocked tile can still be a starting point");
        assert_eq!(field.get(1, 0), None);
    }

    #[test]
    fn test_reverse_field_charges_entry_cost_of_target_not_start() {
        // Entering x=4 costs 5.
        let rules = FnRules::new(|x, y| in_bounds(5, 1, x, y), |x, _| if x == 4 { 5 } else { 1 });
        let to_far = cost_to_target(5, 1, Pos::new(4, 0), &rules, None);
        assert_eq!(to_far.get(0, 0), Some(8));
        let to_near = cost_to_target(5, 1, Pos::new(0, 0), &rules, None);
        assert_eq!(to_near.get(4, 0), Some(4));

        let path = dijkstra_path(5, 1, Pos::new(0, 0), Pos::new(4, 0), &rules);
        assert_eq!(path_cost(&path, &rules), to_far.get(0, 0));
    }

    #[test]
    fn test_reverse_field_flips_diagonal_veto() {
        // Only down-right diagonals are legal.
        let rules = FnRules::new(|x, y| in_bounds(3, 3, x, y), |_, _| 1)
            .with_diagonal(|_, _, dx, dy| dx == 1 && dy == 1);

        let to_corner = cost_to_target(3, 3, Pos::new(2, 2), &rules, None);
        assert_eq!(to_corner.get(0, 0), Some(2));
        let to_origin = cost_to_target(3, 3, Pos::new(0, 0), &rules, None);
        assert_eq!(to_origin.get(2, 2), Some(4));

        let down = dijkstra_path(3, 3, Pos::new(0, 0), Pos::new(2, 2), &rules);
        assert_eq!(path_cost(&down, &rules), Some(2));
        let up = dijkstra_path(3, 3, Pos::new(2, 2), Pos::new(0, 0), &rules);
        assert_eq!(path_cost(&up, &rules), Some(4));
    }

    #[test]
    fn test_max_cost_truncates() {
        let rules = uniform(10, 1);
        let field = cost_to_target(10, 1, Pos::new(0, 0), &rules, Some(3));
        assert_eq!(field.get(3, 0), Some(3));
        assert_eq!(field.get(4, 0), None);
        assert_eq!(field.reached_count(), 4);
        assert_eq!(field.len(), 10);
    }

    #[test]
    fn test_negative_max_cost_is_unbounded() {
        let rules = uniform(10, 1);
        let field = cost_to_target(10, 1, Pos::new(0, 0), &rules, Some(-1));
        assert_eq!(field.get(9, 0), Some(9));
    }

    #[test]
    fn test_seeded_bias_shifts_the_frontier() {
        let rules = uniform(11, 1);
        let seeds = [
            Seed::new(Pos::new(0, 0)),
            Seed::with_bias(Pos::new(10, 0), 4),
        ];
        let field = cost_to_nearest_seeded(11, 1, &seeds, &rules, None);
        assert_eq!(field.get(0, 0), Some(0));
        assert_eq!(field.get(10, 0), Some(4));
        assert_eq!(field.get(7, 0), Some(7));
        assert_eq!(field.get(8, 0), Some(6));
    }

    #[test]
    fn test_negative_bias_is_clamped() {
        let rules = uniform(5, 1);
        let seeds = [Seed::with_bias(Pos::new(0, 0), -10)];
        let field = cost_to_nearest_seeded(5, 1, &seeds, &rules, None);
        assert_eq!(field.get(0, 0), Some(0));
        assert_eq!(field.get(4, 0), Some(4));
    }

    #[test]
    fn test_seed_over_budget_is_dropped() {
        let rules = uniform(5, 1);
        let seeds = [Seed::with_bias(Pos::new(0, 0), 10)];
        let field = cost_to_nearest_seeded(5, 1, &seeds, &rules, Some(5));
        assert_eq!(field.reached_count(), 0);
    }

    #[test]
    fn test_provenance_ties_go_to_lower_index() {
        let rules = uniform(5, 1);
        let seeds = [Seed::new(Pos::new(4, 0)), Seed::new(Pos::new(0, 0))];
        let field = cost_to_nearest_with_source(5, 1, &seeds, &rules, None);
        assert_eq!(field.source_at(0, 0), Some(1));
        assert_eq!(field.source_at(1, 0), Some(1));
        assert_eq!(field.source_at(2, 0), Some(0), "equidistant tile goes to seed 0");
        assert_eq!(field.source_at(4, 0), Some(0));
        assert_eq!(field.costs.get(2, 0), Some(2));
    }

    #[test]
    fn test_duplicate_seed_position_keeps_lower_index() {
        let rules = uniform(3, 1);
        let p = Pos::new(1, 0);
        let seeds = [Seed::with_bias(p, 2), Seed::new(p), Seed::new(p)];
        let field = cost_to_nearest_with_source(3, 1, &seeds, &rules, None);
        assert_eq!(field.source_at(1, 0), Some(1));
        assert_eq!(field.costs.get(1, 0), Some(0));
    }

    #[test]
    fn test_provenance_unreached_is_none() {
        let rules = FnRules::new(|x, y| in_bounds(5, 1, x, y) && x != 2, |_, _| 1);
        let field = cost_to_nearest_with_source(5, 1, &[Seed::new(Pos::new(0, 0))], &rules, None);
        assert_eq!(field.source_at(4, 0), None);
        assert_eq!(field.sources()[4], UNREACHED);
        assert_eq!(field.sources().len(), 5);
    }

    #[test]
    fn test_forward_field_charges_entered_tiles() {
        let rules = FnRules::new(|x, y| in_bounds(5, 1, x, y), |x, _| if x == 4 { 5 } else { 1 });
        let from_start = cost_from_sources(5, 1, &[Pos::new(0, 0)], &rules, None);
        assert_eq!(from_start.get(4, 0), Some(8));
        let from_end = cost_from_sources(5, 1, &[Pos::new(4, 0)], &rules, None);
        assert_eq!(from_end.get(0, 0), Some(4));
    }

    #[test]
    fn test_forward_seed_need_not_be_passable() {
        let rules = FnRules::new(|x, y| in_bounds(3, 1, x, y) && x != 0, |_, _| 1);
        let field = cost_from_seeded(3, 1, &[Seed::new(Pos::new(0, 0))], &rules, None);
        assert_eq!(field.get(0, 0), Some(0));
        assert_eq!(field.get(2, 0), Some(2));
    }

    #[test]
    fn test_nearest_source_matches_min_of_single_fields() {
        let rules = uniform(8, 6);
        let a = Pos::new(1, 1);
        let b = Pos::new(6, 4);
        let both = cost_to_nearest_source(8, 6, &[a, b], &rules, None);
        let fa = cost_to_target(8, 6, a, &rules, None);
        let fb = cost_to_target(8, 6, b, &rules, None);
        for i in 0..both.len() {
            assert_eq!(both[i], fa[i].min(fb[i]));
        }
    }

    #[test]
    fn test_path_cost_rejects_gaps() {
        let rules = uniform(5, 5);
        assert_eq!(path_cost(&[Pos::new(0, 0), Pos::new(2, 0)], &rules), None);
        assert_eq!(path_cost(&[Pos::new(0, 0)], &rules), Some(0));
        assert_eq!(path_cost(&[], &rules), Some(0));
    }
}
