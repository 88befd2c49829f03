//! Binary space partition of the grid interior, and one room per leaf.

use std::cmp::Ordering;

use rand::Rng;

use super::roll;
use crate::config::GenConfig;
use crate::geometry::{Rect, Room};

/// Arena node. Children and room are indices into the arena and room list.
#[derive(Debug, Clone)]
pub(super) struct BspNode {
    pub rect: Rect,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub room: Option<usize>,
}

impl BspNode {
    fn leaf(rect: Rect) -> Self {
        Self {
            rect,
            left: None,
            right: None,
            room: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn children(&self) -> Option<(usize, usize)> {
        self.left.zip(self.right)
    }
}

/// Split `interior` until every leaf is below `2 * min_leaf` on both sides
/// or too short along its chosen axis. Node 0 is the root.
pub(super) fn partition<R: Rng + ?Sized>(rng: &mut R, interior: Rect, min_leaf: i32) -> Vec<BspNode> {
    let mut nodes = vec![BspNode::leaf(interior)];
    let mut stack = vec![0usize];
    let min_split = min_leaf * 2;

    while let Some(idx) = stack.pop() {
        let r = nodes[idx].rect;
        if r.w < min_split && r.h < min_split {
            continue;
        }

        let vertical = match r.w.cmp(&r.h) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => rng.gen_bool(0.5),
        };

        let (a, b) = if vertical {
            if r.w < min_split {
                continue;
            }
            let split = roll(rng, min_leaf, r.w - min_leaf);
            (
                Rect::new(r.x, r.y, split, r.h),
                Rect::new(r.x + split, r.y, r.w - split, r.h),
            )
        } else {
            if r.h < min_split {
                continue;
            }
            let split = roll(rng, min_leaf, r.h - min_leaf);
            (
                Rect::new(r.x, r.y, r.w, split),
                Rect::new(r.x, r.y + split, r.w, r.h - split),
            )
        };

        let left = nodes.len();
        nodes.push(BspNode::leaf(a));
        let right = nodes.len();
        nodes.push(BspNode::leaf(b));
        nodes[idx].left = Some(left);
        nodes[idx].right = Some(right);
        stack.push(left);
        stack.push(right);
    }

    nodes
}

/// Size and place a room inside every leaf, in arena order.
///
/// Every leaf consumes the same four rolls whether or not its room fits, so
/// a skipped room never shifts the rest of the stream.
pub(super) fn place_rooms<R: Rng + ?Sized>(
    rng: &mut R,
    nodes: &mut [BspNode],
    interior: Rect,
    config: &GenConfig,
) -> Vec<Room> {
    let mut rooms = Vec::new();

    for node in nodes.iter_mut().filter(|n| n.is_leaf()) {
        let leaf = node.rect;
        let max_w = config.min_room_w.max(leaf.w - 2);
        let max_h = config.min_room_h.max(leaf.h - 2);
        let rw = roll(rng, config.min_room_w, max_w);
        let rh = roll(rng, config.min_room_h, max_h);
        let rx = leaf.x + roll(rng, 1, (leaf.w - rw - 1).max(1));
        let ry = leaf.y + roll(rng, 1, (leaf.h - rh - 1).max(1));

        let rect = Rect::new(rx, ry, rw, rh);
        if !leaf.contains_rect(&rect) || !interior.contains_rect(&rect) {
            log::trace!("leaf {:?} too small for room {:?}", leaf, rect);
            continue;
        }
        node.room = Some(rooms.len());
        rooms.push(Room::new(rect));
    }

    rooms
}

/// Every room index under `idx`, node first, then left, then right.
pub(super) fn rooms_in_subtree(nodes: &[BspNode], idx: usize, out: &mut Vec<usize>) {
    let node = &nodes[idx];
    if let Some(room) = node.room {
        out.push(room);
    }
    if let Some(left) = node.left {
        rooms_in_subtree(nodes, left, out);
    }
    if let Some(right) = node.right {
        rooms_in_subtree(nodes, right, out);
    }
}

/// Uniformly random room under `idx`, if the subtree has any.
pub(super) fn pick_room_in_subtree<R: Rng + ?Sized>(
    nodes: &[BspNode],
    idx: usize,
    rng: &mut R,
) -> Option<usize> {
    let mut rooms = Vec::new();
    rooms_in_subtree(nodes, idx, &mut rooms);
    if rooms.is_empty() {
        return None;
    }
    let pick = roll(rng, 0, rooms.len() as i32 - 1);
    Some(rooms[pick as usize])
}
