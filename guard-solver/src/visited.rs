use crate::grid::{Grid, Position};
use crate::heading::Heading;

/// Position ごとに観測済みの向きを 4bit で持つ。1 回の run 限りで使う。
#[derive(Clone, Debug)]
pub struct VisitedSet {
    cols: usize,
    masks: Vec<u8>,
}

impl VisitedSet {
    pub fn for_grid(grid: &Grid) -> Self {
        Self {
            cols: grid.cols(),
            masks: vec![0; grid.len()],
        }
    }

    /// Returns `false` if `(pos, heading)` was already recorded.
    pub fn insert(&mut self, pos: Position, heading: Heading) -> bool {
        let mask = &mut self.masks[pos.row * self.cols + pos.col];
        let fresh = *mask & heading.bit() == 0;
        *mask |= heading.bit();
        fresh
    }

    pub fn contains(&self, pos: Position, heading: Heading) -> bool {
        self.masks[pos.row * self.cols + pos.col] & heading.bit() != 0
    }

    pub fn clear(&mut self) {
        self.masks.fill(0);
    }
}
