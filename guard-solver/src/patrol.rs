//! Guard patrol simulation and the what-if obstruction search.
//!
//! The loaded grid is kept as an immutable baseline. Every run works on a
//! scratch copy that is restored from the baseline with `clone_from`, so a
//! what-if trial never leaks an obstruction or trail into the next one.

use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::error::{LoadError, PatrolError};
use crate::grid::{Cell, Grid, Position};
use crate::heading::Heading;
use crate::visited::VisitedSet;

/// 1 ステップの結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Moved { position: Position, heading: Heading },
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// 盤外へ出た。`visited` は開始マスを含む通過マス数
    Completed { visited: usize },
    Looped,
}

/// 障害物を置く候補の集め方
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Candidates {
    /// 開始マスと壁以外の全マス
    #[default]
    All,
    /// 障害物なしの巡回経路上のマスだけ
    Path,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    pub candidates: Candidates,
    /// Ignored unless built with the `parallel` feature.
    pub parallel: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            candidates: Candidates::All,
            parallel: cfg!(feature = "parallel"),
        }
    }
}

/// Working state for a single run: a grid copy plus its loop detector.
#[derive(Clone, Debug)]
struct Scratch {
    grid: Grid,
    visited: VisitedSet,
}

impl Scratch {
    fn new(baseline: &Grid) -> Self {
        Self {
            grid: baseline.clone(),
            visited: VisitedSet::for_grid(baseline),
        }
    }

    fn reset(&mut self, baseline: &Grid) {
        self.grid.clone_from(baseline);
        self.visited.clear();
    }

    fn step(&mut self, position: Position, heading: Heading) -> Result<Step, PatrolError> {
        let mut heading = heading;
        // 最大 4 回まで右回転して空きマスを探す
        for _ in 0..4 {
            let Some(next) = self.grid.neighbor(position, heading) else {
                return Ok(Step::Exit);
            };
            if self.grid.get(next).is_blocking() {
                heading = heading.next_clockwise();
                continue;
            }
            self.grid.set(position, Cell::Visited);
            self.grid.set(next, Cell::Guard(heading));
            return Ok(Step::Moved {
                position: next,
                heading,
            });
        }
        Err(PatrolError::Deadlock { position })
    }

    fn patrol(&mut self, start: Position, heading: Heading) -> Result<RunOutcome, PatrolError> {
        self.visited.insert(start, heading);
        let (mut position, mut heading) = (start, heading);
        loop {
            match self.step(position, heading)? {
                Step::Moved {
                    position: p,
                    heading: h,
                } => {
                    if !self.visited.insert(p, h) {
                        return Ok(RunOutcome::Looped);
                    }
                    position = p;
                    heading = h;
                }
                Step::Exit => {
                    self.grid.set(position, Cell::Visited);
                    return Ok(RunOutcome::Completed {
                        visited: self.grid.count(Cell::Visited),
                    });
                }
            }
        }
    }

    /// Runs one what-if trial; returns whether the guard loops.
    fn trial(
        &mut self,
        baseline: &Grid,
        start: Position,
        heading: Heading,
        obstruction: Position,
    ) -> Result<bool, PatrolError> {
        self.reset(baseline);
        self.grid.set(obstruction, Cell::Obstruction);
        let outcome = self.patrol(start, heading)?;
        Ok(outcome == RunOutcome::Looped)
    }
}

pub struct PatrolSimulator {
    baseline: Grid,
    scratch: Scratch,
    start: Position,
    start_heading: Heading,
}

impl FromStr for PatrolSimulator {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(Grid::parse(s)?)
    }
}

impl PatrolSimulator {
    pub fn new(grid: Grid) -> Result<Self, LoadError> {
        let (start, start_heading) = grid.locate_guard()?;
        Ok(Self {
            scratch: Scratch::new(&grid),
            baseline: grid,
            start,
            start_heading,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        text.parse()
    }

    pub fn start(&self) -> (Position, Heading) {
        (self.start, self.start_heading)
    }

    /// The grid as loaded.
    pub fn grid(&self) -> &Grid {
        &self.baseline
    }

    /// The grid as left by the most recent run, with its `X` trail.
    pub fn trail(&self) -> &Grid {
        &self.scratch.grid
    }

    /// Advances the guard one step on the scratch grid.
    pub fn step(&mut self, position: Position, heading: Heading) -> Result<Step, PatrolError> {
        self.scratch.step(position, heading)
    }

    /// Simulates from `start` on a fresh copy of the baseline.
    pub fn run(&mut self) -> Result<RunOutcome, PatrolError> {
        self.scratch.reset(&self.baseline);
        let outcome = self.scratch.patrol(self.start, self.start_heading)?;
        debug!(?outcome, "patrol finished");
        Ok(outcome)
    }

    /// Cells covered by the unobstructed patrol, in row-major order.
    pub fn patrol_path(&mut self) -> Result<Vec<Position>, PatrolError> {
        self.run()?;
        Ok(self.trail_cells())
    }

    fn trail_cells(&self) -> Vec<Position> {
        let trail = &self.scratch.grid;
        trail
            .positions()
            .filter(|&p| matches!(trail.get(p), Cell::Visited | Cell::Guard(_)))
            .collect()
    }

    /// Obstruction placements to try. Never includes the start cell or a wall.
    ///
    /// `Path` falls back to every cell when the unobstructed patrol already
    /// loops, since then any placement off the loop keeps the guard trapped.
    pub fn candidates(&mut self, candidates: Candidates) -> Result<Vec<Position>, PatrolError> {
        let start = self.start;
        let cells: Vec<Position> = match candidates {
            Candidates::All => self.baseline.positions().collect(),
            Candidates::Path => match self.run()? {
                RunOutcome::Completed { .. } => self.trail_cells(),
                RunOutcome::Looped => {
                    debug!("patrol loops without obstruction; trying every cell");
                    self.baseline.positions().collect()
                }
            },
        };
        Ok(cells
            .into_iter()
            .filter(|&p| p != start && self.baseline.get(p) != Cell::Wall)
            .collect())
    }

    pub fn count_loop_inducing_obstructions(&mut self) -> Result<usize, PatrolError> {
        Ok(self.loop_inducing_obstructions()?.len())
    }

    pub fn loop_inducing_obstructions(&mut self) -> Result<Vec<Position>, PatrolError> {
        self.search(SearchOptions::default())
    }

    /// Returns every placement that traps the guard, in row-major order.
    pub fn search(&mut self, options: SearchOptions) -> Result<Vec<Position>, PatrolError> {
        let candidates = self.candidates(options.candidates)?;
        info!(
            candidates = candidates.len(),
            strategy = ?options.candidates,
            parallel = options.parallel,
            "starting obstruction search"
        );
        let started = Instant::now();

        let hits = if options.parallel {
            self.search_parallel(&candidates)?
        } else {
            self.search_sequential(&candidates)?
        };

        self.scratch.reset(&self.baseline);
        info!(
            loops = hits.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "obstruction search finished"
        );
        Ok(hits)
    }

    fn search_sequential(&mut self, candidates: &[Position]) -> Result<Vec<Position>, PatrolError> {
        let mut hits = Vec::new();
        for &pos in candidates {
            if self
                .scratch
                .trial(&self.baseline, self.start, self.start_heading, pos)?
            {
                trace!(%pos, "obstruction causes loop");
                hits.push(pos);
            }
        }
        Ok(hits)
    }

    #[cfg(feature = "parallel")]
    fn search_parallel(&mut self, candidates: &[Position]) -> Result<Vec<Position>, PatrolError> {
        let baseline = &self.baseline;
        let (start, heading) = (self.start, self.start_heading);
        let results = candidates
            .par_iter()
            .map_init(
                || Scratch::new(baseline),
                |scratch, &pos| {
                    scratch
                        .trial(baseline, start, heading, pos)
                        .map(|looped| looped.then_some(pos))
                },
            )
            .collect::<Result<Vec<_>, _>>()?;
        Ok(results.into_iter().flatten().collect())
    }

    #[cfg(not(feature = "parallel"))]
    fn search_parallel(&mut self, candidates: &[Position]) -> Result<Vec<Position>, PatrolError> {
        self.search_sequential(candidates)
    }
}
