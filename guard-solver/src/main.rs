use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use guard_solver::{
    Candidates, Heading, PatrolSimulator, Position, RunOutcome, SearchOptions, logging,
};
use serde::Serialize;
use tracing::info;

const DEFAULT_INPUT: &str = "day6-input.txt";

#[derive(Parser, Debug)]
#[command(name = "guard-solver")]
#[command(about = "Simulates the patrolling guard and counts loop-inducing obstructions", long_about = None)]
struct Args {
    /// Grid file (defaults to GUARD_INPUT environment variable, then day6-input.txt)
    input: Option<PathBuf>,

    /// Which answer to compute
    #[arg(long, value_enum, default_value_t = Part::Both)]
    part: Part,

    /// Cells to try as obstruction placements
    #[arg(long, value_enum, default_value_t = CandidateArg::All)]
    candidates: CandidateArg,

    /// Run the obstruction search on a single thread
    #[arg(long)]
    sequential: bool,

    /// Print a JSON report instead of bare numbers
    #[arg(long)]
    json: bool,

    /// Print the part 1 trail grid
    #[arg(long)]
    render: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Part {
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
    Both,
}

impl Part {
    fn first(self) -> bool {
        matches!(self, Part::One | Part::Both)
    }

    fn second(self) -> bool {
        matches!(self, Part::Two | Part::Both)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CandidateArg {
    All,
    Path,
}

impl From<CandidateArg> for Candidates {
    fn from(arg: CandidateArg) -> Self {
        match arg {
            CandidateArg::All => Candidates::All,
            CandidateArg::Path => Candidates::Path,
        }
    }
}

#[derive(Serialize)]
struct Report {
    input: String,
    rows: usize,
    cols: usize,
    start: Position,
    heading: Heading,
    #[serde(skip_serializing_if = "Option::is_none")]
    visited: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    loop_obstructions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    obstruction_positions: Option<Vec<Position>>,
}

fn resolve_input(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| std::env::var_os("GUARD_INPUT").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT))
}

fn visited_cells(sim: &mut PatrolSimulator) -> Result<usize> {
    match sim.run()? {
        RunOutcome::Completed { visited } => Ok(visited),
        RunOutcome::Looped => bail!("guard never leaves the grid"),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();
    let args = Args::parse();

    let input = resolve_input(args.input);
    let mut sim = PatrolSimulator::load(&input)
        .with_context(|| format!("failed to load grid from {}", input.display()))?;
    let (start, heading) = sim.start();
    info!(
        input = %input.display(),
        rows = sim.grid().rows(),
        cols = sim.grid().cols(),
        %start,
        ?heading,
        "grid loaded"
    );

    let visited = if args.part.first() {
        Some(visited_cells(&mut sim).context("part 1 simulation failed")?)
    } else {
        None
    };

    if args.render {
        if visited.is_none() {
            sim.run()?;
        }
        // JSON と混ざらないように stderr へ
        if args.json {
            eprint!("{}", sim.trail());
        } else {
            print!("{}", sim.trail());
        }
    }

    let obstructions = if args.part.second() {
        let options = SearchOptions {
            candidates: args.candidates.into(),
            parallel: !args.sequential && SearchOptions::default().parallel,
        };
        Some(sim.search(options).context("obstruction search failed")?)
    } else {
        None
    };

    if args.json {
        let report = Report {
            input: input.display().to_string(),
            rows: sim.grid().rows(),
            cols: sim.grid().cols(),
            start,
            heading,
            visited,
            loop_obstructions: obstructions.as_ref().map(Vec::len),
            obstruction_positions: obstructions,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(visited) = visited {
            println!("{}", visited);
        }
        if let Some(obstructions) = &obstructions {
            println!("{}", obstructions.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_input_wins() {
        let path = resolve_input(Some(PathBuf::from("grid.txt")));
        assert_eq!(path, PathBuf::from("grid.txt"));
    }

    #[test]
    fn parses_part_and_candidates() {
        let args = Args::try_parse_from(["guard-solver", "in.txt", "--part", "2", "--candidates", "path"])
            .unwrap();
        assert_eq!(args.part, Part::Two);
        assert_eq!(args.candidates, CandidateArg::Path);
        assert!(!args.part.first());
        assert!(args.part.second());

        let defaults = Args::try_parse_from(["guard-solver"]).unwrap();
        assert_eq!(defaults.part, Part::Both);
        assert!(defaults.input.is_none());
        assert!(!defaults.json);
    }

    #[test]
    fn looping_grid_has_no_part_one_answer() {
        let mut sim: PatrolSimulator = ".#...\n....#\n.....\n#^...\n...#.\n".parse().unwrap();
        assert!(visited_cells(&mut sim).is_err());
    }
}
