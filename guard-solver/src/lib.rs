pub mod error;
pub mod grid;
pub mod heading;
pub mod logging;
pub mod patrol;
pub mod visited;


pub use error::{LoadError, PatrolError};
pub use grid::{Cell, Grid, Position};
pub use heading::Heading;
pub use patrol::{Candidates, PatrolSimulator, RunOutcome, SearchOptions, Step};
