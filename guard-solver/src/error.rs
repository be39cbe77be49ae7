use crate::grid::Position;

/// Fatal input problems. Nothing is recovered from these.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read grid: {0}")]
    Io(#[from] std::io::Error),
    #[error("grid is empty")]
    Empty,
    #[error("row {row} has width {width}, expected {expected}")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },
    #[error("unknown cell {ch:?} at row {row}, col {col}")]
    UnknownCell { row: usize, col: usize, ch: char },
    #[error("no guard marker (^ > v <) in grid")]
    MissingGuard,
    #[error("multiple guard markers: {first} and {second}")]
    MultipleGuards { first: Position, second: Position },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatrolError {
    /// 四方すべて塞がれて回転しても進めない
    #[error("guard is boxed in at {position}")]
    Deadlock { position: Position },
}
