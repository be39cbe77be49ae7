use std::fmt;

use serde::Serialize;

use crate::error::LoadError;
use crate::heading::Heading;

/// マスの状態
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Wall,
    /// what-if 試行で一時的に置く障害物
    Obstruction,
    /// 見張りの通過跡
    Visited,
    Guard(Heading),
}

impl Cell {
    /// 入力として許される文字だけを受け付ける（'O' / 'X' は出力専用）
    fn from_input(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(Cell::Empty),
            '#' => Some(Cell::Wall),
            _ => Heading::from_marker(ch).map(Cell::Guard),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Wall => '#',
            Cell::Obstruction => 'O',
            Cell::Visited => 'X',
            Cell::Guard(h) => h.marker(),
        }
    }

    pub fn is_blocking(self) -> bool {
        matches!(self, Cell::Wall | Cell::Obstruction)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Row-major grid with dimensions fixed at load time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Parses grid text. Only shape and characters are checked here; guard
    /// uniqueness is checked by [`Grid::locate_guard`].
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let lines: Vec<&str> = text.lines().map(|l| l.trim_end()).collect();
        let used = lines
            .iter()
            .rposition(|l| !l.is_empty())
            .map_or(0, |last| last + 1);
        let lines = &lines[..used];

        let Some(first) = lines.first() else {
            return Err(LoadError::Empty);
        };
        let cols = first.chars().count();
        if cols == 0 {
            return Err(LoadError::Empty);
        }

        let mut cells = Vec::with_capacity(cols * lines.len());
        for (row, line) in lines.iter().enumerate() {
            let width = line.chars().count();
            if width != cols {
                return Err(LoadError::RaggedRow {
                    row,
                    width,
                    expected: cols,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = Cell::from_input(ch).ok_or(LoadError::UnknownCell { row, col, ch })?;
                cells.push(cell);
            }
        }

        Ok(Self {
            rows: lines.len(),
            cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, pos: Position) -> Cell {
        self.cells[self.index(pos)]
    }

    pub fn set(&mut self, pos: Position, cell: Cell) {
        let idx = self.index(pos);
        self.cells[idx] = cell;
    }

    /// `heading` 方向へ 1 マス進んだ位置。盤外なら None
    pub fn neighbor(&self, pos: Position, heading: Heading) -> Option<Position> {
        let (dr, dc) = heading.delta();
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        (row < self.rows && col < self.cols).then_some(Position { row, col })
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| Position { row, col }))
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    pub fn open_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_blocking()).count()
    }

    /// Finds the single guard marker.
    pub fn locate_guard(&self) -> Result<(Position, Heading), LoadError> {
        let mut found: Option<(Position, Heading)> = None;
        for pos in self.positions() {
            if let Cell::Guard(heading) = self.get(pos) {
                if let Some((first, _)) = found {
                    return Err(LoadError::MultipleGuards { first, second: pos });
                }
                found = Some((pos, heading));
            }
        }
        found.ok_or(LoadError::MissingGuard)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: String = row.iter().map(|c| c.to_char()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cells_and_dimensions() {
        let grid = Grid::parse("..#\n.^.\n").unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.get(Position::new(0, 2)), Cell::Wall);
        assert_eq!(grid.get(Position::new(1, 1)), Cell::Guard(Heading::Up));
        assert_eq!(grid.open_cells(), 5);
        assert_eq!(grid.to_string(), "..#\n.^.\n");
    }

    #[test]
    fn ignores_crlf_and_trailing_blank_lines() {
        let grid = Grid::parse("#.\r\n.>\r\n\r\n\n").unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.get(Position::new(1, 1)), Cell::Guard(Heading::Right));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(Grid::parse(""), Err(LoadError::Empty)));
        assert!(matches!(Grid::parse("\n\n"), Err(LoadError::Empty)));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Grid::parse("...\n..\n.^.").unwrap_err();
        assert!(matches!(
            err,
            LoadError::RaggedRow {
                row: 1,
                width: 2,
                expected: 3
            }
        ));
    }

    #[test]
    fn rejects_unknown_characters() {
        // 'X' / 'O' は描画専用で入力には使えない
        let err = Grid::parse("..X\n.^.").unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnknownCell {
                row: 0,
                col: 2,
                ch: 'X'
            }
        ));
    }

    #[test]
    fn guard_must_be_unique() {
        let none = Grid::parse("...\n...").unwrap();
        assert!(matches!(none.locate_guard(), Err(LoadError::MissingGuard)));

        let two = Grid::parse(".^.\n..<").unwrap();
        match two.locate_guard() {
            Err(LoadError::MultipleGuards { first, second }) => {
                assert_eq!(first, Position::new(0, 1));
                assert_eq!(second, Position::new(1, 2));
            }
            other => panic!("unexpected: {:?}", other),
        }

        let one = Grid::parse("...\n.v.").unwrap();
        assert_eq!(
            one.locate_guard().unwrap(),
            (Position::new(1, 1), Heading::Down)
        );
    }

    #[test]
    fn neighbor_stops_at_borders() {
        let grid = Grid::parse("...\n.^.\n...").unwrap();
        let corner = Position::new(0, 0);
        assert_eq!(grid.neighbor(corner, Heading::Up), None);
        assert_eq!(grid.neighbor(corner, Heading::Left), None);
        assert_eq!(
            grid.neighbor(corner, Heading::Right),
            Some(Position::new(0, 1))
        );
        let far = Position::new(2, 2);
        assert_eq!(grid.neighbor(far, Heading::Down), None);
        assert_eq!(grid.neighbor(far, Heading::Right), None);
    }
}
