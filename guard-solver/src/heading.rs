use serde::Serialize;

/// 見張りの向き（時計回り順）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    /// 90° 右回転
    pub fn next_clockwise(self) -> Self {
        match self {
            Heading::Up => Heading::Right,
            Heading::Right => Heading::Down,
            Heading::Down => Heading::Left,
            Heading::Left => Heading::Up,
        }
    }

    /// (row, col) の差分
    pub fn delta(self) -> (isize, isize) {
        match self {
            Heading::Up => (-1, 0),
            Heading::Right => (0, 1),
            Heading::Down => (1, 0),
            Heading::Left => (0, -1),
        }
    }

    pub fn from_marker(ch: char) -> Option<Self> {
        match ch {
            '^' => Some(Heading::Up),
            '>' => Some(Heading::Right),
            'v' => Some(Heading::Down),
            '<' => Some(Heading::Left),
            _ => None,
        }
    }

    pub fn marker(self) -> char {
        match self {
            Heading::Up => '^',
            Heading::Right => '>',
            Heading::Down => 'v',
            Heading::Left => '<',
        }
    }

    /// VisitedSet のビットマスク用
    pub(crate) fn bit(self) -> u8 {
        match self {
            Heading::Up => 0b0001,
            Heading::Right => 0b0010,
            Heading::Down => 0b0100,
            Heading::Left => 0b1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clockwise_cycle_returns_after_four_turns() {
        for h in Heading::ALL {
            let mut cur = h;
            for _ in 0..4 {
                cur = cur.next_clockwise();
            }
            assert_eq!(cur, h);
        }
        assert_eq!(Heading::Up.next_clockwise(), Heading::Right);
        assert_eq!(Heading::Left.next_clockwise(), Heading::Up);
    }

    #[test]
    fn markers_map_both_ways() {
        for h in Heading::ALL {
            assert_eq!(Heading::from_marker(h.marker()), Some(h));
        }
        assert_eq!(Heading::from_marker('.'), None);
        assert_eq!(Heading::from_marker('V'), None);
    }

    #[test]
    fn bits_are_distinct() {
        let mask = Heading::ALL.iter().fold(0u8, |acc, h| {
            assert_eq!(acc & h.bit(), 0);
            acc | h.bit()
        });
        assert_eq!(mask, 0b1111);
    }
}
