use std::fmt;

/// A square on the board. Files and ranks both run 1..=8 (file 1 is the a-file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub rank: u8,  // 1-8
    pub file: u8,  // a-h (1-8)
}

impl Position {
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if (1..=8).contains(&file) && (1..=8).contains(&rank) {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    pub fn from_algebraic(notation: &str) -> Option<Self> {
        let mut chars = notation.chars();
        let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => (file, rank),
            _ => return None,
        };

        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }

        Some(Self {
            file: (file as u8) - b'a' + 1,
            rank: (rank as u8) - b'0',
        })
    }

    /// Index into a 64-entry board array, a1 = 0, h1 = 7, a8 = 56
    pub fn index(self) -> usize {
        (self.rank as usize - 1) * 8 + (self.file as usize - 1)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index >= 64 {
            return None;
        }
        Some(Self {
            file: (index % 8) as u8 + 1,
            rank: (index / 8) as u8 + 1,
        })
    }

    /// The square reached by stepping `file_step` files and `rank_step` ranks,
    /// or `None` when that leaves the board
    pub fn offset(self, file_step: i8, rank_step: i8) -> Option<Self> {
        let file = self.file as i8 + file_step;
        let rank = self.rank as i8 + rank_step;
        if (1..=8).contains(&file) && (1..=8).contains(&rank) {
            Some(Self { file: file as u8, rank: rank as u8 })
        } else {
            None
        }
    }

    /// Reflects the square across the horizontal midline (a1 <-> a8)
    pub fn mirror(self) -> Self {
        Self {
            file: self.file,
            rank: 9 - self.rank,
        }
    }

    pub fn is_light(self) -> bool {
        (self.file + self.rank) % 2 == 1
    }

    /// Every square from a1 to h8, rank by rank
    pub fn all() -> impl Iterator<Item = Position> {
        (1..=8).flat_map(|rank| (1..=8).map(move |file| Position { rank, file }))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file - 1) as char, self.rank)
    }
}
