//! Cell variants and per-cell data.

use crate::{Coord, Orientation, Size};

/// The identity of a clue: its coordinate and orientation.
///
/// A grid holds at most one clue per identity. For a hidden clue the
/// coordinate is its first letter; otherwise it is the marker cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("{orientation} clue at {coord}")]
pub struct ClueId {
    /// Clue coordinate.
    pub coord: Coord,
    /// Answer direction.
    pub orientation: Orientation,
}

impl ClueId {
    /// Creates a clue identity.
    #[must_use]
    pub const fn new(coord: Coord, orientation: Orientation) -> Self {
        Self { coord, orientation }
    }

    /// Returns the same clue displaced by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            coord: self.coord.offset(dx, dy)?,
            orientation: self.orientation,
        })
    }
}

/// How sure the solver is about a typed letter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[repr(u8)]
pub enum Confidence {
    /// Entered with confidence.
    #[default]
    #[display("confident")]
    Confident = 0,
    /// Entered as a guess.
    #[display("unsure")]
    Unsure = 1,
    /// Revealed or verified against the correct letter.
    #[display("solved")]
    Solved = 2,
}

impl Confidence {
    /// Returns the wire tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parses a wire tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Confident),
            1 => Some(Self::Unsure),
            2 => Some(Self::Solved),
            _ => None,
        }
    }
}

/// Back-references from a letter to the clues whose answers contain it.
///
/// Holds at most one clue per orientation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LetterOwners([Option<ClueId>; 2]);

impl LetterOwners {
    /// Returns the owning clue in `orientation`.
    #[must_use]
    pub fn get(&self, orientation: Orientation) -> Option<ClueId> {
        self.0[orientation.index()]
    }

    /// Sets or clears the owning clue in `orientation`.
    pub fn set(&mut self, orientation: Orientation, clue: Option<ClueId>) {
        self.0[orientation.index()] = clue;
    }

    /// Returns `true` if no clue owns the letter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Iterates over the owning clues, horizontal first.
    pub fn iter(&self) -> impl Iterator<Item = ClueId> + '_ {
        self.0.iter().flatten().copied()
    }

    /// Applies `f` to every owning clue.
    pub fn map(&mut self, mut f: impl FnMut(ClueId) -> Option<ClueId>) {
        for slot in &mut self.0 {
            *slot = slot.and_then(&mut f);
        }
    }
}

/// A cell holding one letter of one or two answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LetterCell {
    /// The letter the answer requires.
    pub correct: char,
    /// The letter typed by the solver, if any.
    pub current: Option<char>,
    /// How sure the solver is about `current`.
    pub confidence: Confidence,
    /// The clues whose answers pass through this cell.
    pub owners: LetterOwners,
}

impl LetterCell {
    /// Creates an untyped letter owned by `owner`.
    #[must_use]
    pub fn new(correct: char, owner: ClueId) -> Self {
        let mut owners = LetterOwners::default();
        owners.set(owner.orientation, Some(owner));
        Self {
            correct,
            current: None,
            confidence: Confidence::default(),
            owners,
        }
    }
}

/// A spanned cell anchor holding image content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageCell {
    /// Number of columns and rows covered, anchor included.
    pub size: Size,
    /// Location of the image content.
    pub url: String,
}

/// The content of one grid coordinate.
///
/// Every in-bounds coordinate holds exactly one cell.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Cell {
    /// Placeholder without content.
    #[default]
    Empty,
    /// One letter of one or two answers.
    Letter(LetterCell),
    /// A letter that is also part of the solution word.
    SolutionLetter {
        /// The letter data.
        letter: LetterCell,
        /// Position in the solution word, unique across the grid.
        index: u16,
    },
    /// The visible marker of one clue whose identity is this coordinate.
    Clue {
        /// Orientation of the clue.
        orientation: Orientation,
    },
    /// The visible markers of both a horizontal and a vertical clue.
    DoubleClue,
    /// The anchor of a spanned image.
    Image(ImageCell),
    /// A non-anchor coordinate covered by a spanned image.
    Spanned {
        /// Coordinate of the owning [`Cell::Image`].
        anchor: Coord,
    },
}

impl Cell {
    /// Returns the letter data of a letter or solution letter cell.
    #[must_use]
    pub fn as_letter(&self) -> Option<&LetterCell> {
        match self {
            Self::Letter(letter) | Self::SolutionLetter { letter, .. } => Some(letter),
            _ => None,
        }
    }

    /// Mutable variant of [`Cell::as_letter`].
    #[must_use]
    pub fn as_letter_mut(&mut self) -> Option<&mut LetterCell> {
        match self {
            Self::Letter(letter) | Self::SolutionLetter { letter, .. } => Some(letter),
            _ => None,
        }
    }

    /// Returns `true` for letter and solution letter cells.
    #[must_use]
    pub fn is_any_letter(&self) -> bool {
        self.as_letter().is_some()
    }

    /// Returns `true` for clue and double clue markers.
    #[must_use]
    pub fn is_any_clue(&self) -> bool {
        matches!(self, Self::Clue { .. } | Self::DoubleClue)
    }

    /// Returns the solution word index of a solution letter.
    #[must_use]
    pub fn solution_index(&self) -> Option<u16> {
        match self {
            Self::SolutionLetter { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Returns `true` if this marker cell shows a clue in `orientation`.
    #[must_use]
    pub fn has_clue_marker(&self, orientation: Orientation) -> bool {
        match self {
            Self::Clue { orientation: o } => *o == orientation,
            Self::DoubleClue => true,
            _ => false,
        }
    }

    /// Returns a one-character rendering used by content dumps.
    ///
    /// Letters render as their correct letter; solution letters in lower case.
    #[must_use]
    pub fn glyph(&self) -> char {
        match self {
            Self::Empty => '.',
            Self::Letter(letter) => letter.correct,
            Self::SolutionLetter { letter, .. } => {
                letter.correct.to_lowercase().next().unwrap_or(letter.correct)
            }
            Self::Clue {
                orientation: Orientation::Horizontal,
            } => '>',
            Self::Clue {
                orientation: Orientation::Vertical,
            } => 'v',
            Self::DoubleClue => '+',
            Self::Image(_) => '@',
            Self::Spanned { .. } => '~',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_owners() {
        let h = ClueId::new(Coord::new(0, 0), Orientation::Horizontal);
        let v = ClueId::new(Coord::new(1, 0), Orientation::Vertical);
        let mut owners = LetterOwners::default();
        assert!(owners.is_empty());

        owners.set(Orientation::Horizontal, Some(h));
        owners.set(Orientation::Vertical, Some(v));
        assert_eq!(owners.iter().collect::<Vec<_>>(), vec![h, v]);

        owners.map(|id| id.offset(1, 1));
        assert_eq!(owners.get(Orientation::Horizontal), h.offset(1, 1));

        owners.set(Orientation::Horizontal, None);
        owners.set(Orientation::Vertical, None);
        assert!(owners.is_empty());
    }

    #[test]
    fn test_letter_accessors() {
        let owner = ClueId::new(Coord::new(0, 0), Orientation::Vertical);
        let letter = LetterCell::new('Q', owner);
        let plain = Cell::Letter(letter.clone());
        let solution = Cell::SolutionLetter { letter, index: 3 };

        assert!(plain.is_any_letter());
        assert!(solution.is_any_letter());
        assert_eq!(plain.solution_index(), None);
        assert_eq!(solution.solution_index(), Some(3));
        assert_eq!(plain.glyph(), 'Q');
        assert_eq!(solution.glyph(), 'q');
        assert!(Cell::Empty.is_empty());
        assert!(!Cell::DoubleClue.is_any_letter());
    }

    #[test]
    fn test_clue_markers() {
        let marker = Cell::Clue {
            orientation: Orientation::Horizontal,
        };
        assert!(marker.has_clue_marker(Orientation::Horizontal));
        assert!(!marker.has_clue_marker(Orientation::Vertical));
        assert!(Cell::DoubleClue.has_clue_marker(Orientation::Vertical));
        assert!(marker.is_any_clue());
    }
}
