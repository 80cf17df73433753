use crossgrid_core::{ClueId, Coord, ErrorType, Size};

/// Errors returned by grid queries and mutations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GridError {
    /// The coordinate lies outside the grid.
    #[display("coordinate {coord} is outside the grid")]
    OutOfBounds {
        /// The offending coordinate.
        coord: Coord,
    },
    /// The placement rules reject the change.
    #[display("placement rejected: {errors}")]
    Placement {
        /// The violations that were not ignorable.
        errors: ErrorType,
    },
    /// No clue with this identity exists.
    #[display("no {id}")]
    ClueNotFound {
        /// The missing clue.
        id: ClueId,
    },
    /// No image is anchored at this coordinate.
    #[display("no image anchored at {anchor}")]
    ImageNotFound {
        /// The coordinate that should hold an image anchor.
        anchor: Coord,
    },
    /// The cell does not hold a letter.
    #[display("cell {coord} does not hold a letter")]
    NotALetter {
        /// The offending coordinate.
        coord: Coord,
    },
    /// The character is not allowed by the crossword type.
    #[display("letter {letter:?} is not allowed in this crossword")]
    IllegalLetter {
        /// The rejected character.
        letter: char,
    },
    /// Another cell already uses this solution word index.
    #[display("solution index {index} is already used at {coord}")]
    SolutionIndexInUse {
        /// The requested index.
        index: u16,
        /// The cell already using it.
        coord: Coord,
    },
    /// The cell is not part of the solution word.
    #[display("cell {coord} is not a solution letter")]
    NotASolutionLetter {
        /// The offending coordinate.
        coord: Coord,
    },
    /// The cell is already part of the solution word.
    #[display("cell {coord} is already a solution letter")]
    AlreadyASolutionLetter {
        /// The offending coordinate.
        coord: Coord,
    },
    /// The crossword type does not allow this kind of cell.
    #[display("{kind} cells are not allowed in this crossword type")]
    CellKindDisallowed {
        /// Human-readable name of the cell kind.
        kind: &'static str,
    },
    /// The change would discard solution letters; remove them first.
    #[display("the change would discard {count} solution letter(s)")]
    OrphanedSolutionLetters {
        /// Number of affected solution letters.
        count: usize,
    },
    /// The requested grid or image size has a zero dimension.
    #[display("invalid size {size}")]
    InvalidSize {
        /// The rejected size.
        size: Size,
    },
}

impl GridError {
    /// Returns the placement violations carried by this error, if any.
    #[must_use]
    pub fn placement_errors(&self) -> ErrorType {
        match self {
            Self::Placement { errors } => *errors,
            _ => ErrorType::empty(),
        }
    }
}
