//! Placement violations reported by the validation engine.

use std::fmt;

bitflags::bitflags! {
    /// A set of independent placement violations.
    ///
    /// One validation call may report several violations at once. Callers
    /// pass a subset as "ignorable" to permit an edit despite those
    /// violations.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossgrid_core::ErrorType;
    ///
    /// let errors = ErrorType::ANSWER_TOO_SHORT | ErrorType::CLUE_DOESNT_FIT;
    /// let remaining = errors.difference(ErrorType::ANSWER_TOO_SHORT);
    /// assert_eq!(remaining, ErrorType::CLUE_DOESNT_FIT);
    /// assert_eq!(remaining.to_string(), "the answer does not fit into the grid");
    /// ```
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ErrorType: u16 {
        /// The answer is shorter than the configured minimum.
        const ANSWER_TOO_SHORT = 1 << 0;
        /// The answer contains characters outside the letter content class.
        const ANSWER_ILLEGAL_CHARACTERS = 1 << 1;
        /// The clue marker or answer leaves the grid.
        const CLUE_DOESNT_FIT = 1 << 2;
        /// An answer letter already belongs to a clue of the same orientation.
        const ANSWER_OVERWRITES_CLUE_IN_SAME_ORIENTATION = 1 << 3;
        /// An answer letter differs from a crossing answer's letter.
        const ANSWER_IS_ILLEGAL = 1 << 4;
        /// The clue marker would land on an occupied cell.
        const CLUE_CELL_ISNT_EMPTY = 1 << 5;
        /// Visible clue cells are not allowed by the crossword type.
        const CLUE_CELLS_DISALLOWED = 1 << 6;
        /// Clues must have a visible clue cell in this crossword type.
        const CLUE_CELLS_REQUIRED = 1 << 7;
        /// An answer letter would land on a clue cell.
        const ANSWER_OVERWRITES_CLUE_CELL = 1 << 8;
        /// An answer letter would land on an image.
        const ANSWER_OVERWRITES_IMAGE = 1 << 9;
        /// The image leaves the grid.
        const IMAGE_DOESNT_FIT = 1 << 10;
        /// The image would cover occupied cells.
        const IMAGE_CELLS_ARENT_EMPTY = 1 << 11;
        /// Images are not allowed by the crossword type.
        const IMAGE_CELLS_DISALLOWED = 1 << 12;
    }
}

impl ErrorType {
    /// Violations of the crossword type's policy rather than of the grid
    /// structure. Restoring a previously valid state ignores these.
    pub const POLICY: Self = Self::ANSWER_TOO_SHORT
        .union(Self::ANSWER_ILLEGAL_CHARACTERS)
        .union(Self::CLUE_CELLS_DISALLOWED)
        .union(Self::CLUE_CELLS_REQUIRED)
        .union(Self::IMAGE_CELLS_DISALLOWED);

    const MESSAGES: [(Self, &'static str); 13] = [
        (Self::ANSWER_TOO_SHORT, "the answer is too short"),
        (
            Self::ANSWER_ILLEGAL_CHARACTERS,
            "the answer contains illegal characters",
        ),
        (Self::CLUE_DOESNT_FIT, "the answer does not fit into the grid"),
        (
            Self::ANSWER_OVERWRITES_CLUE_IN_SAME_ORIENTATION,
            "the answer overwrites another answer in the same orientation",
        ),
        (
            Self::ANSWER_IS_ILLEGAL,
            "the answer does not match the crossing letters",
        ),
        (Self::CLUE_CELL_ISNT_EMPTY, "the clue cell is not empty"),
        (
            Self::CLUE_CELLS_DISALLOWED,
            "clue cells are not allowed in this crossword type",
        ),
        (
            Self::CLUE_CELLS_REQUIRED,
            "clue cells are required in this crossword type",
        ),
        (Self::ANSWER_OVERWRITES_CLUE_CELL, "the answer overwrites a clue cell"),
        (Self::ANSWER_OVERWRITES_IMAGE, "the answer overwrites an image"),
        (Self::IMAGE_DOESNT_FIT, "the image does not fit into the grid"),
        (Self::IMAGE_CELLS_ARENT_EMPTY, "the image cells are not empty"),
        (
            Self::IMAGE_CELLS_DISALLOWED,
            "images are not allowed in this crossword type",
        ),
    ];

    /// Iterates over the human-readable messages of the contained violations.
    pub fn messages(self) -> impl Iterator<Item = &'static str> {
        Self::MESSAGES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, message)| message)
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("no error");
        }
        for (i, message) in self.messages().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_flag_has_a_message() {
        for flag in ErrorType::all().iter() {
            assert_eq!(flag.messages().count(), 1, "{flag:?}");
        }
    }

    #[test]
    fn test_display_joins_messages() {
        let errors = ErrorType::CLUE_CELL_ISNT_EMPTY | ErrorType::ANSWER_TOO_SHORT;
        assert_eq!(
            errors.to_string(),
            "the answer is too short; the clue cell is not empty"
        );
        assert_eq!(ErrorType::empty().to_string(), "no error");
    }

    #[test]
    fn test_policy_excludes_structural_errors() {
        assert!(!ErrorType::POLICY.contains(ErrorType::ANSWER_IS_ILLEGAL));
        assert!(!ErrorType::POLICY.contains(ErrorType::IMAGE_CELLS_ARENT_EMPTY));
        assert!(ErrorType::POLICY.contains(ErrorType::CLUE_CELLS_REQUIRED));
    }
}
