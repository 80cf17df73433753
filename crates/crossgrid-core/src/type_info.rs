//! Crossword type configuration.
//!
//! A [`CrosswordTypeInfo`] describes the rules of one crossword style. The
//! validation engine consults it but never changes it; switching styles is
//! an explicit, undoable edit.

bitflags::bitflags! {
    /// The cell kinds a crossword type allows besides empty cells.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CellKinds: u8 {
        /// Plain answer letters.
        const LETTER = 0b0000_0001;
        /// Letters that contribute to the solution word.
        const SOLUTION_LETTER = 0b0000_0010;
        /// Visible clue markers.
        const CLUE = 0b0000_0100;
        /// Cells showing a horizontal and a vertical clue.
        const DOUBLE_CLUE = 0b0000_1000;
        /// Spanned image cells.
        const IMAGE = 0b0001_0000;
    }
}

/// Characters allowed in answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[repr(u8)]
pub enum LetterContent {
    /// Alphabetic characters only.
    #[display("letters")]
    Letters = 0,
    /// ASCII digits only.
    #[display("digits")]
    Digits = 1,
    /// Alphabetic characters and ASCII digits.
    #[display("letters and digits")]
    LettersAndDigits = 2,
}

impl LetterContent {
    /// Returns `true` if `c` may appear in an answer.
    #[must_use]
    pub fn accepts(self, c: char) -> bool {
        match self {
            Self::Letters => c.is_alphabetic(),
            Self::Digits => c.is_ascii_digit(),
            Self::LettersAndDigits => c.is_alphabetic() || c.is_ascii_digit(),
        }
    }

    /// Returns a character that is always accepted.
    #[must_use]
    pub fn placeholder(self) -> char {
        match self {
            Self::Letters | Self::LettersAndDigits => 'A',
            Self::Digits => '0',
        }
    }

    /// Returns the wire tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parses a wire tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Letters),
            1 => Some(Self::Digits),
            2 => Some(Self::LettersAndDigits),
            _ => None,
        }
    }
}

/// Whether clues are shown in their own grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[repr(u8)]
pub enum ClueCellHandling {
    /// Every clue needs a visible marker cell.
    #[display("required")]
    Required = 0,
    /// Clues may be hidden or visible.
    #[display("allowed")]
    Allowed = 1,
    /// Every clue is hidden.
    #[display("disallowed")]
    Disallowed = 2,
}

impl ClueCellHandling {
    /// Returns the wire tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parses a wire tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Required),
            1 => Some(Self::Allowed),
            2 => Some(Self::Disallowed),
            _ => None,
        }
    }
}

/// Named crossword styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[repr(u8)]
pub enum CrosswordType {
    /// Hidden clues with numbers, symmetric black-square layout.
    #[display("american")]
    American = 0,
    /// Clues written into marker cells next to their answers.
    #[display("swedish")]
    Swedish = 1,
    /// Anything goes.
    #[display("free")]
    Free = 2,
}

impl CrosswordType {
    /// All named styles.
    pub const ALL: [Self; 3] = [Self::American, Self::Swedish, Self::Free];

    /// Returns the wire tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parses a wire tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::American),
            1 => Some(Self::Swedish),
            2 => Some(Self::Free),
            _ => None,
        }
    }
}

/// The rules of a crossword style.
///
/// # Examples
///
/// ```
/// use crossgrid_core::{ClueCellHandling, CrosswordType, CrosswordTypeInfo};
///
/// let info = CrosswordTypeInfo::preset(CrosswordType::Free)
///     .with_min_answer_length(2)
///     .with_clue_cell_handling(ClueCellHandling::Required);
/// assert_eq!(info.min_answer_length, 2);
/// assert_eq!(info.crossword_type, CrosswordType::Free);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CrosswordTypeInfo {
    /// The named style these rules started from.
    pub crossword_type: CrosswordType,
    /// Characters allowed in answers.
    pub letter_content: LetterContent,
    /// Whether clues get visible marker cells.
    pub clue_cell_handling: ClueCellHandling,
    /// Cell kinds that may appear in the grid.
    pub allowed_cells: CellKinds,
    /// Minimum answer length.
    pub min_answer_length: u8,
    /// Whether the layout should be symmetric under 180° rotation.
    pub rotational_symmetry: bool,
}

impl Default for CrosswordTypeInfo {
    fn default() -> Self {
        Self::preset(CrosswordType::Free)
    }
}

impl CrosswordTypeInfo {
    /// Returns the rules of a named style.
    #[must_use]
    pub const fn preset(crossword_type: CrosswordType) -> Self {
        match crossword_type {
            CrosswordType::American => Self {
                crossword_type,
                letter_content: LetterContent::Letters,
                clue_cell_handling: ClueCellHandling::Disallowed,
                allowed_cells: CellKinds::LETTER.union(CellKinds::SOLUTION_LETTER),
                min_answer_length: 3,
                rotational_symmetry: true,
            },
            CrosswordType::Swedish => Self {
                crossword_type,
                letter_content: LetterContent::Letters,
                clue_cell_handling: ClueCellHandling::Required,
                allowed_cells: CellKinds::all(),
                min_answer_length: 2,
                rotational_symmetry: false,
            },
            CrosswordType::Free => Self {
                crossword_type,
                letter_content: LetterContent::LettersAndDigits,
                clue_cell_handling: ClueCellHandling::Allowed,
                allowed_cells: CellKinds::all(),
                min_answer_length: 1,
                rotational_symmetry: false,
            },
        }
    }

    /// Sets the allowed answer characters.
    #[must_use]
    pub const fn with_letter_content(mut self, letter_content: LetterContent) -> Self {
        self.letter_content = letter_content;
        self
    }

    /// Sets the clue cell policy.
    #[must_use]
    pub const fn with_clue_cell_handling(mut self, handling: ClueCellHandling) -> Self {
        self.clue_cell_handling = handling;
        self
    }

    /// Sets the allowed cell kinds.
    #[must_use]
    pub const fn with_allowed_cells(mut self, allowed_cells: CellKinds) -> Self {
        self.allowed_cells = allowed_cells;
        self
    }

    /// Sets the minimum answer length.
    #[must_use]
    pub const fn with_min_answer_length(mut self, min_answer_length: u8) -> Self {
        self.min_answer_length = min_answer_length;
        self
    }

    /// Sets whether rotational symmetry is expected.
    #[must_use]
    pub const fn with_rotational_symmetry(mut self, rotational_symmetry: bool) -> Self {
        self.rotational_symmetry = rotational_symmetry;
        self
    }

    /// Returns `true` if all of `kinds` may appear in the grid.
    #[must_use]
    pub const fn allows(&self, kinds: CellKinds) -> bool {
        self.allowed_cells.contains(kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_match_their_style() {
        for kind in CrosswordType::ALL {
            assert_eq!(CrosswordTypeInfo::preset(kind).crossword_type, kind);
        }

        let american = CrosswordTypeInfo::preset(CrosswordType::American);
        assert_eq!(american.clue_cell_handling, ClueCellHandling::Disallowed);
        assert!(!american.allows(CellKinds::IMAGE));
        assert!(american.rotational_symmetry);

        let swedish = CrosswordTypeInfo::preset(CrosswordType::Swedish);
        assert_eq!(swedish.clue_cell_handling, ClueCellHandling::Required);
        assert!(swedish.allows(CellKinds::DOUBLE_CLUE | CellKinds::IMAGE));
    }

    #[test]
    fn test_letter_content_classes() {
        assert!(LetterContent::Letters.accepts('Ä'));
        assert!(!LetterContent::Letters.accepts('7'));
        assert!(LetterContent::Digits.accepts('7'));
        assert!(!LetterContent::Digits.accepts('x'));
        assert!(LetterContent::LettersAndDigits.accepts('x'));
        assert!(!LetterContent::LettersAndDigits.accepts('-'));
        for content in [
            LetterContent::Letters,
            LetterContent::Digits,
            LetterContent::LettersAndDigits,
        ] {
            assert!(content.accepts(content.placeholder()));
        }
    }

    #[test]
    fn test_tags_roundtrip() {
        for kind in CrosswordType::ALL {
            assert_eq!(CrosswordType::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ClueCellHandling::from_tag(3), None);
        assert_eq!(LetterContent::from_tag(2), Some(LetterContent::LettersAndDigits));
    }
}
