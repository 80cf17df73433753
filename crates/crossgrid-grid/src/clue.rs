use crossgrid_core::{AnswerOffset, ClueId, Confidence, Coord, Orientation};

/// The placement-relevant properties of a clue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClueProperties {
    /// Clue coordinate: the marker cell, or the first letter of a hidden clue.
    pub coord: Coord,
    /// Answer direction.
    pub orientation: Orientation,
    /// Position of the first letter relative to `coord`.
    pub offset: AnswerOffset,
    pub(crate) answer: String,
}

impl ClueProperties {
    /// Creates clue properties, normalizing the answer to upper case.
    #[must_use]
    pub fn new(
        coord: Coord,
        orientation: Orientation,
        offset: AnswerOffset,
        answer: impl AsRef<str>,
    ) -> Self {
        Self {
            coord,
            orientation,
            offset,
            answer: normalize_answer(answer.as_ref()),
        }
    }

    /// Returns the identity a clue with these properties would have.
    #[must_use]
    pub fn id(&self) -> ClueId {
        ClueId::new(self.coord, self.orientation)
    }

    /// Returns the correct answer, upper case.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Returns the answer as characters.
    #[must_use]
    pub fn answer_chars(&self) -> Vec<char> {
        self.answer.chars().collect()
    }

    /// Returns the same properties with another coordinate.
    #[must_use]
    pub fn at(mut self, coord: Coord) -> Self {
        self.coord = coord;
        self
    }
}

/// Upper-cases an answer the way the grid stores it.
#[must_use]
pub(crate) fn normalize_answer(answer: &str) -> String {
    answer.chars().flat_map(char::to_uppercase).collect()
}

/// Returns the answer coordinates for a clue, `None` where a coordinate is
/// not representable.
pub(crate) fn answer_coords(
    coord: Coord,
    orientation: Orientation,
    offset: AnswerOffset,
    len: usize,
) -> impl Iterator<Item = Option<Coord>> {
    let first = offset.apply(coord);
    (0..len).map(move |i| {
        let i = i32::try_from(i).ok()?;
        first?.step(orientation, i)
    })
}

/// A clue registered in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clue {
    pub(crate) id: ClueId,
    pub(crate) offset: AnswerOffset,
    pub(crate) text: String,
    pub(crate) answer: Vec<Coord>,
    pub(crate) number: Option<u16>,
}

impl Clue {
    /// Returns the clue identity.
    #[must_use]
    pub fn id(&self) -> ClueId {
        self.id
    }

    /// Returns the clue coordinate.
    #[must_use]
    pub fn coord(&self) -> Coord {
        self.id.coord
    }

    /// Returns the answer direction.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.id.orientation
    }

    /// Returns the answer offset.
    #[must_use]
    pub fn offset(&self) -> AnswerOffset {
        self.offset
    }

    /// Returns the clue text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the coordinates of the answer letters in order.
    #[must_use]
    pub fn answer(&self) -> &[Coord] {
        &self.answer
    }

    /// Returns the assigned clue number.
    #[must_use]
    pub fn number(&self) -> Option<u16> {
        self.number
    }

    /// Returns the first answer letter.
    #[must_use]
    pub fn first_letter(&self) -> Option<Coord> {
        self.answer.first().copied()
    }

    /// Returns the visible marker coordinate, `None` for hidden clues.
    #[must_use]
    pub fn marker(&self) -> Option<Coord> {
        (!self.offset.is_hidden()).then_some(self.id.coord)
    }
}

/// The typed state of one letter, kept when the letter is removed so it can
/// be restored exactly.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LetterState {
    /// The typed letter.
    pub current: Option<char>,
    /// How sure the solver was.
    pub confidence: Confidence,
    /// Solution word index if the letter was a solution letter.
    pub solution_index: Option<u16>,
}

/// Everything needed to recreate a removed clue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueSnapshot {
    /// Placement properties, including the correct answer.
    pub properties: ClueProperties,
    /// Clue text.
    pub text: String,
    /// Typed state of each answer letter, in answer order.
    pub letters: Vec<LetterState>,
}

impl ClueSnapshot {
    /// Returns the identity of the snapshotted clue.
    #[must_use]
    pub fn id(&self) -> ClueId {
        self.properties.id()
    }
}
