//! Side-effect free placement checks.
//!
//! Every check returns the full set of violations it finds. The mutators in
//! this crate call the same checks before changing anything, so a check
//! that passes guarantees the matching mutation succeeds.

use crossgrid_core::{
    AnswerOffset, Cell, CellKinds, ClueCellHandling, ClueId, Coord, ErrorType, Orientation, Rect,
};
use tinyvec::ArrayVec;

use crate::{ClueProperties, Grid, GridError, clue::answer_coords};

/// The answer a placement check is run against.
#[derive(Debug, Clone, Copy)]
enum AnswerPattern<'a> {
    /// A concrete answer: characters and crossing letters are checked.
    Text(&'a [char]),
    /// Only the length is known.
    Length(usize),
}

impl AnswerPattern<'_> {
    fn len(self) -> usize {
        match self {
            Self::Text(chars) => chars.len(),
            Self::Length(len) => len,
        }
    }

    fn char_at(self, i: usize) -> Option<char> {
        match self {
            Self::Text(chars) => chars.get(i).copied(),
            Self::Length(_) => None,
        }
    }
}

/// The outcome of [`Grid::can_change_clue_properties`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClueChangePreview {
    /// Violations that are not ignorable.
    pub errors: ErrorType,
    /// Solution letters the change would discard, with their indices.
    pub orphaned_solution_letters: Vec<(Coord, u16)>,
}

impl ClueChangePreview {
    /// Returns `true` if the change can be applied as is.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.orphaned_solution_letters.is_empty()
    }
}

impl Grid {
    /// Checks whether a clue with `props` can be inserted.
    ///
    /// Returns the violations not contained in `ignorable`; an empty set
    /// means the clue can be inserted. Only [`ErrorType::POLICY`] violations
    /// can actually be ignored by [`Grid::insert_clue`].
    #[must_use]
    pub fn can_insert_clue(&self, props: &ClueProperties, ignorable: ErrorType) -> ErrorType {
        self.can_insert_clue_excluding(props, None, ignorable)
    }

    /// Like [`Grid::can_insert_clue`], but treats the clue `exclude` as if it
    /// were already removed. Used to edit a clue in place.
    #[must_use]
    pub fn can_insert_clue_excluding(
        &self,
        props: &ClueProperties,
        exclude: Option<ClueId>,
        ignorable: ErrorType,
    ) -> ErrorType {
        let chars = props.answer_chars();
        self.placement_errors(
            props.coord,
            props.orientation,
            props.offset,
            AnswerPattern::Text(&chars),
            exclude,
        )
        .difference(ignorable)
    }

    /// Returns every answer offset for which a clue of `length` letters at
    /// `coord` passes the placement check.
    ///
    /// The answer characters are not known here, so character classes and
    /// crossing letters are not checked.
    #[must_use]
    pub fn legal_answer_offsets(
        &self,
        coord: Coord,
        orientation: Orientation,
        length: usize,
        exclude: Option<ClueId>,
    ) -> ArrayVec<[AnswerOffset; 9]> {
        AnswerOffset::ALL
            .into_iter()
            .filter(|&offset| {
                self.placement_errors(
                    coord,
                    orientation,
                    offset,
                    AnswerPattern::Length(length),
                    exclude,
                )
                .is_empty()
            })
            .collect()
    }

    fn is_excluded(id: Option<ClueId>, exclude: Option<ClueId>) -> bool {
        id.is_some() && id == exclude
    }

    #[expect(clippy::too_many_lines)]
    fn placement_errors(
        &self,
        coord: Coord,
        orientation: Orientation,
        offset: AnswerOffset,
        answer: AnswerPattern<'_>,
        exclude: Option<ClueId>,
    ) -> ErrorType {
        let info = &self.type_info;
        let mut errors = ErrorType::empty();

        let len = answer.len();
        if len == 0 || len < usize::from(info.min_answer_length) {
            errors |= ErrorType::ANSWER_TOO_SHORT;
        }

        if let AnswerPattern::Text(chars) = answer
            && chars.iter().any(|&c| !info.letter_content.accepts(c))
        {
            errors |= ErrorType::ANSWER_ILLEGAL_CHARACTERS;
        }

        let hidden = offset.is_hidden();
        match info.clue_cell_handling {
            ClueCellHandling::Required if hidden => errors |= ErrorType::CLUE_CELLS_REQUIRED,
            ClueCellHandling::Disallowed if !hidden => errors |= ErrorType::CLUE_CELLS_DISALLOWED,
            _ if !hidden && !info.allows(CellKinds::CLUE) => {
                errors |= ErrorType::CLUE_CELLS_DISALLOWED;
            }
            _ => {}
        }

        if !self.contains(coord) {
            errors |= ErrorType::CLUE_DOESNT_FIT;
        }

        for (i, target) in answer_coords(coord, orientation, offset, len).enumerate() {
            let Some(target) = target.filter(|&c| self.contains(c)) else {
                errors |= ErrorType::CLUE_DOESNT_FIT;
                continue;
            };
            if !hidden && target == coord {
                errors |= ErrorType::ANSWER_OVERWRITES_CLUE_CELL;
                continue;
            }
            match self.cell(target) {
                None | Some(Cell::Empty) => {}
                Some(Cell::Letter(letter) | Cell::SolutionLetter { letter, .. }) => {
                    let same = letter.owners.get(orientation);
                    if same.is_some() && !Self::is_excluded(same, exclude) {
                        errors |= ErrorType::ANSWER_OVERWRITES_CLUE_IN_SAME_ORIENTATION;
                    }
                    let crossing = letter.owners.get(orientation.flipped());
                    if crossing.is_some()
                        && !Self::is_excluded(crossing, exclude)
                        && let Some(c) = answer.char_at(i)
                        && c != letter.correct
                    {
                        errors |= ErrorType::ANSWER_IS_ILLEGAL;
                    }
                }
                Some(Cell::Clue { orientation: o })
                    if Self::is_excluded(Some(ClueId::new(target, *o)), exclude) => {}
                Some(Cell::Clue { .. } | Cell::DoubleClue) => {
                    errors |= ErrorType::ANSWER_OVERWRITES_CLUE_CELL;
                }
                Some(Cell::Image(_) | Cell::Spanned { .. }) => {
                    errors |= ErrorType::ANSWER_OVERWRITES_IMAGE;
                }
            }
        }

        if !hidden && let Some(cell) = self.cell(coord) {
            let id = ClueId::new(coord, orientation);
            let free = match cell {
                Cell::Empty => true,
                Cell::Clue { orientation: o } => {
                    Self::is_excluded(Some(ClueId::new(coord, *o)), exclude)
                        || (*o != orientation && info.allows(CellKinds::DOUBLE_CLUE))
                }
                Cell::DoubleClue => Self::is_excluded(Some(id), exclude),
                Cell::Letter(letter) | Cell::SolutionLetter { letter, .. } => letter
                    .owners
                    .iter()
                    .all(|owner| Self::is_excluded(Some(owner), exclude)),
                Cell::Image(_) | Cell::Spanned { .. } => false,
            };
            if !free {
                errors |= ErrorType::CLUE_CELL_ISNT_EMPTY;
            }
        }

        errors
    }

    /// Checks whether an image can cover `rect`.
    ///
    /// `exclude` names the anchor of an image being moved or resized; its
    /// own cells count as empty.
    #[must_use]
    pub fn can_insert_image(
        &self,
        rect: Rect,
        exclude: Option<Coord>,
        ignorable: ErrorType,
    ) -> ErrorType {
        let mut errors = ErrorType::empty();
        if !self.type_info.allows(CellKinds::IMAGE) {
            errors |= ErrorType::IMAGE_CELLS_DISALLOWED;
        }
        if !rect.fits_in(self.size) {
            errors |= ErrorType::IMAGE_DOESNT_FIT;
        }
        let occupied = rect.coords().filter_map(|c| Some((c, self.cell(c)?))).any(
            |(c, cell)| match cell {
                Cell::Empty => false,
                Cell::Image(_) => Some(c) != exclude,
                Cell::Spanned { anchor } => Some(*anchor) != exclude,
                _ => true,
            },
        );
        if occupied {
            errors |= ErrorType::IMAGE_CELLS_ARENT_EMPTY;
        }
        errors.difference(ignorable)
    }

    /// Checks whether the clue `id` can take the properties `new`.
    ///
    /// Besides the placement violations, reports the solution letters that
    /// would be discarded because their cells stop being letters. Callers
    /// remove those explicitly before applying the change.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ClueNotFound`] if there is no such clue.
    pub fn can_change_clue_properties(
        &self,
        id: ClueId,
        new: &ClueProperties,
        ignorable: ErrorType,
    ) -> Result<ClueChangePreview, GridError> {
        let clue = self.clue(id).ok_or(GridError::ClueNotFound { id })?;
        let errors = self.can_insert_clue_excluding(new, Some(id), ignorable);

        let new_coords: Vec<Coord> = answer_coords(
            new.coord,
            new.orientation,
            new.offset,
            new.answer.chars().count(),
        )
        .flatten()
        .collect();
        let orphaned_solution_letters = clue
            .answer
            .iter()
            .filter(|c| !new_coords.contains(c))
            .filter_map(|&c| {
                let cell = self.cell(c)?;
                let index = cell.solution_index()?;
                let letter = cell.as_letter()?;
                letter
                    .owners
                    .iter()
                    .all(|owner| owner == id)
                    .then_some((c, index))
            })
            .collect();

        Ok(ClueChangePreview {
            errors,
            orphaned_solution_letters,
        })
    }
}
