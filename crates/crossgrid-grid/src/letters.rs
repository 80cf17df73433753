//! Typed letters and the solution word.

use std::collections::BTreeSet;

use crossgrid_core::{Cell, CellKinds, ClueId, Confidence, Coord};
use log::{debug, trace};

use crate::{Grid, GridError, GridEvent, LetterState};

impl Grid {
    fn letter_mut(&mut self, coord: Coord) -> Result<&mut Cell, GridError> {
        let cell = self
            .cell_mut(coord)
            .ok_or(GridError::OutOfBounds { coord })?;
        if cell.is_any_letter() {
            Ok(cell)
        } else {
            Err(GridError::NotALetter { coord })
        }
    }

    fn emit_answer_changed(&mut self, clues: impl IntoIterator<Item = ClueId>) {
        let clues: BTreeSet<ClueId> = clues.into_iter().collect();
        for id in clues {
            self.emit(GridEvent::AnswerChanged(id));
        }
    }

    fn owners_of(&self, coord: Coord) -> Vec<ClueId> {
        self.cell(coord)
            .and_then(Cell::as_letter)
            .map(|letter| letter.owners.iter().collect())
            .unwrap_or_default()
    }

    /// Types a letter, or clears it with `None`. Returns the previous letter.
    ///
    /// Letters are stored in upper case.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotALetter`] for non-letter cells and
    /// [`GridError::IllegalLetter`] if the crossword type does not accept
    /// the character.
    pub fn set_current_letter(
        &mut self,
        coord: Coord,
        letter: Option<char>,
    ) -> Result<Option<char>, GridError> {
        let letter = letter.map(|c| c.to_uppercase().next().unwrap_or(c));
        if let Some(c) = letter
            && !self.type_info.letter_content.accepts(c)
        {
            return Err(GridError::IllegalLetter { letter: c });
        }
        let cell = self.letter_mut(coord)?;
        let Some(data) = cell.as_letter_mut() else {
            return Err(GridError::NotALetter { coord });
        };
        let previous = std::mem::replace(&mut data.current, letter);
        if previous != letter {
            trace!("typed {letter:?} at {coord}");
            let owners = self.owners_of(coord);
            self.emit_answer_changed(owners);
        }
        Ok(previous)
    }

    /// Sets the confidence of a typed letter and returns the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotALetter`] for non-letter cells.
    pub fn set_letter_confidence(
        &mut self,
        coord: Coord,
        confidence: Confidence,
    ) -> Result<Confidence, GridError> {
        let cell = self.letter_mut(coord)?;
        let Some(data) = cell.as_letter_mut() else {
            return Err(GridError::NotALetter { coord });
        };
        Ok(std::mem::replace(&mut data.confidence, confidence))
    }

    /// Clears every typed letter and confidence mark.
    ///
    /// Returns the previous state of every letter that changed.
    pub fn clear_current_letters(&mut self) -> Vec<(Coord, LetterState)> {
        let changed: Vec<(Coord, LetterState)> = self
            .cells()
            .filter(|(_, cell)| {
                cell.as_letter().is_some_and(|letter| {
                    letter.current.is_some() || letter.confidence != Confidence::default()
                })
            })
            .filter_map(|(coord, _)| Some((coord, self.letter_state(coord)?)))
            .collect();
        let mut owners = Vec::new();
        for &(coord, _) in &changed {
            if let Some(letter) = self.cell_mut(coord).and_then(Cell::as_letter_mut) {
                letter.current = None;
                letter.confidence = Confidence::default();
                owners.extend(letter.owners.iter());
            }
        }
        self.emit_answer_changed(owners);
        debug!("cleared {} typed letters", changed.len());
        changed
    }

    /// Fills in the correct answer of a clue and marks it solved.
    ///
    /// Returns the previous state of the answer letters.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ClueNotFound`] if there is no such clue.
    pub fn reveal_answer(&mut self, id: ClueId) -> Result<Vec<(Coord, LetterState)>, GridError> {
        let answer = self
            .clue(id)
            .ok_or(GridError::ClueNotFound { id })?
            .answer
            .clone();
        let previous = self.letter_states(&answer);
        let mut owners = vec![id];
        for &coord in &answer {
            if let Some(letter) = self.cell_mut(coord).and_then(Cell::as_letter_mut) {
                letter.current = Some(letter.correct);
                letter.confidence = Confidence::Solved;
                owners.extend(letter.owners.iter());
            }
        }
        self.emit_answer_changed(owners);
        Ok(previous)
    }

    /// Writes back typed letters and confidences captured earlier.
    ///
    /// Solution indices in `states` are ignored. Either all states are
    /// applied or none.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotALetter`] if any coordinate no longer holds a
    /// letter.
    pub fn restore_letter_states(
        &mut self,
        states: &[(Coord, LetterState)],
    ) -> Result<(), GridError> {
        for &(coord, _) in states {
            if !self.cell(coord).is_some_and(Cell::is_any_letter) {
                return Err(GridError::NotALetter { coord });
            }
        }
        let mut owners = Vec::new();
        for &(coord, state) in states {
            self.apply_letter_state(coord, state, false);
            owners.extend(self.owners_of(coord));
        }
        self.emit_answer_changed(owners);
        Ok(())
    }

    /// Returns the cell using solution word index `index`.
    #[must_use]
    pub fn solution_letter_coord(&self, index: u16) -> Option<Coord> {
        self.cells()
            .find(|(_, cell)| cell.solution_index() == Some(index))
            .map(|(coord, _)| coord)
    }

    /// Returns all solution letters ordered by index.
    #[must_use]
    pub fn solution_letters(&self) -> Vec<(u16, Coord)> {
        let mut letters: Vec<(u16, Coord)> = self
            .cells()
            .filter_map(|(coord, cell)| Some((cell.solution_index()?, coord)))
            .collect();
        letters.sort_unstable();
        letters
    }

    /// Returns the correct solution word.
    #[must_use]
    pub fn solution_word(&self) -> String {
        self.solution_letters()
            .into_iter()
            .filter_map(|(_, coord)| Some(self.cell(coord)?.as_letter()?.correct))
            .collect()
    }

    fn check_solution_index(&self, index: u16, coord: Coord) -> Result<(), GridError> {
        match self.solution_letter_coord(index) {
            Some(used) if used != coord => {
                Err(GridError::SolutionIndexInUse { index, coord: used })
            }
            _ => Ok(()),
        }
    }

    /// Makes a letter part of the solution word.
    ///
    /// # Errors
    ///
    /// Fails if the crossword type has no solution letters, the cell is not a
    /// plain letter, or `index` is taken.
    pub fn add_solution_letter(&mut self, coord: Coord, index: u16) -> Result<(), GridError> {
        if !self.type_info.allows(CellKinds::SOLUTION_LETTER) {
            return Err(GridError::CellKindDisallowed {
                kind: "solution letter",
            });
        }
        self.check_solution_index(index, coord)?;
        let cell = self.letter_mut(coord)?;
        let Cell::Letter(letter) = cell else {
            return Err(GridError::AlreadyASolutionLetter { coord });
        };
        let letter = letter.clone();
        *cell = Cell::SolutionLetter { letter, index };
        debug!("solution letter {index} at {coord}");
        Ok(())
    }

    /// Turns a solution letter back into a plain letter and returns its
    /// index.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NotASolutionLetter`] if the cell is not a
    /// solution letter.
    pub fn remove_solution_letter(&mut self, coord: Coord) -> Result<u16, GridError> {
        let cell = self
            .cell_mut(coord)
            .ok_or(GridError::OutOfBounds { coord })?;
        let Cell::SolutionLetter { letter, index } = cell else {
            return Err(GridError::NotASolutionLetter { coord });
        };
        let index = *index;
        *cell = Cell::Letter(letter.clone());
        Ok(index)
    }

    /// Renumbers a solution letter and returns the previous index.
    ///
    /// # Errors
    ///
    /// Fails if the cell is not a solution letter or `index` is taken.
    pub fn set_solution_letter_index(
        &mut self,
        coord: Coord,
        index: u16,
    ) -> Result<u16, GridError> {
        self.check_solution_index(index, coord)?;
        let cell = self
            .cell_mut(coord)
            .ok_or(GridError::OutOfBounds { coord })?;
        let Cell::SolutionLetter { index: slot, .. } = cell else {
            return Err(GridError::NotASolutionLetter { coord });
        };
        Ok(std::mem::replace(slot, index))
    }
}
