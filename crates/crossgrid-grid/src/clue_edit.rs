use crossgrid_core::{Cell, ClueId, Coord, ErrorType, LetterCell};
use log::debug;

use crate::{
    Clue, ClueProperties, ClueSnapshot, Grid, GridError, GridEvent, LetterState,
    clue::answer_coords,
};

impl Grid {
    /// Inserts a new clue with an empty typed answer.
    ///
    /// Only violations in [`ErrorType::POLICY`] can be ignored; structural
    /// violations always reject the clue.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Placement`] if the placement check fails.
    pub fn insert_clue(
        &mut self,
        props: &ClueProperties,
        text: &str,
        ignorable: ErrorType,
    ) -> Result<ClueId, GridError> {
        let errors = self.can_insert_clue(props, ignorable & ErrorType::POLICY);
        if !errors.is_empty() {
            return Err(GridError::Placement { errors });
        }
        let id = self.place_clue(props, text.to_owned(), &[]);
        self.renumber();
        self.emit(GridEvent::CluesAdded(vec![id]));
        debug!("inserted {id} with answer {}", props.answer);
        Ok(id)
    }

    /// Recreates a clue removed by [`Grid::remove_clue`], including the typed
    /// state of letters that were removed with it.
    ///
    /// Policy violations are ignored so that a clue can always be put back
    /// after the crossword type changed.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Placement`] if the clue no longer fits, or
    /// [`GridError::SolutionIndexInUse`] if a solution index it carried was
    /// taken meanwhile.
    pub fn restore_clue(&mut self, snapshot: &ClueSnapshot) -> Result<(), GridError> {
        let props = &snapshot.properties;
        let errors = self.can_insert_clue(props, ErrorType::POLICY);
        if !errors.is_empty() {
            return Err(GridError::Placement { errors });
        }

        let coords = answer_coords(
            props.coord,
            props.orientation,
            props.offset,
            snapshot.letters.len(),
        );
        for (coord, state) in coords.zip(&snapshot.letters) {
            let (Some(coord), Some(index)) = (coord, state.solution_index) else {
                continue;
            };
            if !self.cell(coord).is_some_and(Cell::is_empty) {
                continue;
            }
            if let Some(used) = self.solution_letter_coord(index) {
                return Err(GridError::SolutionIndexInUse {
                    index,
                    coord: used,
                });
            }
        }

        let id = self.place_clue(props, snapshot.text.clone(), &snapshot.letters);
        self.renumber();
        self.emit(GridEvent::CluesAdded(vec![id]));
        debug!("restored {id}");
        Ok(())
    }

    /// Removes a clue and returns what is needed to restore it.
    ///
    /// Letters shared with a crossing clue stay; all other answer letters
    /// become empty.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ClueNotFound`] if there is no such clue.
    pub fn remove_clue(&mut self, id: ClueId) -> Result<ClueSnapshot, GridError> {
        let snapshot = self.clue_snapshot(id)?;
        self.emit(GridEvent::CluesAboutToBeRemoved(vec![id]));
        self.unplace_clue(id);
        self.renumber();
        debug!("removed {id}");
        Ok(snapshot)
    }

    /// Removes several clues at once, announced by a single
    /// [`GridEvent::CluesAboutToBeRemoved`].
    ///
    /// Snapshots are returned in the order of `ids`. Nothing is removed if
    /// one of the clues does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ClueNotFound`] for the first unknown clue.
    pub fn remove_clues(&mut self, ids: &[ClueId]) -> Result<Vec<ClueSnapshot>, GridError> {
        let snapshots = ids
            .iter()
            .map(|&id| self.clue_snapshot(id))
            .collect::<Result<Vec<_>, _>>()?;
        if ids.is_empty() {
            return Ok(snapshots);
        }
        self.emit(GridEvent::CluesAboutToBeRemoved(ids.to_vec()));
        for &id in ids {
            self.unplace_clue(id);
        }
        self.renumber();
        debug!("removed {} clues", ids.len());
        Ok(snapshots)
    }

    /// Moves, reorients or re-answers a clue in place.
    ///
    /// Typed state is kept for letters present in both the old and the new
    /// answer. The change is rejected if it would discard solution letters;
    /// callers remove those first.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ClueNotFound`], [`GridError::Placement`] or
    /// [`GridError::OrphanedSolutionLetters`].
    pub fn change_clue_properties(
        &mut self,
        id: ClueId,
        new: &ClueProperties,
        ignorable: ErrorType,
    ) -> Result<(), GridError> {
        let preview =
            self.can_change_clue_properties(id, new, ignorable & ErrorType::POLICY)?;
        if !preview.errors.is_empty() {
            return Err(GridError::Placement {
                errors: preview.errors,
            });
        }
        if !preview.orphaned_solution_letters.is_empty() {
            return Err(GridError::OrphanedSolutionLetters {
                count: preview.orphaned_solution_letters.len(),
            });
        }

        let new_id = new.id();
        let states = self
            .clue(id)
            .map(|clue| self.letter_states(&clue.answer))
            .unwrap_or_default();
        if new_id != id {
            self.emit(GridEvent::CluesAboutToBeRemoved(vec![id]));
        }
        let Some(old) = self.unplace_clue(id) else {
            return Err(GridError::ClueNotFound { id });
        };
        self.place_clue(new, old.text, &[]);
        let answer = self.clue(new_id).map(|c| c.answer.clone()).unwrap_or_default();
        for (coord, state) in states {
            if answer.contains(&coord) {
                self.apply_letter_state(coord, state, true);
            }
        }
        self.renumber();
        if new_id == id {
            self.emit(GridEvent::AnswerChanged(id));
        } else {
            self.emit(GridEvent::CluesAdded(vec![new_id]));
        }
        debug!("changed {id} to {new_id} with answer {}", new.answer);
        Ok(())
    }

    /// Replaces the text of a clue and returns the previous text.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ClueNotFound`] if there is no such clue.
    pub fn set_clue_text(
        &mut self,
        id: ClueId,
        text: impl Into<String>,
    ) -> Result<String, GridError> {
        let clue = self
            .clues
            .get_mut(&id)
            .ok_or(GridError::ClueNotFound { id })?;
        Ok(std::mem::replace(&mut clue.text, text.into()))
    }

    /// Writes an already validated clue into the cells and the clue table.
    ///
    /// `letters` holds typed state for newly created letters, in answer
    /// order; it may be shorter than the answer.
    fn place_clue(
        &mut self,
        props: &ClueProperties,
        text: String,
        letters: &[LetterState],
    ) -> ClueId {
        let id = props.id();
        let mut answer = Vec::new();
        let chars = props.answer_chars();
        let coords = answer_coords(props.coord, props.orientation, props.offset, chars.len());
        for (i, (coord, correct)) in coords.zip(chars).enumerate() {
            let Some(coord) = coord else { continue };
            let Some(cell) = self.cell_mut(coord) else {
                continue;
            };
            if let Some(letter) = cell.as_letter_mut() {
                letter.owners.set(id.orientation, Some(id));
            } else {
                *cell = Cell::Letter(LetterCell::new(correct, id));
                if let Some(&state) = letters.get(i) {
                    self.apply_letter_state(coord, state, true);
                }
            }
            answer.push(coord);
        }

        if !props.offset.is_hidden()
            && let Some(marker) = self.cell_mut(props.coord)
        {
            *marker = match &*marker {
                Cell::Clue { orientation } if *orientation != id.orientation => Cell::DoubleClue,
                _ => Cell::Clue {
                    orientation: id.orientation,
                },
            };
        }

        self.clues.insert(
            id,
            Clue {
                id,
                offset: props.offset,
                text,
                answer,
                number: None,
            },
        );
        id
    }

    /// Removes a clue from the cells and the clue table without events.
    pub(crate) fn unplace_clue(&mut self, id: ClueId) -> Option<Clue> {
        let clue = self.clues.remove(&id)?;
        for &coord in &clue.answer {
            let Some(cell) = self.cell_mut(coord) else {
                continue;
            };
            if let Some(letter) = cell.as_letter_mut() {
                letter.owners.set(id.orientation, None);
                if letter.owners.is_empty() {
                    *cell = Cell::Empty;
                }
            }
        }
        if let Some(marker) = clue.marker().and_then(|c| self.cell_mut(c)) {
            *marker = match &*marker {
                Cell::DoubleClue => Cell::Clue {
                    orientation: id.orientation.flipped(),
                },
                Cell::Clue { .. } => Cell::Empty,
                other => other.clone(),
            };
        }
        Some(clue)
    }

    /// Writes typed state into the letter at `coord`.
    ///
    /// With `with_solution`, the solution index is restored as well.
    pub(crate) fn apply_letter_state(
        &mut self,
        coord: Coord,
        state: LetterState,
        with_solution: bool,
    ) {
        let Some(cell) = self.cell_mut(coord) else {
            return;
        };
        let Some(letter) = cell.as_letter_mut() else {
            return;
        };
        letter.current = state.current;
        letter.confidence = state.confidence;
        if with_solution {
            let letter = letter.clone();
            *cell = match state.solution_index {
                Some(index) => Cell::SolutionLetter { letter, index },
                None => Cell::Letter(letter),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use crossgrid_core::{AnswerOffset, Confidence, Orientation};

    use super::*;
    use crate::testing::GridTester;

    const H: Orientation = Orientation::Horizontal;
    const V: Orientation = Orientation::Vertical;

    fn id(x: u16, y: u16, o: Orientation) -> ClueId {
        ClueId::new(Coord::new(x, y), o)
    }

    #[test]
    fn test_insert_and_cross() {
        GridTester::free(5, 5)
            .clue(2, 2, H, AnswerOffset::OnClueCell, "CAT")
            .clue(2, 2, V, AnswerOffset::OnClueCell, "COW")
            .assert_rows(
                "
                .....
                .....
                ..CAT
                ..O..
                ..W..
                ",
            )
            .assert_owners(2, 2, Some(id(2, 2, H)), Some(id(2, 2, V)))
            .assert_owners(3, 2, Some(id(2, 2, H)), None);
    }

    #[test]
    fn test_rejected_insert_leaves_grid_untouched() {
        let mut tester = GridTester::free(5, 5).clue(2, 2, H, AnswerOffset::OnClueCell, "CAT");
        let before = tester.grid().content_string();
        let xow = ClueProperties::new(Coord::new(2, 2), V, AnswerOffset::OnClueCell, "XOW");
        assert_eq!(
            tester.grid_mut().insert_clue(&xow, "", ErrorType::empty()),
            Err(GridError::Placement {
                errors: ErrorType::ANSWER_IS_ILLEGAL
            })
        );
        assert_eq!(tester.grid().content_string(), before);
    }

    #[test]
    fn test_structural_errors_are_never_ignorable() {
        let mut tester = GridTester::free(3, 3);
        let long = ClueProperties::new(Coord::new(0, 0), H, AnswerOffset::OnClueCell, "ABCD");
        assert!(
            tester
                .grid_mut()
                .insert_clue(&long, "", ErrorType::all())
                .is_err()
        );
    }

    #[test]
    fn test_markers_merge_and_split() {
        let mut tester = GridTester::free(4, 4)
            .clue(0, 0, H, AnswerOffset::Right, "ABC")
            .clue(0, 0, V, AnswerOffset::Bottom, "XYZ");
        tester.assert_cell(0, 0, '+');
        tester.grid_mut().remove_clue(id(0, 0, H)).unwrap();
        tester
            .assert_cell(0, 0, 'v')
            .assert_cell(1, 0, '.')
            .assert_cell(0, 1, 'X');
        tester.grid_mut().remove_clue(id(0, 0, V)).unwrap();
        tester.assert_cell(0, 0, '.').assert_cell(0, 1, '.');
    }

    #[test]
    fn test_remove_keeps_shared_letters_and_restores() {
        let mut tester = GridTester::free(5, 5)
            .clue(2, 2, H, AnswerOffset::OnClueCell, "CAT")
            .clue(2, 2, V, AnswerOffset::OnClueCell, "COW")
            .solution_letter(3, 2, 4);
        tester
            .grid_mut()
            .set_current_letter(Coord::new(4, 2), Some('t'))
            .unwrap();
        tester
            .grid_mut()
            .set_letter_confidence(Coord::new(4, 2), Confidence::Unsure)
            .unwrap();
        let before = tester.grid().content_string();

        let snapshot = tester.grid_mut().remove_clue(id(2, 2, H)).unwrap();
        assert_eq!(snapshot.text, "");
        assert_eq!(snapshot.properties.answer(), "CAT");
        tester
            .assert_cell(2, 2, 'C')
            .assert_cell(3, 2, '.')
            .assert_owners(2, 2, None, Some(id(2, 2, V)));
        assert_eq!(tester.grid().solution_word(), "");

        tester.grid_mut().restore_clue(&snapshot).unwrap();
        assert_eq!(tester.grid().content_string(), before);
    }

    #[test]
    fn test_remove_clues_announces_one_batch() {
        let mut tester = GridTester::free(5, 5)
            .clue(0, 0, H, AnswerOffset::Right, "CAT")
            .clue(0, 2, H, AnswerOffset::Right, "DOG")
            .clue(4, 0, V, AnswerOffset::Bottom, "EMU");
        tester.grid_mut().drain_events();

        let ids = [id(0, 0, H), id(4, 0, V)];
        let removed = tester.grid_mut().remove_clues(&ids).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].properties.answer(), "CAT");
        assert_eq!(removed[1].properties.answer(), "EMU");
        assert_eq!(
            tester.grid_mut().drain_events(),
            vec![GridEvent::CluesAboutToBeRemoved(ids.to_vec())]
        );
        assert_eq!(tester.grid().clue_count(), 1);
        assert!(tester.grid().clue(id(0, 2, H)).is_some());
    }

    #[test]
    fn test_remove_clues_is_all_or_nothing() {
        let mut tester = GridTester::free(4, 4).clue(0, 0, H, AnswerOffset::Right, "CAT");
        tester.grid_mut().drain_events();
        let before = tester.grid().content_string();
        assert_eq!(
            tester.grid_mut().remove_clues(&[id(0, 0, H), id(1, 1, V)]),
            Err(GridError::ClueNotFound { id: id(1, 1, V) })
        );
        assert_eq!(tester.grid().content_string(), before);
        assert!(tester.grid_mut().drain_events().is_empty());
    }

    #[test]
    fn test_remove_events() {
        let mut tester = GridTester::free(4, 4).clue(0, 0, H, AnswerOffset::OnClueCell, "AB");
        tester.grid_mut().drain_events();
        tester.grid_mut().remove_clue(id(0, 0, H)).unwrap();
        assert_eq!(
            tester.grid_mut().drain_events(),
            vec![GridEvent::CluesAboutToBeRemoved(vec![id(0, 0, H)])]
        );
        assert_eq!(
            tester.grid_mut().remove_clue(id(0, 0, H)),
            Err(GridError::ClueNotFound { id: id(0, 0, H) })
        );
    }

    #[test]
    fn test_change_properties_keeps_typed_letters() {
        let mut tester = GridTester::free(6, 3).clue(0, 0, H, AnswerOffset::OnClueCell, "CAT");
        tester
            .grid_mut()
            .set_current_letter(Coord::new(1, 0), Some('A'))
            .unwrap();
        tester.grid_mut().drain_events();

        let cats = ClueProperties::new(Coord::new(0, 0), H, AnswerOffset::OnClueCell, "CATS");
        tester
            .grid_mut()
            .change_clue_properties(id(0, 0, H), &cats, ErrorType::empty())
            .unwrap();
        tester.assert_rows(
            "
            CATS..
            ......
            ......
            ",
        );
        assert_eq!(
            tester.grid().letter_state(Coord::new(1, 0)).unwrap().current,
            Some('A')
        );
        assert_eq!(
            tester.grid_mut().drain_events(),
            vec![GridEvent::AnswerChanged(id(0, 0, H))]
        );
    }

    #[test]
    fn test_change_properties_moves_clue() {
        let mut tester = GridTester::free(5, 5).clue(0, 0, H, AnswerOffset::Right, "AB");
        tester.grid_mut().set_clue_text(id(0, 0, H), "hint").unwrap();
        let moved = ClueProperties::new(Coord::new(0, 2), H, AnswerOffset::Right, "AB");
        tester
            .grid_mut()
            .change_clue_properties(id(0, 0, H), &moved, ErrorType::empty())
            .unwrap();
        tester
            .assert_cell(0, 0, '.')
            .assert_cell(0, 2, '>')
            .assert_cell(1, 2, 'A');
        assert_eq!(tester.grid().clue(id(0, 2, H)).unwrap().text(), "hint");
        assert!(tester.grid().clue(id(0, 0, H)).is_none());
    }

    #[test]
    fn test_change_properties_rejects_orphans() {
        let mut tester = GridTester::free(5, 5)
            .clue(0, 0, H, AnswerOffset::OnClueCell, "ABC")
            .solution_letter(2, 0, 1);
        let shorter = ClueProperties::new(Coord::new(0, 0), H, AnswerOffset::OnClueCell, "AB");
        assert_eq!(
            tester
                .grid_mut()
                .change_clue_properties(id(0, 0, H), &shorter, ErrorType::empty()),
            Err(GridError::OrphanedSolutionLetters { count: 1 })
        );
    }

    #[test]
    fn test_restore_rejects_taken_solution_index() {
        let mut tester = GridTester::free(5, 5)
            .clue(0, 0, H, AnswerOffset::OnClueCell, "ABC")
            .clue(0, 2, H, AnswerOffset::OnClueCell, "XYZ")
            .solution_letter(1, 0, 1);
        let snapshot = tester.grid_mut().remove_clue(id(0, 0, H)).unwrap();
        tester
            .grid_mut()
            .add_solution_letter(Coord::new(1, 2), 1)
            .unwrap();
        assert_eq!(
            tester.grid_mut().restore_clue(&snapshot),
            Err(GridError::SolutionIndexInUse {
                index: 1,
                coord: Coord::new(1, 2)
            })
        );
        tester.assert_cell(0, 0, '.');
    }
}
