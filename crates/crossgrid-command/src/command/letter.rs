use crossgrid_core::{Cell, CellKinds, Confidence, Coord};
use crossgrid_grid::{Grid, GridError, LetterState};

use crate::{
    CommandRejected, LogError,
    codec::{RecordReader, RecordWriter},
};

fn existing_letter(grid: &Grid, coord: Coord) -> Result<LetterState, CommandRejected> {
    grid.cell_at(coord)?;
    grid.letter_state(coord)
        .ok_or_else(|| GridError::NotALetter { coord }.into())
}

fn solution_index_free(grid: &Grid, index: u16, coord: Coord) -> Result<(), CommandRejected> {
    match grid.solution_letter_coord(index) {
        Some(used) if used != coord => {
            Err(GridError::SolutionIndexInUse { index, coord: used }.into())
        }
        _ => Ok(()),
    }
}

fn solution_index_at(grid: &Grid, coord: Coord) -> Result<u16, CommandRejected> {
    grid.cell_at(coord)?
        .solution_index()
        .ok_or_else(|| GridError::NotASolutionLetter { coord }.into())
}

/// Types or erases one letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCurrentLetter {
    /// The letter cell.
    pub coord: Coord,
    /// Letter before the edit.
    pub old: Option<char>,
    /// Letter after the edit, upper case.
    pub new: Option<char>,
}

impl SetCurrentLetter {
    pub(super) fn new(
        grid: &Grid,
        coord: Coord,
        new: Option<char>,
    ) -> Result<Self, CommandRejected> {
        let old = existing_letter(grid, coord)?.current;
        let new = new.map(|c| c.to_uppercase().next().unwrap_or(c));
        Ok(Self { coord, old, new })
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        existing_letter(grid, self.coord)?;
        match self.new {
            Some(letter) if !grid.type_info().letter_content.accepts(letter) => {
                Err(GridError::IllegalLetter { letter }.into())
            }
            _ => Ok(()),
        }
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.set_current_letter(self.coord, self.new).map(drop)
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.set_current_letter(self.coord, self.old).map(drop)
    }

    pub(super) fn merge(&mut self, next: &Self) -> bool {
        if self.coord != next.coord {
            return false;
        }
        self.new = next.new;
        true
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.coord(self.coord);
        w.opt_char(self.old);
        w.opt_char(self.new);
        Ok(())
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            coord: r.coord()?,
            old: r.opt_char()?,
            new: r.opt_char()?,
        })
    }
}

/// Changes the confidence mark of one letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetLetterConfidence {
    /// The letter cell.
    pub coord: Coord,
    /// Confidence before the edit.
    pub old: Confidence,
    /// Confidence after the edit.
    pub new: Confidence,
}

impl SetLetterConfidence {
    pub(super) fn new(
        grid: &Grid,
        coord: Coord,
        new: Confidence,
    ) -> Result<Self, CommandRejected> {
        let old = existing_letter(grid, coord)?.confidence;
        Ok(Self { coord, old, new })
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        existing_letter(grid, self.coord).map(drop)
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.set_letter_confidence(self.coord, self.new).map(drop)
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.set_letter_confidence(self.coord, self.old).map(drop)
    }

    pub(super) fn merge(&mut self, next: &Self) -> bool {
        if self.coord != next.coord {
            return false;
        }
        self.new = next.new;
        true
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.coord(self.coord);
        w.u8(self.old.tag());
        w.u8(self.new.tag());
        Ok(())
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            coord: r.coord()?,
            old: r.confidence()?,
            new: r.confidence()?,
        })
    }
}

/// Erases every typed letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearCurrentLetters {
    /// Previous state of every letter that had typed content.
    pub states: Vec<(Coord, LetterState)>,
}

impl ClearCurrentLetters {
    pub(super) fn new(grid: &Grid) -> Self {
        let states = grid
            .cells()
            .filter_map(|(coord, _)| Some((coord, grid.letter_state(coord)?)))
            .filter(|(_, state)| {
                state.current.is_some() || state.confidence != Confidence::default()
            })
            .collect();
        Self { states }
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.clear_current_letters();
        Ok(())
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.restore_letter_states(&self.states)
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.letter_states(&self.states)
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            states: r.letter_states()?,
        })
    }
}

/// A solution letter being added or removed, shared by `AddSolutionLetter`
/// and `RemoveSolutionLetter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolutionLetterChange {
    /// The letter cell.
    pub coord: Coord,
    /// Position in the solution word.
    pub index: u16,
}

impl SolutionLetterChange {
    pub(super) fn existing(grid: &Grid, coord: Coord) -> Result<Self, CommandRejected> {
        let index = solution_index_at(grid, coord)?;
        Ok(Self { coord, index })
    }

    pub(super) fn check_insert(&self, grid: &Grid) -> Result<(), CommandRejected> {
        if !grid.type_info().allows(CellKinds::SOLUTION_LETTER) {
            return Err(GridError::CellKindDisallowed {
                kind: "solution letter",
            }
            .into());
        }
        let coord = self.coord;
        match grid.cell_at(coord)? {
            Cell::Letter(_) => solution_index_free(grid, self.index, coord),
            Cell::SolutionLetter { .. } => Err(GridError::AlreadyASolutionLetter { coord }.into()),
            _ => Err(GridError::NotALetter { coord }.into()),
        }
    }

    pub(super) fn check_remove(&self, grid: &Grid) -> Result<(), CommandRejected> {
        if solution_index_at(grid, self.coord)? == self.index {
            Ok(())
        } else {
            Err(GridError::NotASolutionLetter { coord: self.coord }.into())
        }
    }

    pub(super) fn insert(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.add_solution_letter(self.coord, self.index)
    }

    pub(super) fn remove(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.remove_solution_letter(self.coord).map(drop)
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.coord(self.coord);
        w.u16(self.index);
        Ok(())
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            coord: r.coord()?,
            index: r.u16()?,
        })
    }
}

/// Renumbers a solution letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetSolutionLetterIndex {
    /// The solution letter cell.
    pub coord: Coord,
    /// Index before the change.
    pub old: u16,
    /// Index after the change.
    pub new: u16,
}

impl SetSolutionLetterIndex {
    pub(super) fn new(grid: &Grid, coord: Coord, new: u16) -> Result<Self, CommandRejected> {
        let old = solution_index_at(grid, coord)?;
        Ok(Self { coord, old, new })
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        if solution_index_at(grid, self.coord)? != self.old {
            return Err(GridError::NotASolutionLetter { coord: self.coord }.into());
        }
        solution_index_free(grid, self.new, self.coord)
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.set_solution_letter_index(self.coord, self.new).map(drop)
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.set_solution_letter_index(self.coord, self.old).map(drop)
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.coord(self.coord);
        w.u16(self.old);
        w.u16(self.new);
        Ok(())
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            coord: r.coord()?,
            old: r.u16()?,
            new: r.u16()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crossgrid_core::{AnswerOffset, CrosswordType, CrosswordTypeInfo, Orientation};
    use crossgrid_grid::testing::GridTester;

    use super::*;
    use crate::Command;

    const H: Orientation = Orientation::Horizontal;

    fn cat() -> GridTester {
        GridTester::free(4, 2).clue(0, 0, H, AnswerOffset::Right, "CAT")
    }

    #[test]
    fn test_set_current_letter_record_layout() {
        let tester = cat();
        let command =
            Command::set_current_letter(tester.grid(), Coord::new(1, 0), Some('c')).unwrap();
        let expected = [10, 1, 0, 0, 0, 0, 1, b'C', 0, 0, 0];
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_set_letter_confidence_record_layout() {
        let tester = cat();
        let command =
            Command::set_letter_confidence(tester.grid(), Coord::new(2, 0), Confidence::Unsure)
                .unwrap();
        let expected = [11, 2, 0, 0, 0, 0, 1];
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_clear_current_letters_record_layout() {
        let mut tester = cat();
        tester
            .grid_mut()
            .set_current_letter(Coord::new(1, 0), Some('c'))
            .unwrap();
        let command = Command::clear_current_letters(tester.grid());
        let expected: Vec<u8> = [
            &[12][..],
            &[1, 0],             // letter count
            &[1, 0, 0, 0],       // coord
            &[1, b'C', 0, 0, 0], // typed letter
            &[0, 0],             // confident, no index
        ]
        .concat();
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_solution_letter_record_layouts() {
        let add = Command::add_solution_letter(Coord::new(2, 0), 3);
        let expected = [14, 2, 0, 0, 0, 3, 0];
        assert_eq!(add.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), add);

        let tester = cat().solution_letter(2, 0, 3);
        let remove = Command::remove_solution_letter(tester.grid(), Coord::new(2, 0)).unwrap();
        let expected = [15, 2, 0, 0, 0, 3, 0];
        assert_eq!(remove.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), remove);
    }

    #[test]
    fn test_set_solution_letter_index_record_layout() {
        let tester = cat().solution_letter(1, 0, 0);
        let command =
            Command::set_solution_letter_index(tester.grid(), Coord::new(1, 0), 4).unwrap();
        let expected = [21, 1, 0, 0, 0, 0, 0, 4, 0];
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_typing_merges_per_cell() {
        let mut tester = cat();
        let mut first =
            Command::set_current_letter(tester.grid(), Coord::new(1, 0), Some('X')).unwrap();
        first.redo(tester.grid_mut()).unwrap();
        let second =
            Command::set_current_letter(tester.grid(), Coord::new(1, 0), Some('C')).unwrap();
        second.redo(tester.grid_mut()).unwrap();
        let elsewhere =
            Command::set_current_letter(tester.grid(), Coord::new(2, 0), Some('A')).unwrap();

        assert!(first.merge_with(&second));
        assert!(!first.merge_with(&elsewhere));
        first.undo(tester.grid_mut()).unwrap();
        assert_eq!(tester.grid().letter_state(Coord::new(1, 0)).unwrap().current, None);
    }

    #[test]
    fn test_typing_rejects_illegal_letters_and_non_letters() {
        let american = GridTester::new(4, 4, CrosswordTypeInfo::preset(CrosswordType::American))
            .clue(0, 0, H, AnswerOffset::OnClueCell, "CAT");
        let digit =
            Command::set_current_letter(american.grid(), Coord::new(0, 0), Some('7')).unwrap();
        let rejected = digit.check(american.grid()).unwrap_err();
        assert_eq!(rejected.reason, "letter '7' is not allowed in this crossword");

        assert!(Command::set_current_letter(american.grid(), Coord::new(3, 3), Some('A')).is_err());
        assert!(Command::set_current_letter(american.grid(), Coord::new(9, 9), Some('A')).is_err());
    }

    #[test]
    fn test_clear_letters_undo() {
        let mut tester = cat();
        let grid = tester.grid_mut();
        grid.set_current_letter(Coord::new(1, 0), Some('C')).unwrap();
        grid.set_letter_confidence(Coord::new(2, 0), Confidence::Unsure).unwrap();
        let before = grid.content_string();

        let command = Command::clear_current_letters(grid);
        let Command::ClearCurrentLetters(clear) = &command else {
            panic!("unexpected {command:?}");
        };
        assert_eq!(clear.states.len(), 2);
        command.redo(grid).unwrap();
        assert_eq!(grid.letter_state(Coord::new(1, 0)).unwrap().current, None);
        command.undo(grid).unwrap();
        assert_eq!(grid.content_string(), before);
    }

    #[test]
    fn test_solution_letter_pair() {
        let mut tester = cat();
        let add = Command::add_solution_letter(Coord::new(2, 0), 0);
        add.check(tester.grid()).unwrap();
        add.redo(tester.grid_mut()).unwrap();
        tester.assert_cell(2, 0, 'a');

        assert!(add.check(tester.grid()).is_err());
        let taken = Command::add_solution_letter(Coord::new(3, 0), 0);
        assert!(taken.check(tester.grid()).is_err());
        let not_letter = Command::add_solution_letter(Coord::new(0, 0), 1);
        assert!(not_letter.check(tester.grid()).is_err());

        let remove = Command::remove_solution_letter(tester.grid(), Coord::new(2, 0)).unwrap();
        assert_eq!(
            remove,
            Command::RemoveSolutionLetter(SolutionLetterChange {
                coord: Coord::new(2, 0),
                index: 0
            })
        );
        remove.redo(tester.grid_mut()).unwrap();
        tester.assert_cell(2, 0, 'A');
        remove.undo(tester.grid_mut()).unwrap();
        tester.assert_cell(2, 0, 'a');
        add.undo(tester.grid_mut()).unwrap();
        tester.assert_cell(2, 0, 'A');
    }

    #[test]
    fn test_solution_letters_disallowed_by_type() {
        let info = CrosswordTypeInfo::preset(CrosswordType::Free)
            .with_allowed_cells(CellKinds::all().difference(CellKinds::SOLUTION_LETTER));
        let tester = GridTester::new(4, 2, info).clue(0, 0, H, AnswerOffset::Right, "CAT");
        let add = Command::add_solution_letter(Coord::new(1, 0), 0);
        assert_eq!(
            add.check(tester.grid()).unwrap_err().reason,
            "solution letter cells are not allowed in this crossword type"
        );
    }

    #[test]
    fn test_renumber_solution_letter() {
        let mut tester = cat().solution_letter(1, 0, 0).solution_letter(2, 0, 1);
        let taken = Command::set_solution_letter_index(tester.grid(), Coord::new(1, 0), 1).unwrap();
        assert!(taken.check(tester.grid()).is_err());

        let renumber =
            Command::set_solution_letter_index(tester.grid(), Coord::new(1, 0), 5).unwrap();
        renumber.check(tester.grid()).unwrap();
        renumber.redo(tester.grid_mut()).unwrap();
        assert_eq!(tester.grid().solution_letter_coord(5), Some(Coord::new(1, 0)));
        renumber.undo(tester.grid_mut()).unwrap();
        assert_eq!(tester.grid().solution_letter_coord(0), Some(Coord::new(1, 0)));
    }
}
