use crossgrid_core::{ClueId, Coord, ErrorType};
use crossgrid_grid::{ClueProperties, ClueSnapshot, Grid, GridError, LetterState};

use super::{
    ChildBuilder, Command, check_with_children, read_children, redo_with_children,
    undo_with_children, write_children,
};
use crate::{
    CommandRejected, LogError,
    codec::{RecordReader, RecordWriter},
};

fn existing_clue(grid: &Grid, id: ClueId) -> Result<(), CommandRejected> {
    grid.clue(id)
        .map(drop)
        .ok_or_else(|| GridError::ClueNotFound { id }.into())
}

/// A clue being added or removed, shared by `AddClue` and `RemoveClue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueChange {
    /// The clue content.
    pub snapshot: ClueSnapshot,
    /// Policy violations accepted on insertion.
    pub ignorable: ErrorType,
}

impl ClueChange {
    pub(super) fn added(properties: ClueProperties, text: String, ignorable: ErrorType) -> Self {
        let letters = vec![LetterState::default(); properties.answer().chars().count()];
        Self {
            snapshot: ClueSnapshot {
                properties,
                text,
                letters,
            },
            ignorable: ignorable & ErrorType::POLICY,
        }
    }

    pub(super) fn removed(grid: &Grid, id: ClueId) -> Result<Self, CommandRejected> {
        Ok(Self {
            snapshot: grid.clue_snapshot(id)?,
            ignorable: ErrorType::POLICY,
        })
    }

    pub(super) fn check_insert(&self, grid: &Grid) -> Result<(), CommandRejected> {
        let errors = grid.can_insert_clue(&self.snapshot.properties, self.ignorable);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CommandRejected::placement(errors))
        }
    }

    pub(super) fn check_remove(&self, grid: &Grid) -> Result<(), CommandRejected> {
        existing_clue(grid, self.snapshot.id())
    }

    pub(super) fn insert(&self, grid: &mut Grid) -> Result<(), GridError> {
        let props = &self.snapshot.properties;
        grid.insert_clue(props, &self.snapshot.text, self.ignorable)
            .map(drop)
    }

    pub(super) fn remove(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.remove_clue(self.snapshot.id()).map(drop)
    }

    pub(super) fn restore(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.restore_clue(&self.snapshot)
    }

    pub(super) fn write_added(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.snapshot(&self.snapshot)?;
        w.u16(self.ignorable.bits());
        Ok(())
    }

    pub(super) fn write_removed(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.snapshot(&self.snapshot)
    }

    pub(super) fn read_added(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        let snapshot = r.snapshot()?;
        let ignorable = r.error_type()? & ErrorType::POLICY;
        Ok(Self {
            snapshot,
            ignorable,
        })
    }

    pub(super) fn read_removed(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            snapshot: r.snapshot()?,
            ignorable: ErrorType::POLICY,
        })
    }
}

/// Changes the placement or answer of a clue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeClueProperties {
    /// Removals of solution letters the change would discard.
    pub children: Vec<Command>,
    /// The clue before the change.
    pub id: ClueId,
    /// Properties before the change.
    pub old: ClueProperties,
    /// Properties after the change.
    pub new: ClueProperties,
    /// Typed state of the old answer letters.
    pub old_states: Vec<(Coord, LetterState)>,
}

impl ChangeClueProperties {
    pub(super) fn new(
        grid: &Grid,
        id: ClueId,
        new: ClueProperties,
        ignorable: ErrorType,
    ) -> Result<Self, CommandRejected> {
        let snapshot = grid.clue_snapshot(id)?;
        let preview = grid.can_change_clue_properties(id, &new, ignorable & ErrorType::POLICY)?;
        if !preview.errors.is_empty() {
            return Err(CommandRejected::placement(preview.errors));
        }
        let mut builder = ChildBuilder::new(grid);
        for &(coord, _) in &preview.orphaned_solution_letters {
            builder.push(|g| Command::remove_solution_letter(g, coord))?;
        }
        let old_states = grid
            .clue(id)
            .map(|clue| grid.letter_states(clue.answer()))
            .unwrap_or_default();
        Ok(Self {
            children: builder.finish(),
            id,
            old: snapshot.properties,
            new,
            old_states,
        })
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        check_with_children(&self.children, grid, |grid| {
            let preview = grid.can_change_clue_properties(self.id, &self.new, ErrorType::POLICY)?;
            if !preview.errors.is_empty() {
                return Err(CommandRejected::placement(preview.errors));
            }
            if !preview.orphaned_solution_letters.is_empty() {
                return Err(GridError::OrphanedSolutionLetters {
                    count: preview.orphaned_solution_letters.len(),
                }
                .into());
            }
            Ok(())
        })
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        redo_with_children(&self.children, grid, |grid| {
            grid.change_clue_properties(self.id, &self.new, ErrorType::POLICY)
        })
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        undo_with_children(&self.children, grid, |grid| {
            grid.change_clue_properties(self.new.id(), &self.old, ErrorType::POLICY)?;
            grid.restore_letter_states(&self.old_states)
        })
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        write_children(w, &self.children)?;
        w.clue_id(self.id);
        w.properties(&self.old)?;
        w.properties(&self.new)?;
        w.letter_states(&self.old_states)
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            children: read_children(r)?,
            id: r.clue_id()?,
            old: r.properties()?,
            new: r.properties()?,
            old_states: r.letter_states()?,
        })
    }
}

/// Replaces the text of a clue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetClueText {
    /// The edited clue.
    pub id: ClueId,
    /// Text before the edit.
    pub old: String,
    /// Text after the edit.
    pub new: String,
}

impl SetClueText {
    pub(super) fn new(grid: &Grid, id: ClueId, new: String) -> Result<Self, CommandRejected> {
        let clue = grid.clue(id).ok_or(GridError::ClueNotFound { id })?;
        Ok(Self {
            id,
            old: clue.text().to_owned(),
            new,
        })
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        existing_clue(grid, self.id)
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.set_clue_text(self.id, self.new.as_str()).map(drop)
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.set_clue_text(self.id, self.old.as_str()).map(drop)
    }

    pub(super) fn merge(&mut self, next: &Self) -> bool {
        if self.id != next.id {
            return false;
        }
        self.new.clone_from(&next.new);
        true
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.clue_id(self.id);
        w.text(&self.old)?;
        w.text(&self.new)
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            id: r.clue_id()?,
            old: r.text()?,
            new: r.text()?,
        })
    }
}

/// Moves a clue to another coordinate, carrying its typed letters along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveClue {
    /// Removals of solution letters the move would discard.
    pub children: Vec<Command>,
    /// The clue before the move.
    pub id: ClueId,
    /// The clue coordinate after the move.
    pub coord: Coord,
}

impl MoveClue {
    pub(super) fn new(grid: &Grid, id: ClueId, coord: Coord) -> Result<Self, CommandRejected> {
        let target = grid.clue_snapshot(id)?.properties.at(coord);
        let preview = grid.can_change_clue_properties(id, &target, ErrorType::POLICY)?;
        if !preview.errors.is_empty() {
            return Err(CommandRejected::placement(preview.errors));
        }
        let mut builder = ChildBuilder::new(grid);
        for &(letter, _) in &preview.orphaned_solution_letters {
            builder.push(|g| Command::remove_solution_letter(g, letter))?;
        }
        Ok(Self {
            children: builder.finish(),
            id,
            coord,
        })
    }

    fn moved_id(&self) -> ClueId {
        ClueId::new(self.coord, self.id.orientation)
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        check_with_children(&self.children, grid, |grid| {
            let target = grid.clue_snapshot(self.id)?.properties.at(self.coord);
            let preview = grid.can_change_clue_properties(self.id, &target, ErrorType::POLICY)?;
            if !preview.errors.is_empty() {
                return Err(CommandRejected::placement(preview.errors));
            }
            if !preview.orphaned_solution_letters.is_empty() {
                return Err(GridError::OrphanedSolutionLetters {
                    count: preview.orphaned_solution_letters.len(),
                }
                .into());
            }
            Ok(())
        })
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        redo_with_children(&self.children, grid, |grid| {
            shift_clue(grid, self.id, self.coord)
        })
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        undo_with_children(&self.children, grid, |grid| {
            shift_clue(grid, self.moved_id(), self.id.coord)
        })
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        write_children(w, &self.children)?;
        w.clue_id(self.id);
        w.coord(self.coord);
        Ok(())
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            children: read_children(r)?,
            id: r.clue_id()?,
            coord: r.coord()?,
        })
    }
}

/// Moves clue `from` to `to`, then types its old letters into the new answer
/// in answer order.
fn shift_clue(grid: &mut Grid, from: ClueId, to: Coord) -> Result<(), GridError> {
    let snapshot = grid.clue_snapshot(from)?;
    let props = snapshot.properties.at(to);
    grid.change_clue_properties(from, &props, ErrorType::POLICY)?;
    let id = props.id();
    let answer = grid
        .clue(id)
        .ok_or(GridError::ClueNotFound { id })?
        .answer()
        .to_vec();
    let states: Vec<(Coord, LetterState)> = answer.into_iter().zip(snapshot.letters).collect();
    grid.restore_letter_states(&states)
}

/// Fills in the correct answer of a clue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealAnswer {
    /// The revealed clue.
    pub id: ClueId,
    /// Typed state of its letters before the reveal.
    pub states: Vec<(Coord, LetterState)>,
}

impl RevealAnswer {
    pub(super) fn new(grid: &Grid, id: ClueId) -> Result<Self, CommandRejected> {
        let clue = grid.clue(id).ok_or(GridError::ClueNotFound { id })?;
        Ok(Self {
            id,
            states: grid.letter_states(clue.answer()),
        })
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        existing_clue(grid, self.id)
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.reveal_answer(self.id).map(drop)
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.restore_letter_states(&self.states)
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.clue_id(self.id);
        w.letter_states(&self.states)
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            id: r.clue_id()?,
            states: r.letter_states()?,
        })
    }
}
