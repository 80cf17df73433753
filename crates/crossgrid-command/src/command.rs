//! Invertible edit commands.
//!
//! A [`Command`] is plain data describing one change. Constructing it never
//! touches the grid; only [`CommandStack`](crate::CommandStack) applies it.
//! Constructors that need to know the current content (old values, content
//! a resize would remove) take the grid by shared reference.
//!
//! Some kinds carry *children*: commands that must run before the command
//! itself, such as removing the clues a resize would cut off. Children run
//! first on redo and last, in reverse order, on undo.

use crossgrid_core::{Anchor, ClueId, Confidence, Coord, CrosswordTypeInfo, ErrorType, Size};
use crossgrid_grid::{ClueProperties, Grid, GridError, Property};
use log::warn;

pub use self::{
    clue::{ChangeClueProperties, ClueChange, MoveClue, RevealAnswer, SetClueText},
    image::{ChangeImageGeometry, ImageChange, SetImageUrl},
    layout::{Compound, MoveGrid, ResizeGrid, SetCrosswordType, SetProperty},
    letter::{
        ClearCurrentLetters, SetCurrentLetter, SetLetterConfidence, SetSolutionLetterIndex,
        SolutionLetterChange,
    },
};
use crate::{
    CommandRejected, LogError,
    codec::{RecordReader, RecordWriter},
};

mod clue;
mod image;
mod layout;
mod letter;

/// The kind of a command, which is also its tag in the binary log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[repr(u8)]
pub enum CommandKind {
    /// A labelled group of commands.
    #[display("Group")]
    Compound = 1,
    /// Insert a clue.
    #[display("Add clue")]
    AddClue = 2,
    /// Remove a clue.
    #[display("Remove clue")]
    RemoveClue = 3,
    /// Move, reorient or re-answer a clue.
    #[display("Change clue")]
    ChangeClueProperties = 4,
    /// Edit the text of a clue.
    #[display("Edit clue text")]
    SetClueText = 5,
    /// Insert an image.
    #[display("Add image")]
    AddImage = 6,
    /// Remove an image.
    #[display("Remove image")]
    RemoveImage = 7,
    /// Move or resize an image.
    #[display("Move image")]
    ChangeImageGeometry = 8,
    /// Change the content location of an image.
    #[display("Change image")]
    SetImageUrl = 9,
    /// Type or erase a letter.
    #[display("Type letter")]
    SetCurrentLetter = 10,
    /// Change the confidence of a typed letter.
    #[display("Change confidence")]
    SetLetterConfidence = 11,
    /// Erase every typed letter.
    #[display("Clear answers")]
    ClearCurrentLetters = 12,
    /// Fill in the correct answer of a clue.
    #[display("Reveal answer")]
    RevealAnswer = 13,
    /// Make a letter part of the solution word.
    #[display("Add solution letter")]
    AddSolutionLetter = 14,
    /// Remove a letter from the solution word.
    #[display("Remove solution letter")]
    RemoveSolutionLetter = 15,
    /// Change the grid size.
    #[display("Resize grid")]
    ResizeGrid = 16,
    /// Move all content.
    #[display("Move grid")]
    MoveGrid = 17,
    /// Change the crossword type.
    #[display("Change crossword type")]
    SetCrosswordType = 18,
    /// Change a metadata field.
    #[display("Change property")]
    SetProperty = 19,
    /// Move a clue to another coordinate.
    #[display("Move clue")]
    MoveClue = 20,
    /// Change the solution word index of a letter.
    #[display("Renumber solution letter")]
    SetSolutionLetterIndex = 21,
}

type Decoder = fn(&mut RecordReader<'_>) -> Result<Command, LogError>;

/// Record decoders, indexed by tag minus one.
static DECODERS: [(CommandKind, Decoder); 21] = [
    (CommandKind::Compound, |r| Ok(Command::Compound(Compound::read(r)?))),
    (CommandKind::AddClue, |r| Ok(Command::AddClue(ClueChange::read_added(r)?))),
    (CommandKind::RemoveClue, |r| Ok(Command::RemoveClue(ClueChange::read_removed(r)?))),
    (CommandKind::ChangeClueProperties, |r| {
        Ok(Command::ChangeClueProperties(ChangeClueProperties::read(r)?))
    }),
    (CommandKind::SetClueText, |r| Ok(Command::SetClueText(SetClueText::read(r)?))),
    (CommandKind::AddImage, |r| Ok(Command::AddImage(ImageChange::read(r)?))),
    (CommandKind::RemoveImage, |r| Ok(Command::RemoveImage(ImageChange::read(r)?))),
    (CommandKind::ChangeImageGeometry, |r| {
        Ok(Command::ChangeImageGeometry(ChangeImageGeometry::read(r)?))
    }),
    (CommandKind::SetImageUrl, |r| Ok(Command::SetImageUrl(SetImageUrl::read(r)?))),
    (CommandKind::SetCurrentLetter, |r| {
        Ok(Command::SetCurrentLetter(SetCurrentLetter::read(r)?))
    }),
    (CommandKind::SetLetterConfidence, |r| {
        Ok(Command::SetLetterConfidence(SetLetterConfidence::read(r)?))
    }),
    (CommandKind::ClearCurrentLetters, |r| {
        Ok(Command::ClearCurrentLetters(ClearCurrentLetters::read(r)?))
    }),
    (CommandKind::RevealAnswer, |r| Ok(Command::RevealAnswer(RevealAnswer::read(r)?))),
    (CommandKind::AddSolutionLetter, |r| {
        Ok(Command::AddSolutionLetter(SolutionLetterChange::read(r)?))
    }),
    (CommandKind::RemoveSolutionLetter, |r| {
        Ok(Command::RemoveSolutionLetter(SolutionLetterChange::read(r)?))
    }),
    (CommandKind::ResizeGrid, |r| Ok(Command::ResizeGrid(ResizeGrid::read(r)?))),
    (CommandKind::MoveGrid, |r| Ok(Command::MoveGrid(MoveGrid::read(r)?))),
    (CommandKind::SetCrosswordType, |r| {
        Ok(Command::SetCrosswordType(SetCrosswordType::read(r)?))
    }),
    (CommandKind::SetProperty, |r| Ok(Command::SetProperty(SetProperty::read(r)?))),
    (CommandKind::MoveClue, |r| Ok(Command::MoveClue(MoveClue::read(r)?))),
    (CommandKind::SetSolutionLetterIndex, |r| {
        Ok(Command::SetSolutionLetterIndex(SetSolutionLetterIndex::read(r)?))
    }),
];

impl CommandKind {
    /// Returns the log tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parses a log tag.
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        let index = usize::from(tag.checked_sub(1)?);
        DECODERS.get(index).map(|&(kind, _)| kind)
    }

    fn decoder(tag: u8) -> Option<Decoder> {
        let index = usize::from(tag.checked_sub(1)?);
        DECODERS.get(index).map(|&(_, decode)| decode)
    }
}

/// One invertible edit.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum Command {
    /// See [`CommandKind::Compound`].
    Compound(Compound),
    /// See [`CommandKind::AddClue`].
    AddClue(ClueChange),
    /// See [`CommandKind::RemoveClue`].
    RemoveClue(ClueChange),
    /// See [`CommandKind::ChangeClueProperties`].
    ChangeClueProperties(ChangeClueProperties),
    /// See [`CommandKind::SetClueText`].
    SetClueText(SetClueText),
    /// See [`CommandKind::AddImage`].
    AddImage(ImageChange),
    /// See [`CommandKind::RemoveImage`].
    RemoveImage(ImageChange),
    /// See [`CommandKind::ChangeImageGeometry`].
    ChangeImageGeometry(ChangeImageGeometry),
    /// See [`CommandKind::SetImageUrl`].
    SetImageUrl(SetImageUrl),
    /// See [`CommandKind::SetCurrentLetter`].
    SetCurrentLetter(SetCurrentLetter),
    /// See [`CommandKind::SetLetterConfidence`].
    SetLetterConfidence(SetLetterConfidence),
    /// See [`CommandKind::ClearCurrentLetters`].
    ClearCurrentLetters(ClearCurrentLetters),
    /// See [`CommandKind::RevealAnswer`].
    RevealAnswer(RevealAnswer),
    /// See [`CommandKind::AddSolutionLetter`].
    AddSolutionLetter(SolutionLetterChange),
    /// See [`CommandKind::RemoveSolutionLetter`].
    RemoveSolutionLetter(SolutionLetterChange),
    /// See [`CommandKind::ResizeGrid`].
    ResizeGrid(ResizeGrid),
    /// See [`CommandKind::MoveGrid`].
    MoveGrid(MoveGrid),
    /// See [`CommandKind::SetCrosswordType`].
    SetCrosswordType(SetCrosswordType),
    /// See [`CommandKind::SetProperty`].
    SetProperty(SetProperty),
    /// See [`CommandKind::MoveClue`].
    MoveClue(MoveClue),
    /// See [`CommandKind::SetSolutionLetterIndex`].
    SetSolutionLetterIndex(SetSolutionLetterIndex),
}

// Constructors.
impl Command {
    /// Groups `children` under one undo step labelled `label`.
    #[must_use]
    pub fn compound(label: impl Into<String>, children: Vec<Command>) -> Self {
        Self::Compound(Compound::new(label, children))
    }

    /// Inserts a clue. Violations in `ignorable` that are policy violations
    /// are accepted.
    #[must_use]
    pub fn add_clue(props: ClueProperties, text: impl Into<String>, ignorable: ErrorType) -> Self {
        Self::AddClue(ClueChange::added(props, text.into(), ignorable))
    }

    /// Removes the clue `id`, remembering its content.
    ///
    /// # Errors
    ///
    /// Rejects unknown clues.
    pub fn remove_clue(grid: &Grid, id: ClueId) -> Result<Self, CommandRejected> {
        Ok(Self::RemoveClue(ClueChange::removed(grid, id)?))
    }

    /// Changes the placement or answer of a clue.
    ///
    /// Solution letters the change would discard are removed by child
    /// commands first.
    ///
    /// # Errors
    ///
    /// Rejects unknown clues and placements that fail the check.
    pub fn change_clue_properties(
        grid: &Grid,
        id: ClueId,
        new: ClueProperties,
        ignorable: ErrorType,
    ) -> Result<Self, CommandRejected> {
        Ok(Self::ChangeClueProperties(ChangeClueProperties::new(
            grid, id, new, ignorable,
        )?))
    }

    /// Replaces the text of a clue.
    ///
    /// # Errors
    ///
    /// Rejects unknown clues.
    pub fn set_clue_text(
        grid: &Grid,
        id: ClueId,
        text: impl Into<String>,
    ) -> Result<Self, CommandRejected> {
        Ok(Self::SetClueText(SetClueText::new(grid, id, text.into())?))
    }

    /// Moves a clue to `coord`, carrying its typed letters along.
    ///
    /// # Errors
    ///
    /// Rejects unknown clues and targets that fail the placement check.
    pub fn move_clue(grid: &Grid, id: ClueId, coord: Coord) -> Result<Self, CommandRejected> {
        Ok(Self::MoveClue(MoveClue::new(grid, id, coord)?))
    }

    /// Fills in the correct answer of a clue.
    ///
    /// # Errors
    ///
    /// Rejects unknown clues.
    pub fn reveal_answer(grid: &Grid, id: ClueId) -> Result<Self, CommandRejected> {
        Ok(Self::RevealAnswer(RevealAnswer::new(grid, id)?))
    }

    /// Inserts an image.
    #[must_use]
    pub fn add_image(anchor: Coord, size: Size, url: impl Into<String>) -> Self {
        Self::AddImage(ImageChange::new(anchor, size, url.into()))
    }

    /// Removes the image anchored at `anchor`.
    ///
    /// # Errors
    ///
    /// Rejects coordinates without an image anchor.
    pub fn remove_image(grid: &Grid, anchor: Coord) -> Result<Self, CommandRejected> {
        Ok(Self::RemoveImage(ImageChange::existing(grid, anchor)?))
    }

    /// Moves or resizes an image.
    ///
    /// # Errors
    ///
    /// Rejects coordinates without an image anchor.
    pub fn change_image_geometry(
        grid: &Grid,
        anchor: Coord,
        new_anchor: Coord,
        new_size: Size,
    ) -> Result<Self, CommandRejected> {
        Ok(Self::ChangeImageGeometry(ChangeImageGeometry::new(
            grid, anchor, new_anchor, new_size,
        )?))
    }

    /// Changes the content location of an image.
    ///
    /// # Errors
    ///
    /// Rejects coordinates without an image anchor.
    pub fn set_image_url(
        grid: &Grid,
        anchor: Coord,
        url: impl Into<String>,
    ) -> Result<Self, CommandRejected> {
        Ok(Self::SetImageUrl(SetImageUrl::new(grid, anchor, url.into())?))
    }

    /// Types `letter` at `coord`, or erases it with `None`.
    ///
    /// # Errors
    ///
    /// Rejects non-letter cells.
    pub fn set_current_letter(
        grid: &Grid,
        coord: Coord,
        letter: Option<char>,
    ) -> Result<Self, CommandRejected> {
        Ok(Self::SetCurrentLetter(SetCurrentLetter::new(
            grid, coord, letter,
        )?))
    }

    /// Changes the confidence of the letter at `coord`.
    ///
    /// # Errors
    ///
    /// Rejects non-letter cells.
    pub fn set_letter_confidence(
        grid: &Grid,
        coord: Coord,
        confidence: Confidence,
    ) -> Result<Self, CommandRejected> {
        Ok(Self::SetLetterConfidence(SetLetterConfidence::new(
            grid, coord, confidence,
        )?))
    }

    /// Erases every typed letter.
    #[must_use]
    pub fn clear_current_letters(grid: &Grid) -> Self {
        Self::ClearCurrentLetters(ClearCurrentLetters::new(grid))
    }

    /// Makes the letter at `coord` solution letter number `index`.
    #[must_use]
    pub fn add_solution_letter(coord: Coord, index: u16) -> Self {
        Self::AddSolutionLetter(SolutionLetterChange { coord, index })
    }

    /// Turns the solution letter at `coord` back into a plain letter.
    ///
    /// # Errors
    ///
    /// Rejects cells that are not solution letters.
    pub fn remove_solution_letter(grid: &Grid, coord: Coord) -> Result<Self, CommandRejected> {
        Ok(Self::RemoveSolutionLetter(SolutionLetterChange::existing(
            grid, coord,
        )?))
    }

    /// Changes the solution word index of the letter at `coord`.
    ///
    /// # Errors
    ///
    /// Rejects cells that are not solution letters.
    pub fn set_solution_letter_index(
        grid: &Grid,
        coord: Coord,
        index: u16,
    ) -> Result<Self, CommandRejected> {
        Ok(Self::SetSolutionLetterIndex(SetSolutionLetterIndex::new(
            grid, coord, index,
        )?))
    }

    /// Resizes the grid around `anchor`, removing content that would not
    /// fit through child commands.
    ///
    /// # Errors
    ///
    /// Rejects sizes with a zero dimension.
    pub fn resize_grid(grid: &Grid, size: Size, anchor: Anchor) -> Result<Self, CommandRejected> {
        Ok(Self::ResizeGrid(ResizeGrid::new(grid, size, anchor)?))
    }

    /// Moves all content by `(dx, dy)`, removing content that would leave the
    /// grid through child commands.
    ///
    /// # Errors
    ///
    /// Fails only if building the child commands fails.
    pub fn move_grid(grid: &Grid, dx: i16, dy: i16) -> Result<Self, CommandRejected> {
        Ok(Self::MoveGrid(MoveGrid::new(grid, dx, dy)?))
    }

    /// Switches the crossword type, removing non-conforming content through
    /// child commands.
    ///
    /// # Errors
    ///
    /// Fails only if building the child commands fails.
    pub fn set_crossword_type(
        grid: &Grid,
        info: CrosswordTypeInfo,
    ) -> Result<Self, CommandRejected> {
        Ok(Self::SetCrosswordType(SetCrosswordType::new(grid, info)?))
    }

    /// Replaces a metadata field.
    #[must_use]
    pub fn set_property(grid: &Grid, property: Property, text: impl Into<String>) -> Self {
        Self::SetProperty(SetProperty::new(grid, property, text.into()))
    }
}

impl Command {
    /// Returns the kind of this command.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Compound(_) => CommandKind::Compound,
            Self::AddClue(_) => CommandKind::AddClue,
            Self::RemoveClue(_) => CommandKind::RemoveClue,
            Self::ChangeClueProperties(_) => CommandKind::ChangeClueProperties,
            Self::SetClueText(_) => CommandKind::SetClueText,
            Self::AddImage(_) => CommandKind::AddImage,
            Self::RemoveImage(_) => CommandKind::RemoveImage,
            Self::ChangeImageGeometry(_) => CommandKind::ChangeImageGeometry,
            Self::SetImageUrl(_) => CommandKind::SetImageUrl,
            Self::SetCurrentLetter(_) => CommandKind::SetCurrentLetter,
            Self::SetLetterConfidence(_) => CommandKind::SetLetterConfidence,
            Self::ClearCurrentLetters(_) => CommandKind::ClearCurrentLetters,
            Self::RevealAnswer(_) => CommandKind::RevealAnswer,
            Self::AddSolutionLetter(_) => CommandKind::AddSolutionLetter,
            Self::RemoveSolutionLetter(_) => CommandKind::RemoveSolutionLetter,
            Self::ResizeGrid(_) => CommandKind::ResizeGrid,
            Self::MoveGrid(_) => CommandKind::MoveGrid,
            Self::SetCrosswordType(_) => CommandKind::SetCrosswordType,
            Self::SetProperty(_) => CommandKind::SetProperty,
            Self::MoveClue(_) => CommandKind::MoveClue,
            Self::SetSolutionLetterIndex(_) => CommandKind::SetSolutionLetterIndex,
        }
    }

    /// Returns the user-facing label, as shown in undo and redo menus.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Compound(c) => c.label().to_owned(),
            _ => self.kind().to_string(),
        }
    }

    /// Returns the clue a `RemoveClue` command removes.
    fn removed_clue(&self) -> Option<ClueId> {
        match self {
            Self::RemoveClue(c) => Some(c.snapshot.id()),
            _ => None,
        }
    }

    /// Returns the child commands run before this one.
    #[must_use]
    pub fn children(&self) -> &[Command] {
        match self {
            Self::Compound(c) => c.children(),
            Self::ChangeClueProperties(c) => &c.children,
            Self::ResizeGrid(c) => &c.children,
            Self::MoveGrid(c) => &c.children,
            Self::SetCrosswordType(c) => &c.children,
            Self::MoveClue(c) => &c.children,
            _ => &[],
        }
    }

    /// Checks whether the command can be applied to `grid` right now.
    ///
    /// A command that passes the check is guaranteed to apply cleanly.
    ///
    /// # Errors
    ///
    /// Returns the reason the command cannot be applied.
    pub fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        match self {
            Self::Compound(c) => c.check(grid),
            Self::AddClue(c) => c.check_insert(grid),
            Self::RemoveClue(c) => c.check_remove(grid),
            Self::ChangeClueProperties(c) => c.check(grid),
            Self::SetClueText(c) => c.check(grid),
            Self::AddImage(c) => c.check_insert(grid),
            Self::RemoveImage(c) => c.check_remove(grid),
            Self::ChangeImageGeometry(c) => c.check(grid),
            Self::SetImageUrl(c) => c.check(grid),
            Self::SetCurrentLetter(c) => c.check(grid),
            Self::SetLetterConfidence(c) => c.check(grid),
            Self::ClearCurrentLetters(_) | Self::SetProperty(_) => Ok(()),
            Self::RevealAnswer(c) => c.check(grid),
            Self::AddSolutionLetter(c) => c.check_insert(grid),
            Self::RemoveSolutionLetter(c) => c.check_remove(grid),
            Self::ResizeGrid(c) => c.check(grid),
            Self::MoveGrid(c) => c.check(grid),
            Self::SetCrosswordType(c) => c.check(grid),
            Self::MoveClue(c) => c.check(grid),
            Self::SetSolutionLetterIndex(c) => c.check(grid),
        }
    }

    /// Applies the command.
    pub(crate) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        match self {
            Self::Compound(c) => c.redo(grid),
            Self::AddClue(c) => c.insert(grid),
            Self::RemoveClue(c) => c.remove(grid),
            Self::ChangeClueProperties(c) => c.redo(grid),
            Self::SetClueText(c) => c.redo(grid),
            Self::AddImage(c) => c.insert(grid),
            Self::RemoveImage(c) => c.remove(grid),
            Self::ChangeImageGeometry(c) => c.redo(grid),
            Self::SetImageUrl(c) => c.redo(grid),
            Self::SetCurrentLetter(c) => c.redo(grid),
            Self::SetLetterConfidence(c) => c.redo(grid),
            Self::ClearCurrentLetters(c) => c.redo(grid),
            Self::RevealAnswer(c) => c.redo(grid),
            Self::AddSolutionLetter(c) => c.insert(grid),
            Self::RemoveSolutionLetter(c) => c.remove(grid),
            Self::ResizeGrid(c) => c.redo(grid),
            Self::MoveGrid(c) => c.redo(grid),
            Self::SetCrosswordType(c) => c.redo(grid),
            Self::SetProperty(c) => c.redo(grid),
            Self::MoveClue(c) => c.redo(grid),
            Self::SetSolutionLetterIndex(c) => c.redo(grid),
        }
    }

    /// Reverts the command.
    pub(crate) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        match self {
            Self::Compound(c) => c.undo(grid),
            Self::AddClue(c) => c.remove(grid),
            Self::RemoveClue(c) => c.restore(grid),
            Self::ChangeClueProperties(c) => c.undo(grid),
            Self::SetClueText(c) => c.undo(grid),
            Self::AddImage(c) => c.remove(grid),
            Self::RemoveImage(c) => c.restore(grid),
            Self::ChangeImageGeometry(c) => c.undo(grid),
            Self::SetImageUrl(c) => c.undo(grid),
            Self::SetCurrentLetter(c) => c.undo(grid),
            Self::SetLetterConfidence(c) => c.undo(grid),
            Self::ClearCurrentLetters(c) => c.undo(grid),
            Self::RevealAnswer(c) => c.undo(grid),
            Self::AddSolutionLetter(c) => c.remove(grid),
            Self::RemoveSolutionLetter(c) => c.insert(grid),
            Self::ResizeGrid(c) => c.undo(grid),
            Self::MoveGrid(c) => c.undo(grid),
            Self::SetCrosswordType(c) => c.undo(grid),
            Self::SetProperty(c) => c.undo(grid),
            Self::MoveClue(c) => c.undo(grid),
            Self::SetSolutionLetterIndex(c) => c.undo(grid),
        }
    }

    /// Absorbs `next` into this command if both describe consecutive edits of
    /// the same target. Both must already be applied.
    ///
    /// Returns `true` if `next` was absorbed.
    pub fn merge_with(&mut self, next: &Self) -> bool {
        match (self, next) {
            (Self::SetClueText(a), Self::SetClueText(b)) => a.merge(b),
            (Self::SetImageUrl(a), Self::SetImageUrl(b)) => a.merge(b),
            (Self::SetCurrentLetter(a), Self::SetCurrentLetter(b)) => a.merge(b),
            (Self::SetLetterConfidence(a), Self::SetLetterConfidence(b)) => a.merge(b),
            (Self::MoveGrid(a), Self::MoveGrid(b)) => a.merge(b),
            (Self::SetProperty(a), Self::SetProperty(b)) => a.merge(b),
            _ => false,
        }
    }

    /// Encodes the command as one log record: the tag byte followed by the
    /// payload.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::TooLong`] if a text or list exceeds its length
    /// prefix.
    pub fn encode(&self) -> Result<Vec<u8>, LogError> {
        let mut buf = Vec::new();
        self.write(&mut RecordWriter::new(&mut buf))?;
        Ok(buf)
    }

    /// Decodes exactly one log record.
    ///
    /// # Errors
    ///
    /// Returns a [`LogError`] for malformed records or trailing bytes.
    pub fn decode(record: &[u8]) -> Result<Self, LogError> {
        let mut reader = RecordReader::new(record);
        let command = Self::read(&mut reader)?;
        if !reader.is_at_end() {
            return Err(LogError::InvalidValue {
                what: "record length",
                offset: reader.position(),
            });
        }
        Ok(command)
    }

    pub(crate) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.u8(self.kind().tag());
        match self {
            Self::Compound(c) => c.write(w),
            Self::AddClue(c) => c.write_added(w),
            Self::RemoveClue(c) => c.write_removed(w),
            Self::ChangeClueProperties(c) => c.write(w),
            Self::SetClueText(c) => c.write(w),
            Self::AddImage(c) | Self::RemoveImage(c) => c.write(w),
            Self::ChangeImageGeometry(c) => c.write(w),
            Self::SetImageUrl(c) => c.write(w),
            Self::SetCurrentLetter(c) => c.write(w),
            Self::SetLetterConfidence(c) => c.write(w),
            Self::ClearCurrentLetters(c) => c.write(w),
            Self::RevealAnswer(c) => c.write(w),
            Self::AddSolutionLetter(c) | Self::RemoveSolutionLetter(c) => c.write(w),
            Self::ResizeGrid(c) => c.write(w),
            Self::MoveGrid(c) => c.write(w),
            Self::SetCrosswordType(c) => c.write(w),
            Self::SetProperty(c) => c.write(w),
            Self::MoveClue(c) => c.write(w),
            Self::SetSolutionLetterIndex(c) => c.write(w),
        }
    }

    pub(crate) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        let offset = r.position();
        let tag = r.u8()?;
        let decode = CommandKind::decoder(tag).ok_or(LogError::UnknownTag { tag, offset })?;
        decode(r)
    }
}

pub(crate) fn write_children(
    w: &mut RecordWriter<'_>,
    children: &[Command],
) -> Result<(), LogError> {
    w.len("child list", children.len())?;
    for child in children {
        child.write(w)?;
    }
    Ok(())
}

pub(crate) fn read_children(r: &mut RecordReader<'_>) -> Result<Vec<Command>, LogError> {
    let count = r.len()?;
    r.nested(|r| (0..count).map(|_| Command::read(r)).collect())
}

/// Applies `children` in order. On failure the applied ones are reverted.
///
/// Consecutive clue removals are applied together, so the grid announces
/// them in one batch.
pub(crate) fn redo_children(children: &[Command], grid: &mut Grid) -> Result<(), GridError> {
    let mut done = 0;
    while let Some(next) = children.get(done) {
        let ids: Vec<ClueId> = children[done..]
            .iter()
            .map_while(Command::removed_clue)
            .collect();
        let (step, result) = if ids.is_empty() {
            (1, next.redo(grid))
        } else {
            (ids.len(), grid.remove_clues(&ids).map(drop))
        };
        if let Err(e) = result {
            revert_partial(&children[..done], grid);
            return Err(e);
        }
        done += step;
    }
    Ok(())
}

/// Reverts `children` in reverse order.
pub(crate) fn undo_children(children: &[Command], grid: &mut Grid) -> Result<(), GridError> {
    for child in children.iter().rev() {
        child.undo(grid)?;
    }
    Ok(())
}

fn revert_partial(applied: &[Command], grid: &mut Grid) {
    for done in applied.iter().rev() {
        if let Err(e) = done.undo(grid) {
            warn!("cannot revert {} after a failed step: {e}", done.kind());
        }
    }
}

/// Runs children, then `op`; reverts the children if `op` fails.
pub(crate) fn redo_with_children(
    children: &[Command],
    grid: &mut Grid,
    op: impl FnOnce(&mut Grid) -> Result<(), GridError>,
) -> Result<(), GridError> {
    redo_children(children, grid)?;
    op(grid).inspect_err(|_| revert_partial(children, grid))
}

/// Runs `op`, then reverts the children.
pub(crate) fn undo_with_children(
    children: &[Command],
    grid: &mut Grid,
    op: impl FnOnce(&mut Grid) -> Result<(), GridError>,
) -> Result<(), GridError> {
    op(grid)?;
    undo_children(children, grid)
}

/// Checks `children` in sequence on a scratch copy of `grid`, then runs
/// `check` on the grid as the children leave it.
pub(crate) fn check_with_children(
    children: &[Command],
    grid: &Grid,
    check: impl FnOnce(&Grid) -> Result<(), CommandRejected>,
) -> Result<(), CommandRejected> {
    if children.is_empty() {
        return check(grid);
    }
    let mut scratch = grid.clone();
    for child in children {
        child.check(&scratch)?;
        child.redo(&mut scratch)?;
    }
    check(&scratch)
}

/// Collects child commands, applying each to a scratch grid so the next one
/// is built against the content its predecessors leave.
#[derive(Debug)]
pub(crate) struct ChildBuilder {
    scratch: Grid,
    children: Vec<Command>,
}

impl ChildBuilder {
    pub(crate) fn new(grid: &Grid) -> Self {
        Self {
            scratch: grid.clone(),
            children: Vec::new(),
        }
    }

    pub(crate) fn push(
        &mut self,
        make: impl FnOnce(&Grid) -> Result<Command, CommandRejected>,
    ) -> Result<(), CommandRejected> {
        let child = make(&self.scratch)?;
        child.check(&self.scratch)?;
        child.redo(&mut self.scratch)?;
        self.children.push(child);
        Ok(())
    }

    pub(crate) fn finish(self) -> Vec<Command> {
        self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_dense() {
        for tag in 1..=21u8 {
            let kind = CommandKind::from_tag(tag).unwrap();
            assert_eq!(kind.tag(), tag);
        }
        assert_eq!(CommandKind::from_tag(0), None);
        assert_eq!(CommandKind::from_tag(22), None);
        assert_eq!(CommandKind::from_tag(255), None);
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(
            Command::decode(&[0x63, 0x00]),
            Err(LogError::UnknownTag { tag: 0x63, offset: 0 })
        );
        assert_eq!(
            Command::decode(&[0x00]),
            Err(LogError::UnknownTag { tag: 0, offset: 0 })
        );
    }

    #[test]
    fn test_nesting_limit() {
        // A compound whose only child is a compound, 100 levels deep.
        let mut record = Vec::new();
        for _ in 0..100 {
            record.extend_from_slice(&[CommandKind::Compound.tag(), 0x01, 0x00]);
        }
        assert!(matches!(
            Command::decode(&record),
            Err(LogError::InvalidValue {
                what: "nesting depth",
                ..
            })
        ));
    }
}
