//! Undoable editing of a crossword grid.
//!
//! Every edit is a [`Command`]: an invertible value built from the grid it
//! will apply to. A [`CommandStack`] checks and applies commands, keeps the
//! undo/redo history and mirrors it into a [`CommandLog`], a compact binary
//! form that [`CommandStack::create_from_data`] replays onto a fresh grid.
//!
//! # Example
//!
//! ```
//! use crossgrid_command::{Command, CommandStack};
//! use crossgrid_core::{AnswerOffset, Coord, CrosswordTypeInfo, ErrorType, Orientation, Size};
//! use crossgrid_grid::{ClueProperties, Grid};
//!
//! let mut grid = Grid::new(Size::new(5, 5), CrosswordTypeInfo::default())?;
//! let mut stack = CommandStack::new();
//!
//! let cat = ClueProperties::new(
//!     Coord::new(0, 0),
//!     Orientation::Horizontal,
//!     AnswerOffset::Right,
//!     "cat",
//! );
//! stack.push(&mut grid, Command::add_clue(cat, "Pet", ErrorType::empty()))?;
//! assert_eq!(grid.clue_count(), 1);
//!
//! let mut replayed = Grid::new(Size::new(5, 5), CrosswordTypeInfo::default())?;
//! CommandStack::create_from_data(&mut replayed, stack.data())?;
//! assert_eq!(replayed.content_string(), grid.content_string());
//!
//! stack.undo(&mut grid)?;
//! assert_eq!(grid.clue_count(), 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use self::{
    command::{
        ChangeClueProperties, ChangeImageGeometry, ClearCurrentLetters, ClueChange, Command,
        CommandKind, Compound, ImageChange, MoveClue, MoveGrid, ResizeGrid, RevealAnswer,
        SetClueText, SetCrosswordType, SetCurrentLetter, SetImageUrl, SetLetterConfidence,
        SetProperty, SetSolutionLetterIndex, SolutionLetterChange,
    },
    command_log::CommandLog,
    error::{CommandRejected, LogError, StackError},
    stack::CommandStack,
};

mod codec;
mod command;
mod command_log;
mod error;
mod stack;
