//! Core data structures for crossword grid editing.
//!
//! This crate provides the value types shared by the grid engine and the
//! command log. It holds no grid state of its own.
//!
//! # Overview
//!
//! 1. **Geometry** - Where things are
//!    - [`coord`]: [`Coord`], [`Size`] and [`Rect`]
//!    - [`direction`]: [`Orientation`], [`AnswerOffset`] and the resize [`Anchor`]
//!
//! 2. **Cells** - What a grid coordinate holds
//!    - [`cell`]: the [`Cell`] variants, [`LetterCell`], [`ClueId`] and [`ImageCell`]
//!
//! 3. **Rules** - What an edit is allowed to do
//!    - [`type_info`]: the [`CrosswordTypeInfo`] configuration record
//!    - [`error_type`]: the [`ErrorType`] bit-flag set of placement violations
//!
//! # Examples
//!
//! ```
//! use crossgrid_core::{AnswerOffset, Coord, Orientation};
//!
//! let clue = Coord::new(2, 2);
//! let first_letter = AnswerOffset::Right.apply(clue).unwrap();
//! assert_eq!(first_letter, Coord::new(3, 2));
//!
//! let last_letter = first_letter.step(Orientation::Horizontal, 2).unwrap();
//! assert_eq!(last_letter, Coord::new(5, 2));
//! ```

pub mod cell;
pub mod coord;
pub mod direction;
pub mod error_type;
pub mod type_info;

pub use self::{
    cell::{Cell, ClueId, Confidence, ImageCell, LetterCell, LetterOwners},
    coord::{Coord, Rect, Size},
    direction::{Anchor, AnswerOffset, Orientation},
    error_type::ErrorType,
    type_info::{CellKinds, ClueCellHandling, CrosswordType, CrosswordTypeInfo, LetterContent},
};
