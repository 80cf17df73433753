//! The crossword grid: cell storage, placement rules and mutation.
//!
//! [`Grid`] is the only type allowed to change cells. Every mutating method
//! validates its input first and either applies the whole change or returns
//! an error without touching the grid.
//!
//! # Example
//!
//! ```
//! use crossgrid_core::{AnswerOffset, Coord, CrosswordTypeInfo, ErrorType, Orientation, Size};
//! use crossgrid_grid::{ClueProperties, Grid};
//!
//! let mut grid = Grid::new(Size::new(5, 5), CrosswordTypeInfo::default())?;
//! let cat = ClueProperties::new(
//!     Coord::new(2, 2),
//!     Orientation::Horizontal,
//!     AnswerOffset::OnClueCell,
//!     "cat",
//! );
//! assert!(grid.can_insert_clue(&cat, ErrorType::empty()).is_empty());
//!
//! grid.insert_clue(&cat, "Pet", ErrorType::empty())?;
//! assert_eq!(grid.cell_at(Coord::new(4, 2))?.glyph(), 'T');
//! # Ok::<(), crossgrid_grid::GridError>(())
//! ```

pub use self::{
    clue::{Clue, ClueProperties, ClueSnapshot, LetterState},
    error::GridError,
    event::GridEvent,
    grid::Grid,
    image::ImageSnapshot,
    metadata::{Metadata, Property},
    placement::ClueChangePreview,
    structure::{RemovalPreview, Removed},
    type_change::TypeViolations,
};

mod clue;
mod clue_edit;
mod error;
mod event;
mod grid;
mod image;
mod letters;
mod metadata;
mod placement;
mod structure;
pub mod testing;
mod type_change;
