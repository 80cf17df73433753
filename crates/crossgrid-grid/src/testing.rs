//! Test utilities for grid content.
//!
//! This module provides [`GridTester`], a builder and assertion harness that
//! keeps grid tests short and readable.
//!
//! # Example
//!
//! ```
//! use crossgrid_core::{AnswerOffset, Orientation};
//! use crossgrid_grid::testing::GridTester;
//!
//! GridTester::free(4, 2)
//!     .clue(0, 0, Orientation::Horizontal, AnswerOffset::Right, "abc")
//!     .assert_rows(
//!         "
//!         >ABC
//!         ....
//!         ",
//!     );
//! ```

use crossgrid_core::{
    AnswerOffset, ClueId, Coord, CrosswordType, CrosswordTypeInfo, ErrorType, Orientation, Size,
};

use crate::{ClueProperties, Grid};

/// A test harness for building grids and asserting on their cells.
///
/// Builder methods take and return `self`; assertion methods borrow and
/// return `&Self` so they can be chained.
///
/// # Panics
///
/// All methods panic on failure, using `#[track_caller]` to report the
/// calling test line.
#[derive(Debug, Clone)]
pub struct GridTester {
    grid: Grid,
}

impl GridTester {
    /// Creates a tester around an empty grid.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[track_caller]
    #[must_use]
    pub fn new(width: u16, height: u16, type_info: CrosswordTypeInfo) -> Self {
        let grid = Grid::new(Size::new(width, height), type_info).unwrap();
        Self { grid }
    }

    /// Creates a tester around an empty grid with the permissive free type.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[track_caller]
    #[must_use]
    pub fn free(width: u16, height: u16) -> Self {
        Self::new(width, height, CrosswordTypeInfo::preset(CrosswordType::Free))
    }

    /// Inserts a clue with empty text.
    ///
    /// # Panics
    ///
    /// Panics if the clue cannot be inserted.
    #[track_caller]
    #[must_use]
    pub fn clue(
        mut self,
        x: u16,
        y: u16,
        orientation: Orientation,
        offset: AnswerOffset,
        answer: &str,
    ) -> Self {
        let props = ClueProperties::new(Coord::new(x, y), orientation, offset, answer);
        if let Err(e) = self.grid.insert_clue(&props, "", ErrorType::empty()) {
            panic!("cannot insert {}: {e}", props.id());
        }
        self
    }

    /// Places an image.
    ///
    /// # Panics
    ///
    /// Panics if the image cannot be placed.
    #[track_caller]
    #[must_use]
    pub fn image(mut self, x: u16, y: u16, width: u16, height: u16, url: &str) -> Self {
        self.grid
            .insert_image(
                Coord::new(x, y),
                Size::new(width, height),
                url,
                ErrorType::empty(),
            )
            .unwrap();
        self
    }

    /// Makes the letter at `(x, y)` a solution letter.
    ///
    /// # Panics
    ///
    /// Panics if the cell cannot become a solution letter.
    #[track_caller]
    #[must_use]
    pub fn solution_letter(mut self, x: u16, y: u16, index: u16) -> Self {
        self.grid
            .add_solution_letter(Coord::new(x, y), index)
            .unwrap();
        self
    }

    /// Returns the grid under test.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the grid under test for direct mutation.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Consumes the tester and returns the grid.
    #[must_use]
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// Asserts the glyph of one cell, see [`Cell::glyph`](crossgrid_core::Cell::glyph).
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the grid or shows another glyph.
    #[track_caller]
    pub fn assert_cell(&self, x: u16, y: u16, glyph: char) -> &Self {
        let coord = Coord::new(x, y);
        let actual = self.grid.cell_at(coord).unwrap().glyph();
        assert_eq!(
            actual, glyph,
            "cell {coord}: expected {glyph:?}, got {actual:?}"
        );
        self
    }

    /// Asserts the glyphs of all cells.
    ///
    /// `rows` holds one line of glyphs per grid row. Surrounding whitespace
    /// and blank lines are ignored.
    ///
    /// # Panics
    ///
    /// Panics if any row differs.
    #[track_caller]
    pub fn assert_rows(&self, rows: &str) -> &Self {
        let expected: Vec<&str> = rows
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let actual: Vec<String> = self
            .grid
            .content_string()
            .lines()
            .take(usize::from(self.grid.height()))
            .map(str::to_owned)
            .collect();
        assert_eq!(actual, expected, "grid rows differ");
        self
    }

    /// Asserts the owning clues of the letter at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the cell is not a letter or has other owners.
    #[track_caller]
    pub fn assert_owners(
        &self,
        x: u16,
        y: u16,
        horizontal: Option<ClueId>,
        vertical: Option<ClueId>,
    ) -> &Self {
        let coord = Coord::new(x, y);
        let cell = self.grid.cell_at(coord).unwrap();
        let Some(letter) = cell.as_letter() else {
            panic!("cell {coord} is not a letter: {cell:?}");
        };
        assert_eq!(
            letter.owners.get(Orientation::Horizontal),
            horizontal,
            "horizontal owner of {coord}"
        );
        assert_eq!(
            letter.owners.get(Orientation::Vertical),
            vertical,
            "vertical owner of {coord}"
        );
        self
    }
}
