use std::{collections::BTreeMap, fmt::Write as _};

use crossgrid_core::{Cell, ClueId, Confidence, Coord, CrosswordTypeInfo, Orientation, Size};

use crate::{Clue, ClueSnapshot, GridError, GridEvent, LetterState, Metadata, Property};

/// A crossword grid.
///
/// Holds a dense `width × height` array of [`Cell`]s, the clue table, the
/// crossword type rules and a queue of [`GridEvent`]s. Every in-bounds
/// coordinate maps to exactly one cell at all times.
///
/// Clues live in a table keyed by [`ClueId`]; cells refer to clues by
/// identity only.
///
/// # Example
///
/// ```
/// use crossgrid_core::{Cell, Coord, CrosswordTypeInfo, Size};
/// use crossgrid_grid::Grid;
///
/// let grid = Grid::new(Size::new(4, 3), CrosswordTypeInfo::default())?;
/// assert!(grid.cells().all(|(_, cell)| cell.is_empty()));
/// assert!(grid.cell_at(Coord::new(4, 0)).is_err());
/// # Ok::<(), crossgrid_grid::GridError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Grid {
    pub(crate) size: Size,
    pub(crate) cells: Vec<Cell>,
    pub(crate) clues: BTreeMap<ClueId, Clue>,
    pub(crate) type_info: CrosswordTypeInfo,
    pub(crate) metadata: Metadata,
    pub(crate) current_cell: Option<Coord>,
    pub(crate) events: Vec<GridEvent>,
}

impl Grid {
    /// Creates an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSize`] if either dimension is zero.
    pub fn new(size: Size, type_info: CrosswordTypeInfo) -> Result<Self, GridError> {
        if size.is_degenerate() {
            return Err(GridError::InvalidSize { size });
        }
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size.area()],
            clues: BTreeMap::new(),
            type_info,
            metadata: Metadata::default(),
            current_cell: None,
            events: Vec::new(),
        })
    }

    /// Returns the grid size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.size.width
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.size.height
    }

    /// Returns `true` if `coord` lies inside the grid.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.size.width && coord.y < self.size.height
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.contains(coord).then(|| {
            usize::from(coord.y) * usize::from(self.size.width) + usize::from(coord.x)
        })
    }

    pub(crate) fn coord_of(size: Size, index: usize) -> Coord {
        let width = usize::from(size.width);
        #[expect(clippy::cast_possible_truncation)]
        let (x, y) = ((index % width) as u16, (index / width) as u16);
        Coord::new(x, y)
    }

    /// Returns the cell at `coord`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `coord` lies outside the grid.
    pub fn cell_at(&self, coord: Coord) -> Result<&Cell, GridError> {
        self.cell(coord).ok_or(GridError::OutOfBounds { coord })
    }

    pub(crate) fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).map(|i| &self.cells[i])
    }

    pub(crate) fn cell_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        self.index(coord).map(|i| &mut self.cells[i])
    }

    /// Iterates over all cells in reading order.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (Self::coord_of(size, i), cell))
    }

    /// Replaces the cell at `coord`, discarding the old one.
    ///
    /// This is a raw storage operation: it does not maintain clue ownership
    /// or image spans. Prefer the typed mutators.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `coord` lies outside the grid.
    pub fn replace_cell(&mut self, coord: Coord, cell: Cell) -> Result<(), GridError> {
        let slot = self
            .cell_mut(coord)
            .ok_or(GridError::OutOfBounds { coord })?;
        *slot = cell;
        Ok(())
    }

    /// Returns the clue with identity `id`.
    #[must_use]
    pub fn clue(&self, id: ClueId) -> Option<&Clue> {
        self.clues.get(&id)
    }

    /// Iterates over all clues in reading order of their coordinates.
    pub fn clues(&self) -> impl Iterator<Item = &Clue> {
        self.clues.values()
    }

    /// Returns the number of clues.
    #[must_use]
    pub fn clue_count(&self) -> usize {
        self.clues.len()
    }

    /// Returns the clue shown or answered at `coord` in `orientation`.
    #[must_use]
    pub fn clue_at_cell(&self, coord: Coord, orientation: Orientation) -> Option<&Clue> {
        match self.cell(coord)? {
            cell if cell.has_clue_marker(orientation) => {
                self.clue(ClueId::new(coord, orientation))
            }
            cell => self.clue(cell.as_letter()?.owners.get(orientation)?),
        }
    }

    /// Returns the correct answer of a clue.
    #[must_use]
    pub fn answer_text(&self, id: ClueId) -> Option<String> {
        let clue = self.clue(id)?;
        clue.answer
            .iter()
            .map(|&c| self.cell(c)?.as_letter().map(|letter| letter.correct))
            .collect()
    }

    /// Returns the typed answer of a clue, with `' '` for untyped letters.
    #[must_use]
    pub fn current_answer_text(&self, id: ClueId) -> Option<String> {
        let clue = self.clue(id)?;
        clue.answer
            .iter()
            .map(|&c| {
                self.cell(c)?
                    .as_letter()
                    .map(|letter| letter.current.unwrap_or(' '))
            })
            .collect()
    }

    /// Returns the typed state of the letter at `coord`.
    #[must_use]
    pub fn letter_state(&self, coord: Coord) -> Option<LetterState> {
        let cell = self.cell(coord)?;
        let letter = cell.as_letter()?;
        Some(LetterState {
            current: letter.current,
            confidence: letter.confidence,
            solution_index: cell.solution_index(),
        })
    }

    /// Returns the typed state of every letter among `coords`.
    pub fn letter_states(&self, coords: &[Coord]) -> Vec<(Coord, LetterState)> {
        coords
            .iter()
            .filter_map(|&c| Some((c, self.letter_state(c)?)))
            .collect()
    }

    /// Captures everything needed to recreate the clue `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ClueNotFound`] if there is no such clue.
    pub fn clue_snapshot(&self, id: ClueId) -> Result<ClueSnapshot, GridError> {
        let clue = self.clue(id).ok_or(GridError::ClueNotFound { id })?;
        let answer = self
            .answer_text(id)
            .ok_or(GridError::ClueNotFound { id })?;
        let letters = clue
            .answer
            .iter()
            .map(|&c| self.letter_state(c).unwrap_or_default())
            .collect();
        Ok(ClueSnapshot {
            properties: crate::ClueProperties {
                coord: id.coord,
                orientation: id.orientation,
                offset: clue.offset,
                answer,
            },
            text: clue.text.clone(),
            letters,
        })
    }

    /// Returns the crossword type rules.
    #[must_use]
    pub fn type_info(&self) -> &CrosswordTypeInfo {
        &self.type_info
    }

    /// Returns the descriptive metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Replaces one metadata field and returns the previous text.
    pub fn set_property(&mut self, property: Property, text: impl Into<String>) -> String {
        std::mem::replace(self.metadata.get_mut(property), text.into())
    }

    /// Returns the current cell.
    #[must_use]
    pub fn current_cell(&self) -> Option<Coord> {
        self.current_cell
    }

    /// Sets the current cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `coord` lies outside the grid.
    pub fn set_current_cell(&mut self, coord: Option<Coord>) -> Result<(), GridError> {
        if let Some(coord) = coord
            && !self.contains(coord)
        {
            return Err(GridError::OutOfBounds { coord });
        }
        if self.current_cell != coord {
            let previous = std::mem::replace(&mut self.current_cell, coord);
            self.emit(GridEvent::CurrentCellChanged {
                previous,
                current: coord,
            });
        }
        Ok(())
    }

    /// Takes all queued events.
    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GridEvent) {
        self.events.push(event);
    }

    /// Returns `true` if the letter layout is symmetric under 180° rotation.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        let last = self.cells.len() - 1;
        (0..self.cells.len() / 2)
            .all(|i| self.cells[i].is_any_letter() == self.cells[last - i].is_any_letter())
    }

    /// Reassigns clue numbers.
    ///
    /// Numbers follow the reading order of first letters; clues sharing a
    /// first letter share a number.
    pub(crate) fn renumber(&mut self) {
        let mut order: Vec<(Coord, ClueId)> = self
            .clues
            .values()
            .filter_map(|clue| Some((clue.first_letter()?, clue.id)))
            .collect();
        order.sort_unstable();

        let mut number = 0u16;
        let mut previous = None;
        for (first, id) in order {
            if previous != Some(first) {
                number = number.saturating_add(1);
                previous = Some(first);
            }
            if let Some(clue) = self.clues.get_mut(&id) {
                clue.number = Some(number);
            }
        }
    }

    /// Renders the full grid content as text.
    ///
    /// The first lines draw the cells using [`Cell::glyph`]. They are followed
    /// by one line per clue, the solution letters, typed letters and
    /// metadata. Two grids with the same content string hold the same
    /// content.
    #[must_use]
    pub fn content_string(&self) -> String {
        let mut out = String::new();
        for row in self.cells.chunks(usize::from(self.size.width)) {
            out.extend(row.iter().map(Cell::glyph));
            out.push('\n');
        }
        for clue in self.clues.values() {
            let answer = self.answer_text(clue.id).unwrap_or_default();
            let _ = writeln!(
                out,
                "clue {} {} {} {} #{} {:?}",
                clue.id.orientation,
                clue.id.coord,
                clue.offset,
                answer,
                clue.number.unwrap_or_default(),
                clue.text,
            );
        }
        for (coord, cell) in self.cells() {
            match cell {
                Cell::SolutionLetter { index, .. } => {
                    let _ = writeln!(out, "solution {index} at {coord}");
                }
                Cell::Image(image) => {
                    let _ = writeln!(out, "image {coord} {} {:?}", image.size, image.url);
                }
                _ => {}
            }
            if let Some(letter) = cell.as_letter()
                && (letter.current.is_some() || letter.confidence != Confidence::default())
            {
                let _ = writeln!(
                    out,
                    "typed {coord} {:?} {}",
                    letter.current, letter.confidence
                );
            }
        }
        let Metadata {
            title,
            author,
            copyright,
            notes,
        } = &self.metadata;
        let _ = writeln!(
            out,
            "meta {title:?} {author:?} {copyright:?} {notes:?} {}",
            self.type_info.crossword_type
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use crossgrid_core::{AnswerOffset, CrosswordType, ErrorType};
    use proptest::prelude::*;

    use super::*;
    use crate::ClueProperties;

    fn grid(width: u16, height: u16) -> Grid {
        Grid::new(Size::new(width, height), CrosswordTypeInfo::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_degenerate_size() {
        assert_eq!(
            Grid::new(Size::new(0, 3), CrosswordTypeInfo::default()).unwrap_err(),
            GridError::InvalidSize {
                size: Size::new(0, 3)
            }
        );
    }

    #[test]
    fn test_cell_at_bounds() {
        let grid = grid(3, 2);
        assert!(grid.cell_at(Coord::new(2, 1)).is_ok());
        assert_eq!(
            grid.cell_at(Coord::new(3, 0)),
            Err(GridError::OutOfBounds {
                coord: Coord::new(3, 0)
            })
        );
        assert!(grid.cell_at(Coord::new(0, 2)).is_err());
    }

    #[test]
    fn test_replace_cell() {
        let mut grid = grid(3, 3);
        grid.replace_cell(Coord::new(1, 2), Cell::DoubleClue).unwrap();
        assert_eq!(grid.cell_at(Coord::new(1, 2)), Ok(&Cell::DoubleClue));
        assert!(grid.replace_cell(Coord::new(3, 3), Cell::Empty).is_err());
    }

    #[test]
    fn test_current_cell_events() {
        let mut grid = grid(3, 3);
        grid.set_current_cell(Some(Coord::new(1, 1))).unwrap();
        grid.set_current_cell(Some(Coord::new(1, 1))).unwrap();
        assert!(grid.set_current_cell(Some(Coord::new(5, 1))).is_err());
        assert_eq!(
            grid.drain_events(),
            vec![GridEvent::CurrentCellChanged {
                previous: None,
                current: Some(Coord::new(1, 1)),
            }]
        );
        assert!(grid.drain_events().is_empty());
    }

    #[test]
    fn test_numbering_shares_first_letters() {
        let mut grid = grid(5, 5);
        for (coord, orientation, answer) in [
            (Coord::new(0, 0), Orientation::Horizontal, "ABC"),
            (Coord::new(0, 0), Orientation::Vertical, "AXY"),
            (Coord::new(2, 0), Orientation::Vertical, "CDE"),
        ] {
            let props = ClueProperties::new(coord, orientation, AnswerOffset::OnClueCell, answer);
            grid.insert_clue(&props, "", ErrorType::empty()).unwrap();
        }
        let numbers: Vec<_> = grid.clues().map(|c| (c.id(), c.number())).collect();
        assert_eq!(
            numbers,
            vec![
                (ClueId::new(Coord::new(0, 0), Orientation::Horizontal), Some(1)),
                (ClueId::new(Coord::new(0, 0), Orientation::Vertical), Some(1)),
                (ClueId::new(Coord::new(2, 0), Orientation::Vertical), Some(2)),
            ]
        );
    }

    #[test]
    fn test_symmetry() {
        let mut grid = Grid::new(
            Size::new(3, 3),
            CrosswordTypeInfo::preset(CrosswordType::Free),
        )
        .unwrap();
        assert!(grid.is_symmetric());
        let props = ClueProperties::new(
            Coord::new(0, 0),
            Orientation::Horizontal,
            AnswerOffset::OnClueCell,
            "AB",
        );
        grid.insert_clue(&props, "", ErrorType::empty()).unwrap();
        assert!(!grid.is_symmetric());
        let props = ClueProperties::new(
            Coord::new(1, 2),
            Orientation::Horizontal,
            AnswerOffset::OnClueCell,
            "CD",
        );
        grid.insert_clue(&props, "", ErrorType::empty()).unwrap();
        assert!(grid.is_symmetric());
    }

    proptest! {
        #[test]
        fn fresh_grid_is_all_empty(width in 1u16..30, height in 1u16..30) {
            let grid = grid(width, height);
            for y in 0..height {
                for x in 0..width {
                    prop_assert!(grid.cell_at(Coord::new(x, y)).unwrap().is_empty());
                }
            }
            prop_assert_eq!(grid.cells().count(), usize::from(width) * usize::from(height));
        }
    }
}
