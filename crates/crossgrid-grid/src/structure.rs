//! Resizing and moving the whole grid content.
//!
//! Both operations share one remapping step: content that would leave the
//! grid is removed first (clues and images as a whole), then every remaining
//! cell, clue identity and answer coordinate is shifted.

use std::collections::BTreeMap;

use crossgrid_core::{Anchor, Cell, ClueId, Coord, Size};
use log::debug;

use crate::{ClueSnapshot, Grid, GridError, GridEvent, ImageSnapshot};

/// Content a resize or translation would remove.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemovalPreview {
    /// Clues with a marker or letter leaving the grid.
    pub clues: Vec<ClueId>,
    /// Anchors of images not fully inside the grid afterwards.
    pub images: Vec<Coord>,
}

impl RemovalPreview {
    /// Returns `true` if nothing would be removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clues.is_empty() && self.images.is_empty()
    }
}

/// Content removed by a resize or translation, in removal order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Removed {
    /// Removed clues.
    pub clues: Vec<ClueSnapshot>,
    /// Removed images.
    pub images: Vec<ImageSnapshot>,
}

impl Removed {
    /// Returns `true` if nothing was removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clues.is_empty() && self.images.is_empty()
    }
}

fn shifted(coord: Coord, (dx, dy): (i32, i32), bounds: Size) -> Option<Coord> {
    coord
        .offset(dx, dy)
        .filter(|c| c.x < bounds.width && c.y < bounds.height)
}

impl Grid {
    /// Reports what [`Grid::resize`] would remove.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSize`] if either dimension is zero.
    pub fn simulate_resize(&self, size: Size, anchor: Anchor) -> Result<RemovalPreview, GridError> {
        if size.is_degenerate() {
            return Err(GridError::InvalidSize { size });
        }
        Ok(self.removal_preview(anchor.shift(self.size, size), size))
    }

    /// Reports what [`Grid::translate`] would remove.
    #[must_use]
    pub fn simulate_translate(&self, dx: i32, dy: i32) -> RemovalPreview {
        self.removal_preview((dx, dy), self.size)
    }

    /// Changes the grid size, keeping content attached to `anchor`.
    ///
    /// Clues and images that would not fit anymore are removed entirely and
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSize`] if either dimension is zero.
    pub fn resize(&mut self, size: Size, anchor: Anchor) -> Result<Removed, GridError> {
        if size.is_degenerate() {
            return Err(GridError::InvalidSize { size });
        }
        let shift = anchor.shift(self.size, size);
        debug!("resizing {} to {size} anchored {anchor}", self.size);
        Ok(self.remap(shift, size))
    }

    /// Moves all content by `(dx, dy)` cells.
    ///
    /// Clues and images that would leave the grid are removed entirely and
    /// returned.
    pub fn translate(&mut self, dx: i32, dy: i32) -> Removed {
        debug!("translating content by ({dx}, {dy})");
        self.remap((dx, dy), self.size)
    }

    fn removal_preview(&self, shift: (i32, i32), bounds: Size) -> RemovalPreview {
        let clues = self
            .clues
            .values()
            .filter(|clue| {
                clue.answer
                    .iter()
                    .copied()
                    .chain(clue.marker())
                    .any(|c| shifted(c, shift, bounds).is_none())
            })
            .map(|clue| clue.id)
            .collect();
        let images = self
            .images()
            .filter(|image| {
                image
                    .rect()
                    .coords()
                    .any(|c| shifted(c, shift, bounds).is_none())
            })
            .map(|image| image.anchor)
            .collect();
        RemovalPreview { clues, images }
    }

    fn remap(&mut self, shift: (i32, i32), size: Size) -> Removed {
        let preview = self.removal_preview(shift, size);
        let mut removed = Removed {
            clues: self.remove_clues(&preview.clues).unwrap_or_default(),
            images: Vec::new(),
        };
        for anchor in preview.images {
            if let Ok(snapshot) = self.remove_image(anchor) {
                removed.images.push(snapshot);
            }
        }

        let (dx, dy) = shift;
        let mut cells = vec![Cell::Empty; size.area()];
        let old = std::mem::take(&mut self.cells);
        for (i, mut cell) in old.into_iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let Some(coord) = shifted(Self::coord_of(self.size, i), shift, size) else {
                continue;
            };
            match &mut cell {
                Cell::Letter(letter) | Cell::SolutionLetter { letter, .. } => {
                    letter.owners.map(|id| id.offset(dx, dy));
                }
                Cell::Spanned { anchor } => {
                    if let Some(moved) = anchor.offset(dx, dy) {
                        *anchor = moved;
                    }
                }
                _ => {}
            }
            cells[usize::from(coord.y) * usize::from(size.width) + usize::from(coord.x)] = cell;
        }
        self.cells = cells;
        self.size = size;

        let clues = std::mem::take(&mut self.clues);
        self.clues = clues
            .into_values()
            .filter_map(|mut clue| {
                clue.id = clue.id.offset(dx, dy)?;
                for coord in &mut clue.answer {
                    *coord = coord.offset(dx, dy)?;
                }
                Some((clue.id, clue))
            })
            .collect::<BTreeMap<_, _>>();

        if let Some(current) = self.current_cell {
            let moved = shifted(current, shift, size);
            if moved != Some(current) {
                self.current_cell = moved;
                self.emit(GridEvent::CurrentCellChanged {
                    previous: Some(current),
                    current: moved,
                });
            }
        }

        self.renumber();
        self.emit(GridEvent::Reshaped { size, shift });
        removed
    }
}
