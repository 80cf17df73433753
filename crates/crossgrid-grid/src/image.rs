use crossgrid_core::{Cell, Coord, ErrorType, ImageCell, Rect, Size};
use log::debug;

use crate::{Grid, GridError};

/// Everything needed to recreate a removed image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageSnapshot {
    /// Top-left coordinate owning the content.
    pub anchor: Coord,
    /// Covered columns and rows.
    pub size: Size,
    /// Location of the image content.
    pub url: String,
}

impl ImageSnapshot {
    /// Returns the covered rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.anchor, self.size)
    }
}

impl Grid {
    /// Returns the image anchored at `anchor`.
    #[must_use]
    pub fn image(&self, anchor: Coord) -> Option<ImageSnapshot> {
        match self.cell(anchor)? {
            Cell::Image(image) => Some(ImageSnapshot {
                anchor,
                size: image.size,
                url: image.url.clone(),
            }),
            _ => None,
        }
    }

    /// Iterates over all images in reading order of their anchors.
    pub fn images(&self) -> impl Iterator<Item = ImageSnapshot> + '_ {
        self.cells().filter_map(|(anchor, cell)| match cell {
            Cell::Image(image) => Some(ImageSnapshot {
                anchor,
                size: image.size,
                url: image.url.clone(),
            }),
            _ => None,
        })
    }

    /// Places an image covering `size` cells from `anchor`.
    ///
    /// Only [`ErrorType::POLICY`] violations can be ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSize`] for a zero dimension and
    /// [`GridError::Placement`] if the cells are not free.
    pub fn insert_image(
        &mut self,
        anchor: Coord,
        size: Size,
        url: impl Into<String>,
        ignorable: ErrorType,
    ) -> Result<(), GridError> {
        let snapshot = ImageSnapshot {
            anchor,
            size,
            url: url.into(),
        };
        self.place_image(&snapshot, None, ignorable & ErrorType::POLICY)
    }

    /// Recreates an image removed by [`Grid::remove_image`], ignoring policy
    /// violations.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Placement`] if the cells are no longer free.
    pub fn restore_image(&mut self, snapshot: &ImageSnapshot) -> Result<(), GridError> {
        self.place_image(snapshot, None, ErrorType::POLICY)
    }

    fn place_image(
        &mut self,
        snapshot: &ImageSnapshot,
        exclude: Option<Coord>,
        ignorable: ErrorType,
    ) -> Result<(), GridError> {
        if snapshot.size.is_degenerate() {
            return Err(GridError::InvalidSize {
                size: snapshot.size,
            });
        }
        let errors = self.can_insert_image(snapshot.rect(), exclude, ignorable);
        if !errors.is_empty() {
            return Err(GridError::Placement { errors });
        }
        if let Some(old) = exclude {
            self.unplace_image(old);
        }
        let anchor = snapshot.anchor;
        for coord in snapshot.rect().coords() {
            if let Some(cell) = self.cell_mut(coord) {
                *cell = Cell::Spanned { anchor };
            }
        }
        if let Some(cell) = self.cell_mut(anchor) {
            *cell = Cell::Image(ImageCell {
                size: snapshot.size,
                url: snapshot.url.clone(),
            });
        }
        debug!("image at {anchor} spanning {}", snapshot.size);
        Ok(())
    }

    fn unplace_image(&mut self, anchor: Coord) -> Option<ImageSnapshot> {
        let snapshot = self.image(anchor)?;
        for coord in snapshot.rect().coords() {
            if let Some(cell) = self.cell_mut(coord) {
                *cell = Cell::Empty;
            }
        }
        Some(snapshot)
    }

    /// Removes the image anchored at `anchor` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ImageNotFound`] if no image is anchored there.
    pub fn remove_image(&mut self, anchor: Coord) -> Result<ImageSnapshot, GridError> {
        let snapshot = self
            .unplace_image(anchor)
            .ok_or(GridError::ImageNotFound { anchor })?;
        debug!("removed image at {anchor}");
        Ok(snapshot)
    }

    /// Moves or resizes an image.
    ///
    /// The image's own cells count as free. Policy violations are ignored,
    /// since the image already exists.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ImageNotFound`], [`GridError::InvalidSize`] or
    /// [`GridError::Placement`].
    pub fn change_image_geometry(
        &mut self,
        anchor: Coord,
        new_anchor: Coord,
        new_size: Size,
    ) -> Result<(), GridError> {
        let url = self
            .image(anchor)
            .ok_or(GridError::ImageNotFound { anchor })?
            .url;
        let moved = ImageSnapshot {
            anchor: new_anchor,
            size: new_size,
            url,
        };
        self.place_image(&moved, Some(anchor), ErrorType::POLICY)
    }

    /// Replaces the content location of an image and returns the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ImageNotFound`] if no image is anchored there.
    pub fn set_image_url(
        &mut self,
        anchor: Coord,
        url: impl Into<String>,
    ) -> Result<String, GridError> {
        match self.cell_mut(anchor) {
            Some(Cell::Image(image)) => Ok(std::mem::replace(&mut image.url, url.into())),
            _ => Err(GridError::ImageNotFound { anchor }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::GridTester;

    #[test]
    fn test_insert_and_remove() {
        let mut tester = GridTester::free(4, 4).image(1, 1, 2, 3, "pic.png");
        tester.assert_rows(
            "
            ....
            .@~.
            .~~.
            .~~.
            ",
        );
        assert_eq!(tester.grid().images().count(), 1);
        assert!(tester.grid().image(Coord::new(2, 1)).is_none());

        let removed = tester.grid_mut().remove_image(Coord::new(1, 1)).unwrap();
        assert_eq!(removed.url, "pic.png");
        assert!(tester.grid().cells().all(|(_, cell)| cell.is_empty()));
        assert_eq!(
            tester.grid_mut().remove_image(Coord::new(1, 1)),
            Err(GridError::ImageNotFound {
                anchor: Coord::new(1, 1)
            })
        );

        tester.grid_mut().restore_image(&removed).unwrap();
        tester.assert_cell(1, 1, '@').assert_cell(2, 3, '~');
    }

    #[test]
    fn test_degenerate_image() {
        let mut grid = GridTester::free(4, 4).into_grid();
        assert_eq!(
            grid.insert_image(Coord::new(0, 0), Size::new(0, 2), "", ErrorType::empty()),
            Err(GridError::InvalidSize {
                size: Size::new(0, 2)
            })
        );
    }

    #[test]
    fn test_change_geometry_overlapping_itself() {
        let mut tester = GridTester::free(4, 4).image(0, 0, 2, 2, "a");
        tester
            .grid_mut()
            .change_image_geometry(Coord::new(0, 0), Coord::new(1, 1), Size::new(3, 3))
            .unwrap();
        tester.assert_rows(
            "
            ....
            .@~~
            .~~~
            .~~~
            ",
        );
        assert_eq!(tester.grid().image(Coord::new(1, 1)).unwrap().url, "a");
        assert_eq!(
            tester
                .grid_mut()
                .change_image_geometry(Coord::new(1, 1), Coord::new(2, 2), Size::new(3, 3)),
            Err(GridError::Placement {
                errors: ErrorType::IMAGE_DOESNT_FIT
            })
        );
    }

    #[test]
    fn test_set_url() {
        let mut tester = GridTester::free(3, 3).image(0, 0, 1, 1, "old");
        assert_eq!(
            tester.grid_mut().set_image_url(Coord::new(0, 0), "new"),
            Ok("old".to_owned())
        );
        assert!(tester.grid_mut().set_image_url(Coord::new(1, 1), "x").is_err());
    }
}
