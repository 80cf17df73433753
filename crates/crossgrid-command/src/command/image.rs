use crossgrid_core::{Coord, ErrorType, Rect, Size};
use crossgrid_grid::{Grid, GridError, ImageSnapshot};

use crate::{
    CommandRejected, LogError,
    codec::{RecordReader, RecordWriter},
};

fn existing_image(grid: &Grid, anchor: Coord) -> Result<ImageSnapshot, CommandRejected> {
    grid.image(anchor)
        .ok_or_else(|| GridError::ImageNotFound { anchor }.into())
}

fn check_geometry(
    grid: &Grid,
    rect: Rect,
    exclude: Option<Coord>,
    ignorable: ErrorType,
) -> Result<(), CommandRejected> {
    if rect.size.is_degenerate() {
        return Err(GridError::InvalidSize { size: rect.size }.into());
    }
    let errors = grid.can_insert_image(rect, exclude, ignorable);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CommandRejected::placement(errors))
    }
}

/// An image being added or removed, shared by `AddImage` and `RemoveImage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageChange {
    /// The image content.
    pub image: ImageSnapshot,
}

impl ImageChange {
    pub(super) fn new(anchor: Coord, size: Size, url: String) -> Self {
        Self {
            image: ImageSnapshot { anchor, size, url },
        }
    }

    pub(super) fn existing(grid: &Grid, anchor: Coord) -> Result<Self, CommandRejected> {
        Ok(Self {
            image: existing_image(grid, anchor)?,
        })
    }

    pub(super) fn check_insert(&self, grid: &Grid) -> Result<(), CommandRejected> {
        check_geometry(grid, self.image.rect(), None, ErrorType::empty())
    }

    pub(super) fn check_remove(&self, grid: &Grid) -> Result<(), CommandRejected> {
        existing_image(grid, self.image.anchor).map(drop)
    }

    pub(super) fn insert(&self, grid: &mut Grid) -> Result<(), GridError> {
        let ImageSnapshot { anchor, size, url } = &self.image;
        grid.insert_image(*anchor, *size, url.as_str(), ErrorType::empty())
    }

    pub(super) fn remove(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.remove_image(self.image.anchor).map(drop)
    }

    pub(super) fn restore(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.restore_image(&self.image)
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.image(&self.image)
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self { image: r.image()? })
    }
}

/// Moves or resizes an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeImageGeometry {
    /// Anchor before the change.
    pub anchor: Coord,
    /// Size before the change.
    pub size: Size,
    /// Anchor after the change.
    pub new_anchor: Coord,
    /// Size after the change.
    pub new_size: Size,
}

impl ChangeImageGeometry {
    pub(super) fn new(
        grid: &Grid,
        anchor: Coord,
        new_anchor: Coord,
        new_size: Size,
    ) -> Result<Self, CommandRejected> {
        let image = existing_image(grid, anchor)?;
        Ok(Self {
            anchor,
            size: image.size,
            new_anchor,
            new_size,
        })
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        existing_image(grid, self.anchor)?;
        let rect = Rect::new(self.new_anchor, self.new_size);
        check_geometry(grid, rect, Some(self.anchor), ErrorType::POLICY)
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.change_image_geometry(self.anchor, self.new_anchor, self.new_size)
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.change_image_geometry(self.new_anchor, self.anchor, self.size)
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.coord(self.anchor);
        w.size(self.size);
        w.coord(self.new_anchor);
        w.size(self.new_size);
        Ok(())
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            anchor: r.coord()?,
            size: r.size()?,
            new_anchor: r.coord()?,
            new_size: r.size()?,
        })
    }
}

/// Changes the content location of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetImageUrl {
    /// Anchor of the image.
    pub anchor: Coord,
    /// Location before the change.
    pub old: String,
    /// Location after the change.
    pub new: String,
}

impl SetImageUrl {
    pub(super) fn new(grid: &Grid, anchor: Coord, new: String) -> Result<Self, CommandRejected> {
        let image = existing_image(grid, anchor)?;
        Ok(Self {
            anchor,
            old: image.url,
            new,
        })
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        existing_image(grid, self.anchor).map(drop)
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.set_image_url(self.anchor, self.new.as_str()).map(drop)
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.set_image_url(self.anchor, self.old.as_str()).map(drop)
    }

    pub(super) fn merge(&mut self, next: &Self) -> bool {
        if self.anchor != next.anchor {
            return false;
        }
        self.new.clone_from(&next.new);
        true
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.coord(self.anchor);
        w.text(&self.old)?;
        w.text(&self.new)
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            anchor: r.coord()?,
            old: r.text()?,
            new: r.text()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crossgrid_core::{AnswerOffset, CrosswordType, CrosswordTypeInfo, Orientation};
    use crossgrid_grid::testing::GridTester;

    use super::*;
    use crate::Command;

    #[test]
    fn test_add_image_record_layout() {
        let command = Command::add_image(Coord::new(2, 1), Size::new(3, 2), "a.png");
        let expected = [
            6, 2, 0, 1, 0, 3, 0, 2, 0, 5, 0, b'a', b'.', b'p', b'n', b'g',
        ];
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_remove_image_record_layout() {
        let tester = GridTester::free(4, 4).image(1, 0, 2, 2, "a.png");
        let command = Command::remove_image(tester.grid(), Coord::new(1, 0)).unwrap();
        let expected = [
            7, 1, 0, 0, 0, 2, 0, 2, 0, 5, 0, b'a', b'.', b'p', b'n', b'g',
        ];
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_change_image_geometry_record_layout() {
        let tester = GridTester::free(4, 4).image(1, 0, 2, 2, "a.png");
        let command = Command::change_image_geometry(
            tester.grid(),
            Coord::new(1, 0),
            Coord::new(0, 1),
            Size::new(3, 2),
        )
        .unwrap();
        let expected: Vec<u8> = [
            &[8][..],
            &[1, 0, 0, 0, 2, 0, 2, 0], // old anchor and size
            &[0, 0, 1, 0, 3, 0, 2, 0], // new anchor and size
        ]
        .concat();
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_set_image_url_record_layout() {
        let tester = GridTester::free(4, 4).image(1, 0, 2, 2, "a.png");
        let command = Command::set_image_url(tester.grid(), Coord::new(1, 0), "b.jpg").unwrap();
        let expected: Vec<u8> = [
            &[9][..],
            &[1, 0, 0, 0],
            &[5, 0, b'a', b'.', b'p', b'n', b'g'],
            &[5, 0, b'b', b'.', b'j', b'p', b'g'],
        ]
        .concat();
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_add_image_checks_placement() {
        let tester =
            GridTester::free(4, 4).clue(0, 0, Orientation::Horizontal, AnswerOffset::Right, "ABC");
        let overlapping = Command::add_image(Coord::new(1, 0), Size::new(2, 2), "x");
        let rejected = overlapping.check(tester.grid()).unwrap_err();
        assert_eq!(rejected.errors, ErrorType::IMAGE_CELLS_ARENT_EMPTY);

        let degenerate = Command::add_image(Coord::new(0, 2), Size::new(0, 2), "x");
        assert!(degenerate.check(tester.grid()).is_err());

        let american = GridTester::new(4, 4, CrosswordTypeInfo::preset(CrosswordType::American));
        let disallowed = Command::add_image(Coord::new(0, 0), Size::new(1, 1), "x");
        let rejected = disallowed.check(american.grid()).unwrap_err();
        assert_eq!(rejected.errors, ErrorType::IMAGE_CELLS_DISALLOWED);
    }

    #[test]
    fn test_remove_image_undo_restores_url() {
        let mut tester = GridTester::free(4, 4).image(1, 1, 2, 2, "pic.png");
        let before = tester.grid().content_string();
        let command = Command::remove_image(tester.grid(), Coord::new(1, 1)).unwrap();
        command.check(tester.grid()).unwrap();
        command.redo(tester.grid_mut()).unwrap();
        assert!(tester.grid().cells().all(|(_, cell)| cell.is_empty()));
        command.undo(tester.grid_mut()).unwrap();
        assert_eq!(tester.grid().content_string(), before);
        assert!(Command::remove_image(tester.grid(), Coord::new(0, 0)).is_err());
    }

    #[test]
    fn test_geometry_change_and_back() {
        let mut tester = GridTester::free(5, 5).image(0, 0, 2, 2, "pic.png");
        let before = tester.grid().content_string();
        let command = Command::change_image_geometry(
            tester.grid(),
            Coord::new(0, 0),
            Coord::new(1, 1),
            Size::new(3, 3),
        )
        .unwrap();
        command.check(tester.grid()).unwrap();
        command.redo(tester.grid_mut()).unwrap();
        tester.assert_rows(
            "
            .....
            .@~~.
            .~~~.
            .~~~.
            .....
            ",
        );
        command.undo(tester.grid_mut()).unwrap();
        assert_eq!(tester.grid().content_string(), before);
    }

    #[test]
    fn test_url_changes_merge_per_anchor() {
        let tester = GridTester::free(4, 4)
            .image(0, 0, 1, 1, "a")
            .image(2, 2, 1, 1, "b");
        let mut first = Command::set_image_url(tester.grid(), Coord::new(0, 0), "a2").unwrap();
        let second = Command::set_image_url(tester.grid(), Coord::new(0, 0), "a3").unwrap();
        let other = Command::set_image_url(tester.grid(), Coord::new(2, 2), "b2").unwrap();
        assert!(first.merge_with(&second));
        assert!(!first.merge_with(&other));
        assert_eq!(
            first,
            Command::SetImageUrl(SetImageUrl {
                anchor: Coord::new(0, 0),
                old: "a".to_owned(),
                new: "a3".to_owned(),
            })
        );
    }
}
