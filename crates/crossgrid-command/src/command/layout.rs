use crossgrid_core::{Anchor, CrosswordTypeInfo, ErrorType, Size};
use crossgrid_grid::{Grid, GridError, Property, RemovalPreview};

use super::{
    ChildBuilder, Command, check_with_children, read_children, redo_children, redo_with_children,
    undo_children, undo_with_children, write_children,
};
use crate::{
    CommandRejected, LogError,
    codec::{RecordReader, RecordWriter},
};

fn removal_children(
    grid: &Grid,
    preview: &RemovalPreview,
) -> Result<Vec<Command>, CommandRejected> {
    let mut builder = ChildBuilder::new(grid);
    for &id in &preview.clues {
        builder.push(|g| Command::remove_clue(g, id))?;
    }
    for &anchor in &preview.images {
        builder.push(|g| Command::remove_image(g, anchor))?;
    }
    Ok(builder.finish())
}

fn nothing_removed(preview: &RemovalPreview) -> Result<(), CommandRejected> {
    if preview.is_empty() {
        Ok(())
    } else {
        Err(CommandRejected {
            errors: ErrorType::empty(),
            reason: format!(
                "the change would remove {} clue(s) and {} image(s) it does not account for",
                preview.clues.len(),
                preview.images.len()
            ),
        })
    }
}

/// A labelled group of commands applied as one undo step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    label: String,
    children: Vec<Command>,
}

impl Compound {
    pub(super) fn new(label: impl Into<String>, children: Vec<Command>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    /// Returns the menu label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the grouped commands in application order.
    #[must_use]
    pub fn children(&self) -> &[Command] {
        &self.children
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        check_with_children(&self.children, grid, |_| Ok(()))
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        redo_children(&self.children, grid)
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        undo_children(&self.children, grid)
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        write_children(w, &self.children)?;
        w.text(&self.label)
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        let children = read_children(r)?;
        Ok(Self {
            label: r.text()?,
            children,
        })
    }
}

/// Changes the grid size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeGrid {
    /// Removals of content that would not fit.
    pub children: Vec<Command>,
    /// Size before the change.
    pub old: Size,
    /// Size after the change.
    pub new: Size,
    /// The edge or corner content stays attached to.
    pub anchor: Anchor,
}

impl ResizeGrid {
    pub(super) fn new(grid: &Grid, new: Size, anchor: Anchor) -> Result<Self, CommandRejected> {
        let preview = grid.simulate_resize(new, anchor)?;
        Ok(Self {
            children: removal_children(grid, &preview)?,
            old: grid.size(),
            new,
            anchor,
        })
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        check_with_children(&self.children, grid, |grid| {
            if grid.size() != self.old {
                return Err(CommandRejected {
                    errors: ErrorType::empty(),
                    reason: format!("the grid is {}, not {}", grid.size(), self.old),
                });
            }
            nothing_removed(&grid.simulate_resize(self.new, self.anchor)?)
        })
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        redo_with_children(&self.children, grid, |grid| {
            grid.resize(self.new, self.anchor).map(drop)
        })
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        undo_with_children(&self.children, grid, |grid| {
            grid.resize(self.old, self.anchor).map(drop)
        })
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        write_children(w, &self.children)?;
        w.size(self.old);
        w.size(self.new);
        w.u8(self.anchor.tag());
        Ok(())
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            children: read_children(r)?,
            old: r.size()?,
            new: r.size()?,
            anchor: r.anchor()?,
        })
    }
}

/// Moves all content inside the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveGrid {
    /// Removals of content that would leave the grid.
    pub children: Vec<Command>,
    /// Column displacement.
    pub dx: i16,
    /// Row displacement.
    pub dy: i16,
}

impl MoveGrid {
    pub(super) fn new(grid: &Grid, dx: i16, dy: i16) -> Result<Self, CommandRejected> {
        let preview = grid.simulate_translate(dx.into(), dy.into());
        Ok(Self {
            children: removal_children(grid, &preview)?,
            dx,
            dy,
        })
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        check_with_children(&self.children, grid, |grid| {
            nothing_removed(&grid.simulate_translate(self.dx.into(), self.dy.into()))
        })
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        redo_with_children(&self.children, grid, |grid| {
            grid.translate(self.dx.into(), self.dy.into());
            Ok(())
        })
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        undo_with_children(&self.children, grid, |grid| {
            grid.translate(-i32::from(self.dx), -i32::from(self.dy));
            Ok(())
        })
    }

    /// Accumulates consecutive moves that removed nothing.
    pub(super) fn merge(&mut self, next: &Self) -> bool {
        if !self.children.is_empty() || !next.children.is_empty() {
            return false;
        }
        let (Some(dx), Some(dy)) = (self.dx.checked_add(next.dx), self.dy.checked_add(next.dy))
        else {
            return false;
        };
        self.dx = dx;
        self.dy = dy;
        true
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        write_children(w, &self.children)?;
        w.i16(self.dx);
        w.i16(self.dy);
        Ok(())
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            children: read_children(r)?,
            dx: r.i16()?,
            dy: r.i16()?,
        })
    }
}

/// Switches the crossword type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCrosswordType {
    /// Removals of content the new type does not allow.
    pub children: Vec<Command>,
    /// Rules before the change.
    pub old: CrosswordTypeInfo,
    /// Rules after the change.
    pub new: CrosswordTypeInfo,
}

impl SetCrosswordType {
    pub(super) fn new(grid: &Grid, new: CrosswordTypeInfo) -> Result<Self, CommandRejected> {
        let violations = grid.type_violations(&new);
        let mut builder = ChildBuilder::new(grid);
        for &coord in &violations.solution_letters {
            builder.push(|g| Command::remove_solution_letter(g, coord))?;
        }
        for &anchor in &violations.images {
            builder.push(|g| Command::remove_image(g, anchor))?;
        }
        for &id in &violations.clues {
            builder.push(|g| Command::remove_clue(g, id))?;
        }
        Ok(Self {
            children: builder.finish(),
            old: *grid.type_info(),
            new,
        })
    }

    pub(super) fn check(&self, grid: &Grid) -> Result<(), CommandRejected> {
        check_with_children(&self.children, grid, |grid| {
            let violations = grid.type_violations(&self.new);
            if violations.is_empty() {
                Ok(())
            } else {
                Err(CommandRejected {
                    errors: ErrorType::empty(),
                    reason: format!(
                        "content does not conform to the {} crossword type",
                        self.new.crossword_type
                    ),
                })
            }
        })
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        redo_with_children(&self.children, grid, |grid| {
            grid.set_type_info(self.new);
            Ok(())
        })
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        undo_with_children(&self.children, grid, |grid| {
            grid.set_type_info(self.old);
            Ok(())
        })
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        write_children(w, &self.children)?;
        w.type_info(&self.old);
        w.type_info(&self.new);
        Ok(())
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            children: read_children(r)?,
            old: r.type_info()?,
            new: r.type_info()?,
        })
    }
}

/// Replaces a metadata field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetProperty {
    /// The edited field.
    pub property: Property,
    /// Text before the edit.
    pub old: String,
    /// Text after the edit.
    pub new: String,
}

impl SetProperty {
    pub(super) fn new(grid: &Grid, property: Property, new: String) -> Self {
        Self {
            property,
            old: grid.metadata().get(property).to_owned(),
            new,
        }
    }

    pub(super) fn redo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.set_property(self.property, self.new.as_str());
        Ok(())
    }

    pub(super) fn undo(&self, grid: &mut Grid) -> Result<(), GridError> {
        grid.set_property(self.property, self.old.as_str());
        Ok(())
    }

    pub(super) fn merge(&mut self, next: &Self) -> bool {
        if self.property != next.property {
            return false;
        }
        self.new.clone_from(&next.new);
        true
    }

    pub(super) fn write(&self, w: &mut RecordWriter<'_>) -> Result<(), LogError> {
        w.u8(self.property.tag());
        w.text(&self.old)?;
        w.text(&self.new)
    }

    pub(super) fn read(r: &mut RecordReader<'_>) -> Result<Self, LogError> {
        Ok(Self {
            property: r.property()?,
            old: r.text()?,
            new: r.text()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crossgrid_core::{AnswerOffset, ClueId, Coord, CrosswordType, Orientation};
    use crossgrid_grid::{GridEvent, testing::GridTester};

    use super::*;
    use crate::CommandKind;

    const H: Orientation = Orientation::Horizontal;
    const V: Orientation = Orientation::Vertical;

    fn apply(grid: &mut Grid, command: &Command) {
        command.check(grid).unwrap();
        command.redo(grid).unwrap();
    }

    #[test]
    fn test_move_grid_record_layout() {
        let grid = GridTester::free(3, 3).into_grid();
        let command = Command::move_grid(&grid, -1, 2).unwrap();
        let expected = [17, 0, 0, 0xff, 0xff, 2, 0];
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_compound_record_layout() {
        let command = Command::compound(
            "Group",
            vec![Command::add_solution_letter(Coord::new(2, 0), 1)],
        );
        let expected: Vec<u8> = [
            &[1][..],
            &[1, 0],                               // child count
            &[14, 2, 0, 0, 0, 1, 0],               // child record
            &[5, 0, b'G', b'r', b'o', b'u', b'p'],
        ]
        .concat();
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_resize_grid_record_layout() {
        let tester = GridTester::free(5, 5).clue(4, 0, V, AnswerOffset::OnClueCell, "AB");
        let command =
            Command::resize_grid(tester.grid(), Size::new(3, 3), Anchor::TopLeft).unwrap();
        let expected: Vec<u8> = [
            &[16][..],
            &[1, 0],                                  // child count
            &[3, 4, 0, 0, 0, 1, 0, 2, 0, b'A', b'B'], // removed clue
            &[0, 0, 2, 0, 0, 0, 0, 0, 0, 0],          // text, two empty letters
            &[5, 0, 5, 0],                            // old size
            &[3, 0, 3, 0],                            // new size
            &[0],                                     // anchor
        ]
        .concat();
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_set_crossword_type_record_layout() {
        let grid = GridTester::free(3, 3).into_grid();
        let american = CrosswordTypeInfo::preset(CrosswordType::American);
        let command = Command::set_crossword_type(&grid, american).unwrap();
        let expected = [
            18, 0, 0, // no children
            2, 2, 1, 0x1f, 1, 0, // free
            0, 0, 2, 0x03, 3, 1, // american
        ];
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_set_property_record_layout() {
        let grid = GridTester::free(3, 3).into_grid();
        let command = Command::set_property(&grid, Property::Title, "Sun");
        let expected = [19, 0, 0, 0, 3, 0, b'S', b'u', b'n'];
        assert_eq!(command.encode().unwrap(), expected);
        assert_eq!(Command::decode(&expected).unwrap(), command);
    }

    #[test]
    fn test_shrinking_removes_clues_through_children() {
        let mut tester = GridTester::free(5, 5)
            .clue(0, 0, H, AnswerOffset::Right, "AB")
            .clue(4, 0, V, AnswerOffset::Bottom, "XYZ")
            .image(0, 3, 2, 2, "pic");
        let before = tester.grid().content_string();

        let command =
            Command::resize_grid(tester.grid(), Size::new(3, 3), Anchor::TopLeft).unwrap();
        let kinds: Vec<_> = command.children().iter().map(Command::kind).collect();
        assert_eq!(kinds, [CommandKind::RemoveClue, CommandKind::RemoveImage]);

        apply(tester.grid_mut(), &command);
        tester.assert_rows(
            "
            >AB
            ...
            ...
            ",
        );
        command.undo(tester.grid_mut()).unwrap();
        assert_eq!(tester.grid().content_string(), before);
    }

    fn clue_removals(grid: &mut Grid) -> Vec<GridEvent> {
        grid.drain_events()
            .into_iter()
            .filter(GridEvent::is_clues_about_to_be_removed)
            .collect()
    }

    #[test]
    fn test_resize_announces_removed_clues_once() {
        let mut tester = GridTester::free(5, 5)
            .clue(4, 0, V, AnswerOffset::OnClueCell, "AB")
            .clue(0, 4, H, AnswerOffset::OnClueCell, "CD");
        let command =
            Command::resize_grid(tester.grid(), Size::new(3, 3), Anchor::TopLeft).unwrap();
        assert_eq!(command.children().len(), 2);
        tester.grid_mut().drain_events();

        apply(tester.grid_mut(), &command);
        assert_eq!(
            clue_removals(tester.grid_mut()),
            vec![GridEvent::CluesAboutToBeRemoved(vec![
                ClueId::new(Coord::new(4, 0), V),
                ClueId::new(Coord::new(0, 4), H),
            ])]
        );
        assert_eq!(tester.grid().clue_count(), 0);

        command.undo(tester.grid_mut()).unwrap();
        assert_eq!(tester.grid().clue_count(), 2);
    }

    #[test]
    fn test_resize_check_detects_stale_children() {
        let tester = GridTester::free(5, 5);
        let command =
            Command::resize_grid(tester.grid(), Size::new(3, 3), Anchor::TopLeft).unwrap();
        assert!(command.children().is_empty());

        // The same command against a grid that gained content meanwhile.
        let changed = GridTester::free(5, 5).clue(4, 0, V, AnswerOffset::Bottom, "XYZ");
        assert!(command.check(changed.grid()).is_err());
        assert!(Command::resize_grid(tester.grid(), Size::new(0, 3), Anchor::Center).is_err());
    }

    #[test]
    fn test_move_grid_merges_plain_moves() {
        let tester = GridTester::free(6, 6).clue(2, 2, H, AnswerOffset::OnClueCell, "AB");
        let mut first = Command::move_grid(tester.grid(), 1, 0).unwrap();
        let second = Command::move_grid(tester.grid(), 1, -1).unwrap();
        assert!(first.merge_with(&second));
        assert_eq!(
            first,
            Command::MoveGrid(MoveGrid {
                children: Vec::new(),
                dx: 2,
                dy: -1,
            })
        );

        let destructive = Command::move_grid(tester.grid(), 5, 0).unwrap();
        assert_eq!(destructive.children().len(), 1);
        assert!(!first.merge_with(&destructive));

        let mut far = Command::MoveGrid(MoveGrid {
            children: Vec::new(),
            dx: i16::MAX,
            dy: 0,
        });
        assert!(!far.merge_with(&second));
    }

    #[test]
    fn test_move_grid_undo() {
        let mut tester = GridTester::free(5, 5)
            .clue(0, 0, H, AnswerOffset::Right, "AB")
            .clue(2, 2, V, AnswerOffset::OnClueCell, "XYZ");
        let before = tester.grid().content_string();
        let command = Command::move_grid(tester.grid(), 0, 2).unwrap();
        assert_eq!(command.children().len(), 1);
        apply(tester.grid_mut(), &command);
        assert!(tester.grid().clue(ClueId::new(Coord::new(0, 2), H)).is_some());
        command.undo(tester.grid_mut()).unwrap();
        assert_eq!(tester.grid().content_string(), before);
    }

    #[test]
    fn test_switching_type_removes_violations() {
        let mut tester = GridTester::free(6, 6)
            .clue(0, 0, H, AnswerOffset::OnClueCell, "ABC")
            .clue(0, 2, H, AnswerOffset::OnClueCell, "AB")
            .image(4, 4, 2, 2, "pic")
            .solution_letter(1, 0, 0);
        let before = tester.grid().content_string();
        let american = CrosswordTypeInfo::preset(CrosswordType::American);

        let command = Command::set_crossword_type(tester.grid(), american).unwrap();
        let kinds: Vec<_> = command.children().iter().map(Command::kind).collect();
        assert_eq!(kinds, [CommandKind::RemoveImage, CommandKind::RemoveClue]);
        apply(tester.grid_mut(), &command);
        assert_eq!(tester.grid().type_info(), &american);
        assert!(tester.grid().type_violations(&american).is_empty());

        command.undo(tester.grid_mut()).unwrap();
        assert_eq!(tester.grid().type_info().crossword_type, CrosswordType::Free);
        assert_eq!(tester.grid().content_string(), before);
    }

    #[test]
    fn test_switching_type_announces_removed_clues_once() {
        let mut tester = GridTester::free(6, 6)
            .clue(0, 0, H, AnswerOffset::OnClueCell, "AB")
            .clue(0, 2, H, AnswerOffset::OnClueCell, "CD")
            .clue(0, 4, H, AnswerOffset::OnClueCell, "EFG");
        let american = CrosswordTypeInfo::preset(CrosswordType::American);
        let command = Command::set_crossword_type(tester.grid(), american).unwrap();
        tester.grid_mut().drain_events();

        apply(tester.grid_mut(), &command);
        assert_eq!(
            clue_removals(tester.grid_mut()),
            vec![GridEvent::CluesAboutToBeRemoved(vec![
                ClueId::new(Coord::new(0, 0), H),
                ClueId::new(Coord::new(0, 2), H),
            ])]
        );
        assert_eq!(tester.grid().clue_count(), 1);
    }

    #[test]
    fn test_property_edits_merge() {
        let mut grid = GridTester::free(3, 3).into_grid();
        let mut first = Command::set_property(&grid, Property::Title, "Sun");
        first.redo(&mut grid).unwrap();
        let second = Command::set_property(&grid, Property::Title, "Sunday");
        second.redo(&mut grid).unwrap();
        let author = Command::set_property(&grid, Property::Author, "Ann");
        assert!(first.merge_with(&second));
        assert!(!first.merge_with(&author));
        first.undo(&mut grid).unwrap();
        assert_eq!(grid.metadata().title, "");
    }

    #[test]
    fn test_compound_applies_in_order_and_rolls_back() {
        let mut grid = GridTester::free(4, 4).into_grid();
        let props = |y: u16, answer: &str| {
            crossgrid_grid::ClueProperties::new(Coord::new(0, y), H, AnswerOffset::Right, answer)
        };
        let group = Command::compound(
            "Add two",
            vec![
                Command::add_clue(props(0, "ABC"), "", ErrorType::empty()),
                Command::add_clue(props(1, "XYZ"), "", ErrorType::empty()),
            ],
        );
        assert_eq!(group.text(), "Add two");
        apply(&mut grid, &group);
        assert_eq!(grid.clue_count(), 2);
        group.undo(&mut grid).unwrap();
        assert_eq!(grid.clue_count(), 0);

        // The second child overlaps the first, so the group is rejected as a whole.
        let clash = Command::compound(
            "Clash",
            vec![
                Command::add_clue(props(0, "ABC"), "", ErrorType::empty()),
                Command::add_clue(props(0, "XYZ"), "", ErrorType::empty()),
            ],
        );
        assert!(clash.check(&grid).is_err());
        assert!(clash.redo(&mut grid).is_err());
        assert_eq!(grid.clue_count(), 0);
    }
}
