//! Orientations, answer offsets and resize anchors.
//!
//! All three are small closed enums with a stable `u8` tag used by the
//! command log.

use crate::{Coord, Size};

/// The direction in which an answer is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[repr(u8)]
pub enum Orientation {
    /// Left to right.
    #[display("horizontal")]
    Horizontal = 0,
    /// Top to bottom.
    #[display("vertical")]
    Vertical = 1,
}

impl Orientation {
    /// Both orientations, horizontal first.
    pub const ALL: [Self; 2] = [Self::Horizontal, Self::Vertical];

    /// Returns the unit step `(dx, dy)` along this orientation.
    #[must_use]
    pub const fn step(self) -> (i32, i32) {
        match self {
            Self::Horizontal => (1, 0),
            Self::Vertical => (0, 1),
        }
    }

    /// Returns the other orientation.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Returns `0` for horizontal and `1` for vertical.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the wire tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parses a wire tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Horizontal),
            1 => Some(Self::Vertical),
            _ => None,
        }
    }
}

/// Where the first letter of an answer sits relative to its clue.
///
/// [`AnswerOffset::OnClueCell`] describes a hidden clue: the clue has no
/// marker cell and its coordinate is the first letter itself. Every other
/// value places a visible clue marker at the clue coordinate and the first
/// letter at the neighbouring cell in that compass direction.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display,
)]
#[repr(u8)]
pub enum AnswerOffset {
    /// The first letter is the clue coordinate.
    #[default]
    #[display("on clue cell")]
    OnClueCell = 0,
    /// The first letter is left of the clue cell.
    #[display("left")]
    Left = 1,
    /// The first letter is above and left of the clue cell.
    #[display("top left")]
    TopLeft = 2,
    /// The first letter is above the clue cell.
    #[display("top")]
    Top = 3,
    /// The first letter is above and right of the clue cell.
    #[display("top right")]
    TopRight = 4,
    /// The first letter is right of the clue cell.
    #[display("right")]
    Right = 5,
    /// The first letter is below and right of the clue cell.
    #[display("bottom right")]
    BottomRight = 6,
    /// The first letter is below the clue cell.
    #[display("bottom")]
    Bottom = 7,
    /// The first letter is below and left of the clue cell.
    #[display("bottom left")]
    BottomLeft = 8,
}

impl AnswerOffset {
    /// All nine offsets in tag order.
    pub const ALL: [Self; 9] = [
        Self::OnClueCell,
        Self::Left,
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
    ];

    /// Returns the displacement from the clue coordinate to the first letter.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::OnClueCell => (0, 0),
            Self::Left => (-1, 0),
            Self::TopLeft => (-1, -1),
            Self::Top => (0, -1),
            Self::TopRight => (1, -1),
            Self::Right => (1, 0),
            Self::BottomRight => (1, 1),
            Self::Bottom => (0, 1),
            Self::BottomLeft => (-1, 1),
        }
    }

    /// Returns `true` if the clue has no visible marker cell.
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::OnClueCell)
    }

    /// Returns the first letter coordinate for a clue at `clue`.
    #[must_use]
    pub fn apply(self, clue: Coord) -> Option<Coord> {
        let (dx, dy) = self.delta();
        clue.offset(dx, dy)
    }

    /// Returns the wire tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parses a wire tag.
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(usize::from(tag)).copied()
    }
}

/// The fixed point of a grid resize.
///
/// Content stays attached to the anchored edge (or centre) while the grid
/// grows or shrinks around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[repr(u8)]
pub enum Anchor {
    /// Keep the top-left corner.
    #[display("top-left")]
    TopLeft = 0,
    /// Keep the top edge, centred horizontally.
    #[display("top")]
    Top = 1,
    /// Keep the top-right corner.
    #[display("top-right")]
    TopRight = 2,
    /// Keep the left edge, centred vertically.
    #[display("left")]
    Left = 3,
    /// Keep the centre.
    #[display("center")]
    Center = 4,
    /// Keep the right edge, centred vertically.
    #[display("right")]
    Right = 5,
    /// Keep the bottom-left corner.
    #[display("bottom-left")]
    BottomLeft = 6,
    /// Keep the bottom edge, centred horizontally.
    #[display("bottom")]
    Bottom = 7,
    /// Keep the bottom-right corner.
    #[display("bottom-right")]
    BottomRight = 8,
}

impl Anchor {
    /// All nine anchors in tag order.
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Left,
        Self::Center,
        Self::Right,
        Self::BottomLeft,
        Self::Bottom,
        Self::BottomRight,
    ];

    /// Returns the displacement applied to every existing cell when the grid
    /// changes from `old` to `new`.
    ///
    /// Centred axes shift by half the size change, truncated toward zero, so
    /// resizing back with the same anchor is the exact inverse.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossgrid_core::{Anchor, Size};
    ///
    /// let grow = Anchor::Center.shift(Size::new(5, 5), Size::new(8, 8));
    /// let shrink = Anchor::Center.shift(Size::new(8, 8), Size::new(5, 5));
    /// assert_eq!(grow, (1, 1));
    /// assert_eq!(shrink, (-1, -1));
    /// ```
    #[must_use]
    pub fn shift(self, old: Size, new: Size) -> (i32, i32) {
        let dw = i32::from(new.width) - i32::from(old.width);
        let dh = i32::from(new.height) - i32::from(old.height);
        let column = self as u8 % 3;
        let row = self as u8 / 3;
        let axis = |edge: u8, d: i32| match edge {
            0 => 0,
            1 => d / 2,
            _ => d,
        };
        (axis(column, dw), axis(row, dh))
    }

    /// Returns the wire tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Parses a wire tag.
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(usize::from(tag)).copied()
    }
}
