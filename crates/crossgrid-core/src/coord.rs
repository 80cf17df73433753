//! Grid coordinates, sizes and rectangles.

use std::cmp::Ordering;

use crate::Orientation;

/// A cell coordinate on the grid.
///
/// Coordinates are ordered in reading order: first by row (`y`), then by
/// column (`x`). Clue numbering relies on this order.
///
/// # Examples
///
/// ```
/// use crossgrid_core::Coord;
///
/// assert!(Coord::new(4, 0) < Coord::new(0, 1));
/// assert_eq!(Coord::new(1, 1).offset(-1, 2), Some(Coord::new(0, 3)));
/// assert_eq!(Coord::new(0, 0).offset(-1, 0), None);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("({x}, {y})")]
pub struct Coord {
    /// Column, starting at `0` on the left.
    pub x: u16,
    /// Row, starting at `0` at the top.
    pub y: u16,
}

impl Coord {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Returns this coordinate displaced by `(dx, dy)`.
    ///
    /// Returns `None` if the result is not representable (negative or above
    /// `u16::MAX`). Grid bounds are not checked here.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = u16::try_from(i32::from(self.x) + dx).ok()?;
        let y = u16::try_from(i32::from(self.y) + dy).ok()?;
        Some(Self { x, y })
    }

    /// Returns the coordinate `n` cells further along `orientation`.
    #[must_use]
    pub fn step(self, orientation: Orientation, n: i32) -> Option<Self> {
        let (dx, dy) = orientation.step();
        self.offset(dx * n, dy * n)
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The extent of a grid or of a spanned cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{width}x{height}")]
pub struct Size {
    /// Number of columns.
    pub width: u16,
    /// Number of rows.
    pub height: u16,
}

impl Size {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Returns the number of cells covered.
    #[must_use]
    pub fn area(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Returns `true` if either dimension is zero.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A rectangle of coordinates anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{origin}+{size}")]
pub struct Rect {
    /// Top-left corner.
    pub origin: Coord,
    /// Extent.
    pub size: Size,
}

impl Rect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(origin: Coord, size: Size) -> Self {
        Self { origin, size }
    }

    /// Returns `true` if `coord` lies inside this rectangle.
    #[must_use]
    pub fn contains(self, coord: Coord) -> bool {
        let Self { origin, size } = self;
        coord.x >= origin.x
            && coord.y >= origin.y
            && u32::from(coord.x) < u32::from(origin.x) + u32::from(size.width)
            && u32::from(coord.y) < u32::from(origin.y) + u32::from(size.height)
    }

    /// Returns `true` if the whole rectangle lies inside a grid of `bounds`.
    #[must_use]
    pub fn fits_in(self, bounds: Size) -> bool {
        !self.size.is_degenerate()
            && u32::from(self.origin.x) + u32::from(self.size.width) <= u32::from(bounds.width)
            && u32::from(self.origin.y) + u32::from(self.size.height) <= u32::from(bounds.height)
    }

    /// Iterates over the covered coordinates in reading order.
    ///
    /// Coordinates that would exceed `u16::MAX` are skipped.
    pub fn coords(self) -> impl Iterator<Item = Coord> {
        let Self { origin, size } = self;
        (0..size.height).flat_map(move |dy| {
            (0..size.width).filter_map(move |dx| origin.offset(i32::from(dx), i32::from(dy)))
        })
    }
}
