use crossgrid_core::{ClueId, Coord, Size};

/// A notification for observers of the grid.
///
/// Events are queued in the order the changes happen and handed out by
/// [`Grid::drain_events`](crate::Grid::drain_events). They name the affected
/// entities; they never own them.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum GridEvent {
    /// Clues were added.
    CluesAdded(Vec<ClueId>),
    /// Clues are about to be removed. Queued before the removal.
    CluesAboutToBeRemoved(Vec<ClueId>),
    /// The current cell changed.
    CurrentCellChanged {
        /// The previous current cell.
        previous: Option<Coord>,
        /// The new current cell.
        current: Option<Coord>,
    },
    /// The correct or typed letters of a clue's answer changed.
    AnswerChanged(ClueId),
    /// The grid was resized or its content moved; clue identities shifted by
    /// `shift`.
    Reshaped {
        /// The new grid size.
        size: Size,
        /// Displacement applied to all remaining content.
        shift: (i32, i32),
    },
}
