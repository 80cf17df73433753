use crossgrid_core::{
    Cell, CellKinds, ClueCellHandling, ClueId, Coord, CrosswordTypeInfo, Orientation,
};
use log::info;

use crate::Grid;

/// Content that does not conform to a crossword type.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TypeViolations {
    /// Clues breaking the answer or clue cell rules.
    pub clues: Vec<ClueId>,
    /// Anchors of images, if images are not allowed.
    pub images: Vec<Coord>,
    /// Solution letters, if solution letters are not allowed.
    pub solution_letters: Vec<Coord>,
}

impl TypeViolations {
    /// Returns `true` if the grid conforms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clues.is_empty() && self.images.is_empty() && self.solution_letters.is_empty()
    }
}

impl Grid {
    /// Lists the content that would violate `info`.
    ///
    /// Where double clue cells are disallowed, the vertical clue of every
    /// double clue cell is reported.
    #[must_use]
    pub fn type_violations(&self, info: &CrosswordTypeInfo) -> TypeViolations {
        let mut violations = TypeViolations::default();
        for clue in self.clues.values() {
            let answer = self.answer_text(clue.id).unwrap_or_default();
            let len = answer.chars().count();
            let hidden = clue.offset.is_hidden();
            let bad_answer = len < usize::from(info.min_answer_length)
                || answer.chars().any(|c| !info.letter_content.accepts(c));
            let bad_handling = match info.clue_cell_handling {
                ClueCellHandling::Required => hidden,
                ClueCellHandling::Disallowed => !hidden,
                ClueCellHandling::Allowed => !hidden && !info.allows(CellKinds::CLUE),
            };
            let bad_double = clue.id.orientation == Orientation::Vertical
                && !info.allows(CellKinds::DOUBLE_CLUE)
                && clue
                    .marker()
                    .and_then(|c| self.cell(c))
                    .is_some_and(Cell::is_double_clue);
            if bad_answer || bad_handling || bad_double {
                violations.clues.push(clue.id);
            }
        }
        for (coord, cell) in self.cells() {
            match cell {
                Cell::Image(_) if !info.allows(CellKinds::IMAGE) => {
                    violations.images.push(coord);
                }
                Cell::SolutionLetter { .. } if !info.allows(CellKinds::SOLUTION_LETTER) => {
                    violations.solution_letters.push(coord);
                }
                _ => {}
            }
        }
        violations
    }

    /// Replaces the crossword type rules and returns the previous ones.
    ///
    /// Existing content is not checked; use [`Grid::type_violations`] to
    /// find and remove non-conforming content first.
    pub fn set_type_info(&mut self, info: CrosswordTypeInfo) -> CrosswordTypeInfo {
        info!(
            "crossword type {} -> {}",
            self.type_info.crossword_type, info.crossword_type
        );
        std::mem::replace(&mut self.type_info, info)
    }
}

#[cfg(test)]
mod tests {
    use crossgrid_core::{AnswerOffset, CrosswordType};

    use super::*;
    use crate::testing::GridTester;

    const H: Orientation = Orientation::Horizontal;
    const V: Orientation = Orientation::Vertical;

    #[test]
    fn test_free_to_american() {
        let tester = GridTester::free(6, 6)
            .clue(0, 0, H, AnswerOffset::OnClueCell, "ABC")
            .clue(0, 2, H, AnswerOffset::OnClueCell, "AB")
            .clue(0, 4, H, AnswerOffset::Right, "XYZ")
            .clue(5, 0, V, AnswerOffset::OnClueCell, "A1B")
            .image(4, 4, 2, 2, "x")
            .solution_letter(1, 0, 0);
        let violations = tester
            .grid()
            .type_violations(&CrosswordTypeInfo::preset(CrosswordType::American));
        assert_eq!(
            violations.clues,
            vec![
                ClueId::new(Coord::new(5, 0), V),
                ClueId::new(Coord::new(0, 2), H),
                ClueId::new(Coord::new(0, 4), H),
            ]
        );
        assert_eq!(violations.images, vec![Coord::new(4, 4)]);
        assert!(violations.solution_letters.is_empty());
    }

    #[test]
    fn test_double_clues_report_vertical_facet() {
        let tester = GridTester::free(4, 4)
            .clue(0, 0, H, AnswerOffset::Right, "ABC")
            .clue(0, 0, V, AnswerOffset::Bottom, "XYZ");
        let info = CrosswordTypeInfo::preset(CrosswordType::Free)
            .with_allowed_cells(CellKinds::all().difference(CellKinds::DOUBLE_CLUE));
        let violations = tester.grid().type_violations(&info);
        assert_eq!(violations.clues, vec![ClueId::new(Coord::new(0, 0), V)]);
    }

    #[test]
    fn test_set_type_info_returns_previous() {
        let mut grid = GridTester::free(3, 3).into_grid();
        let swedish = CrosswordTypeInfo::preset(CrosswordType::Swedish);
        let old = grid.set_type_info(swedish);
        assert_eq!(old.crossword_type, CrosswordType::Free);
        assert_eq!(grid.type_info(), &swedish);
        assert!(grid.type_violations(&swedish).is_empty());
    }
}
