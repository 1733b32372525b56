//! Marks extraction from a scored answer-sheet table.
//!
//! The sheet layout is fixed: Part A questions 1-10 in columns 0-2, Part B/C
//! questions 11-16 with sub-parts a/b in columns 3-11, and a totals row whose
//! first cell mentions "total". The largest table in the document is taken
//! to be the marks table.

mod cells;

pub use cells::{is_checkmark, number};

use std::collections::HashSet;

use tracing::{debug, info};

use crate::models::marks::{MarksTable, QuestionMark};
use crate::patterns::TOTAL_LABEL;
use cells::cell;

/// A table as a grid of cell strings.
pub type Grid = Vec<Vec<String>>;

const PART_A: std::ops::RangeInclusive<u32> = 1..=10;
const PART_BC: std::ops::RangeInclusive<u32> = 11..=16;
const SUB_PARTS: [&str; 2] = ["a", "b"];

// Part A columns
const A_QUESTION: usize = 0;
const A_ANSWERED: usize = 1;
const A_MARKS: usize = 2;

// Part B/C columns
const BC_QUESTION: usize = 3;
const BC_SUB_PART: usize = 4;
const BC_ANSWERED: [usize; 3] = [5, 7, 9];
const BC_PARTIAL_MARKS: [usize; 3] = [6, 8, 10];
const BC_TOTAL: usize = 11;

/// Extract marks from the largest of `tables`.
///
/// Never fails: no tables gives an empty result, and a row that does not fit
/// one section is simply not counted for it.
pub fn extract_marks(tables: &[Grid]) -> MarksTable {
    let mut result = MarksTable::default();

    let Some(grid) = largest(tables) else {
        debug!("no tables, marks left empty");
        return result;
    };

    let mut seen_bc: HashSet<String> = HashSet::new();

    for row in grid.iter().skip(1) {
        if let Some(mark) = part_a(row) {
            result.metadata.total_questions_part_a += 1;
            if mark.answered {
                result.metadata.answered_questions_part_a += 1;
            }
            result.part_a.push(mark);
        }

        if let Some(mark) = part_bc(row) {
            if seen_bc.insert(mark.q_no.clone()) {
                result.metadata.total_questions_part_bc += 1;
                if mark.answered {
                    result.metadata.answered_questions_part_bc += 1;
                }
                result.part_bc.push(mark);
            } else {
                debug!("duplicate Part B/C question {}, keeping first", mark.q_no);
            }
        }

        if is_totals_row(row) {
            if row.len() > A_MARKS {
                result.totals.part_a = number(cell(row, A_MARKS));
            }
            if row.len() > BC_TOTAL {
                result.totals.part_bc = number(cell(row, BC_TOTAL));
            }
        }
    }

    result.totals.grand_total = result
        .totals
        .part_a
        .unwrap_or(0)
        .saturating_add(result.totals.part_bc.unwrap_or(0));

    info!(
        "marks extracted: {} part A, {} part B/C, grand total {}",
        result.part_a.len(),
        result.part_bc.len(),
        result.totals.grand_total
    );
    result
}

/// First table with the most rows.
fn largest(tables: &[Grid]) -> Option<&Grid> {
    tables
        .iter()
        .fold(None, |best: Option<&Grid>, table| match best {
            Some(b) if b.len() >= table.len() => Some(b),
            _ => Some(table),
        })
}

fn part_a(row: &[String]) -> Option<QuestionMark> {
    let q_no = number(cell(row, A_QUESTION)).filter(|q| PART_A.contains(q))?;

    Some(QuestionMark {
        q_no: q_no.to_string(),
        marks: number(cell(row, A_MARKS)),
        answered: is_checkmark(cell(row, A_ANSWERED)),
    })
}

fn part_bc(row: &[String]) -> Option<QuestionMark> {
    let q_no = number(cell(row, BC_QUESTION)).filter(|q| PART_BC.contains(q))?;
    let sub_part = cell(row, BC_SUB_PART)?.trim().to_lowercase();
    if !SUB_PARTS.contains(&sub_part.as_str()) {
        return None;
    }

    let marks = number(cell(row, BC_TOTAL)).unwrap_or_else(|| {
        BC_PARTIAL_MARKS
            .iter()
            .filter_map(|&col| number(cell(row, col)))
            .fold(0u32, u32::saturating_add)
    });
    let answered = BC_ANSWERED.iter().any(|&col| is_checkmark(cell(row, col)));

    Some(QuestionMark {
        q_no: format!("{}{}", q_no, sub_part),
        marks: Some(marks),
        answered,
    })
}

fn is_totals_row(row: &[String]) -> bool {
    cell(row, 0).is_some_and(|label| TOTAL_LABEL.is_match(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn header() -> Vec<String> {
        row(&["Q", "Ans", "Marks", "Q", "Sub", "i", "m", "ii", "m", "iii", "m", "Total"])
    }

    #[test]
    fn test_no_tables() {
        let marks = extract_marks(&[]);
        assert_eq!(marks, MarksTable::default());
        assert_eq!(marks.totals.grand_total, 0);
    }

    #[test]
    fn test_sheet_end_to_end() {
        let grid = vec![
            header(),
            row(&["1", "✓", "5"]),
            row(&["", "", "", "11", "a", "✓", "3", "", "4", "", "3", "10"]),
            row(&["Total", "", "20", "", "", "", "", "", "", "", "", "15"]),
        ];
        let marks = extract_marks(&[grid]);

        assert_eq!(
            marks.part_a,
            vec![QuestionMark {
                q_no: "1".to_string(),
                marks: Some(5),
                answered: true
            }]
        );
        assert_eq!(
            marks.part_bc,
            vec![QuestionMark {
                q_no: "11a".to_string(),
                marks: Some(10),
                answered: true
            }]
        );
        assert_eq!(marks.totals.part_a, Some(20));
        assert_eq!(marks.totals.part_bc, Some(15));
        assert_eq!(marks.totals.grand_total, 35);
        assert_eq!(marks.metadata.total_questions_part_a, 1);
        assert_eq!(marks.metadata.answered_questions_part_bc, 1);
    }

    #[test]
    fn test_both_sections_on_one_row() {
        let grid = vec![
            header(),
            row(&["2", "", "0", "12", "B", "", "2", "", "1", "", "", ""]),
        ];
        let marks = extract_marks(&[grid]);

        assert_eq!(marks.part_a[0].q_no, "2");
        assert!(!marks.part_a[0].answered);
        assert_eq!(marks.part_bc[0].q_no, "12b");
        // no total column value: partial marks are summed
        assert_eq!(marks.part_bc[0].marks, Some(3));
        assert!(!marks.part_bc[0].answered);
    }

    #[test]
    fn test_duplicate_part_bc_keeps_first() {
        let grid = vec![
            header(),
            row(&["", "", "", "11", "a", "x", "", "", "", "", "", "7"]),
            row(&["", "", "", "11", "a", "", "", "", "", "", "", "2"]),
        ];
        let marks = extract_marks(&[grid]);

        assert_eq!(marks.part_bc.len(), 1);
        assert_eq!(marks.part_bc[0].marks, Some(7));
        assert!(marks.part_bc[0].answered);
        assert_eq!(marks.metadata.total_questions_part_bc, 1);
    }

    #[test]
    fn test_malformed_rows_do_not_stop_parsing() {
        let grid = vec![
            header(),
            row(&[]),
            row(&["11"]),
            row(&["abc", "✓"]),
            row(&["", "", "", "17", "a"]),
            row(&["", "", "", "13", "c", "✓"]),
            row(&["10", "SELECTED", "4"]),
        ];
        let marks = extract_marks(&[grid]);

        assert_eq!(marks.part_a.len(), 1);
        assert_eq!(marks.part_a[0].q_no, "10");
        assert!(marks.part_a[0].answered);
        assert!(marks.part_bc.is_empty());
    }

    #[test]
    fn test_largest_table_wins() {
        let small = vec![header(), row(&["1", "✓", "1"])];
        let large = vec![header(), row(&["3", "", "2"]), row(&["4", "", "6"])];
        let same_size = vec![header(), row(&["9", "", "9"]), row(&["8", "", "8"])];

        let marks = extract_marks(&[small, large, same_size]);
        let questions: Vec<_> = marks.part_a.iter().map(|m| m.q_no.as_str()).collect();
        assert_eq!(questions, vec!["3", "4"]);
    }

    #[test]
    fn test_huge_marks_saturate() {
        let grid = vec![
            header(),
            row(&["", "", "", "14", "a", "", "3000000000", "", "3000000000", "", "", ""]),
            row(&["Total", "", "3000000000", "", "", "", "", "", "", "", "", "3000000000"]),
        ];
        let marks = extract_marks(&[grid]);

        assert_eq!(marks.part_bc[0].marks, Some(u32::MAX));
        assert_eq!(marks.totals.part_a, Some(3_000_000_000));
        assert_eq!(marks.totals.grand_total, u32::MAX);
    }

    #[test]
    fn test_short_totals_row() {
        let grid = vec![header(), row(&["Grand TOTAL", "", "18"])];
        let marks = extract_marks(&[grid]);

        assert_eq!(marks.totals.part_a, Some(18));
        assert_eq!(marks.totals.part_bc, None);
        assert_eq!(marks.totals.grand_total, 18);
    }
}
