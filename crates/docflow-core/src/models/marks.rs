//! Scored exam-sheet marks derived from a table grid.

use serde::{Deserialize, Serialize};

/// Marks recorded against one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMark {
    /// Question identifier: `"3"` for Part A, `"11a"` for Part B/C.
    #[serde(rename = "Q_No")]
    pub q_no: String,

    #[serde(rename = "Marks")]
    pub marks: Option<u32>,

    #[serde(rename = "Answered")]
    pub answered: bool,
}

/// Section totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarksTotals {
    #[serde(rename = "PartA_Total", skip_serializing_if = "Option::is_none")]
    pub part_a: Option<u32>,

    #[serde(rename = "PartBC_Total", skip_serializing_if = "Option::is_none")]
    pub part_bc: Option<u32>,

    #[serde(rename = "GrandTotal")]
    pub grand_total: u32,
}

/// Question counts per section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarksMetadata {
    pub total_questions_part_a: usize,
    pub answered_questions_part_a: usize,
    pub total_questions_part_bc: usize,
    pub answered_questions_part_bc: usize,
}

/// Full marks breakdown for one answer sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarksTable {
    #[serde(rename = "PartA")]
    pub part_a: Vec<QuestionMark>,

    #[serde(rename = "PartB_C")]
    pub part_bc: Vec<QuestionMark>,

    #[serde(rename = "Totals")]
    pub totals: MarksTotals,

    pub metadata: MarksMetadata,
}
