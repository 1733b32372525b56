//! Cell-level readers for marks grids.

use crate::patterns::NON_DIGIT;

/// Glyphs an examiner uses to tick an answered question.
const CHECKMARKS: [&str; 6] = ["✓", "/", "\\", "√", "×", "x"];

/// Token the table detector emits for a ticked selection box.
const SELECTED: &str = "SELECTED";

/// Cell at `col`, if the row is wide enough.
pub fn cell(row: &[String], col: usize) -> Option<&str> {
    row.get(col).map(String::as_str)
}

/// Number in a cell, read by dropping every non-digit character.
pub fn number(value: Option<&str>) -> Option<u32> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    let digits = NON_DIGIT.replace_all(value, "");
    digits.parse().ok()
}

/// True when the cell holds a tick or the selection token.
pub fn is_checkmark(value: Option<&str>) -> bool {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return false;
    };
    value.eq_ignore_ascii_case(SELECTED) || CHECKMARKS.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number() {
        assert_eq!(number(Some("12")), Some(12));
        assert_eq!(number(Some(" Q3. ")), Some(3));
        assert_eq!(number(Some("1 0")), Some(10));
        assert_eq!(number(Some("n/a")), None);
        assert_eq!(number(Some("")), None);
        assert_eq!(number(None), None);
    }

    #[test]
    fn test_checkmark() {
        for tick in ["✓", "√", "x", "×", "/", "\\", " selected ", "SELECTED"] {
            assert!(is_checkmark(Some(tick)), "{tick:?}");
        }
        for blank in ["", "X", "no", "NOT_SELECTED"] {
            assert!(!is_checkmark(Some(blank)), "{blank:?}");
        }
        assert!(!is_checkmark(None));
    }
}
