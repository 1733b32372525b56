//! Shared regex patterns.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Outermost object in model output: first '{' through last '}'
    pub static ref JSON_OBJECT: Regex = Regex::new(r"\{[\s\S]*\}").unwrap();

    // Outermost array: first '[' through last ']'
    pub static ref JSON_ARRAY: Regex = Regex::new(r"\[[\s\S]*\]").unwrap();

    // Anything that is not an ASCII digit
    pub static ref NON_DIGIT: Regex = Regex::new(r"[^0-9]").unwrap();

    // Totals row label
    pub static ref TOTAL_LABEL: Regex = Regex::new(r"(?i)total").unwrap();

    // Markdown code fence line, e.g. ```json
    pub static ref CODE_FENCE: Regex = Regex::new(r"(?m)^\s*```[A-Za-z0-9_-]*\s*$").unwrap();
}
