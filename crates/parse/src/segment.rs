use zapfin_core::Money;

use crate::date::strip_dates;
use crate::value::find_values;

re!(re_clause_break, r"(?i)\s+(?:e|depois|mais)\s+|\s*[,;]\s*");

/// One clause of a message that carries exactly one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub value: Money,
    /// The clause text the value was found in, for description cleanup.
    pub context: String,
}

/// Split a message on conjunctions and punctuation, keeping commas that sit
/// between two digits ("2.900,50") inside their number.
pub fn split_clauses(text: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut start = 0;
    for m in re_clause_break().find_iter(text) {
        if is_decimal_comma(text, m.start(), m.end()) {
            continue;
        }
        clauses.push(&text[start..m.start()]);
        start = m.end();
    }
    clauses.push(&text[start..]);

    clauses
        .into_iter()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Clauses that yield exactly one value; the rest are dropped.
pub fn segment(text: &str) -> Vec<Clause> {
    split_clauses(text)
        .into_iter()
        .filter_map(|clause| match find_values(&strip_dates(clause)).as_slice() {
            [only] => Some(Clause {
                value: only.value,
                context: clause.to_string(),
            }),
            _ => None,
        })
        .collect()
}

fn is_decimal_comma(text: &str, start: usize, end: usize) -> bool {
    end - start == 1
        && text[..start].chars().next_back().is_some_and(|c| c.is_ascii_digit())
        && text[end..].chars().next().is_some_and(|c| c.is_ascii_digit())
}
