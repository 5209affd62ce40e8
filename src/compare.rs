//! Tabular result comparison.
//!
//! SQL leaves row order unspecified without `ORDER BY`, and identifier case
//! depends on the engine, so by default rows are compared as a sorted multiset
//! and text is case-folded.

use serde::Serialize;

use crate::engine::{QueryTable, SqlValue};

const CELL_SEPARATOR: char = '\u{1f}';
const MAX_REPORTED_MISMATCHES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompareOptions {
    pub ignore_row_order: bool,
    pub ignore_column_order: bool,
    pub case_sensitive: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            ignore_row_order: true,
            ignore_column_order: false,
            case_sensitive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowMismatch {
    pub index: usize,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub matches: bool,
    pub summary: String,
    pub mismatches: Vec<RowMismatch>,
}

impl Comparison {
    fn fail(summary: impl Into<String>) -> Self {
        Self {
            matches: false,
            summary: summary.into(),
            mismatches: Vec::new(),
        }
    }
}

/// Compare the final result set of each side.
pub fn compare_results(
    expected: &[QueryTable],
    actual: &[QueryTable],
    options: CompareOptions,
) -> Comparison {
    compare_tables(expected.last(), actual.last(), options)
}

pub fn compare_tables(
    expected: Option<&QueryTable>,
    actual: Option<&QueryTable>,
    options: CompareOptions,
) -> Comparison {
    let (Some(expected), Some(actual)) = (expected, actual) else {
        return Comparison::fail("No valid results to compare.");
    };

    if expected.columns.len() != actual.columns.len() {
        return Comparison::fail(format!(
            "Expected {} column{} but got {}.",
            expected.columns.len(),
            plural(expected.columns.len()),
            actual.columns.len()
        ));
    }

    let expected_cols = normalize_columns(&expected.columns, options);
    let actual_cols = normalize_columns(&actual.columns, options);

    let projection = if options.ignore_column_order {
        match project_columns(&expected_cols, &actual_cols) {
            Ok(p) => p,
            Err(summary) => return Comparison::fail(summary),
        }
    } else {
        if let Some(i) = expected_cols
            .iter()
            .zip(&actual_cols)
            .position(|(e, a)| e != a)
        {
            return Comparison::fail(format!(
                "Column {} should be '{}' but is '{}'.",
                i + 1,
                expected.columns[i],
                actual.columns[i]
            ));
        }
        (0..actual_cols.len()).collect()
    };

    if expected.values.len() != actual.values.len() {
        return Comparison::fail(format!(
            "Expected {} row{} but got {}.",
            expected.values.len(),
            plural(expected.values.len()),
            actual.values.len()
        ));
    }

    let identity: Vec<usize> = (0..expected_cols.len()).collect();
    let mut expected_rows: Vec<String> = expected
        .values
        .iter()
        .map(|row| normalize_row(row, &identity, options))
        .collect();
    let mut actual_rows: Vec<String> = actual
        .values
        .iter()
        .map(|row| normalize_row(row, &projection, options))
        .collect();

    if options.ignore_row_order {
        expected_rows.sort();
        actual_rows.sort();
    }

    let differing: Vec<usize> = expected_rows
        .iter()
        .zip(&actual_rows)
        .enumerate()
        .filter(|(_, (e, a))| e != a)
        .map(|(i, _)| i)
        .collect();

    if differing.is_empty() {
        return Comparison {
            matches: true,
            summary: format!(
                "Results match ({} row{}).",
                expected_rows.len(),
                plural(expected_rows.len())
            ),
            mismatches: Vec::new(),
        };
    }

    let mismatches = differing
        .iter()
        .take(MAX_REPORTED_MISMATCHES)
        .map(|&i| RowMismatch {
            index: i,
            expected: display_row(&expected_rows[i]),
            actual: display_row(&actual_rows[i]),
        })
        .collect();

    Comparison {
        matches: false,
        summary: format!(
            "{} of {} row{} differ.",
            differing.len(),
            expected_rows.len(),
            plural(expected_rows.len())
        ),
        mismatches,
    }
}

/// Canonical text for one cell.
pub fn normalize_value(value: &SqlValue, case_sensitive: bool) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Boolean(b) => b.to_string(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Real(f) if f.is_finite() => format_number(*f),
        SqlValue::Real(f) => fold(&f.to_string(), case_sensitive),
        SqlValue::Text(s) => fold(s, case_sensitive),
    }
}

// Integral reals print without a fractional part so 2 and 2.0 agree.
fn format_number(f: f64) -> String {
    if f == 0.0 {
        "0".to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

fn fold(s: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        s.to_string()
    } else {
        s.to_lowercase()
    }
}

fn normalize_columns(columns: &[String], options: CompareOptions) -> Vec<String> {
    columns
        .iter()
        .map(|c| fold(c.trim(), options.case_sensitive))
        .collect()
}

// For each expected column, the index of the matching actual column.
fn project_columns(expected: &[String], actual: &[String]) -> Result<Vec<usize>, String> {
    let missing: Vec<&str> = expected
        .iter()
        .filter(|c| !actual.contains(c))
        .map(String::as_str)
        .collect();
    let extra: Vec<&str> = actual
        .iter()
        .filter(|c| !expected.contains(c))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() || !extra.is_empty() {
        return Err(format!(
            "Column mismatch. Missing: [{}]. Unexpected: [{}].",
            missing.join(", "),
            extra.join(", ")
        ));
    }

    let mut used = vec![false; actual.len()];
    let mut projection = Vec::with_capacity(expected.len());
    for column in expected {
        let found = actual
            .iter()
            .enumerate()
            .position(|(j, a)| !used[j] && a == column)
            .ok_or_else(|| format!("Column '{}' appears a different number of times.", column))?;
        used[found] = true;
        projection.push(found);
    }

    Ok(projection)
}

fn normalize_row(row: &[SqlValue], projection: &[usize], options: CompareOptions) -> String {
    let mut out = String::new();
    for (n, &i) in projection.iter().enumerate() {
        if n > 0 {
            out.push(CELL_SEPARATOR);
        }
        match row.get(i) {
            Some(value) => out.push_str(&normalize_value(value, options.case_sensitive)),
            None => out.push_str("NULL"),
        }
    }
    out
}

fn display_row(row: &str) -> String {
    row.split(CELL_SEPARATOR).collect::<Vec<_>>().join(" | ")
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], values: Vec<Vec<SqlValue>>) -> QueryTable {
        QueryTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values,
        }
    }

    fn int(i: i64) -> SqlValue {
        SqlValue::Integer(i)
    }

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    mod structure_tests {
        use super::*;

        #[test]
        fn absent_side_fails() {
            let t = table(&["a"], vec![vec![int(1)]]);
            let result = compare_tables(None, Some(&t), CompareOptions::default());
            assert!(!result.matches);
            assert_eq!(result.summary, "No valid results to compare.");

            let result = compare_results(&[t], &[], CompareOptions::default());
            assert!(!result.matches);
        }

        #[test]
        fn column_count_mismatch() {
            let expected = table(&["a", "b"], vec![vec![int(1), int(2)]]);
            let actual = table(&["a"], vec![vec![int(1)]]);
            let result = compare_tables(Some(&expected), Some(&actual), CompareOptions::default());
            assert!(!result.matches);
            assert_eq!(result.summary, "Expected 2 columns but got 1.");
        }

        #[test]
        fn column_name_mismatch_reports_position() {
            let expected = table(&["a", "b"], vec![]);
            let actual = table(&["a", "c"], vec![]);
            let result = compare_tables(Some(&expected), Some(&actual), CompareOptions::default());
            assert_eq!(result.summary, "Column 2 should be 'b' but is 'c'.");
        }

        #[test]
        fn column_names_case_insensitive_by_default() {
            let expected = table(&["Country"], vec![vec![text("x")]]);
            let actual = table(&["COUNTRY"], vec![vec![text("x")]]);
            assert!(compare_tables(Some(&expected), Some(&actual), CompareOptions::default()).matches);
        }

        #[test]
        fn column_order_matters_by_default() {
            let expected = table(&["a", "b"], vec![vec![int(1), int(2)]]);
            let actual = table(&["b", "a"], vec![vec![int(2), int(1)]]);
            assert!(!compare_tables(Some(&expected), Some(&actual), CompareOptions::default()).matches);
        }

        #[test]
        fn ignored_column_order_reprojects_cells() {
            let expected = table(&["a", "b"], vec![vec![int(1), int(2)]]);
            let actual = table(&["b", "a"], vec![vec![int(2), int(1)]]);
            let options = CompareOptions {
                ignore_column_order: true,
                ..CompareOptions::default()
            };
            assert!(compare_tables(Some(&expected), Some(&actual), options).matches);
        }

        #[test]
        fn ignored_column_order_lists_missing_and_extra() {
            let expected = table(&["a", "b"], vec![]);
            let actual = table(&["a", "z"], vec![]);
            let options = CompareOptions {
                ignore_column_order: true,
                ..CompareOptions::default()
            };
            let result = compare_tables(Some(&expected), Some(&actual), options);
            assert_eq!(result.summary, "Column mismatch. Missing: [b]. Unexpected: [z].");
        }

        #[test]
        fn row_count_mismatch() {
            let expected = table(&["a"], vec![vec![int(1)], vec![int(2)]]);
            let actual = table(&["a"], vec![vec![int(1)]]);
            let result = compare_tables(Some(&expected), Some(&actual), CompareOptions::default());
            assert_eq!(result.summary, "Expected 2 rows but got 1.");
        }
    }

    mod row_tests {
        use super::*;

        #[test]
        fn row_order_ignored_by_default() {
            let expected = table(&["a"], vec![vec![int(1)], vec![int(2)]]);
            let actual = table(&["a"], vec![vec![int(2)], vec![int(1)]]);
            let result = compare_tables(Some(&expected), Some(&actual), CompareOptions::default());
            assert!(result.matches);
            assert_eq!(result.summary, "Results match (2 rows).");
        }

        #[test]
        fn row_order_respected_when_requested() {
            let expected = table(&["a"], vec![vec![int(1)], vec![int(2)]]);
            let actual = table(&["a"], vec![vec![int(2)], vec![int(1)]]);
            let options = CompareOptions {
                ignore_row_order: false,
                ..CompareOptions::default()
            };
            let result = compare_tables(Some(&expected), Some(&actual), options);
            assert!(!result.matches);
            assert_eq!(result.summary, "2 of 2 rows differ.");
            assert_eq!(result.mismatches[0].index, 0);
            assert_eq!(result.mismatches[0].expected, "1");
            assert_eq!(result.mismatches[0].actual, "2");
        }

        #[test]
        fn text_case_folded_by_default() {
            let expected = table(&["c"], vec![vec![text("Netherlands")]]);
            let actual = table(&["c"], vec![vec![text("NETHERLANDS")]]);
            assert!(compare_tables(Some(&expected), Some(&actual), CompareOptions::default()).matches);

            let strict = CompareOptions {
                case_sensitive: true,
                ..CompareOptions::default()
            };
            assert!(!compare_tables(Some(&expected), Some(&actual), strict).matches);
        }

        #[test]
        fn integral_real_equals_integer() {
            let expected = table(&["n"], vec![vec![int(2)]]);
            let actual = table(&["n"], vec![vec![SqlValue::Real(2.0)]]);
            assert!(compare_tables(Some(&expected), Some(&actual), CompareOptions::default()).matches);
        }

        #[test]
        fn null_differs_from_text_null_case() {
            let expected = table(&["n"], vec![vec![SqlValue::Null]]);
            let actual = table(&["n"], vec![vec![text("null")]]);
            assert!(!compare_tables(Some(&expected), Some(&actual), CompareOptions::default()).matches);
        }

        #[test]
        fn at_most_three_mismatches_reported() {
            let expected = table(&["a"], (1..=5).map(|i| vec![int(i)]).collect());
            let actual = table(&["a"], (11..=15).map(|i| vec![int(i)]).collect());
            let result = compare_tables(Some(&expected), Some(&actual), CompareOptions::default());
            assert!(!result.matches);
            assert_eq!(result.summary, "5 of 5 rows differ.");
            assert_eq!(result.mismatches.len(), 3);
        }

        #[test]
        fn multi_column_rows_display_with_bars() {
            let expected = table(&["a", "b"], vec![vec![int(1), text("x")]]);
            let actual = table(&["a", "b"], vec![vec![int(1), text("y")]]);
            let result = compare_tables(Some(&expected), Some(&actual), CompareOptions::default());
            assert_eq!(result.mismatches[0].expected, "1 | x");
            assert_eq!(result.mismatches[0].actual, "1 | y");
        }

        #[test]
        fn compare_results_uses_last_table() {
            let first = table(&["a"], vec![vec![int(9)]]);
            let last = table(&["a"], vec![vec![int(1)]]);
            let expected = vec![last.clone()];
            let actual = vec![first, last];
            assert!(compare_results(&expected, &actual, CompareOptions::default()).matches);
        }
    }

    mod value_tests {
        use super::*;

        #[test]
        fn numbers_render_like_plain_numbers() {
            assert_eq!(normalize_value(&SqlValue::Real(1.5), false), "1.5");
            assert_eq!(normalize_value(&SqlValue::Real(-0.0), false), "0");
            assert_eq!(normalize_value(&SqlValue::Real(60000.0), false), "60000");
            assert_eq!(normalize_value(&SqlValue::Integer(-3), false), "-3");
        }

        #[test]
        fn booleans_and_nulls() {
            assert_eq!(normalize_value(&SqlValue::Boolean(true), false), "true");
            assert_eq!(normalize_value(&SqlValue::Null, false), "NULL");
        }
    }
}
