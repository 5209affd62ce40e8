//! Exercise descriptors.
//!
//! Every skill with exercises has one statically registered
//! [`ExerciseDescriptor`]: a generator that draws a random [`ExerciseState`],
//! a describer that turns it into a task text, and a validator that judges a
//! submission against it. The lifecycle looks descriptors up by skill id in
//! [`CATALOG`].

mod aggregating;
mod exploring;
mod filtering;
mod joining;
mod modifying;
mod selecting;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::compare::{self, CompareOptions};
use crate::engine::{QueryTable, SqlValue};
use crate::error::ValidationError;
use crate::random::RandomSource;

pub const EXPECTED_QUERY: &str = "expectedQuery";
pub const EXPECTED_VALUES: &str = "expectedValues";

/// Generator-defined parameters of one exercise. Always a JSON object so it
/// survives persistence unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseState(Map<String, Value>);

impl ExerciseState {
    pub fn new(id: &str) -> Self {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::from(id));
        Self(map)
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn with_query(self, query: impl Into<String>) -> Self {
        self.with(EXPECTED_QUERY, query.into())
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn require_str(&self, key: &'static str) -> Result<&str, ValidationError> {
        self.get_str(key).ok_or(ValidationError::MissingField(key))
    }

    pub fn expected_query(&self) -> Option<&str> {
        self.get_str(EXPECTED_QUERY)
    }

    /// Substitute `{{field}}` placeholders. Unknown fields are left as written.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };

            let key = after[..end].trim();
            match self.0.get(key) {
                Some(Value::String(s)) => out.push_str(s),
                Some(Value::Array(items)) => {
                    let parts: Vec<String> = items.iter().map(plain_text).collect();
                    out.push_str(&parts.join(", "));
                }
                Some(other) => out.push_str(&plain_text(other)),
                None => out.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }

        out.push_str(rest);
        out
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// What the lifecycle has to run before calling the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Check {
    /// Compare the submitted text with the expected query.
    Text,
    /// Run the submission and look for the expected values.
    Values,
    /// Run both the submission and the expected query and compare results.
    Results,
}

/// Query results gathered for a submission.
#[derive(Debug, Clone, Default)]
pub struct QueryEvidence {
    pub actual: Vec<QueryTable>,
    pub expected: Vec<QueryTable>,
}

pub type Generator = fn(&mut dyn RandomSource) -> ExerciseState;
pub type Describer = fn(&ExerciseState) -> String;
pub type Validator =
    fn(&str, &ExerciseState, Option<&QueryEvidence>) -> Result<bool, ValidationError>;

#[derive(Debug)]
pub struct ExerciseDescriptor {
    pub skill_id: &'static str,
    /// Bump whenever generator or validator semantics change; stored
    /// exercises from an older version are regenerated.
    pub version: u32,
    pub check: Check,
    pub hints: &'static [&'static str],
    pub solution_template: &'static str,
    pub generator: Generator,
    pub describer: Describer,
    pub validator: Validator,
}

impl ExerciseDescriptor {
    pub fn generate(&self, rng: &mut dyn RandomSource) -> ExerciseState {
        (self.generator)(rng)
    }

    pub fn describe(&self, state: &ExerciseState) -> String {
        (self.describer)(state)
    }

    pub fn validate(
        &self,
        input: &str,
        state: &ExerciseState,
        evidence: Option<&QueryEvidence>,
    ) -> Result<bool, ValidationError> {
        (self.validator)(input, state, evidence)
    }

    pub fn solution(&self, state: &ExerciseState) -> String {
        state.render(self.solution_template)
    }
}

pub static CATALOG: &[ExerciseDescriptor] = &[
    selecting::CHOOSE_COLUMNS,
    filtering::FILTER_ROWS,
    filtering::FILTER_ON_MULTIPLE_CRITERIA,
    selecting::SORT_ROWS,
    selecting::CREATE_PROCESSED_COLUMNS,
    filtering::WRITE_SINGLE_CRITERION_QUERY,
    filtering::WRITE_MULTI_CRITERION_QUERY,
    joining::JOIN_TABLES,
    aggregating::AGGREGATE_COLUMNS,
    aggregating::USE_FILTERED_AGGREGATION,
    aggregating::USE_DYNAMIC_AGGREGATION,
    modifying::INSERT_ROWS,
    modifying::UPDATE_ROWS,
    modifying::DELETE_ROWS,
    exploring::EXPLORE_DATA,
];

pub fn descriptor(skill_id: &str) -> Option<&'static ExerciseDescriptor> {
    CATALOG.iter().find(|d| d.skill_id == skill_id)
}

// Characters whose surrounding spaces carry no meaning for the comparison.
const TIGHT: &[char] = &['=', '<', '>', '!', ',', '(', ')', '+', '-', '*', '/', ';'];

/// Lower-case, collapse whitespace, drop spaces around operators and strip
/// one trailing semicolon. Does not parse SQL.
pub fn normalize_query(query: &str) -> String {
    let lowered = query.to_lowercase();
    let collapsed: Vec<char> = lowered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .collect();

    let mut out = String::with_capacity(collapsed.len());
    for (i, &c) in collapsed.iter().enumerate() {
        if c == ' ' {
            let before = i.checked_sub(1).and_then(|p| collapsed.get(p));
            let after = collapsed.get(i + 1);
            if before.is_some_and(|p| TIGHT.contains(p)) || after.is_some_and(|n| TIGHT.contains(n)) {
                continue;
            }
        }
        out.push(c);
    }

    let trimmed = out.trim();
    trimmed
        .strip_suffix(';')
        .unwrap_or(trimmed)
        .trim_end()
        .to_string()
}

pub fn validate_query_text(
    input: &str,
    state: &ExerciseState,
    _evidence: Option<&QueryEvidence>,
) -> Result<bool, ValidationError> {
    let expected = state.require_str(EXPECTED_QUERY)?;
    Ok(normalize_query(input) == normalize_query(expected))
}

/// The final result table must have one row per expected value and contain
/// every expected value somewhere.
pub fn validate_values(
    _input: &str,
    state: &ExerciseState,
    evidence: Option<&QueryEvidence>,
) -> Result<bool, ValidationError> {
    let evidence = evidence.ok_or(ValidationError::MissingResult)?;
    let expected: Vec<String> = state
        .get(EXPECTED_VALUES)
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingField(EXPECTED_VALUES))?
        .iter()
        .map(cell_text)
        .collect();

    if expected.is_empty() {
        return Err(ValidationError::Malformed("no expected values".to_string()));
    }

    let Some(table) = evidence.actual.last() else {
        return Ok(false);
    };
    if table.row_count() != expected.len() {
        return Ok(false);
    }

    Ok(expected.iter().all(|wanted| {
        table.values.iter().any(|row| {
            row.iter()
                .any(|cell| compare::normalize_value(cell, false) == *wanted)
        })
    }))
}

pub fn validate_results(
    _input: &str,
    _state: &ExerciseState,
    evidence: Option<&QueryEvidence>,
) -> Result<bool, ValidationError> {
    let evidence = evidence.ok_or(ValidationError::MissingResult)?;
    Ok(compare::compare_results(&evidence.expected, &evidence.actual, CompareOptions::default()).matches)
}

// A JSON value rendered the way the comparison engine renders cells.
fn cell_text(value: &Value) -> String {
    let cell = match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    };
    compare::normalize_value(&cell, false)
}
