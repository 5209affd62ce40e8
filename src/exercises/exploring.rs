//! Free-form questions. Any query that produces the right answer counts, so
//! the state carries the answer values rather than one canonical query.

use serde_json::Value;

use super::{validate_values, Check, ExerciseDescriptor, ExerciseState, EXPECTED_VALUES};
use crate::random::{select, RandomSource};

// Largest company per country in the companies fixture.
const LARGEST_COMPANY: &[(&str, &str)] = &[
    ("Netherlands", "Heineken"),
    ("United Kingdom", "Unilever"),
    ("Belgium", "Anheuser-Busch InBev"),
    ("Germany", "Siemens"),
    ("Sweden", "IKEA"),
];

// Number of positions per city in the positions fixture.
const POSITIONS_PER_CITY: &[(&str, i64)] = &[
    ("Amsterdam", 3),
    ("Eindhoven", 2),
    ("Stockholm", 2),
    ("London", 2),
    ("Munich", 1),
];

pub const EXPLORE_DATA: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "explore-data",
    version: 1,
    check: Check::Values,
    hints: &[
        "Any query is fine as long as its result holds exactly the answer.",
        "ORDER BY combined with LIMIT 1 picks out the top row.",
    ],
    solution_template: "{{exampleQuery}}",
    generator: generate_explore,
    describer: describe_explore,
    validator: validate_values,
};

fn generate_explore(rng: &mut dyn RandomSource) -> ExerciseState {
    if *select(rng, &["largest", "city-count"]) == "largest" {
        let (country, company) = *select(rng, LARGEST_COMPANY);
        return ExerciseState::new("largest")
            .with("country", country)
            .with(EXPECTED_VALUES, vec![Value::from(company)])
            .with(
                "exampleQuery",
                format!(
                    "SELECT company_name FROM companies WHERE country = '{}' ORDER BY num_employees DESC LIMIT 1",
                    country
                ),
            );
    }

    let (city, count) = *select(rng, POSITIONS_PER_CITY);
    ExerciseState::new("city-count")
        .with("city", city)
        .with(EXPECTED_VALUES, vec![Value::from(count)])
        .with(
            "exampleQuery",
            format!("SELECT COUNT(*) FROM positions WHERE city = '{}'", city),
        )
}

fn describe_explore(state: &ExerciseState) -> String {
    match state.id() {
        Some("largest") => state.render(
            "Which company in {{country}} has the most employees? Write a query whose result is a single row holding its name.",
        ),
        _ => state.render(
            "How many positions are there in {{city}}? Write a query whose result is a single row holding that number.",
        ),
    }
}
