use super::{validate_query_text, Check, ExerciseDescriptor, ExerciseState};
use crate::random::{round_to, select, RandomSource};

const TITLES: &[&str] = &[
    "Engineer",
    "Designer",
    "Data Analyst",
    "Developer",
    "Brewer",
    "Marketing Manager",
];

pub const AGGREGATE_COUNT_QUERY: &str =
    "SELECT country, COUNT(*) AS total FROM positions GROUP BY country";

pub const AGGREGATE_COLUMNS: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "aggregate-columns",
    version: 1,
    check: Check::Text,
    hints: &[
        "GROUP BY country gives one output row per country.",
        "COUNT(*) counts the rows in each group.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_aggregate_columns,
    describer: describe_aggregate_columns,
    validator: validate_query_text,
};

fn generate_aggregate_columns(_rng: &mut dyn RandomSource) -> ExerciseState {
    ExerciseState::new("count").with_query(AGGREGATE_COUNT_QUERY)
}

fn describe_aggregate_columns(_state: &ExerciseState) -> String {
    "For every country, show the country and how many positions there are in it. Name the count total.".to_string()
}

pub const USE_FILTERED_AGGREGATION: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "use-filtered-aggregation",
    version: 1,
    check: Check::Text,
    hints: &[
        "WHERE filters rows before they are grouped.",
        "The clause order is SELECT, FROM, WHERE, GROUP BY.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_filtered_aggregation,
    describer: describe_filtered_aggregation,
    validator: validate_query_text,
};

fn generate_filtered_aggregation(rng: &mut dyn RandomSource) -> ExerciseState {
    if *select(rng, &["title", "cap"]) == "title" {
        let title = *select(rng, TITLES);
        return ExerciseState::new("title")
            .with("title", title)
            .with_query(format!(
                "SELECT country, AVG(salary) AS average_salary FROM positions WHERE title = '{}' GROUP BY country",
                title
            ));
    }

    let cap = round_to(rng.int_in_range(55_000, 80_000), 5_000);
    ExerciseState::new("cap")
        .with("maxSalary", cap)
        .with_query(format!(
            "SELECT country, MAX(salary) AS max_salary FROM positions WHERE salary < {} GROUP BY country",
            cap
        ))
}

fn describe_filtered_aggregation(state: &ExerciseState) -> String {
    match state.id() {
        Some("title") => state.render(
            "Considering only {{title}} positions, show per country the average salary, named average_salary.",
        ),
        _ => state.render(
            "Considering only positions paying less than {{maxSalary}}, show per country the highest salary, named max_salary.",
        ),
    }
}

pub const USE_DYNAMIC_AGGREGATION: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "use-dynamic-aggregation",
    version: 1,
    check: Check::Text,
    hints: &[
        "HAVING filters groups after aggregation, WHERE filters rows before.",
        "Repeat the aggregate inside HAVING rather than using its alias.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_dynamic_aggregation,
    describer: describe_dynamic_aggregation,
    validator: validate_query_text,
};

fn generate_dynamic_aggregation(rng: &mut dyn RandomSource) -> ExerciseState {
    if *select(rng, &["count", "salary"]) == "count" {
        let min = rng.int_in_range(2, 4);
        return ExerciseState::new("count")
            .with("minPositions", min)
            .with_query(format!(
                "SELECT country, COUNT(*) AS total FROM positions GROUP BY country HAVING COUNT(*) >= {}",
                min
            ));
    }

    let floor = round_to(rng.int_in_range(55_000, 70_000), 5_000);
    ExerciseState::new("salary")
        .with("minAverage", floor)
        .with_query(format!(
            "SELECT city, AVG(salary) AS average_salary FROM positions GROUP BY city HAVING AVG(salary) > {}",
            floor
        ))
}

fn describe_dynamic_aggregation(state: &ExerciseState) -> String {
    match state.id() {
        Some("count") => state.render(
            "Show per country the number of positions (named total), but only for countries with at least {{minPositions}} positions.",
        ),
        _ => state.render(
            "Show per city the average salary (named average_salary), but only for cities where that average is above {{minAverage}}.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::testing::ScriptedRandom;

    #[test]
    fn aggregate_columns_is_fixed() {
        for seed in [0, 1, 5] {
            let state = generate_aggregate_columns(&mut ScriptedRandom::new(&[seed]));
            assert_eq!(state.expected_query(), Some(AGGREGATE_COUNT_QUERY));
        }
    }

    #[test]
    fn aggregate_columns_scenario() {
        let state = generate_aggregate_columns(&mut ScriptedRandom::new(&[]));
        let input = "SELECT  country,   COUNT(*) AS total  FROM positions   GROUP BY country;";
        assert!(AGGREGATE_COLUMNS.validate(input, &state, None).unwrap());
    }

    #[test]
    fn filtered_aggregation_title_mode() {
        let state = generate_filtered_aggregation(&mut ScriptedRandom::new(&[0, 2]));
        assert_eq!(
            state.expected_query(),
            Some("SELECT country, AVG(salary) AS average_salary FROM positions WHERE title = 'Data Analyst' GROUP BY country")
        );
    }

    #[test]
    fn dynamic_aggregation_count_mode() {
        let state = generate_dynamic_aggregation(&mut ScriptedRandom::new(&[0, 3]));
        assert_eq!(state.get("minPositions").and_then(|v| v.as_i64()), Some(3));
        assert!(describe_dynamic_aggregation(&state).contains("at least 3"));
    }
}
