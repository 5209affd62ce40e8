use super::{validate_query_text, validate_results, Check, ExerciseDescriptor, ExerciseState};
use crate::random::{round_to, select, select_many, RandomSource};

const COUNTRIES: &[&str] = &[
    "Netherlands",
    "Belgium",
    "Germany",
    "Sweden",
    "United Kingdom",
    "Finland",
];

// Countries with at least two companies, so ordering means something.
const MULTI_COMPANY_COUNTRIES: &[&str] = &["Netherlands", "Belgium", "Germany", "Sweden", "United Kingdom"];

// (country, salary floor) pairs that leave at least one position in positions.
const SALARY_CRITERIA: &[(&str, i64)] = &[
    ("Netherlands", 50000),
    ("Netherlands", 60000),
    ("Netherlands", 70000),
    ("Germany", 60000),
    ("Germany", 70000),
    ("United Kingdom", 60000),
    ("United Kingdom", 75000),
    ("Sweden", 50000),
    ("Sweden", 60000),
];

pub const FILTER_ROWS: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "filter-rows",
    version: 2,
    check: Check::Text,
    hints: &[
        "Filtering happens with WHERE, placed after FROM.",
        "Text values go between single quotes, numbers do not.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_filter_rows,
    describer: describe_filter_rows,
    validator: validate_query_text,
};

pub fn filter_rows_by_country(country: &str) -> ExerciseState {
    ExerciseState::new("country")
        .with("country", country)
        .with_query(format!(
            "SELECT * FROM companies WHERE country = '{}'",
            country
        ))
}

pub fn filter_rows_by_size(min_employees: i64) -> ExerciseState {
    ExerciseState::new("size")
        .with("minEmployees", min_employees)
        .with_query(format!(
            "SELECT * FROM companies WHERE num_employees > {}",
            min_employees
        ))
}

fn generate_filter_rows(rng: &mut dyn RandomSource) -> ExerciseState {
    match *select(rng, &["country", "size"]) {
        "country" => filter_rows_by_country(*select(rng, COUNTRIES)),
        _ => filter_rows_by_size(round_to(rng.int_in_range(20_000, 150_000), 10_000)),
    }
}

fn describe_filter_rows(state: &ExerciseState) -> String {
    match state.id() {
        Some("country") => state.render("Find all companies located in {{country}}. Show every column."),
        _ => state.render("Find all companies with more than {{minEmployees}} employees. Show every column."),
    }
}

pub const FILTER_ON_MULTIPLE_CRITERIA: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "filter-on-multiple-criteria",
    version: 1,
    check: Check::Text,
    hints: &[
        "Combine conditions with AND when both must hold, OR when either may hold.",
        "Write the conditions in the order the task mentions them.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_multiple_criteria,
    describer: describe_multiple_criteria,
    validator: validate_query_text,
};

fn generate_multiple_criteria(rng: &mut dyn RandomSource) -> ExerciseState {
    if *select(rng, &["and", "or"]) == "and" {
        let country = *select(rng, MULTI_COMPANY_COUNTRIES);
        let min = round_to(rng.int_in_range(20_000, 100_000), 10_000);
        return ExerciseState::new("and")
            .with("country", country)
            .with("minEmployees", min)
            .with_query(format!(
                "SELECT * FROM companies WHERE country = '{}' AND num_employees > {}",
                country, min
            ));
    }

    let pair = select_many(rng, COUNTRIES, 2);
    let (first, second) = (*pair[0], *pair[1]);
    ExerciseState::new("or")
        .with("first", first)
        .with("second", second)
        .with_query(format!(
            "SELECT * FROM companies WHERE country = '{}' OR country = '{}'",
            first, second
        ))
}

fn describe_multiple_criteria(state: &ExerciseState) -> String {
    match state.id() {
        Some("and") => state.render(
            "Find all companies in {{country}} that have more than {{minEmployees}} employees. Show every column.",
        ),
        _ => state.render("Find all companies that are located in {{first}} or in {{second}}. Show every column."),
    }
}

pub const WRITE_SINGLE_CRITERION_QUERY: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "write-single-criterion-query",
    version: 1,
    check: Check::Text,
    hints: &[
        "The clause order is SELECT, FROM, WHERE, ORDER BY.",
        "Only list the two columns that are asked for.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_single_criterion,
    describer: describe_single_criterion,
    validator: validate_query_text,
};

fn generate_single_criterion(rng: &mut dyn RandomSource) -> ExerciseState {
    let country = *select(rng, MULTI_COMPANY_COUNTRIES);
    let (id, direction) = *select(rng, &[("largest", "DESC"), ("smallest", "ASC")]);

    ExerciseState::new(id)
        .with("country", country)
        .with_query(format!(
            "SELECT company_name, num_employees FROM companies WHERE country = '{}' ORDER BY num_employees {}",
            country, direction
        ))
}

fn describe_single_criterion(state: &ExerciseState) -> String {
    let order = match state.id() {
        Some("largest") => "largest first (DESC)",
        _ => "smallest first (ASC)",
    };
    format!(
        "Show the name and number of employees of all companies in {}, {}.",
        state.get_str("country").unwrap_or("?"),
        order
    )
}

pub const WRITE_MULTI_CRITERION_QUERY: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "write-multi-criterion-query",
    version: 1,
    check: Check::Results,
    hints: &[
        "Both conditions have to hold at the same time.",
        "Any query that returns the right titles and cities is accepted.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_multi_criterion,
    describer: describe_multi_criterion,
    validator: validate_results,
};

fn generate_multi_criterion(rng: &mut dyn RandomSource) -> ExerciseState {
    let (country, floor) = *select(rng, SALARY_CRITERIA);
    ExerciseState::new("salary")
        .with("country", country)
        .with("minSalary", floor)
        .with_query(format!(
            "SELECT title, city FROM positions WHERE country = '{}' AND salary >= {}",
            country, floor
        ))
}

fn describe_multi_criterion(state: &ExerciseState) -> String {
    state.render(
        "Which positions in {{country}} pay at least {{minSalary}}? Show the columns title and city.",
    )
}
