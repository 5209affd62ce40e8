use super::{validate_query_text, Check, ExerciseDescriptor, ExerciseState};
use crate::random::{round_to, select, RandomSource};

// (name, country, employees, founded)
const NEW_COMPANIES: &[(&str, &str, i64, i64)] = &[
    ("Adyen", "Netherlands", 3000, 2006),
    ("Volvo", "Sweden", 100000, 1927),
    ("Bosch", "Germany", 420000, 1886),
    ("Lego", "Denmark", 28000, 1932),
    ("Colruyt", "Belgium", 33000, 1928),
];

const CITIES: &[&str] = &["Amsterdam", "Eindhoven", "London", "Stockholm", "Berlin"];

pub const INSERT_ROWS: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "insert-rows",
    version: 1,
    check: Check::Text,
    hints: &[
        "Name the columns after the table: INSERT INTO companies (...) VALUES (...).",
        "The id column fills itself in, leave it out.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_insert,
    describer: describe_insert,
    validator: validate_query_text,
};

fn generate_insert(rng: &mut dyn RandomSource) -> ExerciseState {
    let (name, country, employees, founded) = *select(rng, NEW_COMPANIES);
    ExerciseState::new("insert")
        .with("name", name)
        .with("country", country)
        .with("employees", employees)
        .with("founded", founded)
        .with_query(format!(
            "INSERT INTO companies (company_name, country, num_employees, founded) VALUES ('{}', '{}', {}, {})",
            name, country, employees, founded
        ))
}

fn describe_insert(state: &ExerciseState) -> String {
    state.render(
        "Add the company {{name}} from {{country}}, founded in {{founded}} with {{employees}} employees. Fill company_name, country, num_employees and founded, in that order.",
    )
}

pub const UPDATE_ROWS: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "update-rows",
    version: 1,
    check: Check::Text,
    hints: &[
        "UPDATE positions SET ... WHERE ... changes only the matching rows.",
        "You can refer to the old value: salary = salary + 100.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_update,
    describer: describe_update,
    validator: validate_query_text,
};

fn generate_update(rng: &mut dyn RandomSource) -> ExerciseState {
    let city = *select(rng, CITIES);
    let raise = round_to(rng.int_in_range(1000, 5000), 500);
    ExerciseState::new("raise")
        .with("city", city)
        .with("raise", raise)
        .with_query(format!(
            "UPDATE positions SET salary = salary + {} WHERE city = '{}'",
            raise, city
        ))
}

fn describe_update(state: &ExerciseState) -> String {
    state.render("Give every position in {{city}} a raise of {{raise}} on its salary.")
}

pub const DELETE_ROWS: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "delete-rows",
    version: 1,
    check: Check::Text,
    hints: &[
        "DELETE FROM companies WHERE ... removes every matching row.",
        "Forgetting WHERE deletes the whole table.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_delete,
    describer: describe_delete,
    validator: validate_query_text,
};

fn generate_delete(rng: &mut dyn RandomSource) -> ExerciseState {
    let year = round_to(rng.int_in_range(1850, 1950), 10);
    ExerciseState::new("founded")
        .with("year", year)
        .with_query(format!("DELETE FROM companies WHERE founded < {}", year))
}

fn describe_delete(state: &ExerciseState) -> String {
    state.render("Remove all companies that were founded before {{year}}.")
}
