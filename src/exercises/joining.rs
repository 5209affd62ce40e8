use super::{validate_results, Check, ExerciseDescriptor, ExerciseState};
use crate::random::{select, RandomSource};

const CITIES: &[&str] = &["Amsterdam", "Eindhoven", "London", "Stockholm", "Munich", "Brussels"];

pub const JOIN_TABLES: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "join-tables",
    version: 1,
    check: Check::Results,
    hints: &[
        "positions.company_id refers to companies.id.",
        "Prefix columns with their table name when both tables could have them.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_join,
    describer: describe_join,
    validator: validate_results,
};

fn generate_join(rng: &mut dyn RandomSource) -> ExerciseState {
    let city = *select(rng, CITIES);
    ExerciseState::new("city")
        .with("city", city)
        .with_query(format!(
            "SELECT companies.company_name, positions.title FROM companies JOIN positions ON companies.id = positions.company_id WHERE positions.city = '{}'",
            city
        ))
}

fn describe_join(state: &ExerciseState) -> String {
    state.render(
        "For every position in {{city}}, show the name of the company offering it (company_name) and the position's title.",
    )
}
