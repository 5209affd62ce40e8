use super::{validate_query_text, Check, ExerciseDescriptor, ExerciseState};
use crate::random::{round_to, select, select_many, RandomSource};

const COMPANY_COLUMNS: &[&str] = &["company_name", "country", "num_employees", "founded"];
const SORTABLE_COLUMNS: &[&str] = &["company_name", "num_employees", "founded"];

pub const CHOOSE_COLUMNS: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "choose-columns",
    version: 1,
    check: Check::Text,
    hints: &[
        "List the columns you want right after SELECT, separated by commas.",
        "Keep the columns in the order the task asks for them.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_choose_columns,
    describer: describe_choose_columns,
    validator: validate_query_text,
};

fn generate_choose_columns(rng: &mut dyn RandomSource) -> ExerciseState {
    let count = rng.int_in_range(2, 3) as usize;
    let columns: Vec<String> = select_many(rng, COMPANY_COLUMNS, count)
        .into_iter()
        .map(|c| c.to_string())
        .collect();

    let query = format!("SELECT {} FROM companies", columns.join(", "));
    ExerciseState::new("columns")
        .with("columns", columns)
        .with_query(query)
}

fn describe_choose_columns(state: &ExerciseState) -> String {
    state.render(
        "Show only the columns {{columns}} (in that order) of every row in the companies table.",
    )
}

pub const SORT_ROWS: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "sort-rows",
    version: 1,
    check: Check::Text,
    hints: &[
        "ORDER BY goes at the very end of the query.",
        "ASC sorts from small to large, DESC from large to small.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_sort_rows,
    describer: describe_sort_rows,
    validator: validate_query_text,
};

fn generate_sort_rows(rng: &mut dyn RandomSource) -> ExerciseState {
    let column = *select(rng, SORTABLE_COLUMNS);
    let direction = *select(rng, &["ASC", "DESC"]);

    ExerciseState::new(if direction == "ASC" { "ascending" } else { "descending" })
        .with("column", column)
        .with("direction", direction)
        .with_query(format!(
            "SELECT * FROM companies ORDER BY {} {}",
            column, direction
        ))
}

fn describe_sort_rows(state: &ExerciseState) -> String {
    let order = match state.id() {
        Some("ascending") => "ascending (ASC)",
        _ => "descending (DESC)",
    };
    format!(
        "Show all companies, sorted in {} order of {}. Write the direction explicitly.",
        order,
        state.get_str("column").unwrap_or("?")
    )
}

pub const CREATE_PROCESSED_COLUMNS: ExerciseDescriptor = ExerciseDescriptor {
    skill_id: "create-processed-columns",
    version: 1,
    check: Check::Text,
    hints: &[
        "You can compute with columns directly inside SELECT, like salary * 2.",
        "Use AS to give the computed column a name.",
    ],
    solution_template: "{{expectedQuery}}",
    generator: generate_processed_columns,
    describer: describe_processed_columns,
    validator: validate_query_text,
};

fn generate_processed_columns(rng: &mut dyn RandomSource) -> ExerciseState {
    if *select(rng, &["monthly", "bonus"]) == "monthly" {
        return ExerciseState::new("monthly")
            .with_query("SELECT title, salary / 12 AS monthly_salary FROM positions");
    }

    let bonus = round_to(rng.int_in_range(1000, 5000), 500);
    ExerciseState::new("bonus")
        .with("bonus", bonus)
        .with_query(format!(
            "SELECT title, salary + {} AS salary_with_bonus FROM positions",
            bonus
        ))
}

fn describe_processed_columns(state: &ExerciseState) -> String {
    match state.id() {
        Some("monthly") => "For every position, show the title and the monthly salary (the yearly salary divided by 12), named monthly_salary.".to_string(),
        _ => state.render(
            "Every position gets a bonus of {{bonus}}. Show the title and the salary including the bonus, named salary_with_bonus.",
        ),
    }
}
