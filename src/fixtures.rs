//! Seed schemas for exercise sandboxes.
//!
//! Each skill gets its own sandbox database, named after the skill, built from
//! one or both of the tables below.

pub const COMPANIES: &str = r#"
CREATE TABLE companies (
    id              INTEGER PRIMARY KEY,
    company_name    TEXT NOT NULL,
    country         TEXT NOT NULL,
    num_employees   INTEGER NOT NULL,
    founded         INTEGER NOT NULL
);

INSERT INTO companies (id, company_name, country, num_employees, founded) VALUES
    (1, 'Philips', 'Netherlands', 79000, 1891),
    (2, 'ASML', 'Netherlands', 39000, 1984),
    (3, 'Shell', 'United Kingdom', 93000, 1907),
    (4, 'Unilever', 'United Kingdom', 128000, 1929),
    (5, 'Anheuser-Busch InBev', 'Belgium', 169000, 2008),
    (6, 'Solvay', 'Belgium', 21000, 1863),
    (7, 'Siemens', 'Germany', 311000, 1847),
    (8, 'SAP', 'Germany', 107000, 1972),
    (9, 'Spotify', 'Sweden', 9000, 2006),
    (10, 'IKEA', 'Sweden', 219000, 1943),
    (11, 'Nokia', 'Finland', 86000, 1865),
    (12, 'Heineken', 'Netherlands', 90000, 1864);
"#;

pub const POSITIONS: &str = r#"
CREATE TABLE positions (
    id              INTEGER PRIMARY KEY,
    company_id      INTEGER NOT NULL REFERENCES companies(id),
    title           TEXT NOT NULL,
    city            TEXT NOT NULL,
    country         TEXT NOT NULL,
    salary          INTEGER NOT NULL
);

INSERT INTO positions (id, company_id, title, city, country, salary) VALUES
    (1, 1, 'Engineer', 'Eindhoven', 'Netherlands', 65000),
    (2, 1, 'Designer', 'Amsterdam', 'Netherlands', 52000),
    (3, 2, 'Engineer', 'Veldhoven', 'Netherlands', 72000),
    (4, 2, 'Data Analyst', 'Eindhoven', 'Netherlands', 58000),
    (5, 3, 'Engineer', 'London', 'United Kingdom', 70000),
    (6, 4, 'Marketing Manager', 'London', 'United Kingdom', 80000),
    (7, 5, 'Brewer', 'Leuven', 'Belgium', 45000),
    (8, 6, 'Chemist', 'Brussels', 'Belgium', 60000),
    (9, 7, 'Engineer', 'Munich', 'Germany', 75000),
    (10, 8, 'Developer', 'Walldorf', 'Germany', 78000),
    (11, 8, 'Data Analyst', 'Berlin', 'Germany', 62000),
    (12, 9, 'Developer', 'Stockholm', 'Sweden', 68000),
    (13, 10, 'Designer', 'Stockholm', 'Sweden', 55000),
    (14, 11, 'Engineer', 'Espoo', 'Finland', 64000),
    (15, 12, 'Brewer', 'Amsterdam', 'Netherlands', 48000),
    (16, 12, 'Marketing Manager', 'Amsterdam', 'Netherlands', 71000);
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tables {
    Companies,
    // positions references companies, so it never ships alone
    Both,
}

fn tables_for(skill_id: &str) -> Option<Tables> {
    let tables = match skill_id {
        "choose-columns"
        | "filter-rows"
        | "filter-on-multiple-criteria"
        | "sort-rows"
        | "write-single-criterion-query"
        | "insert-rows"
        | "delete-rows" => Tables::Companies,
        "create-processed-columns"
        | "write-multi-criterion-query"
        | "aggregate-columns"
        | "use-filtered-aggregation"
        | "use-dynamic-aggregation"
        | "update-rows"
        | "join-tables"
        | "explore-data" => Tables::Both,
        _ => return None,
    };
    Some(tables)
}

/// Schema text (DDL plus seed rows) for a skill's sandbox.
pub fn fixture_for(skill_id: &str) -> Option<String> {
    let sql = match tables_for(skill_id)? {
        Tables::Companies => COMPANIES.to_string(),
        Tables::Both => format!("{}\n{}", COMPANIES, POSITIONS),
    };
    Some(sql)
}
