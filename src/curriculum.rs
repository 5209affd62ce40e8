//! The course: concepts to read and skills to practise, with the
//! prerequisites that order them.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Concept,
    Skill,
}

impl ComponentKind {
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::Concept => "Concept",
            ComponentKind::Skill => "Skill",
        }
    }
}

// Optional reading material; absent parts have no tab.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Content {
    pub story: Option<&'static str>,
    pub theory: Option<&'static str>,
    pub summary: Option<&'static str>,
    pub reference: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ComponentDef {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: ComponentKind,
    pub prerequisites: &'static [&'static str],
    pub content: Content,
}

const fn concept(
    id: &'static str,
    name: &'static str,
    prerequisites: &'static [&'static str],
    content: Content,
) -> ComponentDef {
    ComponentDef {
        id,
        name,
        kind: ComponentKind::Concept,
        prerequisites,
        content,
    }
}

const fn skill(
    id: &'static str,
    name: &'static str,
    prerequisites: &'static [&'static str],
    content: Content,
) -> ComponentDef {
    ComponentDef {
        id,
        name,
        kind: ComponentKind::Skill,
        prerequisites,
        content,
    }
}

pub static CURRICULUM: &[ComponentDef] = &[
    concept(
        "database",
        "Database",
        &[],
        Content {
            story: Some(
                "You have just joined a recruitment agency. Every company it works with, and every open position at those companies, is stored somewhere. That somewhere is a database.",
            ),
            theory: Some(
                "A database is an organized collection of data, managed by a database management system (DBMS). The DBMS stores the data, keeps it consistent, and answers questions about it. Relational databases, the kind used here, store everything in tables.",
            ),
            summary: Some("A database is structured data plus the software that manages it."),
            reference: None,
        },
    ),
    concept(
        "database-table",
        "Database table",
        &["database"],
        Content {
            story: Some(
                "The agency keeps two tables: companies, with one row per company, and positions, with one row per job opening.",
            ),
            theory: Some(
                "A table has named columns, each holding one kind of value, and rows, each describing one record. The companies table has the columns id, company_name, country, num_employees and founded. The id column is the primary key: it identifies a row uniquely.",
            ),
            summary: Some("Tables consist of columns (fields) and rows (records). A primary key identifies each row."),
            reference: None,
        },
    ),
    concept(
        "query-language",
        "Query language",
        &["database-table"],
        Content {
            story: None,
            theory: Some(
                "SQL is the language used to talk to relational databases. A query describes which data you want, not how to find it. Keywords such as SELECT and FROM are case insensitive; text values between single quotes are not.",
            ),
            summary: Some("SQL queries declare what data you want. Keywords are case insensitive."),
            reference: Some("SELECT columns FROM table;"),
        },
    ),
    skill(
        "choose-columns",
        "Choose columns",
        &["query-language"],
        Content {
            story: None,
            theory: Some(
                "SELECT lists the columns you want, separated by commas, and FROM names the table. SELECT * returns every column.",
            ),
            summary: None,
            reference: Some("SELECT company_name, country FROM companies"),
        },
    ),
    skill(
        "filter-rows",
        "Filter rows",
        &["query-language"],
        Content {
            story: None,
            theory: Some(
                "WHERE keeps only the rows for which a condition holds. Compare with =, <>, <, >, <= or >=. Text values go between single quotes.",
            ),
            summary: None,
            reference: Some("SELECT * FROM companies WHERE country = 'Belgium'"),
        },
    ),
    skill(
        "filter-on-multiple-criteria",
        "Filter on multiple criteria",
        &["filter-rows"],
        Content {
            story: None,
            theory: Some(
                "Conditions combine with AND (both must hold) and OR (at least one must hold). Use parentheses when mixing them.",
            ),
            summary: None,
            reference: Some("SELECT * FROM companies WHERE country = 'Sweden' AND num_employees > 10000"),
        },
    ),
    skill(
        "sort-rows",
        "Sort rows",
        &["choose-columns"],
        Content {
            story: None,
            theory: Some(
                "ORDER BY sorts the result, ascending by default. Add DESC for descending order. LIMIT keeps only the first rows.",
            ),
            summary: None,
            reference: Some("SELECT * FROM companies ORDER BY founded DESC LIMIT 3"),
        },
    ),
    skill(
        "create-processed-columns",
        "Create processed columns",
        &["choose-columns"],
        Content {
            story: None,
            theory: Some(
                "A SELECT list may hold expressions, not just column names. AS gives the computed column a name.",
            ),
            summary: None,
            reference: Some("SELECT title, salary / 12 AS monthly_salary FROM positions"),
        },
    ),
    skill(
        "write-single-criterion-query",
        "Write single-criterion queries",
        &["filter-rows", "sort-rows"],
        Content::default_with_theory(
            "Real questions need several clauses at once. Their order is always SELECT, FROM, WHERE, ORDER BY, LIMIT.",
        ),
    ),
    skill(
        "write-multi-criterion-query",
        "Write multi-criterion queries",
        &["filter-on-multiple-criteria", "write-single-criterion-query"],
        Content::default_with_theory(
            "Break a question into its conditions first, then write one WHERE clause that combines them.",
        ),
    ),
    concept(
        "foreign-keys",
        "Foreign keys",
        &["database-table"],
        Content {
            story: Some(
                "A position belongs to a company. Instead of repeating the company's details, each position stores the company's id.",
            ),
            theory: Some(
                "A foreign key is a column that refers to the primary key of another table. positions.company_id refers to companies.id, which links every position to its company.",
            ),
            summary: Some("Foreign keys link rows across tables by referring to primary keys."),
            reference: None,
        },
    ),
    skill(
        "join-tables",
        "Join tables",
        &["foreign-keys", "filter-rows"],
        Content {
            story: None,
            theory: Some(
                "JOIN combines rows of two tables that match on a condition, usually a foreign key equal to a primary key. Prefix columns with their table name when both tables have a column with that name.",
            ),
            summary: None,
            reference: Some(
                "SELECT positions.title, companies.company_name FROM positions JOIN companies ON positions.company_id = companies.id",
            ),
        },
    ),
    concept(
        "aggregation",
        "Aggregation",
        &["query-language"],
        Content {
            story: None,
            theory: Some(
                "Aggregate functions such as COUNT, SUM, AVG, MIN and MAX turn many rows into one value. GROUP BY applies them per group of rows sharing a value.",
            ),
            summary: Some("Aggregates summarize rows, GROUP BY decides which rows are summarized together."),
            reference: None,
        },
    ),
    skill(
        "aggregate-columns",
        "Aggregate columns",
        &["aggregation", "choose-columns"],
        Content {
            story: None,
            theory: Some("Every selected column must either appear in GROUP BY or be inside an aggregate."),
            summary: None,
            reference: Some("SELECT country, COUNT(*) AS total FROM companies GROUP BY country"),
        },
    ),
    skill(
        "use-filtered-aggregation",
        "Use filtered aggregation",
        &["aggregate-columns", "filter-rows"],
        Content::default_with_theory(
            "WHERE runs before grouping, so it decides which rows take part in the aggregates.",
        ),
    ),
    skill(
        "use-dynamic-aggregation",
        "Use dynamic aggregation",
        &["use-filtered-aggregation"],
        Content {
            story: None,
            theory: Some(
                "HAVING filters groups after aggregation. Use it for conditions on aggregate values, such as COUNT(*) > 2.",
            ),
            summary: None,
            reference: Some("SELECT country, COUNT(*) FROM positions GROUP BY country HAVING COUNT(*) > 2"),
        },
    ),
    skill(
        "insert-rows",
        "Insert rows",
        &["database-table"],
        Content {
            story: None,
            theory: Some("INSERT INTO adds rows. List the columns, then give the values in the same order."),
            summary: None,
            reference: Some("INSERT INTO companies (company_name, country) VALUES ('Philips', 'Netherlands')"),
        },
    ),
    skill(
        "update-rows",
        "Update rows",
        &["insert-rows", "filter-rows"],
        Content::default_with_theory(
            "UPDATE changes values in existing rows. Without WHERE every row is changed.",
        ),
    ),
    skill(
        "delete-rows",
        "Delete rows",
        &["insert-rows", "filter-rows"],
        Content::default_with_theory(
            "DELETE FROM removes rows. Without WHERE the table ends up empty.",
        ),
    ),
    skill(
        "explore-data",
        "Explore data",
        &["write-multi-criterion-query", "join-tables", "use-dynamic-aggregation"],
        Content::default_with_theory(
            "Exploring means answering a question with whatever query gets you there. Only the answer is checked.",
        ),
    ),
];

impl Content {
    const fn default_with_theory(theory: &'static str) -> Self {
        Self {
            story: None,
            theory: Some(theory),
            summary: None,
            reference: None,
        }
    }
}
