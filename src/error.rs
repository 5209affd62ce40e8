//! Error types shared by the sandbox engine, exercises, progress store and
//! content tree.

use thiserror::Error;

/// Errors raised by the embedded database sandbox.
#[derive(Debug, Error)]
pub enum DbError {
    /// The embedded engine could not be brought up. Fatal to every database feature.
    #[error("database engine failed to load: {0}")]
    EngineLoad(String),

    /// The fixture for a named sandbox failed to apply.
    #[error("setting up database '{name}' failed: {source}")]
    SchemaSetup {
        name: String,
        #[source]
        source: rusqlite::Error,
    },

    /// No fixture exists for the requested sandbox name.
    #[error("no sandbox database for '{0}'")]
    UnknownSandbox(String),

    /// A query failed. Carries the engine's message verbatim.
    #[error("{0}")]
    QueryExecution(String),
}

/// Errors raised by an exercise validator.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("exercise state is missing field '{0}'")]
    MissingField(&'static str),

    #[error("no query result was available to check")]
    MissingResult,

    #[error("malformed exercise state: {0}")]
    Malformed(String),
}

/// Errors raised by the progress store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the exercise lifecycle.
#[derive(Debug, Error)]
pub enum ExerciseError {
    #[error("no exercises exist for skill '{0}'")]
    UnknownSkill(String),

    #[error("no active exercise for skill '{0}', start one first")]
    NoInstance(String),

    /// Not user visible, the lifecycle regenerates when it sees this.
    #[error("exercise for '{skill}' was generated by version {found}, current is {expected}")]
    StaleVersion {
        skill: String,
        found: u32,
        expected: u32,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised while loading the content tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("component '{0}' is defined more than once")]
    DuplicateComponent(String),

    #[error("component '{component}' lists unknown prerequisite '{prerequisite}'")]
    UnknownPrerequisite {
        component: String,
        prerequisite: String,
    },

    #[error("prerequisite cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}
