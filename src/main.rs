mod compare;
mod curriculum;
mod engine;
mod error;
mod exercises;
mod fixtures;
mod lifecycle;
mod models;
mod random;
mod store;
mod tree;
mod tui;

use std::collections::HashSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use curriculum::{ComponentKind, CURRICULUM};
use engine::DatabaseRegistry;
use lifecycle::{Submission, Tutor};
use models::{InstanceStatus, JsonOutput};
use store::ProgressStore;
use tree::{ContentTree, Tab};

const DEFAULT_DB_NAME: &str = "progress.db";

#[derive(Parser)]
#[command(name = "sqlcoach")]
#[command(about = "Learn SQL by solving generated exercises against sandbox databases")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the progress database
    Init,

    /// List the course with unlock and completion state
    Tree,

    /// Show a concept or skill
    Show {
        /// Component ID
        id: String,

        /// Content tab: story, theory, summary, reference
        #[arg(long, short)]
        tab: Option<String>,
    },

    /// Show the current exercise for a skill, generating one if needed
    Exercise {
        /// Skill ID
        skill: String,
    },

    /// Submit an answer to the current exercise
    Submit {
        /// Skill ID
        skill: String,

        /// SQL query
        query: String,
    },

    /// Show the hints for a skill
    Hint {
        /// Skill ID
        skill: String,
    },

    /// Give up on the current exercise and show its solution
    GiveUp {
        /// Skill ID
        skill: String,
    },

    /// Replace the current exercise with a new one
    New {
        /// Skill ID
        skill: String,
    },

    /// Run a query against a skill's sandbox database
    Run {
        /// Skill ID
        skill: String,

        /// SQL query
        query: String,
    },

    /// List the tables in a skill's sandbox database
    Tables {
        /// Skill ID
        skill: String,
    },

    /// Mark a concept as understood
    Understand {
        /// Concept ID
        concept: String,

        /// Mark as not understood instead
        #[arg(long)]
        undo: bool,
    },

    /// Forget all progress on one concept or skill
    Reset {
        /// Component ID
        id: String,
    },

    /// Show learning statistics
    Stats,

    /// Launch interactive terminal UI
    Tui,
}

fn get_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("SQLCOACH_DB") {
        return PathBuf::from(path);
    }

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sqlcoach");

    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join(DEFAULT_DB_NAME)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sqlcoach=warn"));

    // stdout is reserved for command output
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            if let Ok(out) = serde_json::to_string(&JsonOutput::<()>::err(e.to_string())) {
                println!("{}", out);
            }
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn print_json<T: serde::Serialize>(output: &JsonOutput<T>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(output)?);
    Ok(())
}

fn completed_ids(store: &ProgressStore, tree: &ContentTree) -> Result<HashSet<&'static str>, Box<dyn std::error::Error>> {
    let mut done = HashSet::new();
    for def in tree.components() {
        if store.is_complete(def.id)? {
            done.insert(def.id);
        }
    }
    Ok(done)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_db_path();
    let store = ProgressStore::open(&db_path)?;
    let databases = DatabaseRegistry::new();
    let content = ContentTree::load(CURRICULUM)?;

    match cli.command {
        Commands::Init => {
            store.init()?;
            let engine = databases.initialize()?;
            if cli.json {
                print_json(&JsonOutput::ok(engine))?;
            } else {
                println!("Progress database initialized at: {}", db_path.display());
                println!("SQL engine: SQLite {}", engine.version);
            }
        }

        Commands::Tree => {
            store.init()?;
            let done = completed_ids(&store, &content)?;
            let is_done = |id: &str| done.contains(id);

            if cli.json {
                let rows: Vec<serde_json::Value> = content
                    .components()
                    .iter()
                    .map(|def| {
                        serde_json::json!({
                            "id": def.id,
                            "name": def.name,
                            "kind": def.kind,
                            "prerequisites": def.prerequisites,
                            "unlocked": content.is_unlocked(def.id, is_done),
                            "complete": is_done(def.id),
                        })
                    })
                    .collect();
                print_json(&JsonOutput::ok(rows))?;
            } else {
                println!("{:<3} {:<32} {:<8} ID", "", "NAME", "KIND");
                println!("{}", "-".repeat(72));
                for def in content.components() {
                    let marker = if is_done(def.id) {
                        "[x]"
                    } else if content.is_unlocked(def.id, is_done) {
                        "[ ]"
                    } else {
                        " - "
                    };
                    println!(
                        "{:<3} {:<32} {:<8} {}",
                        marker,
                        truncate(def.name, 30),
                        def.kind.label(),
                        def.id
                    );
                }
                if let Some(next) = content.next_up(is_done) {
                    println!();
                    println!("Next up: {} ({})", next.name, next.id);
                }
            }
        }

        Commands::Show { id, tab } => {
            let def = content
                .get(&id)
                .ok_or_else(|| format!("Unknown component '{}'", id))?;
            let tabs = content.tabs(&id);

            match tab {
                Some(name) => {
                    let tab = Tab::from_str(&name)
                        .filter(|t| tabs.contains(t) && *t != Tab::Exercises)
                        .ok_or_else(|| format!("'{}' has no {} tab", id, name))?;
                    let text = content.tab_text(&id, tab).unwrap_or_default();
                    if cli.json {
                        print_json(&JsonOutput::ok(serde_json::json!({
                            "id": def.id,
                            "tab": tab.label(),
                            "text": text,
                        })))?;
                    } else {
                        println!("=== {}: {} ===", def.name, tab.label());
                        println!("{}", text);
                    }
                }
                None => {
                    store.init()?;
                    let done = completed_ids(&store, &content)?;
                    let unlocked = content.is_unlocked(&id, |p| done.contains(p));
                    if cli.json {
                        print_json(&JsonOutput::ok(serde_json::json!({
                            "component": def,
                            "tabs": tabs.iter().map(Tab::label).collect::<Vec<_>>(),
                            "followUps": content.follow_ups(&id),
                            "unlocked": unlocked,
                            "complete": done.contains(def.id),
                        })))?;
                    } else {
                        println!("{}: {} ({})", def.kind.label(), def.name, def.id);
                        let prerequisites = content.prerequisites(&id);
                        let requires = if prerequisites.is_empty() {
                            "-".to_string()
                        } else {
                            prerequisites.join(", ")
                        };
                        println!("Requires: {}", requires);
                        let follow_ups = content.follow_ups(&id);
                        if !follow_ups.is_empty() {
                            println!("Leads to: {}", follow_ups.join(", "));
                        }
                        println!(
                            "Status: {}",
                            if done.contains(def.id) {
                                "complete"
                            } else if unlocked {
                                "unlocked"
                            } else {
                                "locked"
                            }
                        );
                        if def.kind == ComponentKind::Skill {
                            let progress = Tutor::new(&store, &databases).progress(def.id)?;
                            println!(
                                "Progress: {} ({}/{} solved, {} attempts)",
                                progress.mastery_label(),
                                progress.num_solved,
                                models::COMPLETION_THRESHOLD,
                                progress.total_attempts()
                            );
                        }
                        for tab in tabs.iter().filter(|t| **t != Tab::Exercises) {
                            if let Some(text) = content.tab_text(&id, *tab) {
                                println!();
                                println!("--- {} ---", tab.label());
                                println!("{}", text);
                            }
                        }
                    }
                }
            }
        }

        Commands::Exercise { skill } => {
            store.init()?;
            let mut tutor = Tutor::new(&store, &databases);
            let instance = tutor.start(&skill)?;
            let task = tutor.describe(&instance)?;
            if cli.json {
                print_json(&JsonOutput::ok(serde_json::json!({
                    "instance": instance,
                    "task": task,
                })))?;
            } else {
                println!("=== {} (exercise #{}) ===", skill, instance.id);
                println!();
                println!("{}", task);
                println!();
                println!("Status: {}", instance.status.label());
                if let Some(last) = instance.last_attempt() {
                    println!("Last answer: {}", last.input);
                    if let Some(feedback) = &last.feedback {
                        println!("Feedback: {}", feedback);
                    }
                }
                println!();
                println!("Answer with:");
                println!("  sqlcoach submit {} \"<query>\"", skill);
            }
        }

        Commands::Submit { skill, query } => {
            store.init()?;
            let mut tutor = Tutor::new(&store, &databases);
            let submission = tutor.submit_input(&skill, &query)?;
            if cli.json {
                print_json(&JsonOutput::ok(&submission))?;
            } else {
                match submission {
                    Submission::Judged(judgement) => {
                        println!("{}", judgement.attempt.feedback.as_deref().unwrap_or(""));
                        if let Some(comparison) = &judgement.comparison {
                            for mismatch in &comparison.mismatches {
                                println!(
                                    "  row {}: expected {} got {}",
                                    mismatch.index + 1,
                                    mismatch.expected,
                                    mismatch.actual
                                );
                            }
                        }
                        if judgement.attempt.status == InstanceStatus::Correct {
                            println!(
                                "Solved {}/{}{}",
                                judgement.num_solved,
                                models::COMPLETION_THRESHOLD,
                                if judgement.mastered { ", skill mastered!" } else { "" }
                            );
                        }
                    }
                    Submission::Regenerated(instance) => {
                        println!("That exercise was outdated and has been replaced:");
                        println!();
                        println!("{}", tutor.describe(&instance)?);
                    }
                }
            }
        }

        Commands::Hint { skill } => {
            let tutor = Tutor::new(&store, &databases);
            let hints = tutor.hints(&skill)?;
            if cli.json {
                print_json(&JsonOutput::ok(hints))?;
            } else if hints.is_empty() {
                println!("No hints for this skill.");
            } else {
                for (i, hint) in hints.iter().enumerate() {
                    println!("{}. {}", i + 1, hint);
                }
            }
        }

        Commands::GiveUp { skill } => {
            store.init()?;
            let mut tutor = Tutor::new(&store, &databases);
            let solution = tutor.give_up(&skill)?;
            if cli.json {
                print_json(&JsonOutput::ok(serde_json::json!({ "solution": solution })))?;
            } else {
                println!("Solution:");
                println!("  {}", solution);
            }
        }

        Commands::New { skill } => {
            store.init()?;
            let mut tutor = Tutor::new(&store, &databases);
            let instance = tutor.request_new(&skill)?;
            let task = tutor.describe(&instance)?;
            if cli.json {
                print_json(&JsonOutput::ok(serde_json::json!({
                    "instance": instance,
                    "task": task,
                })))?;
            } else {
                println!("=== {} (exercise #{}) ===", skill, instance.id);
                println!();
                println!("{}", task);
            }
        }

        Commands::Run { skill, query } => {
            let tables = lifecycle::run_query(&databases, &skill, &query)?;
            if cli.json {
                print_json(&JsonOutput::ok(&tables))?;
            } else if tables.is_empty() {
                println!("Query ran, no rows returned.");
            } else {
                for (i, table) in tables.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    println!("{}", table);
                }
            }
        }

        Commands::Tables { skill } => {
            let sandbox = lifecycle::open_sandbox(&databases, &skill)?;
            let tables = databases.list_tables(sandbox.name());
            if cli.json {
                print_json(&JsonOutput::ok(&tables))?;
            } else if tables.is_empty() {
                println!("No tables.");
            } else {
                for table in tables {
                    println!("{}", table);
                }
            }
        }

        Commands::Understand { concept, undo } => {
            let def = content
                .get(&concept)
                .filter(|d| d.kind == ComponentKind::Concept)
                .ok_or_else(|| format!("Unknown concept '{}'", concept))?;
            store.init()?;
            store.set_understood(def.id, !undo)?;
            if cli.json {
                print_json(&JsonOutput::<()>::ok(()))?;
            } else if undo {
                println!("Marked '{}' as not understood.", def.name);
            } else {
                println!("Marked '{}' as understood.", def.name);
            }
        }

        Commands::Reset { id } => {
            let def = content
                .get(&id)
                .ok_or_else(|| format!("Unknown component '{}'", id))?;
            store.init()?;
            let removed = store.clear(def.id)?;
            if cli.json {
                print_json(&JsonOutput::ok(serde_json::json!({ "removed": removed })))?;
            } else if removed {
                println!("Progress on '{}' was reset.", def.name);
            } else {
                println!("No progress recorded for '{}'.", def.name);
            }
        }

        Commands::Stats => {
            store.init()?;
            let stats = store.get_stats()?;
            if cli.json {
                print_json(&JsonOutput::ok(&stats))?;
            } else {
                println!("=== Learning Statistics ===");
                println!(
                    "Skills mastered: {}/{}",
                    stats.skills_mastered,
                    content.skills().count()
                );
                println!("Skills started: {}", stats.skills_started);
                println!(
                    "Concepts understood: {}/{}",
                    stats.concepts_understood,
                    content.concepts().count()
                );
                println!("Attempts: {}", stats.total_attempts);
                println!("Success rate: {:.0}%", stats.success_rate());
            }
        }

        Commands::Tui => {
            store.init()?;
            tui::run(store, databases, content)?;
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
