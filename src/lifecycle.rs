//! Exercise lifecycle: generating exercises, judging submissions and keeping
//! the learner's progress for each skill.
//!
//! A skill has at most one current [`ExerciseInstance`]. Starting a skill
//! reuses it unless it was generated by an older descriptor version, in which
//! case a fresh instance supersedes it. Submissions are appended as attempts;
//! the first correct submission on an instance credits the skill once.

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::compare::{self, CompareOptions, Comparison};
use crate::engine::{DatabaseRegistry, QueryTable, SandboxDb};
use crate::error::{DbError, ExerciseError};
use crate::exercises::{self, normalize_query, Check, ExerciseDescriptor, QueryEvidence};
use crate::fixtures;
use crate::models::{Attempt, ExerciseInstance, InstanceStatus, SkillProgress};
use crate::store::ProgressStore;

type Result<T> = std::result::Result<T, ExerciseError>;

const CORRECT: &str = "Correct!";
const TEXT_MISMATCH: &str = "Not quite. Compare your query with the task and try again.";
const VALUES_MISMATCH: &str = "The result does not hold exactly the expected answer.";
const UNCHECKABLE: &str = "Your answer could not be checked. Please try again.";

/// Outcome of one submitted answer.
#[derive(Debug, Clone, Serialize)]
pub struct Judgement {
    pub attempt: Attempt,
    pub status: InstanceStatus,
    pub num_solved: u32,
    pub mastered: bool,
    pub comparison: Option<Comparison>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Submission {
    Judged(Judgement),
    /// The stored exercise was stale and got replaced; nothing was judged.
    Regenerated(ExerciseInstance),
}

struct Verdict {
    correct: bool,
    feedback: String,
    comparison: Option<Comparison>,
}

impl Verdict {
    fn rejected(feedback: impl Into<String>) -> Self {
        Self {
            correct: false,
            feedback: feedback.into(),
            comparison: None,
        }
    }
}

fn sandbox_schema(skill_id: &str) -> std::result::Result<String, DbError> {
    fixtures::fixture_for(skill_id).ok_or_else(|| DbError::UnknownSandbox(skill_id.to_string()))
}

/// Sandbox for a skill, created from its fixture on first use.
pub fn open_sandbox(databases: &DatabaseRegistry, skill_id: &str) -> std::result::Result<Arc<SandboxDb>, DbError> {
    let schema = sandbox_schema(skill_id)?;
    databases.get_or_create(skill_id, &schema)
}

/// Throw away whatever earlier queries did to a skill's sandbox.
pub fn reset_sandbox(databases: &DatabaseRegistry, skill_id: &str) -> std::result::Result<Arc<SandboxDb>, DbError> {
    let schema = sandbox_schema(skill_id)?;
    databases.reset(skill_id, &schema)
}

/// Run a free query against a skill's sandbox.
pub fn run_query(
    databases: &DatabaseRegistry,
    skill_id: &str,
    query: &str,
) -> std::result::Result<Vec<QueryTable>, DbError> {
    open_sandbox(databases, skill_id)?;
    databases.execute(skill_id, query)
}

pub struct Tutor<'a> {
    store: &'a ProgressStore,
    databases: &'a DatabaseRegistry,
    rng: StdRng,
}

impl<'a> Tutor<'a> {
    pub fn new(store: &'a ProgressStore, databases: &'a DatabaseRegistry) -> Self {
        Self::with_rng(store, databases, StdRng::from_entropy())
    }

    pub fn with_rng(store: &'a ProgressStore, databases: &'a DatabaseRegistry, rng: StdRng) -> Self {
        Self {
            store,
            databases,
            rng,
        }
    }

    fn descriptor(skill_id: &str) -> Result<&'static ExerciseDescriptor> {
        exercises::descriptor(skill_id).ok_or_else(|| ExerciseError::UnknownSkill(skill_id.to_string()))
    }

    fn check_version(descriptor: &ExerciseDescriptor, instance: &ExerciseInstance) -> Result<()> {
        if instance.version != descriptor.version {
            return Err(ExerciseError::StaleVersion {
                skill: descriptor.skill_id.to_string(),
                found: instance.version,
                expected: descriptor.version,
            });
        }
        Ok(())
    }

    fn generate(&mut self, descriptor: &ExerciseDescriptor, progress: &mut SkillProgress) -> ExerciseInstance {
        let state = descriptor.generate(&mut self.rng);
        let instance = ExerciseInstance::new(
            progress.next_instance_id(),
            descriptor.skill_id,
            descriptor.version,
            state,
        );
        debug!(skill = descriptor.skill_id, instance = instance.id, "generated exercise");
        progress.push_instance(instance.clone());
        instance
    }

    /// Current exercise for a skill, generating one when there is none or the
    /// stored one is stale. Calling twice returns the same exercise.
    pub fn start(&mut self, skill_id: &str) -> Result<ExerciseInstance> {
        let descriptor = Self::descriptor(skill_id)?;
        let mut progress = self.store.load_skill(skill_id)?;

        if let Some(current) = progress.current_instance() {
            match Self::check_version(descriptor, current) {
                Ok(()) => return Ok(current.clone()),
                Err(e) => info!(skill = skill_id, reason = %e, "discarding stale exercise"),
            }
        }

        let instance = self.generate(descriptor, &mut progress);
        self.store.save_skill(&progress)?;
        Ok(instance)
    }

    /// Supersede the current exercise with a freshly generated one.
    pub fn request_new(&mut self, skill_id: &str) -> Result<ExerciseInstance> {
        let descriptor = Self::descriptor(skill_id)?;
        let mut progress = self.store.load_skill(skill_id)?;
        let instance = self.generate(descriptor, &mut progress);
        self.store.save_skill(&progress)?;
        Ok(instance)
    }

    pub fn submit_input(&mut self, skill_id: &str, input: &str) -> Result<Submission> {
        let descriptor = Self::descriptor(skill_id)?;
        let mut progress = self.store.load_skill(skill_id)?;

        let current = progress
            .current_instance()
            .ok_or_else(|| ExerciseError::NoInstance(skill_id.to_string()))?;

        if let Err(e) = Self::check_version(descriptor, current) {
            warn!(skill = skill_id, reason = %e, "submission against stale exercise, regenerating");
            let instance = self.generate(descriptor, &mut progress);
            self.store.save_skill(&progress)?;
            return Ok(Submission::Regenerated(instance));
        }

        let verdict = self.judge(descriptor, current, input);
        let status = if verdict.correct {
            InstanceStatus::Correct
        } else {
            InstanceStatus::Incorrect
        };

        let attempt = Attempt {
            input: input.to_string(),
            normalized: normalize_query(input),
            submitted_at: Utc::now(),
            status,
            feedback: Some(verdict.feedback),
        };

        let mut credited = false;
        if let Some(instance) = progress.current_instance_mut() {
            instance.attempts.push(attempt.clone());
            if !instance.status.is_done() {
                instance.status = status;
                credited = verdict.correct;
            }
        }
        if credited {
            progress.credit();
            info!(skill = skill_id, solved = progress.num_solved, "exercise solved");
        }

        let status = progress
            .current_instance()
            .map(|i| i.status)
            .unwrap_or(status);
        self.store.save_skill(&progress)?;

        Ok(Submission::Judged(Judgement {
            attempt,
            status,
            num_solved: progress.num_solved,
            mastered: progress.is_mastered(),
            comparison: verdict.comparison,
        }))
    }

    // Database and validator failures become a rejected verdict.
    fn judge(&self, descriptor: &ExerciseDescriptor, instance: &ExerciseInstance, input: &str) -> Verdict {
        let evidence = match self.gather_evidence(descriptor, instance, input) {
            Ok(evidence) => evidence,
            Err(e) => {
                debug!(skill = descriptor.skill_id, error = %e, "query failed");
                return Verdict::rejected(e.to_string());
            }
        };

        let correct = match descriptor.validate(input, &instance.state, evidence.as_ref()) {
            Ok(correct) => correct,
            Err(e) => {
                warn!(skill = descriptor.skill_id, error = %e, "validator failed");
                return Verdict::rejected(UNCHECKABLE);
            }
        };

        let comparison = match (descriptor.check, &evidence) {
            (Check::Results, Some(evidence)) => Some(compare::compare_results(
                &evidence.expected,
                &evidence.actual,
                CompareOptions::default(),
            )),
            _ => None,
        };

        let feedback = if correct {
            CORRECT.to_string()
        } else {
            match (&comparison, descriptor.check) {
                (Some(c), _) => c.summary.clone(),
                (None, Check::Values) => VALUES_MISMATCH.to_string(),
                _ => TEXT_MISMATCH.to_string(),
            }
        };

        Verdict {
            correct,
            feedback,
            comparison,
        }
    }

    fn gather_evidence(
        &self,
        descriptor: &ExerciseDescriptor,
        instance: &ExerciseInstance,
        input: &str,
    ) -> std::result::Result<Option<QueryEvidence>, DbError> {
        let skill_id = descriptor.skill_id;
        match descriptor.check {
            Check::Text => Ok(None),
            Check::Values => {
                open_sandbox(self.databases, skill_id)?;
                Ok(Some(QueryEvidence {
                    actual: self.databases.execute(skill_id, input)?,
                    expected: Vec::new(),
                }))
            }
            Check::Results => {
                // Earlier submissions may have changed the data, so both
                // queries see the pristine fixture.
                reset_sandbox(self.databases, skill_id)?;
                let expected = match instance.state.expected_query() {
                    Some(query) => self.databases.execute(skill_id, query)?,
                    None => Vec::new(),
                };
                Ok(Some(QueryEvidence {
                    actual: self.databases.execute(skill_id, input)?,
                    expected,
                }))
            }
        }
    }

    /// Close the current exercise without credit and reveal its solution.
    pub fn give_up(&mut self, skill_id: &str) -> Result<String> {
        let descriptor = Self::descriptor(skill_id)?;
        let mut progress = self.store.load_skill(skill_id)?;

        let instance = progress
            .current_instance_mut()
            .ok_or_else(|| ExerciseError::NoInstance(skill_id.to_string()))?;
        if instance.status != InstanceStatus::Correct {
            instance.status = InstanceStatus::GivenUp;
        }
        // The solution always belongs to the exercise the learner was shown.
        let solution = descriptor.solution(&instance.state);
        let stale = Self::check_version(descriptor, instance).err();

        if let Some(e) = stale {
            warn!(skill = skill_id, reason = %e, "gave up on stale exercise, regenerating");
            self.generate(descriptor, &mut progress);
        }
        self.store.save_skill(&progress)?;
        Ok(solution)
    }

    pub fn hints(&self, skill_id: &str) -> Result<&'static [&'static str]> {
        Ok(Self::descriptor(skill_id)?.hints)
    }

    pub fn progress(&self, skill_id: &str) -> Result<SkillProgress> {
        Self::descriptor(skill_id)?;
        Ok(self.store.load_skill(skill_id)?)
    }

    pub fn describe(&self, instance: &ExerciseInstance) -> Result<String> {
        Ok(Self::descriptor(&instance.skill_id)?.describe(&instance.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::ExerciseState;
    use crate::models::COMPLETION_THRESHOLD;
    use crate::random::testing::ScriptedRandom;

    fn setup_store() -> ProgressStore {
        let store = ProgressStore::open(":memory:").expect("Failed to create in-memory store");
        store.init().expect("Failed to initialize store");
        store
    }

    fn tutor<'a>(store: &'a ProgressStore, databases: &'a DatabaseRegistry) -> Tutor<'a> {
        Tutor::with_rng(store, databases, StdRng::seed_from_u64(42))
    }

    // Persist an exercise with a known state as the skill's current one.
    fn plant(store: &ProgressStore, skill_id: &str, version: u32, state: ExerciseState) {
        let mut progress = store.load_skill(skill_id).unwrap();
        let id = progress.next_instance_id();
        progress.push_instance(ExerciseInstance::new(id, skill_id, version, state));
        store.save_skill(&progress).unwrap();
    }

    fn netherlands() -> ExerciseState {
        exercises::descriptor("filter-rows")
            .unwrap()
            .generate(&mut ScriptedRandom::new(&[0, 0]))
    }

    fn judged(submission: Submission) -> Judgement {
        match submission {
            Submission::Judged(j) => j,
            Submission::Regenerated(_) => panic!("Expected a judged submission"),
        }
    }

    mod start_tests {
        use super::*;

        #[test]
        fn start_is_idempotent() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            let mut tutor = tutor(&store, &databases);

            let first = tutor.start("filter-rows").unwrap();
            let second = tutor.start("filter-rows").unwrap();
            assert_eq!(first.state, second.state);
            assert_eq!(first.id, second.id);
            assert_eq!(store.load_skill("filter-rows").unwrap().instances.len(), 1);
        }

        #[test]
        fn start_unknown_skill() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            let mut tutor = tutor(&store, &databases);

            assert!(matches!(
                tutor.start("database"),
                Err(ExerciseError::UnknownSkill(id)) if id == "database"
            ));
        }

        #[test]
        fn stale_version_is_discarded() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            plant(&store, "filter-rows", 1, netherlands());

            let mut tutor = tutor(&store, &databases);
            let fresh = tutor.start("filter-rows").unwrap();
            assert_eq!(fresh.version, 2);
            assert_eq!(fresh.id, 1);

            let progress = store.load_skill("filter-rows").unwrap();
            assert_eq!(progress.current_instance_id, Some(1));
            assert_eq!(progress.instances[&0].version, 1);
        }

        #[test]
        fn request_new_supersedes() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            let mut tutor = tutor(&store, &databases);

            let first = tutor.start("sort-rows").unwrap();
            let second = tutor.request_new("sort-rows").unwrap();
            assert_ne!(first.id, second.id);
            assert_eq!(tutor.start("sort-rows").unwrap().id, second.id);
        }

        #[test]
        fn describe_renders_task() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            plant(&store, "filter-rows", 2, netherlands());

            let mut tutor = tutor(&store, &databases);
            let instance = tutor.start("filter-rows").unwrap();
            assert!(tutor.describe(&instance).unwrap().contains("Netherlands"));
        }
    }

    mod submit_tests {
        use super::*;

        #[test]
        fn filter_rows_scenario() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            plant(&store, "filter-rows", 2, netherlands());
            let mut tutor = tutor(&store, &databases);

            let wrong = judged(
                tutor
                    .submit_input("filter-rows", "SELECT * FROM companies WHERE country = 'Belgium'")
                    .unwrap(),
            );
            assert_eq!(wrong.status, InstanceStatus::Incorrect);
            assert_eq!(wrong.num_solved, 0);

            let right = judged(
                tutor
                    .submit_input("filter-rows", "select * from companies where country='Netherlands'")
                    .unwrap(),
            );
            assert_eq!(right.status, InstanceStatus::Correct);
            assert_eq!(right.num_solved, 1);
            assert_eq!(right.attempt.feedback.as_deref(), Some(CORRECT));
        }

        #[test]
        fn submit_without_exercise() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            let mut tutor = tutor(&store, &databases);

            assert!(matches!(
                tutor.submit_input("filter-rows", "SELECT 1"),
                Err(ExerciseError::NoInstance(_))
            ));
        }

        #[test]
        fn submit_against_stale_exercise_regenerates() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            plant(&store, "filter-rows", 1, netherlands());
            let mut tutor = tutor(&store, &databases);

            let submission = tutor
                .submit_input("filter-rows", "SELECT * FROM companies WHERE country = 'Netherlands'")
                .unwrap();
            match submission {
                Submission::Regenerated(instance) => assert_eq!(instance.version, 2),
                Submission::Judged(_) => panic!("Stale exercise must not be judged"),
            }

            let progress = store.load_skill("filter-rows").unwrap();
            assert_eq!(progress.num_solved, 0);
            assert!(progress.instances[&0].attempts.is_empty());
        }

        #[test]
        fn attempts_survive_reload() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            plant(&store, "filter-rows", 2, netherlands());
            let mut tutor = tutor(&store, &databases);

            tutor.submit_input("filter-rows", "SELECT nothing").unwrap();
            tutor
                .submit_input("filter-rows", "SELECT * FROM companies WHERE country = 'Netherlands';")
                .unwrap();

            let progress = tutor.progress("filter-rows").unwrap();
            let instance = progress.current_instance().unwrap();
            assert_eq!(instance.state, netherlands());
            assert_eq!(instance.attempts.len(), 2);
            assert_eq!(instance.attempts[0].status, InstanceStatus::Incorrect);
            assert_eq!(instance.attempts[1].status, InstanceStatus::Correct);
            assert_eq!(
                instance.attempts[1].normalized,
                "select*from companies where country='netherlands'"
            );
        }

        #[test]
        fn repeated_correct_submissions_credit_once() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            plant(&store, "filter-rows", 2, netherlands());
            let mut tutor = tutor(&store, &databases);

            let query = "SELECT * FROM companies WHERE country = 'Netherlands'";
            tutor.submit_input("filter-rows", query).unwrap();
            let again = judged(tutor.submit_input("filter-rows", query).unwrap());
            assert_eq!(again.num_solved, 1);
        }

        #[test]
        fn mastery_saturates_at_threshold() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            let mut tutor = tutor(&store, &databases);
            let descriptor = exercises::descriptor("aggregate-columns").unwrap();

            let mut solved = Vec::new();
            for _ in 0..4 {
                let instance = tutor.request_new("aggregate-columns").unwrap();
                let answer = descriptor.solution(&instance.state);
                solved.push(judged(tutor.submit_input("aggregate-columns", &answer).unwrap()));
            }

            assert_eq!(solved[2].num_solved, COMPLETION_THRESHOLD);
            assert!(solved[2].mastered);
            assert_eq!(solved[3].num_solved, COMPLETION_THRESHOLD);
            assert_eq!(store.load_skill("aggregate-columns").unwrap().num_solved, 3);
        }

        #[test]
        fn query_errors_become_attempts() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            let mut tutor = tutor(&store, &databases);
            tutor.start("explore-data").unwrap();

            let j = judged(tutor.submit_input("explore-data", "SELEC broken").unwrap());
            assert_eq!(j.status, InstanceStatus::Incorrect);
            assert!(j.attempt.feedback.unwrap().contains("syntax error"));
        }

        #[test]
        fn validator_errors_become_attempts() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            plant(&store, "sort-rows", 1, ExerciseState::new("broken"));
            let mut tutor = tutor(&store, &databases);

            let j = judged(tutor.submit_input("sort-rows", "SELECT 1").unwrap());
            assert_eq!(j.status, InstanceStatus::Incorrect);
            assert_eq!(j.attempt.feedback.as_deref(), Some(UNCHECKABLE));
        }

        #[test]
        fn results_skill_reports_comparison() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            let mut tutor = tutor(&store, &databases);
            let instance = tutor.start("join-tables").unwrap();

            let wrong = judged(tutor.submit_input("join-tables", "SELECT 1 AS x").unwrap());
            assert_eq!(wrong.status, InstanceStatus::Incorrect);
            let comparison = wrong.comparison.unwrap();
            assert!(!comparison.matches);
            assert_eq!(wrong.attempt.feedback.as_deref(), Some(comparison.summary.as_str()));

            let answer = exercises::descriptor("join-tables")
                .unwrap()
                .solution(&instance.state);
            let right = judged(tutor.submit_input("join-tables", &answer).unwrap());
            assert_eq!(right.status, InstanceStatus::Correct);
            assert!(right.comparison.unwrap().matches);
        }

        #[test]
        fn mutating_submission_does_not_leak_into_next_check() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            let state = exercises::descriptor("join-tables")
                .unwrap()
                .generate(&mut ScriptedRandom::new(&[0]));
            assert_eq!(state.get_str("city"), Some("Amsterdam"));
            plant(&store, "join-tables", 1, state.clone());
            let mut tutor = tutor(&store, &databases);

            let vandal = judged(tutor.submit_input("join-tables", "DELETE FROM positions").unwrap());
            assert_eq!(vandal.status, InstanceStatus::Incorrect);

            // Empty rows only match if the deletion were still visible.
            let answer = state.expected_query().unwrap();
            let empty = judged(
                tutor
                    .submit_input("join-tables", &format!("{} LIMIT 0", answer))
                    .unwrap(),
            );
            assert_eq!(empty.status, InstanceStatus::Incorrect);

            let right = judged(tutor.submit_input("join-tables", answer).unwrap());
            assert_eq!(right.status, InstanceStatus::Correct);
        }
    }

    mod give_up_tests {
        use super::*;

        #[test]
        fn give_up_on_stale_exercise_reveals_its_own_solution() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            let belgium = ExerciseState::new("country")
                .with("country", "Belgium")
                .with_query("SELECT * FROM companies WHERE country = 'Belgium'");
            plant(&store, "filter-rows", 1, belgium);
            let mut tutor = tutor(&store, &databases);

            let solution = tutor.give_up("filter-rows").unwrap();
            assert_eq!(solution, "SELECT * FROM companies WHERE country = 'Belgium'");

            let progress = store.load_skill("filter-rows").unwrap();
            assert_eq!(progress.instances[&0].status, InstanceStatus::GivenUp);
            let fresh = progress.current_instance().unwrap();
            assert_eq!(fresh.id, 1);
            assert_eq!(fresh.version, 2);
            assert_eq!(fresh.status, InstanceStatus::Pending);
        }

        #[test]
        fn give_up_reveals_solution_without_credit() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            plant(&store, "filter-rows", 2, netherlands());
            let mut tutor = tutor(&store, &databases);

            let solution = tutor.give_up("filter-rows").unwrap();
            assert_eq!(solution, "SELECT * FROM companies WHERE country = 'Netherlands'");

            let j = judged(tutor.submit_input("filter-rows", &solution).unwrap());
            assert_eq!(j.status, InstanceStatus::GivenUp);
            assert_eq!(j.num_solved, 0);
            assert_eq!(j.attempt.status, InstanceStatus::Correct);
        }

        #[test]
        fn give_up_after_solving_keeps_correct() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            plant(&store, "filter-rows", 2, netherlands());
            let mut tutor = tutor(&store, &databases);

            tutor
                .submit_input("filter-rows", "SELECT * FROM companies WHERE country = 'Netherlands'")
                .unwrap();
            tutor.give_up("filter-rows").unwrap();

            let progress = store.load_skill("filter-rows").unwrap();
            assert_eq!(progress.current_instance().unwrap().status, InstanceStatus::Correct);
            assert_eq!(progress.num_solved, 1);
        }

        #[test]
        fn hints_come_from_descriptor() {
            let store = setup_store();
            let databases = DatabaseRegistry::new();
            let tutor = tutor(&store, &databases);
            assert!(!tutor.hints("filter-rows").unwrap().is_empty());
            assert!(tutor.hints("nope").is_err());
        }
    }

    mod sandbox_tests {
        use super::*;

        #[test]
        fn run_query_creates_sandbox() {
            let databases = DatabaseRegistry::new();
            let tables = run_query(&databases, "filter-rows", "SELECT COUNT(*) FROM companies").unwrap();
            assert_eq!(tables[0].values[0][0].to_string(), "12");
            assert_eq!(databases.list_tables("filter-rows"), vec!["companies"]);
        }

        #[test]
        fn unknown_skill_has_no_sandbox() {
            let databases = DatabaseRegistry::new();
            assert!(matches!(
                run_query(&databases, "filter-rowz", "SELECT 1"),
                Err(DbError::UnknownSandbox(id)) if id == "filter-rowz"
            ));
            assert!(matches!(
                reset_sandbox(&databases, "filter-rowz"),
                Err(DbError::UnknownSandbox(_))
            ));
            assert!(databases.list_tables("filter-rowz").is_empty());
        }

        #[test]
        fn reset_restores_fixture() {
            let databases = DatabaseRegistry::new();
            run_query(&databases, "delete-rows", "DELETE FROM companies").unwrap();
            reset_sandbox(&databases, "delete-rows").unwrap();
            let tables = run_query(&databases, "delete-rows", "SELECT COUNT(*) FROM companies").unwrap();
            assert_eq!(tables[0].values[0][0].to_string(), "12");
        }
    }
}
