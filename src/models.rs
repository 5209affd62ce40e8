use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::exercises::ExerciseState;

// Correct submissions needed before a skill counts as mastered
pub const COMPLETION_THRESHOLD: u32 = 3;

// Status of one generated exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    #[default]
    Pending,
    Correct,
    Incorrect,
    #[serde(rename = "givenUp")]
    GivenUp,
}

impl InstanceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InstanceStatus::Pending => "Pending",
            InstanceStatus::Correct => "Correct",
            InstanceStatus::Incorrect => "Incorrect",
            InstanceStatus::GivenUp => "Solution shown",
        }
    }

    // Finished exercises no longer earn credit
    pub fn is_done(&self) -> bool {
        matches!(self, InstanceStatus::Correct | InstanceStatus::GivenUp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub input: String,
    #[serde(default)]
    pub normalized: String,
    pub submitted_at: DateTime<Utc>,
    pub status: InstanceStatus,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseInstance {
    pub id: u32,
    pub skill_id: String,
    // Missing in old records, which makes them stale
    #[serde(default)]
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub state: ExerciseState,
    #[serde(default)]
    pub status: InstanceStatus,
    #[serde(default)]
    pub attempts: Vec<Attempt>,
}

impl ExerciseInstance {
    pub fn new(id: u32, skill_id: &str, version: u32, state: ExerciseState) -> Self {
        Self {
            id,
            skill_id: skill_id.to_string(),
            version,
            generated_at: Utc::now(),
            state,
            status: InstanceStatus::Pending,
            attempts: Vec::new(),
        }
    }

    pub fn last_attempt(&self) -> Option<&Attempt> {
        self.attempts.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillProgress {
    pub id: String,
    pub num_solved: u32,
    pub instances: BTreeMap<u32, ExerciseInstance>,
    pub current_instance_id: Option<u32>,
}

impl SkillProgress {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    pub fn current_instance(&self) -> Option<&ExerciseInstance> {
        self.current_instance_id
            .and_then(|id| self.instances.get(&id))
    }

    pub fn current_instance_mut(&mut self) -> Option<&mut ExerciseInstance> {
        match self.current_instance_id {
            Some(id) => self.instances.get_mut(&id),
            None => None,
        }
    }

    pub fn next_instance_id(&self) -> u32 {
        self.instances
            .keys()
            .next_back()
            .map(|id| id + 1)
            .unwrap_or(0)
    }

    // Superseded instances stay in the history
    pub fn push_instance(&mut self, instance: ExerciseInstance) {
        self.current_instance_id = Some(instance.id);
        self.instances.insert(instance.id, instance);
    }

    pub fn is_mastered(&self) -> bool {
        self.num_solved >= COMPLETION_THRESHOLD
    }

    pub fn credit(&mut self) {
        self.num_solved = (self.num_solved + 1).min(COMPLETION_THRESHOLD);
    }

    pub fn total_attempts(&self) -> usize {
        self.instances.values().map(|i| i.attempts.len()).sum()
    }

    pub fn mastery_label(&self) -> &'static str {
        match self.num_solved {
            0 => "New",
            n if n >= COMPLETION_THRESHOLD => "Mastered",
            _ => "Practising",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ConceptProgress {
    pub id: String,
    pub understood: bool,
}

impl ConceptProgress {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            understood: false,
        }
    }
}

// Stored value for one curriculum component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentState {
    Skill(SkillProgress),
    Concept(ConceptProgress),
}

// Derived internally tagged deserialization buffers map keys as strings and
// cannot read the numeric instance ids back, so dispatch on `type` by hand.
impl<'de> Deserialize<'de> for ComponentState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| <D::Error as de::Error>::missing_field("type"))?;

        match kind.as_str() {
            "skill" => serde_json::from_value(value)
                .map(ComponentState::Skill)
                .map_err(de::Error::custom),
            "concept" => serde_json::from_value(value)
                .map(ComponentState::Concept)
                .map_err(de::Error::custom),
            other => Err(de::Error::unknown_variant(other, &["skill", "concept"])),
        }
    }
}

impl ComponentState {
    pub fn id(&self) -> &str {
        match self {
            ComponentState::Skill(s) => &s.id,
            ComponentState::Concept(c) => &c.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub skills_started: i64,
    pub skills_mastered: i64,
    pub concepts_understood: i64,
    pub total_attempts: i64,
    pub correct_attempts: i64,
}

impl Stats {
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            (self.correct_attempts as f64 / self.total_attempts as f64) * 100.0
        }
    }
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
