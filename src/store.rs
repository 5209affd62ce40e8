use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::models::{
    ComponentState, ConceptProgress, InstanceStatus, SkillProgress, Stats, COMPLETION_THRESHOLD,
};

type Result<T> = std::result::Result<T, StoreError>;

const KEY_PREFIX: &str = "component-";
// Unreadable documents are copied here before anything can overwrite them
const CORRUPT_PREFIX: &str = "corrupt-";

/// Persisted learner progress, one JSON document per curriculum component.
pub struct ProgressStore {
    conn: Connection,
}

impl ProgressStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS components (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    fn key(id: &str) -> String {
        format!("{}{}", KEY_PREFIX, id)
    }

    // Raw component document; unreadable documents are backed up and count as absent
    fn load(&self, id: &str) -> Result<Option<ComponentState>> {
        let raw = self.conn.query_row(
            "SELECT value FROM components WHERE key = ?1",
            params![Self::key(id)],
            |row| row.get::<_, String>(0),
        );

        let raw = match raw {
            Ok(v) => v,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                tracing::warn!(component = id, error = %e, "unreadable progress, keeping a backup");
                self.conn.execute(
                    "INSERT OR REPLACE INTO components (key, value, updated_at) VALUES (?1, ?2, ?3)",
                    params![
                        format!("{}{}", CORRUPT_PREFIX, id),
                        raw,
                        Utc::now().to_rfc3339()
                    ],
                )?;
                Ok(None)
            }
        }
    }

    /// Backed-up copy of a document that could not be read.
    pub fn corrupt_backup(&self, id: &str) -> Result<Option<String>> {
        let raw = self.conn.query_row(
            "SELECT value FROM components WHERE key = ?1",
            params![format!("{}{}", CORRUPT_PREFIX, id)],
            |row| row.get::<_, String>(0),
        );
        match raw {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &ComponentState) -> Result<()> {
        let value = serde_json::to_string(state)?;
        self.conn.execute(
            r#"
            INSERT INTO components (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![Self::key(state.id()), value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    // Skill progress operations
    pub fn load_skill(&self, id: &str) -> Result<SkillProgress> {
        match self.load(id)? {
            Some(ComponentState::Skill(p)) => Ok(p),
            Some(ComponentState::Concept(_)) => {
                tracing::warn!(component = id, "stored as concept, reading as fresh skill");
                Ok(SkillProgress::new(id))
            }
            None => Ok(SkillProgress::new(id)),
        }
    }

    pub fn save_skill(&self, progress: &SkillProgress) -> Result<()> {
        self.save(&ComponentState::Skill(progress.clone()))
    }

    // Concept progress operations
    pub fn load_concept(&self, id: &str) -> Result<ConceptProgress> {
        match self.load(id)? {
            Some(ComponentState::Concept(c)) => Ok(c),
            Some(ComponentState::Skill(_)) => {
                tracing::warn!(component = id, "stored as skill, reading as fresh concept");
                Ok(ConceptProgress::new(id))
            }
            None => Ok(ConceptProgress::new(id)),
        }
    }

    pub fn save_concept(&self, progress: &ConceptProgress) -> Result<()> {
        self.save(&ComponentState::Concept(progress.clone()))
    }

    pub fn set_understood(&self, id: &str, understood: bool) -> Result<()> {
        let mut concept = self.load_concept(id)?;
        concept.understood = understood;
        self.save_concept(&concept)
    }

    /// Mastered skill or understood concept. Unknown ids are incomplete.
    pub fn is_complete(&self, id: &str) -> Result<bool> {
        Ok(match self.load(id)? {
            Some(ComponentState::Skill(p)) => p.is_mastered(),
            Some(ComponentState::Concept(c)) => c.understood,
            None => false,
        })
    }

    /// Ids of every stored component, sorted.
    pub fn list_keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM components ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for key in rows {
            let key = key?;
            if let Some(id) = key.strip_prefix(KEY_PREFIX) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    /// Forget one component's progress.
    pub fn clear(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM components WHERE key = ?1", params![Self::key(id)])?;
        Ok(rows > 0)
    }

    pub fn get_stats(&self) -> Result<Stats> {
        let concepts_understood: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM (
                SELECT CASE WHEN json_valid(value) THEN value END AS doc
                FROM components
                WHERE key LIKE 'component-%'
            )
            WHERE json_extract(doc, '$.type') = 'concept'
              AND json_extract(doc, '$.understood') = 1
            "#,
            [],
            |row| row.get(0),
        )?;

        let mut skills_started = 0;
        let mut skills_mastered = 0;
        let mut total_attempts = 0;
        let mut correct_attempts = 0;

        for id in self.list_keys()? {
            let Some(ComponentState::Skill(p)) = self.load(&id)? else {
                continue;
            };
            if p.instances.is_empty() && p.num_solved == 0 {
                continue;
            }
            skills_started += 1;
            if p.num_solved >= COMPLETION_THRESHOLD {
                skills_mastered += 1;
            }
            total_attempts += p.total_attempts() as i64;
            for instance in p.instances.values() {
                correct_attempts += instance
                    .attempts
                    .iter()
                    .filter(|a| a.status == InstanceStatus::Correct)
                    .count() as i64;
            }
        }

        Ok(Stats {
            skills_started,
            skills_mastered,
            concepts_understood,
            total_attempts,
            correct_attempts,
        })
    }
}
