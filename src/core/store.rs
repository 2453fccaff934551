use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::error::{CompanionError, Result};
use super::state::{CompanionState, Mood, Personality};

/// Persistence collaborator for companion state.
///
/// Implementations must keep at most one record per user id and make
/// `save` durable before returning.
pub trait StateStore {
    /// Look up the record for a user, if one exists.
    fn find_by_user(&self, user_id: &str) -> Result<Option<CompanionState>>;

    /// Insert a new record. Fails if the user already has one.
    fn create(&self, user_id: &str, state: &CompanionState) -> Result<()>;

    /// Overwrite the existing record for a user.
    fn save(&self, user_id: &str, state: &CompanionState) -> Result<()>;
}

/// SQLite-backed state storage, one row per user.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at the given path.
    pub fn new(db_path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;

        // user_id as primary key enforces one record per user
        conn.execute(
            "CREATE TABLE IF NOT EXISTS companion_states (
                user_id TEXT PRIMARY KEY,
                mood TEXT NOT NULL,
                energy INTEGER NOT NULL,
                bond_level INTEGER NOT NULL,
                last_interaction TEXT NOT NULL,
                total_interactions INTEGER NOT NULL,
                openness REAL NOT NULL,
                conscientiousness REAL NOT NULL,
                extraversion REAL NOT NULL,
                agreeableness REAL NOT NULL,
                neuroticism REAL NOT NULL,
                playfulness REAL NOT NULL,
                empathy REAL NOT NULL,
                humor REAL NOT NULL,
                supportiveness REAL NOT NULL,
                adaptability REAL NOT NULL,
                experience_points INTEGER NOT NULL,
                skills TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_last_interaction
             ON companion_states(last_interaction)",
            [],
        )?;

        tracing::debug!(db = %db_path.display(), "companion store ready");

        Ok(Self { conn })
    }

    fn state_from_row(row: &Row<'_>) -> rusqlite::Result<CompanionState> {
        let mood: String = row.get(1)?;
        let last_interaction: String = row.get(4)?;
        let skills_json: String = row.get(17)?;

        let skills: HashMap<String, u32> =
            serde_json::from_str(&skills_json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    17,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(CompanionState {
            mood: Mood::parse(&mood),
            energy: row.get(2)?,
            bond_level: row.get(3)?,
            last_interaction: DateTime::parse_from_rfc3339(&last_interaction)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        4,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
            total_interactions: row.get(5)?,
            personality: Personality {
                openness: row.get(6)?,
                conscientiousness: row.get(7)?,
                extraversion: row.get(8)?,
                agreeableness: row.get(9)?,
                neuroticism: row.get(10)?,
                playfulness: row.get(11)?,
                empathy: row.get(12)?,
                humor: row.get(13)?,
                supportiveness: row.get(14)?,
                adaptability: row.get(15)?,
            },
            experience_points: row.get(16)?,
            skills,
        })
    }
}

impl StateStore for SqliteStore {
    fn find_by_user(&self, user_id: &str) -> Result<Option<CompanionState>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, mood, energy, bond_level, last_interaction,
                    total_interactions, openness, conscientiousness,
                    extraversion, agreeableness, neuroticism, playfulness,
                    empathy, humor, supportiveness, adaptability,
                    experience_points, skills
             FROM companion_states WHERE user_id = ?1",
        )?;

        let mut rows = stmt.query_map(params![user_id], Self::state_from_row)?;
        match rows.next() {
            Some(state) => Ok(Some(state?)),
            None => Ok(None),
        }
    }

    fn create(&self, user_id: &str, state: &CompanionState) -> Result<()> {
        let skills_json = serde_json::to_string(&state.skills)?;
        self.conn.execute(
            "INSERT INTO companion_states (
                user_id, mood, energy, bond_level, last_interaction,
                total_interactions, openness, conscientiousness,
                extraversion, agreeableness, neuroticism, playfulness,
                empathy, humor, supportiveness, adaptability,
                experience_points, skills
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                       ?13, ?14, ?15, ?16, ?17, ?18)",
            params![
                user_id,
                state.mood.as_str(),
                state.energy,
                state.bond_level,
                state.last_interaction.to_rfc3339(),
                state.total_interactions,
                state.personality.openness,
                state.personality.conscientiousness,
                state.personality.extraversion,
                state.personality.agreeableness,
                state.personality.neuroticism,
                state.personality.playfulness,
                state.personality.empathy,
                state.personality.humor,
                state.personality.supportiveness,
                state.personality.adaptability,
                state.experience_points,
                skills_json,
            ],
        )?;
        Ok(())
    }

    fn save(&self, user_id: &str, state: &CompanionState) -> Result<()> {
        let skills_json = serde_json::to_string(&state.skills)?;
        let rows_affected = self.conn.execute(
            "UPDATE companion_states SET
                mood = ?1, energy = ?2, bond_level = ?3,
                last_interaction = ?4, total_interactions = ?5,
                experience_points = ?6, skills = ?7
             WHERE user_id = ?8",
            params![
                state.mood.as_str(),
                state.energy,
                state.bond_level,
                state.last_interaction.to_rfc3339(),
                state.total_interactions,
                state.experience_points,
                skills_json,
                user_id,
            ],
        )?;

        if rows_affected == 0 {
            return Err(CompanionError::NotFound(user_id.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Action;
    use chrono::Duration;

    fn create_test_store() -> SqliteStore {
        SqliteStore::new(":memory:".into()).unwrap()
    }

    #[test]
    fn test_create_and_find() {
        let store = create_test_store();
        let state = CompanionState::new(Utc::now());

        store.create("alice", &state).unwrap();
        let found = store.find_by_user("alice").unwrap().unwrap();

        assert_eq!(found.mood, state.mood);
        assert_eq!(found.energy, state.energy);
        assert_eq!(found.bond_level, state.bond_level);
        assert_eq!(found.personality, state.personality);
    }

    #[test]
    fn test_find_missing_returns_none() {
        let store = create_test_store();
        assert!(store.find_by_user("nobody").unwrap().is_none());
    }

    #[test]
    fn test_one_record_per_user() {
        let store = create_test_store();
        let state = CompanionState::new(Utc::now());

        store.create("alice", &state).unwrap();
        assert!(store.create("alice", &state).is_err());
    }

    #[test]
    fn test_save_roundtrip() {
        let store = create_test_store();
        let now = Utc::now();
        let mut state = CompanionState::new(now);
        store.create("alice", &state).unwrap();

        state.apply_action(Action::Play, now + Duration::hours(1));
        state.skills.insert("conversation".to_string(), 3);
        state.experience_points = 120;
        store.save("alice", &state).unwrap();

        let found = store.find_by_user("alice").unwrap().unwrap();
        assert_eq!(found.mood, Mood::Excited);
        assert_eq!(found.energy, 75);
        assert_eq!(found.bond_level, 53);
        assert_eq!(found.total_interactions, 1);
        assert_eq!(found.experience_points, 120);
        assert_eq!(found.skills.get("conversation"), Some(&3));
    }

    #[test]
    fn test_save_missing_is_not_found() {
        let store = create_test_store();
        let state = CompanionState::new(Utc::now());

        let err = store.save("ghost", &state).unwrap_err();
        assert!(matches!(err, CompanionError::NotFound(_)));
    }

    #[test]
    fn test_timestamp_roundtrip_keeps_instant() {
        let store = create_test_store();
        let state = CompanionState::new(Utc::now());
        store.create("alice", &state).unwrap();

        let found = store.find_by_user("alice").unwrap().unwrap();
        // RFC 3339 text storage keeps sub-second precision
        assert_eq!(found.last_interaction, state.last_interaction);
    }
}
