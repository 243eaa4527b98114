//! SQLite-based entity storage.
//!
//! Provides persistent storage for:
//! - User profiles and their gamification state
//! - Logged eco activities
//! - Achievement progress
//! - Challenge instances
//!
//! The progress engine itself never touches the database; callers load
//! entities, run the engine, and save what changed.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::achievement::{Achievement, AchievementTier};
use crate::activity::{ActivityCategory, EcoActivity, ImpactMetrics};
use crate::challenge::{Challenge, ChallengeStatus, ChallengeType};
use crate::error::DatabaseError;
use crate::profile::UserProfile;

use super::data_dir;

/// Aggregate impact view for the profile screen.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImpactSummary {
    pub totals: ImpactMetrics,
    pub activities_logged: u64,
    pub by_category: HashMap<String, u64>,
}

/// SQLite database for ecolog entities.
pub struct Database {
    conn: Connection,
}

fn parse_ts(text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn parse_uuid(text: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn bad_tag(what: &'static str, tag: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        format!("unknown {what} tag '{tag}'").into(),
    )
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/ecolog/ecolog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("ecolog.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and dry runs).
    pub fn open_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS profiles (
                id                  TEXT PRIMARY KEY,
                display_name        TEXT NOT NULL,
                email               TEXT,
                carbon_kg           REAL NOT NULL DEFAULT 0,
                water_liters        REAL NOT NULL DEFAULT 0,
                land_m2             REAL NOT NULL DEFAULT 0,
                plastic_items       REAL NOT NULL DEFAULT 0,
                level               INTEGER NOT NULL DEFAULT 1,
                experience_points   REAL NOT NULL DEFAULT 0,
                streak              INTEGER NOT NULL DEFAULT 0,
                longest_streak      INTEGER NOT NULL DEFAULT 0,
                last_activity_date  TEXT,
                notifications       INTEGER NOT NULL DEFAULT 1,
                weekly_summary      INTEGER NOT NULL DEFAULT 1,
                created_at          TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS activities (
                id            TEXT PRIMARY KEY,
                owner_id      TEXT NOT NULL,
                category      TEXT NOT NULL,
                description   TEXT NOT NULL,
                notes         TEXT,
                carbon_kg     REAL NOT NULL,
                water_liters  REAL NOT NULL,
                land_m2       REAL NOT NULL,
                plastic_items REAL NOT NULL,
                distance_km   REAL,
                duration_min  INTEGER,
                photo_path    TEXT,
                logged_at     TEXT NOT NULL,
                synced        INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS achievements (
                id                TEXT PRIMARY KEY,
                name              TEXT NOT NULL,
                description       TEXT NOT NULL,
                category          TEXT,
                tier              TEXT NOT NULL,
                progress_current  REAL NOT NULL DEFAULT 0,
                progress_required REAL NOT NULL,
                is_unlocked       INTEGER NOT NULL DEFAULT 0,
                unlocked_date     TEXT
            );

            CREATE TABLE IF NOT EXISTS challenges (
                id               TEXT PRIMARY KEY,
                title            TEXT NOT NULL,
                description      TEXT NOT NULL,
                challenge_type   TEXT NOT NULL,
                target_count     INTEGER NOT NULL,
                current_progress INTEGER NOT NULL DEFAULT 0,
                status           TEXT NOT NULL,
                is_active        INTEGER NOT NULL DEFAULT 0,
                owner_id         TEXT,
                joined_date      TEXT,
                start_date       TEXT,
                end_date         TEXT,
                completed_date   TEXT,
                reward_points    REAL NOT NULL DEFAULT 0,
                badge_id         TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_activities_owner ON activities(owner_id);
            CREATE INDEX IF NOT EXISTS idx_activities_logged_at ON activities(logged_at);
            CREATE INDEX IF NOT EXISTS idx_activities_category ON activities(category);
            CREATE INDEX IF NOT EXISTS idx_challenges_status ON challenges(status);",
        )?;
        Ok(())
    }

    // ── Profiles ─────────────────────────────────────────────────────

    pub fn save_profile(&self, profile: &UserProfile) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO profiles (id, display_name, email, carbon_kg, water_liters,
                land_m2, plastic_items, level, experience_points, streak,
                longest_streak, last_activity_date, notifications, weekly_summary,
                created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                email = excluded.email,
                carbon_kg = excluded.carbon_kg,
                water_liters = excluded.water_liters,
                land_m2 = excluded.land_m2,
                plastic_items = excluded.plastic_items,
                level = excluded.level,
                experience_points = excluded.experience_points,
                streak = excluded.streak,
                longest_streak = excluded.longest_streak,
                last_activity_date = excluded.last_activity_date,
                notifications = excluded.notifications,
                weekly_summary = excluded.weekly_summary",
            params![
                profile.id.to_string(),
                profile.display_name,
                profile.email,
                profile.totals.carbon_kg,
                profile.totals.water_liters,
                profile.totals.land_m2,
                profile.totals.plastic_items,
                profile.level,
                profile.experience_points,
                profile.streak,
                profile.longest_streak,
                profile.last_activity_date.map(|d| d.to_rfc3339()),
                profile.notifications_enabled,
                profile.weekly_summary_enabled,
                profile.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn load_profile(&self, id: Uuid) -> Result<Option<UserProfile>, DatabaseError> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, display_name, email, carbon_kg, water_liters, land_m2,
                        plastic_items, level, experience_points, streak, longest_streak,
                        last_activity_date, notifications, weekly_summary, created_at
                 FROM profiles WHERE id = ?1",
                params![id.to_string()],
                Self::row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    /// Load the device's profile (local-first: one profile per install).
    pub fn first_profile(&self) -> Result<Option<UserProfile>, DatabaseError> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, display_name, email, carbon_kg, water_liters, land_m2,
                        plastic_items, level, experience_points, streak, longest_streak,
                        last_activity_date, notifications, weekly_summary, created_at
                 FROM profiles ORDER BY created_at LIMIT 1",
                [],
                Self::row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserProfile> {
        let id: String = row.get(0)?;
        let last_activity: Option<String> = row.get(11)?;
        let created_at: String = row.get(14)?;
        Ok(UserProfile {
            id: parse_uuid(&id)?,
            display_name: row.get(1)?,
            email: row.get(2)?,
            totals: ImpactMetrics {
                carbon_kg: row.get(3)?,
                water_liters: row.get(4)?,
                land_m2: row.get(5)?,
                plastic_items: row.get(6)?,
            },
            level: row.get(7)?,
            experience_points: row.get(8)?,
            streak: row.get(9)?,
            longest_streak: row.get(10)?,
            last_activity_date: last_activity.as_deref().map(parse_ts).transpose()?,
            notifications_enabled: row.get(12)?,
            weekly_summary_enabled: row.get(13)?,
            created_at: parse_ts(&created_at)?,
        })
    }

    // ── Activities ───────────────────────────────────────────────────

    pub fn insert_activity(&self, activity: &EcoActivity) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO activities (id, owner_id, category, description, notes,
                carbon_kg, water_liters, land_m2, plastic_items, distance_km,
                duration_min, photo_path, logged_at, synced)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                activity.id.to_string(),
                activity.owner_id.to_string(),
                activity.category.as_str(),
                activity.description,
                activity.notes,
                activity.metrics.carbon_kg,
                activity.metrics.water_liters,
                activity.metrics.land_m2,
                activity.metrics.plastic_items,
                activity.distance_km,
                activity.duration_min,
                activity.photo_path,
                activity.logged_at.to_rfc3339(),
                activity.synced,
            ],
        )?;
        Ok(())
    }

    /// Flip the sync flag once a record has been persisted remotely. The
    /// one permitted mutation of a stored activity.
    pub fn mark_activity_synced(&self, id: Uuid) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE activities SET synced = 1 WHERE id = ?1",
            params![id.to_string()],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(format!("activity {id}")));
        }
        Ok(())
    }

    /// Most recent activities for an owner, newest first.
    pub fn list_activities(
        &self,
        owner_id: Uuid,
        limit: u32,
    ) -> Result<Vec<EcoActivity>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, category, description, notes, carbon_kg,
                    water_liters, land_m2, plastic_items, distance_km, duration_min,
                    photo_path, logged_at, synced
             FROM activities WHERE owner_id = ?1
             ORDER BY logged_at DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![owner_id.to_string(), limit], |row| {
            let id: String = row.get(0)?;
            let owner: String = row.get(1)?;
            let category: String = row.get(2)?;
            let logged_at: String = row.get(12)?;
            Ok(EcoActivity {
                id: parse_uuid(&id)?,
                owner_id: parse_uuid(&owner)?,
                category: ActivityCategory::from_str_tag(&category)
                    .ok_or_else(|| bad_tag("category", &category))?,
                description: row.get(3)?,
                notes: row.get(4)?,
                metrics: ImpactMetrics {
                    carbon_kg: row.get(5)?,
                    water_liters: row.get(6)?,
                    land_m2: row.get(7)?,
                    plastic_items: row.get(8)?,
                },
                distance_km: row.get(9)?,
                duration_min: row.get(10)?,
                photo_path: row.get(11)?,
                logged_at: parse_ts(&logged_at)?,
                synced: row.get(13)?,
            })
        })?;
        let mut activities = Vec::new();
        for row in rows {
            activities.push(row?);
        }
        Ok(activities)
    }

    /// Aggregate lifetime impact from the activity log.
    pub fn impact_summary(&self, owner_id: Uuid) -> Result<ImpactSummary, DatabaseError> {
        let mut summary: ImpactSummary = self.conn.query_row(
            "SELECT COALESCE(SUM(carbon_kg), 0), COALESCE(SUM(water_liters), 0),
                    COALESCE(SUM(land_m2), 0), COALESCE(SUM(plastic_items), 0),
                    COUNT(*)
             FROM activities WHERE owner_id = ?1",
            params![owner_id.to_string()],
            |row| {
                Ok(ImpactSummary {
                    totals: ImpactMetrics {
                        carbon_kg: row.get(0)?,
                        water_liters: row.get(1)?,
                        land_m2: row.get(2)?,
                        plastic_items: row.get(3)?,
                    },
                    activities_logged: row.get(4)?,
                    by_category: HashMap::new(),
                })
            },
        )?;
        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*) FROM activities
             WHERE owner_id = ?1 GROUP BY category",
        )?;
        let rows = stmt.query_map(params![owner_id.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;
        for row in rows {
            let (category, count) = row?;
            summary.by_category.insert(category, count);
        }
        Ok(summary)
    }

    // ── Achievements ─────────────────────────────────────────────────

    pub fn save_achievement(&self, achievement: &Achievement) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO achievements (id, name, description, category, tier,
                progress_current, progress_required, is_unlocked, unlocked_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                progress_current = excluded.progress_current,
                is_unlocked = excluded.is_unlocked,
                unlocked_date = excluded.unlocked_date",
            params![
                achievement.id.to_string(),
                achievement.name,
                achievement.description,
                achievement.category.map(|c| c.as_str()),
                achievement.tier.as_str(),
                achievement.progress_current,
                achievement.progress_required,
                achievement.is_unlocked,
                achievement.unlocked_date.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    pub fn list_achievements(&self) -> Result<Vec<Achievement>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, category, tier, progress_current,
                    progress_required, is_unlocked, unlocked_date
             FROM achievements ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let category: Option<String> = row.get(3)?;
            let tier: String = row.get(4)?;
            let unlocked_date: Option<String> = row.get(8)?;
            Ok(Achievement {
                id: parse_uuid(&id)?,
                name: row.get(1)?,
                description: row.get(2)?,
                category: category
                    .as_deref()
                    .map(|tag| {
                        ActivityCategory::from_str_tag(tag)
                            .ok_or_else(|| bad_tag("category", tag))
                    })
                    .transpose()?,
                tier: AchievementTier::from_str_tag(&tier)
                    .ok_or_else(|| bad_tag("tier", &tier))?,
                progress_current: row.get(5)?,
                progress_required: row.get(6)?,
                is_unlocked: row.get(7)?,
                unlocked_date: unlocked_date.as_deref().map(parse_ts).transpose()?,
            })
        })?;
        let mut achievements = Vec::new();
        for row in rows {
            achievements.push(row?);
        }
        Ok(achievements)
    }

    // ── Challenges ───────────────────────────────────────────────────

    pub fn save_challenge(&self, challenge: &Challenge) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO challenges (id, title, description, challenge_type,
                target_count, current_progress, status, is_active, owner_id,
                joined_date, start_date, end_date, completed_date, reward_points,
                badge_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(id) DO UPDATE SET
                current_progress = excluded.current_progress,
                status = excluded.status,
                is_active = excluded.is_active,
                owner_id = excluded.owner_id,
                joined_date = excluded.joined_date,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                completed_date = excluded.completed_date",
            params![
                challenge.id.to_string(),
                challenge.title,
                challenge.description,
                challenge.challenge_type.as_str(),
                challenge.target_count,
                challenge.current_progress,
                challenge.status.as_str(),
                challenge.is_active,
                challenge.owner_id.map(|id| id.to_string()),
                challenge.joined_date.map(|d| d.to_rfc3339()),
                challenge.start_date.map(|d| d.to_rfc3339()),
                challenge.end_date.map(|d| d.to_rfc3339()),
                challenge.completed_date.map(|d| d.to_rfc3339()),
                challenge.reward_points,
                challenge.badge_id.map(|id| id.to_string()),
            ],
        )?;
        Ok(())
    }

    pub fn list_challenges(&self) -> Result<Vec<Challenge>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, challenge_type, target_count,
                    current_progress, status, is_active, owner_id, joined_date,
                    start_date, end_date, completed_date, reward_points, badge_id
             FROM challenges ORDER BY title",
        )?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let challenge_type: String = row.get(3)?;
            let status: String = row.get(6)?;
            let owner: Option<String> = row.get(8)?;
            let joined: Option<String> = row.get(9)?;
            let start: Option<String> = row.get(10)?;
            let end: Option<String> = row.get(11)?;
            let completed: Option<String> = row.get(12)?;
            let badge: Option<String> = row.get(14)?;
            Ok(Challenge {
                id: parse_uuid(&id)?,
                title: row.get(1)?,
                description: row.get(2)?,
                challenge_type: ChallengeType::from_str_tag(&challenge_type)
                    .ok_or_else(|| bad_tag("challenge_type", &challenge_type))?,
                target_count: row.get(4)?,
                current_progress: row.get(5)?,
                status: ChallengeStatus::from_str_tag(&status)
                    .ok_or_else(|| bad_tag("status", &status))?,
                is_active: row.get(7)?,
                owner_id: owner.as_deref().map(parse_uuid).transpose()?,
                joined_date: joined.as_deref().map(parse_ts).transpose()?,
                start_date: start.as_deref().map(parse_ts).transpose()?,
                end_date: end.as_deref().map(parse_ts).transpose()?,
                completed_date: completed.as_deref().map(parse_ts).transpose()?,
                reward_points: row.get(13)?,
                badge_id: badge.as_deref().map(parse_uuid).transpose()?,
            })
        })?;
        let mut challenges = Vec::new();
        for row in rows {
            challenges.push(row?);
        }
        Ok(challenges)
    }

    /// Seed the default catalog if the tables are empty. Returns whether
    /// anything was inserted.
    pub fn seed_catalog(&self) -> Result<bool, DatabaseError> {
        let achievement_count: u64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM achievements", [], |row| row.get(0))?;
        let challenge_count: u64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM challenges", [], |row| row.get(0))?;
        if achievement_count > 0 || challenge_count > 0 {
            return Ok(false);
        }
        for achievement in crate::catalog::default_achievements() {
            self.save_achievement(&achievement)?;
        }
        for challenge in crate::catalog::default_challenge_instances() {
            self.save_challenge(&challenge)?;
        }
        Ok(true)
    }
}
