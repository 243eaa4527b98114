//! # Ecolog Core Library
//!
//! This library provides the core business logic for ecolog, a local-first
//! tracker for personal sustainability actions. It implements a CLI-first
//! philosophy where all operations are available via a standalone CLI
//! binary, with any GUI being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Progress Engine**: pure, clock-injected state transitions that fold
//!   logged activities into profile totals, XP, levels and streaks, advance
//!   achievement progress, and drive challenge lifecycles
//! - **Catalog**: static seed data for default achievements and challenges
//! - **Storage**: SQLite-based entity storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`ProgressEngine`]: apply-once orchestration over the three rule-sets
//! - [`UserProfile`]: impact totals and gamification state
//! - [`Achievement`]: one-way unlock latch over monotone progress
//! - [`Challenge`]: strict NotStarted -> InProgress -> (Completed | Failed)
//!   state machine with pull-based expiration
//! - [`Database`]: entity persistence

pub mod achievement;
pub mod activity;
pub mod catalog;
pub mod challenge;
pub mod engine;
pub mod error;
pub mod profile;
pub mod storage;

pub use achievement::{Achievement, AchievementTier};
pub use activity::{ActivityCategory, EcoActivity, ImpactMetrics};
pub use challenge::{Challenge, ChallengeStatus, ChallengeType};
pub use engine::{ActivityOutcome, ProgressEngine};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use profile::{ActivityApplied, UserProfile};
pub use storage::{Config, Database, ImpactSummary};
