//! Time-boxed and milestone challenges.
//!
//! A challenge is a strict state machine:
//!
//! ```text
//! NotStarted -> InProgress -> (Completed | Failed)
//! ```
//!
//! Both terminals are final. Expiration is pull-based: the entity has no
//! self-driven timer, the caller polls [`Challenge::check_expiration`] with
//! an injected `now`. "Failed" is a normal domain outcome, never an error.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    /// One day from joining.
    Daily,
    /// Seven days from joining.
    Weekly,
    /// Open-ended, no deadline.
    Milestone,
}

impl ChallengeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::Daily => "daily",
            ChallengeType::Weekly => "weekly",
            ChallengeType::Milestone => "milestone",
        }
    }

    pub fn from_str_tag(tag: &str) -> Option<Self> {
        match tag {
            "daily" => Some(ChallengeType::Daily),
            "weekly" => Some(ChallengeType::Weekly),
            "milestone" => Some(ChallengeType::Milestone),
            _ => None,
        }
    }

    /// Deadline for a challenge joined at `joined`. Milestones have none.
    fn end_date(&self, joined: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ChallengeType::Daily => Some(joined + Duration::days(1)),
            ChallengeType::Weekly => Some(joined + Duration::days(7)),
            ChallengeType::Milestone => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl ChallengeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChallengeStatus::Completed | ChallengeStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeStatus::NotStarted => "not_started",
            ChallengeStatus::InProgress => "in_progress",
            ChallengeStatus::Completed => "completed",
            ChallengeStatus::Failed => "failed",
        }
    }

    pub fn from_str_tag(tag: &str) -> Option<Self> {
        match tag {
            "not_started" => Some(ChallengeStatus::NotStarted),
            "in_progress" => Some(ChallengeStatus::InProgress),
            "completed" => Some(ChallengeStatus::Completed),
            "failed" => Some(ChallengeStatus::Failed),
            _ => None,
        }
    }
}

/// One user's participation in a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub challenge_type: ChallengeType,
    /// Qualifying events needed to complete. Always > 0.
    pub target_count: u32,
    pub current_progress: u32,
    pub status: ChallengeStatus,
    pub is_active: bool,
    pub owner_id: Option<Uuid>,
    pub joined_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    /// Deadline; `None` for milestone challenges.
    pub end_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    /// XP awarded on completion.
    pub reward_points: f64,
    /// Achievement unlocked on completion, if any.
    pub badge_id: Option<Uuid>,
}

impl Challenge {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        challenge_type: ChallengeType,
        target_count: u32,
        reward_points: f64,
    ) -> Result<Self, ValidationError> {
        if target_count == 0 {
            return Err(ValidationError::NonPositiveTarget {
                field: "target_count",
            });
        }
        if !reward_points.is_finite() || reward_points < 0.0 {
            return Err(ValidationError::InvalidReward(reward_points));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            challenge_type,
            target_count,
            current_progress: 0,
            status: ChallengeStatus::NotStarted,
            is_active: false,
            owner_id: None,
            joined_date: None,
            start_date: None,
            end_date: None,
            completed_date: None,
            reward_points,
            badge_id: None,
        })
    }

    pub fn with_badge(mut self, badge_id: Uuid) -> Self {
        self.badge_id = Some(badge_id);
        self
    }

    /// Opt a user in. Valid only from `NotStarted`; re-joining an active or
    /// finished challenge is rejected rather than silently resetting it.
    pub fn join(&mut self, user_id: Uuid, now: DateTime<Utc>) -> Result<(), ValidationError> {
        match self.status {
            ChallengeStatus::NotStarted => {
                self.owner_id = Some(user_id);
                self.joined_date = Some(now);
                self.start_date = Some(now);
                self.end_date = self.challenge_type.end_date(now);
                self.is_active = true;
                self.status = ChallengeStatus::InProgress;
                Ok(())
            }
            ChallengeStatus::InProgress
            | ChallengeStatus::Completed
            | ChallengeStatus::Failed => {
                Err(ValidationError::ChallengeAlreadyJoined(self.title.clone()))
            }
        }
    }

    /// Count one qualifying event. Explicit no-op unless `InProgress`.
    ///
    /// Returns whether this call completed the challenge.
    pub fn record_progress(&mut self, now: DateTime<Utc>) -> bool {
        match self.status {
            ChallengeStatus::InProgress => {
                self.current_progress += 1;
                if self.current_progress >= self.target_count {
                    self.status = ChallengeStatus::Completed;
                    self.is_active = false;
                    self.completed_date = Some(now);
                    true
                } else {
                    false
                }
            }
            ChallengeStatus::NotStarted
            | ChallengeStatus::Completed
            | ChallengeStatus::Failed => false,
        }
    }

    /// Poll for expiry. Only an `InProgress` challenge with a deadline can
    /// fail; every other state is left untouched, so repeated polling is
    /// idempotent.
    ///
    /// Returns whether this call failed the challenge.
    pub fn check_expiration(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != ChallengeStatus::InProgress {
            return false;
        }
        match self.end_date {
            Some(end) if now > end && self.current_progress < self.target_count => {
                self.status = ChallengeStatus::Failed;
                self.is_active = false;
                true
            }
            Some(_) | None => false,
        }
    }

    /// Displayed progress, clamped to 100.
    pub fn progress_percentage(&self) -> f64 {
        (self.current_progress as f64 / self.target_count as f64 * 100.0).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn challenge(ty: ChallengeType, target: u32) -> Challenge {
        Challenge::new("Car-free week", "Skip the car", ty, target, 50.0).unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_join_sets_dates_weekly() {
        let mut c = challenge(ChallengeType::Weekly, 5);
        let user = Uuid::new_v4();
        c.join(user, t0()).unwrap();
        assert_eq!(c.status, ChallengeStatus::InProgress);
        assert!(c.is_active);
        assert_eq!(c.owner_id, Some(user));
        assert_eq!(c.joined_date, Some(t0()));
        assert_eq!(c.start_date, Some(t0()));
        assert_eq!(c.end_date, Some(t0() + Duration::days(7)));
    }

    #[test]
    fn test_join_daily_and_milestone_deadlines() {
        let mut daily = challenge(ChallengeType::Daily, 1);
        daily.join(Uuid::new_v4(), t0()).unwrap();
        assert_eq!(daily.end_date, Some(t0() + Duration::days(1)));

        let mut milestone = challenge(ChallengeType::Milestone, 10);
        milestone.join(Uuid::new_v4(), t0()).unwrap();
        assert_eq!(milestone.end_date, None);
    }

    #[test]
    fn test_rejoin_rejected() {
        let mut c = challenge(ChallengeType::Daily, 2);
        let user = Uuid::new_v4();
        c.join(user, t0()).unwrap();
        assert!(matches!(
            c.join(user, t0() + Duration::hours(1)),
            Err(ValidationError::ChallengeAlreadyJoined(_))
        ));
        // Terminal states reject joins too.
        c.record_progress(t0());
        c.record_progress(t0());
        assert!(c.status.is_terminal());
        assert!(c.join(user, t0()).is_err());
    }

    #[test]
    fn test_progress_to_completion() {
        let mut c = challenge(ChallengeType::Weekly, 3);
        c.join(Uuid::new_v4(), t0()).unwrap();
        assert!(!c.record_progress(t0()));
        assert!(!c.record_progress(t0()));
        assert!(c.record_progress(t0()));
        assert_eq!(c.status, ChallengeStatus::Completed);
        assert!(!c.is_active);
        assert_eq!(c.completed_date, Some(t0()));
        // Terminal: further progress is an explicit no-op.
        assert!(!c.record_progress(t0()));
        assert_eq!(c.current_progress, 3);
    }

    #[test]
    fn test_progress_before_join_is_noop() {
        let mut c = challenge(ChallengeType::Milestone, 3);
        assert!(!c.record_progress(t0()));
        assert_eq!(c.current_progress, 0);
        assert_eq!(c.status, ChallengeStatus::NotStarted);
    }

    #[test]
    fn test_daily_expires_after_deadline() {
        let mut c = challenge(ChallengeType::Daily, 5);
        c.join(Uuid::new_v4(), t0()).unwrap();
        c.record_progress(t0());
        // 25 hours later, short of target.
        assert!(c.check_expiration(t0() + Duration::hours(25)));
        assert_eq!(c.status, ChallengeStatus::Failed);
        assert!(!c.is_active);
    }

    #[test]
    fn test_expiration_noop_before_deadline_and_on_milestone() {
        let mut c = challenge(ChallengeType::Daily, 5);
        c.join(Uuid::new_v4(), t0()).unwrap();
        assert!(!c.check_expiration(t0() + Duration::hours(23)));
        assert_eq!(c.status, ChallengeStatus::InProgress);

        let mut m = challenge(ChallengeType::Milestone, 5);
        m.join(Uuid::new_v4(), t0()).unwrap();
        assert!(!m.check_expiration(t0() + Duration::days(400)));
        assert_eq!(m.status, ChallengeStatus::InProgress);
    }

    #[test]
    fn test_expiration_idempotent_in_terminal_states() {
        let mut c = challenge(ChallengeType::Daily, 1);
        c.join(Uuid::new_v4(), t0()).unwrap();
        c.record_progress(t0());
        assert_eq!(c.status, ChallengeStatus::Completed);
        let snapshot = c.clone();
        assert!(!c.check_expiration(t0() + Duration::days(30)));
        assert_eq!(c.status, snapshot.status);
        assert_eq!(c.current_progress, snapshot.current_progress);
        assert_eq!(c.completed_date, snapshot.completed_date);

        let mut f = challenge(ChallengeType::Daily, 5);
        f.join(Uuid::new_v4(), t0()).unwrap();
        f.check_expiration(t0() + Duration::days(2));
        assert_eq!(f.status, ChallengeStatus::Failed);
        assert!(!f.check_expiration(t0() + Duration::days(3)));
        assert_eq!(f.status, ChallengeStatus::Failed);
    }

    #[test]
    fn test_zero_target_rejected() {
        assert!(Challenge::new("x", "y", ChallengeType::Daily, 0, 0.0).is_err());
    }

    #[test]
    fn test_bad_reward_rejected() {
        // A negative reward would otherwise surface as an error only after
        // the challenge had already transitioned to completed.
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Challenge::new("x", "y", ChallengeType::Daily, 1, bad),
                Err(ValidationError::InvalidReward(_))
            ));
        }
        assert!(Challenge::new("x", "y", ChallengeType::Daily, 1, 0.0).is_ok());
    }

    #[test]
    fn test_progress_percentage_clamped() {
        let mut c = challenge(ChallengeType::Milestone, 4);
        c.join(Uuid::new_v4(), t0()).unwrap();
        c.record_progress(t0());
        assert_eq!(c.progress_percentage(), 25.0);
        for _ in 0..10 {
            c.record_progress(t0());
        }
        assert_eq!(c.progress_percentage(), 100.0);
    }
}
