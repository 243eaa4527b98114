//! Progress engine orchestration.
//!
//! One logged activity is applied exactly once to each rule-set: the
//! impact accumulator folds it into the profile, every locked achievement
//! matching the activity's category advances by one, and every in-progress
//! challenge counts it. Challenges completed by the event pay their reward
//! XP back into the profile (through the same level-up rule) and fill
//! their linked badge.
//!
//! The engine never reads the wall clock; `now` is injected once per
//! operation so every transition is deterministic and testable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::achievement::Achievement;
use crate::activity::EcoActivity;
use crate::challenge::Challenge;
use crate::error::ValidationError;
use crate::profile::{ActivityApplied, UserProfile};

/// Everything one logged activity changed, for the caller/UI to report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityOutcome {
    /// Accumulator result: points, levels, streak.
    pub applied: ActivityApplied,
    /// Extra XP paid out by challenges completed on this event.
    pub bonus_points: f64,
    /// Achievements unlocked on this event (including challenge badges).
    pub unlocked_achievements: Vec<Uuid>,
    /// Challenges completed on this event.
    pub completed_challenges: Vec<Uuid>,
}

/// Stateless orchestrator over the three rule-sets.
///
/// Entities are owned by the caller (ultimately the persistence layer);
/// the engine mutates them in place and reports what changed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressEngine;

impl ProgressEngine {
    pub fn new() -> Self {
        Self
    }

    /// Apply one logged activity to the profile, the achievement set and
    /// the active challenges.
    pub fn log_activity(
        &self,
        profile: &mut UserProfile,
        activity: &EcoActivity,
        achievements: &mut [Achievement],
        challenges: &mut [Challenge],
        now: DateTime<Utc>,
    ) -> Result<ActivityOutcome, ValidationError> {
        let applied = profile.apply_activity(activity, now)?;

        let mut unlocked = Vec::new();
        for achievement in achievements.iter_mut() {
            if !achievement.applies_to(activity.category) {
                continue;
            }
            if achievement.record_progress(1.0, now)? {
                unlocked.push(achievement.id);
            }
        }

        let mut completed = Vec::new();
        let mut bonus_points = 0.0;
        for challenge in challenges.iter_mut() {
            if challenge.record_progress(now) {
                completed.push(challenge.id);
                profile.award_points(challenge.reward_points)?;
                bonus_points += challenge.reward_points;
                if let Some(badge_id) = challenge.badge_id {
                    if let Some(badge) =
                        achievements.iter_mut().find(|a| a.id == badge_id)
                    {
                        // Fill whatever the badge still needs; the latch
                        // keeps the unlock date stable if it was already won.
                        let remaining =
                            (badge.progress_required - badge.progress_current).max(0.0);
                        if badge.record_progress(remaining, now)? {
                            unlocked.push(badge.id);
                        }
                    }
                }
            }
        }

        Ok(ActivityOutcome {
            applied,
            bonus_points,
            unlocked_achievements: unlocked,
            completed_challenges: completed,
        })
    }

    /// Poll every challenge for expiry. Returns the ids that failed on
    /// this pass.
    pub fn check_expirations(
        &self,
        challenges: &mut [Challenge],
        now: DateTime<Utc>,
    ) -> Vec<Uuid> {
        challenges
            .iter_mut()
            .filter_map(|c| c.check_expiration(now).then_some(c.id))
            .collect()
    }
}
