//! User profile and the impact accumulator.
//!
//! The accumulator folds a logged activity into a profile's lifetime
//! totals and derives XP, level and streak changes. Effects are ordered:
//! totals first, then XP, then the level-up loop (which reads the
//! post-accumulation total), then the streak update (which reads the
//! pre-update `last_activity_date`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activity::{EcoActivity, ImpactMetrics};
use crate::error::ValidationError;

/// XP required to leave level L is `L * 100` cumulative points.
const LEVEL_XP_STEP: f64 = 100.0;

/// Upper bound on the level counter. Valid but enormous point totals
/// (e.g. 1e300 kg of carbon in one entry) must not drive the level-up
/// loop into integer overflow; the iterative rule applies unchanged
/// below the cap.
const LEVEL_CAP: u32 = 10_000;

/// One user's profile: identity, lifetime impact totals and
/// gamification state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    /// Lifetime sum of all applied activity metrics.
    pub totals: ImpactMetrics,
    /// Current level, always >= 1.
    pub level: u32,
    /// Cumulative experience points, never decreases.
    pub experience_points: f64,
    /// Consecutive calendar days with at least one logged activity.
    pub streak: u32,
    /// Running maximum of `streak`, never decreases.
    pub longest_streak: u32,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub notifications_enabled: bool,
    pub weekly_summary_enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Summary of what one applied activity changed on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityApplied {
    /// XP earned by this activity.
    pub points_earned: f64,
    /// Levels gained by this application (a single large activity can
    /// clear several thresholds at once).
    pub levels_gained: u32,
    /// Streak after the update.
    pub streak: u32,
    /// Whether this activity extended the streak to a new day.
    pub extended_streak: bool,
}

impl UserProfile {
    /// Fresh profile at level 1 with zeroed totals.
    pub fn new(display_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            email: None,
            totals: ImpactMetrics::default(),
            level: 1,
            experience_points: 0.0,
            streak: 0,
            longest_streak: 0,
            last_activity_date: None,
            notifications_enabled: true,
            weekly_summary_enabled: true,
            created_at,
        }
    }

    /// Apply one logged activity to this profile.
    ///
    /// Preconditions checked at the boundary: the activity's metrics are
    /// non-negative and the activity belongs to this profile. Given valid
    /// input the update is a total state transition and cannot fail.
    pub fn apply_activity(
        &mut self,
        activity: &EcoActivity,
        now: DateTime<Utc>,
    ) -> Result<ActivityApplied, ValidationError> {
        activity.metrics.validate()?;
        if activity.owner_id != self.id {
            return Err(ValidationError::OwnerMismatch {
                activity_owner: activity.owner_id,
                profile: self.id,
            });
        }

        // 1. Lifetime totals.
        self.totals.accumulate(&activity.metrics);

        // 2. XP.
        let points_earned = activity.metrics.points();
        self.experience_points += points_earned;

        // 3. Level-up loop against the post-accumulation total.
        let levels_gained = self.settle_level_ups();

        // 4. Streak, against the pre-update last_activity_date.
        let extended_streak = self.update_streak(now);

        Ok(ActivityApplied {
            points_earned,
            levels_gained,
            streak: self.streak,
            extended_streak,
        })
    }

    /// Award extra XP (challenge rewards) through the same level-up rule.
    pub fn award_points(&mut self, points: f64) -> Result<u32, ValidationError> {
        if points < 0.0 {
            return Err(ValidationError::NegativeAmount(points));
        }
        self.experience_points += points;
        Ok(self.settle_level_ups())
    }

    /// Leave level L once cumulative XP reaches `L * 100`; repeat until the
    /// current threshold is no longer met. The iterative rule is the
    /// contract -- thresholds are non-uniform and must not be precomputed
    /// as a closed form.
    fn settle_level_ups(&mut self) -> u32 {
        let mut gained = 0;
        while self.level < LEVEL_CAP
            && self.experience_points >= self.level as f64 * LEVEL_XP_STEP
        {
            self.level += 1;
            gained += 1;
        }
        gained
    }

    /// Calendar-day streak update. Returns whether the streak advanced to
    /// a new day.
    fn update_streak(&mut self, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        let extended = match self.last_activity_date {
            None => {
                self.streak = 1;
                true
            }
            Some(last) => {
                let last_day = last.date_naive();
                if last_day == today {
                    // Same calendar day: nothing changes, not even the date.
                    return false;
                }
                if today == last_day.succ_opt().unwrap_or(last_day) {
                    self.streak += 1;
                    true
                } else {
                    // Gap of two or more days, or clock skew back in time.
                    self.streak = 1;
                    true
                }
            }
        };
        if self.streak > self.longest_streak {
            self.longest_streak = self.streak;
        }
        self.last_activity_date = Some(now);
        extended
    }

    /// XP still needed to reach the next level.
    pub fn points_to_next_level(&self) -> f64 {
        (self.level as f64 * LEVEL_XP_STEP - self.experience_points).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityCategory;
    use chrono::{Duration, TimeZone};

    fn profile() -> UserProfile {
        UserProfile::new("tester", Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
    }

    fn activity(owner: Uuid, metrics: ImpactMetrics, at: DateTime<Utc>) -> EcoActivity {
        EcoActivity::new(owner, ActivityCategory::Other, "test", metrics, at).unwrap()
    }

    #[test]
    fn test_totals_accumulate() {
        let mut p = profile();
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();
        p.apply_activity(&activity(p.id, ImpactMetrics::new(2.0, 50.0, 3.0, 1.0), now), now)
            .unwrap();
        p.apply_activity(&activity(p.id, ImpactMetrics::new(1.0, 0.0, 0.0, 4.0), now), now)
            .unwrap();
        assert_eq!(p.totals.carbon_kg, 3.0);
        assert_eq!(p.totals.water_liters, 50.0);
        assert_eq!(p.totals.land_m2, 3.0);
        assert_eq!(p.totals.plastic_items, 5.0);
    }

    #[test]
    fn test_single_activity_multi_level_up() {
        // 25 kg carbon = 250 XP: 250 >= 100 -> level 2, 250 >= 200 -> level 3,
        // 250 < 300 -> stop.
        let mut p = profile();
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();
        let outcome = p
            .apply_activity(&activity(p.id, ImpactMetrics::new(25.0, 0.0, 0.0, 0.0), now), now)
            .unwrap();
        assert_eq!(outcome.points_earned, 250.0);
        assert_eq!(outcome.levels_gained, 2);
        assert_eq!(p.level, 3);
        assert_eq!(p.experience_points, 250.0);
    }

    #[test]
    fn test_level_threshold_is_iterative_not_closed_form() {
        // Level 3 -> 4 requires total XP >= 300, not 100+200+300.
        let mut p = profile();
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();
        p.apply_activity(&activity(p.id, ImpactMetrics::new(29.0, 0.0, 0.0, 0.0), now), now)
            .unwrap();
        assert_eq!(p.level, 3);
        p.apply_activity(&activity(p.id, ImpactMetrics::new(1.0, 0.0, 0.0, 0.0), now), now)
            .unwrap();
        assert_eq!(p.experience_points, 300.0);
        assert_eq!(p.level, 4);
    }

    #[test]
    fn test_huge_valid_metric_caps_level_without_overflow() {
        // 1e300 kg carbon is a valid non-negative input; the level-up
        // loop must terminate at the cap instead of overflowing.
        let mut p = profile();
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap();
        let outcome = p
            .apply_activity(
                &activity(p.id, ImpactMetrics::new(1e300, 0.0, 0.0, 0.0), now),
                now,
            )
            .unwrap();
        assert_eq!(p.level, 10_000);
        assert_eq!(outcome.levels_gained, 9_999);
        assert!(p.experience_points >= 1e300);
        // Further XP no longer moves the level.
        p.award_points(1e300).unwrap();
        assert_eq!(p.level, 10_000);
    }

    #[test]
    fn test_streak_sequence() {
        // Days D, D+1, D+1 (same day twice), D+3 -> streaks 1, 2, 2, 1;
        // longest stays 2.
        let mut p = profile();
        let d = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
        let metrics = ImpactMetrics::new(0.1, 0.0, 0.0, 0.0);

        let days = [d, d + Duration::days(1), d + Duration::days(1) + Duration::hours(5), d + Duration::days(3)];
        let expected = [1, 2, 2, 1];
        for (now, want) in days.iter().zip(expected) {
            let outcome = p.apply_activity(&activity(p.id, metrics, *now), *now).unwrap();
            assert_eq!(outcome.streak, want);
        }
        assert_eq!(p.longest_streak, 2);
    }

    #[test]
    fn test_same_day_keeps_last_activity_date() {
        let mut p = profile();
        let morning = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2025, 3, 10, 20, 0, 0).unwrap();
        let metrics = ImpactMetrics::new(0.1, 0.0, 0.0, 0.0);
        p.apply_activity(&activity(p.id, metrics, morning), morning).unwrap();
        p.apply_activity(&activity(p.id, metrics, evening), evening).unwrap();
        assert_eq!(p.last_activity_date, Some(morning));
    }

    #[test]
    fn test_clock_skew_resets_streak() {
        let mut p = profile();
        let d = Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap();
        let metrics = ImpactMetrics::new(0.1, 0.0, 0.0, 0.0);
        p.apply_activity(&activity(p.id, metrics, d), d).unwrap();
        let next = d + Duration::days(1);
        p.apply_activity(&activity(p.id, metrics, next), next).unwrap();
        assert_eq!(p.streak, 2);
        // Device clock jumped backwards.
        let earlier = d - Duration::days(2);
        p.apply_activity(&activity(p.id, metrics, earlier), earlier).unwrap();
        assert_eq!(p.streak, 1);
        assert_eq!(p.longest_streak, 2);
    }

    #[test]
    fn test_owner_mismatch_rejected() {
        let mut p = profile();
        let now = Utc::now();
        let stranger = Uuid::new_v4();
        let err = p
            .apply_activity(&activity(stranger, ImpactMetrics::default(), now), now)
            .unwrap_err();
        assert!(matches!(err, ValidationError::OwnerMismatch { .. }));
    }

    #[test]
    fn test_award_points_levels_up() {
        let mut p = profile();
        let gained = p.award_points(150.0).unwrap();
        assert_eq!(gained, 1);
        assert_eq!(p.level, 2);
        assert!(p.award_points(-1.0).is_err());
    }

    #[test]
    fn test_points_to_next_level() {
        let mut p = profile();
        assert_eq!(p.points_to_next_level(), 100.0);
        p.award_points(250.0).unwrap();
        assert_eq!(p.level, 3);
        assert_eq!(p.points_to_next_level(), 50.0);
    }
}
