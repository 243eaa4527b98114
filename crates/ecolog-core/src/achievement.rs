//! Achievement badges and the unlock latch.
//!
//! Progress toward a badge only ever moves forward. The unlock flag is a
//! one-way latch: once set, `unlocked_date` is fixed and further progress
//! calls are no-ops, so downstream celebration/notification logic fires
//! exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activity::ActivityCategory;
use crate::error::ValidationError;

/// Badge tier. Prestige ordering only, no numeric effect on unlock logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl AchievementTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementTier::Bronze => "bronze",
            AchievementTier::Silver => "silver",
            AchievementTier::Gold => "gold",
            AchievementTier::Platinum => "platinum",
        }
    }

    pub fn from_str_tag(tag: &str) -> Option<Self> {
        match tag {
            "bronze" => Some(AchievementTier::Bronze),
            "silver" => Some(AchievementTier::Silver),
            "gold" => Some(AchievementTier::Gold),
            "platinum" => Some(AchievementTier::Platinum),
            _ => None,
        }
    }
}

/// A badge definition plus one user's progress toward it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Bound category, or `None` for cross-category badges.
    pub category: Option<ActivityCategory>,
    pub tier: AchievementTier,
    /// Monotonically increasing; may overshoot `progress_required`.
    pub progress_current: f64,
    pub progress_required: f64,
    pub is_unlocked: bool,
    pub unlocked_date: Option<DateTime<Utc>>,
}

impl Achievement {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: Option<ActivityCategory>,
        tier: AchievementTier,
        progress_required: f64,
    ) -> Result<Self, ValidationError> {
        if progress_required <= 0.0 {
            return Err(ValidationError::NonPositiveTarget {
                field: "progress_required",
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            category,
            tier,
            progress_current: 0.0,
            progress_required,
            is_unlocked: false,
            unlocked_date: None,
        })
    }

    /// Whether an activity in `category` counts toward this badge.
    pub fn applies_to(&self, category: ActivityCategory) -> bool {
        match self.category {
            Some(bound) => bound == category,
            None => true,
        }
    }

    /// Advance progress by `amount`.
    ///
    /// Returns `Ok(true)` when this call unlocked the badge. Past unlock
    /// every call is a no-op: progress, `is_unlocked` and `unlocked_date`
    /// all stay frozen.
    pub fn record_progress(
        &mut self,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<bool, ValidationError> {
        if amount < 0.0 {
            return Err(ValidationError::NegativeAmount(amount));
        }
        if self.is_unlocked {
            return Ok(false);
        }
        self.progress_current += amount;
        if self.progress_current >= self.progress_required {
            self.is_unlocked = true;
            self.unlocked_date = Some(now);
            return Ok(true);
        }
        Ok(false)
    }

    /// Displayed progress, clamped to 100 even when internal progress
    /// overshoots the requirement.
    pub fn progress_percentage(&self) -> f64 {
        (self.progress_current / self.progress_required * 100.0).min(100.0)
    }
}
