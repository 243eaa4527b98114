//! Seed catalog of achievements and challenge templates.
//!
//! New profiles get a default badge ladder per category plus a few
//! cross-category badges, and a small set of joinable challenges. The
//! catalog is static data; the progress engine never depends on it.

use uuid::Uuid;

use crate::achievement::{Achievement, AchievementTier};
use crate::activity::ActivityCategory;
use crate::challenge::{Challenge, ChallengeType};

/// Activities needed per tier in the per-category badge ladders.
const TIER_THRESHOLDS: [(AchievementTier, f64); 4] = [
    (AchievementTier::Bronze, 5.0),
    (AchievementTier::Silver, 25.0),
    (AchievementTier::Gold, 100.0),
    (AchievementTier::Platinum, 365.0),
];

fn category_label(category: ActivityCategory) -> &'static str {
    match category {
        ActivityCategory::Meals => "Mindful Meals",
        ActivityCategory::Transport => "Green Miles",
        ActivityCategory::Plastic => "Plastic Free",
        ActivityCategory::Energy => "Power Saver",
        ActivityCategory::Water => "Every Drop",
        ActivityCategory::Lifestyle => "New Habits",
        ActivityCategory::Other => "Beyond the List",
    }
}

/// Build the default achievement set for a new profile.
pub fn default_achievements() -> Vec<Achievement> {
    let mut achievements = Vec::new();
    for category in ActivityCategory::ALL {
        for (tier, required) in TIER_THRESHOLDS {
            let achievement = Achievement::new(
                format!("{} {}", category_label(category), tier.as_str()),
                format!(
                    "Log {} {} activities",
                    required,
                    category.as_str()
                ),
                Some(category),
                tier,
                required,
            )
            .expect("catalog thresholds are positive");
            achievements.push(achievement);
        }
    }
    // Cross-category badges counting every logged activity.
    for (name, tier, required) in [
        ("First Steps", AchievementTier::Bronze, 1.0),
        ("Week One", AchievementTier::Silver, 7.0),
        ("Committed", AchievementTier::Gold, 50.0),
        ("A Year of Action", AchievementTier::Platinum, 365.0),
    ] {
        achievements.push(
            Achievement::new(
                name,
                format!("Log {required} activities across all categories"),
                None,
                tier,
                required,
            )
            .expect("catalog thresholds are positive"),
        );
    }
    achievements
}

/// A joinable challenge definition.
pub struct ChallengeTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub challenge_type: ChallengeType,
    pub target_count: u32,
    pub reward_points: f64,
}

/// The default challenge templates a fresh install offers.
pub const DEFAULT_CHALLENGES: [ChallengeTemplate; 4] = [
    ChallengeTemplate {
        title: "Daily Action",
        description: "Log one eco activity today",
        challenge_type: ChallengeType::Daily,
        target_count: 1,
        reward_points: 10.0,
    },
    ChallengeTemplate {
        title: "Green Week",
        description: "Log five activities this week",
        challenge_type: ChallengeType::Weekly,
        target_count: 5,
        reward_points: 50.0,
    },
    ChallengeTemplate {
        title: "Plastic Purge",
        description: "Avoid plastic ten times this week",
        challenge_type: ChallengeType::Weekly,
        target_count: 10,
        reward_points: 75.0,
    },
    ChallengeTemplate {
        title: "Century Club",
        description: "Log one hundred activities, no deadline",
        challenge_type: ChallengeType::Milestone,
        target_count: 100,
        reward_points: 500.0,
    },
];

/// Instantiate a template as a fresh, not-yet-joined challenge, optionally
/// linked to a badge to unlock on completion.
pub fn instantiate(template: &ChallengeTemplate, badge_id: Option<Uuid>) -> Challenge {
    let mut challenge = Challenge::new(
        template.title,
        template.description,
        template.challenge_type,
        template.target_count,
        template.reward_points,
    )
    .expect("template targets are positive");
    if let Some(badge_id) = badge_id {
        challenge = challenge.with_badge(badge_id);
    }
    challenge
}

/// Seed instances of every default challenge, not yet joined.
pub fn default_challenge_instances() -> Vec<Challenge> {
    DEFAULT_CHALLENGES
        .iter()
        .map(|t| instantiate(t, None))
        .collect()
}
