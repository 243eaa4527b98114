//! End-to-end integration: engine + storage.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ecolog_core::{
    ActivityCategory, ChallengeStatus, Database, EcoActivity, ImpactMetrics, ProgressEngine,
    UserProfile,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap()
}

fn log(
    engine: &ProgressEngine,
    db: &Database,
    profile: &mut UserProfile,
    category: ActivityCategory,
    metrics: ImpactMetrics,
    now: DateTime<Utc>,
) -> ecolog_core::ActivityOutcome {
    let activity = EcoActivity::new(profile.id, category, "logged", metrics, now).unwrap();
    let mut achievements = db.list_achievements().unwrap();
    let mut challenges = db.list_challenges().unwrap();
    let outcome = engine
        .log_activity(profile, &activity, &mut achievements, &mut challenges, now)
        .unwrap();
    db.insert_activity(&activity).unwrap();
    db.save_profile(profile).unwrap();
    for a in &achievements {
        db.save_achievement(a).unwrap();
    }
    for c in &challenges {
        db.save_challenge(c).unwrap();
    }
    outcome
}

#[test]
fn test_full_logging_workflow() {
    let db = Database::open_memory().unwrap();
    assert!(db.seed_catalog().unwrap());

    let engine = ProgressEngine::new();
    let mut profile = UserProfile::new("integration", t0());
    db.save_profile(&profile).unwrap();

    // Join the "Daily Action" seed challenge.
    let mut challenges = db.list_challenges().unwrap();
    let daily = challenges
        .iter_mut()
        .find(|c| c.title == "Daily Action")
        .unwrap();
    daily.join(profile.id, t0()).unwrap();
    let daily_id = daily.id;
    db.save_challenge(daily).unwrap();

    // One activity: 2 kg carbon -> 20 XP, first streak day, completes the
    // daily challenge (+10 reward XP) and unlocks "First Steps".
    let outcome = log(
        &engine,
        &db,
        &mut profile,
        ActivityCategory::Transport,
        ImpactMetrics::new(2.0, 0.0, 0.0, 0.0),
        t0(),
    );
    assert_eq!(outcome.applied.points_earned, 20.0);
    assert_eq!(outcome.applied.streak, 1);
    assert_eq!(outcome.completed_challenges, vec![daily_id]);
    assert_eq!(outcome.bonus_points, 10.0);

    // Persisted state is consistent after reload.
    let reloaded = db.first_profile().unwrap().unwrap();
    assert_eq!(reloaded.experience_points, 30.0);
    assert_eq!(reloaded.streak, 1);
    let challenges = db.list_challenges().unwrap();
    let daily = challenges.iter().find(|c| c.id == daily_id).unwrap();
    assert_eq!(daily.status, ChallengeStatus::Completed);
    assert!(!daily.is_active);

    let achievements = db.list_achievements().unwrap();
    let first_steps = achievements
        .iter()
        .find(|a| a.name == "First Steps")
        .unwrap();
    assert!(first_steps.is_unlocked);

    // Next day keeps the streak going.
    let mut profile = reloaded;
    let outcome = log(
        &engine,
        &db,
        &mut profile,
        ActivityCategory::Meals,
        ImpactMetrics::new(1.0, 200.0, 0.5, 0.0),
        t0() + Duration::days(1),
    );
    assert_eq!(outcome.applied.streak, 2);

    let summary = db.impact_summary(profile.id).unwrap();
    assert_eq!(summary.activities_logged, 2);
    assert_eq!(summary.totals.carbon_kg, 3.0);
    assert_eq!(summary.totals.water_liters, 200.0);
}

#[test]
fn test_state_survives_reopen_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ecolog.db");

    let engine = ProgressEngine::new();
    let profile_id;
    {
        let db = Database::open_at(&path).unwrap();
        db.seed_catalog().unwrap();
        let mut profile = UserProfile::new("disk", t0());
        profile_id = profile.id;
        let activity = EcoActivity::new(
            profile.id,
            ActivityCategory::Plastic,
            "refused a bag",
            ImpactMetrics::new(0.0, 0.0, 0.0, 2.0),
            t0(),
        )
        .unwrap();
        let mut achievements = db.list_achievements().unwrap();
        let mut challenges = db.list_challenges().unwrap();
        engine
            .log_activity(&mut profile, &activity, &mut achievements, &mut challenges, t0())
            .unwrap();
        db.insert_activity(&activity).unwrap();
        db.save_profile(&profile).unwrap();
        for a in &achievements {
            db.save_achievement(a).unwrap();
        }
    }

    let db = Database::open_at(&path).unwrap();
    let profile = db.load_profile(profile_id).unwrap().unwrap();
    assert_eq!(profile.experience_points, 10.0);
    assert_eq!(profile.streak, 1);
    assert_eq!(db.impact_summary(profile_id).unwrap().activities_logged, 1);
    // Reopening does not reseed.
    assert!(!db.seed_catalog().unwrap());
}

#[test]
fn test_expiration_poll_after_reload() {
    let db = Database::open_memory().unwrap();
    db.seed_catalog().unwrap();
    let engine = ProgressEngine::new();
    let profile = UserProfile::new("poller", t0());

    let mut challenges = db.list_challenges().unwrap();
    let weekly = challenges
        .iter_mut()
        .find(|c| c.title == "Green Week")
        .unwrap();
    weekly.join(profile.id, t0()).unwrap();
    let weekly_id = weekly.id;
    db.save_challenge(weekly).unwrap();

    // Eight days later with no progress: the poll fails it.
    let mut challenges = db.list_challenges().unwrap();
    let failed = engine.check_expirations(&mut challenges, t0() + Duration::days(8));
    assert_eq!(failed, vec![weekly_id]);
    for c in &challenges {
        db.save_challenge(c).unwrap();
    }

    let challenges = db.list_challenges().unwrap();
    let weekly = challenges.iter().find(|c| c.id == weekly_id).unwrap();
    assert_eq!(weekly.status, ChallengeStatus::Failed);

    // Polling again changes nothing.
    let mut challenges = db.list_challenges().unwrap();
    assert!(engine
        .check_expirations(&mut challenges, t0() + Duration::days(9))
        .is_empty());
}
