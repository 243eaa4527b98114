//! Activity logging command.

use chrono::Utc;
use clap::Args;
use ecolog_core::{ActivityCategory, EcoActivity, ImpactMetrics, ProgressEngine};

#[derive(Args)]
pub struct LogArgs {
    /// Activity category: meals, transport, plastic, energy, water,
    /// lifestyle or other
    pub category: String,
    /// Short description of the action
    pub description: String,
    /// Carbon saved in kilograms
    #[arg(long, default_value = "0")]
    pub carbon: f64,
    /// Water saved in liters
    #[arg(long, default_value = "0")]
    pub water: f64,
    /// Land use saved in square meters
    #[arg(long, default_value = "0")]
    pub land: f64,
    /// Plastic items avoided
    #[arg(long, default_value = "0")]
    pub plastic: f64,
    /// Free-text notes
    #[arg(long)]
    pub notes: Option<String>,
    /// Transport distance in kilometers
    #[arg(long)]
    pub distance: Option<f64>,
    /// Duration in minutes
    #[arg(long)]
    pub duration: Option<u32>,
}

pub fn run(args: LogArgs) -> Result<(), Box<dyn std::error::Error>> {
    let category = ActivityCategory::from_str_tag(&args.category)
        .ok_or_else(|| format!("unknown category '{}'", args.category))?;

    let db = super::open_db()?;
    let mut profile = super::require_profile(&db)?;
    let now = Utc::now();

    let mut activity = EcoActivity::new(
        profile.id,
        category,
        args.description,
        ImpactMetrics::new(args.carbon, args.water, args.land, args.plastic),
        now,
    )?;
    if let Some(notes) = args.notes {
        activity = activity.with_notes(notes);
    }
    if let Some(distance) = args.distance {
        activity = activity.with_distance(distance);
    }
    if let Some(duration) = args.duration {
        activity = activity.with_duration(duration);
    }

    let mut achievements = db.list_achievements()?;
    let mut challenges = db.list_challenges()?;
    let engine = ProgressEngine::new();
    let outcome =
        engine.log_activity(&mut profile, &activity, &mut achievements, &mut challenges, now)?;

    db.insert_activity(&activity)?;
    db.save_profile(&profile)?;
    for achievement in &achievements {
        db.save_achievement(achievement)?;
    }
    for challenge in &challenges {
        db.save_challenge(challenge)?;
    }

    println!(
        "logged {} (+{:.1} XP, level {}, streak {})",
        category.as_str(),
        outcome.applied.points_earned + outcome.bonus_points,
        profile.level,
        profile.streak
    );
    if outcome.applied.levels_gained > 0 {
        println!("level up! now level {}", profile.level);
    }
    for id in &outcome.unlocked_achievements {
        if let Some(a) = achievements.iter().find(|a| a.id == *id) {
            println!("achievement unlocked: {}", a.name);
        }
    }
    for id in &outcome.completed_challenges {
        if let Some(c) = challenges.iter().find(|c| c.id == *id) {
            println!("challenge completed: {} (+{:.0} XP)", c.title, c.reward_points);
        }
    }
    Ok(())
}
