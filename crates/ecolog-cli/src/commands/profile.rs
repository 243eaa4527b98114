//! Profile commands.

use chrono::Utc;
use clap::Subcommand;
use ecolog_core::UserProfile;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create the device profile
    Init {
        /// Display name
        name: String,
        /// Email address
        #[arg(long)]
        email: Option<String>,
    },
    /// Show profile, level, streak and lifetime impact
    Show,
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_db()?;
    match action {
        ProfileAction::Init { name, email } => {
            if db.first_profile()?.is_some() {
                return Err("a profile already exists on this device".into());
            }
            let mut profile = UserProfile::new(name, Utc::now());
            profile.email = email;
            db.save_profile(&profile)?;
            println!("profile '{}' created ({})", profile.display_name, profile.id);
            Ok(())
        }
        ProfileAction::Show => {
            let profile = super::require_profile(&db)?;
            let summary = db.impact_summary(profile.id)?;
            println!("{} (level {})", profile.display_name, profile.level);
            println!(
                "  xp: {:.1} ({:.1} to next level)",
                profile.experience_points,
                profile.points_to_next_level()
            );
            println!(
                "  streak: {} day(s), longest {}",
                profile.streak, profile.longest_streak
            );
            println!("  activities logged: {}", summary.activities_logged);
            println!(
                "  lifetime impact: {:.1} kg CO2, {:.0} L water, {:.1} m2 land, {:.0} plastic items",
                profile.totals.carbon_kg,
                profile.totals.water_liters,
                profile.totals.land_m2,
                profile.totals.plastic_items
            );
            let mut categories: Vec<_> = summary.by_category.iter().collect();
            categories.sort();
            for (category, count) in categories {
                println!("    {category}: {count}");
            }
            Ok(())
        }
    }
}
