//! Achievement listing commands.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// List badges and their progress
    List {
        /// Only show unlocked badges
        #[arg(long)]
        unlocked: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: AchievementsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_db()?;
    match action {
        AchievementsAction::List { unlocked, json } => {
            let achievements: Vec<_> = db
                .list_achievements()?
                .into_iter()
                .filter(|a| !unlocked || a.is_unlocked)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&achievements)?);
                return Ok(());
            }
            for a in achievements {
                let status = if a.is_unlocked {
                    match a.unlocked_date {
                        Some(date) => format!("unlocked {}", date.format("%Y-%m-%d")),
                        None => "unlocked".to_string(),
                    }
                } else {
                    format!("{:.0}%", a.progress_percentage())
                };
                println!("[{}] {} -- {} ({})", a.tier.as_str(), a.name, a.description, status);
            }
            Ok(())
        }
    }
}
