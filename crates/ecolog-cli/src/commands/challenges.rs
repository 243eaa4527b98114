//! Challenge commands: list, join, and the expiration poll.

use chrono::Utc;
use clap::Subcommand;
use ecolog_core::ProgressEngine;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum ChallengesAction {
    /// List challenges and their status
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Join a challenge by id or title
    Join {
        /// Challenge id or (partial) title
        challenge: String,
    },
    /// Poll in-progress challenges for expiry
    Check,
}

pub fn run(action: ChallengesAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open_db()?;
    match action {
        ChallengesAction::List { json } => {
            let challenges = db.list_challenges()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&challenges)?);
                return Ok(());
            }
            for c in challenges {
                let deadline = match c.end_date {
                    Some(end) => format!("until {}", end.format("%Y-%m-%d %H:%M")),
                    None => "open-ended".to_string(),
                };
                println!(
                    "{} [{}] {}/{} ({}) -- {}",
                    c.title,
                    c.status.as_str(),
                    c.current_progress,
                    c.target_count,
                    deadline,
                    c.description
                );
            }
            Ok(())
        }
        ChallengesAction::Join { challenge } => {
            let profile = super::require_profile(&db)?;
            let mut challenges = db.list_challenges()?;
            let wanted = challenge.to_lowercase();
            let target = challenges.iter_mut().find(|c| {
                Uuid::parse_str(&challenge).map(|id| id == c.id).unwrap_or(false)
                    || c.title.to_lowercase().contains(&wanted)
            });
            match target {
                Some(c) => {
                    c.join(profile.id, Utc::now())?;
                    db.save_challenge(c)?;
                    println!("joined '{}' ({}/{})", c.title, c.current_progress, c.target_count);
                    Ok(())
                }
                None => Err(format!("no challenge matching '{challenge}'").into()),
            }
        }
        ChallengesAction::Check => {
            let mut challenges = db.list_challenges()?;
            let engine = ProgressEngine::new();
            let failed = engine.check_expirations(&mut challenges, Utc::now());
            for c in &challenges {
                db.save_challenge(c)?;
            }
            if failed.is_empty() {
                println!("no challenges expired");
            } else {
                for id in failed {
                    if let Some(c) = challenges.iter().find(|c| c.id == id) {
                        println!("challenge failed: {}", c.title);
                    }
                }
            }
            Ok(())
        }
    }
}
