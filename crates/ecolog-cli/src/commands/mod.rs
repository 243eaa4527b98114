pub mod achievements;
pub mod challenges;
pub mod config;
pub mod log;
pub mod profile;

use ecolog_core::{Database, UserProfile};

/// Open the database with the catalog seeded.
pub fn open_db() -> Result<Database, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    db.seed_catalog()?;
    Ok(db)
}

/// Load the device profile or explain how to create one.
pub fn require_profile(db: &Database) -> Result<UserProfile, Box<dyn std::error::Error>> {
    match db.first_profile()? {
        Some(profile) => Ok(profile),
        None => Err("no profile yet -- run `ecolog profile init <name>` first".into()),
    }
}
