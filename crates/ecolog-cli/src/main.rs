use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ecolog", version, about = "Ecolog CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log an eco activity
    Log(commands::log::LogArgs),
    /// Profile management
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Achievement badges
    Achievements {
        #[command(subcommand)]
        action: commands::achievements::AchievementsAction,
    },
    /// Challenge management
    Challenges {
        #[command(subcommand)]
        action: commands::challenges::ChallengesAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Log(args) => commands::log::run(args),
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Achievements { action } => commands::achievements::run(action),
        Commands::Challenges { action } => commands::challenges::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
