use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "studytrack", version, about = "Study log with a focus timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Study category management
    Category {
        #[command(subcommand)]
        action: commands::category::CategoryAction,
    },
    /// Study log records
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Focus timer control
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Completion, trend and streak metrics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Export or import the whole study log
    Backup {
        #[command(subcommand)]
        action: commands::backup::BackupAction,
    },
}

fn main() {
    logging::enable_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Category { action } => commands::category::run(action),
        Commands::Log { action } => commands::log::run(action),
        Commands::Focus { action } => commands::focus::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Backup { action } => commands::backup::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
