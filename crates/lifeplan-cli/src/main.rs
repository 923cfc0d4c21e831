use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lifeplan", version, about = "Lifeplan CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Goal tree management
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Action templates on goals
    Template {
        #[command(subcommand)]
        action: commands::template::TemplateAction,
    },
    /// Triage boards
    Board {
        #[command(subcommand)]
        action: commands::board::BoardAction,
    },
    /// Weekly plan generation and editing
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Schedule a system or project step into a week
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Recurring systems
    System {
        #[command(subcommand)]
        action: commands::system::SystemAction,
    },
    /// Projects and their steps
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },
    /// Pure-play items and tokens
    Play {
        #[command(subcommand)]
        action: commands::play::PlayAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LIFEPLAN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Goal { action } => commands::goal::run(action),
        Commands::Template { action } => commands::template::run(action),
        Commands::Board { action } => commands::board::run(action),
        Commands::Plan { action } => commands::plan::run(action),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::System { action } => commands::system::run(action),
        Commands::Project { action } => commands::project::run(action),
        Commands::Play { action } => commands::play::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
