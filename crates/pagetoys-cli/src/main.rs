use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pagetoys-cli", version, about = "pagetoys CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Door knocker
    Door {
        #[command(subcommand)]
        action: commands::door::DoorAction,
    },
    /// Event countdown
    Countdown {
        #[command(subcommand)]
        action: commands::countdown::CountdownAction,
    },
    /// Header/footer includes
    Include {
        #[command(subcommand)]
        action: commands::include::IncludeAction,
    },
    /// Clicker game
    Clicker {
        #[command(subcommand)]
        action: commands::clicker::ClickerAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("PAGETOYS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Door { action } => commands::door::run(action),
        Commands::Countdown { action } => commands::countdown::run(action),
        Commands::Include { action } => commands::include::run(action),
        Commands::Clicker { action } => commands::clicker::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pagetoys-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
