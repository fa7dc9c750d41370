use std::path::PathBuf;

use clap::{Parser, Subcommand};
use menutimer_core::storage::config_path;
use menutimer_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "menutimer-cli", version, about = "menutimer CLI")]
struct Cli {
    /// Config file (defaults to $MENUTIMER_CONFIG or ~/.config/menutimer/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a countdown in the foreground
    Start(commands::start::StartArgs),
    /// List configured presets
    Presets,
    /// Configuration inspection
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a number of seconds as MM:SS
    Format {
        seconds: u64,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let path = cli.config.unwrap_or_else(config_path);

    let config = match Config::load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config);
    tracing::debug!(path = %path.display(), "configuration loaded");

    let result = match cli.command {
        Commands::Start(args) => match commands::start::run(args, &config).await {
            Ok(commands::start::Outcome::Completed) => Ok(()),
            Ok(commands::start::Outcome::Cancelled) => std::process::exit(130),
            Err(e) => Err(e),
        },
        Commands::Presets => commands::presets::run(&config),
        Commands::Config { action } => commands::config::run(action, &config),
        Commands::Format { seconds } => {
            println!("{}", menutimer_core::format_seconds(seconds));
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
