use clap::Subcommand;
use menutimer_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.default_minutes", "presets.0.name")
        key: String,
    },
    /// Print the effective configuration as TOML
    Show,
}

pub fn run(action: ConfigAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        ConfigAction::Show => {
            print!("{}", config.to_toml_string()?);
        }
    }
    Ok(())
}
