use menutimer_core::{format_seconds, Config};

pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if config.presets.is_empty() {
        eprintln!("no presets configured");
        return Ok(());
    }

    let width = config
        .presets
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0);

    for preset in config.presets.iter() {
        println!(
            "{:<width$}  {}",
            preset.name,
            format_seconds(preset.total_seconds())
        );
    }
    Ok(())
}
