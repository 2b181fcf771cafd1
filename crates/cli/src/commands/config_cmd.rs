//! `navigator config` — Show the effective configuration.

use navigator_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let config_path = AppConfig::config_dir().join("config.toml");

    if config_path.exists() {
        println!("# Loaded from {}", config_path.display());
    } else {
        println!("# No config file at {} — showing defaults", config_path.display());
    }
    print!("{}", config.to_toml()?);

    Ok(())
}
