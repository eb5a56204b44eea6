//! `deskmate config` — show or scaffold the config file.

use anyhow::Context;
use deskmate_config::AppConfig;

pub fn path() -> anyhow::Result<()> {
    println!("{}", AppConfig::config_dir().join("config.toml").display());
    Ok(())
}

pub fn init() -> anyhow::Result<()> {
    let dir = AppConfig::config_dir();
    let path = dir.join("config.toml");

    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    std::fs::write(&path, AppConfig::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote default config to {}", path.display());
    Ok(())
}
