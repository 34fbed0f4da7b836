//! Config command implementation.

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::cli::ConfigAction;
use crate::config::Config;

pub fn cmd_config(action: ConfigAction, path: &Path, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
            if let Err(e) = config.validate() {
                eprintln!("\n{}", e);
            }
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default()
                .save(path)
                .with_context(|| format!("Cannot write {}", path.display()))?;
            eprintln!("Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}
