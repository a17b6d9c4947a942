//! Configuration management CLI commands.
//!
//! Provides `config init`, `config show` and `config path` for creating and
//! inspecting the INI configuration file.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use shopmap::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    ///
    /// Values missing from the file are shown with their defaults.
    Show,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against `config_path`, or the default location.
pub fn run(command: ConfigCommands, config_path: Option<PathBuf>) -> Result<(), CliError> {
    let path = config_path.unwrap_or_else(config_file_path);

    match command {
        ConfigCommands::Init { force } => {
            let message = run_init(&path, force)?;
            println!("{}", message);
            Ok(())
        }
        ConfigCommands::Show => {
            print!("{}", render_effective(&path)?);
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Write the default configuration.
fn run_init(path: &Path, force: bool) -> Result<String, CliError> {
    if force {
        ConfigFile::default().save_to(path)?;
        return Ok(format!("Wrote default configuration to {}", path.display()));
    }

    if ConfigFile::ensure_exists_at(path)? {
        Ok(format!("Created {}", path.display()))
    } else {
        Ok(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            path.display()
        ))
    }
}

/// INI text of the configuration after defaults are applied.
fn render_effective(path: &Path) -> Result<String, CliError> {
    let config = ConfigFile::load_from(path)?;
    Ok(config.to_config_string())
}
