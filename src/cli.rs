//! Command line interface for gravitoy

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

use crate::config::{ConfigError, SimulationConfig};
use crate::simulation::{ScenarioError, Simulation};

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be loaded
    ConfigLoad(String),
    /// The configured scenario cannot be built
    InvalidScenario(ScenarioError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigLoad(msg) => write!(f, "Failed to load configuration: {msg}"),
            CliError::InvalidScenario(e) => write!(f, "Invalid scenario: {e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ScenarioError> for CliError {
    fn from(e: ScenarioError) -> Self {
        CliError::InvalidScenario(e)
    }
}

/// gravitoy - Interactive 2D gravity toy
#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Open a window instead of going fullscreen
    #[arg(short = 'w', long)]
    pub windowed: bool,

    /// Cap the frame rate, and with it the simulation speed
    #[arg(short = 'f', long, value_name = "FPS")]
    pub frame_rate_limit: Option<u32>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

/// Loads configuration from file or defaults, then applies command-line overrides
///
/// An explicit `--config` path must exist and parse. The user config file is
/// optional and falls back to defaults.
pub fn load_and_apply_config(args: &Args) -> Result<SimulationConfig, CliError> {
    let mut config = if let Some(config_path) = &args.config {
        println!("Loading configuration from: {}", config_path.display());
        SimulationConfig::load(config_path)
            .map_err(|e: ConfigError| CliError::ConfigLoad(format!("{}: {e}", config_path.display())))?
    } else {
        SimulationConfig::load_from_user_config()
    };

    if args.windowed {
        println!("Running windowed");
        config.window.fullscreen = false;
    }

    if let Some(limit) = args.frame_rate_limit {
        println!("Limiting frame rate to: {limit}");
        config.window.frame_rate_limit = Some(limit);
    }

    Ok(config)
}

/// Builds the scenario once up front so a bad configuration fails before a window opens
pub fn validate_scenario(config: &SimulationConfig) -> Result<(), CliError> {
    Simulation::from_config(config, config.window.size())?;
    Ok(())
}
