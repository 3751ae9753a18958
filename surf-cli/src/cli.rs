use anyhow::bail;
use clap::{Parser, Subcommand};
use surf_core::{Action, Config, Location, Session};

use crate::{browse, configure};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "surf", version, about = "Current wave height and sea temperature by location")]
pub struct Cli {
    /// Show debug logs on stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search locations by name.
    Search {
        /// Location name, at least the configured minimum length.
        query: String,
    },

    /// Show current marine conditions for coordinates.
    Marine {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Label shown above the conditions.
        #[arg(long)]
        name: Option<String>,
    },

    /// Search and pick locations interactively.
    Browse,

    /// Interactively edit search settings.
    Configure,

    /// Print where the configuration file lives.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Search { query } => {
                let config = Config::load()?;
                let min_len = config.search.min_query_len;
                if query.trim().chars().count() < min_len {
                    eprintln!("Type at least {min_len} characters to search.");
                    return Ok(());
                }

                let mut session = Session::from_config(&config);
                session.dispatch(Action::QueryChanged(query.trim().to_string()));
                session.run_until_idle().await;

                print!("{}", session.search_area());
            }
            Command::Marine { lat, lon, name } => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    bail!("Coordinates out of range: latitude {lat}, longitude {lon}");
                }

                let config = Config::load()?;
                let mut session = Session::from_config(&config);
                let location = Location {
                    name: name.unwrap_or_else(|| format!("{lat:.2}°, {lon:.2}°")),
                    country: String::new(),
                    latitude: lat,
                    longitude: lon,
                };

                session.dispatch(Action::CandidateSelected(location));
                session.run_until_idle().await;

                print!("{}", session.detail_pane());
            }
            Command::Browse => {
                let config = Config::load()?;
                browse::run(&config).await?;
            }
            Command::Configure => configure::run()?,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
            }
        }

        Ok(())
    }
}
