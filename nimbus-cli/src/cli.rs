use std::{io, process::ExitCode};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::Password;
use nimbus_core::{
    Config, Controller, Coordinates, FileStore, FixedLocation, Geolocator, LookupState,
    MemoryStore, PreferenceStore, geolocation::geolocator_from_config,
    provider::provider_from_config,
};
use tracing::warn;

use crate::{interactive, render::TerminalPresenter};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nimbus", version, about = "Current weather and 5-day forecast")]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG wins if set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show weather for a city.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,
    },

    /// Show weather for the current location.
    Here {
        /// Latitude in decimal degrees; overrides the configured geolocation.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// List recent searches, most recent first.
    History,

    /// Switch between the light and dark theme.
    Theme,

    /// Search, revisit history and toggle the theme from a menu (default).
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(),
            Command::Show { city } => {
                let mut controller = build_controller(None)?;
                let state = controller.submit(&city).await;
                finish(&mut controller, state)
            }
            Command::Here { lat, lon } => {
                let coords = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                let mut controller = build_controller(coords)?;
                let state = controller.use_location().await;
                finish(&mut controller, state)
            }
            Command::History => {
                let history = open_preferences().load_history();
                if history.is_empty() {
                    println!("No searches yet.");
                }
                for (idx, city) in history.entries().iter().enumerate() {
                    println!("{}. {city}", idx + 1);
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Theme => {
                let mut prefs = open_preferences();
                let theme = prefs.load_theme().toggled();
                prefs.save_theme(theme).context("Failed to save theme preference")?;
                println!("Theme: {theme} ({})", theme.control_label());
                Ok(ExitCode::SUCCESS)
            }
            Command::Interactive => {
                let mut controller = build_controller(None)?;
                controller.presenter_mut().set_clear_screen(true);
                interactive::run(&mut controller).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn configure() -> anyhow::Result<ExitCode> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Get one at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("No API key entered")?;

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(ExitCode::SUCCESS)
}

/// Preferences on disk, or in memory if the platform has no data directory.
fn open_preferences() -> PreferenceStore {
    match FileStore::open_default() {
        Ok(store) => PreferenceStore::new(Box::new(store)),
        Err(err) => {
            warn!(error = %err, "preferences will not be saved");
            PreferenceStore::new(Box::new(MemoryStore::new()))
        }
    }
}

fn build_controller(coords: Option<Coordinates>) -> anyhow::Result<Controller<TerminalPresenter>> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;

    let geolocator: Box<dyn Geolocator> = match coords {
        Some(coords) => Box::new(FixedLocation(Some(coords))),
        None => geolocator_from_config(&config.location),
    };

    let mut controller =
        Controller::new(provider, geolocator, open_preferences(), TerminalPresenter::new());
    controller.init();
    Ok(controller)
}

fn finish(
    controller: &mut Controller<TerminalPresenter>,
    state: LookupState,
) -> anyhow::Result<ExitCode> {
    controller.presenter_mut().draw(&mut io::stdout().lock())?;

    Ok(match state {
        LookupState::Failed => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["nimbus"]).expect("parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn here_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["nimbus", "here", "--lat", "-33.87", "--lon", "151.21"])
            .expect("parse");

        match cli.command {
            Some(Command::Here { lat, lon }) => {
                assert_eq!(lat, Some(-33.87));
                assert_eq!(lon, Some(151.21));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn here_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["nimbus", "here", "--lat", "10"]).is_err());
    }

    #[test]
    fn show_takes_city_and_verbosity() {
        let cli = Cli::try_parse_from(["nimbus", "-vv", "show", "New York"]).expect("parse");

        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Command::Show { ref city }) if city == "New York"));
    }
}
