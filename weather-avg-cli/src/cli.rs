use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};
use weather_avg_core::{AverageError, Config, WeatherAverage, aggregate::average};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-avg",
    version,
    about = "Average the current temperature reported by several weather services"
)]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug logging and per-service readings. RUST_LOG takes precedence for logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the upstream base URL and timeout.
    Configure,

    /// Query the services once and print the average.
    Average {
        #[arg(allow_hyphen_values = true)]
        latitude: String,

        #[arg(allow_hyphen_values = true)]
        longitude: String,

        /// Service to query, repeatable: accuweather, noaa, weather.com. Defaults to all.
        #[arg(long = "service", value_name = "NAME")]
        services: Vec<String>,
    },

    /// Serve `GET /{latitude}/{longitude}/?services=...` over HTTP.
    Serve {
        /// Address to listen on; overrides `server.bind` from the config.
        #[arg(long)]
        bind: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match self.command {
            Command::Configure => configure(config, self.config),
            Command::Average { latitude, longitude, services } => {
                let service = WeatherAverage::from_config(&config)?;
                show_average(&service, &latitude, &longitude, &services, self.verbose).await
            }
            Command::Serve { bind } => {
                let service = WeatherAverage::from_config(&config)?;
                let bind = bind.unwrap_or_else(|| config.server.bind.clone());
                server::run(service, &bind).await
            }
        }
    }
}

fn configure(mut config: Config, path: Option<PathBuf>) -> anyhow::Result<()> {
    config.upstream.base_url = Text::new("Upstream base URL:")
        .with_default(&config.upstream.base_url)
        .prompt()
        .context("Failed to read base URL")?;

    config.upstream.timeout_secs = CustomType::<u64>::new("Per-service timeout (seconds):")
        .with_default(config.upstream.timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Failed to read timeout")?;

    config.validate()?;

    let saved_to = match path {
        Some(path) => {
            config.save_to(&path)?;
            path
        }
        None => config.save()?,
    };
    println!("Configuration saved to {}", saved_to.display());

    Ok(())
}

async fn show_average(
    service: &WeatherAverage,
    latitude: &str,
    longitude: &str,
    services: &[String],
    verbose: bool,
) -> anyhow::Result<()> {
    let result = if verbose {
        service.readings(latitude, longitude, services).await.map(|readings| {
            for reading in &readings {
                println!(
                    "  {:<12} {:>7.2} °C {:>7.2} °F  (at {})",
                    reading.service.as_str(),
                    reading.celsius,
                    reading.fahrenheit,
                    reading.observed_at.format("%H:%M:%S UTC"),
                );
            }
            average(&readings)
        })
    } else {
        service.average(latitude, longitude, services).await.map(Some)
    };

    match result {
        Ok(Some(avg)) => {
            println!("Average: {:.1} °C / {:.1} °F", avg.celsius, avg.fahrenheit);
            Ok(())
        }
        Ok(None) => bail!("No readings were collected"),
        Err(err) => report(err),
    }
}

fn report(err: AverageError) -> anyhow::Result<()> {
    for message in err.messages() {
        eprintln!("error: {message}");
    }
    bail!("request failed ({})", err.kind())
}
