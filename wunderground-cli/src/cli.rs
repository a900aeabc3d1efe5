use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use wunderground_core::{Config, Observation, WeatherClient};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wunderground", version, about = "Current weather conditions from Wunderground")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and a default location.
    Configure,

    /// Show current conditions for a city.
    Show {
        /// State code, e.g. "CA". Falls back to the configured default.
        state: Option<String>,

        /// City name as the API expects it, e.g. "San_Francisco".
        city: Option<String>,

        /// API key to use instead of the configured one.
        #[arg(long, env = "WUNDERGROUND_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Print the decoded observation as JSON.
        #[arg(long)]
        json: bool,

        /// Skip TLS certificate validation.
        #[arg(long)]
        insecure: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load_or_default();

        match self.command {
            Command::Configure => configure(&mut config),
            Command::Show { state, city, api_key, json, insecure } => {
                if api_key.is_some() {
                    config.api_key = api_key;
                }
                config.accept_invalid_certs |= insecure;

                let (state, city) = config.location(state.as_deref(), city.as_deref())?;
                let client = WeatherClient::with_options(
                    None,
                    state,
                    city,
                    config.api_key()?,
                    &config.client_options(),
                )?;

                let cancel = async {
                    // If the handler cannot be installed, never cancel.
                    if tokio::signal::ctrl_c().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                };
                let observation = client
                    .get_weather_until(cancel)
                    .await
                    .with_context(|| format!("Failed to get weather for {city}, {state}"))?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&observation)?);
                } else {
                    print!("{}", render(&observation));
                }
                Ok(())
            }
        }
    }
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let api_key = Password::new("Wunderground API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let mut state = Text::new("Default state code:").with_placeholder("CA");
    if let Some(current) = config.state.as_deref() {
        state = state.with_default(current);
    }
    let state = state.prompt().context("Failed to read state")?;

    let mut city = Text::new("Default city:").with_placeholder("San_Francisco");
    if let Some(current) = config.city.as_deref() {
        city = city.with_default(current);
    }
    let city = city.prompt().context("Failed to read city")?;

    config.api_key = Some(api_key.trim().to_string());
    config.state = Some(state.trim().to_string()).filter(|s| !s.is_empty());
    config.city = Some(city.trim().to_string()).filter(|s| !s.is_empty());

    let path = config.save()?;
    tracing::info!(path = %path.display(), "saved configuration");
    println!("Configuration saved to {}", path.display());
    Ok(())
}

/// Human-readable summary of an observation.
fn render(observation: &Observation) -> String {
    let c = &observation.conditions;
    let mut out = String::new();

    let name = if c.location.full.is_empty() { "Unknown location" } else { &c.location.full };
    out.push_str(name);
    out.push('\n');

    if c.temperature.description.is_empty() {
        out.push_str(&format!(
            "  Temperature: {:.1} F ({:.1} C)\n",
            c.temperature.fahrenheit, c.temperature.celsius
        ));
    } else {
        out.push_str(&format!("  Temperature: {}\n", c.temperature.description));
    }

    if c.wind.description.is_empty() {
        out.push_str(&format!(
            "  Wind: {} at {:.1} MPH ({:.1} KPH)\n",
            c.wind.direction, c.wind.mph, c.wind.kph
        ));
    } else {
        out.push_str(&format!("  Wind: {}\n", c.wind.description));
    }

    if !c.location.latitude.is_empty() {
        out.push_str(&format!(
            "  Coordinates: {}, {} (elevation {})\n",
            c.location.latitude, c.location.longitude, c.location.elevation
        ));
    }

    out
}
