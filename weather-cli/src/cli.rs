use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use std::process::ExitCode;
use weather_core::{
    Config, IconSize, RequestState, ScreenController, Submission, Units, WeatherView,
};

use crate::render::{render_state, render_view};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather by city")]
pub struct Cli {
    /// OpenWeather API key; takes precedence over the configured one.
    #[arg(long, global = true, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and display preferences.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "San Francisco".
        city: String,

        /// Unit system: metric or imperial.
        #[arg(long)]
        units: Option<Units>,
    },

    /// Interactive screen: enter cities until Esc.
    Screen {
        /// Unit system: metric or imperial.
        #[arg(long)]
        units: Option<Units>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let config = Config::load()?.with_api_key_override(self.api_key);

        match self.command {
            Command::Configure => configure(config).map(|()| ExitCode::SUCCESS),
            Command::Show { city, units } => {
                let screen = controller(config, units)?;
                show(&screen, &city).await
            }
            Command::Screen { units } => {
                let screen = controller(config, units)?;
                interactive(&screen).await.map(|()| ExitCode::SUCCESS)
            }
        }
    }
}

fn controller(mut config: Config, units: Option<Units>) -> anyhow::Result<ScreenController> {
    if let Some(units) = units {
        config.units = units;
    }
    ScreenController::from_config(&config)
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    let units = Select::new("Units:", vec![Units::Metric, Units::Imperial])
        .prompt()
        .context("Failed to read unit system")?;

    let icon_size = Select::new("Icon size:", vec![IconSize::Large, IconSize::Medium])
        .prompt()
        .context("Failed to read icon size")?;

    config.api_key = Some(api_key.to_string());
    config.units = units;
    config.icon_size = icon_size;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(screen: &ScreenController, city: &str) -> anyhow::Result<ExitCode> {
    let submission = match screen.submit(city) {
        Ok(submission) => submission,
        Err(notice) => anyhow::bail!("{notice}"),
    };

    match submission.outcome().await {
        Ok(result) => {
            let view = WeatherView::from_result(&result, screen.units(), screen.icon_size());
            println!("{}", render_view(&view));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            // Already reads "City not found" / "Error: ...".
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn interactive(screen: &ScreenController) -> anyhow::Result<()> {
    loop {
        let input = match Text::new("City:").with_help_message("Esc to quit").prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city"),
        };

        match screen.submit(&input) {
            Ok(submission) => follow(screen, submission).await?,
            Err(notice) => println!("{notice}"),
        }
    }

    Ok(())
}

/// Wait for a submission and offer Retry / Dismiss while it keeps failing.
async fn follow(screen: &ScreenController, submission: Submission) -> anyhow::Result<()> {
    let mut pending = Some(submission);

    while let Some(submission) = pending.take() {
        println!("{}", render_state(&RequestState::Loading, screen.units(), screen.icon_size()));
        // The outcome also lands in the screen state, which is what gets rendered.
        let _ = submission.outcome().await;

        let state = screen.state();
        println!("{}", render_state(&state, screen.units(), screen.icon_size()));

        if !matches!(state, RequestState::Failed(_)) {
            break;
        }

        let choice = Select::new("What next?", vec!["Retry", "Dismiss"])
            .prompt()
            .context("Failed to read choice")?;

        if choice == "Retry" {
            pending = screen.retry();
        } else {
            screen.dismiss();
        }
    }

    Ok(())
}
