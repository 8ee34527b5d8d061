use std::{io, sync::Arc};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Password, Select, Text};
use weather_core::{Config, IconPlan, Shell, UnitSystem, provider::provider_from_config};

use crate::render::TerminalRenderer;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather",
    version,
    about = "Current weather and 5-day forecast from OpenWeather"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default units.
    Configure,

    /// Show current weather and forecast for a city.
    Show {
        /// City name, e.g. "Paris" or "London,GB".
        city: String,

        /// Unit system; defaults to the configured one.
        #[arg(long, short, value_parser = parse_units)]
        units: Option<UnitSystem>,

        /// Skip downloading forecast icons.
        #[arg(long)]
        no_icons: bool,
    },

    /// Prompt for cities repeatedly, remembering the last units. Empty input or Esc quits.
    Interactive,
}

fn parse_units(value: &str) -> Result<UnitSystem, String> {
    UnitSystem::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                units,
                no_icons,
            } => show(&city, units, no_icons).await,
            Command::Interactive => interactive().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Get one at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("API key prompt aborted")?;
    cfg.set_api_key(api_key.trim().to_string());

    let start = UnitSystem::all()
        .iter()
        .position(|u| *u == cfg.units)
        .unwrap_or(0);
    let units = Select::new("Default units:", UnitSystem::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Units prompt aborted")?;
    cfg.set_units(units);

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

type TerminalShell = Shell<TerminalRenderer<io::Stdout>>;

fn build_shell(
    cfg: &Config,
    icons: IconPlan,
    renderer: TerminalRenderer<io::Stdout>,
) -> anyhow::Result<TerminalShell> {
    let provider = provider_from_config(cfg)?;
    Ok(Shell::new(Arc::from(provider), renderer).with_icons(icons))
}

async fn show(city: &str, units: Option<UnitSystem>, no_icons: bool) -> anyhow::Result<()> {
    let cfg = Config::load_with_env()?;
    let icons = if no_icons {
        IconPlan::NONE
    } else {
        IconPlan::default()
    };
    // The error is returned from main instead of being printed twice.
    let renderer = TerminalRenderer::new(io::stdout()).deferring_errors();
    let mut shell = build_shell(&cfg, icons, renderer)?;

    shell.submit(city, units.unwrap_or(cfg.units));
    shell.settle().await;

    match shell.renderer_mut().take_error() {
        Some(message) => Err(anyhow!(message)),
        None => Ok(()),
    }
}

/// The city to fetch, or `None` when the prompt was skipped or left blank.
fn requested_city(input: Option<String>) -> Option<String> {
    let city = input?;
    let city = city.trim();
    (!city.is_empty()).then(|| city.to_string())
}

async fn interactive() -> anyhow::Result<()> {
    let cfg = Config::load_with_env()?;
    let renderer = TerminalRenderer::new(io::stdout());
    let mut shell = build_shell(&cfg, IconPlan::default(), renderer)?;

    loop {
        let last = shell.last_query().cloned();

        let mut prompt = Text::new("City:").with_help_message("Empty input or Esc quits");
        if let Some(q) = &last {
            prompt = prompt.with_placeholder(&q.city);
        }
        let Some(city) = requested_city(prompt.prompt_skippable()?) else {
            break;
        };

        let current_units = last.as_ref().map_or(cfg.units, |q| q.units);
        let start = UnitSystem::all()
            .iter()
            .position(|u| *u == current_units)
            .unwrap_or(0);
        let Some(units) = Select::new("Units:", UnitSystem::all().to_vec())
            .with_starting_cursor(start)
            .prompt_skippable()?
        else {
            break;
        };

        shell.submit(&city, units);
        shell.settle().await;
        // Errors were already printed; keep prompting.
        shell.renderer_mut().take_error();
        println!();
    }

    Ok(())
}
