use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand, builder::RangedU64ValueParser};
use inquire::{CustomType, InquireError, Password, PasswordDisplayMode, Text};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wib_weather_core::{
    Config, FetchStrategy, OpenWeatherClient, PipelineOptions, WeatherPipeline,
};

use crate::render::{OutputFormat, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "wib-weather",
    version,
    about = "Current weather, 24h forecast and air quality, timestamped in WIB (UTC+7)"
)]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `interactive`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and defaults in the config file.
    Configure,

    /// Fetch once for a city and print the result.
    Show {
        /// City name; defaults to the configured default city.
        city: Option<String>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Prompt for a city, fetch, print; repeat until cancelled.
    Interactive {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Forecast slots to keep (3 hours each).
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub limit: Option<usize>,

    /// Fetch current weather, forecast and air quality concurrently.
    #[arg(long)]
    pub concurrent: bool,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl RunArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(limit) = self.limit {
            config.forecast_limit = limit;
        }
        if self.concurrent {
            config.fetch_strategy = FetchStrategy::Concurrent;
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        init_tracing(self.verbose);

        match self.command.unwrap_or(Command::Interactive { run: RunArgs::default() }) {
            Command::Configure => configure(),
            Command::Show { city, run } => show(city, &run).await,
            Command::Interactive { run } => interactive(&run).await,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,wib_weather=debug,wib_weather_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load config, apply flags and build the pipeline. Fails before any prompt
/// when no API key is available.
fn prepare(args: &RunArgs) -> anyhow::Result<(Config, WeatherPipeline<OpenWeatherClient>)> {
    let mut config = Config::load()?;
    args.apply(&mut config);
    config.validate()?;
    debug!(
        base_url = %config.base_url,
        forecast_limit = config.forecast_limit,
        strategy = ?config.fetch_strategy,
        "configuration loaded"
    );

    let client = OpenWeatherClient::from_config(&config)?;
    let pipeline = WeatherPipeline::new(client, PipelineOptions::from(&config));

    Ok((config, pipeline))
}

async fn show(city: Option<String>, args: &RunArgs) -> anyhow::Result<()> {
    let (config, pipeline) = prepare(args)?;
    let city = city.unwrap_or_else(|| config.default_city.clone());

    match pipeline.run(&city).await {
        Ok(aggregate) => {
            println!("{}", render(&aggregate, args.format)?);
            Ok(())
        }
        Err(e) => {
            let message = e.user_message();
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

async fn interactive(args: &RunArgs) -> anyhow::Result<()> {
    let (config, pipeline) = prepare(args)?;

    println!("Current, forecast, geocoding and air quality | Timezone WIB (UTC+7)");
    println!("Press Esc to quit.");

    loop {
        let city = match Text::new("City:").with_default(&config.default_city).prompt() {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read city"),
        };

        match pipeline.run(&city).await {
            Ok(aggregate) => println!("{}", render(&aggregate, args.format)?),
            Err(e) => eprintln!("error: {}", e.user_message()),
        }
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    // Read the file directly so an environment key is never written to disk.
    let mut config = Config::load_from(&path)?;

    let help = if config.api_key.is_some() {
        "Leave empty to keep the current key"
    } else {
        "Get one at https://home.openweathermap.org/api_keys"
    };
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message(help)
        .prompt()
        .context("Failed to read API key")?;

    let default_city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;

    let forecast_limit = CustomType::<usize>::new("Forecast slots (3 hours each):")
        .with_default(config.forecast_limit)
        .with_error_message("Please enter a whole number")
        .prompt()
        .context("Failed to read forecast limit")?;

    merge_answers(&mut config, &api_key, default_city, forecast_limit)?;
    config.save_to(&path)?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn merge_answers(
    config: &mut Config,
    api_key: &str,
    default_city: String,
    forecast_limit: usize,
) -> anyhow::Result<()> {
    let api_key = api_key.trim();
    if !api_key.is_empty() {
        config.api_key = Some(api_key.to_string());
    }
    if config.api_key.is_none() {
        return Err(anyhow!("An API key is required"));
    }

    let default_city = default_city.trim();
    if !default_city.is_empty() {
        config.default_city = default_city.to_string();
    }
    config.forecast_limit = forecast_limit;

    config.validate()?;
    Ok(())
}
