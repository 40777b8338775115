use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use forecast_accuracy::{plotting, Collector, Config, Forecasts, Granularity, DEFAULT_LOCATION};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "forecast-accuracy", version, about = "Collect weather forecasts and measure how well they verify")]
struct Cli {
    /// Config file; defaults to <config_dir>/forecast-accuracy/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plot forecasts against observations for one location
    Plot {
        #[arg(default_value = DEFAULT_LOCATION)]
        location: String,
        #[arg(default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..=24))]
        aggregate_hours: u32,
    },
    /// Save today's forecast for every configured location
    CollectForecasts {
        #[arg(default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..=24))]
        aggregate_hours: u32,
    },
    /// Extend the history table of every configured location
    CollectHistory {
        #[arg(default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..=24))]
        aggregate_hours: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Command::Plot {
            location,
            aggregate_hours,
        } => {
            let forecasts = Forecasts::open()
                .location(&location)
                .granularity(Granularity::from_aggregate_hours(aggregate_hours))
                .data_dir(config.data_dir.clone())
                .call()?;
            plotting::plot_all(&forecasts)?;
        }
        Command::CollectForecasts { aggregate_hours } => {
            let report = Collector::new(config)?
                .collect_forecasts(aggregate_hours, today)
                .await?;
            info!("Collected {} forecast files", report.written.len());
        }
        Command::CollectHistory { aggregate_hours } => {
            let report = Collector::new(config)?
                .collect_history(aggregate_hours, today)
                .await?;
            info!(
                "Appended history for {} locations, {} already up to date",
                report.written.len(),
                report.up_to_date.len()
            );
        }
    }

    Ok(())
}
