use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use nextrun::error::ErrorSeverity;
use nextrun::{
    AppConfig, DurationCalculator, EffortLevel, FixedClock, InMemoryHistoryProvider,
    LogLevel, RecommendationEngine, RunHistoryProvider, WeekStatus, WeeklyHistoryAnalyzer,
};

/// nextrun - Next Run Recommendation CLI
///
/// Reads a runner's logged history and suggests the distance, effort and
/// duration of their next run.
#[derive(Parser)]
#[command(name = "nextrun")]
#[command(version)]
#[command(about = "Next run recommendation CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend the next run for a user
    Recommend {
        /// JSON history file ({"user": [run, ...]})
        #[arg(long)]
        history: PathBuf,

        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        today: Option<NaiveDate>,

        /// Output format (text, json)
        #[arg(short = 'f', long, default_value = "text")]
        format: String,
    },

    /// Show the weekly breakdown used for the recommendation
    Weeks {
        /// JSON history file ({"user": [run, ...]})
        #[arg(long)]
        history: PathBuf,

        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        today: Option<NaiveDate>,
    },

    /// Show or initialize the configuration file
    Config {
        /// Print the effective configuration
        #[arg(short, long)]
        show: bool,

        /// Write the default configuration to the config path
        #[arg(short, long)]
        init: bool,
    },
}

#[derive(Tabled)]
struct WeekRow {
    #[tabled(rename = "Week")]
    week: String,
    #[tabled(rename = "From")]
    start: NaiveDate,
    #[tabled(rename = "To")]
    end: NaiveDate,
    #[tabled(rename = "Runs")]
    runs: u32,
    #[tabled(rename = "Distance (km)")]
    distance_km: String,
    #[tabled(rename = "Total RPE")]
    effort: u32,
}

#[derive(Tabled)]
struct PaceRow {
    #[tabled(rename = "Effort")]
    level: String,
    #[tabled(rename = "RPE")]
    rpe: u8,
    #[tabled(rename = "Avg pace (min/km)")]
    pace: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if cli.verbose > 0 {
        config.logging.level = LogLevel::from_verbosity(cli.verbose);
    }
    nextrun::logging::init_logging(&config.logging)?;

    match cli.command {
        Commands::Recommend {
            history,
            user,
            today,
            format,
        } => {
            let provider = InMemoryHistoryProvider::from_json_file(&history)?;
            let mut engine = RecommendationEngine::new(provider, config.rules.clone())?;
            if let Some(date) = today {
                engine = engine.with_clock(FixedClock(date));
            }

            let recommendation = match engine.get_recommendation(&user).await {
                Ok(recommendation) => recommendation,
                Err(err) => {
                    match err.severity() {
                        ErrorSeverity::Warning => tracing::warn!(error = %err, "Recommendation failed"),
                        _ => tracing::error!(error = %err, "Recommendation failed"),
                    }
                    eprintln!("{}", err.user_message().red());
                    if err.is_retryable() {
                        eprintln!("{}", "The history source may be back shortly, try again.".yellow());
                    }
                    std::process::exit(1);
                }
            };

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&recommendation)?),
                _ => {
                    println!("{}", "Next run".green().bold());
                    println!("  Date:     {}", recommendation.date);
                    println!(
                        "  Distance: {:.2} km",
                        f64::from(recommendation.distance_metres) / 1000.0
                    );
                    println!(
                        "  Effort:   {}/10 ({})",
                        recommendation.effort,
                        recommendation.effort_level()
                    );
                    println!("  Duration: {} min", recommendation.duration.num_minutes());
                }
            }
        }

        Commands::Weeks {
            history,
            user,
            today,
        } => {
            let provider = InMemoryHistoryProvider::from_json_file(&history)?;
            let runs = provider
                .get_user_run_history(&user)
                .await?
                .with_context(|| format!("No history for user '{}'", user))?;
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());

            let summary =
                WeeklyHistoryAnalyzer::new(config.rules.weekly.clone()).analyze(&runs, today);

            let rows: Vec<WeekRow> = summary
                .weeks
                .iter()
                .map(|w| WeekRow {
                    week: if w.index == 0 {
                        "current".to_string()
                    } else {
                        format!("-{}", w.index)
                    },
                    start: w.start,
                    end: w.end,
                    runs: w.run_count(),
                    distance_km: format!("{:.2}", w.total_distance_metres() as f64 / 1000.0),
                    effort: w.total_effort(),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));

            let status = match summary.week_status() {
                WeekStatus::NoCadence => "no established cadence yet".yellow(),
                WeekStatus::Owed { remaining } => {
                    format!("{} run(s) still owed this week", remaining).cyan()
                }
                WeekStatus::Complete { extra } => {
                    format!("week complete ({} extra)", extra).green()
                }
            };
            println!("Cadence: {}", status);

            let paces: Vec<PaceRow> = EffortLevel::ALL
                .iter()
                .map(|&level| PaceRow {
                    level: level.to_string(),
                    rpe: level.value(),
                    pace: DurationCalculator::average_pace(&runs, level)
                        .map(|p| p.round_dp(2).to_string())
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            println!("{}", Table::new(paces).with(Style::rounded()));
        }

        Commands::Config { show, init } => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(AppConfig::default_config_path);

            if init {
                let mut fresh = AppConfig::default();
                fresh.save_to_file(&path)?;
                println!("{} {}", "Wrote default configuration to".green(), path.display());
            }
            if show || !init {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}
