use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use liverun::calories::{estimate_calories, matching_entry, DEFAULT_MET};
use liverun::config::{AppConfig, TrackingSettings};
use liverun::display::MetricsDisplay;
use liverun::geo::MPS_TO_MPH;
use liverun::import::ImportManager;
use liverun::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use liverun::{ReplayLocationService, UpdateResult, WorkoutSession, WorkoutSummary};

/// LiveRun - running workout metrics
///
/// Replays recorded GPS tracks through the live metrics engine and reports
/// distance, pace, speed, calories and speed-banded track segments.
#[derive(Parser)]
#[command(name = "liverun")]
#[command(version)]
#[command(about = "Running workout metrics from GPS tracks", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log format (pretty, json, compact)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded track as if it were arriving live
    Replay {
        /// Track file (GPX or CSV)
        #[arg(short, long)]
        file: PathBuf,

        /// Derive speed from positions where the file has none
        #[arg(long)]
        derive_speed: bool,

        /// Print the workout summary as JSON
        #[arg(long)]
        json: bool,

        /// List the speed-banded track segments
        #[arg(long)]
        segments: bool,
    },

    /// Estimate calories for one interval
    Calories {
        /// Height in centimeters
        #[arg(long)]
        height: f64,

        /// Gender code ("f"/"female" or anything else for male)
        #[arg(long, default_value = "m")]
        gender: String,

        /// Age in years
        #[arg(long)]
        age: f64,

        /// Weight in kilograms
        #[arg(long)]
        weight: f64,

        /// Interval length in seconds
        #[arg(long, default_value = "60")]
        seconds: f64,

        /// Speed in meters per second
        #[arg(long)]
        speed: f64,
    },

    /// Show or create the configuration file
    Config {
        /// Print the effective configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(short, long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,
    },
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Band")]
    band: u8,
    #[tabled(rename = "Color")]
    color: &'static str,
    #[tabled(rename = "Points")]
    points: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // `config --init` writes the file, so it must not need to load first
    let creating = matches!(cli.command, Commands::Config { init: true, .. });
    let explicit = if creating { None } else { cli.config.as_deref() };
    let loaded = AppConfig::load_or_default(explicit);

    // Bring up logging before acting on the load result so failures are reported
    let mut log_config = match &loaded {
        Ok((config, _)) => config.logging.clone(),
        Err(_) => LogConfig::default(),
    };
    log_config.level = LogLevel::from_verbosity(log_config.level, cli.verbose);
    if let Some(format) = cli.log_format {
        log_config.format = format;
    }
    init_logging(&log_config)?;

    let (mut config, fallback) = loaded.with_context(|| match explicit {
        Some(path) => format!("Failed to load config {}", path.display()),
        None => "Failed to load config".to_string(),
    })?;
    if let Some(err) = fallback {
        err.log(&format!(
            "Ignoring {}, running with built-in defaults",
            AppConfig::default_config_path().display()
        ));
    }

    match cli.command {
        Commands::Replay {
            file,
            derive_speed,
            json,
            segments,
        } => replay(&config, file, derive_speed, json, segments),

        Commands::Calories {
            height,
            gender,
            age,
            weight,
            seconds,
            speed,
        } => {
            let speed_mph = speed * MPS_TO_MPH;
            let (met, activity) = matching_entry(speed_mph)
                .map(|row| (row.met_value, row.description))
                .unwrap_or((DEFAULT_MET, "Below table (default)"));
            let calories = estimate_calories(height, &gender, age, weight, seconds, speed);

            println!("{}", "Calorie estimate".green().bold());
            println!("  Speed:    {:.2} mph", speed_mph);
            println!("  MET:      {} ({})", met, activity);
            println!("  Interval: {} s", seconds);
            println!("  Calories: {}", format!("{:.4}", calories).bold());
            Ok(())
        }

        Commands::Config { show, init, force } => {
            let path = cli.config.unwrap_or_else(AppConfig::default_config_path);
            if init {
                if path.exists() && !force {
                    anyhow::bail!(
                        "Config file already exists: {} (use --force to overwrite)",
                        path.display()
                    );
                }
                let mut fresh = AppConfig::default();
                fresh.save_to_file(&path)?;
                println!("{} {}", "✓ Wrote".green(), path.display());
                config = fresh;
            }
            if show || !init {
                println!("{}", format!("# {}", path.display()).dimmed());
                println!("{}", toml::to_string_pretty(&config)?);
            }
            Ok(())
        }
    }
}

fn replay(
    config: &AppConfig,
    file: PathBuf,
    derive_speed: bool,
    json: bool,
    show_segments: bool,
) -> Result<()> {
    let samples = ImportManager::with_derived_speed(derive_speed)
        .import_file(&file)
        .map_err(|e| {
            e.log("Track import failed");
            anyhow::anyhow!(e.user_message())
        })
        .with_context(|| format!("Failed to load {}", file.display()))?;

    let first = samples[0].timestamp;

    // A recording has no countdown: the clock starts with the first fix
    let settings = TrackingSettings {
        countdown_seconds: 0,
        ..config.tracking.clone()
    };
    let mut session = WorkoutSession::new(
        config.runner.clone(),
        &settings,
        ReplayLocationService::new(samples),
    );
    session.start(first)?;

    let mut last = first;
    let mut ignored = 0usize;
    while let Some(now) = session.location().next_timestamp() {
        // Out-of-order fixes must not move the clock backwards
        last = last.max(now);
        if let Some(UpdateResult::Ignored(_)) = session.tick(last).update {
            ignored += 1;
        }
    }

    let summary = session.finish(last)?;

    if json {
        println!("{}", summary.to_json()?);
        return Ok(());
    }

    print_summary(&summary, ignored);
    if show_segments {
        print_segments(&summary);
    }
    Ok(())
}

fn print_summary(summary: &WorkoutSummary, ignored: usize) {
    let display = MetricsDisplay::from(&summary.metrics);
    let rows = vec![
        MetricRow { name: "Distance (mi)", value: display.distance },
        MetricRow { name: "Avg pace (min/mi)", value: display.pace },
        MetricRow { name: "Avg speed (mph)", value: display.speed },
        MetricRow { name: "Calories", value: display.calories },
        MetricRow { name: "Running time", value: display.running_time },
        MetricRow { name: "Track points", value: summary.track.len().to_string() },
        MetricRow { name: "Ignored fixes", value: ignored.to_string() },
        MetricRow { name: "Segments", value: summary.segments.len().to_string() },
    ];

    println!("{}", format!("Workout {}", summary.id).cyan().bold());
    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn print_segments(summary: &WorkoutSummary) {
    let rows: Vec<SegmentRow> = summary
        .segments
        .iter()
        .enumerate()
        .map(|(i, segment)| SegmentRow {
            index: i + 1,
            band: segment.band.id(),
            color: segment.band.color_hex(),
            points: segment.points.len(),
        })
        .collect();

    println!("{}", "Speed bands".cyan().bold());
    println!("{}", Table::new(rows).with(Style::rounded()));
}
