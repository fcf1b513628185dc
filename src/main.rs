//! Menucal CLI Entry Point

use std::path::PathBuf;

use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use menucal::{ics, Config, EventAssembler, Pipeline, RunReport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Menucal: School Menu Calendar Generator
#[derive(Parser, Debug)]
#[command(name = "menucal")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the calendar from saved menu payloads (default)
    Generate {
        /// Directory of payload files (overrides config)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output .ics path (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Run as if today were this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Run extraction and report what would be generated, without writing
    Inspect {
        /// Directory of payload files (overrides config)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Run as if today were this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    match args.command {
        Some(Command::Inspect { input, date }) => {
            let (_, report) = run_pipeline(&config, input, date)?;
            print_report(&report, args.json)?;
        }
        Some(Command::Generate {
            input,
            output,
            date,
        }) => generate(&config, input, output, date, args.json)?,
        None => generate(&config, None, None, None, args.json)?,
    }
    Ok(())
}

fn generate(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    date: Option<NaiveDate>,
    json: bool,
) -> anyhow::Result<()> {
    let (events, report) = run_pipeline(config, input, date)?;
    let document = ics::emit(&events, &config.calendar_meta(), Utc::now());
    let path = output.unwrap_or_else(|| config.output_path());
    ics::write_atomic(&path, &document)?;
    tracing::info!(path = %path.display(), events = report.events, "Calendar written");
    print_report(&report, json)
}

fn run_pipeline(
    config: &Config,
    input: Option<PathBuf>,
    date: Option<NaiveDate>,
) -> anyhow::Result<(menucal::EventSet, RunReport)> {
    let today = date.unwrap_or_else(|| Local::now().date_naive());
    let input_dir = input.unwrap_or_else(|| config.input_dir());
    let pipeline = Pipeline::new(
        config.window.clone(),
        EventAssembler::with_default_title(&config.calendar.default_title),
        today,
    );
    Ok(pipeline.run(&input_dir)?)
}

fn print_report(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("events: {}", report.events);
    if let Some((first, last)) = report.date_range {
        println!("date range: {} to {}", first, last);
    }
    println!(
        "payloads: {} processed, {} outside window",
        report.payloads_processed, report.payloads_out_of_window
    );
    if report.skipped_entries() > 0 {
        println!(
            "skipped entries: {} ({} unparseable dates, {} missing day numbers, {} empty days)",
            report.skipped_entries(),
            report.dates_unparseable,
            report.missing_day_number,
            report.empty_days
        );
    }
    for name in &report.unrecognized {
        println!("unrecognized payload: {}", name);
    }
    for (name, error) in &report.payloads_failed {
        println!("failed payload: {} ({})", name, error);
    }
    Ok(())
}
