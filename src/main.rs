use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use media_analysis::dashboard::{self, DashboardSettings, TrendPanel};
use media_analysis::{AppConfig, FilterError, FilterSpec, QueryInput, RecordTable};

#[derive(Parser, Debug)]
#[command(name = "media-analysis", version, about = "Statistical views over news article tables")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "MEDIA_ANALYSIS_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset file (overrides [data].path)
    #[arg(long, global = true, env = "MEDIA_ANALYSIS_DATA")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build every panel for one query
    Report {
        /// First day (YYYY-MM-DD); alone it selects a single day
        #[arg(long)]
        from: Option<String>,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Category to keep (repeatable, default: all)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Source to keep (repeatable, default: all)
        #[arg(long = "source")]
        sources: Vec<String>,

        /// Print the dashboard as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// List the categories, sources and date span a query can select from
    Options,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_analysis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    let data_path = cli
        .data
        .clone()
        .or_else(|| config.data.path.clone())
        .context("no dataset given: pass --data or set [data].path")?;

    let table = load_table(&data_path, &config)?;

    match cli.command {
        Command::Report {
            from,
            to,
            categories,
            sources,
            json,
        } => run_report(&table, &config, from, to, categories, sources, json),
        Command::Options => run_options(&table),
    }
}

fn load_table(path: &Path, config: &AppConfig) -> Result<RecordTable> {
    RecordTable::load_path(path, &config.data.load_options())
        .with_context(|| format!("Failed to load dataset {}", path.display()))
}

fn run_report(
    table: &RecordTable,
    config: &AppConfig,
    from: Option<String>,
    to: Option<String>,
    categories: Vec<String>,
    sources: Vec<String>,
    json: bool,
) -> Result<()> {
    let spec = report_filter(table, config, from, to, categories, sources)?;

    let settings = DashboardSettings::from_config(&config.aggregate)?;
    let dashboard = dashboard::build(table, &spec, &settings);

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    println!("📰 Media Analysis");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "📅 {} → {}",
        spec.date_range.start(),
        spec.date_range.end()
    );
    println!("✓ {}", dashboard.summary());

    match &dashboard.trend {
        TrendPanel::TimeSeries { by_category, .. } => {
            println!("\n📈 Articles per category ({} days)", by_category.x.len());
            for series in &by_category.series {
                let total: usize = series.values.iter().sum();
                println!("   {:<24} {:>6}", series.name, total);
            }
        }
        TrendPanel::SingleDayBreakdown { by_source } => {
            println!("\n📊 Categories per source");
            for trace in &by_source.traces {
                let cells: Vec<String> = trace
                    .x
                    .iter()
                    .zip(&trace.y)
                    .map(|(category, count)| format!("{}={}", category, count))
                    .collect();
                println!("   {:<24} {}", trace.name, cells.join(", "));
            }
        }
    }

    println!("\n🔤 Top topics");
    for (label, count) in dashboard.topics.labels.iter().zip(&dashboard.topics.values) {
        println!("   {:<24} {:>6}", label, count);
    }

    println!("\n🌍 Countries");
    for (country, count) in dashboard
        .countries
        .locations
        .iter()
        .zip(&dashboard.countries.z)
        .take(10)
    {
        println!("   {:<24} {:>6}", country, count);
    }

    if dashboard.sentiment.out_of_range + dashboard.subjectivity.out_of_range > 0 {
        println!(
            "\n⚠️  Scores outside bucket range: sentiment {}, subjectivity {}",
            dashboard.sentiment.out_of_range, dashboard.subjectivity.out_of_range
        );
    }

    Ok(())
}

/// Turn the report flags into a validated FilterSpec
///
/// No dates means the whole span of the table; `--to` without `--from` is rejected.
fn report_filter(
    table: &RecordTable,
    config: &AppConfig,
    from: Option<String>,
    to: Option<String>,
    categories: Vec<String>,
    sources: Vec<String>,
) -> Result<FilterSpec> {
    let sentinel = &config.filter.all_sentinel;

    let dates = match (from, to) {
        (Some(from), Some(to)) => vec![from, to],
        (Some(day), None) => vec![day],
        (None, Some(end)) => {
            return Err(FilterError::EndWithoutStart { end }).context("Invalid filter")
        }
        (None, None) => match table.date_span() {
            Some((start, end)) => vec![start.to_string(), end.to_string()],
            None => bail!("dataset is empty"),
        },
    };

    let input = QueryInput {
        dates,
        categories: or_all(categories, sentinel),
        sources: or_all(sources, sentinel),
    };

    input
        .to_filter_spec_for(table, &config.filter.sentinels())
        .context("Invalid filter")
}

fn or_all(values: Vec<String>, sentinel: &str) -> Vec<String> {
    if values.is_empty() {
        vec![sentinel.to_string()]
    } else {
        values
    }
}

fn run_options(table: &RecordTable) -> Result<()> {
    println!("📂 {} articles", table.len());

    if let Some((start, end)) = table.date_span() {
        println!("📅 {} → {}", start, end);
    }

    println!("\n🏷️  Categories");
    for category in table.categories() {
        println!("   {}", category);
    }

    println!("\n📰 Sources");
    for source in table.sources() {
        println!("   {}", source);
    }

    Ok(())
}
