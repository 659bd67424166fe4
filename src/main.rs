use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use phlebotomy_cleaner::app::clean_use_case::CleanUseCase;
use phlebotomy_cleaner::app::coverage_use_case::{CoverageUseCase, COVERAGE_REQUIRED_FIELDS};
use phlebotomy_cleaner::app::export_use_case::ExportUseCase;
use phlebotomy_cleaner::app::normalize_use_case::{NormalizeUseCase, NormalizedTable};
use phlebotomy_cleaner::app::ports::ProviderSourcePort;
use phlebotomy_cleaner::app::quality_gate_use_case::QualityGateUseCase;
use phlebotomy_cleaner::config::Config;
use phlebotomy_cleaner::infra::csv_table_adapter::{CsvCleanOutput, CsvProviderSource};
use phlebotomy_cleaner::infra::file_commit;
use phlebotomy_cleaner::infra::json_projection_adapter::JsonProjectionWriter;
use phlebotomy_cleaner::pipeline::processing::coverage::CoverageQuery;
use phlebotomy_cleaner::pipeline::processing::normalize::DefaultNormalizer;
use phlebotomy_cleaner::pipeline::processing::verify;
use phlebotomy_cleaner::types::{Field, ProviderTable};
use phlebotomy_cleaner::{logging, observability, report};

#[derive(Parser)]
#[command(name = "phlebotomy_cleaner")]
#[command(about = "Mobile phlebotomy provider directory cleaner")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to $PHLEBOTOMY_CLEANER_CONFIG, then ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize the provider table and write the canonical and flagged tables
    Clean {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Count providers covering each metro
    Coverage {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Single city to query instead of the configured metros
        #[arg(long, requires = "state")]
        city: Option<String>,
        /// State for --city, abbreviation or full name
        #[arg(long, requires = "city")]
        state: Option<String>,
        /// List every matched provider with its tier
        #[arg(long)]
        verbose: bool,
    },
    /// Write the website's providers.json
    Export {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Clean, then count coverage and export from the cleaned set
    Run {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        verbose: bool,
    },
}

fn apply_overrides(config: &mut Config, input: Option<PathBuf>, output_dir: Option<PathBuf>) {
    if let Some(input) = input {
        config.input.path = input;
    }
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }
}

fn normalize_use_case(config: &Config) -> NormalizeUseCase {
    NormalizeUseCase::new(Box::new(DefaultNormalizer::with_config(
        config.defaults.clone(),
        config.bio.clone(),
    )))
}

fn source(config: &Config, required: &[Field]) -> CsvProviderSource {
    CsvProviderSource::new(
        &config.input.path,
        config.columns.clone(),
        config.delimiter(),
        required,
    )
}

fn coverage_queries(config: &Config, city: Option<String>, state: Option<String>) -> Result<Vec<CoverageQuery>> {
    if let (Some(city), Some(state)) = (city, state) {
        return Ok(vec![CoverageQuery::new(&city, &state)?]);
    }
    config
        .metro_queries()
        .iter()
        .map(|metro| CoverageQuery::new(&metro.city, &metro.state).map_err(anyhow::Error::from))
        .collect()
}

/// Load and normalize without writing anything
async fn load_normalized(config: &Config, required: &[Field]) -> Result<NormalizedTable> {
    let raw: ProviderTable = source(config, required).load().await?;
    Ok(normalize_use_case(config).normalize_table(&raw))
}

#[tracing::instrument(name = "clean", skip_all)]
async fn run_clean(config: &Config) -> Result<NormalizedTable> {
    println!("🧹 Cleaning {}...", config.input.path.display());

    let use_case = CleanUseCase::new(
        Box::new(source(config, &Field::CLEANING)),
        normalize_use_case(config),
        QualityGateUseCase::with_default_quality_gate(),
        Box::new(CsvCleanOutput::new(
            config.output.canonical_path(),
            config.output.flagged_path(),
            config.columns.clone(),
            config.delimiter(),
        )),
    );

    let outcome = use_case.run().await?;
    report::print_cleaning_report(&outcome);
    report::print_verification(&verify::verify(&outcome.normalized.table.records));
    Ok(outcome.normalized)
}

#[tracing::instrument(name = "coverage", skip_all)]
fn run_coverage(table: &ProviderTable, queries: Vec<CoverageQuery>, verbose: bool) {
    let reports = CoverageUseCase::new(queries).run(table);
    report::print_coverage(&reports, verbose);
}

#[tracing::instrument(name = "export", skip_all)]
async fn run_export(config: &Config, table: &ProviderTable) -> Result<()> {
    let use_case = ExportUseCase::new(
        config.columns.clone(),
        Box::new(JsonProjectionWriter::new(config.output.projection_path())),
    );
    let outcome = use_case.run(table, Utc::now()).await?;
    report::print_export(&outcome);
    Ok(())
}

fn write_metrics_snapshot(path: &Path, rendered: &str) -> Result<()> {
    let written = file_commit::commit(path, rendered.as_bytes())?;
    info!(path = %written.path.display(), "Wrote metrics snapshot");
    Ok(())
}

async fn dispatch(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Clean { input, output_dir } => {
            apply_overrides(&mut config, input, output_dir);
            run_clean(&config).await?;
            println!("\n✅ Cleaning completed");
        }
        Commands::Coverage {
            input,
            city,
            state,
            verbose,
        } => {
            apply_overrides(&mut config, input, None);
            let queries = coverage_queries(&config, city, state)?;
            let normalized = load_normalized(&config, &COVERAGE_REQUIRED_FIELDS).await?;
            run_coverage(&normalized.table, queries, verbose);
        }
        Commands::Export { input, output_dir } => {
            apply_overrides(&mut config, input, output_dir);
            let normalized = load_normalized(&config, &Field::CLEANING).await?;
            run_export(&config, &normalized.table).await?;
        }
        Commands::Run {
            input,
            output_dir,
            verbose,
        } => {
            apply_overrides(&mut config, input, output_dir);
            let queries = coverage_queries(&config, None, None)?;

            println!("\n📥 Step 1: Cleaning...");
            let normalized = run_clean(&config).await?;

            println!("\n📍 Step 2: Counting coverage...");
            run_coverage(&normalized.table, queries, verbose);

            println!("\n📦 Step 3: Exporting...");
            run_export(&config, &normalized.table).await?;

            println!("\n✅ Full pipeline completed successfully!");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();
    let config = Config::resolve(cli.config.as_deref())?;
    let metrics_handle = observability::init()?;
    let snapshot_path = config.output.metrics_snapshot.clone();

    if let Err(e) = dispatch(cli.command, config).await {
        error!("Run failed: {:#}", e);
        println!("❌ Run failed: {:#}", e);
        return Err(e);
    }

    if let Some(path) = snapshot_path {
        write_metrics_snapshot(&path, &metrics_handle.render())?;
    }
    Ok(())
}
