use clap::Parser;
use wikitext_export::adapters::open_source;
use wikitext_export::core::ConfigProvider;
use wikitext_export::utils::error::exit_with;
use wikitext_export::utils::{logger, validation::Validate};
use wikitext_export::{ExportEngine, LineExporter, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-export")]
#[command(about = "Dataset export driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "export.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be exported without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => exit_with("Loading configuration", &e),
    };

    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("📁 Loaded configuration from {}", args.config);

    if let Err(e) = config.validate() {
        exit_with("Configuration validation", &e);
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be fetched or written");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    let source = match open_source(&config, config.input_jsonl()).await {
        Ok(source) => source,
        Err(e) => exit_with("Opening the record source", &e),
    };
    let exporter = LineExporter::from_config(source, LocalStorage::default(), &config);
    let mut engine = ExportEngine::new_with_monitoring(exporter, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            println!(
                "✅ Wrote {} lines to {}",
                summary.records_written, summary.output_path
            );
        }
        Err(e) => exit_with("Export", &e),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Export summary:");
    match config.input_jsonl() {
        Some(path) => tracing::info!("  Input: {}", path.display()),
        None => {
            tracing::info!(
                "  Dataset: {} (config {}, split {})",
                config.dataset(),
                config.config_name(),
                config.split()
            );
            tracing::info!("  Endpoint: {}", config.endpoint());
            tracing::info!("  Page size: {}", config.page_size());
        }
    }
    if let Some(max) = config.max_records() {
        tracing::info!("  Max records: {}", max);
    }
    tracing::info!("  Text field: {}", config.text_field());
    tracing::info!("  Output: {}", config.output_path());
}
