use clap::Parser;
use std::path::Path;
use wikitext_export::adapters::open_source;
use wikitext_export::utils::error::exit_with;
use wikitext_export::utils::{logger, validation::Validate};
use wikitext_export::{CliConfig, ExportEngine, LineExporter, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting wikitext-export");
    tracing::debug!(
        "Dataset {} (config {}, split {}), field '{}', output {}",
        config.dataset,
        config.config_name,
        config.split,
        config.text_field,
        config.output
    );

    if let Err(e) = config.validate() {
        exit_with("Configuration validation", &e);
    }

    let source = match open_source(&config, config.input_jsonl.as_deref().map(Path::new)).await {
        Ok(source) => source,
        Err(e) => exit_with("Opening the record source", &e),
    };

    let storage = LocalStorage::default();
    let exporter = LineExporter::from_config(source, storage, &config);
    let mut engine = ExportEngine::new_with_monitoring(exporter, config.monitor);

    match engine.run().await {
        Ok(summary) => {
            if config.json_summary {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "✅ Wrote {} lines to {}",
                    summary.records_written, summary.output_path
                );
            }
        }
        Err(e) => exit_with("Export", &e),
    }

    Ok(())
}
