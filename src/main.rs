use clap::Parser;
use rma_query::app::connectivity::{GridSearchParams, MouseConnectivityApi, VolumetricDownload};
use rma_query::app::export::{export_payload, ExportFormat};
use rma_query::config::cli::Command;
use rma_query::utils::error::{ErrorSeverity, Result};
use rma_query::utils::{logger, validation::Validate};
use rma_query::{CliConfig, LocalStorage, ResponseParser, RmaClient};

async fn run(cli: &CliConfig) -> Result<()> {
    let config = cli.client_config()?;
    let format = config.response_format()?;
    let client = RmaClient::new(config.build_transport(), ResponseParser, format);
    let api = MouseConnectivityApi::new(client, &config);

    let url = match &cli.command {
        Command::Experiments { structure_id } => api.build_query(*structure_id, format)?,
        Command::Detail { experiment_id } => api.build_detail_query(*experiment_id, format)?,
        Command::ImageMeta {
            experiment_id,
            section_number,
        } => api.build_projection_image_meta_info(*experiment_id, *section_number, format)?,
        Command::SignalStats {
            section_data_set_id,
            is_injection,
        } => api.build_signal_statistics_url(*section_data_set_id, *is_injection, format)?,
        Command::GridSearch(args) => {
            api.build_projection_grid_search_url(&GridSearchParams::from(args), format)?
        }
        Command::DownloadVolume(args) => {
            let download = VolumetricDownload::from(args);
            let url = api.build_volumetric_data_url(&download)?;
            if cli.url_only {
                println!("{}", url);
            } else {
                let saved = api.download_volumetric_data(&download).await?;
                println!("📁 Volume saved to: {}", saved.display());
            }
            return Ok(());
        }
    };

    if cli.url_only {
        println!("{}", url);
        return Ok(());
    }

    tracing::info!("📡 Querying {}", url);
    let payload = api.client().query(&url).await?;
    tracing::info!(
        "📥 Received {} rows",
        payload.as_array().map(Vec::len).unwrap_or(1)
    );

    match &cli.output {
        Some(path) => {
            let storage = LocalStorage::new(".".to_string());
            export_payload(&storage, &payload, path, ExportFormat::from_path(path)?, &url).await?;
            println!("📁 Output saved to: {}", path);
        }
        None => println!("{}", serde_json::to_string_pretty(&payload)?),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose, cli.log_json);
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!("❌ Query failed: {} (severity: {:?})", e, e.severity());
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2, // transport, may succeed on retry
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}
