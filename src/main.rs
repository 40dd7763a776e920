use anyhow::Context;
use clap::Parser;
use consulta_iue::core::ConfigProvider;
use consulta_iue::report::{ExportFormat, Report};
use consulta_iue::utils::{logger, validation::Validate};
use consulta_iue::{
    CliConfig, Command, ConsultaEngine, ConsultaError, LocalStorage, SoapCaseService,
};
use std::io::Write;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            fail("Configuration could not be loaded", &e);
        }
    };

    if settings.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting consulta-iue CLI");
    if cli.verbose {
        tracing::debug!("Effective settings: {:?}", settings);
    }

    if let Err(e) = settings.validate() {
        fail("Configuration validation failed", &e);
    }

    let service = match SoapCaseService::from_config(&settings).await {
        Ok(service) => Arc::new(service),
        Err(e) => fail("Service unavailable", &e),
    };
    tracing::info!("🔗 Connected to {}", service.description().endpoint);

    let storage = LocalStorage::new(settings.output_path());
    let output_dir = storage.base_path().to_path_buf();
    if settings.writes_files() {
        tracing::info!("📂 Exports go to {}", output_dir.display());
    }
    let engine = ConsultaEngine::new(service, storage)
        .with_max_parallel(settings.max_parallel())
        .with_exports(settings.formats.clone(), settings.bundle);
    let print_text = settings.formats.contains(&ExportFormat::Text);

    let written = match &cli.command {
        Command::Consultar { iue } => match engine.consultar(iue).await {
            Ok(outcome) => {
                if print_text {
                    print_report(&Report::Case(&outcome.value))?;
                }
                outcome.written
            }
            Err(e) => fail("Lookup failed", &e),
        },
        Command::Lote {
            sede,
            desde,
            hasta,
            anio,
        } => match engine.lote(sede, *desde, *hasta, *anio).await {
            Ok(outcome) => {
                if print_text {
                    print_report(&Report::Batch(&outcome.value))?;
                }
                tracing::info!(
                    "✅ Batch completed: {} case files, {} failed",
                    outcome.value.entries.len(),
                    outcome.value.failed_count()
                );
                outcome.written
            }
            Err(e) => fail("Batch lookup failed", &e),
        },
    };

    for name in &written {
        println!("📁 Saved: {}", output_dir.join(name).display());
    }

    Ok(())
}

fn print_report(report: &Report<'_>) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(report.render_text().as_bytes())
        .context("writing report to stdout")?;
    stdout.flush().context("flushing stdout")?;
    Ok(())
}

fn fail(context: &str, e: &ConsultaError) -> ! {
    tracing::error!("❌ {}: {}", context, e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(1);
}
