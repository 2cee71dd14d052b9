use anyhow::Result;
use clap::Parser;
use influx_report::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = config::Cli::parse();

    // Logs go to stderr so stdout carries only the report.
    let default_filter = if cli.verbose {
        "influx_report=debug,info"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = config::AppConfig::load(cli)?;
    let summary = app::run(&app_config).await?;
    tracing::info!(
        containers = summary.containers,
        measurements = summary.measurements,
        records = summary.records,
        hosts = summary.hosts,
        skipped = summary.skipped,
        files = summary.files_written,
        "Completed"
    );
    Ok(())
}
