use anyhow::{Context, Result};
use retail_etl::{pipeline, PipelineConfig};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("starting retail sales refresh");

    // ─── 2) fixed layout under the working directory ─────────────────
    let base_dir = std::env::current_dir().context("resolving working directory")?;
    let cfg = PipelineConfig::new(base_dir);

    // ─── 3) run ──────────────────────────────────────────────────────
    let summary = pipeline::run(&cfg)
        .inspect_err(|e| error!("refresh failed: {}", e))
        .with_context(|| format!("refreshing {}", cfg.processed_path().display()))?;

    info!(
        rows_read = summary.rows_read,
        rows_written = summary.rows_written,
        dropped_invalid_date = summary.stats.dropped_invalid_date,
        output = %summary.output.display(),
        "all done"
    );
    Ok(())
}
