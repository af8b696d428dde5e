use anyhow::Result;
use ipsmigration::{config::Config, pipeline};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config = Config::load()?;
    info!(
        source = ?config.source_file,
        landing_page = %config.landing_page,
        out_dir = %config.out_dir.display(),
        "configured"
    );

    // ─── 3) fetch, convert, write ────────────────────────────────────
    pipeline::run(config).await
}
