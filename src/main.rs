use book_catalog_mcp::config::Config;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // stdoutはMCPトランスポートが使うのでログはstderrへ
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("book_catalog_mcp={}", config.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!(
        path = %config.library_path.display(),
        "starting book-catalog-mcp v{}",
        env!("CARGO_PKG_VERSION")
    );

    book_catalog_mcp::interface::mcp::run(config.library_path).await
}
