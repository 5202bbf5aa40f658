//! Runtime configuration: library file path and log level.

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_LIBRARY_PATH: &str = "library.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const PATH_ENV: &str = "BOOK_CATALOG_PATH";
pub const LOG_ENV: &str = "BOOK_CATALOG_LOG";

/// 優先順位: 引数 → 環境変数 → 既定値
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "book-catalog-mcp", version, about = "Personal book catalog served over MCP")]
pub struct Config {
    /// Path to the library JSON file
    #[arg(value_name = "PATH", env = PATH_ENV, default_value = DEFAULT_LIBRARY_PATH)]
    pub library_path: PathBuf,

    /// Log level for book_catalog_mcp (ignored when RUST_LOG is set)
    #[arg(long, env = LOG_ENV, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}
