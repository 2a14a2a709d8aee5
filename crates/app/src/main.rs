use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use stockscope_api::server::{AppState, start_server};
use stockscope_core::config::AppConfig;
use stockscope_query::service::QueryService;
use stockscope_store::ingest::CsvIngestor;
use stockscope_store::sqlite::SqliteRowSource;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// 未指定 `--config` 时尝试读取的配置文件
const DEFAULT_CONFIG_FILE: &str = "stockscope.toml";

#[derive(Debug, Parser)]
#[command(name = "stockscope", about = "Stock data analysis API")]
struct Cli {
    /// 配置文件路径 (TOML)，默认读取当前目录下的 stockscope.toml (可缺省)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// 启动 HTTP API 服务
    Serve,
    /// 将行情 CSV 导入 SQLite 数据库
    Ingest {
        /// CSV 文件路径，缺省时使用配置中的 ingest.csv_path
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

/// # Summary
/// 加载配置：内置默认值 ← 配置文件 ← 环境变量 (`STOCKSCOPE__SECTION__KEY`)。
///
/// # Arguments
/// * `path` - 显式指定的配置文件，指定时文件必须存在。
fn load_config(path: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    let file = match path {
        Some(path) => File::from(path.to_path_buf()).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(file)
        .add_source(
            Environment::with_prefix("STOCKSCOPE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// 初始化全局日志。`RUST_LOG` 优先于 `log.level`；配置了 `log.dir` 时额外按天滚动写文件。
///
/// # Returns
/// 文件日志的后台写线程守卫，必须存活到进程结束。
fn init_logging(config: &AppConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.level.as_str()));

    let (file_layer, guard) = match &config.log.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "stockscope.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// # Summary
/// 启动 API 服务。
///
/// # Logic
/// 1. 创建处于未就绪状态的查询服务。
/// 2. 在后台任务中加载数据，加载期间 `/health` 已可访问。
/// 3. 启动 HTTP 服务直到收到退出信号。
async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let service = QueryService::new(config.query.default_limit);
    let source = SqliteRowSource::new(&config.database.path, &config.database.table)?;

    let loader = service.clone();
    tokio::spawn(async move {
        if let Err(e) = loader.reload(&source).await {
            warn!("API is running without data: {}", e);
        }
    });

    let bind_addr = config.server.bind_addr();
    let state = AppState {
        query_service: service,
        app_config: Arc::new(config),
    };
    start_server(state, &bind_addr).await
}

/// 执行一次 CSV 导入并输出统计
async fn ingest(config: &AppConfig, csv: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let csv_path = csv.unwrap_or_else(|| PathBuf::from(&config.ingest.csv_path));
    let ingestor = CsvIngestor::new(&config.database.path, &config.database.table)?;

    info!(
        "Ingesting {} into {} ({})",
        csv_path.display(),
        config.database.path,
        config.database.table
    );
    let report = ingestor.ingest(&csv_path).await?;
    info!(
        "Ingestion finished: read {}, inserted {}, duplicate {}, invalid {}",
        report.read, report.inserted, report.skipped_duplicate, report.skipped_invalid
    );
    Ok(())
}

/// # Summary
/// 应用启动入口，负责组装具体实现并分发子命令。
///
/// # Logic
/// 1. 解析命令行。
/// 2. 加载配置并初始化全局日志。
/// 3. 执行 `serve` 或 `ingest`。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let _guard = init_logging(&config);
    info!("stockscope starting...");

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Ingest { csv } => ingest(&config, csv).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["stockscope", "serve"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve));
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from([
            "stockscope",
            "--config",
            "custom.toml",
            "ingest",
            "--csv",
            "data/prices.csv",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(
            cli.command,
            Commands::Ingest { csv: Some(ref csv) } if csv == Path::new("data/prices.csv")
        ));

        assert!(Cli::try_parse_from(["stockscope"]).is_err());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stockscope.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9100\n\n[database]\ntable = \"prices\"\n\n[query]\ndefault_limit = 50\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:9100");
        assert_eq!(config.database.table, "prices");
        assert_eq!(config.database.path, "data/stock_data.db");
        assert_eq!(config.query.default_limit, 50);
        assert!(config.log.dir.is_none());
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&tmp.path().join("absent.toml"))).is_err());
    }
}
