use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
    pub query: QueryConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// 监听地址，如 `"127.0.0.1:8000"`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    // SQLite 数据库文件路径
    pub path: String,
    // 行情数据表名
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/stock_data.db".to_string(),
            table: "stock_data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub csv_path: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            csv_path: "data/synthetic_stock_data.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    // daily_prices 未指定 limit 时的默认返回条数
    pub default_limit: i64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { default_limit: 500 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    // 默认日志级别，RUST_LOG 优先
    pub level: String,
    // 滚动日志目录，为空时仅输出到终端
    pub dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.database.path, "data/stock_data.db");
        assert_eq!(config.database.table, "stock_data");
        assert_eq!(config.query.default_limit, 500);
        assert_eq!(config.log.level, "info");
        assert!(config.log.dir.is_none());
    }
}
