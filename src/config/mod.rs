//! 门店服务配置模块
//!
//! 配置按以下顺序叠加（后者覆盖前者）：
//! 1. 内置默认值
//! 2. `config/base.toml`（或单个 `config.toml`）
//! 3. 同目录下的 `environments/{环境}.toml`
//! 4. 环境变量
//!
//! 加载发生在日志初始化之前，过程中的告警随结果返回，由调用方在日志就绪后输出。

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use toml::Value;

mod manager;
pub use manager::ConfigManager;

pub const DEFAULT_SERVICE_NAME: &str = "omnipos-store-service";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_PORT: u16 = 50055;
pub const DEFAULT_TENANT_HEADER: &str = "x-tenant-id";

/// 服务基本信息
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// 服务名称
    pub name: String,
    /// 运行环境（development / staging / production）
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVICE_NAME.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case(DEFAULT_ENVIRONMENT)
    }
}

/// gRPC 监听配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.address, self.port)
            .parse()
            .with_context(|| format!("invalid server address {}:{}", self.address, self.port))
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" | "console" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（`RUST_LOG` 优先）
    pub level: String,
    /// 未设置时开发环境使用文本，其余环境使用 JSON
    pub format: Option<LogFormat>,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_file: bool,
    pub with_line_number: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            format: None,
            with_target: true,
            with_thread_ids: false,
            with_file: false,
            with_line_number: false,
        }
    }
}

/// PostgreSQL 配置
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    /// 数据库连接 URL
    pub url: String,
    /// 最大连接数
    #[serde(default)]
    pub max_connections: Option<u32>,
    /// 最小连接数
    #[serde(default)]
    pub min_connections: Option<u32>,
    /// 获取连接超时时间（秒）
    #[serde(default)]
    pub acquire_timeout_secs: Option<u64>,
    /// 启动时创建表结构
    #[serde(default = "default_true")]
    pub init_schema: bool,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: None,
            min_connections: None,
            acquire_timeout_secs: None,
            init_schema: true,
        }
    }
}

/// 租户隔离配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TenancyConfig {
    /// 携带租户ID的元数据键（小写）
    pub header: String,
    /// 为 true 时跨租户访问对外返回 NOT_FOUND，不暴露门店是否存在
    pub conceal_foreign_stores: bool,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            header: DEFAULT_TENANT_HEADER.to_string(),
            conceal_foreign_stores: false,
        }
    }
}

/// 应用配置主结构体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 未配置时使用内存仓储
    #[serde(default)]
    pub postgres: Option<PostgresConfig>,
    #[serde(default)]
    pub tenancy: TenancyConfig,
}

impl AppConfig {
    pub fn log_format(&self) -> LogFormat {
        self.logging.format.unwrap_or(if self.service.is_development() {
            LogFormat::Text
        } else {
            LogFormat::Json
        })
    }

    /// 用环境变量覆盖配置，`lookup` 便于测试时注入；返回无法识别的取值
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(name) = lookup("APP_NAME") {
            self.service.name = name;
        }
        if let Some(environment) = lookup("APP_ENV") {
            self.service.environment = environment;
        }

        if let Some(raw) = lookup("GRPC_PORT") {
            match parse_listen_address(&raw) {
                Some((address, port)) => {
                    if let Some(address) = address {
                        self.server.address = address;
                    }
                    self.server.port = port;
                }
                None => warnings.push(format!(
                    "invalid GRPC_PORT {raw:?}, keeping {}",
                    self.server.port
                )),
            }
        }

        if let Some(level) = lookup("LOGGER_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOGGER_FORMAT") {
            match LogFormat::parse(&format) {
                Some(format) => self.logging.format = Some(format),
                None => warnings.push(format!("invalid LOGGER_FORMAT {format:?}, ignoring")),
            }
        }

        let explicit_url = lookup("POSTGRES_URL").or_else(|| lookup("DATABASE_URL"));
        let has_parts = ["POSTGRES_HOST", "POSTGRES_DB"]
            .iter()
            .any(|key| lookup(key).is_some());
        let url = explicit_url.or_else(|| {
            has_parts.then(|| {
                format!(
                    "postgres://{}:{}@{}:{}/{}?sslmode=disable",
                    lookup("POSTGRES_USER").unwrap_or_else(|| "postgres".to_string()),
                    lookup("POSTGRES_PASSWORD").unwrap_or_else(|| "postgres".to_string()),
                    lookup("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_string()),
                    lookup("POSTGRES_PORT").unwrap_or_else(|| "5432".to_string()),
                    lookup("POSTGRES_DB").unwrap_or_else(|| "omnipos_store_db".to_string()),
                )
            })
        });
        if let Some(url) = url {
            self.postgres.get_or_insert_with(PostgresConfig::default).url = url;
        }

        if let Some(header) = lookup("STORE_TENANT_HEADER") {
            self.tenancy.header = header;
        }
        if let Some(raw) = lookup("STORE_CONCEAL_FOREIGN_STORES") {
            self.tenancy.conceal_foreign_stores = raw.eq_ignore_ascii_case("true") || raw == "1";
        }

        warnings
    }

    /// 确保配置有合法值
    fn ensure_defaults(&mut self) {
        if self.server.address.is_empty() {
            self.server.address = "0.0.0.0".to_string();
        }
        if self.server.port == 0 {
            self.server.port = DEFAULT_PORT;
        }
        self.tenancy.header = self.tenancy.header.trim().to_ascii_lowercase();
        if self.tenancy.header.is_empty() {
            self.tenancy.header = DEFAULT_TENANT_HEADER.to_string();
        }
        if self
            .postgres
            .as_ref()
            .is_some_and(|postgres| postgres.url.trim().is_empty())
        {
            self.postgres = None;
        }
    }
}

fn default_true() -> bool {
    true
}

/// 解析 `:50055`、`50055` 或 `127.0.0.1:50055`
fn parse_listen_address(raw: &str) -> Option<(Option<String>, u16)> {
    let raw = raw.trim();
    match raw.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse().ok()?;
            let host = (!host.is_empty()).then(|| host.to_string());
            Some((host, port))
        }
        None => raw.parse().ok().map(|port| (None, port)),
    }
}

/// 配置加载结果
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    /// 加载过程中被忽略的来源或取值
    pub warnings: Vec<String>,
}

/// 加载配置：文件 → 环境配置 → 环境变量
pub fn load_config(path: Option<&str>) -> LoadedConfig {
    load_config_with(path, |key| env::var(key).ok())
}

/// 同 `load_config`，环境变量通过 `lookup` 读取
pub fn load_config_with<F>(path: Option<&str>, lookup: F) -> LoadedConfig
where
    F: Fn(&str) -> Option<String>,
{
    let candidates: Vec<PathBuf> = match path {
        Some(p) => vec![PathBuf::from(p)],
        None => vec![PathBuf::from("config"), PathBuf::from("config.toml")],
    };
    let app_env = lookup("APP_ENV").filter(|env| !env.trim().is_empty());

    let mut warnings = Vec::new();
    let mut config = None;
    for candidate in &candidates {
        match read_config(candidate, app_env.as_deref()) {
            Ok(loaded) => {
                config = Some(loaded);
                break;
            }
            Err(err) => {
                warnings.push(format!("failed to load config from {}: {err:#}", candidate.display()))
            }
        }
    }
    let mut config = config.unwrap_or_else(|| {
        warnings.push("no configuration source succeeded, falling back to defaults".to_string());
        AppConfig::default()
    });

    warnings.extend(config.apply_env_overrides(&lookup));
    config.ensure_defaults();

    LoadedConfig { config, warnings }
}

/// 读取 `config/` 目录（`base.toml`）或单个文件，并叠加环境配置
fn read_config(path: &Path, app_env: Option<&str>) -> Result<AppConfig> {
    let (base_file, config_dir) = if path.is_dir() {
        (path.join("base.toml"), path.to_path_buf())
    } else if path.is_file() {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        (path.to_path_buf(), dir)
    } else {
        bail!("configuration path {} does not exist", path.display());
    };

    let mut value = read_toml(&base_file)?;
    if !value.is_table() {
        bail!("configuration must be a table: {}", base_file.display());
    }

    let environment = ConfigManager::resolve_environment(&value, app_env);
    ConfigManager::apply_environment_overlay(&mut value, &config_dir, &environment)?;

    value
        .try_into()
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

fn read_toml(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("unable to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
}

/// 表按键递归覆盖，其余值整体替换
fn overlay_value(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => overlay_value(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_for_store_service() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.service.name, "omnipos-store-service");
        assert_eq!(cfg.server.port, 50055);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.tenancy.header, "x-tenant-id");
        assert!(cfg.postgres.is_none());
        assert_eq!(cfg.log_format(), LogFormat::Text);
    }

    #[test]
    fn parses_toml_sections() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [service]
            environment = "production"

            [server]
            port = 6000

            [postgres]
            url = "postgres://localhost/stores"
            max_connections = 4

            [tenancy]
            conceal_foreign_stores = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.service.name, "omnipos-store-service");
        assert_eq!(cfg.server.address, "0.0.0.0");
        assert_eq!(cfg.server.port, 6000);
        let postgres = cfg.postgres.as_ref().unwrap();
        assert_eq!(postgres.max_connections, Some(4));
        assert!(postgres.init_schema);
        assert!(cfg.tenancy.conceal_foreign_stores);
        assert_eq!(cfg.log_format(), LogFormat::Json);
    }

    #[test]
    fn env_overrides_win() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides(lookup(&[
            ("APP_ENV", "production"),
            ("GRPC_PORT", ":50100"),
            ("LOGGER_LEVEL", "info"),
            ("LOGGER_FORMAT", "text"),
            ("POSTGRES_HOST", "db"),
            ("POSTGRES_PASSWORD", "secret"),
            ("STORE_TENANT_HEADER", "X-Merchant-Id"),
            ("STORE_CONCEAL_FOREIGN_STORES", "1"),
        ]));
        cfg.ensure_defaults();

        assert_eq!(cfg.service.environment, "production");
        assert_eq!(cfg.server.port, 50100);
        assert_eq!(cfg.server.address, "0.0.0.0");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.log_format(), LogFormat::Text);
        assert_eq!(
            cfg.postgres.unwrap().url,
            "postgres://postgres:secret@db:5432/omnipos_store_db?sslmode=disable"
        );
        assert_eq!(cfg.tenancy.header, "x-merchant-id");
        assert!(cfg.tenancy.conceal_foreign_stores);
    }

    #[test]
    fn explicit_postgres_url_beats_parts() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides(lookup(&[
            ("POSTGRES_URL", "postgres://explicit/db"),
            ("POSTGRES_HOST", "ignored"),
        ]));
        assert_eq!(cfg.postgres.unwrap().url, "postgres://explicit/db");
    }

    #[test]
    fn invalid_port_is_ignored() {
        let mut cfg = AppConfig::default();
        let warnings = cfg.apply_env_overrides(lookup(&[("GRPC_PORT", "not-a-port")]));
        assert_eq!(cfg.server.port, DEFAULT_PORT);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("GRPC_PORT"));
    }

    #[test]
    fn listen_address_forms() {
        assert_eq!(parse_listen_address(":50055"), Some((None, 50055)));
        assert_eq!(parse_listen_address("50055"), Some((None, 50055)));
        assert_eq!(
            parse_listen_address("127.0.0.1:7000"),
            Some((Some("127.0.0.1".to_string()), 7000))
        );
        assert_eq!(parse_listen_address("abc"), None);
    }

    #[test]
    fn blank_postgres_url_means_no_database() {
        let mut cfg: AppConfig = toml::from_str("[postgres]\nurl = \"\"\n").unwrap();
        cfg.ensure_defaults();
        assert!(cfg.postgres.is_none());
    }

    #[test]
    fn overlay_replaces_nested_keys_only() {
        let mut base: Value = toml::from_str("[server]\naddress = \"0.0.0.0\"\nport = 1\n").unwrap();
        let overlay: Value = toml::from_str("[server]\nport = 2\n").unwrap();
        overlay_value(&mut base, overlay);

        let cfg: AppConfig = base.try_into().unwrap();
        assert_eq!(cfg.server.address, "0.0.0.0");
        assert_eq!(cfg.server.port, 2);
    }

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn shipped_config_dir() -> String {
        format!("{}/config", env!("CARGO_MANIFEST_DIR"))
    }

    #[test]
    fn shipped_development_config_keeps_errors_distinct() {
        let loaded = load_config_with(Some(shipped_config_dir().as_str()), lookup(&[]));

        assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
        assert_eq!(loaded.config.service.environment, "development");
        assert!(!loaded.config.tenancy.conceal_foreign_stores);
        assert_eq!(loaded.config.log_format(), LogFormat::Text);
    }

    #[test]
    fn shipped_production_config_conceals_foreign_stores() {
        let loaded = load_config_with(
            Some(shipped_config_dir().as_str()),
            lookup(&[("APP_ENV", "production")]),
        );

        assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
        let cfg = loaded.config;
        assert_eq!(cfg.service.environment, "production");
        assert!(cfg.tenancy.conceal_foreign_stores);
        assert_eq!(cfg.log_format(), LogFormat::Json);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.tenancy.header, "x-tenant-id");
    }

    #[test]
    fn environment_from_base_file_selects_overlay() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "base.toml",
            "[service]\nenvironment = \"staging\"\n\n[server]\nport = 7000\n",
        );
        write(
            dir.path(),
            "environments/staging.toml",
            "[server]\naddress = \"127.0.0.1\"\n\n[tenancy]\nheader = \"X-Merchant-Id\"\n",
        );

        let loaded = load_config_with(dir.path().to_str(), lookup(&[]));

        let cfg = loaded.config;
        assert_eq!(cfg.server.socket_addr().unwrap().to_string(), "127.0.0.1:7000");
        assert_eq!(cfg.tenancy.header, "x-merchant-id");
        assert!(cfg.postgres.is_none());
    }

    #[test]
    fn single_file_uses_sibling_environments() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "config.toml", "[server]\nport = 7100\n");
        write(
            dir.path(),
            "environments/production.toml",
            "[tenancy]\nconceal_foreign_stores = true\n",
        );
        let file = dir.path().join("config.toml");

        let dev = load_config_with(file.to_str(), lookup(&[])).config;
        let prod = load_config_with(file.to_str(), lookup(&[("APP_ENV", "production")])).config;

        assert_eq!(dev.server.port, 7100);
        assert!(!dev.tenancy.conceal_foreign_stores);
        assert!(prod.tenancy.conceal_foreign_stores);
    }

    #[test]
    fn unreadable_sources_fall_back_with_warnings() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.toml", "[server\nport = ");
        let missing = dir.path().join("missing");

        let broken = load_config_with(dir.path().join("broken.toml").to_str(), lookup(&[]));
        let absent = load_config_with(missing.to_str(), lookup(&[("LOGGER_FORMAT", "xml")]));

        assert_eq!(broken.config.server.port, DEFAULT_PORT);
        assert_eq!(broken.warnings.len(), 2);
        assert!(broken.warnings[0].contains("invalid TOML"));
        assert!(broken.warnings[1].contains("falling back to defaults"));

        assert_eq!(absent.warnings.len(), 3);
        assert!(absent.warnings[0].contains("does not exist"));
        assert!(absent.warnings[2].contains("LOGGER_FORMAT"));
    }
}
