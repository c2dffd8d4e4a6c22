//! 配置管理器 - 负责按运行环境叠加配置
//!
//! 运行环境优先取 `APP_ENV`，其次取配置中的 `service.environment`，
//! 都没有时为 `development`。

use std::path::{Path, PathBuf};

use anyhow::Result;
use toml::Value;

use super::{DEFAULT_ENVIRONMENT, overlay_value, read_toml};

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 确定当前环境名称，`app_env` 为 `APP_ENV` 的取值
    pub fn resolve_environment(config: &Value, app_env: Option<&str>) -> String {
        app_env
            .map(str::trim)
            .filter(|env| !env.is_empty())
            .map(str::to_string)
            .or_else(|| Self::configured_environment(config))
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
    }

    /// 环境配置文件路径：{config_dir}/environments/{environment}.toml
    pub fn environment_config_path(config_dir: &Path, environment: &str) -> PathBuf {
        config_dir
            .join("environments")
            .join(format!("{environment}.toml"))
    }

    /// 如果存在环境配置文件，则合并到基础配置中
    pub fn apply_environment_overlay(
        base: &mut Value,
        config_dir: &Path,
        environment: &str,
    ) -> Result<()> {
        let path = Self::environment_config_path(config_dir, environment);
        if path.exists() {
            overlay_value(base, read_toml(&path)?);
        }
        Ok(())
    }

    fn configured_environment(config: &Value) -> Option<String> {
        config
            .get("service")
            .and_then(|service| service.get("environment"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|env| !env.is_empty())
            .map(str::to_string)
    }
}
