//! 变更追踪配置

use std::path::{Path, PathBuf};
use std::sync::Arc;

use change_log_repo::{ChangeLogRepo, JsonlChangeLogRepo, MemChangeLogRepo, RepoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// 变更追踪配置
///
/// # 示例
/// ```ignore
/// let config = TrackingConfig::new()
///     .with_default_language("cs")
///     .with_creation_excluded_type("http://example.org/File");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// 多语言标签的展示语言
    #[serde(default = "default_language")]
    pub default_language: String,

    /// 新建时不记录创建事件的资产类型（在 `AssetClass::TRACK_CREATION` 之外追加）
    #[serde(default)]
    pub creation_excluded_types: Vec<String>,

    /// 变更日志文件路径，为空时使用内存日志
    #[serde(default)]
    pub change_log_path: Option<PathBuf>,
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            creation_excluded_types: Vec::new(),
            change_log_path: None,
        }
    }
}

impl TrackingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置展示语言
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    /// 追加一个不记录创建事件的资产类型
    pub fn with_creation_excluded_type(mut self, asset_type: impl Into<String>) -> Self {
        self.creation_excluded_types.push(asset_type.into());
        self
    }

    /// 设置变更日志文件路径
    pub fn with_change_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.change_log_path = Some(path.into());
        self
    }

    /// 从 JSON 文件加载
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 从 JSON 字符串解析并校验
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: TrackingConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_language.trim().is_empty() {
            return Err(ConfigError::Invalid("default_language cannot be empty".to_string()));
        }
        Ok(())
    }

    /// 按配置打开变更日志：配置了路径用 JSON Lines 文件，否则用内存日志
    pub fn open_change_log(&self) -> Result<Arc<dyn ChangeLogRepo>, RepoError> {
        match &self.change_log_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "using file change log");
                Ok(Arc::new(JsonlChangeLogRepo::open(path)?))
            }
            None => {
                tracing::info!("using in-memory change log");
                Ok(Arc::new(MemChangeLogRepo::new()))
            }
        }
    }
}
