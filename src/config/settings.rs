use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::DefaultConfig;
use crate::error::{ProfileError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// 构建上下文配置
    pub context: ContextConfig,

    /// 报告配置
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContextConfig {
    /// 构建清单文件名（相对上下文目录）
    pub manifest: String,

    /// 忽略文件名（相对上下文目录）
    pub ignore_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
    /// 每个排名显示的条目数
    pub top_n: usize,

    /// 进度行每秒刷新次数
    pub progress_hz: u32,

    /// 是否显示进度行
    pub show_progress: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            manifest: DefaultConfig::manifest(),
            ignore_file: DefaultConfig::ignore_file(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: DefaultConfig::top_n(),
            progress_hz: DefaultConfig::progress_hz(),
            show_progress: DefaultConfig::show_progress(),
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| ProfileError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

        Self::from_toml(&content).map_err(|message| ProfileError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// 解析 TOML 文本，缺省字段使用默认值
    pub fn from_toml(content: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|err| err.to_string())?;

        if config.report.progress_hz == 0 {
            return Err("report.progress_hz 必须大于 0".to_string());
        }

        Ok(config)
    }

    /// 获取默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("context-profiler");
        path.push("config.toml");
        Some(path)
    }

    /// 加载默认位置的配置；文件不存在时使用内置默认值，从不写入磁盘
    pub fn load_or_default() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!("加载配置文件: {}", path.display());
                Self::load_from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.context.manifest, "Dockerfile");
        assert_eq!(config.context.ignore_file, ".dockerignore");
        assert_eq!(config.report.top_n, 10);
        assert_eq!(config.report.progress_hz, 50);
        assert!(config.report.show_progress);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("[report]\ntop_n = 3\n").unwrap();

        assert_eq!(config.report.top_n, 3);
        assert_eq!(config.report.progress_hz, 50);
        assert_eq!(config.context, ContextConfig::default());
    }

    #[test]
    fn test_zero_hz_rejected() {
        assert!(Config::from_toml("[report]\nprogress_hz = 0\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[context]\nmanifest = \"docker/Dockerfile.prod\"\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.context.manifest, "docker/Dockerfile.prod");
        assert_eq!(config.context.ignore_file, ".dockerignore");
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[report\n").unwrap();

        let result = Config::load_from_file(&path);

        assert!(matches!(result, Err(ProfileError::Config { .. })));
    }
}
