use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 配置文件路径的环境变量名。
pub const CONFIG_ENV_VAR: &str = "SVG2DXF_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 自动发现配置文件：优先读取环境变量 `SVG2DXF_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 填充轮廓块插入点的推导方式。
///
/// 两种方式下块参照放置后的世界坐标完全一致，差别只在块局部坐标的零点。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HatchOriginMode {
    /// 对已镜像的首顶点 Y 再取反一次，与既有导出文件保持一致。
    #[default]
    Legacy,
    /// 直接以首顶点为局部零点。
    FirstVertex,
}

/// 无法分类的分组（无路径、无可绘制线段）的处理策略。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// 记录诊断信息后跳过该分组。
    #[default]
    Skip,
    /// 以类型化错误中止整个转换。
    Error,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversionConfig {
    /// 元素标识属性的本地名，`ifc:guid` 的本地名为 `guid`。
    #[serde(default = "ConversionConfig::default_identifier_attribute")]
    pub identifier_attribute: String,
    #[serde(default)]
    pub hatch_origin: HatchOriginMode,
    #[serde(default)]
    pub degenerate_groups: DegeneratePolicy,
    #[serde(default = "ConversionConfig::default_text_height")]
    pub text_height: f64,
    #[serde(default = "ConversionConfig::default_enabled")]
    pub convert_lines: bool,
    #[serde(default = "ConversionConfig::default_enabled")]
    pub convert_texts: bool,
}

impl ConversionConfig {
    fn default_identifier_attribute() -> String {
        "guid".to_string()
    }

    fn default_text_height() -> f64 {
        2.5
    }

    fn default_enabled() -> bool {
        true
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            identifier_attribute: Self::default_identifier_attribute(),
            hatch_origin: HatchOriginMode::default(),
            degenerate_groups: DegeneratePolicy::default(),
            text_height: Self::default_text_height(),
            convert_lines: true,
            convert_texts: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_returned_when_file_missing() {
        if env::var_os(CONFIG_ENV_VAR).is_some() {
            return;
        }
        let cfg = AppConfig::discover().expect("discover should succeed");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.conversion.identifier_attribute, "guid");
        assert_eq!(cfg.conversion.hatch_origin, HatchOriginMode::Legacy);
        assert_eq!(cfg.conversion.degenerate_groups, DegeneratePolicy::Skip);
        assert!((cfg.conversion.text_height - 2.5).abs() < f64::EPSILON);
        assert!(cfg.conversion.convert_lines);
        assert!(cfg.conversion.convert_texts);
    }

    #[test]
    fn load_from_temp_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(
            file,
            r#"
            [logging]
            level = "debug"

            [conversion]
            identifier_attribute = "id"
            hatch_origin = "first_vertex"
            degenerate_groups = "error"
            text_height = 5.0
            convert_lines = false
            "#
        )
        .unwrap();

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.conversion.identifier_attribute, "id");
        assert_eq!(cfg.conversion.hatch_origin, HatchOriginMode::FirstVertex);
        assert_eq!(cfg.conversion.degenerate_groups, DegeneratePolicy::Error);
        assert!((cfg.conversion.text_height - 5.0).abs() < f64::EPSILON);
        assert!(!cfg.conversion.convert_lines);
        assert!(cfg.conversion.convert_texts);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[logging]\nlevel = \"warn\"").unwrap();

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "warn");
        assert_eq!(cfg.conversion.identifier_attribute, "guid");
        assert!(cfg.conversion.convert_texts);
    }

    #[test]
    fn invalid_toml_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "[conversion]\nhatch_origin = \"sideways\"").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = AppConfig::from_file("/nonexistent/svg2dxf.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
