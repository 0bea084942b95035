use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// 默认配置文件名，可通过 `EXAM_CONFIG` 覆盖
pub const DEFAULT_CONFIG_FILE: &str = "exam_extract.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 待解析的 .docx 文件目录
    pub input_folder: String,
    /// 解析结果（JSON）输出目录
    pub output_folder: String,
    /// 同时解析的文档数量
    pub max_concurrent_documents: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 校验问题写入的文件
    pub warn_file: String,
    /// 校验不通过的试卷是否跳过输出
    pub skip_invalid: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_folder: "input_docx".to_string(),
            output_folder: "output_json".to_string(),
            max_concurrent_documents: 8,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
            skip_invalid: false,
        }
    }
}

impl Config {
    /// 加载配置：先读 TOML 配置文件（若存在），再用环境变量覆盖
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("EXAM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let base = if Path::new(&path).exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        base.with_env_overrides()
    }

    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(path, e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AppError::Config(ConfigError::TomlParseFailed { source, .. }) => {
                AppError::Config(ConfigError::TomlParseFailed {
                    path: path.to_string(),
                    source,
                })
            }
            other => other,
        })
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 用环境变量覆盖现有配置
    pub fn with_env_overrides(self) -> AppResult<Self> {
        Ok(Self {
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(self.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(self.output_folder),
            max_concurrent_documents: env_parse("MAX_CONCURRENT_DOCUMENTS", "usize")?
                .unwrap_or(self.max_concurrent_documents)
                .max(1),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(self.warn_file),
            skip_invalid: env_parse("SKIP_INVALID", "bool")?.unwrap_or(self.skip_invalid),
        })
    }
}

/// 读取并解析环境变量；变量不存在时返回 `None`
fn env_parse<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            })
        }),
        Err(_) => Ok(None),
    }
}
