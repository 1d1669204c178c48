//! 错误类型
//!
//! 分两层：
//! - `AppError`：致命错误（配置/能力缺失/结构错误），直接中止运行并向上传播
//! - `StageError`：单个视频的可恢复错误，只记录在该视频上，运行继续

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型（致命）
#[derive(Debug, Error)]
pub enum AppError {
    /// 缺少必需能力
    #[error("缺少必需能力 (MissingCapability: {0})")]
    MissingCapability(Capability),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 测试计划错误
    #[error("测试计划错误: {0}")]
    Plan(#[from] PlanError),
    /// 结果写入错误
    #[error("结果写入错误: {0}")]
    Writer(#[from] WriterError),
    /// 测试计划生成错误
    #[error("测试计划生成错误: {0}")]
    Generator(#[from] GeneratorError),
}

/// 运行所需的能力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// 转写能力
    Transcriber,
    /// 测试计划生成能力（分页）
    PlanGenerator,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Transcriber => write!(f, "transcriber"),
            Capability::PlanGenerator => write!(f, "planGenerator"),
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", .path.display())]
    TomlParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// 迭代次数非法
    #[error("迭代次数必须大于 0, 实际为 {0}")]
    InvalidIterations(usize),
}

/// 测试计划错误
#[derive(Debug, Error)]
pub enum PlanError {
    /// 读取测试计划失败
    #[error("读取测试计划失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// JSON 解析失败
    #[error("测试计划JSON解析失败 ({}): {source}", .path.display())]
    ParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// 缺少 args，无法分页
    #[error("测试计划缺少 args，无法生成下一页")]
    MissingArgs,
}

/// 结果写入错误
#[derive(Debug, Error)]
pub enum WriterError {
    /// 结果对象结构不合法（为空或缺少 items）
    #[error("结果对象结构不合法: {0}")]
    InvalidStructure(String),
    /// 同名文件已存在（同一秒内重复写入）
    #[error("结果文件已存在: {}", .0.display())]
    AlreadyExists(PathBuf),
    /// 创建目录失败
    #[error("创建目录失败 ({}): {source}", .path.display())]
    CreateDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({}): {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("序列化结果失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 测试计划生成错误
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        source: reqwest::Error,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, body={body}")]
    BadResponse {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 响应解析失败
    #[error("测试计划解析失败 ({endpoint}): {source}")]
    ParseFailed {
        endpoint: String,
        source: serde_json::Error,
    },
    /// 其他错误（测试桩等）
    #[error("{0}")]
    Other(String),
}

/// 单个视频处理阶段的可恢复错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StageError {
    /// 资源不可用（视频无法解析、下载失败、无对应语言字幕）
    #[error("{0}")]
    Unavailable(String),
    /// 超时
    #[error("{0}")]
    Timeout(String),
    /// 其他失败
    #[error("{0}")]
    Failed(String),
}

impl StageError {
    /// 写入结果文件时使用的错误类别前缀
    pub fn kind_label(&self) -> &'static str {
        match self {
            StageError::Unavailable(_) => "ValueError",
            StageError::Timeout(_) => "TimeoutError",
            StageError::Failed(_) => "RuntimeError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            StageError::Unavailable(msg) | StageError::Timeout(msg) | StageError::Failed(msg) => {
                msg
            }
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<std::io::Error> for StageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => StageError::Timeout(err.to_string()),
            std::io::ErrorKind::NotFound => StageError::Unavailable(err.to_string()),
            _ => StageError::Failed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for StageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StageError::Timeout(err.to_string())
        } else {
            StageError::Failed(err.to_string())
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 单阶段结果类型
pub type StageResult<T> = Result<T, StageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_capability_message() {
        let err = AppError::MissingCapability(Capability::Transcriber);
        assert!(err.to_string().contains("MissingCapability: transcriber"));

        let err = AppError::MissingCapability(Capability::PlanGenerator);
        assert!(err.to_string().contains("MissingCapability: planGenerator"));
    }

    #[test]
    fn test_stage_error_kind_label() {
        assert_eq!(StageError::Unavailable("x".into()).kind_label(), "ValueError");
        assert_eq!(StageError::Timeout("x".into()).kind_label(), "TimeoutError");
        assert_eq!(StageError::Failed("x".into()).kind_label(), "RuntimeError");
    }

    #[test]
    fn test_io_error_classification() {
        let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        assert!(matches!(StageError::from(timeout), StageError::Timeout(_)));

        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(StageError::from(missing), StageError::Unavailable(_)));
    }
}
