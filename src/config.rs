use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 持有测试计划生成凭据的环境变量
pub const GOOGLE_API_ENV: &str = "GoogleAPI";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 参考字幕与转写使用的语言
    pub language: String,
    /// 结果文件输出目录
    pub output_dir: PathBuf,
    /// 结果文件名前缀
    pub result_component: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// yt-dlp 可执行文件
    pub yt_dlp_binary: String,
    // --- 转写 API 配置 ---
    pub transcriber_api_base_url: String,
    pub transcriber_api_key: String,
    pub transcriber_model: String,
    pub transcriber_timeout_secs: u64,
    // --- 测试计划生成配置 ---
    pub plan_generator_url: String,
    pub plan_generator_timeout_secs: u64,
    /// 测试计划生成凭据，只从环境变量读取
    #[serde(skip)]
    pub google_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            output_dir: PathBuf::from("output"),
            result_component: "YouTubeTestRunner".to_string(),
            verbose_logging: false,
            yt_dlp_binary: "yt-dlp".to_string(),
            transcriber_api_base_url: "http://127.0.0.1:8000/v1".to_string(),
            transcriber_api_key: String::new(),
            transcriber_model: "whisper-1".to_string(),
            transcriber_timeout_secs: 600,
            plan_generator_url: "http://127.0.0.1:8001/testplan".to_string(),
            plan_generator_timeout_secs: 30,
            google_api_key: None,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_toml_file(path)?.with_overrides(env_var),
            None => Self::from_env(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(env_var)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 用 `lookup` 提供的变量覆盖当前配置
    pub fn with_overrides<F>(self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            language: lookup("EVAL_LANGUAGE").unwrap_or(self.language),
            output_dir: lookup("OUTPUT_DIR").map(PathBuf::from).unwrap_or(self.output_dir),
            result_component: lookup("RESULT_COMPONENT").unwrap_or(self.result_component),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
            yt_dlp_binary: lookup("YT_DLP_BINARY").unwrap_or(self.yt_dlp_binary),
            transcriber_api_base_url: lookup("TRANSCRIBER_API_BASE_URL")
                .unwrap_or(self.transcriber_api_base_url),
            transcriber_api_key: lookup("TRANSCRIBER_API_KEY").unwrap_or(self.transcriber_api_key),
            transcriber_model: lookup("TRANSCRIBER_MODEL").unwrap_or(self.transcriber_model),
            transcriber_timeout_secs: parse_var(&lookup, "TRANSCRIBER_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.transcriber_timeout_secs),
            plan_generator_url: lookup("PLAN_GENERATOR_URL").unwrap_or(self.plan_generator_url),
            plan_generator_timeout_secs: parse_var(&lookup, "PLAN_GENERATOR_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.plan_generator_timeout_secs),
            google_api_key: lookup(GOOGLE_API_ENV)
                .filter(|v| !v.is_empty())
                .or(self.google_api_key),
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_var<F, T>(lookup: &F, var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

/// 下一页 token 缺失但仍有剩余迭代时的处理方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingTokenPolicy {
    /// 提前结束运行
    #[default]
    Stop,
    /// 以 null token 调用生成器（从第一页重新开始）
    Restart,
}

/// 单次运行的配置，运行开始后不可变
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// 要处理的测试计划页数
    pub iterations: usize,
    /// 是否在结果中保存原始转写文本
    pub save_transcripts: bool,
    /// 音频下载目录
    pub audio_dir: PathBuf,
    /// 转写后是否保留音频
    pub keep_audio: bool,
    pub missing_token_policy: MissingTokenPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: 1,
            save_transcripts: false,
            audio_dir: PathBuf::from("./cache/audio"),
            keep_audio: false,
            missing_token_policy: MissingTokenPolicy::Stop,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::InvalidIterations(self.iterations));
        }
        Ok(())
    }
}
