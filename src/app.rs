//! 应用装配
//!
//! 唯一认识具体实现的地方：根据 `Config` 和 `RunConfig` 创建服务并注入运行器

use crate::capabilities::{Tester, TranscriptTester, VideoSource};
use crate::config::{Config, RunConfig};
use crate::infrastructure::HttpExecutor;
use crate::orchestrator::{EvaluationRunner, RunSummary};
use crate::services::{
    BasicNormalizer, HttpPlanGenerator, HttpTranscriber, ResultWriter, WordErrorComparer,
    YtDlpVideoSource,
};
use crate::utils::logging;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// 应用主结构
pub struct App {
    runner: EvaluationRunner,
}

impl App {
    /// 初始化应用
    ///
    /// # 参数
    /// - `config`: 程序配置（已合并环境变量）
    /// - `run_config`: 本次运行的配置
    pub fn initialize(config: Config, run_config: RunConfig) -> Result<Self> {
        debug!("配置: {:?}", redacted(&config));

        // 创建 HttpExecutor（持有 client）
        let executor = HttpExecutor::new(Duration::from_secs(config.transcriber_timeout_secs))
            .context("无法创建转写 HTTP 客户端")?;

        let normalizer = BasicNormalizer::new().context("无法编译规范化正则")?;
        let tester: Arc<dyn Tester> = Arc::new(
            TranscriptTester::new(&config.language, Arc::new(WordErrorComparer::new()))
                .with_transcriber(Arc::new(HttpTranscriber::new(executor, &config)))
                .with_normalizer(Arc::new(normalizer)),
        );

        let source: Arc<dyn VideoSource> = Arc::new(
            YtDlpVideoSource::new(&config.yt_dlp_binary, run_config.audio_dir.join("subtitles"))
                .context("无法编译字幕正则")?,
        );

        let writer = ResultWriter::new(&config.output_dir, &config.result_component);
        info!("💾 结果目录: {}", writer.output_dir().display());
        let mut runner = EvaluationRunner::new(run_config, tester, source, writer);

        // 只有凭据存在时才提供分页能力
        match plan_generator(&config)? {
            Some(generator) => {
                info!("🔑 已检测到测试计划生成凭据");
                debug!("测试计划请求超时: {:?}", generator.timeout());
                runner = runner.with_plan_generator(Arc::new(generator));
            }
            None => debug!("未设置测试计划生成凭据，只能单页运行"),
        }

        Ok(Self { runner })
    }

    /// 运行应用主逻辑
    pub async fn run(&self, plan_path: &Path) -> Result<RunSummary> {
        logging::log_startup(plan_path, self.runner.run_config().iterations);
        let summary = self.runner.run_from_path(plan_path).await?;
        Ok(summary)
    }
}

/// 测试计划生成器使用独立的 HttpExecutor，超时与转写分开
fn plan_generator(config: &Config) -> Result<Option<HttpPlanGenerator>> {
    let Some(api_key) = &config.google_api_key else {
        return Ok(None);
    };
    let executor = HttpExecutor::new(Duration::from_secs(config.plan_generator_timeout_secs))
        .context("无法创建测试计划 HTTP 客户端")?;
    Ok(Some(HttpPlanGenerator::new(
        executor,
        &config.plan_generator_url,
        api_key,
    )))
}

/// 日志中隐藏凭据
fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    if !config.transcriber_api_key.is_empty() {
        config.transcriber_api_key = "***".to_string();
    }
    if config.google_api_key.is_some() {
        config.google_api_key = Some("***".to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_hides_credentials() {
        let config = Config {
            transcriber_api_key: "sk-1".into(),
            google_api_key: Some("g-1".into()),
            ..Config::default()
        };
        let shown = format!("{:?}", redacted(&config));
        assert!(!shown.contains("sk-1"));
        assert!(!shown.contains("g-1"));
    }

    #[test]
    fn test_plan_generator_only_with_credential() {
        assert!(plan_generator(&Config::default()).unwrap().is_none());

        let config = Config {
            google_api_key: Some("g-1".into()),
            plan_generator_timeout_secs: 5,
            ..Config::default()
        };
        let generator = plan_generator(&config).unwrap().unwrap();
        assert_eq!(generator.timeout(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_multi_page_without_credential_fails_before_reading_plan() {
        let run_config = RunConfig {
            iterations: 2,
            ..RunConfig::default()
        };
        let app = App::initialize(Config::default(), run_config).unwrap();

        let err = app
            .run(Path::new("/nonexistent/testplan.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("MissingCapability: planGenerator"));
    }
}
