//! 转写服务 - 业务能力层
//!
//! 只负责"调用转写 API"能力，不关心流程
//!
//! ## 技术栈
//! - 兼容 OpenAI `/audio/transcriptions` 接口的服务（whisper.cpp server、faster-whisper server 等）
//! - multipart 上传音频文件

use crate::capabilities::Transcriber;
use crate::config::Config;
use crate::error::{StageError, StageResult};
use crate::infrastructure::HttpExecutor;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// 转写 API 返回格式
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// HTTP 转写服务
///
/// 职责：
/// - 上传单个音频文件并返回转写文本
/// - 请求超时归类为 `StageError::Timeout`
/// - 不出现 TestPlan
pub struct HttpTranscriber {
    executor: HttpExecutor,
    api_base_url: String,
    api_key: String,
    model_name: String,
}

impl HttpTranscriber {
    /// 创建新的转写服务
    pub fn new(executor: HttpExecutor, config: &Config) -> Self {
        Self {
            executor,
            api_base_url: config.transcriber_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.transcriber_api_key.clone(),
            model_name: config.transcriber_model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.api_base_url)
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio_path: &Path, language: &str) -> StageResult<String> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.mp3".to_string());
        debug!("上传音频 {} ({} 字节)", file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/mpeg")
            .map_err(|e| StageError::Failed(e.to_string()))?;
        let form = Form::new()
            .text("model", self.model_name.clone())
            .text("language", language.to_string())
            .text("response_format", "json")
            .part("file", part);

        let response = self
            .executor
            .post_multipart(&self.endpoint(), form, &self.api_key)
            .await?;

        match response.status {
            408 | 504 => {
                return Err(StageError::Timeout(format!(
                    "转写服务超时 (status={})",
                    response.status
                )))
            }
            _ if !response.is_success() => {
                return Err(StageError::Failed(format!(
                    "转写服务返回错误 (status={}): {}",
                    response.status, response.body
                )))
            }
            _ => {}
        }

        parse_transcription(&response.body)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

fn parse_transcription(body: &str) -> StageResult<String> {
    let parsed: TranscriptionResponse = serde_json::from_str(body)
        .map_err(|e| StageError::Failed(format!("无法解析转写结果: {}", e)))?;
    Ok(parsed.text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_transcription() {
        let body = r#"{"text": " Hello there. ", "language": "en"}"#;
        let text = parse_transcription(body).unwrap();
        assert_eq!(text, "Hello there.");

        let err = parse_transcription("<html>").unwrap_err();
        assert!(matches!(err, StageError::Failed(_)));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = Config {
            transcriber_api_base_url: "http://localhost:8000/v1/".to_string(),
            ..Config::default()
        };
        let executor = HttpExecutor::new(Duration::from_secs(1)).unwrap();
        let transcriber = HttpTranscriber::new(executor, &config);
        assert_eq!(
            transcriber.endpoint(),
            "http://localhost:8000/v1/audio/transcriptions"
        );
        assert_eq!(transcriber.model_name(), "whisper-1");
    }

    #[tokio::test]
    async fn test_missing_audio_is_unavailable() {
        let executor = HttpExecutor::new(Duration::from_secs(1)).unwrap();
        let transcriber = HttpTranscriber::new(executor, &Config::default());
        let dir = tempfile::tempdir().unwrap();

        let err = transcriber
            .transcribe(&dir.path().join("missing.mp3"), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Unavailable(_)));
    }
}
