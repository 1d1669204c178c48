//! 视频处理流程 - 流程层
//!
//! 核心职责：定义"一个视频"的完整处理流程
//!
//! 流程顺序（任何一步失败都只记录在该视频上，后续步骤跳过）：
//! 1. 解析视频 + 下载音频 → `download`
//! 2. 模型转写 → `model transcript`
//! 3. 获取参考字幕 → `youtube transcript`
//! 4. 比较
//! 5. 保存原始转写（可选）

use serde_json::Value as JsonValue;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::capabilities::{Tester, VideoSource};
use crate::config::RunConfig;
use crate::error::StageError;
use crate::models::VideoRecord;
use crate::utils::logging::truncate_text;
use crate::workflow::video_ctx::VideoCtx;

/// 可能失败的处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStage {
    /// 解析视频、下载音频
    Download,
    /// 模型转写
    ModelTranscript,
    /// 获取参考字幕
    ReferenceTranscript,
}

impl fmt::Display for ItemStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStage::Download => write!(f, "download"),
            ItemStage::ModelTranscript => write!(f, "model transcript"),
            ItemStage::ReferenceTranscript => write!(f, "youtube transcript"),
        }
    }
}

/// 单个视频的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// 某个阶段失败，后续阶段未执行
    Failed { stage: ItemStage, error: StageError },
    /// 完成比较
    Compared {
        results: JsonValue,
        /// (模型转写, 参考字幕)，仅在保存转写时存在
        transcripts: Option<(String, String)>,
    },
}

impl ItemOutcome {
    fn failed(stage: ItemStage, error: StageError) -> Self {
        ItemOutcome::Failed { stage, error }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed { .. })
    }

    /// 写入结果文件的错误字符串：`<Kind> (<stage>): <message>`
    pub fn error_message(&self) -> Option<String> {
        match self {
            ItemOutcome::Failed { stage, error } => Some(format!(
                "{} ({}): {}",
                error.kind_label(),
                stage,
                error.message()
            )),
            ItemOutcome::Compared { .. } => None,
        }
    }

    /// 把结果写到视频记录上，`error` 与 `results` 互斥
    pub fn apply_to(self, record: &mut VideoRecord) {
        record.clear_outcome();
        let error = self.error_message();
        match self {
            ItemOutcome::Failed { .. } => {
                record.error = error;
            }
            ItemOutcome::Compared {
                results,
                transcripts,
            } => {
                record.results = Some(results);
                if let Some((model, target)) = transcripts {
                    record.model_transcript = Some(model);
                    record.target_transcript = Some(target);
                }
            }
        }
    }
}

/// 视频处理流程
///
/// - 编排单个视频的完整处理流程
/// - 只依赖能力接口（capabilities），不持有网络资源
/// - 不修改视频记录，只返回 `ItemOutcome`
pub struct VideoFlow {
    tester: Arc<dyn Tester>,
    source: Arc<dyn VideoSource>,
    audio_dir: PathBuf,
    save_transcripts: bool,
    keep_audio: bool,
}

impl VideoFlow {
    /// 创建新的视频处理流程
    pub fn new(
        tester: Arc<dyn Tester>,
        source: Arc<dyn VideoSource>,
        run_config: &RunConfig,
    ) -> Self {
        Self {
            tester,
            source,
            audio_dir: run_config.audio_dir.clone(),
            save_transcripts: run_config.save_transcripts,
            keep_audio: run_config.keep_audio,
        }
    }

    pub async fn run(&self, record: &VideoRecord, ctx: &VideoCtx) -> ItemOutcome {
        if let Some(title) = record.title() {
            debug!("{} 标题: {}", ctx, truncate_text(title, 60));
        }

        let outcome = self.run_stages(record, ctx).await;
        if let Some(message) = outcome.error_message() {
            warn!("{} ⚠️ 跳过视频: {}", ctx, message);
        } else {
            info!("{} ✅ 比较完成", ctx);
        }
        outcome
    }

    async fn run_stages(&self, record: &VideoRecord, ctx: &VideoCtx) -> ItemOutcome {
        // ========== 1. 解析视频 + 下载音频 ==========
        let handle = match self.source.resolve(record) {
            Ok(handle) => handle,
            Err(e) => return ItemOutcome::failed(ItemStage::Download, e),
        };

        info!("{} ⬇️ 下载音频...", ctx);
        let audio_path = match self.source.fetch_media(&handle, &self.audio_dir).await {
            Ok(path) => path,
            Err(e) => return ItemOutcome::failed(ItemStage::Download, e),
        };

        // ========== 2. 模型转写 ==========
        info!("{} 🎙️ 模型转写...", ctx);
        let transcribed = self.tester.transcribe(&audio_path).await;
        if !self.keep_audio {
            remove_audio(&audio_path, ctx).await;
        }
        let model_transcript = match transcribed {
            Ok(text) => text,
            Err(e) => return ItemOutcome::failed(ItemStage::ModelTranscript, e),
        };
        debug!("{} 模型转写: {}", ctx, truncate_text(&model_transcript, 80));

        // ========== 3. 获取参考字幕 ==========
        info!("{} 📝 获取参考字幕 ({})...", ctx, self.tester.language());
        let target_transcript = match self
            .source
            .fetch_reference_transcript(&handle, self.tester.language())
            .await
        {
            Ok(text) => text,
            Err(e) => return ItemOutcome::failed(ItemStage::ReferenceTranscript, e),
        };
        debug!("{} 参考字幕: {}", ctx, truncate_text(&target_transcript, 80));

        // ========== 4. 比较 ==========
        let results = self.tester.compare(&model_transcript, &target_transcript);

        // ========== 5. 保存原始转写 ==========
        let transcripts = self
            .save_transcripts
            .then(|| (model_transcript, target_transcript));

        ItemOutcome::Compared {
            results,
            transcripts,
        }
    }
}

async fn remove_audio(path: &Path, ctx: &VideoCtx) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("{} 已删除音频 {}", ctx, path.display()),
        Err(e) => warn!("{} 删除音频失败 ({}): {}", ctx, path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::stub::{StubTester, StubVideoSource};
    use serde_json::json;

    fn run_config(dir: &Path) -> RunConfig {
        RunConfig {
            audio_dir: dir.join("audio"),
            ..RunConfig::default()
        }
    }

    fn ctx() -> VideoCtx {
        VideoCtx::new(1, 1, 1, 1, Some("abc"))
    }

    #[test]
    fn test_error_message_format() {
        let outcome = ItemOutcome::failed(
            ItemStage::Download,
            StageError::Unavailable("Video unavailable".into()),
        );
        assert_eq!(
            outcome.error_message().as_deref(),
            Some("ValueError (download): Video unavailable")
        );

        let outcome = ItemOutcome::failed(
            ItemStage::ModelTranscript,
            StageError::Timeout("600s".into()),
        );
        assert_eq!(
            outcome.error_message().as_deref(),
            Some("TimeoutError (model transcript): 600s")
        );
    }

    #[test]
    fn test_apply_replaces_previous_outcome() {
        let mut record = VideoRecord::new("abc");
        record.results = Some(json!({"wer": 0.1}));
        record.model_transcript = Some("old".into());

        ItemOutcome::failed(
            ItemStage::ReferenceTranscript,
            StageError::Unavailable("no en".into()),
        )
        .apply_to(&mut record);

        assert_eq!(
            record.error.as_deref(),
            Some("ValueError (youtube transcript): no en")
        );
        assert!(record.results.is_none());
        assert!(record.model_transcript.is_none());
    }

    #[tokio::test]
    async fn test_success_keeps_transcripts_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = run_config(dir.path());
        config.save_transcripts = true;

        let tester = Arc::new(StubTester::new().with_transcript("hello"));
        let source = Arc::new(StubVideoSource::new().with_reference("hello"));
        let flow = VideoFlow::new(tester, source, &config);

        let outcome = flow.run(&VideoRecord::new("abc"), &ctx()).await;
        assert_eq!(
            outcome,
            ItemOutcome::Compared {
                results: json!({"equal": true, "wer": 0.0}),
                transcripts: Some(("hello".into(), "hello".into())),
            }
        );
    }

    #[tokio::test]
    async fn test_audio_removed_after_transcription() {
        let dir = tempfile::tempdir().unwrap();
        let config = run_config(dir.path());
        let flow = VideoFlow::new(
            Arc::new(StubTester::new()),
            Arc::new(StubVideoSource::new()),
            &config,
        );

        flow.run(&VideoRecord::new("abc"), &ctx()).await;
        assert!(!config.audio_dir.join("abc.mp3").exists());
    }

    #[tokio::test]
    async fn test_audio_kept_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = run_config(dir.path());
        config.keep_audio = true;
        let flow = VideoFlow::new(
            Arc::new(StubTester::new()),
            Arc::new(StubVideoSource::new()),
            &config,
        );

        flow.run(&VideoRecord::new("abc"), &ctx()).await;
        assert!(config.audio_dir.join("abc.mp3").exists());
    }

    #[tokio::test]
    async fn test_transcription_failure_skips_reference() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(StubVideoSource::new());
        let tester = Arc::new(
            StubTester::new().fail_transcription("abc", StageError::Timeout("slow".into())),
        );
        let flow = VideoFlow::new(tester.clone(), source.clone(), &run_config(dir.path()));

        let outcome = flow.run(&VideoRecord::new("abc"), &ctx()).await;
        assert!(outcome.is_failed());
        assert_eq!(source.calls(), ["resolve:abc", "media:abc"]);
        assert!(tester.compared().is_empty());
    }
}
