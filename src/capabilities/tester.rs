//! 转写测试能力
//!
//! `Tester` 是编排层看到的唯一接口：转写、比较、整体后处理。
//! `TranscriptTester` 把转写器、规范化器、比较器组合成一个 `Tester`。

use crate::error::{StageError, StageResult};
use crate::models::TestPlan;
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::path::Path;
use std::sync::Arc;

/// 语音转写能力
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// 转写本地音频文件
    async fn transcribe(&self, audio_path: &Path, language: &str) -> StageResult<String>;

    /// 模型名称，写入计划统计
    fn model_name(&self) -> &str;
}

/// 文本规范化能力（可选）
pub trait Normalizer: Send + Sync {
    fn normalize(&self, text: &str) -> String;
}

/// 转写结果比较能力
pub trait Comparer: Send + Sync {
    /// 比较模型转写与参考字幕，返回的结果对编排层不透明
    fn compare(&self, model_transcript: &str, target_transcript: &str) -> JsonValue;
}

/// 编排层使用的测试能力集合
#[async_trait]
pub trait Tester: Send + Sync {
    /// 参考字幕语言
    fn language(&self) -> &str;

    fn has_transcriber(&self) -> bool;

    fn has_normalizer(&self) -> bool;

    async fn transcribe(&self, audio_path: &Path) -> StageResult<String>;

    fn compare(&self, model_transcript: &str, target_transcript: &str) -> JsonValue;

    /// 整个测试计划处理完成后调用，可以写入计划级别的统计字段
    fn postprocess(&self, _plan: &mut TestPlan) {}
}

/// 组合式测试器
pub struct TranscriptTester {
    language: String,
    transcriber: Option<Arc<dyn Transcriber>>,
    normalizer: Option<Arc<dyn Normalizer>>,
    comparer: Arc<dyn Comparer>,
}

impl TranscriptTester {
    pub fn new(language: impl Into<String>, comparer: Arc<dyn Comparer>) -> Self {
        Self {
            language: language.into(),
            transcriber: None,
            normalizer: None,
            comparer,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    fn normalized(&self, text: &str) -> String {
        match &self.normalizer {
            Some(normalizer) => normalizer.normalize(text),
            None => text.to_string(),
        }
    }
}

#[async_trait]
impl Tester for TranscriptTester {
    fn language(&self) -> &str {
        &self.language
    }

    fn has_transcriber(&self) -> bool {
        self.transcriber.is_some()
    }

    fn has_normalizer(&self) -> bool {
        self.normalizer.is_some()
    }

    async fn transcribe(&self, audio_path: &Path) -> StageResult<String> {
        let transcriber = self
            .transcriber
            .as_ref()
            .ok_or_else(|| StageError::Failed("Transcriber is None".to_string()))?;
        transcriber.transcribe(audio_path, &self.language).await
    }

    fn compare(&self, model_transcript: &str, target_transcript: &str) -> JsonValue {
        let model = self.normalized(model_transcript);
        let target = self.normalized(target_transcript);
        self.comparer.compare(&model, &target)
    }

    fn postprocess(&self, plan: &mut TestPlan) {
        let mut summary = summarize(plan);
        if let (Some(transcriber), Some(fields)) = (&self.transcriber, summary.as_object_mut()) {
            fields.insert("model".to_string(), json!(transcriber.model_name()));
        }
        plan.extra.insert("summary".to_string(), summary);
    }
}

/// 计划级统计：总数、成功、失败、平均 WER
pub fn summarize(plan: &TestPlan) -> JsonValue {
    let total = plan.items.len();
    let failed = plan.items.iter().filter(|item| item.error.is_some()).count();

    let wers: Vec<f64> = plan
        .items
        .iter()
        .filter_map(|item| item.results.as_ref())
        .filter_map(|results| results.get("wer").and_then(|v| v.as_f64()))
        .collect();
    let compared = plan.items.iter().filter(|item| item.results.is_some()).count();

    let mean_wer = if wers.is_empty() {
        JsonValue::Null
    } else {
        json!(wers.iter().sum::<f64>() / wers.len() as f64)
    };

    json!({
        "total": total,
        "compared": compared,
        "failed": failed,
        "meanWer": mean_wer,
    })
}
