//! 测试桩
//!
//! 不依赖网络和外部程序的能力实现，可以按视频ID预设失败，并记录调用顺序。

use crate::capabilities::{MediaHandle, PlanGenerator, Tester, VideoSource};
use crate::error::{GeneratorError, StageError, StageResult};
use crate::models::{TestPlan, VideoRecord};
use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// 测试器桩
pub struct StubTester {
    language: String,
    has_transcriber: bool,
    has_normalizer: bool,
    transcript: String,
    failures: HashMap<String, StageError>,
    transcribed: Mutex<Vec<PathBuf>>,
    compared: Mutex<Vec<(String, String)>>,
    postprocessed: Mutex<usize>,
}

impl StubTester {
    pub fn new() -> Self {
        Self {
            language: "en".to_string(),
            has_transcriber: true,
            has_normalizer: true,
            transcript: "model transcript".to_string(),
            failures: HashMap::new(),
            transcribed: Mutex::new(Vec::new()),
            compared: Mutex::new(Vec::new()),
            postprocessed: Mutex::new(0),
        }
    }

    pub fn without_transcriber(mut self) -> Self {
        self.has_transcriber = false;
        self
    }

    pub fn without_normalizer(mut self) -> Self {
        self.has_normalizer = false;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = transcript.into();
        self
    }

    /// 转写 `<video_id>.*` 时返回指定错误
    pub fn fail_transcription(mut self, video_id: impl Into<String>, error: StageError) -> Self {
        self.failures.insert(video_id.into(), error);
        self
    }

    pub fn transcribed(&self) -> Vec<PathBuf> {
        lock(&self.transcribed).clone()
    }

    pub fn compared(&self) -> Vec<(String, String)> {
        lock(&self.compared).clone()
    }

    pub fn postprocess_count(&self) -> usize {
        *lock(&self.postprocessed)
    }
}

impl Default for StubTester {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tester for StubTester {
    fn language(&self) -> &str {
        &self.language
    }

    fn has_transcriber(&self) -> bool {
        self.has_transcriber
    }

    fn has_normalizer(&self) -> bool {
        self.has_normalizer
    }

    async fn transcribe(&self, audio_path: &Path) -> StageResult<String> {
        lock(&self.transcribed).push(audio_path.to_path_buf());

        let stem = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        match self.failures.get(&stem) {
            Some(error) => Err(error.clone()),
            None => Ok(self.transcript.clone()),
        }
    }

    fn compare(&self, model_transcript: &str, target_transcript: &str) -> JsonValue {
        lock(&self.compared).push((model_transcript.to_string(), target_transcript.to_string()));
        json!({
            "equal": model_transcript == target_transcript,
            "wer": if model_transcript == target_transcript { 0.0 } else { 1.0 },
        })
    }

    fn postprocess(&self, plan: &mut TestPlan) {
        *lock(&self.postprocessed) += 1;
        plan.extra.insert("postprocessed".to_string(), JsonValue::Bool(true));
    }
}

/// 视频来源桩
pub struct StubVideoSource {
    reference: String,
    resolve_failures: HashMap<String, StageError>,
    media_failures: HashMap<String, StageError>,
    reference_failures: HashMap<String, StageError>,
    calls: Mutex<Vec<String>>,
}

impl StubVideoSource {
    pub fn new() -> Self {
        Self {
            reference: "reference transcript".to_string(),
            resolve_failures: HashMap::new(),
            media_failures: HashMap::new(),
            reference_failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn fail_resolve(mut self, video_id: impl Into<String>, error: StageError) -> Self {
        self.resolve_failures.insert(video_id.into(), error);
        self
    }

    pub fn fail_media(mut self, video_id: impl Into<String>, error: StageError) -> Self {
        self.media_failures.insert(video_id.into(), error);
        self
    }

    pub fn fail_reference(mut self, video_id: impl Into<String>, error: StageError) -> Self {
        self.reference_failures.insert(video_id.into(), error);
        self
    }

    /// 调用记录，形如 `resolve:<id>`、`media:<id>`、`reference:<id>:<lang>`
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

impl Default for StubVideoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoSource for StubVideoSource {
    fn resolve(&self, record: &VideoRecord) -> StageResult<MediaHandle> {
        let video_id = record
            .video_id()
            .ok_or_else(|| StageError::Unavailable("videoId is missing".to_string()))?;
        lock(&self.calls).push(format!("resolve:{}", video_id));

        if let Some(error) = self.resolve_failures.get(video_id) {
            return Err(error.clone());
        }
        Ok(MediaHandle {
            video_id: video_id.to_string(),
            url: format!("stub://{}", video_id),
        })
    }

    async fn fetch_media(&self, handle: &MediaHandle, audio_dir: &Path) -> StageResult<PathBuf> {
        lock(&self.calls).push(format!("media:{}", handle.video_id));

        if let Some(error) = self.media_failures.get(&handle.video_id) {
            return Err(error.clone());
        }
        std::fs::create_dir_all(audio_dir)?;
        let path = audio_dir.join(format!("{}.mp3", handle.video_id));
        std::fs::write(&path, b"ID3")?;
        Ok(path)
    }

    async fn fetch_reference_transcript(
        &self,
        handle: &MediaHandle,
        language: &str,
    ) -> StageResult<String> {
        lock(&self.calls).push(format!("reference:{}:{}", handle.video_id, language));

        match self.reference_failures.get(&handle.video_id) {
            Some(error) => Err(error.clone()),
            None => Ok(self.reference.clone()),
        }
    }
}

/// 测试计划生成器桩：按顺序返回预设的计划
pub struct StubPlanGenerator {
    plans: Mutex<VecDeque<TestPlan>>,
    requests: Mutex<Vec<Map<String, JsonValue>>>,
}

impl StubPlanGenerator {
    pub fn new(plans: Vec<TestPlan>) -> Self {
        Self {
            plans: Mutex::new(plans.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 收到的所有请求参数
    pub fn requests(&self) -> Vec<Map<String, JsonValue>> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl PlanGenerator for StubPlanGenerator {
    async fn generate(&self, args: &Map<String, JsonValue>) -> Result<TestPlan, GeneratorError> {
        lock(&self.requests).push(args.clone());
        lock(&self.plans)
            .pop_front()
            .ok_or_else(|| GeneratorError::Other("没有更多预设的测试计划".to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_generator_replays_in_order() {
        let generator = StubPlanGenerator::new(vec![
            TestPlan::new(Map::new(), vec![VideoRecord::new("a")]),
            TestPlan::new(Map::new(), vec![VideoRecord::new("b")]),
        ]);
        let mut args = Map::new();
        args.insert("pageToken".into(), json!("tok"));

        let first = tokio_test::block_on(generator.generate(&args)).unwrap();
        let second = tokio_test::block_on(generator.generate(&Map::new())).unwrap();
        assert_eq!(first.items[0].video_id(), Some("a"));
        assert_eq!(second.items[0].video_id(), Some("b"));
        assert!(tokio_test::block_on(generator.generate(&Map::new())).is_err());
        assert_eq!(generator.requests().len(), 3);
        assert_eq!(generator.requests()[0]["pageToken"], json!("tok"));
    }

    #[test]
    fn test_video_source_records_calls() {
        let dir = tempfile::tempdir().unwrap();
        let source = StubVideoSource::new()
            .fail_reference("b", StageError::Unavailable("no subtitles".into()));

        let handle = source.resolve(&VideoRecord::new("b")).unwrap();
        let audio = tokio_test::block_on(source.fetch_media(&handle, dir.path())).unwrap();
        assert!(audio.exists());
        assert!(tokio_test::block_on(source.fetch_reference_transcript(&handle, "en")).is_err());
        assert_eq!(source.calls(), ["resolve:b", "media:b", "reference:b:en"]);
    }
}
