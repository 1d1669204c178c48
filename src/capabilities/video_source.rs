use crate::error::StageResult;
use crate::models::VideoRecord;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// 已解析的视频句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHandle {
    pub video_id: String,
    pub url: String,
}

/// 视频来源能力：解析视频、下载音频、获取参考字幕
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// 把视频记录解析成可播放的句柄，同一记录结果必须一致
    fn resolve(&self, record: &VideoRecord) -> StageResult<MediaHandle>;

    /// 下载音频到 `audio_dir`，返回本地路径
    async fn fetch_media(&self, handle: &MediaHandle, audio_dir: &Path) -> StageResult<PathBuf>;

    /// 获取指定语言的参考字幕文本
    async fn fetch_reference_transcript(
        &self,
        handle: &MediaHandle,
        language: &str,
    ) -> StageResult<String>;
}
