//! YouTube 视频来源 - 业务能力层
//!
//! 通过外部 `yt-dlp` 程序下载音频和字幕，不关心流程

use crate::capabilities::{MediaHandle, VideoSource};
use crate::error::{StageError, StageResult};
use crate::models::VideoRecord;
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// yt-dlp 视频来源
///
/// 职责：
/// - 校验 videoId 并生成观看地址
/// - 下载音频到 `<audio_dir>/<videoId>.mp3`，已存在则直接复用
/// - 下载指定语言的人工字幕并转成纯文本
pub struct YtDlpVideoSource {
    binary: String,
    subtitle_dir: PathBuf,
    tag_re: Regex,
}

impl YtDlpVideoSource {
    /// 创建新的视频来源
    ///
    /// # 参数
    /// - `binary`: yt-dlp 可执行文件
    /// - `subtitle_dir`: 字幕临时目录
    pub fn new(
        binary: impl Into<String>,
        subtitle_dir: impl Into<PathBuf>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            binary: binary.into(),
            subtitle_dir: subtitle_dir.into(),
            tag_re: Regex::new(r"<[^>]*>")?,
        })
    }

    /// 运行 yt-dlp，非零退出码视为资源不可用
    async fn run(&self, args: &[&str]) -> StageResult<()> {
        debug!("{} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| StageError::Failed(format!("无法启动 {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StageError::Unavailable(last_line(&stderr)));
        }
        Ok(())
    }

    /// WebVTT 转纯文本
    ///
    /// 跳过文件头、`NOTE`/`STYLE`/`REGION` 块、时间行和紧邻时间行之前的 cue 标识
    pub fn vtt_to_text(&self, vtt: &str) -> String {
        let raw_lines: Vec<&str> = vtt.lines().map(str::trim).collect();
        let mut lines: Vec<String> = Vec::new();
        let mut in_block = false;

        for (index, &line) in raw_lines.iter().enumerate() {
            if line.is_empty() {
                in_block = false;
                continue;
            }
            if in_block || is_header_block(line) {
                in_block = true;
                continue;
            }
            if line.starts_with("WEBVTT")
                || line.starts_with("Kind:")
                || line.starts_with("Language:")
                || line.contains("-->")
                || is_cue_identifier(&raw_lines, index)
            {
                continue;
            }

            let text = decode_entities(self.tag_re.replace_all(line, "").trim());
            if text.is_empty() || lines.last() == Some(&text) {
                continue;
            }
            lines.push(text);
        }

        lines.join(" ")
    }
}

/// `NOTE`、`STYLE`、`REGION` 块一直持续到下一个空行
fn is_header_block(line: &str) -> bool {
    ["NOTE", "STYLE", "REGION"].iter().any(|keyword| {
        line.strip_prefix(keyword)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}

/// cue 标识只出现在时间行的前一行
fn is_cue_identifier(lines: &[&str], index: usize) -> bool {
    lines
        .get(index + 1)
        .is_some_and(|next| next.contains("-->"))
}

#[async_trait]
impl VideoSource for YtDlpVideoSource {
    fn resolve(&self, record: &VideoRecord) -> StageResult<MediaHandle> {
        let video_id = record
            .video_id()
            .ok_or_else(|| StageError::Unavailable("videoId is missing".to_string()))?;
        if !is_valid_video_id(video_id) {
            return Err(StageError::Unavailable(format!(
                "invalid videoId: {:?}",
                video_id
            )));
        }

        Ok(MediaHandle {
            video_id: video_id.to_string(),
            url: format!("{}{}", WATCH_URL, video_id),
        })
    }

    async fn fetch_media(&self, handle: &MediaHandle, audio_dir: &Path) -> StageResult<PathBuf> {
        let target = audio_dir.join(format!("{}.mp3", handle.video_id));
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            info!("♻️ 复用已下载音频 - {}", target.display());
            return Ok(target);
        }

        tokio::fs::create_dir_all(audio_dir).await?;
        let template = audio_dir.join(format!("{}.%(ext)s", handle.video_id));
        let template = template.to_string_lossy().into_owned();
        self.run(&[
            "-x",
            "--audio-format",
            "mp3",
            "--no-playlist",
            "-o",
            template.as_str(),
            handle.url.as_str(),
        ])
        .await?;

        if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return Err(StageError::Unavailable(format!(
                "yt-dlp 未生成音频文件: {}",
                target.display()
            )));
        }
        Ok(target)
    }

    async fn fetch_reference_transcript(
        &self,
        handle: &MediaHandle,
        language: &str,
    ) -> StageResult<String> {
        tokio::fs::create_dir_all(&self.subtitle_dir).await?;
        let template = self.subtitle_dir.join(format!("{}.%(ext)s", handle.video_id));
        let template = template.to_string_lossy().into_owned();
        self.run(&[
            "--write-subs",
            "--sub-langs",
            language,
            "--sub-format",
            "vtt",
            "--skip-download",
            "-o",
            template.as_str(),
            handle.url.as_str(),
        ])
        .await?;

        let vtt_path = self
            .subtitle_dir
            .join(format!("{}.{}.vtt", handle.video_id, language));
        let vtt = match tokio::fs::read_to_string(&vtt_path).await {
            Ok(vtt) => vtt,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StageError::Unavailable(format!(
                    "no manually created transcript for language '{}'",
                    language
                )));
            }
            Err(e) => return Err(e.into()),
        };
        if let Err(e) = tokio::fs::remove_file(&vtt_path).await {
            warn!("⚠️ 无法删除字幕文件 {}: {}", vtt_path.display(), e);
        }

        let text = self.vtt_to_text(&vtt);
        if text.is_empty() {
            return Err(StageError::Unavailable(format!(
                "transcript for language '{}' is empty",
                language
            )));
        }
        Ok(text)
    }
}

/// YouTube 视频ID：11 位 URL 安全字符
fn is_valid_video_id(video_id: &str) -> bool {
    video_id.len() == 11
        && video_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn last_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("yt-dlp failed")
        .trim()
        .to_string()
}
