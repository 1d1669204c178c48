//! 命令行参数
//!
//! 只负责把命令行解析成 `RunConfig`，配置文件和环境变量见 `config`

use crate::config::{MissingTokenPolicy, RunConfig};
use clap::Parser;
use std::path::PathBuf;

/// YouTube 转写评测
#[derive(Parser, Debug)]
#[command(
    name = "youtube_transcript_eval",
    version,
    about = "Evaluate a transcription model against YouTube reference transcripts"
)]
pub struct Cli {
    /// 测试计划 JSON 文件
    #[arg(value_name = "TESTPLAN_PATH")]
    pub testplan_path: PathBuf,

    /// 在结果中保存模型转写和参考字幕原文
    #[arg(short = 's', long = "save-transcript")]
    pub save_transcripts: bool,

    /// 音频下载目录
    #[arg(short = 'a', long = "audio-path", value_name = "DIR", default_value = "./cache/audio")]
    pub audio_dir: PathBuf,

    /// 要处理的测试计划页数
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    pub iterations: usize,

    /// 转写后保留下载的音频
    #[arg(long)]
    pub keep_audio: bool,

    /// nextPageToken 缺失时从第一页重新生成，而不是提前结束
    #[arg(long)]
    pub restart_on_missing_token: bool,

    /// TOML 配置文件
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 结果输出目录（覆盖配置）
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl Cli {
    /// 转换为本次运行的配置
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            iterations: self.iterations,
            save_transcripts: self.save_transcripts,
            audio_dir: self.audio_dir.clone(),
            keep_audio: self.keep_audio,
            missing_token_policy: if self.restart_on_missing_token {
                MissingTokenPolicy::Restart
            } else {
                MissingTokenPolicy::Stop
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["youtube_transcript_eval", "plan.json"]);
        let run = cli.run_config();
        assert_eq!(cli.testplan_path, PathBuf::from("plan.json"));
        assert_eq!(run.iterations, 1);
        assert!(!run.save_transcripts);
        assert_eq!(run.audio_dir, PathBuf::from("./cache/audio"));
        assert_eq!(run.missing_token_policy, MissingTokenPolicy::Stop);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::parse_from([
            "youtube_transcript_eval",
            "plan.json",
            "-s",
            "-a",
            "/tmp/audio",
            "-i",
            "3",
            "--keep-audio",
            "--restart-on-missing-token",
            "-o",
            "results",
        ]);
        let run = cli.run_config();
        assert!(run.save_transcripts);
        assert_eq!(run.audio_dir, PathBuf::from("/tmp/audio"));
        assert_eq!(run.iterations, 3);
        assert!(run.keep_audio);
        assert_eq!(run.missing_token_policy, MissingTokenPolicy::Restart);
        assert_eq!(cli.output_dir, Some(PathBuf::from("results")));
    }

    #[test]
    fn test_plan_path_is_required() {
        assert!(Cli::try_parse_from(["youtube_transcript_eval"]).is_err());
    }
}
