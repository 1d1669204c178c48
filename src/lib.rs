//! # YouTube Transcript Eval
//!
//! 用 YouTube 人工字幕评测语音转写模型的 Rust 工具
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有共享资源（HTTP client），只暴露能力
//! - `HttpExecutor` - 唯一的 client owner，提供 JSON / multipart POST 能力
//!
//! ### ② 能力层（Capabilities）
//! - `capabilities/` - 编排层依赖的 trait：`Tester` / `VideoSource` / `PlanGenerator`
//! - `TranscriptTester` - 转写 + 规范化 + 比较的组合
//! - `stub` - 测试桩
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 具体实现，只处理单个视频或单个文件
//! - `YtDlpVideoSource` - 下载音频和字幕
//! - `HttpTranscriber` - 调用转写 API
//! - `BasicNormalizer` / `WordErrorComparer` - 文本规范化和 WER
//! - `HttpPlanGenerator` - 请求下一页测试计划
//! - `ResultWriter` - 写结果文件
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一个视频"的完整处理流程
//! - `VideoCtx` - 上下文封装（迭代 + 视频索引）
//! - `VideoFlow` - 流程编排（download → transcribe → reference → compare）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/evaluation_runner` - 多页运行：前置检查、持久化、分页
//! - `orchestrator/plan_processor` - 单页处理：遍历视频、写回结果、后处理
//!
//! ## 模块结构

pub mod app;
pub mod capabilities;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::{Config, MissingTokenPolicy, RunConfig};
pub use error::{AppError, AppResult, StageError};
pub use infrastructure::HttpExecutor;
pub use models::{load_test_plan, TestPlan, VideoRecord};
pub use orchestrator::{EvaluationRunner, RunSummary};
pub use services::ResultWriter;
pub use workflow::{ItemOutcome, VideoCtx, VideoFlow};
