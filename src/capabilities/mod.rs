//! 能力层（Capabilities）
//!
//! 编排层只依赖这里的 trait，不认识具体实现：
//! - `Tester`：转写、比较、整体后处理
//! - `VideoSource`：解析视频、下载音频、获取参考字幕
//! - `PlanGenerator`：按分页 token 生成下一份测试计划
//!
//! 具体实现见 `services`，测试桩见 `stub`。

pub mod plan_generator;
pub mod stub;
pub mod tester;
pub mod video_source;

pub use plan_generator::PlanGenerator;
pub use tester::{Comparer, Normalizer, Tester, Transcriber, TranscriptTester};
pub use video_source::{MediaHandle, VideoSource};
