//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责多页测试计划的调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `evaluation_runner` - 评测运行器
//! - 前置检查（转写能力、分页能力）
//! - 多次迭代（每次一页测试计划）
//! - 每页写一个结果文件
//! - 用 `nextPageToken` 请求下一页
//! - 输出全局统计信息
//!
//! ### `plan_processor` - 单个测试计划处理器
//! - 按顺序遍历测试计划的所有视频（Vec<VideoRecord>）
//! - 复用同一个 VideoFlow
//! - 累积每个视频的结果并一次性写回
//! - 调用整体后处理
//!
//! ## 层次关系
//!
//! ```text
//! evaluation_runner (处理多页 TestPlan)
//!     ↓
//! plan_processor (处理 Vec<VideoRecord>)
//!     ↓
//! workflow::VideoFlow (处理单个 VideoRecord)
//!     ↓
//! capabilities (能力接口：Tester / VideoSource / PlanGenerator)
//!     ↓
//! services → infrastructure (具体实现：yt-dlp / HTTP)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：evaluation_runner 管多页，plan_processor 管单页
//! 2. **能力注入**：所有能力在构造时传入，不读取进程环境
//! 3. **向下依赖**：编排层 → workflow → capabilities
//! 4. **无业务逻辑**：只做调度和统计，不做具体转写或比较

pub mod evaluation_runner;
pub mod plan_processor;

// 重新导出主要类型
pub use evaluation_runner::{EvaluationRunner, RunSummary};
pub use plan_processor::{process_plan, PlanStats};
