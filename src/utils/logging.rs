//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use serde_json::{Map, Value as JsonValue};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则默认 `info`（详细模式为 `debug`）。
/// 重复初始化时静默忽略。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `plan_path`: 测试计划文件
/// - `iterations`: 迭代次数
pub fn log_startup(plan_path: &Path, iterations: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - YouTube 转写评测");
    info!("📄 测试计划: {}", plan_path.display());
    info!("🔁 迭代次数: {}", iterations);
    info!("{}", "=".repeat(60));
}

/// 记录迭代开始信息
///
/// # 参数
/// - `iteration`: 当前迭代（从1开始）
/// - `iterations`: 迭代总数
/// - `item_count`: 视频数
/// - `args`: 测试计划搜索参数
pub fn log_iteration_start(
    iteration: usize,
    iterations: usize,
    item_count: usize,
    args: Option<&Map<String, JsonValue>>,
) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 个测试计划 ({} 个视频)", iteration, iterations, item_count);
    match args {
        Some(args) => info!("测试计划参数:\n{}", pretty_args(args)),
        None => info!("测试计划参数: (无)"),
    }
    info!("{}", "=".repeat(60));
    if item_count == 0 {
        warn!("⚠️ 测试计划没有任何视频");
    }
}

/// 记录单个视频的进度
pub fn log_item_progress(index: usize, item_count: usize, iteration: usize, iterations: usize) {
    info!(
        "测试进度: {}/{} 视频, {}/{} 测试计划",
        index, item_count, iteration, iterations
    );
}

/// 记录迭代完成信息
///
/// # 参数
/// - `iteration`: 当前迭代
/// - `compared`: 完成比较的视频数
/// - `failed`: 跳过的视频数
pub fn log_iteration_complete(iteration: usize, compared: usize, failed: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 个测试计划完成: 比较 {} 个, 跳过 {} 个",
        iteration, compared, failed
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `iterations`: 完成的迭代数
/// - `compared`: 完成比较的视频总数
/// - `failed`: 跳过的视频总数
/// - `artifacts`: 写入的结果文件
pub fn print_final_stats<P: AsRef<Path>>(
    iterations: usize,
    compared: usize,
    failed: usize,
    artifacts: &[P],
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🔁 测试计划: {}", iterations);
    info!("✅ 比较: {}", compared);
    info!("❌ 跳过: {}", failed);
    for path in artifacts {
        info!("💾 {}", path.as_ref().display());
    }
    info!("{}", "=".repeat(60));
}

/// 格式化搜索参数用于日志显示
pub fn pretty_args(args: &Map<String, JsonValue>) -> String {
    serde_json::to_string_pretty(args).unwrap_or_else(|_| format!("{:?}", args))
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
