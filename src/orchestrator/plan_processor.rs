//! 单个测试计划处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理一份测试计划的所有视频，是测试计划级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **遍历视频**：按原顺序逐个处理 `Vec<VideoRecord>`，不并发
//! 2. **流程调度**：复用同一个 `VideoFlow`
//! 3. **结果累积**：每个视频产生一个 `ItemOutcome`，循环结束后一次性写回记录
//! 4. **整体后处理**：所有结果写回后调用 `Tester::postprocess`

use crate::capabilities::Tester;
use crate::models::TestPlan;
use crate::utils::logging;
use crate::workflow::{ItemOutcome, VideoCtx, VideoFlow};

/// 测试计划处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlanStats {
    pub compared: usize,
    pub failed: usize,
}

/// 处理单个测试计划
///
/// # 参数
/// - `flow`: 视频处理流程
/// - `tester`: 测试能力（用于整体后处理）
/// - `plan`: 测试计划，处理后每个视频带有 `error` 或 `results`
/// - `iteration`: 当前迭代（从1开始，仅用于日志）
/// - `iterations`: 迭代总数
///
/// # 返回
/// 返回比较/跳过数量
pub async fn process_plan(
    flow: &VideoFlow,
    tester: &dyn Tester,
    plan: &mut TestPlan,
    iteration: usize,
    iterations: usize,
) -> PlanStats {
    let item_count = plan.items.len();
    logging::log_iteration_start(iteration, iterations, item_count, plan.args.as_ref());

    // ========== 逐个处理视频，只收集结果 ==========
    let mut outcomes: Vec<ItemOutcome> = Vec::with_capacity(item_count);
    for (index, record) in plan.items.iter().enumerate() {
        let item_index = index + 1;
        logging::log_item_progress(item_index, item_count, iteration, iterations);

        let ctx = VideoCtx::new(
            iteration,
            iterations,
            item_index,
            item_count,
            record.video_id(),
        );
        outcomes.push(flow.run(record, &ctx).await);
    }

    // ========== 一次性写回 ==========
    let stats = apply_outcomes(plan, outcomes);

    tester.postprocess(plan);
    logging::log_iteration_complete(iteration, stats.compared, stats.failed);

    stats
}

/// 按索引把结果写回对应视频
fn apply_outcomes(plan: &mut TestPlan, outcomes: Vec<ItemOutcome>) -> PlanStats {
    let mut stats = PlanStats::default();
    for (record, outcome) in plan.items.iter_mut().zip(outcomes) {
        if outcome.is_failed() {
            stats.failed += 1;
        } else {
            stats.compared += 1;
        }
        outcome.apply_to(record);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::stub::{StubTester, StubVideoSource};
    use crate::config::RunConfig;
    use crate::error::StageError;
    use crate::models::VideoRecord;
    use serde_json::{json, Map};
    use std::sync::Arc;

    #[test]
    fn test_apply_outcomes_by_index() {
        let mut plan = TestPlan::new(
            Map::new(),
            vec![VideoRecord::new("a"), VideoRecord::new("b")],
        );
        let outcomes = vec![
            ItemOutcome::Compared {
                results: json!({"wer": 0.0}),
                transcripts: None,
            },
            ItemOutcome::Failed {
                stage: crate::workflow::ItemStage::Download,
                error: StageError::Unavailable("gone".into()),
            },
        ];

        let stats = apply_outcomes(&mut plan, outcomes);
        assert_eq!(stats, PlanStats { compared: 1, failed: 1 });
        assert!(plan.items[0].results.is_some());
        assert_eq!(
            plan.items[1].error.as_deref(),
            Some("ValueError (download): gone")
        );
    }

    #[tokio::test]
    async fn test_postprocess_sees_annotated_items() {
        let dir = tempfile::tempdir().unwrap();
        let run_config = RunConfig {
            audio_dir: dir.path().to_path_buf(),
            ..RunConfig::default()
        };
        let tester = Arc::new(StubTester::new());
        let source = Arc::new(
            StubVideoSource::new().fail_media("b", StageError::Failed("disk".into())),
        );
        let flow = VideoFlow::new(tester.clone(), source, &run_config);

        let mut plan = TestPlan::new(
            Map::new(),
            vec![VideoRecord::new("a"), VideoRecord::new("b")],
        );
        let stats = process_plan(&flow, tester.as_ref(), &mut plan, 1, 1).await;

        assert_eq!(stats, PlanStats { compared: 1, failed: 1 });
        assert_eq!(tester.postprocess_count(), 1);
        assert_eq!(plan.extra["postprocessed"], json!(true));
        assert_eq!(
            plan.items[1].error.as_deref(),
            Some("RuntimeError (download): disk")
        );
    }

    #[tokio::test]
    async fn test_empty_plan_still_postprocessed() {
        let run_config = RunConfig::default();
        let tester = Arc::new(StubTester::new());
        let flow = VideoFlow::new(
            tester.clone(),
            Arc::new(StubVideoSource::new()),
            &run_config,
        );

        let mut plan = TestPlan::new(Map::new(), Vec::new());
        let stats = process_plan(&flow, tester.as_ref(), &mut plan, 1, 1).await;

        assert_eq!(stats, PlanStats::default());
        assert_eq!(tester.postprocess_count(), 1);
    }
}
