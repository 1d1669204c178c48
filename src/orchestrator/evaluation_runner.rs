//! 评测运行器 - 编排层
//!
//! ## 职责
//!
//! 本模块是一次评测运行的入口，负责多页测试计划的调度。
//!
//! ## 核心功能
//!
//! 1. **前置检查**：缺少转写能力、多页运行缺少生成器时立即失败，不处理任何视频
//! 2. **迭代**：每页测试计划交给 `plan_processor` 处理
//! 3. **持久化**：每页处理完成后写一个结果文件
//! 4. **分页**：用本页的 `nextPageToken` 向生成器请求下一页
//!
//! 单视频失败只记录在结果文件中，不影响运行；其余错误都是致命的。

use crate::capabilities::{PlanGenerator, Tester, VideoSource};
use crate::config::{MissingTokenPolicy, RunConfig};
use crate::error::{AppError, AppResult, Capability, PlanError};
use crate::models::{load_test_plan, TestPlan};
use crate::orchestrator::plan_processor::{process_plan, PlanStats};
use crate::services::ResultWriter;
use crate::utils::logging;
use crate::workflow::VideoFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// 运行统计
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    /// 完成的迭代数
    pub iterations_completed: usize,
    /// 写入的结果文件，按迭代顺序
    pub artifacts: Vec<PathBuf>,
    pub compared: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, stats: PlanStats, artifact: PathBuf) {
        self.iterations_completed += 1;
        self.compared += stats.compared;
        self.failed += stats.failed;
        self.artifacts.push(artifact);
    }
}

/// 评测运行器
///
/// - 持有本次运行的全部能力和 `RunConfig`，运行期间不变
/// - 顺序处理：一次一页，一页内一次一个视频
pub struct EvaluationRunner {
    run_config: RunConfig,
    tester: Arc<dyn Tester>,
    source: Arc<dyn VideoSource>,
    writer: ResultWriter,
    plan_generator: Option<Arc<dyn PlanGenerator>>,
}

impl EvaluationRunner {
    /// 创建新的评测运行器（不带测试计划生成器，只能单页运行）
    pub fn new(
        run_config: RunConfig,
        tester: Arc<dyn Tester>,
        source: Arc<dyn VideoSource>,
        writer: ResultWriter,
    ) -> Self {
        Self {
            run_config,
            tester,
            source,
            writer,
            plan_generator: None,
        }
    }

    /// 注入测试计划生成器（多页运行必需）
    pub fn with_plan_generator(mut self, plan_generator: Arc<dyn PlanGenerator>) -> Self {
        self.plan_generator = Some(plan_generator);
        self
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run_config
    }

    /// 前置检查，任何视频处理之前调用
    pub fn check_preconditions(&self) -> AppResult<()> {
        self.run_config.validate()?;

        if !self.tester.has_transcriber() {
            return Err(AppError::MissingCapability(Capability::Transcriber));
        }

        if !self.tester.has_normalizer() {
            warn!("⚠️ 未配置文本规范化，将直接比较原始文本");
        }

        if self.run_config.iterations > 1 && self.plan_generator.is_none() {
            return Err(AppError::MissingCapability(Capability::PlanGenerator));
        }

        Ok(())
    }

    /// 从文件加载测试计划并运行
    ///
    /// 前置检查在读取文件之前完成
    pub async fn run_from_path(&self, plan_path: &Path) -> AppResult<RunSummary> {
        self.check_preconditions()?;
        let plan = load_test_plan(plan_path).await?;
        self.run_checked(plan).await
    }

    /// 运行给定的测试计划
    pub async fn run(&self, plan: TestPlan) -> AppResult<RunSummary> {
        self.check_preconditions()?;
        self.run_checked(plan).await
    }

    async fn run_checked(&self, mut plan: TestPlan) -> AppResult<RunSummary> {
        let iterations = self.run_config.iterations;
        let flow = VideoFlow::new(self.tester.clone(), self.source.clone(), &self.run_config);
        let mut summary = RunSummary::default();

        for iteration in 1..=iterations {
            let stats =
                process_plan(&flow, self.tester.as_ref(), &mut plan, iteration, iterations).await;

            let artifact = self.writer.write(&plan)?;
            summary.record(stats, artifact);

            if iteration == iterations {
                break;
            }

            match self.next_plan(&plan).await? {
                Some(next) => plan = next,
                None => break,
            }
        }

        logging::print_final_stats(
            summary.iterations_completed,
            summary.compared,
            summary.failed,
            summary.artifacts.as_slice(),
        );
        Ok(summary)
    }

    /// 请求下一页测试计划
    ///
    /// # 返回
    /// token 缺失且策略为 `Stop` 时返回 `None`
    async fn next_plan(&self, plan: &TestPlan) -> AppResult<Option<TestPlan>> {
        let token = plan.next_page_token.as_deref();
        if token.is_none() {
            match self.run_config.missing_token_policy {
                MissingTokenPolicy::Stop => {
                    warn!("⚠️ 测试计划没有 nextPageToken，提前结束运行");
                    return Ok(None);
                }
                MissingTokenPolicy::Restart => {
                    warn!("⚠️ 测试计划没有 nextPageToken，从第一页重新生成");
                }
            }
        }

        let args = plan.next_page_args(token).ok_or(PlanError::MissingArgs)?;
        let generator = self
            .plan_generator
            .as_ref()
            .ok_or(AppError::MissingCapability(Capability::PlanGenerator))?;

        info!("➡️ 生成下一页测试计划 (pageToken={:?})", token);
        let mut next = generator.generate(&args).await?;
        if next.args.is_none() {
            next.args = Some(args);
        }
        Ok(Some(next))
    }
}
