use crate::error::PlanError;
use crate::models::test_plan::TestPlan;
use std::path::Path;
use tokio::fs;

/// 从 JSON 文件加载测试计划
pub async fn load_test_plan(plan_path: &Path) -> Result<TestPlan, PlanError> {
    let content = fs::read_to_string(plan_path)
        .await
        .map_err(|source| PlanError::ReadFailed {
            path: plan_path.to_path_buf(),
            source,
        })?;

    let plan: TestPlan =
        serde_json::from_str(&content).map_err(|source| PlanError::ParseFailed {
            path: plan_path.to_path_buf(),
            source,
        })?;

    tracing::info!(
        "已加载测试计划: {} ({} 个视频)",
        plan_path.file_name().unwrap_or_default().to_string_lossy(),
        plan.items.len()
    );

    Ok(plan)
}
