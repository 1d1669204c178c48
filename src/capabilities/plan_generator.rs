use crate::error::GeneratorError;
use crate::models::TestPlan;
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};

/// 测试计划生成能力（分页用）
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// 根据搜索参数（含分页 token）生成下一份测试计划
    async fn generate(&self, args: &Map<String, JsonValue>) -> Result<TestPlan, GeneratorError>;
}
