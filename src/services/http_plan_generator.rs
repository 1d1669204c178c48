//! 测试计划生成服务 - 业务能力层
//!
//! 只负责"向测试计划服务请求下一页"，视频搜索本身由外部服务完成

use crate::capabilities::PlanGenerator;
use crate::error::GeneratorError;
use crate::infrastructure::HttpExecutor;
use crate::models::TestPlan;
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::time::Duration;
use tracing::{debug, info};

/// 凭据请求头
const API_KEY_HEADER: &str = "x-api-key";

/// HTTP 测试计划生成服务
///
/// 职责：
/// - 把 args（含 pageToken）作为 JSON POST 给测试计划服务
/// - 响应体即下一份 TestPlan
/// - 任何失败都是致命错误
pub struct HttpPlanGenerator {
    executor: HttpExecutor,
    endpoint: String,
    api_key: String,
}

impl HttpPlanGenerator {
    /// 创建新的测试计划生成服务
    ///
    /// # 参数
    /// - `executor`: HTTP 执行器
    /// - `endpoint`: 测试计划服务地址
    /// - `api_key`: 凭据（来自 `GoogleAPI` 环境变量）
    pub fn new(
        executor: HttpExecutor,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// 单次请求超时
    pub fn timeout(&self) -> Duration {
        self.executor.timeout()
    }
}

#[async_trait]
impl PlanGenerator for HttpPlanGenerator {
    async fn generate(&self, args: &Map<String, JsonValue>) -> Result<TestPlan, GeneratorError> {
        info!("📡 请求下一份测试计划 - {}", self.endpoint);
        debug!("请求参数: {}", JsonValue::Object(args.clone()));

        let body = JsonValue::Object(args.clone());
        let response = self
            .executor
            .post_json(&self.endpoint, &body, &[(API_KEY_HEADER, self.api_key.as_str())])
            .await
            .map_err(|source| GeneratorError::RequestFailed {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        if !response.is_success() {
            return Err(GeneratorError::BadResponse {
                endpoint: self.endpoint.clone(),
                status: response.status,
                body: response.body,
            });
        }

        let plan = parse_plan(&self.endpoint, &response.body)?;
        info!("✅ 收到测试计划: {} 个视频", plan.items.len());
        Ok(plan)
    }
}

fn parse_plan(endpoint: &str, body: &str) -> Result<TestPlan, GeneratorError> {
    serde_json::from_str(body).map_err(|source| GeneratorError::ParseFailed {
        endpoint: endpoint.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan() {
        let body = r#"{"args": {"q": "x", "pageToken": "tok"}, "items": [{"videoId": "YazZwd48ws0"}], "nextPageToken": "tok2"}"#;
        let plan = parse_plan("http://svc", body).unwrap();
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.next_page_token.as_deref(), Some("tok2"));

        let err = parse_plan("http://svc", r#"{"args": {}}"#).unwrap_err();
        assert!(matches!(err, GeneratorError::ParseFailed { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_request_failure() {
        let executor = HttpExecutor::new(Duration::from_millis(500)).unwrap();
        let generator = HttpPlanGenerator::new(executor, "http://127.0.0.1:9/testplan", "key");

        let err = generator.generate(&Map::new()).await.unwrap_err();
        assert!(matches!(err, GeneratorError::RequestFailed { .. }));
    }
}
