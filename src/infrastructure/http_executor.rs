//! HTTP 执行器 - 基础设施层
//!
//! 持有唯一的 HTTP 客户端资源，只暴露"发请求"的能力

use reqwest::multipart::Form;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

/// HTTP 响应（状态码 + 原始文本）
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 执行器
///
/// 职责：
/// - 持有唯一的 `reqwest::Client`（内部是 Arc，clone 代价很低）
/// - 暴露 JSON 和 multipart 两种 POST 能力
/// - 不认识 TestPlan / VideoRecord
/// - 不处理业务流程
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
    timeout: Duration,
}

impl HttpExecutor {
    /// 创建新的 HTTP 执行器
    ///
    /// # 参数
    /// - `timeout`: 单个请求的超时时间
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 发送 JSON 请求
    ///
    /// # 参数
    /// - `url`: 请求地址
    /// - `body`: JSON 请求体
    /// - `headers`: 额外请求头
    pub async fn post_json(
        &self,
        url: &str,
        body: &JsonValue,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, reqwest::Error> {
        debug!("POST {} (json)", url);

        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }

    /// 发送 multipart 请求
    ///
    /// # 参数
    /// - `url`: 请求地址
    /// - `form`: multipart 表单
    /// - `bearer_token`: 为空时不带 Authorization 头
    pub async fn post_multipart(
        &self,
        url: &str,
        form: Form,
        bearer_token: &str,
    ) -> Result<HttpResponse, reqwest::Error> {
        debug!("POST {} (multipart)", url);

        let mut request = self.client.post(url).multipart(form);
        if !bearer_token.is_empty() {
            request = request.bearer_auth(bearer_token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}
