use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// 分页参数名，合并到 `args` 中传给测试计划生成器
pub const PAGE_TOKEN_KEY: &str = "pageToken";

const VIDEO_ID_KEY: &str = "videoId";

/// 测试计划：一批视频 + 分页信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestPlan {
    /// 搜索参数（原样传给测试计划生成器）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, JsonValue>>,

    /// 视频列表，顺序即处理顺序
    pub items: Vec<VideoRecord>,

    /// 下一页的 token，不存在时写为 null
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,

    /// 其他顶层字段（如 postprocess 写入的统计）
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl TestPlan {
    pub fn new(args: Map<String, JsonValue>, items: Vec<VideoRecord>) -> Self {
        Self {
            args: Some(args),
            items,
            next_page_token: None,
            extra: Map::new(),
        }
    }

    pub fn with_next_page_token(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }

    /// 生成下一页请求参数：在 `args` 上合并分页 token
    ///
    /// `token` 为 `None` 时写入 null（从第一页重新开始）
    pub fn next_page_args(&self, token: Option<&str>) -> Option<Map<String, JsonValue>> {
        let mut args = self.args.clone()?;
        let value = token
            .map(|t| JsonValue::String(t.to_string()))
            .unwrap_or(JsonValue::Null);
        args.insert(PAGE_TOKEN_KEY.to_string(), value);
        Some(args)
    }
}

/// 单个视频记录
///
/// 只有 `videoId` 会被解释，其余输入字段原样保留并按原顺序写回
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    #[serde(flatten)]
    pub details: Map<String, JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<JsonValue>,

    #[serde(
        rename = "modelTranscript",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub model_transcript: Option<String>,

    #[serde(
        rename = "targetTranscript",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_transcript: Option<String>,
}

impl VideoRecord {
    pub fn new(video_id: impl Into<String>) -> Self {
        let mut details = Map::new();
        details.insert(VIDEO_ID_KEY.to_string(), JsonValue::String(video_id.into()));
        Self {
            details,
            error: None,
            results: None,
            model_transcript: None,
            target_transcript: None,
        }
    }

    /// 附加一个透传字段
    pub fn with_detail(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// 视频ID，缺失或不是字符串时为 `None`
    pub fn video_id(&self) -> Option<&str> {
        self.details.get(VIDEO_ID_KEY).and_then(|v| v.as_str())
    }

    /// 取标题（仅用于日志）
    pub fn title(&self) -> Option<&str> {
        self.details.get("title").and_then(|v| v.as_str())
    }

    /// 清除上一次运行留下的输出字段
    pub fn clear_outcome(&mut self) {
        self.error = None;
        self.results = None;
        self.model_transcript = None;
        self.target_transcript = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_unknown_fields_in_order() {
        let raw = json!({
            "channelId": "UCWlvkaA27BCrcYG6gA0K8UA",
            "channelTitle": "SMS Frankfurt Group Travel",
            "duration": "PT14M41S",
            "manuallyCreatedTranscripts": ["en", "de"],
            "title": "Discover the Baltics",
            "videoId": "YazZwd48ws0"
        });

        let record: VideoRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.video_id(), Some("YazZwd48ws0"));
        assert_eq!(record.title(), Some("Discover the Baltics"));

        let keys: Vec<&String> = record.details.keys().collect();
        assert_eq!(
            keys,
            [
                "channelId",
                "channelTitle",
                "duration",
                "manuallyCreatedTranscripts",
                "title",
                "videoId"
            ]
        );

        let out = serde_json::to_value(&record).unwrap();
        assert!(out.get("error").is_none());
        assert!(out.get("results").is_none());
        assert_eq!(out["manuallyCreatedTranscripts"], json!(["en", "de"]));
    }

    #[test]
    fn test_record_without_video_id() {
        let record: VideoRecord = serde_json::from_value(json!({"title": "x"})).unwrap();
        assert_eq!(record.video_id(), None);
    }

    #[test]
    fn test_plan_serializes_null_next_page_token() {
        let mut args = Map::new();
        args.insert("q".into(), json!("Travel & Events"));
        let plan = TestPlan::new(args, vec![VideoRecord::new("abc")]);

        let out = serde_json::to_value(&plan).unwrap();
        assert_eq!(out["nextPageToken"], JsonValue::Null);
        assert_eq!(out["args"]["q"], json!("Travel & Events"));
        assert_eq!(out["items"][0]["videoId"], json!("abc"));
    }

    #[test]
    fn test_plan_keeps_extra_top_level_fields() {
        let raw = json!({
            "args": {"q": "x"},
            "items": [],
            "nextPageToken": "CAUQAA",
            "summary": {"total": 0}
        });

        let plan: TestPlan = serde_json::from_value(raw).unwrap();
        assert_eq!(plan.next_page_token.as_deref(), Some("CAUQAA"));
        assert_eq!(plan.extra["summary"], json!({"total": 0}));
    }

    #[test]
    fn test_plan_requires_items() {
        let raw = json!({"args": {"q": "x"}, "nextPageToken": null});
        assert!(serde_json::from_value::<TestPlan>(raw).is_err());
    }

    #[test]
    fn test_next_page_args_merges_token() {
        let mut args = Map::new();
        args.insert("q".into(), json!("test"));
        args.insert(PAGE_TOKEN_KEY.into(), JsonValue::Null);
        let plan = TestPlan::new(args, Vec::new());

        let next = plan.next_page_args(Some("tok123")).unwrap();
        assert_eq!(next["pageToken"], json!("tok123"));
        assert_eq!(next["q"], json!("test"));

        let restart = plan.next_page_args(None).unwrap();
        assert_eq!(restart["pageToken"], JsonValue::Null);
    }

    #[test]
    fn test_next_page_args_without_args() {
        let plan = TestPlan {
            args: None,
            items: Vec::new(),
            next_page_token: Some("tok".into()),
            extra: Map::new(),
        };
        assert!(plan.next_page_args(Some("tok")).is_none());
    }
}
