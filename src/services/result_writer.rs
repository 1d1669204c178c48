//! 结果写入服务 - 业务能力层
//!
//! 只负责"把一次迭代的结果写成 JSON 文件"，不关心流程

use crate::error::WriterError;
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value as JsonValue;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// 时间来源
pub type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// 结果写入服务
///
/// 职责：
/// - 文件名由组件名 + 秒级时间戳组成：`<component>_<YYYYmmdd-HHMMSS>.json`
/// - 独占创建，同名文件已存在时报错，绝不覆盖
/// - UTF-8 输出，非 ASCII 字符原样写入
/// - 目录不存在时自动创建
pub struct ResultWriter {
    output_dir: PathBuf,
    component: String,
    clock: Clock,
}

impl ResultWriter {
    /// 创建新的结果写入服务
    pub fn new(output_dir: impl Into<PathBuf>, component: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            component: component.into(),
            clock: Arc::new(Local::now),
        }
    }

    /// 替换时间来源（默认 `Local::now`）
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 给定时间对应的文件名
    pub fn file_name(&self, timestamp: &DateTime<Local>) -> String {
        format!("{}_{}.json", self.component, timestamp.format("%Y%m%d-%H%M%S"))
    }

    /// 以当前时间写入结果
    pub fn write<T: Serialize + ?Sized>(&self, result: &T) -> Result<PathBuf, WriterError> {
        self.write_at(result, (self.clock)())
    }

    /// 以指定时间写入结果
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub fn write_at<T: Serialize + ?Sized>(
        &self,
        result: &T,
        timestamp: DateTime<Local>,
    ) -> Result<PathBuf, WriterError> {
        let value = serde_json::to_value(result)?;
        check_structure(&value)?;

        // 先完成序列化，创建文件之后只剩写入可能失败
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        value.serialize(&mut serializer)?;

        fs::create_dir_all(&self.output_dir).map_err(|source| WriterError::CreateDirFailed {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.output_dir.join(self.file_name(&timestamp));
        info!("💾 保存结果 - {}", path.display());

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(WriterError::AlreadyExists(path));
            }
            Err(source) => return Err(WriterError::WriteFailed { path, source }),
        };

        file.write_all(&buf).map_err(|source| WriterError::WriteFailed {
            path: path.clone(),
            source,
        })?;

        debug!("结果文件大小: {} 字节", buf.len());
        Ok(path)
    }
}

/// 结果至少要是一个含 `items` 的非空对象
fn check_structure(value: &JsonValue) -> Result<(), WriterError> {
    match value {
        JsonValue::Null => Err(WriterError::InvalidStructure("结果为空 (null)".to_string())),
        JsonValue::Object(map) if map.is_empty() => {
            Err(WriterError::InvalidStructure("结果对象为空".to_string()))
        }
        JsonValue::Object(map) if !map.contains_key("items") => {
            Err(WriterError::InvalidStructure("结果对象缺少 items".to_string()))
        }
        JsonValue::Object(_) => Ok(()),
        other => Err(WriterError::InvalidStructure(format!(
            "结果必须是对象, 实际为 {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
