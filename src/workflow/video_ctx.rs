//! 视频处理上下文
//!
//! 封装"我正在处理第几页测试计划的第几个视频"这一信息

use std::fmt::Display;

/// 视频处理上下文（仅用于日志显示）
#[derive(Debug, Clone)]
pub struct VideoCtx {
    /// 当前迭代（从1开始）
    pub iteration: usize,

    /// 迭代总数
    pub iterations: usize,

    /// 视频在测试计划中的索引（从1开始）
    pub item_index: usize,

    /// 测试计划中的视频总数
    pub item_count: usize,

    /// 视频ID，缺失时为 `<missing>`
    pub video_id: String,
}

impl VideoCtx {
    /// 创建新的视频上下文
    pub fn new(
        iteration: usize,
        iterations: usize,
        item_index: usize,
        item_count: usize,
        video_id: Option<&str>,
    ) -> Self {
        Self {
            iteration,
            iterations,
            item_index,
            item_count,
            video_id: video_id.unwrap_or("<missing>").to_string(),
        }
    }
}

impl Display for VideoCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[测试计划 {}/{} 视频 {}/{} #{}]",
            self.iteration, self.iterations, self.item_index, self.item_count, self.video_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let ctx = VideoCtx::new(1, 2, 3, 10, Some("YazZwd48ws0"));
        assert_eq!(ctx.to_string(), "[测试计划 1/2 视频 3/10 #YazZwd48ws0]");

        let ctx = VideoCtx::new(1, 1, 1, 1, None);
        assert!(ctx.to_string().ends_with("#<missing>]"));
    }
}
