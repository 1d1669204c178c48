pub mod video_ctx;
pub mod video_flow;

pub use video_ctx::VideoCtx;
pub use video_flow::{ItemOutcome, ItemStage, VideoFlow};
