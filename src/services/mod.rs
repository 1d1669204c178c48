pub mod basic_normalizer;
pub mod http_plan_generator;
pub mod http_transcriber;
pub mod result_writer;
pub mod word_error_comparer;
pub mod yt_dlp_video_source;

pub use basic_normalizer::BasicNormalizer;
pub use http_plan_generator::HttpPlanGenerator;
pub use http_transcriber::HttpTranscriber;
pub use result_writer::{Clock, ResultWriter};
pub use word_error_comparer::WordErrorComparer;
pub use yt_dlp_video_source::YtDlpVideoSource;
