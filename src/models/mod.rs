pub mod loaders;
pub mod test_plan;

pub use loaders::load_test_plan;
pub use test_plan::{TestPlan, VideoRecord, PAGE_TOKEN_KEY};
