pub mod publish_flow;
pub mod selectors;
pub mod stage;

use tracing::warn;

use crate::error::AppResult;

pub use publish_flow::PublishFlow;
pub use stage::{PublishOutcome, PublishStage};

/// 尽力而为的步骤：失败只记录警告，不中断流程
pub fn attempt<T>(step: &str, result: AppResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("⚠️ {}失败，已跳过: {}", step, e);
            None
        }
    }
}
