pub mod collect;
pub mod messages;
pub mod profiling;
pub mod task_type;

pub use collect::CollectStage;
pub use messages::{InferResult, ProcessMessage, StageMessage, StopMessage};
pub use task_type::TaskType;

use crate::error::CollectError;
use async_trait::async_trait;

/// Identifies one stage instance within the pipeline, for logging and
/// profiling.
#[derive(Debug, Clone)]
pub struct StageIdentity {
    pub stage_name: &'static str,
    pub instance_id: usize,
    /// Accelerator the instance is pinned to; -1 for CPU-only stages.
    pub device_id: i32,
}

impl StageIdentity {
    pub fn new(stage_name: &'static str, instance_id: usize, device_id: i32) -> Self {
        Self {
            stage_name,
            instance_id,
            device_id,
        }
    }
}

/// Contract the stage runtime drives: one call per inbound message, then a
/// final `stop` once the inbound channel is exhausted.
#[async_trait]
pub trait StageModule: Send {
    async fn process(&mut self, message: StageMessage) -> Result<(), CollectError>;

    /// Final teardown; called exactly once after the last `process`.
    fn stop(&mut self);

    fn name(&self) -> &'static str;
}
