use crate::config::Settings;
use crate::error::CollectError;
use crate::pipeline::collect::stage::CollectStage;
use crate::pipeline::collect::total::SharedImageTotal;
use crate::pipeline::messages::StageMessage;
use crate::pipeline::profiling::ProfilingRecord;
use crate::pipeline::{StageIdentity, StageModule};
use tokio::sync::mpsc;

/// Drives one collect stage instance: owns the inbound channel and the
/// spawned message loop. The loop runs until the inbound channel closes or
/// the stage surfaces a fatal error; either way the stage's `stop` finalizer
/// runs exactly once.
pub struct CollectCoordinator {
    inbound_tx: mpsc::Sender<StageMessage>,
    stage_task: tokio::task::JoinHandle<()>,
}

impl CollectCoordinator {
    fn new(mut stage: CollectStage, buffer_size: usize) -> Self {
        let (inbound_tx, mut inbound_rx) = mpsc::channel(buffer_size);
        let stage_task = tokio::spawn(async move {
            while let Some(message) = inbound_rx.recv().await {
                if let Err(e) = stage.process(message).await {
                    tracing::error!("Collect stage error: {}", e);
                    break;
                }
            }
            stage.stop();
        });
        Self {
            inbound_tx,
            stage_task,
        }
    }

    /// Handle upstream stages enqueue onto.
    pub fn sender(&self) -> mpsc::Sender<StageMessage> {
        self.inbound_tx.clone()
    }

    /// Waits for the stage loop to finish. Drops this coordinator's own
    /// sender first so the loop ends once every upstream handle is gone.
    pub async fn join(self) {
        drop(self.inbound_tx);
        if let Err(e) = self.stage_task.await {
            tracing::error!("Collect stage task failed: {}", e);
        }
    }
}

pub struct CollectCoordinatorBuilder {
    settings: Settings,
    instance_id: usize,
    device_id: i32,
    image_total: SharedImageTotal,
    next_tx: Option<mpsc::Sender<StageMessage>>,
    metrics_tx: Option<mpsc::Sender<ProfilingRecord>>,
}

impl CollectCoordinatorBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            instance_id: 0,
            device_id: -1,
            image_total: SharedImageTotal::new(),
            next_tx: None,
            metrics_tx: None,
        }
    }

    pub fn instance_id(mut self, instance_id: usize) -> Self {
        self.instance_id = instance_id;
        self
    }

    pub fn device_id(mut self, device_id: i32) -> Self {
        self.device_id = device_id;
        self
    }

    // Shares one total across every stage instance of the process.
    pub fn image_total(mut self, image_total: SharedImageTotal) -> Self {
        self.image_total = image_total;
        self
    }

    pub fn next_stage(mut self, next_tx: mpsc::Sender<StageMessage>) -> Self {
        self.next_tx = Some(next_tx);
        self
    }

    pub fn metrics(mut self, metrics_tx: mpsc::Sender<ProfilingRecord>) -> Self {
        self.metrics_tx = Some(metrics_tx);
        self
    }

    pub fn build(self) -> Result<CollectCoordinator, CollectError> {
        let next_tx = self
            .next_tx
            .ok_or(CollectError::Build("Next stage not set"))?;
        // Stage still runs without a metrics collector; records are dropped.
        let metrics_tx = self
            .metrics_tx
            .unwrap_or_else(|| mpsc::channel(1).0);
        let stage = CollectStage::new(
            StageIdentity::new("collect", self.instance_id, self.device_id),
            self.settings.task_type,
            &self.settings.output_dir,
            self.image_total,
            next_tx,
            metrics_tx,
        );
        Ok(CollectCoordinator::new(
            stage,
            self.settings.input_buffer_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::messages::{InferResult, ProcessMessage, StopMessage};
    use crate::pipeline::task_type::TaskType;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_coordinator_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            task_type: TaskType::Rec,
            output_dir: dir.path().to_path_buf(),
            ..Settings::default()
        };
        let (next_tx, mut next_rx) = mpsc::channel(4);
        let (metrics_tx, mut metrics_rx) = mpsc::channel(4);

        let coordinator = CollectCoordinatorBuilder::new(settings)
            .instance_id(3)
            .next_stage(next_tx)
            .metrics(metrics_tx)
            .build()
            .expect("Failed to build coordinator");

        let sender = coordinator.sender();
        sender
            .send(StageMessage::Process(ProcessMessage {
                image_id: Uuid::new_v4(),
                image_name: "a.jpg".to_string(),
                sub_image_total: 1,
                infer_result: vec![InferResult::Text("hello".to_string())],
            }))
            .await
            .unwrap();
        sender
            .send(StageMessage::Stop(StopMessage { image_total: 1 }))
            .await
            .unwrap();
        drop(sender);
        coordinator.join().await;

        assert!(matches!(
            next_rx.try_recv().unwrap(),
            StageMessage::Stop(StopMessage { image_total: 1 })
        ));
        assert!(next_rx.try_recv().is_err());

        let record = metrics_rx.try_recv().unwrap();
        assert_eq!(record.instance_id, 3);
        assert_eq!(record.image_total, 1);

        let contents = std::fs::read_to_string(dir.path().join("rec_results.txt")).unwrap();
        assert_eq!(contents, "a.jpg\t[\"hello\"]\n");
    }

    #[tokio::test]
    async fn test_builder_requires_downstream() {
        let result = CollectCoordinatorBuilder::new(Settings::default()).build();
        assert!(result.is_err());
    }
}
