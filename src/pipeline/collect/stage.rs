use crate::error::{CollectError, ProtocolError};
use crate::pipeline::collect::ledger::CompletionLedger;
use crate::pipeline::collect::merger::ResultMerger;
use crate::pipeline::collect::sink::ResultSink;
use crate::pipeline::collect::total::SharedImageTotal;
use crate::pipeline::messages::{ProcessMessage, StageMessage, StopMessage};
use crate::pipeline::profiling::{ProfilingEmitter, ProfilingRecord};
use crate::pipeline::task_type::TaskType;
use crate::pipeline::{StageIdentity, StageModule};
use async_trait::async_trait;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Running,
    /// Results saved, stop signal sent. Terminal.
    Stopped,
}

/// The collect stage: reassembles out-of-order sub-results per image, and the
/// first time every submitted image is fully assembled, saves the results and
/// signals the next stage to stop.
///
/// One instance runs a single-threaded message loop; only the image total is
/// shared with other instances.
pub struct CollectStage {
    identity: StageIdentity,
    ledger: CompletionLedger,
    merger: ResultMerger,
    image_total: SharedImageTotal,
    sink: ResultSink,
    next_tx: mpsc::Sender<StageMessage>,
    profiling: ProfilingEmitter,
    state: StageState,
    process_cost: Duration,
    send_cost: Duration,
}

impl CollectStage {
    pub fn new(
        identity: StageIdentity,
        task_type: TaskType,
        output_dir: impl AsRef<Path>,
        image_total: SharedImageTotal,
        next_tx: mpsc::Sender<StageMessage>,
        metrics_tx: mpsc::Sender<ProfilingRecord>,
    ) -> Self {
        let sink = ResultSink::new(output_dir, task_type.result_filename());
        Self {
            identity,
            ledger: CompletionLedger::new(),
            merger: ResultMerger::new(task_type),
            image_total,
            sink,
            next_tx,
            profiling: ProfilingEmitter::new(metrics_tx),
            state: StageState::Running,
            process_cost: Duration::ZERO,
            send_cost: Duration::ZERO,
        }
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    fn handle_result(&mut self, message: &ProcessMessage) -> Result<(), CollectError> {
        let completed_now = self.ledger.observe(
            message.image_id,
            message.sub_image_total,
            message.infer_result.len(),
        )?;
        self.merger
            .merge(&message.image_name, &message.infer_result)?;
        if completed_now {
            tracing::debug!(
                "Image {} ({}) fully assembled, {} images done",
                message.image_id,
                message.image_name,
                self.ledger.completed()
            );
        }
        Ok(())
    }

    fn handle_stop(&mut self, message: &StopMessage) {
        self.image_total.set(message.image_total);
        tracing::info!("Pipeline image total announced: {}", message.image_total);
    }

    /// The global-completion predicate: the total is known and every image
    /// has been assembled. Checked after every message because the total may
    /// land before the last results do, or after.
    fn all_images_collected(&self) -> bool {
        let total = self.image_total.get();
        total != 0 && self.ledger.completed() == total
    }

    async fn save_and_signal_stop(&mut self) -> Result<(), CollectError> {
        self.sink.write(self.merger.results())?;

        let send_start = Instant::now();
        self.next_tx
            .send(StageMessage::Stop(StopMessage {
                image_total: self.image_total.get(),
            }))
            .await
            .map_err(|_| ProtocolError::DownstreamClosed)?;
        self.send_cost += send_start.elapsed();

        self.state = StageState::Stopped;
        tracing::info!(
            "Collect stage {}[{}] stopped after {} images",
            self.identity.stage_name,
            self.identity.instance_id,
            self.ledger.completed()
        );
        Ok(())
    }
}

#[async_trait]
impl StageModule for CollectStage {
    async fn process(&mut self, message: StageMessage) -> Result<(), CollectError> {
        if self.state == StageState::Stopped {
            return Err(ProtocolError::MessageAfterStop.into());
        }

        let process_start = Instant::now();
        match &message {
            StageMessage::Process(process) => self.handle_result(process)?,
            StageMessage::Stop(stop) => self.handle_stop(stop),
        }
        self.process_cost += process_start.elapsed();

        if self.all_images_collected() {
            self.save_and_signal_stop().await?;
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.profiling.emit(ProfilingRecord::new(
            &self.identity,
            self.process_cost,
            self.send_cost,
            self.image_total.get(),
        ));
    }

    fn name(&self) -> &'static str {
        self.identity.stage_name
    }
}
