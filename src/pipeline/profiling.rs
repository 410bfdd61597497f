use crate::pipeline::StageIdentity;
use std::time::Duration;
use tokio::sync::mpsc;

/// Aggregate timings and counts a stage reports once at shutdown.
#[derive(Debug, Clone)]
pub struct ProfilingRecord {
    pub stage_name: &'static str,
    pub instance_id: usize,
    pub device_id: i32,
    pub process_cost: Duration,
    pub send_cost: Duration,
    pub image_total: u64,
}

impl ProfilingRecord {
    pub fn new(
        identity: &StageIdentity,
        process_cost: Duration,
        send_cost: Duration,
        image_total: u64,
    ) -> Self {
        Self {
            stage_name: identity.stage_name,
            instance_id: identity.instance_id,
            device_id: identity.device_id,
            process_cost,
            send_cost,
            image_total,
        }
    }
}

/// Best-effort handle to the shared metrics channel. Emission never blocks
/// and never fails the stage: a full or closed channel drops the record with
/// a warning.
#[derive(Debug, Clone)]
pub struct ProfilingEmitter {
    metrics_tx: mpsc::Sender<ProfilingRecord>,
}

impl ProfilingEmitter {
    pub fn new(metrics_tx: mpsc::Sender<ProfilingRecord>) -> Self {
        Self { metrics_tx }
    }

    pub fn emit(&self, record: ProfilingRecord) {
        if let Err(e) = self.metrics_tx.try_send(record) {
            tracing::warn!("Dropping profiling record: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProfilingRecord {
        let identity = StageIdentity::new("collect", 0, -1);
        ProfilingRecord::new(&identity, Duration::from_millis(5), Duration::ZERO, 2)
    }

    #[tokio::test]
    async fn test_emit_delivers_record() {
        let (tx, mut rx) = mpsc::channel(1);
        let emitter = ProfilingEmitter::new(tx);
        emitter.emit(record());
        let received = rx.recv().await.unwrap();
        assert_eq!(received.stage_name, "collect");
        assert_eq!(received.image_total, 2);
    }

    #[tokio::test]
    async fn test_emit_on_full_channel_drops_without_error() {
        let (tx, _rx) = mpsc::channel(1);
        let emitter = ProfilingEmitter::new(tx);
        emitter.emit(record());
        // Channel is now full; the second emit must not block or panic.
        emitter.emit(record());
    }
}
