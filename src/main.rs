mod config;
mod coordinator;
mod error;
mod pipeline;

use crate::config::Settings;
use crate::coordinator::CollectCoordinatorBuilder;
use crate::error::CollectError;
use tokio::sync::mpsc;
use tracing::Level;

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

#[tokio::main]
async fn main() -> Result<(), CollectError> {
    init_logging();
    let settings = Settings::load()?;
    tracing::info!(
        "Starting collect stage: task_type={}, output_dir={}",
        settings.task_type,
        settings.output_dir.display()
    );

    let (next_tx, mut next_rx) = mpsc::channel(settings.input_buffer_size);
    let (metrics_tx, mut metrics_rx) = mpsc::channel(settings.metrics_buffer_size);

    let coordinator = CollectCoordinatorBuilder::new(settings)
        .next_stage(next_tx)
        .metrics(metrics_tx)
        .build()?;

    // Upstream stages enqueue through coordinator.sender(); the loop drains
    // and finalizes once every sender is gone.
    let drain = tokio::spawn(async move {
        while let Some(record) = metrics_rx.recv().await {
            tracing::info!(
                "Stage {}[{}] device {}: process {:?}, send {:?}, {} images",
                record.stage_name,
                record.instance_id,
                record.device_id,
                record.process_cost,
                record.send_cost,
                record.image_total
            );
        }
    });

    coordinator.join().await;
    if let Some(stop) = next_rx.recv().await {
        tracing::info!("Downstream signal ready: {:?}", stop);
    }
    drain.await.ok();
    Ok(())
}
