use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One corner of a detected region, in image pixel coordinates.
pub type Point = [f32; 2];

/// One unit of inference output for a sub-image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InferResult {
    /// A detected region (detection-only pipelines).
    Box(Vec<Point>),
    /// A decoded text line (recognition-only pipelines).
    Text(String),
    /// A detected region with its transcription (combined pipelines).
    TextBox {
        points: Vec<Point>,
        transcription: String,
    },
}

impl InferResult {
    pub fn kind(&self) -> &'static str {
        match self {
            InferResult::Box(_) => "box",
            InferResult::Text(_) => "text",
            InferResult::TextBox { .. } => "text_box",
        }
    }
}

/// Results for one batch of sub-images belonging to a single source image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessMessage {
    pub image_id: Uuid,
    pub image_name: String,
    /// Total sub-results the image will ever produce. Only meaningful on the
    /// first message observed for this image id.
    pub sub_image_total: usize,
    pub infer_result: Vec<InferResult>,
}

/// Announces that every image has been submitted upstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StopMessage {
    /// Pipeline-wide count of images ever submitted.
    pub image_total: u64,
}

/// Union of everything a stage's inbound channel can carry. Dispatch happens
/// by variant at the receive boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMessage {
    Process(ProcessMessage),
    Stop(StopMessage),
}
