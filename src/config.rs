use crate::error::SettingsError;
use crate::pipeline::task_type::TaskType;
use config::Config;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub task_type: TaskType,
    pub output_dir: PathBuf,
    pub input_buffer_size: usize,
    pub metrics_buffer_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            task_type: TaskType::DetRec,
            output_dir: PathBuf::from("inference_results"),
            input_buffer_size: 32,
            metrics_buffer_size: 16,
        }
    }
}

impl Settings {
    /// Loads `ocr_collect.toml` (if present) layered under `OCR_COLLECT_*`
    /// environment overrides. Unknown task types fail here, before any
    /// message is processed.
    pub fn load() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .set_default("task_type", "det_rec")?
            .set_default("output_dir", "inference_results")?
            .set_default("input_buffer_size", 32)?
            .set_default("metrics_buffer_size", 16)?
            .add_source(config::File::with_name("ocr_collect").required(false))
            .add_source(config::Environment::with_prefix("OCR_COLLECT"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
