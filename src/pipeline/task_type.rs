use crate::error::SettingsError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Which model combination the pipeline runs. Selects the merge policy and
/// the output filename for collected results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum TaskType {
    /// Text detection only.
    Det,
    /// Text recognition only.
    Rec,
    /// Detection followed by recognition.
    DetRec,
    /// Detection, direction classification, then recognition.
    DetClsRec,
}

impl TaskType {
    /// Filename the collected results are saved under.
    pub fn result_filename(&self) -> &'static str {
        match self {
            TaskType::Det => "det_results.txt",
            TaskType::Rec => "rec_results.txt",
            TaskType::DetRec | TaskType::DetClsRec => "pipeline_results.txt",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskType::Det => "det",
            TaskType::Rec => "rec",
            TaskType::DetRec => "det_rec",
            TaskType::DetClsRec => "det_cls_rec",
        }
    }

    /// Whether sub-results carry geometry plus transcription and accumulate
    /// across messages, rather than being replaced wholesale.
    pub fn accumulates(&self) -> bool {
        matches!(self, TaskType::DetRec | TaskType::DetClsRec)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskType {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "det" => Ok(TaskType::Det),
            "rec" => Ok(TaskType::Rec),
            "det_rec" => Ok(TaskType::DetRec),
            "det_cls_rec" => Ok(TaskType::DetClsRec),
            other => Err(SettingsError::UnsupportedTaskType(other.to_string())),
        }
    }
}

impl TryFrom<String> for TaskType {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
