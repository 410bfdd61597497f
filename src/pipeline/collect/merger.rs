use crate::error::ProtocolError;
use crate::pipeline::messages::{InferResult, Point};
use crate::pipeline::task_type::TaskType;
use indexmap::IndexMap;
use serde::Serialize;

/// A detected region paired with its transcription, as stored for combined
/// pipelines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextEntry {
    pub transcription: String,
    pub points: Vec<Point>,
}

/// The assembled result for one image. Untagged so the output file stays a
/// flat sequence per image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MergedResult {
    Boxes(Vec<Vec<Point>>),
    Texts(Vec<String>),
    Entries(Vec<TextEntry>),
}

/// Accumulates per-image results according to the task type's merge policy.
///
/// Detection-only and recognition-only messages carry the image's full result
/// set, so a repeat message overwrites. Combined pipelines deliver partial
/// batches and append in arrival order, which may differ from the original
/// spatial order when upstream delivery is unordered.
#[derive(Debug)]
pub struct ResultMerger {
    task_type: TaskType,
    results: IndexMap<String, MergedResult>,
}

impl ResultMerger {
    pub fn new(task_type: TaskType) -> Self {
        Self {
            task_type,
            results: IndexMap::new(),
        }
    }

    pub fn merge(
        &mut self,
        image_name: &str,
        infer_result: &[InferResult],
    ) -> Result<(), ProtocolError> {
        match self.task_type {
            TaskType::Det => {
                let mut boxes = Vec::with_capacity(infer_result.len());
                for result in infer_result {
                    match result {
                        InferResult::Box(points) => boxes.push(points.clone()),
                        other => return Err(self.shape_error(other)),
                    }
                }
                self.results
                    .insert(image_name.to_string(), MergedResult::Boxes(boxes));
            }
            TaskType::Rec => {
                let mut texts = Vec::with_capacity(infer_result.len());
                for result in infer_result {
                    match result {
                        InferResult::Text(text) => texts.push(text.clone()),
                        other => return Err(self.shape_error(other)),
                    }
                }
                self.results
                    .insert(image_name.to_string(), MergedResult::Texts(texts));
            }
            TaskType::DetRec | TaskType::DetClsRec => {
                let entries = match self
                    .results
                    .entry(image_name.to_string())
                    .or_insert_with(|| MergedResult::Entries(Vec::new()))
                {
                    MergedResult::Entries(entries) => entries,
                    // Unreachable: the task type never changes after construction.
                    _ => unreachable!("combined task type stores entries"),
                };
                for result in infer_result {
                    match result {
                        InferResult::TextBox {
                            points,
                            transcription,
                        } => entries.push(TextEntry {
                            transcription: transcription.clone(),
                            points: points.clone(),
                        }),
                        other => {
                            return Err(ProtocolError::ResultShape {
                                task: self.task_type.name(),
                                got: other.kind(),
                            })
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn shape_error(&self, got: &InferResult) -> ProtocolError {
        ProtocolError::ResultShape {
            task: self.task_type.name(),
            got: got.kind(),
        }
    }

    /// Merged results keyed by image name, in first-arrival order.
    pub fn results(&self) -> &IndexMap<String, MergedResult> {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(n: f32) -> Vec<Point> {
        vec![[n, n], [n + 1.0, n], [n + 1.0, n + 1.0], [n, n + 1.0]]
    }

    #[test]
    fn test_combined_appends_in_arrival_order() {
        let mut merger = ResultMerger::new(TaskType::DetRec);
        let p1 = points(0.0);
        let p2 = points(10.0);
        merger
            .merge(
                "img1",
                &[InferResult::TextBox {
                    points: p1.clone(),
                    transcription: "a".to_string(),
                }],
            )
            .unwrap();
        merger
            .merge(
                "img1",
                &[InferResult::TextBox {
                    points: p2.clone(),
                    transcription: "b".to_string(),
                }],
            )
            .unwrap();

        let stored = merger.results().get("img1").unwrap();
        assert_eq!(
            stored,
            &MergedResult::Entries(vec![
                TextEntry {
                    transcription: "a".to_string(),
                    points: p1,
                },
                TextEntry {
                    transcription: "b".to_string(),
                    points: p2,
                },
            ])
        );
    }

    #[test]
    fn test_detection_last_writer_wins() {
        let mut merger = ResultMerger::new(TaskType::Det);
        merger
            .merge("img1", &[InferResult::Box(points(0.0))])
            .unwrap();
        merger
            .merge("img1", &[InferResult::Box(points(5.0))])
            .unwrap();
        assert_eq!(
            merger.results().get("img1").unwrap(),
            &MergedResult::Boxes(vec![points(5.0)])
        );
    }

    #[test]
    fn test_recognition_last_writer_wins() {
        let mut merger = ResultMerger::new(TaskType::Rec);
        merger
            .merge("img1", &[InferResult::Text("first".to_string())])
            .unwrap();
        merger
            .merge("img1", &[InferResult::Text("second".to_string())])
            .unwrap();
        assert_eq!(
            merger.results().get("img1").unwrap(),
            &MergedResult::Texts(vec!["second".to_string()])
        );
    }

    #[test]
    fn test_shape_mismatch_is_protocol_error() {
        let mut merger = ResultMerger::new(TaskType::Det);
        let err = merger
            .merge("img1", &[InferResult::Text("oops".to_string())])
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ResultShape {
                task: "det",
                got: "text",
            }
        ));
    }

    #[test]
    fn test_results_keep_first_arrival_order() {
        let mut merger = ResultMerger::new(TaskType::Rec);
        merger
            .merge("b.jpg", &[InferResult::Text("b".to_string())])
            .unwrap();
        merger
            .merge("a.jpg", &[InferResult::Text("a".to_string())])
            .unwrap();
        let names: Vec<_> = merger.results().keys().cloned().collect();
        assert_eq!(names, vec!["b.jpg", "a.jpg"]);
    }
}
