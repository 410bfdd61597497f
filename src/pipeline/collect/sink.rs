use crate::error::CollectError;
use crate::pipeline::collect::merger::MergedResult;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the collected results once, as one `<image name>\t<json>` line per
/// image, to the task-type-derived file under the output directory.
#[derive(Debug)]
pub struct ResultSink {
    path: PathBuf,
}

impl ResultSink {
    pub fn new(output_dir: impl AsRef<Path>, filename: &str) -> Self {
        Self {
            path: output_dir.as_ref().join(filename),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, results: &IndexMap<String, MergedResult>) -> Result<(), CollectError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        for (image_name, merged) in results {
            let line = serde_json::to_string(merged)?;
            writeln!(writer, "{}\t{}", image_name, line)?;
        }
        writer.flush()?;
        tracing::info!("Saved infer results to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::collect::merger::TextEntry;

    #[test]
    fn test_writes_one_tab_separated_line_per_image() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ResultSink::new(dir.path(), "pipeline_results.txt");

        let mut results = IndexMap::new();
        results.insert(
            "img1.jpg".to_string(),
            MergedResult::Entries(vec![TextEntry {
                transcription: "hello".to_string(),
                points: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            }]),
        );
        results.insert(
            "img2.jpg".to_string(),
            MergedResult::Entries(Vec::new()),
        );
        sink.write(&results).unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("img1.jpg\t"));
        assert!(lines[0].contains("\"transcription\":\"hello\""));
        assert_eq!(lines[1], "img2.jpg\t[]");
    }

    #[test]
    fn test_flat_sequences_for_single_model_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ResultSink::new(dir.path(), "rec_results.txt");

        let mut results = IndexMap::new();
        results.insert(
            "img.jpg".to_string(),
            MergedResult::Texts(vec!["a".to_string(), "b".to_string()]),
        );
        sink.write(&results).unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(contents, "img.jpg\t[\"a\",\"b\"]\n");
    }
}
