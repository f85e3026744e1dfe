//! Append-only CSV log of predictions.

use crate::classifier::Label;
use crate::error::PersistenceError;
use crate::features::{Feature, FeatureVector};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// One prediction as it is written to the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub username: String,
    pub features: FeatureVector,
    pub prediction: Label,
}

impl PredictionRecord {
    fn fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(Feature::ALL.len() + 2);
        fields.push(self.username.clone());
        fields.extend(Feature::ALL.iter().map(|f| self.features.format_value(*f)));
        fields.push(self.prediction.to_string());
        fields
    }
}

/// Header row of the predictions file.
pub fn header() -> Vec<&'static str> {
    let mut header = Vec::with_capacity(Feature::ALL.len() + 2);
    header.push("username");
    header.extend(Feature::ALL.iter().map(|f| f.column()));
    header.push("prediction");
    header
}

/// Destination for prediction records.
pub trait RecordSink: Send + Sync {
    fn append(&self, record: &PredictionRecord) -> Result<(), PersistenceError>;
}

/// CSV file sink. Appends from concurrent callers are serialized; each record is flushed whole.
pub struct CsvSink {
    path: PathBuf,
    writer: Mutex<csv::Writer<File>>,
}

impl CsvSink {
    /// Opens `path` for appending, writing the header only if the file is new or empty.
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_empty = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if is_empty {
            writer.write_record(header())?;
            writer.flush()?;
            info!(path = %path.display(), "created predictions file");
        }

        Ok(CsvSink {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn append(&self, record: &PredictionRecord) -> Result<(), PersistenceError> {
        let mut writer = self.writer.lock().map_err(|_| PersistenceError::Poisoned)?;
        writer.write_record(record.fields())?;
        writer.flush()?;
        debug!(username = %record.username, path = %self.path.display(), "prediction saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str) -> PredictionRecord {
        PredictionRecord {
            username: username.to_string(),
            features: FeatureVector::new([1.0, 0.4286, 2.0, 0.0, 0.0, 2.0, 0.0, 0.0, 10.0, 100.0, 50.0]),
            prediction: Label::Real,
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");

        CsvSink::open(&path).unwrap().append(&record("john123")).unwrap();
        CsvSink::open(&path).unwrap().append(&record("jane")).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "username,profile pic,nums/length username,fullname words,nums/length fullname,\
name==username,description length,external URL,private,#posts,#followers,#follows,prediction"
        );
        assert_eq!(lines[1], "john123,1,0.4286,2,0.0,0,2,0,0,10,100,50,Real");
        assert!(lines[2].starts_with("jane,"));
    }

    #[test]
    fn test_existing_empty_file_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        std::fs::write(&path, "").unwrap();
        CsvSink::open(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("username,"));
    }

    #[test]
    fn test_open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("predictions.csv");
        assert!(matches!(CsvSink::open(&path), Err(PersistenceError::Io(_))));
    }
}
