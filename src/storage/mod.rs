// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Writes `records` as `<kind>.json` and returns the path.
    pub fn save_records<T: Serialize>(&self, kind: &str, records: &T) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}.json", kind));

        let body = serde_json::to_string_pretty(records)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, body).map_err(StorageError::IoError)?;

        tracing::info!("Saved {} records to {}", kind, file_path.display());
        Ok(file_path)
    }

    /// Writes `<kind>_meta.json` describing a saved extraction.
    pub fn save_metadata(&self, kind: &str, count: usize, source: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_meta.json", kind));

        let metadata = serde_json::json!({
            "kind": kind,
            "count": count,
            "source": source,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::calendar::DayRecord;
    use chrono::NaiveDate;

    #[test]
    fn test_save_records_and_metadata() {
        let dir = std::env::temp_dir().join(format!("riro_extractor_storage_{}", std::process::id()));
        let storage = StorageManager::new(&dir).unwrap();
        let days = vec![DayRecord::new(
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            vec!["Assembly".to_string()],
            false,
        )];

        let path = storage.save_records("calendar", &days).unwrap();
        let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved[0]["date"], "2024-05-06");
        assert_eq!(saved[0]["events"][0], "Assembly");
        assert_eq!(saved[0]["is_holiday"], false);

        let meta_path = storage.save_metadata("calendar", days.len(), "calendar.html").unwrap();
        let meta: serde_json::Value = serde_json::from_str(&fs::read_to_string(&meta_path).unwrap()).unwrap();
        assert_eq!(meta["count"], 1);
        assert_eq!(meta["kind"], "calendar");

        fs::remove_dir_all(&dir).unwrap();
    }
}
