//! JSON file I/O and atomic file operations

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Read a JSON document, returning `None` when the file does not exist
pub fn read_json<T: DeserializeOwned>(path: &Path) -> std::io::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(&content)?;
    Ok(Some(value))
}

/// Serialize `value` as pretty JSON and write it atomically
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())
}

/// Write data atomically using temp file + rename
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, data)?;
    std::fs::rename(temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestRecord {
        id: u32,
        name: String,
    }

    #[test]
    fn test_json_roundtrip() {
        let temp = tempfile::TempDir::new().unwrap();
        let test_file = temp.path().join("nested").join("record.json");

        let record = TestRecord {
            id: 7,
            name: "Ada".to_string(),
        };
        write_json(&test_file, &record).unwrap();

        let read_back: Option<TestRecord> = read_json(&test_file).unwrap();
        assert_eq!(read_back, Some(record));
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing: Option<TestRecord> = read_json(&temp.path().join("nope.json")).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_read_malformed_file_errors() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        let result: std::io::Result<Option<TestRecord>> = read_json(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_atomic_write() {
        let temp = tempfile::TempDir::new().unwrap();
        let test_file = temp.path().join("atomic.txt");

        let data = b"Hello, world!";
        atomic_write(&test_file, data).unwrap();

        let read_data = std::fs::read(&test_file).unwrap();
        assert_eq!(data, read_data.as_slice());
        assert!(!test_file.with_extension("tmp").exists());
    }
}
