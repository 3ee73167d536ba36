//! CSV-file-backed leaf store.

use super::{LeafStore, DEFAULT_COLLECTION_FILE};
use crate::codec::{self, DecodeReport};
use crate::error::StorageError;
use crate::types::{LocationKey, Record};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Leaf store writing one CSV file per location below `root`.
#[derive(Debug, Clone)]
pub struct CsvLeafStore {
    root: PathBuf,
    collection_file: String,
}

impl CsvLeafStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_collection_file(root, DEFAULT_COLLECTION_FILE)
    }

    pub fn with_collection_file(root: impl Into<PathBuf>, collection_file: &str) -> Self {
        Self {
            root: root.into(),
            collection_file: collection_file.to_string(),
        }
    }

    /// Collection file for `key` without touching the filesystem.
    fn file_for(&self, key: &LocationKey) -> PathBuf {
        key.dir_under(&self.root).join(&self.collection_file)
    }

    fn check_file_name(&self) -> Result<(), StorageError> {
        let name = self.collection_file.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(StorageError::InvalidPath(format!(
                "collection file name must be a plain file name: {:?}",
                name
            )));
        }
        Ok(())
    }
}

impl LeafStore for CsvLeafStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn collection_file(&self) -> &str {
        &self.collection_file
    }

    fn path_for(&self, key: &LocationKey) -> Result<PathBuf, StorageError> {
        self.check_file_name()?;
        let dir = key.dir_under(&self.root);
        fs::create_dir_all(&dir)?;
        Ok(dir.join(&self.collection_file))
    }

    fn read_path(&self, path: &Path) -> Result<DecodeReport, StorageError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(DecodeReport::new()),
            Err(e) => return Err(StorageError::IoError(e)),
        };
        let report = codec::read_collection(BufReader::new(file), path)?;
        for warning in &report.warnings {
            tracing::warn!("Skipping malformed row: {}", warning);
        }
        tracing::debug!(
            path = %path.display(),
            records = report.records.len(),
            "Read leaf collection"
        );
        Ok(report)
    }

    fn read_all(&self, key: &LocationKey) -> Result<DecodeReport, StorageError> {
        self.read_path(&self.file_for(key))
    }

    fn write_all(&self, key: &LocationKey, records: &[Record]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Write beside the target, then rename over it.
        let tmp = path.with_file_name(format!(".{}.tmp", self.collection_file));
        let result = (|| -> Result<(), StorageError> {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            codec::write_collection(&mut writer, records, true, &path)?;
            let file = writer
                .into_inner()
                .map_err(|e| StorageError::IoError(e.into_error()))?;
            file.sync_all()?;
            fs::rename(&tmp, &path)?;
            Ok(())
        })();
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    fn append_one(&self, key: &LocationKey, record: &Record) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        let len = file.metadata()?.len();
        let needs_header = len == 0;
        // Hand-edited files may end without a line terminator.
        let needs_newline = !needs_header && !ends_with_newline(&mut file, len)?;

        let mut writer = BufWriter::new(file);
        if needs_newline {
            writer.write_all(b"\n")?;
        }
        codec::write_collection(&mut writer, std::slice::from_ref(record), needs_header, &path)?;
        writer.flush()?;
        Ok(())
    }
}

fn ends_with_newline(file: &mut File, len: u64) -> Result<bool, StorageError> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
