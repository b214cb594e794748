// Output files - Writes chart artifacts and reports their SHA-256 digests

use sha2::{Digest, Sha256};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type OutputResult<T> = Result<T, OutputError>;

impl OutputError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        OutputError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A file written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: usize,
    pub sha256: String,
}

/// Write `data` to `dir/file_name`, replacing any existing file
///
/// The file is flushed before returning and closed when the writer drops.
pub fn write_artifact(dir: &Path, file_name: &str, data: &[u8]) -> OutputResult<WrittenFile> {
    let path = dir.join(file_name);

    let file = fs::File::create(&path).map_err(|e| OutputError::io(&path, e))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(data).map_err(|e| OutputError::io(&path, e))?;
    writer.flush().map_err(|e| OutputError::io(&path, e))?;

    let sha256 = calculate_sha256(data);
    log::debug!("Wrote {} ({} bytes, sha256 {})", path.display(), data.len(), sha256);

    Ok(WrittenFile {
        path,
        bytes: data.len(),
        sha256,
    })
}

/// SHA-256 of data as lowercase hex
pub fn calculate_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
