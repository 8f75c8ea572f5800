//! Where source animations come from and where fitted ones go.
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::FitError;

/// Prefix given to fitted copies written next to their source.
pub const DEFAULT_OUTPUT_PREFIX: &str = "WeChat_";

pub trait Storage: Send + Sync {
    /// Byte size of the stored source.
    fn byte_size(&self, path: &Path) -> Result<u64, FitError>;
    fn read(&self, path: &Path) -> Result<Vec<u8>, FitError>;
    /// Persist the fitted bytes for `source`, returning where they went.
    fn write(&self, source: &Path, bytes: &[u8]) -> Result<PathBuf, FitError>;
}

/// Local filesystem storage.
///
/// Fitted files are written as `<prefix><file name>`, either next to the
/// source or into `output_dir` when one is set.
#[derive(Debug, Clone)]
pub struct FsStorage {
    prefix: String,
    output_dir: Option<PathBuf>,
    dry_run: bool,
}

impl Default for FsStorage {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PREFIX, None, false)
    }
}

impl FsStorage {
    pub fn new(prefix: impl Into<String>, output_dir: Option<PathBuf>, dry_run: bool) -> Self {
        Self {
            prefix: prefix.into(),
            output_dir,
            dry_run,
        }
    }

    /// Destination path for the fitted copy of `source`.
    pub fn output_path(&self, source: &Path) -> PathBuf {
        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = match &self.output_dir {
            Some(dir) => dir.as_path(),
            None => source.parent().unwrap_or_else(|| Path::new("")),
        };
        dir.join(format!("{}{}", self.prefix, file_name))
    }
}

impl Storage for FsStorage {
    fn byte_size(&self, path: &Path) -> Result<u64, FitError> {
        fs::metadata(path)
            .map(|metadata| metadata.len())
            .map_err(|source| FitError::Stat {
                path: path.to_path_buf(),
                source,
            })
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, FitError> {
        fs::read(path).map_err(|e| FitError::decode(path, e.to_string()))
    }

    fn write(&self, source: &Path, bytes: &[u8]) -> Result<PathBuf, FitError> {
        let target = self.output_path(source);
        if self.dry_run {
            return Ok(target);
        }

        let write_err = |source: std::io::Error| FitError::Write {
            path: target.clone(),
            source,
        };

        if let Some(dir) = &self.output_dir {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        let file = File::create(&target).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes).map_err(write_err)?;
        writer.flush().map_err(write_err)?;

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_output_path_next_to_source() {
        let storage = FsStorage::default();
        assert_eq!(
            storage.output_path(Path::new("/tmp/anim/cat.gif")),
            PathBuf::from("/tmp/anim/WeChat_cat.gif")
        );
    }

    #[test]
    fn test_output_path_in_output_dir() {
        let storage = FsStorage::new("small_", Some(PathBuf::from("/out")), false);
        assert_eq!(
            storage.output_path(Path::new("/tmp/anim/cat.gif")),
            PathBuf::from("/out/small_cat.gif")
        );
    }

    #[test]
    fn test_write_and_size() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("dog.gif");
        fs::write(&source, b"GIF89a-original").unwrap();

        let storage = FsStorage::default();
        assert_eq!(storage.byte_size(&source).unwrap(), 15);
        assert_eq!(storage.read(&source).unwrap(), b"GIF89a-original");

        let written = storage.write(&source, b"GIF89a").unwrap();
        assert_eq!(written, dir.path().join("WeChat_dog.gif"));
        assert_eq!(fs::read(&written).unwrap(), b"GIF89a");
        // The source is never overwritten.
        assert_eq!(fs::read(&source).unwrap(), b"GIF89a-original");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("dog.gif");
        let storage = FsStorage::new(DEFAULT_OUTPUT_PREFIX, None, true);
        let written = storage.write(&source, b"GIF89a").unwrap();
        assert!(!written.exists());
    }

    #[test]
    fn test_output_dir_is_created() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("out");
        let storage = FsStorage::new("", Some(out.clone()), false);
        let written = storage.write(Path::new("in/x.gif"), b"abc").unwrap();
        assert_eq!(written, out.join("x.gif"));
        assert!(written.exists());
    }

    #[test]
    fn test_missing_file_is_stat_failure() {
        let dir = TempDir::new().unwrap();
        let err = FsStorage::default()
            .byte_size(&dir.path().join("nope.gif"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StatFailure);
    }

    #[test]
    fn test_unwritable_target_is_write_failure() {
        let dir = TempDir::new().unwrap();
        // The "output directory" is a regular file, so nothing can be created under it.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let storage = FsStorage::new("", Some(blocker), false);
        let err = storage.write(Path::new("x.gif"), b"abc").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteFailure);
    }
}
