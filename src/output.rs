//! Scoped report file handling
//!
//! Every file the report writes goes through [`ReportFile`]. The handle is
//! released on every exit path: [`ReportFile::finish`] flushes and surfaces
//! errors, while dropping an unfinished handle flushes quietly and only logs.

use crate::error::{ReportError, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Size of the intermediate buffer used when copying streams
pub const COPY_BUFFER_SIZE: usize = 16 * 1024;

/// Absolute form of `path` for error messages
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Create a directory and its parents
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| ReportError::DirectoryCreation {
        path: absolute(path),
        source,
    })
}

/// An open, buffered report file
#[derive(Debug)]
pub struct ReportFile {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl ReportFile {
    /// Open `path` for writing, truncating existing content
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|source| ReportError::FileOpen {
            path: absolute(path),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wrap an I/O failure on this file
    pub fn io_error(&self, source: io::Error) -> ReportError {
        ReportError::Io {
            path: absolute(&self.path),
            source,
        }
    }

    /// Write all of `data`
    pub fn write_all_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.write_all(data).map_err(|e| self.io_error(e))
    }

    /// Flush and close the file
    pub fn finish(mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer
                .into_inner()
                .map_err(|e| ReportError::Io {
                    path: absolute(&self.path),
                    source: e.into_error(),
                })?;
        }
        Ok(())
    }

    fn writer_mut(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::other("report file already closed"))
    }
}

impl Write for ReportFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer_mut()?.flush()
    }
}

impl Drop for ReportFile {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to close report file");
            }
        }
    }
}

/// Write `data` to a new file at `path`
pub fn write_bytes(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = ReportFile::create(path)?;
    file.write_all_bytes(data)?;
    file.finish()
}

/// Copy everything from `reader` into `out` through a fixed-size buffer.
///
/// `source` names the reader in error messages. Both ends are released
/// before returning, whether the copy succeeds or not.
pub fn copy_stream<R: Read>(mut reader: R, source: &Path, mut out: ReportFile) -> Result<u64> {
    let mut buffer = [0u8; COPY_BUFFER_SIZE];
    let mut copied = 0u64;

    loop {
        let len = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(len) => len,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(ReportError::Io {
                    path: source.to_path_buf(),
                    source: e,
                })
            }
        };
        out.write_all_bytes(&buffer[..len])?;
        copied += len as u64;
    }

    out.finish()?;
    Ok(copied)
}
