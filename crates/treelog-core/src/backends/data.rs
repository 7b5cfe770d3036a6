//! Directory-backed log for files

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use crate::diag_debug;
use crate::error::{LogError, LogResult};
use crate::log::{Log, LogFile, LogFileBox};
use crate::types::{FileId, FileMode, Level};

/// Log that stores files in a directory and ignores everything else
///
/// Existing files are never overwritten: opening `plot.png` twice yields
/// `plot.png` and `plot-1.png`. The directory is created on first use.
#[derive(Debug, Clone)]
pub struct DataLog {
    dir: PathBuf,
}

impl DataLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create `filename`, or the first free `stem-N.ext` variant
    fn create_unique(&self, filename: &str) -> LogResult<(PathBuf, File)> {
        let requested = Path::new(filename);
        let mut components = requested.components();
        let plain = matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none();
        if !plain {
            return Err(LogError::backend(format!(
                "data log file names must be plain names, got {:?}",
                filename
            )));
        }
        fs::create_dir_all(&self.dir)?;

        let (stem, ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (filename, None),
        };

        let mut n = 0usize;
        loop {
            let name = match (n, ext) {
                (0, _) => filename.to_string(),
                (n, Some(ext)) => format!("{}-{}.{}", stem, n, ext),
                (n, None) => format!("{}-{}", stem, n),
            };
            let path = self.dir.join(&name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Log for DataLog {
    fn push_context(&self, _title: &str) -> LogResult<()> {
        Ok(())
    }

    fn pop_context(&self) -> LogResult<()> {
        Ok(())
    }

    fn write(&self, _text: &str, _level: Level) -> LogResult<()> {
        Ok(())
    }

    fn open(
        &self,
        filename: &str,
        _mode: FileMode,
        _level: Level,
        _id: Option<&FileId>,
    ) -> LogResult<LogFileBox<'_>> {
        let (path, file) = self.create_unique(filename)?;
        diag_debug!("writing {}", path.display());
        Ok(Box::new(DataFile {
            writer: Some(BufWriter::new(file)),
        }))
    }
}

struct DataFile {
    writer: Option<BufWriter<File>>,
}

impl io::Write for DataFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.writer {
            Some(writer) => writer.write(buf),
            None => Err(io::Error::new(io::ErrorKind::Other, "write to a closed log file")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.writer {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl LogFile for DataFile {
    fn close(&mut self) -> LogResult<bool> {
        match self.writer.take() {
            Some(mut writer) => {
                writer.flush()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Drop for DataFile {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
