use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;

use crate::RotationPolicy;

const COMPRESS_SUFFIX: &str = ".gz";

/// State of the current log file.
#[derive(Debug)]
struct FileState {
    /// The open file handle.
    file: File,
    /// Current size of the file in bytes.
    size: u64,
}

/// A rotated copy of the log file found on disk.
#[derive(Debug)]
struct Backup {
    path: PathBuf,
    timestamp: chrono::DateTime<Utc>,
    compressed: bool,
}

/// A writer that rotates its log file by size and prunes old backups.
///
/// The file is opened lazily on the first write. When a write would push the
/// file past the size limit, the file is renamed to
/// `<stem>-<timestamp>.<ext>` and a fresh one is opened. Backups beyond
/// `max_backups` or older than `max_age_days` are removed afterwards, and the
/// remaining ones are gzipped when `compress` is set.
#[derive(Debug)]
pub struct RotatingWriter {
    /// Path of the active log file.
    path: PathBuf,
    policy: RotationPolicy,
    state: Option<FileState>,
}

impl RotatingWriter {
    /// Create a new rotating writer. The parent directory must already exist.
    pub fn new(path: impl Into<PathBuf>, policy: RotationPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            state: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Split the file name into a backup prefix (`app-`) and extension (`.log`).
    fn name_parts(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        (format!("{}-", stem), ext)
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn backup_path(&self) -> PathBuf {
        let (prefix, ext) = self.name_parts();
        self.dir()
            .join(format!("{}{}{}", prefix, self.policy.backup_timestamp(), ext))
    }

    fn open_append(&self) -> io::Result<FileState> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(FileState { file, size })
    }

    /// Open the existing file if the next write fits, otherwise rotate.
    fn open_existing_or_new(&mut self, write_len: u64) -> io::Result<()> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.len() + write_len <= self.policy.max_size_bytes() => {
                self.state = Some(self.open_append()?);
                Ok(())
            }
            Ok(_) => self.rotate(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.state = Some(self.open_append()?);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Move the current file aside and start a new one.
    fn rotate(&mut self) -> io::Result<()> {
        // Close current file (drop it)
        self.state = None;

        if self.path.exists() {
            fs::rename(&self.path, self.backup_path())?;
        }

        self.state = Some(self.open_append()?);

        // Housekeeping failures never fail the write that triggered them.
        let _ = self.mill();
        Ok(())
    }

    fn list_backups(&self) -> io::Result<Vec<Backup>> {
        let (prefix, ext) = self.name_parts();
        let compressed_ext = format!("{}{}", ext, COMPRESS_SUFFIX);
        let mut backups = Vec::new();

        for entry in fs::read_dir(self.dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };

            let (stamp, compressed) = if let Some(stamp) = rest.strip_suffix(&compressed_ext) {
                (stamp, true)
            } else if let Some(stamp) = rest.strip_suffix(&ext) {
                (stamp, false)
            } else {
                continue;
            };

            if let Some(timestamp) = self.policy.parse_backup_timestamp(stamp) {
                backups.push(Backup {
                    path: entry.path(),
                    timestamp,
                    compressed,
                });
            }
        }

        // Newest first
        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    /// Remove expired backups and compress the rest.
    fn mill(&self) -> io::Result<()> {
        let mut backups = self.list_backups()?;
        let mut remove = Vec::new();

        if self.policy.max_backups > 0 && backups.len() > self.policy.max_backups {
            remove.extend(backups.split_off(self.policy.max_backups));
        }

        let cutoff = i64::try_from(self.policy.max_age_days)
            .ok()
            .filter(|days| *days > 0)
            .and_then(Duration::try_days)
            .and_then(|max_age| Utc::now().checked_sub_signed(max_age));
        if let Some(cutoff) = cutoff {
            let (keep, expired): (Vec<_>, Vec<_>) =
                backups.into_iter().partition(|b| b.timestamp >= cutoff);
            backups = keep;
            remove.extend(expired);
        }

        for backup in &remove {
            fs::remove_file(&backup.path)?;
        }

        if self.policy.compress {
            for backup in backups.iter().filter(|b| !b.compressed) {
                compress_file(&backup.path)?;
            }
        }

        Ok(())
    }
}

/// Gzip `path` into `path.gz`, removing the original only once the archive is complete.
fn compress_file(path: &Path) -> io::Result<()> {
    let gz_path = PathBuf::from(format!("{}{}", path.display(), COMPRESS_SUFFIX));
    let mut input = BufReader::new(File::open(path)?);
    let output = BufWriter::new(File::create(&gz_path)?);
    let mut encoder = GzEncoder::new(output, Compression::default());

    let result = io::copy(&mut input, &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut out| out.flush());
    if let Err(e) = result {
        let _ = fs::remove_file(&gz_path);
        return Err(e);
    }

    fs::remove_file(path)
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let write_len = buf.len() as u64;
        let max_size = self.policy.max_size_bytes();
        if write_len > max_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "write length {} exceeds maximum file size {}",
                    write_len, max_size
                ),
            ));
        }

        match &self.state {
            None => self.open_existing_or_new(write_len)?,
            Some(state) if state.size + write_len > max_size => self.rotate()?,
            Some(_) => {}
        }

        let state = self
            .state
            .as_mut()
            .ok_or_else(|| io::Error::other("Failed to open log file"))?;
        let written = state.file.write(buf)?;
        state.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.state.as_mut() {
            Some(state) => state.file.flush(),
            None => Ok(()),
        }
    }
}
