//! Rotating file sink
//!
//! Size-triggered rotation with timestamped backups, bounded backup count,
//! age-based pruning, and optional gzip compression of rotated files.

use chrono::{Local, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::core::{LoggerError, Result, Sink};

const DEFAULT_MAX_MEGABYTES: u64 = 100;
const MEGABYTE: u64 = 1024 * 1024;
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

pub struct RotatingFileSink {
    path: PathBuf,
    max_bytes: u64,
    max_age_days: u32,
    max_backups: usize,
    local_time: bool,
    compress: bool,
    writer: Option<BufWriter<File>>,
    current_size: u64,
}

impl RotatingFileSink {
    /// Open the sink. `max_size_mb == 0` falls back to the 100 MB default;
    /// `max_age_days == 0` and `max_backups == 0` disable the respective
    /// pruning. An empty `file_name` resolves to `duolog.log` in the system
    /// temporary directory.
    pub fn open(
        file_name: &str,
        max_size_mb: u64,
        max_age_days: u32,
        max_backups: usize,
        local_time: bool,
        compress: bool,
    ) -> Result<Self> {
        let path = if file_name.is_empty() {
            std::env::temp_dir().join("duolog.log")
        } else {
            PathBuf::from(file_name)
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    LoggerError::file_sink(
                        path.display().to_string(),
                        format!("failed to create directory '{}': {}", parent.display(), e),
                    )
                })?;
            }
        }

        let file = Self::open_file(&path)?;
        let current_size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_sink(
                    path.display().to_string(),
                    format!("cannot access file metadata: {}", e),
                )
            })?
            .len();

        let max_size_mb = if max_size_mb == 0 {
            DEFAULT_MAX_MEGABYTES
        } else {
            max_size_mb
        };

        Ok(Self {
            path,
            max_bytes: max_size_mb * MEGABYTE,
            max_age_days,
            max_backups,
            local_time,
            compress,
            writer: Some(BufWriter::new(file)),
            current_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_file(path: &Path) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_sink(path.display().to_string(), format!("failed to open: {}", e))
            })
    }

    /// Backup file name for the current rotation instant,
    /// `app-2026-08-05T10-30-45.123.log` next to the live file.
    fn backup_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("duolog");
        let ext = self
            .path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("log");
        let timestamp = if self.local_time {
            Local::now().format(BACKUP_TIME_FORMAT).to_string()
        } else {
            Utc::now().format(BACKUP_TIME_FORMAT).to_string()
        };
        self.path
            .with_file_name(format!("{}-{}.{}", stem, timestamp, ext))
    }

    fn rotate(&mut self) -> Result<()> {
        // Release the handle before renaming the live file
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::rotation(
                    self.path.display().to_string(),
                    format!("failed to flush before rotation: {}", e),
                )
            })?;
        }

        let backup = self.backup_path();
        if self.path.exists() {
            fs::rename(&self.path, &backup).map_err(|e| {
                LoggerError::rotation(
                    self.path.display().to_string(),
                    format!("failed to move current log file: {}", e),
                )
            })?;

            if self.compress {
                self.compress_file(&backup)?;
            }
        }

        self.prune_backups();

        self.writer = Some(BufWriter::new(Self::open_file(&self.path)?));
        self.current_size = 0;
        Ok(())
    }

    /// Replace `path` with a gzip-compressed `path.gz`. The original is only
    /// removed after compression fully succeeds.
    fn compress_file(&self, path: &Path) -> Result<()> {
        let gz_path = PathBuf::from(format!("{}.gz", path.display()));

        let input = File::open(path).map_err(|e| {
            LoggerError::rotation(
                path.display().to_string(),
                format!("failed to open backup for compression: {}", e),
            )
        })?;
        let output = File::create(&gz_path).map_err(|e| {
            LoggerError::rotation(
                gz_path.display().to_string(),
                format!("failed to create compressed backup: {}", e),
            )
        })?;

        let mut encoder = flate2::write::GzEncoder::new(
            BufWriter::new(output),
            flate2::Compression::default(),
        );
        std::io::copy(&mut BufReader::new(input), &mut encoder).map_err(|e| {
            let _ = fs::remove_file(&gz_path);
            LoggerError::rotation(
                path.display().to_string(),
                format!("failed to compress backup: {}", e),
            )
        })?;
        encoder.finish().map_err(|e| {
            let _ = fs::remove_file(&gz_path);
            LoggerError::rotation(
                path.display().to_string(),
                format!("failed to finish compression: {}", e),
            )
        })?;

        fs::remove_file(path).map_err(|e| {
            LoggerError::rotation(
                path.display().to_string(),
                format!("failed to remove uncompressed backup: {}", e),
            )
        })?;
        Ok(())
    }

    /// Delete backups beyond the configured count and older than the
    /// configured age. Pruning failures never abort rotation.
    fn prune_backups(&self) {
        if self.max_backups == 0 && self.max_age_days == 0 {
            return;
        }

        let mut backups = self.list_backups();
        // Newest first; backup names embed the rotation timestamp
        backups.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

        let cutoff = if self.max_age_days > 0 {
            SystemTime::now()
                .checked_sub(Duration::from_secs(u64::from(self.max_age_days) * 24 * 3600))
        } else {
            None
        };

        for (index, backup) in backups.iter().enumerate() {
            let too_many = self.max_backups > 0 && index >= self.max_backups;
            let too_old = cutoff
                .map(|limit| {
                    fs::metadata(backup)
                        .and_then(|m| m.modified())
                        .map(|modified| modified < limit)
                        .unwrap_or(false)
                })
                .unwrap_or(false);

            if too_many || too_old {
                if let Err(e) = fs::remove_file(backup) {
                    eprintln!(
                        "duolog: failed to remove old backup {}: {}",
                        backup.display(),
                        e
                    );
                }
            }
        }
    }

    fn list_backups(&self) -> Vec<PathBuf> {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("duolog");
        let prefix = format!("{}-", stem);

        let Some(parent) = self.path.parent() else {
            return Vec::new();
        };
        let Ok(entries) = fs::read_dir(parent) else {
            return Vec::new();
        };

        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.starts_with(&prefix))
            })
            .collect()
    }
}

impl Sink for RotatingFileSink {
    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if self.current_size + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }

        let writer = self.writer.as_mut().ok_or_else(|| {
            LoggerError::file_sink(self.path.display().to_string(), "writer not open")
        })?;
        writer.write_all(buf)?;
        self.current_size += buf.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Some(ref mut writer) = self.writer {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_append_to_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("app.log");

        let mut sink =
            RotatingFileSink::open(path.to_str().unwrap(), 1, 0, 0, false, false).unwrap();
        sink.write(b"first line\n").unwrap();
        sink.write(b"second line\n").unwrap();
        sink.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first line\nsecond line\n");
    }

    #[test]
    fn test_rotation_moves_current_to_backup() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("app.log");

        let mut sink =
            RotatingFileSink::open(path.to_str().unwrap(), 1, 0, 0, false, false).unwrap();
        let chunk = vec![b'x'; 700 * 1024];
        sink.write(&chunk).unwrap();
        sink.write(&chunk).unwrap(); // exceeds 1 MB, triggers rotation
        sink.flush().unwrap();

        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with("app-"))
            .collect();
        assert_eq!(backups.len(), 1);

        // Live file holds only the post-rotation chunk
        let live = fs::metadata(&path).unwrap().len();
        assert_eq!(live, 700 * 1024);
    }

    #[test]
    fn test_compressed_backup_replaces_plain_one() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("app.log");

        let mut sink =
            RotatingFileSink::open(path.to_str().unwrap(), 1, 0, 0, false, true).unwrap();
        let chunk = vec![b'x'; 700 * 1024];
        sink.write(&chunk).unwrap();
        sink.write(&chunk).unwrap();
        sink.flush().unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("app-"))
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".log.gz"), "got {:?}", names);
    }

    #[test]
    fn test_max_backups_prunes_oldest() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("app.log");

        let mut sink =
            RotatingFileSink::open(path.to_str().unwrap(), 1, 0, 1, false, false).unwrap();
        let chunk = vec![b'x'; 700 * 1024];
        for _ in 0..6 {
            sink.write(&chunk).unwrap();
            // Keep backup names distinct across sub-millisecond rotations
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        sink.flush().unwrap();

        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with("app-"))
            .collect();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn test_empty_file_name_uses_temp_dir_default() {
        let sink = RotatingFileSink::open("", 0, 0, 0, false, false).unwrap();
        assert!(sink.path().starts_with(std::env::temp_dir()));
        assert!(sink.path().ends_with("duolog.log"));
    }
}
