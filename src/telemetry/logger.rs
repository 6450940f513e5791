//! Rotating JSONL writer for pose records

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::types::PoseRecord;
use crate::config::TelemetryConfig;
use crate::error::{JoycamError, Result};

const FILE_PREFIX: &str = "pose_";
const FILE_EXTENSION: &str = "jsonl";

/// Writes pose records as JSON Lines, starting a new file every
/// `max_records_per_file` records and deleting the oldest beyond
/// `max_files_to_keep`.
pub struct PoseLogger {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    files: VecDeque<PathBuf>,
    sequence: u32,
}

impl PoseLogger {
    /// Creates the log directory if needed and picks up trace files left
    /// by earlier runs so they count toward the retention limit.
    ///
    /// # Errors
    ///
    /// Returns [`JoycamError::Io`] if the directory cannot be created or read.
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        Self::with_limits(
            &config.log_dir,
            config.max_records_per_file,
            config.max_files_to_keep,
        )
    }

    /// Same as [`PoseLogger::new`] with explicit limits.
    pub fn with_limits<P: AsRef<Path>>(
        dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let files = existing_trace_files(&dir)?;
        if !files.is_empty() {
            debug!("Found {} existing pose trace files in {}", files.len(), dir.display());
        }

        info!("Pose trace enabled in {}", dir.display());

        Ok(Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            records_in_file: 0,
            files,
            sequence: 0,
        })
    }

    /// Appends one record, rotating first when the current file is full.
    ///
    /// # Errors
    ///
    /// Returns [`JoycamError::Telemetry`] if the record cannot be serialized
    /// and [`JoycamError::Io`] if it cannot be written.
    pub fn log(&mut self, record: &PoseRecord) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let line = serde_json::to_string(record)
            .map_err(|e| JoycamError::Telemetry(format!("Failed to serialize record: {}", e)))?;

        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
            self.records_in_file += 1;
        }
        Ok(())
    }

    /// Flushes buffered records to disk.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// File currently being written, if any.
    pub fn current_file(&self) -> Option<&Path> {
        self.writer.as_ref().and(self.files.back().map(PathBuf::as_path))
    }

    /// Trace files on disk, oldest first.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    fn rotate(&mut self) -> Result<()> {
        self.flush()?;

        let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let (path, file) = self.create_trace_file(&stamp)?;
        debug!("Pose trace rotated to {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;
        self.files.push_back(path);
        self.prune();
        Ok(())
    }

    /// Creates the next unused `pose_<stamp>_<seq>.jsonl`. Names left by an
    /// earlier run in the same second are skipped, never reopened.
    fn create_trace_file(&mut self, stamp: &str) -> Result<(PathBuf, File)> {
        loop {
            let name = format!(
                "{}{}_{:04}.{}",
                FILE_PREFIX, stamp, self.sequence, FILE_EXTENSION
            );
            self.sequence = self.sequence.wrapping_add(1);
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn prune(&mut self) {
        while self.files.len() > self.max_files_to_keep {
            let Some(oldest) = self.files.pop_front() else {
                break;
            };
            match fs::remove_file(&oldest) {
                Ok(()) => debug!("Removed old pose trace {}", oldest.display()),
                Err(e) => warn!("Failed to remove old pose trace {}: {}", oldest.display(), e),
            }
        }
    }
}

impl Drop for PoseLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush pose trace: {}", e);
        }
    }
}

/// Trace files already in `dir`, sorted oldest first by name.
fn existing_trace_files(dir: &Path) -> Result<VecDeque<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_trace_file(path))
        .collect();
    files.sort();
    Ok(files.into())
}

fn is_trace_file(path: &Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(FILE_PREFIX));
    let ext_matches = path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION);
    name_matches && ext_matches && path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraState;
    use nalgebra::Vector3;
    use tempfile::TempDir;

    fn record(tick: u64) -> PoseRecord {
        let camera = CameraState::looking_at_origin(Vector3::new(-30.0, 0.0, 70.0), Vector3::y());
        PoseRecord::new(tick, &camera)
    }

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("logs");

        let _logger = PoseLogger::with_limits(&dir, 10, 2).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_no_file_until_first_record() {
        let temp = TempDir::new().unwrap();
        let logger = PoseLogger::with_limits(temp.path(), 10, 2).unwrap();
        assert!(logger.current_file().is_none());
        assert_eq!(logger.files().count(), 0);
    }

    #[test]
    fn test_writes_one_record_per_line() {
        let temp = TempDir::new().unwrap();
        let mut logger = PoseLogger::with_limits(temp.path(), 10, 2).unwrap();

        for tick in 0..3 {
            logger.log(&record(tick)).unwrap();
        }
        logger.flush().unwrap();

        let path = logger.current_file().unwrap().to_path_buf();
        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);

        let parsed: PoseRecord = serde_json::from_str(&lines[2]).unwrap();
        assert_eq!(parsed.tick, 2);
        assert_eq!(parsed.position, [-30.0, 0.0, 70.0]);
    }

    #[test]
    fn test_rotates_after_max_records() {
        let temp = TempDir::new().unwrap();
        let mut logger = PoseLogger::with_limits(temp.path(), 2, 10).unwrap();

        for tick in 0..5 {
            logger.log(&record(tick)).unwrap();
        }
        logger.flush().unwrap();

        let files: Vec<PathBuf> = logger.files().map(Path::to_path_buf).collect();
        assert_eq!(files.len(), 3);
        assert_eq!(read_lines(&files[0]).len(), 2);
        assert_eq!(read_lines(&files[1]).len(), 2);
        assert_eq!(read_lines(&files[2]).len(), 1);
    }

    #[test]
    fn test_keeps_only_newest_files() {
        let temp = TempDir::new().unwrap();
        let mut logger = PoseLogger::with_limits(temp.path(), 1, 2).unwrap();

        for tick in 0..5 {
            logger.log(&record(tick)).unwrap();
        }
        logger.flush().unwrap();

        let files: Vec<PathBuf> = logger.files().map(Path::to_path_buf).collect();
        assert_eq!(files.len(), 2);
        assert_eq!(existing_trace_files(temp.path()).unwrap().len(), 2);

        let last: PoseRecord = serde_json::from_str(&read_lines(&files[1])[0]).unwrap();
        assert_eq!(last.tick, 4);
    }

    #[test]
    fn test_existing_files_count_toward_retention() {
        let temp = TempDir::new().unwrap();
        let stale = temp.path().join("pose_20000101_000000_0000.jsonl");
        fs::write(&stale, "{}\n").unwrap();
        let unrelated = temp.path().join("notes.txt");
        fs::write(&unrelated, "keep me").unwrap();

        let mut logger = PoseLogger::with_limits(temp.path(), 10, 1).unwrap();
        logger.log(&record(0)).unwrap();

        assert!(!stale.exists());
        assert!(unrelated.exists());
        assert_eq!(logger.files().count(), 1);
    }

    #[test]
    fn test_skips_names_taken_by_an_earlier_run() {
        let temp = TempDir::new().unwrap();
        let taken = temp.path().join("pose_20240101_000000_0000.jsonl");
        fs::write(&taken, "{\"tick\":1}\n").unwrap();

        let mut logger = PoseLogger::with_limits(temp.path(), 10, 1).unwrap();
        let (path, _file) = logger.create_trace_file("20240101_000000").unwrap();

        assert_eq!(path, temp.path().join("pose_20240101_000000_0001.jsonl"));
        assert_eq!(fs::read_to_string(&taken).unwrap(), "{\"tick\":1}\n");
    }

    #[test]
    fn test_back_to_back_runs_keep_current_file() {
        let temp = TempDir::new().unwrap();

        let first_path = {
            let mut first = PoseLogger::with_limits(temp.path(), 10, 1).unwrap();
            first.log(&record(0)).unwrap();
            first.current_file().unwrap().to_path_buf()
        };

        let mut second = PoseLogger::with_limits(temp.path(), 10, 1).unwrap();
        second.log(&record(1)).unwrap();
        second.flush().unwrap();

        let current = second.current_file().unwrap().to_path_buf();
        assert_ne!(current, first_path);
        assert!(current.exists());
        assert_eq!(second.files().count(), 1);
        assert_eq!(read_lines(&current).len(), 1);
    }

    #[test]
    fn test_drop_flushes() {
        let temp = TempDir::new().unwrap();
        let path = {
            let mut logger = PoseLogger::with_limits(temp.path(), 10, 2).unwrap();
            logger.log(&record(9)).unwrap();
            logger.current_file().unwrap().to_path_buf()
        };
        assert_eq!(read_lines(&path).len(), 1);
    }

    #[test]
    fn test_new_from_config() {
        let temp = TempDir::new().unwrap();
        let config = TelemetryConfig {
            enabled: true,
            log_dir: temp.path().to_string_lossy().to_string(),
            max_records_per_file: 5,
            max_files_to_keep: 3,
            log_interval_ticks: 1,
            format: "jsonl".to_string(),
        };

        let logger = PoseLogger::new(&config).unwrap();
        assert_eq!(logger.max_records_per_file, 5);
        assert_eq!(logger.max_files_to_keep, 3);
    }
}
