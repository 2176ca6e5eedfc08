//! JSONL answer log.
//!
//! One [`AnswerRecord`] per line, appended through a buffered writer that is
//! flushed after every record. Reading goes back to the file so a resumed run
//! sees everything written by earlier runs.
//!
//! A run killed mid-write can leave an unterminated last line. Reading skips
//! such a tail when it does not parse, and reopening cuts it off so the next
//! record starts on a fresh line.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};
use triad_application::{AnswerStore, AnswerStoreError};
use triad_domain::AnswerRecord;

/// Append-only answer log that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`; a line is serialized in full
/// before the lock is taken, so concurrent appends never interleave.
pub struct JsonlAnswerLog {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAnswerLog {
    /// Open (or create) the log at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AnswerStoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        Self::repair_tail(path, &mut file)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Read records from an existing log without opening it for writing.
    pub fn read(path: impl AsRef<Path>) -> Result<Vec<AnswerRecord>, AnswerStoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let terminated = content.is_empty() || content.ends_with('\n');
        let lines: Vec<&str> = content.lines().collect();

        let mut records = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) if !terminated && index + 1 == lines.len() => {
                    warn!(
                        "Skipping unterminated last line {} of {}: {}",
                        index + 1,
                        path.display(),
                        e
                    );
                }
                Err(e) => {
                    return Err(AnswerStoreError::Malformed {
                        line: index + 1,
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(records)
    }

    /// Give an unterminated last line its newline when it holds a record,
    /// otherwise cut it off.
    fn repair_tail(path: &Path, file: &mut File) -> Result<(), AnswerStoreError> {
        let content = std::fs::read(path)?;
        if content.is_empty() || content.ends_with(b"\n") {
            return Ok(());
        }

        let start = content
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        if serde_json::from_slice::<AnswerRecord>(&content[start..]).is_ok() {
            file.write_all(b"\n")?;
        } else {
            warn!(
                "Dropping {} bytes of a partly written record at the end of {}",
                content.len() - start,
                path.display()
            );
            file.set_len(start as u64)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AnswerStore for JsonlAnswerLog {
    fn load(&self) -> Result<Vec<AnswerRecord>, AnswerStoreError> {
        if let Ok(mut writer) = self.writer.lock() {
            writer.flush()?;
        }
        Self::read(&self.path)
    }

    fn append(&self, record: &AnswerRecord) -> Result<(), AnswerStoreError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        debug!("Recorded answer for task {}", record.task_id);
        Ok(())
    }
}

impl Drop for JsonlAnswerLog {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use triad_domain::{Task, TaskId};

    #[test]
    fn test_append_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlAnswerLog::open(dir.path().join("run/answers.jsonl")).unwrap();

        log.append(&AnswerRecord::new("1", "42")).unwrap();
        let task = Task::new("2", "q").with_ground_truth("7", "easy");
        log.append(&AnswerRecord::for_task(&task, "7")).unwrap();

        let records = log.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].agent_answer, "42");
        assert_eq!(records[1].score, Some(true));

        let content = std::fs::read_to_string(log.path()).unwrap();
        let first: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(first, serde_json::json!({"task_id": "1", "agent_answer": "42"}));
    }

    #[test]
    fn test_reopen_resumes_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.jsonl");
        {
            let log = JsonlAnswerLog::open(&path).unwrap();
            log.append(&AnswerRecord::new("5", "x")).unwrap();
        }

        let log = JsonlAnswerLog::open(&path).unwrap();
        log.append(&AnswerRecord::new("6", "y")).unwrap();

        let ids = log.completed_ids().unwrap();
        assert_eq!(ids, HashSet::from([TaskId::new("5"), TaskId::new("6")]));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.jsonl");
        std::fs::write(&path, "{\"task_id\": \"1\", \"agent_answer\": \"a\"}\n\nnot json\n").unwrap();

        let err = JsonlAnswerLog::read(&path).unwrap_err();
        assert!(matches!(err, AnswerStoreError::Malformed { line: 3, .. }));
    }

    #[test]
    fn test_truncated_tail_is_skipped_and_resume_continues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.jsonl");
        std::fs::write(
            &path,
            "{\"task_id\": \"1\", \"agent_answer\": \"a\"}\n{\"task_id\": \"2\", \"agent_an",
        )
        .unwrap();

        let records = JsonlAnswerLog::read(&path).unwrap();
        assert_eq!(records.len(), 1);

        let log = JsonlAnswerLog::open(&path).unwrap();
        assert_eq!(log.completed_ids().unwrap(), HashSet::from([TaskId::new("1")]));

        log.append(&AnswerRecord::new("2", "b")).unwrap();
        let records = log.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].agent_answer, "b");
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_unterminated_complete_record_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.jsonl");
        std::fs::write(&path, "{\"task_id\": \"1\", \"agent_answer\": \"a\"}").unwrap();

        let log = JsonlAnswerLog::open(&path).unwrap();
        log.append(&AnswerRecord::new("2", "b")).unwrap();

        let ids = log.completed_ids().unwrap();
        assert_eq!(ids, HashSet::from([TaskId::new("1"), TaskId::new("2")]));
    }

    #[test]
    fn test_concurrent_appends_write_whole_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(JsonlAnswerLog::open(dir.path().join("answers.jsonl")).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let answer = "v".repeat(500);
                        log.append(&AnswerRecord::new(format!("{t}-{i}"), answer))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let records = log.load().unwrap();
        assert_eq!(records.len(), 200);
        assert_eq!(log.completed_ids().unwrap().len(), 200);
    }
}
