use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::TranscriptError;
use crate::transcript::record::{TranscriptParseError, TranscriptRecord};

/// Append-only transcript writer.
///
/// Contract: each [`TranscriptWriter::append`] writes exactly one line and
/// flushes it before returning, so an interrupted run leaves a transcript
/// that is complete up to the last applied move.
pub struct TranscriptWriter {
    path: PathBuf,
    w: BufWriter<File>,
    records: usize,
}

impl TranscriptWriter {
    /// Create (or truncate) the transcript at `path`, creating parent directories.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, TranscriptError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source| TranscriptError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = File::create(&path).map_err(io_err)?;
        Ok(TranscriptWriter {
            w: BufWriter::new(file),
            path,
            records: 0,
        })
    }

    pub fn append(&mut self, record: &TranscriptRecord) -> Result<(), TranscriptError> {
        writeln!(self.w, "{}", record.to_line())
            .and_then(|_| self.w.flush())
            .map_err(|source| TranscriptError::Io {
                path: self.path.clone(),
                source,
            })?;
        self.records += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended through this writer.
    pub fn records_written(&self) -> usize {
        self.records
    }
}

/// A malformed line that was skipped during a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the file
    pub line_number: usize,
    pub error: TranscriptParseError,
}

/// Parsed transcript contents, in file order.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub records: Vec<TranscriptRecord>,
    pub skipped: Vec<SkippedLine>,
}

impl Transcript {
    /// Parse transcript text. Blank lines are ignored; malformed lines are
    /// logged and collected instead of failing the load.
    pub fn parse(text: &str) -> Transcript {
        let mut transcript = Transcript::default();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match TranscriptRecord::parse_line(line) {
                Ok(record) => transcript.records.push(record),
                Err(error) => {
                    log::warn!("Skipping invalid transcript line {}: {}", i + 1, error);
                    transcript.skipped.push(SkippedLine {
                        line_number: i + 1,
                        error,
                    });
                }
            }
        }
        transcript
    }

    /// Number of distinct episodes present.
    pub fn episode_count(&self) -> usize {
        let mut episodes: Vec<usize> = self.records.iter().map(|r| r.episode).collect();
        episodes.dedup();
        episodes.len()
    }
}

/// Load a transcript file. Only I/O failures are errors.
pub fn read_transcript(path: impl AsRef<Path>) -> Result<Transcript, TranscriptError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| TranscriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Transcript::parse(&String::from_utf8_lossy(&bytes)))
}
