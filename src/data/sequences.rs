//! Sequence input files
//!
//! Three layouts are accepted:
//! - plain: one sequence per line
//! - labeled: `label<whitespace>sequence` per line
//! - FASTA: `>label` header followed by one or more sequence lines
//!
//! Blank lines and lines starting with `#` are skipped in plain and labeled
//! files.

use crate::core::{KernelError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Layout of a sequence file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFormat {
    Plain,
    Labeled,
    Fasta,
}

impl SequenceFormat {
    /// Guess the layout from the file extension, falling back to the first
    /// meaningful line: a leading `>` means FASTA, otherwise plain
    pub fn detect<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            match ext.to_ascii_lowercase().as_str() {
                "fa" | "fasta" | "faa" | "fna" => return Ok(Self::Fasta),
                "tsv" => return Ok(Self::Labeled),
                _ => {}
            }
        }

        let reader = BufReader::new(File::open(path).map_err(KernelError::IoError)?);
        for line in reader.lines() {
            let line = line.map_err(KernelError::IoError)?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Ok(if line.starts_with('>') {
                Self::Fasta
            } else {
                Self::Plain
            });
        }
        Ok(Self::Plain)
    }
}

/// Sequences read from a file, with their labels if the layout has any
#[derive(Debug, Clone, Default)]
pub struct SequenceFile {
    labels: Option<Vec<String>>,
    sequences: Vec<String>,
}

impl SequenceFile {
    /// Load from a file
    pub fn from_file<P: AsRef<Path>>(path: P, format: SequenceFormat) -> Result<Self> {
        let file = File::open(path).map_err(KernelError::IoError)?;
        Self::from_reader(BufReader::new(file), format)
    }

    /// Load from a reader
    pub fn from_reader<R: BufRead>(reader: R, format: SequenceFormat) -> Result<Self> {
        let parsed = match format {
            SequenceFormat::Plain => Self::read_plain(reader)?,
            SequenceFormat::Labeled => Self::read_labeled(reader)?,
            SequenceFormat::Fasta => Self::read_fasta(reader)?,
        };
        if parsed.sequences.is_empty() {
            return Err(KernelError::EmptyDataset);
        }
        Ok(parsed)
    }

    fn read_plain<R: BufRead>(reader: R) -> Result<Self> {
        let mut sequences = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(KernelError::IoError)?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            sequences.push(line.to_string());
        }
        Ok(Self {
            labels: None,
            sequences,
        })
    }

    fn read_labeled<R: BufRead>(reader: R) -> Result<Self> {
        let mut labels = Vec::new();
        let mut sequences = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(KernelError::IoError)?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (label, sequence) = line
                .split_once(char::is_whitespace)
                .map(|(l, s)| (l, s.trim()))
                .filter(|(_, s)| !s.is_empty())
                .ok_or_else(|| {
                    KernelError::ParseError(format!(
                        "Error parsing line {}: expected label and sequence",
                        line_num + 1
                    ))
                })?;
            labels.push(label.to_string());
            sequences.push(sequence.to_string());
        }
        Ok(Self {
            labels: Some(labels),
            sequences,
        })
    }

    fn read_fasta<R: BufRead>(reader: R) -> Result<Self> {
        let mut labels = Vec::new();
        let mut sequences: Vec<String> = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(KernelError::IoError)?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(header) = line.strip_prefix('>') {
                // First word of the header is the record id
                let label = header.split_whitespace().next().unwrap_or_default();
                labels.push(label.to_string());
                sequences.push(String::new());
            } else {
                let current = sequences.last_mut().ok_or_else(|| {
                    KernelError::ParseError(format!(
                        "Error parsing line {}: sequence data before first header",
                        line_num + 1
                    ))
                })?;
                current.push_str(line);
            }
        }
        Ok(Self {
            labels: Some(labels),
            sequences,
        })
    }

    pub fn sequences(&self) -> &[String] {
        &self.sequences
    }

    /// Labels from the file, if the layout carries them
    pub fn labels(&self) -> Option<&[String]> {
        self.labels.as_deref()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
