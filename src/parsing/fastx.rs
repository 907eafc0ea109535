//! Line-level reader for FASTA and FASTQ read sets.
//!
//! Input files may be gzip-compressed; compression is detected from the
//! leading magic bytes rather than the file extension, so renamed files
//! still work. The record type is likewise detected from the first byte of
//! the (decompressed) content: `>` for FASTA, `@` for FASTQ.
//!
//! FASTA sequences may span multiple lines. FASTQ records must be exactly
//! four lines; multi-line FASTQ is rejected rather than misparsed.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{}: bzip2 compression is not supported", .0.display())]
    Bzip2(PathBuf),

    #[error("{}: zip compression is not supported", .0.display())]
    Zip(PathBuf),

    #[error("{}: file is neither FASTA nor FASTQ", .0.display())]
    UnknownType(PathBuf),

    #[error("failed to parse read header {0:?}")]
    BadHeader(String),

    #[error("read {name}: multi-line FASTQ records are not supported")]
    MultiLineFastq { name: String },

    #[error("read {name}: truncated FASTQ record")]
    TruncatedFastq { name: String },

    #[error("read name {name:?} contains '/', which collides with the range separator in output headers")]
    SlashInName { name: String },
}

/// A single input read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRecord {
    /// Read name: the header up to the first space.
    pub name: String,
    /// The rest of the header, if any.
    pub comment: Option<String>,
    pub sequence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Fasta,
    Fastq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    Plain,
    Gzip,
    Bzip2,
    Zip,
}

/// Guess the compression (if any) on a file from its first few bytes.
fn detect_compression(path: &Path) -> io::Result<Compression> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 4];
    let mut len = 0;
    while len < magic.len() {
        let n = file.read(&mut magic[len..])?;
        if n == 0 {
            break;
        }
        len += n;
    }

    Ok(if len >= 3 && magic[..3] == [0x1f, 0x8b, 0x08] {
        Compression::Gzip
    } else if len >= 3 && &magic[..3] == b"BZh" {
        Compression::Bzip2
    } else if len >= 4 && &magic[..4] == b"PK\x03\x04" {
        Compression::Zip
    } else {
        Compression::Plain
    })
}

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, FormatError> {
    match detect_compression(path)? {
        Compression::Plain => Ok(Box::new(BufReader::new(File::open(path)?))),
        Compression::Gzip => Ok(Box::new(BufReader::new(GzDecoder::new(File::open(path)?)))),
        Compression::Bzip2 => Err(FormatError::Bzip2(path.to_path_buf())),
        Compression::Zip => Err(FormatError::Zip(path.to_path_buf())),
    }
}

/// Streaming reader over the records of a FASTA or FASTQ file.
pub struct FastxReader {
    reader: Box<dyn BufRead>,
    file_type: FileType,
    /// FASTA only: the next header line, already consumed from the stream.
    pending: Option<String>,
}

impl FastxReader {
    /// Open a read file, detecting compression and record type.
    ///
    /// Returns `Ok(None)` for an empty file: zero records is a valid read
    /// set, not a format error.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] for unreadable files, unsupported
    /// compression, or content that starts with neither `>` nor `@`.
    pub fn open(path: &Path) -> Result<Option<Self>, FormatError> {
        let mut reader = open_reader(path)?;
        let first = {
            let buf = reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(None);
            }
            buf[0]
        };
        let file_type = match first {
            b'>' => FileType::Fasta,
            b'@' => FileType::Fastq,
            _ => return Err(FormatError::UnknownType(path.to_path_buf())),
        };
        Ok(Some(Self {
            reader,
            file_type,
            pending: None,
        }))
    }

    #[must_use]
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    fn next_record(&mut self) -> Result<Option<SeqRecord>, FormatError> {
        match self.file_type {
            FileType::Fasta => self.next_fasta(),
            FileType::Fastq => self.next_fastq(),
        }
    }

    fn next_fasta(&mut self) -> Result<Option<SeqRecord>, FormatError> {
        let header = match self.pending.take() {
            Some(line) => line,
            None => match self.next_non_blank_line()? {
                Some(line) => line,
                None => return Ok(None),
            },
        };
        let Some(text) = header.strip_prefix('>') else {
            return Err(FormatError::BadHeader(header));
        };
        let (name, comment) = split_header(text)?;

        let mut sequence = String::new();
        loop {
            match read_line(&mut self.reader)? {
                None => break,
                Some(line) if line.is_empty() => continue,
                Some(line) if line.starts_with('>') => {
                    self.pending = Some(line);
                    break;
                }
                Some(line) => sequence.push_str(&line),
            }
        }
        Ok(Some(SeqRecord {
            name,
            comment,
            sequence,
        }))
    }

    fn next_fastq(&mut self) -> Result<Option<SeqRecord>, FormatError> {
        let header = match self.next_non_blank_line()? {
            Some(line) => line,
            None => return Ok(None),
        };
        let Some(text) = header.strip_prefix('@') else {
            return Err(FormatError::BadHeader(header));
        };
        let (name, comment) = split_header(text)?;

        let truncated = |name: &str| FormatError::TruncatedFastq {
            name: name.to_string(),
        };
        let sequence = read_line(&mut self.reader)?.ok_or_else(|| truncated(&name))?;
        let plus = read_line(&mut self.reader)?.ok_or_else(|| truncated(&name))?;
        if !plus.starts_with('+') {
            return Err(FormatError::MultiLineFastq { name });
        }
        let quality = read_line(&mut self.reader)?.ok_or_else(|| truncated(&name))?;
        if quality.len() != sequence.len() {
            return Err(FormatError::MultiLineFastq { name });
        }

        Ok(Some(SeqRecord {
            name,
            comment,
            sequence,
        }))
    }

    fn next_non_blank_line(&mut self) -> Result<Option<String>, FormatError> {
        loop {
            match read_line(&mut self.reader)? {
                None => return Ok(None),
                Some(line) if line.is_empty() => continue,
                Some(line) => return Ok(Some(line)),
            }
        }
    }
}

impl Iterator for FastxReader {
    type Item = Result<SeqRecord, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Read one line, stripping the trailing newline (and carriage return).
fn read_line(reader: &mut dyn BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

/// Split header text (without the leading `>`/`@`) into name and comment.
fn split_header(text: &str) -> Result<(String, Option<String>), FormatError> {
    if text.is_empty() {
        return Err(FormatError::BadHeader(text.to_string()));
    }
    Ok(match text.split_once(' ') {
        Some((name, comment)) => (name.to_string(), Some(comment.to_string())),
        None => (text.to_string(), None),
    })
}
