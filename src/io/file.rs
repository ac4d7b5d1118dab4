//! Input/Output file handling with [`InputFile`] and [`OutputFile`].
//!
//! These types abstract over reading/writing both plaintext and
//! gzip-compressed input/output.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use crate::error::RegionsError;

/// Check if a file is gzipped by looking for the magic numbers.
fn is_gzipped_file(file_path: impl Into<PathBuf>) -> io::Result<bool> {
    let mut file = File::open(file_path.into())?;
    let mut buffer = [0; 2];
    // files shorter than the magic cannot be gzipped
    if file.read(&mut buffer)? < 2 {
        return Ok(false);
    }
    Ok(buffer == [0x1f, 0x8b])
}

/// Represents an input file.
///
/// This struct abstracts how data is read in, allowing both plaintext and
/// gzip-compressed input to be read through a common interface.
#[derive(Clone, Debug)]
pub struct InputFile {
    pub filepath: PathBuf,
}

impl InputFile {
    /// Constructs a new [`InputFile`]. The file does not have to exist
    /// yet; a missing file surfaces as [`RegionsError::FileNotFound`]
    /// when a reader is requested.
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
        }
    }

    /// Opens the file and returns a buffered reader, transparently
    /// decompressing gzipped input (detected by magic bytes, not
    /// extension).
    pub fn reader(&self) -> Result<BufReader<Box<dyn Read>>, RegionsError> {
        if !self.filepath.exists() {
            return Err(RegionsError::FileNotFound(self.filepath.clone()));
        }
        let is_gzipped = is_gzipped_file(&self.filepath)?;
        let file = File::open(&self.filepath)?;
        let reader: Box<dyn Read> = if is_gzipped {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::new(reader))
    }

    /// Iterate over the file's lines, skipping `#` comment lines.
    pub fn lines(&self) -> Result<impl Iterator<Item = io::Result<String>>, RegionsError> {
        let reader = self.reader()?;
        Ok(reader
            .lines()
            .filter(|line| !matches!(line, Ok(l) if l.starts_with('#'))))
    }
}

enum OutputDestination {
    File(PathBuf),
    Stdout,
}

/// Represents an output file.
///
/// This struct abstracts writing both plaintext and gzip-compressed
/// output; a `.gz` extension turns on compression.
pub struct OutputFile {
    destination: OutputDestination,
}

impl OutputFile {
    /// Constructs a new [`OutputFile`] writing to the supplied path.
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            destination: OutputDestination::File(filepath.into()),
        }
    }

    /// Constructs a new [`OutputFile`] for standard output.
    pub fn new_stdout() -> Self {
        Self {
            destination: OutputDestination::Stdout,
        }
    }

    /// Opens the destination and returns a buffered writer.
    pub fn writer(&self) -> io::Result<Box<dyn Write>> {
        let writer: Box<dyn Write> = match &self.destination {
            OutputDestination::Stdout => Box::new(BufWriter::new(io::stdout())),
            OutputDestination::File(path) => {
                let is_gzip = path.extension().is_some_and(|ext| ext == "gz");
                let file = File::create(path)?;
                if is_gzip {
                    Box::new(BufWriter::new(GzEncoder::new(file, Compression::default())))
                } else {
                    Box::new(BufWriter::new(file))
                }
            }
        };
        Ok(writer)
    }
}
