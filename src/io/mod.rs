//! Reading and writing BED-like region files.

pub mod bed;
pub mod file;

pub use bed::{parse_bed_line, read_bed, write_bed};
pub use file::{InputFile, OutputFile};
