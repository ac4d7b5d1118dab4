//! Command implementations for the `gregions` command line tool.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    error::RegionsError,
    io::{read_bed, write_bed, OutputFile},
    set::{Backend, IntersectMode, RegionSet},
    PositionOffset,
};

fn output_for(path: Option<&PathBuf>) -> OutputFile {
    path.map_or_else(OutputFile::new_stdout, OutputFile::new)
}

fn set_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "regions".to_string(), |s| s.to_string_lossy().into_owned())
}

fn load_set(path: &PathBuf, backend: Backend) -> Result<RegionSet, RegionsError> {
    let regions = read_bed(path)?;
    Ok(RegionSet::from_regions(set_name(path), backend, regions))
}

/// Intersect two BED-like files under the given mode.
pub fn regions_intersect(
    left: &PathBuf,
    right: &PathBuf,
    mode: IntersectMode,
    remove_duplicates: bool,
    backend: Backend,
    output: Option<&PathBuf>,
) -> Result<(), RegionsError> {
    let left_set = load_set(left, backend)?;
    let right_set = load_set(right, backend)?;
    let result = left_set.intersect(&right_set, mode, remove_duplicates)?;
    write_bed(result.iter_regions(), &output_for(output))
}

/// Merge overlapping or abutting regions in a BED-like file.
pub fn regions_merge(
    bedfile: &PathBuf,
    strand_aware: bool,
    backend: Backend,
    output: Option<&PathBuf>,
) -> Result<(), RegionsError> {
    let set = load_set(bedfile, backend)?;
    let merged = set.merge_overlaps(strand_aware);
    write_bed(merged.iter_regions(), &output_for(output))
}

/// Subtract the regions of one BED-like file from another, fragmenting
/// where the subtrahend punches holes.
pub fn regions_subtract(
    left: &PathBuf,
    right: &PathBuf,
    strand_aware: bool,
    backend: Backend,
    output: Option<&PathBuf>,
) -> Result<(), RegionsError> {
    let left_set = load_set(left, backend)?;
    let right_set = load_set(right, backend)?;
    let result = left_set.subtract(&right_set, strand_aware)?;
    write_bed(result.iter_regions(), &output_for(output))
}

/// Extend every region by fixed basepair amounts, or by fractions of each
/// region's width when `fold` is set.
#[allow(clippy::too_many_arguments)]
pub fn regions_extend(
    bedfile: &PathBuf,
    upstream: f64,
    downstream: f64,
    fold: bool,
    strand_aware: bool,
    backend: Backend,
    output: Option<&PathBuf>,
) -> Result<(), RegionsError> {
    let mut set = load_set(bedfile, backend)?;
    if fold {
        set.extend_fold(upstream, downstream, strand_aware)?;
    } else {
        set.extend(
            upstream.round() as PositionOffset,
            downstream.round() as PositionOffset,
            strand_aware,
        )?;
    }
    write_bed(set.iter_regions(), &output_for(output))
}

/// Uniformly sample regions without replacement; a fixed seed makes the
/// sample reproducible.
pub fn regions_sample(
    bedfile: &PathBuf,
    size: usize,
    seed: Option<u64>,
    backend: Backend,
    output: Option<&PathBuf>,
) -> Result<(), RegionsError> {
    let set = load_set(bedfile, backend)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let sampled = set.sample(size, &mut rng)?;
    write_bed(sampled.iter_regions(), &output_for(output))
}

/// Remove structural duplicates from a BED-like file and sort the result.
pub fn regions_dedup(
    bedfile: &PathBuf,
    backend: Backend,
    output: Option<&PathBuf>,
) -> Result<(), RegionsError> {
    let mut set = load_set(bedfile, backend)?;
    set.remove_duplicates(true);
    write_bed(set.iter_regions(), &output_for(output))
}
