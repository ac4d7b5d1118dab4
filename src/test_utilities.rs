//! Test cases and test utility functions.
//!

use rand::{thread_rng, Rng};

use crate::{
    region::{Region, Strand},
    set::{IntervalTreeRegionSet, LinearRegionSet, RegionOps},
    Position,
};

// Stochastic test ranges defaults
//
// The tradeoff is catching stochastic errors vs test time.
pub const NRANDOM_REGIONS: usize = 1000;

// region length
pub const MIN_LEN: Position = 1;
pub const MAX_LEN: Position = 1000;

// number of chromosome sequences
pub const NCHROM: usize = 4;

// coordinate space per chromosome; small enough that random regions
// overlap often
pub const CHROM_LEN: Position = 100_000;

/// Shorthand for an unnamed region; panics on invalid coordinates, which
/// in tests is the point.
pub fn region(seqname: &str, start: Position, end: Position) -> Region {
    Region::new(seqname, start, end).unwrap()
}

/// Shorthand for a named region.
pub fn named_region(seqname: &str, start: Position, end: Position, name: &str) -> Region {
    region(seqname, start, end).with_name(name)
}

/// Build a random region start/end within a sequence of `chrom_len`.
/// 0-indexed, right exclusive.
pub fn random_coords(chrom_len: Position) -> (Position, Position) {
    let mut rng = thread_rng();
    let len = rng.gen_range(MIN_LEN..MAX_LEN);
    let start = rng.gen_range(0..chrom_len - len + 1);
    (start, start + len)
}

/// Sample a random chromosome name.
pub fn random_chrom() -> String {
    let mut rng = thread_rng();
    format!("chr{}", rng.gen_range(1..NCHROM + 1))
}

/// Sample a random strand.
pub fn random_strand() -> Strand {
    let mut rng = thread_rng();
    match rng.gen_range(0..3) {
        0 => Strand::Forward,
        1 => Strand::Reverse,
        _ => Strand::Unknown,
    }
}

/// Build a random region with a random strand.
pub fn random_region() -> Region {
    let (start, end) = random_coords(CHROM_LEN);
    region(&random_chrom(), start, end).with_strand(random_strand())
}

/// Build `n` random regions.
pub fn random_regions(n: usize) -> Vec<Region> {
    (0..n).map(|_| random_region()).collect()
}

/// A small fixed [`LinearRegionSet`] spanning two chromosomes.
pub fn linear_test_case_01() -> LinearRegionSet {
    let mut set = LinearRegionSet::new("case_01");
    set.add(named_region("chr1", 100, 500, "f1").with_strand(Strand::Forward));
    set.add(named_region("chr1", 400, 700, "f2").with_strand(Strand::Reverse));
    set.add(named_region("chr1", 900, 1500, "f3").with_strand(Strand::Forward));
    set.add(named_region("chr2", 100, 600, "f4").with_strand(Strand::Forward));
    set.add(named_region("chr2", 2000, 2500, "f5"));
    set
}

/// A [`LinearRegionSet`] whose regions merge to two runs strand-naive and
/// three runs strand-aware.
pub fn linear_test_case_02() -> LinearRegionSet {
    let mut set = LinearRegionSet::new("case_02");
    set.add(region("chr1", 0, 1000).with_strand(Strand::Forward));
    set.add(region("chr1", 200, 800).with_strand(Strand::Reverse));
    set.add(region("chr1", 2000, 3000).with_strand(Strand::Forward));
    set
}

/// A small fixed [`IntervalTreeRegionSet`] spanning two chromosomes.
pub fn tree_test_case_01() -> IntervalTreeRegionSet {
    let mut set = IntervalTreeRegionSet::new("tree_case_01");
    set.add(named_region("chr1", 100, 200, "r1"));
    set.add(named_region("chr1", 400, 500, "r2"));
    set.add(named_region("chr2", 100, 300, "r3"));
    set
}
