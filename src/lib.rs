//! # GRegions
//!
//! GRegions is a library for set algebra over genomic regions: half-open
//! chromosomal intervals carrying strand, name, score, and auxiliary
//! columns. Collections of regions come in two interchangeable backends:
//!
//! 1. [`LinearRegionSet`]: a lazily sorted vector of regions, where every
//!    operation is a sort-and-sweep pass. Cheap to build, best for one-shot
//!    pipelines.
//!
//! 2. [`IntervalTreeRegionSet`]: one augmented interval tree per
//!    chromosome, where overlap queries are pruned by subtree maximum end
//!    positions. Best when the same set is queried repeatedly or operands
//!    are large.
//!
//! Both backends implement the same operations (intersection in three
//! modes, merging, subtraction, extension, deduplication, sampling, and
//! cross-set renaming) and produce identical coordinates for the same
//! inputs. The [`RegionSet`] enum selects a backend at construction time
//! and keeps operands from mixing backends.
//!
//! Chromosome names sort lexicographically throughout, so `"chr10"` sorts
//! before `"chr2"`; the sorted output of every operation follows this
//! order.
//!
//! [`LinearRegionSet`]: crate::set::LinearRegionSet
//! [`IntervalTreeRegionSet`]: crate::set::IntervalTreeRegionSet
//! [`RegionSet`]: crate::set::RegionSet

pub mod commands;
pub mod error;
pub mod io;
pub mod region;
pub mod set;
pub mod test_utilities;

/// The type of a 0-indexed genomic coordinate.
pub type Position = u32;

/// The type of a signed coordinate delta, e.g. an extension amount.
pub type PositionOffset = i64;

pub mod prelude {
    pub use crate::error::RegionsError;
    pub use crate::io::{read_bed, write_bed};
    pub use crate::region::{Region, Strand};
    pub use crate::set::{
        Backend, IntersectMode, IntervalTreeRegionSet, LinearRegionSet, RegionOps, RegionSet,
    };
    pub use crate::{Position, PositionOffset};
}
