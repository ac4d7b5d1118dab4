//! Region set containers and set algebra.
//!
//! Two backends implement the same contract, [`RegionOps`]:
//! [`LinearRegionSet`] (sorted-vector sweeps) and [`IntervalTreeRegionSet`]
//! (per-chromosome augmented interval trees). [`RegionSet`] wraps the two
//! behind a runtime [`Backend`] choice and refuses cross-backend operands.

use std::str::FromStr;

use rand::Rng;

use crate::{
    error::RegionsError,
    region::Region,
    PositionOffset,
};

pub mod linear;
pub(crate) mod operations;
pub mod tree;

pub use linear::LinearRegionSet;
pub use tree::IntervalTreeRegionSet;

/// Which concrete region-set implementation backs a [`RegionSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Linear,
    Tree,
}

impl FromStr for Backend {
    type Err = RegionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Backend::Linear),
            "tree" => Ok(Backend::Tree),
            _ => Err(RegionsError::UnknownBackend(s.to_string())),
        }
    }
}

/// The semantics of an intersection between two region sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntersectMode {
    /// Merge both operands, then emit every pairwise overlap clipped to
    /// `[max(starts), min(ends))`.
    Overlap,
    /// Emit each left region, unmodified, at most once, if it overlaps at
    /// least one right region.
    Original,
    /// Emit each left region, unmodified, if it is completely contained in
    /// at least one right region.
    CompIncl,
}

impl FromStr for IntersectMode {
    type Err = RegionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overlap" => Ok(IntersectMode::Overlap),
            "original" => Ok(IntersectMode::Original),
            "comp-incl" | "comp_incl" => Ok(IntersectMode::CompIncl),
            _ => Err(RegionsError::UnknownIntersectMode(s.to_string())),
        }
    }
}

/// The operations every region-set backend provides.
///
/// Binary operations take a target of the *same* backend; mixing backends
/// is only possible through [`RegionSet`], which rejects it. Operations
/// that need sorted operands sort an internal copy unless they
/// mutate the receiver in place.
pub trait RegionOps: Sized {
    /// The collection label.
    fn set_name(&self) -> &str;

    /// The number of regions in the set.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a region to the set.
    fn add(&mut self, region: Region);

    /// Iterate over the regions in the set's current order.
    fn iter_regions(&self) -> Box<dyn Iterator<Item = &Region> + '_>;

    /// Clone the regions out in the set's current order.
    fn to_regions(&self) -> Vec<Region> {
        self.iter_regions().cloned().collect()
    }

    /// All sequence names in region order; with `unique`, the first
    /// occurrence of each.
    fn seqnames(&self, unique: bool) -> Vec<String>;

    /// All region names in region order, falling back to the
    /// `seqname:start-end` form for nameless regions; with `unique`, the
    /// first occurrence of each.
    fn names(&self, unique: bool) -> Vec<String>;

    /// Return the minimal non-overlapping cover of this set: overlapping
    /// or abutting regions (per strand, if `strand_aware`) coalesce into
    /// single spanning regions.
    fn merge_overlaps(&self, strand_aware: bool) -> Self;

    /// In-place [`RegionOps::merge_overlaps`].
    fn merge_overlaps_in_place(&mut self, strand_aware: bool);

    /// Intersect this set against `target` under the given
    /// [`IntersectMode`]. With `remove_duplicates`, the result is
    /// deduplicated structurally and sorted. Either operand being empty
    /// yields an empty result.
    fn intersect(&self, target: &Self, mode: IntersectMode, remove_duplicates: bool) -> Self;

    /// Remove the union of all overlapping `target` intervals (optionally
    /// strand-matched) from each region, fragmenting regions where targets
    /// punch holes in them. Regions without overlap pass through; fully
    /// covered regions disappear.
    fn subtract(&self, target: &Self, strand_aware: bool) -> Self;

    /// In-place [`RegionOps::subtract`].
    fn subtract_in_place(&mut self, target: &Self, strand_aware: bool);

    /// For each region, adopt the name of the first (in sorted order)
    /// overlapping `target` region; regions without overlap keep their
    /// name. A nameless target contributes its `seqname:start-end` form.
    fn rename_by_overlap(&mut self, target: &Self);

    /// Remove structural duplicates, keeping the first occurrence of each
    /// region; with `sort`, the survivors are re-sorted.
    fn remove_duplicates(&mut self, sort: bool);

    /// Uniformly sample `size` regions without replacement. The caller
    /// supplies the random source, so sampling is reproducible under a
    /// seeded generator.
    fn sample<R: Rng>(&self, size: usize, rng: &mut R) -> Result<Self, RegionsError>;

    /// Return a set with every region extended; see [`Region::extended`].
    /// No region is modified if any extension fails.
    fn extended(
        &self,
        upstream: PositionOffset,
        downstream: PositionOffset,
        strand_aware: bool,
    ) -> Result<Self, RegionsError>;

    /// In-place [`RegionOps::extended`].
    fn extend(
        &mut self,
        upstream: PositionOffset,
        downstream: PositionOffset,
        strand_aware: bool,
    ) -> Result<(), RegionsError>;

    /// Return a set with every region extended by fractions of its own
    /// width; see [`Region::extended_fold`].
    fn extended_fold(
        &self,
        upstream: f64,
        downstream: f64,
        strand_aware: bool,
    ) -> Result<Self, RegionsError>;

    /// In-place [`RegionOps::extended_fold`].
    fn extend_fold(
        &mut self,
        upstream: f64,
        downstream: f64,
        strand_aware: bool,
    ) -> Result<(), RegionsError>;
}

/// A region set with its backend chosen at construction time.
///
/// This is the construction surface callers should reach for: it keeps the
/// backend choice a runtime value (e.g. from a command line flag) while the
/// concrete containers stay separate types. Binary operations between
/// differently backed sets fail with
/// [`RegionsError::MismatchedImplementation`] rather than silently
/// converting.
#[derive(Clone, Debug)]
pub enum RegionSet {
    Linear(LinearRegionSet),
    Tree(IntervalTreeRegionSet),
}

macro_rules! delegate {
    ($self:expr, $set:ident => $body:expr) => {
        match $self {
            RegionSet::Linear($set) => $body,
            RegionSet::Tree($set) => $body,
        }
    };
}

impl RegionSet {
    /// Create an empty region set backed by `backend`.
    pub fn new(name: impl Into<String>, backend: Backend) -> Self {
        match backend {
            Backend::Linear => RegionSet::Linear(LinearRegionSet::new(name)),
            Backend::Tree => RegionSet::Tree(IntervalTreeRegionSet::new(name)),
        }
    }

    /// Create an empty region set from a backend name (`"linear"` or
    /// `"tree"`), e.g. straight from a configuration value.
    pub fn create(name: impl Into<String>, implementation: &str) -> Result<Self, RegionsError> {
        Ok(Self::new(name, implementation.parse()?))
    }

    /// Create a region set backed by `backend` from loaded regions.
    pub fn from_regions(
        name: impl Into<String>,
        backend: Backend,
        regions: Vec<Region>,
    ) -> Self {
        match backend {
            Backend::Linear => RegionSet::Linear(LinearRegionSet::from_regions(name, regions)),
            Backend::Tree => RegionSet::Tree(IntervalTreeRegionSet::from_regions(name, regions)),
        }
    }

    /// Which backend this set uses.
    pub fn backend(&self) -> Backend {
        match self {
            RegionSet::Linear(_) => Backend::Linear,
            RegionSet::Tree(_) => Backend::Tree,
        }
    }

    pub fn set_name(&self) -> &str {
        delegate!(self, set => set.set_name())
    }

    pub fn len(&self) -> usize {
        delegate!(self, set => set.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add(&mut self, region: Region) {
        delegate!(self, set => set.add(region))
    }

    pub fn iter_regions(&self) -> Box<dyn Iterator<Item = &Region> + '_> {
        delegate!(self, set => set.iter_regions())
    }

    pub fn to_regions(&self) -> Vec<Region> {
        delegate!(self, set => set.to_regions())
    }

    pub fn seqnames(&self, unique: bool) -> Vec<String> {
        delegate!(self, set => set.seqnames(unique))
    }

    pub fn names(&self, unique: bool) -> Vec<String> {
        delegate!(self, set => set.names(unique))
    }

    pub fn merge_overlaps(&self, strand_aware: bool) -> Self {
        match self {
            RegionSet::Linear(set) => RegionSet::Linear(set.merge_overlaps(strand_aware)),
            RegionSet::Tree(set) => RegionSet::Tree(set.merge_overlaps(strand_aware)),
        }
    }

    pub fn merge_overlaps_in_place(&mut self, strand_aware: bool) {
        delegate!(self, set => set.merge_overlaps_in_place(strand_aware))
    }

    pub fn intersect(
        &self,
        target: &RegionSet,
        mode: IntersectMode,
        remove_duplicates: bool,
    ) -> Result<RegionSet, RegionsError> {
        match (self, target) {
            (RegionSet::Linear(set), RegionSet::Linear(other)) => Ok(RegionSet::Linear(
                set.intersect(other, mode, remove_duplicates),
            )),
            (RegionSet::Tree(set), RegionSet::Tree(other)) => Ok(RegionSet::Tree(
                set.intersect(other, mode, remove_duplicates),
            )),
            _ => Err(RegionsError::MismatchedImplementation),
        }
    }

    pub fn subtract(
        &self,
        target: &RegionSet,
        strand_aware: bool,
    ) -> Result<RegionSet, RegionsError> {
        match (self, target) {
            (RegionSet::Linear(set), RegionSet::Linear(other)) => {
                Ok(RegionSet::Linear(set.subtract(other, strand_aware)))
            }
            (RegionSet::Tree(set), RegionSet::Tree(other)) => {
                Ok(RegionSet::Tree(set.subtract(other, strand_aware)))
            }
            _ => Err(RegionsError::MismatchedImplementation),
        }
    }

    pub fn subtract_in_place(
        &mut self,
        target: &RegionSet,
        strand_aware: bool,
    ) -> Result<(), RegionsError> {
        match (self, target) {
            (RegionSet::Linear(set), RegionSet::Linear(other)) => {
                set.subtract_in_place(other, strand_aware);
                Ok(())
            }
            (RegionSet::Tree(set), RegionSet::Tree(other)) => {
                set.subtract_in_place(other, strand_aware);
                Ok(())
            }
            _ => Err(RegionsError::MismatchedImplementation),
        }
    }

    pub fn rename_by_overlap(&mut self, target: &RegionSet) -> Result<(), RegionsError> {
        match (self, target) {
            (RegionSet::Linear(set), RegionSet::Linear(other)) => {
                set.rename_by_overlap(other);
                Ok(())
            }
            (RegionSet::Tree(set), RegionSet::Tree(other)) => {
                set.rename_by_overlap(other);
                Ok(())
            }
            _ => Err(RegionsError::MismatchedImplementation),
        }
    }

    pub fn remove_duplicates(&mut self, sort: bool) {
        delegate!(self, set => set.remove_duplicates(sort))
    }

    pub fn sample<R: Rng>(&self, size: usize, rng: &mut R) -> Result<RegionSet, RegionsError> {
        match self {
            RegionSet::Linear(set) => Ok(RegionSet::Linear(set.sample(size, rng)?)),
            RegionSet::Tree(set) => Ok(RegionSet::Tree(set.sample(size, rng)?)),
        }
    }

    pub fn extended(
        &self,
        upstream: PositionOffset,
        downstream: PositionOffset,
        strand_aware: bool,
    ) -> Result<Self, RegionsError> {
        match self {
            RegionSet::Linear(set) => {
                Ok(RegionSet::Linear(set.extended(upstream, downstream, strand_aware)?))
            }
            RegionSet::Tree(set) => {
                Ok(RegionSet::Tree(set.extended(upstream, downstream, strand_aware)?))
            }
        }
    }

    pub fn extend(
        &mut self,
        upstream: PositionOffset,
        downstream: PositionOffset,
        strand_aware: bool,
    ) -> Result<(), RegionsError> {
        delegate!(self, set => set.extend(upstream, downstream, strand_aware))
    }

    pub fn extended_fold(
        &self,
        upstream: f64,
        downstream: f64,
        strand_aware: bool,
    ) -> Result<Self, RegionsError> {
        match self {
            RegionSet::Linear(set) => {
                Ok(RegionSet::Linear(set.extended_fold(upstream, downstream, strand_aware)?))
            }
            RegionSet::Tree(set) => {
                Ok(RegionSet::Tree(set.extended_fold(upstream, downstream, strand_aware)?))
            }
        }
    }

    pub fn extend_fold(
        &mut self,
        upstream: f64,
        downstream: f64,
        strand_aware: bool,
    ) -> Result<(), RegionsError> {
        delegate!(self, set => set.extend_fold(upstream, downstream, strand_aware))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utilities::named_region;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("linear".parse::<Backend>().unwrap(), Backend::Linear);
        assert_eq!("tree".parse::<Backend>().unwrap(), Backend::Tree);
        assert!(matches!(
            "btree".parse::<Backend>(),
            Err(RegionsError::UnknownBackend(_))
        ));
    }

    #[test]
    fn test_intersect_mode_from_str() {
        assert_eq!(
            "OVERLAP".parse::<IntersectMode>().unwrap(),
            IntersectMode::Overlap
        );
        assert_eq!(
            "original".parse::<IntersectMode>().unwrap(),
            IntersectMode::Original
        );
        assert_eq!(
            "comp-incl".parse::<IntersectMode>().unwrap(),
            IntersectMode::CompIncl
        );
        assert!(matches!(
            "nearest".parse::<IntersectMode>(),
            Err(RegionsError::UnknownIntersectMode(_))
        ));
    }

    #[test]
    fn test_factory_selects_backend() {
        let linear = RegionSet::new("a", Backend::Linear);
        let tree = RegionSet::new("b", Backend::Tree);
        assert_eq!(linear.backend(), Backend::Linear);
        assert_eq!(tree.backend(), Backend::Tree);

        let created = RegionSet::create("c", "tree").unwrap();
        assert_eq!(created.backend(), Backend::Tree);
        assert!(RegionSet::create("d", "hashmap").is_err());
    }

    #[test]
    fn test_extended_returns_new_set() {
        let mut set = RegionSet::new("a", Backend::Tree);
        set.add(named_region("chr1", 1000, 2000, "x"));
        let extended = set.extended(100, 0, false).unwrap();
        assert_eq!(extended.to_regions()[0].start, 900);
        // the receiver is untouched
        assert_eq!(set.to_regions()[0].start, 1000);

        let extended = set.extended_fold(0.5, 0.0, false).unwrap();
        assert_eq!(extended.to_regions()[0].start, 500);
    }

    #[test]
    fn test_cross_backend_operations_fail() {
        let mut linear = RegionSet::new("a", Backend::Linear);
        let mut tree = RegionSet::new("b", Backend::Tree);
        linear.add(named_region("chr1", 0, 10, "x"));
        tree.add(named_region("chr1", 5, 15, "y"));

        assert!(matches!(
            linear.intersect(&tree, IntersectMode::Overlap, false),
            Err(RegionsError::MismatchedImplementation)
        ));
        assert!(matches!(
            tree.subtract(&linear, false),
            Err(RegionsError::MismatchedImplementation)
        ));
        assert!(matches!(
            linear.rename_by_overlap(&tree),
            Err(RegionsError::MismatchedImplementation)
        ));
    }
}
