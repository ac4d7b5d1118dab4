//! [`LinearRegionSet`]: the ordered-sequence backend.
//!
//! Regions live in a lazily sorted `Vec`; every operation that needs order
//! is a sort-and-sweep pass. An `is_sorted` flag tracks whether the vector
//! is currently in the region total order, and is invalidated by any
//! mutation that can break it. Operations that do not mutate the receiver
//! sort a copy instead of the caller's original.

use std::borrow::Cow;

use indexmap::IndexSet;
use rand::Rng;

use crate::{
    error::RegionsError,
    region::Region,
    set::{operations, IntersectMode, RegionOps},
    PositionOffset,
};

/// An ordered, lazily sorted collection of regions.
#[derive(Clone, Debug, Default)]
pub struct LinearRegionSet {
    /// The collection label.
    pub name: String,
    pub(crate) regions: Vec<Region>,
    pub(crate) is_sorted: bool,
}

/// Whether `target` lies entirely before `region`, such that it cannot
/// overlap `region` or anything sorting after it. Used to advance the
/// sweep's rewind mark.
fn before(target: &Region, region: &Region) -> bool {
    target.seqname < region.seqname
        || (target.seqname == region.seqname && target.end <= region.start)
}

/// Whether `target` is still a candidate overlap for `region` in a sweep
/// over targets sorted by start position.
fn candidate(target: &Region, region: &Region) -> bool {
    target.seqname == region.seqname && target.start < region.end
}

impl LinearRegionSet {
    /// Create a new empty [`LinearRegionSet`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            regions: Vec::new(),
            is_sorted: true,
        }
    }

    /// Create a [`LinearRegionSet`] from loaded regions.
    pub fn from_regions(name: impl Into<String>, regions: Vec<Region>) -> Self {
        Self {
            name: name.into(),
            regions,
            is_sorted: false,
        }
    }

    fn with_result(&self, regions: Vec<Region>, is_sorted: bool) -> Self {
        Self {
            name: self.name.clone(),
            regions,
            is_sorted,
        }
    }

    /// The regions in their current order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Whether the set is currently in the region total order.
    pub fn is_sorted(&self) -> bool {
        self.is_sorted
    }

    /// Stable-sort the regions by the region total order.
    pub fn sort(&mut self) {
        if !self.is_sorted {
            self.regions.sort();
            self.is_sorted = true;
        }
    }

    /// The regions in sorted order: borrowed if the set is already sorted,
    /// otherwise a sorted copy.
    fn sorted_regions(&self) -> Cow<'_, [Region]> {
        if self.is_sorted {
            Cow::Borrowed(self.regions.as_slice())
        } else {
            let mut copy = self.regions.clone();
            copy.sort();
            Cow::Owned(copy)
        }
    }

    /// The two-pointer OVERLAP sweep over merged, non-overlapping runs.
    ///
    /// `mark` is the rewind point: it only advances past targets that end
    /// before the current run starts (and so cannot overlap any later
    /// run), while the scan pointer `k` walks ahead from it for each run.
    fn sweep_overlap(runs: &[Region], target_runs: &[Region]) -> Vec<Region> {
        let mut out = Vec::new();
        let mut mark = 0;
        for run in runs {
            while mark < target_runs.len() && before(&target_runs[mark], run) {
                mark += 1;
            }
            let mut k = mark;
            while k < target_runs.len() && candidate(&target_runs[k], run) {
                if target_runs[k].overlaps(run) {
                    out.push(operations::clip_to(run, &target_runs[k]));
                }
                k += 1;
            }
        }
        out
    }

    /// The ORIGINAL/COMP_INCL sweep: emit each left region at most once if
    /// some target overlaps it (or, for `containment`, contains it).
    fn sweep_filter(regions: &[Region], targets: &[Region], containment: bool) -> Vec<Region> {
        let mut out = Vec::new();
        let mut mark = 0;
        for region in regions {
            while mark < targets.len() && before(&targets[mark], region) {
                mark += 1;
            }
            let mut k = mark;
            while k < targets.len() && candidate(&targets[k], region) {
                let hit = if containment {
                    region.contained_in(&targets[k])
                } else {
                    targets[k].overlaps(region)
                };
                if hit {
                    out.push(region.clone());
                    break;
                }
                k += 1;
            }
        }
        out
    }

    /// The subtraction sweep: fragment each left region against the union
    /// of its (optionally strand-matched) overlapping targets.
    fn sweep_subtract(regions: &[Region], targets: &[Region], strand_aware: bool) -> Vec<Region> {
        let mut out = Vec::new();
        let mut mark = 0;
        for region in regions {
            while mark < targets.len() && before(&targets[mark], region) {
                mark += 1;
            }
            let mut hits: Vec<&Region> = Vec::new();
            let mut k = mark;
            while k < targets.len() && candidate(&targets[k], region) {
                if targets[k].overlaps(region) && (!strand_aware || targets[k].same_strand(region))
                {
                    hits.push(&targets[k]);
                }
                k += 1;
            }
            out.extend(operations::subtract_one(region, hits.into_iter()));
        }
        // fragments of nested input regions can emerge out of order
        out.sort();
        out
    }
}

impl RegionOps for LinearRegionSet {
    fn set_name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.regions.len()
    }

    fn add(&mut self, region: Region) {
        self.regions.push(region);
        self.is_sorted = false;
    }

    fn iter_regions(&self) -> Box<dyn Iterator<Item = &Region> + '_> {
        Box::new(self.regions.iter())
    }

    fn seqnames(&self, unique: bool) -> Vec<String> {
        let seqnames = self.regions.iter().map(|r| r.seqname.clone());
        if unique {
            seqnames.collect::<IndexSet<_>>().into_iter().collect()
        } else {
            seqnames.collect()
        }
    }

    fn names(&self, unique: bool) -> Vec<String> {
        let names = self
            .regions
            .iter()
            .map(|r| r.name.clone().unwrap_or_else(|| r.region_string()));
        if unique {
            names.collect::<IndexSet<_>>().into_iter().collect()
        } else {
            names.collect()
        }
    }

    fn merge_overlaps(&self, strand_aware: bool) -> Self {
        let merged = operations::coalesce_sorted(&self.sorted_regions(), strand_aware);
        self.with_result(merged, true)
    }

    fn merge_overlaps_in_place(&mut self, strand_aware: bool) {
        self.sort();
        self.regions = operations::coalesce_sorted(&self.regions, strand_aware);
        self.is_sorted = true;
    }

    fn intersect(&self, target: &Self, mode: IntersectMode, remove_duplicates: bool) -> Self {
        let result = match mode {
            IntersectMode::Overlap => {
                let runs = operations::coalesce_sorted(&self.sorted_regions(), false);
                let target_runs = operations::coalesce_sorted(&target.sorted_regions(), false);
                Self::sweep_overlap(&runs, &target_runs)
            }
            IntersectMode::Original => {
                Self::sweep_filter(&self.sorted_regions(), &target.sorted_regions(), false)
            }
            IntersectMode::CompIncl => {
                Self::sweep_filter(&self.sorted_regions(), &target.sorted_regions(), true)
            }
        };
        let mut out = self.with_result(result, true);
        if remove_duplicates {
            out.remove_duplicates(true);
        }
        out
    }

    fn subtract(&self, target: &Self, strand_aware: bool) -> Self {
        let result = Self::sweep_subtract(
            &self.sorted_regions(),
            &target.sorted_regions(),
            strand_aware,
        );
        self.with_result(result, true)
    }

    fn subtract_in_place(&mut self, target: &Self, strand_aware: bool) {
        self.sort();
        self.regions =
            Self::sweep_subtract(&self.regions, &target.sorted_regions(), strand_aware);
        self.is_sorted = true;
    }

    fn rename_by_overlap(&mut self, target: &Self) {
        let targets = target.sorted_regions();
        for region in self.regions.iter_mut() {
            // jump to this region's sequence, then scan its candidates in
            // sorted order; the first overlap wins ties
            let from = targets.partition_point(|t| t.seqname < region.seqname);
            let first = targets[from..]
                .iter()
                .take_while(|t| candidate(t, region))
                .find(|t| t.overlaps(region));
            if let Some(t) = first {
                region.name = Some(t.name.clone().unwrap_or_else(|| t.region_string()));
            }
        }
    }

    fn remove_duplicates(&mut self, sort: bool) {
        let deduped: IndexSet<Region> = self.regions.drain(..).collect();
        self.regions = deduped.into_iter().collect();
        self.is_sorted = false;
        if sort {
            self.sort();
        }
    }

    fn sample<R: Rng>(&self, size: usize, rng: &mut R) -> Result<Self, RegionsError> {
        if size > self.len() {
            return Err(RegionsError::SampleSizeExceedsLength(size, self.len()));
        }
        let regions = rand::seq::index::sample(rng, self.len(), size)
            .iter()
            .map(|i| self.regions[i].clone())
            .collect();
        Ok(self.with_result(regions, false))
    }

    fn extended(
        &self,
        upstream: PositionOffset,
        downstream: PositionOffset,
        strand_aware: bool,
    ) -> Result<Self, RegionsError> {
        let regions = self
            .regions
            .iter()
            .map(|r| r.extended(upstream, downstream, strand_aware))
            .collect::<Result<Vec<_>, _>>()?;
        // a uniform shift keeps starts ordered, but clamping at 0 or
        // per-strand swaps can still reorder ends
        Ok(self.with_result(regions, false))
    }

    fn extend(
        &mut self,
        upstream: PositionOffset,
        downstream: PositionOffset,
        strand_aware: bool,
    ) -> Result<(), RegionsError> {
        *self = self.extended(upstream, downstream, strand_aware)?;
        Ok(())
    }

    fn extended_fold(
        &self,
        upstream: f64,
        downstream: f64,
        strand_aware: bool,
    ) -> Result<Self, RegionsError> {
        let regions = self
            .regions
            .iter()
            .map(|r| r.extended_fold(upstream, downstream, strand_aware))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.with_result(regions, false))
    }

    fn extend_fold(
        &mut self,
        upstream: f64,
        downstream: f64,
        strand_aware: bool,
    ) -> Result<(), RegionsError> {
        *self = self.extended_fold(upstream, downstream, strand_aware)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Strand;
    use crate::test_utilities::{linear_test_case_01, linear_test_case_02, named_region, region};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_add_invalidates_sort() {
        let mut set = LinearRegionSet::new("test");
        assert!(set.is_sorted());
        set.add(region("chr1", 10, 20));
        assert!(!set.is_sorted());
        set.sort();
        assert!(set.is_sorted());
    }

    #[test]
    fn test_sort_is_total_order() {
        let mut set = LinearRegionSet::new("test");
        set.add(region("chr2", 0, 5));
        set.add(region("chr1", 10, 20));
        set.add(region("chr10", 3, 4));
        set.add(region("chr1", 10, 15));
        set.sort();
        let starts: Vec<_> = set
            .iter_regions()
            .map(|r| (r.seqname.clone(), r.start, r.end))
            .collect();
        assert_eq!(
            starts,
            vec![
                ("chr1".to_string(), 10, 15),
                ("chr1".to_string(), 10, 20),
                ("chr10".to_string(), 3, 4),
                ("chr2".to_string(), 0, 5),
            ]
        );
    }

    #[test]
    fn test_merge_overlaps() {
        let set = linear_test_case_02();
        let merged = set.merge_overlaps(false);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.regions()[0].width(), 1000);
        assert_eq!(merged.regions()[1].width(), 1000);

        // merging strand-aware keeps the reverse-strand region apart
        let merged = set.merge_overlaps(true);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.regions()[0].width(), 1000);

        // idempotence
        let remerged = merged.merge_overlaps(true);
        assert_eq!(remerged.regions(), merged.regions());
    }

    #[test]
    fn test_merge_overlaps_in_place() {
        let mut set = linear_test_case_02();
        set.merge_overlaps_in_place(false);
        assert_eq!(set.len(), 2);
        assert!(set.is_sorted());
    }

    #[test]
    fn test_intersect_overlap() {
        let mut set = LinearRegionSet::new("a");
        set.add(named_region("chr1", 1000, 2000, "x"));
        set.add(named_region("chr1", 3000, 4000, "y"));
        let mut target = LinearRegionSet::new("b");
        target.add(region("chr1", 1500, 2500));
        target.add(region("chr1", 3500, 5000));

        let result = set.intersect(&target, IntersectMode::Overlap, false);
        let coords: Vec<_> = result.regions().iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(coords, vec![(1500, 2000), (3500, 4000)]);
        // clipped regions inherit the left operand's metadata
        assert_eq!(result.regions()[0].name.as_deref(), Some("x"));
    }

    #[test]
    fn test_intersect_overlap_commutative_coordinates() {
        let set = linear_test_case_01();
        let target = linear_test_case_02();
        let ab: Vec<_> = set
            .intersect(&target, IntersectMode::Overlap, false)
            .regions()
            .iter()
            .map(|r| (r.seqname.clone(), r.start, r.end))
            .collect();
        let ba: Vec<_> = target
            .intersect(&set, IntersectMode::Overlap, false)
            .regions()
            .iter()
            .map(|r| (r.seqname.clone(), r.start, r.end))
            .collect();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_intersect_one_target_spanning_many() {
        // a single target interval overlapping several left regions must
        // be revisited for each of them
        let mut set = LinearRegionSet::new("a");
        set.add(region("chr1", 100, 200));
        set.add(region("chr1", 300, 400));
        set.add(region("chr1", 500, 600));
        let mut target = LinearRegionSet::new("b");
        target.add(region("chr1", 0, 1000));

        let result = set.intersect(&target, IntersectMode::Overlap, false);
        let coords: Vec<_> = result.regions().iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(coords, vec![(100, 200), (300, 400), (500, 600)]);
    }

    #[test]
    fn test_intersect_original() {
        let mut set = LinearRegionSet::new("a");
        set.add(named_region("chr1", 1000, 2000, "hit"));
        set.add(named_region("chr1", 3000, 4000, "miss"));
        let mut target = LinearRegionSet::new("b");
        target.add(region("chr1", 1500, 2500));

        let result = set.intersect(&target, IntersectMode::Original, false);
        assert_eq!(result.len(), 1);
        // the region comes through unclipped
        let r = &result.regions()[0];
        assert_eq!((r.start, r.end), (1000, 2000));
        assert_eq!(r.name.as_deref(), Some("hit"));
    }

    #[test]
    fn test_intersect_comp_incl() {
        let mut set = LinearRegionSet::new("a");
        set.add(region("chr1", 1000, 2000));
        set.add(region("chr1", 3000, 3100));
        let mut target = LinearRegionSet::new("b");
        // overlaps the first but does not contain it; contains the second
        target.add(region("chr1", 1500, 2500));
        target.add(region("chr1", 2900, 3200));

        let result = set.intersect(&target, IntersectMode::CompIncl, false);
        assert_eq!(result.len(), 1);
        assert_eq!(result.regions()[0].start, 3000);
    }

    #[test]
    fn test_intersect_empty_operand() {
        let set = linear_test_case_01();
        let empty = LinearRegionSet::new("empty");
        assert!(set
            .intersect(&empty, IntersectMode::Overlap, false)
            .is_empty());
        assert!(empty
            .intersect(&set, IntersectMode::Overlap, false)
            .is_empty());
    }

    #[test]
    fn test_subtract_splits_region() {
        let mut set = LinearRegionSet::new("a");
        set.add(region("chr1", 0, 1000));
        let mut target = LinearRegionSet::new("b");
        target.add(region("chr1", 400, 600));

        let result = set.subtract(&target, false);
        let coords: Vec<_> = result.regions().iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(coords, vec![(0, 400), (600, 1000)]);
    }

    #[test]
    fn test_subtract_strand_aware() {
        let mut set = LinearRegionSet::new("a");
        set.add(region("chr1", 0, 1000).with_strand(Strand::Forward));
        set.add(region("chr1", 2000, 3000).with_strand(Strand::Reverse));
        let mut target = LinearRegionSet::new("b");
        target.add(region("chr1", 400, 600).with_strand(Strand::Forward));
        target.add(region("chr1", 2400, 2600).with_strand(Strand::Forward));

        let result = set.subtract(&target, true);
        let coords: Vec<_> = result.regions().iter().map(|r| (r.start, r.end)).collect();
        // only the matching-strand region is fragmented
        assert_eq!(coords, vec![(0, 400), (600, 1000), (2000, 3000)]);
    }

    #[test]
    fn test_subtract_full_cover_disappears() {
        let mut set = LinearRegionSet::new("a");
        set.add(region("chr1", 100, 200));
        let mut target = LinearRegionSet::new("b");
        target.add(region("chr1", 0, 500));
        assert!(set.subtract(&target, false).is_empty());
    }

    #[test]
    fn test_subtract_then_intersect_is_empty() {
        let set = linear_test_case_01();
        let target = linear_test_case_02();
        let difference = set.subtract(&target, false);
        let leftover = difference.intersect(&target, IntersectMode::Overlap, false);
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_subtract_in_place() {
        let mut set = LinearRegionSet::new("a");
        set.add(region("chr1", 0, 1000));
        let mut target = LinearRegionSet::new("b");
        target.add(region("chr1", 400, 600));
        set.subtract_in_place(&target, false);
        assert_eq!(set.len(), 2);
        assert!(set.is_sorted());
    }

    #[test]
    fn test_rename_by_overlap() {
        let mut set = LinearRegionSet::new("a");
        set.add(named_region("chr1", 1000, 2000, "old"));
        set.add(named_region("chr1", 5000, 6000, "kept"));
        let mut target = LinearRegionSet::new("b");
        target.add(named_region("chr1", 1500, 2500, "new"));

        set.rename_by_overlap(&target);
        assert_eq!(set.regions()[0].name.as_deref(), Some("new"));
        assert_eq!(set.regions()[1].name.as_deref(), Some("kept"));
    }

    #[test]
    fn test_rename_by_overlap_first_wins_ties() {
        let mut set = LinearRegionSet::new("a");
        set.add(named_region("chr1", 1000, 2000, "old"));
        let mut target = LinearRegionSet::new("b");
        target.add(named_region("chr1", 1600, 2500, "second"));
        target.add(named_region("chr1", 1500, 2500, "first"));

        set.rename_by_overlap(&target);
        assert_eq!(set.regions()[0].name.as_deref(), Some("first"));
    }

    #[test]
    fn test_remove_duplicates() {
        let mut set = LinearRegionSet::new("a");
        set.add(named_region("chr1", 0, 10, "a"));
        set.add(named_region("chr1", 20, 30, "b"));
        set.add(named_region("chr1", 0, 10, "a"));
        set.add(named_region("chr2", 5, 15, "c"));
        set.add(named_region("chr1", 20, 30, "b"));
        set.add(named_region("chr2", 40, 50, "d"));
        set.remove_duplicates(true);
        assert_eq!(set.len(), 4);
        assert!(set.is_sorted());
    }

    #[test]
    fn test_sample() {
        let set = linear_test_case_01();
        let mut rng = StdRng::seed_from_u64(42);
        let sampled = set.sample(3, &mut rng).unwrap();
        assert_eq!(sampled.len(), 3);
        // sampling is without replacement
        let mut coords: Vec<_> = sampled.regions().iter().map(|r| (r.start, r.end)).collect();
        coords.sort();
        coords.dedup();
        assert_eq!(coords.len(), 3);

        assert!(matches!(
            set.sample(set.len() + 1, &mut rng),
            Err(RegionsError::SampleSizeExceedsLength(_, _))
        ));
    }

    #[test]
    fn test_sample_reproducible() {
        let set = linear_test_case_01();
        let a = set.sample(2, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = set.sample(2, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a.regions(), b.regions());
    }

    #[test]
    fn test_extend_set() {
        let mut set = LinearRegionSet::new("a");
        set.add(region("chr1", 1000, 2000));
        set.add(region("chr1", 3000, 4000));
        set.extend(100, 0, false).unwrap();
        assert_eq!(set.regions()[0].start, 900);
        assert_eq!(set.regions()[1].start, 2900);
    }

    #[test]
    fn test_extend_set_failure_leaves_receiver_untouched() {
        let mut set = LinearRegionSet::new("a");
        set.add(region("chr1", 1000, 2000));
        set.add(region("chr1", 3000, 3010));
        // shrinking by 50bp each side empties the second region
        assert!(set.extend(-50, -50, false).is_err());
        assert_eq!(set.regions()[0].start, 1000);
        assert_eq!(set.regions()[1].start, 3000);
    }

    #[test]
    fn test_names_and_seqnames() {
        let mut set = LinearRegionSet::new("a");
        set.add(named_region("chr1", 0, 10, "x"));
        set.add(region("chr1", 20, 30));
        set.add(named_region("chr2", 0, 10, "x"));
        assert_eq!(set.seqnames(false), vec!["chr1", "chr1", "chr2"]);
        assert_eq!(set.seqnames(true), vec!["chr1", "chr2"]);
        assert_eq!(set.names(false), vec!["x", "chr1:20-30", "x"]);
        assert_eq!(set.names(true), vec!["x", "chr1:20-30"]);
    }
}
