//! Shared region-set kernels.
//!
//! Both backends funnel their clip, coalesce, and fragment logic through
//! these functions, so the linear sweep and the interval-tree queries
//! cannot drift apart on output coordinates.
//!
//! - [`coalesce_sorted()`]: merge overlapping/abutting runs in a sorted slice.
//! - [`clip_to()`]: truncate a region to its overlap with another.
//! - [`subtract_one()`]: fragment one region against its sorted overlaps.

use crate::region::{Region, Strand};

fn strand_slot(strand: Strand) -> usize {
    match strand {
        Strand::Forward => 0,
        Strand::Reverse => 1,
        Strand::Unknown => 2,
    }
}

/// Coalesce a slice of regions *sorted by the region total order* into the
/// minimal non-overlapping cover. Consecutive regions on the same sequence
/// whose intervals overlap or abut are merged into one region spanning the
/// run; the first region of each run keeps its name, score, strand, and
/// auxiliary columns.
///
/// With `strand_aware`, runs are kept per `(seqname, strand)` and regions
/// on different strands never coalesce. Since runs of different strands can
/// interleave, the output is re-sorted before returning.
pub(crate) fn coalesce_sorted(regions: &[Region], strand_aware: bool) -> Vec<Region> {
    let mut merged: Vec<Region> = Vec::new();
    // open run index per strand, reset at each sequence boundary
    let mut open: [Option<usize>; 3] = [None; 3];
    let mut current_seq: Option<&str> = None;

    for region in regions {
        if current_seq != Some(region.seqname.as_str()) {
            open = [None; 3];
            current_seq = Some(region.seqname.as_str());
        }
        let slot = if strand_aware {
            strand_slot(region.strand)
        } else {
            0
        };
        match open[slot] {
            // overlap-or-abut extends the open run
            Some(i) if region.start <= merged[i].end => {
                if region.end > merged[i].end {
                    merged[i].end = region.end;
                }
            }
            _ => {
                merged.push(region.clone());
                open[slot] = Some(merged.len() - 1);
            }
        }
    }
    merged.sort();
    merged
}

/// Clip `region` to its overlap with `target`: coordinates become
/// `[max(starts), min(ends))`, while name, score, strand, and auxiliary
/// columns are inherited from `region`. The caller must ensure the two
/// actually overlap.
pub(crate) fn clip_to(region: &Region, target: &Region) -> Region {
    let mut clipped = region.clone();
    clipped.start = region.start.max(target.start);
    clipped.end = region.end.min(target.end);
    clipped
}

/// Remove the union of `overlaps` from `region`, returning the remaining
/// fragments in ascending order. `overlaps` must be sorted by start and
/// every element must overlap `region`; the fragments inherit the region's
/// metadata. A region fully covered by its overlaps yields no fragments.
pub(crate) fn subtract_one<'a>(
    region: &Region,
    overlaps: impl Iterator<Item = &'a Region>,
) -> Vec<Region> {
    let mut fragments = Vec::new();
    let mut cursor = region.start;
    for target in overlaps {
        if cursor >= region.end {
            break;
        }
        if target.start > cursor {
            let mut fragment = region.clone();
            fragment.start = cursor;
            fragment.end = target.start.min(region.end);
            fragments.push(fragment);
        }
        cursor = cursor.max(target.end);
    }
    if cursor < region.end {
        let mut fragment = region.clone();
        fragment.start = cursor;
        fragment.end = region.end;
        fragments.push(fragment);
    }
    fragments
}
