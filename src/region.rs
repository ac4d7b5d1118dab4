//! The [`Region`] and [`Strand`] types: the atomic interval entity and its
//! ordering, overlap, and extension logic.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::Serialize;

use crate::{error::RegionsError, Position, PositionOffset};

/// Nucleotide strand enum type.
///
/// `Unknown` corresponds to the `.` character used in BED-like files for
/// missing strands, and is the default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl FromStr for Strand {
    type Err = RegionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." => Ok(Strand::Unknown),
            _ => Err(RegionsError::InvalidStrand(s.to_string())),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unknown => '.',
        };
        write!(f, "{}", c)
    }
}

/// A single genomic region: a 0-indexed, right-exclusive interval on a
/// named sequence, with optional strand, name, score, and auxiliary
/// columns.
///
/// # Ordering and equality
///
/// Regions order by `(seqname, start, end)`, with `(strand, name)` as
/// final tiebreakers. The sequence name comparison is lexicographic, so
/// `"chr10"` sorts before `"chr2"`. Equality and hashing are structural
/// over `(seqname, start, end, strand, name)`; two regions differing only
/// in score or auxiliary columns are interchangeable for deduplication.
#[derive(Clone, Debug, Serialize)]
pub struct Region {
    pub seqname: String,
    pub start: Position,
    pub end: Position,
    pub strand: Strand,
    pub name: Option<String>,
    pub score: Option<String>,
    pub extra: Vec<String>,
}

impl Region {
    /// Create a new 0-indexed, right-exclusive region.
    ///
    /// Returns [`RegionsError::InvalidRegion`] if `end <= start`; zero- and
    /// negative-width regions are rejected at construction.
    pub fn new(
        seqname: impl Into<String>,
        start: Position,
        end: Position,
    ) -> Result<Self, RegionsError> {
        if end <= start {
            return Err(RegionsError::InvalidRegion(start.into(), end.into()));
        }
        Ok(Self {
            seqname: seqname.into(),
            start,
            end,
            strand: Strand::Unknown,
            name: None,
            score: None,
            extra: Vec::new(),
        })
    }

    /// Set the feature name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the score column. Scores are kept verbatim, so non-numeric
    /// placeholder values in input files survive a round-trip.
    pub fn with_score(mut self, score: impl Into<String>) -> Self {
        self.score = Some(score.into());
        self
    }

    /// Set the strand.
    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    /// Set the auxiliary columns beyond the sixth.
    pub fn with_extra(mut self, extra: Vec<String>) -> Self {
        self.extra = extra;
        self
    }

    /// The width of this region in basepairs.
    pub fn width(&self) -> Position {
        self.end - self.start
    }

    /// Whether this region overlaps `other`: same sequence name and a
    /// non-empty intersection of the half-open intervals. Strand is
    /// ignored; strand-aware call sites compare strands with
    /// [`Region::same_strand`] in addition.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.seqname == other.seqname
            && self.start.max(other.start) < self.end.min(other.end)
    }

    /// Whether this region and `other` are on the same strand.
    pub fn same_strand(&self, other: &Region) -> bool {
        self.strand == other.strand
    }

    /// Whether this region is completely contained within `other`.
    pub fn contained_in(&self, other: &Region) -> bool {
        self.seqname == other.seqname && self.start >= other.start && self.end <= other.end
    }

    /// Return a copy of this region extended by `upstream`/`downstream`
    /// basepairs. Negative amounts shrink the region.
    ///
    /// Without `strand_aware` (or when the strand is `Forward`/`Unknown`),
    /// `upstream` moves the start left and `downstream` moves the end
    /// right. With `strand_aware` on a `Reverse` region the two swap
    /// roles, so "upstream" always points away from the transcription
    /// start. The start is clamped to 0 when extension would run past the
    /// chromosome start; a shrink that leaves `end <= start` is a
    /// [`RegionsError::InvalidRegion`].
    pub fn extended(
        &self,
        upstream: PositionOffset,
        downstream: PositionOffset,
        strand_aware: bool,
    ) -> Result<Region, RegionsError> {
        let (left, right) = if strand_aware && self.strand == Strand::Reverse {
            (downstream, upstream)
        } else {
            (upstream, downstream)
        };
        let new_start = (PositionOffset::from(self.start) - left).max(0);
        let new_end = PositionOffset::from(self.end) + right;
        if new_end <= new_start {
            return Err(RegionsError::InvalidRegion(new_start, new_end));
        }
        let mut region = self.clone();
        region.start = new_start as Position;
        region.end = new_end as Position;
        Ok(region)
    }

    /// Extend this region in place; see [`Region::extended`].
    pub fn extend(
        &mut self,
        upstream: PositionOffset,
        downstream: PositionOffset,
        strand_aware: bool,
    ) -> Result<(), RegionsError> {
        *self = self.extended(upstream, downstream, strand_aware)?;
        Ok(())
    }

    /// Return a copy of this region extended by fractions of its *current*
    /// width, rounded to the nearest basepair. Two chained calls therefore
    /// use different absolute amounts. Strand and clamping semantics are
    /// those of [`Region::extended`].
    pub fn extended_fold(
        &self,
        upstream: f64,
        downstream: f64,
        strand_aware: bool,
    ) -> Result<Region, RegionsError> {
        let width = f64::from(self.width());
        let up = (upstream * width).round() as PositionOffset;
        let down = (downstream * width).round() as PositionOffset;
        self.extended(up, down, strand_aware)
    }

    /// Extend this region in place by fractions of its current width; see
    /// [`Region::extended_fold`].
    pub fn extend_fold(
        &mut self,
        upstream: f64,
        downstream: f64,
        strand_aware: bool,
    ) -> Result<(), RegionsError> {
        *self = self.extended_fold(upstream, downstream, strand_aware)?;
        Ok(())
    }

    /// The `seqname:start-end` string form of this region, used as the
    /// reported name for nameless regions.
    pub fn region_string(&self) -> String {
        format!("{}:{}-{}", self.seqname, self.start, self.end)
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.seqname == other.seqname
            && self.start == other.start
            && self.end == other.end
            && self.strand == other.strand
            && self.name == other.name
    }
}

impl Eq for Region {}

impl Hash for Region {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.seqname.hash(state);
        self.start.hash(state);
        self.end.hash(state);
        self.strand.hash(state);
        self.name.hash(state);
    }
}

impl Ord for Region {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.seqname, self.start, self.end, self.strand, &self.name).cmp(&(
            &other.seqname,
            other.start,
            other.end,
            other.strand,
            &other.name,
        ))
    }
}

impl PartialOrd for Region {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.region_string(),
            self.name.as_deref().unwrap_or("."),
            self.strand
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width() {
        let region = Region::new("chr1", 3, 6).unwrap();
        assert_eq!(region.width(), 3);
    }

    #[test]
    fn test_invalid_region() {
        assert!(matches!(
            Region::new("chr1", 6, 6),
            Err(RegionsError::InvalidRegion(6, 6))
        ));
        assert!(Region::new("chr1", 6, 3).is_err());
    }

    #[test]
    fn test_display() {
        let region = Region::new("chr1", 3, 6).unwrap().with_name("test");
        assert_eq!(region.to_string(), "chr1:3-6 test .");
    }

    #[test]
    fn test_compare() {
        let a = Region::new("chr1", 3, 6).unwrap();
        let b = Region::new("chr1", 7, 10).unwrap();
        assert!(a < b);

        let b = Region::new("chr1", 4, 6).unwrap();
        assert!(a < b);

        // same start: shorter sorts first
        let a = Region::new("chr1", 3, 6).unwrap();
        let b = Region::new("chr1", 3, 60).unwrap();
        assert!(a < b);

        // lexicographic seqname order dominates
        let a = Region::new("chr1", 3, 6).unwrap();
        let b = Region::new("chr2", 1, 2).unwrap();
        assert!(a < b);
        let a = Region::new("chr10", 0, 1).unwrap();
        let b = Region::new("chr2", 0, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_overlaps_symmetric() {
        let a = Region::new("chr1", 0, 10).unwrap();
        let b = Region::new("chr1", 9, 20).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        // abutting half-open intervals do not overlap
        let c = Region::new("chr1", 10, 20).unwrap();
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));

        // different sequences never overlap
        let d = Region::new("chr2", 0, 10).unwrap();
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_extend() {
        let mut region = Region::new("chr1", 3, 6).unwrap();
        region.extend(1, 0, false).unwrap();
        assert_eq!(region.width(), 4);
        region.extend(0, 10, false).unwrap();
        assert_eq!(region.width(), 14);
        region.extend(-5, 0, false).unwrap();
        assert_eq!(region.width(), 9);
        // extension past the chromosome start clamps to 0
        region.extend(10, 0, false).unwrap();
        assert_eq!(region.start, 0);
    }

    #[test]
    fn test_extend_strand_aware() {
        let region = Region::new("chr1", 1000, 2000)
            .unwrap()
            .with_strand(Strand::Reverse);
        // upstream extends the end on the reverse strand
        let extended = region.extended(100, 0, true).unwrap();
        assert_eq!((extended.start, extended.end), (1000, 2100));
        let extended = region.extended(0, 100, true).unwrap();
        assert_eq!((extended.start, extended.end), (900, 2000));
        // strand-naive extension ignores the strand
        let extended = region.extended(100, 0, false).unwrap();
        assert_eq!((extended.start, extended.end), (900, 2000));
    }

    #[test]
    fn test_extend_shrink_to_empty() {
        let region = Region::new("chr1", 3, 6).unwrap();
        assert!(region.extended(-2, -2, false).is_err());
        // failed in-place extension leaves the region untouched
        let mut region = Region::new("chr1", 3, 6).unwrap();
        assert!(region.extend(-2, -2, false).is_err());
        assert_eq!((region.start, region.end), (3, 6));
    }

    #[test]
    fn test_extend_fold() {
        let mut region = Region::new("chr1", 10, 20).unwrap();
        region.extend_fold(0.1, 0.0, false).unwrap();
        assert_eq!(region.start, 9);
        // fractions apply to the current width, so chained calls compound
        region.extend_fold(0.0, 2.0, false).unwrap();
        assert_eq!(region.width(), 33);
    }

    #[test]
    fn test_structural_equality_ignores_score() {
        let a = Region::new("chr1", 0, 10).unwrap().with_score("10");
        let b = Region::new("chr1", 0, 10).unwrap().with_score("999");
        assert_eq!(a, b);

        let c = Region::new("chr1", 0, 10).unwrap().with_name("x");
        assert_ne!(a, c);
    }

    #[test]
    fn test_strand_parse() {
        assert_eq!("+".parse::<Strand>().unwrap(), Strand::Forward);
        assert_eq!("-".parse::<Strand>().unwrap(), Strand::Reverse);
        assert_eq!(".".parse::<Strand>().unwrap(), Strand::Unknown);
        assert!("x".parse::<Strand>().is_err());
    }
}
