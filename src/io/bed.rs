//! BED-like record parsing and writing.
//!
//! BED-like files are TSVs whose first three columns are sequence name,
//! start, and end; how many further columns are present decides which
//! optional [`Region`] fields get populated:
//!
//! | columns | populated fields            |
//! |---------|-----------------------------|
//! | 3       | coordinates only            |
//! | 4       | + name                      |
//! | 5       | + score                     |
//! | 6       | + strand                    |
//! | >6      | + auxiliary columns         |
//!
//! Writing reverses the ladder: a region is written with as many columns
//! as its last populated field requires, with `.` filling absent middle
//! columns.

use std::io::Write;
use std::path::PathBuf;

use crate::{
    error::RegionsError,
    io::file::{InputFile, OutputFile},
    region::{Region, Strand},
    Position,
};

/// Parse one BED-like line into a [`Region`].
///
/// Lines with fewer than three tab-separated columns are
/// [`RegionsError::MalformedRecord`]; unparsable coordinates, invalid
/// strands, and `end <= start` surface as their own error variants.
pub fn parse_bed_line(line: &str) -> Result<Region, RegionsError> {
    let fields: Vec<&str> = line.trim_end().split('\t').collect();
    if fields.len() < 3 {
        return Err(RegionsError::MalformedRecord(line.to_string()));
    }
    let start: Position = fields[1].parse()?;
    let end: Position = fields[2].parse()?;
    let mut region = Region::new(fields[0], start, end)?;
    if fields.len() >= 4 {
        region = region.with_name(fields[3]);
    }
    if fields.len() >= 5 {
        region = region.with_score(fields[4]);
    }
    if fields.len() >= 6 {
        region = region.with_strand(fields[5].parse::<Strand>()?);
    }
    if fields.len() > 6 {
        region = region.with_extra(fields[6..].iter().map(|s| s.to_string()).collect());
    }
    Ok(region)
}

/// Serialize a [`Region`] back to a BED-like line.
pub fn to_bed_line(region: &Region) -> String {
    let columns = if !region.extra.is_empty() {
        7
    } else if region.strand != Strand::Unknown {
        6
    } else if region.score.is_some() {
        5
    } else if region.name.is_some() {
        4
    } else {
        3
    };
    let mut fields = vec![
        region.seqname.clone(),
        region.start.to_string(),
        region.end.to_string(),
    ];
    if columns >= 4 {
        fields.push(region.name.clone().unwrap_or_else(|| ".".to_string()));
    }
    if columns >= 5 {
        fields.push(region.score.clone().unwrap_or_else(|| ".".to_string()));
    }
    if columns >= 6 {
        fields.push(region.strand.to_string());
    }
    fields.extend(region.extra.iter().cloned());
    fields.join("\t")
}

/// Read a plaintext or gzipped BED-like file into regions, in file order.
/// `#` comment lines and blank lines are skipped; a missing file is
/// [`RegionsError::FileNotFound`].
pub fn read_bed(filepath: impl Into<PathBuf>) -> Result<Vec<Region>, RegionsError> {
    let input = InputFile::new(filepath);
    let mut regions = Vec::new();
    for line in input.lines()? {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        regions.push(parse_bed_line(&line)?);
    }
    Ok(regions)
}

/// Write regions as BED-like lines to `output`.
pub fn write_bed<'a>(
    regions: impl Iterator<Item = &'a Region>,
    output: &OutputFile,
) -> Result<(), RegionsError> {
    let mut writer = output.writer()?;
    for region in regions {
        writeln!(writer, "{}", to_bed_line(region))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_column_ladder() {
        let region = parse_bed_line("chr1\t100\t200").unwrap();
        assert_eq!((region.start, region.end), (100, 200));
        assert!(region.name.is_none());

        let region = parse_bed_line("chr1\t100\t200\tgene1").unwrap();
        assert_eq!(region.name.as_deref(), Some("gene1"));
        assert!(region.score.is_none());

        let region = parse_bed_line("chr1\t100\t200\tgene1\t960").unwrap();
        assert_eq!(region.score.as_deref(), Some("960"));
        assert_eq!(region.strand, Strand::Unknown);

        let region = parse_bed_line("chr1\t100\t200\tgene1\t960\t-").unwrap();
        assert_eq!(region.strand, Strand::Reverse);
        assert!(region.extra.is_empty());

        let region = parse_bed_line("chr1\t100\t200\tgene1\t960\t-\tx\ty").unwrap();
        assert_eq!(region.extra, vec!["x", "y"]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            parse_bed_line("chr1\t100"),
            Err(RegionsError::MalformedRecord(_))
        ));
        assert!(matches!(
            parse_bed_line("chr1\tabc\t200"),
            Err(RegionsError::ParseIntError(_))
        ));
        assert!(matches!(
            parse_bed_line("chr1\t100\t200\tn\t0\t?"),
            Err(RegionsError::InvalidStrand(_))
        ));
        assert!(matches!(
            parse_bed_line("chr1\t200\t100"),
            Err(RegionsError::InvalidRegion(_, _))
        ));
    }

    #[test]
    fn test_bed_line_round_trip() {
        for line in [
            "chr1\t100\t200",
            "chr1\t100\t200\tgene1",
            "chr1\t100\t200\tgene1\t960",
            "chr1\t100\t200\tgene1\t960\t+",
            "chr1\t100\t200\tgene1\t960\t-\taux1\taux2",
        ] {
            let region = parse_bed_line(line).unwrap();
            assert_eq!(to_bed_line(&region), line);
        }
    }

    #[test]
    fn test_bed_line_fills_missing_middle_columns() {
        let region = Region::new("chr1", 0, 10)
            .unwrap()
            .with_strand(Strand::Forward);
        assert_eq!(to_bed_line(&region), "chr1\t0\t10\t.\t.\t+");
    }

    #[test]
    fn test_read_bed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# header comment").unwrap();
        writeln!(file, "chr1\t1000\t2000\tFeature1\t0\t+").unwrap();
        writeln!(file, "chr2\t3000\t4000\tFeature2\t0\t-").unwrap();
        file.flush().unwrap();

        let regions = read_bed(file.path()).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].name.as_deref(), Some("Feature1"));
        assert_eq!(regions[1].strand, Strand::Reverse);
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_bed("no/such/file.bed"),
            Err(RegionsError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_write_and_reread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bed");
        let regions = vec![
            Region::new("chr1", 0, 10).unwrap().with_name("a"),
            Region::new("chr2", 5, 15).unwrap(),
        ];
        write_bed(regions.iter(), &OutputFile::new(&path)).unwrap();
        let reread = read_bed(&path).unwrap();
        assert_eq!(reread, regions);
    }
}
