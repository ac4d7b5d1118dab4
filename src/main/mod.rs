use std::path::PathBuf;

use clap::{Parser, Subcommand};

use gregions::{
    commands::{
        regions_dedup, regions_extend, regions_intersect, regions_merge, regions_sample,
        regions_subtract,
    },
    prelude::{Backend, IntersectMode, RegionsError},
};

const INFO: &str = "\
gregions: genomic region set algebra over BED-like files

Subcommands:

  intersect: intersect two region sets under one of three overlap modes.
  merge:     coalesce overlapping or abutting regions into a minimal cover.
  subtract:  remove one set's intervals from another, fragmenting regions.
  extend:    grow (or shrink) each region, optionally strand-aware.
  sample:    uniformly sample regions without replacement.
  dedup:     remove duplicated regions and sort.

";

#[derive(Parser)]
#[clap(name = "gregions")]
#[clap(about = INFO)]
struct Cli {
    /// which region set backend to use: 'linear' or 'tree'
    #[arg(long, global = true, default_value = "linear")]
    backend: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Intersect {
        /// the "left" BED-like TSV file; output regions derive from it
        #[arg(long, required = true)]
        left: PathBuf,

        /// the "right" BED-like TSV file intersected against
        #[arg(long, required = true)]
        right: PathBuf,

        /// intersection mode: 'overlap', 'original', or 'comp-incl'
        #[arg(long, default_value = "overlap")]
        mode: String,

        /// remove duplicated regions from the result and re-sort
        #[arg(long)]
        unique: bool,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Merge {
        /// an input BED-like TSV file
        #[arg(required = true)]
        bedfile: PathBuf,

        /// only merge regions on the same strand
        #[arg(long)]
        strandness: bool,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Subtract {
        /// the BED-like TSV file to subtract from
        #[arg(long, required = true)]
        left: PathBuf,

        /// the BED-like TSV file whose intervals are removed
        #[arg(long, required = true)]
        right: PathBuf,

        /// only subtract intervals on the same strand
        #[arg(long)]
        strandness: bool,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Extend {
        /// an input BED-like TSV file
        #[arg(required = true)]
        bedfile: PathBuf,

        /// basepairs (or fraction of width, with --fold) to extend upstream
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        upstream: f64,

        /// basepairs (or fraction of width, with --fold) to extend downstream
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        downstream: f64,

        /// treat the amounts as fractions of each region's current width
        #[arg(long)]
        fold: bool,

        /// swap upstream/downstream for reverse-strand regions
        #[arg(long)]
        strandness: bool,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Sample {
        /// an input BED-like TSV file
        #[arg(required = true)]
        bedfile: PathBuf,

        /// number of regions to sample (without replacement)
        #[arg(long, required = true)]
        size: usize,

        /// seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Dedup {
        /// an input BED-like TSV file
        #[arg(required = true)]
        bedfile: PathBuf,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn run() -> Result<(), RegionsError> {
    let cli = Cli::parse();
    let backend: Backend = cli.backend.parse()?;
    match cli.command {
        Some(Commands::Intersect {
            left,
            right,
            mode,
            unique,
            output,
        }) => {
            let mode: IntersectMode = mode.parse()?;
            regions_intersect(&left, &right, mode, unique, backend, output.as_ref())
        }
        Some(Commands::Merge {
            bedfile,
            strandness,
            output,
        }) => regions_merge(&bedfile, strandness, backend, output.as_ref()),
        Some(Commands::Subtract {
            left,
            right,
            strandness,
            output,
        }) => regions_subtract(&left, &right, strandness, backend, output.as_ref()),
        Some(Commands::Extend {
            bedfile,
            upstream,
            downstream,
            fold,
            strandness,
            output,
        }) => regions_extend(
            &bedfile, upstream, downstream, fold, strandness, backend,
            output.as_ref(),
        ),
        Some(Commands::Sample {
            bedfile,
            size,
            seed,
            output,
        }) => regions_sample(&bedfile, size, seed, backend, output.as_ref()),
        Some(Commands::Dedup { bedfile, output }) => {
            regions_dedup(&bedfile, backend, output.as_ref())
        }
        None => {
            eprintln!("{}", INFO);
            std::process::exit(1);
        }
    }
}

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}
