use std::path::PathBuf;

use crate::import::Format;
use crate::select::Selection;
use crate::sink::DEFAULT_BATCH_SIZE;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "hepconv",
    about = "Convert HEPEVT and HepMC event files to Parquet tables"
)]
pub struct Opt {
    /// Verbosity level: 'off', 'error', 'warn', 'info', 'debug', 'trace'
    #[arg(short, long, default_value = "info")]
    pub verbosity: String,

    /// Output file. Defaults to 'particles.parquet' for HEPEVT input
    /// and 'particles_from_hepmc.parquet' for HepMC input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Selected particles: 'stable' or 'stable-lepton'. HepMC input
    /// always uses 'stable'
    #[arg(short, long, default_value = "stable")]
    pub selection: Selection,

    /// Input format: 'hepevt' or 'hepmc'. Deduced from the first input
    /// file if not given
    #[arg(short, long)]
    pub format: Option<Format>,

    /// Number of events written at once
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Event files to convert
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}
