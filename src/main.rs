//! Convert simulated collider events to Parquet tables.
//!
//! # How to use
//!
//!     hepconv EVENTFILE
//!
//! The event file should be in the HEPEVT or version 2 of the HepMC
//! format and can be compressed (bzip2, gzip, lz4, zstd). The selected
//! particles of each event are written to `particles.parquet`
//! (`particles_from_hepmc.parquet` for HepMC input) unless another output
//! file is given with `-o`.
//!
use std::time::Instant;

use hepconv::import::{import, Format, Input};
use hepconv::opt::Opt;
use hepconv::{ParquetSink, Selection};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

fn main() -> Result<()> {
    let opt = Opt::parse();

    let env = Env::default().filter_or("HEPCONV_LOG", opt.verbosity.as_str());
    env_logger::init_from_env(env);

    let start = Instant::now();

    let inputs = opt
        .files
        .iter()
        .map(|file| Input::open(file, opt.format))
        .collect::<Result<Vec<_>>>()?;
    let Some(first) = inputs.first() else {
        return Ok(());
    };

    let output = opt
        .output
        .clone()
        .unwrap_or_else(|| first.format.default_output().to_owned());
    if opt.selection != Selection::Stable
        && inputs.iter().any(|input| input.format == Format::HepMC)
    {
        warn!("HepMC input always uses selection '{}'", Selection::Stable);
    }

    let mut sink = ParquetSink::create(&output, opt.batch_size)
        .with_context(|| format!("Failed to create {output:?}"))?;
    let summary = import(inputs, opt.selection, &mut sink)?;

    info!(
        "Wrote {} events with {} of {} particles to {output:?}",
        summary.events, summary.selected, summary.particles
    );
    info!("Running time: {:.2?}", start.elapsed());
    Ok(())
}
