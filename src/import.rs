use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::auto_decompress::auto_decompress;
use crate::convert::{fill_rows, finish_after, Summary};
use crate::hepevt;
use crate::hepmc;
use crate::select::{Selection, Selector};
use crate::sink::RowSink;

use anyhow::{Context, Result};
use log::{debug, warn};
use strum::{Display, EnumString};

#[derive(Display, EnumString, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Format {
    #[strum(to_string = "hepevt", serialize = "HEPEVT")]
    HepEvt,
    #[strum(to_string = "hepmc", serialize = "HepMC", serialize = "hepmc2")]
    HepMC,
}

impl Format {
    /// Output file used if none is given explicitly
    pub fn default_output(self) -> &'static Path {
        match self {
            Format::HepEvt => Path::new("particles.parquet"),
            Format::HepMC => Path::new("particles_from_hepmc.parquet"),
        }
    }
}

/// An opened event file
pub struct Input {
    pub name: PathBuf,
    pub format: Format,
    reader: Box<dyn BufRead>,
}

impl Input {
    /// Open `filename`, decompressing if needed
    ///
    /// If `format` is `None` it is deduced from the file content.
    pub fn open(filename: &Path, format: Option<Format>) -> Result<Self> {
        let file = File::open(filename)
            .with_context(|| format!("Failed to open {filename:?}"))?;
        let mut reader = auto_decompress(BufReader::new(file))
            .with_context(|| format!("Failed to read from {filename:?}"))?;
        let format = match format {
            Some(format) => format,
            None => detect_format(&mut reader)
                .with_context(|| format!("Failed to read from {filename:?}"))?,
        };
        debug!("{filename:?} is in {format} format");
        Ok(Self {
            name: filename.to_owned(),
            format,
            reader,
        })
    }
}

/// HepMC files start with a version line, anything else is taken as HEPEVT
pub fn detect_format<R: BufRead + ?Sized>(reader: &mut R) -> std::io::Result<Format> {
    loop {
        let buf = reader.fill_buf()?;
        let Some(start) = buf.iter().position(|b| !b.is_ascii_whitespace()) else {
            if buf.is_empty() {
                return Ok(Format::HepEvt);
            }
            let len = buf.len();
            reader.consume(len);
            continue;
        };
        return Ok(if buf[start..].starts_with(b"HepMC") {
            Format::HepMC
        } else {
            Format::HepEvt
        });
    }
}

/// Convert all events in `inputs` to rows of `sink`
///
/// The sink is finished afterwards, also when an error occurs.
pub fn import<S: RowSink + ?Sized>(
    inputs: Vec<Input>,
    selection: Selection,
    sink: &mut S,
) -> Result<Summary> {
    finish_after(sink, |sink| import_all(inputs, selection, sink))
}

fn import_all<S: RowSink + ?Sized>(
    inputs: Vec<Input>,
    selection: Selection,
    sink: &mut S,
) -> Result<Summary> {
    let mut total = Summary::default();
    for Input { name, format, reader } in inputs {
        debug!("Importing events from {name:?}");
        let summary = match format {
            Format::HepEvt => {
                let events = hepevt::Reader::new(reader);
                fill_rows(events, &Selector::new(selection), sink)
            }
            Format::HepMC => {
                // final-state particles are determined from the event graph
                let events = hepmc::events(reader);
                fill_rows(events, &Selector::new(Selection::Stable), sink)
            }
        };
        let summary = summary.with_context(|| format!("Failed to import {name:?}"))?;
        if summary.events == 0 {
            warn!("No events found in {name:?}");
        }
        debug!("{summary:?}");
        total += summary;
    }
    Ok(total)
}
