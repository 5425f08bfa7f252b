//! Conversion of simulated collider events to columnar tables.
//!
//! Events are read either from plain-text HEPEVT records or from HepMC
//! (version 2) event graphs. For each event, the selected particles are
//! written as one row of a Parquet table with the columns
//! `particle_count`, `ids`, `px`, `py`, `pz`, and `e`.
#![warn(clippy::all, rust_2018_idioms)]

pub mod auto_decompress;
pub mod convert;
pub mod event;
pub mod hepevt;
pub mod hepmc;
pub mod import;
pub mod opt;
pub mod particle;
pub mod select;
pub mod sink;

pub use convert::{convert, ConvertError, Summary};
pub use event::Event;
pub use particle::Particle;
pub use select::{Predicate, Row, Selection, Selector};
pub use sink::{ParquetSink, RowSink};
