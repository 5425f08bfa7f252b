//! Output of selected particles
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::select::Row;

use arrow::array::{ArrayRef, Float64Builder, Int32Builder, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use thiserror::Error;

pub const DEFAULT_BATCH_SIZE: usize = 1024;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("too many particles in one event: {0}")]
    TooManyParticles(usize),
    #[error("output is already closed")]
    Closed,
}

/// Destination for per-event rows
pub trait RowSink {
    fn write_row(&mut self, row: &Row) -> Result<(), SinkError>;

    /// Flush pending rows and release the output
    fn finish(&mut self) -> Result<(), SinkError>;
}

impl RowSink for Vec<Row> {
    fn write_row(&mut self, row: &Row) -> Result<(), SinkError> {
        self.push(row.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Schema of the output table
///
/// - `particle_count` (Int32): number of selected particles
/// - `ids` (List<Int32>): PDG particle ids
/// - `px`, `py`, `pz`, `e` (List<Float64>): four-momenta in GeV
pub fn schema() -> SchemaRef {
    let list_of = |dtype| DataType::List(Arc::new(Field::new_list_field(dtype, true)));
    Arc::new(Schema::new(vec![
        Field::new("particle_count", DataType::Int32, false),
        Field::new("ids", list_of(DataType::Int32), false),
        Field::new("px", list_of(DataType::Float64), false),
        Field::new("py", list_of(DataType::Float64), false),
        Field::new("pz", list_of(DataType::Float64), false),
        Field::new("e", list_of(DataType::Float64), false),
    ]))
}

struct Columns {
    particle_count: Int32Builder,
    ids: ListBuilder<Int32Builder>,
    px: ListBuilder<Float64Builder>,
    py: ListBuilder<Float64Builder>,
    pz: ListBuilder<Float64Builder>,
    e: ListBuilder<Float64Builder>,
}

impl Columns {
    fn new() -> Self {
        Self {
            particle_count: Int32Builder::new(),
            ids: ListBuilder::new(Int32Builder::new()),
            px: ListBuilder::new(Float64Builder::new()),
            py: ListBuilder::new(Float64Builder::new()),
            pz: ListBuilder::new(Float64Builder::new()),
            e: ListBuilder::new(Float64Builder::new()),
        }
    }

    fn append(&mut self, row: &Row) -> Result<(), SinkError> {
        let count = row.particle_count();
        let count = i32::try_from(count).map_err(|_| SinkError::TooManyParticles(count))?;
        self.particle_count.append_value(count);
        self.ids.values().append_slice(row.ids());
        self.ids.append(true);
        for (col, vals) in [
            (&mut self.px, row.px()),
            (&mut self.py, row.py()),
            (&mut self.pz, row.pz()),
            (&mut self.e, row.e()),
        ] {
            col.values().append_slice(vals);
            col.append(true);
        }
        Ok(())
    }

    fn finish(&mut self, schema: SchemaRef) -> Result<RecordBatch, SinkError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(self.particle_count.finish()),
            Arc::new(self.ids.finish()),
            Arc::new(self.px.finish()),
            Arc::new(self.py.finish()),
            Arc::new(self.pz.finish()),
            Arc::new(self.e.finish()),
        ];
        Ok(RecordBatch::try_new(schema, columns)?)
    }
}

/// Writes rows to a Parquet file
///
/// Rows are collected in memory and written out in record batches of
/// `batch_size` rows.
pub struct ParquetSink<W: Write + Send> {
    writer: Option<ArrowWriter<W>>,
    schema: SchemaRef,
    columns: Columns,
    batch_size: usize,
    pending: usize,
    nrows: usize,
}

impl ParquetSink<File> {
    pub fn create<P: AsRef<Path>>(path: P, batch_size: usize) -> Result<Self, SinkError> {
        debug!("Creating output file {:?}", path.as_ref());
        let file = File::create(path)?;
        Self::new(file, batch_size)
    }
}

impl<W: Write + Send> ParquetSink<W> {
    pub fn new(out: W, batch_size: usize) -> Result<Self, SinkError> {
        let schema = schema();
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let writer = ArrowWriter::try_new(out, schema.clone(), Some(props))?;
        Ok(Self {
            writer: Some(writer),
            schema,
            columns: Columns::new(),
            batch_size: batch_size.max(1),
            pending: 0,
            nrows: 0,
        })
    }

    /// Number of rows accepted so far
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    // Move the pending rows out of the column builders
    fn take_batch(&mut self) -> Result<Option<RecordBatch>, SinkError> {
        if self.pending == 0 {
            return Ok(None);
        }
        self.pending = 0;
        self.columns.finish(self.schema.clone()).map(Some)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if self.writer.is_none() {
            return Err(SinkError::Closed);
        }
        let Some(batch) = self.take_batch()? else {
            return Ok(());
        };
        debug!("Writing batch of {} rows", batch.num_rows());
        let writer = self.writer.as_mut().ok_or(SinkError::Closed)?;
        writer.write(&batch)?;
        Ok(())
    }
}

impl<W: Write + Send> RowSink for ParquetSink<W> {
    fn write_row(&mut self, row: &Row) -> Result<(), SinkError> {
        if self.writer.is_none() {
            return Err(SinkError::Closed);
        }
        self.columns.append(row)?;
        self.pending += 1;
        self.nrows += 1;
        if self.pending >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        if self.writer.is_none() {
            return Ok(());
        }
        let flushed = self.flush();
        if let Some(writer) = self.writer.take() {
            writer.close()?;
        }
        flushed
    }
}
