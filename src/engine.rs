//! Record-at-a-time driver
//!
//! [`Revcomp`] owns the strand and the worker pool for the whole run and pushes every
//! record of the input through read, reverse, write, and reset in turn.

use std::io::{Read, Write};

use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    reader::StrandReader,
    reverse::ReverseComplementer,
    strand::{Strand, DEFAULT_CHUNK_CAPACITY},
    writer::StrandWriter,
};

/// Totals for one call to [`Revcomp::process`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Number of records written
    pub records: usize,
    /// Number of bytes written
    pub bytes: usize,
}

/// Streaming reverse complement engine
pub struct Revcomp {
    strand: Strand,
    complementer: ReverseComplementer,
}

impl Revcomp {
    /// Creates an engine with default settings
    pub fn new() -> Result<Self> {
        RevcompBuilder::default().build()
    }

    /// Number of workers used for the parallel phase
    pub fn num_threads(&self) -> usize {
        self.complementer.num_threads()
    }

    /// Capacity of a single chunk in bytes
    pub fn chunk_capacity(&self) -> usize {
        self.strand.chunk_capacity()
    }

    /// Reverse complements every record of `input` and writes it to `output`
    ///
    /// The output is flushed once all records have been written. Any error aborts the
    /// run; records already written stay written.
    pub fn process<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<Summary> {
        let mut reader = StrandReader::new(input);
        let mut writer = StrandWriter::new(output);

        // drop anything left behind by a run that failed midway
        self.strand.clear();

        while let Some(chunks) = reader.read_record(&mut self.strand)? {
            debug!(
                record = reader.n_processed() - 1,
                chunks,
                bytes = self.strand.len(),
                "read record"
            );
            self.complementer.reverse(&mut self.strand)?;
            writer.write_strand(&self.strand)?;
            self.strand.reset();
        }
        writer.flush()?;

        let summary = Summary {
            records: writer.records_written(),
            bytes: writer.bytes_written(),
        };
        info!(
            records = summary.records,
            bytes = summary.bytes,
            chunks_allocated = self.strand.allocated(),
            "finished"
        );
        Ok(summary)
    }
}

/// Builder for [`Revcomp`] instances
#[derive(Default)]
pub struct RevcompBuilder {
    /// Optional worker count (0 for all cores)
    num_threads: Option<usize>,
    /// Optional chunk capacity in bytes
    chunk_capacity: Option<usize>,
}

impl RevcompBuilder {
    /// Sets the number of workers; 0 uses every available core
    #[must_use]
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Sets the capacity of a single chunk in bytes
    #[must_use]
    pub fn chunk_capacity(mut self, capacity: usize) -> Self {
        self.chunk_capacity = Some(capacity);
        self
    }

    pub fn build(self) -> Result<Revcomp> {
        let capacity = self.chunk_capacity.unwrap_or(DEFAULT_CHUNK_CAPACITY);
        if capacity == 0 {
            return Err(ConfigError::ZeroChunkCapacity.into());
        }
        let complementer = ReverseComplementer::new(self.num_threads.unwrap_or(0))?;
        debug!(
            num_threads = complementer.num_threads(),
            chunk_capacity = capacity,
            "engine ready"
        );
        Ok(Revcomp {
            strand: Strand::with_capacity(capacity),
            complementer,
        })
    }
}
