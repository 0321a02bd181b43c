//! Streaming record reader
//!
//! Pulls bytes from any [`Read`] implementor into a [`Strand`] until one complete record
//! is buffered: either the stream ends or the header line of the next record shows up.
//! Bytes of the next record that were read along the way stay in the final chunk and
//! are moved forward by [`Strand::reset`].

use std::io::{self, Read};

use tracing::trace;

use crate::{
    error::{RecordError, Result},
    layout::{Layout, LINE_WIDTH},
    strand::{Chunk, Strand, HEADER_SIGIL, NEWLINE},
};

/// Fills the spare capacity of a chunk from the reader
///
/// Short reads are retried until the chunk is full. Returns `true` if the end of the
/// stream was reached.
fn fill_chunk<R: Read>(reader: &mut R, chunk: &mut Chunk) -> io::Result<bool> {
    while !chunk.is_full() {
        match reader.read(chunk.spare_mut()) {
            Ok(0) => return Ok(true),
            Ok(n) => chunk.advance(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(false)
}

/// Checks that the sequence lines of a record hold exactly [`LINE_WIDTH`] bases each,
/// except for the last one
///
/// Every newline after the title must sit on a wrap column or end the record, and there
/// must be as many of them as `layout` derived from the record length.
fn is_regularly_wrapped(strand: &Strand, layout: &Layout) -> bool {
    let title_len = layout.title_len();
    let end = title_len + layout.data_len();
    let mut newlines = 0;
    let mut base = 0;
    for chunk in strand.chunks() {
        let record = chunk.record();
        for pos in memchr::memchr_iter(NEWLINE, record).map(|i| base + i) {
            if pos < title_len {
                continue;
            }
            if (pos - title_len) % (LINE_WIDTH + 1) != LINE_WIDTH && pos + 1 != end {
                return false;
            }
            newlines += 1;
        }
        base += record.len();
    }
    newlines == layout.data_len() - layout.real_len()
}

/// Reads records from a byte stream one at a time
#[derive(Debug)]
pub struct StrandReader<R: Read> {
    inner: R,
    n_processed: usize,
}

impl<R: Read> StrandReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            n_processed: 0,
        }
    }

    /// Number of records read so far
    pub fn n_processed(&self) -> usize {
        self.n_processed
    }

    /// Buffers the next record into `strand`
    ///
    /// The strand must have been [`reset`](Strand::reset) since the previous record.
    ///
    /// Returns the number of chunks holding the record, or `None` once the stream is
    /// exhausted.
    pub fn read_record(&mut self, strand: &mut Strand) -> Result<Option<usize>> {
        debug_assert_eq!(strand.chunk_count(), 0, "strand was not reset");
        loop {
            let first = strand.chunk_count() == 0;
            let leading_newline = strand.active_ends_with_newline();
            let chunk = strand.next_chunk();

            // the carryover already holds a complete record
            if chunk.is_last() {
                break;
            }

            let eof = fill_chunk(&mut self.inner, chunk)?;
            if first && chunk.filled() == 0 {
                strand.reset();
                return Ok(None);
            }
            chunk.mark_boundary(leading_newline);
            trace!(
                record = self.n_processed,
                filled = chunk.filled(),
                record_len = chunk.record_len(),
                "filled chunk"
            );

            if eof || chunk.is_last() {
                break;
            }
        }

        self.validate(strand)?;
        self.n_processed += 1;
        Ok(Some(strand.chunk_count()))
    }

    /// Rejects records the reverse complement step cannot interpret
    fn validate(&self, strand: &Strand) -> Result<()> {
        let record = self.n_processed;
        let first = &strand.chunks()[0];
        if first.record().first() != Some(&HEADER_SIGIL) {
            return Err(RecordError::MissingHeader(record).into());
        }
        let Some(layout) = strand.layout() else {
            // the title is unterminated: either it runs past chunk 0 or the stream ended
            if first.record_len() == strand.chunk_capacity() {
                return Err(RecordError::TitleTooLong {
                    record,
                    capacity: strand.chunk_capacity(),
                }
                .into());
            }
            return Err(RecordError::EmptyRecord(record).into());
        };
        if layout.real_len() == 0 {
            return Err(RecordError::EmptyRecord(record).into());
        }
        if !is_regularly_wrapped(strand, &layout) {
            return Err(RecordError::MalformedWrap(record).into());
        }
        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
