//! Chunked in-memory representation of one record
//!
//! A [`Strand`] is an ordered list of fixed-capacity [`Chunk`]s. Chunks are allocated
//! lazily the first time a record needs them and are recycled for every following
//! record; they are never shrunk or freed while the strand lives.

use std::mem;
use std::ops::Range;

use memchr::memmem;

use crate::error::{RecordError, Result};
use crate::layout::Layout;

/// Record header sigil
pub const HEADER_SIGIL: u8 = b'>';

/// Line terminator
pub const NEWLINE: u8 = b'\n';

/// Default capacity of a single chunk in bytes
pub const DEFAULT_CHUNK_CAPACITY: usize = 64 * 1024;

/// A fixed-capacity byte buffer
///
/// `filled` bytes have been written from the stream, of which the first `record_len`
/// belong to the record currently being assembled. Anything in `record_len..filled`
/// is the start of the next record.
#[derive(Debug)]
pub struct Chunk {
    bytes: Box<[u8]>,
    filled: usize,
    record_len: usize,
}

impl Chunk {
    fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity].into_boxed_slice(),
            filled: 0,
            record_len: 0,
        }
    }

    /// Capacity of the chunk in bytes
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Number of bytes written from the stream
    #[must_use]
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Number of bytes that belong to the current record
    #[must_use]
    pub fn record_len(&self) -> usize {
        self.record_len
    }

    /// The bytes of the current record held by this chunk
    #[must_use]
    pub fn record(&self) -> &[u8] {
        &self.bytes[..self.record_len]
    }

    fn record_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.record_len]
    }

    /// Bytes staged for the next record
    #[must_use]
    pub fn carryover(&self) -> &[u8] {
        &self.bytes[self.record_len..self.filled]
    }

    /// A chunk whose record ends before its filled region is the last of its record
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.record_len != self.filled
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.filled == self.bytes.len()
    }

    pub fn clear(&mut self) {
        self.filled = 0;
        self.record_len = 0;
    }

    /// The writable tail of the chunk
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[self.filled..]
    }

    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(self.filled + n <= self.bytes.len());
        self.filled += n;
    }

    /// Truncates `record_len` at the first record boundary in the filled region
    ///
    /// A boundary is a sigil directly after a newline. When `leading_newline` is set, a
    /// sigil at offset 0 counts as well (the previous chunk ended with a newline). A
    /// sigil at offset 0 of a record's first chunk is that record's own title.
    pub(crate) fn mark_boundary(&mut self, leading_newline: bool) {
        let filled = &self.bytes[..self.filled];
        self.record_len = if leading_newline && filled.first() == Some(&HEADER_SIGIL) {
            0
        } else {
            memmem::find(filled, &[NEWLINE, HEADER_SIGIL]).map_or(self.filled, |i| i + 1)
        };
    }
}

/// The chunks of the record currently being processed
#[derive(Debug)]
pub struct Strand {
    chunks: Vec<Chunk>,
    count: usize,
    capacity: usize,
}

impl Strand {
    /// Creates an empty strand whose chunks hold `capacity` bytes each
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "chunk capacity must be greater than zero");
        Self {
            chunks: Vec::new(),
            count: 0,
            capacity,
        }
    }

    /// Capacity of every chunk in bytes
    #[must_use]
    pub fn chunk_capacity(&self) -> usize {
        self.capacity
    }

    /// Number of chunks holding the current record
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.count
    }

    /// Number of chunks allocated so far, in use or not
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.chunks.len()
    }

    /// The chunks holding the current record
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks[..self.count]
    }

    /// Total number of record bytes across all chunks
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks().iter().map(Chunk::record_len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the title line including its newline, if it ends inside chunk 0
    #[must_use]
    pub fn title_len(&self) -> Option<usize> {
        let first = self.chunks().first()?;
        memchr::memchr(NEWLINE, first.record()).map(|i| i + 1)
    }

    /// The final byte of the record
    #[must_use]
    pub fn last_byte(&self) -> Option<u8> {
        self.chunks()
            .iter()
            .rev()
            .find_map(|chunk| chunk.record().last().copied())
    }

    /// Mutable access to a single record byte by absolute position
    pub(crate) fn byte_mut(&mut self, chunk: usize, offset: usize) -> Option<&mut u8> {
        self.chunks[..self.count]
            .get_mut(chunk)
            .and_then(|c| c.record_mut().get_mut(offset))
    }

    /// Makes the next chunk active, allocating it if the pool is exhausted
    pub(crate) fn next_chunk(&mut self) -> &mut Chunk {
        if self.count == self.chunks.len() {
            self.chunks.push(Chunk::new(self.capacity));
        }
        self.count += 1;
        &mut self.chunks[self.count - 1]
    }

    /// Whether the most recently activated chunk ends with a newline
    pub(crate) fn active_ends_with_newline(&self) -> bool {
        self.chunks()
            .last()
            .is_some_and(|chunk| chunk.record().last() == Some(&NEWLINE))
    }

    /// Geometry of the buffered record, if its title line is complete
    #[must_use]
    pub fn layout(&self) -> Option<Layout> {
        Some(Layout::new(
            self.len(),
            self.title_len()?,
            self.last_byte() == Some(NEWLINE),
            self.capacity,
        ))
    }

    /// Prepares the strand for the next record
    ///
    /// Bytes staged past the current record are moved to the front of chunk 0 and
    /// scanned for a further boundary; every other chunk is cleared.
    pub fn reset(&mut self) {
        if self.count == 0 {
            return;
        }
        let last = self.count - 1;
        if self.chunks[last].is_last() {
            let (filled, record_len) = (self.chunks[last].filled, self.chunks[last].record_len);
            let carried = filled - record_len;
            if last == 0 {
                self.chunks[0].bytes.copy_within(record_len..filled, 0);
            } else {
                let (head, tail) = self.chunks.split_at_mut(last);
                head[0].bytes[..carried].copy_from_slice(tail[0].carryover());
            }
            self.chunks[1..=last].iter_mut().for_each(Chunk::clear);
            let first = &mut self.chunks[0];
            first.filled = carried;
            first.mark_boundary(false);
        } else {
            self.chunks[..=last].iter_mut().for_each(Chunk::clear);
        }
        self.count = 0;
    }

    /// Discards the current record and any staged carryover
    pub fn clear(&mut self) {
        self.chunks.iter_mut().for_each(Chunk::clear);
        self.count = 0;
    }

    /// Splits the record into mutable pieces covering the given absolute byte ranges
    ///
    /// `ranges` must be sorted and pairwise disjoint. The result holds one list of pieces
    /// per range, in the same order; a range that crosses chunk boundaries yields one
    /// piece per chunk it touches.
    pub(crate) fn carve(&mut self, ranges: &[Range<usize>]) -> Result<Vec<Vec<&mut [u8]>>> {
        let total = self.len();
        let mut chunks = self.chunks[..self.count].iter_mut().map(Chunk::record_mut);
        let mut rest: &mut [u8] = &mut [];
        let mut pos = 0;

        let mut carved = Vec::with_capacity(ranges.len());
        for range in ranges {
            debug_assert!(range.start >= pos, "ranges must be sorted and disjoint");
            let mut pieces = Vec::new();
            let mut start = range.start;
            while start < range.end {
                while pos + rest.len() <= start {
                    pos += rest.len();
                    rest = chunks
                        .next()
                        .ok_or(RecordError::OutOfRange(range.end - 1, total))?;
                }
                let (_, tail) = mem::take(&mut rest).split_at_mut(start - pos);
                let n = tail.len().min(range.end - start);
                let (piece, tail) = tail.split_at_mut(n);
                pieces.push(piece);
                rest = tail;
                start += n;
                pos = start;
            }
            carved.push(pieces);
        }
        Ok(carved)
    }
}
