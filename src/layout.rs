//! Index arithmetic for wrapped records stored in fixed-capacity chunks
//!
//! Three coordinate systems are used:
//! - **logical**: index of a base among the bases only (newlines excluded), `0..real_len`
//! - **absolute**: byte position within the whole record, title line included
//! - **address**: `(chunk, offset)` pair for an absolute position
//!
//! All lines of a record except the last hold exactly [`LINE_WIDTH`] bases followed by
//! a newline, which makes the logical to absolute mapping a closed formula.

use std::ops::Range;

/// Number of bases on a full line
pub const LINE_WIDTH: usize = 60;

/// A position expressed as a chunk index and an offset inside that chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub chunk: usize,
    pub offset: usize,
}

/// The bytes one left-half chunk swaps with its mirror image in the right half
///
/// Both ranges are absolute, end-exclusive, start and end on a base, and contain the
/// same number of bases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanPair {
    pub left: Range<usize>,
    pub right: Range<usize>,
}

/// Geometry of one buffered record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Bytes in the title line, newline included
    title_len: usize,
    /// Bytes after the title line, newlines included
    data_len: usize,
    /// Bases after the title line
    real_len: usize,
    /// Capacity of a chunk in bytes
    capacity: usize,
}

impl Layout {
    /// Computes the layout of a record of `sum_len` bytes
    ///
    /// `ends_with_newline` tells whether the final sequence line is terminated.
    #[must_use]
    pub fn new(sum_len: usize, title_len: usize, ends_with_newline: bool, capacity: usize) -> Self {
        let data_len = sum_len.saturating_sub(title_len);
        let newlines = if ends_with_newline {
            data_len.div_ceil(LINE_WIDTH + 1)
        } else {
            data_len / (LINE_WIDTH + 1)
        };
        Self {
            title_len,
            data_len,
            real_len: data_len - newlines,
            capacity,
        }
    }

    #[must_use]
    pub fn title_len(&self) -> usize {
        self.title_len
    }

    #[must_use]
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Number of bases in the record
    #[must_use]
    pub fn real_len(&self) -> usize {
        self.real_len
    }

    /// Number of bases in each half; the center base of an odd record is excluded
    #[must_use]
    pub fn half(&self) -> usize {
        self.real_len / 2
    }

    /// Absolute position of the base with logical index `index`
    #[must_use]
    pub fn raw_offset(&self, index: usize) -> usize {
        self.title_len + index + index / LINE_WIDTH
    }

    /// Logical index of the first base at or after absolute position `pos`
    ///
    /// Positions inside the title map to 0; positions past the last base map to
    /// `real_len`.
    #[must_use]
    pub fn first_index_at(&self, pos: usize) -> usize {
        let rel = pos.saturating_sub(self.title_len);
        (rel - rel / (LINE_WIDTH + 1)).min(self.real_len)
    }

    /// Converts an absolute position to its chunk address
    #[must_use]
    pub fn address(&self, pos: usize) -> Address {
        Address {
            chunk: pos / self.capacity,
            offset: pos % self.capacity,
        }
    }

    /// Absolute position of the unpaired middle base, if the base count is odd
    #[must_use]
    pub fn center(&self) -> Option<usize> {
        (self.real_len % 2 == 1).then(|| self.raw_offset(self.half()))
    }

    /// Index of the chunk holding the last base of the left half
    #[must_use]
    pub fn left_end_chunk(&self) -> Option<usize> {
        let half = self.half();
        (half > 0).then(|| self.address(self.raw_offset(half - 1)).chunk)
    }

    /// The bases chunk `chunk` contributes to the left half, and their mirror image
    ///
    /// Returns `None` if the chunk holds no left-half bases.
    #[must_use]
    pub fn pair(&self, chunk: usize) -> Option<SpanPair> {
        let half = self.half();
        let start = (chunk * self.capacity).max(self.title_len);
        let end = (chunk + 1) * self.capacity;
        let a = self.first_index_at(start).min(half);
        let b = self.first_index_at(end).min(half);
        if a >= b {
            return None;
        }
        Some(SpanPair {
            left: self.raw_offset(a)..self.raw_offset(b - 1) + 1,
            right: self.raw_offset(self.real_len - b)..self.raw_offset(self.real_len - a - 1) + 1,
        })
    }

    /// Splits the left-half chunk indices into at most `workers` contiguous sub-ranges
    ///
    /// Each sub-range holds `ceil(chunks / workers)` indices except possibly the last.
    #[must_use]
    pub fn partition(&self, workers: usize) -> Vec<Range<usize>> {
        let Some(last) = self.left_end_chunk() else {
            return Vec::new();
        };
        let num_chunks = last + 1;
        let per_worker = num_chunks.div_ceil(workers.max(1));
        (0..workers.max(1))
            .map(|tid| {
                let start = tid * per_worker;
                start..(start + per_worker).min(num_chunks)
            })
            .filter(|range| !range.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    /// Builds a record with `bases` bases wrapped at `LINE_WIDTH` after a title
    fn wrapped(title: &[u8], bases: usize, trailing_newline: bool) -> Vec<u8> {
        let mut record = title.to_vec();
        for i in 0..bases {
            record.push(b"ACGT"[i % 4]);
            if (i + 1) % LINE_WIDTH == 0 && i + 1 != bases {
                record.push(b'\n');
            }
        }
        if trailing_newline {
            record.push(b'\n');
        }
        record
    }

    fn layout_of(record: &[u8], title_len: usize, capacity: usize) -> Layout {
        Layout::new(
            record.len(),
            title_len,
            record.last() == Some(&b'\n'),
            capacity,
        )
    }

    #[test]
    fn test_real_length() {
        for bases in [1, 59, 60, 61, 119, 120, 121, 1000] {
            for trailing in [true, false] {
                let record = wrapped(b">t\n", bases, trailing);
                let layout = layout_of(&record, 3, 64);
                assert_eq!(layout.real_len(), bases, "bases={bases} trailing={trailing}");
                assert_eq!(layout.title_len(), 3);
                assert_eq!(layout.data_len(), record.len() - 3);
            }
        }
    }

    #[test]
    fn test_raw_offset_points_at_bases() {
        let record = wrapped(b">title\n", 250, true);
        let layout = layout_of(&record, 7, 16);
        for index in 0..layout.real_len() {
            let pos = layout.raw_offset(index);
            assert_ne!(record[pos], b'\n');
            assert_eq!(layout.first_index_at(pos), index);
        }
    }

    #[test]
    fn test_first_index_at_newline() {
        let layout = Layout::new(3 + 61 + 5, 3, true, 64);
        // the newline after the first line belongs to no base; the next base is index 60
        assert_eq!(layout.first_index_at(3 + 60), 60);
        assert_eq!(layout.first_index_at(3 + 61), 60);
        assert_eq!(layout.first_index_at(0), 0);
        assert_eq!(layout.first_index_at(10_000), layout.real_len());
    }

    #[test]
    fn test_address() {
        let layout = Layout::new(100, 4, true, 16);
        assert_eq!(layout.address(0), Address { chunk: 0, offset: 0 });
        assert_eq!(layout.address(15), Address { chunk: 0, offset: 15 });
        assert_eq!(layout.address(16), Address { chunk: 1, offset: 0 });
        assert_eq!(layout.address(99), Address { chunk: 6, offset: 3 });
    }

    #[test]
    fn test_center() {
        let even = Layout::new(4 + 9, 4, true, 64);
        assert_eq!(even.real_len(), 8);
        assert_eq!(even.center(), None);

        let odd = Layout::new(4 + 6, 4, true, 64);
        assert_eq!(odd.real_len(), 5);
        assert_eq!(odd.center(), Some(6));
    }

    #[test]
    fn test_empty_record() {
        let layout = Layout::new(4, 4, true, 64);
        assert_eq!(layout.real_len(), 0);
        assert_eq!(layout.left_end_chunk(), None);
        assert!(layout.partition(4).is_empty());
        assert_eq!(layout.pair(0), None);
    }

    #[test]
    fn test_pairs_are_disjoint_and_balanced() {
        let capacity = 32;
        let record = wrapped(b">r1\n", 301, true);
        let layout = layout_of(&record, 4, capacity);
        let last = layout.left_end_chunk().unwrap();

        let pairs: Vec<SpanPair> = (0..=last).filter_map(|i| layout.pair(i)).collect();
        let bases = |range: &Range<usize>| record[range.clone()].iter().filter(|&&b| b != b'\n').count();

        let mut covered = 0;
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(bases(&pair.left), bases(&pair.right));
            assert!(pair.left.end <= pair.right.start);
            if let Some(next) = pairs.get(i + 1) {
                assert!(pair.left.end <= next.left.start);
                assert!(next.right.end <= pair.right.start);
            }
            covered += bases(&pair.left);
        }
        assert_eq!(covered, layout.half());
        assert_eq!(pairs.first().unwrap().left.start, 4);
        assert_eq!(pairs.first().unwrap().right.end, record.len() - 1);
    }

    #[test]
    fn test_left_end_chunk_on_chunk_boundary() {
        // 4 byte title + 28 bases ends the left half exactly at the end of chunk 0
        let layout = Layout::new(4 + 56 + 1, 4, true, 32);
        assert_eq!(layout.half(), 28);
        assert_eq!(layout.left_end_chunk(), Some(0));
        let pair = layout.pair(0).unwrap();
        assert_eq!(pair.left, 4..32);
        assert_eq!(layout.pair(1), None);
    }

    #[test]
    fn test_partition() {
        let layout = Layout::new(4 + 1000, 4, false, 10);
        let last = layout.left_end_chunk().unwrap();
        let ranges = layout.partition(4);
        assert_eq!(ranges.len(), 4);
        assert_eq!(ranges[0].start, 0);
        assert_eq!(ranges.last().unwrap().end, last + 1);
        for window in ranges.windows(2) {
            assert_eq!(window[0].end, window[1].start);
        }

        let single = layout.partition(1);
        assert_eq!(single, vec![0..last + 1]);

        // more workers than chunks leaves the surplus idle
        let small = Layout::new(4 + 20, 4, true, 64);
        assert_eq!(small.partition(8), vec![0..1]);
    }
}
