//! Record output
//!
//! [`StrandWriter`] copies the record bytes of every chunk to the output stream and
//! keeps running totals for the final summary.

use std::io::Write;

use crate::{error::Result, strand::Strand};

/// Serializes buffered records to an output stream
///
/// Each chunk contributes its record bytes in chunk order; nothing is transformed.
/// Flushing is left to the caller.
pub struct StrandWriter<W: Write> {
    /// Inner writer
    inner: W,

    /// Number of records written
    records_written: usize,

    /// Number of bytes written
    bytes_written: usize,
}

impl<W: Write> StrandWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            records_written: 0,
            bytes_written: 0,
        }
    }

    /// Write the record currently held by the strand
    pub fn write_strand(&mut self, strand: &Strand) -> Result<()> {
        for chunk in strand.chunks() {
            self.inner.write_all(chunk.record())?;
            self.bytes_written += chunk.record_len();
        }
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::StrandReader;
    use anyhow::Result;

    #[test]
    fn test_write_multi_chunk_record() -> Result<()> {
        let data = b">r1\nACGTACGTACGTAC\n>r2\nT\n";
        let mut strand = Strand::with_capacity(5);
        let mut reader = StrandReader::new(&data[..]);
        let mut writer = StrandWriter::new(Vec::new());

        while reader.read_record(&mut strand)?.is_some() {
            writer.write_strand(&strand)?;
            strand.reset();
        }
        writer.flush()?;

        assert_eq!(writer.records_written(), 2);
        assert_eq!(writer.bytes_written(), data.len());
        assert_eq!(writer.into_inner(), data.to_vec());
        Ok(())
    }

    #[test]
    fn test_write_skips_carryover() -> Result<()> {
        let mut strand = Strand::with_capacity(64);
        let mut reader = StrandReader::new(&b">r1\nAC\n>r2\nGG\n"[..]);
        reader.read_record(&mut strand)?;

        let mut writer = StrandWriter::new(Vec::new());
        writer.write_strand(&strand)?;
        assert_eq!(writer.into_inner(), b">r1\nAC\n".to_vec());
        Ok(())
    }
}
