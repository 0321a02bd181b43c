//! Streaming, chunk-buffered reverse complement of wrapped FASTA records
//!
//! Records are read one at a time into a [`Strand`] of fixed-capacity chunks that are
//! recycled between records, reverse complemented in place by a fixed pool of workers,
//! and written back out with the original line wrapping.
//!
//! ```no_run
//! use std::io;
//!
//! let mut engine = revcomp::Revcomp::new()?;
//! engine.process(io::stdin().lock(), io::stdout().lock())?;
//! # Ok::<(), revcomp::Error>(())
//! ```

mod complement;
mod engine;
mod error;
mod layout;
mod reader;
mod reverse;
mod strand;
mod writer;

pub use complement::{ComplementTable, COMPLEMENT};
pub use engine::{Revcomp, RevcompBuilder, Summary};
pub use error::{ConfigError, Error, PoolError, RecordError, Result};
pub use layout::{Address, Layout, SpanPair, LINE_WIDTH};
pub use reader::StrandReader;
pub use reverse::{resolve_threads, ReverseComplementer};
pub use strand::{Chunk, Strand, DEFAULT_CHUNK_CAPACITY, HEADER_SIGIL, NEWLINE};
pub use writer::StrandWriter;
