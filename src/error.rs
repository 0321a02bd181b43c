/// Custom Result type for revcomp operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the revcomp library, encompassing all possible error cases
/// that can occur while streaming records through the engine.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors related to the shape of an input record
    RecordError(#[from] RecordError),
    /// Errors raised by the worker pool during the parallel phase
    PoolError(#[from] PoolError),
    /// Errors raised while assembling the engine
    ConfigError(#[from] ConfigError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// Generic errors that can occur in any part of the system
    AnyhowError(#[from] anyhow::Error),
}

/// Errors describing input that the engine cannot process
///
/// Every variant carries the 0-based index of the offending record.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// The record does not begin with the `>` sigil
    #[error("Record {0} does not start with a '>' header line")]
    MissingHeader(usize),

    /// The record has a title line but no sequence bytes
    #[error("Record {0} has no sequence data")]
    EmptyRecord(usize),

    /// The title line does not fit inside the first chunk
    ///
    /// # Fields
    /// * `record` - Index of the record
    /// * `capacity` - Chunk capacity in bytes
    #[error("Title line of record {record} does not fit in a chunk of {capacity} bytes")]
    TitleTooLong { record: usize, capacity: usize },

    /// A computed byte range falls outside the buffered record
    ///
    /// # Arguments
    /// * First `usize` - The absolute byte position that was requested
    /// * Second `usize` - The number of bytes in the record
    #[error("Byte position {0} is outside of the buffered record ({1} bytes)")]
    OutOfRange(usize, usize),

    /// A sequence line other than the last does not hold exactly
    /// [`LINE_WIDTH`](crate::LINE_WIDTH) bases, or the last one is too long
    #[error("Record {0} is not wrapped at {width} bases per line", width = crate::LINE_WIDTH)]
    MalformedWrap(usize),
}

/// Errors from the worker pool used by the reverse complement phase
#[derive(thiserror::Error, Debug)]
pub enum PoolError {
    /// The thread pool could not be created
    #[error("Unable to build worker pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),

    /// At least one worker task panicked; the record is left in an undefined state
    #[error("A reverse complement worker panicked")]
    WorkerPanicked,
}

/// Errors raised by [`RevcompBuilder`](crate::RevcompBuilder)
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Chunks must be able to hold at least one byte
    #[error("Chunk capacity must be greater than zero")]
    ZeroChunkCapacity,
}
