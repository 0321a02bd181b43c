use std::io::{self, BufWriter};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use revcomp::Revcomp;

/// Output buffer size; matches the default chunk capacity
const OUTPUT_CAPACITY: usize = revcomp::DEFAULT_CHUNK_CAPACITY;

fn main() -> Result<()> {
    // stdout carries sequence data only, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut engine = Revcomp::new()?;
    let input = io::stdin().lock();
    let output = BufWriter::with_capacity(OUTPUT_CAPACITY, io::stdout().lock());
    engine.process(input, output)?;

    Ok(())
}
