//! Trace command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use memres_align::{CUDA_ALLOCATION_ALIGNMENT, align_up};
use memres_logging::{LogConfig, LoggingResourceAdaptor, OutputStream, ProcessEnv};
use memres_mr::{MemoryResource, SimulatedMemoryResource, StreamId};

/// Where the trace log goes.
#[derive(Debug)]
pub enum Target {
    File(PathBuf),
    Stdout,
    Stderr,
    /// Resolved from the environment.
    Env,
}

impl Target {
    pub fn from_flags(file: Option<PathBuf>, stdout: bool, stderr: bool) -> Target {
        match (file, stdout, stderr) {
            (Some(path), _, _) => Target::File(path),
            (None, true, _) => Target::Stdout,
            (None, false, true) => Target::Stderr,
            (None, false, false) => Target::Env,
        }
    }

    fn into_config(self) -> LogConfig {
        match self {
            Target::File(path) => LogConfig::file(path),
            Target::Stdout => LogConfig::stream(OutputStream::Stdout),
            Target::Stderr => LogConfig::stream(OutputStream::Stderr),
            Target::Env => LogConfig::from_env(),
        }
    }
}

pub struct TraceArgs {
    pub target: Target,
    pub count: usize,
    pub size: usize,
    pub stream: u64,
    pub leak: bool,
}

pub fn run(args: TraceArgs) -> Result<()> {
    let per_allocation = align_up(args.size.max(1), CUDA_ALLOCATION_ALIGNMENT);
    let capacity = per_allocation
        .checked_mul(args.count)
        .with_context(|| format!("{} allocations of {} bytes overflow", args.count, args.size))?;

    let upstream = SimulatedMemoryResource::new(capacity);
    let mr = LoggingResourceAdaptor::with_config(&upstream, args.target.into_config(), &ProcessEnv)
        .context("Failed to create the logging adaptor")?;
    log::debug!("tracing {} allocations into {}", args.count, mr.log_name());

    let stream = StreamId::new(args.stream);
    for i in 0..args.count {
        let ptr = mr
            .allocate(args.size, stream)
            .with_context(|| format!("Allocation #{i} failed"))?;
        if args.leak && i % 2 == 1 {
            continue;
        }
        // SAFETY: `ptr` was just allocated from `mr` with the same size and stream.
        unsafe { mr.deallocate(ptr, args.size, stream) }
            .with_context(|| format!("Deallocation #{i} failed"))?;
    }
    mr.flush()?;
    Ok(())
}
