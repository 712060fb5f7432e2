use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logger;

#[derive(Parser)]
#[command(name = "memres-cmd")]
#[command(about = "Produce and inspect memory resource allocation logs")]
#[command(version)]
struct Cli {
    /// Increase diagnostic verbosity on stderr (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run allocate/free pairs against a simulated resource through a logging adaptor
    Trace {
        /// Log file to write (defaults to $MEMRES_LOG_FILE unless a stream is chosen)
        #[arg(short, long, conflicts_with_all = ["stdout", "stderr"])]
        file: Option<PathBuf>,

        /// Write the log to standard output
        #[arg(long, conflicts_with = "stderr")]
        stdout: bool,

        /// Write the log to standard error
        #[arg(long)]
        stderr: bool,

        /// Number of allocate/free pairs
        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// Size in bytes of each allocation
        #[arg(short, long, default_value_t = 100)]
        size: usize,

        /// Stream identifier recorded with each call
        #[arg(long, default_value_t = 0)]
        stream: u64,

        /// Free only every other allocation, leaving the rest outstanding
        #[arg(long)]
        leak: bool,
    },

    /// Summarize an allocation log as JSON
    Summarize {
        /// Log file to read
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match cli.command {
        Commands::Trace {
            file,
            stdout,
            stderr,
            count,
            size,
            stream,
            leak,
        } => commands::trace::run(commands::trace::TraceArgs {
            target: commands::trace::Target::from_flags(file, stdout, stderr),
            count,
            size,
            stream,
            leak,
        }),
        Commands::Summarize { path } => commands::summarize::run(path),
    }
}
