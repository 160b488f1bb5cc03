use std::{
    error::Error,
    io::{self, Write},
    num::NonZeroUsize,
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use log::info;
use segy_slice::{
    exit::{EX_OK, init_logging, report},
    position::sampled_trace_positions,
    read::{HeaderLayout, SegyVolume},
    reader::TraceReader,
};

/// Print the position, sample count and sample interval of the traces in
/// a SEG-Y file.
#[derive(Parser, Debug)]
struct Args {
    /// Path to an existing SEG-Y file of 3D seismic data
    segy_path: PathBuf,
    /// Only print every Nth trace
    #[arg(long, default_value = "1")]
    every: NonZeroUsize,
    /// 1-based byte position of the inline number in the trace header
    #[arg(long, default_value_t = 189)]
    inline_byte: usize,
    /// 1-based byte position of the crossline number in the trace header
    #[arg(long, default_value_t = 193)]
    crossline_byte: usize,
}

fn print_positions(args: &Args) -> Result<(), Box<dyn Error + Sync + Send>> {
    let layout = HeaderLayout {
        inline_byte: args.inline_byte,
        crossline_byte: args.crossline_byte,
    };
    let volume = SegyVolume::open(&args.segy_path, layout)?;
    info!(
        "{} traces, printing every {}",
        volume.num_traces(),
        args.every
    );

    let mut out = io::stdout().lock();
    for position in sampled_trace_positions(&volume, args.every) {
        writeln!(out, "{}", position?)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = init_logging() {
        return report(&err);
    }

    let args = Args::parse();

    match print_positions(&args) {
        Ok(()) => ExitCode::from(EX_OK),
        Err(err) => report(err.as_ref()),
    }
}
