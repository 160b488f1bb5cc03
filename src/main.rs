use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use log::info;
use segy_slice::{
    convert::{ConvertOptions, convert},
    dtype::Dtype,
    exit::{EX_OK, init_logging, report},
    read::HeaderLayout,
    slice::SampleOrder,
    write::{Endianess, OutputFormat},
};

#[derive(Debug, clap::ValueEnum, Clone, Copy)]
enum ArgEndianess {
    Native,
    Little,
    Big,
}

impl From<ArgEndianess> for Endianess {
    fn from(value: ArgEndianess) -> Self {
        match value {
            ArgEndianess::Native => Endianess::Native,
            ArgEndianess::Little => Endianess::Little,
            ArgEndianess::Big => Endianess::Big,
        }
    }
}

#[derive(Debug, clap::ValueEnum, Clone, Copy)]
enum ArgSampleOrder {
    ShallowFirst,
    DeepFirst,
}

#[derive(Debug, clap::ValueEnum, Clone, Copy)]
enum ArgFormat {
    Npy,
    Tiff,
}

/// Extract an inline or crossline slice from a 3D SEG-Y volume to an array file.
///
/// Set the index of the axis you do not want to -1: `800 -1` extracts the
/// inline at index 800, `-1 12` the crossline at index 12.
#[derive(Parser, Debug)]
struct Args {
    /// Path to an existing SEG-Y file of 3D seismic data
    segy_path: PathBuf,
    /// Path of the array file to create (.npy, or .tif/.tiff)
    dest_path: PathBuf,
    /// Zero-based index of the inline slice to extract, -1 for none
    #[arg(allow_negative_numbers = true)]
    inline_index: i64,
    /// Zero-based index of the crossline slice to extract, -1 for none
    #[arg(allow_negative_numbers = true)]
    crossline_index: i64,
    /// Output element type (e.g. f4, float32, i2). Derived from the SEG-Y
    /// sample format if not given.
    #[arg(long)]
    dtype: Option<Dtype>,
    /// Sample value to use for missing or short traces
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    null: f64,
    /// Whether trace sample 0 goes to the first or the last row
    #[arg(long, value_enum, default_value_t = ArgSampleOrder::ShallowFirst)]
    sample_order: ArgSampleOrder,
    /// Byte order of the output file
    #[arg(long, value_enum, default_value_t = ArgEndianess::Native)]
    endianess: ArgEndianess,
    /// Output format, guessed from the destination extension if not given
    #[arg(long, value_enum)]
    format: Option<ArgFormat>,
    /// 1-based byte position of the inline number in the trace header
    #[arg(long, default_value_t = 189)]
    inline_byte: usize,
    /// 1-based byte position of the crossline number in the trace header
    #[arg(long, default_value_t = 193)]
    crossline_byte: usize,
}

impl Args {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            inline_index: self.inline_index,
            crossline_index: self.crossline_index,
            dtype: self.dtype,
            null_value: self.null,
            sample_order: match self.sample_order {
                ArgSampleOrder::ShallowFirst => SampleOrder::ShallowFirst,
                ArgSampleOrder::DeepFirst => SampleOrder::DeepFirst,
            },
            endianess: self.endianess.into(),
            format: self.format.map(|format| match format {
                ArgFormat::Npy => OutputFormat::Npy,
                ArgFormat::Tiff => OutputFormat::Tiff,
            }),
            layout: HeaderLayout {
                inline_byte: self.inline_byte,
                crossline_byte: self.crossline_byte,
            },
        }
    }
}

fn main() -> ExitCode {
    let multi_progress = match init_logging() {
        Ok(multi_progress) => multi_progress,
        Err(err) => return report(&err),
    };

    let args = Args::parse();

    match convert(&args.segy_path, &args.dest_path, &args.options(), &multi_progress) {
        Ok(slice) => {
            info!(
                "extracted {} slice {} to {}",
                slice.axis,
                slice.line_index,
                args.dest_path.display()
            );
            ExitCode::from(EX_OK)
        }
        Err(err) => report(err.as_ref()),
    }
}
