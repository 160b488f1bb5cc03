use std::{error::Error, fmt};

use crate::dtype::Dtype;

/// One of the two horizontal axes of a 3D survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Inline,
    Crossline,
}

impl Axis {
    pub fn orthogonal(self) -> Axis {
        match self {
            Axis::Inline => Axis::Crossline,
            Axis::Crossline => Axis::Inline,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Inline => write!(f, "inline"),
            Axis::Crossline => write!(f, "crossline"),
        }
    }
}

/// Sample encodings, numbered by their SEG-Y data sample format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    IbmFloat32 = 1,
    Int32 = 2,
    Int16 = 3,
    IeeeFloat32 = 5,
    IeeeFloat64 = 6,
    Int8 = 8,
    UInt32 = 10,
    UInt16 = 11,
    UInt8 = 16,
}

impl SampleFormat {
    pub fn from_code(code: u16) -> Option<SampleFormat> {
        let format = match code {
            1 => SampleFormat::IbmFloat32,
            2 => SampleFormat::Int32,
            3 => SampleFormat::Int16,
            5 => SampleFormat::IeeeFloat32,
            6 => SampleFormat::IeeeFloat64,
            8 => SampleFormat::Int8,
            10 => SampleFormat::UInt32,
            11 => SampleFormat::UInt16,
            16 => SampleFormat::UInt8,
            _ => return None,
        };
        Some(format)
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    /// Bytes per sample on disk.
    pub fn byte_size(self) -> usize {
        match self {
            SampleFormat::Int8 | SampleFormat::UInt8 => 1,
            SampleFormat::Int16 | SampleFormat::UInt16 => 2,
            SampleFormat::IbmFloat32
            | SampleFormat::Int32
            | SampleFormat::IeeeFloat32
            | SampleFormat::UInt32 => 4,
            SampleFormat::IeeeFloat64 => 8,
        }
    }

    /// The output element type that holds every value of this format
    /// without loss.
    pub fn native_dtype(self) -> Dtype {
        match self {
            SampleFormat::IbmFloat32 | SampleFormat::IeeeFloat32 => Dtype::F32,
            SampleFormat::IeeeFloat64 => Dtype::F64,
            SampleFormat::Int32 => Dtype::I32,
            SampleFormat::Int16 => Dtype::I16,
            SampleFormat::Int8 => Dtype::I8,
            SampleFormat::UInt32 => Dtype::U32,
            SampleFormat::UInt16 => Dtype::U16,
            SampleFormat::UInt8 => Dtype::U8,
        }
    }
}

/// The per-trace metadata the slicer and the position report need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHeader {
    pub sample_count: usize,
    /// CDP x/y, with the coordinate scalar already applied
    pub position: (f64, f64),
    pub sample_interval_us: u32,
}

impl TraceHeader {
    pub fn sample_interval_ms(&self) -> f64 {
        self.sample_interval_us as f64 / 1000.0
    }
}

/// Read access to a trace volume addressed by (inline, crossline).
///
/// Trace handles are the zero-based position of the trace in the
/// reader's native enumeration order.
pub trait TraceReader {
    type Error: Error + Send + Sync + 'static;

    fn dimensionality(&self) -> usize;

    /// Line numbers along `axis`, in the reader's enumeration order.
    fn line_numbers(&self, axis: Axis) -> &[i32];

    fn max_trace_sample_count(&self) -> usize;

    fn num_traces(&self) -> usize;

    /// `None` when the volume has no trace at this coordinate pair.
    fn trace_index(&self, inline: i32, crossline: i32) -> Option<usize>;

    fn trace_header(&self, index: usize) -> Result<TraceHeader, Self::Error>;

    fn trace_samples(&self, index: usize) -> Result<Vec<f64>, Self::Error>;

    fn sample_format(&self) -> SampleFormat;

    fn inline_numbers(&self) -> &[i32] {
        self.line_numbers(Axis::Inline)
    }

    fn crossline_numbers(&self) -> &[i32] {
        self.line_numbers(Axis::Crossline)
    }

    fn num_lines(&self, axis: Axis) -> usize {
        self.line_numbers(axis).len()
    }

    fn num_inlines(&self) -> usize {
        self.num_lines(Axis::Inline)
    }

    fn num_crosslines(&self) -> usize {
        self.num_lines(Axis::Crossline)
    }
}
