use std::{
    collections::{HashMap, HashSet, hash_map::Entry},
    fs::File,
    io,
    path::Path,
};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::{debug, warn};
use memmap2::Mmap;
use thiserror::Error;

use crate::reader::{Axis, SampleFormat, TraceHeader, TraceReader};

pub const TEXTUAL_HEADER_LEN: usize = 3200;
pub const BINARY_HEADER_LEN: usize = 400;
pub const TRACE_HEADER_LEN: usize = 240;

// binary header, offsets relative to the start of the file
const BIN_SAMPLE_INTERVAL: usize = 3216;
const BIN_SAMPLE_COUNT: usize = 3220;
const BIN_SAMPLE_FORMAT: usize = 3224;
const BIN_BYTE_ORDER_CONSTANT: usize = 3296;
const BIN_REVISION: usize = 3500;
const BIN_FIXED_LENGTH: usize = 3502;
const BIN_EXTENDED_HEADERS: usize = 3504;

// trace header, offsets relative to the start of the trace
const TRACE_COORD_SCALAR: usize = 70;
const TRACE_SAMPLE_COUNT: usize = 114;
const TRACE_SAMPLE_INTERVAL: usize = 116;
const TRACE_CDP_X: usize = 180;
const TRACE_CDP_Y: usize = 184;

const BYTE_ORDER_CONSTANT: u32 = 0x0102_0304;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("file is {0} bytes long, too short for SEG-Y headers")]
    TooShort(usize),
    #[error("unsupported data sample format code {0}")]
    UnsupportedSampleFormat(u16),
    #[error("header byte position {0} does not address a 4-byte field in the trace header")]
    BadHeaderPosition(usize),
    #[error("trace index {index} out of range (num traces: {count})")]
    TraceOutOfRange { index: usize, count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    fn u16(self, buf: &[u8]) -> u16 {
        match self {
            Endian::Big => BigEndian::read_u16(buf),
            Endian::Little => LittleEndian::read_u16(buf),
        }
    }

    fn i16(self, buf: &[u8]) -> i16 {
        self.u16(buf) as i16
    }

    fn u32(self, buf: &[u8]) -> u32 {
        match self {
            Endian::Big => BigEndian::read_u32(buf),
            Endian::Little => LittleEndian::read_u32(buf),
        }
    }

    fn i32(self, buf: &[u8]) -> i32 {
        self.u32(buf) as i32
    }

    fn u64(self, buf: &[u8]) -> u64 {
        match self {
            Endian::Big => BigEndian::read_u64(buf),
            Endian::Little => LittleEndian::read_u64(buf),
        }
    }
}

/// 1-based byte positions of the line numbers in the trace header, as
/// they are written in the SEG-Y standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    pub inline_byte: usize,
    pub crossline_byte: usize,
}

impl Default for HeaderLayout {
    fn default() -> Self {
        Self {
            inline_byte: 189,
            crossline_byte: 193,
        }
    }
}

impl HeaderLayout {
    fn offset(byte: usize) -> Result<usize, ReadError> {
        if !(1..=TRACE_HEADER_LEN - 3).contains(&byte) {
            return Err(ReadError::BadHeaderPosition(byte));
        }
        Ok(byte - 1)
    }
}

/// Decodes an IBM System/360 single precision float. Exact in f64.
pub fn ibm_to_f64(bits: u32) -> f64 {
    let sign = if bits & 0x8000_0000 != 0 { -1.0 } else { 1.0 };
    let exponent = ((bits >> 24) & 0x7f) as i32 - 64;
    let fraction = (bits & 0x00ff_ffff) as f64 / 16_777_216.0;
    sign * fraction * 16f64.powi(exponent)
}

fn decode_sample(format: SampleFormat, endian: Endian, buf: &[u8]) -> f64 {
    match format {
        SampleFormat::IbmFloat32 => ibm_to_f64(endian.u32(buf)),
        SampleFormat::Int32 => endian.i32(buf) as f64,
        SampleFormat::Int16 => endian.i16(buf) as f64,
        SampleFormat::IeeeFloat32 => f32::from_bits(endian.u32(buf)) as f64,
        SampleFormat::IeeeFloat64 => f64::from_bits(endian.u64(buf)),
        SampleFormat::Int8 => buf[0] as i8 as f64,
        SampleFormat::UInt32 => endian.u32(buf) as f64,
        SampleFormat::UInt16 => endian.u16(buf) as f64,
        SampleFormat::UInt8 => buf[0] as f64,
    }
}

fn apply_scalar(value: i32, scalar: i16) -> f64 {
    match scalar {
        0 => value as f64,
        s if s < 0 => value as f64 / -(s as f64),
        s => value as f64 * s as f64,
    }
}

#[derive(Debug, Clone, Copy)]
struct TraceEntry {
    /// start of the trace header in the file
    offset: usize,
    inline: i32,
    crossline: i32,
    header: TraceHeader,
    /// number of complete samples actually present in the file
    stored_samples: usize,
}

/// A memory mapped SEG-Y file with its trace catalog.
///
/// The catalog is built by one pass over the trace headers when the file
/// is opened; trace lookups by coordinate pair are hash map lookups.
pub struct SegyVolume {
    mmap: Mmap,
    endian: Endian,
    sample_format: SampleFormat,
    traces: Vec<TraceEntry>,
    inline_numbers: Vec<i32>,
    crossline_numbers: Vec<i32>,
    by_coordinate: HashMap<(i32, i32), usize>,
    max_samples: usize,
    unique_coordinates: bool,
}

impl SegyVolume {
    pub fn open(path: impl AsRef<Path>, layout: HeaderLayout) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        if metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{} is a directory", path.display()),
            )
            .into());
        }
        let len = metadata.len() as usize;
        if len < TEXTUAL_HEADER_LEN + BINARY_HEADER_LEN {
            return Err(ReadError::TooShort(len));
        }

        // Safety: the file is opened read-only and the map lives as long as self
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_mmap(mmap, layout)
    }

    fn from_mmap(mmap: Mmap, layout: HeaderLayout) -> Result<Self, ReadError> {
        let inline_offset = HeaderLayout::offset(layout.inline_byte)?;
        let crossline_offset = HeaderLayout::offset(layout.crossline_byte)?;

        // rev1 files leave the byte order constant unassigned, so anything
        // but the swapped constant means big endian
        let endian = match BigEndian::read_u32(&mmap[BIN_BYTE_ORDER_CONSTANT..]) {
            c if c == BYTE_ORDER_CONSTANT.swap_bytes() => Endian::Little,
            _ => Endian::Big,
        };

        let format_code = endian.u16(&mmap[BIN_SAMPLE_FORMAT..]);
        let sample_format = SampleFormat::from_code(format_code)
            .ok_or(ReadError::UnsupportedSampleFormat(format_code))?;
        let bin_samples = endian.u16(&mmap[BIN_SAMPLE_COUNT..]) as usize;
        let bin_interval = endian.u16(&mmap[BIN_SAMPLE_INTERVAL..]) as u32;
        // rev0 files may have anything in the bytes rev1 assigned later
        let revision = endian.u16(&mmap[BIN_REVISION..]);
        let (fixed_length, extended_headers) = if revision >= 0x0100 {
            (
                endian.u16(&mmap[BIN_FIXED_LENGTH..]) == 1,
                endian.i16(&mmap[BIN_EXTENDED_HEADERS..]).max(0) as usize,
            )
        } else {
            (false, 0)
        };

        debug!(
            "endian: {endian:?}, revision: {revision:#06x}, format: {sample_format:?}, samples: {bin_samples}, \
             interval: {bin_interval}us, extended headers: {extended_headers}"
        );

        let sample_size = sample_format.byte_size();
        let mut offset = TEXTUAL_HEADER_LEN + BINARY_HEADER_LEN + extended_headers * TEXTUAL_HEADER_LEN;

        let mut traces = Vec::new();
        let mut inline_numbers = Vec::new();
        let mut crossline_numbers = Vec::new();
        let mut seen_inlines = HashSet::new();
        let mut seen_crosslines = HashSet::new();
        let mut by_coordinate = HashMap::new();
        let mut unique_coordinates = true;
        // variable length traces only count what their headers declare
        let mut max_samples = if fixed_length { bin_samples } else { 0 };

        while offset + TRACE_HEADER_LEN <= mmap.len() {
            let th = &mmap[offset..offset + TRACE_HEADER_LEN];

            let trace_samples = endian.u16(&th[TRACE_SAMPLE_COUNT..]) as usize;
            let sample_count = if fixed_length || trace_samples == 0 {
                bin_samples
            } else {
                trace_samples
            };
            let interval = match endian.u16(&th[TRACE_SAMPLE_INTERVAL..]) as u32 {
                0 => bin_interval,
                dt => dt,
            };
            let scalar = endian.i16(&th[TRACE_COORD_SCALAR..]);
            let position = (
                apply_scalar(endian.i32(&th[TRACE_CDP_X..]), scalar),
                apply_scalar(endian.i32(&th[TRACE_CDP_Y..]), scalar),
            );
            let inline = endian.i32(&th[inline_offset..]);
            let crossline = endian.i32(&th[crossline_offset..]);

            let data_start = offset + TRACE_HEADER_LEN;
            let available = (mmap.len() - data_start) / sample_size;
            let stored_samples = sample_count.min(available);
            if stored_samples < sample_count {
                warn!(
                    "trace {} at ({inline}, {crossline}) truncated: {stored_samples} of {sample_count} samples present",
                    traces.len()
                );
            }

            let index = traces.len();
            if seen_inlines.insert(inline) {
                inline_numbers.push(inline);
            }
            if seen_crosslines.insert(crossline) {
                crossline_numbers.push(crossline);
            }
            match by_coordinate.entry((inline, crossline)) {
                Entry::Vacant(e) => {
                    e.insert(index);
                }
                Entry::Occupied(_) => unique_coordinates = false,
            }
            max_samples = max_samples.max(sample_count);

            traces.push(TraceEntry {
                offset,
                inline,
                crossline,
                header: TraceHeader {
                    sample_count,
                    position,
                    sample_interval_us: interval,
                },
                stored_samples,
            });

            offset = data_start + sample_count * sample_size;
        }

        debug!(
            "catalogued {} traces, {} inlines, {} crosslines",
            traces.len(),
            inline_numbers.len(),
            crossline_numbers.len()
        );

        Ok(Self {
            mmap,
            endian,
            sample_format,
            traces,
            inline_numbers,
            crossline_numbers,
            by_coordinate,
            max_samples,
            unique_coordinates,
        })
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Line coordinates of a trace, as read from its header.
    pub fn trace_coordinates(&self, index: usize) -> Result<(i32, i32), ReadError> {
        let entry = self.entry(index)?;
        Ok((entry.inline, entry.crossline))
    }

    fn entry(&self, index: usize) -> Result<&TraceEntry, ReadError> {
        self.traces.get(index).ok_or(ReadError::TraceOutOfRange {
            index,
            count: self.traces.len(),
        })
    }
}

impl TraceReader for SegyVolume {
    type Error = ReadError;

    fn dimensionality(&self) -> usize {
        if self.unique_coordinates { 3 } else { 2 }
    }

    fn line_numbers(&self, axis: Axis) -> &[i32] {
        match axis {
            Axis::Inline => &self.inline_numbers,
            Axis::Crossline => &self.crossline_numbers,
        }
    }

    fn max_trace_sample_count(&self) -> usize {
        self.max_samples
    }

    fn num_traces(&self) -> usize {
        self.traces.len()
    }

    fn trace_index(&self, inline: i32, crossline: i32) -> Option<usize> {
        self.by_coordinate.get(&(inline, crossline)).copied()
    }

    fn trace_header(&self, index: usize) -> Result<TraceHeader, ReadError> {
        Ok(self.entry(index)?.header)
    }

    fn trace_samples(&self, index: usize) -> Result<Vec<f64>, ReadError> {
        let entry = self.entry(index)?;
        let size = self.sample_format.byte_size();
        let start = entry.offset + TRACE_HEADER_LEN;
        let bytes = &self.mmap[start..start + entry.stored_samples * size];
        Ok(bytes
            .chunks_exact(size)
            .map(|chunk| decode_sample(self.sample_format, self.endian, chunk))
            .collect())
    }

    fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }
}
