use std::error::Error as StdError;

use indicatif::ProgressBar;
use log::{debug, warn};
use ndarray::Array2;
use thiserror::Error;

use crate::{
    dtype::{Dtype, Element},
    reader::{Axis, TraceReader},
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DimensionalityError {
    #[error("cannot slice {0} dimensional seismic")]
    NotThreeDimensional(usize),
    #[error(
        "exactly one of inline or crossline slice index must be specified \
         (got inline {inline}, crossline {crossline})"
    )]
    AxisSelection { inline: i64, crossline: i64 },
}

#[derive(Error, Debug)]
pub enum SliceError {
    #[error(transparent)]
    Dimensionality(#[from] DimensionalityError),
    #[error("{axis} slice index {index} out of range 0 to {bound}")]
    LineIndexOutOfRange {
        axis: Axis,
        index: usize,
        bound: usize,
    },
    #[error("reading trace failed: {0}")]
    Reader(#[source] Box<dyn StdError + Send + Sync>),
}

impl SliceError {
    fn reader(err: impl StdError + Send + Sync + 'static) -> Self {
        SliceError::Reader(Box::new(err))
    }
}

/// Where trace sample 0 lands on the sample axis of a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleOrder {
    /// Sample 0 in row 0, depth increasing downwards.
    #[default]
    ShallowFirst,
    /// Sample 0 in the last row.
    DeepFirst,
}

impl SampleOrder {
    /// Row of trace sample `sample` in a slice with `rows` rows, `None`
    /// when the sample falls outside the slice.
    pub fn row(self, sample: usize, rows: usize) -> Option<usize> {
        if sample >= rows {
            return None;
        }
        match self {
            SampleOrder::ShallowFirst => Some(sample),
            SampleOrder::DeepFirst => Some(rows - 1 - sample),
        }
    }
}

/// The fixed line of a slice: an axis plus a zero-based position into the
/// reader's line numbers for that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceSelection {
    pub axis: Axis,
    pub line_index: usize,
}

impl SliceSelection {
    pub fn inline(line_index: usize) -> Self {
        Self {
            axis: Axis::Inline,
            line_index,
        }
    }

    pub fn crossline(line_index: usize) -> Self {
        Self {
            axis: Axis::Crossline,
            line_index,
        }
    }

    /// Builds a selection from a pair of signed indices where a negative
    /// index means "not selected". Exactly one must be selected.
    pub fn from_indices(inline: i64, crossline: i64) -> Result<Self, DimensionalityError> {
        match (usize::try_from(inline), usize::try_from(crossline)) {
            (Ok(index), Err(_)) => Ok(Self::inline(index)),
            (Err(_), Ok(index)) => Ok(Self::crossline(index)),
            _ => Err(DimensionalityError::AxisSelection { inline, crossline }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceRequest {
    pub selection: SliceSelection,
    /// Written wherever a trace is missing or too short.
    pub null_value: f64,
    pub sample_order: SampleOrder,
}

impl SliceRequest {
    pub fn new(selection: SliceSelection) -> Self {
        Self {
            selection,
            null_value: 0.0,
            sample_order: SampleOrder::default(),
        }
    }

    pub fn with_null(mut self, null_value: f64) -> Self {
        self.null_value = null_value;
        self
    }

    pub fn with_sample_order(mut self, sample_order: SampleOrder) -> Self {
        self.sample_order = sample_order;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillStats {
    pub traces_copied: usize,
    pub traces_missing: usize,
    /// Samples a trace declared but that had no cell (or no data) to go to.
    pub cells_skipped: usize,
}

/// An extracted slice: `data` has shape (samples, orthogonal lines).
#[derive(Debug, Clone, PartialEq)]
pub struct Slice<A> {
    pub axis: Axis,
    pub line_index: usize,
    pub line_number: i32,
    pub data: A,
    pub stats: FillStats,
}

impl<A> Slice<A> {
    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> Slice<B> {
        Slice {
            axis: self.axis,
            line_index: self.line_index,
            line_number: self.line_number,
            data: f(self.data),
            stats: self.stats,
        }
    }
}

/// Slice data of an element type chosen at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceData {
    I8(Array2<i8>),
    I16(Array2<i16>),
    I32(Array2<i32>),
    U8(Array2<u8>),
    U16(Array2<u16>),
    U32(Array2<u32>),
    F32(Array2<f32>),
    F64(Array2<f64>),
}

/// Evaluates `$body` with `$array` bound to the typed array inside a
/// [`SliceData`].
macro_rules! with_array {
    ($data:expr, $array:ident => $body:expr) => {
        match $data {
            $crate::slice::SliceData::I8($array) => $body,
            $crate::slice::SliceData::I16($array) => $body,
            $crate::slice::SliceData::I32($array) => $body,
            $crate::slice::SliceData::U8($array) => $body,
            $crate::slice::SliceData::U16($array) => $body,
            $crate::slice::SliceData::U32($array) => $body,
            $crate::slice::SliceData::F32($array) => $body,
            $crate::slice::SliceData::F64($array) => $body,
        }
    };
}
pub(crate) use with_array;

impl SliceData {
    pub fn dtype(&self) -> Dtype {
        match self {
            SliceData::I8(_) => Dtype::I8,
            SliceData::I16(_) => Dtype::I16,
            SliceData::I32(_) => Dtype::I32,
            SliceData::U8(_) => Dtype::U8,
            SliceData::U16(_) => Dtype::U16,
            SliceData::U32(_) => Dtype::U32,
            SliceData::F32(_) => Dtype::F32,
            SliceData::F64(_) => Dtype::F64,
        }
    }

    /// (rows, columns) = (samples, orthogonal lines)
    pub fn dim(&self) -> (usize, usize) {
        with_array!(self, a => a.dim())
    }

    /// Cell value widened to f64, `None` outside the array.
    pub fn get_f64(&self, row: usize, column: usize) -> Option<f64> {
        with_array!(self, a => a.get((row, column)).map(|v| *v as f64))
    }
}

pub fn check_dimensionality<R: TraceReader>(reader: &R) -> Result<(), DimensionalityError> {
    match reader.dimensionality() {
        3 => Ok(()),
        n => Err(DimensionalityError::NotThreeDimensional(n)),
    }
}

/// Extracts a slice with element type `T`.
pub fn extract_slice_as<T: Element, R: TraceReader>(
    reader: &R,
    request: &SliceRequest,
) -> Result<Slice<Array2<T>>, SliceError> {
    extract_slice_as_with_progress(reader, request, &ProgressBar::hidden())
}

/// Like [`extract_slice_as`], advancing `progress` once per orthogonal line.
pub fn extract_slice_as_with_progress<T: Element, R: TraceReader>(
    reader: &R,
    request: &SliceRequest,
    progress: &ProgressBar,
) -> Result<Slice<Array2<T>>, SliceError> {
    check_dimensionality(reader)?;

    let SliceSelection { axis, line_index } = request.selection;
    let fixed_lines = reader.line_numbers(axis);
    let line_number = *fixed_lines
        .get(line_index)
        .ok_or(SliceError::LineIndexOutOfRange {
            axis,
            index: line_index,
            bound: fixed_lines.len(),
        })?;

    let rows = reader.max_trace_sample_count();
    let lines = reader.line_numbers(axis.orthogonal());
    debug!(
        "{axis} {line_number} (index {line_index}): {rows} samples x {} {}s, dtype {}",
        lines.len(),
        axis.orthogonal(),
        T::DTYPE
    );

    let null = T::from_f64(request.null_value);
    let mut data = Array2::from_elem((rows, lines.len()), null);
    let mut stats = FillStats::default();

    progress.set_length(lines.len() as u64);
    for (column, &line) in lines.iter().enumerate() {
        progress.inc(1);

        let (inline, crossline) = match axis {
            Axis::Inline => (line_number, line),
            Axis::Crossline => (line, line_number),
        };
        let Some(index) = reader.trace_index(inline, crossline) else {
            debug!("no trace at ({inline}, {crossline})");
            stats.traces_missing += 1;
            continue;
        };

        let header = reader.trace_header(index).map_err(SliceError::reader)?;
        let samples = reader.trace_samples(index).map_err(SliceError::reader)?;

        let mut skipped = None;
        for sample in 0..header.sample_count {
            let row = request.sample_order.row(sample, rows);
            match (row, samples.get(sample)) {
                (Some(row), Some(&value)) => data[[row, column]] = T::from_f64(value),
                _ => {
                    skipped.get_or_insert(sample);
                    stats.cells_skipped += 1;
                }
            }
        }
        if let Some(first) = skipped {
            warn!(
                "bad indices: trace at ({inline}, {crossline}), {} column {column}, samples {first}..{} skipped",
                axis.orthogonal(),
                header.sample_count
            );
        }
        stats.traces_copied += 1;
    }

    Ok(Slice {
        axis,
        line_index,
        line_number,
        data,
        stats,
    })
}

/// Extracts a slice with element type `dtype`, or the type matching the
/// reader's sample format when `dtype` is `None`.
pub fn extract_slice<R: TraceReader>(
    reader: &R,
    request: &SliceRequest,
    dtype: Option<Dtype>,
) -> Result<Slice<SliceData>, SliceError> {
    extract_slice_with_progress(reader, request, dtype, &ProgressBar::hidden())
}

pub fn extract_slice_with_progress<R: TraceReader>(
    reader: &R,
    request: &SliceRequest,
    dtype: Option<Dtype>,
    progress: &ProgressBar,
) -> Result<Slice<SliceData>, SliceError> {
    let dtype = dtype.unwrap_or_else(|| reader.sample_format().native_dtype());
    let slice = match dtype {
        Dtype::I8 => extract_slice_as_with_progress::<i8, _>(reader, request, progress)?
            .map(SliceData::I8),
        Dtype::I16 => extract_slice_as_with_progress::<i16, _>(reader, request, progress)?
            .map(SliceData::I16),
        Dtype::I32 => extract_slice_as_with_progress::<i32, _>(reader, request, progress)?
            .map(SliceData::I32),
        Dtype::U8 => extract_slice_as_with_progress::<u8, _>(reader, request, progress)?
            .map(SliceData::U8),
        Dtype::U16 => extract_slice_as_with_progress::<u16, _>(reader, request, progress)?
            .map(SliceData::U16),
        Dtype::U32 => extract_slice_as_with_progress::<u32, _>(reader, request, progress)?
            .map(SliceData::U32),
        Dtype::F32 => extract_slice_as_with_progress::<f32, _>(reader, request, progress)?
            .map(SliceData::F32),
        Dtype::F64 => extract_slice_as_with_progress::<f64, _>(reader, request, progress)?
            .map(SliceData::F64),
    };
    Ok(slice)
}
