use std::collections::HashMap;

use thiserror::Error;

use crate::reader::{Axis, SampleFormat, TraceHeader, TraceReader};

#[derive(Error, Debug, PartialEq, Eq)]
#[error("trace index {index} out of range (num traces: {count})")]
pub struct TraceOutOfRange {
    pub index: usize,
    pub count: usize,
}

/// A decoded trace held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTrace {
    pub inline: i32,
    pub crossline: i32,
    pub samples: Vec<f64>,
    /// Sample count reported by the header; defaults to `samples.len()`.
    pub declared_samples: Option<usize>,
    pub position: (f64, f64),
    pub sample_interval_us: u32,
}

impl MemoryTrace {
    pub fn new(inline: i32, crossline: i32, samples: Vec<f64>) -> Self {
        Self {
            inline,
            crossline,
            samples,
            declared_samples: None,
            position: (0.0, 0.0),
            sample_interval_us: 4000,
        }
    }

    pub fn with_declared_samples(mut self, count: usize) -> Self {
        self.declared_samples = Some(count);
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = (x, y);
        self
    }
}

/// A trace volume built from already decoded traces.
///
/// Line numbers enumerate in the order traces were added.
#[derive(Debug, Clone)]
pub struct InMemoryVolume {
    traces: Vec<MemoryTrace>,
    inline_numbers: Vec<i32>,
    crossline_numbers: Vec<i32>,
    by_coordinate: HashMap<(i32, i32), usize>,
    max_samples: usize,
    sample_format: SampleFormat,
    dimensionality: usize,
}

impl InMemoryVolume {
    pub fn new(max_samples: usize, sample_format: SampleFormat) -> Self {
        Self {
            traces: Vec::new(),
            inline_numbers: Vec::new(),
            crossline_numbers: Vec::new(),
            by_coordinate: HashMap::new(),
            max_samples,
            sample_format,
            dimensionality: 3,
        }
    }

    /// Registers line numbers without adding a trace, so a line can exist
    /// even when all of its traces are missing.
    pub fn with_lines(mut self, inlines: &[i32], crosslines: &[i32]) -> Self {
        self.add_lines(inlines, crosslines);
        self
    }

    fn add_lines(&mut self, inlines: &[i32], crosslines: &[i32]) {
        for &inline in inlines {
            if !self.inline_numbers.contains(&inline) {
                self.inline_numbers.push(inline);
            }
        }
        for &crossline in crosslines {
            if !self.crossline_numbers.contains(&crossline) {
                self.crossline_numbers.push(crossline);
            }
        }
    }

    pub fn with_dimensionality(mut self, dimensionality: usize) -> Self {
        self.dimensionality = dimensionality;
        self
    }

    /// Adds a trace, replacing any earlier trace at the same coordinates.
    pub fn push(&mut self, trace: MemoryTrace) {
        self.add_lines(&[trace.inline], &[trace.crossline]);
        let index = self
            .by_coordinate
            .get(&(trace.inline, trace.crossline))
            .copied();
        match index {
            Some(index) => self.traces[index] = trace,
            None => {
                self.by_coordinate
                    .insert((trace.inline, trace.crossline), self.traces.len());
                self.traces.push(trace);
            }
        }
    }

    pub fn with_trace(mut self, trace: MemoryTrace) -> Self {
        self.push(trace);
        self
    }

    fn trace(&self, index: usize) -> Result<&MemoryTrace, TraceOutOfRange> {
        self.traces.get(index).ok_or(TraceOutOfRange {
            index,
            count: self.traces.len(),
        })
    }
}

impl TraceReader for InMemoryVolume {
    type Error = TraceOutOfRange;

    fn dimensionality(&self) -> usize {
        self.dimensionality
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

    fn trace_header(&self, index: usize) -> Result<TraceHeader, TraceOutOfRange> {
        let trace = self.trace(index)?;
        Ok(TraceHeader {
            sample_count: trace.declared_samples.unwrap_or(trace.samples.len()),
            position: trace.position,
            sample_interval_us: trace.sample_interval_us,
        })
    }

    fn trace_samples(&self, index: usize) -> Result<Vec<f64>, TraceOutOfRange> {
        Ok(self.trace(index)?.samples.clone())
    }

    fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::slice::{Slice, SliceRequest, SliceSelection, extract_slice_as};

    #[test]
    fn test_lines_follow_insertion_order() {
        let volume = InMemoryVolume::new(2, SampleFormat::IeeeFloat32)
            .with_trace(MemoryTrace::new(30, 2, vec![1.0]))
            .with_trace(MemoryTrace::new(10, 1, vec![2.0]))
            .with_trace(MemoryTrace::new(30, 1, vec![3.0]));

        assert_eq!(volume.inline_numbers(), &[30, 10]);
        assert_eq!(volume.crossline_numbers(), &[2, 1]);
        assert_eq!(volume.trace_index(30, 1), Some(2));
        assert_eq!(volume.trace_index(10, 2), None);
    }

    #[test]
    fn test_push_replaces_same_coordinates() {
        let mut volume = InMemoryVolume::new(2, SampleFormat::IeeeFloat32);
        volume.push(MemoryTrace::new(1, 1, vec![1.0]));
        volume.push(MemoryTrace::new(1, 1, vec![5.0, 6.0]));

        assert_eq!(volume.num_traces(), 1);
        assert_eq!(volume.trace_samples(0).unwrap(), vec![5.0, 6.0]);
    }

    #[test]
    fn test_declared_samples() {
        let volume = InMemoryVolume::new(4, SampleFormat::Int16)
            .with_trace(MemoryTrace::new(1, 1, vec![1.0]).with_declared_samples(3));

        assert_eq!(volume.trace_header(0).unwrap().sample_count, 3);
        assert_eq!(
            volume.trace_header(1),
            Err(TraceOutOfRange { index: 1, count: 1 })
        );
    }

    #[test]
    fn test_line_without_traces_is_null_column() {
        let volume = InMemoryVolume::new(2, SampleFormat::IeeeFloat32)
            .with_lines(&[1], &[5, 6, 7])
            .with_trace(MemoryTrace::new(1, 5, vec![1.0, 2.0]))
            .with_trace(MemoryTrace::new(1, 7, vec![3.0, 4.0]));

        assert_eq!(volume.crossline_numbers(), &[5, 6, 7]);
        assert_eq!(volume.num_traces(), 2);

        let request = SliceRequest::new(SliceSelection::inline(0)).with_null(-1.0);
        let slice: Slice<Array2<f64>> = extract_slice_as(&volume, &request).unwrap();
        assert_eq!(slice.data.dim(), (2, 3));
        assert_eq!(slice.data.column(1).to_vec(), vec![-1.0, -1.0]);
        assert_eq!(slice.data.column(2).to_vec(), vec![3.0, 4.0]);
        assert_eq!(slice.stats.traces_missing, 1);
    }
}
