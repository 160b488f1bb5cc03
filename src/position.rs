use std::{fmt, num::NonZeroUsize};

use crate::reader::TraceReader;

/// Where a trace sits and how it is sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePosition {
    pub index: usize,
    pub position: (f64, f64),
    pub sample_count: usize,
    pub sample_interval_ms: f64,
}

impl fmt::Display for TracePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) {} samples at {} ms per sample",
            self.index, self.position.0, self.position.1, self.sample_count, self.sample_interval_ms
        )
    }
}

/// Every trace of `reader` in its native order. Each call starts over.
pub fn trace_positions<R: TraceReader>(
    reader: &R,
) -> impl Iterator<Item = Result<TracePosition, R::Error>> + '_ {
    sampled_trace_positions(reader, NonZeroUsize::MIN)
}

/// Every `stride`-th trace, i.e. those with `index % stride == 0`.
/// Headers of the traces in between are not read.
pub fn sampled_trace_positions<R: TraceReader>(
    reader: &R,
    stride: NonZeroUsize,
) -> impl Iterator<Item = Result<TracePosition, R::Error>> + '_ {
    (0..reader.num_traces())
        .step_by(stride.get())
        .map(move |index| {
            let header = reader.trace_header(index)?;
            Ok(TracePosition {
                index,
                position: header.position,
                sample_count: header.sample_count,
                sample_interval_ms: header.sample_interval_ms(),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        memory::{InMemoryVolume, MemoryTrace},
        reader::SampleFormat,
    };

    fn volume(traces: usize) -> InMemoryVolume {
        let mut volume = InMemoryVolume::new(3, SampleFormat::Int16);
        for i in 0..traces as i32 {
            volume.push(
                MemoryTrace::new(i / 4, i % 4, vec![0.0; 3]).with_position(i as f64 * 12.5, 100.0),
            );
        }
        volume
    }

    #[test]
    fn test_all_positions_in_order() {
        let volume = volume(6);
        let positions: Vec<_> = trace_positions(&volume).map(Result::unwrap).collect();

        assert_eq!(positions.len(), 6);
        assert_eq!(positions[3].index, 3);
        assert_eq!(positions[3].position, (37.5, 100.0));
        assert_eq!(positions[3].sample_count, 3);
        assert_eq!(positions[3].sample_interval_ms, 4.0);
    }

    #[test]
    fn test_restartable() {
        let volume = volume(5);
        let first: Vec<_> = trace_positions(&volume).map(Result::unwrap).collect();
        let second: Vec<_> = trace_positions(&volume).map(Result::unwrap).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sampled_stride() {
        let volume = volume(10);
        let stride = NonZeroUsize::new(4).unwrap();
        let indices: Vec<usize> = sampled_trace_positions(&volume, stride)
            .map(|p| p.unwrap().index)
            .collect();
        assert_eq!(indices, vec![0, 4, 8]);
    }

    #[test]
    fn test_display() {
        let position = TracePosition {
            index: 200,
            position: (456123.5, 6789000.0),
            sample_count: 1501,
            sample_interval_ms: 2.0,
        };
        assert_eq!(
            position.to_string(),
            "200 (456123.5, 6789000) 1501 samples at 2 ms per sample"
        );
    }
}
