use std::{error::Error, path::Path, time::Instant};

use indicatif::{MultiProgress, ProgressBar};
use log::{debug, info};

use crate::{
    dtype::Dtype,
    read::{HeaderLayout, SegyVolume},
    reader::TraceReader,
    slice::{
        SampleOrder, Slice, SliceData, SliceRequest, SliceSelection, check_dimensionality,
        extract_slice_with_progress,
    },
    write::{Endianess, OutputFormat, save},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// zero-based, negative = not selected
    pub inline_index: i64,
    /// zero-based, negative = not selected
    pub crossline_index: i64,
    /// derived from the sample format when not given
    pub dtype: Option<Dtype>,
    pub null_value: f64,
    pub sample_order: SampleOrder,
    pub endianess: Endianess,
    /// derived from the destination extension when not given
    pub format: Option<OutputFormat>,
    pub layout: HeaderLayout,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            inline_index: -1,
            crossline_index: -1,
            dtype: None,
            null_value: 0.0,
            sample_order: SampleOrder::default(),
            endianess: Endianess::default(),
            format: None,
            layout: HeaderLayout::default(),
        }
    }
}

/// Extracts one slice of the SEG-Y file at `segy_path` and saves it to
/// `dest_path`. The file is unmapped before this returns, also on error.
pub fn convert(
    segy_path: &Path,
    dest_path: &Path,
    options: &ConvertOptions,
    multi_progress: &MultiProgress,
) -> Result<Slice<SliceData>, Box<dyn Error + Sync + Send>> {
    let t0 = Instant::now();

    let volume = SegyVolume::open(segy_path, options.layout)?;

    check_dimensionality(&volume)?;
    let selection = SliceSelection::from_indices(options.inline_index, options.crossline_index)?;

    let (ni, nx, ns) = (
        volume.num_inlines(),
        volume.num_crosslines(),
        volume.max_trace_sample_count(),
    );
    info!("dimensions: {ni} inlines x {nx} crosslines x {ns} samples");
    info!(
        "{} traces, sample format: {:?}",
        volume.num_traces(),
        volume.sample_format()
    );

    let dtype = options
        .dtype
        .unwrap_or_else(|| volume.sample_format().native_dtype());
    info!("dtype: {dtype}, null: {}", options.null_value);
    debug!("endianess: {:?}, sample order: {:?}", options.endianess, options.sample_order);

    let request = SliceRequest::new(selection)
        .with_null(options.null_value)
        .with_sample_order(options.sample_order);

    let progress = multi_progress.add(ProgressBar::no_length());
    let slice = extract_slice_with_progress(&volume, &request, Some(dtype), &progress)?;
    progress.finish();
    multi_progress.remove(&progress);

    info!(
        "{} {} (index {}): {} traces copied, {} missing, {} cells skipped",
        slice.axis,
        slice.line_number,
        slice.line_index,
        slice.stats.traces_copied,
        slice.stats.traces_missing,
        slice.stats.cells_skipped
    );

    let format = options
        .format
        .unwrap_or_else(|| OutputFormat::from_path(dest_path));
    save(dest_path, &slice.data, format, options.endianess)?;
    debug!("created {dest_path:?} as {format:?}");

    info!("conversion done in {:?}", t0.elapsed());

    Ok(slice)
}
