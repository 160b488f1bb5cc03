mod common;

use std::num::NonZeroUsize;

use indicatif::MultiProgress;
use segy_slice::{
    convert::{ConvertOptions, convert},
    dtype::Dtype,
    exit::{EX_NOINPUT, EX_SOFTWARE, exit_code},
    position::{sampled_trace_positions, trace_positions},
    read::{HeaderLayout, SegyVolume},
    reader::{Axis, TraceReader},
    slice::{DimensionalityError, SliceData, SliceError},
    write::{Endianess, OutputFormat},
};

use common::{read_npy, sparse_survey, trace, type_str, write_segy};

fn options(inline_index: i64, crossline_index: i64) -> ConvertOptions {
    ConvertOptions {
        inline_index,
        crossline_index,
        endianess: Endianess::Little,
        ..ConvertOptions::default()
    }
}

#[test]
fn inline_slice_with_missing_trace() {
    let dir = tempfile::tempdir().unwrap();
    let segy = dir.path().join("survey.sgy");
    let npy = dir.path().join("inline_1.npy");
    sparse_survey(&segy);

    let slice = convert(&segy, &npy, &options(1, -1), &MultiProgress::new()).unwrap();
    assert_eq!(slice.axis, Axis::Inline);
    assert_eq!(slice.line_number, 101);
    assert_eq!(slice.stats.traces_missing, 1);

    let npy = read_npy(&npy);
    assert_eq!(type_str(&npy), "<f4");
    assert_eq!(npy.shape(), &[4, 2]);
    // row-major: each row holds one sample of crossline 7 and crossline 8
    assert_eq!(
        npy.into_vec::<f32>().unwrap(),
        vec![0.0, 11.0, 0.0, 11.25, 0.0, 11.5, 0.0, 11.75]
    );
}

#[test]
fn short_trace_is_padded_with_null() {
    let dir = tempfile::tempdir().unwrap();
    let segy = dir.path().join("survey.sgy");
    let npy = dir.path().join("inline_2.npy");
    sparse_survey(&segy);

    let opts = ConvertOptions {
        null_value: 42.0,
        ..options(2, -1)
    };
    let slice = convert(&segy, &npy, &opts, &MultiProgress::new()).unwrap();
    assert_eq!(slice.data.dim(), (4, 2));

    assert_eq!(
        read_npy(&npy).into_vec::<f32>().unwrap(),
        vec![20.0, 21.0, 20.25, 21.5, 20.5, 42.0, 20.75, 42.0]
    );
}

#[test]
fn crossline_slice_with_explicit_dtype() {
    let dir = tempfile::tempdir().unwrap();
    let segy = dir.path().join("survey.sgy");
    let npy = dir.path().join("crossline_0.npy");
    sparse_survey(&segy);

    let opts = ConvertOptions {
        dtype: Some(Dtype::F64),
        null_value: -1.0,
        ..options(-1, 0)
    };
    let slice = convert(&segy, &npy, &opts, &MultiProgress::new()).unwrap();
    let SliceData::F64(data) = &slice.data else {
        panic!("expected float64 data");
    };
    assert_eq!(data.dim(), (4, 3));
    assert_eq!(data.column(0).to_vec(), vec![0.0, 0.25, 0.5, 0.75]);
    assert_eq!(data.column(1).to_vec(), vec![-1.0; 4]);
    assert_eq!(data.column(2).to_vec(), vec![20.0, 20.25, 20.5, 20.75]);

    let npy = read_npy(&npy);
    assert_eq!(type_str(&npy), "<f8");
    assert_eq!(npy.shape(), &[4, 3]);
    assert_eq!(npy.into_vec::<f64>().unwrap()[3..6], [0.25, -1.0, 20.25]);
}

#[test]
fn crossline_one_past_the_end_fails() {
    let dir = tempfile::tempdir().unwrap();
    let segy = dir.path().join("survey.sgy");
    let npy = dir.path().join("out.npy");
    sparse_survey(&segy);

    let err = convert(&segy, &npy, &options(-1, 2), &MultiProgress::new()).unwrap_err();
    let err = err.downcast_ref::<SliceError>().unwrap();
    assert!(matches!(
        err,
        SliceError::LineIndexOutOfRange {
            axis: Axis::Crossline,
            index: 2,
            bound: 2
        }
    ));
    assert!(!npy.exists());
}

#[test]
fn ambiguous_axis_selection_fails() {
    let dir = tempfile::tempdir().unwrap();
    let segy = dir.path().join("survey.sgy");
    let npy = dir.path().join("out.npy");
    sparse_survey(&segy);

    for (inline, crossline) in [(0, 0), (-1, -1)] {
        let err = convert(&segy, &npy, &options(inline, crossline), &MultiProgress::new())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<DimensionalityError>(),
            Some(&DimensionalityError::AxisSelection { inline, crossline })
        );
        assert_eq!(exit_code(err.as_ref()), EX_SOFTWARE);
    }
}

#[test]
fn missing_input_maps_to_noinput() {
    let dir = tempfile::tempdir().unwrap();

    let err = convert(
        &dir.path().join("nope.sgy"),
        &dir.path().join("out.npy"),
        &options(0, -1),
        &MultiProgress::new(),
    )
    .unwrap_err();
    assert_eq!(exit_code(err.as_ref()), EX_NOINPUT);

    let err = convert(dir.path(), &dir.path().join("out.npy"), &options(0, -1), &MultiProgress::new())
        .unwrap_err();
    assert_eq!(exit_code(err.as_ref()), EX_NOINPUT);
}

#[test]
fn tiff_output_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let segy = dir.path().join("survey.sgy");
    let tif = dir.path().join("inline_0.tif");
    sparse_survey(&segy);

    let opts = ConvertOptions {
        endianess: Endianess::Big,
        ..options(0, -1)
    };
    convert(&segy, &tif, &opts, &MultiProgress::new()).unwrap();
    let bytes = std::fs::read(&tif).unwrap();
    assert_eq!(&bytes[..2], b"MM");

    let npy_named_tif = dir.path().join("forced.tif");
    let opts = ConvertOptions {
        format: Some(OutputFormat::Npy),
        ..options(0, -1)
    };
    convert(&segy, &npy_named_tif, &opts, &MultiProgress::new()).unwrap();
    assert_eq!(read_npy(&npy_named_tif).shape(), &[4, 2]);
}

#[test]
fn custom_line_header_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let segy = dir.path().join("survey.sgy");
    sparse_survey(&segy);

    // CDP x and y as line numbers: every trace has its own "line"
    let layout = HeaderLayout {
        inline_byte: 181,
        crossline_byte: 185,
    };
    let volume = SegyVolume::open(&segy, layout).unwrap();
    assert_eq!(volume.num_inlines(), 3);
    assert_eq!(volume.num_crosslines(), 2);
    assert_eq!(volume.inline_numbers()[0], 50_250_000);
}

#[test]
fn trace_positions_report() {
    let dir = tempfile::tempdir().unwrap();
    let segy = dir.path().join("survey.sgy");
    sparse_survey(&segy);
    let volume = SegyVolume::open(&segy, HeaderLayout::default()).unwrap();

    let lines: Vec<String> = trace_positions(&volume)
        .map(|p| p.unwrap().to_string())
        .collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "0 (502500, 700175) 4 samples at 4 ms per sample");
    assert_eq!(lines[4], "4 (502550, 700200) 2 samples at 4 ms per sample");

    let sampled: Vec<usize> = sampled_trace_positions(&volume, NonZeroUsize::new(2).unwrap())
        .map(|p| p.unwrap().index)
        .collect();
    assert_eq!(sampled, vec![0, 2, 4]);
}

#[test]
fn duplicate_traces_are_rejected_as_not_3d() {
    let dir = tempfile::tempdir().unwrap();
    let segy = dir.path().join("line.sgy");
    let npy = dir.path().join("out.npy");
    write_segy(&segy, 2, &[trace(1, 1, &[1.0, 2.0]), trace(1, 1, &[3.0, 4.0])]);

    let err = convert(&segy, &npy, &options(0, -1), &MultiProgress::new()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<DimensionalityError>(),
        Some(&DimensionalityError::NotThreeDimensional(2))
    );
}
