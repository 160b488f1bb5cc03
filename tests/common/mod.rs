use std::{fs::File, path::Path};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use npyz::{DType, NpyFile};

pub struct Trace {
    pub inline: i32,
    pub crossline: i32,
    pub samples: Vec<f32>,
}

pub fn trace(inline: i32, crossline: i32, samples: &[f32]) -> Trace {
    Trace {
        inline,
        crossline,
        samples: samples.to_vec(),
    }
}

/// Writes a big endian rev1 SEG-Y file with IEEE float samples, 4 ms
/// sampling and CDP coordinates derived from the line numbers.
pub fn write_segy(path: &Path, bin_samples: u16, traces: &[Trace]) {
    let mut out = vec![b' '; 3200];
    out.resize(3600, 0);
    BigEndian::write_u16(&mut out[3216..], 4000);
    BigEndian::write_u16(&mut out[3220..], bin_samples);
    BigEndian::write_u16(&mut out[3224..], 5);
    BigEndian::write_u16(&mut out[3500..], 0x0100);

    for trace in traces {
        let mut header = [0u8; 240];
        BigEndian::write_i16(&mut header[70..], -100);
        BigEndian::write_u16(&mut header[114..], trace.samples.len() as u16);
        BigEndian::write_u16(&mut header[116..], 4000);
        BigEndian::write_i32(&mut header[180..], 50_000_000 + trace.inline * 2500);
        BigEndian::write_i32(&mut header[184..], 70_000_000 + trace.crossline * 2500);
        BigEndian::write_i32(&mut header[188..], trace.inline);
        BigEndian::write_i32(&mut header[192..], trace.crossline);
        out.extend_from_slice(&header);
        for &sample in &trace.samples {
            out.write_f32::<BigEndian>(sample).unwrap();
        }
    }

    std::fs::write(path, out).unwrap();
}

/// 3 inlines (100, 101, 102) x 2 crosslines (7, 8) x 4 samples. The trace
/// at inline index 1, crossline index 0 is missing and the one at inline
/// index 2, crossline index 1 has only two samples.
pub fn sparse_survey(path: &Path) {
    let mut traces = Vec::new();
    for (i, inline) in [100, 101, 102].into_iter().enumerate() {
        for (x, crossline) in [7, 8].into_iter().enumerate() {
            let base = (i * 10 + x) as f32;
            match (i, x) {
                (1, 0) => continue,
                (2, 1) => traces.push(trace(inline, crossline, &[base, base + 0.5])),
                _ => traces.push(trace(
                    inline,
                    crossline,
                    &[base, base + 0.25, base + 0.5, base + 0.75],
                )),
            }
        }
    }
    write_segy(path, 4, &traces);
}

pub fn read_npy(path: &Path) -> NpyFile<File> {
    NpyFile::new(File::open(path).unwrap()).unwrap()
}

/// The plain type string of an NPY file, e.g. `<f4`.
pub fn type_str(npy: &NpyFile<File>) -> String {
    match npy.dtype() {
        DType::Plain(ts) => ts.to_string(),
        other => panic!("unexpected dtype {other:?}"),
    }
}
