use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use byteorder::{BigEndian, WriteBytesExt};
use ndarray::Array2;
use npyz::{DType, Serialize, TypeStr, WriteOptions, WriterBuilder};
use thiserror::Error;
use tiff::encoder::{TiffEncoder, colortype};
use tiff_encoder::{LONG, RATIONAL, SHORT, TiffFile, ifd::{Ifd, tags}, write::ByteBlock};

use crate::{
    dtype::{Dtype, Element},
    slice::{SliceData, with_array},
};

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TIFF encoding failed: {0}")]
    Tiff(#[from] tiff::TiffError),
    #[error("invalid NPY type string: {0}")]
    TypeStr(#[from] npyz::ParseTypeStrError),
    #[error("slice of {rows}x{columns} does not fit a TIFF image")]
    TooLarge { rows: usize, columns: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianess {
    #[default]
    Native,
    Little,
    Big,
}

impl Endianess {
    fn is_big(self) -> bool {
        match self {
            Endianess::Native => cfg!(target_endian = "big"),
            Endianess::Little => false,
            Endianess::Big => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Npy,
    Tiff,
}

impl OutputFormat {
    /// `.tif`/`.tiff` means TIFF, anything else NPY.
    pub fn from_path(path: &Path) -> OutputFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff") => {
                OutputFormat::Tiff
            }
            _ => OutputFormat::Npy,
        }
    }
}

/// Big endian encoding of one element, for the tiff-encoder strip.
trait WriteBigEndian: Element {
    fn write_be<W: Write>(self, w: &mut W) -> io::Result<()>;
}

macro_rules! impl_write_big_endian {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl WriteBigEndian for $ty {
                fn write_be<W: Write>(self, w: &mut W) -> io::Result<()> {
                    w.$method::<BigEndian>(self)
                }
            }
        )*
    };
}

impl_write_big_endian! {
    i16 => write_i16,
    i32 => write_i32,
    u16 => write_u16,
    u32 => write_u32,
    f32 => write_f32,
    f64 => write_f64,
}

impl WriteBigEndian for i8 {
    fn write_be<W: Write>(self, w: &mut W) -> io::Result<()> {
        w.write_i8(self)
    }
}

impl WriteBigEndian for u8 {
    fn write_be<W: Write>(self, w: &mut W) -> io::Result<()> {
        w.write_u8(self)
    }
}

fn big_endian_bytes<T: WriteBigEndian>(array: &Array2<T>) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(array.len() * T::DTYPE.byte_size());
    // iter() walks in logical (row-major) order regardless of memory layout
    for &value in array.iter() {
        value.write_be(&mut bytes)?;
    }
    Ok(bytes)
}

/// NumPy type string for `dtype` in the requested byte order, e.g. `<f4`.
pub fn npy_type_str(dtype: Dtype, endianess: Endianess) -> Result<TypeStr, WriteError> {
    let order = if dtype.byte_size() == 1 {
        '|'
    } else if endianess.is_big() {
        '>'
    } else {
        '<'
    };
    Ok(format!("{order}{}", dtype.npy_code()).parse()?)
}

fn write_npy_array<T: Serialize + Copy, W: Write>(
    out: W,
    array: &Array2<T>,
    type_str: TypeStr,
) -> io::Result<()> {
    let (rows, columns) = array.dim();
    let mut writer = WriteOptions::<T>::new()
        .dtype(DType::Plain(type_str))
        .shape(&[rows as u64, columns as u64])
        .writer(out)
        .begin_nd()?;
    for value in array.iter() {
        writer.push(value)?;
    }
    writer.finish()
}

pub fn write_npy(path: &Path, data: &SliceData, endianess: Endianess) -> Result<(), WriteError> {
    let type_str = npy_type_str(data.dtype(), endianess)?;
    let mut out = BufWriter::new(File::create(path)?);
    with_array!(data, a => write_npy_array(&mut out, a, type_str))?;
    out.flush()?;
    Ok(())
}

fn tiff_dims(data: &SliceData) -> Result<(u32, u32), WriteError> {
    let (rows, columns) = data.dim();
    match (u32::try_from(columns), u32::try_from(rows)) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(WriteError::TooLarge { rows, columns }),
    }
}

/// StripByteCounts is a LONG, so one strip holds at most 4 GiB.
fn strip_byte_count(len: usize, (rows, columns): (usize, usize)) -> Result<u32, WriteError> {
    u32::try_from(len).map_err(|_| WriteError::TooLarge { rows, columns })
}

fn row_major<T: Copy>(array: &Array2<T>) -> Vec<T> {
    array.iter().copied().collect()
}

pub fn write_tiff_native_endian(path: &Path, data: &SliceData) -> Result<(), WriteError> {
    let (width, height) = tiff_dims(data)?;
    let mut out_file = File::create(path)?;
    let mut tiff = TiffEncoder::new(&mut out_file)?;
    // one pixel per cell: columns are the orthogonal lines, rows the samples
    match data {
        SliceData::I8(a) => tiff.write_image::<colortype::GrayI8>(width, height, &row_major(a))?,
        SliceData::I16(a) => tiff.write_image::<colortype::GrayI16>(width, height, &row_major(a))?,
        SliceData::I32(a) => tiff.write_image::<colortype::GrayI32>(width, height, &row_major(a))?,
        SliceData::U8(a) => tiff.write_image::<colortype::Gray8>(width, height, &row_major(a))?,
        SliceData::U16(a) => tiff.write_image::<colortype::Gray16>(width, height, &row_major(a))?,
        SliceData::U32(a) => tiff.write_image::<colortype::Gray32>(width, height, &row_major(a))?,
        SliceData::F32(a) => tiff.write_image::<colortype::Gray32Float>(width, height, &row_major(a))?,
        SliceData::F64(a) => tiff.write_image::<colortype::Gray64Float>(width, height, &row_major(a))?,
    }
    Ok(())
}

pub fn write_tiff_big_endian(path: &Path, data: &SliceData) -> Result<(), WriteError> {
    let (width, height) = tiff_dims(data)?;
    let dtype = data.dtype();

    let image_bytes = with_array!(data, a => big_endian_bytes(a))?;
    let strip_len = strip_byte_count(image_bytes.len(), data.dim())?;

    let sample_format = if dtype.is_float() {
        3 // IEEE float
    } else if dtype.is_signed() {
        2 // int
    } else {
        1 // uint
    };

    TiffFile::new(
        Ifd::new()
            .with_entry(tags::PhotometricInterpretation, SHORT![1]) // Black is zero
            .with_entry(tags::Compression, SHORT![1]) // No compression

            .with_entry(tags::BitsPerSample, SHORT![(dtype.byte_size() * 8) as u16])
            .with_entry(tags::SamplesPerPixel, SHORT![1])
            .with_entry(tags::SampleFormat, SHORT![sample_format])

            .with_entry(tags::ImageLength, LONG![height])
            .with_entry(tags::ImageWidth, LONG![width])

            .with_entry(tags::ResolutionUnit, SHORT![1]) // No resolution unit
            .with_entry(tags::XResolution, RATIONAL![(1, 1)])
            .with_entry(tags::YResolution, RATIONAL![(1, 1)])

            .with_entry(tags::RowsPerStrip, LONG![height]) // One strip for the whole image
            .with_entry(tags::StripByteCounts, LONG![strip_len])
            .with_entry(tags::StripOffsets, ByteBlock::single(image_bytes))
            .single()
    ).with_endianness(tiff_encoder::write::Endianness::MM).write_to(path)?;

    Ok(())
}

/// Persists `data` to `path` in `format`.
pub fn save(
    path: &Path,
    data: &SliceData,
    format: OutputFormat,
    endianess: Endianess,
) -> Result<(), WriteError> {
    match (format, endianess.is_big()) {
        (OutputFormat::Npy, _) => write_npy(path, data, endianess),
        (OutputFormat::Tiff, false) => write_tiff_native_endian(path, data),
        (OutputFormat::Tiff, true) => write_tiff_big_endian(path, data),
    }
}
