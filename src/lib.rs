//! Extraction of inline and crossline slices from 3D seismic trace volumes.
//!
//! A volume is anything implementing [`reader::TraceReader`]; [`read`]
//! provides one for SEG-Y files. [`slice`] turns one line of a volume into
//! a dense (samples x lines) array, [`write`] stores it as NPY or TIFF.

pub mod convert;
pub mod dtype;
pub mod exit;
pub mod memory;
pub mod position;
pub mod read;
pub mod reader;
pub mod slice;
pub mod write;
