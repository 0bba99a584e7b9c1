//! The generated wavetable.
//!
//! A wavetable is a 2-D grid of samples: `count` subtables of `frames`
//! samples each, stored row-major in a single contiguous buffer. Sample i
//! of subtable n lives at index `n * frames + i`.
//!
//! Tables are produced by the generator as a finished whole and are not
//! modified afterwards. A new generation run always produces a new
//! instance; consumers hold the result through a WavetableRef.

use std::fmt;
use std::sync::Arc;

use log::debug;

// Public error types

#[derive(Debug)]
pub struct SizeMismatch;
impl fmt::Display for SizeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sample count does not match table dimensions")
    }
}
impl std::error::Error for SizeMismatch {}

#[derive(Debug)]
pub struct Wavetable {
    count: usize,    // Number of subtables
    frames: usize,   // Number of samples per subtable
    data: Vec<f32>,  // Flat sample buffer, count * frames values
}

pub type WavetableRef = Arc<Wavetable>;

impl Wavetable {
    // Wrap a fully assembled sample buffer. The generator is the only
    // caller; the buffer length must already match.
    pub(crate) fn new(count: usize, frames: usize, data: Vec<f32>) -> Wavetable {
        debug_assert_eq!(data.len(), count * frames);
        debug!("New wavetable: {} subtables with {} frames", count, frames);
        Wavetable {
            count,
            frames,
            data,
        }
    }

    /// Create a wavetable from an existing sample buffer.
    ///
    /// The buffer must hold exactly `count * frames` samples, with both
    /// dimensions at least 1.
    ///
    /// ```
    /// use wavescript::Wavetable;
    ///
    /// let wt = Wavetable::from_samples(2, 4, vec![0.0; 8]).unwrap();
    /// assert_eq!(wt.num_samples(), 8);
    /// ```
    pub fn from_samples(
        count: usize,
        frames: usize,
        samples: Vec<f32>,
    ) -> Result<Wavetable, SizeMismatch> {
        if count < 1 || frames < 1 || samples.len() != count * frames {
            return Err(SizeMismatch);
        }
        Ok(Wavetable::new(count, frames, samples))
    }

    /// Get the number of subtables.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Get the number of samples per subtable.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Get the total number of samples.
    pub fn num_samples(&self) -> usize {
        self.data.len()
    }

    /// Get the flat sample buffer, subtable 0 first.
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Get the samples of a single subtable.
    ///
    /// ```
    /// use wavescript::Wavetable;
    ///
    /// let wt = Wavetable::from_samples(2, 2, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(wt.subtable(1), &[2.0, 3.0]);
    /// ```
    pub fn subtable(&self, n: usize) -> &[f32] {
        &self.data[n * self.frames..(n + 1) * self.frames]
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[test]
fn valid_dimensions_are_accepted() {
    let wt = Wavetable::from_samples(3, 4, vec![0.5; 12]).unwrap();
    assert_eq!(wt.count(), 3);
    assert_eq!(wt.frames(), 4);
    assert_eq!(wt.num_samples(), 12);
}

#[test]
fn wrong_buffer_length_is_rejected() {
    let result = Wavetable::from_samples(3, 4, vec![0.5; 11]);
    assert!(matches!(result, Err(SizeMismatch)));
}

#[test]
fn empty_dimensions_are_rejected() {
    assert!(Wavetable::from_samples(0, 4, vec![]).is_err());
    assert!(Wavetable::from_samples(4, 0, vec![]).is_err());
}

#[test]
fn subtables_are_stored_row_major() {
    let wt = Wavetable::from_samples(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    assert_eq!(wt.subtable(0), &[1.0, 2.0, 3.0]);
    assert_eq!(wt.subtable(1), &[4.0, 5.0, 6.0]);
}
