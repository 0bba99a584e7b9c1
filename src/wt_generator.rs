//! Generates wavetables by running a numeric script once per subtable.
//!
//! The script receives two input variables: `X`, an array of `frames`
//! sample positions covering [0, 1), and `Y`, the fractional position of
//! the current subtable in [0, 1]. It must leave behind a variable named
//! `wave` holding a single row of exactly `frames` values, which becomes
//! one subtable of the result.
//!
//! The engine is reset before every run, so a script cannot see variables
//! left behind by a previous subtable. Any failing subtable aborts the
//! whole run; a partially filled table is never returned.

use super::evaluator::{Bindings, WaveEvaluator};
use super::wavetable::{Wavetable, WavetableRef};
use super::Float;

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use log::{error, info, trace};

// Name of the script variable holding the result.
const RESULT_VAR: &str = "wave";

// Public error types

/// Reason a generation run was aborted.
///
/// The first failing subtable determines the error; subtables are processed
/// in increasing order.
#[derive(Debug)]
pub enum GenError {
    /// The requested table dimensions are not usable.
    InvalidParameters,
    /// The script ran without fault but did not define the result variable.
    UndefinedResult,
    /// The result variable exists but is not a single row of the expected
    /// length.
    ShapeMismatch { expected: usize },
    /// The engine reported a parse or runtime fault.
    Evaluation(String),
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::InvalidParameters => {
                write!(f, "Table count and table size must be at least 1.")
            }
            GenError::UndefinedResult => {
                write!(f, "Result variable 'wave' is not defined.")
            }
            GenError::ShapeMismatch { expected } => {
                write!(f, "Result must be a column vector of size {}.", expected)
            }
            GenError::Evaluation(message) => write!(f, "{}", message),
        }
    }
}

impl Error for GenError {}

pub struct WtGenerator;

/// Drives the script engine and assembles the resulting wavetable.
impl WtGenerator {
    /// Generate a wavetable of `count` subtables with `frames` samples each.
    ///
    /// The script is run once per subtable, against a freshly reset engine.
    /// Generation either completes fully or returns the error of the first
    /// failing subtable; no partial table is ever handed out.
    pub fn generate(
        evaluator: &mut dyn WaveEvaluator,
        source: &str,
        count: usize,
        frames: usize,
    ) -> Result<WavetableRef, GenError> {
        if count < 1 || frames < 1 {
            error!("Invalid table dimensions: {} x {}", count, frames);
            return Err(GenError::InvalidParameters);
        }
        info!("Generating wavetable: {} subtables with {} frames", count, frames);

        let mut data = vec![0.0_f32; count * frames];

        // Sample positions 0-1 (the "X" array). The sequence spans [0, 1);
        // the last position is (frames - 1) / frames, not 1.
        let phases: Vec<Float> = (0..frames)
            .map(|i| i as Float / frames as Float)
            .collect();

        for nth in 0..count {
            evaluator.reset();

            let y = if count == 1 {
                0.0
            } else {
                nth as Float / (count - 1) as Float
            };
            trace!("Evaluating subtable {} with Y = {}", nth, y);

            let bindings = Bindings { x: &phases, y };
            let scope = match evaluator.evaluate(source, &bindings) {
                Ok(scope) => scope,
                Err(e) => {
                    error!("Subtable {}: evaluation failed: {}", nth, e);
                    return Err(GenError::Evaluation(e.message().to_string()));
                }
            };

            let wave = match scope.lookup(RESULT_VAR) {
                Some(value) => value,
                None => {
                    error!("Subtable {}: result variable undefined", nth);
                    return Err(GenError::UndefinedResult);
                }
            };

            let row = match wave.as_row(frames) {
                Some(row) => row,
                None => {
                    error!("Subtable {}: result has wrong shape", nth);
                    return Err(GenError::ShapeMismatch { expected: frames });
                }
            };

            for (target, value) in data[nth * frames..(nth + 1) * frames]
                .iter_mut()
                .zip(row)
            {
                *target = *value as f32;
            }
        }

        Ok(Arc::new(Wavetable::new(count, frames, data)))
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------
