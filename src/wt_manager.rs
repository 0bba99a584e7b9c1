//! Manages a wavetable generation session.
//!
//! Owns the script engine, the current generation parameters and the
//! latest successfully generated table. Rerunning generation replaces the
//! published table only on success; after a failed run the previous table
//! stays available, so a consumer never sees a partial or missing result
//! because of a script error.
//!
//! The manager holds the engine exclusively. Two generation runs can
//! therefore never overlap; a newer run simply supersedes the result of an
//! older one.

use super::evaluator::WaveEvaluator;
use super::wav_writer::WavWriter;
use super::wavetable::WavetableRef;
use super::wt_generator::{GenError, WtGenerator};
use super::wt_project::WtProject;

use std::io::{Error, ErrorKind};

use log::info;

const DEF_TABLE_COUNT: usize = 64;
const DEF_TABLE_SIZE_LOG2: u32 = 11;

const DEFAULT_SOURCE: &str = "\
% X\t[in]\tarray of sample positions to evaluate [0;1[\n\
% Y\t[in]\tfractional position of the subtable [0;1]\n\
% wave\t[out]\tarray result of the same length as X\n\
wave=sin(2*pi*X) + Y*rand(1, length(X));\n";

pub struct WtManager {
    evaluator: Box<dyn WaveEvaluator>,
    source: String,
    count: usize,
    frames: usize,
    current: Option<WavetableRef>,
}

impl WtManager {
    /// Create a manager around the given script engine.
    ///
    /// Starts out with the default script and table dimensions (64
    /// subtables of 2048 samples); no table exists until the first
    /// successful run.
    pub fn new(evaluator: Box<dyn WaveEvaluator>) -> WtManager {
        WtManager {
            evaluator,
            source: DEFAULT_SOURCE.to_string(),
            count: DEF_TABLE_COUNT,
            frames: 1 << DEF_TABLE_SIZE_LOG2,
            current: None,
        }
    }

    /// Get the current script.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get the current table dimensions as (count, frames).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.count, self.frames)
    }

    /// Get the latest successfully generated table.
    pub fn current(&self) -> Option<WavetableRef> {
        self.current.clone()
    }

    /// Run generation with new script and dimensions.
    ///
    /// The parameters are stored either way. On success the new table
    /// replaces the published one; on failure the previous table is kept
    /// and the error returned.
    pub fn run(
        &mut self,
        source: &str,
        count: usize,
        frames: usize,
    ) -> Result<WavetableRef, GenError> {
        self.source = source.to_string();
        self.count = count;
        self.frames = frames;
        self.regenerate()
    }

    /// Rerun generation with the stored script and dimensions.
    pub fn regenerate(&mut self) -> Result<WavetableRef, GenError> {
        let wt = WtGenerator::generate(
            &mut *self.evaluator,
            &self.source,
            self.count,
            self.frames,
        )?;
        self.current = Some(wt.clone());
        Ok(wt)
    }

    /// Export the current table to a WAV file, embedding the script.
    ///
    /// Fails if no table has been generated yet.
    pub fn export_wav(&self, filename: &str) -> Result<(), Error> {
        let wt = match &self.current {
            Some(wt) => wt,
            None => {
                return Err(Error::new(
                    ErrorKind::Other,
                    "No wavetable has been generated",
                ))
            }
        };
        info!("Exporting wavetable to [{}]", filename);
        WavWriter::write_file(wt, &self.source, filename)
    }

    /// Take over script and dimensions from a project.
    ///
    /// Does not rerun generation; call regenerate() for that.
    pub fn apply_project(&mut self, project: &WtProject) {
        self.source = project.source.clone();
        self.count = project.table_count;
        self.frames = project.frames();
    }

    /// Capture the current script and dimensions as a project.
    ///
    /// The project format stores the subtable length as log2; sizes that
    /// are not a power of two are rounded down.
    pub fn to_project(&self) -> WtProject {
        let bits = std::mem::size_of::<usize>() as u32 * 8;
        let log2 = bits - 1 - self.frames.max(1).leading_zeros();
        WtProject::new(&self.source, self.count, log2)
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------
