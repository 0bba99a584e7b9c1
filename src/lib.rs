mod evaluator;
mod wav_writer;
mod wavetable;
mod wt_generator;
mod wt_manager;
mod wt_project;

pub use evaluator::{Bindings, EvalError, EvalScope, Value, WaveEvaluator};
pub use wav_writer::WavWriter;
pub use wavetable::{SizeMismatch, Wavetable, WavetableRef};
pub use wt_generator::{GenError, WtGenerator};
pub use wt_manager::WtManager;
pub use wt_project::{ProjectError, WtProject};

/// Numeric type used for script bindings and evaluation results.
///
/// The binary container stores its samples as f32; values are converted
/// when they get copied into the table.
pub type Float = f64;
