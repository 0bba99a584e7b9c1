//! Boundary to the numeric script engine.
//!
//! The table generator does not run scripts itself. It talks to an engine
//! through the WaveEvaluator trait, handing it the source text and a fresh
//! set of input bindings for every run, and inspecting the variables the
//! script left behind. The engine is typically an embedded interpreter with
//! a global symbol table; implementations are responsible for making
//! reset() actually discard all of that state, so that consecutive runs
//! cannot observe each other.

use super::Float;

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Input variables for a single script run.
///
/// `x` is bound to the engine variable `X`, an array of sample positions in
/// [0, 1). `y` is bound to `Y`, the fractional position of the subtable in
/// [0, 1].
pub struct Bindings<'a> {
    pub x: &'a [Float],
    pub y: Float,
}

/// A numeric value bound to a variable after a script run.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Float),
    Matrix {
        rows: usize,
        cols: usize,
        data: Vec<Float>,
    },
}

impl Value {
    /// Create a 1 x n matrix from a list of values.
    pub fn row_vector(data: Vec<Float>) -> Value {
        let cols = data.len();
        Value::Matrix {
            rows: 1,
            cols,
            data,
        }
    }

    /// View the value as a single row of exactly `cols` elements.
    ///
    /// A scalar counts as a 1x1 matrix. Returns None if the value has any
    /// other shape.
    pub fn as_row(&self, cols: usize) -> Option<&[Float]> {
        match self {
            Value::Scalar(v) if cols == 1 => Some(std::slice::from_ref(v)),
            Value::Matrix {
                rows: 1,
                cols: c,
                data,
            } if *c == cols => Some(data),
            _ => None,
        }
    }
}

/// Snapshot of the named variables visible after a script run.
#[derive(Clone, Debug, Default)]
pub struct EvalScope {
    vars: HashMap<String, Value>,
}

impl EvalScope {
    pub fn new() -> EvalScope {
        EvalScope {
            vars: HashMap::new(),
        }
    }

    /// Bind a value to a name, replacing any previous binding.
    pub fn bind(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    /// Look up a variable by name.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }
}

/// A parse or runtime fault reported by the script engine.
///
/// The message is passed through to the caller verbatim.
#[derive(Debug)]
pub struct EvalError {
    message: String,
}

impl EvalError {
    pub fn new(message: &str) -> EvalError {
        EvalError {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for EvalError {}

/// Interface of the embedded script engine.
pub trait WaveEvaluator {
    /// Drop all variables and side effects left over from previous runs.
    ///
    /// After this call the engine must behave as if no script had ever been
    /// executed on it.
    fn reset(&mut self);

    /// Run a script with the given input bindings.
    ///
    /// On success, returns the variables the script left behind, including
    /// the inputs. Parse and runtime faults are reported as EvalError with
    /// the engine's own message.
    fn evaluate(&mut self, source: &str, bindings: &Bindings) -> Result<EvalScope, EvalError>;
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[test]
fn scalar_is_a_single_element_row() {
    let v = Value::Scalar(0.5);
    assert_eq!(v.as_row(1), Some(&[0.5][..]));
    assert_eq!(v.as_row(4), None);
}

#[test]
fn row_vector_matches_its_own_length_only() {
    let v = Value::row_vector(vec![1.0, 2.0, 3.0]);
    assert_eq!(v.as_row(3), Some(&[1.0, 2.0, 3.0][..]));
    assert_eq!(v.as_row(2), None);
    assert_eq!(v.as_row(4), None);
}

#[test]
fn multi_row_matrix_is_not_a_row() {
    let v = Value::Matrix {
        rows: 2,
        cols: 2,
        data: vec![1.0, 2.0, 3.0, 4.0],
    };
    assert_eq!(v.as_row(2), None);
}

#[test]
fn scope_lookup_finds_bound_values() {
    let mut scope = EvalScope::new();
    scope.bind("wave", Value::Scalar(1.0));
    assert_eq!(scope.lookup("wave"), Some(&Value::Scalar(1.0)));
    assert_eq!(scope.lookup("other"), None);
}
