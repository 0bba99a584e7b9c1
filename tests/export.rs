//! End-to-end tests: generate a wavetable through the public API and
//! export it, then verify the written artifacts.

use wavescript::{
    Bindings, EvalError, EvalScope, Value, WavWriter, WaveEvaluator, WtGenerator, WtManager,
    WtProject,
};

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

fn setup_logger() {
    let _ = flexi_logger::Logger::with_env().start();
}

fn temp_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("wavescript_{}_{}", std::process::id(), name))
}

// Engine double with a persistent symbol table, as an external consumer
// would implement the evaluator boundary. The "script" recognizes a single
// hardcoded program.
struct TestEngine {
    symtab: HashMap<String, Value>,
}

impl TestEngine {
    fn new() -> TestEngine {
        TestEngine {
            symtab: HashMap::new(),
        }
    }
}

impl WaveEvaluator for TestEngine {
    fn reset(&mut self) {
        self.symtab.clear();
    }

    fn evaluate(&mut self, source: &str, bindings: &Bindings) -> Result<EvalScope, EvalError> {
        self.symtab
            .insert("X".to_string(), Value::row_vector(bindings.x.to_vec()));
        self.symtab
            .insert("Y".to_string(), Value::Scalar(bindings.y));
        match source {
            "wave = X*0 + Y;" => {
                self.symtab.insert(
                    "wave".to_string(),
                    Value::row_vector(vec![bindings.y; bindings.x.len()]),
                );
            }
            "wave = X;" => {
                self.symtab
                    .insert("wave".to_string(), Value::row_vector(bindings.x.to_vec()));
            }
            _ => return Err(EvalError::new("parse error")),
        }
        let mut scope = EvalScope::new();
        for (name, value) in &self.symtab {
            scope.bind(name, value.clone());
        }
        Ok(scope)
    }
}

fn read_chunk(bytes: &[u8], id: &[u8; 4]) -> Option<Vec<u8>> {
    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let size = u32::from_le_bytes([
            bytes[pos + 4],
            bytes[pos + 5],
            bytes[pos + 6],
            bytes[pos + 7],
        ]) as usize;
        if &bytes[pos..pos + 4] == id {
            return Some(bytes[pos + 8..pos + 8 + size].to_vec());
        }
        pos += 8 + size;
    }
    None
}

#[test]
fn generated_table_exports_to_a_consistent_wav_file() {
    setup_logger();
    let mut engine = TestEngine::new();
    let source = "wave = X*0 + Y;";
    let wt = WtGenerator::generate(&mut engine, source, 2, 4).unwrap();
    assert_eq!(wt.subtable(0), &[0.0, 0.0, 0.0, 0.0]);
    assert_eq!(wt.subtable(1), &[1.0, 1.0, 1.0, 1.0]);

    let path = temp_file("export.wav");
    let filename = path.to_str().unwrap();
    WavWriter::write_file(&wt, source, filename).unwrap();

    let bytes = fs::read(filename).unwrap();
    fs::remove_file(filename).unwrap();

    assert_eq!(&bytes[0..4], b"RIFF");
    let riff_size = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    assert_eq!(riff_size, bytes.len() - 8);
    assert_eq!(&bytes[8..12], b"WAVE");

    let fmt = read_chunk(&bytes, b"fmt ").unwrap();
    assert_eq!(fmt.len(), 18);
    assert_eq!(u16::from_le_bytes([fmt[0], fmt[1]]), 3);

    let fact = read_chunk(&bytes, b"fact").unwrap();
    assert_eq!(fact, 8_u32.to_le_bytes());

    let data = read_chunk(&bytes, b"data").unwrap();
    let mut expected = Vec::new();
    for sample in &[0.0_f32, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0] {
        expected.extend_from_slice(&sample.to_le_bytes());
    }
    assert_eq!(data, expected);

    // script comes back verbatim, padded to an even length
    let code = read_chunk(&bytes, b"WTFs").unwrap();
    assert_eq!(code, b"wave = X*0 + Y;\0");
}

#[test]
fn failed_export_leaves_no_file_behind() {
    setup_logger();
    let mut engine = TestEngine::new();
    let wt = WtGenerator::generate(&mut engine, "wave = X;", 1, 4).unwrap();
    let path = temp_file("no_such_dir").join("export.wav");
    let result = WavWriter::write_file(&wt, "", path.to_str().unwrap());
    assert!(result.is_err());
    assert!(!path.exists());
}

#[test]
fn manager_session_runs_projects_end_to_end() {
    setup_logger();
    let project_path = temp_file("session.wtf");
    let wav_path = temp_file("session.wav");

    // save a project, load it into a fresh session, generate and export
    let project = WtProject::new("wave = X;", 4, 3);
    project.save(project_path.to_str().unwrap()).unwrap();
    let loaded = WtProject::load(project_path.to_str().unwrap()).unwrap();
    fs::remove_file(&project_path).unwrap();
    assert_eq!(loaded.frames(), 8);

    let mut manager = WtManager::new(Box::new(TestEngine::new()));
    manager.apply_project(&loaded);
    let wt = manager.regenerate().unwrap();
    assert_eq!(wt.count(), 4);
    assert_eq!(wt.frames(), 8);
    assert_eq!(wt.subtable(0), &[0.0, 0.125, 0.25, 0.375, 0.5, 0.625, 0.75, 0.875]);

    manager.export_wav(wav_path.to_str().unwrap()).unwrap();
    let bytes = fs::read(&wav_path).unwrap();
    fs::remove_file(&wav_path).unwrap();

    let code = read_chunk(&bytes, b"WTFs").unwrap();
    assert_eq!(code, b"wave = X;\0");
    let data = read_chunk(&bytes, b"data").unwrap();
    assert_eq!(data.len(), 4 * 8 * 4);
}
