//! Load and save of wavetable project files.
//!
//! A project file is a small JSON document holding the generator script
//! and the table dimensions, enough to reproduce the wavetable exactly.
//! The subtable length is stored as its base-2 logarithm, since valid
//! table sizes are powers of two.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Write};

use log::{error, info};
use serde::{Deserialize, Serialize};

const FILE_TYPE: &str = "Wavetable source";
const FILE_VERSION: &str = "1";

// Public error types

#[derive(Debug)]
pub enum ProjectError {
    Io(std::io::Error),
    Json(serde_json::Error),
    WrongFileType,
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectError::Io(e) => write!(f, "{}", e),
            ProjectError::Json(e) => write!(f, "{}", e),
            ProjectError::WrongFileType => write!(f, "The file format is incorrect."),
        }
    }
}

impl Error for ProjectError {}

impl From<std::io::Error> for ProjectError {
    fn from(e: std::io::Error) -> ProjectError {
        ProjectError::Io(e)
    }
}

impl From<serde_json::Error> for ProjectError {
    fn from(e: serde_json::Error) -> ProjectError {
        ProjectError::Json(e)
    }
}

/// A stored generator setup: script plus table dimensions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WtProject {
    #[serde(rename = "file-type")]
    file_type: String,
    #[serde(rename = "file-version")]
    file_version: String,
    pub source: String,
    #[serde(rename = "table-count")]
    pub table_count: usize,
    #[serde(rename = "table-size-log2")]
    pub table_size_log2: u32,
}

impl WtProject {
    /// Create a project from a script and table dimensions.
    ///
    /// ```
    /// use wavescript::WtProject;
    ///
    /// let project = WtProject::new("wave = sin(2*pi*X);", 64, 11);
    /// assert_eq!(project.frames(), 2048);
    /// ```
    pub fn new(source: &str, table_count: usize, table_size_log2: u32) -> WtProject {
        WtProject {
            file_type: FILE_TYPE.to_string(),
            file_version: FILE_VERSION.to_string(),
            source: source.to_string(),
            table_count,
            table_size_log2,
        }
    }

    /// Get the number of samples per subtable.
    pub fn frames(&self) -> usize {
        1 << self.table_size_log2
    }

    /// Read a project from the given input stream.
    ///
    /// Documents whose file-type tag does not match are rejected.
    pub fn from_reader<R: Read>(source: R) -> Result<WtProject, ProjectError> {
        let project: WtProject = serde_json::from_reader(source)?;
        if project.file_type != FILE_TYPE {
            error!("Not a wavetable project, file type [{}]", project.file_type);
            return Err(ProjectError::WrongFileType);
        }
        Ok(project)
    }

    /// Write the project to the given output stream as JSON.
    pub fn to_writer<W: Write>(&self, dest: W) -> Result<(), ProjectError> {
        serde_json::to_writer_pretty(dest, self)?;
        Ok(())
    }

    /// Load a project file with the given filename.
    pub fn load(filename: &str) -> Result<WtProject, ProjectError> {
        info!("Reading project file [{}]", filename);
        let file = File::open(filename)?;
        WtProject::from_reader(BufReader::new(file))
    }

    /// Save the project to a file with the given filename.
    ///
    /// A destination that could not be written completely is removed
    /// again.
    pub fn save(&self, filename: &str) -> Result<(), ProjectError> {
        info!("Writing project file [{}]", filename);
        let mut file = File::create(filename)?;
        let result = self
            .to_writer(&mut file)
            .and_then(|_| file.flush().map_err(ProjectError::from));
        if let Err(e) = result {
            error!("Writing [{}] failed: {}", filename, e);
            drop(file);
            let _ = std::fs::remove_file(filename);
            return Err(e);
        }
        Ok(())
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_round_trips_through_json() {
        let project = WtProject::new("wave = X;", 32, 8);
        let mut buffer = Vec::new();
        project.to_writer(&mut buffer).unwrap();
        let read_back = WtProject::from_reader(&buffer[..]).unwrap();
        assert_eq!(read_back.source, "wave = X;");
        assert_eq!(read_back.table_count, 32);
        assert_eq!(read_back.table_size_log2, 8);
        assert_eq!(read_back.frames(), 256);
    }

    #[test]
    fn json_keys_are_hyphenated() {
        let project = WtProject::new("wave = X;", 64, 11);
        let json = serde_json::to_string(&project).unwrap();
        assert!(json.contains("\"file-type\":\"Wavetable source\""));
        assert!(json.contains("\"file-version\":\"1\""));
        assert!(json.contains("\"table-count\":64"));
        assert!(json.contains("\"table-size-log2\":11"));
    }

    #[test]
    fn wrong_file_type_is_rejected() {
        let json = r#"{
            "file-type": "Something else",
            "file-version": "1",
            "source": "",
            "table-count": 8,
            "table-size-log2": 6
        }"#;
        let result = WtProject::from_reader(json.as_bytes());
        assert!(matches!(result, Err(ProjectError::WrongFileType)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let result = WtProject::from_reader(&b"not json"[..]);
        assert!(matches!(result, Err(ProjectError::Json(_))));
    }
}
