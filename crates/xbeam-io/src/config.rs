//! JSON run configuration.
//!
//! File references are resolved against the directory holding the
//! configuration document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use xbeam_solver::{BeamFormulation, ExplicitOptions};

use crate::error::{IoError, Result};

/// Run controls read from the `options` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    #[serde(flatten)]
    pub integrator: ExplicitOptions,
    pub verbose: bool,
    /// Iterations between state dumps; 0 dumps only the first and last state.
    pub save_frequency: usize,
    pub state_filename: String,
    pub nodal_displacements_filename: String,
    pub nodal_velocities_filename: String,
    pub nodal_forces_filename: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            integrator: ExplicitOptions::default(),
            verbose: false,
            save_frequency: 0,
            state_filename: "state".to_string(),
            nodal_displacements_filename: "nodal_displacements".to_string(),
            nodal_velocities_filename: "nodal_velocities".to_string(),
            nodal_forces_filename: "nodal_forces".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub nodes: PathBuf,
    pub elems: PathBuf,
    pub props: PathBuf,
    #[serde(default)]
    pub bcs: Option<PathBuf>,
    #[serde(default)]
    pub forces: Option<PathBuf>,
    #[serde(default)]
    pub nodal_displacements: Option<PathBuf>,
    #[serde(default)]
    pub nodal_velocities: Option<PathBuf>,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub iteration_number: usize,
    #[serde(default)]
    pub element_type: BeamFormulation,
    #[serde(default)]
    pub options: RunOptions,
}

impl RunConfig {
    pub fn from_document(document: &Value) -> Result<Self> {
        if !document.is_object() {
            return Err(IoError::Config(
                "configuration document must be a JSON object".to_string(),
            ));
        }
        let config: RunConfig = serde_json::from_value(document.clone())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(IoError::Config(format!(
                "start_time ({}) and end_time ({}) must be finite",
                self.start_time, self.end_time
            )));
        }
        if self.options.state_filename.is_empty() {
            return Err(IoError::Config("state_filename must not be empty".to_string()));
        }
        self.options.integrator.validate()?;
        Ok(())
    }
}

/// Reads a configuration file as an untyped document.
///
/// The document is kept as-is so state dumps can echo every key back.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| IoError::file(path, e))?;
    serde_json::from_str(&raw).map_err(|e| {
        IoError::Config(format!("error parsing {}: {e}", path.display()))
    })
}

pub fn resolve(base_dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        base_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "nodes": "nodes.csv",
            "elems": "elems.csv",
            "props": "props.csv",
            "start_time": 0.0,
            "end_time": 1e-3
        })
    }

    #[test]
    fn applies_defaults() {
        let config = RunConfig::from_document(&minimal()).unwrap();
        assert_eq!(config.bcs, None);
        assert_eq!(config.iteration_number, 0);
        assert_eq!(config.element_type, BeamFormulation::Timoshenko);
        assert_eq!(config.options, RunOptions::default());
        assert_eq!(config.options.state_filename, "state");
        assert_eq!(config.options.integrator.beta, 0.25);
    }

    #[test]
    fn reads_options_object() {
        let mut doc = minimal();
        doc["element_type"] = json!("euler_bernoulli");
        doc["options"] = json!({
            "verbose": true,
            "save_frequency": 10,
            "state_filename": "out/state",
            "beta": 0.0,
            "damping_alpha": 0.5
        });

        let config = RunConfig::from_document(&doc).unwrap();
        assert_eq!(config.element_type, BeamFormulation::EulerBernoulli);
        assert!(config.options.verbose);
        assert_eq!(config.options.save_frequency, 10);
        assert_eq!(config.options.state_filename, "out/state");
        assert_eq!(config.options.nodal_forces_filename, "nodal_forces");
        assert_eq!(config.options.integrator.beta, 0.0);
        assert_eq!(config.options.integrator.gamma, 0.5);
        assert_eq!(config.options.integrator.damping_alpha, 0.5);
        assert_eq!(config.options.integrator.damping_beta, 0.01);
    }

    #[test]
    fn requires_time_window() {
        let mut doc = minimal();
        doc.as_object_mut().unwrap().remove("end_time");
        assert!(matches!(
            RunConfig::from_document(&doc),
            Err(IoError::Json(_))
        ));
    }

    #[test]
    fn rejects_wrong_value_types() {
        let mut doc = minimal();
        doc["options"] = json!({ "verbose": "yes" });
        assert!(RunConfig::from_document(&doc).is_err());

        let mut doc = minimal();
        doc["start_time"] = json!("zero");
        assert!(RunConfig::from_document(&doc).is_err());

        assert!(RunConfig::from_document(&json!([1, 2])).is_err());
    }

    #[test]
    fn rejects_bad_integrator_options() {
        let mut doc = minimal();
        doc["options"] = json!({ "gamma": -1.0 });
        assert!(matches!(
            RunConfig::from_document(&doc),
            Err(IoError::Solver(_))
        ));
    }

    #[test]
    fn resolves_relative_paths() {
        let base = Path::new("/runs/frame");
        assert_eq!(
            resolve(base, Path::new("nodes.csv")),
            PathBuf::from("/runs/frame/nodes.csv")
        );
        assert_eq!(
            resolve(base, Path::new("/data/nodes.csv")),
            PathBuf::from("/data/nodes.csv")
        );
    }

    #[test]
    fn load_document_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ \"nodes\": ").unwrap();
        let err = load_document(&path).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }
}
