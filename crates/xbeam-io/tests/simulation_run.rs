/// Integration tests for configuration-driven runs
///
/// A one-element steel rod is clamped at node 0 and pulled axially at node 1.
/// Runs are short (a handful of stable time steps) and write into a
/// temporary directory.

use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;
use xbeam_io::{IoError, SimulationManager};
use xbeam_solver::SolverError;

const E: f64 = 200e9;
const DENSITY: f64 = 7800.0;
const PULL: f64 = 0.001;

fn stable_dt() -> f64 {
    1.0 / (E / DENSITY).sqrt() / 10.0
}

fn write_model(dir: &Path) {
    fs::write(dir.join("nodes.csv"), "0,0,0\n1,0,0\n").unwrap();
    fs::write(dir.join("elems.csv"), "0,1\n").unwrap();
    fs::write(
        dir.join("props.csv"),
        "200e9,80e9,0.0314159265358979,0.0000785398,0.0000785398,0.0001570796,7800,0,1,0\n",
    )
    .unwrap();
    let mut bcs = String::new();
    for dof in 0..6 {
        bcs.push_str(&format!("0,{dof},0,0\n"));
    }
    bcs.push_str(&format!("1,0,{PULL},1\n"));
    fs::write(dir.join("bcs.csv"), bcs).unwrap();
}

fn base_config(steps: usize, save_frequency: usize) -> Value {
    json!({
        "nodes": "nodes.csv",
        "elems": "elems.csv",
        "props": "props.csv",
        "bcs": "bcs.csv",
        "start_time": 0.0,
        "end_time": steps as f64 * stable_dt(),
        "comment": "axial pull",
        "options": {
            "save_frequency": save_frequency,
            "damping_alpha": 0.0,
            "damping_beta": 0.0
        }
    })
}

fn setup(steps: usize, save_frequency: usize) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        serde_json::to_vec_pretty(&base_config(steps, save_frequency)).unwrap(),
    )
    .unwrap();
    (dir, config)
}

fn read_column(path: &Path) -> Vec<f64> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.parse().unwrap())
        .collect()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_builds_system_from_config() {
    let (_dir, config) = setup(10, 5);
    let manager = SimulationManager::from_config_file(&config).unwrap();

    assert_eq!(manager.system().num_dofs(), 12);
    assert_eq!(manager.iteration_number(), 0);
    assert!((manager.time_step() - stable_dt()).abs() < 1e-15 * stable_dt());
    assert_eq!(manager.system().velocities()[6], PULL);
    assert_eq!(manager.system().options().damping_alpha, 0.0);
    assert_eq!(manager.config_document()["comment"], "axial pull");
}

#[test]
fn test_run_writes_numbered_dumps() {
    let (dir, config) = setup(10, 5);
    let mut manager = SimulationManager::from_config_file(&config).unwrap();
    manager.run().unwrap();

    assert_eq!(manager.iteration_number(), 10);
    for index in 0..3 {
        for prefix in ["nodal_displacements", "nodal_velocities", "nodal_forces"] {
            let file = dir.path().join(format!("{prefix}_{index:05}.txt"));
            assert!(file.exists(), "missing {}", file.display());
            assert_eq!(read_column(&file).len(), 12);
        }
        assert!(dir.path().join(format!("state_{index:05}.json")).exists());
    }
    assert!(!dir.path().join("state_00003.json").exists());

    let initial = read_column(&dir.path().join("nodal_displacements_00000.txt"));
    assert!(initial.iter().all(|v| *v == 0.0));

    let last = read_column(&dir.path().join("nodal_displacements_00002.txt"));
    let expected = 10.0 * stable_dt() * PULL;
    assert!(
        (last[6] - expected).abs() < 1e-8 * expected,
        "tip displacement {} vs {expected}",
        last[6]
    );
    assert!(last[..6].iter().all(|v| *v == 0.0), "clamped node moved");

    let velocities = read_column(&dir.path().join("nodal_velocities_00002.txt"));
    assert_eq!(velocities[6], PULL);
}

#[test]
fn test_state_document_updates_restart_keys() {
    let (dir, config) = setup(10, 5);
    let mut manager = SimulationManager::from_config_file(&config).unwrap();
    manager.run().unwrap();

    let state_file = manager.last_state_file().unwrap().to_path_buf();
    assert_eq!(state_file, dir.path().join("state_00002.json"));

    let state = read_json(&state_file);
    assert_eq!(state["iteration_number"], 10);
    assert_eq!(state["nodal_displacements"], "nodal_displacements_00002.txt");
    assert_eq!(state["nodal_velocities"], "nodal_velocities_00002.txt");
    assert_eq!(state["nodes"], "nodes.csv");
    assert_eq!(state["bcs"], "bcs.csv");
    assert_eq!(state["comment"], "axial pull");
    assert_eq!(state["options"]["save_frequency"], 5);

    let time = state["start_time"].as_f64().unwrap();
    assert!((time - manager.system().time()).abs() < 1e-14 * time);
    assert_eq!(
        manager.config_document()["nodal_displacements"],
        "nodal_displacements_00002.txt"
    );
}

#[test]
fn test_restart_resumes_from_state() {
    let (dir, config) = setup(10, 5);
    let mut first = SimulationManager::from_config_file(&config).unwrap();
    first.run().unwrap();

    let state_file = dir.path().join("state_00002.json");
    let mut state = read_json(&state_file);
    state["end_time"] = json!(20.0 * stable_dt());
    let restart_file = dir.path().join("restart.json");
    fs::write(&restart_file, serde_json::to_vec_pretty(&state).unwrap()).unwrap();

    let mut second = SimulationManager::from_config_file(&restart_file).unwrap();
    assert_eq!(second.iteration_number(), 10);
    let (t1, t2) = (first.system().time(), second.system().time());
    assert!((t1 - t2).abs() < 1e-14 * t1);
    let resumed = second.system().displacements()[6];
    let saved = first.system().displacements()[6];
    assert!((resumed - saved).abs() < 1e-13 * saved.abs());

    second.run().unwrap();
    assert_eq!(second.iteration_number(), 20);
    assert!(second.system().displacements()[6] > resumed);
    assert!(dir.path().join("state_00004.json").exists());
}

#[test]
fn test_zero_save_frequency_dumps_first_and_last() {
    let (dir, config) = setup(4, 0);
    let mut manager = SimulationManager::from_config_file(&config).unwrap();
    manager.run().unwrap();

    assert_eq!(manager.iteration_number(), 4);
    assert!(dir.path().join("state_00000.json").exists());
    assert!(dir.path().join("state_00004.json").exists());
    assert!(!dir.path().join("state_00002.json").exists());
}

#[test]
fn test_output_prefixes_may_name_subdirectories() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());
    let mut doc = base_config(2, 1);
    doc["options"]["state_filename"] = json!("out/state");
    doc["options"]["nodal_displacements_filename"] = json!("out/u");

    let mut manager = SimulationManager::from_document(doc, dir.path()).unwrap();
    manager.run().unwrap();

    let state = read_json(&dir.path().join("out").join("state_00002.json"));
    assert_eq!(state["nodal_displacements"], "u_00002.txt");
    let nodes = state["nodes"].as_str().unwrap();
    assert!(Path::new(nodes).is_absolute(), "{nodes}");
    assert!(dir.path().join("nodal_velocities_00002.txt").exists());
}

#[test]
fn test_missing_model_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());
    let mut doc = base_config(2, 0);
    doc["nodes"] = json!("absent.csv");

    let err = SimulationManager::from_document(doc, dir.path()).err().unwrap();
    assert!(matches!(err, IoError::File { .. }), "{err:?}");
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn test_initial_state_length_is_checked() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());
    fs::write(dir.path().join("u0.txt"), "0\n0\n0\n").unwrap();
    let mut doc = base_config(2, 0);
    doc["nodal_displacements"] = json!("u0.txt");

    let err = SimulationManager::from_document(doc, dir.path()).err().unwrap();
    assert!(err.to_string().contains("required 12 values"), "{err}");
}

#[test]
fn test_boundary_condition_out_of_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path());
    for row in ["5,0,0,0\n", "1e19,0,0,0\n"] {
        fs::write(dir.path().join("bcs.csv"), row).unwrap();
        let err = SimulationManager::from_document(base_config(2, 0), dir.path())
            .err()
            .unwrap();
        assert!(
            matches!(
                err,
                IoError::Solver(SolverError::PrescribedIndexOutOfRange { .. })
            ),
            "{row}: {err:?}"
        );
    }
}
