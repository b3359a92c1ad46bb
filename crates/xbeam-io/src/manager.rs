//! Configuration-driven simulation runs.

use std::fmt::Arguments;
use std::path::{Path, PathBuf};
use std::time::Instant;

use nalgebra::DVector;
use serde_json::Value;
use tracing::{debug, info};
use xbeam_solver::{ExplicitSystem, Mesh, ValueCompare};

use crate::config::{RunConfig, load_document, resolve};
use crate::error::{IoError, Result};
use crate::setup::{
    read_boundary_conditions, read_elements, read_forces, read_nodal_vector, read_nodes,
};
use crate::writer::{numbered_name, write_column, write_document};

fn report(verbose: bool, message: Arguments<'_>) {
    if verbose {
        info!("{message}");
    } else {
        debug!("{message}");
    }
}

/// Path of `file` as written into a state document stored in `dir`.
fn reference_from(dir: &Path, file: &Path) -> String {
    file.strip_prefix(dir)
        .unwrap_or(file)
        .to_string_lossy()
        .into_owned()
}

/// Owns a configured [`ExplicitSystem`] and drives it to the end time,
/// dumping restartable state along the way.
pub struct SimulationManager {
    document: Value,
    config: RunConfig,
    base_dir: PathBuf,
    system: ExplicitSystem,
    dt: f64,
    iteration_number: usize,
    last_state_file: Option<PathBuf>,
}

impl SimulationManager {
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = load_document(path)?;
        let base_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::from_document(document, base_dir)
    }

    /// Builds the system from an already parsed document. Relative file
    /// references are resolved against `base_dir`.
    pub fn from_document(document: Value, base_dir: impl AsRef<Path>) -> Result<Self> {
        let started = Instant::now();
        let config = RunConfig::from_document(&document)?;
        let base_dir = std::path::absolute(base_dir.as_ref())
            .map_err(|e| IoError::file(base_dir.as_ref(), e))?;
        let verbose = config.options.verbose;

        report(verbose, format_args!("parsing node list"));
        let nodes = read_nodes(resolve(&base_dir, &config.nodes))?;

        report(verbose, format_args!("parsing element list"));
        let elements = read_elements(
            resolve(&base_dir, &config.elems),
            resolve(&base_dir, &config.props),
            config.element_type,
        )?;

        report(verbose, format_args!("parsing boundary conditions"));
        let bcs = match &config.bcs {
            Some(file) => read_boundary_conditions(resolve(&base_dir, file))?,
            None => Vec::new(),
        };

        report(verbose, format_args!("assembling mesh"));
        let num_nodes = nodes.len();
        let num_elements = elements.len();
        let mesh = Mesh::new(nodes, elements, bcs)?;
        let dt = mesh.stable_timestep().ok_or_else(|| {
            IoError::Config("cannot estimate a time step for a model without elements".to_string())
        })?;

        report(verbose, format_args!("parsing external forces"));
        let forces = match &config.forces {
            Some(file) => read_forces(resolve(&base_dir, file))?,
            None => Vec::new(),
        };

        report(verbose, format_args!("parsing initial conditions"));
        let n = mesh.num_dofs();
        let initial_state = |file: &Option<PathBuf>| -> Result<DVector<f64>> {
            match file {
                Some(file) => read_nodal_vector(resolve(&base_dir, file), n),
                None => Ok(DVector::zeros(n)),
            }
        };
        let displacements = initial_state(&config.nodal_displacements)?;
        let velocities = initial_state(&config.nodal_velocities)?;

        let system = ExplicitSystem::new(
            mesh,
            forces,
            displacements,
            velocities,
            config.start_time,
            config.options.integrator,
        )?;

        report(
            verbose,
            format_args!(
                "constructed system of {num_elements} elements and {num_nodes} nodes in {:.3} s, \
                 estimated stable time step {dt:e} s",
                started.elapsed().as_secs_f64()
            ),
        );

        Ok(Self {
            iteration_number: config.iteration_number,
            document,
            config,
            base_dir,
            system,
            dt,
            last_state_file: None,
        })
    }

    /// Steps until the system time reaches `end_time`.
    ///
    /// The state is dumped before the first step, every `save_frequency`
    /// iterations and after the last step. The final step may overshoot
    /// `end_time` by less than one time step.
    pub fn run(&mut self) -> Result<()> {
        let started = Instant::now();
        let verbose = self.config.options.verbose;
        let compare = ValueCompare::<f64>::default();
        let start_time = self.system.time();
        let end_time = self.config.end_time;
        let period = end_time - start_time;
        let save_frequency = self.config.options.save_frequency;

        report(verbose, format_args!("saving initial system state"));
        self.dump_system()?;

        report(verbose, format_args!("advancing equations of motion"));
        let mut reported = 0;
        while compare.less_than(self.system.time(), end_time) {
            self.system.advance(self.dt)?;
            self.iteration_number += 1;
            if save_frequency > 0 && self.iteration_number % save_frequency == 0 {
                self.dump_system()?;
            }

            let percent = ((self.system.time() - start_time) / period * 100.0 + 0.1) as i64;
            if percent > reported {
                report(verbose, format_args!("{percent}% completed"));
                reported = percent;
            }
        }

        report(verbose, format_args!("saving final system state"));
        self.dump_system()?;

        info!(
            iterations = self.iteration_number,
            time = self.system.time(),
            factorizations = self.system.factorization_count(),
            "explicit time integration completed in {:.3} s",
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Writes displacement, velocity and force columns plus a state
    /// document that can be used to restart the run.
    pub fn dump_system(&mut self) -> Result<PathBuf> {
        let options = &self.config.options;
        let index = self.iteration_number / options.save_frequency.max(1);
        let output = |prefix: &str, extension: &str| {
            resolve(
                &self.base_dir,
                Path::new(&format!("{}.{extension}", numbered_name(prefix, index))),
            )
        };

        let displacements_file = output(&options.nodal_displacements_filename, "txt");
        let velocities_file = output(&options.nodal_velocities_filename, "txt");
        let forces_file = output(&options.nodal_forces_filename, "txt");
        let state_file = output(&options.state_filename, "json");

        write_column(&displacements_file, self.system.displacements())?;
        write_column(&velocities_file, self.system.velocities())?;
        write_column(&forces_file, &self.system.forces())?;

        let state_dir = state_file.parent().unwrap_or(&self.base_dir).to_path_buf();
        let config = &self.config;
        let model_files = [
            ("nodes", Some(&config.nodes)),
            ("elems", Some(&config.elems)),
            ("props", Some(&config.props)),
            ("bcs", config.bcs.as_ref()),
            ("forces", config.forces.as_ref()),
        ];
        if let Some(map) = self.document.as_object_mut() {
            for (key, file) in model_files {
                if let Some(file) = file {
                    let file = resolve(&self.base_dir, file);
                    map.insert(key.to_string(), Value::String(reference_from(&state_dir, &file)));
                }
            }
            map.insert(
                "nodal_displacements".to_string(),
                Value::String(reference_from(&state_dir, &displacements_file)),
            );
            map.insert(
                "nodal_velocities".to_string(),
                Value::String(reference_from(&state_dir, &velocities_file)),
            );
            map.insert("start_time".to_string(), Value::from(self.system.time()));
            map.insert(
                "iteration_number".to_string(),
                Value::from(self.iteration_number),
            );
        }
        write_document(&state_file, &self.document)?;

        debug!(
            iteration = self.iteration_number,
            time = self.system.time(),
            state = %state_file.display(),
            "dumped system state"
        );
        self.last_state_file = Some(state_file.clone());
        Ok(state_file)
    }

    pub fn system(&self) -> &ExplicitSystem {
        &self.system
    }

    pub fn time_step(&self) -> f64 {
        self.dt
    }

    pub fn iteration_number(&self) -> usize {
        self.iteration_number
    }

    /// Configuration document as last written to a state file.
    pub fn config_document(&self) -> &Value {
        &self.document
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn last_state_file(&self) -> Option<&Path> {
        self.last_state_file.as_deref()
    }
}
