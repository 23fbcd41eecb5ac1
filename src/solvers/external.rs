//! Solves models with an external solver binary.
//! The model is written to an LP file, the solver is invoked on it,
//! and the solution file it writes is read back.
//! A solver binary will need to be present on the user's computer at runtime.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ModelError, Result};
use crate::model::Model;
use crate::solution::Solution;
use crate::solvers::SolveStrategy;
use crate::{lp_format, sol_format};

/// Environment variable overriding the solver binary
pub const SOLVER_ENV: &str = "LP_BRIDGE_SOLVER";
/// Environment variable overriding the directory for temporary files
pub const WORK_DIR_ENV: &str = "LP_BRIDGE_WORK_DIR";

/// How to invoke the external solver
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSolverConfig {
    binary: PathBuf,
    work_dir: PathBuf,
    extra_args: Vec<OsString>,
    keep_files: bool,
}

impl Default for ExternalSolverConfig {
    fn default() -> Self {
        ExternalSolverConfig {
            binary: PathBuf::from("highs"),
            work_dir: std::env::temp_dir(),
            extra_args: vec![],
            keep_files: false,
        }
    }
}

impl ExternalSolverConfig {
    /// The default configuration, with the binary and the work directory
    /// taken from `LP_BRIDGE_SOLVER` and `LP_BRIDGE_WORK_DIR` when they are set
    pub fn from_env() -> Self {
        let mut config = ExternalSolverConfig::default();
        if let Some(binary) = std::env::var_os(SOLVER_ENV) {
            config.binary = binary.into();
        }
        if let Some(dir) = std::env::var_os(WORK_DIR_ENV) {
            config.work_dir = dir.into();
        }
        config
    }

    /// The solver executable, looked up in `PATH` if it is not a path
    pub fn with_binary<P: Into<PathBuf>>(mut self, binary: P) -> Self {
        self.binary = binary.into();
        self
    }

    /// Where the model and solution files are written
    pub fn with_work_dir<P: Into<PathBuf>>(mut self, work_dir: P) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Arguments appended after `--model_file <path> --solution_file <path>`
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Leave the model and solution files on disk after solving
    pub fn with_keep_files(mut self, keep_files: bool) -> Self {
        self.keep_files = keep_files;
        self
    }

    /// The solver executable
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// The directory of the temporary files
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

/// Solves models by running a solver binary that accepts
/// `--model_file <path> --solution_file <path>`, such as the HiGHS executable.
///
/// Every solve uses freshly named files, so concurrent solves do not collide.
/// The files are deleted afterwards, and a failure to delete them is an error.
#[derive(Debug, Clone, Default)]
pub struct ExternalSolver {
    config: ExternalSolverConfig,
}

impl ExternalSolver {
    /// A solver that runs the binary described by `config`
    pub fn new(config: ExternalSolverConfig) -> Self {
        ExternalSolver { config }
    }

    /// The configuration of this solver
    pub fn config(&self) -> &ExternalSolverConfig {
        &self.config
    }

    fn run(&self, model: &Model, model_file: &Path, solution_file: &Path) -> Result<Solution> {
        lp_format::write_model(model, model_file)?;

        let output = Command::new(&self.config.binary)
            .arg("--model_file")
            .arg(model_file)
            .arg("--solution_file")
            .arg(solution_file)
            .args(&self.config.extra_args)
            .output()
            .map_err(|e| {
                ModelError::Solve(format!(
                    "cannot run {}: {}",
                    self.config.binary.display(),
                    e
                ))
            })?;

        let solver = self.config.binary.display().to_string();
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            info!(solver = %solver, "{}", line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            warn!(solver = %solver, "{}", line);
        }
        info!(solver = %solver, exit_code = ?output.status.code(), "solver exited");

        if !output.status.success() {
            return Err(ModelError::Solve(format!(
                "{} exited with {}",
                solver, output.status
            )));
        }
        sol_format::read_solution(solution_file, model.variables())
    }
}

/// Delete a temporary file. A file that was never created is not an error.
fn remove(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ModelError::Resource {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl SolveStrategy for ExternalSolver {
    fn solve(&mut self, model: &Model) -> Result<Solution> {
        let id = Uuid::new_v4();
        let model_file = self.config.work_dir.join(format!("out-{}.lp", id));
        let solution_file = self.config.work_dir.join(format!("out-{}.sol", id));

        let result = self.run(model, &model_file, &solution_file);
        if self.config.keep_files {
            info!(model_file = %model_file.display(), solution_file = %solution_file.display(), "kept solver files");
            return result;
        }
        let cleanup = remove(&model_file).and(remove(&solution_file));
        match (result, cleanup) {
            (Ok(solution), Ok(())) => Ok(solution),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup_error)) => {
                warn!(error = %cleanup_error, "temporary files left behind");
                Err(e)
            }
        }
    }

    fn name(&self) -> &'static str {
        "external"
    }
}
