//! Solver settings read from a `[solver]` table of a TOML document.
//!
//! ```
//! use RustedRelax::Utils::solver_config::SolverConfig;
//! use RustedRelax::somelinalg::iterative_solvers_cpu::IterativeMethod;
//! let config = SolverConfig::from_toml_str(
//!     r#"
//!     [solver]
//!     method = "sor"
//!     w = 1.1
//!     absolute_tolerance = 1e-10
//!     max_iterations = 500
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.method, IterativeMethod::Sor { w: 1.1 });
//! assert_eq!(config.max_iterations, Some(500));
//! ```
use crate::somelinalg::convergence::{DEFAULT_TOLL, Tolerances};
use crate::somelinalg::iterative_solvers_cpu::IterativeMethod;
use crate::somelinalg::linear_sys_errors::{LinearSystemError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub method: IterativeMethod,
    pub tolerances: Tolerances,
    /// `None` means iterate until convergence
    pub max_iterations: Option<usize>,
    pub loglevel: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            method: IterativeMethod::GaussSeidel,
            tolerances: Tolerances::default(),
            max_iterations: None,
            loglevel: Some("info".to_string()),
            log_dir: None,
        }
    }
}

fn invalid(msg: String) -> LinearSystemError {
    LinearSystemError::InvalidParameter(msg)
}

fn get_float(table: &Table, key: &str) -> Result<Option<f64>> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Float(v)) => Ok(Some(*v)),
        Some(Value::Integer(v)) => Ok(Some(*v as f64)),
        Some(other) => Err(invalid(format!(
            "'{}' must be a number, got {}",
            key, other
        ))),
    }
}

fn get_string(table: &Table, key: &str) -> Result<Option<String>> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
    }
}

impl SolverConfig {
    pub fn from_toml_str(text: &str) -> Result<SolverConfig> {
        let document = text
            .parse::<Table>()
            .map_err(|e| invalid(format!("cannot parse solver config: {}", e)))?;
        let mut config = SolverConfig::default();
        let table = match document.get("solver") {
            None => return Ok(config),
            Some(Value::Table(table)) => table,
            Some(_) => return Err(invalid("[solver] must be a table".to_string())),
        };

        if let Some(name) = get_string(table, "method")? {
            let w = get_float(table, "w")?;
            let step_size = get_float(table, "step_size")?;
            config.method = IterativeMethod::from_name(&name, w, step_size)?;
        }
        config.method.validate()?;

        let absolute = get_float(table, "absolute_tolerance")?.unwrap_or(DEFAULT_TOLL);
        let relative = get_float(table, "relative_tolerance")?.unwrap_or(0.0);
        config.tolerances = Tolerances::new(absolute, relative)?;

        config.max_iterations = match table.get("max_iterations") {
            None => None,
            Some(Value::Integer(n)) if *n > 0 => Some(*n as usize),
            Some(other) => {
                return Err(invalid(format!(
                    "'max_iterations' must be a positive integer, got {}",
                    other
                )));
            }
        };

        if let Some(loglevel) = get_string(table, "loglevel")? {
            // reject typos here rather than at solve time
            crate::Utils::logger::parse_loglevel(&loglevel)?;
            config.loglevel = Some(loglevel);
        }
        config.log_dir = get_string(table, "log_dir")?.map(PathBuf::from);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<SolverConfig> {
        let text = fs::read_to_string(path)
            .map_err(|e| invalid(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }
}
