use crate::somelinalg::linear_sys_errors::{LinearSystemError, Result};
use crate::somelinalg::linear_sys_matrix::LinearSystemMatrix;
use chrono::Local;
use csv::Writer;
use simplelog::*;
use std::fs::{self, File};
use std::path::Path;

/// "debug", "info", "warn", "error"; "off"/"none" mean no logger at all
pub fn parse_loglevel(loglevel: &str) -> Result<Option<LevelFilter>> {
    let level = match loglevel.to_lowercase().as_str() {
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" | "none" => return Ok(None),
        other => {
            return Err(LinearSystemError::InvalidParameter(format!(
                "loglevel must be debug, info, warn, error or off, got {}",
                other
            )));
        }
    };
    Ok(Some(level))
}

/// Install a terminal logger and, if `log_dir` is given, a file logger writing to
/// `log_dir/log_<date>_<time>.txt`, creating the directory if needed; a directory or
/// file that cannot be created is `InvalidParameter`. Returns Ok(true) when a logger was installed,
/// Ok(false) when logging is off or a global logger is already in place.
pub fn init_logger(loglevel: Option<&str>, log_dir: Option<&Path>) -> Result<bool> {
    let level = match loglevel {
        Some(loglevel) => parse_loglevel(loglevel)?,
        None => Some(LevelFilter::Info),
    };
    let Some(level) = level else {
        return Ok(false);
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(dir) = log_dir {
        fs::create_dir_all(dir).map_err(|e| {
            LinearSystemError::InvalidParameter(format!(
                "cannot create log directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = dir.join(format!("log_{}.txt", date_and_time));
        let file = File::create(&name).map_err(|e| {
            LinearSystemError::InvalidParameter(format!(
                "cannot create log file {}: {}",
                name.display(),
                e
            ))
        })?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    // a second init in the same process fails; the first logger stays active
    Ok(CombinedLogger::init(loggers).is_ok())
}

/// Write a solution vector as a two-column csv: variable name, value.
/// Missing names are filled with x0, x1, ...
pub fn save_solution_to_csv(
    x: &LinearSystemMatrix,
    headers: Option<&[String]>,
    path: &Path,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let values = x.to_vec();
    let mut wtr = Writer::from_path(path)?;
    wtr.write_record(["variable", "value"])?;
    for (i, value) in values.iter().enumerate() {
        let name = headers
            .and_then(|h| h.get(i).cloned())
            .unwrap_or_else(|| format!("x{}", i));
        wtr.write_record([name, value.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}
