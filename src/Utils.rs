//! different utility modules used throughout the project
/// logger setup and saving solution into file
pub mod logger;
/// solver settings from a TOML file
pub mod solver_config;
