//! examples of usage of RustedRelax
/// iterative solvers on test systems: method comparison, SOR factor scan, config-driven solve
pub mod iterative_examples;
