/// Solver imports
pub mod cdcl_solver;

/// Search state and inference
pub mod analyze;
pub mod heuristic;
pub mod propagate;
pub mod trail;
pub mod watch_list;

pub mod clause;
pub mod clause_db;
/// Solver config
pub mod config;

pub mod error;
pub mod model;
pub mod stats;
pub mod trace;
/// General util/definitions
pub mod types;
