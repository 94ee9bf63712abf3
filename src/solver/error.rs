use thiserror::Error;

use super::types::DecisionLevel;

/// Internal invariant violations. These mean the engine is broken, never that the input is bad;
/// an unsatisfiable formula is reported as `SolveStatus::Unsat`, not as an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("implied variable x{var} has no antecedent clause")]
    MissingAntecedent { var: u32 },

    #[error("conflict analysis ran off the trail before reaching a UIP at level {level}")]
    UipNotFound { level: DecisionLevel },

    #[error("conflicting clause has no literal assigned at the current level {level}")]
    NoCurrentLevelLiteral { level: DecisionLevel },

    #[error("backtrack level {level} is not below the current level {current}")]
    InvalidBacktrackLevel {
        level: DecisionLevel,
        current: DecisionLevel,
    },

    #[error("search ended SAT with {unassigned} variables unassigned")]
    IncompleteAssignment { unassigned: usize },

    #[error("model falsifies original clause {clause}")]
    ModelViolatesClause { clause: String },
}
