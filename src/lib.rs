//! A CDCL SAT solver.
//!
//! The engine decides satisfiability of a formula already in clausal form: decide, propagate,
//! analyse each conflict down to its first unique implication point, learn the resulting
//! clause and backjump. See [`solver::cdcl_solver::CdclSolver`].

pub mod dimacs;
pub mod solver;

pub use dimacs::cnf::{CnfFormula, InputError};
pub use solver::{
    cdcl_solver::CdclSolver,
    config::SolverConfig,
    error::SolverError,
    model::Model,
    types::{Lit, SolveStatus},
};

/// Verdict with its witness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Solution {
    Sat(Model),
    Unsat,
}

/// Solves with the default configuration.
pub fn solve(formula: &CnfFormula) -> Result<Solution, SolverError> {
    solve_with(SolverConfig::default(), formula)
}

pub fn solve_with(config: SolverConfig, formula: &CnfFormula) -> Result<Solution, SolverError> {
    // An empty clause can never be satisfied; no need to build an engine.
    if formula.has_empty_clause() {
        return Ok(Solution::Unsat);
    }
    let mut solver = CdclSolver::new(config, formula);
    match solver.solve()? {
        SolveStatus::Unsat => Ok(Solution::Unsat),
        SolveStatus::Sat => match solver.model() {
            Some(model) => Ok(Solution::Sat(model)),
            None => Err(SolverError::IncompleteAssignment {
                unassigned: solver.n_vars() - solver.trail().len(),
            }),
        },
    }
}
