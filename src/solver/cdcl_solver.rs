use log::{debug, info};

use crate::dimacs::cnf::CnfFormula;

use super::{
    analyze::{analyze, Analysis},
    clause::{Clause, ClauseKind},
    clause_db::{ClauseDb, ClauseKey},
    config::SolverConfig,
    error::SolverError,
    heuristic::Vsids,
    model::Model,
    propagate::Propagator,
    stats::RuntimeStats,
    trace::{LogTracer, SearchEvent, Tracer},
    trail::Trail,
    types::{DecisionLevel, Lit, SolveStatus},
};

/// Where the search loop is. `Satisfied` and `Unsat` are returned rather than stored.
enum SearchState {
    Deciding,
    Propagating,
    AnalyzingConflict(ClauseKey),
    Backtracking(Analysis),
}

pub struct CdclSolver<T: Tracer = LogTracer> {
    /// Original and learned clauses.
    db: ClauseDb,
    /// Assignment stack during search and inference; will need to rewind on conflicts.
    trail: Trail,
    propagator: Propagator,
    heuristic: Vsids,
    verify_model: bool,
    tracer: T,
    stats: RuntimeStats,
    /// The input held an empty clause, so there is nothing to search.
    has_empty_clause: bool,
    /// Set once solve() finishes.
    status: Option<SolveStatus>,
}

impl CdclSolver<LogTracer> {
    pub fn new(c: SolverConfig, formula: &CnfFormula) -> Self {
        Self::with_tracer(c, formula, LogTracer)
    }
}

impl<T: Tracer> CdclSolver<T> {
    pub fn with_tracer(c: SolverConfig, formula: &CnfFormula, tracer: T) -> Self {
        let n_vars = formula.n_vars();
        let mut db = ClauseDb::new(formula.len());
        let mut propagator = Propagator::new(c.propagation, n_vars);
        let mut stats = RuntimeStats::default();
        let mut has_empty_clause = false;

        for lits in formula.clauses() {
            let clause = Clause::new(lits, ClauseKind::Original);
            if clause.is_empty() {
                has_empty_clause = true;
                continue;
            }
            // (p | !p) holds under every assignment
            if clause.is_tautology() {
                debug!("Dropping tautology {clause}");
                stats.n_tautologies += 1;
                continue;
            }
            stats.n_clauses += 1;
            stats.n_clause_lits += clause.len() as u64;
            let ck = db.add_original(&clause.lits);
            propagator.attach(ck, &db);
        }
        debug!(
            "Loaded {} clauses over {} variables ({:?} propagation)",
            stats.n_clauses,
            n_vars,
            propagator.mode()
        );

        let heuristic = Vsids::new(c.decision_config(), n_vars, &db);
        Self {
            db,
            trail: Trail::new(n_vars),
            propagator,
            heuristic,
            verify_model: c.verify_model,
            tracer,
            stats,
            has_empty_clause,
            status: None,
        }
    }

    /// Decides the formula. Calling it again returns the first verdict.
    pub fn solve(&mut self) -> Result<SolveStatus, SolverError> {
        if let Some(status) = self.status {
            return Ok(status);
        }

        let status = if self.has_empty_clause {
            SolveStatus::Unsat
        } else {
            self.search()?
        };
        if status == SolveStatus::Sat && self.verify_model {
            self.verify()?;
        }

        self.status = Some(status);
        self.tracer.event(&SearchEvent::Finished(status));
        info!(
            "{status} after {} decisions, {} conflicts, {} learnt clauses",
            self.stats.decisions, self.stats.conflicts, self.stats.n_learnts
        );
        Ok(status)
    }

    fn search(&mut self) -> Result<SolveStatus, SolverError> {
        // Units and anything already forced get propagated before the first decision.
        let mut state = SearchState::Propagating;
        loop {
            state = match state {
                SearchState::Deciding => match self.heuristic.decide(&self.trail) {
                    // If no next one found, every variable is assigned without conflict
                    None => return Ok(SolveStatus::Sat),
                    Some(lit) => {
                        self.make_decision(lit);
                        SearchState::Propagating
                    }
                },
                SearchState::Propagating => match self.propagator.propagate(
                    &mut self.db,
                    &mut self.trail,
                    &mut self.tracer,
                    &mut self.stats,
                ) {
                    None => SearchState::Deciding,
                    Some(ck) => SearchState::AnalyzingConflict(ck),
                },
                SearchState::AnalyzingConflict(ck) => {
                    let level = self.trail.current_level();
                    self.stats.conflicts += 1;
                    if self.tracer.enabled() {
                        self.tracer.event(&SearchEvent::Conflict {
                            clause: self.db[ck].lits.clone(),
                            level,
                        });
                    }
                    // If conflict occurred at DL 0, nothing is left to undo
                    if level == 0 {
                        return Ok(SolveStatus::Unsat);
                    }
                    SearchState::Backtracking(analyze(ck, &self.db, &self.trail)?)
                }
                SearchState::Backtracking(analysis) => {
                    self.learn(analysis)?;
                    SearchState::Propagating
                }
            };
        }
    }

    /// Backtracks for a learned clause and stores it; the next propagation asserts it.
    fn learn(&mut self, analysis: Analysis) -> Result<(), SolverError> {
        let current = self.trail.current_level();
        let Analysis {
            learned,
            backtrack_level,
        } = analysis;
        if backtrack_level >= current {
            return Err(SolverError::InvalidBacktrackLevel {
                level: backtrack_level,
                current,
            });
        }

        if self.tracer.enabled() {
            self.tracer.event(&SearchEvent::Learned {
                clause: learned.clone(),
                backtrack_level,
            });
        }
        if self.heuristic.on_learned(&learned) {
            self.stats.decays += 1;
        }

        self.backtrack(backtrack_level);

        let ck = self.db.add_learned(&learned);
        self.stats.n_learnts += 1;
        self.stats.n_learnt_lits += learned.len() as u64;
        self.propagator.attach(ck, &self.db);
        Ok(())
    }

    // Backtrack to the desired decision level, handing freed variables back to the heuristic.
    fn backtrack(&mut self, dl: DecisionLevel) {
        let from = self.trail.current_level();
        for a in self.trail.truncate_to_level(dl) {
            self.heuristic.on_unassigned(&a);
        }
        self.stats.backtracks += 1;
        self.tracer.event(&SearchEvent::Backtrack { from, to: dl });
    }

    fn make_decision(&mut self, lit: Lit) {
        self.trail.push_decision(lit);
        let level = self.trail.current_level();
        self.stats.decisions += 1;
        self.stats.max_level = self.stats.max_level.max(level as u64);
        self.tracer.event(&SearchEvent::Decision { lit, level });
    }

    /// Checks the final trail against every original clause.
    fn verify(&self) -> Result<(), SolverError> {
        let model = self.current_model();
        match self.db.originals().find(|c| !model.satisfies(&c.lits)) {
            Some(c) => Err(SolverError::ModelViolatesClause {
                clause: c.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn current_model(&self) -> Model {
        let values = self
            .trail
            .iter()
            .fold(vec![false; self.trail.n_vars()], |mut vs, a| {
                vs[a.lit.var_idx()] = a.value();
                vs
            });
        Model::new(values)
    }

    /// The satisfying assignment, once solve() has returned SAT.
    pub fn model(&self) -> Option<Model> {
        match self.status {
            Some(SolveStatus::Sat) => self.trail.values().map(Model::new),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<SolveStatus> {
        self.status
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn clause_db(&self) -> &ClauseDb {
        &self.db
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    pub fn into_tracer(self) -> T {
        self.tracer
    }

    pub fn n_vars(&self) -> usize {
        self.trail.n_vars()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{config::PropagationMode, trace::EventRecorder};

    fn formula(clauses: &[&[i64]]) -> CnfFormula {
        CnfFormula::from_clauses(clauses.iter().copied()).unwrap()
    }

    fn config(mode: PropagationMode) -> SolverConfig {
        SolverConfig {
            propagation: mode,
            ..SolverConfig::default()
        }
    }

    const MODES: [PropagationMode; 2] = [PropagationMode::Rescan, PropagationMode::WatchedLiterals];

    #[test]
    fn tautologies_are_dropped() {
        let f = formula(&[&[1, -1], &[2, 3, -2], &[1, 2]]);
        let mut solver = CdclSolver::new(SolverConfig::default(), &f);
        assert_eq!(solver.stats().n_tautologies, 2);
        assert_eq!(solver.clause_db().len(), 1);
        assert_eq!(solver.solve(), Ok(SolveStatus::Sat));
        // Variables of dropped clauses still get a value.
        assert_eq!(solver.model().unwrap().n_vars(), 3);
    }

    #[test]
    fn empty_clause_is_unsat_without_search() {
        let f = formula(&[&[1, 2], &[]]);
        let mut solver = CdclSolver::with_tracer(SolverConfig::default(), &f, EventRecorder::new());
        assert_eq!(solver.solve(), Ok(SolveStatus::Unsat));
        assert_eq!(solver.stats().decisions, 0);
        assert_eq!(
            solver.tracer().events,
            vec![SearchEvent::Finished(SolveStatus::Unsat)]
        );
        assert_eq!(solver.model(), None);
    }

    #[test]
    fn empty_formula_is_sat() {
        let f = CnfFormula::new(0);
        let mut solver = CdclSolver::new(SolverConfig::default(), &f);
        assert_eq!(solver.solve(), Ok(SolveStatus::Sat));
        assert_eq!(solver.model().unwrap().n_vars(), 0);
    }

    #[test]
    fn unconstrained_variables_are_assigned() {
        let mut f = CnfFormula::new(4);
        f.add_clause(&[2]).unwrap();
        let mut solver = CdclSolver::new(SolverConfig::default(), &f);
        assert_eq!(solver.solve(), Ok(SolveStatus::Sat));
        let m = solver.model().unwrap();
        assert_eq!(m.n_vars(), 4);
        assert!(m.value(1));
    }

    #[test]
    fn solve_is_idempotent() {
        let f = formula(&[&[1, 2], &[-1, 2], &[1, -2], &[-1, -2]]);
        let mut solver = CdclSolver::new(SolverConfig::default(), &f);
        assert_eq!(solver.solve(), Ok(SolveStatus::Unsat));
        let conflicts = solver.stats().conflicts;
        assert_eq!(solver.solve(), Ok(SolveStatus::Unsat));
        assert_eq!(solver.stats().conflicts, conflicts);
    }

    #[test]
    fn learned_clause_is_asserted_after_backtrack() {
        // Deciding x1 forces x2 and x3 into (-2 | -3); learning (-1) flips x1 at level 0.
        for mode in MODES {
            let f = formula(&[&[-1, 2], &[-1, 3], &[-2, -3], &[1, 4], &[1, 5, 6]]);
            let mut solver = CdclSolver::with_tracer(config(mode), &f, EventRecorder::new());
            assert_eq!(solver.solve(), Ok(SolveStatus::Sat), "{mode:?}");
            let learned: Vec<_> = solver.tracer().learned().map(|c| c.to_vec()).collect();
            assert_eq!(learned, vec![vec![Lit::neg(0)]], "{mode:?}");
            let x1 = solver.trail().assignment_for(0).unwrap();
            assert_eq!(x1.level, 0);
            assert!(!x1.value());
            assert!(x1.antecedent().is_some());
            assert_eq!(solver.stats().n_learnts, 1);
        }
    }
}
