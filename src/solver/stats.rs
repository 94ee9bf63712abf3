use std::fmt::Display;

#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    /// Record total (i.e. monotonically increasing) number of:
    /// - decisions: number of decisions made.
    /// - propagations: number of implied assignments made.
    /// - conflicts: number of conflicts that occur
    /// - backtracks: number of trail truncations after a conflict
    /// - decays: number of times every variable score was decayed
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub backtracks: u64,
    pub decays: u64,

    /// Record current values of:
    /// - n_clauses: num og constraint clauses kept
    /// - n_clause_lits: num lits in constraint clauses
    /// - n_tautologies: num og clauses dropped as always satisfied
    /// - n_learnts: num learnt clauses
    /// - n_learnt_lits: num lits in learnt clauses
    /// - max_level: deepest decision level reached
    pub n_clauses: u64,
    pub n_clause_lits: u64,
    pub n_tautologies: u64,
    pub n_learnts: u64,
    pub n_learnt_lits: u64,
    pub max_level: u64,
}

impl Display for RuntimeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "clauses: {} ({} lits, {} tautologies dropped)",
            self.n_clauses, self.n_clause_lits, self.n_tautologies
        )?;
        writeln!(
            f,
            "decisions: {}\tpropagations: {}\tconflicts: {}",
            self.decisions, self.propagations, self.conflicts
        )?;
        writeln!(
            f,
            "learnts: {} ({} lits)\tbacktracks: {}\tdecays: {}",
            self.n_learnts, self.n_learnt_lits, self.backtracks, self.decays
        )?;
        write!(f, "max level: {}", self.max_level)
    }
}
