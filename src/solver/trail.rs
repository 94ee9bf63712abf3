use std::fmt::Display;

use super::{
    clause_db::ClauseKey,
    types::{DecisionLevel, LBool, Lit, Var},
};

/// Why a variable holds its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentKind {
    Decision,
    /// Forced by unit propagation; carries the antecedent clause.
    Implied(ClauseKey),
}

/// One entry on the trail. `lit` is the literal made true.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub lit: Lit,
    pub level: DecisionLevel,
    pub kind: AssignmentKind,
}

impl Assignment {
    pub fn var(&self) -> Var {
        self.lit.var()
    }

    /// Truth value given to the variable.
    pub fn value(&self) -> bool {
        !self.lit.sign()
    }

    pub fn antecedent(&self) -> Option<ClauseKey> {
        match self.kind {
            AssignmentKind::Decision => None,
            AssignmentKind::Implied(ck) => Some(ck),
        }
    }

    pub fn is_decision(&self) -> bool {
        self.kind == AssignmentKind::Decision
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            AssignmentKind::Decision => "decision",
            AssignmentKind::Implied(_) => "implied",
        };
        write!(
            f,
            "x{} = {} @ {} ({kind})",
            self.var() + 1,
            self.value(),
            self.level
        )
    }
}

/// Assignment trail during search and inference.
pub struct Trail {
    // Assignment trail (either from decision, or BCP), in chronological order
    trail: Vec<Assignment>,
    // lvl -> index into trail of the first assignment at lvl. level_starts[0] == 0 always, so
    // the current decision level is level_starts.len() - 1.
    level_starts: Vec<usize>,
    // Var -> value
    assigned: Vec<LBool>,
    // Var -> index into trail; only meaningful while the var is assigned
    positions: Vec<usize>,
    // Index from which to start BCP (used by the watched-literal propagator)
    bcp_idx: usize,
}

impl Trail {
    pub fn new(n_vars: usize) -> Self {
        Self {
            trail: Vec::with_capacity(n_vars),
            level_starts: vec![0],
            assigned: vec![LBool::Undef; n_vars],
            positions: vec![0; n_vars],
            bcp_idx: 0,
        }
    }

    pub fn n_vars(&self) -> usize {
        self.assigned.len()
    }

    pub fn len(&self) -> usize {
        self.trail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    pub fn current_level(&self) -> DecisionLevel {
        (self.level_starts.len() - 1) as DecisionLevel
    }

    /// Appends an assignment. The assignment's level must be the current level, or the next one
    /// for a decision.
    ///
    /// Panics if the variable already has a value: propagation never does that unless the engine
    /// is broken.
    pub fn push(&mut self, a: Assignment) {
        let var = a.lit.var_idx();
        assert!(
            self.assigned[var] == LBool::Undef,
            "variable x{} assigned twice",
            var + 1
        );
        if a.is_decision() {
            self.level_starts.push(self.trail.len());
        }
        assert_eq!(a.level, self.current_level(), "assignment level out of step");
        self.assigned[var] = LBool::from(a.value());
        self.positions[var] = self.trail.len();
        self.trail.push(a);
    }

    /// Opens a new decision level with `lit`.
    pub fn push_decision(&mut self, lit: Lit) {
        self.push(Assignment {
            lit,
            level: self.current_level() + 1,
            kind: AssignmentKind::Decision,
        });
    }

    /// Records `lit` as forced by `antecedent` at the current level.
    pub fn push_implied(&mut self, lit: Lit, antecedent: ClauseKey) {
        self.push(Assignment {
            lit,
            level: self.current_level(),
            kind: AssignmentKind::Implied(antecedent),
        });
    }

    /// Removes every assignment above `level`, returning them in trail order.
    pub fn truncate_to_level(&mut self, level: DecisionLevel) -> Vec<Assignment> {
        if level >= self.current_level() {
            return Vec::new();
        }
        let start = self.level_starts[level as usize + 1];
        let removed = self.trail.split_off(start);
        for a in &removed {
            self.assigned[a.lit.var_idx()] = LBool::Undef;
        }
        self.level_starts.truncate(level as usize + 1);
        self.bcp_idx = self.bcp_idx.min(self.trail.len());
        removed
    }

    /// Every assignment made above `level`.
    pub fn assignments_above(&self, level: DecisionLevel) -> &[Assignment] {
        match self.level_starts.get(level as usize + 1) {
            Some(start) => &self.trail[*start..],
            None => &[],
        }
    }

    pub fn is_assigned(&self, var: Var) -> bool {
        self.assigned[var as usize] != LBool::Undef
    }

    /// Calculate value
    pub fn value_of(&self, l: Lit) -> LBool {
        self.assigned[l.var_idx()] ^ LBool::from_sign(l.sign())
    }

    pub fn assignment_for(&self, var: Var) -> Option<&Assignment> {
        if self.is_assigned(var) {
            Some(&self.trail[self.positions[var as usize]])
        } else {
            None
        }
    }

    /// Get DL for this variable's assignment, if assigned.
    pub fn level_of(&self, var: Var) -> Option<DecisionLevel> {
        self.assignment_for(var).map(|a| a.level)
    }

    /// Trail index of this variable's assignment, if assigned.
    pub fn position_of(&self, var: Var) -> Option<usize> {
        self.is_assigned(var).then(|| self.positions[var as usize])
    }

    pub fn get(&self, i: usize) -> &Assignment {
        &self.trail[i]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.trail.iter()
    }

    pub fn all_assigned(&self) -> bool {
        self.trail.len() == self.assigned.len()
    }

    /// Var -> value, once every variable has one.
    pub fn values(&self) -> Option<Vec<bool>> {
        if !self.all_assigned() {
            return None;
        }
        Some(self.assigned.iter().map(|v| *v == LBool::True).collect())
    }

    /// Whether recorded levels never decrease from bottom to top.
    pub fn levels_monotone(&self) -> bool {
        self.trail.windows(2).all(|w| w[0].level <= w[1].level)
    }

    // Gets the Lit at the current BCP index, then increments it.
    pub fn next_bcp_lit(&mut self) -> Option<Lit> {
        let a = self.trail.get(self.bcp_idx)?;
        self.bcp_idx += 1;
        Some(a.lit)
    }

    // Sets the BCP index up to the trail head.
    pub fn set_bcp_idx_to_trail_head(&mut self) {
        self.bcp_idx = self.trail.len();
    }
}
