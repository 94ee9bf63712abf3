//! First-UIP conflict analysis.
//!
//! The implication graph is never stored. Each implied assignment on the trail names its
//! antecedent clause, and analysis follows those links backwards from the conflict, resolving
//! the working clause against one antecedent at a time until a single literal of the current
//! decision level remains.

use log::trace;

use super::{
    clause_db::{ClauseDb, ClauseKey},
    error::SolverError,
    trail::Trail,
    types::{DecisionLevel, Lit},
};

/// Outcome of analysing one conflict.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Analysis {
    /// The learned clause. `learned[0]` is the asserting literal (the negated UIP); when there
    /// is more than one literal, `learned[1]` has the highest level among the rest.
    pub learned: Vec<Lit>,
    pub backtrack_level: DecisionLevel,
}

impl Analysis {
    pub fn asserting_lit(&self) -> Lit {
        self.learned[0]
    }
}

/// Derives the 1-UIP clause for `conflict`, which must be falsified by `trail` at its current
/// decision level (above 0).
///
/// Literals assigned at level 0 are dropped from the working clause as they are met: they are
/// false in every model of the formula, so removing them keeps the clause a consequence of it.
pub fn analyze(conflict: ClauseKey, db: &ClauseDb, trail: &Trail) -> Result<Analysis, SolverError> {
    let level = trail.current_level();
    let mut working = WorkingClause::new(trail.n_vars(), level);
    for l in db[conflict].iter() {
        working.add(*l, trail);
    }
    if working.at_level == 0 {
        return Err(SolverError::NoCurrentLevelLiteral { level });
    }

    // Walk the trail from the top: the next marked variable found is the working clause's
    // literal assigned latest.
    let mut idx = trail.len();
    let uip = loop {
        let a = loop {
            if idx == 0 {
                return Err(SolverError::UipNotFound { level });
            }
            idx -= 1;
            let a = trail.get(idx);
            if working.marked[a.lit.var_idx()] {
                break a;
            }
        };
        if a.level != level {
            return Err(SolverError::UipNotFound { level });
        }
        if working.at_level == 1 {
            break a.lit;
        }

        // Resolve on a's variable: drop !a.lit, union in the antecedent's other literals.
        let antecedent = a
            .antecedent()
            .ok_or(SolverError::MissingAntecedent { var: a.var() + 1 })?;
        working.marked[a.lit.var_idx()] = false;
        working.at_level -= 1;
        trace!("Resolving on {} with {}", a.lit, db[antecedent]);
        for l in db[antecedent].iter().filter(|l| **l != a.lit) {
            working.add(*l, trail);
        }
    };

    let mut learned = Vec::with_capacity(working.lower.len() + 1);
    learned.push(!uip);
    learned.extend(working.lower);
    let backtrack_level = backtrack_level(&mut learned, trail);
    Ok(Analysis {
        learned,
        backtrack_level,
    })
}

/// Backtrack level for a learned clause whose first literal is the asserting one: the highest
/// level among the other literals, or 0 for a unit clause. Moves that literal to position 1 so
/// it can serve as the second watch.
pub fn backtrack_level(learned: &mut [Lit], trail: &Trail) -> DecisionLevel {
    if learned.len() < 2 {
        return 0;
    }
    let (max_i, max_lvl) = learned[1..]
        .iter()
        .enumerate()
        .map(|(i, l)| (i + 1, trail.level_of(l.var()).unwrap_or(0)))
        .fold((1, 0), |best, cur| if cur.1 > best.1 { cur } else { best });
    learned.swap(1, max_i);
    max_lvl
}

/// The clause under construction: current-level literals are only counted (they are resolved
/// away or become the UIP), lower-level ones are kept.
struct WorkingClause {
    level: DecisionLevel,
    /// Var -> whether the var occurs in the working clause
    marked: Vec<bool>,
    /// Number of marked variables assigned at the current level
    at_level: usize,
    /// Literals assigned below the current level but above 0
    lower: Vec<Lit>,
}

impl WorkingClause {
    fn new(n_vars: usize, level: DecisionLevel) -> Self {
        Self {
            level,
            marked: vec![false; n_vars],
            at_level: 0,
            lower: vec![],
        }
    }

    fn add(&mut self, l: Lit, trail: &Trail) {
        let var = l.var_idx();
        if self.marked[var] {
            return;
        }
        let lvl = trail.level_of(l.var()).unwrap_or(0);
        if lvl == 0 {
            return;
        }
        self.marked[var] = true;
        if lvl >= self.level {
            self.at_level += 1;
        } else {
            self.lower.push(l);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(xs: &[i64]) -> Vec<Lit> {
        xs.iter().map(|x| Lit::from_dimacs(*x).unwrap()).collect()
    }

    fn lit(x: i64) -> Lit {
        Lit::from_dimacs(x).unwrap()
    }

    /// The classic textbook graph:
    ///   level 1: x1 = F (decision)
    ///   level 2: x2 = F (decision)
    ///   level 3: x3 = T (decision), x4 forced by (-3 | 4), x5 by (-4 | 1 | 5),
    ///            x6 by (-4 | 6), and (-5 | -6 | 2) is falsified.
    /// Both x5 and x6 stem from x4, so x4 is the first UIP.
    #[test]
    fn first_uip_with_lower_level_literals() {
        let mut db = ClauseDb::new(4);
        let c34 = db.add_original(&lits(&[-3, 4]));
        let c45 = db.add_original(&lits(&[-4, 1, 5]));
        let c46 = db.add_original(&lits(&[-4, 6]));
        let conflict = db.add_original(&lits(&[-5, -6, 2]));

        let mut trail = Trail::new(6);
        trail.push_decision(lit(-1));
        trail.push_decision(lit(-2));
        trail.push_decision(lit(3));
        trail.push_implied(lit(4), c34);
        trail.push_implied(lit(5), c45);
        trail.push_implied(lit(6), c46);

        let analysis = analyze(conflict, &db, &trail).unwrap();
        assert_eq!(analysis.asserting_lit(), lit(-4));
        let mut rest = analysis.learned[1..].to_vec();
        rest.sort();
        let mut expected = lits(&[1, 2]);
        expected.sort();
        assert_eq!(rest, expected);
        // x2 (level 2) is the highest of the rest.
        assert_eq!(analysis.backtrack_level, 2);
        assert_eq!(analysis.learned[1], lit(2));
    }

    #[test]
    fn decision_is_uip_when_nothing_else_dominates() {
        let mut db = ClauseDb::new(3);
        let c12 = db.add_original(&lits(&[-1, 2]));
        let c13 = db.add_original(&lits(&[-1, 3]));
        let conflict = db.add_original(&lits(&[-2, -3]));

        let mut trail = Trail::new(3);
        trail.push_decision(lit(1));
        trail.push_implied(lit(2), c12);
        trail.push_implied(lit(3), c13);

        let analysis = analyze(conflict, &db, &trail).unwrap();
        assert_eq!(analysis.learned, lits(&[-1]));
        assert_eq!(analysis.backtrack_level, 0);
    }

    #[test]
    fn level_zero_literals_are_dropped() {
        let mut db = ClauseDb::new(3);
        let unit = db.add_original(&lits(&[-4]));
        let c = db.add_original(&lits(&[-1, 4, 2]));
        let conflict = db.add_original(&lits(&[-2, 4]));

        let mut trail = Trail::new(4);
        trail.push_implied(lit(-4), unit);
        trail.push_decision(lit(1));
        trail.push_implied(lit(2), c);

        let analysis = analyze(conflict, &db, &trail).unwrap();
        assert_eq!(analysis.learned, lits(&[-2]));
        assert_eq!(analysis.backtrack_level, 0);
    }

    #[test]
    fn conflict_without_current_level_literal_is_an_error() {
        let mut db = ClauseDb::new(1);
        let conflict = db.add_original(&lits(&[-1]));
        let mut trail = Trail::new(2);
        trail.push_decision(lit(1));
        trail.push_decision(lit(2));
        assert_eq!(
            analyze(conflict, &db, &trail),
            Err(SolverError::NoCurrentLevelLiteral { level: 2 })
        );
    }

    #[test]
    fn resolution_chain_keeps_literals_from_every_antecedent() {
        // level 1: x1; level 2: x2 decides, x3 by (-2 | 3), x4 by (-3 | -1 | 4),
        // conflict (-4 | -3). x3 is the UIP; -1 comes in through x4's antecedent.
        let mut db = ClauseDb::new(3);
        let c23 = db.add_original(&lits(&[-2, 3]));
        let c4 = db.add_original(&lits(&[-3, -1, 4]));
        let conflict = db.add_original(&lits(&[-4, -3]));

        let mut trail = Trail::new(4);
        trail.push_decision(lit(1));
        trail.push_decision(lit(2));
        trail.push_implied(lit(3), c23);
        trail.push_implied(lit(4), c4);

        let analysis = analyze(conflict, &db, &trail).unwrap();
        assert_eq!(analysis.learned, lits(&[-3, -1]));
        assert_eq!(analysis.backtrack_level, 1);
    }

    #[test]
    fn backtrack_level_picks_second_highest() {
        let mut trail = Trail::new(4);
        trail.push_decision(lit(1));
        trail.push_decision(lit(2));
        trail.push_decision(lit(3));
        trail.push_decision(lit(4));
        let mut learned = lits(&[-4, -1, -3, -2]);
        assert_eq!(backtrack_level(&mut learned, &trail), 3);
        assert_eq!(learned[1], lit(-3));

        let mut unit = lits(&[-4]);
        assert_eq!(backtrack_level(&mut unit, &trail), 0);
    }
}
