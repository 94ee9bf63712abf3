use std::cmp::Reverse;

use log::trace;
use mut_binary_heap::BinaryHeap;

use super::{
    clause_db::ClauseDb,
    config::{DecisionConfig, PolarityOption},
    trail::{Assignment, Trail},
    types::{Lit, Var, F64},
};

/// Heap priority: highest score first, lowest variable index on ties.
type Priority = (F64, Reverse<Var>);

/// VSIDS-style branching: variable-keyed scores, bumped by learned clauses and periodically
/// decayed, with a stored preferred polarity per variable.
pub struct Vsids {
    conf: DecisionConfig,
    /// Var -> activity
    acts: Vec<f64>,
    /// Var -> polarity to branch on (true == positive literal)
    polarity: Vec<bool>,
    /// Unassigned (or not yet popped) variables ordered by activity.
    act_heap: BinaryHeap<Var, Priority>,
    /// Var -> whether it is currently in act_heap
    in_heap: Vec<bool>,
    /// Learned clauses seen since the last decay.
    since_decay: u64,
}

impl Vsids {
    /// Seeds scores with each variable's occurrence count in the original clauses.
    pub fn new(conf: DecisionConfig, n_vars: usize, db: &ClauseDb) -> Self {
        let mut pos = vec![0u64; n_vars];
        let mut neg = vec![0u64; n_vars];
        for c in db.originals() {
            for l in c.iter() {
                if l.sign() {
                    neg[l.var_idx()] += 1;
                } else {
                    pos[l.var_idx()] += 1;
                }
            }
        }

        let acts = (0..n_vars).map(|v| (pos[v] + neg[v]) as f64).collect();
        let polarity = (0..n_vars)
            .map(|v| match conf.initial_polarity {
                PolarityOption::Occurrence => pos[v] >= neg[v],
                PolarityOption::True => true,
                PolarityOption::False => false,
            })
            .collect();

        let mut vsids = Self {
            conf,
            acts,
            polarity,
            act_heap: BinaryHeap::with_capacity(n_vars),
            in_heap: vec![false; n_vars],
            since_decay: 0,
        };
        vsids.rebuild_heap(|_| true);
        vsids
    }

    /// Picks the unassigned variable with the highest score, on its preferred polarity. None
    /// once every variable is assigned.
    pub fn decide(&mut self, trail: &Trail) -> Option<Lit> {
        // Assigned variables are left in the heap until they surface here.
        while let Some((var, _)) = self.act_heap.pop_with_key() {
            self.in_heap[var as usize] = false;
            if !trail.is_assigned(var) {
                return Some(Lit::new(var, !self.polarity[var as usize]));
            }
        }
        None
    }

    /// Makes a variable removed by backtracking eligible for decisions again.
    pub fn on_unassigned(&mut self, a: &Assignment) {
        let var = a.var();
        if self.conf.save_phases {
            self.polarity[var as usize] = a.value();
        }
        if !self.in_heap[var as usize] {
            self.act_heap.push(var, self.priority(var));
            self.in_heap[var as usize] = true;
        }
    }

    /// Bumps every variable of a newly learned clause, decaying all scores every
    /// `decay_interval` clauses. Returns whether a decay happened.
    pub fn on_learned(&mut self, lits: &[Lit]) -> bool {
        for l in lits {
            let var = l.var();
            self.acts[var as usize] += self.conf.bump;
            if self.in_heap[var as usize] {
                let prio = self.priority(var);
                if let Some(mut entry) = self.act_heap.get_mut(&var) {
                    *entry = prio;
                }
            }
        }

        self.since_decay += 1;
        if self.since_decay < self.conf.decay_interval {
            return false;
        }
        self.since_decay = 0;
        for a in &mut self.acts {
            *a *= self.conf.decay_factor;
        }
        trace!("Decayed variable scores by {}", self.conf.decay_factor);
        let in_heap = std::mem::take(&mut self.in_heap);
        self.rebuild_heap(|v| in_heap[v as usize]);
        true
    }

    pub fn score(&self, var: Var) -> f64 {
        self.acts[var as usize]
    }

    pub fn preferred_polarity(&self, var: Var) -> bool {
        self.polarity[var as usize]
    }

    fn priority(&self, var: Var) -> Priority {
        (
            F64::new(self.acts[var as usize]).unwrap_or_default(),
            Reverse(var),
        )
    }

    /// Rebuild the heap from the activity list, keeping the variables `keep` selects.
    fn rebuild_heap<F>(&mut self, keep: F)
    where
        F: Fn(Var) -> bool,
    {
        let n_vars = self.acts.len();
        self.act_heap = BinaryHeap::with_capacity(n_vars);
        self.in_heap = vec![false; n_vars];
        for var in 0..n_vars as Var {
            if keep(var) {
                self.act_heap.push(var, self.priority(var));
                self.in_heap[var as usize] = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(xs: &[i64]) -> Vec<Lit> {
        xs.iter().map(|x| Lit::from_dimacs(*x).unwrap()).collect()
    }

    fn db(clauses: &[&[i64]]) -> ClauseDb {
        let mut db = ClauseDb::new(clauses.len());
        for c in clauses {
            db.add_original(&lits(c));
        }
        db
    }

    #[test]
    fn initial_scores_and_polarity() {
        let db = db(&[&[1, -2], &[-2, 3], &[-1, -2], &[2]]);
        let h = Vsids::new(DecisionConfig::default(), 4, &db);
        assert_eq!(h.score(0), 2.0);
        assert_eq!(h.score(1), 4.0);
        assert_eq!(h.score(3), 0.0);
        // x1 appears once each way: tie goes to true.
        assert!(h.preferred_polarity(0));
        assert!(!h.preferred_polarity(1));
        assert!(h.preferred_polarity(2));
        // Never mentioned.
        assert!(h.preferred_polarity(3));
    }

    #[test]
    fn decides_highest_score_then_lowest_index() {
        let db = db(&[&[1, -2], &[-2, 3], &[-1, -2], &[3]]);
        let mut h = Vsids::new(DecisionConfig::default(), 3, &db);
        let mut trail = Trail::new(3);

        let first = h.decide(&trail).unwrap();
        assert_eq!(first, Lit::neg(1));
        trail.push_decision(first);

        // x1 and x3 both score 2; the lower index wins.
        let second = h.decide(&trail).unwrap();
        assert_eq!(second, Lit::pos(0));
        trail.push_decision(second);

        assert_eq!(h.decide(&trail), Some(Lit::pos(2)));
        trail.push_decision(Lit::pos(2));
        assert_eq!(h.decide(&trail), None);
    }

    #[test]
    fn skips_assigned_and_reinserts_on_unassign() {
        let db = db(&[&[1, 2]]);
        let mut h = Vsids::new(DecisionConfig::default(), 2, &db);
        let mut trail = Trail::new(2);
        trail.push_decision(Lit::neg(0));
        assert_eq!(h.decide(&trail), Some(Lit::pos(1)));
        assert_eq!(h.decide(&trail), None);

        let removed = trail.truncate_to_level(0);
        for a in &removed {
            h.on_unassigned(a);
        }
        assert_eq!(h.decide(&trail), Some(Lit::pos(0)));
    }

    #[test]
    fn bump_and_periodic_decay() {
        let db = db(&[&[1, 2, 3]]);
        let mut h = Vsids::new(DecisionConfig::default(), 3, &db);
        assert!(!h.on_learned(&lits(&[3])));
        assert!(!h.on_learned(&lits(&[3, -2])));
        assert_eq!(h.score(2), 3.0);
        assert_eq!(h.score(1), 2.0);

        // Third learned clause triggers halving.
        assert!(h.on_learned(&lits(&[-3])));
        assert_eq!(h.score(2), 2.0);
        assert_eq!(h.score(1), 1.0);
        assert_eq!(h.score(0), 0.5);

        let trail = Trail::new(3);
        assert_eq!(h.decide(&trail), Some(Lit::pos(2)));
    }

    #[test]
    fn phase_saving() {
        let conf = DecisionConfig {
            save_phases: true,
            ..DecisionConfig::default()
        };
        let db = db(&[&[1, 2]]);
        let mut h = Vsids::new(conf, 2, &db);
        let mut trail = Trail::new(2);
        trail.push_decision(Lit::neg(0));
        let removed = trail.truncate_to_level(0);
        h.on_unassigned(&removed[0]);
        assert!(!h.preferred_polarity(0));
    }
}
