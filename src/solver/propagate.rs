use std::mem;

use super::{
    clause::ClauseStatus,
    clause_db::{ClauseDb, ClauseKey},
    config::PropagationMode,
    stats::RuntimeStats,
    trace::{SearchEvent, Tracer},
    trail::Trail,
    types::{lits_from_vars, LBool, Lit},
    watch_list::{WatchList, Watcher},
};

/// Boolean constraint propagation.
///
/// `Rescan` is the reference formulation: sweep every clause until a full pass assigns nothing.
/// `WatchedLiterals` only revisits clauses whose watched literal was just falsified; clauses it
/// cannot reach through watches (unit clauses, and learned clauses that are asserting right after
/// a backtrack) are queued in `pending` and checked directly on the next call.
pub struct Propagator {
    mode: PropagationMode,
    watches: WatchList,
    pending: Vec<ClauseKey>,
}

impl Propagator {
    pub fn new(mode: PropagationMode, n_vars: usize) -> Self {
        let n_lits = match mode {
            PropagationMode::Rescan => 0,
            PropagationMode::WatchedLiterals => lits_from_vars(n_vars),
        };
        Self {
            mode,
            watches: WatchList::new(n_lits),
            pending: vec![],
        }
    }

    pub fn mode(&self) -> PropagationMode {
        self.mode
    }

    /// Makes a clause visible to propagation. A learned clause must have its asserting literal
    /// first and its highest-level other literal second.
    pub fn attach(&mut self, ck: ClauseKey, db: &ClauseDb) {
        if self.mode == PropagationMode::Rescan {
            return;
        }
        let c = &db[ck];
        if c.len() >= 2 {
            self.watches.watch(c[0], ck, c[1]);
            self.watches.watch(c[1], ck, c[0]);
        }
        if c.len() == 1 || c.is_learned() {
            self.pending.push(ck);
        }
    }

    /// Runs to fixpoint. Returns the first clause found with every literal false, if any.
    pub fn propagate<T: Tracer>(
        &mut self,
        db: &mut ClauseDb,
        trail: &mut Trail,
        tracer: &mut T,
        stats: &mut RuntimeStats,
    ) -> Option<ClauseKey> {
        match self.mode {
            PropagationMode::Rescan => rescan(db, trail, tracer, stats),
            PropagationMode::WatchedLiterals => self.propagate_watched(db, trail, tracer, stats),
        }
    }

    fn propagate_watched<T: Tracer>(
        &mut self,
        db: &mut ClauseDb,
        trail: &mut Trail,
        tracer: &mut T,
        stats: &mut RuntimeStats,
    ) -> Option<ClauseKey> {
        let pending = mem::take(&mut self.pending);
        for (i, ck) in pending.iter().enumerate() {
            match db.status(*ck, trail) {
                ClauseStatus::Conflicting => {
                    self.pending = pending[i + 1..].to_vec();
                    trail.set_bcp_idx_to_trail_head();
                    return Some(*ck);
                }
                ClauseStatus::Unit(l) => imply(l, *ck, db, trail, tracer, stats),
                ClauseStatus::Satisfied | ClauseStatus::Unresolved => (),
            }
        }

        // Go until bcp_idx >= trail.len()
        while let Some(p) = trail.next_bcp_lit() {
            let conflict = self.propagate_lit(p, db, trail, tracer, stats);
            if conflict.is_some() {
                trail.set_bcp_idx_to_trail_head();
                return conflict;
            }
        }
        None
    }

    /// Visits every clause watching `!p`, which `p` being true just falsified.
    fn propagate_lit<T: Tracer>(
        &mut self,
        p: Lit,
        db: &mut ClauseDb,
        trail: &mut Trail,
        tracer: &mut T,
        stats: &mut RuntimeStats,
    ) -> Option<ClauseKey> {
        let false_lit = !p;
        let mut conflict = None;
        let mut watchers = self.watches.take_watchers(p);
        // Store counters to record current progress
        let (mut i, mut j) = (0, 0);
        let n_ws = watchers.len();
        while i < n_ws {
            let w = watchers[i];
            i += 1;
            // See if we can skip this clause; if blocker already true, it's satisfied
            if trail.value_of(w.blocker) == LBool::True {
                watchers[j] = w;
                j += 1;
                continue;
            }

            // Keep the false lit second, so c[0] is the other watch. Then look for a
            // non-false replacement for c[1].
            let (first, replacement) = {
                let c = &mut db[w.ck];
                if c[0] == false_lit {
                    c.lits.swap(0, 1);
                }
                debug_assert_eq!(c[1], false_lit);
                let first = c[0];
                let mut replacement = None;
                if trail.value_of(first) != LBool::True {
                    for k in 2..c.len() {
                        if trail.value_of(c[k]) != LBool::False {
                            c.lits.swap(1, k);
                            replacement = Some(c[1]);
                            break;
                        }
                    }
                }
                (first, replacement)
            };

            let w_first = Watcher::new(w.ck, first);
            if let Some(l) = replacement {
                self.watches.watch(l, w.ck, first);
                continue;
            }

            watchers[j] = w_first;
            j += 1;
            match trail.value_of(first) {
                LBool::True => (),
                LBool::Undef => imply(first, w.ck, db, trail, tracer, stats),
                LBool::False => {
                    conflict = Some(w.ck);
                    // Keep the watchers we haven't visited
                    while i < n_ws {
                        watchers[j] = watchers[i];
                        i += 1;
                        j += 1;
                    }
                }
            }
        }

        watchers.truncate(j);
        self.watches.set_watchers(p, watchers);
        conflict
    }
}

/// Sweeps the whole database until nothing changes.
fn rescan<T: Tracer>(
    db: &ClauseDb,
    trail: &mut Trail,
    tracer: &mut T,
    stats: &mut RuntimeStats,
) -> Option<ClauseKey> {
    loop {
        let mut changed = false;
        for ck in db.keys() {
            match db.status(ck, trail) {
                ClauseStatus::Conflicting => return Some(ck),
                ClauseStatus::Unit(l) => {
                    imply(l, ck, db, trail, tracer, stats);
                    changed = true;
                }
                ClauseStatus::Satisfied | ClauseStatus::Unresolved => (),
            }
        }
        if !changed {
            return None;
        }
    }
}

fn imply<T: Tracer>(
    lit: Lit,
    ck: ClauseKey,
    db: &ClauseDb,
    trail: &mut Trail,
    tracer: &mut T,
    stats: &mut RuntimeStats,
) {
    trail.push_implied(lit, ck);
    stats.propagations += 1;
    if tracer.enabled() {
        tracer.event(&SearchEvent::Propagation {
            lit,
            level: trail.current_level(),
            antecedent: db[ck].lits.clone(),
        });
    }
}
