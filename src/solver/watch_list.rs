use std::mem;

use super::{clause_db::ClauseKey, types::Lit};

/// Literal -> clauses to revisit when that literal becomes true.
///
/// A clause watching `l` is registered under `!l`, since `l` only turns false once `!l` is put
/// on the trail.
pub struct WatchList {
    occs: Vec<Vec<Watcher>>,
}

impl WatchList {
    // Creates a watch list for n literals.
    pub fn new(n_lits: usize) -> Self {
        Self {
            occs: vec![Vec::new(); n_lits],
        }
    }

    /// Registers `ck` as watching `watched`, with `blocker` as its other watch.
    pub fn watch(&mut self, watched: Lit, ck: ClauseKey, blocker: Lit) {
        self.occs[(!watched).idx()].push(Watcher::new(ck, blocker));
    }

    /// Hands ownership of these watchers to the caller. Make sure to put it back with
    /// set_watchers.
    pub fn take_watchers(&mut self, l: Lit) -> Vec<Watcher> {
        mem::take(&mut self.occs[l.idx()])
    }

    pub fn set_watchers(&mut self, l: Lit, ws: Vec<Watcher>) {
        self.occs[l.idx()] = ws;
    }

    pub fn watchers(&self, l: Lit) -> &[Watcher] {
        &self.occs[l.idx()]
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Watcher {
    pub ck: ClauseKey,
    /// If true, the clause is satisfied and need not be visited.
    pub blocker: Lit,
}

impl Watcher {
    pub fn new(ck: ClauseKey, blocker: Lit) -> Self {
        Self { ck, blocker }
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    #[test]
    fn watch_registers_under_negation() {
        let mut sm: SlotMap<ClauseKey, ()> = SlotMap::with_key();
        let ck = sm.insert(());
        let mut ws = WatchList::new(4);
        ws.watch(Lit::pos(0), ck, Lit::neg(1));

        assert!(ws.watchers(Lit::pos(0)).is_empty());
        assert_eq!(ws.watchers(Lit::neg(0)), &[Watcher::new(ck, Lit::neg(1))]);

        let taken = ws.take_watchers(Lit::neg(0));
        assert_eq!(taken.len(), 1);
        assert!(ws.watchers(Lit::neg(0)).is_empty());
        ws.set_watchers(Lit::neg(0), taken);
        assert_eq!(ws.watchers(Lit::neg(0)).len(), 1);
    }
}
