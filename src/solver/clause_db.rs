use std::ops::{Index, IndexMut};

use slotmap::{new_key_type, SlotMap};

use super::{
    clause::{Clause, ClauseKind, ClauseStatus},
    trail::Trail,
    types::{LBool, Lit},
};

new_key_type! {
  pub struct ClauseKey;
}

/// Original clauses (fixed after construction) plus learned clauses (append-only).
#[derive(Default)]
pub struct ClauseDb {
    sm: SlotMap<ClauseKey, Clause>,
    /// Problem information: constraint clauses, learnt clauses, in insertion order.
    clauses: Vec<ClauseKey>,
    learnts: Vec<ClauseKey>,
}

impl ClauseDb {
    pub fn new(n_clauses: usize) -> Self {
        Self {
            sm: SlotMap::with_capacity_and_key(n_clauses),
            clauses: Vec::with_capacity(n_clauses),
            learnts: vec![],
        }
    }

    pub fn add_original(&mut self, lits: &[Lit]) -> ClauseKey {
        let ck = self.sm.insert(Clause::new(lits, ClauseKind::Original));
        self.clauses.push(ck);
        ck
    }

    /// Appends a learned clause, stamping it with its creation index.
    pub fn add_learned(&mut self, lits: &[Lit]) -> ClauseKey {
        let kind = ClauseKind::Learned {
            index: self.learnts.len(),
        };
        let ck = self.sm.insert(Clause::new(lits, kind));
        self.learnts.push(ck);
        ck
    }

    /// Visits every clause, originals first, then learned clauses in creation order.
    pub fn for_each_clause<F>(&self, mut visitor: F)
    where
        F: FnMut(ClauseKey, &Clause),
    {
        for ck in self.keys() {
            visitor(ck, &self.sm[ck]);
        }
    }

    /// Keys of every clause, originals first.
    pub fn keys(&self) -> impl Iterator<Item = ClauseKey> + '_ {
        self.clauses.iter().chain(self.learnts.iter()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClauseKey, &Clause)> + '_ {
        self.keys().map(move |ck| (ck, &self.sm[ck]))
    }

    pub fn originals(&self) -> impl Iterator<Item = &Clause> + '_ {
        self.clauses.iter().map(move |ck| &self.sm[*ck])
    }

    pub fn learnts(&self) -> impl Iterator<Item = &Clause> + '_ {
        self.learnts.iter().map(move |ck| &self.sm[*ck])
    }

    pub fn get(&self, ck: ClauseKey) -> Option<&Clause> {
        self.sm.get(ck)
    }

    pub fn len(&self) -> usize {
        self.sm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sm.is_empty()
    }

    pub fn n_learnts(&self) -> usize {
        self.learnts.len()
    }

    /// Status of the clause under the trail. Pure: reads the trail, changes nothing.
    pub fn status(&self, ck: ClauseKey, trail: &Trail) -> ClauseStatus {
        clause_status(&self.sm[ck], trail)
    }
}

/// Scans the clause's literals against the trail.
pub fn clause_status(c: &Clause, trail: &Trail) -> ClauseStatus {
    let mut unassigned = None;
    let mut n_unassigned = 0;
    for l in c.iter() {
        match trail.value_of(*l) {
            LBool::True => return ClauseStatus::Satisfied,
            LBool::Undef => {
                n_unassigned += 1;
                unassigned = Some(*l);
            }
            LBool::False => (),
        }
    }
    match (n_unassigned, unassigned) {
        (0, _) => ClauseStatus::Conflicting,
        (1, Some(l)) => ClauseStatus::Unit(l),
        _ => ClauseStatus::Unresolved,
    }
}

impl Index<ClauseKey> for ClauseDb {
    type Output = Clause;
    fn index(&self, index: ClauseKey) -> &Self::Output {
        &self.sm[index]
    }
}

impl IndexMut<ClauseKey> for ClauseDb {
    fn index_mut(&mut self, index: ClauseKey) -> &mut Self::Output {
        &mut self.sm[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(xs: &[i64]) -> Vec<Lit> {
        xs.iter().map(|x| Lit::from_dimacs(*x).unwrap()).collect()
    }

    #[test]
    fn status_follows_trail() {
        let mut db = ClauseDb::new(1);
        let ck = db.add_original(&lits(&[1, 2, 3]));
        let mut trail = Trail::new(3);
        assert_eq!(db.status(ck, &trail), ClauseStatus::Unresolved);

        trail.push_decision(Lit::neg(0));
        assert_eq!(db.status(ck, &trail), ClauseStatus::Unresolved);

        trail.push_decision(Lit::neg(1));
        assert_eq!(db.status(ck, &trail), ClauseStatus::Unit(Lit::pos(2)));

        trail.push_decision(Lit::neg(2));
        assert_eq!(db.status(ck, &trail), ClauseStatus::Conflicting);

        trail.truncate_to_level(1);
        trail.push_decision(Lit::pos(1));
        assert_eq!(db.status(ck, &trail), ClauseStatus::Satisfied);
    }

    #[test]
    fn iteration_order_and_learned_index() {
        let mut db = ClauseDb::new(2);
        let a = db.add_original(&lits(&[1, 2]));
        let b = db.add_original(&lits(&[-1]));
        let l0 = db.add_learned(&lits(&[2, 3]));
        let l1 = db.add_learned(&lits(&[-3]));

        let mut visited = vec![];
        db.for_each_clause(|ck, _| visited.push(ck));
        assert_eq!(visited, vec![a, b, l0, l1]);
        assert_eq!(db[l1].kind, ClauseKind::Learned { index: 1 });
        assert_eq!(db[a].kind, ClauseKind::Original);
        assert_eq!(db.n_learnts(), 2);
        assert_eq!(db.originals().count(), 2);
        assert_eq!(db.len(), 4);
    }
}
