use std::fmt::{Debug, Display};
use std::ops::{Index, IndexMut};

use fxhash::FxHashSet;

use super::types::Lit;

/// Where a clause came from. Learned clauses carry their creation index (0 for the first clause
/// learned in a solve), which a deletion policy could order by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClauseKind {
    Original,
    Learned { index: usize },
}

/// Status of a clause under the current trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClauseStatus {
    /// Some literal is true.
    Satisfied,
    /// Exactly one literal is unassigned, every other one is false.
    Unit(Lit),
    /// Every literal is false.
    Conflicting,
    Unresolved,
}

/// A disjunction of distinct literals.
///
/// The literal set is fixed at construction. The watched-literal propagator may permute the
/// order (the two watched literals live at positions 0 and 1), but never adds or removes one.
#[derive(Clone, PartialEq, Eq)]
pub struct Clause {
    pub lits: Vec<Lit>,
    pub kind: ClauseKind,
}

impl Clause {
    /// Create a new clause, dropping repeated literals (first occurrence wins).
    pub fn new(lits: &[Lit], kind: ClauseKind) -> Self {
        let mut seen = FxHashSet::default();
        let lits = lits.iter().copied().filter(|l| seen.insert(*l)).collect();
        Self { lits, kind }
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    pub fn is_learned(&self) -> bool {
        matches!(self.kind, ClauseKind::Learned { .. })
    }

    /// Whether the clause holds some literal together with its negation.
    pub fn is_tautology(&self) -> bool {
        let lits: FxHashSet<Lit> = self.lits.iter().copied().collect();
        self.lits.iter().any(|l| lits.contains(&!*l))
    }

    pub fn contains(&self, lit: Lit) -> bool {
        self.lits.contains(&lit)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Lit> {
        self.lits.iter()
    }
}

impl Debug for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit_str = self
            .lits
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(
            f,
            "Clause {{ size: {}, kind: {:?}, lits: {} }}",
            self.lits.len(),
            self.kind,
            lit_str
        )
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, l) in self.lits.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{l}")?;
        }
        write!(f, ")")
    }
}

impl Index<usize> for Clause {
    type Output = Lit;
    fn index(&self, i: usize) -> &Lit {
        &self.lits[i]
    }
}

impl IndexMut<usize> for Clause {
    fn index_mut(&mut self, i: usize) -> &mut Lit {
        &mut self.lits[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(xs: &[i64]) -> Vec<Lit> {
        xs.iter().map(|x| Lit::from_dimacs(*x).unwrap()).collect()
    }

    #[test]
    fn duplicates_removed_in_order() {
        let c = Clause::new(&lits(&[3, -1, 3, 2, -1]), ClauseKind::Original);
        assert_eq!(c.lits, lits(&[3, -1, 2]));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn tautology() {
        assert!(Clause::new(&lits(&[1, 2, -1]), ClauseKind::Original).is_tautology());
        assert!(!Clause::new(&lits(&[1, 2, -3]), ClauseKind::Original).is_tautology());
    }

    #[test]
    fn display() {
        let c = Clause::new(&lits(&[1, -2]), ClauseKind::Learned { index: 0 });
        assert_eq!(c.to_string(), "(1 | -2)");
        assert!(c.is_learned());
    }
}
