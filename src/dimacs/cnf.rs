use std::fmt::Debug;

use thiserror::Error;

use crate::solver::types::Lit;

/// Input rejected at the front-end boundary, before the solver sees it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("literal 0 inside a clause")]
    ZeroLiteral,
    #[error("variable {var} exceeds the declared {n_vars} variables")]
    VariableOutOfRange { var: u64, n_vars: usize },
}

/// A validated clause list over variables `1..=n_vars`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CnfFormula {
    n_vars: usize,
    clauses: Vec<Vec<Lit>>,
}

impl CnfFormula {
    pub fn new(n_vars: usize) -> Self {
        Self {
            n_vars,
            clauses: vec![],
        }
    }

    /// Builds a formula from DIMACS-style integer clauses, taking the largest variable mentioned
    /// as the variable count.
    pub fn from_clauses<I, C>(clauses: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[i64]>,
    {
        let clauses: Vec<C> = clauses.into_iter().collect();
        let max_var = clauses
            .iter()
            .flat_map(|c| c.as_ref().iter())
            .map(|x| x.unsigned_abs())
            .max()
            .unwrap_or(0);
        let n_vars = usize::try_from(max_var).map_err(|_| InputError::VariableOutOfRange {
            var: max_var,
            n_vars: usize::MAX,
        })?;

        let mut formula = Self::new(n_vars);
        for c in &clauses {
            formula.add_clause(c.as_ref())?;
        }
        Ok(formula)
    }

    /// Adds a clause of signed, 1-based variable ids. An empty slice is the empty clause.
    pub fn add_clause(&mut self, lits: &[i64]) -> Result<(), InputError> {
        let clause = lits
            .iter()
            .map(|x| self.lit(*x))
            .collect::<Result<Vec<_>, _>>()?;
        self.clauses.push(clause);
        Ok(())
    }

    fn lit(&self, x: i64) -> Result<Lit, InputError> {
        if x == 0 {
            return Err(InputError::ZeroLiteral);
        }
        let var = x.unsigned_abs();
        let out_of_range = InputError::VariableOutOfRange {
            var,
            n_vars: self.n_vars,
        };
        if var > self.n_vars as u64 {
            return Err(out_of_range);
        }
        Lit::from_dimacs(x).ok_or(out_of_range)
    }

    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(|c| c.is_empty())
    }
}

impl Debug for CnfFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "n_vars: {}\tn_clauses: {}", self.n_vars, self.clauses.len())?;
        for c in &self.clauses {
            write!(f, "Clause:")?;
            for l in c {
                write!(f, " {l}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_variable_count() {
        let f = CnfFormula::from_clauses([vec![1i64, -3], vec![2]]).unwrap();
        assert_eq!(f.n_vars(), 3);
        assert_eq!(f.len(), 2);
        assert_eq!(f.clauses()[0], vec![Lit::pos(0), Lit::neg(2)]);
        assert!(!f.has_empty_clause());
    }

    #[test]
    fn rejects_bad_literals() {
        let mut f = CnfFormula::new(2);
        assert_eq!(f.add_clause(&[1, 0]), Err(InputError::ZeroLiteral));
        assert_eq!(
            f.add_clause(&[-3]),
            Err(InputError::VariableOutOfRange { var: 3, n_vars: 2 })
        );
        assert!(f.is_empty());
    }

    #[test]
    fn empty_clause_is_kept() {
        let mut f = CnfFormula::new(1);
        f.add_clause(&[]).unwrap();
        assert!(f.has_empty_clause());
    }
}
