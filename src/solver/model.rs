use std::fmt::Display;

use super::types::{Lit, Var};

/// A total assignment: every variable of the formula has a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    values: Vec<bool>,
}

impl Model {
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    pub fn n_vars(&self) -> usize {
        self.values.len()
    }

    pub fn value(&self, var: Var) -> bool {
        self.values[var as usize]
    }

    /// Value of a 1-based DIMACS variable id.
    pub fn value_of_dimacs(&self, id: u32) -> Option<bool> {
        id.checked_sub(1)
            .and_then(|v| self.values.get(v as usize))
            .copied()
    }

    pub fn lit_value(&self, l: Lit) -> bool {
        self.value(l.var()) != l.sign()
    }

    /// Whether some literal of the clause is true.
    pub fn satisfies(&self, clause: &[Lit]) -> bool {
        clause.iter().any(|l| self.lit_value(*l))
    }

    /// The model as the true literal of each variable, in DIMACS form.
    pub fn to_dimacs(&self) -> Vec<i64> {
        (0..self.values.len() as Var)
            .map(|v| Lit::new(v, !self.value(v)).to_dimacs())
            .collect()
    }
}

impl Display for Model {
    // Competition-style value line
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v")?;
        for l in self.to_dimacs() {
            write!(f, " {l}")?;
        }
        write!(f, " 0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_literals() {
        let m = Model::new(vec![true, false]);
        assert!(m.lit_value(Lit::pos(0)));
        assert!(m.lit_value(Lit::neg(1)));
        assert!(!m.lit_value(Lit::pos(1)));
        assert!(m.satisfies(&[Lit::pos(1), Lit::pos(0)]));
        assert!(!m.satisfies(&[Lit::pos(1), Lit::neg(0)]));
        assert!(!m.satisfies(&[]));
        assert_eq!(m.value_of_dimacs(2), Some(false));
        assert_eq!(m.value_of_dimacs(0), None);
        assert_eq!(m.value_of_dimacs(3), None);
    }

    #[test]
    fn display() {
        let m = Model::new(vec![true, false, true]);
        assert_eq!(m.to_dimacs(), vec![1, -2, 3]);
        assert_eq!(m.to_string(), "v 1 -2 3 0");
    }
}
