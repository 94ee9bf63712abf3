use std::fmt::Display;
use std::ops::{BitAnd, BitXor, Not, Shr};

use ordered_float::NotNan;

/// Decision levels start at 0 (assignments forced before any decision).
pub type DecisionLevel = u32;

/// Let us use f64s as Ord
pub type F64 = NotNan<f64>;

/// Dense, 0-based variable index. DIMACS variable `n` maps to `n - 1`.
pub type Var = u32;

/// How to compute n lits from v vars? Given v vars, n = v * 2. This works for indexing, since
/// our first variable starts at 0.
pub fn lits_from_vars(n_vars: usize) -> usize {
    n_vars * 2
}

/// Representation of a Literal, using the MiniSat convention: lit.v = 2 * var + sign
#[derive(Hash, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Lit {
    pub v: u32,
}

impl Lit {
    // Here, a TRUE sign == NEGATIVE
    pub fn new(var: Var, sign: bool) -> Lit {
        Lit {
            v: var + var + (sign as u32),
        }
    }

    /// Positive literal of `var`.
    pub fn pos(var: Var) -> Lit {
        Lit::new(var, false)
    }

    /// Negative literal of `var`.
    pub fn neg(var: Var) -> Lit {
        Lit::new(var, true)
    }

    /// Builds a literal from a signed, 1-based DIMACS integer. Zero has no literal.
    pub fn from_dimacs(x: i64) -> Option<Lit> {
        if x == 0 {
            return None;
        }
        let var = Var::try_from(x.unsigned_abs() - 1).ok()?;
        Some(Lit::new(var, x < 0))
    }

    pub fn to_dimacs(&self) -> i64 {
        let id = self.var() as i64 + 1;
        if self.sign() {
            -id
        } else {
            id
        }
    }

    // Returns true if sign is negative.
    pub fn sign(&self) -> bool {
        self.v.bitand(1) != 0
    }

    pub fn var(&self) -> Var {
        self.v.shr(1)
    }

    // Variable, but cast as usize to index
    pub fn var_idx(&self) -> usize {
        self.v.shr(1) as usize
    }

    // Get v as an index
    #[inline(always)]
    pub fn idx(&self) -> usize {
        self.v as usize
    }

    /// Same variable, opposite polarity.
    pub fn negate(self) -> Lit {
        !self
    }

    pub fn is_complement_of(&self, other: Lit) -> bool {
        self.v.bitxor(1) == other.v
    }
}

impl Not for Lit {
    type Output = Self;
    fn not(self) -> Lit {
        Self {
            v: self.v.bitxor(1),
        }
    }
}

impl Display for Lit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

// Represent false, true, or UNDEF (i.e. not yet assigned). We prefer this over an Option<Bool>,
// since we only really have 3 values (i.e. u8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum LBool {
    True = 0,
    False = 1,
    #[default]
    Undef = 2,
}

impl LBool {
    /// Value a variable takes when `lit` is made true.
    pub fn from_sign(sign: bool) -> LBool {
        LBool::from(sign as u8)
    }
}

impl From<bool> for LBool {
    #[inline(always)]
    fn from(value: bool) -> Self {
        if value {
            LBool::True
        } else {
            LBool::False
        }
    }
}

impl From<u8> for LBool {
    #[inline(always)]
    fn from(value: u8) -> Self {
        match value {
            0 => Self::True,
            1 => Self::False,
            _ => Self::Undef,
        }
    }
}

impl BitXor for LBool {
    type Output = Self;
    // Undef stays Undef: 2 ^ 0 == 2, 2 ^ 1 == 3 (-> Undef).
    fn bitxor(self, rhs: Self) -> LBool {
        LBool::from((self as u8).bitxor(rhs as u8))
    }
}

// Status markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Sat,
    Unsat,
}

impl Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Sat => write!(f, "SAT"),
            SolveStatus::Unsat => write!(f, "UNSAT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimacs_conversion() {
        let l = Lit::from_dimacs(-3).unwrap();
        assert_eq!(l.var(), 2);
        assert!(l.sign());
        assert_eq!(l.to_dimacs(), -3);
        assert_eq!((!l).to_dimacs(), 3);
        assert_eq!(Lit::from_dimacs(0), None);
    }

    #[test]
    fn complement() {
        let a = Lit::pos(4);
        assert!(a.is_complement_of(Lit::neg(4)));
        assert!(!a.is_complement_of(Lit::neg(5)));
        assert!(!a.is_complement_of(a));
        assert_eq!(a.negate(), Lit::neg(4));
    }

    #[test]
    fn lbool_xor() {
        // A negative literal flips its variable's value.
        assert_eq!(LBool::True ^ LBool::from_sign(true), LBool::False);
        assert_eq!(LBool::False ^ LBool::from_sign(true), LBool::True);
        assert_eq!(LBool::True ^ LBool::from_sign(false), LBool::True);
        assert_eq!(LBool::Undef ^ LBool::from_sign(true), LBool::Undef);
        assert_eq!(LBool::Undef ^ LBool::from_sign(false), LBool::Undef);
    }
}
