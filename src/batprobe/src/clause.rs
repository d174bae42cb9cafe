/*****************************************************************************************[clause.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use {
    crate::intmap::{AsIndex, IntMap},
    std::{fmt, ops},
};

/// A propositional variable
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var(u32);

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if *self == Var::UNDEF {
            write!(f, "UNDEF")
        } else {
            write!(f, "{}", self.0 + 1)
        }
    }
}

impl Var {
    pub const UNDEF: Var = Var(!0);

    #[inline(always)]
    pub(crate) fn from_idx(idx: u32) -> Self {
        debug_assert!(idx < u32::MAX / 2, "Var::from_idx: index too large");
        Var(idx)
    }

    /// 0-based index of the variable.
    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }

    /// Make a variable from the index. This should only be used
    /// with integers obtained from an existing `v.idx()`
    #[inline]
    pub fn unsafe_from_idx(idx: u32) -> Self {
        Var::from_idx(idx)
    }
}

impl AsIndex for Var {
    #[inline(always)]
    fn as_index(self) -> usize {
        self.0 as usize
    }
    #[inline(always)]
    fn from_index(index: usize) -> Self {
        Var(index as u32)
    }
}

pub type VMap<V> = IntMap<Var, V>;

/// A literal: a variable with a polarity.
///
/// The positive literal of variable `v` has index `2v`, the negative one `2v+1`,
/// so the two literals of a variable are adjacent in any `LMap`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Lit(u32);

impl Lit {
    pub const UNDEF: Lit = Lit(!1);

    #[inline(always)]
    pub fn new(var: Var, sign: bool) -> Self {
        Lit(var.0 * 2 + (!sign) as u32)
    }

    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }

    /// `true` for the positive literal.
    #[inline(always)]
    pub fn sign(&self) -> bool {
        (self.0 & 1) == 0
    }

    #[inline(always)]
    pub fn var(&self) -> Var {
        Var(self.0 >> 1)
    }

    /// `lit.apply_sign(b)` keeps the same sign if `b==true`, flips sign otherwise
    ///
    /// ```
    /// use batprobe::*;
    /// let mut s = BasicSolver::default();
    /// let lit = Lit::new(s.new_var(), true);
    /// assert_eq!(lit, lit.apply_sign(true));
    /// assert_eq!(!lit, lit.apply_sign(false));
    /// ```
    #[inline(always)]
    pub fn apply_sign(&self, sign: bool) -> Lit {
        if sign {
            *self
        } else {
            !*self
        }
    }

    /// Literal from a non-zero DIMACS integer.
    pub fn from_dimacs(i: i32) -> Lit {
        debug_assert_ne!(i, 0);
        Lit::new(Var::from_idx(i.unsigned_abs() - 1), i > 0)
    }

    /// DIMACS integer for this literal.
    pub fn to_dimacs(&self) -> i32 {
        let v = self.var().idx() as i32 + 1;
        if self.sign() {
            v
        } else {
            -v
        }
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if *self == Lit::UNDEF {
            write!(f, "UNDEF")
        } else {
            write!(f, "{}{:?}", if self.sign() { "" } else { "-" }, self.var())
        }
    }
}

impl Default for Lit {
    fn default() -> Self {
        Lit::UNDEF
    }
}

impl ops::Not for Lit {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Lit(self.0 ^ 1)
    }
}

impl ops::BitXor<bool> for Lit {
    type Output = Self;
    #[inline(always)]
    fn bitxor(self, rhs: bool) -> Self {
        Lit(self.0 ^ rhs as u32)
    }
}

impl AsIndex for Lit {
    #[inline(always)]
    fn as_index(self) -> usize {
        self.0 as usize
    }
    #[inline(always)]
    fn from_index(index: usize) -> Self {
        Lit(index as u32)
    }
}

pub type LMap<V> = IntMap<Lit, V>;

/// A ternary boolean (true, false, undefined) used for partial assignments.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy)]
pub struct lbool(u8);

impl fmt::Debug for lbool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            0 => write!(f, "TRUE"),
            1 => write!(f, "FALSE"),
            _ => write!(f, "UNDEF"),
        }
    }
}

impl Default for lbool {
    fn default() -> Self {
        lbool::UNDEF
    }
}

impl lbool {
    pub const TRUE: lbool = lbool(0);
    pub const FALSE: lbool = lbool(1);
    pub const UNDEF: lbool = lbool(2);

    #[inline(always)]
    pub fn new(v: bool) -> Self {
        lbool((!v) as u8)
    }

    /// `Some(b)` if the value is defined.
    #[inline]
    pub fn to_bool(&self) -> Option<bool> {
        match self.0 {
            0 => Some(true),
            1 => Some(false),
            _ => None,
        }
    }
}

// all undefined values are equal
impl PartialEq for lbool {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.0 == rhs.0 || (self.0 & rhs.0 & 2) != 0
    }
}

impl Eq for lbool {}

impl ops::Neg for lbool {
    type Output = lbool;
    #[inline(always)]
    fn neg(self) -> Self {
        lbool(self.0 ^ 1)
    }
}

impl ops::BitXor<bool> for lbool {
    type Output = lbool;
    #[inline(always)]
    fn bitxor(self, rhs: bool) -> Self {
        lbool(self.0 ^ rhs as u8)
    }
}

impl From<bool> for lbool {
    fn from(x: bool) -> Self {
        lbool::new(x)
    }
}

/// A clause of exactly two literals, in canonical order.
///
/// `BinaryClause::new(a, b) == BinaryClause::new(b, a)`, which makes it
/// usable as a key in deduplicating sets.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BinaryClause {
    lits: [Lit; 2],
}

impl BinaryClause {
    #[inline]
    pub fn new(a: Lit, b: Lit) -> Self {
        debug_assert_ne!(a.var(), b.var(), "binary clause on a single variable");
        let lits = if a < b { [a, b] } else { [b, a] };
        BinaryClause { lits }
    }

    #[inline(always)]
    pub fn lit1(&self) -> Lit {
        self.lits[0]
    }

    #[inline(always)]
    pub fn lit2(&self) -> Lit {
        self.lits[1]
    }

    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    /// The literal that must hold when `lit` is false, if `lit` is in the clause.
    pub fn other(&self, lit: Lit) -> Option<Lit> {
        if self.lits[0] == lit {
            Some(self.lits[1])
        } else if self.lits[1] == lit {
            Some(self.lits[0])
        } else {
            None
        }
    }
}

impl fmt::Debug for BinaryClause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:?} ∨ {:?})", self.lits[0], self.lits[1])
    }
}

/// Reference to a long clause in a `ClauseDb`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CRef(u32);

/// Location of a clause in the literal arena
#[derive(Clone, Copy, Debug)]
struct ClauseHeader {
    start: u32,
    len: u32,
}

/// Storage for clauses of size 3 or more.
///
/// All literals live in one flat vector; a clause is a slice of it.
/// Clauses are never freed individually: probing only adds long clauses
/// (through the XOR encoding), and root-satisfied ones are skipped on output.
#[derive(Debug, Default)]
pub struct ClauseDb {
    lits: Vec<Lit>,
    headers: Vec<ClauseHeader>,
}

impl ClauseDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Total number of literals over all clauses.
    pub fn num_lits(&self) -> usize {
        self.lits.len()
    }

    pub fn alloc(&mut self, clause: &[Lit]) -> CRef {
        debug_assert!(clause.len() > 2, "long clauses only");
        let cr = CRef(self.headers.len() as u32);
        self.headers.push(ClauseHeader {
            start: self.lits.len() as u32,
            len: clause.len() as u32,
        });
        self.lits.extend_from_slice(clause);
        cr
    }

    #[inline]
    pub fn lits(&self, cr: CRef) -> &[Lit] {
        let h = self.headers[cr.0 as usize];
        &self.lits[h.start as usize..(h.start + h.len) as usize]
    }

    #[inline]
    pub fn lits_mut(&mut self, cr: CRef) -> &mut [Lit] {
        let h = self.headers[cr.0 as usize];
        &mut self.lits[h.start as usize..(h.start + h.len) as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = CRef> {
        (0..self.headers.len() as u32).map(CRef)
    }
}

/// Generic interface for objects printable in DIMACS
pub mod display {
    use {super::Lit, std::fmt};

    /// Objects that can be printed in DIMACS syntax
    pub trait Print: Sized {
        fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result;

        /// Any type implementing `Print` can be used in a format string by
        /// just using `x.pp_dimacs()` instead of `x`.
        ///
        /// ```
        /// use batprobe::*;
        /// let v: Vec<Lit> = vec![Lit::from_dimacs(1), Lit::from_dimacs(-2)];
        /// assert_eq!(format!("{}", v.pp_dimacs()), "1 -2 0");
        /// ```
        fn pp_dimacs(&self) -> PrintWrapper<Self> {
            PrintWrapper(self)
        }
    }

    /// A wrapper that can be used to display objects in format strings
    pub struct PrintWrapper<'a, T: 'a + Print>(&'a T);

    impl<'a, T: Print> fmt::Display for PrintWrapper<'a, T> {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            self.0.fmt_dimacs(out)
        }
    }

    pub(crate) fn fmt_lits(lits: &[Lit], out: &mut fmt::Formatter) -> fmt::Result {
        for lit in lits {
            write!(out, "{} ", lit.to_dimacs())?;
        }
        write!(out, "0")
    }

    impl Print for Vec<Lit> {
        fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result {
            fmt_lits(self, out)
        }
    }

    impl<'a> Print for &'a [Lit] {
        fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result {
            fmt_lits(self, out)
        }
    }

    impl Print for super::BinaryClause {
        fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result {
            fmt_lits(self.lits(), out)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lit_encoding() {
        let v = Var::from_idx(3);
        let p = Lit::new(v, true);
        assert!(p.sign());
        assert!(!(!p).sign());
        assert_eq!(p.var(), v);
        assert_eq!((!p).var(), v);
        assert_eq!(p ^ true, !p);
        assert_eq!(Lit::from_dimacs(4), p);
        assert_eq!(Lit::from_dimacs(-4), !p);
        assert_eq!((!p).to_dimacs(), -4);
    }

    #[test]
    fn test_lbool_eq() {
        assert_eq!(lbool::UNDEF, lbool(3));
        assert_ne!(lbool::TRUE, lbool::FALSE);
        assert_ne!(lbool::TRUE, lbool::UNDEF);
        assert_eq!(-lbool::TRUE, lbool::FALSE);
        assert_eq!(-lbool::UNDEF, lbool::UNDEF);
        assert_eq!(lbool::TRUE ^ true, lbool::FALSE);
        assert_eq!(lbool::UNDEF ^ true, lbool::UNDEF);
        assert_eq!(lbool::new(true).to_bool(), Some(true));
        assert_eq!(lbool::UNDEF.to_bool(), None);
    }

    #[test]
    fn test_binary_clause_canonical() {
        let a = Lit::from_dimacs(5);
        let b = Lit::from_dimacs(-2);
        let c1 = BinaryClause::new(a, b);
        let c2 = BinaryClause::new(b, a);
        assert_eq!(c1, c2);
        assert!(c1.lit1() < c1.lit2());
        assert_eq!(c1.other(a), Some(b));
        assert_eq!(c1.other(!a), None);
    }

    #[test]
    fn test_clause_db() {
        let mut db = ClauseDb::new();
        let c: Vec<Lit> = [1, -2, 3].iter().map(|&i| Lit::from_dimacs(i)).collect();
        let d: Vec<Lit> = [4, 5, -6, 7].iter().map(|&i| Lit::from_dimacs(i)).collect();
        let cr1 = db.alloc(&c);
        let cr2 = db.alloc(&d);
        assert_eq!(db.len(), 2);
        assert_eq!(db.lits(cr1), &c[..]);
        db.lits_mut(cr2).swap(0, 3);
        assert_eq!(db.lits(cr2)[0], Lit::from_dimacs(7));
        assert_eq!(db.num_lits(), 7);
        assert_eq!(db.iter().collect::<Vec<_>>(), vec![cr1, cr2]);
    }
}
