//! Boolean variables and sets of variables

use crate::*;

use bit_set::BitSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

/// A single Boolean variable (a node of the network) with an integer UID.
///
/// Variables are issued by a [VarSpace] which associates them to a human-readable name.
/// They are cheap to copy and are ordered by UID, which gives a deterministic iteration
/// order to all collections keyed by variables.
#[derive(Clone, Copy, Default, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct Variable(pub(crate) usize);

impl Variable {
    /// Create a new variable with a specific UID
    pub fn new(uid: usize) -> Self {
        Self(uid)
    }

    /// Return the internal integer UID
    pub fn uid(&self) -> usize {
        self.0
    }
}

impl From<usize> for Variable {
    fn from(uid: usize) -> Self {
        Self(uid)
    }
}

impl Rule for Variable {
    fn fmt_with(&self, f: &mut dyn efmt::ExprFormatter) -> fmt::Result {
        f.write_variable(*self, true)
    }

    fn eval(&self, state: &State) -> bool {
        state.is_active(*self)
    }

    fn collect_regulators(&self, regulators: &mut VarSet) {
        regulators.insert(*self);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_{}_", self.0)
    }
}

/// A set of selected variables with efficient bitwise operations.
///
/// A VarSet is an abstraction over [BitSet], providing a similar API.
/// It can be constructed explicitly by inserting or removing individual variables, or by importing
/// an existing collection of variables. Union, intersection and differences are bitwise operations.
///
/// ```
/// use motifkit::{Variable, VarSet};
///
/// let mut vs = VarSet::default();
/// vs.insert(Variable::from(1));
/// vs.insert(Variable::from(3));
/// vs.remove(Variable::from(3));
///
/// assert!(!vs.contains(Variable::from(0)));
/// assert!( vs.contains(Variable::from(1)));
/// assert!(!vs.contains(Variable::from(3)));
/// ```
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct VarSet {
    pub(crate) variables: BitSet,
}

impl VarSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an iterator over the contained variables
    pub fn iter(&self) -> Iter {
        self.into_iter()
    }

    /// Add a variable to this set
    pub fn insert(&mut self, var: Variable) {
        self.variables.insert(var.uid());
    }

    /// Remove a variable from this set
    pub fn remove(&mut self, var: Variable) {
        self.variables.remove(var.uid());
    }

    /// Test if a specific variable is part of this set
    pub fn contains(&self, var: Variable) -> bool {
        self.variables.contains(var.uid())
    }

    /// Remove all variables from the other set
    pub fn difference_with(&mut self, vars: &Self) {
        self.variables.difference_with(&vars.variables);
    }

    /// Retain only the variables also included in the other set
    pub fn intersect_with(&mut self, vars: &Self) {
        self.variables.intersect_with(&vars.variables);
    }

    /// Add all variables from the other set
    pub fn union_with(&mut self, vars: &Self) {
        self.variables.union_with(&vars.variables);
    }

    /// Return true if this set contains all variables of the other set
    pub fn contains_all(&self, other: &Self) -> bool {
        self.variables.is_superset(&other.variables)
    }

    /// Return true if the two sets have no common variable
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.variables.is_disjoint(&other.variables)
    }

    /// Return the number of variables in this set
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Return whether there are no selected variable in this set
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Return the first variable of this set (by UID) if any
    pub fn first(&self) -> Option<Variable> {
        self.iter().next()
    }
}

impl Hash for VarSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for uid in &self.variables {
            uid.hash(state);
        }
    }
}

impl From<BitSet> for VarSet {
    fn from(variables: BitSet) -> Self {
        Self { variables }
    }
}

impl FromIterator<Variable> for VarSet {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        let mut vs = VarSet::default();
        vs.extend(iter);
        vs
    }
}

impl Extend<Variable> for VarSet {
    fn extend<T: IntoIterator<Item = Variable>>(&mut self, iter: T) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl fmt::Display for VarSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut pos = 0;
        for v in self {
            while pos < v.uid() {
                write!(f, "0")?;
                pos += 1;
            }
            write!(f, "1")?;
            pos += 1;
        }
        write!(f, "")
    }
}

/// Iterate over variables in a [VarSet]
pub struct Iter<'a>(bit_set::Iter<'a, u32>);

impl Iterator for Iter<'_> {
    type Item = Variable;
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(Variable::from)
    }
}

impl<'a> IntoIterator for &'a VarSet {
    type Item = Variable;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter(self.variables.iter())
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn set_operations() {
        let a: VarSet = [0, 2, 5].into_iter().map(Variable::from).collect();
        let b: VarSet = [2, 5].into_iter().map(Variable::from).collect();

        assert!(a.contains_all(&b));
        assert!(!b.contains_all(&a));

        let mut c = a.clone();
        c.difference_with(&b);
        assert_eq!(c.len(), 1);
        assert_eq!(c.first(), Some(Variable::from(0)));
        assert!(c.is_disjoint(&b));

        c.union_with(&b);
        assert_eq!(c, a);
        assert_eq!(format!("{}", a), "101001");
    }
}
