use crate::*;

use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

/// A subspace defined by sets of active and inactive variables, the others are implicitly free.
///
/// Patterns are the partial states used everywhere in the analysis: implicants of the rules,
/// fixed nodes, stable motifs and domains of influence.
/// They are represented as a pair of [VarSet] to store positive and negative variables.
/// In a well-formed pattern, a variable should not be constrained to both values,
/// i.e. the intersection of both bitsets should be empty. However, some operations
/// on patterns do not prevent the creation of conflicts, either for performance reasons
/// or to use them to carry extra information.
///
/// # Operations on patterns
///
/// Patterns provide many operations, based on bitwise operation when possible, notably:
/// * Test the inclusion of a state or another pattern
/// * Test if two patterns overlap
/// * Identify emerging patterns (covered by two patterns but not included in any)
#[derive(Clone, PartialEq, Eq, Default, Debug, Hash)]
pub struct Pattern {
    pub(crate) positive: VarSet,
    pub(crate) negative: VarSet,
}

impl Pattern {
    /// Create a pattern from the two inner sets of fixed variables
    pub fn with(positive: VarSet, negative: VarSet) -> Self {
        Self { positive, negative }
    }

    /// Create a pattern restricted to a single state over the given variables.
    pub fn from_state(state: &State, variables: impl IntoIterator<Item = Variable>) -> Pattern {
        let mut neg = VarSet::from_iter(variables);
        let mut pos = state.active.clone();
        pos.intersect_with(&neg);
        neg.difference_with(&pos);
        Pattern::with(pos, neg)
    }

    /// Fix a variable to a specific value.
    ///
    /// If this variable was free, this leads to a restriction of the pattern.
    /// If it was fixed to the same value, the pattern is unchanged.
    /// If it was fixed to the opposite value, the existing restriction
    /// is replaced by the new one (giving a mirror pattern).
    pub fn set(&mut self, var: Variable, value: bool) {
        if value {
            self.negative.remove(var);
            self.positive.insert(var);
        } else {
            self.positive.remove(var);
            self.negative.insert(var);
        }
    }

    /// Fix a variable to a specific value, even if it is already fixed at another.
    ///
    /// If this variable was free, this leads to a restriction of the pattern.
    /// If it was fixed to the same value, the pattern is unchanged.
    /// If it was fixed to the opposite value, a conflict is introduced
    pub fn set_ignoring_conflicts(&mut self, var: Variable, value: bool) {
        if value {
            self.positive.insert(var);
        } else {
            self.negative.insert(var);
        }
    }

    /// Remove all constraints on a given variable.
    pub fn free_variable(&mut self, var: Variable) {
        self.positive.remove(var);
        self.negative.remove(var);
    }

    /// Test if a variable is fixed at a specific value in this pattern
    pub fn has_restriction(&self, var: Variable, value: bool) -> bool {
        if value {
            self.positive.contains(var)
        } else {
            self.negative.contains(var)
        }
    }

    /// Retrieve the value of a fixed variable, None if it is free (or conflicting).
    pub fn get(&self, var: Variable) -> Option<bool> {
        match (self.positive.contains(var), self.negative.contains(var)) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        }
    }

    /// Test if a variable is constrained in this pattern
    pub fn is_fixed(&self, var: Variable) -> bool {
        self.positive.contains(var) || self.negative.contains(var)
    }

    /// Number of constrained variables
    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    /// Return whether this pattern leaves all variables free
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    /// Test if some variables are fixed at both values
    pub fn has_conflict(&self) -> bool {
        !self.positive.is_disjoint(&self.negative)
    }

    /// Collect all constrained variables
    pub fn fixed_variables(&self) -> VarSet {
        let mut result = self.positive.clone();
        result.union_with(&self.negative);
        result
    }

    /// Iterate over the fixed variables and their values, ordered by UID.
    pub fn iter_fixed_values(&self) -> impl Iterator<Item = (Variable, bool)> + '_ {
        self.fixed_variables()
            .iter()
            .collect::<Vec<_>>()
            .into_iter()
            .map(move |v| (v, self.positive.contains(v)))
    }

    /// Extract the pattern emerging from a pair of patterns if it exists.
    ///
    /// A new pattern can emerge from a pair of patterns with a single conflict.
    /// The conflicting variable is removed and all other restrictions of the two original
    /// patterns are combined. Each of the initial pattern covers half of the new pattern.
    pub fn emerging_pattern(&self, other: &Self) -> Option<Self> {
        let mut pos = self.positive.clone();
        pos.union_with(&other.positive);
        let mut neg = self.negative.clone();
        neg.union_with(&other.negative);

        let mut conflicts = pos.variables.intersection(&neg.variables);
        if let Some(uid) = conflicts.next() {
            if conflicts.next().is_none() {
                pos.remove(Variable::new(uid));
                neg.remove(Variable::new(uid));
                return Some(Pattern::with(pos, neg));
            }
        }
        None
    }

    /// Check if a state is contained in this pattern
    pub fn contains_state(&self, state: &State) -> bool {
        state.active.contains_all(&self.positive) && state.active.is_disjoint(&self.negative)
    }

    /// Check if this pattern shares at least one state with another pattern
    pub fn overlaps(&self, other: &Pattern) -> bool {
        self.positive.is_disjoint(&other.negative) && self.negative.is_disjoint(&other.positive)
    }

    /// Test if this pattern contains the given pattern.
    ///
    /// All restrictions of this pattern are also restrictions of the other one:
    /// the partial state ```p``` implies this pattern.
    pub fn contains(&self, p: &Pattern) -> bool {
        p.positive.contains_all(&self.positive) && p.negative.contains_all(&self.negative)
    }

    /// Test if all variables used in this pattern are contained in a given set
    pub fn variables_contained_in(&self, vars: &VarSet) -> bool {
        vars.contains_all(&self.positive) && vars.contains_all(&self.negative)
    }

    /// Add all restrictions of another pattern (conflicts are not checked)
    pub fn merge_with(&mut self, other: &Pattern) {
        self.positive.union_with(&other.positive);
        self.negative.union_with(&other.negative);
    }

    /// Add the restrictions of another pattern, the other pattern wins on conflicting variables
    pub fn update(&mut self, other: &Pattern) {
        self.positive.difference_with(&other.negative);
        self.negative.difference_with(&other.positive);
        self.merge_with(other);
    }

    /// Remove all restrictions on the given variables
    pub fn free_variables(&mut self, vars: &VarSet) {
        self.positive.difference_with(vars);
        self.negative.difference_with(vars);
    }

    /// Retain only the restrictions on the given variables
    pub fn retain_variables(&mut self, vars: &VarSet) {
        self.positive.intersect_with(vars);
        self.negative.intersect_with(vars);
    }

    /// Swap the value of a variable if it is fixed
    pub fn flip(&mut self, var: Variable) {
        if let Some(b) = self.get(var) {
            self.set(var, !b);
        }
    }

    /// Negate all restrictions
    pub fn negate_all_variables(&mut self) {
        std::mem::swap(&mut self.positive, &mut self.negative);
    }

    /// Sort key giving a deterministic order to lists of patterns
    pub(crate) fn sort_key(&self) -> Vec<(usize, bool)> {
        self.iter_fixed_values().map(|(v, b)| (v.uid(), b)).collect()
    }

    /// Display this pattern as a dictionary of named variables: ```{A: 1, B: 0}```
    pub fn named<'a>(&'a self, namer: &'a VarSpace) -> impl fmt::Display + 'a {
        NamedPattern {
            pattern: self,
            namer,
        }
    }
}

struct NamedPattern<'a> {
    pattern: &'a Pattern,
    namer: &'a VarSpace,
}

impl fmt::Display for NamedPattern<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut values: Vec<(String, bool)> = self
            .pattern
            .iter_fixed_values()
            .map(|(v, b)| (self.namer.name(v), b))
            .collect();
        values.sort();
        write!(f, "{{")?;
        for (i, (name, b)) in values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, *b as u8)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(Variable, bool)> for Pattern {
    fn from_iter<I: IntoIterator<Item = (Variable, bool)>>(iter: I) -> Self {
        let mut p = Pattern::default();
        for (v, b) in iter {
            p.set(v, b);
        }
        p
    }
}

impl Rule for Pattern {
    fn fmt_with(&self, f: &mut dyn efmt::ExprFormatter) -> fmt::Result {
        f.write_pattern(self)
    }

    fn eval(&self, state: &State) -> bool {
        self.contains_state(state)
    }

    fn collect_regulators(&self, regulators: &mut VarSet) {
        regulators.union_with(&self.positive);
        regulators.union_with(&self.negative);
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = vec![];
        for v in &self.positive {
            if result.len() <= v.uid() {
                result.resize(v.uid() + 1, '-');
            }
            result[v.uid()] = '1';
        }
        for v in &self.negative {
            if self.positive.contains(v) {
                result[v.uid()] = '%';
            } else {
                if result.len() <= v.uid() {
                    result.resize(v.uid() + 1, '-');
                }
                result[v.uid()] = '0';
            }
        }
        let s: String = result.iter().collect();
        write!(f, "{}", &s)
    }
}

/// Parse a pattern from a string of '0', '1' and '-' (free) characters, indexed by UID
impl FromStr for Pattern {
    type Err = MotifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut p = Pattern::default();
        for (uid, c) in s.trim().chars().enumerate() {
            match c {
                '0' => p.set(Variable(uid), false),
                '1' => p.set(Variable(uid), true),
                '-' => (),
                _ => return Err(MotifError::InvalidPattern(s.into())),
            }
        }
        Ok(p)
    }
}

impl From<Variable> for Pattern {
    fn from(var: Variable) -> Self {
        let mut pattern = Pattern::default();
        pattern.set(var, true);
        pattern
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn pattern(values: &[(usize, bool)]) -> Pattern {
        values.iter().map(|(v, b)| (Variable::from(*v), *b)).collect()
    }

    #[test]
    fn emerging() {
        let p = pattern(&[(0, true), (1, false), (2, true), (5, false), (6, true)]);
        let t = pattern(&[(1, false), (2, false), (3, true)]);
        let t2 = pattern(&[(0, false), (1, false), (2, false), (3, true)]);

        assert_eq!(format!("{}", p), "101--01");

        let e = p.emerging_pattern(&t).unwrap();
        assert_eq!(format!("{}", e), "10-1-01");

        assert!(p.emerging_pattern(&t2).is_none());
    }

    #[test]
    fn contained() {
        let mut p = Pattern::default();
        let mut t = Pattern::default();
        p.set(Variable(3), true);
        p.set(Variable(2), true);
        assert!(t.contains(&p));

        t.set(Variable(2), true);
        assert!(t.contains(&p));

        t.set(Variable(3), true);
        assert!(t.contains(&p));

        t.set(Variable(5), true);
        assert!(!t.contains(&p));
    }

    #[test]
    fn update_and_flip() {
        let mut p = pattern(&[(0, true), (1, false)]);
        p.update(&pattern(&[(1, true), (2, false)]));
        assert_eq!(p, pattern(&[(0, true), (1, true), (2, false)]));
        assert!(!p.has_conflict());

        p.flip(Variable(2));
        p.flip(Variable(4));
        assert_eq!(p.get(Variable(2)), Some(true));
        assert_eq!(p.get(Variable(4)), None);
        assert_eq!(p.len(), 3);

        p.set_ignoring_conflicts(Variable(0), false);
        assert!(p.has_conflict());
        assert_eq!(p.get(Variable(0)), None);
    }
}
