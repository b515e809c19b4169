use crate::*;

use crate::implicants::PATTERN_SEPARATORS;
use std::iter::FromIterator;
use std::slice::Iter;
use std::str::FromStr;
use std::vec::IntoIter;

/// Boolean function represented as a set of prime implicants.
///
/// This is a special case of ImplicantSet.
/// An implicant is "prime" if it is not contained in any other implicant.
/// A set of prime implicants is a set of implicant containing all prime implicants.
///
/// Two sets of prime implicants are equal if they contain the same patterns, in any order.
#[derive(Clone, Debug, Default)]
pub struct Primes {
    patterns: ImplicantSet,
}

impl Primes {
    /// Get the number of patterns in this list of prime implicants
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Return whether there are no prime implicant (the rule is always false)
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Return whether the rule is always true (the empty pattern is a prime implicant)
    pub fn is_true(&self) -> bool {
        self.patterns.iter().any(|p| p.is_empty())
    }

    /// Get the fixed value of this function, None if it depends on some variables
    pub fn get_fixed(&self) -> Option<bool> {
        match (self.is_empty(), self.is_true()) {
            (true, _) => Some(false),
            (_, true) => Some(true),
            _ => None,
        }
    }

    pub fn iter(&self) -> Iter<'_, Pattern> {
        self.patterns.iter()
    }

    pub fn as_implicants(&self) -> &ImplicantSet {
        &self.patterns
    }

    pub fn into_implicants(self) -> ImplicantSet {
        self.patterns
    }

    /// Check if this function is true in at least one state of the given pattern
    pub fn satisfiable_in_pattern(&self, pattern: &Pattern) -> bool {
        self.patterns.satisfiable_in_pattern(pattern)
    }

    /// Check if the function is true in all states of the given pattern.
    pub fn contains(&self, pattern: &Pattern) -> bool {
        self.patterns.contains(pattern)
    }

    /// Find the first prime implicant containing the given state
    pub fn first_match(&self, state: &State) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.contains_state(state))
    }

    /// Add a restriction on a single variable to this set of prime implicants.
    ///
    /// The result is the set of prime implicants of the conjunction of the current
    /// function with the literal.
    ///
    /// This will perform the following operations:
    /// 1) remove the patterns which would have conflicts
    /// 2) extract the unchanged patterns
    /// 3) Update all remaining patterns
    /// 4) remove newly subsumed patterns
    pub fn restrict(&mut self, var: Variable, value: bool) {
        // Start by removing all conflicting patterns
        self.patterns.retain(|p| !p.has_restriction(var, !value));

        // Extract the unchanged patterns and keep only the extended ones
        let mut unchanged = self
            .patterns
            .split_subset(|p| p.has_restriction(var, value));

        // Apply the restriction to the remaining patterns
        self.patterns.restrict(var, value);

        // Eliminate newly subsumed patterns
        self.patterns.exclude(&unchanged);

        // merge back the two sets
        self.patterns.append(&mut unchanged);
    }

    /// Restrict the function in a subspace: the fixed variables are replaced by their value.
    ///
    /// Prime implicants conflicting with the subspace are removed, the fixed variables are
    /// removed from the other ones and newly subsumed patterns are eliminated.
    /// The result is the set of prime implicants of the restricted function.
    pub fn restrict_to_subspace(&self, subspace: &Pattern) -> Self {
        let vars = subspace.fixed_variables();
        let mut result = ImplicantSet::default();
        for p in self.patterns.iter().filter(|p| p.overlaps(subspace)) {
            let mut p = p.clone();
            p.free_variables(&vars);
            result.push_new_pattern(p);
        }
        Self { patterns: result }
    }

    /// Test if the function depends on the given variable
    pub fn uses_variable(&self, var: Variable) -> bool {
        self.patterns.iter().any(|p| p.is_fixed(var))
    }

    /// Merge two lists of prime implicants.
    ///
    /// Patterns subsumed in any of the lists are removed
    /// Emerging patterns are identified and lead to iterated merges until no new emerging pattern is found
    pub fn merge(&mut self, other: &mut Self) {
        // remove subsumed patterns from the two sets
        self.patterns.exclude(&other.patterns);
        other.patterns.exclude(&self.patterns);

        // Generate the set of emerging patterns
        let emerging = self.patterns.emerging(&other.patterns);

        self.patterns.append(&mut other.patterns);

        self.merge_emerging(emerging);
    }

    pub fn add_pattern(&mut self, p: Pattern) {
        if self.patterns.contains(&p) {
            return;
        }
        let mut other = Primes::default();
        other.patterns.push_new_pattern(p);
        self.merge(&mut other);
    }

    fn merge_emerging(&mut self, mut emerging: ImplicantSet) {
        while !emerging.is_empty() {
            self.patterns.exclude(&emerging);

            let mut next_emerging = self.patterns.emerging(&emerging);
            let mut self_emerging = emerging.emerging(&emerging);
            next_emerging.append(&mut self_emerging);

            self.patterns.append(&mut emerging);

            next_emerging.exclude(&self.patterns);
            emerging = next_emerging.into_iter().collect();
        }
    }

    /// Compute the prime implicants of an expression
    pub fn from_expr(expr: &Expr) -> Self {
        let mut result = Self::from(true);
        result._expand_expr(expr, true);
        result
    }

    fn _expand_expr(&mut self, expr: &Expr, positive: bool) {
        let positive = positive == expr.value;
        match &expr.node {
            ExprNode::Variable(var) => self.restrict(*var, positive),
            ExprNode::True => {
                if !positive {
                    self.patterns.clear();
                }
            }
            ExprNode::Operation(op, children) => match (positive, op) {
                (true, Operator::And) | (false, Operator::Or) => {
                    self._expand_expr(&children.0, positive);
                    self._expand_expr(&children.1, positive);
                }
                (true, Operator::Or) | (false, Operator::And) => {
                    let mut other = self.clone();
                    self._expand_expr(&children.0, positive);
                    other._expand_expr(&children.1, positive);
                    self.merge(&mut other);
                }
            },
        }
    }

    /// Select an irredundant subset of prime implicants covering the same function.
    ///
    /// Primes are removed, starting with the most specific ones, if the others still cover them.
    pub fn irredundant_cover(&self) -> ImplicantSet {
        let mut selected: Vec<Pattern> = self.patterns.iter().cloned().collect();
        selected.sort_by_cached_key(|p| (std::cmp::Reverse(p.len()), p.sort_key()));
        let mut idx = 0;
        while idx < selected.len() {
            let others: Primes = selected
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, p)| p.clone())
                .collect();
            if others.restrict_to_subspace(&selected[idx]).is_true() {
                selected.remove(idx);
            } else {
                idx += 1;
            }
        }
        let mut result: ImplicantSet = selected.into_iter().collect();
        result.sort();
        result
    }

    /// Sort the prime implicants for a reproducible output
    pub fn sort(&mut self) {
        self.patterns.sort();
    }
}

impl PartialEq for Primes {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|p| other.iter().any(|t| t == p))
    }
}

impl Eq for Primes {}

impl FromIterator<Pattern> for Primes {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        let mut primes = Primes::default();
        for p in iter {
            primes.add_pattern(p);
        }
        primes
    }
}

impl<'a> IntoIterator for &'a Primes {
    type Item = &'a Pattern;
    type IntoIter = Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

impl IntoIterator for Primes {
    type Item = Pattern;
    type IntoIter = IntoIter<Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.into_iter()
    }
}

impl FromStr for Primes {
    type Err = MotifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut result = Primes::default();
        for elt in s.split(&PATTERN_SEPARATORS[..]).map(str::trim) {
            if !elt.is_empty() {
                result.add_pattern(elt.parse()?);
            }
        }
        Ok(result)
    }
}

impl Rule for Primes {
    fn fmt_with(&self, f: &mut dyn efmt::ExprFormatter) -> fmt::Result {
        self.patterns.fmt_with(f)
    }

    fn eval(&self, state: &State) -> bool {
        self.patterns.eval(state)
    }

    fn collect_regulators(&self, regulators: &mut VarSet) {
        self.patterns.collect_regulators(regulators);
    }
}

// delegate Display impl to the implicant set
impl fmt::Display for Primes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.patterns, f)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn count_primes() -> Result<(), MotifError> {
        let mut variables = VarSpace::default();
        let first = variables.provide("first")?;
        let test = variables.provide("test")?;
        let other = variables.provide("other")?;
        let myvar = variables.provide("myvar")?;

        let e: Expr = (test | other) & true & ((!myvar | first) & test);
        let primes = Primes::from(&e);
        assert_eq!(2, primes.len());

        let e: Expr = (test & other) | (myvar & other & !test) | (test & !myvar & other);
        let primes = Primes::from(&e);
        assert_eq!(2, primes.len());

        let v: Vec<Variable> = (1..=10).map(Variable::from).collect();
        let e: Expr =
            ((v[0] | v[1]) & (v[2] | v[3]) & v[4]) | (v[5] & (v[6] | v[7])) | (v[8] & v[9]);
        let primes = Primes::from(&e);
        assert_eq!(7, primes.len());

        Ok(())
    }

    #[test]
    fn consensus_and_negation() -> Result<(), MotifError> {
        let mut vs = VarSpace::default();

        // The consensus term B & C is a prime implicant
        let e = vs.parse_expression_extend("(A & B) | (!A & C)")?;
        let primes = Primes::from(&e);
        let expected: Primes = "11-;0-1;-11".parse()?;
        assert_eq!(primes, expected);

        let negated = Primes::from(&!&e);
        let expected: Primes = "10-;0-0;-00".parse()?;
        assert_eq!(negated, expected);

        assert_eq!(Primes::from(&Expr::from(true)).get_fixed(), Some(true));
        assert_eq!(Primes::from(&Expr::from(false)).get_fixed(), Some(false));
        let a = vs.get_or_err("A")?;
        assert_eq!(Primes::from(&(a | !a)).get_fixed(), Some(true));
        Ok(())
    }

    #[test]
    fn restrict_in_subspace() -> Result<(), MotifError> {
        let primes: Primes = "11-;0-1;-11".parse()?;

        let sub: Pattern = "1".parse()?;
        assert_eq!(primes.restrict_to_subspace(&sub), "-1-".parse()?);

        let sub: Pattern = "-1".parse()?;
        assert_eq!(primes.restrict_to_subspace(&sub), "1--;--1".parse()?);

        let sub: Pattern = "-11".parse()?;
        assert_eq!(primes.restrict_to_subspace(&sub), Primes::from(true));
        Ok(())
    }

    #[test]
    fn irredundant() -> Result<(), MotifError> {
        let primes: Primes = "11-;0-1;-11".parse()?;
        let cover = primes.irredundant_cover();
        assert_eq!(cover.len(), 2);
        assert!(cover.contains(&"11-".parse()?));
        assert!(cover.contains(&"0-1".parse()?));
        assert!(!cover.contains(&"-11".parse()?));
        Ok(())
    }

    #[test]
    fn convert() -> Result<(), MotifError> {
        let implicants: ImplicantSet = "0-10;0-11;1-11".parse()?;
        let primes1 = Primes::from(&implicants);
        let expr = Expr::from(&implicants);
        let primes2 = Primes::from(&expr);

        assert_eq!(implicants.len(), 3);
        assert_eq!(primes1.len(), 2);
        assert_eq!(primes1, primes2);
        Ok(())
    }
}
