//! Manipulate sets of (prime) implicants.

use crate::*;
use std::iter::FromIterator;
use std::slice::Iter;
use std::str::FromStr;
use std::vec::IntoIter;

pub(crate) static PATTERN_SEPARATORS: [char; 3] = [',', ';', '\n'];

/// Boolean function represented as a set of implicants.
///
/// An implicant of a Boolean function is a pattern such that the function is true for all covered states.
/// The implicants in a set of implicants cover exactly all true states of the function.
#[derive(Clone, Default, Debug)]
pub struct ImplicantSet {
    patterns: Vec<Pattern>,
}

impl ImplicantSet {
    fn with(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    pub fn iter(&self) -> Iter<'_, Pattern> {
        self.patterns.iter()
    }

    /// Remove all patterns.
    ///
    /// This will give an empty set, covering the FALSE function
    pub fn clear(&mut self) {
        self.patterns.clear();
    }

    /// Keep only the implicants matching the provided condition.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Pattern) -> bool,
    {
        self.patterns.retain(f);
    }

    /// Extract a subset of the implicants into a separate set, retain only the others implicants
    pub(crate) fn split_subset<F>(&mut self, mut f: F) -> Self
    where
        F: FnMut(&Pattern) -> bool,
    {
        let (extracted, kept) = std::mem::take(&mut self.patterns)
            .into_iter()
            .partition(|p| f(p));
        self.patterns = kept;
        Self::with(extracted)
    }

    /// Add a restriction to all implicants in the set.
    ///
    /// Note that this may introduce conflicts for some implicants
    pub fn restrict(&mut self, var: Variable, value: bool) {
        for p in &mut self.patterns {
            p.set_ignoring_conflicts(var, value);
        }
    }

    /// Add all patterns from another set
    pub fn append(&mut self, other: &mut Self) {
        self.patterns.append(&mut other.patterns)
    }

    /// Test if the given pattern is covered by at least one pattern in this set.
    ///
    /// Note that if it returns false, the states of the target pattern could still be contained in
    /// this list of implicants. This corner case is eliminated if the implicants are prime.
    pub fn contains(&self, p: &Pattern) -> bool {
        self.iter().any(|t| t.contains(p))
    }

    /// Remove all patterns covered by at least one pattern of the given set
    pub fn exclude(&mut self, other: &Self) {
        self.patterns.retain(|p| !other.contains(p));
    }

    /// Find the patterns emerging from two sets of patterns.
    ///
    /// These emerging pattern cover states of the two sets and are not contained in any of them
    pub fn emerging(&self, other: &Self) -> Self {
        let mut result = ImplicantSet::default();

        for p in &self.patterns {
            for t in &other.patterns {
                if let Some(e) = p.emerging_pattern(t) {
                    if self.contains(&e) || other.contains(&e) {
                        continue;
                    }
                    result.push_new_pattern(e);
                }
            }
        }

        result
    }

    /// Add a new pattern avoiding duplicate.
    ///
    /// If the new pattern is contained in the set, nothing changes.
    /// Otherwise, the newly subsumed patterns are removed from the set.
    pub fn push_new_pattern(&mut self, p: Pattern) {
        if self.contains(&p) {
            return;
        }
        self.retain(|t| !p.contains(t));
        self.patterns.push(p);
    }

    /// Check if this function is true in at least one state of the given pattern
    pub fn satisfiable_in_pattern(&self, pattern: &Pattern) -> bool {
        self.patterns.iter().any(|p| p.overlaps(pattern))
    }

    /// Get the number of patterns in this list of implicants
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Return whether there are no implicant (the rule is always false)
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Sort the patterns by variable UID for a reproducible order
    pub(crate) fn sort(&mut self) {
        self.patterns.sort_by_cached_key(|p| p.sort_key());
    }
}

impl FromIterator<Pattern> for ImplicantSet {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        let mut implicants = ImplicantSet::default();
        for p in iter {
            implicants.push_new_pattern(p);
        }
        implicants
    }
}

impl<'a> IntoIterator for &'a ImplicantSet {
    type Item = &'a Pattern;
    type IntoIter = Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

impl IntoIterator for ImplicantSet {
    type Item = Pattern;
    type IntoIter = IntoIter<Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.into_iter()
    }
}

impl FromStr for ImplicantSet {
    type Err = MotifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(&PATTERN_SEPARATORS[..])
            .map(str::trim)
            .filter(|elt| !elt.is_empty())
            .map(Pattern::from_str)
            .collect()
    }
}

impl Rule for ImplicantSet {
    fn fmt_with(&self, f: &mut dyn efmt::ExprFormatter) -> fmt::Result {
        match self.patterns.len() {
            0 => f.write_bool(false),
            1 => f.write_pattern(&self.patterns[0]),
            _ => {
                f.start_operation(Operator::Or, true, None)?;
                for (i, p) in self.patterns.iter().enumerate() {
                    if i > 0 {
                        f.sep_operation(Operator::Or)?;
                    }
                    f.write_pattern(p)?;
                }
                f.end_operation(Operator::Or, true, None)
            }
        }
    }

    fn eval(&self, state: &State) -> bool {
        self.patterns.iter().any(|p| p.contains_state(state))
    }

    fn collect_regulators(&self, regulators: &mut VarSet) {
        for p in &self.patterns {
            p.collect_regulators(regulators);
        }
    }
}

impl fmt::Display for ImplicantSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.patterns {
            writeln!(f, "{}", p)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn parsing() -> Result<(), MotifError> {
        let p: Pattern = "--01-1---0-1".parse()?;
        assert_eq!(p.positive.len(), 3);
        assert_eq!(p.negative.len(), 2);

        let is1: ImplicantSet = "--01-1---0-1".parse()?;
        assert_eq!(is1.len(), 1);

        // The second pattern is contained in the first one
        let is2 = "--01-1\n--0101\n--0-1".parse::<ImplicantSet>()?;
        assert_eq!(is2.len(), 2);

        let implicants: ImplicantSet = "0-10;0-11;1-11".parse()?;
        assert_eq!(implicants.len(), 3);
        assert!(implicants.satisfiable_in_pattern(&"10-1".parse()?));
        assert!(!implicants.satisfiable_in_pattern(&"110-".parse()?));
        Ok(())
    }

    #[test]
    fn display_as_dnf() -> Result<(), MotifError> {
        let mut vs = VarSpace::default();
        let a = vs.provide("A")?;
        let b = vs.provide("B")?;
        let c = vs.provide("C")?;
        let implicants: ImplicantSet = [
            [(a, true), (b, false)].into_iter().collect::<Pattern>(),
            Pattern::from(c),
        ]
        .into_iter()
        .collect();
        assert_eq!(format!("{}", vs.named(&implicants)), "A & !B | C");
        assert_eq!(format!("{}", vs.named(&ImplicantSet::default())), "0");
        Ok(())
    }
}
