//! Logical domain of influence of partial states

use crate::*;

use std::collections::BTreeSet;

/// Node values forced by a partial state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DomainOfInfluence {
    /// Node values forced by the fixed nodes (possibly including some of the fixed nodes themselves)
    pub implied: Pattern,
    /// Node values forced by a subset of the domain of influence but conflicting with the initial fixed values
    pub contradicted: Pattern,
}

impl DomainOfInfluence {
    /// Return true if some forced values contradict the initial partial state
    pub fn has_contradiction(&self) -> bool {
        !self.contradicted.is_empty()
    }
}

/// Compute the logical domain of influence of a partial state.
///
/// The rules of all nodes are scanned repeatedly. When the fixed values contain a prime implicant of
/// a node, this node is forced to the corresponding value and its rule is removed from the search.
/// If the node was already fixed at the other value, the forced value is recorded as contradicted
/// and the fixed value is kept.
pub fn logical_domain_of_influence(state: &Pattern, rules: &RuleSystem) -> DomainOfInfluence {
    let mut fixed = state.clone();
    let mut result = DomainOfInfluence::default();
    let mut to_search: BTreeSet<Variable> = rules.nodes().collect();

    while !to_search.is_empty() {
        let mut forced = vec![];
        for var in to_search.iter().copied() {
            let rule = match rules.get(var) {
                Some(rule) => rule,
                None => continue,
            };
            let value = [false, true]
                .into_iter()
                .find(|b| rule.primes(*b).iter().any(|p| p.contains(&fixed)));
            if let Some(value) = value {
                forced.push(var);
                match fixed.get(var) {
                    Some(b) if b != value => result.contradicted.set(var, value),
                    Some(_) => result.implied.set(var, value),
                    None => {
                        result.implied.set(var, value);
                        fixed.set(var, value);
                    }
                }
            }
        }

        if forced.is_empty() {
            break;
        }
        for var in forced {
            to_search.remove(&var);
        }
    }
    result
}

/// Find all single node values whose domain of influence covers all nodes of the target.
///
/// Only the nodes of the target are considered: the forced values are not compared to the target values.
pub fn single_drivers(target: &Pattern, rules: &RuleSystem) -> Vec<Pattern> {
    let targets = target.fixed_variables();
    let mut drivers = vec![];
    for var in rules.nodes() {
        for value in [false, true] {
            let driver = Pattern::from_iter([(var, value)]);
            let doi = logical_domain_of_influence(&driver, rules);
            if doi.implied.fixed_variables().contains_all(&targets) {
                drivers.push(driver);
            }
        }
    }
    drivers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Result<RuleSystem, MotifError> {
        RuleSystem::canonicalize("A* = B\nB* = A\nC* = A and not D\nD* = C\nE* = not A\n")
    }

    #[test]
    fn closure() -> Result<(), MotifError> {
        let rules = sample()?;
        let state = rules.named_pattern(&[("A", true)])?;
        let doi = logical_domain_of_influence(&state, &rules);
        assert_eq!(
            doi.implied,
            rules.named_pattern(&[("A", true), ("B", true), ("E", false)])?
        );
        assert!(!doi.has_contradiction());

        // Applying the closure a second time on the forced values gives the same result
        let mut extended = state.clone();
        extended.merge_with(&doi.implied);
        let again = logical_domain_of_influence(&extended, &rules);
        assert_eq!(again, doi);
        Ok(())
    }

    #[test]
    fn contradictions() -> Result<(), MotifError> {
        let rules = sample()?;

        // D is forced by C, then C is forced to 0 by A and D
        let state = rules.named_pattern(&[("C", true), ("A", true)])?;
        let doi = logical_domain_of_influence(&state, &rules);
        assert_eq!(doi.implied.get(rules.variable("D")?), Some(true));
        assert_eq!(doi.contradicted, rules.named_pattern(&[("C", false)])?);
        assert!(doi.has_contradiction());

        let state = rules.named_pattern(&[("D", false), ("A", true)])?;
        let doi = logical_domain_of_influence(&state, &rules);
        assert_eq!(doi.implied.get(rules.variable("C")?), Some(true));
        assert_eq!(doi.contradicted, rules.named_pattern(&[("D", true)])?);
        Ok(())
    }

    #[test]
    fn drivers() -> Result<(), MotifError> {
        let rules = sample()?;
        let target = rules.named_pattern(&[("A", true), ("B", true)])?;
        let drivers = single_drivers(&target, &rules);

        // Both values of A (or B) force the values of the two nodes
        assert_eq!(
            drivers,
            vec![
                rules.named_pattern(&[("A", false)])?,
                rules.named_pattern(&[("A", true)])?,
                rules.named_pattern(&[("B", false)])?,
                rules.named_pattern(&[("B", true)])?,
            ]
        );
        Ok(())
    }
}
