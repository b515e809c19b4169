//! Enumeration of the maximal trap spaces of a rule system

use crate::*;

use std::collections::HashSet;

/// Test if a fixed value is maintained in a subspace: one of its prime implicants contains the subspace
fn is_supported(rules: &RuleSystem, var: Variable, value: bool, space: &Pattern) -> bool {
    rules
        .get(var)
        .map_or(false, |rule| rule.primes(value).iter().any(|p| p.contains(space)))
}

/// Find all inclusion-maximal trap spaces which fix at least one node.
///
/// A subspace is a trap space if each of its fixed values is implied by a prime implicant
/// containing the whole subspace. Candidates are grown from single node values: the first fixed
/// value without support is extended with each of its compatible prime implicants.
/// Candidates which are included in a trap space found earlier are skipped.
///
/// The result is sorted by the UIDs and values of the fixed nodes.
pub fn maximal_trap_spaces(rules: &RuleSystem) -> Vec<Pattern> {
    let mut found: Vec<Pattern> = vec![];
    let mut visited: HashSet<Pattern> = HashSet::new();

    for var in rules.nodes() {
        for value in [false, true] {
            let mut stack = vec![Pattern::from_iter([(var, value)])];
            while let Some(current) = stack.pop() {
                if found.iter().any(|t| t.contains(&current)) || !visited.insert(current.clone()) {
                    continue;
                }

                let unsupported = current
                    .iter_fixed_values()
                    .find(|(v, b)| !is_supported(rules, *v, *b, &current));
                let (v, b) = match unsupported {
                    None => {
                        found.push(current);
                        continue;
                    }
                    Some(literal) => literal,
                };

                if let Some(rule) = rules.get(v) {
                    for p in rule.primes(b).iter().filter(|p| p.overlaps(&current)) {
                        let mut next = current.clone();
                        next.merge_with(p);
                        stack.push(next);
                    }
                }
            }
        }
    }

    let mut result: Vec<Pattern> = found
        .iter()
        .filter(|t| !found.iter().any(|o| o != *t && o.contains(t)))
        .cloned()
        .collect();
    result.sort_by_cached_key(|t| t.sort_key());
    result.dedup();
    log::debug!(
        "Found {} maximal trap spaces among {} candidates",
        result.len(),
        visited.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_loops() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = B\nB* = A\n")?;
        let spaces = maximal_trap_spaces(&rules);
        assert_eq!(
            spaces,
            vec![
                rules.named_pattern(&[("A", false), ("B", false)])?,
                rules.named_pattern(&[("A", true), ("B", true)])?,
            ]
        );

        let rules = RuleSystem::canonicalize("A* = A\nB* = B\nC* = A and B\n")?;
        let spaces = maximal_trap_spaces(&rules);
        assert_eq!(
            spaces,
            vec![
                rules.named_pattern(&[("A", false)])?,
                rules.named_pattern(&[("A", true)])?,
                rules.named_pattern(&[("B", false)])?,
                rules.named_pattern(&[("B", true)])?,
            ]
        );
        Ok(())
    }

    #[test]
    fn negative_cycle() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = B\nB* = C\nC* = not A\n")?;
        assert!(maximal_trap_spaces(&rules).is_empty());
        Ok(())
    }

    #[test]
    fn nested_spaces() -> Result<(), MotifError> {
        // A=1 is a trap space, the fixed point A=1,B=1 is included in it
        let rules = RuleSystem::canonicalize("A* = A or B\nB* = A\nC* = not C\n")?;
        let spaces = maximal_trap_spaces(&rules);
        assert_eq!(
            spaces,
            vec![
                rules.named_pattern(&[("A", false), ("B", false)])?,
                rules.named_pattern(&[("A", true)])?,
            ]
        );

        let rules = RuleSystem::canonicalize("A* = 1\nB* = B and A\n")?;
        let spaces = maximal_trap_spaces(&rules);
        assert_eq!(
            spaces,
            vec![
                rules.named_pattern(&[("A", true)])?,
                rules.named_pattern(&[("B", false)])?,
            ]
        );
        Ok(())
    }
}
