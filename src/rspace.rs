//! Restrict space: necessary conditions for attractors which avoid all stable motifs

use crate::doi::{logical_domain_of_influence, single_drivers};
use crate::*;

/// The subspace in which an attractor must lie to avoid all stable motifs.
///
/// Once a stable motif is reached, it is never left. An attractor locking in no further
/// motif must therefore avoid each motif `m`, i.e. satisfy the clause `not m`.
/// A single node value whose domain of influence contains the motif can reach it from any state,
/// such a driver value is then excluded from all states of the attractor.
/// Clauses are stored as the disjunction of the negated values of the motif or driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RestrictSpace {
    /// No state can avoid all motifs: some node value is excluded both ways
    Unsatisfiable,
    /// Some motif has no single node driver, no constraint is derived
    Unconstrained,
    /// Each clause is a disjunction of node values
    Constraint(Vec<Pattern>),
}

/// Single node values whose domain of influence sets all nodes of the motif to their motif values
fn motif_drivers(motif: &Pattern, rules: &RuleSystem) -> Vec<Pattern> {
    single_drivers(motif, rules)
        .into_iter()
        .filter(|driver| {
            let mut forced = logical_domain_of_influence(driver, rules).implied;
            forced.update(driver);
            motif.contains(&forced)
        })
        .collect()
}

fn negated(pattern: &Pattern) -> Pattern {
    let mut clause = pattern.clone();
    clause.negate_all_variables();
    clause
}

impl RestrictSpace {
    /// Build the restrict space associated to the stable motifs of a rule system
    pub fn from_motifs(motifs: &[Pattern], rules: &RuleSystem) -> Self {
        let mut clauses = vec![];
        for motif in motifs {
            let drivers = motif_drivers(motif, rules);
            if drivers.is_empty() {
                log::trace!("No single node driver for {}", motif.named(rules.space()));
                return RestrictSpace::Unconstrained;
            }
            clauses.extend(drivers.iter().map(negated));
            clauses.push(negated(motif));
        }
        clauses.sort_by_cached_key(Pattern::sort_key);
        clauses.dedup();

        let mut units = Pattern::default();
        for clause in clauses.iter().filter(|c| c.len() == 1) {
            for (var, value) in clause.iter_fixed_values() {
                units.set_ignoring_conflicts(var, value);
            }
        }

        if units.has_conflict() {
            RestrictSpace::Unsatisfiable
        } else if units.is_empty() {
            RestrictSpace::Unconstrained
        } else {
            RestrictSpace::Constraint(clauses)
        }
    }

    /// The constraint as a conjunction of clauses
    pub fn constraint(&self) -> Expr {
        match self {
            RestrictSpace::Unsatisfiable => Expr::from(false),
            RestrictSpace::Unconstrained => Expr::from(true),
            RestrictSpace::Constraint(clauses) => Expr::all(clauses.iter().map(clause_expr)),
        }
    }

    /// Find the nodes which take a fixed value in all states of an attractor lying in this space.
    ///
    /// Unit clauses and the domain of influence of the nodes they fix are propagated until
    /// no new node is fixed. Return None if the propagation reaches a contradiction: no attractor
    /// can avoid all motifs.
    pub fn fixed_nodes(&self, rules: &RuleSystem) -> Option<Pattern> {
        let clauses = match self {
            RestrictSpace::Unsatisfiable => return None,
            RestrictSpace::Unconstrained => return Some(Pattern::default()),
            RestrictSpace::Constraint(clauses) => clauses,
        };

        let mut fixed = Pattern::default();
        loop {
            let mut changed = false;
            for clause in clauses {
                if clause
                    .iter_fixed_values()
                    .any(|(v, b)| fixed.get(v) == Some(b))
                {
                    continue;
                }
                let open: Vec<(Variable, bool)> = clause
                    .iter_fixed_values()
                    .filter(|(v, _)| !fixed.is_fixed(*v))
                    .collect();
                match open.as_slice() {
                    [] => return None,
                    [(v, b)] => {
                        fixed.set(*v, *b);
                        changed = true;
                    }
                    _ => (),
                }
            }

            let doi = logical_domain_of_influence(&fixed, rules);
            if doi.has_contradiction() {
                return None;
            }
            for (v, b) in doi.implied.iter_fixed_values() {
                if !fixed.is_fixed(v) {
                    fixed.set(v, b);
                    changed = true;
                }
            }

            if !changed {
                return Some(fixed);
            }
        }
    }
}

fn clause_expr(clause: &Pattern) -> Expr {
    Expr::any(clause.iter_fixed_values().map(|(v, b)| match b {
        true => Expr::from(v),
        false => !v,
    }))
}

/// Find the conserved functions of a rule system.
///
/// A time-reverse stable motif which is not a stable motif is a trap space of the reversed dynamics:
/// once left, it can not be entered again. Its truth value is therefore constant on each attractor.
pub fn attractor_space_candidates(motifs: &[Pattern], tr_motifs: &[Pattern]) -> Vec<Expr> {
    tr_motifs
        .iter()
        .filter(|m| !motifs.contains(m))
        .map(Expr::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trapspace::maximal_trap_spaces;

    #[test]
    fn classification() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = A\nB* = B\nC* = A and B\n")?;
        let motifs = maximal_trap_spaces(&rules);
        let rspace = RestrictSpace::from_motifs(&motifs, &rules);
        assert_eq!(rspace, RestrictSpace::Unsatisfiable);
        assert_eq!(rspace.fixed_nodes(&rules), None);
        assert_eq!(rspace.constraint(), Expr::from(false));

        // A=1 drives the motif A=B=1 and A=0 drives A=B=0
        let rules = RuleSystem::canonicalize("A* = B\nB* = A\n")?;
        let motifs = maximal_trap_spaces(&rules);
        assert_eq!(motifs.len(), 2);
        let rspace = RestrictSpace::from_motifs(&motifs, &rules);
        assert_eq!(rspace, RestrictSpace::Unsatisfiable);

        // A=B=1 has no single node driver
        let rules = RuleSystem::canonicalize("A* = A and B\nB* = A and B\n")?;
        let motifs = maximal_trap_spaces(&rules);
        assert_eq!(motifs.len(), 3);
        let rspace = RestrictSpace::from_motifs(&motifs, &rules);
        assert_eq!(rspace, RestrictSpace::Unconstrained);
        assert_eq!(rspace.fixed_nodes(&rules), Some(Pattern::default()));
        assert_eq!(rspace.constraint(), Expr::from(true));

        assert_eq!(
            RestrictSpace::from_motifs(&[], &rules),
            RestrictSpace::Unconstrained
        );
        Ok(())
    }

    #[test]
    fn drivers() -> Result<(), MotifError> {
        // A=0 sets B but not A to the values of the motif A=B=1
        let rules = RuleSystem::canonicalize("A* = B\nB* = A\n")?;
        let motif = rules.named_pattern(&[("A", true), ("B", true)])?;
        assert_eq!(single_drivers(&motif, &rules).len(), 4);
        assert_eq!(
            motif_drivers(&motif, &rules),
            vec![
                rules.named_pattern(&[("A", true)])?,
                rules.named_pattern(&[("B", true)])?
            ]
        );
        Ok(())
    }

    #[test]
    fn propagation() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = A or B\nB* = A\nC* = not C and A\n")?;
        let motifs = maximal_trap_spaces(&rules);
        assert_eq!(motifs.len(), 2);

        // A=1 and A=0 both drive a motif
        let rspace = RestrictSpace::from_motifs(&motifs, &rules);
        assert_eq!(rspace, RestrictSpace::Unsatisfiable);
        assert_eq!(rspace.fixed_nodes(&rules), None);

        // Avoiding the drivers A=1 and B=1 of A=1 forces B=0, which updates to B=1
        let rules = RuleSystem::canonicalize("A* = A or B\nB* = not B\n")?;
        let motifs = maximal_trap_spaces(&rules);
        assert_eq!(motifs, vec![rules.named_pattern(&[("A", true)])?]);
        let rspace = RestrictSpace::from_motifs(&motifs, &rules);
        assert!(matches!(rspace, RestrictSpace::Constraint(_)));
        assert_eq!(rspace.fixed_nodes(&rules), None);

        let text = "A* = A or (B and not C and D)\nB* = C\nC* = D\nD* = not B\n";
        let rules = RuleSystem::canonicalize(text)?;
        let motifs = maximal_trap_spaces(&rules);
        let rspace = RestrictSpace::from_motifs(&motifs, &rules);
        assert_eq!(
            rspace.fixed_nodes(&rules),
            Some(rules.named_pattern(&[("A", false)])?)
        );
        let a = rules.variable("A")?;
        assert_eq!(rspace.constraint(), !a);
        Ok(())
    }

    #[test]
    fn conserved_functions() -> Result<(), MotifError> {
        let a = Variable::from(0);
        let b = Variable::from(1);
        let motifs = vec![Pattern::from_iter([(a, true)])];
        let tr_motifs = vec![
            Pattern::from_iter([(a, true)]),
            Pattern::from_iter([(a, false), (b, true)]),
        ];
        let conserved = attractor_space_candidates(&motifs, &tr_motifs);
        assert_eq!(conserved, vec![!a & b]);
        Ok(())
    }
}
