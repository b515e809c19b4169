//! Time reversal of rule systems

use crate::*;

/// Compute the rules of the time-reversed system.
///
/// The reversed system has the same asynchronous state transition graph with all transitions
/// reversed. Each prime implicant forcing a node to a value becomes a prime implicant of the
/// opposite value, after flipping the value of the node itself if the implicant constrains it.
pub fn time_reverse(rules: &RuleSystem) -> RuleSystem {
    let mut reversed = RuleSystem::with_space(rules.space().clone());
    for (var, rule) in rules.iter() {
        let flip = |primes: &Primes| -> Primes {
            let mut result: Primes = primes
                .iter()
                .map(|p| {
                    let mut p = p.clone();
                    p.flip(var);
                    p
                })
                .collect();
            result.sort();
            result
        };
        reversed.set_rule(
            var,
            PrimeRule {
                off: flip(&rule.on),
                on: flip(&rule.off),
            },
        );
    }
    reversed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn involution() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize(
            "A* = A or B\nB* = not A and C\nC* = B or not C\nD* = D\n",
        )?;
        let reversed = time_reverse(&rules);
        assert_ne!(reversed, rules);
        assert_eq!(time_reverse(&reversed), rules);

        // A* = A | B gives A- = A & !B, rules without self-regulation are negated
        assert_eq!(
            format!("{}", reversed),
            "A* = A and not B\nB* = A or not C\nC* = not B and not C\nD* = D\n"
        );
        Ok(())
    }
}
