//! Canonical rule systems: each node is associated to the prime implicants of its two values.

use crate::efmt::LOWERCASE_FMT_CFG;
use crate::parse::parse_rules;
use crate::*;

use delegate::delegate;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// The prime implicants of the two values of a node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrimeRule {
    /// Prime implicants of the negative value
    pub off: Primes,
    /// Prime implicants of the positive value
    pub on: Primes,
}

impl PrimeRule {
    /// Compute both sets of prime implicants of an expression
    pub fn from_expr(expr: &Expr) -> Self {
        let mut on = Primes::from(expr);
        let mut off = Primes::from(&!expr);
        on.sort();
        off.sort();
        Self { off, on }
    }

    /// A rule which is always true or always false
    pub fn constant(value: bool) -> Self {
        Self {
            off: Primes::from(!value),
            on: Primes::from(value),
        }
    }

    /// The prime implicants of the selected value
    pub fn primes(&self, value: bool) -> &Primes {
        match value {
            true => &self.on,
            false => &self.off,
        }
    }

    pub fn get_fixed(&self) -> Option<bool> {
        self.on.get_fixed()
    }

    /// Test if this rule depends on the given node
    pub fn uses_variable(&self, var: Variable) -> bool {
        self.on.uses_variable(var) || self.off.uses_variable(var)
    }

    fn restrict_to_subspace(&self, subspace: &Pattern) -> Self {
        let mut on = self.on.restrict_to_subspace(subspace);
        let mut off = self.off.restrict_to_subspace(subspace);
        on.sort();
        off.sort();
        Self { off, on }
    }
}

/// A Boolean network in canonical form.
///
/// Each node is associated to the prime implicants of its update rule and of the negation
/// of its update rule. A rule system is never modified by the analysis: percolation and
/// reductions create new rule systems sharing the same collection of named variables.
#[derive(Clone, Debug)]
pub struct RuleSystem {
    space: Arc<VarSpace>,
    rules: BTreeMap<Variable, PrimeRule>,
}

impl PartialEq for RuleSystem {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl Eq for RuleSystem {}

impl RuleSystem {
    delegate! {
        to self.rules {
            /// Number of nodes in this rule system
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
        }
    }

    /// Create an empty rule system over a collection of variables
    pub fn with_space(space: Arc<VarSpace>) -> Self {
        Self {
            space,
            rules: BTreeMap::new(),
        }
    }

    /// Parse a rule file and compute the prime implicants of all rules.
    ///
    /// Both the BooleanNet (```A* = B and not C```) and bnet (```A, B & !C```) formats are accepted.
    /// Nodes which are used as regulators without a rule of their own are input nodes: they
    /// receive the rule ```X* = X```.
    pub fn canonicalize(text: &str) -> Result<Self, MotifError> {
        let mut space = VarSpace::default();
        let rules = parse_rules(&mut space, text)?;
        Self::from_expressions(space, rules)
    }

    /// Build a rule system from a list of rules given as expressions
    pub fn from_expressions(
        space: VarSpace,
        rules: Vec<(Variable, Expr)>,
    ) -> Result<Self, MotifError> {
        let mut result = Self::with_space(Arc::new(space));
        let mut regulators = VarSet::default();
        for (var, expr) in rules {
            if result.rules.contains_key(&var) {
                return Err(MotifError::DuplicateRule(result.space.name(var)));
            }
            result.space.check_rule(&expr)?;
            expr.collect_regulators(&mut regulators);
            result.rules.insert(var, PrimeRule::from_expr(&expr));
        }

        for var in regulators.iter() {
            result
                .rules
                .entry(var)
                .or_insert_with(|| PrimeRule::from_expr(&Expr::from(var)));
        }
        log::debug!("Loaded a rule system with {} nodes", result.len());
        Ok(result)
    }

    /// The collection of named variables used by this rule system
    pub fn space(&self) -> &Arc<VarSpace> {
        &self.space
    }

    /// Name of a node
    pub fn name(&self, var: Variable) -> String {
        self.space.name(var)
    }

    /// Find a node by name
    pub fn variable(&self, name: &str) -> Result<Variable, MotifError> {
        self.space
            .get(name)
            .filter(|v| self.rules.contains_key(v))
            .ok_or_else(|| MotifError::MissingNode(name.into()))
    }

    /// Build a pattern from a list of named node values
    pub fn named_pattern(&self, values: &[(&str, bool)]) -> Result<Pattern, MotifError> {
        values
            .iter()
            .map(|(name, b)| self.space.get_or_err(name).map(|v| (v, *b)))
            .collect()
    }

    pub fn contains(&self, var: Variable) -> bool {
        self.rules.contains_key(&var)
    }

    pub fn get(&self, var: Variable) -> Option<&PrimeRule> {
        self.rules.get(&var)
    }

    /// Iterate over the nodes (ordered by UID)
    pub fn nodes(&self) -> impl Iterator<Item = Variable> + '_ {
        self.rules.keys().copied()
    }

    /// The nodes sorted by name
    pub fn sorted_nodes(&self) -> Vec<Variable> {
        self.space.sorted_by_name(self.nodes())
    }

    /// The set of nodes of this system
    pub fn node_set(&self) -> VarSet {
        self.nodes().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, &PrimeRule)> + '_ {
        self.rules.iter().map(|(v, r)| (*v, r))
    }

    /// Replace the rule of a node, or add a new node
    pub fn set_rule(&mut self, var: Variable, rule: PrimeRule) {
        self.rules.insert(var, rule);
    }

    /// Compute and set the rule of a node from an expression
    pub fn set_expression(&mut self, var: Variable, expr: &Expr) -> Result<(), MotifError> {
        self.space.check_rule(expr)?;
        self.set_rule(var, PrimeRule::from_expr(expr));
        Ok(())
    }

    pub(crate) fn remove(&mut self, var: Variable) -> Option<PrimeRule> {
        self.rules.remove(&var)
    }

    /// The update rule of a node as a minimized expression
    pub fn rule_expr(&self, var: Variable) -> Option<Expr> {
        self.rules
            .get(&var)
            .map(|r| Expr::from(&r.on.irredundant_cover()))
    }

    /// Propagate fixed values through the rules.
    ///
    /// The given nodes are fixed, all rules are restricted by the fixed values and nodes whose rule becomes
    /// constant are fixed in turn until no new node is fixed. All fixed nodes are then removed.
    ///
    /// Return the reduced rule system and all fixed values (including the initial ones).
    pub fn percolate(&self, fixed: &Pattern) -> (RuleSystem, Pattern) {
        let mut fixed = fixed.clone();
        loop {
            let mut changed = false;
            for (var, rule) in &self.rules {
                if fixed.is_fixed(*var) {
                    continue;
                }
                if let Some(b) = rule.on.restrict_to_subspace(&fixed).get_fixed() {
                    log::trace!("Percolate {}={}", self.name(*var), b as u8);
                    fixed.set(*var, b);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let rules = self
            .rules
            .iter()
            .filter(|(v, _)| !fixed.is_fixed(**v))
            .map(|(v, r)| (*v, r.restrict_to_subspace(&fixed)))
            .collect();
        let reduced = RuleSystem {
            space: Arc::clone(&self.space),
            rules,
        };
        (reduced, fixed)
    }

    /// Lock in a pattern: percolate its values and return the rules of the remaining free nodes.
    pub fn reduce(&self, fixed: &Pattern) -> (RuleSystem, Pattern) {
        self.percolate(fixed)
    }

    /// Build the interaction graph of this rule system
    pub fn interaction_graph(&self) -> InteractionGraph {
        let mut graph = InteractionGraph::default();
        for (target, rule) in &self.rules {
            graph.add_node(*target);
            for regulator in rule.on.get_regulators().iter() {
                graph.add_edge(regulator, *target);
            }
            for regulator in rule.off.get_regulators().iter() {
                graph.add_edge(regulator, *target);
            }
        }
        graph
    }

    /// Display the rules of this system (sorted by node name) in BooleanNet format
    pub fn rules_display(&self) -> impl fmt::Display + '_ {
        RulesDisplay(self)
    }
}

/// Minimize an expression: the irredundant disjunction of its prime implicants
pub fn minimize(expr: &Expr) -> Expr {
    Expr::from(&Primes::from(expr).irredundant_cover())
}

struct RulesDisplay<'a>(&'a RuleSystem);

impl fmt::Display for RulesDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let system = self.0;
        for var in system.sorted_nodes() {
            if let Some(expr) = system.rule_expr(var) {
                writeln!(
                    f,
                    "{}* = {}",
                    system.name(var),
                    LOWERCASE_FMT_CFG.infix(&expr, Some(&system.space))
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for RuleSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rules_display())
    }
}

/// Directed graph of regulations: an edge from a regulator to each target using it in its rule.
#[derive(Clone, Debug, Default)]
pub struct InteractionGraph {
    successors: BTreeMap<Variable, BTreeSet<Variable>>,
    predecessors: BTreeMap<Variable, BTreeSet<Variable>>,
}

impl InteractionGraph {
    fn add_node(&mut self, var: Variable) {
        self.successors.entry(var).or_default();
        self.predecessors.entry(var).or_default();
    }

    fn add_edge(&mut self, source: Variable, target: Variable) {
        self.add_node(source);
        self.add_node(target);
        self.successors.entry(source).or_default().insert(target);
        self.predecessors.entry(target).or_default().insert(source);
    }

    pub fn nodes(&self) -> impl Iterator<Item = Variable> + '_ {
        self.successors.keys().copied()
    }

    pub fn has_edge(&self, source: Variable, target: Variable) -> bool {
        self.successors
            .get(&source)
            .map_or(false, |s| s.contains(&target))
    }

    pub fn has_self_loop(&self, var: Variable) -> bool {
        self.has_edge(var, var)
    }

    pub fn successors(&self, var: Variable) -> impl Iterator<Item = Variable> + '_ {
        self.successors.get(&var).into_iter().flatten().copied()
    }

    pub fn predecessors(&self, var: Variable) -> impl Iterator<Item = Variable> + '_ {
        self.predecessors.get(&var).into_iter().flatten().copied()
    }

    pub fn in_degree(&self, var: Variable) -> usize {
        self.predecessors.get(&var).map_or(0, |s| s.len())
    }

    pub fn out_degree(&self, var: Variable) -> usize {
        self.successors.get(&var).map_or(0, |s| s.len())
    }

    /// Find the output DAG: nodes which can not reach a cycle of the graph.
    ///
    /// Nodes are peeled when all their successors have already been peeled.
    /// The result is given in peeling order: each node appears after all of its successors.
    pub fn output_dag(&self) -> Vec<Variable> {
        let mut remaining: BTreeMap<Variable, usize> =
            self.nodes().map(|v| (v, self.out_degree(v))).collect();
        let mut queue: Vec<Variable> = remaining
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(v, _)| *v)
            .collect();
        let mut result = vec![];
        while let Some(var) = queue.pop() {
            result.push(var);
            for pred in self.predecessors(var) {
                if let Some(d) = remaining.get_mut(&pred) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push(pred);
                    }
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn canonical_form() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = B and not C\nB* = A or C\n")?;
        assert_eq!(rules.len(), 3);

        let a = rules.variable("A")?;
        let c = rules.variable("C")?;
        assert_eq!(rules.get(a).map(|r| r.on.len()), Some(1));
        assert_eq!(rules.get(a).map(|r| r.off.len()), Some(2));

        // C is an input node
        assert_eq!(rules.rule_expr(c), Some(Expr::from(c)));
        assert_eq!(
            format!("{}", rules),
            "A* = B and not C\nB* = A or C\nC* = C\n"
        );

        assert_eq!(
            RuleSystem::canonicalize("A* = B\nA* = C\n"),
            Err(MotifError::DuplicateRule("A".into()))
        );
        Ok(())
    }

    #[test]
    fn percolation() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = A\nB* = A\nC* = B or C\nD* = not C and D\n")?;

        // Nothing to propagate
        let (same, fixed) = rules.percolate(&Pattern::default());
        assert_eq!(same, rules);
        assert!(fixed.is_empty());

        let (reduced, fixed) = rules.percolate(&rules.named_pattern(&[("A", true)])?);
        assert_eq!(reduced.len(), 0);
        assert_eq!(
            fixed,
            rules.named_pattern(&[("A", true), ("B", true), ("C", true), ("D", false)])?
        );

        let (reduced, fixed) = rules.percolate(&rules.named_pattern(&[("A", false)])?);
        assert_eq!(fixed, rules.named_pattern(&[("A", false), ("B", false)])?);
        assert_eq!(format!("{}", reduced), "C* = C\nD* = not C and D\n");
        Ok(())
    }

    #[test]
    fn graph_and_output_dag() -> Result<(), MotifError> {
        let rules =
            RuleSystem::canonicalize("A* = B\nB* = A and not B\nC* = A\nD* = C or A\nE* = D\n")?;
        let graph = rules.interaction_graph();
        let var = |n: &str| rules.variable(n);

        assert!(graph.has_self_loop(var("B")?));
        assert!(!graph.has_self_loop(var("A")?));
        assert_eq!(graph.in_degree(var("D")?), 2);
        assert_eq!(graph.out_degree(var("A")?), 3);

        let dag = graph.output_dag();
        let names: Vec<String> = dag.iter().map(|v| rules.name(*v)).collect();
        assert_eq!(names, vec!["E", "D", "C"]);
        Ok(())
    }

    #[test]
    fn minimized_rules() -> Result<(), MotifError> {
        let mut vs = VarSpace::default();
        let e = vs.parse_expression_extend("A & B | A & !B | B & C & A")?;
        assert_eq!(format!("{}", vs.named(&network::minimize(&e))), "A");
        Ok(())
    }
}
