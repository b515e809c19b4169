//! Structural reductions of rule systems preserving their attractors

use crate::network::{minimize, InteractionGraph};
use crate::*;

/// Remove a node by substituting its rule in the rules of its targets.
///
/// The rules of the targets are minimized and their prime implicants recomputed,
/// constant values are then propagated in the resulting system.
/// A node which regulates itself can not be deleted.
pub fn delete_node(rules: &RuleSystem, var: Variable) -> Result<RuleSystem, MotifError> {
    let rule = rules
        .get(var)
        .ok_or_else(|| MotifError::MissingNode(rules.name(var)))?;
    if rule.uses_variable(var) {
        return Err(MotifError::SelfLoop(rules.name(var)));
    }
    let replacement = Expr::from(&rule.on.irredundant_cover());

    let mut reduced = rules.clone();
    reduced.remove(var);
    for (target, target_rule) in rules.iter() {
        if target == var || !target_rule.uses_variable(var) {
            continue;
        }
        let expr = Expr::from(&target_rule.on).substitute(var, &replacement);
        reduced.set_rule(target, PrimeRule::from_expr(&minimize(&expr)));
    }
    log::trace!("Deleted node {}", rules.name(var));
    Ok(reduced.percolate(&Pattern::default()).0)
}

/// Delete all nodes of the output DAG, which can not influence any cycle of the network
pub fn remove_output_dag(rules: &RuleSystem) -> Result<RuleSystem, MotifError> {
    let dag = rules.interaction_graph().output_dag();
    let mut reduced = rules.clone();
    for var in dag {
        if reduced.contains(var) {
            reduced = delete_node(&reduced, var)?;
        }
    }
    log::debug!(
        "Removed the output DAG: {} nodes remaining out of {}",
        reduced.len(),
        rules.len()
    );
    Ok(reduced)
}

/// Delete nodes without self-regulation until no such node remains.
///
/// The output DAG is removed first, then the nodes are repeatedly sorted by in-degree (and name)
/// and the first node without self loop is deleted. Nodes with an in-degree above the
/// optional limit are kept.
pub fn deletion_reduction(
    rules: &RuleSystem,
    max_in_degree: Option<usize>,
) -> Result<RuleSystem, MotifError> {
    let mut reduced = remove_output_dag(rules)?;
    loop {
        let graph = reduced.interaction_graph();
        let mut order: Vec<Variable> = reduced.nodes().collect();
        order.sort_by_cached_key(|v| (graph.in_degree(*v), reduced.name(*v)));
        let next = order.into_iter().find(|v| {
            !graph.has_self_loop(*v) && max_in_degree.map_or(true, |m| graph.in_degree(*v) <= m)
        });
        match next {
            Some(var) => reduced = delete_node(&reduced, var)?,
            None => break,
        }
    }
    log::debug!(
        "Deletion reduction: {} nodes remaining out of {}",
        reduced.len(),
        rules.len()
    );
    Ok(reduced)
}

/// A mediator has a single regulator and a single target, which are distinct and not connected
fn is_mediator(graph: &InteractionGraph, var: Variable) -> bool {
    if graph.in_degree(var) != 1 || graph.out_degree(var) != 1 || graph.has_self_loop(var) {
        return false;
    }
    match (graph.predecessors(var).next(), graph.successors(var).next()) {
        (Some(u), Some(w)) => u != w && !graph.has_edge(u, w) && !graph.has_edge(w, u),
        _ => false,
    }
}

/// Remove the output DAG and eliminate mediator nodes.
///
/// This reduction preserves the number of fixed points and of complex attractors,
/// but may change the shape of complex attractors. Candidates are identified again
/// after each deletion.
pub fn mediator_reduction(rules: &RuleSystem) -> Result<RuleSystem, MotifError> {
    let mut reduced = remove_output_dag(rules)?;
    loop {
        let graph = reduced.interaction_graph();
        let next = reduced
            .sorted_nodes()
            .into_iter()
            .find(|v| is_mediator(&graph, *v));
        match next {
            Some(var) => reduced = delete_node(&reduced, var)?,
            None => break,
        }
    }
    log::debug!(
        "Mediator reduction: {} nodes remaining out of {}",
        reduced.len(),
        rules.len()
    );
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trapspace::maximal_trap_spaces;

    #[test]
    fn node_deletion() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = B\nB* = not C\nC* = A\n")?;
        let reduced = delete_node(&rules, rules.variable("B")?)?;
        assert_eq!(format!("{}", reduced), "A* = not C\nC* = A\n");

        let rules = RuleSystem::canonicalize("A* = A or B\nB* = A\n")?;
        let a = rules.variable("A")?;
        assert_eq!(
            delete_node(&rules, a),
            Err(MotifError::SelfLoop("A".into()))
        );

        let reduced = delete_node(&rules, rules.variable("B")?)?;
        assert_eq!(format!("{}", reduced), "A* = A\n");
        assert_eq!(
            delete_node(&reduced, rules.variable("B")?),
            Err(MotifError::MissingNode("B".into()))
        );
        Ok(())
    }

    #[test]
    fn output_dag() -> Result<(), MotifError> {
        let rules =
            RuleSystem::canonicalize("A* = B\nB* = A\nC* = A and not B\nD* = C or B\n")?;
        let reduced = remove_output_dag(&rules)?;
        assert_eq!(format!("{}", reduced), "A* = B\nB* = A\n");
        assert_eq!(
            maximal_trap_spaces(&reduced).len(),
            maximal_trap_spaces(&rules).len()
        );
        Ok(())
    }

    #[test]
    fn deletions() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = B\nB* = C\nC* = A\n")?;
        let reduced = deletion_reduction(&rules, None)?;
        assert_eq!(format!("{}", reduced), "C* = C\n");

        let rules = RuleSystem::canonicalize("A* = B or C\nB* = A\nC* = A\n")?;
        let reduced = deletion_reduction(&rules, Some(0))?;
        assert_eq!(reduced, rules);
        let reduced = deletion_reduction(&rules, None)?;
        assert_eq!(format!("{}", reduced), "A* = A\n");
        Ok(())
    }

    #[test]
    fn mediators() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = D\nB* = A\nC* = not B\nD* = C\nE* = D\n")?;
        let reduced = mediator_reduction(&rules)?;
        assert_eq!(format!("{}", reduced), "B* = D\nC* = not B\nD* = C\n");
        Ok(())
    }
}
