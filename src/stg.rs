//! Pruned partial state transition graph used to search complex attractors avoiding all stable motifs.
//!
//! States are encoded as integers over the nodes sorted by name: the first node is the most
//! significant bit, the binary representation of a code is the string of node values.

use crate::*;

use slab::Slab;
use std::collections::{HashMap, HashSet, VecDeque};

/// Maximal number of nodes for which states can be encoded
pub const MAX_STG_NODES: usize = 63;

/// A sub-cube of the state space: the selected bits take the given values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cube {
    mask: u64,
    value: u64,
}

impl Cube {
    fn contains(&self, code: u64) -> bool {
        code & self.mask == self.value
    }
}

/// Encode and decode states and patterns over a list of nodes
#[derive(Clone, Debug)]
struct StateCoder {
    order: Vec<Variable>,
    positions: HashMap<Variable, usize>,
}

impl StateCoder {
    fn new(order: Vec<Variable>) -> Self {
        let positions = order.iter().enumerate().map(|(i, v)| (*v, i)).collect();
        Self { order, positions }
    }

    fn bit(&self, idx: usize) -> u64 {
        1 << (self.order.len() - 1 - idx)
    }

    /// The cube of a pattern, None if it uses unknown nodes
    fn cube(&self, pattern: &Pattern) -> Option<Cube> {
        let mut cube = Cube { mask: 0, value: 0 };
        for (var, value) in pattern.iter_fixed_values() {
            let bit = self.bit(*self.positions.get(&var)?);
            cube.mask |= bit;
            if value {
                cube.value |= bit;
            }
        }
        Some(cube)
    }

    fn cubes<'a>(&self, patterns: impl IntoIterator<Item = &'a Pattern>) -> Vec<Cube> {
        patterns.into_iter().filter_map(|p| self.cube(p)).collect()
    }

    fn pattern(&self, code: u64) -> Pattern {
        self.order
            .iter()
            .enumerate()
            .map(|(i, v)| (*v, code & self.bit(i) != 0))
            .collect()
    }
}

#[derive(Clone, Debug)]
struct StgNode {
    state: u64,
    successors: Vec<usize>,
    predecessors: Vec<usize>,
}

/// The prime implicants of both values of a node, encoded as cubes
struct NodeRule {
    off: Vec<Cube>,
    on: Vec<Cube>,
}

impl NodeRule {
    fn primes(&self, value: bool) -> &[Cube] {
        match value {
            true => &self.on,
            false => &self.off,
        }
    }
}

/// Part of the asynchronous state transition graph which may contain attractors avoiding all stable motifs.
///
/// States are explored from all combinations of the free nodes. States in a stable motif are never
/// explored. An explored state is pruned, with all states which can reach it in the graph built so far,
/// when one of its transitions changes a fixed node, reaches a pruned state or a stable motif, or
/// enters or leaves a time-reverse stable motif.
/// The attracting components of the remaining graph are the complex attractors avoiding all motifs.
#[derive(Clone, Debug)]
pub struct PartialStg {
    coder: StateCoder,
    nodes: Slab<StgNode>,
    index: HashMap<u64, usize>,
    pruned: HashSet<u64>,
}

impl PartialStg {
    /// Explore and prune the state transition graph of a rule system.
    ///
    /// The fixed values of the given pattern are kept in all states, they usually come from the
    /// restrict space. The rule system should have at most [MAX_STG_NODES] nodes.
    pub fn build(
        rules: &RuleSystem,
        fixed: &Pattern,
        motifs: &[Pattern],
        tr_motifs: &[Pattern],
    ) -> Self {
        let coder = StateCoder::new(rules.sorted_nodes());
        let node_rules: Vec<NodeRule> = coder
            .order
            .iter()
            .map(|v| match rules.get(*v) {
                Some(rule) => NodeRule {
                    off: coder.cubes(rule.off.iter()),
                    on: coder.cubes(rule.on.iter()),
                },
                None => NodeRule {
                    off: vec![],
                    on: vec![],
                },
            })
            .collect();
        let motif_cubes = coder.cubes(motifs);
        let tr_cubes = coder.cubes(tr_motifs);

        let mut fixed_bits = Cube { mask: 0, value: 0 };
        let mut free = vec![];
        for (idx, var) in coder.order.iter().enumerate() {
            match fixed.get(*var) {
                Some(b) => {
                    fixed_bits.mask |= coder.bit(idx);
                    if b {
                        fixed_bits.value |= coder.bit(idx);
                    }
                }
                None => free.push(idx),
            }
        }

        let in_motif = |code: u64| motif_cubes.iter().any(|c| c.contains(code));
        let mut in_spaces: HashMap<u64, Vec<usize>> = HashMap::new();
        let mut in_space = |code: u64| -> Vec<usize> {
            in_spaces
                .entry(code)
                .or_insert_with(|| {
                    tr_cubes
                        .iter()
                        .enumerate()
                        .filter(|(_, c)| c.contains(code))
                        .map(|(i, _)| i)
                        .collect()
                })
                .clone()
        };

        let bits: Vec<u64> = (0..coder.order.len()).map(|i| coder.bit(i)).collect();
        let mut stg = Self {
            coder,
            nodes: Slab::new(),
            index: HashMap::new(),
            pruned: HashSet::new(),
        };
        let mut explored: HashSet<u64> = HashSet::new();
        for k in 0..(1u64 << free.len()) {
            let mut start = fixed_bits.value;
            for (j, idx) in free.iter().enumerate() {
                if k & (1 << (free.len() - 1 - j)) != 0 {
                    start |= bits[*idx];
                }
            }
            if explored.contains(&start) || stg.pruned.contains(&start) || in_motif(start) {
                continue;
            }

            let mut stack = vec![start];
            while let Some(code) = stack.pop() {
                if explored.contains(&code) || stg.pruned.contains(&code) {
                    continue;
                }
                explored.insert(code);
                let parent = stg.provide(code);
                let parent_space = in_space(code);

                for (idx, rule) in node_rules.iter().enumerate() {
                    let bit = bits[idx];
                    let value = code & bit != 0;
                    if !rule.primes(!value).iter().any(|c| c.contains(code)) {
                        continue;
                    }
                    let child = code ^ bit;
                    if fixed_bits.mask & bit != 0
                        || stg.pruned.contains(&child)
                        || in_motif(child)
                        || in_space(child) != parent_space
                    {
                        stg.prune_backward(parent);
                        break;
                    }
                    let target = stg.provide(child);
                    stg.add_edge(parent, target);
                    if !explored.contains(&child) {
                        stack.push(child);
                    }
                }
            }
        }

        log::debug!(
            "Partial STG over {} nodes: {} states kept, {} pruned",
            stg.coder.order.len(),
            stg.nodes.len(),
            stg.pruned.len()
        );
        stg
    }

    fn provide(&mut self, state: u64) -> usize {
        if let Some(idx) = self.index.get(&state) {
            return *idx;
        }
        let idx = self.nodes.insert(StgNode {
            state,
            successors: vec![],
            predecessors: vec![],
        });
        self.index.insert(state, idx);
        idx
    }

    fn add_edge(&mut self, source: usize, target: usize) {
        if self.nodes[source].successors.contains(&target) {
            return;
        }
        self.nodes[source].successors.push(target);
        self.nodes[target].predecessors.push(source);
    }

    /// Prune a state and all states which can reach it
    fn prune_backward(&mut self, start: usize) {
        let mut queue = VecDeque::from([start]);
        let mut reached = HashSet::from([start]);
        while let Some(idx) = queue.pop_front() {
            for pred in &self.nodes[idx].predecessors {
                if reached.insert(*pred) {
                    queue.push_back(*pred);
                }
            }
        }

        for idx in &reached {
            let node = self.nodes.remove(*idx);
            self.index.remove(&node.state);
            self.pruned.insert(node.state);
            for succ in node.successors {
                if let Some(s) = self.nodes.get_mut(succ) {
                    s.predecessors.retain(|p| p != idx);
                }
            }
        }
        log::trace!("Pruned {} states", reached.len());
    }

    /// Number of states in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of states pruned during the exploration
    pub fn pruned_count(&self) -> usize {
        self.pruned.len()
    }

    /// Number of transitions in the graph
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|(_, n)| n.successors.len()).sum()
    }

    /// Test if the graph contains a state, given as a pattern fixing all nodes
    pub fn contains(&self, state: &Pattern) -> bool {
        self.coder
            .cube(state)
            .filter(|c| c.mask.count_ones() as usize == self.coder.order.len())
            .map_or(false, |c| self.index.contains_key(&c.value))
    }

    /// Find the attracting components: strongly connected components without outgoing transitions
    pub fn attractors(&self) -> Vec<ComplexAttractor> {
        let components = self.strong_components();
        let mut component_of: HashMap<usize, usize> = HashMap::new();
        for (c, members) in components.iter().enumerate() {
            for idx in members {
                component_of.insert(*idx, c);
            }
        }

        let mut result: Vec<ComplexAttractor> = components
            .iter()
            .enumerate()
            .filter(|(c, members)| {
                members.iter().all(|idx| {
                    self.nodes[*idx]
                        .successors
                        .iter()
                        .all(|s| component_of.get(s) == Some(c))
                })
            })
            .map(|(_, members)| {
                let mut states: Vec<u64> = members.iter().map(|i| self.nodes[*i].state).collect();
                states.sort_unstable();
                ComplexAttractor {
                    order: self.coder.order.clone(),
                    states,
                }
            })
            .collect();
        result.sort_by(|a, b| a.states.cmp(&b.states));
        result
    }

    /// Iterative Tarjan algorithm over the remaining states
    fn strong_components(&self) -> Vec<Vec<usize>> {
        let mut counter = 0;
        let mut index: HashMap<usize, usize> = HashMap::new();
        let mut lowlink: HashMap<usize, usize> = HashMap::new();
        let mut on_stack: HashSet<usize> = HashSet::new();
        let mut stack: Vec<usize> = vec![];
        let mut components = vec![];

        for (start, _) in self.nodes.iter() {
            if index.contains_key(&start) {
                continue;
            }
            index.insert(start, counter);
            lowlink.insert(start, counter);
            counter += 1;
            stack.push(start);
            on_stack.insert(start);
            let mut calls: Vec<(usize, usize)> = vec![(start, 0)];

            while let Some((v, pos)) = calls.last().copied() {
                let successors = &self.nodes[v].successors;
                if pos < successors.len() {
                    if let Some(call) = calls.last_mut() {
                        call.1 += 1;
                    }
                    let w = successors[pos];
                    match index.get(&w).copied() {
                        None => {
                            index.insert(w, counter);
                            lowlink.insert(w, counter);
                            counter += 1;
                            stack.push(w);
                            on_stack.insert(w);
                            calls.push((w, 0));
                        }
                        Some(iw) if on_stack.contains(&w) => {
                            let low = lowlink.entry(v).or_insert(iw);
                            *low = (*low).min(iw);
                        }
                        Some(_) => (),
                    }
                    continue;
                }

                calls.pop();
                let low_v = lowlink.get(&v).copied().unwrap_or(0);
                if let Some((parent, _)) = calls.last() {
                    let low = lowlink.entry(*parent).or_insert(low_v);
                    *low = (*low).min(low_v);
                }
                if Some(&low_v) == index.get(&v) {
                    let mut component = vec![];
                    while let Some(w) = stack.pop() {
                        on_stack.remove(&w);
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    components.push(component);
                }
            }
        }
        components
    }
}

/// A complex attractor found in a partial state transition graph
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexAttractor {
    order: Vec<Variable>,
    states: Vec<u64>,
}

impl ComplexAttractor {
    /// The nodes of the states, sorted by name
    pub fn nodes(&self) -> &[Variable] {
        &self.order
    }

    /// Number of states in the attractor
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The states of the attractor as patterns fixing all nodes
    pub fn states(&self) -> Vec<Pattern> {
        let coder = StateCoder::new(self.order.clone());
        self.states.iter().map(|s| coder.pattern(*s)).collect()
    }

    /// The states of the attractor as strings of node values
    pub fn state_strings(&self) -> Vec<String> {
        let width = self.order.len();
        self.states
            .iter()
            .map(|s| match width {
                0 => String::new(),
                _ => format!("{:0width$b}", s, width = width),
            })
            .collect()
    }
}

impl fmt::Display for ComplexAttractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.state_strings().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reversal::time_reverse;
    use crate::trapspace::maximal_trap_spaces;

    #[test]
    fn negative_cycle() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = B\nB* = C\nC* = not A\n")?;
        let motifs = maximal_trap_spaces(&rules);
        let tr_motifs = maximal_trap_spaces(&time_reverse(&rules));
        assert!(motifs.is_empty());
        assert_eq!(
            tr_motifs,
            vec![
                rules.named_pattern(&[("A", false), ("B", true), ("C", false)])?,
                rules.named_pattern(&[("A", true), ("B", false), ("C", true)])?,
            ]
        );

        let stg = PartialStg::build(&rules, &Pattern::default(), &motifs, &tr_motifs);
        assert_eq!(stg.len(), 6);
        assert_eq!(stg.edge_count(), 6);
        assert_eq!(stg.pruned_count(), 2);
        assert!(!stg.contains(&tr_motifs[0]));

        let attractors = stg.attractors();
        assert_eq!(attractors.len(), 1);
        assert_eq!(
            format!("{}", attractors[0]),
            "[000, 001, 011, 100, 110, 111]"
        );
        assert!(stg.contains(&attractors[0].states()[0]));
        Ok(())
    }

    #[test]
    fn motifs_are_avoided() -> Result<(), MotifError> {
        // The oscillation of B and C is only possible while A=0, but A=1 is a stable motif
        let rules = RuleSystem::canonicalize("A* = A or (B and C)\nB* = not C\nC* = B\n")?;
        let motifs = maximal_trap_spaces(&rules);
        assert_eq!(motifs, vec![rules.named_pattern(&[("A", true)])?]);
        let tr_motifs = maximal_trap_spaces(&time_reverse(&rules));

        let stg = PartialStg::build(&rules, &Pattern::default(), &motifs, &tr_motifs);
        assert!(stg.attractors().is_empty());

        // Fixing A=0 keeps the oscillation
        let fixed = rules.named_pattern(&[("A", false)])?;
        let (reduced, _) = rules.percolate(&fixed);
        let stg = PartialStg::build(&reduced, &Pattern::default(), &[], &[]);
        let attractors = stg.attractors();
        assert_eq!(attractors.len(), 1);
        assert_eq!(attractors[0].len(), 4);
        Ok(())
    }

    #[test]
    fn fixed_nodes() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = not A\nB* = C\nC* = not B\n")?;
        let fixed = rules.named_pattern(&[("A", false)])?;
        let stg = PartialStg::build(&rules, &fixed, &[], &[]);

        // All states with A=0 can flip A
        assert!(stg.is_empty());
        assert_eq!(stg.pruned_count(), 4);
        Ok(())
    }
}
