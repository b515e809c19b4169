//! Succession diagrams: all reduced networks obtained by locking in stable motifs in sequence

use crate::config::SuccessionConfig;
use crate::motif::{fmt_patterns, MotifReduction, Terminal};
use crate::*;

use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const SEPARATOR: &str = "__________________";

/// A transition between two reduced networks of a succession diagram, labelled by the locked in motif
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuccessionEdge {
    pub parent: usize,
    pub child: usize,
    pub motif: Pattern,
}

/// The directed acyclic graph of reduced networks obtained by locking in stable motifs.
///
/// Reductions are stored in an arena and identified by their index, the root network has index 0.
/// Reductions reached by several motif histories are built once: the alternative histories
/// are recorded in [MotifReduction::merged_history_permutations].
/// The reductions which are not known to lead to another stable motif are attractor candidates.
#[derive(Clone, Debug)]
pub struct SuccessionDiagram {
    config: SuccessionConfig,
    reductions: Vec<MotifReduction>,
    edges: Vec<SuccessionEdge>,
    index: HashMap<Pattern, usize>,
}

impl SuccessionDiagram {
    fn empty(config: SuccessionConfig) -> Self {
        Self {
            config,
            reductions: vec![],
            edges: vec![],
            index: HashMap::new(),
        }
    }

    /// Build the succession diagram of a rule system with the default configuration
    pub fn build(rules: &RuleSystem) -> Self {
        Self::build_with(rules, SuccessionConfig::default())
    }

    /// Build the succession diagram of a rule system.
    ///
    /// With the `parallel` feature, the branches of the root network are built on a worker pool
    /// and merged in motif order.
    pub fn build_with(rules: &RuleSystem, config: SuccessionConfig) -> Self {
        let mut diagram = Self::empty(config);
        let root = MotifReduction::new(
            vec![],
            Pattern::default(),
            rules.clone(),
            &diagram.config.reduction,
        );
        let root = diagram.register(root);
        let motifs = diagram.reductions[root].branch_motifs();

        #[cfg(not(feature = "parallel"))]
        for motif in motifs {
            let (history, fixed, reduced) = diagram.child(root, &motif);
            diagram.expand(Some((root, motif)), history, fixed, reduced);
        }

        #[cfg(feature = "parallel")]
        {
            let parent = &diagram.reductions[root];
            let config = &diagram.config;
            let branches: Vec<(Pattern, SuccessionDiagram)> = motifs
                .into_par_iter()
                .map(|motif| {
                    let (history, fixed, reduced) = child_of(parent, &motif);
                    let mut branch = SuccessionDiagram::empty(config.clone());
                    branch.expand(None, history, fixed, reduced);
                    (motif, branch)
                })
                .collect();
            for (motif, branch) in branches {
                diagram.merge_branch(root, motif, branch);
            }
        }

        log::info!(
            "Succession diagram with {} reductions and {} attractor candidates",
            diagram.len(),
            diagram.attractor_candidates().count()
        );
        diagram
    }

    fn register(&mut self, reduction: MotifReduction) -> usize {
        let idx = self.reductions.len();
        self.index.insert(reduction.logically_fixed_nodes.clone(), idx);
        self.reductions.push(reduction);
        idx
    }

    fn child(&self, parent: usize, motif: &Pattern) -> (Vec<Pattern>, Pattern, RuleSystem) {
        child_of(&self.reductions[parent], motif)
    }

    /// Record an edge and an alternative motif history towards an existing reduction
    fn link(&mut self, parent: usize, child: usize, motif: Pattern) {
        let mut history = self.reductions[parent].motif_history.clone();
        history.push(motif.clone());
        let reduction = &mut self.reductions[child];
        if reduction.motif_history != history
            && !reduction.merged_history_permutations.contains(&history)
        {
            reduction.merged_history_permutations.push(history);
        }
        self.edges.push(SuccessionEdge {
            parent,
            child,
            motif,
        });
    }

    fn expand(
        &mut self,
        parent: Option<(usize, Pattern)>,
        history: Vec<Pattern>,
        fixed: Pattern,
        rules: RuleSystem,
    ) {
        if let Some(idx) = self.index.get(&fixed).copied() {
            log::trace!("Reached a known reduction: {}", idx);
            if let Some((p, motif)) = parent {
                self.link(p, idx, motif);
            }
            return;
        }

        let reduction = MotifReduction::new(history, fixed, rules, &self.config.reduction);
        let idx = self.register(reduction);
        if let Some((p, motif)) = parent {
            self.link(p, idx, motif);
        }

        for motif in self.reductions[idx].branch_motifs() {
            let (history, fixed, reduced) = self.child(idx, &motif);
            self.expand(Some((idx, motif)), history, fixed, reduced);
        }
    }

    /// Merge a sub-diagram built separately from a child of the given reduction.
    ///
    /// Reductions already present in this diagram are not duplicated, edges leaving them
    /// in the branch are ignored as they are already known.
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    fn merge_branch(&mut self, parent: usize, motif: Pattern, branch: SuccessionDiagram) {
        let mut mapping = Vec::with_capacity(branch.reductions.len());
        let mut known = Vec::with_capacity(branch.reductions.len());
        for mut reduction in branch.reductions {
            match self.index.get(&reduction.logically_fixed_nodes).copied() {
                Some(idx) => {
                    mapping.push(idx);
                    known.push(true);
                }
                None => {
                    reduction.merged_history_permutations.clear();
                    mapping.push(self.register(reduction));
                    known.push(false);
                }
            }
        }

        if let Some(first) = mapping.first().copied() {
            self.link(parent, first, motif);
        }
        for edge in branch.edges {
            if !known[edge.parent] {
                self.link(mapping[edge.parent], mapping[edge.child], edge.motif);
            }
        }
    }

    /// Number of reductions in the diagram
    pub fn len(&self) -> usize {
        self.reductions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reductions.is_empty()
    }

    pub fn config(&self) -> &SuccessionConfig {
        &self.config
    }

    /// The root network
    pub fn root(&self) -> Option<&MotifReduction> {
        self.reductions.first()
    }

    pub fn get(&self, idx: usize) -> Option<&MotifReduction> {
        self.reductions.get(idx)
    }

    /// All reductions in the order of their construction
    pub fn reductions(&self) -> &[MotifReduction] {
        &self.reductions
    }

    pub fn edges(&self) -> &[SuccessionEdge] {
        &self.edges
    }

    /// Find the reduction associated to a set of logically fixed nodes
    pub fn find(&self, fixed: &Pattern) -> Option<usize> {
        self.index.get(fixed).copied()
    }

    /// Iterate over the children of a reduction with the corresponding motif
    pub fn children(&self, idx: usize) -> impl Iterator<Item = (usize, &Pattern)> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.parent == idx)
            .map(|e| (e.child, &e.motif))
    }

    /// Reductions which may contain attractors locking in no further motif
    pub fn attractor_candidates(&self) -> impl Iterator<Item = &MotifReduction> + '_ {
        self.reductions
            .iter()
            .filter(|r| r.terminal != Terminal::No)
    }

    /// The logically fixed nodes of all attractor candidates
    pub fn attractor_fixed_nodes(&self) -> Vec<&Pattern> {
        self.attractor_candidates()
            .map(|r| &r.logically_fixed_nodes)
            .collect()
    }

    /// Report on all reductions, or on the reductions with one of the selected terminal status
    pub fn summary<'a>(&'a self, filter: Option<&'a [Terminal]>) -> impl fmt::Display + 'a {
        DiagramSummary {
            diagram: self,
            filter,
        }
    }

    /// Report on the attractor candidates
    pub fn attractor_candidate_summary(&self) -> impl fmt::Display + '_ {
        CandidateSummary(self)
    }
}

/// Lock in a motif in a reduction: the motif history, all fixed nodes and the reduced rules of the child
fn child_of(parent: &MotifReduction, motif: &Pattern) -> (Vec<Pattern>, Pattern, RuleSystem) {
    let (reduced, percolated) = parent.reduced_primes.reduce(motif);
    let mut fixed = parent.logically_fixed_nodes.clone();
    fixed.update(&percolated);
    let mut history = parent.motif_history.clone();
    history.push(motif.clone());
    (history, fixed, reduced)
}

struct DiagramSummary<'a> {
    diagram: &'a SuccessionDiagram,
    filter: Option<&'a [Terminal]>,
}

impl fmt::Display for DiagramSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for reduction in &self.diagram.reductions {
            if self
                .filter
                .map_or(true, |terminals| terminals.contains(&reduction.terminal))
            {
                writeln!(f, "{}", SEPARATOR)?;
                write!(f, "{}", reduction.summary())?;
            }
        }
        Ok(())
    }
}

struct CandidateSummary<'a>(&'a SuccessionDiagram);

impl fmt::Display for CandidateSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for reduction in self.0.attractor_candidates() {
            let space = reduction.space();
            writeln!(f, "{}", SEPARATOR)?;
            match reduction.terminal {
                Terminal::Possible => writeln!(f, "Space may contain attractor\n")?,
                _ => writeln!(f, "Space guaranteed to contain attractor(s)")?,
            }
            writeln!(
                f,
                "Logically fixed nodes: {}\n",
                reduction.logically_fixed_nodes.named(space)
            )?;
            if reduction.reduced_primes.is_empty() {
                writeln!(f, "No free nodes remain.")?;
                continue;
            }

            write!(f, "Reduced rules:\n{}", reduction.reduced_primes)?;
            if let Some(attractors) = reduction.no_motif_attractors() {
                let names: Vec<String> = reduction
                    .reduced_primes
                    .sorted_nodes()
                    .into_iter()
                    .map(|v| space.name(v))
                    .collect();
                writeln!(
                    f,
                    "\nComplex attractors in reduced network ({}):",
                    names.join(", ")
                )?;
                for attractor in attractors {
                    writeln!(f, "{}", attractor)?;
                }
            }
            if !reduction.merged_history_permutations.is_empty() {
                write!(
                    f,
                    "\nReached by {} motif histories, including ",
                    reduction.merged_history_permutations.len() + 1
                )?;
                fmt_patterns(f, &reduction.motif_history, space)?;
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReductionConfig;

    #[test]
    fn source_nodes() -> Result<(), MotifError> {
        crate::tests::init_logger();
        let rules = RuleSystem::canonicalize("A* = A\nB* = B\nC* = A and B\n")?;
        let diagram = SuccessionDiagram::build(&rules);

        assert_eq!(diagram.len(), 5);
        assert_eq!(diagram.edges().len(), 4);
        let root = &diagram.reductions()[0];
        assert_eq!(root.terminal, Terminal::No);
        assert_eq!(root.merged_source_motifs.as_ref().map(|m| m.len()), Some(4));

        for (child, motif) in diagram.children(0) {
            let reduction = &diagram.reductions()[child];
            assert_eq!(reduction.terminal, Terminal::Yes);
            assert!(reduction.reduced_primes.is_empty());
            assert_eq!(reduction.motif_history, vec![motif.clone()]);
            assert!(reduction.logically_fixed_nodes.is_fixed(rules.variable("C")?));
        }

        let candidates = diagram.attractor_fixed_nodes();
        assert_eq!(candidates.len(), 4);
        assert_eq!(
            candidates[3],
            &rules.named_pattern(&[("A", true), ("B", true), ("C", true)])?
        );

        let summary = format!("{}", diagram.attractor_candidate_summary());
        assert_eq!(summary.matches(SEPARATOR).count(), 4);
        assert!(summary.contains("Logically fixed nodes: {A: 0, B: 0, C: 0}"));
        assert!(summary.contains("No free nodes remain."));

        let summary = format!("{}", diagram.summary(Some(&[Terminal::No][..])));
        assert_eq!(summary.matches(SEPARATOR).count(), 1);
        Ok(())
    }

    #[test]
    fn oscillating_cycle() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = B\nB* = C\nC* = not A\n")?;
        let diagram = SuccessionDiagram::build(&rules);
        assert_eq!(diagram.len(), 1);
        assert!(diagram.edges().is_empty());
        assert_eq!(diagram.attractor_candidates().count(), 1);

        let summary = format!("{}", diagram.attractor_candidate_summary());
        assert!(summary.contains("Space guaranteed to contain attractor(s)"));
        assert!(summary.contains("Complex attractors in reduced network (A, B, C):"));
        assert!(summary.contains("[000, 001, 011, 100, 110, 111]"));
        Ok(())
    }

    #[test]
    fn shared_reductions() -> Result<(), MotifError> {
        let rules = RuleSystem::canonicalize("A* = A\nB* = B\n")?;
        let config = SuccessionConfig::from(ReductionConfig::new().with_source_merging(false));
        let diagram = SuccessionDiagram::build_with(&rules, config);

        // The root, four single motifs and four combinations reached in two orders
        assert_eq!(diagram.len(), 9);
        assert_eq!(diagram.edges().len(), 12);
        assert_eq!(diagram.attractor_candidates().count(), 4);

        let both = rules.named_pattern(&[("A", true), ("B", false)])?;
        let idx = diagram
            .find(&both)
            .ok_or_else(|| MotifError::InvalidPattern(format!("{}", both.named(rules.space()))))?;
        let reduction = &diagram.reductions()[idx];
        assert_eq!(reduction.terminal, Terminal::Yes);
        assert_eq!(
            reduction.motif_history,
            vec![
                rules.named_pattern(&[("A", true)])?,
                rules.named_pattern(&[("B", false)])?
            ]
        );
        assert_eq!(
            reduction.merged_history_permutations,
            vec![vec![
                rules.named_pattern(&[("B", false)])?,
                rules.named_pattern(&[("A", true)])?
            ]]
        );
        assert_eq!(diagram.children(idx).count(), 0);
        Ok(())
    }
}
