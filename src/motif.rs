//! Reduced networks obtained by locking in stable motifs: the nodes of a succession diagram

use crate::config::ReductionConfig;
use crate::efmt::LOWERCASE_FMT_CFG;
use crate::reversal::time_reverse;
use crate::rspace::{attractor_space_candidates, RestrictSpace};
use crate::stg::{ComplexAttractor, PartialStg, MAX_STG_NODES};
use crate::trapspace::maximal_trap_spaces;
use crate::*;

use itertools::Itertools;

/// Does a reduced network contain attractors which lock in no further stable motif?
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terminal {
    /// At least one more stable motif must lock in
    No,
    /// Some attractor may avoid all stable motifs
    Possible,
    /// The reduced network contains an attractor avoiding all stable motifs
    Yes,
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::No => write!(f, "no"),
            Terminal::Possible => write!(f, "possible"),
            Terminal::Yes => write!(f, "yes"),
        }
    }
}

/// Outcome of the search for complex attractors avoiding all stable motifs
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OscillationSearch {
    /// The terminal status was decided without exploring states
    NotNeeded,
    /// The exploration was needed but disabled: the terminal status is not proven
    Skipped,
    /// The pruned state transition graph was explored
    Completed(Vec<ComplexAttractor>),
    /// The reduced network was too large to explore its states
    SizeLimited { size: usize, limit: usize },
}

/// A reduced network with its stable motifs and terminal status.
#[derive(Clone, Debug)]
pub struct MotifReduction {
    /// Stable motifs locked in to obtain this reduced network, in order
    pub motif_history: Vec<Pattern>,
    /// Other motif histories leading to the same reduced network
    pub merged_history_permutations: Vec<Vec<Pattern>>,
    /// All nodes fixed by the motif history and their percolation
    pub logically_fixed_nodes: Pattern,
    pub reduced_primes: RuleSystem,
    pub time_reverse_primes: RuleSystem,
    pub stable_motifs: Vec<Pattern>,
    pub time_reverse_stable_motifs: Vec<Pattern>,
    /// Combined motifs fixing all source nodes at once
    pub merged_source_motifs: Option<Vec<Pattern>>,
    /// Stable motifs which are not the value of a source node
    pub source_independent_motifs: Option<Vec<Pattern>>,
    pub rspace: RestrictSpace,
    /// Nodes fixed in all attractors avoiding the stable motifs
    pub fixed_rspace_nodes: Option<Pattern>,
    pub rspace_constraint: Option<Expr>,
    /// The restrict space constraint after fixing the rspace nodes
    pub reduced_rspace_constraint: Option<Expr>,
    /// Rules of the reduced network after fixing the rspace nodes
    pub rspace_update_primes: Option<RuleSystem>,
    /// Functions which are constant on each attractor
    pub conserved_functions: Option<Vec<Expr>>,
    pub partial_stg: Option<PartialStg>,
    pub terminal: Terminal,
    pub oscillation: OscillationSearch,
}

impl MotifReduction {
    /// Analyse a reduced network reached after locking in a list of stable motifs.
    ///
    /// The stable motifs of the network and of its time reversal are computed, source motifs are
    /// merged at the root if enabled, and the terminal status is decided, using a partial state
    /// transition graph if needed.
    pub fn new(
        motif_history: Vec<Pattern>,
        fixed: Pattern,
        reduced_primes: RuleSystem,
        config: &ReductionConfig,
    ) -> Self {
        let time_reverse_primes = time_reverse(&reduced_primes);
        let stable_motifs = maximal_trap_spaces(&reduced_primes);
        let time_reverse_stable_motifs = maximal_trap_spaces(&time_reverse_primes);
        let rspace = RestrictSpace::from_motifs(&stable_motifs, &reduced_primes);

        let mut reduction = MotifReduction {
            motif_history,
            merged_history_permutations: vec![],
            logically_fixed_nodes: fixed,
            reduced_primes,
            time_reverse_primes,
            stable_motifs,
            time_reverse_stable_motifs,
            merged_source_motifs: None,
            source_independent_motifs: None,
            rspace,
            fixed_rspace_nodes: None,
            rspace_constraint: None,
            reduced_rspace_constraint: None,
            rspace_update_primes: None,
            conserved_functions: None,
            partial_stg: None,
            terminal: Terminal::No,
            oscillation: OscillationSearch::NotNeeded,
        };

        if reduction.motif_history.is_empty() && config.prioritize_source_motifs {
            reduction.merge_source_motifs();
        }
        if reduction.classify() {
            match config.search_partial_stgs {
                true => reduction.search_oscillations(config),
                false => reduction.oscillation = OscillationSearch::Skipped,
            }
        }
        log::debug!(
            "Reduction with {} nodes and {} stable motifs: terminal={}",
            reduction.reduced_primes.len(),
            reduction.stable_motifs.len(),
            reduction.terminal
        );
        reduction
    }

    /// Replace the motifs of source nodes by one motif per combination of source values.
    ///
    /// A single node stable motif which is also a time-reverse stable motif corresponds to a source node.
    fn merge_source_motifs(&mut self) {
        let tr_motifs = &self.time_reverse_stable_motifs;
        let (source_motifs, independent): (Vec<Pattern>, Vec<Pattern>) = self
            .stable_motifs
            .iter()
            .cloned()
            .partition(|m| m.len() == 1 && tr_motifs.contains(m));
        if source_motifs.is_empty() {
            return;
        }

        let sources = self.reduced_primes.space().sorted_by_name(
            source_motifs
                .iter()
                .filter_map(|m| m.fixed_variables().first())
                .unique(),
        );
        let merged: Vec<Pattern> = sources
            .iter()
            .map(|_| [false, true])
            .multi_cartesian_product()
            .map(|values| sources.iter().copied().zip(values).collect())
            .collect();
        log::debug!(
            "Merged the motifs of {} source nodes into {} motifs",
            sources.len(),
            merged.len()
        );
        self.merged_source_motifs = Some(merged);
        self.source_independent_motifs = Some(independent);
    }

    /// Decide the terminal status from the motifs and the restrict space.
    ///
    /// Return true if the partial state transition graph should be explored.
    fn classify(&mut self) -> bool {
        let has_motifs = !self.stable_motifs.is_empty();
        if self.merged_source_motifs.is_some() {
            self.terminal = Terminal::No;
            return false;
        }
        if !has_motifs {
            self.terminal = Terminal::Yes;
            return !self.reduced_primes.is_empty();
        }

        match &self.rspace {
            RestrictSpace::Unsatisfiable => {
                self.terminal = Terminal::No;
                false
            }
            RestrictSpace::Unconstrained => {
                self.terminal = Terminal::Possible;
                true
            }
            RestrictSpace::Constraint(_) => {
                let fixed = match self.rspace.fixed_nodes(&self.reduced_primes) {
                    None => {
                        self.terminal = Terminal::No;
                        return false;
                    }
                    Some(fixed) => fixed,
                };
                if self.stable_motifs.iter().any(|m| m.contains(&fixed)) {
                    self.terminal = Terminal::No;
                    self.fixed_rspace_nodes = Some(fixed);
                    return false;
                }

                self.terminal = Terminal::Possible;
                let constraint = self.rspace.constraint();
                self.reduced_rspace_constraint = Some(constraint.restrict_to_subspace(&fixed));
                self.rspace_constraint = Some(constraint);
                self.rspace_update_primes = Some(self.reduced_primes.percolate(&fixed).0);
                self.fixed_rspace_nodes = Some(fixed);
                true
            }
        }
    }

    fn search_oscillations(&mut self, config: &ReductionConfig) {
        let size = self.reduced_primes.len();
        let limit = config.max_stg_size.min(MAX_STG_NODES);
        if size > limit {
            log::warn!(
                "The state transition graph is too large ({} nodes, limit {}): giving up",
                size,
                limit
            );
            self.oscillation = OscillationSearch::SizeLimited { size, limit };
            return;
        }

        let fixed = self.fixed_rspace_nodes.clone().unwrap_or_default();
        let stg = PartialStg::build(
            &self.reduced_primes,
            &fixed,
            &self.stable_motifs,
            &self.time_reverse_stable_motifs,
        );
        let attractors = stg.attractors();
        if attractors.is_empty() {
            self.terminal = Terminal::No;
        } else {
            self.terminal = Terminal::Yes;
            self.conserved_functions = Some(attractor_space_candidates(
                &self.stable_motifs,
                &self.time_reverse_stable_motifs,
            ));
        }
        self.partial_stg = Some(stg);
        self.oscillation = OscillationSearch::Completed(attractors);
    }

    /// The motifs used to build the children of this reduction in a succession diagram
    pub fn branch_motifs(&self) -> Vec<Pattern> {
        match (&self.merged_source_motifs, &self.source_independent_motifs) {
            (Some(merged), Some(independent)) => {
                merged.iter().chain(independent.iter()).cloned().collect()
            }
            _ => self.stable_motifs.clone(),
        }
    }

    /// The complex attractors avoiding all stable motifs, if they were searched
    pub fn no_motif_attractors(&self) -> Option<&[ComplexAttractor]> {
        match &self.oscillation {
            OscillationSearch::Completed(attractors) => Some(attractors),
            _ => None,
        }
    }

    /// The collection of named variables used by the rules
    pub fn space(&self) -> &VarSpace {
        self.reduced_primes.space()
    }

    /// A human-readable report on this reduction
    pub fn summary(&self) -> impl fmt::Display + '_ {
        ReductionSummary(self)
    }
}

/// Write a list of patterns with node names: ```[{A: 1}, {B: 0}]```
pub(crate) fn fmt_patterns(
    f: &mut fmt::Formatter<'_>,
    patterns: &[Pattern],
    space: &VarSpace,
) -> fmt::Result {
    write!(f, "[")?;
    for (i, p) in patterns.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", p.named(space))?;
    }
    write!(f, "]")
}

struct ReductionSummary<'a>(&'a MotifReduction);

impl fmt::Display for ReductionSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        let space = r.space();

        write!(f, "Motif history: ")?;
        fmt_patterns(f, &r.motif_history, space)?;
        writeln!(f, "\n")?;
        writeln!(
            f,
            "Logically fixed nodes: {}\n",
            r.logically_fixed_nodes.named(space)
        )?;
        match r.motif_history.is_empty() {
            true => writeln!(f, "Original update rules:")?,
            false => writeln!(f, "Reduced update rules:")?,
        }
        writeln!(f, "{}", r.reduced_primes)?;

        match r.terminal {
            Terminal::No => match (&r.merged_source_motifs, &r.source_independent_motifs) {
                (Some(merged), Some(independent)) => {
                    let sources = merged
                        .first()
                        .map(|m| {
                            let names: Vec<String> = m
                                .iter_fixed_values()
                                .map(|(v, _)| space.name(v))
                                .sorted()
                                .collect();
                            names.join(", ")
                        })
                        .unwrap_or_default();
                    writeln!(
                        f,
                        "Source node values are not yet specified for the following nodes: {}\n",
                        sources
                    )?;
                    if independent.is_empty() {
                        writeln!(f, "There are no source-independent stable motifs.")?;
                    } else {
                        write!(
                            f,
                            "The following stable motifs exist independently \
                             of the source configuration: "
                        )?;
                        fmt_patterns(f, independent, space)?;
                        writeln!(f)?;
                    }
                }
                _ => {
                    writeln!(f, "At least one additional stable motif must stabilize.\n")?;
                    write!(f, "Stable motifs: ")?;
                    fmt_patterns(f, &r.stable_motifs, space)?;
                    writeln!(f)?;
                }
            },
            Terminal::Yes => match r.reduced_primes.is_empty() {
                true => writeln!(f, "This branch terminates in a steady state.")?,
                false => {
                    writeln!(
                        f,
                        "There is a complex attractor in this reduced system \
                         in which no additional stable motifs activate."
                    )?;
                    let names: Vec<String> = r
                        .reduced_primes
                        .sorted_nodes()
                        .into_iter()
                        .map(|v| space.name(v))
                        .collect();
                    writeln!(
                        f,
                        "At least some of the following must oscillate in such an attractor: {}",
                        names.join(", ")
                    )?;
                }
            },
            Terminal::Possible => {
                write!(f, "Some or none of these stable motifs may stabilize: ")?;
                fmt_patterns(f, &r.stable_motifs, space)?;
                writeln!(f)?;
                if let Some(fixed) = &r.fixed_rspace_nodes {
                    writeln!(
                        f,
                        "\nIf no more stable motifs stabilize, these node states must be fixed: {}",
                        fixed.named(space)
                    )?;
                    if let Some(constraint) = &r.reduced_rspace_constraint {
                        writeln!(
                            f,
                            "\nIn addition, the following must stabilize to TRUE:\n{}",
                            LOWERCASE_FMT_CFG.infix(constraint, Some(space))
                        )?;
                    }
                    if let Some(rules) = &r.rspace_update_primes {
                        write!(
                            f,
                            "\nIn this case, the unfixed nodes update \
                             according to the following rules:\n{}",
                            rules
                        )?;
                    }
                }
            }
        }

        match &r.oscillation {
            OscillationSearch::SizeLimited { size, limit } => writeln!(
                f,
                "\nThe state transition graph is too large to be explored ({} nodes, limit {}).",
                size, limit
            )?,
            OscillationSearch::Skipped => {
                writeln!(f, "\nThe state transition graph was not explored.")?
            }
            _ => (),
        }

        if let Some(conserved) = &r.conserved_functions {
            if conserved.is_empty() {
                writeln!(
                    f,
                    "\nUnable to find non-trivial conserved functions \
                     for attractors in this branch."
                )?;
            } else {
                writeln!(
                    f,
                    "\nFound the following functions that are constant \
                     on attractors in this branch:"
                )?;
                for function in conserved {
                    writeln!(f, "{}", LOWERCASE_FMT_CFG.infix(function, Some(space)))?;
                }
            }
            if let Some(attractors) = r.no_motif_attractors() {
                if !attractors.is_empty() {
                    writeln!(
                        f,
                        "\nFound the following complex attractors \
                         that do not lock in additional stable motifs:"
                    )?;
                    for attractor in attractors {
                        writeln!(f, "{}", attractor)?;
                    }
                }
            }
        }

        if !r.merged_history_permutations.is_empty() {
            writeln!(
                f,
                "\nThis branch contains the following motif history permutation(s):"
            )?;
            for history in &r.merged_history_permutations {
                fmt_patterns(f, history, space)?;
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(text: &str, config: &ReductionConfig) -> Result<MotifReduction, MotifError> {
        crate::tests::init_logger();
        let rules = RuleSystem::canonicalize(text)?;
        let (reduced, fixed) = rules.percolate(&Pattern::default());
        Ok(MotifReduction::new(vec![], fixed, reduced, config))
    }

    #[test]
    fn oscillating_cycle() -> Result<(), MotifError> {
        let reduction = root("A* = B\nB* = C\nC* = not A\n", &ReductionConfig::new())?;
        assert!(reduction.stable_motifs.is_empty());
        assert_eq!(reduction.time_reverse_stable_motifs.len(), 2);
        assert_eq!(reduction.terminal, Terminal::Yes);

        let attractors = reduction.no_motif_attractors().unwrap_or_default();
        assert_eq!(attractors.len(), 1);
        assert_eq!(attractors[0].len(), 6);
        assert_eq!(reduction.conserved_functions.as_ref().map(|c| c.len()), Some(2));
        let summary = format!("{}", reduction.summary());
        assert!(summary.contains("must oscillate in such an attractor: A, B, C"));

        // Too large for the search: the cycle remains terminal but without any attractor
        let config = ReductionConfig::new().with_max_stg_size(2);
        let reduction = root("A* = B\nB* = C\nC* = not A\n", &config)?;
        assert_eq!(reduction.terminal, Terminal::Yes);
        assert_eq!(
            reduction.oscillation,
            OscillationSearch::SizeLimited { size: 3, limit: 2 }
        );
        assert!(reduction.partial_stg.is_none());
        Ok(())
    }

    #[test]
    fn steady_state() -> Result<(), MotifError> {
        let reduction = root("A* = 1\nB* = A\nC* = not B\n", &ReductionConfig::new())?;
        assert!(reduction.reduced_primes.is_empty());
        assert_eq!(reduction.logically_fixed_nodes.len(), 3);
        assert_eq!(reduction.terminal, Terminal::Yes);
        assert_eq!(reduction.oscillation, OscillationSearch::NotNeeded);
        assert!(format!("{}", reduction.summary()).contains("terminates in a steady state"));
        Ok(())
    }

    #[test]
    fn source_motifs() -> Result<(), MotifError> {
        let text = "A* = A\nB* = B\nC* = A and B\n";
        let reduction = root(text, &ReductionConfig::new())?;
        assert_eq!(reduction.stable_motifs.len(), 4);
        assert_eq!(reduction.terminal, Terminal::No);
        assert_eq!(reduction.source_independent_motifs, Some(vec![]));

        let rules = &reduction.reduced_primes;
        let merged = reduction.merged_source_motifs.clone().unwrap_or_default();
        assert_eq!(
            merged,
            vec![
                rules.named_pattern(&[("A", false), ("B", false)])?,
                rules.named_pattern(&[("A", false), ("B", true)])?,
                rules.named_pattern(&[("A", true), ("B", false)])?,
                rules.named_pattern(&[("A", true), ("B", true)])?,
            ]
        );
        assert_eq!(reduction.branch_motifs(), merged);
        assert!(format!("{}", reduction.summary())
            .contains("Source node values are not yet specified for the following nodes: A, B"));

        // Without merging, the four single node motifs lead to the branches
        let reduction = root(text, &ReductionConfig::new().with_source_merging(false))?;
        assert!(reduction.merged_source_motifs.is_none());
        assert_eq!(reduction.branch_motifs(), reduction.stable_motifs);
        assert_eq!(reduction.terminal, Terminal::No);
        Ok(())
    }

    #[test]
    fn restrict_space_rules_out_oscillations() -> Result<(), MotifError> {
        // B oscillates and B=1 drives the motif A=1
        let reduction = root("A* = A or B\nB* = not B\n", &ReductionConfig::new())?;
        let rules = &reduction.reduced_primes;
        assert_eq!(reduction.stable_motifs, vec![rules.named_pattern(&[("A", true)])?]);
        assert!(matches!(reduction.rspace, RestrictSpace::Constraint(_)));
        assert_eq!(reduction.fixed_rspace_nodes, None);
        assert_eq!(reduction.terminal, Terminal::No);
        assert_eq!(reduction.oscillation, OscillationSearch::NotNeeded);
        assert!(reduction.no_motif_attractors().is_none());
        Ok(())
    }

    #[test]
    fn drivers_decide_without_states() -> Result<(), MotifError> {
        let text = "A* = B\nB* = A\n";
        let config = ReductionConfig::new().with_stg_search(false);
        let reduction = root(text, &config)?;
        assert_eq!(reduction.stable_motifs.len(), 2);
        assert_eq!(reduction.rspace, RestrictSpace::Unsatisfiable);
        assert_eq!(reduction.terminal, Terminal::No);
        assert_eq!(reduction.oscillation, OscillationSearch::NotNeeded);

        let reduction = root(text, &ReductionConfig::new().with_max_stg_size(1))?;
        assert_eq!(reduction.terminal, Terminal::No);
        assert_eq!(reduction.oscillation, OscillationSearch::NotNeeded);
        Ok(())
    }

    #[test]
    fn skipped_search_is_reported() -> Result<(), MotifError> {
        let config = ReductionConfig::new().with_stg_search(false);
        let reduction = root("A* = B\nB* = C\nC* = not A\n", &config)?;
        assert_eq!(reduction.terminal, Terminal::Yes);
        assert_eq!(reduction.oscillation, OscillationSearch::Skipped);
        assert!(reduction.no_motif_attractors().is_none());
        assert!(format!("{}", reduction.summary())
            .contains("The state transition graph was not explored."));
        Ok(())
    }

    #[test]
    fn oscillation_next_to_a_motif() -> Result<(), MotifError> {
        let text = "A* = A or (B and not C and D)\nB* = C\nC* = D\nD* = not B\n";
        let reduction = root(text, &ReductionConfig::new())?;
        let rules = &reduction.reduced_primes;
        assert_eq!(reduction.stable_motifs, vec![rules.named_pattern(&[("A", true)])?]);
        assert_eq!(reduction.time_reverse_stable_motifs.len(), 3);
        assert_eq!(reduction.terminal, Terminal::Yes);

        let attractors = reduction.no_motif_attractors().unwrap_or_default();
        assert_eq!(attractors.len(), 1);
        assert_eq!(
            format!("{}", attractors[0]),
            "[0000, 0001, 0011, 0100, 0110, 0111]"
        );

        // Without state exploration, the status remains undecided
        let config = ReductionConfig::new().with_stg_search(false);
        let reduction = root(text, &config)?;
        assert_eq!(reduction.terminal, Terminal::Possible);
        assert_eq!(reduction.oscillation, OscillationSearch::Skipped);
        let summary = format!("{}", reduction.summary());
        assert!(summary.contains("these node states must be fixed: {A: 0}"));
        Ok(())
    }
}
