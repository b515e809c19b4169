//! Find the attractor repertoire of Boolean networks using stable motifs and succession diagrams.
//!
//! A Boolean network associates an update rule to each node. The rules are stored as a [RuleSystem],
//! where each node is associated to the [prime implicants](Primes) of its two values. Rule systems
//! are parsed from a simple text format with one rule per line:
//!
//! ```
//! use motifkit::RuleSystem;
//! # use motifkit::MotifError;
//! # fn main() -> Result<(), MotifError> {
//!
//! let rules = RuleSystem::canonicalize("A* = B\nB* = A or C\nC* = not A\n")?;
//! assert_eq!(rules.len(), 3);
//!
//! // Constant rules and their consequences can be removed
//! let fixed = rules.named_pattern(&[("A", true)])?;
//! let (reduced, fixed) = rules.percolate(&fixed);
//! assert_eq!(format!("{}", reduced), "");
//! assert_eq!(format!("{}", fixed.named(rules.space())), "{A: 1, B: 1, C: 0}");
//! # Ok(())
//! # }
//! ```
//!
//! # Stable motifs
//!
//! A stable motif is a minimal [Pattern] which is a trap space of the network: once all its nodes reach the fixed
//! values, they can no longer change. Locking in a stable motif fixes its nodes and the nodes it controls, yielding
//! a [reduced network](MotifReduction). Each reduced network is classified according to the possibility of reaching
//! an attractor in which no further motif locks in ([Terminal]). When the motifs alone are not conclusive, a pruned
//! state transition graph of the reduced network is explored to find complex attractors.
//!
//! # Succession diagrams
//!
//! The [SuccessionDiagram] collects all reduced networks reachable by locking in stable motifs in sequence.
//! Reduced networks reached by several histories are only built once.
//!
//! ```
//! use motifkit::{RuleSystem, SuccessionDiagram, Terminal};
//! # use motifkit::MotifError;
//! # fn main() -> Result<(), MotifError> {
//!
//! let rules = RuleSystem::canonicalize("A* = A\nB* = not B or A\n")?;
//! let diagram = SuccessionDiagram::build(&rules);
//!
//! for reduction in diagram.attractor_candidates() {
//!     assert_eq!(reduction.terminal, Terminal::Yes);
//! }
//! println!("{}", diagram.attractor_candidate_summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Network reductions
//!
//! Nodes which do not regulate themselves can be removed by substituting their rule in the rules of their targets.
//! The [reduction] module provides such transformations, preserving the number of attractors.

mod config;
mod convert;
mod doi;
mod efmt;
mod error;
mod expr;
mod implicants;
mod motif;
mod network;
mod parse;
mod pattern;
mod primes;
pub mod reduction;
mod reversal;
mod rspace;
mod rules;
mod space;
mod states;
mod stg;
mod succession;
mod trapspace;
mod variable;

use std::fmt;

#[macro_use]
extern crate pest_derive;

// Export public structures and API
pub use config::{ReductionConfig, SuccessionConfig, DEFAULT_MAX_STG_SIZE};
pub use doi::{logical_domain_of_influence, single_drivers, DomainOfInfluence};
pub use error::MotifError;
pub use expr::{Expr, ExprNode, Operator};
pub use implicants::ImplicantSet;
pub use motif::{MotifReduction, OscillationSearch, Terminal};
pub use network::{minimize, InteractionGraph, PrimeRule, RuleSystem};
pub use pattern::Pattern;
pub use primes::Primes;
pub use reversal::time_reverse;
pub use rspace::{attractor_space_candidates, RestrictSpace};
pub use rules::Rule;
pub use space::VarSpace;
pub use states::State;
pub use stg::{ComplexAttractor, PartialStg, MAX_STG_NODES};
pub use succession::{SuccessionDiagram, SuccessionEdge};
pub use trapspace::maximal_trap_spaces;
pub use variable::{VarSet, Variable};

#[cfg(test)]
mod tests {
    pub fn init_logger() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }
}
