use crate::Variable;
use thiserror::Error;

/// Errors raised while building or transforming rule systems.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MotifError {
    /// The name is invalid
    #[error("The name '{0}' is invalid")]
    InvalidName(String),

    /// The name Conflicts
    #[error("The name '{0}' conflicts with an other variable")]
    ConflictingName(String),

    /// The name is not part of the set of variables
    #[error("There is no variable named '{0}'")]
    NoSuchVariableName(String),

    /// The variable is not part of the group
    #[error("There is no variable '{0}' in this group")]
    NoSuchVariable(Variable),

    /// The text does not describe a pattern
    #[error("Not a valid pattern: '{0}'")]
    InvalidPattern(String),

    /// The expression is invalid
    #[error("Not a valid expression")]
    InvalidExpression,

    /// A line of a rule file could not be parsed
    #[error("Invalid rule at line {line}: '{text}'")]
    InvalidRule { line: usize, text: String },

    /// The same node received two rules
    #[error("Node '{0}' has more than one rule")]
    DuplicateRule(String),

    /// Substitution is undefined for a node regulating itself
    #[error("Node '{0}' has a self-loop and cannot be deleted")]
    SelfLoop(String),

    /// The node has no rule in this system
    #[error("Node '{0}' is not part of the rule system")]
    MissingNode(String),
}
