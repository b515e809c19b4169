use crate::variable::Iter;
use crate::{VarSet, Variable};
use std::fmt;
use std::iter::FromIterator;

/// A state defined by the set of active variables, the others are implicitly inactive.
///
/// Here states are defined as sets of all active variables (using bit-sets internally) and all other variables
/// are implicitly considered as inactive.
///
/// ```
/// use motifkit::{State, Variable};
///
/// let var = Variable::from(3);
///
/// let mut state = State::default();
/// state.activate(Variable::from(1));
/// state.activate(var);
/// state.disable(var);
///
/// assert_eq!(state.is_active(Variable::from(0)), false);
/// assert_eq!(state.is_active(Variable::from(1)), true);
/// assert_eq!(state.is_active(var), false);
/// ```
#[derive(Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct State {
    pub(crate) active: VarSet,
}

impl State {
    /// Activate the given variable in this state
    pub fn activate(&mut self, var: Variable) {
        self.active.insert(var);
    }

    /// Disable the given variable in this state
    pub fn disable(&mut self, var: Variable) {
        self.active.remove(var);
    }

    /// Set the value of a variable in this state
    pub fn set(&mut self, var: Variable, value: bool) {
        match value {
            true => self.activate(var),
            false => self.disable(var),
        }
    }

    /// Test if a specific variable is active in this state
    pub fn is_active(&self, var: Variable) -> bool {
        self.active.contains(var)
    }

    pub fn active(&self) -> &VarSet {
        &self.active
    }

    /// Iterate over the set of active variables
    pub fn iter_active(&self) -> Iter {
        self.active.iter()
    }

    /// Write this state as a string of 0 and 1 following the given variable order
    pub fn to_string_over(&self, variables: &[Variable]) -> String {
        variables
            .iter()
            .map(|v| if self.is_active(*v) { '1' } else { '0' })
            .collect()
    }
}

impl From<VarSet> for State {
    fn from(active: VarSet) -> Self {
        Self { active }
    }
}

impl FromIterator<Variable> for State {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        Self::from(VarSet::from_iter(iter))
    }
}

impl<'a> IntoIterator for &'a State {
    type Item = Variable;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.active.iter()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.active)
    }
}
