use crate::{efmt, State, VarSet};
use std::fmt;

/// Common API for all Boolean rules.
///
/// This trait defines the API to evaluate and display Boolean rules
pub trait Rule {
    /// Display the rule using the selected formatter
    fn fmt_with(&self, f: &mut dyn efmt::ExprFormatter) -> fmt::Result;

    /// Evaluate the rule on the given state
    fn eval(&self, state: &State) -> bool;

    /// Add all regulators to the set of variables
    fn collect_regulators(&self, regulators: &mut VarSet);

    /// Construct the set of regulators
    fn get_regulators(&self) -> VarSet {
        let mut regulators = VarSet::default();
        self.collect_regulators(&mut regulators);
        regulators
    }

    /// Display the rule with default (unnamed) variables
    fn fmt_rule(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut ef = efmt::InfixFormatter::new(f);
        self.fmt_with(&mut ef)
    }
}
