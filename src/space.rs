use crate::{parse::VariableParser, *};

use once_cell::sync::Lazy;
use regex::Regex;
use slab::Slab;
use std::collections::HashMap;
use std::fmt;

static RE_UID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z01-9_.]*$").unwrap());

/// A collection of named variables defining the state space of a network.
///
/// Adding a new name to the collection triggers the creation of a variable associated to a unique integer UID
/// (using successive UIDs for better scalability). Variables can then be used independently of the collection.
/// A request with an existing name allows to recover a variable with the same UID.
///
/// The collection is used to retrieve the name associated with existing variables, which is especially useful
/// to display rules and reports. All reduced rule systems derived from a network share the collection of
/// the original network.
///
/// ```
/// use motifkit::VarSpace;
/// # use motifkit::MotifError;
/// # fn main() -> Result<(), MotifError> {
///
/// let mut variables = VarSpace::default();
/// let v1 = variables.provide("A")?;
/// let v2 = variables.provide("B")?;
///
/// // Display a named variable
/// assert_eq!(format!("{}", variables.named(&v2)), "B");
///
/// // Parse an expression using named variables
/// let expr = variables.parse_expression("A & !B")?;
/// assert_eq!(format!("{}", variables.named(&expr)), "A & !B");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default, Debug)]
pub struct VarSpace {
    /// The list of variable names
    blocks: Slab<String>,

    /// Find a variable by name
    name2uid: HashMap<String, Variable>,
}

/// A named rule associates a rule to a variable collection to provide prettier display output
struct NamedRule<'a, R: Rule + ?Sized> {
    namer: &'a VarSpace,
    rule: &'a R,
}

impl VarSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve a named variable or create it if needed.
    ///
    /// If a variable with this name already exists, return it without any change in the collection.
    /// Otherwise, create a new Variable associated to the desired name.
    ///
    /// Returns an error if the name is invalid, in this case the collection is not modified.
    pub fn provide(&mut self, name: &str) -> Result<Variable, MotifError> {
        if let Some(var) = self.name2uid.get(name) {
            return Ok(*var);
        }

        // Reject invalid names
        if !RE_UID.is_match(name) {
            return Err(MotifError::InvalidName(name.into()));
        }

        // Create and insert the new block
        let var = self.blocks.insert(name.into()).into();
        self.name2uid.insert(name.into(), var);
        Ok(var)
    }

    /// Get the number of assigned Variables
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Return whether there are no variables in this collection
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Check if a variable is part of the collection
    pub fn contains(&self, var: Variable) -> bool {
        self.blocks.contains(var.uid())
    }

    /// Check if a name is part of the collection
    pub fn contains_name(&self, name: &str) -> bool {
        self.name2uid.contains_key(name)
    }

    /// Search a variable with the given name
    pub fn get(&self, name: &str) -> Option<Variable> {
        self.name2uid.get(name).copied()
    }

    /// Search a variable with the given name
    pub fn get_or_err(&self, name: &str) -> Result<Variable, MotifError> {
        self.get(name)
            .ok_or_else(|| MotifError::NoSuchVariableName(name.into()))
    }

    /// Retrieve the name of a variable, or a generic UID-based name if it is not part of the collection.
    pub fn name(&self, var: Variable) -> String {
        match self.blocks.get(var.uid()) {
            Some(s) => s.clone(),
            None => format!("{}", var),
        }
    }

    /// Assign a new name to a variable.
    ///
    /// Returns an error if the variable is not part of the collection or if the new name
    /// is either invalid or already associated to another variable.
    pub fn set_name(&mut self, v: Variable, name: &str) -> Result<Variable, MotifError> {
        if !self.contains(v) {
            return Err(MotifError::NoSuchVariable(v));
        }

        // Reject invalid names
        if !RE_UID.is_match(name) {
            return Err(MotifError::InvalidName(name.into()));
        }

        // Detect conflicts or unchanged names
        if let Some(existing) = self.get(name) {
            if existing == v {
                return Ok(v);
            }
            return Err(MotifError::ConflictingName(String::from(name)));
        }

        let old_name = &mut self.blocks[v.uid()];
        self.name2uid.remove(old_name.as_str());
        self.name2uid.insert(name.into(), v);
        *old_name = name.into();
        Ok(v)
    }

    /// Parse an expression using only existing variable names
    pub fn parse_expression(&self, s: &str) -> Result<Expr, MotifError> {
        StrictParser(self).parse_expression(s)
    }

    /// Parse an expression and create new variables as needed
    ///
    /// Returns an error if the text is not a valid expression, and in particular
    /// if some variable names are invalid
    pub fn parse_expression_extend(&mut self, s: &str) -> Result<Expr, MotifError> {
        ExtendingParser(self).parse_expression(s)
    }

    /// Apply variable names from this collection to a rule.
    ///
    /// This operation is only useful to display rules (especially expressions) or variables.
    ///
    /// It accepts rules with variables which are not part of the collection.
    /// In this case, valid variables will be associated to their name in the collection,
    /// while missing variables will receive their default UID-based name.
    pub fn named<'a, R: Rule + ?Sized>(&'a self, rule: &'a R) -> impl fmt::Display + 'a {
        NamedRule { namer: self, rule }
    }

    /// Insert the name of a variable during a display operation.
    pub fn format_variable(&self, f: &mut fmt::Formatter, var: Variable) -> fmt::Result {
        match self.blocks.get(var.uid()) {
            None => write!(f, "{}", var),
            Some(s) => write!(f, "{}", s),
        }
    }

    /// Sort a collection of variables by name
    pub fn sorted_by_name(&self, variables: impl IntoIterator<Item = Variable>) -> Vec<Variable> {
        let mut result: Vec<Variable> = variables.into_iter().collect();
        result.sort_by_cached_key(|v| self.name(*v));
        result
    }

    /// Iterate on all variables of this collection
    pub fn iter(&self) -> impl Iterator<Item = Variable> + '_ {
        self.blocks.iter().map(|(idx, _)| Variable::from(idx))
    }

    /// Check that a rule uses only variables included in this collection
    pub fn check_rule(&self, rule: &dyn Rule) -> Result<(), MotifError> {
        let regulators = rule.get_regulators();
        for i in regulators.iter() {
            if !self.contains(i) {
                return Err(MotifError::NoSuchVariable(i));
            }
        }
        Ok(())
    }
}

impl<R: Rule + ?Sized> fmt::Display for NamedRule<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ef = efmt::InfixFormatter::named(f, self.namer);
        self.rule.fmt_with(&mut ef)
    }
}

/// Parse expressions without extending the collection
struct StrictParser<'a>(&'a VarSpace);

/// Parse expressions, adding unknown names to the collection
pub(crate) struct ExtendingParser<'a>(pub(crate) &'a mut VarSpace);

impl VariableParser for StrictParser<'_> {
    fn parse_variable(&mut self, s: &str) -> Result<Variable, MotifError> {
        self.0.get_or_err(s)
    }
}

impl VariableParser for ExtendingParser<'_> {
    fn parse_variable(&mut self, s: &str) -> Result<Variable, MotifError> {
        self.0.provide(s)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn name_management() -> Result<(), MotifError> {
        let mut vs = VarSpace::default();
        let a = vs.provide("test")?;
        assert_eq!(a.uid(), 0);
        assert_eq!(vs.provide("test")?, a);
        assert!(vs.provide("3test").is_err());
        assert!(vs.provide("te%t").is_err());

        let b = vs.provide("other")?;
        assert_eq!(vs.set_name(b, "test"), Err(MotifError::ConflictingName("test".into())));
        vs.set_name(b, "renamed")?;
        assert_eq!(vs.get("renamed"), Some(b));
        assert!(vs.get("other").is_none());
        assert_eq!(vs.name(b), "renamed");
        assert_eq!(vs.sorted_by_name([a, b]), vec![b, a]);

        Ok(())
    }

    #[test]
    fn check_rule() -> Result<(), MotifError> {
        let mut uids = VarSpace::default();

        let v0 = uids.provide("a")?;
        let v1 = uids.provide("b")?;

        let expr = v0 | v1;
        assert!(uids.check_rule(&expr).is_ok());

        let v5 = Variable::from(5);
        let expr = v0 | (v1 & v5);
        assert!(uids.check_rule(&expr).is_err());

        Ok(())
    }
}
