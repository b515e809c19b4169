//! Formatting API for expressions

use crate::{Operator, Pattern, Rule, VarSpace, Variable};

use std::fmt;

pub struct FormatterConfig<'a> {
    s_and: &'a str,
    s_or: &'a str,
    s_not: &'a str,
}

pub static DEFAULT_FMT_CFG: FormatterConfig = FormatterConfig {
    s_and: "&",
    s_or: "|",
    s_not: "!",
};

/// Word operators, as used in BooleanNet rule files
pub static LOWERCASE_FMT_CFG: FormatterConfig = FormatterConfig {
    s_and: "and",
    s_or: "or",
    s_not: "not ",
};

pub struct InfixFormatted<'a, T: Rule + ?Sized> {
    rule: &'a T,
    cfg: &'a FormatterConfig<'a>,
    ovs: Option<&'a VarSpace>,
}

/// Define hooks to display separate parts of expressions.
///
/// The expression visits the inner tree and calls the hooks defined in this trait for each node and leaf.
///
/// A default formatter is implemented on top of [fmt::Formatter], additional formatters are used through
/// Rule wrappers overriding the Display trait.
pub trait ExprFormatter {
    /// Pass-through function calling an internal [fmt::Formatter].
    ///
    /// This function enables the use of the ```write!``` macro in other functions.
    fn write_fmt(&mut self, args: fmt::Arguments) -> fmt::Result;

    /// Write a fixed Boolean node
    fn write_bool(&mut self, b: bool) -> fmt::Result;

    /// Write a single variable, which can be negated
    fn write_variable(&mut self, var: Variable, value: bool) -> fmt::Result;

    /// Start writing an operation
    fn start_operation(
        &mut self,
        op: Operator,
        value: bool,
        parent: Option<Operator>,
    ) -> fmt::Result;

    /// Stop writing an operation
    fn end_operation(&mut self, op: Operator, value: bool, parent: Option<Operator>)
        -> fmt::Result;

    /// Separate operands in the ongoing operation
    fn sep_operation(&mut self, op: Operator) -> fmt::Result;

    /// Write a full pattern as the conjunction of its literals
    fn write_pattern(&mut self, p: &Pattern) -> fmt::Result {
        if p.is_empty() {
            return self.write_bool(true);
        }

        self.start_operation(Operator::And, true, None)?;
        for (i, (var, val)) in p.iter_fixed_values().enumerate() {
            if i > 0 {
                self.sep_operation(Operator::And)?;
            }
            self.write_variable(var, val)?;
        }
        self.end_operation(Operator::And, true, None)
    }
}

impl FormatterConfig<'_> {
    pub fn operator(&self, op: Operator) -> &str {
        match op {
            Operator::And => self.s_and,
            Operator::Or => self.s_or,
        }
    }

    pub fn infix<'a, T: Rule + ?Sized>(
        &'a self,
        rule: &'a T,
        vs: Option<&'a VarSpace>,
    ) -> InfixFormatted<'a, T> {
        InfixFormatted {
            rule,
            ovs: vs,
            cfg: self,
        }
    }
}

pub struct InfixFormatter<'a, 'b>(
    &'a mut fmt::Formatter<'b>,
    Option<&'a VarSpace>,
    &'a FormatterConfig<'a>,
);

impl<'a, 'b> InfixFormatter<'a, 'b> {
    pub fn new(f: &'a mut fmt::Formatter<'b>) -> Self {
        Self(f, None, &DEFAULT_FMT_CFG)
    }
    pub fn named(f: &'a mut fmt::Formatter<'b>, vs: &'a VarSpace) -> Self {
        Self(f, Some(vs), &DEFAULT_FMT_CFG)
    }
    pub fn with(
        f: &'a mut fmt::Formatter<'b>,
        ovs: Option<&'a VarSpace>,
        cfg: &'a FormatterConfig,
    ) -> Self {
        Self(f, ovs, cfg)
    }
}

impl ExprFormatter for InfixFormatter<'_, '_> {
    fn write_fmt(&mut self, args: fmt::Arguments) -> fmt::Result {
        fmt::Formatter::write_fmt(self.0, args)
    }

    fn write_bool(&mut self, b: bool) -> fmt::Result {
        match b {
            false => write!(self, "0"),
            true => write!(self, "1"),
        }
    }

    fn write_variable(&mut self, var: Variable, value: bool) -> fmt::Result {
        if !value {
            write!(self, "{}", self.2.s_not)?;
        }
        match self.1 {
            None => write!(self, "{}", var),
            Some(vs) => vs.format_variable(self.0, var),
        }
    }

    fn start_operation(
        &mut self,
        op: Operator,
        value: bool,
        parent: Option<Operator>,
    ) -> fmt::Result {
        match value {
            false => write!(self, "{}(", self.2.s_not),
            true => match op.priority() < parent.map(|o| o.priority()).unwrap_or(0) {
                true => write!(self, "("),
                false => Ok(()),
            },
        }
    }

    fn end_operation(
        &mut self,
        op: Operator,
        value: bool,
        parent: Option<Operator>,
    ) -> fmt::Result {
        match value {
            false => write!(self, ")"),
            true => match op.priority() < parent.map(|o| o.priority()).unwrap_or(0) {
                true => write!(self, ")"),
                false => Ok(()),
            },
        }
    }

    fn sep_operation(&mut self, op: Operator) -> fmt::Result {
        write!(self, " {} ", self.2.operator(op))
    }
}

impl<T: Rule + ?Sized> fmt::Display for InfixFormatted<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut ef = InfixFormatter::with(f, self.ovs, self.cfg);
        self.rule.fmt_with(&mut ef)
    }
}

#[cfg(test)]
mod tests {
    use crate::efmt::LOWERCASE_FMT_CFG;
    use crate::*;

    #[test]
    fn infix_formats() -> Result<(), MotifError> {
        let mut vs = VarSpace::default();
        let expr = vs.parse_expression_extend("A | (B & !C)")?;
        assert_eq!(format!("{}", vs.named(&expr)), "A | B & !C");

        let e2 = vs.parse_expression_extend("A & (B | C)")?;
        assert_eq!(format!("{}", vs.named(&e2)), "A & (B | C)");
        assert_eq!(
            format!("{}", LOWERCASE_FMT_CFG.infix(&e2, Some(&vs))),
            "A and (B or C)"
        );

        let e3 = vs.parse_expression_extend("!(A & B)")?;
        assert_eq!(
            format!("{}", LOWERCASE_FMT_CFG.infix(&e3, Some(&vs))),
            "not (A and B)"
        );
        Ok(())
    }
}
