//! Boolean rules defined as expression trees

use core::ops::BitAnd;
use core::ops::BitOr;
use core::ops::Not;
use std::borrow::{Borrow, Cow};
use std::sync::Arc;

use crate::*;

/// A Boolean expression tree.
///
/// Represents a Boolean rule as a tree where internal nodes are classical Boolean operations
/// and leaves are individual variables (or fixed Boolean values).
/// Expressions overload the ```&```, ```|```, and ```!``` operators to facilitate their definition
/// as readable rust statements. Fixed Boolean values and double negations are eliminated.
///
/// Expressions can not be [copied](Copy) but they can be [cloned](Clone) in constant time.
///
/// ```
/// use motifkit::{Expr, Rule, State, Variable};
///
/// let a = Variable::from(0);
/// let b = Variable::from(1);
/// let c = Variable::from(2);
///
/// // Build expressions using these variables
/// let sub_expr = b & !c;
/// let pos_expr = a & !sub_expr;
/// let neg_expr = !&pos_expr;
///
/// // Evaluate expressions on some state
/// let state: State = [b, c].into_iter().collect();
/// assert_ne!(pos_expr.eval(&state), neg_expr.eval(&state));
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Expr {
    pub(crate) value: bool,
    pub(crate) node: ExprNode,
}

/// A node in an expression tree
#[derive(Clone, PartialEq, Debug)]
pub enum ExprNode {
    /// A fixed Boolean value
    True,

    /// A single literal
    Variable(Variable),

    /// Two expressions connected with a binary operator
    Operation(Operator, Arc<(Expr, Expr)>),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
/// Expression trees can use the AND and OR operators.
pub enum Operator {
    /// AND operator: both children need to be true
    And,
    /// OR operator: at least one child needs to be true
    Or,
}

impl Expr {
    fn new(value: bool, node: ExprNode) -> Self {
        Self { value, node }
    }

    fn _fmt_expr(&self, f: &mut dyn efmt::ExprFormatter, parent: Option<Operator>) -> fmt::Result {
        match &self.node {
            ExprNode::True => f.write_bool(self.value),
            ExprNode::Variable(var) => f.write_variable(*var, self.value),
            ExprNode::Operation(o, c) => {
                f.start_operation(*o, self.value, parent)?;
                c.0._fmt_expr(f, Some(*o))?;
                f.sep_operation(*o)?;
                c.1._fmt_expr(f, Some(*o))?;
                f.end_operation(*o, self.value, parent)
            }
        }
    }

    /// Rewrite an expression by replacing some variables with new expressions.
    ///
    /// The closure is called on all variables of the expression.
    /// If it returns None, then the variable is unchanged, otherwise the new expression
    /// replaces the positive occurrence of the variable (negated occurrences receive its negation).
    ///
    /// Unchanged subtrees are shared with the original expression.
    pub(crate) fn rewrite<FV>(&self, fv: &FV) -> Self
    where
        FV: Fn(Variable) -> Option<Expr>,
    {
        self._rewrite_cow(fv).into_owned()
    }

    fn _rewrite_cow<FV>(&self, fv: &FV) -> Cow<Self>
    where
        FV: Fn(Variable) -> Option<Expr>,
    {
        match &self.node {
            ExprNode::True => Cow::Borrowed(self),
            ExprNode::Variable(var) => match fv(*var) {
                None => Cow::Borrowed(self),
                Some(e) => match self.value {
                    true => Cow::Owned(e),
                    false => Cow::Owned(!e),
                },
            },
            ExprNode::Operation(op, children) => {
                let c1 = children.0._rewrite_cow(fv);
                let c2 = children.1._rewrite_cow(fv);
                if let (Cow::Borrowed(_), Cow::Borrowed(_)) = (&c1, &c2) {
                    return Cow::Borrowed(self);
                }
                Cow::Owned(op.join_with_value(self.value, c1.into_owned(), c2.into_owned()))
            }
        }
    }

    /// Replace all occurrences of a variable by an expression
    pub fn substitute(&self, var: Variable, e: &Expr) -> Self {
        self.rewrite(&|v| match v == var {
            true => Some(e.clone()),
            false => None,
        })
    }

    /// Restrict the function in a subspace: replace the fixed variables by their value
    ///
    /// Free variables are unaffected, variables with conflicting restrictions are left free.
    pub fn restrict_to_subspace(&self, subspace: &Pattern) -> Self {
        self.rewrite(&|v| subspace.get(v).map(Expr::from))
    }

    /// Propagate negations down the expression tree to obtain an equivalent NNF expression
    ///
    /// An expression is a NNF (Negation Normal Form) if all negations are on the atoms and not on operations.
    /// For example, the expression ```A & (B | C)``` is a NNF, but its negation ```!(A & (B | C))``` isn't.
    /// The NNF of the negation is ```!A | (!B & !C)```.
    ///
    /// Return a Cow object: borrow the existing expression if it is already a NNF.
    pub fn nnf(&self) -> Cow<Self> {
        self.build_nnf(true)
    }

    fn build_nnf(&self, parent_value: bool) -> Cow<Self> {
        match &self.node {
            ExprNode::True | ExprNode::Variable(_) => match parent_value {
                true => Cow::Borrowed(self),
                false => Cow::Owned(self.not()),
            },
            ExprNode::Operation(op, children) => {
                let b = parent_value == self.value;
                let c0 = children.0.build_nnf(b);
                let c1 = children.1.build_nnf(b);
                if b && self.value {
                    if let (Cow::Borrowed(_), Cow::Borrowed(_)) = (&c0, &c1) {
                        return Cow::Borrowed(self);
                    }
                }
                let op = match b {
                    true => *op,
                    false => op.dual(),
                };
                let children = Arc::new((c0.into_owned(), c1.into_owned()));
                Cow::Owned(Expr::new(true, ExprNode::Operation(op, children)))
            }
        }
    }

    /// Get access to the inner content: a boolean value and an expression node
    pub fn get_inner(&self) -> (bool, &ExprNode) {
        (self.value, &self.node)
    }

    /// Get the fixed value associated to this expression, or none if it is not fixed
    pub fn get_fixed(&self) -> Option<bool> {
        match &self.node {
            ExprNode::True => Some(self.value),
            _ => None,
        }
    }

    /// Build the conjunction of a list of expressions (true if the list is empty)
    pub fn all<T: Into<Expr>>(exprs: impl IntoIterator<Item = T>) -> Self {
        exprs
            .into_iter()
            .fold(Expr::from(true), |acc, e| acc & e.into())
    }

    /// Build the disjunction of a list of expressions (false if the list is empty)
    pub fn any<T: Into<Expr>>(exprs: impl IntoIterator<Item = T>) -> Self {
        exprs
            .into_iter()
            .fold(Expr::from(false), |acc, e| acc | e.into())
    }
}

impl Operator {
    /// Define the priority of operators
    ///
    /// This priority controls the addition of necessary parenthesis when formatting expressions.
    pub fn priority(self) -> u8 {
        match self {
            Operator::And => 2,
            Operator::Or => 1,
        }
    }

    fn dual(&self) -> Self {
        match self {
            Operator::And => Operator::Or,
            Operator::Or => Operator::And,
        }
    }

    fn join_with_value(self, value: bool, e1: Expr, e2: Expr) -> Expr {
        match value {
            true => self.join(e1, e2),
            false => self.join(e1, e2).not(),
        }
    }

    fn join(self, e1: impl Borrow<Expr> + Into<Expr>, e2: impl Borrow<Expr> + Into<Expr>) -> Expr {
        let (b1, b2) = (e1.borrow(), e2.borrow());
        match (&b1.node, &b2.node) {
            (ExprNode::True, _) => self.fixed_or(b1.value, e2),
            (_, ExprNode::True) => self.fixed_or(b2.value, e1),
            (ExprNode::Variable(v1), ExprNode::Variable(v2)) if v1 == v2 => {
                match (self, b1.value == b2.value) {
                    (_, true) => e1.into(),
                    (Operator::And, false) => false.into(),
                    (Operator::Or, false) => true.into(),
                }
            }
            _ => self._force_join(e1, e2),
        }
    }

    fn _force_join(self, e1: impl Into<Expr>, e2: impl Into<Expr>) -> Expr {
        Expr::from(ExprNode::Operation(self, Arc::new((e1.into(), e2.into()))))
    }

    fn is_fixed_by(self, b: bool) -> bool {
        matches!((self, b), (Operator::And, false) | (Operator::Or, true))
    }

    fn fixed_or(self, b: bool, e: impl Into<Expr>) -> Expr {
        match self.is_fixed_by(b) {
            true => Expr::from(b),
            false => e.into(),
        }
    }
}

impl From<&Expr> for Expr {
    fn from(e: &Expr) -> Self {
        e.clone()
    }
}

impl From<ExprNode> for Expr {
    fn from(node: ExprNode) -> Self {
        Self::new(true, node)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Self::new(b, ExprNode::True)
    }
}

impl From<Variable> for Expr {
    fn from(var: Variable) -> Self {
        Self::from(ExprNode::Variable(var))
    }
}

impl From<&Variable> for Expr {
    fn from(var: &Variable) -> Self {
        Self::from(*var)
    }
}

/// The conjunction of the literals of a pattern
impl From<&Pattern> for Expr {
    fn from(p: &Pattern) -> Self {
        if p.has_conflict() {
            return false.into();
        }
        p.iter_fixed_values()
            .map(|(v, b)| Expr::new(b, ExprNode::Variable(v)))
            .fold(Expr::from(true), |acc, e| acc & e)
    }
}

impl From<Pattern> for Expr {
    fn from(p: Pattern) -> Self {
        Self::from(&p)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operator::And => write!(f, "&"),
            Operator::Or => write!(f, "|"),
        }
    }
}

impl Rule for Expr {
    fn fmt_with(&self, f: &mut dyn efmt::ExprFormatter) -> fmt::Result {
        self._fmt_expr(f, None)
    }

    fn eval(&self, state: &State) -> bool {
        self.value
            == match &self.node {
                ExprNode::True => true,
                ExprNode::Variable(var) => state.is_active(*var),
                ExprNode::Operation(op, children) => match (op, children.0.eval(state)) {
                    (Operator::And, false) => false,
                    (Operator::Or, true) => true,
                    _ => children.1.eval(state),
                },
            }
    }

    fn collect_regulators(&self, regulators: &mut VarSet) {
        match &self.node {
            ExprNode::True => (),
            ExprNode::Variable(var) => regulators.insert(*var),
            ExprNode::Operation(_, children) => {
                children.0.collect_regulators(regulators);
                children.1.collect_regulators(regulators);
            }
        }
    }
}

// Delegate Display to the rule trait
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Rule::fmt_rule(self, f)
    }
}

/* ************************************************************************************* */
/* ******************************   Operator overloading  ****************************** */
/* ************************************************************************************* */

impl Not for Expr {
    type Output = Self;
    fn not(self) -> Self::Output {
        Self::new(!self.value, self.node)
    }
}

impl Not for &Expr {
    type Output = Expr;
    fn not(self) -> Self::Output {
        Expr::new(!self.value, self.node.clone())
    }
}

impl Not for Variable {
    type Output = Expr;
    fn not(self) -> Self::Output {
        Expr::new(false, ExprNode::Variable(self))
    }
}

impl<T: Into<Expr>> BitAnd<T> for Expr {
    type Output = Expr;
    fn bitand(self, rhs: T) -> Self::Output {
        Operator::And.join(self, rhs.into())
    }
}

impl<T: Into<Expr>> BitAnd<T> for &Expr {
    type Output = Expr;
    fn bitand(self, rhs: T) -> Self::Output {
        Operator::And.join(self.clone(), rhs.into())
    }
}

impl<T: Into<Expr>> BitAnd<T> for Variable {
    type Output = Expr;
    fn bitand(self, rhs: T) -> Self::Output {
        Operator::And.join(Expr::from(self), rhs.into())
    }
}

impl<T: Into<Expr>> BitOr<T> for Expr {
    type Output = Self;
    fn bitor(self, rhs: T) -> Self::Output {
        Operator::Or.join(self, rhs.into())
    }
}

impl<T: Into<Expr>> BitOr<T> for &Expr {
    type Output = Expr;
    fn bitor(self, rhs: T) -> Self::Output {
        Operator::Or.join(self.clone(), rhs.into())
    }
}

impl<T: Into<Expr>> BitOr<T> for Variable {
    type Output = Expr;
    fn bitor(self, rhs: T) -> Self::Output {
        Operator::Or.join(Expr::from(self), rhs.into())
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn construct_and_display() -> Result<(), MotifError> {
        let mut variables = VarSpace::default();
        let test = variables.provide("test")?;
        let other = variables.provide("other")?;
        let myvar = variables.provide("myvar")?;

        let e: Expr = (test | other) & true & (!myvar & test);
        assert_eq!(
            format!("{}", variables.named(&e)),
            "(test | other) & !myvar & test"
        );
        assert_eq!(format!("{}", &e), "(_0_ | _1_) & !_2_ & _0_");

        let f = Expr::from(false) | !(test | other);
        assert_eq!(format!("{}", variables.named(&f)), "!(test | other)");
        assert_eq!(test & !test, Expr::from(false));
        assert_eq!(test | test, Expr::from(test));
        Ok(())
    }

    #[test]
    fn eval() -> Result<(), MotifError> {
        let mut variables = VarSpace::default();
        let v1 = variables.provide("A")?;
        let v2 = variables.provide("B")?;
        let v3 = variables.provide("C")?;
        let v4 = variables.provide("D")?;
        let v5 = variables.provide("E")?;

        let e = variables.parse_expression("(A & B) | (C & (D | !E))")?;
        let e2 = (v1 & v2) | (v3 & (v4 | !v5));
        assert_eq!(e, e2);

        let state: State = [v3, v5].into_iter().collect();
        assert!(!e.eval(&state));
        let state: State = [v3, v4, v5].into_iter().collect();
        assert!(e.eval(&state));
        let state: State = [v3].into_iter().collect();
        assert!(e.eval(&state));
        Ok(())
    }

    #[test]
    fn restrict_and_substitute() -> Result<(), MotifError> {
        let mut vs = VarSpace::default();
        let e1 = vs.parse_expression_extend("A | !(B & C) | D")?;
        let e2 = vs.parse_expression_extend("A | (B & C)")?;
        let e3 = !&e2;

        let var_b = vs.get_or_err("B")?;
        let var_d = vs.get_or_err("D")?;

        let mut sub = Pattern::default();
        sub.set(var_d, false);
        assert_eq!(e1.restrict_to_subspace(&sub), vs.parse_expression("A | !(B & C)")?);
        assert_eq!(e2.restrict_to_subspace(&sub), e2.clone());

        sub.set(var_b, true);
        assert_eq!(e1.restrict_to_subspace(&sub), vs.parse_expression("A | !C")?);
        assert_eq!(e2.restrict_to_subspace(&sub), vs.parse_expression("A | C")?);

        sub.set(var_b, false);
        assert_eq!(e1.restrict_to_subspace(&sub), Expr::from(true));
        assert_eq!(e2.restrict_to_subspace(&sub), vs.parse_expression("A")?);
        assert_eq!(e3.restrict_to_subspace(&sub), vs.parse_expression("!A")?);

        let replacement = vs.parse_expression("C | D")?;
        assert_eq!(
            e2.substitute(var_b, &replacement),
            vs.parse_expression("A | ((C | D) & C)")?
        );
        let negated = vs.parse_expression("!B")?.substitute(var_b, &replacement);
        assert_eq!(negated, vs.parse_expression("!(C | D)")?);
        Ok(())
    }

    #[test]
    fn negation_normal_form() -> Result<(), MotifError> {
        let mut vs = VarSpace::default();
        let e = vs.parse_expression_extend("!(A & (B | !C))")?;
        let nnf = e.nnf();
        assert_eq!(format!("{}", vs.named(nnf.as_ref())), "!A | !B & C");

        let e = vs.parse_expression("A & (B | !C)")?;
        assert!(matches!(e.nnf(), std::borrow::Cow::Borrowed(_)));
        Ok(())
    }
}
