//! Parsers for expressions and rule files

use crate::*;
use once_cell::sync::Lazy;
use pest::{iterators, Parser};
use regex::Regex;
use std::str::FromStr;

#[derive(Parser)]
#[grammar_inline = r####"
expr    = _{ SOI ~ disj ~ EOI }
disj    =  { conj ~ ( or_op ~ conj )* }
conj    =  { term ~ ( and_op ~ term )* }
term    = _{ neg | grp }
neg     =  { neg_op ~ grp }
grp     = _{ neg | bt | bf | lit | "(" ~ disj ~ ")" | "[" ~ disj ~ "]" }
bt      = @{ ^"true" ~ kw_end | "1" }
bf      = @{ ^"false" ~ kw_end | "0" }
lit     = @{ !(keyword ~ kw_end) ~ uid }
uid     = _{ (ASCII_ALPHA | "_") ~ (ASCII_ALPHANUMERIC | "_" | ".")* }

or_op   = @{ "||" | "|" | ^"or" ~ kw_end }
and_op  = @{ "&&" | "&" | ^"and" ~ kw_end }
neg_op  = @{ "!" | "~" | ^"not" ~ kw_end }
keyword = _{ ^"and" | ^"or" | ^"not" | ^"true" | ^"false" }
kw_end  = _{ !(ASCII_ALPHANUMERIC | "_" | ".") }

WHITESPACE = _{ " " | "\t" }
"####]
struct ExpressionParser;

static RE_GENERIC_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^_([01-9]+)_$").unwrap());

static RE_BOOLEANNET_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z_][a-zA-Z01-9_.]*)\s*\*\s*=\s*(.*)$").unwrap());

static RE_BNET_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z_][a-zA-Z01-9_.]*)\s*,\s*(.*)$").unwrap());

static RE_BNET_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)targets\s*,\s*factors$").unwrap());

/// Map names to variables while parsing expressions
pub trait VariableParser {
    fn parse_variable(&mut self, s: &str) -> Result<Variable, MotifError>;

    fn parse_expression(&mut self, s: &str) -> Result<Expr, MotifError> {
        let mut parsed = ExpressionParser::parse(Rule::expr, s)
            .map_err(|_| MotifError::InvalidExpression)?;
        match parsed.next() {
            Some(root) => self._load_expr(root),
            None => Err(MotifError::InvalidExpression),
        }
    }

    fn _load_expr(&mut self, expr: iterators::Pair<Rule>) -> Result<Expr, MotifError> {
        let rule = expr.as_rule();
        match rule {
            Rule::bt => Ok(Expr::from(true)),
            Rule::bf => Ok(Expr::from(false)),
            Rule::lit => self.parse_variable(expr.as_str()).map(Expr::from),
            _ => {
                let mut inner = expr.into_inner().filter(|p| {
                    !matches!(p.as_rule(), Rule::or_op | Rule::and_op | Rule::neg_op)
                });
                let mut expr = match inner.next() {
                    Some(first) => self._load_expr(first)?,
                    None => return Err(MotifError::InvalidExpression),
                };
                match rule {
                    Rule::neg => Ok(!expr),
                    Rule::conj => {
                        for next in inner {
                            expr = expr & self._load_expr(next)?;
                        }
                        Ok(expr)
                    }
                    Rule::disj => {
                        for next in inner {
                            expr = expr | self._load_expr(next)?;
                        }
                        Ok(expr)
                    }
                    // Other rules are outside of scope or hidden
                    _ => Err(MotifError::InvalidExpression),
                }
            }
        }
    }
}

/// Parse variables using their generic UID-based name (```_3_```)
pub struct BaseVariableParser;

impl VariableParser for BaseVariableParser {
    fn parse_variable(&mut self, s: &str) -> Result<Variable, MotifError> {
        RE_GENERIC_NAME
            .captures(s)
            .and_then(|cap| cap.get(1))
            .and_then(|uid| uid.as_str().parse::<usize>().ok())
            .map(Variable::from)
            .ok_or_else(|| MotifError::NoSuchVariableName(s.into()))
    }
}

impl FromStr for Expr {
    type Err = MotifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BaseVariableParser.parse_expression(s)
    }
}

/// Parse the lines of a rule file into a list of (target, rule) pairs.
///
/// Each non-empty line defines the rule of a single node, either in the BooleanNet
/// format (```A* = B and not C```) or in the bnet format (```A, B & !C```).
/// Text following a ```#``` is ignored, as well as the bnet header line.
/// New variables are added to the collection as they are encountered.
pub fn parse_rules(vs: &mut VarSpace, text: &str) -> Result<Vec<(Variable, Expr)>, MotifError> {
    let mut result = vec![];
    for (idx, line) in text.lines().enumerate() {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();
        if line.is_empty() || RE_BNET_HEADER.is_match(line) {
            continue;
        }

        let invalid = || MotifError::InvalidRule {
            line: idx + 1,
            text: line.into(),
        };
        let cap = RE_BOOLEANNET_RULE
            .captures(line)
            .or_else(|| RE_BNET_RULE.captures(line))
            .ok_or_else(invalid)?;
        let (target, rule) = match (cap.get(1), cap.get(2)) {
            (Some(t), Some(r)) => (t.as_str(), r.as_str()),
            _ => return Err(invalid()),
        };

        let target = vs.provide(target)?;
        let rule = vs.parse_expression_extend(rule).map_err(|e| match e {
            MotifError::InvalidExpression => invalid(),
            e => e,
        })?;
        result.push((target, rule));
    }
    Ok(result)
}
