//! Filter expressions over guest records.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr   := term (OR term)*
//! term   := factor (AND factor)*
//! factor := NOT factor | "(" expr ")" | key op value
//! op     := = | != | < | <= | > | >= | LIKE
//! ```
//!
//! Keys are column names; values are quoted strings, numbers, booleans or
//! NULL. Keywords and operators are case-insensitive.

use crate::data::{GuestRecord, Value};
use crate::error::{Error, Result};

use logos::{Lexer, Logos};
use std::fmt;

#[derive(Debug, Clone)]
pub enum Predicate {
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    Eq(String, Value),
    Neq(String, Value),
    Like(String, Value),
    Lt(String, Value),
    Le(String, Value),
    Gt(String, Value),
    Ge(String, Value),
}

impl std::ops::BitAnd for Predicate {
    type Output = Predicate;
    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::And(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::BitOr for Predicate {
    type Output = Predicate;
    fn bitor(self, rhs: Self) -> Self::Output {
        Predicate::Or(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;
    fn not(self) -> Self::Output {
        Predicate::Not(Box::new(self))
    }
}

impl Predicate {
    pub fn from_string(source: &str) -> Result<Self> {
        Parser::new(source).parse()
    }

    pub fn eval(&self, guest: &GuestRecord) -> bool {
        match self {
            Self::And(a, b) => a.eval(guest) && b.eval(guest),
            Self::Or(a, b) => a.eval(guest) || b.eval(guest),
            Self::Not(a) => !a.eval(guest),
            Self::Eq(k, v) => &guest.get(k) == v,
            Self::Neq(k, v) => &guest.get(k) != v,
            Self::Like(k, v) => guest.get(k).to_string().contains(&v.to_string()),
            Self::Lt(k, v) => &guest.get(k) < v,
            Self::Le(k, v) => &guest.get(k) <= v,
            Self::Gt(k, v) => &guest.get(k) > v,
            Self::Ge(k, v) => &guest.get(k) >= v,
        }
    }
}

#[derive(Debug, Clone, Logos)]
#[logos(skip r"[ \t\n\f]+")]
enum Token {
    #[token("(")]
    ParenO,
    #[token(")")]
    ParenC,
    #[token("NOT", ignore(case))]
    Not,
    #[token("AND", ignore(case))]
    And,
    #[token("OR", ignore(case))]
    Or,
    #[regex("[a-z_][a-z0-9_-]*", |lex| lex.slice().to_string(), ignore(case))]
    Key(String),
    #[regex("=|!=|>|>=|<|<=|LIKE", Operator::new, priority = 3, ignore(case))]
    Op(Operator),
    #[regex("'([^']|'')*'", unescape_str)]
    #[regex("\"([^\"]|\"\")*\"", unescape_str)]
    ValStr(String),
    #[regex(r"[+-]?\d+", parse_int)]
    ValInt(i64),
    #[regex(r"[+-]?(\d*\.\d+(e[+-]?\d+)?|\d+e[+-]?\d+)", parse_float, ignore(case))]
    ValFloat(f64),
    #[regex("true|false", parse_bool, ignore(case))]
    ValBool(bool),
    #[regex("NULL|NIL", ignore(case))]
    ValNil,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParenO => write!(f, "`(`"),
            Self::ParenC => write!(f, "`)`"),
            Self::Not => write!(f, "NOT"),
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::Key(key) => write!(f, "key {key}"),
            Self::Op(op) => write!(f, "operator {op}"),
            Self::ValStr(v) => write!(f, "string '{v}'"),
            Self::ValInt(v) => write!(f, "integer {v}"),
            Self::ValFloat(v) => write!(f, "number {v}"),
            Self::ValBool(v) => write!(f, "boolean {v}"),
            Self::ValNil => write!(f, "NULL"),
        }
    }
}

#[derive(Debug, Clone)]
enum Operator {
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl Operator {
    fn new(lex: &mut Lexer<Token>) -> Self {
        match lex.slice().to_uppercase().as_str() {
            "=" => Self::Eq,
            "!=" => Self::Neq,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "LIKE" => Self::Like,
            _ => unreachable!("invalid operator"),
        }
    }

    fn predicate(self, key: String, value: Value) -> Predicate {
        match self {
            Self::Eq => Predicate::Eq(key, value),
            Self::Neq => Predicate::Neq(key, value),
            Self::Lt => Predicate::Lt(key, value),
            Self::Le => Predicate::Le(key, value),
            Self::Gt => Predicate::Gt(key, value),
            Self::Ge => Predicate::Ge(key, value),
            Self::Like => Predicate::Like(key, value),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Neq => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
            Self::Like => write!(f, "LIKE"),
        }
    }
}

fn unescape_str(lex: &Lexer<Token>) -> String {
    let span = lex.span();
    let quote = &lex.source()[span.start..span.start + 1];
    lex.source()[span.start + 1..span.end - 1].replace(&format!("{quote}{quote}"), quote)
}

fn parse_int(lex: &Lexer<Token>) -> i64 {
    lex.slice().parse().unwrap()
}

fn parse_float(lex: &Lexer<Token>) -> f64 {
    lex.slice().parse().unwrap()
}

fn parse_bool(lex: &Lexer<Token>) -> bool {
    lex.slice().to_lowercase().parse().unwrap()
}

/// Recursive-descent parser with a single token of lookahead.
#[derive(Debug)]
struct Parser<'src> {
    lex: Lexer<'src, Token>,
    lookahead: Option<Token>,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            lex: Lexer::new(source),
            lookahead: None,
        }
    }

    fn parse(mut self) -> Result<Predicate> {
        let predicate = self.expr()?;
        match self.take()? {
            None => Ok(predicate),
            Some(token) => Err(Error::PredicateParse(format!(
                "expected end of input, found {token}"
            ))),
        }
    }

    fn peek(&mut self) -> Result<Option<&Token>> {
        if self.lookahead.is_none() {
            self.lookahead = match self.lex.next() {
                Some(Ok(token)) => Some(token),
                Some(Err(_)) => {
                    return Err(Error::PredicateParse(format!(
                        "unrecognized token `{}`",
                        self.lex.slice()
                    )))
                }
                None => None,
            };
        }
        Ok(self.lookahead.as_ref())
    }

    fn take(&mut self) -> Result<Option<Token>> {
        self.peek()?;
        Ok(self.lookahead.take())
    }

    fn expr(&mut self) -> Result<Predicate> {
        let mut predicate = self.term()?;
        while matches!(self.peek()?, Some(Token::Or)) {
            self.take()?;
            predicate = predicate | self.term()?;
        }
        Ok(predicate)
    }

    fn term(&mut self) -> Result<Predicate> {
        let mut predicate = self.factor()?;
        while matches!(self.peek()?, Some(Token::And)) {
            self.take()?;
            predicate = predicate & self.factor()?;
        }
        Ok(predicate)
    }

    fn factor(&mut self) -> Result<Predicate> {
        match self.take()? {
            Some(Token::Not) => Ok(!self.factor()?),
            Some(Token::ParenO) => {
                let predicate = self.expr()?;
                match self.take()? {
                    Some(Token::ParenC) => Ok(predicate),
                    other => Err(Self::expected("`)`", other)),
                }
            }
            Some(Token::Key(key)) => {
                let op = match self.take()? {
                    Some(Token::Op(op)) => op,
                    other => return Err(Self::expected("an operator", other)),
                };
                Ok(op.predicate(key, self.value()?))
            }
            other => Err(Self::expected("an expression", other)),
        }
    }

    fn value(&mut self) -> Result<Value> {
        match self.take()? {
            Some(Token::ValStr(v)) => Ok(Value::Str(v)),
            Some(Token::ValInt(v)) => Ok(Value::Int(v)),
            Some(Token::ValFloat(v)) => Ok(Value::Float(v)),
            Some(Token::ValBool(v)) => Ok(Value::Bool(v)),
            Some(Token::ValNil) => Ok(Value::Nil),
            other => Err(Self::expected("a value", other)),
        }
    }

    fn expected(what: &str, found: Option<Token>) -> Error {
        match found {
            Some(token) => Error::PredicateParse(format!("expected {what}, found {token}")),
            None => Error::PredicateParse(format!("expected {what} at end of input")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn guest(pairs: &[(&str, Value)]) -> GuestRecord {
        GuestRecord(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[test]
    fn comparison_over_csv_strings() {
        let g = guest(&[("name", Value::from("Mark")), ("age", Value::from("15"))]);
        assert!(Predicate::from_string("age >= 15").unwrap().eval(&g));
        assert!(!Predicate::from_string("age > 15").unwrap().eval(&g));
        assert!(Predicate::from_string("name = 'Mark'").unwrap().eval(&g));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let g = guest(&[("group", Value::from("band")), ("age", Value::from("12"))]);
        // band or (youth and age >= 13): the left arm alone must match.
        let p = Predicate::from_string("group = 'band' or group = 'youth' and age >= 13").unwrap();
        assert!(p.eval(&g));
        let p = Predicate::from_string("(group = 'band' or group = 'youth') and age >= 13").unwrap();
        assert!(!p.eval(&g));
    }

    #[test]
    fn not_and_keywords_are_case_insensitive() {
        let g = guest(&[("group", Value::from("youth"))]);
        let p = Predicate::from_string("NOT group != 'youth'").unwrap();
        assert!(p.eval(&g));
        let p = Predicate::from_string("not group = 'band' And group like 'you'").unwrap();
        assert!(p.eval(&g));
    }

    #[test]
    fn both_quote_styles_unescape() {
        let g = guest(&[("name", Value::from("O'Brien"))]);
        assert!(Predicate::from_string("name = 'O''Brien'").unwrap().eval(&g));
        assert!(Predicate::from_string("name = \"O'Brien\"").unwrap().eval(&g));
    }

    #[test]
    fn null_matches_missing_columns() {
        let g = guest(&[("name", Value::from("Jo"))]);
        assert!(Predicate::from_string("plus_one = null").unwrap().eval(&g));
    }

    #[test]
    fn malformed_filters_are_rejected() {
        assert!(Predicate::from_string("name =").is_err());
        assert!(Predicate::from_string("name ? 'x'").is_err());
        assert!(Predicate::from_string("(name = 'a'").is_err());
        assert!(Predicate::from_string("name = 'a' extra").is_err());
        assert!(Predicate::from_string("= 'a'").is_err());
    }
}
