//! List filters
//!
//! A [`Filter`] is rendered into the `filter` query parameter understood by
//! the compute list endpoints and can also be evaluated locally against a
//! JSON resource. String comparisons are regular expressions that must match
//! the whole field value.

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone)]
enum Operand {
    Regexp { pattern: String, re: Regex },
    Int(i64),
    Bool(bool),
}

#[derive(Debug, Clone)]
struct Predicate {
    field: String,
    negate: bool,
    operand: Operand,
}

impl Predicate {
    fn matches(&self, obj: &Value) -> bool {
        let Some(value) = lookup(obj, &self.field) else {
            return self.negate;
        };
        let equal = match (&self.operand, value) {
            (Operand::Regexp { re, .. }, Value::String(s)) => re.is_match(s),
            (Operand::Int(want), Value::Number(n)) => n.as_i64() == Some(*want),
            // int64 fields are encoded as strings by the compute API
            (Operand::Int(want), Value::String(s)) => s.parse::<i64>().ok() == Some(*want),
            (Operand::Bool(want), Value::Bool(b)) => b == want,
            _ => false,
        };
        equal != self.negate
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.negate { "ne" } else { "eq" };
        match &self.operand {
            Operand::Regexp { pattern, .. } => write!(f, "{} {} {:?}", self.field, op, pattern),
            Operand::Int(v) => write!(f, "{} {} {}", self.field, op, v),
            Operand::Bool(v) => write!(f, "{} {} {}", self.field, op, v),
        }
    }
}

fn lookup<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(obj, |current, part| current.get(part))
}

/// Filter applied to a List call
#[derive(Debug, Clone, Default)]
pub enum Filter {
    /// Match every resource
    #[default]
    None,
    /// Conjunction of predicates
    All(Vec<PredicateRef>),
}

/// Opaque single predicate of a [`Filter`]
#[derive(Debug, Clone)]
pub struct PredicateRef(Predicate);

impl Filter {
    fn single(field: &str, negate: bool, operand: Operand) -> Self {
        Filter::All(vec![PredicateRef(Predicate {
            field: field.to_string(),
            negate,
            operand,
        })])
    }

    fn regexp_operand(pattern: &str) -> Result<Operand> {
        let re = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| Error::InvalidArgument(format!("invalid filter regexp {:?}: {}", pattern, e)))?;
        Ok(Operand::Regexp {
            pattern: pattern.to_string(),
            re,
        })
    }

    /// `field` matches the regular expression `pattern`
    pub fn regexp(field: &str, pattern: &str) -> Result<Self> {
        Ok(Self::single(field, false, Self::regexp_operand(pattern)?))
    }

    /// `field` does not match the regular expression `pattern`
    pub fn not_regexp(field: &str, pattern: &str) -> Result<Self> {
        Ok(Self::single(field, true, Self::regexp_operand(pattern)?))
    }

    pub fn equal_int(field: &str, value: i64) -> Self {
        Self::single(field, false, Operand::Int(value))
    }

    pub fn not_equal_int(field: &str, value: i64) -> Self {
        Self::single(field, true, Operand::Int(value))
    }

    pub fn equal_bool(field: &str, value: bool) -> Self {
        Self::single(field, false, Operand::Bool(value))
    }

    pub fn not_equal_bool(field: &str, value: bool) -> Self {
        Self::single(field, true, Operand::Bool(value))
    }

    /// Both `self` and `other` must match
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::None, f) | (f, Filter::None) => f,
            (Filter::All(mut a), Filter::All(b)) => {
                a.extend(b);
                Filter::All(a)
            }
        }
    }

    /// Parse a command line term: `field=regexp` or `field!=regexp`
    pub fn parse_term(term: &str) -> Result<Self> {
        if let Some((field, pattern)) = term.split_once("!=") {
            return Self::not_regexp(field.trim(), pattern.trim());
        }
        if let Some((field, pattern)) = term.split_once('=') {
            return Self::regexp(field.trim(), pattern.trim());
        }
        Err(Error::InvalidArgument(format!(
            "filter term {:?} must be field=regexp or field!=regexp",
            term
        )))
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Filter::None)
    }

    /// Value of the `filter` query parameter, `None` when matching all
    pub fn to_query(&self) -> Option<String> {
        match self {
            Filter::None => None,
            Filter::All(preds) if preds.len() == 1 => Some(preds[0].0.to_string()),
            Filter::All(preds) => Some(
                preds
                    .iter()
                    .map(|p| format!("({})", p.0))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }

    /// Evaluate the filter against a JSON resource
    pub fn matches(&self, obj: &Value) -> bool {
        match self {
            Filter::None => true,
            Filter::All(preds) => preds.iter().all(|p| p.0.matches(obj)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_none_matches_everything() {
        assert!(Filter::None.matches(&json!({})));
        assert!(Filter::None.matches(&json!({"name": "x"})));
        assert_eq!(Filter::None.to_query(), None);
        assert!(Filter::default().is_match_all());
    }

    #[test]
    fn test_regexp_is_anchored() {
        let f = Filter::regexp("name", "web-.*").unwrap();
        assert!(f.matches(&json!({"name": "web-1"})));
        assert!(!f.matches(&json!({"name": "old-web-1"})));
        assert!(!f.matches(&json!({"other": "web-1"})));
    }

    #[test]
    fn test_not_regexp_and_missing_field() {
        let f = Filter::not_regexp("name", "tmp-.*").unwrap();
        assert!(f.matches(&json!({"name": "prod"})));
        assert!(!f.matches(&json!({"name": "tmp-1"})));
        assert!(f.matches(&json!({})));
    }

    #[test]
    fn test_int_and_bool_predicates() {
        let f = Filter::equal_int("id", 42).and(Filter::equal_bool("enableCdn", true));
        assert!(f.matches(&json!({"id": "42", "enableCdn": true})));
        assert!(f.matches(&json!({"id": 42, "enableCdn": true})));
        assert!(!f.matches(&json!({"id": "42", "enableCdn": false})));
        assert!(Filter::not_equal_bool("enableCdn", true).matches(&json!({"enableCdn": false})));
        assert!(Filter::not_equal_int("id", 1).matches(&json!({"id": 2})));
    }

    #[test]
    fn test_nested_field() {
        let f = Filter::equal_bool("cdnPolicy.negativeCaching", true);
        assert!(f.matches(&json!({"cdnPolicy": {"negativeCaching": true}})));
    }

    #[test]
    fn test_query_rendering() {
        let single = Filter::regexp("name", "a.*").unwrap();
        assert_eq!(single.to_query().unwrap(), r#"name eq "a.*""#);

        let both = single.and(Filter::not_equal_int("id", 3));
        assert_eq!(both.to_query().unwrap(), r#"(name eq "a.*") (id ne 3)"#);
    }

    #[test]
    fn test_and_with_none_is_identity() {
        let f = Filter::None.and(Filter::equal_bool("x", true));
        assert_eq!(f.to_query().unwrap(), "x eq true");
    }

    #[test]
    fn test_invalid_regexp() {
        let err = Filter::regexp("name", "(").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_parse_term() {
        let f = Filter::parse_term("name=web-.*").unwrap();
        assert!(f.matches(&json!({"name": "web-2"})));
        let f = Filter::parse_term("name!=web-.*").unwrap();
        assert!(!f.matches(&json!({"name": "web-2"})));
        assert!(Filter::parse_term("name").is_err());
    }
}
