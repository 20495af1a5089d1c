use crate::domain::{Condition, FilterGroup};
use crate::filter::{ParseError, QueryParser};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^([A-Za-z_][A-Za-z0-9_.]*)\s*(!=|\^=|\$=|%=|=)(.*)$").expect("term pattern")
});

/// Query-string style terms joined with AND: `name=blorg,code^=sh,id!=4`.
///
/// | op   | relation      |
/// |------|---------------|
/// | `=`  | `is`          |
/// | `!=` | `is_not`      |
/// | `^=` | `starts_with` |
/// | `$=` | `ends_with`   |
/// | `%=` | `contains`    |
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleParser;

impl SimpleParser {
    pub const NAME: &'static str = "simple";
}

impl QueryParser for SimpleParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn can_parse(&self, input: &str) -> bool {
        let trimmed = input.trim();
        !trimmed.is_empty() && trimmed.split(',').all(|term| TERM_RE.is_match(term.trim()))
    }

    fn parse(&self, input: &str) -> Result<FilterGroup, ParseError> {
        if !self.can_parse(input) {
            return Err(ParseError::bad_format());
        }

        let mut group = FilterGroup::new();
        for term in input.trim().split(',') {
            let captures = TERM_RE
                .captures(term.trim())
                .ok_or_else(ParseError::bad_format)?;
            let field = captures.get(1).map_or("", |m| m.as_str());
            let relation = relation_for(captures.get(2).map_or("", |m| m.as_str()))?;
            let raw = captures.get(3).map_or("", |m| m.as_str().trim());
            if raw.is_empty() {
                return Err(ParseError::bad_filter_format());
            }

            let condition = Condition::new(field, relation, vec![scalar_value(raw)])
                .map_err(|_| ParseError::bad_filter_format())?;
            group.add_condition(condition);
        }
        Ok(group)
    }
}

fn relation_for(op: &str) -> Result<&'static str, ParseError> {
    match op {
        "=" => Ok("is"),
        "!=" => Ok("is_not"),
        "^=" => Ok("starts_with"),
        "$=" => Ok("ends_with"),
        "%=" => Ok("contains"),
        _ => Err(ParseError::bad_format()),
    }
}

fn scalar_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}
