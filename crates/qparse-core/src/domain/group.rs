use crate::domain::condition::Condition;
use crate::error::CoreError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}

impl FromStr for LogicalOperator {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("and") {
            Ok(LogicalOperator::And)
        } else if trimmed.eq_ignore_ascii_case("or") {
            Ok(LogicalOperator::Or)
        } else {
            Err(CoreError::InvalidLogicalOperator(trimmed.to_string()))
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flat AND/OR grouping of conditions, kept in source order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FilterGroup {
    #[serde(rename = "logical_operator")]
    operator: LogicalOperator,
    conditions: Vec<Condition>,
}

impl FilterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operator(operator: LogicalOperator) -> Self {
        Self {
            operator,
            conditions: Vec::new(),
        }
    }

    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn add_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }
}
