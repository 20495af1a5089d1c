use crate::error::CoreError;
use serde::Serialize;
use serde_json::Value;

/// One `field relation values` comparison.
///
/// Serialized with `field` renamed to `path`, the key the record-query API
/// expects for condition triples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    #[serde(rename = "path")]
    field: String,
    relation: String,
    values: Vec<Value>,
}

impl Condition {
    pub fn new(
        field: impl Into<String>,
        relation: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<Self, CoreError> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(CoreError::EmptyField);
        }
        let relation = relation.into();
        if relation.trim().is_empty() {
            return Err(CoreError::EmptyRelation);
        }
        Ok(Self {
            field,
            relation,
            values,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::Condition;
    use crate::error::CoreError;
    use serde_json::json;

    #[test]
    fn new_keeps_values_in_order() {
        let condition = Condition::new("id", "in", vec![json!(3), json!(1), json!(2)]).unwrap();
        assert_eq!(condition.field(), "id");
        assert_eq!(condition.relation(), "in");
        assert_eq!(condition.values(), &[json!(3), json!(1), json!(2)]);
    }

    #[test]
    fn empty_values_are_allowed() {
        let condition = Condition::new("sg_status", "is_not", Vec::new()).unwrap();
        assert!(condition.values().is_empty());
    }

    #[test]
    fn blank_field_is_error() {
        let err = Condition::new("  ", "is", vec![json!("x")]).unwrap_err();
        assert_eq!(err, CoreError::EmptyField);
    }

    #[test]
    fn blank_relation_is_error() {
        let err = Condition::new("name", "", vec![json!("x")]).unwrap_err();
        assert_eq!(err, CoreError::EmptyRelation);
    }

    #[test]
    fn serializes_field_as_path() {
        let condition = Condition::new("name", "is", vec![json!("blorg")]).unwrap();
        let value = serde_json::to_value(&condition).unwrap();
        assert_eq!(
            value,
            json!({ "path": "name", "relation": "is", "values": ["blorg"] })
        );
    }
}
