use crate::domain::{Condition, FilterGroup, LogicalOperator};
use crate::filter::{ParseError, QueryParser};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

// keyword? ( payload )
static WRAPPER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^(and|or)?\((.+)\)$").expect("wrapper pattern"));

// keyword? ( [ ... ] )
static ROUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^(and|or)?\(\s*\[.*\]\s*\)$").expect("route pattern"));

/// `and(...)` / `or(...)` around a JSON condition triple or a list of triples.
///
/// ```text
/// and(["name", "is", "blorg"])
/// or([["code", "starts_with", "sh"], ["id", "in", [1, 2, 3]]])
/// ```
///
/// The keyword is optional (defaults to `and`) and case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Format1Parser;

impl Format1Parser {
    pub const NAME: &'static str = "format1";

    /// Renders a group in this grammar. An empty group renders as `and([])`,
    /// which does not parse back.
    pub fn format(group: &FilterGroup) -> String {
        let tuples = group
            .conditions()
            .iter()
            .map(|condition| {
                Value::Array(vec![
                    Value::String(condition.field().to_string()),
                    Value::String(condition.relation().to_string()),
                    Value::Array(condition.values().to_vec()),
                ])
            })
            .collect();
        format!("{}({})", group.operator(), Value::Array(tuples))
    }
}

impl QueryParser for Format1Parser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn can_parse(&self, input: &str) -> bool {
        ROUTE_RE.is_match(input.trim())
    }

    fn parse(&self, input: &str) -> Result<FilterGroup, ParseError> {
        let captures = WRAPPER_RE
            .captures(input.trim())
            .ok_or_else(ParseError::bad_format)?;

        let operator = match captures.get(1) {
            Some(keyword) => keyword
                .as_str()
                .parse::<LogicalOperator>()
                .map_err(|_| ParseError::bad_format())?,
            None => LogicalOperator::And,
        };

        let payload = captures.get(2).map_or("", |m| m.as_str().trim());
        if payload.is_empty() {
            return Err(ParseError::bad_format());
        }
        if !(payload.starts_with('[') && payload.ends_with(']')) {
            return Err(ParseError::bad_filter_format());
        }

        let decoded: Value =
            serde_json::from_str(payload).map_err(|err| ParseError::malformed_payload(&err))?;

        let mut group = FilterGroup::with_operator(operator);
        for condition in conditions_from_payload(decoded)? {
            group.add_condition(condition);
        }
        Ok(group)
    }
}

fn conditions_from_payload(payload: Value) -> Result<Vec<Condition>, ParseError> {
    let Value::Array(items) = payload else {
        return Err(ParseError::bad_filter_format());
    };

    if !items.is_empty() && items.iter().all(Value::is_array) {
        items.into_iter().map(condition_from_tuple).collect()
    } else {
        condition_from_tuple(Value::Array(items)).map(|condition| vec![condition])
    }
}

fn condition_from_tuple(tuple: Value) -> Result<Condition, ParseError> {
    let Value::Array(items) = tuple else {
        return Err(ParseError::bad_filter_format());
    };
    let [field, relation, value]: [Value; 3] = items
        .try_into()
        .map_err(|_| ParseError::bad_filter_format())?;
    let (Value::String(field), Value::String(relation)) = (field, relation) else {
        return Err(ParseError::bad_filter_format());
    };

    let values = match value {
        Value::Array(values) => values,
        scalar => vec![scalar],
    };
    if values.iter().any(|v| v.is_array() || v.is_object()) {
        return Err(ParseError::bad_filter_format());
    }

    Condition::new(field, relation, values).map_err(|_| ParseError::bad_filter_format())
}

#[cfg(test)]
mod tests {
    use super::Format1Parser;
    use crate::domain::{Condition, FilterGroup, LogicalOperator};
    use crate::filter::{ParseError, ParseErrorKind, QueryParser};
    use serde_json::json;

    fn blorg_group(operator: LogicalOperator) -> FilterGroup {
        let mut group = FilterGroup::with_operator(operator);
        group.add_condition(Condition::new("name", "is", vec![json!("blorg")]).unwrap());
        group
    }

    #[test]
    fn empty_parens_is_bad_format() {
        let parser = Format1Parser;
        assert!(!parser.can_parse("()"));
        assert_eq!(parser.parse("()").unwrap_err(), ParseError::bad_format());
    }

    #[test]
    fn bare_tokens_are_bad_filter_format() {
        let parser = Format1Parser;
        assert!(!parser.can_parse("and(foo, bar)"));
        let err = parser.parse("and(foo, bar)").unwrap_err();
        assert_eq!(
            err,
            ParseError::new(ParseErrorKind::BadFilterFormat, "Invalid query filter format")
        );
    }

    #[test]
    fn invalid_json_surfaces_decoder_message() {
        let parser = Format1Parser;
        let input = "and([foo, bar,])";
        assert!(parser.can_parse(input));

        let err = parser.parse(input).unwrap_err();
        let decoder = serde_json::from_str::<serde_json::Value>("[foo, bar,]").unwrap_err();
        assert_eq!(
            err,
            ParseError::new(ParseErrorKind::MalformedPayload, decoder.to_string())
        );
        assert!(err.message().starts_with("expected ident"));
    }

    #[test]
    fn missing_wrapper_is_bad_format() {
        let parser = Format1Parser;
        assert!(!parser.can_parse("andwell_this_is_bad"));
        assert_eq!(
            parser.parse("andwell_this_is_bad").unwrap_err(),
            ParseError::new(ParseErrorKind::BadFormat, "Invalid query format")
        );
    }

    #[test]
    fn list_of_tuples_and_single_tuple_match() {
        let parser = Format1Parser;
        let list = r#"and([["name", "is", "blorg"]])"#;
        let single = r#"and(["name", "is", "blorg"])"#;
        assert!(parser.can_parse(list));
        assert!(parser.can_parse(single));

        let expected = blorg_group(LogicalOperator::And);
        assert_eq!(parser.parse(list).unwrap(), expected);
        assert_eq!(parser.parse(single).unwrap(), expected);
    }

    #[test]
    fn keyword_is_case_insensitive() {
        let parser = Format1Parser;
        for input in [
            r#"and(["name", "is", "blorg"])"#,
            r#"AND(["name", "is", "blorg"])"#,
            r#"And(["name", "is", "blorg"])"#,
        ] {
            assert!(parser.can_parse(input), "{input}");
            assert_eq!(parser.parse(input).unwrap(), blorg_group(LogicalOperator::And));
        }
        for input in [
            r#"or(["name", "is", "blorg"])"#,
            r#"OR(["name", "is", "blorg"])"#,
            r#"Or(["name", "is", "blorg"])"#,
        ] {
            assert!(parser.can_parse(input), "{input}");
            assert_eq!(parser.parse(input).unwrap(), blorg_group(LogicalOperator::Or));
        }
    }

    #[test]
    fn keyword_defaults_to_and() {
        let parser = Format1Parser;
        let group = parser.parse(r#"  (["name", "is", "blorg"])  "#).unwrap();
        assert_eq!(group, blorg_group(LogicalOperator::And));
    }

    #[test]
    fn conditions_keep_source_order() {
        let parser = Format1Parser;
        let group = parser
            .parse(r#"or([["code", "starts_with", "sh"], ["id", "in", [3, 1, 2]], ["sg_status", "is", null]])"#)
            .unwrap();
        assert_eq!(group.operator(), LogicalOperator::Or);
        let conditions = group.conditions();
        assert_eq!(conditions.len(), 3);
        assert_eq!(conditions[0].field(), "code");
        assert_eq!(conditions[0].values(), &[json!("sh")]);
        assert_eq!(conditions[1].relation(), "in");
        assert_eq!(conditions[1].values(), &[json!(3), json!(1), json!(2)]);
        assert_eq!(conditions[2].values(), &[json!(null)]);
    }

    #[test]
    fn empty_value_list_is_kept() {
        let parser = Format1Parser;
        let group = parser.parse(r#"and(["tags", "in", []])"#).unwrap();
        assert!(group.conditions()[0].values().is_empty());
    }

    #[test]
    fn wrong_shapes_are_bad_filter_format() {
        let parser = Format1Parser;
        for input in [
            r#"and([])"#,
            r#"and(["name", "is"])"#,
            r#"and(["name", "is", "a", "b"])"#,
            r#"and([1, "is", "a"])"#,
            r#"and(["name", 2, "a"])"#,
            r#"and(["", "is", "a"])"#,
            r#"and(["name", "is", {"a": 1}])"#,
            r#"and(["name", "is", [["nested"]]])"#,
            r#"and([["name", "is", "a"], ["short"]])"#,
            r#"and({"name": "is"})"#,
        ] {
            assert_eq!(
                parser.parse(input).unwrap_err(),
                ParseError::bad_filter_format(),
                "{input}"
            );
        }
    }

    #[test]
    fn nothing_claimed_is_bad_format_on_parse() {
        let parser = Format1Parser;
        for input in ["", "and", "and()", "and(   )", "( \n )", "xor([\"a\",\"is\",1])", "name=blorg"] {
            assert!(!parser.can_parse(input), "{input}");
            assert_eq!(parser.parse(input).unwrap_err(), ParseError::bad_format(), "{input}");
        }
    }

    #[test]
    fn format_round_trips() {
        let parser = Format1Parser;
        for condition in [
            Condition::new("name", "is", vec![json!("blorg")]).unwrap(),
            Condition::new("id", "in", vec![json!(1), json!(2)]).unwrap(),
            Condition::new("sg_done", "is", vec![json!(true)]).unwrap(),
            Condition::new("due", "between", vec![json!("2024-01-01"), json!(null)]).unwrap(),
            Condition::new("tags", "in", Vec::new()).unwrap(),
        ] {
            let mut group = FilterGroup::new();
            group.add_condition(condition);
            let rendered = Format1Parser::format(&group);
            assert!(parser.can_parse(&rendered), "{rendered}");
            assert_eq!(parser.parse(&rendered).unwrap(), group);
        }
    }
}
