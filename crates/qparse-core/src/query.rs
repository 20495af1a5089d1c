//! Read-request payload for the record-query API.
//!
//! A parsed [`FilterGroup`] is embedded under `filters`; everything else is
//! paging and projection that callers can adjust through query-string style
//! parameters.

use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::{Condition, FilterGroup};
use crate::filter::ParseError;
use crate::registry::ParserRegistry;

pub const MAX_ENTITIES_PER_PAGE: u32 = 500;
pub const DEFAULT_RETURN_ONLY: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paging {
    pub current_page: u32,
    pub entities_per_page: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            current_page: 1,
            entities_per_page: MAX_ENTITIES_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadQuery {
    pub return_fields: Vec<String>,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub return_paging_info: bool,
    pub api_return_image_urls: bool,
    pub return_only: String,
    pub paging: Paging,
    pub filters: FilterGroup,
}

impl ReadQuery {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            return_fields: vec!["id".to_string()],
            entity_type: entity_type.into(),
            return_paging_info: true,
            api_return_image_urls: true,
            return_only: DEFAULT_RETURN_ONLY.to_string(),
            paging: Paging::default(),
            filters: FilterGroup::new(),
        }
    }

    /// Single-entity lookup: one result per page, filtered on `id is [id]`.
    pub fn by_id(entity_type: impl Into<String>, id: i64) -> Self {
        let mut query = Self::new(entity_type);
        query.paging.entities_per_page = 1;
        // "id" and "is" are non-empty literals
        if let Ok(condition) = Condition::new("id", "is", vec![json!(id)]) {
            query.filters.add_condition(condition);
        }
        query
    }

    pub fn with_return_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if !fields.is_empty() {
            self.return_fields = fields;
        }
        self
    }

    /// Values outside `1..=MAX_ENTITIES_PER_PAGE` are ignored.
    pub fn with_entities_per_page(mut self, per_page: u32) -> Self {
        if page_size_in_range(per_page) {
            self.paging.entities_per_page = per_page;
        }
        self
    }

    pub fn with_filters(mut self, filters: FilterGroup) -> Self {
        self.filters = filters;
        self
    }

    /// Applies one query-string parameter.
    ///
    /// `page`, `limit` and `fields` adjust paging and projection; bad numbers
    /// and limits above [`MAX_ENTITIES_PER_PAGE`] are logged and skipped. `filter` goes through `registry` and replaces
    /// the current filters. Keys are case-insensitive, empty values are
    /// ignored, unknown keys are skipped.
    pub fn apply_param(
        &mut self,
        registry: &ParserRegistry,
        key: &str,
        value: &str,
    ) -> Result<(), ParseError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }

        match key.trim().to_ascii_lowercase().as_str() {
            "page" => match parse_positive(value) {
                Some(page) => self.paging.current_page = page,
                None => warn!(value, "could not convert page to a positive integer"),
            },
            "limit" => match parse_positive(value) {
                Some(limit) if page_size_in_range(limit) => {
                    self.paging.entities_per_page = limit;
                }
                Some(limit) => {
                    warn!(limit, max = MAX_ENTITIES_PER_PAGE, "limit above page maximum");
                }
                None => warn!(value, "could not convert limit to a positive integer"),
            },
            "fields" => {
                let fields: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|field| !field.is_empty())
                    .map(str::to_string)
                    .collect();
                if !fields.is_empty() {
                    self.return_fields = fields;
                }
            }
            "filter" => self.filters = registry.dispatch(value)?,
            other => debug!(key = other, "ignoring query parameter"),
        }
        Ok(())
    }

    pub fn apply_params<'a, I>(
        &mut self,
        registry: &ParserRegistry,
        params: I,
    ) -> Result<(), ParseError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in params {
            self.apply_param(registry, key, value)?;
        }
        Ok(())
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|n| *n > 0)
}

fn page_size_in_range(per_page: u32) -> bool {
    (1..=MAX_ENTITIES_PER_PAGE).contains(&per_page)
}

#[cfg(test)]
mod tests {
    use super::{ReadQuery, MAX_ENTITIES_PER_PAGE};
    use crate::domain::{FilterGroup, LogicalOperator};
    use crate::filter::ParseErrorKind;
    use crate::registry::ParserRegistry;
    use serde_json::json;

    #[test]
    fn new_query_defaults() {
        let query = ReadQuery::new("Shot");
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            json!({
                "return_fields": ["id"],
                "type": "Shot",
                "return_paging_info": true,
                "api_return_image_urls": true,
                "return_only": "active",
                "paging": { "current_page": 1, "entities_per_page": 500 },
                "filters": { "logical_operator": "and", "conditions": [] }
            })
        );
    }

    #[test]
    fn by_id_filters_on_id() {
        let query = ReadQuery::by_id("Asset", 42);
        assert_eq!(query.paging.entities_per_page, 1);
        let filters = serde_json::to_value(&query.filters).unwrap();
        assert_eq!(
            filters,
            json!({
                "logical_operator": "and",
                "conditions": [{ "path": "id", "relation": "is", "values": [42] }]
            })
        );
    }

    #[test]
    fn params_adjust_paging_fields_and_filters() {
        let registry = ParserRegistry::with_builtin_parsers();
        let mut query = ReadQuery::new("Shot");
        query
            .apply_params(
                &registry,
                [
                    ("PAGE", "3"),
                    ("limit", "25"),
                    ("fields", "id, code ,,sg_status_list"),
                    ("filter", r#"or(["code", "is", "sh010"])"#),
                    ("sort", "code"),
                ],
            )
            .unwrap();

        assert_eq!(query.paging.current_page, 3);
        assert_eq!(query.paging.entities_per_page, 25);
        assert_eq!(query.return_fields, vec!["id", "code", "sg_status_list"]);
        assert_eq!(query.filters.operator(), LogicalOperator::Or);
        assert_eq!(query.filters.conditions()[0].values(), &[json!("sh010")]);
    }

    #[test]
    fn bad_numbers_and_empty_values_are_skipped() {
        let registry = ParserRegistry::with_builtin_parsers();
        let mut query = ReadQuery::new("Shot");
        query
            .apply_params(
                &registry,
                [("page", "two"), ("limit", "0"), ("fields", ""), ("filter", " ")],
            )
            .unwrap();
        assert_eq!(query, ReadQuery::new("Shot"));
        assert_eq!(query.paging.entities_per_page, MAX_ENTITIES_PER_PAGE);
    }

    #[test]
    fn filter_errors_propagate() {
        let registry = ParserRegistry::with_builtin_parsers();
        let mut query = ReadQuery::new("Shot");
        let err = query
            .apply_param(&registry, "filter", "and(foo, bar)")
            .unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::BadFormat);
    }

    #[test]
    fn builders_ignore_empty_settings() {
        let query = ReadQuery::new("Version")
            .with_return_fields(Vec::<String>::new())
            .with_entities_per_page(0);
        assert_eq!(query.return_fields, vec!["id"]);
        assert_eq!(query.paging.entities_per_page, MAX_ENTITIES_PER_PAGE);

        let query = ReadQuery::new("Version")
            .with_return_fields(["code", "sg_path"])
            .with_entities_per_page(50);
        assert_eq!(query.return_fields, vec!["code", "sg_path"]);
        assert_eq!(query.paging.entities_per_page, 50);
    }

    #[test]
    fn page_size_is_capped() {
        let query = ReadQuery::new("Shot").with_entities_per_page(MAX_ENTITIES_PER_PAGE + 1);
        assert_eq!(query.paging.entities_per_page, MAX_ENTITIES_PER_PAGE);
        let query = ReadQuery::new("Shot")
            .with_entities_per_page(20)
            .with_entities_per_page(10_000);
        assert_eq!(query.paging.entities_per_page, 20);

        let registry = ParserRegistry::with_builtin_parsers();
        let mut query = ReadQuery::new("Shot");
        query.apply_param(&registry, "limit", "10000").unwrap();
        assert_eq!(query.paging.entities_per_page, MAX_ENTITIES_PER_PAGE);
        query.apply_param(&registry, "limit", "500").unwrap();
        assert_eq!(query.paging.entities_per_page, 500);
        query.apply_param(&registry, "limit", "501").unwrap();
        assert_eq!(query.paging.entities_per_page, 500);
    }

    #[test]
    fn with_filters_replaces_group_and_param_overrides_it() {
        let registry = ParserRegistry::with_builtin_parsers();
        let group = registry.dispatch(r#"or(["code", "is", "sh010"])"#).unwrap();
        let mut query = ReadQuery::by_id("Shot", 7).with_filters(group.clone());
        assert_eq!(query.filters, group);
        assert_eq!(query.paging.entities_per_page, 1);

        query.apply_param(&registry, "filter", "name=blorg").unwrap();
        assert_eq!(query.filters.operator(), LogicalOperator::And);
        assert_eq!(query.filters.conditions()[0].field(), "name");

        let cleared = query.with_filters(FilterGroup::new());
        assert!(cleared.filters.conditions().is_empty());
    }
}
