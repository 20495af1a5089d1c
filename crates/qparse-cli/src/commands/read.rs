use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::Result;
use clap::Args;
use qparse_core::ReadQuery;

#[derive(Debug, Args)]
pub struct ReadArgs {
    pub entity_type: String,
    /// Look up a single entity by id
    #[arg(long)]
    pub id: Option<i64>,
    /// Filter expression; a `filter=` param given later replaces it
    #[arg(long, value_name = "EXPR")]
    pub filter: Option<String>,
    /// Query parameter: page, limit, fields or filter (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

/// Always prints JSON; the payload is JSON by nature.
pub fn build_read_query(ctx: &Context<'_>, args: ReadArgs) -> Result<()> {
    let entity_type = args.entity_type.trim();
    if entity_type.is_empty() {
        return Err(invalid_input("entity type cannot be empty"));
    }

    let read = &ctx.config.read;
    let mut query = match args.id {
        Some(id) => ReadQuery::by_id(entity_type, id),
        None => ReadQuery::new(entity_type).with_entities_per_page(read.entities_per_page),
    }
    .with_return_fields(read.return_fields.iter().cloned());

    if let Some(expr) = args.filter.as_deref() {
        query = query.with_filters(ctx.registry.dispatch(expr)?);
    }
    query.apply_params(
        ctx.registry,
        args.params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    )?;

    print_json(&query)
}
