use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use qparse_core::QueryParser;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct CheckArgs {
    pub expression: String,
}

#[derive(Debug, Serialize)]
struct ClaimDto {
    parser: &'static str,
    active: bool,
    can_parse: bool,
}

pub fn check_expression(ctx: &Context<'_>, args: CheckArgs) -> Result<()> {
    let (all, _) = ctx.registry.active_parsers();
    let items: Vec<ClaimDto> = all
        .into_iter()
        .filter_map(|name| ctx.registry.get(name))
        .map(|parser| ClaimDto {
            parser: parser.name(),
            active: ctx.registry.is_active(parser.name()),
            can_parse: parser.can_parse(&args.expression),
        })
        .collect();

    if ctx.json {
        return print_json(&items);
    }

    for item in items {
        let state = if item.active { "active" } else { "inactive" };
        let claim = if item.can_parse { "claims" } else { "-" };
        println!("{:<10} {:<8} {}", item.parser, state, claim);
    }
    Ok(())
}
