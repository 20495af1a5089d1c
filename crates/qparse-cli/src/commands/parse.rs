use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use qparse_core::{Format1Parser, QueryParser, RegistryError};
use serde_json::Value;

#[derive(Debug, Args)]
pub struct ParseArgs {
    pub expression: String,
    /// Use this parser directly instead of dispatching
    #[arg(long, value_name = "NAME")]
    pub with: Option<String>,
}

pub fn parse_expression(ctx: &Context<'_>, args: ParseArgs) -> Result<()> {
    let group = match args.with.as_deref() {
        Some(name) => {
            let normalized = name.trim().to_ascii_lowercase();
            let parser = ctx
                .registry
                .get(&normalized)
                .ok_or(RegistryError::UnknownParser(normalized))?;
            parser.parse(&args.expression)?
        }
        None => ctx.registry.dispatch(&args.expression)?,
    };

    if ctx.json {
        return print_json(&group);
    }

    println!("{}", Format1Parser::format(&group));
    for condition in group.conditions() {
        println!(
            "  {} {} {}",
            condition.field(),
            condition.relation(),
            Value::Array(condition.values().to_vec())
        );
    }
    Ok(())
}
