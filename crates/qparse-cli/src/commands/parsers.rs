use crate::commands::{print_json, Context};
use anyhow::Result;
use clap::Args;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct ParsersArgs {}

#[derive(Debug, Serialize)]
struct ParsersDto {
    registered: Vec<&'static str>,
    active: Vec<&'static str>,
}

pub fn list_parsers(ctx: &Context<'_>, _args: ParsersArgs) -> Result<()> {
    let (registered, active) = ctx.registry.active_parsers();

    if ctx.json {
        return print_json(&ParsersDto { registered, active });
    }

    if active.is_empty() {
        println!("no active parsers");
    }
    for name in registered {
        let marker = if active.contains(&name) { '*' } else { ' ' };
        println!("{} {}", marker, name);
    }
    Ok(())
}
