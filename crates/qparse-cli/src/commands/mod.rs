use anyhow::Result;
use qparse_config::AppConfig;
use qparse_core::ParserRegistry;
use serde::Serialize;
use std::io::{self, Write};

pub mod check;
pub mod parse;
pub mod parsers;
pub mod read;

pub struct Context<'a> {
    pub registry: &'a ParserRegistry,
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
