//! Named parser strategies and the runtime-selectable active subset.
//!
//! The registered strategies are fixed when the registry is built. Only the
//! active set changes afterwards, and it is swapped as a whole snapshot so a
//! concurrent [`ParserRegistry::dispatch`] sees either the old set or the new
//! one.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use thiserror::Error;
use tracing::debug;

use crate::domain::FilterGroup;
use crate::filter::{Format1Parser, ParseError, QueryParser, SimpleParser};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown parser: {0}")]
    UnknownParser(String),
    #[error("duplicate parser name: {0}")]
    DuplicateParser(String),
    #[error("parser name must be non-empty lowercase: {0:?}")]
    InvalidParserName(String),
}

pub struct ParserRegistry {
    parsers: Vec<Box<dyn QueryParser>>,
    // indexes into `parsers`, ascending
    active: RwLock<Arc<[usize]>>,
}

static GLOBAL: OnceLock<ParserRegistry> = OnceLock::new();

/// Process-wide registry with the built-in grammars, built on first use.
pub fn global() -> &'static ParserRegistry {
    GLOBAL.get_or_init(ParserRegistry::with_builtin_parsers)
}

impl ParserRegistry {
    /// Registers `parsers` in the given order; all of them start active.
    ///
    /// Names must be unique, non-empty and already lowercase, since
    /// [`ParserRegistry::set_active`] lowercases what it is given.
    pub fn from_parsers(parsers: Vec<Box<dyn QueryParser>>) -> Result<Self, RegistryError> {
        for (idx, parser) in parsers.iter().enumerate() {
            let name = parser.name();
            if name.is_empty() || name != name.trim().to_ascii_lowercase() {
                return Err(RegistryError::InvalidParserName(name.to_string()));
            }
            if parsers[..idx].iter().any(|p| p.name() == name) {
                return Err(RegistryError::DuplicateParser(name.to_string()));
            }
        }
        Ok(Self::all_active(parsers))
    }

    pub fn with_builtin_parsers() -> Self {
        Self::all_active(vec![
            Box::new(Format1Parser) as Box<dyn QueryParser>,
            Box::new(SimpleParser),
        ])
    }

    fn all_active(parsers: Vec<Box<dyn QueryParser>>) -> Self {
        let active: Arc<[usize]> = (0..parsers.len()).collect();
        Self {
            parsers,
            active: RwLock::new(active),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn QueryParser> {
        self.position(name).map(|idx| self.parsers[idx].as_ref())
    }

    /// Replaces the active set. Unknown names reject the whole call and leave
    /// the current set untouched.
    pub fn set_active<I, S>(&self, names: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = Vec::new();
        for name in names {
            let normalized = name.as_ref().trim().to_ascii_lowercase();
            let idx = self
                .position(&normalized)
                .ok_or(RegistryError::UnknownParser(normalized))?;
            selected.push(idx);
        }
        selected.sort_unstable();
        selected.dedup();

        let names: Vec<&str> = selected.iter().map(|&idx| self.parsers[idx].name()).collect();
        debug!(active = ?names, "active parsers replaced");

        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Arc::from(selected);
        Ok(())
    }

    /// Returns `(registered, active)` names, both in registration order.
    pub fn active_parsers(&self) -> (Vec<&'static str>, Vec<&'static str>) {
        let all = self.parsers.iter().map(|p| p.name()).collect();
        let active = self
            .active_snapshot()
            .iter()
            .map(|&idx| self.parsers[idx].name())
            .collect();
        (all, active)
    }

    pub fn is_active(&self, name: &str) -> bool {
        match self.position(name) {
            Some(idx) => self.active_snapshot().contains(&idx),
            None => false,
        }
    }

    /// Hands `input` to the first active parser that claims it. A claimed
    /// input's parse error is final; later parsers are not tried.
    pub fn dispatch(&self, input: &str) -> Result<FilterGroup, ParseError> {
        let active = self.active_snapshot();
        for &idx in active.iter() {
            let parser = &self.parsers[idx];
            if parser.can_parse(input) {
                debug!(parser = parser.name(), "parser claimed input");
                return parser.parse(input);
            }
        }
        debug!(input, "no active parser claimed input");
        Err(ParseError::bad_format())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.parsers.iter().position(|p| p.name() == name)
    }

    fn active_snapshot(&self) -> Arc<[usize]> {
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_builtin_parsers()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (all, active) = self.active_parsers();
        f.debug_struct("ParserRegistry")
            .field("parsers", &all)
            .field("active", &active)
            .finish()
    }
}
