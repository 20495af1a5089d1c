pub mod domain;
pub mod error;
pub mod filter;
pub mod query;
pub mod registry;

pub use domain::*;
pub use error::CoreError;
pub use filter::{Format1Parser, ParseError, ParseErrorKind, QueryParser, SimpleParser};
pub use query::{Paging, ReadQuery, MAX_ENTITIES_PER_PAGE};
pub use registry::{ParserRegistry, RegistryError};
