pub mod condition;
pub mod group;

pub use condition::Condition;
pub use group::{FilterGroup, LogicalOperator};
