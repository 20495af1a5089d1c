use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("condition field is required")]
    EmptyField,
    #[error("condition relation is required")]
    EmptyRelation,
    #[error("invalid logical operator: {0}")]
    InvalidLogicalOperator(String),
}
