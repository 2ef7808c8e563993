use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid report snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Unknown {kind} id: {index}")]
    UnknownNode { kind: &'static str, index: usize },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid filter configuration: {0}")]
    InvalidConfig(String),
}
