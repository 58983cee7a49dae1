use thiserror::Error;

/// Usage errors raised while building a graph.
///
/// Every variant is raised before anything is allocated, so a failed call
/// leaves the graph exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid operand for `{op}`: {reason}")]
    InvalidOperand { op: &'static str, reason: String },

    #[error("operand of `{op}` belongs to a different graph")]
    TypeMismatch { op: &'static str },
}

impl EngineError {
    pub fn invalid_operand(op: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidOperand {
            op,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
