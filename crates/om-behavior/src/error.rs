use thiserror::Error;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("behavior {0:?} is not registered")]
    Unknown(String),

    #[error("behavior {0:?} is not attached")]
    NotAttached(String),

    #[error("behavior {name:?} rejected configuration: {reason}")]
    Rejected { name: String, reason: String },

    #[error("behavior {0:?} has no method {1:?}")]
    UnknownMethod(String, String),

    #[error("invalid method pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
