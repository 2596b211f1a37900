use thiserror::Error;

/// Every way a loan calculation can be rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoanError {
    /// The supplied combination of present, absent and non-positive fields
    /// does not select exactly one calculation.
    #[error("Incorrect parameters")]
    InvalidParameters(String),

    /// The inputs passed validation but the formula is undefined for them.
    #[error("Cannot compute: {0}")]
    Domain(String),
}

impl LoanError {
    pub fn reason(&self) -> &str {
        match self {
            LoanError::InvalidParameters(reason) | LoanError::Domain(reason) => reason,
        }
    }
}

pub type LoanResult<T> = Result<T, LoanError>;
