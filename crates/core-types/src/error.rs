use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("Column '{column}' has {actual} values but the date index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}
