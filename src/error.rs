//! Error types for taskdeck
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (unknown id, missing required field, bad input)
//! - 4: Operation failed (io error, malformed data file)

use thiserror::Error;

/// Exit codes for the taskdeck CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskdeck operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Task not found: {0}")]
    TaskNotFound(u32),

    #[error("Category not found: {0}")]
    CategoryNotFound(u32),

    #[error("Validation failed: {0}")]
    Validation(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::TaskNotFound(_) | Error::CategoryNotFound(_) | Error::Validation(_) => {
                exit_codes::USER_ERROR
            }
            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for taskdeck operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_map_by_kind() {
        assert_eq!(Error::TaskNotFound(7).exit_code(), exit_codes::USER_ERROR);
        assert_eq!(
            Error::CategoryNotFound(2).exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(
            Error::Validation("title is required".into()).exit_code(),
            exit_codes::USER_ERROR
        );
        let io = Error::Io(std::io::Error::other("disk"));
        assert_eq!(io.exit_code(), exit_codes::OPERATION_FAILED);
    }
}
