use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a generate or compare run outright.
///
/// A dataset that disagrees with the ground truth is not an error; that is
/// reported through [`crate::compare::Report`].
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("delimited write failed: {0}")]
    Csv(#[from] csv::Error),

    /// The converted dataset could not be opened for reading
    #[error("cannot open dataset {path}: {message}")]
    DatasetOpen { path: PathBuf, message: String },

    /// A variable named in the schema is absent from the dataset
    #[error("dataset has no variable named {name}")]
    MissingVariable { name: String },

    #[error("invalid cohort: {message}")]
    InvalidCohort { message: String },
}

pub type Result<T> = std::result::Result<T, OracleError>;

impl OracleError {
    pub fn dataset_open(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DatasetOpen {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn missing_variable(name: impl Into<String>) -> Self {
        Self::MissingVariable { name: name.into() }
    }

    pub fn invalid_cohort(message: impl Into<String>) -> Self {
        Self::InvalidCohort {
            message: message.into(),
        }
    }
}
