use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the temperature table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column `{0}` in header row")]
    MissingColumn(String),

    #[error("line {line}: `{value}` is not a year")]
    InvalidYear { line: u64, value: String },
}
