use thiserror::Error;

use crate::parse::ParseError;

/// Unified error type covering source-document parsing and I/O.
///
/// Returned by convenience methods like
/// [`MihomoConfig::from_yaml()`](crate::MihomoConfig::from_yaml) and
/// [`MihomoConfig::from_file()`](crate::MihomoConfig::from_file). Rule
/// translation itself never fails; per-rule problems become comment lines in
/// the output.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
