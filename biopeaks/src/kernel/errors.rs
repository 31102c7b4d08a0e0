use biopeaks_core::Error;
use core::fmt;

/// Validation errors raised at kernel construction or adapter binding time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required input or configuration field is empty.
    EmptyInput {
        /// Name of the argument that is empty.
        arg: &'static str,
    },
    /// A configuration argument value is invalid.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyInput { arg } => write!(f, "Input `{arg}` was empty."),
            ConfigError::InvalidArgument { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::EmptyInput { arg } => Error::InvalidInput {
                reason: format!("`{arg}` must be non-empty."),
            },
            ConfigError::InvalidArgument { arg, reason } => Error::InvalidArg {
                arg: arg.into(),
                reason: reason.into(),
            },
            ConfigError::NonContiguous { arg } => Error::InvalidInput {
                reason: format!("`{arg}` is not contiguous in memory."),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_onto_pipeline_taxonomy() {
        let err: Error = ConfigError::InvalidArgument {
            arg: "cluster_count",
            reason: "must be > 0",
        }
        .into();
        assert_eq!(
            err,
            Error::InvalidArg {
                arg: "cluster_count".into(),
                reason: "must be > 0".into(),
            }
        );

        let err: Error = ConfigError::EmptyInput { arg: "signal" }.into();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }
}
