use super::ConfigError;

/// Constructor validation lifecycle shared by kernel structs.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}

/// Reject a non-finite or non-positive frequency-like argument.
pub(crate) fn require_positive(arg: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidArgument {
            arg,
            reason: "must be finite and > 0",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_positive, ConfigError, KernelLifecycle};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct DummyConfig {
        gain: usize,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct DummyKernel {
        gain: usize,
    }

    impl KernelLifecycle for DummyKernel {
        type Config = DummyConfig;

        fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
            if config.gain == 0 {
                return Err(ConfigError::InvalidArgument {
                    arg: "gain",
                    reason: "gain must be greater than zero",
                });
            }
            Ok(Self { gain: config.gain })
        }
    }

    #[test]
    fn lifecycle_constructor_accepts_valid_config() {
        let kernel = DummyKernel::try_new(DummyConfig { gain: 4 }).expect("valid config");
        assert_eq!(kernel.gain, 4);
    }

    #[test]
    fn lifecycle_constructor_rejects_invalid_config() {
        let err = DummyKernel::try_new(DummyConfig { gain: 0 }).expect_err("invalid config");
        assert_eq!(
            err,
            ConfigError::InvalidArgument {
                arg: "gain",
                reason: "gain must be greater than zero",
            }
        );
    }

    #[test]
    fn positive_check_rejects_nan_and_zero() {
        assert!(require_positive("fs", 250.0).is_ok());
        assert!(require_positive("fs", 0.0).is_err());
        assert!(require_positive("fs", f64::NAN).is_err());
    }
}
