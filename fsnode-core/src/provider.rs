//! Configuration provider
//!
//! Single source of truth for the device configuration. Validation runs
//! once, before any value is handed out; afterwards the configuration is
//! only reachable through shared references.
//!
//! Two entry points:
//! - [`get`] validates the build configuration on first use and returns the
//!   process-wide instance
//! - [`ConfigurationProvider`] wraps a configuration validated from any
//!   source (flash overrides, tests)

use once_cell::sync::OnceCell;

use crate::config::{validate, ConfigError, DeviceConfiguration, RawConfig, BUILD_CONFIG};

/// Build configuration, validated on first access
static DEVICE_CONFIG: OnceCell<Result<DeviceConfiguration, ConfigError>> = OnceCell::new();

/// Get the process-wide device configuration
///
/// Validates the configuration embedded from `device.toml` the first time it
/// is called; later calls return the same outcome. An error here must stop
/// bring-up: nothing downstream may run on invalid configuration.
pub fn get() -> Result<&'static DeviceConfiguration, ConfigError> {
    match DEVICE_CONFIG.get_or_init(|| validate(&BUILD_CONFIG)) {
        Ok(config) => Ok(config),
        Err(e) => Err(*e),
    }
}

/// Validated, immutable device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigurationProvider {
    config: DeviceConfiguration,
}

impl ConfigurationProvider {
    /// Validate raw values eagerly
    pub fn new(raw: &RawConfig<'_>) -> Result<Self, ConfigError> {
        let config = validate(raw)?;

        info!(
            "Configuration valid: host={} port={} pin={}",
            config.hostname().as_str(),
            config.server_port(),
            config.io_pin().label()
        );

        Ok(Self { config })
    }

    /// Validate the configuration embedded at build time
    pub fn from_build() -> Result<Self, ConfigError> {
        Self::new(&BUILD_CONFIG)
    }

    /// The validated configuration; same value on every call
    pub fn get(&self) -> &DeviceConfiguration {
        &self.config
    }

    pub fn into_inner(self) -> DeviceConfiguration {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Constraint, Field};

    const SCENARIO: RawConfig<'static> = RawConfig {
        ap_secret: "sparkfun",
        sta_ssid: "cssauAP",
        sta_password: "********",
        sta_security: None,
        server_port: 80,
        hostname: "esp8266fs",
        io_pin: "D",
    };

    #[test]
    fn test_incomplete_pin_fails_fast() {
        let err = ConfigurationProvider::new(&SCENARIO).unwrap_err();
        assert_eq!(err.field, Field::PinAssignment);
        assert_eq!(err.constraint, Constraint::UnresolvedPin);
    }

    #[test]
    fn test_failure_reported_as_configuration_error() {
        let result: Result<ConfigurationProvider, crate::ConfigurationError> =
            ConfigurationProvider::new(&RawConfig {
                hostname: "",
                io_pin: "D4",
                ..SCENARIO
            });
        let err = result.unwrap_err();
        assert_eq!(err, ConfigError::new(Field::Hostname, Constraint::Empty));
        assert_eq!(format!("{}", err), "hostname: empty");
    }

    #[test]
    fn test_completed_pin_serves_record() {
        let provider = ConfigurationProvider::new(&RawConfig {
            io_pin: "D4",
            ..SCENARIO
        })
        .unwrap();
        let config = provider.get();
        assert_eq!(config.server_port(), 80);
        assert_eq!(config.hostname().as_str(), "esp8266fs");
        assert_eq!(provider.get(), provider.get());
    }

    #[test]
    fn test_shared_across_threads() {
        let provider = ConfigurationProvider::new(&RawConfig {
            io_pin: "D4",
            ..SCENARIO
        })
        .unwrap();
        let provider = &provider;
        std::thread::scope(|s| {
            let a = s.spawn(move || provider.get().server_port());
            let b = s.spawn(move || provider.get().io_pin().gpio());
            assert_eq!(a.join().unwrap(), 80);
            assert_eq!(b.join().unwrap(), 2);
        });
    }

    // device.toml ships with the incomplete pin identifier "D"
    #[test]
    fn test_build_configuration_outcome_is_stable() {
        let first = get();
        let second = get();
        assert_eq!(first, second);
        assert_eq!(
            first.map(|_| ()).unwrap_err().field,
            Field::PinAssignment
        );
        assert_eq!(
            ConfigurationProvider::from_build().map(|_| ()),
            Err(first.map(|_| ()).unwrap_err())
        );
    }
}
