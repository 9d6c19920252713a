//! Unvalidated configuration values
//!
//! [`RawConfig`] is what configuration sources produce: the build-time
//! `device.toml`, configuration text read from flash, or a stored snapshot.
//! Nothing here is checked; see [`validate`](super::validate).

use core::fmt;

use super::types::SecurityMode;

/// Configuration values as written, borrowed from their source
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawConfig<'a> {
    pub ap_secret: &'a str,
    pub sta_ssid: &'a str,
    pub sta_password: &'a str,
    /// Explicit station security mode, if the source gave one
    pub sta_security: Option<SecurityMode>,
    /// Kept wide so out-of-range values reach validation intact
    pub server_port: i64,
    pub hostname: &'a str,
    pub io_pin: &'a str,
}

impl fmt::Debug for RawConfig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawConfig")
            .field("ap_secret", &"<redacted>")
            .field("sta_ssid", &self.sta_ssid)
            .field("sta_password", &"<redacted>")
            .field("sta_security", &self.sta_security)
            .field("server_port", &self.server_port)
            .field("hostname", &self.hostname)
            .field("io_pin", &self.io_pin)
            .finish()
    }
}

// BUILD_CONFIG is generated from device.toml by build.rs
include!(concat!(env!("OUT_DIR"), "/build_config.rs"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_embedded() {
        assert!(!BUILD_CONFIG.sta_ssid.is_empty());
        assert!(!BUILD_CONFIG.hostname.is_empty());
        assert!(BUILD_CONFIG.server_port > 0);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let shown = format!("{:?}", BUILD_CONFIG);
        assert!(shown.contains("<redacted>"));
        if !BUILD_CONFIG.ap_secret.is_empty() {
            assert!(!shown.contains(BUILD_CONFIG.ap_secret));
        }
    }
}
