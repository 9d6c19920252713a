//! Validated configuration types
//!
//! Values of these types only come out of [`validate`](super::validate), so
//! holding one means its invariants hold. Fields are private and exposed by
//! shared reference only.

use heapless::String;
use serde::{Deserialize, Serialize};

use super::pins::IoPin;
use super::secret::Passphrase;

/// Maximum SSID length in bytes (IEEE 802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Minimum WPA2 passphrase length
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// Maximum WPA2 passphrase length (ASCII form)
pub const MAX_PASSPHRASE_LEN: usize = 63;

/// Maximum DNS label length
pub const MAX_HOSTNAME_LEN: usize = 63;

/// Standard web port
pub const DEFAULT_SERVER_PORT: u16 = 80;

/// Wireless security mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SecurityMode {
    /// No encryption; passphrase must be empty
    Open,
    /// WPA2 with a pre-shared passphrase
    Wpa2Personal,
}

/// Wireless network name
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ssid(pub(crate) String<MAX_SSID_LEN>);

impl Ssid {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// DNS label the device advertises
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hostname(pub(crate) String<MAX_HOSTNAME_LEN>);

impl Hostname {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Complete, validated device configuration
///
/// Built once at startup and never mutated afterwards. Consumers:
/// - AP bring-up reads [`ap_secret`](Self::ap_secret)
/// - Station bring-up reads the `sta_*` fields
/// - The HTTP server reads [`server_port`](Self::server_port) and
///   [`hostname`](Self::hostname)
/// - The GPIO driver reads [`io_pin`](Self::io_pin)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfiguration {
    pub(crate) ap_secret: Passphrase,
    pub(crate) sta_ssid: Ssid,
    pub(crate) sta_password: Passphrase,
    pub(crate) sta_security: SecurityMode,
    pub(crate) server_port: u16,
    pub(crate) hostname: Hostname,
    pub(crate) io_pin: IoPin,
}

impl DeviceConfiguration {
    /// Passphrase of the hosted access point (empty for an open AP)
    pub fn ap_secret(&self) -> &Passphrase {
        &self.ap_secret
    }

    /// Security mode of the hosted access point
    pub fn ap_security(&self) -> SecurityMode {
        if self.ap_secret.is_empty() {
            SecurityMode::Open
        } else {
            SecurityMode::Wpa2Personal
        }
    }

    /// SSID of the network to join
    pub fn sta_ssid(&self) -> &Ssid {
        &self.sta_ssid
    }

    /// Passphrase of the network to join (empty only when open)
    pub fn sta_password(&self) -> &Passphrase {
        &self.sta_password
    }

    /// Security mode of the network to join
    pub fn sta_security(&self) -> SecurityMode {
        self.sta_security
    }

    /// HTTP listening port, never zero
    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn hostname(&self) -> &Hostname {
        &self.hostname
    }

    /// Designated I/O pin, resolved against the board pin table
    pub fn io_pin(&self) -> &IoPin {
        &self.io_pin
    }
}
