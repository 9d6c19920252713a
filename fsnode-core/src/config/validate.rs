//! Configuration validation
//!
//! Turns a [`RawConfig`] into a [`DeviceConfiguration`] or reports the first
//! field that breaks its invariant. Fields are checked in declaration order.
//! Values are copied as-is: nothing is trimmed, clamped or defaulted.

use heapless::String;

use super::error::{ConfigError, Constraint, Field};
use super::pins;
use super::raw::RawConfig;
use super::secret::Passphrase;
use super::types::{
    DeviceConfiguration, Hostname, SecurityMode, Ssid, MAX_HOSTNAME_LEN, MAX_PASSPHRASE_LEN,
    MAX_SSID_LEN, MIN_PASSPHRASE_LEN,
};

/// Validate raw values into a device configuration
pub fn validate(raw: &RawConfig<'_>) -> Result<DeviceConfiguration, ConfigError> {
    let ap_secret = validate_passphrase(raw.ap_secret)
        .map_err(|c| ConfigError::new(Field::ApSecret, c))?;
    let sta_ssid = validate_ssid(raw.sta_ssid).map_err(|c| ConfigError::new(Field::StaSsid, c))?;
    let (sta_password, sta_security) = validate_station_password(raw.sta_password, raw.sta_security)
        .map_err(|c| ConfigError::new(Field::StaPassword, c))?;
    let server_port =
        validate_port(raw.server_port).map_err(|c| ConfigError::new(Field::ServerPort, c))?;
    let hostname =
        validate_hostname(raw.hostname).map_err(|c| ConfigError::new(Field::Hostname, c))?;
    let io_pin =
        pins::resolve(raw.io_pin).map_err(|c| ConfigError::new(Field::PinAssignment, c))?;

    Ok(DeviceConfiguration {
        ap_secret,
        sta_ssid,
        sta_password,
        sta_security,
        server_port,
        hostname,
        io_pin,
    })
}

/// Empty, or 8-63 printable ASCII characters
pub(crate) fn validate_passphrase(value: &str) -> Result<Passphrase, Constraint> {
    if !value.is_empty() {
        if !value.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
            return Err(Constraint::InvalidCharacter);
        }
        if value.len() < MIN_PASSPHRASE_LEN {
            return Err(Constraint::TooShort {
                min: MIN_PASSPHRASE_LEN,
            });
        }
    }
    Passphrase::new(value).ok_or(Constraint::TooLong {
        max: MAX_PASSPHRASE_LEN,
    })
}

/// An empty station passphrase is only accepted for an explicitly open network
fn validate_station_password(
    value: &str,
    security: Option<SecurityMode>,
) -> Result<(Passphrase, SecurityMode), Constraint> {
    let password = validate_passphrase(value)?;
    let security = match (password.is_empty(), security) {
        (true, Some(SecurityMode::Open)) => SecurityMode::Open,
        (true, _) => return Err(Constraint::AmbiguousSecurity),
        (false, Some(SecurityMode::Open)) => return Err(Constraint::PassphraseOnOpenNetwork),
        (false, _) => SecurityMode::Wpa2Personal,
    };
    Ok((password, security))
}

fn validate_ssid(value: &str) -> Result<Ssid, Constraint> {
    if value.is_empty() {
        return Err(Constraint::Empty);
    }
    String::try_from(value)
        .map(Ssid)
        .map_err(|_| Constraint::TooLong { max: MAX_SSID_LEN })
}

fn validate_port(value: i64) -> Result<u16, Constraint> {
    match u16::try_from(value) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(Constraint::OutOfRange {
            min: 1,
            max: u16::MAX as i64,
        }),
    }
}

/// Single DNS label: letters, digits, hyphens, no hyphen at either end
fn validate_hostname(value: &str) -> Result<Hostname, Constraint> {
    if value.is_empty() {
        return Err(Constraint::Empty);
    }
    if value.len() > MAX_HOSTNAME_LEN {
        return Err(Constraint::TooLong {
            max: MAX_HOSTNAME_LEN,
        });
    }
    if !value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return Err(Constraint::InvalidCharacter);
    }
    if value.starts_with('-') || value.ends_with('-') {
        return Err(Constraint::HyphenAtEdge);
    }
    String::try_from(value)
        .map(Hostname)
        .map_err(|_| Constraint::TooLong {
            max: MAX_HOSTNAME_LEN,
        })
}
