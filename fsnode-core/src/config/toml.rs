//! Simple TOML parser for device configuration
//!
//! A minimal parser for the `device.toml` subset, used for configuration
//! text provisioned into flash. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - `[section]` headers (`ap`, `station`, `server`, `network`, `gpio`)
//! - Key = value pairs (string, integer)
//! - Basic `"..."` and literal `'...'` single-line strings
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings and escape sequences (a backslash is rejected)
//! - Arrays, inline tables, dotted keys
//!
//! Like the build script, it rejects duplicate keys and repeated sections.
//!
//! Parsed values borrow from the input; nothing is validated beyond syntax.

use super::raw::RawConfig;
use super::types::{SecurityMode, DEFAULT_SERVER_PORT};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Key not known in its section
    UnknownKey,
    /// Value has the wrong type or an unknown enum value
    InvalidValue,
    /// Required key missing
    MissingKey(&'static str),
    /// Key given twice
    DuplicateKey,
    /// Section header given twice
    DuplicateSection,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Ap,
    Station,
    Server,
    Network,
    Gpio,
}

/// Values seen so far; `None` means the key was absent
#[derive(Default)]
struct Partial<'a> {
    ap_secret: Option<&'a str>,
    sta_ssid: Option<&'a str>,
    sta_password: Option<&'a str>,
    sta_security: Option<SecurityMode>,
    server_port: Option<i64>,
    hostname: Option<&'a str>,
    io_pin: Option<&'a str>,
}

/// Parse configuration text into raw values
///
/// Secrets default to empty and the port to 80 when absent; the station
/// SSID, hostname and pin are required.
pub fn parse_config(input: &str) -> Result<RawConfig<'_>, ParseError> {
    let mut partial = Partial::default();
    let mut section = Section::Root;
    let mut seen = 0u8;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            let bit = 1 << section as u8;
            if seen & bit != 0 {
                return Err(ParseError::DuplicateSection);
            }
            seen |= bit;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(&mut partial, section, key, value)?;
    }

    Ok(RawConfig {
        ap_secret: partial.ap_secret.unwrap_or(""),
        sta_ssid: partial.sta_ssid.ok_or(ParseError::MissingKey("station.ssid"))?,
        sta_password: partial.sta_password.unwrap_or(""),
        sta_security: partial.sta_security,
        server_port: partial
            .server_port
            .unwrap_or(i64::from(DEFAULT_SERVER_PORT)),
        hostname: partial
            .hostname
            .ok_or(ParseError::MissingKey("network.hostname"))?,
        io_pin: partial.io_pin.ok_or(ParseError::MissingKey("gpio.pin"))?,
    })
}

/// Parse a `[section]` line, trailing comment allowed
fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let end = line.find(']').ok_or(ParseError::InvalidSection)?;
    let rest = line[end + 1..].trim();
    if !rest.is_empty() && !rest.starts_with('#') {
        return Err(ParseError::InvalidSection);
    }

    match line[1..end].trim() {
        "ap" => Ok(Section::Ap),
        "station" => Ok(Section::Station),
        "server" => Ok(Section::Server),
        "network" => Ok(Section::Network),
        "gpio" => Ok(Section::Gpio),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Split a `key = value` line, dropping an inline comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = find_comment(value) {
        value[..hash_pos].trim()
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Position of the first `#` outside a quoted string
fn find_comment(value: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in value.char_indices() {
        match (c, quote) {
            ('"' | '\'', None) => quote = Some(c),
            (c, Some(q)) if c == q => quote = None,
            ('#', None) => return Some(i),
            _ => {}
        }
    }
    None
}

/// Parse a basic or literal string value
fn parse_string(value: &str) -> Result<&str, ParseError> {
    let quote = match value.chars().next() {
        Some(q @ ('"' | '\'')) => q,
        _ => return Err(ParseError::InvalidValue),
    };
    if value.len() < 2 || !value.ends_with(quote) {
        return Err(ParseError::InvalidValue);
    }

    let inner = &value[1..value.len() - 1];
    if inner.contains(quote) || inner.contains('\\') || inner.chars().any(char::is_control) {
        return Err(ParseError::InvalidValue);
    }
    Ok(inner)
}

/// Parse an integer value
fn parse_int(value: &str) -> Result<i64, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_security(value: &str) -> Result<SecurityMode, ParseError> {
    match parse_string(value)? {
        "open" => Ok(SecurityMode::Open),
        "wpa2" => Ok(SecurityMode::Wpa2Personal),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Store a value once; a second assignment is an error
fn set_once<T>(slot: &mut Option<T>, value: T) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::DuplicateKey);
    }
    *slot = Some(value);
    Ok(())
}

fn apply_value<'a>(
    partial: &mut Partial<'a>,
    section: Section,
    key: &str,
    value: &'a str,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Root, _) => Err(ParseError::InvalidSection),
        (Section::Ap, "secret") => set_once(&mut partial.ap_secret, parse_string(value)?),
        (Section::Station, "ssid") => set_once(&mut partial.sta_ssid, parse_string(value)?),
        (Section::Station, "password") => {
            set_once(&mut partial.sta_password, parse_string(value)?)
        }
        (Section::Station, "security") => {
            set_once(&mut partial.sta_security, parse_security(value)?)
        }
        (Section::Server, "port") => set_once(&mut partial.server_port, parse_int(value)?),
        (Section::Network, "hostname") => set_once(&mut partial.hostname, parse_string(value)?),
        (Section::Gpio, "pin") => set_once(&mut partial.io_pin, parse_string(value)?),
        _ => Err(ParseError::UnknownKey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE_TOML: &str = r#"
# Access point
[ap]
secret = "sparkfun"

[station]
ssid = "cssauAP"
password = "********"

[server]
port = 80   # standard web port

[network]
hostname = "esp8266fs"

[gpio]
pin = "D"
"#;

    #[test]
    fn test_parse_full_config() {
        let raw = parse_config(DEVICE_TOML).unwrap();
        assert_eq!(raw.ap_secret, "sparkfun");
        assert_eq!(raw.sta_ssid, "cssauAP");
        assert_eq!(raw.sta_password, "********");
        assert_eq!(raw.sta_security, None);
        assert_eq!(raw.server_port, 80);
        assert_eq!(raw.hostname, "esp8266fs");
        assert_eq!(raw.io_pin, "D");
    }

    #[test]
    fn test_defaults_for_optional_keys() {
        let raw = parse_config(
            r#"
[station]
ssid = "cafe"
security = "open"
[network]
hostname = "node"
[gpio]
pin = "gpio2"
"#,
        )
        .unwrap();
        assert_eq!(raw.ap_secret, "");
        assert_eq!(raw.sta_password, "");
        assert_eq!(raw.sta_security, Some(SecurityMode::Open));
        assert_eq!(raw.server_port, 80);
    }

    #[test]
    fn test_hash_inside_string_kept() {
        let raw = parse_config(
            "[station]\nssid = \"lab#2\" # comment\n[network]\nhostname = \"n\"\n[gpio]\npin = \"D1\"\n",
        )
        .unwrap();
        assert_eq!(raw.sta_ssid, "lab#2");
    }

    #[test]
    fn test_negative_port_reaches_validation() {
        let raw = parse_config(
            "[station]\nssid = \"s\"\n[server]\nport = -1\n[network]\nhostname = \"n\"\n[gpio]\npin = \"D1\"\n",
        )
        .unwrap();
        assert_eq!(raw.server_port, -1);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_config("[wifi]\n"), Err(ParseError::InvalidSection));
        assert_eq!(
            parse_config("ssid = \"x\"\n"),
            Err(ParseError::InvalidSection)
        );
        assert_eq!(
            parse_config("[station]\nchannel = 6\n"),
            Err(ParseError::UnknownKey)
        );
        assert_eq!(
            parse_config("[station]\nssid = cssauAP\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[server]\nport = \"80\"\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[station]\nsecurity = \"wep\"\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(parse_config("[station]\nssid\n"), Err(ParseError::InvalidLine));
        assert_eq!(
            parse_config("[station]\nssid = \"s\"\n"),
            Err(ParseError::MissingKey("network.hostname"))
        );
    }

    #[test]
    fn test_shipped_file_matches_build_configuration() {
        let raw = parse_config(include_str!("../../device.toml"));
        assert_eq!(raw, Ok(crate::config::BUILD_CONFIG));
    }

    #[test]
    fn test_duplicates_rejected() {
        assert_eq!(
            parse_config("[station]\nssid = \"a\"\nssid = \"b\"\n"),
            Err(ParseError::DuplicateKey)
        );
        assert_eq!(
            parse_config("[server]\nport = 80\n[network]\n[server]\n"),
            Err(ParseError::DuplicateSection)
        );
    }

    #[test]
    fn test_ap_section_optional() {
        let text = DEVICE_TOML.replace("[ap]\nsecret = \"sparkfun\"\n", "");
        let raw = parse_config(&text).unwrap();
        assert_eq!(raw.ap_secret, "");
        assert_eq!(raw.sta_ssid, "cssauAP");
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(parse_string("'lab \"2\"'"), Ok("lab \"2\""));
        assert_eq!(parse_string("\"it's\""), Ok("it's"));
        assert_eq!(parse_string("\"a\\tb\""), Err(ParseError::InvalidValue));
        assert_eq!(parse_string("'a\\b'"), Err(ParseError::InvalidValue));
        assert_eq!(parse_string("\"a\tb\""), Err(ParseError::InvalidValue));
        assert_eq!(parse_string("'open\""), Err(ParseError::InvalidValue));
        assert_eq!(parse_string("'"), Err(ParseError::InvalidValue));

        let raw = parse_config(
            "[station]\nssid = 'lab#2' # comment\n[network]\nhostname = \"n\"\n[gpio]\npin = 'D1'\n",
        )
        .unwrap();
        assert_eq!(raw.sta_ssid, "lab#2");
        assert_eq!(raw.io_pin, "D1");
    }

    #[test]
    fn test_section_header() {
        assert_eq!(parse_section_header("[gpio]"), Ok(Section::Gpio));
        assert_eq!(parse_section_header("[ network ] # pins"), Ok(Section::Network));
        assert_eq!(
            parse_section_header("[gpio] pin"),
            Err(ParseError::InvalidSection)
        );
        assert_eq!(parse_section_header("[gpio"), Err(ParseError::InvalidSection));
    }
}
