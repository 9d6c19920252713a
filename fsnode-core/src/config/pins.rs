//! Board pin table
//!
//! Resolves pin identifiers from configuration to ESP8266 GPIO numbers.
//! Two forms are accepted:
//! - NodeMCU/Wemos silk-screen labels `D0`-`D8`
//! - Raw GPIO names `gpioN`
//!
//! A bare prefix (`"D"`, `"gpio"`) is never resolved; there is no default pin.

use heapless::String;

use super::error::Constraint;

/// Longest pin identifier kept in the configuration
pub const MAX_PIN_LABEL_LEN: usize = 8;

/// Highest GPIO number on the ESP8266
pub const MAX_GPIO: u8 = 16;

/// NodeMCU board labels and the GPIO each one is wired to
const BOARD_LABELS: [(u8, u8); 9] = [
    (0, 16),
    (1, 5),
    (2, 4),
    (3, 0),
    (4, 2),
    (5, 14),
    (6, 12),
    (7, 13),
    (8, 15),
];

/// Resolved I/O pin
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoPin {
    label: String<MAX_PIN_LABEL_LEN>,
    gpio: u8,
}

impl IoPin {
    /// Identifier as written in the configuration
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Physical GPIO number
    pub fn gpio(&self) -> u8 {
        self.gpio
    }
}

/// Resolve a pin identifier against the board table
pub fn resolve(identifier: &str) -> Result<IoPin, Constraint> {
    if identifier.is_empty() {
        return Err(Constraint::Empty);
    }

    let gpio = if let Some(number) = strip_prefix_ignore_case(identifier, "gpio") {
        let gpio = parse_number(number)?;
        if gpio > MAX_GPIO {
            return Err(Constraint::UnresolvedPin);
        }
        gpio
    } else if let Some(number) = strip_prefix_ignore_case(identifier, "d") {
        let label = parse_number(number)?;
        BOARD_LABELS
            .iter()
            .find(|(d, _)| *d == label)
            .map(|(_, gpio)| *gpio)
            .ok_or(Constraint::UnresolvedPin)?
    } else {
        return Err(Constraint::UnresolvedPin);
    };

    if is_reserved(gpio) {
        return Err(Constraint::ReservedPin);
    }

    let label = String::try_from(identifier).map_err(|_| Constraint::UnresolvedPin)?;
    Ok(IoPin { label, gpio })
}

/// GPIO 1/3 carry the UART console, 6-11 the SPI flash bus
pub fn is_reserved(gpio: u8) -> bool {
    matches!(gpio, 1 | 3 | 6..=11)
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}

/// Parse the numeric suffix; an empty suffix is the incomplete-label case
fn parse_number(digits: &str) -> Result<u8, Constraint> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Constraint::UnresolvedPin);
    }
    digits.parse().map_err(|_| Constraint::UnresolvedPin)
}
