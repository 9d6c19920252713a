//! Configuration validation errors

use core::fmt;

/// Configuration field that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    ApSecret,
    StaSsid,
    StaPassword,
    ServerPort,
    Hostname,
    PinAssignment,
}

impl Field {
    /// Field name as used in diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            Field::ApSecret => "apSecret",
            Field::StaSsid => "staSsid",
            Field::StaPassword => "staPassword",
            Field::ServerPort => "serverPort",
            Field::Hostname => "hostname",
            Field::PinAssignment => "pinAssignment",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Constraint a field value violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Constraint {
    /// Value is empty but must not be
    Empty,
    /// Value is shorter than the minimum length
    TooShort { min: usize },
    /// Value is longer than the maximum length (bytes)
    TooLong { max: usize },
    /// Value contains a character outside the allowed set
    InvalidCharacter,
    /// DNS label starts or ends with a hyphen
    HyphenAtEdge,
    /// Number outside the allowed range
    OutOfRange { min: i64, max: i64 },
    /// Empty passphrase without an explicit open security mode
    AmbiguousSecurity,
    /// Passphrase given for a network declared open
    PassphraseOnOpenNetwork,
    /// Pin identifier does not name a pin on this board
    UnresolvedPin,
    /// Pin exists but is reserved (flash bus, UART console)
    ReservedPin,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Empty => f.write_str("empty"),
            Constraint::TooShort { min } => write!(f, "shorter than {} characters", min),
            Constraint::TooLong { max } => write!(f, "longer than {} bytes", max),
            Constraint::InvalidCharacter => f.write_str("invalid character"),
            Constraint::HyphenAtEdge => f.write_str("leading or trailing hyphen"),
            Constraint::OutOfRange { min, max } => write!(f, "outside {}-{}", min, max),
            Constraint::AmbiguousSecurity => {
                f.write_str("empty passphrase without open security mode")
            }
            Constraint::PassphraseOnOpenNetwork => f.write_str("passphrase set for open network"),
            Constraint::UnresolvedPin => f.write_str("unresolved pin identifier"),
            Constraint::ReservedPin => f.write_str("reserved pin"),
        }
    }
}

/// A configuration value failed its invariant
///
/// Startup must not continue past this error: the offending field and the
/// violated constraint are reported and nothing is substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigError {
    pub field: Field,
    pub constraint: Constraint,
}

impl ConfigError {
    pub const fn new(field: Field, constraint: Constraint) -> Self {
        Self { field, constraint }
    }
}

/// Name used by firmware bootstrap code for the validation failure
pub type ConfigurationError = ConfigError;

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_diagnostic_names_field_and_constraint() {
        let err = ConfigError::new(Field::Hostname, Constraint::Empty);
        assert_eq!(err.to_string(), "hostname: empty");

        let err = ConfigError::new(Field::PinAssignment, Constraint::UnresolvedPin);
        assert_eq!(err.to_string(), "pinAssignment: unresolved pin identifier");

        let err = ConfigError::new(
            Field::ServerPort,
            Constraint::OutOfRange { min: 1, max: 65535 },
        );
        assert_eq!(err.to_string(), "serverPort: outside 1-65535");
    }
}
