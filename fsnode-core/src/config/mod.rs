//! Configuration types
//!
//! Raw build-time values, their validated form, and the rules between them.

pub mod error;
pub mod pins;
pub mod raw;
pub mod secret;
pub mod toml;
pub mod types;
pub mod validate;

pub use error::{ConfigError, ConfigurationError, Constraint, Field};
pub use pins::{IoPin, MAX_PIN_LABEL_LEN};
pub use raw::{RawConfig, BUILD_CONFIG};
pub use secret::{Passphrase, Secret, SecretKind, SecretSource};
pub use types::*;
pub use validate::validate;
