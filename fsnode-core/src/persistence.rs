//! Configuration persistence
//!
//! Loads device configuration from flash storage, falling back to the
//! build configuration when nothing is stored. Sources, in order:
//!
//! 1. Configuration text under [`StorageKey::DeviceConfigToml`]
//! 2. Binary snapshot under [`StorageKey::DeviceConfig`] (postcard)
//! 3. [`BUILD_CONFIG`] embedded from `device.toml`
//!
//! Passphrases provisioned under their own keys override whatever the source
//! provides. Snapshots never contain passphrases; saving writes them under
//! their own keys instead.
//!
//! Stored data that is present but broken is an error; it never falls back
//! to a different source.

use core::str;

use heapless::String;
use serde::{Deserialize, Serialize};

use fsnode_hal::{FlashError, FlashStorage, StorageKey};

use crate::config::toml::{parse_config, ParseError};
use crate::config::validate::validate_passphrase;
use crate::config::{
    ConfigError, DeviceConfiguration, Field, RawConfig, SecretKind, SecretSource, SecurityMode,
    BUILD_CONFIG, MAX_HOSTNAME_LEN, MAX_PASSPHRASE_LEN, MAX_PIN_LABEL_LEN, MAX_SSID_LEN,
};
use crate::provider::ConfigurationProvider;

/// Snapshot format version
pub const CONFIG_VERSION: u8 = 1;

/// Maximum configuration text size
const MAX_TOML_SIZE: usize = 1024;

/// Maximum serialized snapshot size
const MAX_SNAPSHOT_SIZE: usize = 192;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Flash operation failed
    Flash(FlashError),
    /// Invalid UTF-8 in stored text
    InvalidUtf8,
    /// Configuration text parsing failed
    Parse(ParseError),
    /// Snapshot serialization failed
    Serialize,
    /// Snapshot deserialization failed
    Deserialize,
    /// Snapshot version mismatch
    VersionMismatch,
    /// Loaded values failed validation
    Config(ConfigError),
}

impl From<FlashError> for LoadError {
    fn from(e: FlashError) -> Self {
        LoadError::Flash(e)
    }
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        LoadError::Parse(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Config(e)
    }
}

impl SecretKind {
    /// Flash key the secret is provisioned under
    pub fn storage_key(self) -> StorageKey {
        match self {
            SecretKind::ApSecret => StorageKey::ApSecret,
            SecretKind::StaPassword => StorageKey::StaPassword,
        }
    }

    fn field(self) -> Field {
        match self {
            SecretKind::ApSecret => Field::ApSecret,
            SecretKind::StaPassword => Field::StaPassword,
        }
    }
}

/// Stored snapshot of the non-secret configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredConfig {
    version: u8,
    sta_ssid: String<MAX_SSID_LEN>,
    sta_security: SecurityMode,
    server_port: u16,
    hostname: String<MAX_HOSTNAME_LEN>,
    io_pin: String<MAX_PIN_LABEL_LEN>,
}

impl StoredConfig {
    fn from_config(config: &DeviceConfiguration) -> Result<Self, LoadError> {
        Ok(Self {
            version: CONFIG_VERSION,
            sta_ssid: config.sta_ssid.0.clone(),
            sta_security: config.sta_security(),
            server_port: config.server_port(),
            hostname: config.hostname.0.clone(),
            io_pin: String::try_from(config.io_pin().label()).map_err(|_| LoadError::Serialize)?,
        })
    }

    /// Raw values with the build-time passphrases, until flash ones overlay them
    fn as_raw(&self) -> RawConfig<'_> {
        RawConfig {
            ap_secret: BUILD_CONFIG.ap_secret,
            sta_ssid: self.sta_ssid.as_str(),
            sta_password: match self.sta_security {
                SecurityMode::Open => "",
                SecurityMode::Wpa2Personal => BUILD_CONFIG.sta_password,
            },
            sta_security: Some(self.sta_security),
            server_port: i64::from(self.server_port),
            hostname: self.hostname.as_str(),
            io_pin: self.io_pin.as_str(),
        }
    }
}

/// Secrets provisioned into flash
pub struct FlashSecrets<'s, S> {
    storage: &'s mut S,
}

impl<'s, S: FlashStorage> FlashSecrets<'s, S> {
    pub fn new(storage: &'s mut S) -> Self {
        Self { storage }
    }
}

impl<S: FlashStorage> SecretSource for FlashSecrets<'_, S> {
    type Error = LoadError;

    async fn fetch<'b>(
        &mut self,
        kind: SecretKind,
        buffer: &'b mut [u8],
    ) -> Result<Option<&'b str>, LoadError> {
        let len = match self.storage.read(kind.storage_key(), buffer).await {
            Ok(len) => len,
            Err(FlashError::NotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let secret = str::from_utf8(&buffer[..len]).map_err(|_| LoadError::InvalidUtf8)?;
        Ok(Some(secret))
    }
}

/// Configuration persistence manager
pub struct ConfigPersistence<S> {
    storage: S,
}

impl<S: FlashStorage> ConfigPersistence<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Consume this persistence manager and return the underlying storage
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Load and validate the device configuration
    pub async fn load(&mut self) -> Result<ConfigurationProvider, LoadError> {
        info!("Loading configuration from flash...");

        let mut text_buffer = [0u8; MAX_TOML_SIZE];
        let stored;

        let mut raw = match self.read_text(&mut text_buffer).await {
            Ok(text) => {
                info!("Using configuration text from flash");
                parse_config(text)?
            }
            Err(LoadError::Flash(FlashError::NotFound)) => match self.read_snapshot().await {
                Ok(snapshot) => {
                    info!("Using configuration snapshot from flash");
                    stored = snapshot;
                    stored.as_raw()
                }
                Err(LoadError::Flash(FlashError::NotFound)) => {
                    info!("No stored configuration, using build configuration");
                    BUILD_CONFIG
                }
                Err(e) => return Err(e),
            },
            Err(e) => return Err(e),
        };

        let mut ap_buffer = [0u8; MAX_PASSPHRASE_LEN];
        let mut sta_buffer = [0u8; MAX_PASSPHRASE_LEN];
        let mut secrets = FlashSecrets::new(&mut self.storage);

        if let Some(secret) = secrets.fetch(SecretKind::ApSecret, &mut ap_buffer).await? {
            debug!("Using provisioned AP secret");
            raw.ap_secret = secret;
        }
        if let Some(secret) = secrets.fetch(SecretKind::StaPassword, &mut sta_buffer).await? {
            debug!("Using provisioned station password");
            raw.sta_password = secret;
        }

        ConfigurationProvider::new(&raw).map_err(|e| {
            warn!("Configuration invalid: {}", e);
            LoadError::Config(e)
        })
    }

    /// Store a validated configuration
    ///
    /// The snapshot holds everything but the passphrases, which are written
    /// under their own keys so a reload yields the same configuration.
    pub async fn save(&mut self, config: &DeviceConfiguration) -> Result<(), LoadError> {
        let stored = StoredConfig::from_config(config)?;
        let mut buffer = [0u8; MAX_SNAPSHOT_SIZE];
        let bytes = postcard::to_slice(&stored, &mut buffer).map_err(|_| LoadError::Serialize)?;

        self.storage
            .write(StorageKey::ApSecret, config.ap_secret().expose().as_bytes())
            .await?;
        self.storage
            .write(
                StorageKey::StaPassword,
                config.sta_password().expose().as_bytes(),
            )
            .await?;

        debug!("Writing {} byte configuration snapshot", bytes.len());
        self.storage.write(StorageKey::DeviceConfig, bytes).await?;
        Ok(())
    }

    /// Erase everything stored; the next load uses the build configuration
    pub async fn factory_reset(&mut self) -> Result<(), LoadError> {
        warn!("Erasing stored configuration");
        self.storage.erase_all().await?;
        Ok(())
    }

    /// Store configuration text; takes precedence over any snapshot
    ///
    /// The text must parse, otherwise nothing is written.
    pub async fn provision_text(&mut self, text: &str) -> Result<(), LoadError> {
        parse_config(text)?;
        if text.len() > MAX_TOML_SIZE {
            return Err(LoadError::Flash(FlashError::BufferTooSmall));
        }
        self.storage
            .write(StorageKey::DeviceConfigToml, text.as_bytes())
            .await?;
        Ok(())
    }

    /// Provision a passphrase into flash
    ///
    /// The passphrase is checked against the same rules as configured ones.
    pub async fn provision_secret(&mut self, kind: SecretKind, secret: &str) -> Result<(), LoadError> {
        validate_passphrase(secret).map_err(|c| ConfigError::new(kind.field(), c))?;
        self.storage
            .write(kind.storage_key(), secret.as_bytes())
            .await?;
        Ok(())
    }

    /// Read configuration text from flash
    async fn read_text<'b>(&mut self, buffer: &'b mut [u8]) -> Result<&'b str, LoadError> {
        let len = self
            .storage
            .read(StorageKey::DeviceConfigToml, buffer)
            .await?;

        debug!("Read {} bytes of configuration text from flash", len);

        str::from_utf8(&buffer[..len]).map_err(|_| LoadError::InvalidUtf8)
    }

    /// Read the binary snapshot from flash
    async fn read_snapshot(&mut self) -> Result<StoredConfig, LoadError> {
        let mut buffer = [0u8; MAX_SNAPSHOT_SIZE];
        let len = self.storage.read(StorageKey::DeviceConfig, &mut buffer).await?;

        debug!("Read {} bytes of configuration snapshot from flash", len);

        let stored: StoredConfig =
            postcard::from_bytes(&buffer[..len]).map_err(|_| LoadError::Deserialize)?;

        if stored.version != CONFIG_VERSION {
            warn!(
                "Config version mismatch: found {}, expected {}",
                stored.version,
                CONFIG_VERSION
            );
            return Err(LoadError::VersionMismatch);
        }

        Ok(stored)
    }
}
