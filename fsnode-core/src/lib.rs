//! Board-agnostic device configuration for fsnode firmware
//!
//! This crate holds the values the firmware bootstrap reads before it
//! brings anything up:
//!
//! - Access point and station credentials
//! - HTTP server port and network hostname
//! - The designated I/O pin
//!
//! Values come from `device.toml` at build time, optionally overridden by
//! configuration text and secrets provisioned into flash. They are validated
//! once into an immutable [`DeviceConfiguration`] and shared by reference.
//!
//! Network bring-up, the HTTP server and GPIO driving live elsewhere; they
//! only consume what this crate hands out.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

#[macro_use]
mod fmt;

pub mod config;
pub mod persistence;
pub mod provider;

pub use config::{ConfigError, ConfigurationError, DeviceConfiguration, RawConfig};
pub use provider::{get, ConfigurationProvider};
