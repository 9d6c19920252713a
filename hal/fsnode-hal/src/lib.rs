//! fsnode Hardware Abstraction Layer
//!
//! Traits implemented by board-specific HALs so the configuration layer can
//! persist data without knowing which chip it runs on.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  fsnode-core (config, persistence)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  fsnode-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  board HAL (flash partition driver)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::FlashStorage`] - Persistent key-value storage

#![no_std]
#![deny(unsafe_code)]

pub mod flash;

pub use flash::{FlashError, FlashStorage, StorageKey};
