//! Secret values
//!
//! Passphrases are wrapped so they never show up in `Debug` or defmt output,
//! and reading them is an explicit [`Secret::expose`] call. Where the value
//! comes from is behind [`SecretSource`], so built-in literals can be swapped
//! for provisioned flash without touching consumers.

use core::fmt;
use core::future::Future;

use heapless::String;

use super::types::MAX_PASSPHRASE_LEN;

/// Fixed-capacity secret string
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret<const N: usize>(String<N>);

/// WPA2 passphrase
pub type Passphrase = Secret<MAX_PASSPHRASE_LEN>;

impl<const N: usize> Secret<N> {
    /// Wrap a value, or `None` if it exceeds the capacity
    pub fn new(value: &str) -> Option<Self> {
        String::try_from(value).ok().map(Self)
    }

    /// Read the secret
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<const N: usize> fmt::Debug for Secret<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for Secret<N> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Secret(<redacted>)")
    }
}

/// Which secret is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SecretKind {
    /// Passphrase of the hosted access point
    ApSecret,
    /// Passphrase of the network joined as a station
    StaPassword,
}

/// Backing store for provisioned secrets
pub trait SecretSource {
    type Error;

    /// Fetch a secret into `buffer`
    ///
    /// Returns `Ok(None)` when nothing is provisioned for `kind`, in which
    /// case the caller keeps the value it already has.
    fn fetch<'b>(
        &mut self,
        kind: SecretKind,
        buffer: &'b mut [u8],
    ) -> impl Future<Output = Result<Option<&'b str>, Self::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let secret = Passphrase::new("sparkfun").unwrap();
        let shown = format!("{:?}", secret);
        assert!(!shown.contains("sparkfun"));
        assert_eq!(secret.expose(), "sparkfun");
        assert_eq!(secret.len(), 8);
    }

    #[test]
    fn test_capacity() {
        assert!(Secret::<4>::new("abcd").is_some());
        assert!(Secret::<4>::new("abcde").is_none());
        assert!(Passphrase::new("").unwrap().is_empty());
    }
}
