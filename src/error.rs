//! Error types shared by the cipher, the configuration and the transforms.

use thiserror::Error;

use crate::mode::ChainingMode;

/// Errors raised while configuring a cipher or running a transform.
///
/// None of these are transient: they describe bad input or a misuse of the
/// API, so retrying the same call can never succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Illegal key or block size, weak key, missing or malformed IV, or use
    /// of a transform whose key material has already been wiped.
    #[error("invalid {algorithm} configuration: {reason}")]
    Configuration {
        /// Algorithm the configuration was meant for.
        algorithm: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Input is not block aligned in a mode that needs whole blocks.
    #[error("input length {len} is not a multiple of the {block_size}-byte block size")]
    Length {
        /// Length of the offending input.
        len: usize,
        /// Block size the input had to be aligned to.
        block_size: usize,
    },

    /// Padding of the final decrypted block is malformed.
    #[error("invalid padding: {reason}")]
    Padding {
        /// Which check failed.
        reason: &'static str,
    },

    /// The chaining mode is declared but has no implementation.
    #[error("chaining mode {0:?} is not implemented")]
    NotImplemented(ChainingMode),

    /// The CTR counter ran past its largest value.
    #[error("counter exhausted: the message space for this nonce is used up")]
    Overflow,

    /// Destination buffer cannot hold the output.
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    Buffer {
        /// Bytes the operation would write.
        needed: usize,
        /// Bytes available in the destination.
        available: usize,
    },
}

impl Error {
    pub(crate) fn configuration(algorithm: &'static str, reason: impl Into<String>) -> Self {
        Error::Configuration {
            algorithm,
            reason: reason.into(),
        }
    }

    /// Returns true if the error is unrecoverable for the failed call.
    ///
    /// Every variant is: cryptographic failures are input or programming
    /// errors, never conditions that go away on retry.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Configuration { .. }
            | Error::Length { .. }
            | Error::Padding { .. }
            | Error::NotImplemented(_)
            | Error::Overflow
            | Error::Buffer { .. } => true,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_display() {
        let err = Error::Length {
            len: 17,
            block_size: 16,
        };
        assert_eq!(
            err.to_string(),
            "input length 17 is not a multiple of the 16-byte block size"
        );
    }

    #[test]
    fn configuration_names_algorithm() {
        let err = Error::configuration("Serpent", "the specified key is a weak one");
        assert_eq!(
            err.to_string(),
            "invalid Serpent configuration: the specified key is a weak one"
        );
    }

    #[test]
    fn nothing_is_retryable() {
        assert!(Error::Overflow.is_fatal());
        assert!(Error::NotImplemented(ChainingMode::Cts).is_fatal());
        assert!(Error::Padding { reason: "bad count" }.is_fatal());
    }
}
