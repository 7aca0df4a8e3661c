//! Parameter enumerations shared by the configuration and the transform engine.

/// Strategy for extending a single-block permutation over a whole message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainingMode {
    /// Electronic codebook: every block on its own.
    Ecb,
    /// Cipher block chaining.
    Cbc,
    /// Cipher feedback, shifting `register_shift_size` bytes per step.
    Cfb,
    /// Output feedback, shifting `register_shift_size` bytes per step.
    Ofb,
    /// Ciphertext stealing. Declared only; every use fails with
    /// [`Error::NotImplemented`](crate::Error::NotImplemented).
    Cts,
    /// Counter mode.
    Ctr,
}

impl ChainingMode {
    /// Modes that turn the block cipher into a keystream generator and so can
    /// process a message that is not a whole number of blocks.
    pub fn is_stream_mode(self) -> bool {
        match self {
            ChainingMode::Cfb | ChainingMode::Ofb | ChainingMode::Ctr => true,
            ChainingMode::Ecb | ChainingMode::Cbc | ChainingMode::Cts => false,
        }
    }

    /// Whether the mode chains through an IV.
    pub fn needs_iv(self) -> bool {
        self != ChainingMode::Ecb
    }
}

/// How the final block of a message is filled up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaddingScheme {
    /// No padding; only stream modes accept a trailing partial block.
    None,
    /// Zero bytes, added only when a partial block remains.
    Zeros,
    /// `n` bytes of value `n`, always added.
    Pkcs7,
    /// Zero bytes followed by the count byte, always added.
    AnsiX923,
    /// Random bytes followed by the count byte, always added.
    Iso10126,
}

/// How the fixed nonce and the running counter form a CTR register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonceCombination {
    /// The counter spans the whole block and is XORed over the nonce.
    Xor,
    /// The nonce fills the leading bytes, the counter the remaining ones.
    Concatenate,
    /// The register starts at the nonce and is incremented as one big counter.
    Add,
}

/// Which way a transform runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformDirection {
    Encrypt,
    Decrypt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_modes() {
        assert!(ChainingMode::Cfb.is_stream_mode());
        assert!(ChainingMode::Ofb.is_stream_mode());
        assert!(ChainingMode::Ctr.is_stream_mode());
        assert!(!ChainingMode::Ecb.is_stream_mode());
        assert!(!ChainingMode::Cbc.is_stream_mode());
        assert!(!ChainingMode::Cts.is_stream_mode());
    }

    #[test]
    fn only_ecb_runs_without_iv() {
        assert!(!ChainingMode::Ecb.needs_iv());
        assert!(ChainingMode::Ctr.needs_iv());
    }
}
