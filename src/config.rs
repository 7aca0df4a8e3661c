use crate::error::{Error, Result};
use crate::mode::{ChainingMode, NonceCombination, PaddingScheme};
use crate::permutation::CipherAlgorithm;

/// Parameters a transform is built from.
///
/// Sizes are in bits except `register_shift_size`, which counts the bytes
/// a CFB or OFB step consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherConfiguration {
    pub block_size: usize,
    pub key_size: usize,
    pub mode: ChainingMode,
    pub padding: PaddingScheme,
    pub nonce_combination: NonceCombination,
    pub register_shift_size: usize,
}

impl Default for CipherConfiguration {
    fn default() -> Self {
        CipherConfiguration {
            block_size: 128,
            key_size: 128,
            mode: ChainingMode::Cbc,
            padding: PaddingScheme::Pkcs7,
            nonce_combination: NonceCombination::Xor,
            register_shift_size: 1,
        }
    }
}

impl CipherConfiguration {
    pub fn with_key_size(mut self, bits: usize) -> Self {
        self.key_size = bits;
        self
    }

    pub fn with_block_size(mut self, bits: usize) -> Self {
        self.block_size = bits;
        self
    }

    pub fn with_mode(mut self, mode: ChainingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_padding(mut self, padding: PaddingScheme) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_nonce_combination(mut self, combination: NonceCombination) -> Self {
        self.nonce_combination = combination;
        self
    }

    pub fn with_register_shift_size(mut self, bytes: usize) -> Self {
        self.register_shift_size = bytes;
        self
    }

    pub fn block_size_bytes(&self) -> usize {
        self.block_size / 8
    }

    /// Checks every parameter against what cipher `C` supports.
    pub fn validate<C: CipherAlgorithm>(&self) -> Result<()> {
        if !C::LEGAL_BLOCK_SIZES.contains(self.block_size) {
            return Err(Error::configuration(
                C::NAME,
                format!("a block of {} bits is not a legal block size", self.block_size),
            ));
        }
        if !C::LEGAL_KEY_SIZES.contains(self.key_size) {
            return Err(Error::configuration(
                C::NAME,
                format!("a key of {} bits is not a legal key size", self.key_size),
            ));
        }
        if self.register_shift_size == 0 || self.register_shift_size > self.block_size_bytes() {
            return Err(Error::configuration(
                C::NAME,
                format!(
                    "register shift size must be 1 to {} bytes, got {}",
                    self.block_size_bytes(),
                    self.register_shift_size
                ),
            ));
        }
        Ok(())
    }
}
